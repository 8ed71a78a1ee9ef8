use std::time::Duration;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Trait for game-specific timed effect records.
pub trait EffectKind: Clone + Serialize + DeserializeOwned {
    /// How long the effect stays active once started.
    fn duration(&self) -> Duration;
}

/// A timed effect that started at a known point in simulated time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ActiveEffect<K: EffectKind> {
    pub kind: K,
    pub started_at: Duration,
}

impl<K: EffectKind> ActiveEffect<K> {
    pub fn new(kind: K, started_at: Duration) -> Self {
        Self { kind, started_at }
    }

    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.started_at)
    }

    /// Expired once strictly more than the effect's duration has elapsed.
    pub fn is_expired(&self, now: Duration) -> bool {
        self.elapsed(now) > self.kind.duration()
    }
}
