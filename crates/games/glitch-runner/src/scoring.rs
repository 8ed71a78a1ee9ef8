use std::time::Duration;

/// Points for reaching the exit.
pub const COMPLETION_BONUS: u32 = 1000;
/// Seconds under which each remaining second is worth `TIME_BONUS_PER_SEC`.
pub const PAR_SECS: u64 = 60;
pub const TIME_BONUS_PER_SEC: u32 = 10;

/// Score for clearing a level in `elapsed`.
///
/// Scoring: 1000 + 10 per whole second under a minute.
pub fn level_score(elapsed: Duration) -> u32 {
    let remaining = PAR_SECS.saturating_sub(elapsed.as_secs()) as u32;
    COMPLETION_BONUS + remaining * TIME_BONUS_PER_SEC
}
