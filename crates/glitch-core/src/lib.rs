pub mod effect;
pub mod game_trait;
pub mod geometry;
pub mod input;
pub mod notification;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::game_trait::{SimEvent, Simulation};
    use crate::input::InputEvent;

    /// Fixed step for a simulation's own tick rate.
    pub fn fixed_dt(sim: &dyn Simulation) -> f32 {
        1.0 / sim.tick_rate()
    }

    /// Run N ticks with no input, returning all accumulated events.
    pub fn run_ticks(sim: &mut dyn Simulation, n: usize) -> Vec<SimEvent> {
        let dt = fixed_dt(sim);
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(sim.update(dt, &[]));
        }
        all_events
    }

    /// Run one tick delivering `inputs`.
    pub fn step_with(sim: &mut dyn Simulation, inputs: &[InputEvent]) -> Vec<SimEvent> {
        let dt = fixed_dt(sim);
        sim.update(dt, inputs)
    }

    // ================================================================
    // Simulation Trait Contract Tests
    // ================================================================
    // Every Simulation implementation must pass these. Simulation crates
    // call them from their own #[cfg(test)] modules.

    /// update() must advance the clock by one tick.
    pub fn contract_update_advances_clock(sim: &mut dyn Simulation) {
        let before = sim.clock().tick();
        run_ticks(sim, 1);
        assert_eq!(
            sim.clock().tick(),
            before + 1,
            "update() must advance the clock by exactly one tick"
        );
    }

    /// pause() must freeze the clock, resume() must unfreeze it.
    pub fn contract_pause_stops_updates(sim: &mut dyn Simulation) {
        sim.pause();
        assert!(sim.is_paused());
        let before = *sim.clock();
        let events = run_ticks(sim, 10);
        assert_eq!(before, *sim.clock(), "Clock must not move while paused");
        assert!(events.is_empty(), "No events may fire while paused");

        sim.resume();
        run_ticks(sim, 1);
        assert_ne!(before, *sim.clock(), "Clock must move after resume");
    }
}
