//! Game clock with fixed-timestep accumulator

/// Tracks game time and provides a fixed-timestep accumulator for the
/// simulation. Frame times are fed in through [`advance`](GameClock::advance).
pub struct GameClock {
    /// Total elapsed (scaled) game time in seconds
    pub total_time: f64,
    /// Scaled time since last frame in seconds
    pub delta_time: f64,
    /// Fixed timestep interval (default: 1/60 second)
    pub fixed_timestep: f64,
    /// 1.0 runs normally, 0.0 pauses
    time_scale: f64,
    /// Accumulated time for fixed-step consumption
    accumulator: f64,
}

/// Longest frame the clock will account for, in seconds
const MAX_FRAME_TIME: f64 = 0.25;

impl Default for GameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            fixed_timestep: 1.0 / 60.0,
            time_scale: 1.0,
            accumulator: 0.0,
        }
    }
}

impl GameClock {
    /// Create a new game clock with default 60Hz fixed timestep
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by an explicit frame time
    pub fn advance(&mut self, elapsed: f64) {
        // Clamp to avoid spiral of death
        self.delta_time = elapsed.clamp(0.0, MAX_FRAME_TIME) * self.time_scale;
        self.total_time += self.delta_time;
        self.accumulator += self.delta_time;
    }

    /// Returns true if there's enough accumulated time for a fixed update step
    pub fn should_fixed_update(&self) -> bool {
        self.accumulator >= self.fixed_timestep
    }

    /// Consume one fixed timestep from the accumulator
    pub fn consume_fixed_step(&mut self) {
        self.accumulator -= self.fixed_timestep;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.time_scale = if paused { 0.0 } else { 1.0 };
    }

    pub fn is_paused(&self) -> bool {
        self.time_scale == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_defaults() {
        let clock = GameClock::new();
        assert!((clock.fixed_timestep - 1.0 / 60.0).abs() < 1e-10);
        assert_eq!(clock.total_time, 0.0);
        assert_eq!(clock.delta_time, 0.0);
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_accumulator_logic() {
        let mut clock = GameClock::new();
        clock.advance(1.0 / 30.0); // Two fixed steps worth

        assert!(clock.should_fixed_update());
        clock.consume_fixed_step();
        assert!(clock.should_fixed_update());
        clock.consume_fixed_step();
        assert!(!clock.should_fixed_update());
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut clock = GameClock::new();
        clock.advance(3.0);
        assert!((clock.delta_time - MAX_FRAME_TIME).abs() < 1e-10);
    }

    #[test]
    fn test_pause_stops_time() {
        let mut clock = GameClock::new();
        clock.set_paused(true);
        clock.advance(0.1);
        assert_eq!(clock.total_time, 0.0);
        assert!(!clock.should_fixed_update());

        clock.set_paused(false);
        clock.advance(0.1);
        assert!(clock.should_fixed_update());
    }
}
