/// Simulation step in seconds (16ms, the pets' native cadence).
pub const TICK_RATE: f64 = 0.016;
/// Max accumulated time before we clamp (prevents spiral of death).
pub const MAX_ACCUMULATOR: f64 = 0.25;

/// Fixed-timestep clock: turns variable frame deltas into whole ticks.
#[derive(Debug, Clone)]
pub struct FixedTicker {
    step: f64,
    max_accumulator: f64,
    accumulator: f64,
    tick_count: u64,
}

impl FixedTicker {
    pub fn new(step: f64, max_accumulator: f64) -> Self {
        Self {
            step,
            max_accumulator: max_accumulator.max(step),
            accumulator: 0.0,
            tick_count: 0,
        }
    }

    /// Add a frame's elapsed time. Returns how many ticks are now due;
    /// the caller runs exactly that many, in order.
    pub fn advance(&mut self, dt: f64) -> u32 {
        self.accumulator = (self.accumulator + dt.max(0.0)).min(self.max_accumulator);

        let mut due = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            due += 1;
        }
        self.tick_count += due as u64;
        due
    }

    /// Interpolation alpha for rendering between ticks.
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.step) as f32
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Drop any partial tick (e.g. after a respawn).
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(TICK_RATE, MAX_ACCUMULATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_remainder_between_frames() {
        let mut t = FixedTicker::new(0.016, 0.25);
        assert_eq!(t.advance(0.040), 2);
        assert!((t.alpha() - 0.5).abs() < 1e-3);
        assert_eq!(t.advance(0.008), 1);
        assert_eq!(t.tick_count(), 3);
    }

    #[test]
    fn clamps_long_stalls() {
        let mut t = FixedTicker::default();
        // A 5s hitch still only runs 250ms worth of ticks.
        assert_eq!(t.advance(5.0), 15);
        assert!(t.alpha() < 1.0);
    }

    #[test]
    fn ignores_negative_deltas() {
        let mut t = FixedTicker::default();
        assert_eq!(t.advance(-1.0), 0);
        assert_eq!(t.alpha(), 0.0);
    }
}
