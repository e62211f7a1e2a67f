//! Exploration-rate decay

/// Subtract a fixed amount per step until a floor is reached
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepDecay {
    /// Amount removed per step
    pub decrement: f64,
    /// Lowest reachable rate
    pub floor: f64,
}

impl StepDecay {
    /// Create a new step decay
    #[must_use]
    pub fn new(decrement: f64, floor: f64) -> Self {
        Self { decrement, floor }
    }

    /// Rate after one more step. Once at or below the floor the rate stays put.
    #[must_use]
    pub fn next(&self, current: f64) -> f64 {
        if current > self.floor {
            (current - self.decrement).max(self.floor)
        } else {
            current
        }
    }
}

impl Default for StepDecay {
    fn default() -> Self {
        Self::new(0.005, 0.2)
    }
}
