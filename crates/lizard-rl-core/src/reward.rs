//! Reward signals

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reward signal from the environment
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reward(pub f64);

impl Reward {
    /// No reward; what a blocked move yields
    pub const ZERO: Reward = Reward(0.0);

    /// Create a new reward
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the reward value
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Reward {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<Reward> for f64 {
    fn from(reward: Reward) -> Self {
        reward.0
    }
}

impl std::ops::Add for Reward {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self(self.0 + other.0)
    }
}

impl std::ops::AddAssign for Reward {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl std::iter::Sum for Reward {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, r| acc + r)
    }
}

impl fmt::Display for Reward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate() {
        let mut total = Reward::ZERO;
        total += Reward(-1.0);
        total += Reward(10.0);
        assert_eq!(total, Reward(9.0));
        let summed: Reward = [Reward(1.0), Reward(-10.0)].into_iter().sum();
        assert_eq!(summed.value(), -9.0);
    }

    #[test]
    fn test_serializes_as_bare_number() {
        assert_eq!(serde_json::to_string(&Reward(-10.0)).unwrap(), "-10.0");
    }
}
