//! Random implementations.

use crate::infrastructure::ports::RandomPort;

/// System random - uses real randomness.
pub struct SystemRandom;

impl SystemRandom {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPort for SystemRandom {
    fn pick_index(&self, len: usize) -> usize {
        use rand::Rng;
        rand::thread_rng().gen_range(0..len)
    }
}

/// Fixed random for testing.
#[cfg(test)]
pub struct FixedRandom(pub usize);

#[cfg(test)]
impl RandomPort for FixedRandom {
    fn pick_index(&self, len: usize) -> usize {
        self.0.min(len - 1)
    }
}
