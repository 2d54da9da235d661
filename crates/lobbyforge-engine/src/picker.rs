//! Winner selection.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Chooses which seat wins a finished game.
///
/// Implementations return an index in `0..players`. The engine never calls
/// this with `players == 0`.
pub trait WinnerPicker: Send + Sync + 'static {
    fn pick(&self, players: usize) -> usize;
}

/// Uniform choice from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomWinner;

impl WinnerPicker for RandomWinner {
    fn pick(&self, players: usize) -> usize {
        rand::rng().random_range(0..players)
    }
}

/// Uniform choice from a seeded generator, for reproducible runs.
#[derive(Debug)]
pub struct SeededWinner {
    rng: Mutex<StdRng>,
}

impl SeededWinner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl WinnerPicker for SeededWinner {
    fn pick(&self, players: usize) -> usize {
        // A poisoned lock only means another pick panicked; the generator
        // state is still usable.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.random_range(0..players)
    }
}
