//! The single source of randomness for combat and tournaments.
//!
//! Every roll in the engine goes through [`Dice`], so a match or a bracket
//! can be replayed exactly from a seed, or driven by a fixed roll stream
//! in tests.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniform rolls.
pub trait Dice {
    /// Roll a uniform value in `[0, 100)`.
    fn percent(&mut self) -> f64;

    /// Roll a uniform index in `0..len`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize;

    /// Draw a fresh seed, used to derive independent per-match dice.
    fn seed(&mut self) -> u64;

    /// Roll against a percentage chance (`0..=100`).
    fn chance(&mut self, percent: f64) -> bool {
        self.percent() < percent
    }

    /// Roll against a probability in `[0, 1]`.
    fn probability(&mut self, p: f64) -> bool {
        self.percent() < p * 100.0
    }
}

/// Shuffle a slice in place (Fisher-Yates) using the given dice.
pub fn shuffle<T>(items: &mut [T], dice: &mut dyn Dice) {
    for i in (1..items.len()).rev() {
        let j = dice.index(i + 1);
        items.swap(i, j);
    }
}

/// Seeded dice backed by [`StdRng`].
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: StdRng,
}

impl SeededDice {
    /// Create dice from a seed. The same seed always yields the same rolls.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Dice for SeededDice {
    fn percent(&mut self) -> f64 {
        self.rng.random::<f64>() * 100.0
    }

    fn index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }

    fn seed(&mut self) -> u64 {
        self.rng.random()
    }
}

/// Dice that replay a fixed stream of percent rolls.
///
/// Once the stream runs dry every roll returns the fallback value, which
/// defaults to `99.9` (every chance check fails). Index rolls always return 0.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    rolls: VecDeque<f64>,
    fallback: f64,
    seeds: u64,
}

impl ScriptedDice {
    /// Create dice that return `rolls` in order.
    pub fn new(rolls: impl IntoIterator<Item = f64>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            fallback: 99.9,
            seeds: 0,
        }
    }

    /// Set the value returned after the scripted rolls are used up.
    pub fn otherwise(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    /// Number of scripted rolls not yet consumed.
    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl Dice for ScriptedDice {
    fn percent(&mut self) -> f64 {
        self.rolls.pop_front().unwrap_or(self.fallback)
    }

    fn index(&mut self, _len: usize) -> usize {
        0
    }

    fn seed(&mut self) -> u64 {
        self.seeds += 1;
        self.seeds
    }
}
