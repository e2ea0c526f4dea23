use crate::{money::Credits, rng::RandomSource};

/// Chooses the stake for the next round from the allowed set.
pub trait BetSelector: Send + Sync {
    fn select(&mut self, allowed: &[Credits], rng: &mut dyn RandomSource) -> Credits;
}

/// Uniform pick over the allowed stakes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomBet;

impl BetSelector for RandomBet {
    fn select(&mut self, allowed: &[Credits], rng: &mut dyn RandomSource) -> Credits {
        let index = rng.below(allowed.len() as u64) as usize;
        allowed[index]
    }
}

/// The player's explicit choice, consuming no randomness.
#[derive(Debug, Clone, Copy)]
pub struct FixedBet(pub Credits);

impl BetSelector for FixedBet {
    fn select(&mut self, _allowed: &[Credits], _rng: &mut dyn RandomSource) -> Credits {
        self.0
    }
}
