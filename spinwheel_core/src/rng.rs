use std::collections::VecDeque;

use hmac::{Hmac, Mac};
use rand::{rngs::StdRng, Rng, SeedableRng};
use sha2::{Digest, Sha256};

/// Uniform randomness consumed by the engine. Everything random in a round
/// (stops, bet choice, wheel draw) goes through one of these, so tests can
/// pin exact outcomes.
pub trait RandomSource {
    /// Uniform integer in `[0, bound)`. `bound` must be non-zero.
    fn below(&mut self, bound: u64) -> u64;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn below(&mut self, bound: u64) -> u64 {
        (**self).below(bound)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn below(&mut self, bound: u64) -> u64 {
        (**self).below(bound)
    }
}

// Provably-fair construction:
// server_seed (secret) + client_seed + nonce -> HMAC-SHA256 -> byte stream -> u64 draws

pub type HmacSha256 = Hmac<Sha256>;

pub fn derive_hash_hex(input: &[u8]) -> String {
    hex::encode(Sha256::digest(input))
}

/// Map raw 64-bit words onto `[0, bound)` without modulo bias by rejecting
/// the low `2^64 mod bound` values.
fn unbiased_below(bound: u64, mut next: impl FnMut() -> u64) -> u64 {
    assert!(bound > 0, "bound must be > 0");
    let threshold = bound.wrapping_neg() % bound;
    loop {
        let v = next();
        if v >= threshold {
            return v % bound;
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProvablyFairRng {
    pub server_seed: String, // secret
    pub client_seed: String,
    pub nonce: u64,
    buffer: Vec<u8>,
    cursor: usize,
}

impl ProvablyFairRng {
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>, nonce: u64) -> Self {
        let mut rng = Self {
            server_seed: server_seed.into(),
            client_seed: client_seed.into(),
            nonce,
            buffer: Vec::new(),
            cursor: 0,
        };
        rng.buffer = rng.hmac_bytes().to_vec();
        rng
    }

    pub fn server_seed_hash_hex(&self) -> String {
        derive_hash_hex(self.server_seed.as_bytes())
    }

    pub fn hmac_bytes(&self) -> [u8; 32] {
        let mut mac =
            HmacSha256::new_from_slice(self.server_seed.as_bytes()).expect("HMAC takes any key size");
        let msg = format!("{}:{}", self.client_seed, self.nonce);
        mac.update(msg.as_bytes());
        let res = mac.finalize().into_bytes();
        let mut out = [0u8; 32];
        out.copy_from_slice(&res);
        out
    }

    pub fn next_u64(&mut self) -> u64 {
        if self.cursor + 8 > self.buffer.len() {
            // extend the stream deterministically by hashing the spent block
            self.buffer = Sha256::digest(&self.buffer).to_vec();
            self.cursor = 0;
        }
        let mut word = [0u8; 8];
        word.copy_from_slice(&self.buffer[self.cursor..self.cursor + 8]);
        self.cursor += 8;
        u64::from_be_bytes(word)
    }
}

impl RandomSource for ProvablyFairRng {
    fn below(&mut self, bound: u64) -> u64 {
        unbiased_below(bound, || self.next_u64())
    }
}

/// Seedable general-purpose source for simulations and local play.
#[derive(Debug, Clone)]
pub struct SeededRng(StdRng);

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl RandomSource for SeededRng {
    fn below(&mut self, bound: u64) -> u64 {
        assert!(bound > 0, "bound must be > 0");
        self.0.gen_range(0..bound)
    }
}

/// Replays a fixed list of draws. Each value is reduced modulo the requested
/// bound, so scripting a value below the bound yields it exactly.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    values: VecDeque<u64>,
}

impl ScriptedRng {
    pub fn new(values: impl IntoIterator<Item = u64>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RandomSource for ScriptedRng {
    fn below(&mut self, bound: u64) -> u64 {
        assert!(bound > 0, "bound must be > 0");
        let value = self
            .values
            .pop_front()
            .expect("scripted random source ran out of values");
        value % bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = ProvablyFairRng::new("server", "client", 1);
        let mut rng2 = ProvablyFairRng::new("server", "client", 1);
        assert_eq!(rng1.server_seed_hash_hex(), rng2.server_seed_hash_hex());
        assert_eq!(rng1.hmac_bytes(), rng2.hmac_bytes());
        let a: Vec<u64> = (0..12).map(|_| rng1.below(20)).collect();
        let b: Vec<u64> = (0..12).map(|_| rng2.below(20)).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn nonce_changes_the_stream() {
        let a = ProvablyFairRng::new("server", "client", 1).hmac_bytes();
        let b = ProvablyFairRng::new("server", "client", 2).hmac_bytes();
        assert_ne!(a, b);
    }

    #[test]
    fn stream_extends_past_first_block() {
        let mut rng = ProvablyFairRng::new("s", "c", 0);
        // 32 bytes hold four words; the fifth comes from the extended block
        let words: Vec<u64> = (0..9).map(|_| rng.next_u64()).collect();
        assert_eq!(words.len(), 9);
        let mut replay = ProvablyFairRng::new("s", "c", 0);
        let again: Vec<u64> = (0..9).map(|_| replay.next_u64()).collect();
        assert_eq!(words, again);
    }

    #[test]
    fn draws_stay_in_range() {
        let mut fair = ProvablyFairRng::new("server", "client", 9);
        let mut seeded = SeededRng::new(9);
        for bound in [1u64, 2, 3, 20, 184, 1 << 40] {
            for _ in 0..50 {
                assert!(fair.below(bound) < bound);
                assert!(seeded.below(bound) < bound);
            }
        }
    }

    #[test]
    fn scripted_source_replays_values() {
        let mut rng = ScriptedRng::new([0, 183, 25]);
        assert_eq!(rng.below(184), 0);
        assert_eq!(rng.below(184), 183);
        assert_eq!(rng.below(20), 5);
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn hash_is_hex_sha256() {
        assert_eq!(
            derive_hash_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
