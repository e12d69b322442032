//! Seeded pseudo-random number generator
//!
//! Deterministic PRNG for reproducible bot behaviour and match replay.
//! Backed by ChaCha8 so the same seed and match index always yield the
//! same sequence of `Random` moves and strategy draws.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded random number generator
///
/// Deterministic: same seed + index = same sequence
#[derive(Clone, Debug)]
pub struct SeededRng {
    inner: ChaCha8Rng,
}

impl SeededRng {
    /// Create a new RNG from a 32-byte seed and match index
    pub fn new(seed: &[u8; 32], match_index: u64) -> Self {
        let mut inner = ChaCha8Rng::from_seed(*seed);
        // Each match index reads from its own stream of the same key
        inner.set_stream(match_index);
        Self { inner }
    }

    /// Create an RNG seeded from operating system entropy
    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha8Rng::from_entropy(),
        }
    }
}

impl RngCore for SeededRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

/// Parse a 32-byte seed from a hex string (64 hex digits)
pub fn parse_seed(hex: &str) -> Option<[u8; 32]> {
    let hex = hex.trim();
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    if hex.len() != 64 || !hex.is_ascii() {
        return None;
    }
    let mut seed = [0u8; 32];
    for (i, byte) in seed.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_determinism() {
        let seed = [42u8; 32];
        let mut r1 = SeededRng::new(&seed, 0);
        let mut r2 = SeededRng::new(&seed, 0);

        for _ in 0..100 {
            assert_eq!(r1.next_u64(), r2.next_u64());
        }
    }

    #[test]
    fn test_different_seeds() {
        let mut rng1 = SeededRng::new(&[1u8; 32], 0);
        let mut rng2 = SeededRng::new(&[2u8; 32], 0);

        let vals1: Vec<_> = (0..10).map(|_| rng1.next_u64()).collect();
        let vals2: Vec<_> = (0..10).map(|_| rng2.next_u64()).collect();

        assert_ne!(vals1, vals2);
    }

    #[test]
    fn test_different_match_index() {
        let seed = [42u8; 32];
        let mut rng1 = SeededRng::new(&seed, 0);
        let mut rng2 = SeededRng::new(&seed, 1);

        let vals1: Vec<_> = (0..4).map(|_| rng1.next_u64()).collect();
        let vals2: Vec<_> = (0..4).map(|_| rng2.next_u64()).collect();

        assert_ne!(vals1, vals2);
    }

    #[test]
    fn test_high_stream_bits_matter() {
        let seed = [42u8; 32];
        let mut rng1 = SeededRng::new(&seed, 1);
        let mut rng2 = SeededRng::new(&seed, 1 | (1 << 40));

        let vals1: Vec<_> = (0..4).map(|_| rng1.next_u64()).collect();
        let vals2: Vec<_> = (0..4).map(|_| rng2.next_u64()).collect();

        assert_ne!(vals1, vals2);
    }

    #[test]
    fn test_coin_is_roughly_fair() {
        let mut rng = SeededRng::new(&[7u8; 32], 0);
        let heads = (0..10_000).filter(|_| rng.gen_bool(0.5)).count();
        assert!(heads > 4_500 && heads < 5_500, "heads = {}", heads);
    }

    #[test]
    fn test_usable_through_rng_trait() {
        let mut rng = SeededRng::new(&[3u8; 32], 9);
        for _ in 0..100 {
            let v: u32 = rng.gen_range(0..5);
            assert!(v < 5);
        }
    }

    #[test]
    fn test_parse_seed() {
        let hex = "2a".repeat(32);
        assert_eq!(parse_seed(&hex), Some([42u8; 32]));
        assert_eq!(parse_seed(&format!("0x{}", hex)), Some([42u8; 32]));
        assert_eq!(parse_seed("2a2a"), None);
        assert_eq!(parse_seed(&"zz".repeat(32)), None);
    }
}
