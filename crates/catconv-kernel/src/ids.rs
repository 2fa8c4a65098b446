//! Random member identifiers.
//!
//! Ids are drawn from an alphanumeric alphabet without the look-alike
//! characters `0`, `O` and `o`. Uniqueness is not guaranteed; callers must
//! tolerate collisions.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DEFAULT_ID_LENGTH: usize = 6;

/// `a-z`, `A-Z`, `1-9` with `o` and `O` removed.
pub const ID_ALPHABET: &[u8] = b"abcdefghijklmnpqrstuvwxyzABCDEFGHIJKLMNPQRSTUVWXYZ123456789";

/// Source of member identifiers.
pub trait IdGenerator {
    /// Produce an id of `length` characters (default [`DEFAULT_ID_LENGTH`]).
    ///
    /// Returns `None` only when the length resolves to zero.
    fn generate(&mut self, length: Option<usize>) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct RandomIdGenerator {
    rng: StdRng,
}

impl RandomIdGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for reproducible output.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for RandomIdGenerator {
    fn generate(&mut self, length: Option<usize>) -> Option<String> {
        let length = length.unwrap_or(DEFAULT_ID_LENGTH);
        if length == 0 {
            return None;
        }
        let id: String = (0..length)
            .map(|_| ID_ALPHABET[self.rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();
        tracing::trace!(%id, "generated member id");
        Some(id)
    }
}

/// Generate one id with a fresh random generator.
pub fn generate_random_id(length: Option<usize>) -> Option<String> {
    RandomIdGenerator::new().generate(length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabet_excludes_look_alikes() {
        assert_eq!(ID_ALPHABET.len(), 59);
        for c in [b'0', b'O', b'o'] {
            assert!(!ID_ALPHABET.contains(&c), "alphabet contains {}", c as char);
        }
    }

    #[test]
    fn generates_requested_length_from_alphabet() {
        let mut ids = RandomIdGenerator::seeded(7);
        for length in [1, 6, 10, 32] {
            let id = ids.generate(Some(length)).expect("non-zero length yields id");
            assert_eq!(id.len(), length);
            assert!(id.bytes().all(|c| ID_ALPHABET.contains(&c)));
        }
    }

    #[test]
    fn default_and_zero_lengths() {
        let mut ids = RandomIdGenerator::seeded(1);
        assert_eq!(ids.generate(None).map(|id| id.len()), Some(DEFAULT_ID_LENGTH));
        assert_eq!(ids.generate(Some(0)), None);
        assert_eq!(generate_random_id(Some(0)), None);
    }

    #[test]
    fn seeded_generators_repeat() {
        let first = RandomIdGenerator::seeded(42).generate(Some(12));
        let second = RandomIdGenerator::seeded(42).generate(Some(12));
        assert_eq!(first, second);
    }
}
