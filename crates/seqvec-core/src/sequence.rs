//! Reference sequences and the sequence mutator.
//!
//! Every generated vector is derived from a [`SequenceSpace`]: the one
//! five-value sequence the recognizer accepts, and a sentinel sequence that is
//! known to be wrong at every position. The space is built once (from config
//! or defaults) and passed by reference into each generator.
//!
//! [`SequenceMutator`] draws single sequences from the space, either as a
//! partial corruption of the correct sequence or as uniform noise.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One input value on the recognizer's data channel.
pub type Value = u8;

/// Number of values in a sequence.
pub const SEQUENCE_LEN: usize = 5;

/// Five recognizer input values.
pub type Sequence = [Value; SEQUENCE_LEN];

/// The sequence the recognizer accepts unless configured otherwise.
pub const DEFAULT_CORRECT_SEQUENCE: Sequence = [36, 19, 56, 101, 73];

/// Byte used to build the default sentinel sequence.
pub const DEFAULT_SENTINEL_VALUE: Value = 255;

// =============================================================================
// SequenceSpace
// =============================================================================

/// Immutable reference data every generator draws from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSpace {
    correct: Sequence,
    sentinel: Sequence,
}

impl Default for SequenceSpace {
    fn default() -> Self {
        Self {
            correct: DEFAULT_CORRECT_SEQUENCE,
            sentinel: [DEFAULT_SENTINEL_VALUE; SEQUENCE_LEN],
        }
    }
}

impl SequenceSpace {
    /// Build a space whose sentinel sequence repeats `sentinel_value`.
    pub fn new(correct: Sequence, sentinel_value: Value) -> Result<Self, ConfigError> {
        Self::from_sequences(correct, [sentinel_value; SEQUENCE_LEN])
    }

    /// Build a space from explicit sequences.
    ///
    /// Rejects any sentinel value that also appears anywhere in the correct
    /// sequence; a sentinel write must never be mistaken for a good digit.
    pub fn from_sequences(correct: Sequence, sentinel: Sequence) -> Result<Self, ConfigError> {
        for &value in &sentinel {
            if let Some(position) = correct.iter().position(|&c| c == value) {
                return Err(ConfigError::SentinelCollision {
                    sentinel: value,
                    position,
                });
            }
        }
        Ok(Self { correct, sentinel })
    }

    /// The accepted sequence.
    #[must_use]
    pub fn correct(&self) -> &Sequence {
        &self.correct
    }

    /// The deliberately wrong sequence.
    #[must_use]
    pub fn sentinel(&self) -> &Sequence {
        &self.sentinel
    }

    /// The sentinel byte used for restart markers and filler writes.
    #[must_use]
    pub fn sentinel_value(&self) -> Value {
        self.sentinel[0]
    }

    /// Whether `values` is exactly the correct sequence.
    #[must_use]
    pub fn is_correct(&self, values: &[Value]) -> bool {
        values == self.correct.as_slice()
    }

    /// Replace every masked position of the correct sequence with the
    /// sentinel value at that position.
    #[must_use]
    pub fn corrupt(&self, mask: CorruptionMask) -> Sequence {
        let mut out = self.correct;
        for position in mask.positions() {
            out[position] = self.sentinel[position];
        }
        out
    }
}

// =============================================================================
// CorruptionMask
// =============================================================================

/// Positions of a sequence selected for corruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CorruptionMask([bool; SEQUENCE_LEN]);

impl CorruptionMask {
    /// Mask selecting exactly `positions`.
    ///
    /// Returns `None` when a position is out of range.
    #[must_use]
    pub fn from_positions(positions: &[usize]) -> Option<Self> {
        let mut mask = [false; SEQUENCE_LEN];
        for &p in positions {
            *mask.get_mut(p)? = true;
        }
        Some(Self(mask))
    }

    /// Draw per-position fair coins, redrawing until at least one is set.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        loop {
            let mask = Self(std::array::from_fn(|_| rng.random_bool(0.5)));
            if !mask.is_empty() {
                return mask;
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|&b| b)
    }

    #[must_use]
    pub fn contains(&self, position: usize) -> bool {
        self.0.get(position).copied().unwrap_or(false)
    }

    /// Selected positions in ascending order.
    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, &set)| set.then_some(i))
    }
}

// =============================================================================
// SequenceMutator
// =============================================================================

/// How a sequence was produced by the mutator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Correct sequence with the masked positions replaced by sentinel values.
    PartialCorruption(CorruptionMask),
    /// Five independent uniform values.
    Noise(Sequence),
}

impl Mutation {
    /// Materialize the sequence this mutation describes.
    #[must_use]
    pub fn apply(&self, space: &SequenceSpace) -> Sequence {
        match self {
            Self::PartialCorruption(mask) => space.corrupt(*mask),
            Self::Noise(values) => *values,
        }
    }
}

/// Draws boundary and noise sequences from a [`SequenceSpace`].
#[derive(Debug, Clone, Copy)]
pub struct SequenceMutator<'a> {
    space: &'a SequenceSpace,
}

impl<'a> SequenceMutator<'a> {
    #[must_use]
    pub fn new(space: &'a SequenceSpace) -> Self {
        Self { space }
    }

    /// Pick a mutation: partial corruption or noise, each with probability 1/2.
    ///
    /// Noise may coincide with the correct sequence; that is not excluded.
    pub fn draw<R: Rng>(&self, rng: &mut R) -> Mutation {
        if rng.random_bool(0.5) {
            Mutation::PartialCorruption(CorruptionMask::random(rng))
        } else {
            Mutation::Noise(std::array::from_fn(|_| rng.random::<Value>()))
        }
    }

    /// Draw one sequence.
    pub fn generate_sequence<R: Rng>(&self, rng: &mut R) -> Sequence {
        let mutation = self.draw(rng);
        tracing::trace!(?mutation, "drew sequence mutation");
        mutation.apply(self.space)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn default_space_is_valid() {
        let space = SequenceSpace::default();
        let rebuilt = SequenceSpace::new(DEFAULT_CORRECT_SEQUENCE, DEFAULT_SENTINEL_VALUE).unwrap();
        assert_eq!(space, rebuilt);
        assert_eq!(space.sentinel_value(), 255);
    }

    #[test]
    fn sentinel_overlap_is_rejected() {
        let err = SequenceSpace::new(DEFAULT_CORRECT_SEQUENCE, 56).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::SentinelCollision {
                sentinel: 56,
                position: 2
            }
        ));
    }

    #[test]
    fn overlap_at_a_different_position_is_rejected() {
        // 73 sits at index 4 of the correct sequence but index 0 of the sentinel.
        let err = SequenceSpace::from_sequences(DEFAULT_CORRECT_SEQUENCE, [73, 0, 0, 0, 0])
            .unwrap_err();
        assert!(matches!(err, ConfigError::SentinelCollision { position: 4, .. }));
    }

    #[test]
    fn corrupt_subset_one_and_three() {
        let space = SequenceSpace::default();
        let mask = CorruptionMask::from_positions(&[1, 3]).unwrap();
        assert_eq!(space.corrupt(mask), [36, 255, 56, 255, 73]);
    }

    #[test]
    fn mask_rejects_out_of_range_positions() {
        assert!(CorruptionMask::from_positions(&[5]).is_none());
        assert!(CorruptionMask::from_positions(&[]).unwrap().is_empty());
    }

    #[test]
    fn random_mask_is_never_empty() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            assert!(!CorruptionMask::random(&mut rng).is_empty());
        }
    }

    #[test]
    fn mutator_draws_both_branches() {
        let space = SequenceSpace::default();
        let mutator = SequenceMutator::new(&space);
        let mut rng = StdRng::seed_from_u64(11);
        let mut partial = 0;
        let mut noise = 0;
        for _ in 0..200 {
            match mutator.draw(&mut rng) {
                Mutation::PartialCorruption(_) => partial += 1,
                Mutation::Noise(_) => noise += 1,
            }
        }
        assert!(partial > 50, "partial={partial}");
        assert!(noise > 50, "noise={noise}");
    }

    #[test]
    fn noise_mutation_applies_verbatim() {
        let space = SequenceSpace::default();
        let m = Mutation::Noise([1, 2, 3, 4, 5]);
        assert_eq!(m.apply(&space), [1, 2, 3, 4, 5]);
    }
}
