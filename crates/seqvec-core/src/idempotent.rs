//! Idempotent filler fragments.
//!
//! Two canonical fragments are derived from the [`SequenceSpace`]:
//!
//! - **A**: the encoded correct sequence followed by a start-marked sentinel
//!   write (a restart marker).
//! - **B**: a single unmarked sentinel write.
//!
//! Any concatenation of A and B, in any order and any number of times, is a
//! no-op stimulus: replayed from a quiescent recognizer it never changes the
//! observable `warning` output. [`IdempotentFragments::random_run`] draws such
//! concatenations for use as filler between scenario steps.

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::record::{Assertion, Fragment, Record, encode, payloads, tag_all};
use crate::sequence::SequenceSpace;

/// Upper bound (inclusive) on fragments drawn per run.
pub const DEFAULT_MAX_DRAWS: usize = 10;

/// Which canonical fragment a chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdempotentKind {
    A,
    B,
}

/// The two canonical fragments for one sequence space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotentFragments {
    a: Fragment,
    b: Fragment,
    max_draws: usize,
}

impl IdempotentFragments {
    #[must_use]
    pub fn new(space: &SequenceSpace) -> Self {
        Self::with_max_draws(space, DEFAULT_MAX_DRAWS)
    }

    /// Like [`Self::new`] with a custom draw bound; values below 1 are raised to 1.
    #[must_use]
    pub fn with_max_draws(space: &SequenceSpace, max_draws: usize) -> Self {
        let sentinel = space.sentinel_value();
        let mut a = encode(space.correct());
        a.push(Record::data(sentinel, true));
        let b = vec![Record::data(sentinel, false)];
        Self {
            a,
            b,
            max_draws: max_draws.max(1),
        }
    }

    #[must_use]
    pub fn a(&self) -> &[Record] {
        &self.a
    }

    #[must_use]
    pub fn b(&self) -> &[Record] {
        &self.b
    }

    #[must_use]
    pub fn max_draws(&self) -> usize {
        self.max_draws
    }

    #[must_use]
    pub fn fragment(&self, kind: IdempotentKind) -> &[Record] {
        match kind {
            IdempotentKind::A => &self.a,
            IdempotentKind::B => &self.b,
        }
    }

    /// Build a run from an explicit draw order.
    #[must_use]
    pub fn run_from_kinds(&self, kinds: &[IdempotentKind]) -> IdempotentRun {
        IdempotentRun {
            chunks: kinds
                .iter()
                .map(|&kind| Chunk {
                    kind,
                    records: self.fragment(kind).to_vec(),
                })
                .collect(),
        }
    }

    /// Draw `k` uniform in `[1, max_draws]`, then `k` independent uniform
    /// picks from {A, B}.
    pub fn random_run<R: Rng>(&self, rng: &mut R) -> IdempotentRun {
        const KINDS: [IdempotentKind; 2] = [IdempotentKind::A, IdempotentKind::B];
        let draws = rng.random_range(1..=self.max_draws);
        let kinds: Vec<IdempotentKind> = (0..draws)
            .map(|_| *KINDS.choose(rng).unwrap_or(&IdempotentKind::B))
            .collect();
        tracing::trace!(draws, ?kinds, "drew idempotent run");
        self.run_from_kinds(&kinds)
    }
}

/// One drawn fragment inside a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub kind: IdempotentKind,
    pub records: Fragment,
}

/// An ordered concatenation of canonical fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotentRun {
    chunks: Vec<Chunk>,
}

impl IdempotentRun {
    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    #[must_use]
    pub fn kinds(&self) -> Vec<IdempotentKind> {
        self.chunks.iter().map(|c| c.kind).collect()
    }

    /// Flattened records in draw order.
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        self.chunks
            .iter()
            .flat_map(|c| c.records.iter().copied())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.iter().map(|c| c.records.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-encode each chunk's payloads as its own sequence.
    ///
    /// Every chunk's first record becomes start-marked and the rest unmarked,
    /// so an A chunk loses its trailing restart marker and a B chunk gains one.
    #[must_use]
    pub fn rebatched(&self) -> Vec<Record> {
        self.chunks
            .iter()
            .flat_map(|c| encode(&payloads(&c.records)))
            .collect()
    }

    /// [`Self::rebatched`] with `extra` attached to every record.
    #[must_use]
    pub fn rebatched_tagged(&self, extra: Assertion) -> Vec<Record> {
        tag_all(&self.rebatched(), extra)
    }
}
