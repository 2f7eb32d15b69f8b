//! Named scenario generators.
//!
//! Each scenario is an ordered record list meant to drive the recognizer to a
//! specific outcome:
//!
//! | name             | intent                                              |
//! |------------------|-----------------------------------------------------|
//! | `go_to_warning1` | three wrong attempts, then warning-tagged filler     |
//! | `go_to_warning2` | correct values with broken start markers, filler    |
//! | `reset`          | a single reset pulse                                |
//!
//! The warning scenarios carry `[0, 1]` assertions on their filler records so
//! a testbench can check the warning output while the filler replays.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::idempotent::IdempotentFragments;
use crate::record::{Assertion, Fragment, Record, encode};
use crate::sequence::{SEQUENCE_LEN, SequenceSpace};

/// Number of wrong attempts in `go_to_warning1`.
pub const WARNING_ATTEMPTS: usize = 3;

/// Assertion attached to filler records of the warning scenarios.
pub const FILLER_ASSERTION: Assertion = Assertion::WARNING;

/// Scenario identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    #[serde(rename = "go_to_warning1")]
    GoToWarning1,
    #[serde(rename = "go_to_warning2")]
    GoToWarning2,
    Reset,
}

impl ScenarioKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::GoToWarning1 => "go_to_warning1",
            Self::GoToWarning2 => "go_to_warning2",
            Self::Reset => "reset",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A composed scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub kind: ScenarioKind,
    pub records: Vec<Record>,
}

impl Scenario {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Suppress the fragment's own start marker and inject one at `index`.
///
/// `index` is clamped into `1..len`; fragments shorter than two records only
/// lose their start marker.
#[must_use]
pub fn override_start_markers(mut fragment: Fragment, index: usize) -> Fragment {
    if let Some(first) = fragment.first_mut() {
        first.set_start(false);
    }
    if fragment.len() > 1 {
        let index = index.clamp(1, fragment.len() - 1);
        fragment[index].set_start(true);
    }
    fragment
}

/// Builds scenarios from one sequence space.
#[derive(Debug, Clone)]
pub struct ScenarioComposer<'a> {
    space: &'a SequenceSpace,
    filler: IdempotentFragments,
}

impl<'a> ScenarioComposer<'a> {
    #[must_use]
    pub fn new(space: &'a SequenceSpace) -> Self {
        Self {
            space,
            filler: IdempotentFragments::new(space),
        }
    }

    #[must_use]
    pub fn with_filler(space: &'a SequenceSpace, filler: IdempotentFragments) -> Self {
        Self { space, filler }
    }

    #[must_use]
    pub fn space(&self) -> &SequenceSpace {
        self.space
    }

    #[must_use]
    pub fn filler(&self) -> &IdempotentFragments {
        &self.filler
    }

    /// Three wrong attempts followed by warning-tagged filler.
    pub fn warning_scenario1<R: Rng>(&self, rng: &mut R) -> Scenario {
        let mut records = Vec::new();
        for _ in 0..WARNING_ATTEMPTS {
            records.extend(encode(self.space.sentinel()));
        }
        let run = self.filler.random_run(rng);
        records.extend(run.rebatched_tagged(FILLER_ASSERTION));
        self.finish(ScenarioKind::GoToWarning1, records)
    }

    /// Correct values with the start marker moved to a random later index,
    /// then tagged filler, then the same filler again without tags.
    pub fn warning_scenario2<R: Rng>(&self, rng: &mut R) -> Scenario {
        let index = rng.random_range(1..SEQUENCE_LEN);
        self.warning_scenario2_at(index, rng)
    }

    /// [`Self::warning_scenario2`] with a fixed injected start index.
    pub fn warning_scenario2_at<R: Rng>(&self, index: usize, rng: &mut R) -> Scenario {
        let mut records = override_start_markers(encode(self.space.correct()), index);
        let run = self.filler.random_run(rng);
        records.extend(run.rebatched_tagged(FILLER_ASSERTION));
        // Same filler again, untagged.
        records.extend(run.rebatched());
        tracing::trace!(index, "injected spurious start marker");
        self.finish(ScenarioKind::GoToWarning2, records)
    }

    /// The single `[1, 0, 0]` reset pulse.
    #[must_use]
    pub fn reset_scenario(&self) -> Scenario {
        self.finish(ScenarioKind::Reset, vec![Record::reset()])
    }

    fn finish(&self, kind: ScenarioKind, records: Vec<Record>) -> Scenario {
        tracing::debug!(scenario = %kind, records = records.len(), "composed scenario");
        Scenario { kind, records }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn starts(records: &[Record]) -> Vec<u8> {
        records.iter().map(|r| u8::from(r.start())).collect()
    }

    #[test]
    fn override_at_two() {
        let frag = override_start_markers(encode(&[36, 19, 56, 101, 73]), 2);
        assert_eq!(starts(&frag), vec![0, 0, 1, 0, 0]);
    }

    #[test]
    fn override_clamps_index() {
        let frag = override_start_markers(encode(&[1, 2, 3]), 0);
        assert_eq!(starts(&frag), vec![0, 1, 0]);
        let frag = override_start_markers(encode(&[1, 2, 3]), 99);
        assert_eq!(starts(&frag), vec![0, 0, 1]);
        let frag = override_start_markers(encode(&[1]), 3);
        assert_eq!(starts(&frag), vec![0]);
    }

    #[test]
    fn warning1_layout() {
        let space = SequenceSpace::default();
        let composer = ScenarioComposer::new(&space);
        let mut rng = StdRng::seed_from_u64(5);
        let scenario = composer.warning_scenario1(&mut rng);
        assert_eq!(scenario.kind, ScenarioKind::GoToWarning1);

        let (attempts, filler) = scenario.records.split_at(3 * SEQUENCE_LEN);
        for chunk in attempts.chunks(SEQUENCE_LEN) {
            assert_eq!(chunk, encode(space.sentinel()).as_slice());
        }
        assert!(!filler.is_empty());
        assert!(filler.iter().all(|r| r.extra() == Some(FILLER_ASSERTION)));
        assert!(filler[0].start());
    }

    #[test]
    fn warning2_duplicates_filler_untagged() {
        let space = SequenceSpace::default();
        let composer = ScenarioComposer::new(&space);
        let mut rng = StdRng::seed_from_u64(9);
        let scenario = composer.warning_scenario2_at(2, &mut rng);

        let (head, rest) = scenario.records.split_at(SEQUENCE_LEN);
        assert_eq!(starts(head), vec![0, 0, 1, 0, 0]);
        assert_eq!(rest.len() % 2, 0);
        let (tagged, untagged) = rest.split_at(rest.len() / 2);
        assert!(tagged.iter().all(|r| r.extra() == Some(FILLER_ASSERTION)));
        assert!(untagged.iter().all(|r| r.extra().is_none()));
        let stripped: Vec<Record> = tagged.iter().map(|r| r.untagged()).collect();
        assert_eq!(stripped, untagged);
    }

    #[test]
    fn reset_is_constant() {
        let space = SequenceSpace::default();
        let composer = ScenarioComposer::new(&space);
        assert_eq!(composer.reset_scenario(), composer.reset_scenario());
        assert_eq!(composer.reset_scenario().records, vec![Record::reset()]);
    }

    #[test]
    fn kind_names() {
        assert_eq!(ScenarioKind::GoToWarning1.to_string(), "go_to_warning1");
        assert_eq!(ScenarioKind::GoToWarning2.name(), "go_to_warning2");
        assert_eq!(
            serde_json::to_string(&ScenarioKind::Reset).unwrap(),
            "\"reset\""
        );
    }
}
