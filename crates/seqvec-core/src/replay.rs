//! Reference model of the sequence recognizer, for replaying stimulus.
//!
//! The model is deliberately small:
//!
//! - A reset-channel record clears everything.
//! - Once `warning` is latched every other record is ignored (lockout).
//! - A start-marked write begins a new attempt, silently dropping any partial
//!   one. Unmarked writes extend the current attempt, or are ignored when
//!   there is none.
//! - The fifth value completes the attempt. A correct attempt pulses `unlock`
//!   for that cycle and clears the failure count; a wrong one counts a
//!   failure, and [`LOCKOUT_FAILURES`] failures latch `warning`.
//!
//! [`ReferenceChecker::replay`] runs a record stream and compares the model's
//! outputs against every attached assertion.

use serde::{Deserialize, Serialize};

use crate::record::{Assertion, Record};
use crate::sequence::{SEQUENCE_LEN, SequenceSpace, Value};

/// Consecutive failed attempts that latch the warning output.
pub const LOCKOUT_FAILURES: u8 = 3;

/// Recognizer outputs for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Outputs {
    pub unlock: bool,
    pub warning: bool,
}

impl From<Outputs> for Assertion {
    fn from(o: Outputs) -> Self {
        Self {
            unlock: o.unlock,
            warning: o.warning,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReferenceChecker<'a> {
    space: &'a SequenceSpace,
    attempt: Vec<Value>,
    in_attempt: bool,
    failures: u8,
    warning: bool,
}

impl<'a> ReferenceChecker<'a> {
    #[must_use]
    pub fn new(space: &'a SequenceSpace) -> Self {
        Self {
            space,
            attempt: Vec::with_capacity(SEQUENCE_LEN),
            in_attempt: false,
            failures: 0,
            warning: false,
        }
    }

    /// Externally observable state: the latched warning output.
    #[must_use]
    pub fn observable(&self) -> bool {
        self.warning
    }

    #[must_use]
    pub fn failures(&self) -> u8 {
        self.failures
    }

    /// No attempt is in progress.
    #[must_use]
    pub fn is_quiescent(&self) -> bool {
        !self.in_attempt
    }

    /// Apply one record and return the outputs after that cycle.
    pub fn step(&mut self, record: &Record) -> Outputs {
        if record.is_reset() {
            self.attempt.clear();
            self.in_attempt = false;
            self.failures = 0;
            self.warning = false;
            return self.outputs(false);
        }
        if self.warning {
            return self.outputs(false);
        }

        if record.start() {
            self.attempt.clear();
            self.in_attempt = true;
        } else if !self.in_attempt {
            return self.outputs(false);
        }
        self.attempt.push(record.value());
        if self.attempt.len() < SEQUENCE_LEN {
            return self.outputs(false);
        }

        self.in_attempt = false;
        if self.space.is_correct(&self.attempt) {
            self.failures = 0;
            self.outputs(true)
        } else {
            self.failures = self.failures.saturating_add(1);
            if self.failures >= LOCKOUT_FAILURES {
                self.warning = true;
            }
            self.outputs(false)
        }
    }

    fn outputs(&self, unlock: bool) -> Outputs {
        Outputs {
            unlock,
            warning: self.warning,
        }
    }

    /// Step through `records`, checking attached assertions.
    pub fn replay(&mut self, records: &[Record]) -> ReplayReport {
        let mut report = ReplayReport::default();
        for (index, record) in records.iter().enumerate() {
            let outputs = self.step(record);
            report.steps += 1;
            report.unlocks += usize::from(outputs.unlock);
            if let Some(expected) = record.extra() {
                report.assertions += 1;
                let actual = Assertion::from(outputs);
                if actual != expected {
                    report.mismatches.push(AssertionMismatch {
                        index,
                        expected: expected.as_pair(),
                        actual: actual.as_pair(),
                    });
                }
            }
        }
        report.final_warning = self.warning;
        tracing::debug!(
            steps = report.steps,
            assertions = report.assertions,
            mismatches = report.mismatches.len(),
            "replay finished"
        );
        report
    }
}

/// One failed assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionMismatch {
    /// Position in the flattened record stream.
    pub index: usize,
    /// `[unlock, warning]` expected by the record.
    pub expected: [u8; 2],
    /// `[unlock, warning]` produced by the model.
    pub actual: [u8; 2],
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub steps: usize,
    pub assertions: usize,
    pub unlocks: usize,
    pub final_warning: bool,
    pub mismatches: Vec<AssertionMismatch>,
}

impl ReplayReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::encode;

    #[test]
    fn correct_sequence_pulses_unlock() {
        let space = SequenceSpace::default();
        let mut checker = ReferenceChecker::new(&space);
        let outs: Vec<Outputs> = encode(space.correct())
            .iter()
            .map(|r| checker.step(r))
            .collect();
        assert!(outs[..4].iter().all(|o| !o.unlock));
        assert!(outs[4].unlock);
        assert!(checker.is_quiescent());
    }

    #[test]
    fn three_wrong_attempts_latch_warning() {
        let space = SequenceSpace::default();
        let mut checker = ReferenceChecker::new(&space);
        for attempt in 0..3 {
            assert!(!checker.observable(), "attempt {attempt}");
            for r in encode(space.sentinel()) {
                checker.step(&r);
            }
        }
        assert!(checker.observable());
        assert_eq!(checker.failures(), 3);

        // Lockout: even the correct sequence is ignored.
        let unlocked = encode(space.correct())
            .iter()
            .any(|r| checker.step(r).unlock);
        assert!(!unlocked);

        checker.step(&Record::reset());
        assert!(!checker.observable());
        assert_eq!(checker.failures(), 0);
    }

    #[test]
    fn correct_attempt_clears_failures() {
        let space = SequenceSpace::default();
        let mut checker = ReferenceChecker::new(&space);
        for r in encode(space.sentinel()).iter().chain(&encode(space.sentinel())) {
            checker.step(r);
        }
        assert_eq!(checker.failures(), 2);
        for r in encode(space.correct()) {
            checker.step(&r);
        }
        assert_eq!(checker.failures(), 0);
    }

    #[test]
    fn unmarked_writes_outside_attempt_are_ignored() {
        let space = SequenceSpace::default();
        let mut checker = ReferenceChecker::new(&space);
        for v in space.correct() {
            checker.step(&Record::data(*v, false));
        }
        assert!(checker.is_quiescent());
        assert_eq!(checker.failures(), 0);
    }

    #[test]
    fn restart_abandons_partial_attempt() {
        let space = SequenceSpace::default();
        let mut checker = ReferenceChecker::new(&space);
        checker.step(&Record::data(1, true));
        checker.step(&Record::data(2, false));
        let unlocked = encode(space.correct())
            .iter()
            .any(|r| checker.step(r).unlock);
        assert!(unlocked);
        assert_eq!(checker.failures(), 0);
    }

    #[test]
    fn replay_reports_mismatches() {
        let space = SequenceSpace::default();
        let mut records = encode(space.correct());
        records[4] = records[4].with_extra(Assertion::UNLOCK);
        records.push(Record::data(255, false).with_extra(Assertion::WARNING));

        let report = ReferenceChecker::new(&space).replay(&records);
        assert_eq!(report.steps, 6);
        assert_eq!(report.assertions, 2);
        assert_eq!(report.unlocks, 1);
        assert_eq!(
            report.mismatches,
            vec![AssertionMismatch {
                index: 5,
                expected: [0, 1],
                actual: [0, 0],
            }]
        );
        assert!(!report.passed());
    }
}
