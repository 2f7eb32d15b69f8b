//! Channel-write records and the record encoder.
//!
//! A [`Record`] is one clock cycle of stimulus: which line is driven
//! (data channel or reset), the byte on the data bus, and whether this write
//! starts a new sequence. Records optionally carry an [`Assertion`] on the
//! recognizer outputs expected after the cycle.
//!
//! On the wire (YAML) a record is a flat list:
//!
//! ```text
//! [channel, value, start]                      basic
//! [channel, value, start, [unlock, warning]]   tagged
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sequence::Value;

/// Channel used for every data write.
pub const DATA_CHANNEL: u8 = 0;

/// Channel that drives the recognizer's reset line.
pub const RESET_CHANNEL: u8 = 1;

// =============================================================================
// Assertion
// =============================================================================

/// Expected recognizer outputs after a record is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Assertion {
    pub unlock: bool,
    pub warning: bool,
}

impl Assertion {
    /// `[0, 0]`: neither output asserted.
    pub const QUIET: Self = Self {
        unlock: false,
        warning: false,
    };

    /// `[0, 1]`: warning raised, not unlocked.
    pub const WARNING: Self = Self {
        unlock: false,
        warning: true,
    };

    /// `[1, 0]`: unlocked, no warning.
    pub const UNLOCK: Self = Self {
        unlock: true,
        warning: false,
    };

    #[must_use]
    pub fn as_pair(self) -> [u8; 2] {
        [u8::from(self.unlock), u8::from(self.warning)]
    }

    pub fn from_pair(pair: [u8; 2]) -> Result<Self, String> {
        Ok(Self {
            unlock: flag(pair[0], "unlock")?,
            warning: flag(pair[1], "warning")?,
        })
    }
}

fn flag(raw: u8, field: &str) -> Result<bool, String> {
    match raw {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(format!("{field} flag must be 0 or 1, got {other}")),
    }
}

// =============================================================================
// Record
// =============================================================================

/// One channel write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "RawRecord", try_from = "RawRecord")]
pub enum Record {
    Basic {
        channel: u8,
        value: Value,
        start: bool,
    },
    Tagged {
        channel: u8,
        value: Value,
        start: bool,
        extra: Assertion,
    },
}

impl Record {
    /// Data-channel write.
    #[must_use]
    pub fn data(value: Value, start: bool) -> Self {
        Self::Basic {
            channel: DATA_CHANNEL,
            value,
            start,
        }
    }

    /// The `[1, 0, 0]` reset pulse.
    #[must_use]
    pub fn reset() -> Self {
        Self::Basic {
            channel: RESET_CHANNEL,
            value: 0,
            start: false,
        }
    }

    #[must_use]
    pub fn channel(&self) -> u8 {
        match *self {
            Self::Basic { channel, .. } | Self::Tagged { channel, .. } => channel,
        }
    }

    #[must_use]
    pub fn value(&self) -> Value {
        match *self {
            Self::Basic { value, .. } | Self::Tagged { value, .. } => value,
        }
    }

    #[must_use]
    pub fn start(&self) -> bool {
        match *self {
            Self::Basic { start, .. } | Self::Tagged { start, .. } => start,
        }
    }

    pub fn set_start(&mut self, marker: bool) {
        match self {
            Self::Basic { start, .. } | Self::Tagged { start, .. } => *start = marker,
        }
    }

    /// Attached assertion, if any.
    #[must_use]
    pub fn extra(&self) -> Option<Assertion> {
        match *self {
            Self::Basic { .. } => None,
            Self::Tagged { extra, .. } => Some(extra),
        }
    }

    #[must_use]
    pub fn is_reset(&self) -> bool {
        self.channel() != DATA_CHANNEL
    }

    /// Same write with `extra` attached (replacing any previous assertion).
    #[must_use]
    pub fn with_extra(self, extra: Assertion) -> Self {
        Self::Tagged {
            channel: self.channel(),
            value: self.value(),
            start: self.start(),
            extra,
        }
    }

    /// Same write without an assertion.
    #[must_use]
    pub fn untagged(self) -> Self {
        Self::Basic {
            channel: self.channel(),
            value: self.value(),
            start: self.start(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}",
            self.channel(),
            self.value(),
            u8::from(self.start())
        )?;
        if let Some(extra) = self.extra() {
            let [u, w] = extra.as_pair();
            write!(f, ", [{u}, {w}]")?;
        }
        f.write_str("]")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawRecord {
    Basic(u8, u8, u8),
    Tagged(u8, u8, u8, [u8; 2]),
}

impl From<Record> for RawRecord {
    fn from(record: Record) -> Self {
        let start = u8::from(record.start());
        match record.extra() {
            None => Self::Basic(record.channel(), record.value(), start),
            Some(extra) => Self::Tagged(record.channel(), record.value(), start, extra.as_pair()),
        }
    }
}

impl TryFrom<RawRecord> for Record {
    type Error = String;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let (channel, value, start, extra) = match raw {
            RawRecord::Basic(c, v, s) => (c, v, s, None),
            RawRecord::Tagged(c, v, s, pair) => (c, v, s, Some(pair)),
        };
        if channel != DATA_CHANNEL && channel != RESET_CHANNEL {
            return Err(format!(
                "channel must be {DATA_CHANNEL} (data) or {RESET_CHANNEL} (reset), got {channel}"
            ));
        }
        let start = flag(start, "start")?;
        let basic = Self::Basic {
            channel,
            value,
            start,
        };
        match extra {
            None => Ok(basic),
            Some(pair) => Ok(basic.with_extra(Assertion::from_pair(pair)?)),
        }
    }
}

// =============================================================================
// Encoder
// =============================================================================

/// Records for one encoded sequence.
pub type Fragment = Vec<Record>;

/// Encode values as data writes: the first is start-marked, the rest are not.
///
/// Pure; the output has one record per input value.
#[must_use]
pub fn encode(values: &[Value]) -> Fragment {
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| Record::data(value, i == 0))
        .collect()
}

/// Encode values and attach `assertion` to every record.
#[must_use]
pub fn encode_with_assertion(values: &[Value], assertion: Assertion) -> Fragment {
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| Record::data(value, i == 0).with_extra(assertion))
        .collect()
}

/// Copy `records`, attaching `extra` to each.
#[must_use]
pub fn tag_all(records: &[Record], extra: Assertion) -> Vec<Record> {
    records.iter().map(|r| r.with_extra(extra)).collect()
}

/// Payload bytes of `records`, in order.
#[must_use]
pub fn payloads(records: &[Record]) -> Vec<Value> {
    records.iter().map(Record::value).collect()
}
