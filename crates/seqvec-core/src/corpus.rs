//! Corpus assembly.
//!
//! The emitted document is a fixed four-element list:
//!
//! ```text
//! [ go_to_warning1 records,
//!   reset record,
//!   [ go_to_warning2 records ],
//!   reset record ]
//! ```
//!
//! The second warning scenario is wrapped in one extra level of nesting; the
//! consumer distinguishes records purely by list position, so the shape is
//! part of the contract. [`Corpus::flatten`] walks the tree depth-first for
//! consumers that want a plain stimulus stream.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::record::Record;
use crate::scenario::ScenarioComposer;
use crate::sequence::SequenceSpace;
use crate::sink::CorpusSink;

/// Number of top-level entries in an assembled corpus.
pub const CORPUS_ENTRIES: usize = 4;

/// A node of the stimulus tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stimulus {
    Record(Record),
    Group(Vec<Stimulus>),
}

impl Stimulus {
    /// Group of plain records.
    #[must_use]
    pub fn group(records: Vec<Record>) -> Self {
        Self::Group(records.into_iter().map(Self::Record).collect())
    }

    fn flatten_into(&self, out: &mut Vec<Record>) {
        match self {
            Self::Record(r) => out.push(*r),
            Self::Group(children) => {
                for child in children {
                    child.flatten_into(out);
                }
            }
        }
    }
}

impl fmt::Display for Stimulus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record(r) => write!(f, "{r}"),
            Self::Group(children) => write_list(f, children),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Stimulus]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}

/// The full emitted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Corpus {
    entries: Vec<Stimulus>,
}

impl Corpus {
    #[must_use]
    pub fn new(entries: Vec<Stimulus>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[Stimulus] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All records, depth-first in document order.
    #[must_use]
    pub fn flatten(&self) -> Vec<Record> {
        let mut out = Vec::new();
        for entry in &self.entries {
            entry.flatten_into(&mut out);
        }
        out
    }

    /// Parse a corpus from YAML.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Serialize as a YAML document.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl fmt::Display for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, &self.entries)
    }
}

/// Builds corpora in the fixed scenario order.
#[derive(Debug, Clone)]
pub struct CorpusAssembler<'a> {
    composer: ScenarioComposer<'a>,
}

impl<'a> CorpusAssembler<'a> {
    #[must_use]
    pub fn new(space: &'a SequenceSpace) -> Self {
        Self {
            composer: ScenarioComposer::new(space),
        }
    }

    #[must_use]
    pub fn with_composer(composer: ScenarioComposer<'a>) -> Self {
        Self { composer }
    }

    #[must_use]
    pub fn composer(&self) -> &ScenarioComposer<'a> {
        &self.composer
    }

    /// Compose every scenario and assemble the four-entry corpus.
    pub fn build<R: Rng>(&self, rng: &mut R) -> Corpus {
        let warning1 = self.composer.warning_scenario1(rng);
        let reset = self.composer.reset_scenario().records[0];
        let warning2 = self.composer.warning_scenario2(rng);

        let corpus = Corpus::new(vec![
            Stimulus::group(warning1.records),
            Stimulus::Record(reset),
            Stimulus::Group(vec![Stimulus::group(warning2.records)]),
            Stimulus::Record(reset),
        ]);
        tracing::debug!(
            entries = corpus.len(),
            records = corpus.flatten().len(),
            "assembled corpus"
        );
        corpus
    }

    /// Build a corpus and hand it, unmodified, to `sink`.
    pub fn assemble_into<R: Rng, S: CorpusSink + ?Sized>(
        &self,
        rng: &mut R,
        sink: &mut S,
    ) -> Result<Corpus> {
        let corpus = self.build(rng);
        sink.persist(&corpus)?;
        Ok(corpus)
    }
}
