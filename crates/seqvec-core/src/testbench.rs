//! VHDL testbench rendering.
//!
//! Turns a flat record stream into a self-contained simulation testbench for
//! the sequence recognizer entity. Each record drives `reset`, `number` and
//! `first` for one clock period; tagged records also assert the `unlock` and
//! `warning` outputs after that period.
//!
//! Stimulus documents come in two shapes, both accepted by
//! [`StimulusDocument::from_yaml`]:
//!
//! ```yaml
//! # corpus form (what `seqvec generate` writes)
//! - - [0, 255, 1]
//!   - [0, 255, 0]
//! - [1, 0, 0]
//! ```
//!
//! ```yaml
//! # hand-written form
//! arr:
//!   - [0, 36, 1, [0, 0]]
//!   - [0, 19, 0]
//! ```

use std::fmt::Write;

use serde::Deserialize;

use crate::Result;
use crate::corpus::{Corpus, Stimulus};
use crate::record::Record;

/// Entity name of the device under test.
pub const DEFAULT_ENTITY: &str = "SequenceRecognizer";

/// Clock period used by the generated clock process.
pub const DEFAULT_CLOCK_PERIOD_NS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestbenchOptions {
    pub entity: String,
    pub clock_period_ns: u32,
}

impl Default for TestbenchOptions {
    fn default() -> Self {
        Self {
            entity: DEFAULT_ENTITY.to_string(),
            clock_period_ns: DEFAULT_CLOCK_PERIOD_NS,
        }
    }
}

/// A parsed stimulus file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StimulusDocument {
    Corpus(Corpus),
    Legacy { arr: Vec<Stimulus> },
}

impl StimulusDocument {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| {
            crate::Error::Stimulus(format!("not a corpus or `arr:` stimulus document: {e}"))
        })
    }

    /// Records in replay order.
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        match self {
            Self::Corpus(corpus) => corpus.flatten(),
            Self::Legacy { arr } => Corpus::new(arr.clone()).flatten(),
        }
    }
}

/// VHDL testbench renderer.
#[derive(Debug, Clone, Default)]
pub struct Testbench {
    options: TestbenchOptions,
}

impl Testbench {
    #[must_use]
    pub fn new(options: TestbenchOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &TestbenchOptions {
        &self.options
    }

    /// Render a complete testbench driving `records` in order.
    #[must_use]
    pub fn render(&self, records: &[Record]) -> String {
        let mut out = self.preamble();
        for record in records {
            render_record(&mut out, record);
        }
        out.push_str("        wait;\n    end process;\nend behavior;\n");
        out
    }

    fn preamble(&self) -> String {
        let entity = &self.options.entity;
        let period = self.options.clock_period_ns;
        format!(
            r#"LIBRARY IEEE;
USE IEEE.STD_LOGIC_1164.ALL;
USE IEEE.NUMERIC_STD.ALL;

ENTITY {entity}_tb IS
END {entity}_tb;

ARCHITECTURE behavior OF {entity}_tb IS

    COMPONENT {entity}
    PORT(
        clk : IN std_logic;
        reset : IN std_logic;
        number : IN std_logic_vector(7 DOWNTO 0);
        first : IN std_logic;
        unlock : OUT std_logic;
        warning : OUT std_logic
    );
    END COMPONENT;

    signal clk : std_logic := '0';
    signal reset : std_logic := '0';
    signal number : std_logic_vector(7 DOWNTO 0) := (others => '0');
    signal first : std_logic := '0';

    signal unlock : std_logic;
    signal warning : std_logic;

    constant CLK_PERIOD : time := {period} ns;

BEGIN

    uut: {entity} PORT MAP (
        clk => clk,
        reset => reset,
        number => number,
        first => first,
        unlock => unlock,
        warning => warning
    );

    clk_process: process
    begin
        clk <= '0';
        wait for CLK_PERIOD/2;
        clk <= '1';
        wait for CLK_PERIOD/2;
    end process;

    stim_proc: process
    begin
        reset <= '1';
        wait for CLK_PERIOD;
"#
        )
    }
}

fn bit(b: bool) -> char {
    if b { '1' } else { '0' }
}

fn render_record(out: &mut String, record: &Record) {
    let _ = writeln!(out);
    let _ = writeln!(out, "        reset <= '{}';", bit(record.is_reset()));
    let _ = writeln!(out, "        number <= x\"{:02x}\";", record.value());
    let _ = writeln!(out, "        first <= '{}';", bit(record.start()));
    let _ = writeln!(out, "        wait for CLK_PERIOD;");
    if let Some(extra) = record.extra() {
        let _ = writeln!(
            out,
            "        assert unlock = '{}' report \"Unlock error\" severity error;",
            bit(extra.unlock)
        );
        let _ = writeln!(
            out,
            "        assert warning = '{}' report \"Warning error\" severity error;",
            bit(extra.warning)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Assertion;

    const LEGACY: &str = r#"
arr:
    - [0, 36, 1, [0, 0]]
    - [0, 19, 0]
    - [0, 56, 0]
    - [0, 101, 0]
    - [0, 73, 0, [1, 0]]
    - [0, 255, 0, [0, 0]]
"#;

    #[test]
    fn parse_legacy_document() {
        let doc = StimulusDocument::from_yaml(LEGACY).unwrap();
        assert!(matches!(doc, StimulusDocument::Legacy { .. }));
        let records = doc.records();
        assert_eq!(records.len(), 6);
        assert_eq!(records[4].extra(), Some(Assertion::UNLOCK));
        assert_eq!(records[1].extra(), None);
    }

    #[test]
    fn parse_corpus_document() {
        let doc = StimulusDocument::from_yaml("- - [0, 255, 1]\n  - [0, 255, 0]\n- [1, 0, 0]\n")
            .unwrap();
        assert!(matches!(doc, StimulusDocument::Corpus(_)));
        assert_eq!(doc.records().len(), 3);
        assert!(doc.records()[2].is_reset());
    }

    #[test]
    fn garbage_is_a_stimulus_error() {
        let err = StimulusDocument::from_yaml("arr: 7").unwrap_err();
        assert!(matches!(err, crate::Error::Stimulus(_)));
    }

    #[test]
    fn render_counts_cycles_and_asserts() {
        let records = StimulusDocument::from_yaml(LEGACY).unwrap().records();
        let tb = Testbench::default().render(&records);
        assert_eq!(tb.matches("wait for CLK_PERIOD;").count(), 1 + records.len());
        assert_eq!(tb.matches("assert unlock").count(), 3);
        assert_eq!(tb.matches("assert warning").count(), 3);
        assert!(tb.contains("number <= x\"65\";"));
        assert!(tb.contains("assert unlock = '1'"));
        assert!(tb.trim_end().ends_with("end behavior;"));
    }

    #[test]
    fn render_reset_record() {
        let tb = Testbench::default().render(&[Record::reset()]);
        assert!(tb.contains("reset <= '1';\n        number <= x\"00\";\n        first <= '0';"));
    }

    #[test]
    fn options_change_entity_and_period() {
        let tb = Testbench::new(TestbenchOptions {
            entity: "Lock".to_string(),
            clock_period_ns: 20,
        })
        .render(&[]);
        assert!(tb.contains("ENTITY Lock_tb IS"));
        assert!(tb.contains("uut: Lock PORT MAP"));
        assert!(tb.contains("constant CLK_PERIOD : time := 20 ns;"));
    }
}
