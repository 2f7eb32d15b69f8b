//! Persisting a corpus.
//!
//! [`CorpusSink`] is the seam between generation and the outside world. File
//! sinks always truncate their target; the handle lives only for the duration
//! of one `persist` call.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::Result;
use crate::corpus::Corpus;
use crate::testbench::{Testbench, TestbenchOptions};

/// Default artifact path, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "output.yaml";

/// Destination for an assembled corpus.
pub trait CorpusSink {
    fn persist(&mut self, corpus: &Corpus) -> Result<()>;
}

fn write_truncating(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(contents.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Writes the corpus as YAML.
#[derive(Debug, Clone)]
pub struct YamlFileSink {
    path: PathBuf,
}

impl YamlFileSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for YamlFileSink {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_PATH)
    }
}

impl CorpusSink for YamlFileSink {
    fn persist(&mut self, corpus: &Corpus) -> Result<()> {
        let text = corpus.to_yaml()?;
        write_truncating(&self.path, &text)?;
        tracing::info!(path = %self.path.display(), bytes = text.len(), "wrote corpus");
        Ok(())
    }
}

/// Renders the corpus to a VHDL testbench file.
#[derive(Debug, Clone)]
pub struct TestbenchFileSink {
    path: PathBuf,
    options: TestbenchOptions,
}

impl TestbenchFileSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, options: TestbenchOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }
}

impl CorpusSink for TestbenchFileSink {
    fn persist(&mut self, corpus: &Corpus) -> Result<()> {
        let records = corpus.flatten();
        let text = Testbench::new(self.options.clone()).render(&records);
        write_truncating(&self.path, &text)?;
        tracing::info!(
            path = %self.path.display(),
            records = records.len(),
            "wrote testbench"
        );
        Ok(())
    }
}

/// Fans one corpus out to several sinks, stopping at the first failure.
#[derive(Default)]
pub struct SinkChain {
    sinks: Vec<Box<dyn CorpusSink>>,
}

impl SinkChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, sink: impl CorpusSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl CorpusSink for SinkChain {
    fn persist(&mut self, corpus: &Corpus) -> Result<()> {
        for sink in &mut self.sinks {
            sink.persist(corpus)?;
        }
        Ok(())
    }
}

/// Keeps the most recent corpus in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    last: Option<Corpus>,
    persisted: usize,
}

impl MemorySink {
    #[must_use]
    pub fn last(&self) -> Option<&Corpus> {
        self.last.as_ref()
    }

    #[must_use]
    pub fn persisted(&self) -> usize {
        self.persisted
    }
}

impl CorpusSink for MemorySink {
    fn persist(&mut self, corpus: &Corpus) -> Result<()> {
        self.last = Some(corpus.clone());
        self.persisted += 1;
        Ok(())
    }
}
