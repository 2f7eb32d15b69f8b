//! seqvec-core: Core library for seqvec
//!
//! Generates test vectors for a five-value sequence recognizer: boundary and
//! noise sequences, channel-write records, idempotent filler, named scenarios,
//! and the assembled corpus handed to a sink.
//!
//! # Architecture
//!
//! ```text
//! SequenceSpace → SequenceMutator → encode → IdempotentFragments
//!                                              ↓
//!                            ScenarioComposer → CorpusAssembler → CorpusSink
//!                                                                 ↓
//!                                              YAML / VHDL testbench / replay
//! ```
//!
//! # Modules
//!
//! - `sequence`: reference sequences and the sequence mutator
//! - `record`: channel-write records and the encoder
//! - `idempotent`: canonical no-op fragments and random filler runs
//! - `scenario`: `go_to_warning1`, `go_to_warning2` and `reset`
//! - `corpus`: stimulus tree and corpus assembly
//! - `sink`: YAML and testbench file sinks
//! - `testbench`: VHDL testbench rendering and stimulus document parsing
//! - `replay`: reference recognizer model for replay checks
//! - `config`: configuration management
//! - `logging`: tracing setup
//!
//! # Safety
//!
//! This crate forbids unsafe code.

#![forbid(unsafe_code)]

pub mod config;
pub mod corpus;
pub mod error;
pub mod idempotent;
pub mod logging;
pub mod record;
pub mod replay;
pub mod scenario;
pub mod sequence;
pub mod sink;
pub mod testbench;

pub use error::{ConfigError, Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
