//! Error types for seqvec-core

use std::fmt::Write;
use std::path::PathBuf;
use thiserror::Error;

/// Remediation command for resolving an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemediationCommand {
    /// Short label describing the command purpose
    pub label: String,
    /// Command to run
    pub command: String,
}

/// Actionable remediation guidance for an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remediation {
    /// One-line summary of how to fix the issue
    pub summary: String,
    /// Suggested commands to resolve or diagnose the issue
    pub commands: Vec<RemediationCommand>,
    /// Additional alternative guidance
    pub alternatives: Vec<String>,
}

impl Remediation {
    /// Create a new remediation with a summary
    #[must_use]
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            commands: Vec::new(),
            alternatives: Vec::new(),
        }
    }

    /// Add a command
    #[must_use]
    pub fn command(mut self, label: impl Into<String>, command: impl Into<String>) -> Self {
        self.commands.push(RemediationCommand {
            label: label.into(),
            command: command.into(),
        });
        self
    }

    /// Add an alternative suggestion
    #[must_use]
    pub fn alternative(mut self, alternative: impl Into<String>) -> Self {
        self.alternatives.push(alternative.into());
        self
    }

    /// Render remediation text for human-readable output
    #[must_use]
    pub fn render_plain(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "To fix:");
        let _ = writeln!(output, "  {}", self.summary);

        if !self.commands.is_empty() {
            let _ = writeln!(output, "  Commands:");
            for cmd in &self.commands {
                let _ = writeln!(output, "    - {}: {}", cmd.label, cmd.command);
            }
        }

        if !self.alternatives.is_empty() {
            let _ = writeln!(output, "  Alternatives:");
            for alt in &self.alternatives {
                let _ = writeln!(output, "    - {alt}");
            }
        }

        output
    }
}

/// Result type alias using the library's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for seqvec-core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed stimulus documents (bad record arity, marker out of range, ...)
    #[error("Stimulus error: {0}")]
    Stimulus(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Return remediation guidance when available.
    #[must_use]
    pub fn remediation(&self) -> Option<Remediation> {
        match self {
            Self::Config(err) => Some(err.remediation()),
            Self::Stimulus(_) => Some(
                Remediation::new(
                    "Every record must be [channel, value, start] or [channel, value, start, [unlock, warning]] with 0/1 flags.",
                )
                .command("Regenerate corpus", "seqvec generate --output output.yaml")
                .alternative("Use the legacy `arr:` mapping if the file was written by hand."),
            ),
            Self::Io(_) => Some(
                Remediation::new("Check filesystem permissions and paths, then retry.")
                    .alternative("Verify the output directory exists and is writable."),
            ),
            Self::Yaml(_) => Some(
                Remediation::new("Validate the YAML document and retry.")
                    .command("Regenerate corpus", "seqvec generate")
                    .alternative("Check indentation and that every record is a flat list."),
            ),
            Self::Json(_) => None,
        }
    }
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error(
        "Sentinel value {sentinel} collides with correct-sequence value at position {position}"
    )]
    SentinelCollision { sentinel: u8, position: usize },
}

impl ConfigError {
    #[must_use]
    pub fn remediation(&self) -> Remediation {
        match self {
            Self::ReadFailed { path, .. } => Remediation::new(format!(
                "Check that the config file exists and is readable: {}",
                path.display()
            ))
            .command("Inspect", format!("ls -la \"{}\"", path.display()))
            .alternative("Omit --config to run with built-in defaults."),
            Self::ParseFailed(_) => Remediation::new("Fix the TOML syntax in the config file.")
                .alternative("Compare against the documented [sequence]/[generation]/[output] tables."),
            Self::Invalid(_) => Remediation::new("Correct the offending config value and retry.")
                .alternative("Remove the key to fall back to its default."),
            Self::SentinelCollision { sentinel, .. } => Remediation::new(format!(
                "Pick a sentinel value that does not appear in the correct sequence (current: {sentinel})."
            ))
            .alternative("The default sentinel 255 is safe for the default correct sequence."),
        }
    }
}

/// Format an error with its remediation block, if any.
#[must_use]
pub fn format_error_with_remediation(err: &Error) -> String {
    let mut output = format!("Error: {err}\n");
    if let Some(remediation) = err.remediation() {
        output.push('\n');
        output.push_str(&remediation.render_plain());
    }
    output
}
