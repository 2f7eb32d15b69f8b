//! seqvec CLI
//!
//! Generates, renders and replays sequence-recognizer test vectors.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;

use seqvec_core::config::Config;
use seqvec_core::corpus::{Corpus, CorpusAssembler, Stimulus};
use seqvec_core::error::format_error_with_remediation;
use seqvec_core::idempotent::IdempotentFragments;
use seqvec_core::logging::{LogConfig, LogFormat, init_logging};
use seqvec_core::record::encode;
use seqvec_core::replay::{ReferenceChecker, ReplayReport};
use seqvec_core::scenario::ScenarioComposer;
use seqvec_core::sequence::{SequenceMutator, SequenceSpace};
use seqvec_core::sink::{CorpusSink, SinkChain, TestbenchFileSink, YamlFileSink};
use seqvec_core::testbench::{
    DEFAULT_CLOCK_PERIOD_NS, DEFAULT_ENTITY, StimulusDocument, Testbench, TestbenchOptions,
};
use seqvec_core::{ConfigError, Error};

#[derive(Parser, Debug)]
#[command(name = "seqvec", version, about = "Sequence-recognizer test vector generator")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct GlobalArgs {
    /// Configuration file path (TOML)
    #[arg(long = "config", global = true, env = "SEQVEC_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long = "log-level", global = true)]
    log_level: Option<String>,

    /// Log format: pretty, json
    #[arg(long = "log-format", global = true)]
    log_format: Option<LogFormat>,

    /// Also append log events to this file
    #[arg(long = "log-file", global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a corpus and write it as YAML
    Generate(GenerateArgs),

    /// Render a stimulus document as a VHDL testbench
    Testbench(TestbenchArgs),

    /// Replay a stimulus document through the reference recognizer
    Check(CheckArgs),

    /// Print mutated sequences
    Mutate(MutateArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Corpus output path (defaults to output.path from config)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// RNG seed for a reproducible corpus
    #[arg(long = "seed")]
    seed: Option<u64>,

    /// Also render the corpus to a VHDL testbench at this path
    #[arg(long = "testbench")]
    testbench: Option<PathBuf>,

    /// Do not print the corpus to stdout
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

#[derive(Args, Debug)]
struct TestbenchArgs {
    /// Stimulus document (corpus or `arr:` form)
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Output path; stdout when omitted
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Entity name of the device under test
    #[arg(long = "entity", default_value = DEFAULT_ENTITY)]
    entity: String,

    /// Clock period in nanoseconds
    #[arg(long = "clock-period-ns", default_value_t = DEFAULT_CLOCK_PERIOD_NS)]
    clock_period_ns: u32,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Stimulus document (corpus or `arr:` form)
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Report format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = ReportFormat::Plain)]
    format: ReportFormat,

    /// Exit non-zero when any assertion mismatches
    #[arg(long = "strict")]
    strict: bool,
}

#[derive(Args, Debug)]
struct MutateArgs {
    /// Number of sequences to draw
    #[arg(short = 'n', long = "count", default_value_t = 1)]
    count: usize,

    /// RNG seed
    #[arg(long = "seed")]
    seed: Option<u64>,

    /// Print encoded records instead of raw values
    #[arg(long = "encode")]
    encode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Plain,
    Json,
}

/// Exit status when `check --strict` finds mismatches.
const EXIT_MISMATCH: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn report_error(err: &anyhow::Error) {
    if let Some(core) = err.downcast_ref::<Error>() {
        let outer = err.to_string();
        if outer != core.to_string() {
            eprintln!("{outer}");
        }
        eprint!("{}", format_error_with_remediation(core));
    } else {
        eprintln!("Error: {err:#}");
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(cli.global.config.as_deref())?;
    setup_logging(&cli.global, &config)?;

    match cli.command {
        Command::Generate(args) => run_generate(&args, &config),
        Command::Testbench(args) => run_testbench(args),
        Command::Check(args) => run_check(&args, &config),
        Command::Mutate(args) => run_mutate(&args, &config),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    Config::load_from(path).map_err(|e| anyhow::Error::new(Error::from(e)))
}

fn setup_logging(global: &GlobalArgs, config: &Config) -> anyhow::Result<()> {
    let log_config = LogConfig {
        level: global
            .log_level
            .clone()
            .unwrap_or_else(|| config.general.log_level.clone()),
        format: global.log_format.unwrap_or(config.general.log_format),
        file: global
            .log_file
            .clone()
            .or_else(|| config.general.log_file.clone()),
    };
    init_logging(&log_config).context("failed to initialize logging")
}

fn sequence_space(config: &Config) -> anyhow::Result<SequenceSpace> {
    config
        .sequence_space()
        .map_err(|e: ConfigError| anyhow::Error::new(Error::from(e)))
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => {
            tracing::debug!(seed, "seeded RNG");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    }
}

fn read_document(path: &Path) -> anyhow::Result<StimulusDocument> {
    let text = std::fs::read_to_string(path)
        .map_err(Error::from)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(StimulusDocument::from_yaml(&text)?)
}

// =============================================================================
// generate
// =============================================================================

fn run_generate(args: &GenerateArgs, config: &Config) -> anyhow::Result<ExitCode> {
    let space = sequence_space(config)?;
    let filler = IdempotentFragments::with_max_draws(&space, config.generation.max_idempotent_draws);
    let assembler = CorpusAssembler::with_composer(ScenarioComposer::with_filler(&space, filler));
    let mut rng = make_rng(args.seed.or(config.generation.seed));

    let output = args.output.clone().unwrap_or_else(|| config.output.path.clone());
    let mut sinks = SinkChain::new().with(YamlFileSink::new(&output));
    if let Some(path) = &args.testbench {
        sinks = sinks.with(TestbenchFileSink::new(path, TestbenchOptions::default()));
    }

    let corpus = assembler.build(&mut rng);
    if !args.quiet {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{corpus}")?;
        stdout.flush()?;
    }
    sinks.persist(&corpus)?;
    tracing::info!(
        path = %output.display(),
        records = corpus.flatten().len(),
        sinks = sinks.len(),
        "generated corpus"
    );
    Ok(ExitCode::SUCCESS)
}

// =============================================================================
// testbench
// =============================================================================

fn run_testbench(args: TestbenchArgs) -> anyhow::Result<ExitCode> {
    let document = read_document(&args.input)?;
    let records = document.records();
    let options = TestbenchOptions {
        entity: args.entity,
        clock_period_ns: args.clock_period_ns,
    };

    match args.output {
        Some(path) => {
            let corpus = Corpus::new(vec![Stimulus::group(records)]);
            TestbenchFileSink::new(path, options).persist(&corpus)?;
        }
        None => {
            let text = Testbench::new(options).render(&records);
            std::io::stdout().lock().write_all(text.as_bytes())?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

// =============================================================================
// check
// =============================================================================

fn run_check(args: &CheckArgs, config: &Config) -> anyhow::Result<ExitCode> {
    let space = sequence_space(config)?;
    let document = read_document(&args.input)?;
    let report = ReferenceChecker::new(&space).replay(&document.records());

    let mut stdout = std::io::stdout().lock();
    match args.format {
        ReportFormat::Plain => write!(stdout, "{}", render_report_plain(&report))?,
        ReportFormat::Json => {
            writeln!(
                stdout,
                "{}",
                serde_json::to_string_pretty(&report).map_err(Error::from)?
            )?;
        }
    }

    if args.strict && !report.passed() {
        tracing::warn!(mismatches = report.mismatches.len(), "assertion mismatches");
        return Ok(ExitCode::from(EXIT_MISMATCH));
    }
    Ok(ExitCode::SUCCESS)
}

fn render_report_plain(report: &ReplayReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("steps:         {}\n", report.steps));
    out.push_str(&format!("assertions:    {}\n", report.assertions));
    out.push_str(&format!("unlocks:       {}\n", report.unlocks));
    out.push_str(&format!("final warning: {}\n", report.final_warning));
    out.push_str(&format!("mismatches:    {}\n", report.mismatches.len()));
    for m in &report.mismatches {
        out.push_str(&format!(
            "  record {}: expected [{}, {}], got [{}, {}]\n",
            m.index, m.expected[0], m.expected[1], m.actual[0], m.actual[1]
        ));
    }
    out.push_str(if report.passed() { "PASS\n" } else { "FAIL\n" });
    out
}

// =============================================================================
// mutate
// =============================================================================

fn run_mutate(args: &MutateArgs, config: &Config) -> anyhow::Result<ExitCode> {
    let space = sequence_space(config)?;
    let mutator = SequenceMutator::new(&space);
    let mut rng = make_rng(args.seed.or(config.generation.seed));

    let mut stdout = std::io::stdout().lock();
    for _ in 0..args.count {
        let seq = mutator.generate_sequence(&mut rng);
        if args.encode {
            let records: Vec<String> = encode(&seq).iter().map(ToString::to_string).collect();
            writeln!(stdout, "[{}]", records.join(", "))?;
        } else {
            writeln!(stdout, "{seq:?}")?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_flags_parse() {
        let cli = Cli::try_parse_from([
            "seqvec",
            "--log-format",
            "json",
            "generate",
            "--seed",
            "7",
            "-o",
            "out.yaml",
            "--quiet",
        ])
        .unwrap();
        assert_eq!(cli.global.log_format, Some(LogFormat::Json));
        match cli.command {
            Command::Generate(args) => {
                assert_eq!(args.seed, Some(7));
                assert_eq!(args.output, Some(PathBuf::from("out.yaml")));
                assert!(args.quiet);
                assert!(args.testbench.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn check_defaults_to_plain() {
        let cli = Cli::try_parse_from(["seqvec", "check", "-i", "in.yaml"]).unwrap();
        match cli.command {
            Command::Check(args) => {
                assert_eq!(args.format, ReportFormat::Plain);
                assert!(!args.strict);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn plain_report_lists_mismatches() {
        let report = ReplayReport {
            steps: 3,
            assertions: 1,
            unlocks: 0,
            final_warning: false,
            mismatches: vec![seqvec_core::replay::AssertionMismatch {
                index: 2,
                expected: [0, 1],
                actual: [0, 0],
            }],
        };
        let text = render_report_plain(&report);
        assert!(text.contains("record 2: expected [0, 1], got [0, 0]"));
        assert!(text.ends_with("FAIL\n"));
    }
}
