use clap::{Parser, ValueEnum};
use gcsgen::Error;
use gcsgen::config::GeneratorConfig;
use gcsgen::emit::CppEmitter;
use gcsgen::loader::{SourceFormat, load_schema_file};
use gcsgen::writer::FsWriter;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "gcsgen")]
#[command(version)]
#[command(about = "Generate C++ geometry and constraint types from a schema document")]
struct Cli {
    /// Schema document (YAML or JSON)
    input: PathBuf,

    /// Root directory for generated headers
    output: PathBuf,

    /// Input format (default: from extension, then content)
    #[arg(long, short = 'f', value_enum)]
    format: Option<Format>,

    /// Generator settings file (YAML)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Prefix for include guard tokens
    #[arg(long)]
    guard_prefix: Option<String>,

    /// Write only the combined unit
    #[arg(long)]
    combined_only: bool,

    /// Log progress to stderr
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

impl From<Format> for SourceFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Yaml => SourceFormat::Yaml,
            Format::Json => SourceFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::from_path(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(prefix) = cli.guard_prefix {
        config.guard_prefix = Some(prefix);
    }

    let schema = load_schema_file(&cli.input, cli.format.map(SourceFormat::from))?;
    // Everything is generated before the first write.
    let output = CppEmitter::new(config).assemble(&schema)?;

    let writer = FsWriter::new(&cli.output);
    if cli.combined_only {
        writer.write_combined(&output)?;
    } else {
        let written = writer.write_all(&output)?;
        tracing::info!(files = written.len(), root = %writer.root().display(), "done");
    }
    Ok(())
}
