//! @ai:module:intent CLI entry point for building NER training data from syllabus text
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on dataset, interactive, config, output

use clap::{Parser, Subcommand, ValueEnum};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use sylner_core::{
    dataset, format_batch_report, format_build_report, format_check_result, InteractiveSession,
    JsonlEmitter, OutputFormat, SylnerConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sylner")]
#[command(author, version, about = "Build NER training data from syllabus text and annotation scripts")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Align an annotation script with a text file and write training records
    Align {
        /// Extracted text of the document
        #[arg(long)]
        text: PathBuf,

        /// Annotation script, one `<entity>>><label>` per line
        #[arg(long)]
        annotations: PathBuf,

        /// Output JSON-lines file
        #[arg(long, short)]
        output: PathBuf,

        /// Skip text cleaning and chunk the text as-is
        #[arg(long, default_value = "false")]
        raw: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// Validate an annotation script without aligning it
    Check {
        /// Annotation script to validate
        annotations: PathBuf,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// Annotate a text file interactively, chunk by chunk
    Annotate {
        /// Extracted text of the document
        #[arg(long)]
        text: PathBuf,

        /// Output JSON-lines file
        #[arg(long, short)]
        output: PathBuf,

        /// Skip text cleaning and chunk the text as-is
        #[arg(long, default_value = "false")]
        raw: bool,
    },

    /// Build every text file in a directory that has a matching annotation script
    Batch {
        /// Directory of extracted text files (*.txt)
        #[arg(long)]
        texts: PathBuf,

        /// Directory of annotation scripts at the same relative paths as the text files
        #[arg(long)]
        annotations: PathBuf,

        /// Directory for the JSON-lines outputs
        #[arg(long, short)]
        output: PathBuf,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// Write the default configuration
    Init {
        /// Output path for the config file
        #[arg(short, long, default_value = "sylner.toml")]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    JsonPretty,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sylner=info,sylner_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match SylnerConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    match cli.command {
        Commands::Align {
            text,
            annotations,
            output,
            raw,
            format,
        } => {
            if raw {
                config.chunking.clean = false;
            }
            match dataset::build_file(&text, &annotations, &output, &config) {
                Ok(report) => {
                    println!("{}", format_build_report(&report, format.into()));
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::from(2)
                }
            }
        }

        Commands::Check {
            annotations,
            format,
        } => match dataset::check_file(&annotations, &config.labels) {
            Ok(result) => {
                println!("{}", format_check_result(&result, format.into()));

                if result.passed() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(1)
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(2)
            }
        },

        Commands::Annotate { text, output, raw } => {
            if raw {
                config.chunking.clean = false;
            }
            match annotate(&text, &output, &config) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::from(2)
                }
            }
        }

        Commands::Batch {
            texts,
            annotations,
            output,
            format,
        } => match dataset::build_directory(&texts, &annotations, &output, &config) {
            Ok(report) => {
                println!("{}", format_batch_report(&report, format.into()));

                if report.passed() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(1)
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(2)
            }
        },

        Commands::Init { output } => match config.save(&output) {
            Ok(()) => {
                println!("Wrote configuration to {}", output.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(2)
            }
        },
    }
}

fn annotate(text: &Path, output: &Path, config: &SylnerConfig) -> sylner_core::Result<()> {
    let chunks = dataset::load_chunks(text, &config.chunking)?;
    let mut emitter = JsonlEmitter::create(output)?.skip_empty(true);

    let stdin = io::stdin();
    let summary = InteractiveSession::new(&config.labels, stdin.lock(), io::stdout())
        .run(&chunks, &mut emitter)?;
    emitter.finish()?;

    tracing::info!(
        "Annotated {} chunks, wrote {} documents to {}",
        summary.chunks_shown,
        summary.documents_emitted,
        output.display()
    );
    Ok(())
}
