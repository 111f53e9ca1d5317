// src/main.rs

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use gomerge::driver::{self, FileKind, MergeInputs, Output};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// File kinds selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Mod,
    Sum,
}

impl From<KindArg> for FileKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Mod => FileKind::GoMod,
            KindArg::Sum => FileKind::GoSum,
        }
    }
}

#[derive(Parser)]
#[command(name = "go-merge")]
#[command(author, version, about = "Three-way git merge driver for go.mod and go.sum", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge go.mod or go.sum (git merge driver: -O %O -A %A -B %B -P %P)
    Merge {
        /// Common ancestor file
        #[arg(short = 'O', long)]
        common_ancestor: PathBuf,
        /// Current version file; receives the result unless --output is given
        #[arg(short = 'A', long)]
        current_version: PathBuf,
        /// Other version file
        #[arg(short = 'B', long)]
        other_version: PathBuf,
        /// Repository path of the merged file, used to detect its kind
        #[arg(short = 'P', long, required_unless_present = "kind")]
        result: Option<PathBuf>,
        /// File kind, overriding detection from --result
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,
        /// Output path ("-" for stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn main() -> ExitCode {
    // Logs go to stderr so a merged result on stdout stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let conflict = err
                .downcast_ref::<gomerge::Error>()
                .is_some_and(gomerge::Error::is_conflict);

            if conflict {
                eprintln!("Merge conflict: {:#}", err);
                ExitCode::from(1)
            } else {
                eprintln!("Error: {:#}", err);
                ExitCode::from(2)
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Merge {
            common_ancestor,
            current_version,
            other_version,
            result,
            kind,
            output,
        } => {
            let kind = match (kind, &result) {
                (Some(kind), _) => FileKind::from(kind),
                (None, Some(result)) => FileKind::detect(result)?,
                (None, None) => anyhow::bail!("either --result or --kind is required"),
            };

            let output = match output {
                Some(arg) => Output::from_arg(&arg),
                None => Output::File(current_version.clone()),
            };

            let inputs = MergeInputs {
                ancestor: common_ancestor,
                current: current_version,
                other: other_version,
            };

            let merged = driver::merge_files(kind, &inputs)
                .with_context(|| format!("failed to merge {} files", kind.as_str()))?;

            driver::write_output(&output, &merged).context("failed to write merged result")?;

            info!("{} merge complete", kind.as_str());
            Ok(())
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "go-merge", &mut std::io::stdout());
            Ok(())
        }
    }
}
