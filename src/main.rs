use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use sembump::{BumpKind, bump_source, logging};

#[derive(Parser)]
#[command(
    name = "sembump",
    version,
    about = "Bump the semantic version embedded in a Rust source file"
)]
struct Cli {
    /// Write the result back to the source file instead of stdout
    #[arg(short = 'w', long, global = true)]
    write: bool,

    /// Disable ANSI colors in log output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log level override (falls back to RUST_LOG, then "info")
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Bump the major version
    Major { file: PathBuf },
    /// Bump the minor version
    Minor { file: PathBuf },
    /// Bump the patch version
    Patch { file: PathBuf },
    /// Show the current version without rewriting anything
    Show { file: PathBuf },
}

impl Command {
    fn kind(&self) -> BumpKind {
        match self {
            Command::Major { .. } => BumpKind::Major,
            Command::Minor { .. } => BumpKind::Minor,
            Command::Patch { .. } => BumpKind::Patch,
            Command::Show { .. } => BumpKind::None,
        }
    }

    fn file(&self) -> &Path {
        match self {
            Command::Major { file }
            | Command::Minor { file }
            | Command::Patch { file }
            | Command::Show { file } => file,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.no_color, cli.log_level.as_deref())?;

    let file = cli.command.file();
    debug!(file = %file.display(), "target file");
    let source = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let outcome = bump_source(&source, cli.command.kind())
        .with_context(|| format!("failed to process {}", file.display()))?;

    match &cli.command {
        Command::Show { .. } => println!("{}", outcome.version),
        _ if cli.write => {
            fs::write(file, outcome.source.as_bytes())
                .with_context(|| format!("failed to write {}", file.display()))?;
            debug!(version = %outcome.version, "wrote bumped source back to file");
        }
        _ => print!("{}", outcome.source),
    }

    Ok(())
}
