use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use rpack::RepackOptions;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Archives to unpack, or directories to repack.
    ///
    /// An `.rpack` file is unpacked next to itself. A `<name>_unpack`
    /// directory with its project file is repacked. Any other directory is
    /// assembled from the project files found beside it.
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Write an updated project file next to each rebuilt archive
    #[arg(long, default_value_t = false)]
    save_project: bool,
}

fn main() -> Result<()> {
    better_panic::install();

    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(std::io::stdout().is_terminal())
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .without_time()
                .compact(),
        )
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .try_init()
        .into_diagnostic()?;

    let options = RepackOptions::builder()
        .save_project(cli.save_project)
        .build();

    commands::run(&cli.paths, options)
}
