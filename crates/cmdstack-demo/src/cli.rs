#![forbid(unsafe_code)]

use std::io::{self, BufRead, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::DemoConfig;
use crate::error::{DemoError, Result};
use crate::session::{Reply, Session};

#[derive(Debug, Parser)]
#[command(
    name = "cmdstack-demo",
    about = "Console editor with undo/redo over a text value and a bitmap table",
    version
)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Initial text value (overrides the config file).
    #[arg(long)]
    pub initial: Option<String>,

    /// Maximum undo depth, at least 1 (overrides the config file).
    #[arg(long)]
    pub max_depth: Option<NonZeroUsize>,

    /// Refuse to store empty text.
    #[arg(long)]
    pub reject_empty: bool,

    /// Log filter, e.g. `cmdstack=debug`. Falls back to `RUST_LOG`.
    #[arg(long)]
    pub log: Option<String>,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.log.as_deref())?;
    let config = DemoConfig::resolve(&cli)?;
    tracing::debug!(?config, "starting session");

    let mut session = Session::new(&config);
    let stdin = io::stdin();
    repl(&mut session, stdin.lock(), &mut io::stdout(), &mut io::stderr())
}

/// Feed lines to the session until `quit` or end of input.
///
/// Replies and the prompt go to `output`; error replies go to `errors`.
pub fn repl(
    session: &mut Session,
    input: impl BufRead,
    output: &mut impl Write,
    errors: &mut impl Write,
) -> Result<()> {
    write!(output, "> ")?;
    output.flush()?;
    for line in input.lines() {
        match session.handle(&line?) {
            Reply::Quit => return Ok(()),
            Reply::Silent => {}
            Reply::Text(text) => writeln!(output, "{text}")?,
            Reply::Error(text) => writeln!(errors, "{text}")?,
        }
        write!(output, "> ")?;
        output.flush()?;
    }
    writeln!(output)?;
    Ok(())
}

fn init_logging(filter: Option<&str>) -> Result<()> {
    let filter = match filter {
        Some(directives) => {
            EnvFilter::try_new(directives).map_err(|e| DemoError::LogFilter {
                filter: directives.to_string(),
                message: e.to_string(),
            })?
        }
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
    Ok(())
}
