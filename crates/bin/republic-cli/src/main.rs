//! Command-line front-end for the republic tool catalog.
//!
//! Reads slash commands (`/tools`, `/tool`, `/call`, `/help`, `/quit`) from
//! stdin, or runs the `--exec` commands and exits.

mod command;
mod config;
mod registry;
mod session;

use std::io::{self, Write};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;
use crate::registry::build_registry;
use crate::session::{Flow, Session};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const PROMPT: &str = "republic> ";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn prompt() -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "{PROMPT}")?;
    stdout.flush()
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    init_tracing();
    let config = CliConfig::from_args()?;
    let session = Session::new(Arc::new(build_registry(&config)?));

    if !config.exec.is_empty() {
        for command in &config.exec {
            if session.handle(command, &mut io::stdout()).await? == Flow::Quit {
                break;
            }
        }
        return Ok(());
    }

    session.welcome(&mut io::stdout())?;
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if session.handle(&line, &mut io::stdout()).await? == Flow::Quit {
            return Ok(());
        }
        prompt()?;
    }
    Ok(())
}
