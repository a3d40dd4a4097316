//! # bump-board
//!
//! Replays a JSON-lines command script against an in-memory board host and
//! prints one JSON outcome per command. Logs go to stderr.
//!
//! ```bash
//! bump-board demos/walkthrough.jsonl
//! cat script.jsonl | BUMP_BOARD__LOG__FORMAT=json bump-board
//! ```

mod script;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use configs::{LogFormat, LogSettings, Settings};
use services::Registry;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::script::Session;

#[derive(Debug, Parser)]
#[command(name = "bump-board", version, about = "Replay board commands from a JSON-lines script")]
struct Args {
    /// Script to replay; stdin when omitted.
    script: Option<PathBuf>,

    /// Extra TOML file layered over config/default.toml and config/local.toml.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = Settings::load_with(args.config.as_deref()).context("loading settings")?;
    init_tracing(&settings.log);

    let input: Box<dyn BufRead> = match &args.script {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let mut session = Session::new(Registry::default(), settings.host.max_page);
    let mut out = io::stdout().lock();
    let mut executed = 0usize;

    for (n, line) in input.lines().enumerate() {
        let line = line.context("reading script")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let outcome = session.run_line(n + 1, trimmed);
        serde_json::to_writer(&mut out, &outcome)?;
        writeln!(out)?;
        executed += 1;
    }

    info!(executed, "script finished");
    Ok(())
}

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
