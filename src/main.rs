//! diffpin - Pick individual lines out of a unified diff
//!
//! Reads a diff from stdin, lets the user pin lines in a TUI and writes a
//! patch that keeps the new file while restoring every pinned deletion.

mod config;
mod diff;
mod selection;
mod session;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::diff::Mode;
use crate::selection::SelectionModel;
use crate::session::{FileSink, Outcome, Persist, Session};

/// Fixture read in dev mode
const DEV_INPUT: &str = "data/test.diff";

#[derive(Parser)]
#[command(name = "diffpin")]
#[command(about = "Select diff lines to carry over and write them as a patch")]
#[command(version)]
struct Cli {
    /// Transformation mode: filter or hunk-aware
    #[arg(short, long)]
    mode: Option<Mode>,

    /// Output file (default: diff.pin)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Read the diff from a file instead of stdin
    #[arg(long, conflicts_with = "dev")]
    input: Option<PathBuf>,

    /// Development mode: read data/test.diff
    #[arg(long)]
    dev: bool,

    /// Print the result to stdout instead of writing a file
    #[arg(long, conflicts_with = "output")]
    print: bool,

    /// Write a default config file and exit
    #[arg(long)]
    init_config: bool,
}

/// Holds the committed diff until the terminal is restored
#[derive(Default)]
struct StdoutSink {
    text: Option<String>,
}

impl Persist for StdoutSink {
    fn describe(&self) -> String {
        "stdout".to_string()
    }

    fn write(&mut self, text: &str) -> Result<()> {
        self.text = Some(text.to_string());
        Ok(())
    }
}

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Give the user their shell back before printing the panic
        let _ = tui::restore();
        default_hook(panic_info);
    }));
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.init_config {
        let path = Config::default_path();
        Config::create_default(&path)?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let config = Config::load()?.with_overrides(cli.mode, cli.output.clone());

    let input = if cli.dev {
        read_file(Path::new(DEV_INPUT))?
    } else if let Some(path) = &cli.input {
        read_file(path)?
    } else {
        if std::io::stdin().is_terminal() {
            eprintln!("Try piping in some text.");
            std::process::exit(1);
        }
        read_stdin()?
    };

    let session = Session::new(SelectionModel::load(&input), config.mode);

    install_panic_hook();

    let outcome = if cli.print {
        let mut sink = StdoutSink::default();
        let session = tui::run(session, &mut sink, config.show_help)?;
        if let Some(text) = sink.text.take() {
            print!("{}", text);
        }
        session.outcome().cloned()
    } else {
        let mut sink = FileSink::new(&config.output);
        tui::run(session, &mut sink, config.show_help)?.outcome().cloned()
    };

    report(outcome.as_ref())
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))
}

fn read_stdin() -> Result<String> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read diff from stdin")?;
    Ok(input)
}

/// Prints how the session ended. A failed write exits with status 1.
fn report(outcome: Option<&Outcome>) -> Result<()> {
    match outcome {
        Some(Outcome::Saved {
            target,
            bytes,
            dropped_headers,
        }) => {
            eprintln!("Wrote {} bytes to {}", bytes, target);
            if *dropped_headers > 0 {
                eprintln!(
                    "Warning: dropped {} malformed hunk header(s)",
                    dropped_headers
                );
            }
            Ok(())
        }
        Some(Outcome::Failed { target, error }) => {
            eprintln!("Failed to save {}: {}", target, error);
            std::process::exit(1);
        }
        Some(Outcome::Quit) | None => Ok(()),
    }
}
