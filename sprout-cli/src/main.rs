//! # Sprout CLI Entry Point
//!
//! The main entry point for the sprout command-line tool, which creates a
//! tree of Jira issues described in a YAML file.

use std::process::ExitCode;

use clap::Parser;
use sprout_core::output::print_error;
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

mod cli;
mod run;
mod summary;

fn main() -> ExitCode {
  // Parse CLI arguments using the derive-based implementation
  let cmd = cli::Cli::parse();

  let level = if cmd.debug {
    tracing::Level::DEBUG
  } else {
    tracing::Level::INFO
  };

  // Initialize the tracing subscriber with the specified level
  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(EnvFilter::from_default_env().add_directive(level.into()))
    .init();

  debug!("Tracing initialized with level: {}", level);

  cmd.colors.apply();

  match run::run(&cmd) {
    Ok(report) => {
      if report.is_success() {
        ExitCode::SUCCESS
      } else {
        ExitCode::from(run::EXIT_NODE_FAILURES)
      }
    }
    Err(err) => {
      print_error(&format!("{err:#}"));
      ExitCode::from(run::EXIT_FATAL)
    }
  }
}
