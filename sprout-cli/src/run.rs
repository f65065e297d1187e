//! # Run
//!
//! Loads the configuration and issues files, checks the Jira connection and
//! walks the issue tree.

use std::env;

use anyhow::{Context, Result, bail};
use sprout_core::config::{self, resolve_config_path};
use sprout_core::walker::{IssueTreeWalker, WalkReport};
use sprout_jira::create_jira_runtime_and_client;
use tracing::{debug, info};

use crate::cli::Cli;
use crate::summary::print_summary;

/// Exit code when at least one issue could not be created
pub const EXIT_NODE_FAILURES: u8 = 1;

/// Exit code when the run stopped before creating anything
pub const EXIT_FATAL: u8 = 2;

/// Create every issue of the issues file and print the run summary
///
/// Errors returned here are fatal; failures of individual issues are recorded
/// in the returned report instead.
pub fn run(cli: &Cli) -> Result<WalkReport> {
  let working_dir = env::current_dir().context("Failed to determine the current directory")?;
  let config_path = resolve_config_path(cli.jira_config_file.as_deref(), &working_dir);
  debug!("Using Jira configuration {}", config_path.display());

  let (mut jira_config, issues) = config::load(&config_path, &cli.issues_list_file)?;
  if let Some(project) = &cli.project {
    jira_config.project = Some(project.clone());
  }
  info!(
    "Loaded {} top-level issue(s) from {}",
    issues.len(),
    cli.issues_list_file.display()
  );

  let (rt, client) = create_jira_runtime_and_client(&jira_config)?;

  let connected = rt.block_on(client.test_connection())?;
  if !connected {
    bail!(
      "Could not authenticate with Jira at {}. Check jira_url and jira_token; personal access tokens can be created at {}",
      jira_config.jira_url,
      client.token_help_url()
    );
  }

  let walker = IssueTreeWalker::new(&jira_config, &client);
  let report = rt.block_on(walker.walk(&issues));
  print_summary(&report, &jira_config);
  Ok(report)
}
