//! Runtime and client construction for callers that are not async.
//!
//! The CLI drives the client from a single-threaded runtime so Jira only ever
//! sees one request at a time.

use anyhow::{Context, Result};
use sprout_core::config::JiraConfig;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::{JiraClient, create_jira_client};

/// Creates a tokio runtime and an authenticated Jira client.
pub fn create_jira_runtime_and_client(config: &JiraConfig) -> Result<(Runtime, JiraClient)> {
  let rt = Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")?;
  let client = create_jira_client(config)?;
  debug!("Created Jira client for {}", config.api_base_url());
  Ok((rt, client))
}
