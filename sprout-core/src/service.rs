//! # Issue Service
//!
//! The seam between the tree walker and whatever creates issues. The Jira
//! client implements [`IssueService`]; tests use in-memory stubs.

use thiserror::Error;

use crate::model::{Fields, IssueType};

/// Errors returned by an issue service call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
  #[error("Jira API returned HTTP {status}: {body}")]
  Status { status: u16, body: String },

  #[error("Jira API request timed out: {0}")]
  Timeout(String),

  #[error("Failed to reach Jira: {0}")]
  Transport(String),

  #[error("Unexpected response from Jira: {0}")]
  InvalidResponse(String),

  #[error("{0} not found")]
  NotFound(String),
}

/// How a new issue is attached to an already created one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentRef {
  /// Set as the issue's `parent` (sub-tasks)
  Parent(String),
  /// Attached to an epic, through the epic link field when one is configured
  Epic(String),
}

/// Operations the tree walker needs from Jira
///
/// Calls are awaited one at a time; implementations never see two requests
/// in flight.
#[allow(async_fn_in_trait)]
pub trait IssueService {
  /// Create an issue and return its key
  async fn create_issue(
    &self,
    issue_type: &IssueType,
    fields: &Fields,
    parent: Option<&ParentRef>,
  ) -> Result<String, ApiError>;

  /// Link `child_key` to `parent_key` with the given link type
  async fn link_issue(&self, child_key: &str, parent_key: &str, link_type: &str) -> Result<(), ApiError>;

  /// Set fields on an existing issue
  async fn update_fields(&self, key: &str, fields: &Fields) -> Result<(), ApiError>;
}
