//! # Jira API Client
//!
//! Jira REST API integration for sprout: issue creation, field updates,
//! issue links and the agile lookups used to resolve sprint names.

pub mod auth;
mod client;
pub mod consts;
mod endpoints;
pub mod models;
pub mod payload;
mod service;

pub use auth::create_jira_runtime_and_client;
// Re-export the client
pub use client::{JiraClient, create_jira_client};
// Re-export models
pub use models::{Board, CreatedIssue, IssueLinkRequest, JiraAuth, JiraUser, Sprint};
pub use payload::PayloadBuilder;
