//! # Jira API Endpoints
//!
//! Endpoint implementations, grouped by Jira resource.

pub mod agile;
pub mod issues;
pub mod links;
