//! Constants for the sprout-jira client.

/// User-Agent header value for the Jira API client
pub const USER_AGENT: &str = concat!("sprout/", env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Path of the Jira Software (agile) REST API below the Jira URL
pub const AGILE_API_PATH: &str = "/rest/agile/1.0";

/// Response bodies larger than this are logged by size only
pub const MAX_RESPONSE_LOG_SIZE: usize = 2500;

/// Page size used when listing sprints
pub const SPRINT_PAGE_SIZE: u32 = 50;
