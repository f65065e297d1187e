//! Core constants shared across sprout components.

/// Environment variable overriding the configured Jira URL.
pub const ENV_JIRA_URL: &str = "JIRA_URL";

/// Environment variable overriding the configured Jira API token.
pub const ENV_JIRA_TOKEN: &str = "JIRA_TOKEN";
