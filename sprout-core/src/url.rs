//! URL helpers for the configured Jira instance.

use thiserror::Error;
use url::{Position, Url};

/// The configured Jira URL could not be understood
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvalidUrl(String);

/// Strip a leading `http:`/`https:` prefix, tolerating missing slashes.
fn split_scheme(input: &str) -> (Option<&'static str>, &str) {
  for scheme in ["https", "http"] {
    let Some(prefix) = input.get(..scheme.len() + 1) else {
      continue;
    };
    if prefix.eq_ignore_ascii_case(&format!("{scheme}:")) {
      return (Some(scheme), input[scheme.len() + 1..].trim_start_matches('/'));
    }
  }
  (None, input)
}

/// Normalize the Jira base URL from the configuration.
///
/// A missing scheme defaults to `https://`, a malformed one such as
/// `http:/jira.example.com` is repaired, and trailing slashes are removed so
/// API paths can be appended directly. Only http(s) URLs with a host are
/// accepted.
pub fn normalize_jira_url(input: &str) -> Result<String, InvalidUrl> {
  let trimmed = input.trim();
  if trimmed.is_empty() {
    return Err(InvalidUrl("URL cannot be empty".to_string()));
  }

  let (scheme, remainder) = split_scheme(trimmed);
  if scheme.is_none() && remainder.contains("://") {
    return Err(InvalidUrl(format!(
      "Unsupported URL scheme in '{input}'. Use http:// or https://"
    )));
  }

  let candidate = format!("{}://{remainder}", scheme.unwrap_or("https"));
  let url = Url::parse(&candidate).map_err(|err| InvalidUrl(format!("Failed to parse URL '{input}': {err}")))?;
  if url.host_str().is_none_or(str::is_empty) {
    return Err(InvalidUrl(format!("URL '{input}' has no host")));
  }

  let mut normalized = url[..Position::BeforePath].to_string();
  normalized.push_str(url.path().trim_end_matches('/'));
  Ok(normalized)
}
