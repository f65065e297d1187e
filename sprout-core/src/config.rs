//! # Configuration Management
//!
//! Loads the Jira connection settings and the issue tree from their YAML
//! files, and locates the default configuration file.
//!
//! Nothing here touches the network. Both files are fully validated before
//! the first API call is made so that configuration mistakes never leave a
//! half-created issue tree behind.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::consts::{ENV_JIRA_TOKEN, ENV_JIRA_URL};
use crate::model::IssueNode;
use crate::url::normalize_jira_url;

/// API path used when `jira_api_base_url` is not configured
pub const DEFAULT_API_BASE_PATH: &str = "/rest/api/2";

/// Request timeout used when `jira_timeout_secs` is not configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// File name of the Jira configuration file
pub const CONFIG_FILE_NAME: &str = "jira_config.yaml";

/// Errors raised while loading configuration or issue files
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Missing required configuration key '{0}'")]
  MissingKey(&'static str),

  #[error("Invalid value for '{key}': {reason}")]
  InvalidValue { key: String, reason: String },

  #[error("Failed to read {}: {source}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to parse {}: {source}", .path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },
}

/// A custom field ID as written in the configuration file
///
/// Bare numbers are accepted and expanded, so `story_points: 10002` means
/// `customfield_10002`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CustomFieldId {
  Name(String),
  Number(u64),
}

impl From<CustomFieldId> for String {
  fn from(id: CustomFieldId) -> Self {
    match id {
      CustomFieldId::Name(name) => name,
      CustomFieldId::Number(number) => format!("customfield_{number}"),
    }
  }
}

type RawFieldIds = BTreeMap<String, CustomFieldId>;

fn field_ids(raw: RawFieldIds) -> BTreeMap<String, String> {
  raw.into_iter().map(|(name, id)| (name, id.into())).collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCustomFieldMapping {
  key_format_fields: RawFieldIds,
  name_format_fields: RawFieldIds,
  #[serde(flatten)]
  fields: RawFieldIds,
}

impl From<RawCustomFieldMapping> for CustomFieldMapping {
  fn from(raw: RawCustomFieldMapping) -> Self {
    Self {
      key_format_fields: field_ids(raw.key_format_fields),
      name_format_fields: field_ids(raw.name_format_fields),
      fields: field_ids(raw.fields),
    }
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSpecialFields {
  custom_field_mapping: CustomFieldMapping,
  key_format_fields: Vec<String>,
  name_format_fields: Vec<String>,
  post_creation_update_fields: Vec<String>,
  #[serde(flatten)]
  custom_fields: RawFieldIds,
}

impl From<RawSpecialFields> for SpecialFields {
  fn from(raw: RawSpecialFields) -> Self {
    Self {
      custom_field_mapping: raw.custom_field_mapping,
      key_format_fields: raw.key_format_fields,
      name_format_fields: raw.name_format_fields,
      post_creation_update_fields: raw.post_creation_update_fields,
      custom_fields: field_ids(raw.custom_fields),
    }
  }
}

/// Custom field IDs keyed by the readable names used in the issues file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawCustomFieldMapping")]
pub struct CustomFieldMapping {
  /// Custom fields whose values are sent as `{"key": value}`
  pub key_format_fields: BTreeMap<String, String>,
  /// Custom fields whose values are sent as `{"name": value}`
  pub name_format_fields: BTreeMap<String, String>,
  /// Custom fields whose values are sent as-is
  pub fields: BTreeMap<String, String>,
}

/// Field translation rules from the `jira_special_fields` section
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawSpecialFields")]
pub struct SpecialFields {
  pub custom_field_mapping: CustomFieldMapping,
  /// Standard fields whose values are sent as `{"key": value}`
  pub key_format_fields: Vec<String>,
  /// Standard fields whose values are sent as `{"name": value}`
  pub name_format_fields: Vec<String>,
  /// Fields that cannot be set on the create screen and are applied with an
  /// update once the issue exists
  pub post_creation_update_fields: Vec<String>,
  /// Plain `name: customfield_id` entries written directly under
  /// `jira_special_fields`
  pub custom_fields: BTreeMap<String, String>,
}

impl SpecialFields {
  /// Custom field ID for a plain mapped field
  pub fn custom_field_id(&self, name: &str) -> Option<&str> {
    self
      .custom_field_mapping
      .fields
      .get(name)
      .or_else(|| self.custom_fields.get(name))
      .map(String::as_str)
  }

  /// Custom field ID for a mapped field sent in key format
  pub fn key_format_custom_field(&self, name: &str) -> Option<&str> {
    self.custom_field_mapping.key_format_fields.get(name).map(String::as_str)
  }

  /// Custom field ID for a mapped field sent in name format
  pub fn name_format_custom_field(&self, name: &str) -> Option<&str> {
    self.custom_field_mapping.name_format_fields.get(name).map(String::as_str)
  }

  pub fn is_key_format(&self, name: &str) -> bool {
    self.key_format_fields.iter().any(|field| field == name)
  }

  pub fn is_name_format(&self, name: &str) -> bool {
    self.name_format_fields.iter().any(|field| field == name)
  }

  pub fn is_post_creation(&self, name: &str) -> bool {
    self.post_creation_update_fields.iter().any(|field| field == name)
  }

  /// Custom field holding the epic link, if the instance uses one
  pub fn epic_link_field(&self) -> Option<&str> {
    self
      .custom_field_id("epic_link")
      .or_else(|| self.custom_field_id("epicLink"))
  }
}

/// Jira connection settings
///
/// Built once at startup and shared by reference afterwards.
#[derive(Clone, PartialEq)]
pub struct JiraConfig {
  /// Base URL of the Jira instance, without a trailing slash
  pub jira_url: String,
  pub jira_token: String,
  /// Path of the REST API below `jira_url`
  pub api_base_path: String,
  /// Project used for issues that do not name one
  pub project: Option<String>,
  pub timeout: Duration,
  pub special_fields: SpecialFields,
}

impl fmt::Debug for JiraConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("JiraConfig")
      .field("jira_url", &self.jira_url)
      .field("jira_token", &"<redacted>")
      .field("api_base_path", &self.api_base_path)
      .field("project", &self.project)
      .field("timeout", &self.timeout)
      .field("special_fields", &self.special_fields)
      .finish()
  }
}

impl JiraConfig {
  pub fn new(jira_url: &str, jira_token: &str) -> Result<Self, ConfigError> {
    Ok(Self {
      jira_url: normalize_jira_url(jira_url).map_err(|err| ConfigError::InvalidValue {
        key: "jira_url".to_string(),
        reason: err.to_string(),
      })?,
      jira_token: jira_token.to_string(),
      api_base_path: DEFAULT_API_BASE_PATH.to_string(),
      project: None,
      timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
      special_fields: SpecialFields::default(),
    })
  }

  /// Full URL of the REST API, e.g. `https://jira.example.com/rest/api/2`
  pub fn api_base_url(&self) -> String {
    let path = self.api_base_path.trim_end_matches('/');
    if path.starts_with('/') {
      format!("{}{path}", self.jira_url)
    } else {
      format!("{}/{path}", self.jira_url)
    }
  }

  /// Browser URL of an issue
  pub fn browse_url(&self, issue_key: &str) -> String {
    format!("{}/browse/{issue_key}", self.jira_url)
  }
}

/// The configuration file as written on disk
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawJiraConfig {
  jira_url: Option<String>,
  jira_token: Option<String>,
  jira_api_base_url: Option<String>,
  jira_project: Option<String>,
  jira_timeout_secs: Option<u64>,
  #[serde(default)]
  jira_special_fields: SpecialFields,
}

/// Issues listed under an `issues:` (or `epics:`) key
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WrappedIssues {
  #[serde(alias = "epics")]
  issues: Vec<IssueNode>,
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
  fs::read_to_string(path).map_err(|source| ConfigError::Io {
    path: path.to_path_buf(),
    source,
  })
}

fn non_empty(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse configuration file contents
///
/// `env` is consulted for `JIRA_URL` and `JIRA_TOKEN`, which take precedence
/// over the values in the file.
pub fn parse_jira_config<F>(content: &str, path: &Path, env: F) -> Result<JiraConfig, ConfigError>
where
  F: Fn(&str) -> Option<String>,
{
  let raw: RawJiraConfig = if content.trim().is_empty() {
    RawJiraConfig::default()
  } else {
    serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?
  };

  let jira_url = non_empty(env(ENV_JIRA_URL))
    .or_else(|| non_empty(raw.jira_url))
    .ok_or(ConfigError::MissingKey("jira_url"))?;
  let jira_token = non_empty(env(ENV_JIRA_TOKEN))
    .or_else(|| non_empty(raw.jira_token))
    .ok_or(ConfigError::MissingKey("jira_token"))?;

  let mut config = JiraConfig::new(&jira_url, &jira_token)?;

  if let Some(api_base_path) = non_empty(raw.jira_api_base_url) {
    config.api_base_path = api_base_path;
  }
  config.project = non_empty(raw.jira_project);

  if let Some(timeout_secs) = raw.jira_timeout_secs {
    if timeout_secs == 0 {
      return Err(ConfigError::InvalidValue {
        key: "jira_timeout_secs".to_string(),
        reason: "timeout must be greater than zero".to_string(),
      });
    }
    config.timeout = Duration::from_secs(timeout_secs);
  }
  config.special_fields = raw.jira_special_fields;

  Ok(config)
}

/// Load the Jira configuration file, applying environment overrides
pub fn load_jira_config(path: &Path) -> Result<JiraConfig, ConfigError> {
  debug!("Loading Jira configuration from {}", path.display());
  let content = read_file(path)?;
  parse_jira_config(&content, path, |name| std::env::var(name).ok())
}

/// Parse issues file contents
pub fn parse_issues(content: &str, path: &Path) -> Result<Vec<IssueNode>, ConfigError> {
  let parse_error = |source| ConfigError::Parse {
    path: path.to_path_buf(),
    source,
  };

  // Peek at the top level only, then deserialize the text itself so errors
  // keep their line and column
  let issues = match serde_yaml::from_str::<serde_yaml::Value>(content).map_err(parse_error)? {
    serde_yaml::Value::Sequence(_) => serde_yaml::from_str::<Vec<IssueNode>>(content).map_err(parse_error)?,
    serde_yaml::Value::Mapping(_) => {
      serde_yaml::from_str::<WrappedIssues>(content)
        .map_err(parse_error)?
        .issues
    }
    serde_yaml::Value::Null => Vec::new(),
    _ => {
      return Err(ConfigError::InvalidValue {
        key: path.display().to_string(),
        reason: "expected a list of issues or an 'issues:' mapping".to_string(),
      });
    }
  };

  if issues.is_empty() {
    return Err(ConfigError::InvalidValue {
      key: path.display().to_string(),
      reason: "the issues file does not describe any issues".to_string(),
    });
  }

  Ok(issues)
}

/// Load the issue tree from the issues file
pub fn load_issues(path: &Path) -> Result<Vec<IssueNode>, ConfigError> {
  debug!("Loading issues from {}", path.display());
  let content = read_file(path)?;
  parse_issues(&content, path)
}

/// Load both the configuration and the issue tree
pub fn load(config_path: &Path, issues_path: &Path) -> Result<(JiraConfig, Vec<IssueNode>), ConfigError> {
  let config = load_jira_config(config_path)?;
  let issues = load_issues(issues_path)?;
  Ok((config, issues))
}

/// Represents the configuration directories for the sprout application
#[derive(Debug, Clone)]
pub struct ConfigDirs {
  pub config_dir: PathBuf,
}

impl ConfigDirs {
  /// Resolve the platform configuration directory
  pub fn new() -> Option<Self> {
    let proj_dirs = ProjectDirs::from("", "", "sprout")?;
    Some(Self {
      config_dir: proj_dirs.config_dir().to_path_buf(),
    })
  }

  /// Get the path to the Jira configuration file
  pub fn jira_config_path(&self) -> PathBuf {
    self.config_dir.join(CONFIG_FILE_NAME)
  }
}

/// Pick the configuration file to use
///
/// An explicit path always wins. Otherwise `./jira_config.yaml` is used when
/// it exists, falling back to the file in the platform config directory.
pub fn resolve_config_path(explicit: Option<&Path>, working_dir: &Path) -> PathBuf {
  if let Some(path) = explicit {
    return path.to_path_buf();
  }

  let local = working_dir.join(CONFIG_FILE_NAME);
  if local.exists() {
    return local;
  }

  ConfigDirs::new()
    .map(|dirs| dirs.jira_config_path())
    .filter(|path| path.exists())
    .unwrap_or(local)
}
