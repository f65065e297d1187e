//! # Issue Tree Model
//!
//! Types describing the issue tree read from the issues file: Jira issue
//! types, dynamic field values and the nodes themselves.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Field name holding explicit cross-references to other issues
pub const ISSUE_LINKS_FIELD: &str = "issuelinks";

/// Field name holding the issue summary
pub const SUMMARY_FIELD: &str = "summary";

/// A Jira issue type
///
/// Parsed case-insensitively from the issues file (`epic`, `Story`,
/// `sub-task`, `Subtask`, ...). Anything that is not one of the standard
/// hierarchy levels is kept verbatim as [`IssueType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IssueType {
  Epic,
  Story,
  Task,
  SubTask,
  Other(String),
}

impl IssueType {
  /// The name Jira uses for this issue type
  pub fn jira_name(&self) -> &str {
    match self {
      IssueType::Epic => "Epic",
      IssueType::Story => "Story",
      IssueType::Task => "Task",
      IssueType::SubTask => "Sub-task",
      IssueType::Other(name) => name,
    }
  }

  pub const fn is_sub_task(&self) -> bool {
    matches!(self, IssueType::SubTask)
  }

  pub const fn is_epic(&self) -> bool {
    matches!(self, IssueType::Epic)
  }

  /// Template context key under which descendants can reference an issue of
  /// this type
  pub const fn context_alias(&self) -> Option<&'static str> {
    match self {
      IssueType::Epic => Some("epic_key"),
      IssueType::Story => Some("story_key"),
      IssueType::Task => Some("task_key"),
      IssueType::SubTask | IssueType::Other(_) => None,
    }
  }
}

impl From<String> for IssueType {
  fn from(value: String) -> Self {
    let normalized: String = value
      .trim()
      .chars()
      .filter(|c| !matches!(c, '-' | '_' | ' '))
      .collect::<String>()
      .to_ascii_lowercase();

    match normalized.as_str() {
      "epic" => IssueType::Epic,
      "story" => IssueType::Story,
      "task" => IssueType::Task,
      "subtask" => IssueType::SubTask,
      _ => IssueType::Other(value.trim().to_string()),
    }
  }
}

impl From<&str> for IssueType {
  fn from(value: &str) -> Self {
    IssueType::from(value.to_string())
  }
}

impl From<IssueType> for String {
  fn from(value: IssueType) -> Self {
    value.jira_name().to_string()
  }
}

impl fmt::Display for IssueType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.jira_name())
  }
}

/// A dynamically typed field value
///
/// Jira custom fields vary per project, so field maps are not given a fixed
/// schema. Values keep the shape they had in YAML and are serialized to JSON
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
  Null,
  Bool(bool),
  Integer(i64),
  Float(f64),
  String(String),
  List(Vec<FieldValue>),
  Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
  pub fn as_str(&self) -> Option<&str> {
    match self {
      FieldValue::String(value) => Some(value),
      _ => None,
    }
  }

  pub fn as_map(&self) -> Option<&BTreeMap<String, FieldValue>> {
    match self {
      FieldValue::Map(map) => Some(map),
      _ => None,
    }
  }

  pub fn as_list(&self) -> Option<&[FieldValue]> {
    match self {
      FieldValue::List(items) => Some(items),
      _ => None,
    }
  }
}

impl From<&str> for FieldValue {
  fn from(value: &str) -> Self {
    FieldValue::String(value.to_string())
  }
}

impl From<String> for FieldValue {
  fn from(value: String) -> Self {
    FieldValue::String(value)
  }
}

impl From<i64> for FieldValue {
  fn from(value: i64) -> Self {
    FieldValue::Integer(value)
  }
}

impl From<bool> for FieldValue {
  fn from(value: bool) -> Self {
    FieldValue::Bool(value)
  }
}

/// Mapping from field name to value
pub type Fields = BTreeMap<String, FieldValue>;

/// One Jira issue to create, with the issues nested underneath it
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IssueNode {
  #[serde(rename = "type", alias = "issuetype")]
  pub issue_type: IssueType,

  /// Fields sent when the issue is created
  #[serde(default)]
  pub fields: Fields,

  /// Fields set with a separate update once the issue exists
  #[serde(default)]
  pub post_fields: Fields,

  /// Link type used when this issue is linked to its parent
  #[serde(default, alias = "linkType")]
  pub link_type: Option<String>,

  #[serde(default, alias = "issues")]
  pub children: Vec<IssueNode>,
}

impl IssueNode {
  pub fn new(issue_type: impl Into<IssueType>, summary: &str) -> Self {
    let mut fields = Fields::new();
    fields.insert(SUMMARY_FIELD.to_string(), FieldValue::from(summary));
    Self {
      issue_type: issue_type.into(),
      fields,
      post_fields: Fields::new(),
      link_type: None,
      children: Vec::new(),
    }
  }

  pub fn with_child(mut self, child: IssueNode) -> Self {
    self.children.push(child);
    self
  }

  pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
    self.fields.insert(name.to_string(), value.into());
    self
  }

  pub fn with_post_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
    self.post_fields.insert(name.to_string(), value.into());
    self
  }

  /// The summary as written in the issues file, before templating
  pub fn summary(&self) -> &str {
    self
      .fields
      .get(SUMMARY_FIELD)
      .and_then(FieldValue::as_str)
      .unwrap_or("<no summary>")
  }

  /// Number of nodes below this one
  pub fn descendant_count(&self) -> usize {
    self
      .children
      .iter()
      .map(|child| 1 + child.descendant_count())
      .sum()
  }
}
