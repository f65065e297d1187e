use serde::{Deserialize, Serialize};

/// Represents Jira authentication credentials
#[derive(Clone)]
pub struct JiraAuth {
  pub api_token: String,
}

/// Response to an issue creation request
#[derive(Debug, Deserialize)]
pub struct CreatedIssue {
  #[allow(dead_code)]
  pub id: Option<String>,
  pub key: Option<String>,
  #[serde(rename = "self")]
  #[allow(dead_code)]
  pub self_url: Option<String>,
}

/// Reference to an issue by key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueKeyRef {
  pub key: String,
}

/// Reference to a link type by name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkTypeRef {
  pub name: String,
}

/// Represents an issue link request payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueLinkRequest {
  #[serde(rename = "type")]
  pub link_type: LinkTypeRef,
  #[serde(rename = "inwardIssue")]
  pub inward_issue: IssueKeyRef,
  #[serde(rename = "outwardIssue")]
  pub outward_issue: IssueKeyRef,
}

impl IssueLinkRequest {
  pub fn new(inward_key: &str, outward_key: &str, link_type: &str) -> Self {
    Self {
      link_type: LinkTypeRef {
        name: link_type.to_string(),
      },
      inward_issue: IssueKeyRef {
        key: inward_key.to_string(),
      },
      outward_issue: IssueKeyRef {
        key: outward_key.to_string(),
      },
    }
  }
}

/// Represents a Jira user, as returned by `/myself`
#[derive(Debug, Deserialize)]
pub struct JiraUser {
  #[serde(rename = "displayName")]
  pub display_name: Option<String>,
  pub name: Option<String>,
}

/// Represents an agile board
#[derive(Debug, Clone, Deserialize)]
pub struct Board {
  pub id: u64,
  #[allow(dead_code)]
  pub name: Option<String>,
}

/// Represents an agile sprint
#[derive(Debug, Clone, Deserialize)]
pub struct Sprint {
  pub id: u64,
  pub name: String,
  #[allow(dead_code)]
  pub state: Option<String>,
}

/// One page of an agile API listing
#[derive(Debug, Deserialize)]
pub struct Page<T> {
  pub values: Vec<T>,
  #[serde(rename = "isLast", default)]
  pub is_last: Option<bool>,
}
