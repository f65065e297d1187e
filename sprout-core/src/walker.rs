//! # Issue Tree Walker
//!
//! Creates the issue tree depth-first, in pre-order. Each node is rendered
//! against the keys of its ancestors, created, linked and updated before any
//! of its children are looked at. A node that fails takes its whole subtree
//! with it; siblings carry on.

use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::JiraConfig;
use crate::model::{FieldValue, Fields, ISSUE_LINKS_FIELD, IssueNode, IssueType, SUMMARY_FIELD};
use crate::service::{ApiError, IssueService, ParentRef};
use crate::template::{TemplateContext, TemplateError, render_fields, render_value};

/// Link type used when a node does not name one
pub const DEFAULT_LINK_TYPE: &str = "Related";

/// Template key holding the key of the direct parent
pub const PARENT_KEY: &str = "parent_key";

/// Template key holding the key of the top-level ancestor
pub const ROOT_KEY: &str = "root_key";

/// Outcome of a single node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationStatus {
  /// Only held while the node is being processed; a finished
  /// [`WalkReport`] never contains it
  Pending,
  Created,
  /// Created, and post-creation fields were applied
  Updated,
  Failed(String),
}

/// What happened to one node of the issue tree
#[derive(Debug, Clone, PartialEq)]
pub struct CreationResult {
  pub issue_type: IssueType,
  pub summary: String,
  /// Key assigned by Jira, if the issue was created
  pub key: Option<String>,
  /// Key of the parent issue this node was created under
  pub parent_key: Option<String>,
  pub status: CreationStatus,
  /// Descendants never attempted because this node failed
  pub skipped_descendants: usize,
}

impl CreationResult {
  fn pending(node: &IssueNode, parent_key: Option<String>) -> Self {
    Self {
      issue_type: node.issue_type.clone(),
      summary: node.summary().to_string(),
      key: None,
      parent_key,
      status: CreationStatus::Pending,
      skipped_descendants: 0,
    }
  }

  pub const fn is_failed(&self) -> bool {
    matches!(self.status, CreationStatus::Failed(_))
  }

  pub fn failure_reason(&self) -> Option<&str> {
    match &self.status {
      CreationStatus::Failed(reason) => Some(reason),
      _ => None,
    }
  }
}

/// Reasons a node could not be processed
#[derive(Debug, Error)]
pub enum CreationError {
  #[error(transparent)]
  Template(#[from] TemplateError),

  #[error(transparent)]
  Api(#[from] ApiError),

  #[error("Invalid '{field}' value: {reason}")]
  InvalidField { field: String, reason: String },
}

/// Results of a complete walk, in tree pre-order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalkReport {
  pub results: Vec<CreationResult>,
}

impl WalkReport {
  pub fn failures(&self) -> impl Iterator<Item = &CreationResult> {
    self.results.iter().filter(|result| result.is_failed())
  }

  pub fn failure_count(&self) -> usize {
    self.failures().count()
  }

  /// Issues that exist in Jira after the run, including ones whose follow-up
  /// steps failed
  pub fn created_count(&self) -> usize {
    self.results.iter().filter(|result| result.key.is_some()).count()
  }

  pub fn skipped_count(&self) -> usize {
    self.results.iter().map(|result| result.skipped_descendants).sum()
  }

  pub fn is_success(&self) -> bool {
    self.failure_count() == 0
  }
}

/// A cross reference from the `issuelinks` field
#[derive(Debug, Clone, PartialEq, Eq)]
struct IssueLink {
  link_type: String,
  target_key: String,
}

/// Template context and parent information handed down to children
#[derive(Debug, Clone, Default)]
struct Ancestry {
  context: TemplateContext,
  parent: Option<(String, IssueType)>,
}

impl Ancestry {
  fn parent_key(&self) -> Option<&str> {
    self.parent.as_ref().map(|(key, _)| key.as_str())
  }

  fn epic_key(&self) -> Option<&str> {
    IssueType::Epic
      .context_alias()
      .and_then(|alias| self.context.get(alias))
      .map(String::as_str)
  }

  fn descend(&self, key: &str, issue_type: &IssueType) -> Ancestry {
    let mut context = self.context.clone();
    context.insert(PARENT_KEY.to_string(), key.to_string());
    context
      .entry(ROOT_KEY.to_string())
      .or_insert_with(|| key.to_string());
    if let Some(alias) = issue_type.context_alias() {
      context.insert(alias.to_string(), key.to_string());
    }

    Ancestry {
      context,
      parent: Some((key.to_string(), issue_type.clone())),
    }
  }
}

/// Walks an issue tree and creates every node through an [`IssueService`]
pub struct IssueTreeWalker<'a, S> {
  config: &'a JiraConfig,
  service: &'a S,
}

impl<'a, S: IssueService> IssueTreeWalker<'a, S> {
  pub const fn new(config: &'a JiraConfig, service: &'a S) -> Self {
    Self { config, service }
  }

  /// Create every node of the tree
  ///
  /// Returns one result per attempted node, in pre-order. Descendants of a
  /// failed node are never attempted and do not appear in the report.
  pub async fn walk(&self, roots: &[IssueNode]) -> WalkReport {
    let mut results = Vec::new();
    let mut stack: Vec<(&IssueNode, Ancestry)> = roots
      .iter()
      .rev()
      .map(|node| (node, Ancestry::default()))
      .collect();

    while let Some((node, ancestry)) = stack.pop() {
      let mut result = CreationResult::pending(node, ancestry.parent_key().map(str::to_string));

      match self.process(node, &ancestry, &mut result).await {
        Ok(key) => {
          let child_ancestry = ancestry.descend(&key, &node.issue_type);
          stack.extend(
            node
              .children
              .iter()
              .rev()
              .map(|child| (child, child_ancestry.clone())),
          );
        }
        Err(err) => {
          result.skipped_descendants = node.descendant_count();
          error!(
            "Failed to create {} \"{}\": {err} ({} descendant(s) skipped)",
            node.issue_type, result.summary, result.skipped_descendants
          );
          result.status = CreationStatus::Failed(err.to_string());
        }
      }

      results.push(result);
    }

    WalkReport { results }
  }

  /// Run one node through its lifecycle, returning the created key
  async fn process(
    &self,
    node: &IssueNode,
    ancestry: &Ancestry,
    result: &mut CreationResult,
  ) -> Result<String, CreationError> {
    let (create_fields, post_fields) = self.split_fields(node);
    let create_fields = render_fields(&create_fields, &ancestry.context)?;
    let post_fields = render_fields(&post_fields, &ancestry.context)?;
    let links = match node.fields.get(ISSUE_LINKS_FIELD) {
      Some(value) => parse_issue_links(&render_value(value, &ancestry.context)?)?,
      None => Vec::new(),
    };

    if let Some(summary) = create_fields.get(SUMMARY_FIELD).and_then(FieldValue::as_str) {
      result.summary = summary.to_string();
    }

    let parent_ref = parent_ref_for(node, ancestry);
    info!("Creating {} \"{}\"", node.issue_type, result.summary);
    let key = self
      .service
      .create_issue(&node.issue_type, &create_fields, parent_ref.as_ref())
      .await?;
    result.key = Some(key.clone());
    result.status = CreationStatus::Created;
    info!("Created {key}: {}", self.config.browse_url(&key));

    if let Some((parent_key, parent_type)) = &ancestry.parent
      && needs_explicit_link(&node.issue_type, parent_type)
    {
      let link_type = node.link_type.as_deref().unwrap_or(DEFAULT_LINK_TYPE);
      debug!("Requesting a \"{link_type}\" link between {key} --> {parent_key}");
      self.service.link_issue(&key, parent_key, link_type).await?;
    }

    for link in &links {
      debug!(
        "Requesting a \"{}\" link between {key} --> {}",
        link.link_type, link.target_key
      );
      self
        .service
        .link_issue(&key, &link.target_key, &link.link_type)
        .await?;
    }

    if !post_fields.is_empty() {
      debug!("Updating {key} with post-creation fields");
      self.service.update_fields(&key, &post_fields).await?;
      result.status = CreationStatus::Updated;
    }

    Ok(key)
  }

  /// Split a node's fields into those sent on creation and those applied
  /// afterwards
  fn split_fields(&self, node: &IssueNode) -> (Fields, Fields) {
    let special = &self.config.special_fields;
    let mut create_fields = Fields::new();
    let mut post_fields = Fields::new();

    for (name, value) in &node.fields {
      if name == ISSUE_LINKS_FIELD {
        continue;
      }
      if special.is_post_creation(name) {
        post_fields.insert(name.clone(), value.clone());
      } else {
        create_fields.insert(name.clone(), value.clone());
      }
    }
    post_fields.extend(node.post_fields.iter().map(|(name, value)| (name.clone(), value.clone())));

    (create_fields, post_fields)
  }
}

/// How the node is attached to its ancestors at creation time
fn parent_ref_for(node: &IssueNode, ancestry: &Ancestry) -> Option<ParentRef> {
  let (parent_key, _) = ancestry.parent.as_ref()?;

  if node.issue_type.is_sub_task() {
    return Some(ParentRef::Parent(parent_key.clone()));
  }
  if node.issue_type.is_epic() {
    return None;
  }
  ancestry.epic_key().map(|epic_key| ParentRef::Epic(epic_key.to_string()))
}

/// Nested issues that are neither sub-tasks nor direct epic children are
/// tied to their parent with an issue link
fn needs_explicit_link(issue_type: &IssueType, parent_type: &IssueType) -> bool {
  !issue_type.is_sub_task() && !parent_type.is_epic()
}

fn invalid_link(reason: &str) -> CreationError {
  CreationError::InvalidField {
    field: ISSUE_LINKS_FIELD.to_string(),
    reason: reason.to_string(),
  }
}

/// Parse `issuelinks` entries of the form
/// `{type: {name: Blocks}, outwardIssue: {key: PROJ-1}}`
///
/// `type` may also be a plain string and the target may be given as `key`.
fn parse_issue_links(value: &FieldValue) -> Result<Vec<IssueLink>, CreationError> {
  let entries = value
    .as_list()
    .ok_or_else(|| invalid_link("expected a list of links"))?;

  entries
    .iter()
    .map(|entry| {
      let entry = entry
        .as_map()
        .ok_or_else(|| invalid_link("each link must be a mapping"))?;

      let link_type = match entry.get("type") {
        Some(FieldValue::String(name)) => name.clone(),
        Some(FieldValue::Map(map)) => map
          .get("name")
          .and_then(FieldValue::as_str)
          .unwrap_or(DEFAULT_LINK_TYPE)
          .to_string(),
        _ => DEFAULT_LINK_TYPE.to_string(),
      };

      let target_key = entry
        .get("outwardIssue")
        .and_then(FieldValue::as_map)
        .and_then(|issue| issue.get("key"))
        .or_else(|| entry.get("key"))
        .and_then(FieldValue::as_str)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| invalid_link("link is missing 'outwardIssue.key'"))?;

      Ok(IssueLink {
        link_type,
        target_key: target_key.to_string(),
      })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;
  use std::collections::VecDeque;

  use super::*;

  #[derive(Debug, Clone, PartialEq)]
  enum Call {
    Create {
      summary: String,
      issue_type: IssueType,
      fields: Fields,
      parent: Option<ParentRef>,
    },
    Link {
      child: String,
      parent: String,
      link_type: String,
    },
    Update {
      key: String,
      fields: Fields,
    },
  }

  /// Hands out keys in order and records every call
  #[derive(Default)]
  struct StubService {
    keys: RefCell<VecDeque<String>>,
    calls: RefCell<Vec<Call>>,
    fail_create_for: Vec<String>,
    fail_link: bool,
    fail_update: bool,
  }

  impl StubService {
    fn with_keys(keys: &[&str]) -> Self {
      Self {
        keys: RefCell::new(keys.iter().map(|key| key.to_string()).collect()),
        ..Default::default()
      }
    }

    fn failing_on(mut self, summary: &str) -> Self {
      self.fail_create_for.push(summary.to_string());
      self
    }

    fn calls(&self) -> Vec<Call> {
      self.calls.borrow().clone()
    }

    fn created_summaries(&self) -> Vec<String> {
      self
        .calls()
        .into_iter()
        .filter_map(|call| match call {
          Call::Create { summary, .. } => Some(summary),
          _ => None,
        })
        .collect()
    }
  }

  impl IssueService for StubService {
    async fn create_issue(
      &self,
      issue_type: &IssueType,
      fields: &Fields,
      parent: Option<&ParentRef>,
    ) -> Result<String, ApiError> {
      let summary = fields
        .get(SUMMARY_FIELD)
        .and_then(FieldValue::as_str)
        .unwrap_or_default()
        .to_string();
      self.calls.borrow_mut().push(Call::Create {
        summary: summary.clone(),
        issue_type: issue_type.clone(),
        fields: fields.clone(),
        parent: parent.cloned(),
      });

      if self.fail_create_for.contains(&summary) {
        return Err(ApiError::Status {
          status: 400,
          body: "{\"errors\":{\"summary\":\"rejected\"}}".to_string(),
        });
      }
      self
        .keys
        .borrow_mut()
        .pop_front()
        .ok_or_else(|| ApiError::InvalidResponse("stub ran out of keys".to_string()))
    }

    async fn link_issue(&self, child_key: &str, parent_key: &str, link_type: &str) -> Result<(), ApiError> {
      self.calls.borrow_mut().push(Call::Link {
        child: child_key.to_string(),
        parent: parent_key.to_string(),
        link_type: link_type.to_string(),
      });
      if self.fail_link {
        return Err(ApiError::Status {
          status: 404,
          body: "No issue link type with name found".to_string(),
        });
      }
      Ok(())
    }

    async fn update_fields(&self, key: &str, fields: &Fields) -> Result<(), ApiError> {
      self.calls.borrow_mut().push(Call::Update {
        key: key.to_string(),
        fields: fields.clone(),
      });
      if self.fail_update {
        return Err(ApiError::Timeout("operation timed out".to_string()));
      }
      Ok(())
    }
  }

  fn config() -> JiraConfig {
    JiraConfig::new("https://jira.example.com", "token").unwrap()
  }

  fn epic_with_two_stories() -> Vec<IssueNode> {
    vec![
      IssueNode::new(IssueType::Epic, "Epic")
        .with_child(IssueNode::new(IssueType::Story, "Story one"))
        .with_child(IssueNode::new(IssueType::Story, "Story two")),
    ]
  }

  #[tokio::test]
  async fn test_epic_with_two_stories() {
    let config = config();
    let service = StubService::with_keys(&["EPIC-1", "STORY-1", "STORY-2"]);

    let report = IssueTreeWalker::new(&config, &service)
      .walk(&epic_with_two_stories())
      .await;

    let keys: Vec<_> = report.results.iter().map(|r| r.key.as_deref()).collect();
    assert_eq!(keys, vec![Some("EPIC-1"), Some("STORY-1"), Some("STORY-2")]);
    assert_eq!(report.results[0].parent_key, None);
    assert_eq!(report.results[1].parent_key.as_deref(), Some("EPIC-1"));
    assert_eq!(report.results[2].parent_key.as_deref(), Some("EPIC-1"));
    assert!(report.is_success());
    assert_eq!(report.created_count(), 3);

    let calls = service.calls();
    assert_eq!(calls.len(), 3, "direct epic children need no explicit link");
    assert!(matches!(
      &calls[1],
      Call::Create { parent: Some(ParentRef::Epic(key)), .. } if key == "EPIC-1"
    ));
  }

  #[tokio::test]
  async fn test_failed_sibling_does_not_affect_others() {
    let config = config();
    let service = StubService::with_keys(&["EPIC-1", "STORY-1"]).failing_on("Story two");

    let report = IssueTreeWalker::new(&config, &service)
      .walk(&epic_with_two_stories())
      .await;

    assert!(!report.is_success());
    assert_eq!(report.results.len(), 3);
    assert_eq!(report.results[1].status, CreationStatus::Created);
    assert_eq!(report.results[1].key.as_deref(), Some("STORY-1"));

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].summary, "Story two");
    assert!(failures[0].failure_reason().unwrap().contains("HTTP 400"));
  }

  #[tokio::test]
  async fn test_failed_parent_skips_subtree() {
    let config = config();
    let service = StubService::with_keys(&["TASK-9"]).failing_on("Story one");
    let roots = vec![
      IssueNode::new(IssueType::Story, "Story one")
        .with_child(IssueNode::new(IssueType::SubTask, "Sub one"))
        .with_child(IssueNode::new(IssueType::SubTask, "Sub two").with_child(IssueNode::new(IssueType::Task, "deep"))),
      IssueNode::new(IssueType::Task, "Sibling task"),
    ];

    let report = IssueTreeWalker::new(&config, &service).walk(&roots).await;

    assert_eq!(service.created_summaries(), vec!["Story one", "Sibling task"]);
    assert_eq!(report.results.len(), 2);
    assert_eq!(report.results[0].skipped_descendants, 3);
    assert_eq!(report.skipped_count(), 3);
    assert_eq!(report.results[1].key.as_deref(), Some("TASK-9"));
  }

  #[tokio::test]
  async fn test_pre_order_and_parents_before_children() {
    let config = config();
    let service = StubService::with_keys(&["P-1", "P-2", "P-3", "P-4", "P-5"]);
    let roots = vec![
      IssueNode::new(IssueType::Epic, "a")
        .with_child(IssueNode::new(IssueType::Story, "a.1").with_child(IssueNode::new(IssueType::SubTask, "a.1.1")))
        .with_child(IssueNode::new(IssueType::Story, "a.2")),
      IssueNode::new(IssueType::Task, "b"),
    ];

    let report = IssueTreeWalker::new(&config, &service).walk(&roots).await;

    assert_eq!(service.created_summaries(), vec!["a", "a.1", "a.1.1", "a.2", "b"]);
    let results = &report.results;
    assert_eq!(results[2].parent_key.as_deref(), Some("P-2"));
    assert_eq!(results[3].parent_key.as_deref(), Some("P-1"));
    assert_eq!(results[4].parent_key, None);

    // Every parent key was handed out before the child was created.
    for (index, result) in results.iter().enumerate() {
      if let Some(parent_key) = &result.parent_key {
        assert!(results[..index].iter().any(|r| r.key.as_ref() == Some(parent_key)));
      }
    }
  }

  #[tokio::test]
  async fn test_sub_task_uses_parent_field_and_nested_story_is_linked() {
    let config = config();
    let service = StubService::with_keys(&["E-1", "S-1", "T-1", "S-2"]);
    let mut nested = IssueNode::new(IssueType::Story, "follow-up");
    nested.link_type = Some("Blocks".to_string());
    let roots = vec![
      IssueNode::new(IssueType::Epic, "epic").with_child(
        IssueNode::new(IssueType::Story, "story")
          .with_child(IssueNode::new(IssueType::SubTask, "sub"))
          .with_child(nested),
      ),
    ];

    IssueTreeWalker::new(&config, &service).walk(&roots).await;

    let calls = service.calls();
    assert!(matches!(
      &calls[2],
      Call::Create { issue_type: IssueType::SubTask, parent: Some(ParentRef::Parent(key)), .. } if key == "S-1"
    ));
    assert!(matches!(
      &calls[3],
      Call::Create { parent: Some(ParentRef::Epic(key)), .. } if key == "E-1"
    ));
    assert_eq!(
      calls[4],
      Call::Link {
        child: "S-2".to_string(),
        parent: "S-1".to_string(),
        link_type: "Blocks".to_string(),
      }
    );
  }

  #[tokio::test]
  async fn test_placeholders_resolve_against_ancestors() {
    let config = config();
    let service = StubService::with_keys(&["E-1", "S-1", "T-1"]);
    let roots = vec![
      IssueNode::new(IssueType::Epic, "epic").with_child(
        IssueNode::new(IssueType::Story, "story for {epic_key}").with_child(
          IssueNode::new(IssueType::SubTask, "sub of {parent_key}")
            .with_field("description", "root {root_key}, story {story_key}"),
        ),
      ),
    ];

    let report = IssueTreeWalker::new(&config, &service).walk(&roots).await;

    assert_eq!(service.created_summaries(), vec!["epic", "story for E-1", "sub of S-1"]);
    assert_eq!(report.results[2].summary, "sub of S-1");
    let Call::Create { fields, .. } = &service.calls()[2] else {
      panic!("expected a create call");
    };
    assert_eq!(fields["description"], FieldValue::from("root E-1, story S-1"));
  }

  #[tokio::test]
  async fn test_unresolved_placeholder_fails_node_before_creation() {
    let config = config();
    let service = StubService::with_keys(&["T-1"]);
    let roots = vec![
      IssueNode::new(IssueType::Task, "under {epic_key}").with_child(IssueNode::new(IssueType::SubTask, "child")),
      IssueNode::new(IssueType::Task, "fine"),
    ];

    let report = IssueTreeWalker::new(&config, &service).walk(&roots).await;

    assert_eq!(service.created_summaries(), vec!["fine"]);
    assert_eq!(report.failure_count(), 1);
    assert!(report.results[0].failure_reason().unwrap().contains("epic_key"));
    assert_eq!(report.results[0].key, None);
  }

  #[tokio::test]
  async fn test_post_creation_fields() {
    let mut config = config();
    config.special_fields.post_creation_update_fields = vec!["story_points".to_string()];
    let service = StubService::with_keys(&["S-1"]);
    let roots = vec![
      IssueNode::new(IssueType::Story, "story")
        .with_field("story_points", 5_i64)
        .with_post_field("sprint", "Sprint {parent_key}"),
    ];

    let report = IssueTreeWalker::new(&config, &service).walk(&roots).await;
    assert_eq!(report.failure_count(), 1, "parent_key is not available at the root");

    let roots = vec![
      IssueNode::new(IssueType::Story, "story")
        .with_field("story_points", 5_i64)
        .with_post_field("labels", FieldValue::List(vec![FieldValue::from("x")])),
    ];
    let service = StubService::with_keys(&["S-2"]);
    let report = IssueTreeWalker::new(&config, &service).walk(&roots).await;

    assert_eq!(report.results[0].status, CreationStatus::Updated);
    let calls = service.calls();
    let Call::Create { fields, .. } = &calls[0] else {
      panic!("expected a create call");
    };
    assert!(!fields.contains_key("story_points"));
    let Call::Update { key, fields } = &calls[1] else {
      panic!("expected an update call");
    };
    assert_eq!(key, "S-2");
    assert_eq!(fields["story_points"], FieldValue::Integer(5));
    assert!(fields.contains_key("labels"));
  }

  #[tokio::test]
  async fn test_failed_update_keeps_key_and_skips_children() {
    let config = config();
    let mut service = StubService::with_keys(&["S-1", "S-2"]);
    service.fail_update = true;
    let roots = vec![
      IssueNode::new(IssueType::Story, "story")
        .with_post_field("story_points", 3_i64)
        .with_child(IssueNode::new(IssueType::SubTask, "sub")),
    ];

    let report = IssueTreeWalker::new(&config, &service).walk(&roots).await;

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].key.as_deref(), Some("S-1"));
    assert!(report.results[0].is_failed());
    assert_eq!(report.results[0].skipped_descendants, 1);
    assert_eq!(report.created_count(), 1);
  }

  #[tokio::test]
  async fn test_issue_links_field() {
    let config = config();
    let service = StubService::with_keys(&["T-1"]);
    let links: FieldValue = serde_yaml::from_str(
      r#"
- type: { name: Blocks }
  outwardIssue: { key: OPS-7 }
- key: OPS-8
"#,
    )
    .unwrap();
    let roots = vec![IssueNode::new(IssueType::Task, "task").with_field(ISSUE_LINKS_FIELD, links)];

    IssueTreeWalker::new(&config, &service).walk(&roots).await;

    let calls = service.calls();
    let Call::Create { fields, .. } = &calls[0] else {
      panic!("expected a create call");
    };
    assert!(!fields.contains_key(ISSUE_LINKS_FIELD));
    assert_eq!(
      calls[1..],
      [
        Call::Link {
          child: "T-1".to_string(),
          parent: "OPS-7".to_string(),
          link_type: "Blocks".to_string(),
        },
        Call::Link {
          child: "T-1".to_string(),
          parent: "OPS-8".to_string(),
          link_type: DEFAULT_LINK_TYPE.to_string(),
        },
      ]
    );
  }

  #[tokio::test]
  async fn test_issue_links_targets_are_templated() {
    let config = config();
    let service = StubService::with_keys(&["T-1", "T-2"]);
    let links: FieldValue = serde_yaml::from_str("- type: { name: Blocks }\n  outwardIssue: { key: '{parent_key}' }\n").unwrap();
    let roots = vec![
      IssueNode::new(IssueType::Task, "parent")
        .with_child(IssueNode::new(IssueType::Task, "child").with_field(ISSUE_LINKS_FIELD, links)),
    ];

    let report = IssueTreeWalker::new(&config, &service).walk(&roots).await;

    assert!(report.is_success());
    assert_eq!(
      service.calls().last(),
      Some(&Call::Link {
        child: "T-2".to_string(),
        parent: "T-1".to_string(),
        link_type: "Blocks".to_string(),
      })
    );
  }

  #[tokio::test]
  async fn test_failed_explicit_link_keeps_key_and_skips_children() {
    let config = config();
    let mut service = StubService::with_keys(&["S-1", "T-1", "ST-1"]);
    service.fail_link = true;
    let roots = vec![
      IssueNode::new(IssueType::Story, "story").with_child(
        IssueNode::new(IssueType::Task, "task").with_child(IssueNode::new(IssueType::SubTask, "sub")),
      ),
    ];

    let report = IssueTreeWalker::new(&config, &service).walk(&roots).await;

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.results[0].status, CreationStatus::Created);
    assert_eq!(report.results[1].key.as_deref(), Some("T-1"));
    assert!(report.results[1].is_failed());
    assert!(report.results[1].failure_reason().unwrap().contains("404"));
    assert_eq!(report.results[1].skipped_descendants, 1);
    assert_eq!(service.created_summaries(), vec!["story", "task"]);
    assert!(report.results.iter().all(|result| result.status != CreationStatus::Pending));
  }

  #[tokio::test]
  async fn test_failed_issue_link_keeps_key_and_skips_children() {
    let config = config();
    let mut service = StubService::with_keys(&["T-1", "ST-1"]);
    service.fail_link = true;
    let links: FieldValue = serde_yaml::from_str("- key: OPS-7\n").unwrap();
    let roots = vec![
      IssueNode::new(IssueType::Task, "task")
        .with_field(ISSUE_LINKS_FIELD, links)
        .with_child(IssueNode::new(IssueType::SubTask, "sub")),
    ];

    let report = IssueTreeWalker::new(&config, &service).walk(&roots).await;

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].key.as_deref(), Some("T-1"));
    assert!(report.results[0].is_failed());
    assert_eq!(report.results[0].skipped_descendants, 1);
    assert_eq!(report.failure_count(), 1);
    assert_eq!(report.created_count(), 1);
  }

  #[tokio::test]
  async fn test_malformed_issue_links_fail_the_node() {
    let config = config();
    let service = StubService::with_keys(&["T-1"]);
    let roots = vec![IssueNode::new(IssueType::Task, "task").with_field(ISSUE_LINKS_FIELD, "OPS-7")];

    let report = IssueTreeWalker::new(&config, &service).walk(&roots).await;

    assert!(service.calls().is_empty());
    assert!(report.results[0].failure_reason().unwrap().contains(ISSUE_LINKS_FIELD));
  }
}
