use sprout_core::model::{Fields, IssueType};
use sprout_core::service::{ApiError, IssueService, ParentRef};

use crate::client::JiraClient;

impl IssueService for JiraClient {
  async fn create_issue(
    &self,
    issue_type: &IssueType,
    fields: &Fields,
    parent: Option<&ParentRef>,
  ) -> Result<String, ApiError> {
    JiraClient::create_issue(self, issue_type, fields, parent).await
  }

  async fn link_issue(&self, child_key: &str, parent_key: &str, link_type: &str) -> Result<(), ApiError> {
    JiraClient::link_issue(self, child_key, parent_key, link_type).await
  }

  async fn update_fields(&self, key: &str, fields: &Fields) -> Result<(), ApiError> {
    JiraClient::update_fields(self, key, fields).await
  }
}
