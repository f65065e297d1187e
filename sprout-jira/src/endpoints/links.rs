//! # Jira Issue Link Endpoints

use reqwest::Method;
use sprout_core::service::ApiError;
use tracing::info;

use crate::client::JiraClient;
use crate::models::IssueLinkRequest;

impl JiraClient {
  /// Link `child_key` (inward) to `parent_key` (outward)
  pub async fn link_issue(&self, child_key: &str, parent_key: &str, link_type: &str) -> Result<(), ApiError> {
    let link = IssueLinkRequest::new(child_key, parent_key, link_type);
    let request = self.request(Method::POST, &self.api_url("issueLink")).json(&link);
    self.send(request).await?;

    info!("Linked {child_key} to {parent_key} ({link_type})");
    Ok(())
  }
}
