//! # Jira Issue Endpoints
//!
//! Creating issues and updating their fields.

use std::borrow::Cow;

use reqwest::{Method, StatusCode};
use sprout_core::model::{FieldValue, Fields, IssueType};
use sprout_core::service::{ApiError, ParentRef};
use tracing::{debug, info};

use crate::client::JiraClient;
use crate::models::CreatedIssue;

const SPRINT_FIELD: &str = "sprint";

impl JiraClient {
  /// Create a Jira issue and return its key
  pub async fn create_issue(
    &self,
    issue_type: &IssueType,
    fields: &Fields,
    parent: Option<&ParentRef>,
  ) -> Result<String, ApiError> {
    let project = self.payloads().project_key(fields).map(str::to_string);
    let fields = self.resolve_sprint(fields, project.as_deref()).await?;
    let payload = self.payloads().create_payload(issue_type, &fields, parent);
    debug!("Issue creation payload: {payload}");

    let request = self.request(Method::POST, &self.api_url("issue")).json(&payload);
    let response = self.send(request).await?;
    let created: CreatedIssue = self.read_json(response).await?;

    let key = created
      .key
      .ok_or_else(|| ApiError::InvalidResponse("issue creation response has no key".to_string()))?;
    info!("Created {issue_type} {key}");
    Ok(key)
  }

  /// Set fields on an existing issue
  pub async fn update_fields(&self, key: &str, fields: &Fields) -> Result<(), ApiError> {
    let project = key.rsplit_once('-').map(|(project, _)| project);
    let fields = self.resolve_sprint(fields, project).await?;
    let payload = self.payloads().update_payload(&fields);
    debug!("Issue update payload for {key}: {payload}");

    let request = self
      .request(Method::PUT, &self.api_url(&format!("issue/{key}")))
      .json(&payload);

    match self.send(request).await {
      Ok(_) => {
        info!("Updated fields of {key}");
        Ok(())
      }
      Err(ApiError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
        Err(ApiError::NotFound(format!("Issue {key}")))
      }
      Err(err) => Err(err),
    }
  }

  /// Replace a sprint name with its id when `sprint` maps to a custom field
  async fn resolve_sprint<'f>(&self, fields: &'f Fields, project: Option<&str>) -> Result<Cow<'f, Fields>, ApiError> {
    let Some(FieldValue::String(sprint_name)) = fields.get(SPRINT_FIELD) else {
      return Ok(Cow::Borrowed(fields));
    };
    if self.special_fields.custom_field_id(SPRINT_FIELD).is_none() {
      return Ok(Cow::Borrowed(fields));
    }
    let project = project.ok_or_else(|| ApiError::NotFound(format!("Project for sprint '{sprint_name}'")))?;

    let sprint_id = self.find_sprint_id(project, sprint_name).await?;
    let sprint_id = i64::try_from(sprint_id)
      .map_err(|err| ApiError::InvalidResponse(format!("sprint id {sprint_id}: {err}")))?;

    let mut resolved = fields.clone();
    resolved.insert(SPRINT_FIELD.to_string(), FieldValue::Integer(sprint_id));
    Ok(Cow::Owned(resolved))
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use sprout_core::config::JiraConfig;
  use wiremock::matchers::{body_json, header, method, path, query_param};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  use super::*;

  fn client_for(server: &MockServer, configure: impl FnOnce(&mut JiraConfig)) -> anyhow::Result<JiraClient> {
    let mut config = JiraConfig::new(&server.uri(), "test_token")?;
    config.project = Some("PROJ".to_string());
    configure(&mut config);
    JiraClient::new(&config)
  }

  fn summary(text: &str) -> Fields {
    Fields::from([("summary".to_string(), FieldValue::from(text))])
  }

  #[tokio::test]
  async fn test_create_issue() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server, |_| {})?;

    Mock::given(method("POST"))
      .and(path("/rest/api/2/issue"))
      .and(header("Authorization", "Bearer test_token"))
      .and(body_json(json!({
          "fields": {
              "summary": "Checkout flow",
              "project": { "key": "PROJ" },
              "issuetype": { "name": "Epic" }
          }
      })))
      .respond_with(ResponseTemplate::new(201).set_body_json(json!({
          "id": "10001",
          "key": "PROJ-1",
          "self": format!("{}/rest/api/2/issue/10001", mock_server.uri())
      })))
      .expect(1)
      .mount(&mock_server)
      .await;

    let key = client
      .create_issue(&IssueType::Epic, &summary("Checkout flow"), None)
      .await?;
    assert_eq!(key, "PROJ-1");

    Ok(())
  }

  #[tokio::test]
  async fn test_create_issue_error_status() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server, |_| {})?;

    Mock::given(method("POST"))
      .and(path("/rest/api/2/issue"))
      .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"errors":{"summary":"required"}}"#))
      .mount(&mock_server)
      .await;

    let err = client
      .create_issue(&IssueType::Task, &Fields::new(), None)
      .await
      .unwrap_err();
    match err {
      ApiError::Status { status, body } => {
        assert_eq!(status, 400);
        assert!(body.contains("required"));
      }
      other => panic!("unexpected error: {other:?}"),
    }

    Ok(())
  }

  #[tokio::test]
  async fn test_create_issue_without_key_in_response() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server, |_| {})?;

    Mock::given(method("POST"))
      .and(path("/rest/api/2/issue"))
      .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "10001" })))
      .mount(&mock_server)
      .await;

    let err = client
      .create_issue(&IssueType::Task, &summary("No key"), None)
      .await
      .unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));

    Ok(())
  }

  #[tokio::test]
  async fn test_update_fields() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server, |config| {
      config
        .special_fields
        .custom_fields
        .insert("story_points".to_string(), "customfield_10002".to_string());
    })?;

    Mock::given(method("PUT"))
      .and(path("/rest/api/2/issue/PROJ-2"))
      .and(body_json(json!({ "fields": { "customfield_10002": 3 } })))
      .respond_with(ResponseTemplate::new(204))
      .expect(1)
      .mount(&mock_server)
      .await;

    let fields = Fields::from([("story_points".to_string(), FieldValue::Integer(3))]);
    client.update_fields("PROJ-2", &fields).await?;

    Ok(())
  }

  #[tokio::test]
  async fn test_update_fields_missing_issue() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server, |_| {})?;

    Mock::given(method("PUT"))
      .and(path("/rest/api/2/issue/PROJ-404"))
      .respond_with(ResponseTemplate::new(404))
      .mount(&mock_server)
      .await;

    let err = client.update_fields("PROJ-404", &summary("x")).await.unwrap_err();
    assert_eq!(err, ApiError::NotFound("Issue PROJ-404".to_string()));

    Ok(())
  }

  #[tokio::test]
  async fn test_update_fields_resolves_sprint_name() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server, |config| {
      config
        .special_fields
        .custom_fields
        .insert("sprint".to_string(), "customfield_10020".to_string());
    })?;

    Mock::given(method("GET"))
      .and(path("/rest/agile/1.0/board"))
      .and(query_param("projectKeyOrId", "PROJ"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
          "isLast": true,
          "values": [{ "id": 7, "name": "PROJ board" }]
      })))
      .mount(&mock_server)
      .await;

    Mock::given(method("GET"))
      .and(path("/rest/agile/1.0/board/7/sprint"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
          "isLast": true,
          "values": [{ "id": 42, "name": "Sprint 12", "state": "active" }]
      })))
      .mount(&mock_server)
      .await;

    Mock::given(method("PUT"))
      .and(path("/rest/api/2/issue/PROJ-3"))
      .and(body_json(json!({ "fields": { "customfield_10020": 42 } })))
      .respond_with(ResponseTemplate::new(204))
      .expect(1)
      .mount(&mock_server)
      .await;

    let fields = Fields::from([("sprint".to_string(), FieldValue::from("Sprint 12"))]);
    client.update_fields("PROJ-3", &fields).await?;

    Ok(())
  }
}
