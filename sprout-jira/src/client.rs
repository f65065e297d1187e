use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use sprout_core::config::{JiraConfig, SpecialFields};
use sprout_core::service::ApiError;
use tracing::{debug, error};

use crate::consts::{AGILE_API_PATH, MAX_RESPONSE_LOG_SIZE, USER_AGENT};
use crate::models::{JiraAuth, JiraUser};
use crate::payload::PayloadBuilder;

/// Represents a Jira API client
pub struct JiraClient {
  pub(crate) client: Client,
  pub(crate) jira_url: String,
  pub(crate) api_base_url: String,
  pub(crate) auth: JiraAuth,
  pub(crate) special_fields: SpecialFields,
  pub(crate) default_project: Option<String>,
}

impl JiraClient {
  /// Create a new Jira client
  ///
  /// The configured timeout applies to every request; a request that runs
  /// past it fails with [`ApiError::Timeout`].
  pub fn new(config: &JiraConfig) -> Result<Self> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let client = Client::builder()
      .user_agent(USER_AGENT)
      .default_headers(headers)
      .timeout(config.timeout)
      .build()
      .context("Failed to build HTTP client")?;

    Ok(Self {
      client,
      jira_url: config.jira_url.clone(),
      api_base_url: config.api_base_url(),
      auth: JiraAuth {
        api_token: config.jira_token.clone(),
      },
      special_fields: config.special_fields.clone(),
      default_project: config.project.clone(),
    })
  }

  pub(crate) fn api_url(&self, path: &str) -> String {
    format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
  }

  pub(crate) fn agile_url(&self, path: &str) -> String {
    format!("{}{AGILE_API_PATH}/{}", self.jira_url, path.trim_start_matches('/'))
  }

  pub(crate) fn payloads(&self) -> PayloadBuilder<'_> {
    PayloadBuilder::new(&self.special_fields, self.default_project.as_deref())
  }

  /// Start an authenticated request
  pub(crate) fn request(&self, method: Method, url: &str) -> RequestBuilder {
    debug!("Sending a Jira {method} request to \"{url}\"");
    self.client.request(method, url).bearer_auth(&self.auth.api_token)
  }

  /// Send a request, turning transport failures and non-2xx responses into
  /// [`ApiError`]s
  pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
    let response = request.send().await.map_err(map_transport_error)?;
    let status = response.status();

    if status.is_success() {
      return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    error!("Jira API request failed with HTTP {status}: {body}");
    Err(ApiError::Status {
      status: status.as_u16(),
      body,
    })
  }

  /// Read and parse a JSON response body
  pub(crate) async fn read_json<T: DeserializeOwned>(&self, response: Response) -> Result<T, ApiError> {
    let body = response.text().await.map_err(map_transport_error)?;
    log_response_body(&body);
    serde_json::from_str(&body).map_err(|err| ApiError::InvalidResponse(format!("{err}: {body}")))
  }

  /// Test the Jira connection by fetching the current user
  pub async fn test_connection(&self) -> Result<bool> {
    let url = self.api_url("myself");

    let response = self
      .request(Method::GET, &url)
      .send()
      .await
      .context("Failed to connect to Jira")?;

    if !response.status().is_success() {
      error!(
        "Failed to validate Jira URL or token. The Jira API request responded with a \"{}\" status code.",
        response.status()
      );
      return Ok(false);
    }

    if let Ok(user) = response.json::<JiraUser>().await {
      debug!(
        "Authenticated as {}",
        user.display_name.or(user.name).unwrap_or_else(|| "<unknown>".to_string())
      );
    }
    Ok(true)
  }

  /// Where personal access tokens are created on this Jira instance
  pub fn token_help_url(&self) -> String {
    format!(
      "{}/secure/ViewProfile.jspa?selectedTab=com.atlassian.pats.pats-plugin:jira-user-personal-access-tokens",
      self.jira_url
    )
  }
}

fn map_transport_error(err: reqwest::Error) -> ApiError {
  if err.is_timeout() {
    ApiError::Timeout(err.to_string())
  } else {
    ApiError::Transport(err.to_string())
  }
}

fn log_response_body(body: &str) {
  if body.len() <= MAX_RESPONSE_LOG_SIZE {
    debug!("Request response: {body}");
  } else {
    debug!("Request response is too large to log (size: {} bytes)", body.len());
  }
}

/// Create a Jira client from the loaded configuration
pub fn create_jira_client(config: &JiraConfig) -> Result<JiraClient> {
  JiraClient::new(config)
}
