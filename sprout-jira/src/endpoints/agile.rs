//! # Jira Agile Endpoints
//!
//! Board and sprint lookups used to turn sprint names into sprint IDs.

use reqwest::Method;
use sprout_core::service::ApiError;
use tracing::debug;

use crate::client::JiraClient;
use crate::consts::SPRINT_PAGE_SIZE;
use crate::models::{Board, Page, Sprint};

impl JiraClient {
  /// Boards belonging to a project
  pub async fn project_boards(&self, project: &str) -> Result<Vec<Board>, ApiError> {
    let request = self
      .request(Method::GET, &self.agile_url("board"))
      .query(&[("projectKeyOrId", project)]);
    let response = self.send(request).await?;
    let page: Page<Board> = self.read_json(response).await?;
    Ok(page.values)
  }

  /// All sprints of a board, following pagination
  pub async fn board_sprints(&self, board_id: u64) -> Result<Vec<Sprint>, ApiError> {
    let url = self.agile_url(&format!("board/{board_id}/sprint"));
    let mut sprints = Vec::new();
    let mut start_at = 0_usize;

    loop {
      let request = self.request(Method::GET, &url).query(&[
        ("startAt", start_at.to_string()),
        ("maxResults", SPRINT_PAGE_SIZE.to_string()),
      ]);
      let response = self.send(request).await?;
      let page: Page<Sprint> = self.read_json(response).await?;

      let fetched = page.values.len();
      sprints.extend(page.values);
      start_at += fetched;

      if page.is_last.unwrap_or(true) || fetched == 0 {
        break;
      }
    }

    debug!("Board {board_id} has {} sprints", sprints.len());
    Ok(sprints)
  }

  /// Find the id of the sprint named `sprint_name` on any board of `project`
  pub async fn find_sprint_id(&self, project: &str, sprint_name: &str) -> Result<u64, ApiError> {
    for board in self.project_boards(project).await? {
      let sprints = self.board_sprints(board.id).await?;
      if let Some(sprint) = sprints.into_iter().find(|sprint| sprint.name == sprint_name) {
        debug!("Resolved sprint '{sprint_name}' to {}", sprint.id);
        return Ok(sprint.id);
      }
    }

    Err(ApiError::NotFound(format!("Sprint '{sprint_name}' in project {project}")))
  }
}
