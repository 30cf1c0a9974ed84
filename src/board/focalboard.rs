//! Focalboard v2 REST backend
//!
//! Tasks are Focalboard `card` blocks on a single board. Task fields live in
//! the card's `fields.properties` map; the description is the title of a
//! child `text` block.

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, Utc};
use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::{BoardError, Result, TaskStore};
use crate::command::ListFilters;
use crate::task::{Task, TaskDraft, TaskId, TaskPatch, TaskPriority, TaskStatus};

/// Title of the board created when the team has none
pub const DEFAULT_BOARD_TITLE: &str = "LINE 任務管理";

const DEFAULT_BOARD_DESCRIPTION: &str = "通過 LINE Bot 管理的任務看板";

/// Connection settings for a Focalboard server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Base URL of the v2 API, e.g. `http://localhost:8000/api/v2`
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_team_id")]
    pub team_id: String,

    /// Skip board discovery and use this board
    #[serde(default)]
    pub default_board_id: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:8000/api/v2".to_string()
}

fn default_team_id() -> String {
    "0".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            team_id: default_team_id(),
            default_board_id: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

pub struct FocalboardStore {
    client: reqwest::Client,
    config: BoardConfig,
    board_id: OnceCell<String>,
}

impl FocalboardStore {
    pub fn new(config: BoardConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("task-relay/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let board_id = match config.default_board_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => OnceCell::new_with(Some(id.to_string())),
            _ => OnceCell::new(),
        };

        Ok(Self {
            client,
            config,
            board_id,
        })
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Resolve the board tasks go to.
    ///
    /// The configured board wins; otherwise the team's first board is used,
    /// and a fresh board is created when the team has none.
    pub async fn initialize(&self) -> Result<&str> {
        self.board_id().await
    }

    async fn board_id(&self) -> Result<&str> {
        let id = self
            .board_id
            .get_or_try_init(|| async {
                let boards = self.boards().await?;
                if let Some(board) = boards.into_iter().next() {
                    info!(board = %board.id, title = %board.title, "Using first team board");
                    return Ok(board.id);
                }
                let board = self.create_default_board().await?;
                info!(board = %board.id, title = %board.title, "Created default board");
                Ok::<_, BoardError>(board.id)
            })
            .await?;
        Ok(id.as_str())
    }

    async fn boards(&self) -> Result<Vec<BoardSummary>> {
        let path = format!("/teams/{}/boards", self.config.team_id);
        let resp = self.send(self.request(Method::GET, &path)).await?;
        decode(resp).await
    }

    async fn create_default_board(&self) -> Result<BoardSummary> {
        let body = json!({
            "teamId": self.config.team_id,
            "title": DEFAULT_BOARD_TITLE,
            "description": DEFAULT_BOARD_DESCRIPTION,
            "type": "O",
        });
        let resp = self
            .send(self.request(Method::POST, "/boards").json(&body))
            .await?;
        let board: BoardSummary = decode(resp).await?;
        if board.id.is_empty() {
            return Err(BoardError::NoBoard);
        }
        Ok(board)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.api_url.trim_end_matches('/'), path);
        let req = self
            .client
            .request(method.clone(), url.as_str())
            .header("X-Requested-With", "XMLHttpRequest");
        let req = match &self.config.token {
            Some(token) if !token.is_empty() => req.bearer_auth(token),
            _ => req,
        };
        debug!(%method, %url, "Board request");
        req
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(BoardError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn insert_blocks(&self, board: &str, blocks: Vec<Value>) -> Result<Vec<Block>> {
        let path = format!("/boards/{board}/blocks");
        let resp = self
            .send(self.request(Method::POST, &path).json(&blocks))
            .await?;
        decode(resp).await
    }

    async fn patch_block(&self, board: &str, id: &str, body: Value) -> Result<()> {
        let path = format!("/boards/{board}/blocks/{id}");
        match self.send(self.request(Method::PATCH, &path).json(&body)).await {
            Err(BoardError::Status { status: 404, .. }) => {
                Err(BoardError::NotFound(TaskId::new(id)))
            }
            other => other.map(|_| ()),
        }
    }

    async fn all_blocks(&self, board: &str) -> Result<Vec<Block>> {
        let path = format!("/boards/{board}/blocks?all=true");
        let resp = self.send(self.request(Method::GET, &path)).await?;
        decode(resp).await
    }

    /// Cards of the board as tasks, with the text block backing each description
    async fn load_cards(&self, board: &str) -> Result<Vec<(Task, Option<String>)>> {
        let blocks = self.all_blocks(board).await?;
        Ok(blocks
            .iter()
            .filter(|b| b.kind == "card")
            .map(|card| {
                let text = blocks
                    .iter()
                    .find(|b| b.kind == "text" && b.parent_id == card.id);
                let mut task = card_to_task(card);
                task.description = text.map(|t| t.title.clone()).filter(|d| !d.is_empty());
                (task, text.map(|t| t.id.clone()))
            })
            .collect())
    }

    async fn load_card(&self, board: &str, id: &TaskId) -> Result<(Task, Option<String>)> {
        self.load_cards(board)
            .await?
            .into_iter()
            .find(|(task, _)| &task.id == id)
            .ok_or_else(|| BoardError::NotFound(id.clone()))
    }
}

#[async_trait]
impl TaskStore for FocalboardStore {
    fn name(&self) -> &'static str {
        "focalboard"
    }

    async fn test_connection(&self) -> bool {
        match self.send(self.request(Method::GET, "/teams")).await {
            Ok(_) => true,
            Err(e) => {
                warn!(url = %self.config.api_url, "Board connection test failed: {}", e);
                false
            }
        }
    }

    async fn create(&self, draft: TaskDraft) -> Result<Task> {
        draft.validate(Local::now().date_naive())?;
        let board = self.board_id().await?;

        let card = json!({
            "type": "card",
            "boardId": board,
            "parentId": board,
            "title": draft.title,
            "schema": 1,
            "fields": {
                "properties": card_properties(&draft),
                "contentOrder": [],
            },
        });
        let created = self.insert_blocks(board, vec![card]).await?;
        let card = created
            .into_iter()
            .find(|b| b.kind == "card")
            .ok_or_else(|| BoardError::Decode("card missing from insert response".into()))?;

        let id = TaskId::new(card.id.clone());
        if let Some(description) = &draft.description {
            // The card already exists; a missing description is not worth failing for.
            if let Err(e) = self
                .insert_blocks(board, vec![text_block(board, &card.id, description)])
                .await
            {
                warn!(task = %id, "Failed to store task description: {}", e);
            }
        }

        let mut task = Task::from_draft(id, draft);
        task.board_id = Some(board.to_string());
        if let Some(created_at) = millis(card.create_at) {
            task.created_at = created_at;
            task.updated_at = created_at;
        }
        info!(task = %task.id, board, "Created card");
        Ok(task)
    }

    async fn list(&self, filters: &ListFilters) -> Result<Vec<Task>> {
        let board = self.board_id().await?;
        Ok(self
            .load_cards(board)
            .await?
            .into_iter()
            .map(|(task, _)| task)
            .filter(|task| filters.matches(task))
            .collect())
    }

    async fn get(&self, id: &TaskId) -> Result<Task> {
        let board = self.board_id().await?;
        self.load_card(board, id).await.map(|(task, _)| task)
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task> {
        patch.validate(Local::now().date_naive())?;
        let board = self.board_id().await?;

        let (mut task, text_id) = self.load_card(board, id).await?;
        task.apply(patch);

        let body = json!({
            "title": task.title,
            "updatedFields": { "properties": card_properties(&task.to_draft()) },
        });
        self.patch_block(board, id.as_str(), body).await?;

        if let Some(description) = &patch.description {
            match text_id {
                Some(text_id) => {
                    self.patch_block(board, &text_id, json!({ "title": description }))
                        .await?
                }
                None => {
                    self.insert_blocks(board, vec![text_block(board, id.as_str(), description)])
                        .await?;
                }
            }
        }

        info!(task = %id, board, "Updated card");
        Ok(task)
    }

    async fn delete(&self, id: &TaskId) -> Result<bool> {
        let board = self.board_id().await?;
        let path = format!("/boards/{board}/blocks/{}", id.as_str());
        match self.send(self.request(Method::DELETE, &path)).await {
            Ok(_) => {
                info!(task = %id, board, "Deleted card");
                Ok(true)
            }
            Err(BoardError::Status { status: 404, .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BoardSummary {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
}

/// Any Focalboard block; only the parts this backend reads
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Block {
    id: String,
    parent_id: String,
    board_id: String,
    #[serde(rename = "type")]
    kind: String,
    title: String,
    fields: Value,
    create_at: i64,
    update_at: i64,
}

async fn decode<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| BoardError::Decode(e.to_string()))
}

fn millis(ms: i64) -> Option<DateTime<Utc>> {
    if ms > 0 {
        DateTime::from_timestamp_millis(ms)
    } else {
        None
    }
}

fn text_block(board: &str, parent: &str, text: &str) -> Value {
    json!({
        "type": "text",
        "boardId": board,
        "parentId": parent,
        "title": text,
        "schema": 1,
        "fields": {},
    })
}

pub(crate) fn status_to_board(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "open",
        TaskStatus::InProgress => "in progress",
        TaskStatus::Done => "completed",
        TaskStatus::Blocked => "blocked",
    }
}

pub(crate) fn priority_to_board(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::Low => "1",
        TaskPriority::Medium => "2",
        TaskPriority::High => "3",
        TaskPriority::Urgent => "4",
    }
}

pub(crate) fn priority_from_board(value: &str) -> TaskPriority {
    match value.trim() {
        "1" => TaskPriority::Low,
        "2" => TaskPriority::Medium,
        "3" => TaskPriority::High,
        "4" => TaskPriority::Urgent,
        other => TaskPriority::parse_or_default(other),
    }
}

fn card_properties(draft: &TaskDraft) -> Value {
    let mut props = Map::new();
    props.insert("status".into(), status_to_board(draft.status).into());
    props.insert("priority".into(), priority_to_board(draft.priority).into());
    if let Some(assignee) = &draft.assignee {
        props.insert("assignee".into(), assignee.as_str().into());
    }
    if !draft.tags.is_empty() {
        props.insert("tags".into(), draft.tags.clone().into());
    }
    if let Some(due) = draft.due_date {
        props.insert("dueDate".into(), due.format("%Y-%m-%d").to_string().into());
    }
    if let Some(hours) = draft.estimated_hours {
        props.insert("estimatedHours".into(), hours.into());
    }
    Value::Object(props)
}

fn card_to_task(card: &Block) -> Task {
    let props = card.fields.get("properties").and_then(Value::as_object);
    let text = |key: &str| {
        props
            .and_then(|p| p.get(key))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    let mut draft = TaskDraft::new(card.title.clone());
    if let Some(status) = text("status") {
        draft.status = TaskStatus::parse_or_default(status);
    }
    if let Some(priority) = text("priority") {
        draft.priority = priority_from_board(priority);
    }
    draft.assignee = text("assignee").map(String::from);
    draft.due_date = text("dueDate").and_then(parse_board_date);

    match props.and_then(|p| p.get("tags")) {
        Some(Value::Array(tags)) => {
            for tag in tags.iter().filter_map(Value::as_str) {
                draft.add_tag(tag);
            }
        }
        Some(Value::String(tag)) => draft.add_tag(tag),
        _ => {}
    }

    draft.estimated_hours = props
        .and_then(|p| p.get("estimatedHours"))
        .and_then(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
        .filter(|h| *h > 0.0);

    let mut task = Task::from_draft(TaskId::new(card.id.clone()), draft);
    if !card.board_id.is_empty() {
        task.board_id = Some(card.board_id.clone());
    }
    if let Some(created) = millis(card.create_at) {
        task.created_at = created;
    }
    if let Some(updated) = millis(card.update_at) {
        task.updated_at = updated;
    }
    task
}

/// `2026-07-11` or a full RFC 3339 timestamp
fn parse_board_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}
