//! Task data model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ValidationError;

/// Longest accepted task title, counted in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Opaque task identifier assigned by the board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 characters, used when listing tasks in chat
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started
    #[default]
    Todo,
    /// Being worked on
    InProgress,
    /// Completed
    Done,
    /// Waiting for something
    Blocked,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [Self::Todo, Self::InProgress, Self::Done, Self::Blocked];

    /// Parse status from a code, a zh-TW word, an English word or a glyph
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "todo" | "to-do" | "open" | "待辦" | "⏳" => Some(Self::Todo),
            "in-progress" | "in progress" | "doing" | "進行中" | "🔄" => Some(Self::InProgress),
            "done" | "completed" | "complete" | "已完成" | "完成" | "✅" => Some(Self::Done),
            "blocked" | "paused" | "阻塞" | "暫停" | "🚫" => Some(Self::Blocked),
            _ => None,
        }
    }

    /// Lenient parse used by free-text fields; anything unknown is todo
    pub fn parse_or_default(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }

    /// Get the glyph for this status
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Todo => "⏳",
            Self::InProgress => "🔄",
            Self::Done => "✅",
            Self::Blocked => "🚫",
        }
    }

    /// Get the canonical code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 4] = [Self::Low, Self::Medium, Self::High, Self::Urgent];

    /// Parse priority from a code, a zh-TW word or an English word
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" | "低" | "p3" => Some(Self::Low),
            "medium" | "med" | "normal" | "中" | "普通" | "一般" | "p2" => Some(Self::Medium),
            "high" | "高" | "p1" => Some(Self::High),
            "urgent" | "critical" | "緊急" | "p0" => Some(Self::Urgent),
            _ => None,
        }
    }

    /// Lenient parse used by free-text fields; anything unknown is medium
    pub fn parse_or_default(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }

    /// Get the glyph for this priority
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Low => "🟢",
            Self::Medium => "🟡",
            Self::High => "🟠",
            Self::Urgent => "🔴",
        }
    }

    /// Get the canonical code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A task as requested in chat, before the board has stored it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub priority: TaskPriority,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    /// Insertion ordered, no duplicates
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Append a tag unless it is blank or already present
    pub fn add_tag(&mut self, tag: &str) {
        push_tag(&mut self.tags, tag);
    }

    /// Check field constraints against the given calendar day
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        validate_hours(self.estimated_hours)?;
        validate_due(self.due_date, today)
    }
}

/// Partial update of a stored task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl TaskPatch {
    /// Patch that only moves the task to the given status
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check only the fields this patch sets
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        validate_hours(self.estimated_hours)?;
        validate_due(self.due_date, today)
    }
}

/// A task stored on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<String>,

    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub priority: TaskPriority,

    #[serde(default)]
    pub assignee: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub estimated_hours: Option<f64>,

    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Build a stored task from a draft and the id the board assigned
    pub fn from_draft(id: TaskId, draft: TaskDraft) -> Self {
        let now = Utc::now();
        Self {
            id,
            board_id: None,
            title: draft.title,
            description: draft.description,
            status: draft.status,
            priority: draft.priority,
            assignee: draft.assignee,
            tags: draft.tags,
            estimated_hours: draft.estimated_hours,
            due_date: draft.due_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Draft view of this task, used to re-validate after a patch
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            priority: self.priority,
            assignee: self.assignee.clone(),
            tags: self.tags.clone(),
            estimated_hours: self.estimated_hours,
            due_date: self.due_date,
        }
    }

    /// Apply a patch; unset fields are left alone
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(assignee) = &patch.assignee {
            self.assignee = Some(assignee.clone());
        }
        if let Some(tags) = &patch.tags {
            self.tags.clear();
            for tag in tags {
                push_tag(&mut self.tags, tag);
            }
        }
        if let Some(hours) = patch.estimated_hours {
            self.estimated_hours = Some(hours);
        }
        if let Some(due) = patch.due_date {
            self.due_date = Some(due);
        }
        self.touch();
    }

    /// Check if the task is overdue
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due) => due < today && self.status != TaskStatus::Done,
            None => false,
        }
    }

    /// Update the task
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    let actual = title.chars().count();
    if actual > MAX_TITLE_CHARS {
        return Err(ValidationError::TitleTooLong {
            max: MAX_TITLE_CHARS,
            actual,
        });
    }
    Ok(())
}

fn validate_hours(hours: Option<f64>) -> Result<(), ValidationError> {
    match hours {
        Some(h) if !(h > 0.0 && h.is_finite()) => Err(ValidationError::InvalidHours(h)),
        _ => Ok(()),
    }
}

// Same-day deadlines are fine; only earlier calendar days are rejected.
fn validate_due(due: Option<NaiveDate>, today: NaiveDate) -> Result<(), ValidationError> {
    match due {
        Some(d) if d < today => Err(ValidationError::DueDateInPast(d)),
        _ => Ok(()),
    }
}

pub(crate) fn push_tag(tags: &mut Vec<String>, tag: &str) {
    let tag = tag.trim().trim_start_matches('#');
    if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
        tags.push(tag.to_string());
    }
}
