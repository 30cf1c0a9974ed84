//! Chat command model and parser
//!
//! Free text from a chat message becomes a [`Command`]: an [`Intent`] plus the
//! payload that intent needs. Parsing is pure and never fails outward; text
//! that cannot be understood yields an invalid command carrying the reason.

pub mod dates;
pub mod error;
pub mod fields;
pub mod parser;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::task::{Task, TaskDraft, TaskId, TaskPatch, TaskPriority, TaskStatus};

pub use error::{CommandError, ParseError};
pub use parser::{CommandParser, Matcher};

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Create,
    List,
    Search,
    Update,
    Delete,
    Complete,
    Help,
    Unknown,
}

impl Intent {
    /// Look up a slash-command alias, case-insensitively
    pub fn from_alias(alias: &str) -> Option<Self> {
        match alias.to_lowercase().as_str() {
            "add" | "create" | "new" => Some(Self::Create),
            "list" | "ls" | "show" => Some(Self::List),
            "search" | "find" => Some(Self::Search),
            "update" | "edit" | "modify" => Some(Self::Update),
            "delete" | "remove" | "del" => Some(Self::Delete),
            "complete" | "done" | "finish" => Some(Self::Complete),
            "help" => Some(Self::Help),
            _ => None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::List => "list",
            Self::Search => "search",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Complete => "complete",
            Self::Help => "help",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Filters for listing tasks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl ListFilters {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Set one filter from a `key:value` token.
    ///
    /// Returns `Ok(false)` for tokens that are not filters, and an error when
    /// a status or priority value is outside the vocabulary.
    pub fn apply_token(&mut self, token: &str) -> Result<bool, ParseError> {
        let Some((key, value)) = token.split_once(':') else {
            return Ok(false);
        };
        let value = value.trim();
        if value.is_empty() {
            return Ok(false);
        }
        let invalid = || ParseError::InvalidFilter {
            key: key.to_lowercase(),
            value: value.to_string(),
        };
        match key.to_lowercase().as_str() {
            "status" => self.status = Some(TaskStatus::parse(value).ok_or_else(invalid)?),
            "priority" => self.priority = Some(TaskPriority::parse(value).ok_or_else(invalid)?),
            "assignee" => self.assignee = Some(value.to_string()),
            "tag" => self.tag = Some(value.trim_start_matches('#').to_string()),
            _ => return Ok(false),
        }
        Ok(true)
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if task.priority != priority {
                return false;
            }
        }
        if let Some(assignee) = &self.assignee {
            if task.assignee.as_deref() != Some(assignee.as_str()) {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !task.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        true
    }
}

/// Intent-specific data of a valid command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Payload {
    Create(TaskDraft),
    List(ListFilters),
    Search { query: String },
    Update { id: TaskId, patch: TaskPatch },
    Delete { id: TaskId },
    Complete { id: TaskId },
    Help,
}

impl Payload {
    pub fn intent(&self) -> Intent {
        match self {
            Self::Create(_) => Intent::Create,
            Self::List(_) => Intent::List,
            Self::Search { .. } => Intent::Search,
            Self::Update { .. } => Intent::Update,
            Self::Delete { .. } => Intent::Delete,
            Self::Complete { .. } => Intent::Complete,
            Self::Help => Intent::Help,
        }
    }
}

/// Parsed chat command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    pub intent: Intent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
    #[serde(serialize_with = "error_message")]
    pub error: Option<CommandError>,
    pub original: String,
}

impl Command {
    /// A valid command; the intent follows from the payload
    pub fn valid(payload: Payload, original: impl Into<String>) -> Self {
        Self {
            intent: payload.intent(),
            payload: Some(payload),
            error: None,
            original: original.into(),
        }
    }

    /// An invalid command; it never carries a payload
    pub fn invalid(
        intent: Intent,
        error: impl Into<CommandError>,
        original: impl Into<String>,
    ) -> Self {
        Self {
            intent,
            payload: None,
            error: Some(error.into()),
            original: original.into(),
        }
    }

    /// Valid create command, or the draft's validation error
    pub fn create(draft: TaskDraft, today: NaiveDate, original: impl Into<String>) -> Self {
        match draft.validate(today) {
            Ok(()) => Self::valid(Payload::Create(draft), original),
            Err(err) => Self::invalid(Intent::Create, err, original),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none() && self.payload.is_some()
    }

    pub fn draft(&self) -> Option<&TaskDraft> {
        match &self.payload {
            Some(Payload::Create(draft)) => Some(draft),
            _ => None,
        }
    }

    pub fn filters(&self) -> Option<&ListFilters> {
        match &self.payload {
            Some(Payload::List(filters)) => Some(filters),
            _ => None,
        }
    }

    pub fn query(&self) -> Option<&str> {
        match &self.payload {
            Some(Payload::Search { query }) => Some(query),
            _ => None,
        }
    }
}

fn error_message<S: Serializer>(error: &Option<CommandError>, s: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(err) => s.serialize_some(&err.to_string()),
        None => s.serialize_none(),
    }
}

/// Parse text against today's local date
pub fn parse(text: &str) -> Command {
    CommandParser::standard().parse(text)
}

/// Parse text resolving relative dates against `today`
pub fn parse_on(text: &str, today: NaiveDate) -> Command {
    CommandParser::standard().parse_on(text, today)
}
