//! Message processing: parse, run against the task store, render the reply

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::board::{BoardError, TaskStore};
use crate::command::{self, Command, ListFilters, ParseError, Payload};
use crate::reply::{Formatter, Outcome};
use crate::task::{TaskPatch, TaskStatus};

/// Text to send back, and whether the request did what was asked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub success: bool,
    pub message: String,
}

pub struct MessageProcessor {
    store: Arc<dyn TaskStore>,
    formatter: Formatter,
}

impl MessageProcessor {
    pub fn new(store: Arc<dyn TaskStore>, formatter: Formatter) -> Self {
        Self { store, formatter }
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    pub async fn process(&self, text: &str, user_id: &str) -> Reply {
        let command = command::parse(text);
        self.run(command, user_id).await
    }

    /// Run an already parsed command
    pub async fn run(&self, command: Command, user_id: &str) -> Reply {
        info!(user = user_id, intent = %command.intent, "Processing message");

        let payload = match (&command.payload, &command.error) {
            (Some(payload), None) => payload,
            (_, error) => {
                debug!(error = ?error, "Rejected invalid command");
                let err = error
                    .clone()
                    .unwrap_or_else(|| ParseError::Unrecognized.into());
                return Reply {
                    success: false,
                    message: self.formatter.command_error(&err, &command),
                };
            }
        };

        let result = self.execute(payload).await;
        if let Err(e) = &result {
            warn!(
                user = user_id,
                intent = %command.intent,
                store = self.store.name(),
                "Command failed: {}",
                e
            );
        }

        Reply {
            success: result.is_ok(),
            message: self.formatter.format(&result, &command),
        }
    }

    async fn execute(&self, payload: &Payload) -> Result<Outcome, BoardError> {
        match payload {
            Payload::Create(draft) => self.store.create(draft.clone()).await.map(Outcome::Created),
            Payload::List(filters) => self.store.list(filters).await.map(Outcome::Tasks),
            Payload::Search { query } => self
                .store
                .search(query, &ListFilters::default())
                .await
                .map(Outcome::Tasks),
            Payload::Update { id, patch } => {
                self.store.update(id, patch).await.map(Outcome::Updated)
            }
            Payload::Complete { id } => self
                .store
                .update(id, &TaskPatch::status(TaskStatus::Done))
                .await
                .map(Outcome::Completed),
            Payload::Delete { id } => {
                if self.store.delete(id).await? {
                    Ok(Outcome::Deleted(id.clone()))
                } else {
                    Err(BoardError::NotFound(id.clone()))
                }
            }
            Payload::Help => Ok(Outcome::Help),
        }
    }
}
