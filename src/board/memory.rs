//! In-memory task store (non-persistent).

use async_trait::async_trait;
use chrono::Local;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BoardError, Result, TaskStore};
use crate::command::ListFilters;
use crate::task::{Task, TaskDraft, TaskId, TaskPatch};

/// Tasks kept in creation order
#[derive(Clone, Default)]
pub struct MemoryStore {
    tasks: Arc<RwLock<Vec<Task>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, draft: TaskDraft) -> Result<Task> {
        draft.validate(Local::now().date_naive())?;
        let task = Task::from_draft(TaskId::new(Uuid::new_v4().to_string()), draft);
        self.tasks.write().await.push(task.clone());
        Ok(task)
    }

    async fn list(&self, filters: &ListFilters) -> Result<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().filter(|t| filters.matches(t)).cloned().collect())
    }

    async fn get(&self, id: &TaskId) -> Result<Task> {
        self.tasks
            .read()
            .await
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or_else(|| BoardError::NotFound(id.clone()))
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task> {
        patch.validate(Local::now().date_naive())?;

        let mut tasks = self.tasks.write().await;
        let task = tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| BoardError::NotFound(id.clone()))?;
        task.apply(patch);
        Ok(task.clone())
    }

    async fn delete(&self, id: &TaskId) -> Result<bool> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| &t.id != id);
        Ok(tasks.len() < before)
    }
}
