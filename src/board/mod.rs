//! Task storage backends
//!
//! [`TaskStore`] is the seam between the message processor and wherever tasks
//! live. [`FocalboardStore`] talks to a Focalboard server over its v2 REST API;
//! [`MemoryStore`] keeps everything in process for tests and dry runs.

pub mod error;
pub mod focalboard;
pub mod memory;

use async_trait::async_trait;

use crate::command::ListFilters;
use crate::task::{Task, TaskDraft, TaskId, TaskPatch};

pub use error::{BoardError, Result};
pub use focalboard::{BoardConfig, FocalboardStore};
pub use memory::MemoryStore;

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    async fn create(&self, draft: TaskDraft) -> Result<Task>;

    async fn list(&self, filters: &ListFilters) -> Result<Vec<Task>>;

    async fn get(&self, id: &TaskId) -> Result<Task>;

    /// Case-insensitive substring search over the filtered task list
    async fn search(&self, query: &str, filters: &ListFilters) -> Result<Vec<Task>> {
        let tasks = self.list(filters).await?;
        Ok(tasks
            .into_iter()
            .filter(|task| matches_query(task, query))
            .collect())
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task>;

    /// Returns false when there was nothing to delete
    async fn delete(&self, id: &TaskId) -> Result<bool>;

    /// Whether the backend answers at all
    async fn test_connection(&self) -> bool {
        true
    }
}

/// Check if a task mentions the query in its title, description, tags or assignee
pub fn matches_query(task: &Task, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }

    let contains = |text: &str| text.to_lowercase().contains(&query);

    contains(&task.title)
        || task.description.as_deref().is_some_and(contains)
        || task.tags.iter().any(|tag| contains(tag))
        || task.assignee.as_deref().is_some_and(contains)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(title: &str) -> Task {
        Task::from_draft(TaskId::new("t1"), TaskDraft::new(title))
    }

    #[test]
    fn test_query_matches_each_field() {
        let mut t = task("Fix Login page");
        assert!(matches_query(&t, "login"));
        assert!(!matches_query(&t, "signup"));

        t.description = Some("OAuth redirect loop".into());
        assert!(matches_query(&t, "oauth"));

        t.tags = vec!["Mobile".into()];
        assert!(matches_query(&t, "mob"));

        t.assignee = Some("張三".into());
        assert!(matches_query(&t, "張"));
    }

    #[test]
    fn test_blank_query_matches_everything() {
        assert!(matches_query(&task("anything"), ""));
        assert!(matches_query(&task("anything"), "   "));
    }
}
