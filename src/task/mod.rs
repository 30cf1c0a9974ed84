//! Task model shared by the parser, the formatter and the board
//!
//! - Status and priority vocabularies with their glyphs
//! - Drafts built from chat text, patches, stored tasks
//! - Field validation

pub mod error;
pub mod model;

pub use error::ValidationError;
pub use model::{Task, TaskDraft, TaskId, TaskPatch, TaskPriority, TaskStatus, MAX_TITLE_CHARS};
