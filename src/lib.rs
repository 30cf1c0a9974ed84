//! task-relay - chat task commands to kanban board cards
//!
//! Messages from a LINE chat are parsed into commands (zh-TW natural phrases,
//! inline and multiline field forms, or `/slash` commands), run against a task
//! board, and answered with a formatted reply.

pub mod board;
pub mod cli;
pub mod command;
pub mod config;
pub mod processor;
pub mod reply;
#[cfg(feature = "serve")]
pub mod server;
pub mod task;

pub use command::{parse, Command, Intent};
pub use processor::{MessageProcessor, Reply};
pub use reply::{Formatter, Locale};
