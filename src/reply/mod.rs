//! Chat reply rendering
//!
//! Turns a parsed [`Command`] and the outcome of running it into the text sent
//! back to the chat. Rendering is pure: the same command and outcome always
//! give the same text.

mod help;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::board::BoardError;
use crate::command::{Command, CommandError, ParseError};
use crate::task::{Task, TaskId, TaskPriority, TaskStatus, ValidationError};

/// Most tasks shown in one list reply
pub const LIST_LIMIT: usize = 10;

/// Longest slice of unrecognized input echoed back
const ECHO_CHARS: usize = 30;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Locale {
    #[default]
    #[serde(rename = "zh-tw")]
    #[value(name = "zh-tw")]
    ZhTw,
    #[serde(rename = "en")]
    #[value(name = "en")]
    En,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Self::ZhTw, Self::En];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "zh-tw" | "zh-hant" | "zh" => Some(Self::ZhTw),
            "en" | "en-us" | "en-gb" => Some(Self::En),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::ZhTw => "zh-tw",
            Self::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// What running a valid command produced
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Created(Task),
    Updated(Task),
    Completed(Task),
    /// Result of a list or a search
    Tasks(Vec<Task>),
    Deleted(TaskId),
    Help,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Formatter {
    locale: Locale,
}

impl Formatter {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn help_text(&self) -> &'static str {
        help::help_text(self.locale)
    }

    /// Greeting for a user who added the bot
    pub fn follow_text(&self) -> &'static str {
        help::follow_text(self.locale)
    }

    /// Greeting for a group the bot was invited to
    pub fn join_text(&self) -> &'static str {
        help::join_text(self.locale)
    }

    /// Reply when handling a chat event failed outside the processor
    pub fn event_error_text(&self, detail: &str) -> String {
        match self.locale {
            Locale::ZhTw => format!(
                "❌ 處理請求時發生錯誤\n\n錯誤訊息: {}\n\n請檢查您的指令格式是否正確，或輸入 /help 查看使用說明。",
                detail
            ),
            Locale::En => format!(
                "❌ Something went wrong handling your request\n\nError: {}\n\nCheck the command format, or send /help for usage.",
                detail
            ),
        }
    }

    /// Reply to a button press whose payload could not be read
    pub fn postback_failed_text(&self) -> &'static str {
        self.pick("操作失敗，請重試", "That action failed, please try again")
    }

    pub fn unknown_action_text(&self) -> &'static str {
        self.pick("未知的操作", "Unknown action")
    }

    /// Render the reply for a command and what running it produced.
    ///
    /// An invalid command always renders its own error; `result` is ignored.
    pub fn format(&self, result: &Result<Outcome, BoardError>, command: &Command) -> String {
        if let Some(err) = &command.error {
            return self.command_error(err, command);
        }

        match result {
            Err(err) => self.board_error(err),
            Ok(Outcome::Created(task)) => self.task_summary(self.pick("✅ 任務創建成功", "✅ Task created"), task),
            Ok(Outcome::Updated(task)) => self.task_summary(self.pick("✏️ 任務更新成功", "✏️ Task updated"), task),
            Ok(Outcome::Completed(task)) => self.task_summary(self.pick("🎉 任務已完成", "🎉 Task completed"), task),
            Ok(Outcome::Tasks(tasks)) => match command.query() {
                Some(query) => self.search_results(tasks, query),
                None => self.task_list(tasks),
            },
            Ok(Outcome::Deleted(id)) => match self.locale {
                Locale::ZhTw => format!("🗑️ 任務已刪除\n📋 ID: {}", id),
                Locale::En => format!("🗑️ Task deleted\n📋 ID: {}", id),
            },
            Ok(Outcome::Help) => self.help_text().to_string(),
        }
    }

    /// Text for an invalid command
    pub fn command_error(&self, err: &CommandError, command: &Command) -> String {
        match err {
            CommandError::Parse(ParseError::Unrecognized) => {
                self.unsupported(&echo(command.original.trim()))
            }
            CommandError::Parse(ParseError::UnsupportedCommand(alias)) => {
                self.unsupported(&format!("/{}", alias))
            }
            CommandError::Parse(err) => format!("❌ {}", self.parse_error(err)),
            CommandError::Validation(err) => format!("❌ {}", self.validation_error(err)),
        }
    }

    /// Text for a failure while running a valid command
    pub fn board_error(&self, err: &BoardError) -> String {
        let detail = match err {
            BoardError::NotFound(id) => self.not_found(id),
            BoardError::NoBoard => self
                .pick("尚未設定任務看板", "No task board is configured")
                .to_string(),
            BoardError::Validation(err) => self.validation_error(err),
            other => other.to_string(),
        };
        match self.locale {
            Locale::ZhTw => format!("處理訊息時發生錯誤: {}", detail),
            Locale::En => format!("Something went wrong handling your message: {}", detail),
        }
    }

    pub fn status_label(&self, status: TaskStatus) -> &'static str {
        match (self.locale, status) {
            (Locale::ZhTw, TaskStatus::Todo) => "待辦",
            (Locale::ZhTw, TaskStatus::InProgress) => "進行中",
            (Locale::ZhTw, TaskStatus::Done) => "已完成",
            (Locale::ZhTw, TaskStatus::Blocked) => "阻塞",
            (Locale::En, TaskStatus::Todo) => "To do",
            (Locale::En, TaskStatus::InProgress) => "In progress",
            (Locale::En, TaskStatus::Done) => "Done",
            (Locale::En, TaskStatus::Blocked) => "Blocked",
        }
    }

    pub fn priority_label(&self, priority: TaskPriority) -> &'static str {
        match (self.locale, priority) {
            (Locale::ZhTw, TaskPriority::Low) => "低",
            (Locale::ZhTw, TaskPriority::Medium) => "中",
            (Locale::ZhTw, TaskPriority::High) => "高",
            (Locale::ZhTw, TaskPriority::Urgent) => "緊急",
            (Locale::En, TaskPriority::Low) => "Low",
            (Locale::En, TaskPriority::Medium) => "Medium",
            (Locale::En, TaskPriority::High) => "High",
            (Locale::En, TaskPriority::Urgent) => "Urgent",
        }
    }

    fn pick(&self, zh_tw: &'static str, en: &'static str) -> &'static str {
        match self.locale {
            Locale::ZhTw => zh_tw,
            Locale::En => en,
        }
    }

    fn unsupported(&self, what: &str) -> String {
        match self.locale {
            Locale::ZhTw => format!("不支援的命令: {}。輸入 /help 查看可用命令。", what),
            Locale::En => format!("Unsupported command: {}. Send /help to see what I can do.", what),
        }
    }

    fn not_found(&self, id: &TaskId) -> String {
        match self.locale {
            Locale::ZhTw => format!("找不到任務 {}", id),
            Locale::En => format!("Task {} not found", id),
        }
    }

    fn parse_error(&self, err: &ParseError) -> String {
        match (self.locale, err) {
            (Locale::ZhTw, ParseError::Empty) => "請輸入訊息".into(),
            (Locale::ZhTw, ParseError::MissingTitle) => "請提供任務標題".into(),
            (Locale::ZhTw, ParseError::MissingQuery) => "請提供搜尋關鍵字".into(),
            (Locale::ZhTw, ParseError::MissingTaskId) => "請提供任務 ID".into(),
            (Locale::ZhTw, ParseError::EmptyPatch) => "請至少提供一個要更新的欄位".into(),
            (Locale::En, ParseError::Empty) => "Please send a message".into(),
            (Locale::En, ParseError::MissingTitle) => "Please provide a task title".into(),
            (Locale::En, ParseError::MissingQuery) => "Please provide a search keyword".into(),
            (Locale::En, ParseError::MissingTaskId) => "Please provide a task ID".into(),
            (Locale::En, ParseError::EmptyPatch) => {
                "Nothing to update; give at least one field".into()
            }
            (Locale::ZhTw, ParseError::InvalidFilter { key, value }) => {
                format!("無法識別的篩選條件 {}:{}", key, value)
            }
            (Locale::En, ParseError::InvalidFilter { key, value }) => {
                format!("Unknown {} filter: {}", key, value)
            }
            (_, ParseError::Unrecognized) => self.unsupported(""),
            (_, ParseError::UnsupportedCommand(alias)) => self.unsupported(alias),
        }
    }

    fn validation_error(&self, err: &ValidationError) -> String {
        match (self.locale, err) {
            (Locale::ZhTw, ValidationError::EmptyTitle) => "任務標題不能為空".into(),
            (Locale::ZhTw, ValidationError::TitleTooLong { max, actual }) => {
                format!("任務標題不能超過 {} 個字（目前 {} 個）", max, actual)
            }
            (Locale::ZhTw, ValidationError::DueDateInPast(due)) => {
                format!("截止日期 {} 已經過去", due.format("%Y/%m/%d"))
            }
            (Locale::ZhTw, ValidationError::InvalidHours(_)) => "預估時數必須大於 0".into(),
            (Locale::En, err) => err.to_string(),
        }
    }

    fn task_summary(&self, headline: &str, task: &Task) -> String {
        let mut lines = vec![headline.to_string()];
        let zh = self.locale == Locale::ZhTw;

        let label = |zh_tw: &str, en: &str| if zh { zh_tw.to_string() } else { en.to_string() };

        lines.push(format!("📋 ID: {}", task.id));
        lines.push(format!("📝 {}: {}", label("標題", "Title"), task.title));
        lines.push(format!(
            "📊 {}: {}",
            label("狀態", "Status"),
            self.status_label(task.status)
        ));
        lines.push(format!(
            "⭐ {}: {}",
            label("優先級", "Priority"),
            self.priority_label(task.priority)
        ));
        if let Some(assignee) = &task.assignee {
            lines.push(format!("👤 {}: {}", label("負責人", "Assignee"), assignee));
        }
        if let Some(hours) = task.estimated_hours {
            lines.push(format!(
                "⏱️ {}: {} {}",
                label("預估時數", "Estimate"),
                hours,
                label("小時", "hours")
            ));
        }
        if let Some(due) = task.due_date {
            let date = if zh {
                due.format("%Y/%-m/%-d").to_string()
            } else {
                due.format("%Y-%m-%d").to_string()
            };
            lines.push(format!("📅 {}: {}", label("截止日期", "Due"), date));
        }
        if !task.tags.is_empty() {
            lines.push(format!("🏷️ {}: {}", label("標籤", "Tags"), hashtags(&task.tags)));
        }
        if let Some(description) = &task.description {
            lines.push(format!("📄 {}: {}", label("描述", "Description"), description));
        }

        lines.join("\n")
    }

    fn task_list(&self, tasks: &[Task]) -> String {
        if tasks.is_empty() {
            return self.pick("📝 目前沒有任務", "📝 No tasks yet").to_string();
        }
        let header = match self.locale {
            Locale::ZhTw => format!("📝 任務列表 (共 {} 個):", tasks.len()),
            Locale::En => format!("📝 Tasks ({} total):", tasks.len()),
        };
        format!("{}\n\n{}", header, self.task_entries(tasks))
    }

    fn search_results(&self, tasks: &[Task], query: &str) -> String {
        if tasks.is_empty() {
            return match self.locale {
                Locale::ZhTw => format!("🔍 搜尋 \"{}\" 沒有找到相關任務", query),
                Locale::En => format!("🔍 No tasks found for \"{}\"", query),
            };
        }
        let header = match self.locale {
            Locale::ZhTw => format!("🔍 搜尋 \"{}\" 找到 {} 個任務:", query, tasks.len()),
            Locale::En => format!("🔍 Found {} tasks for \"{}\":", tasks.len(), query),
        };
        format!("{}\n\n{}", header, self.task_entries(tasks))
    }

    fn task_entries(&self, tasks: &[Task]) -> String {
        let mut entries: Vec<String> = tasks
            .iter()
            .take(LIST_LIMIT)
            .enumerate()
            .map(|(i, task)| {
                let mut entry = format!(
                    "{}. {} {}\n   ID: {}...\n   {} {}",
                    i + 1,
                    task.status.emoji(),
                    task.title,
                    task.id.short(),
                    task.priority.emoji(),
                    self.priority_label(task.priority)
                );
                if !task.tags.is_empty() {
                    entry.push_str(" | ");
                    entry.push_str(&hashtags(&task.tags));
                }
                entry
            })
            .collect();

        if tasks.len() > LIST_LIMIT {
            let rest = tasks.len() - LIST_LIMIT;
            entries.push(match self.locale {
                Locale::ZhTw => format!("... 還有 {} 個任務", rest),
                Locale::En => format!("... and {} more", rest),
            });
        }
        entries.join("\n\n")
    }
}

fn hashtags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(" ")
}

fn echo(text: &str) -> String {
    match text.char_indices().nth(ECHO_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{parse_on, Payload};
    use crate::task::TaskDraft;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn zh() -> Formatter {
        Formatter::new(Locale::ZhTw)
    }

    fn task(id: &str, title: &str) -> Task {
        Task::from_draft(TaskId::new(id), TaskDraft::new(title))
    }

    #[test]
    fn test_locale_codes() {
        assert_eq!(Locale::default(), Locale::ZhTw);
        assert_eq!(Locale::parse("zh_TW"), Some(Locale::ZhTw));
        assert_eq!(Locale::parse("EN"), Some(Locale::En));
        assert_eq!(Locale::parse("fr"), None);
        for locale in Locale::ALL {
            assert_eq!(Locale::parse(locale.code()), Some(locale));
        }
        let parsed: Locale = serde_json::from_str("\"zh-tw\"").unwrap();
        assert_eq!(parsed, Locale::ZhTw);
    }

    #[test]
    fn test_created_summary() {
        let cmd = parse_on("/add Fix bug #mobile @high :john", today());
        let mut draft = cmd.draft().cloned().unwrap();
        draft.estimated_hours = Some(8.0);
        draft.due_date = NaiveDate::from_ymd_opt(2026, 7, 11);
        draft.description = Some("登入頁面".into());
        let task = Task::from_draft(TaskId::new("card-1"), draft);

        let text = zh().format(&Ok(Outcome::Created(task)), &cmd);
        assert_eq!(
            text,
            "✅ 任務創建成功\n\
             📋 ID: card-1\n\
             📝 標題: Fix bug\n\
             📊 狀態: 待辦\n\
             ⭐ 優先級: 高\n\
             👤 負責人: john\n\
             ⏱️ 預估時數: 8 小時\n\
             📅 截止日期: 2026/7/11\n\
             🏷️ 標籤: #mobile\n\
             📄 描述: 登入頁面"
        );
    }

    #[test]
    fn test_minimal_summary_in_english() {
        let cmd = parse_on("/add Write docs", today());
        let task = task("c9", "Write docs");
        let text = Formatter::new(Locale::En).format(&Ok(Outcome::Created(task)), &cmd);
        assert_eq!(
            text,
            "✅ Task created\n📋 ID: c9\n📝 Title: Write docs\n📊 Status: To do\n⭐ Priority: Medium"
        );
    }

    #[test]
    fn test_empty_list_and_search() {
        let list = parse_on("/list", today());
        assert_eq!(zh().format(&Ok(Outcome::Tasks(vec![])), &list), "📝 目前沒有任務");

        let search = parse_on("搜尋：login", today());
        let text = zh().format(&Ok(Outcome::Tasks(vec![])), &search);
        assert_eq!(text, "🔍 搜尋 \"login\" 沒有找到相關任務");
        assert!(text.contains("login"));
    }

    #[test]
    fn test_list_entries() {
        let mut first = task("abcdef1234567890", "寫週報");
        first.tags = vec!["report".into(), "weekly".into()];
        first.priority = TaskPriority::Urgent;
        let mut second = task("xyz", "Review");
        second.status = TaskStatus::InProgress;

        let cmd = parse_on("查看任務", today());
        let text = zh().format(&Ok(Outcome::Tasks(vec![first, second])), &cmd);
        assert_eq!(
            text,
            "📝 任務列表 (共 2 個):\n\n\
             1. ⏳ 寫週報\n   ID: abcdef12...\n   🔴 緊急 | #report #weekly\n\n\
             2. 🔄 Review\n   ID: xyz...\n   🟡 中"
        );
    }

    #[test]
    fn test_list_is_capped() {
        let tasks: Vec<Task> = (0..13).map(|i| task(&format!("id{i}"), &format!("t{i}"))).collect();
        let cmd = parse_on("/list", today());
        let text = zh().format(&Ok(Outcome::Tasks(tasks)), &cmd);

        assert!(text.starts_with("📝 任務列表 (共 13 個):"));
        assert!(text.contains("10. ⏳ t9"));
        assert!(!text.contains("t10"));
        assert!(text.ends_with("... 還有 3 個任務"));
    }

    #[test]
    fn test_search_header() {
        let cmd = parse_on("/search login", today());
        let text = Formatter::new(Locale::En)
            .format(&Ok(Outcome::Tasks(vec![task("t1", "Fix login")])), &cmd);
        assert!(text.starts_with("🔍 Found 1 tasks for \"login\":\n\n1. ⏳ Fix login"));
    }

    #[test]
    fn test_unrecognized_text() {
        let cmd = parse_on("asdkjfh", today());
        let text = zh().format(&Ok(Outcome::Help), &cmd);
        assert_eq!(text, "不支援的命令: asdkjfh。輸入 /help 查看可用命令。");

        let cmd = parse_on("/status", today());
        let text = Formatter::new(Locale::En).format(&Ok(Outcome::Help), &cmd);
        assert!(text.contains("/status"));
        assert!(text.contains("/help"));
    }

    #[test]
    fn test_long_unrecognized_text_is_shortened() {
        let cmd = parse_on(&"字".repeat(40), today());
        let text = zh().format(&Ok(Outcome::Help), &cmd);
        assert!(text.contains(&format!("{}...", "字".repeat(30))));
    }

    #[test]
    fn test_command_errors() {
        let cmd = parse_on("/search", today());
        assert_eq!(zh().format(&Ok(Outcome::Help), &cmd), "❌ 請提供搜尋關鍵字");

        let cmd = parse_on("/add", today());
        assert_eq!(
            Formatter::new(Locale::En).format(&Ok(Outcome::Help), &cmd),
            "❌ Please provide a task title"
        );

        let cmd = parse_on("/add Pay rent due:2026-03-01", today());
        assert_eq!(
            zh().format(&Ok(Outcome::Help), &cmd),
            "❌ 截止日期 2026/03/01 已經過去"
        );
    }

    #[test]
    fn test_board_errors() {
        let cmd = parse_on("/done abc", today());
        let err = Err(BoardError::NotFound(TaskId::new("abc")));
        assert_eq!(zh().format(&err, &cmd), "處理訊息時發生錯誤: 找不到任務 abc");

        let err = Err(BoardError::Status {
            status: 500,
            body: "boom".into(),
        });
        let text = Formatter::new(Locale::En).format(&err, &cmd);
        assert!(text.starts_with("Something went wrong"));
        assert!(text.contains("500"));
    }

    #[test]
    fn test_delete_and_complete() {
        let cmd = parse_on("/del abc", today());
        assert_eq!(
            zh().format(&Ok(Outcome::Deleted(TaskId::new("abc"))), &cmd),
            "🗑️ 任務已刪除\n📋 ID: abc"
        );

        let cmd = parse_on("/done abc", today());
        let mut done = task("abc", "Ship");
        done.status = TaskStatus::Done;
        let text = zh().format(&Ok(Outcome::Completed(done)), &cmd);
        assert!(text.starts_with("🎉 任務已完成"));
        assert!(text.contains("📊 狀態: 已完成"));
    }

    #[test]
    fn test_help_mentions_every_command() {
        for locale in Locale::ALL {
            let help = Formatter::new(locale).help_text();
            for alias in ["/add", "/list", "/search", "/update", "/done", "/delete", "/help"] {
                assert!(help.contains(alias), "{locale}: {alias}");
            }
        }
        assert!(zh().help_text().starts_with("🤖 LINE 任務管理機器人 - 指令說明"));
        let cmd = parse_on("help", today());
        assert_eq!(cmd.payload, Some(Payload::Help));
        assert_eq!(zh().format(&Ok(Outcome::Help), &cmd), zh().help_text());
    }

    #[test]
    fn test_welcome_texts() {
        assert!(zh().follow_text().starts_with("🎉 歡迎使用 LINE 任務管理機器人！"));
        assert!(zh().join_text().starts_with("👋 大家好！"));
        assert!(Formatter::new(Locale::En).follow_text().contains("/help"));
    }

    #[test]
    fn test_format_is_idempotent() {
        let cmd = parse_on("/list", today());
        let result = Ok(Outcome::Tasks(vec![task("a1", "one"), task("b2", "two")]));
        assert_eq!(zh().format(&result, &cmd), zh().format(&result, &cmd));
    }
}
