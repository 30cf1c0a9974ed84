//! Rule-based text → command parser
//!
//! The parser is an ordered list of [`Matcher`]s. Natural-language families
//! (create, list, search, help) are tried first, then the slash-command
//! fallback. The first matcher that recognizes the text decides the command.

use chrono::{Local, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::error::ParseError;
use super::fields::{apply_field, extract_markers};
use super::{Command, Intent, ListFilters, Payload};
use crate::task::{TaskDraft, TaskId};

/// One parsing strategy. Returns `None` when the text is not its business.
pub trait Matcher: Send + Sync {
    fn name(&self) -> &'static str;

    fn attempt(&self, text: &str, today: NaiveDate) -> Option<Command>;
}

pub struct CommandParser {
    matchers: Vec<Box<dyn Matcher>>,
}

static STANDARD: LazyLock<CommandParser> = LazyLock::new(CommandParser::new);

impl CommandParser {
    /// Natural-language families first, slash commands last
    pub fn new() -> Self {
        Self::with_matchers(vec![
            Box::new(CreatePhrase),
            Box::new(ListPhrase),
            Box::new(SearchPhrase),
            Box::new(HelpPhrase),
            Box::new(SlashCommand),
        ])
    }

    pub fn with_matchers(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    /// Shared parser with the standard matcher list
    pub fn standard() -> &'static CommandParser {
        &STANDARD
    }

    pub fn matcher_names(&self) -> Vec<&'static str> {
        self.matchers.iter().map(|m| m.name()).collect()
    }

    pub fn parse(&self, text: &str) -> Command {
        self.parse_on(text, Local::now().date_naive())
    }

    pub fn parse_on(&self, text: &str, today: NaiveDate) -> Command {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Command::invalid(Intent::Unknown, ParseError::Empty, text);
        }

        for matcher in &self.matchers {
            if let Some(mut command) = matcher.attempt(trimmed, today) {
                debug!(
                    matcher = matcher.name(),
                    intent = %command.intent,
                    valid = command.is_valid(),
                    "parsed message"
                );
                command.original = text.to_string();
                return command;
            }
        }

        Command::invalid(Intent::Unknown, ParseError::Unrecognized, text)
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new()
    }
}

const CREATE_PREFIXES: &str = "創建任務|新增任務|添加任務|建立任務|創建|新增|添加|(?i:create task|new task|add task)";

static CREATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?s)^(?:{CREATE_PREFIXES})\s*[:：]\s*(.+)$")).expect("create pattern")
});

static CREATE_FIRST_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(?:{CREATE_PREFIXES})\s*[:：]\s*(.*)$")).expect("create line pattern")
});

static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*•・]\s*").expect("bullet pattern"));

/// `創建任務：…`, `新增：…`, `create task: …`
pub struct CreatePhrase;

impl Matcher for CreatePhrase {
    fn name(&self) -> &'static str {
        "create-phrase"
    }

    fn attempt(&self, text: &str, today: NaiveDate) -> Option<Command> {
        let content = CREATE_RE.captures(text)?.get(1)?.as_str().trim();
        if content.is_empty() {
            return None;
        }

        let draft = if content.contains('|') {
            parse_inline(content, today)
        } else if text.contains('\n') {
            parse_multiline(text, today)
        } else {
            TaskDraft::new(content)
        };

        Some(Command::create(draft, today, text))
    }
}

/// `title | label: value | label: value`
fn parse_inline(content: &str, today: NaiveDate) -> TaskDraft {
    let mut parts = content.split('|').map(str::trim);
    let mut draft = TaskDraft::new(parts.next().unwrap_or_default());
    for part in parts {
        apply_field(part, &mut draft, today);
    }
    draft
}

/// Title on the command line, one `label: value` per following line
fn parse_multiline(text: &str, today: NaiveDate) -> TaskDraft {
    let mut lines = text.lines().map(str::trim);

    let title = lines
        .next()
        .and_then(|first| CREATE_FIRST_LINE_RE.captures(first))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or_default();
    let mut draft = TaskDraft::new(title);

    for line in lines.filter(|line| !line.is_empty()) {
        let field = BULLET_RE.replace(line, "");
        apply_field(&field, &mut draft, today);
    }
    draft
}

static LIST_ZH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:查看|顯示|列出|列表)(?:任務)?|任務列表|任務清單)$").expect("list pattern")
});

static LIST_EN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:list|show)(?:\s+tasks?)?((?:\s+[^\s:]+:\S+)*)$").expect("list filter pattern")
});

/// `查看任務`, `任務列表`, `list`, `list status:todo`
pub struct ListPhrase;

impl Matcher for ListPhrase {
    fn name(&self) -> &'static str {
        "list-phrase"
    }

    fn attempt(&self, text: &str, _today: NaiveDate) -> Option<Command> {
        if LIST_ZH_RE.is_match(text) {
            return Some(Command::valid(Payload::List(ListFilters::default()), text));
        }

        let caps = LIST_EN_RE.captures(text)?;
        let mut filters = ListFilters::default();
        if let Some(tokens) = caps.get(1) {
            for token in tokens.as_str().split_whitespace() {
                if let Err(err) = filters.apply_token(token) {
                    return Some(Command::invalid(Intent::List, err, text));
                }
            }
        }
        Some(Command::valid(Payload::List(filters), text))
    }
}

static SEARCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:搜尋|搜索|查找|尋找|(?i:search|find))(?:\s*[:：]\s*|\s+)(.+)$").expect("search pattern")
});

/// `搜尋：login`, `搜尋 login`, `search: login`
pub struct SearchPhrase;

impl Matcher for SearchPhrase {
    fn name(&self) -> &'static str {
        "search-phrase"
    }

    fn attempt(&self, text: &str, _today: NaiveDate) -> Option<Command> {
        let query = SEARCH_RE.captures(text)?.get(1)?.as_str().trim();
        if query.is_empty() {
            return None;
        }
        Some(Command::valid(
            Payload::Search {
                query: query.to_string(),
            },
            text,
        ))
    }
}

static HELP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:幫助|說明|指令|命令|如何使用|怎麼用|(?i:help|how to use))$").expect("help pattern")
});

/// `幫助`, `怎麼用`, `help`
pub struct HelpPhrase;

impl Matcher for HelpPhrase {
    fn name(&self) -> &'static str {
        "help-phrase"
    }

    fn attempt(&self, text: &str, _today: NaiveDate) -> Option<Command> {
        HELP_RE
            .is_match(text)
            .then(|| Command::valid(Payload::Help, text))
    }
}

/// `/alias args…`
pub struct SlashCommand;

impl Matcher for SlashCommand {
    fn name(&self) -> &'static str {
        "slash-command"
    }

    fn attempt(&self, text: &str, today: NaiveDate) -> Option<Command> {
        let body = text
            .strip_prefix('/')
            .or_else(|| text.strip_prefix('／'))?;

        let mut tokens = body.split_whitespace();
        let Some(alias) = tokens.next() else {
            return Some(Command::invalid(Intent::Unknown, ParseError::Unrecognized, text));
        };
        let args: Vec<&str> = tokens.collect();

        let Some(intent) = Intent::from_alias(alias) else {
            return Some(Command::invalid(
                Intent::Unknown,
                ParseError::UnsupportedCommand(alias.to_lowercase()),
                text,
            ));
        };

        let command = match intent {
            Intent::Create => {
                if args.is_empty() {
                    return Some(Command::invalid(intent, ParseError::MissingTitle, text));
                }
                let draft = extract_markers(&args.join(" "), today).into_draft();
                Command::create(draft, today, text)
            }
            Intent::List => {
                let mut filters = ListFilters::default();
                for arg in &args {
                    if let Err(err) = filters.apply_token(arg) {
                        return Some(Command::invalid(intent, err, text));
                    }
                }
                Command::valid(Payload::List(filters), text)
            }
            Intent::Search => {
                if args.is_empty() {
                    return Some(Command::invalid(intent, ParseError::MissingQuery, text));
                }
                Command::valid(
                    Payload::Search {
                        query: args.join(" "),
                    },
                    text,
                )
            }
            Intent::Update => {
                let Some((id, rest)) = args.split_first() else {
                    return Some(Command::invalid(intent, ParseError::MissingTaskId, text));
                };
                let patch = extract_markers(&rest.join(" "), today).into_patch();
                if patch.is_empty() {
                    return Some(Command::invalid(intent, ParseError::EmptyPatch, text));
                }
                match patch.validate(today) {
                    Ok(()) => Command::valid(
                        Payload::Update {
                            id: TaskId::new(*id),
                            patch,
                        },
                        text,
                    ),
                    Err(err) => Command::invalid(intent, err, text),
                }
            }
            Intent::Delete | Intent::Complete => {
                let Some(id) = args.first() else {
                    return Some(Command::invalid(intent, ParseError::MissingTaskId, text));
                };
                let id = TaskId::new(*id);
                let payload = if intent == Intent::Delete {
                    Payload::Delete { id }
                } else {
                    Payload::Complete { id }
                };
                Command::valid(payload, text)
            }
            Intent::Help => Command::valid(Payload::Help, text),
            Intent::Unknown => Command::invalid(intent, ParseError::Unrecognized, text),
        };

        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandError;
    use crate::task::{TaskPriority, TaskStatus, ValidationError};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn parse(text: &str) -> Command {
        CommandParser::standard().parse_on(text, today())
    }

    #[test]
    fn test_matcher_order() {
        assert_eq!(
            CommandParser::new().matcher_names(),
            vec![
                "create-phrase",
                "list-phrase",
                "search-phrase",
                "help-phrase",
                "slash-command"
            ]
        );
    }

    #[test]
    fn test_every_create_phrase_and_separator() {
        let prefixes = [
            "創建任務", "新增任務", "添加任務", "建立任務", "創建", "新增", "添加", "create task",
            "New Task", "add task",
        ];
        for prefix in prefixes {
            for sep in [":", "："] {
                let cmd = parse(&format!("{prefix}{sep}  寫週報  "));
                assert_eq!(cmd.intent, Intent::Create, "{prefix}{sep}");
                assert_eq!(cmd.draft().map(|d| d.title.as_str()), Some("寫週報"));
            }
        }
    }

    #[test]
    fn test_create_simple_title() {
        let cmd = parse("創建任務：修復登入問題");
        assert!(cmd.is_valid());
        let draft = cmd.draft().unwrap();
        assert_eq!(draft.title, "修復登入問題");
        assert_eq!(draft.status, TaskStatus::Todo);
        assert_eq!(draft.priority, TaskPriority::Medium);
        assert!(draft.tags.is_empty());
    }

    #[test]
    fn test_create_without_content_is_not_a_create() {
        let cmd = parse("創建任務：   ");
        assert_eq!(cmd.intent, Intent::Unknown);
        assert!(!cmd.is_valid());
    }

    #[test]
    fn test_create_inline_format() {
        let cmd = parse("新增任務：修復登入 | 優先級：高 | 負責人：張三 | 預估時間：8小時 | 截止日期：7月11日");
        let draft = cmd.draft().unwrap();
        assert_eq!(draft.title, "修復登入");
        assert_eq!(draft.priority, TaskPriority::High);
        assert_eq!(draft.assignee.as_deref(), Some("張三"));
        assert_eq!(draft.estimated_hours, Some(8.0));
        assert_eq!(draft.due_date, NaiveDate::from_ymd_opt(2026, 7, 11));
    }

    #[test]
    fn test_inline_fields_are_order_independent() {
        let a = parse("create task: t | priority: high | assignee: Amy");
        let b = parse("create task: t | assignee: Amy | priority: high");
        assert_eq!(a.payload, b.payload);
        assert_eq!(a.draft().unwrap().assignee.as_deref(), Some("Amy"));
    }

    #[test]
    fn test_create_multiline_format() {
        let text = "創建任務：準備季度報告\n- 優先級：緊急\n- 負責人：小明\n\n* 標籤：財務, Q2\n• 描述：整理營收數據\n備註：不會被讀取";
        let cmd = parse(text);
        assert!(cmd.is_valid());
        let draft = cmd.draft().unwrap();
        assert_eq!(draft.title, "準備季度報告");
        assert_eq!(draft.priority, TaskPriority::Urgent);
        assert_eq!(draft.assignee.as_deref(), Some("小明"));
        assert_eq!(draft.tags, vec!["財務", "Q2"]);
        assert_eq!(draft.description.as_deref(), Some("整理營收數據"));
        assert_eq!(cmd.original, text);
    }

    #[test]
    fn test_pipe_wins_over_newlines() {
        let cmd = parse("新增：標題 | 優先級：低\n負責人：阿明");
        let draft = cmd.draft().unwrap();
        assert_eq!(draft.title, "標題");
        assert_eq!(draft.priority, TaskPriority::Low);
    }

    #[test]
    fn test_multiline_empty_title_fails_validation() {
        let cmd = parse("新增任務：\n優先級：高");
        assert_eq!(cmd.intent, Intent::Create);
        assert_eq!(
            cmd.error,
            Some(CommandError::Validation(ValidationError::EmptyTitle))
        );
        assert!(cmd.payload.is_none());
    }

    #[test]
    fn test_list_phrases() {
        for text in ["查看任務", "顯示", "列出任務", "任務列表", "任務清單", "list", "Show tasks"] {
            let cmd = parse(text);
            assert_eq!(cmd.intent, Intent::List, "{text}");
            assert!(cmd.filters().unwrap().is_empty());
        }
    }

    #[test]
    fn test_list_with_filters_without_slash() {
        let cmd = parse("list status:todo");
        assert_eq!(cmd.intent, Intent::List);
        let filters = cmd.filters().unwrap();
        assert_eq!(filters.status, Some(TaskStatus::Todo));
        assert_eq!(filters.priority, None);
    }

    #[test]
    fn test_list_phrase_needs_filters_only() {
        assert_eq!(parse("show me the money").intent, Intent::Unknown);
    }

    #[test]
    fn test_search_phrases() {
        for text in ["搜尋：login", "搜尋: login", "搜索 login", "查找：login", "search: login", "find login"] {
            let cmd = parse(text);
            assert_eq!(cmd.intent, Intent::Search, "{text}");
            assert_eq!(cmd.query(), Some("login"));
        }
    }

    #[test]
    fn test_help_phrases() {
        for text in ["幫助", "說明", "怎麼用", "如何使用", "HELP", "how to use"] {
            assert_eq!(parse(text).intent, Intent::Help, "{text}");
        }
    }

    #[test]
    fn test_empty_input() {
        for text in ["", "   ", "\n\t"] {
            let cmd = parse(text);
            assert_eq!(cmd.intent, Intent::Unknown);
            assert!(!cmd.is_valid());
            assert_eq!(cmd.error, Some(CommandError::Parse(ParseError::Empty)));
        }
    }

    #[test]
    fn test_unrecognized_text() {
        let cmd = parse("asdkjfh");
        assert_eq!(cmd.intent, Intent::Unknown);
        assert!(!cmd.is_valid());
        assert_eq!(cmd.error, Some(CommandError::Parse(ParseError::Unrecognized)));
    }

    #[test]
    fn test_slash_add_scenario() {
        let cmd = parse("/add Fix bug #mobile @high :john");
        assert!(cmd.is_valid());
        let draft = cmd.draft().unwrap();
        assert_eq!(draft.title, "Fix bug");
        assert_eq!(draft.tags, vec!["mobile"]);
        assert_eq!(draft.priority, TaskPriority::High);
        assert_eq!(draft.assignee.as_deref(), Some("john"));
    }

    #[test]
    fn test_slash_alias_is_case_insensitive() {
        assert_eq!(parse("/ADD x").intent, parse("/add x").intent);
        assert_eq!(parse("/Find x").intent, Intent::Search);
    }

    #[test]
    fn test_slash_create_errors() {
        let cmd = parse("/add");
        assert_eq!(cmd.intent, Intent::Create);
        assert_eq!(cmd.error, Some(CommandError::Parse(ParseError::MissingTitle)));

        let cmd = parse("/new #only-tags @high");
        assert_eq!(
            cmd.error,
            Some(CommandError::Validation(ValidationError::EmptyTitle))
        );

        let cmd = parse("/add Renew cert due:2026-03-01");
        assert!(matches!(
            cmd.error,
            Some(CommandError::Validation(ValidationError::DueDateInPast(_)))
        ));
    }

    #[test]
    fn test_slash_list_filters() {
        let cmd = parse("/ls status:in-progress priority:urgent assignee:amy junk");
        let filters = cmd.filters().unwrap();
        assert_eq!(filters.status, Some(TaskStatus::InProgress));
        assert_eq!(filters.priority, Some(TaskPriority::Urgent));
        assert_eq!(filters.assignee.as_deref(), Some("amy"));
    }

    #[test]
    fn test_unknown_filter_value_is_rejected() {
        for text in ["/list status:finished", "list status:todo priority:someday"] {
            let cmd = parse(text);
            assert_eq!(cmd.intent, Intent::List, "{text}");
            assert!(!cmd.is_valid(), "{text}");
            assert!(matches!(
                cmd.error,
                Some(CommandError::Parse(ParseError::InvalidFilter { .. }))
            ));
        }
    }

    #[test]
    fn test_slash_search() {
        assert_eq!(parse("/search login  page").query(), Some("login page"));
        let cmd = parse("/find");
        assert_eq!(cmd.intent, Intent::Search);
        assert_eq!(cmd.error, Some(CommandError::Parse(ParseError::MissingQuery)));
    }

    #[test]
    fn test_slash_update() {
        let cmd = parse("/update abc123 @urgent status:blocked");
        match cmd.payload {
            Some(Payload::Update { id, patch }) => {
                assert_eq!(id.as_str(), "abc123");
                assert_eq!(patch.priority, Some(TaskPriority::Urgent));
                assert_eq!(patch.status, Some(TaskStatus::Blocked));
                assert_eq!(patch.title, None);
            }
            other => panic!("unexpected payload {:?}", other),
        }

        assert_eq!(
            parse("/edit").error,
            Some(CommandError::Parse(ParseError::MissingTaskId))
        );
        assert_eq!(
            parse("/modify abc123").error,
            Some(CommandError::Parse(ParseError::EmptyPatch))
        );
    }

    #[test]
    fn test_slash_delete_and_complete() {
        assert_eq!(
            parse("/del abc").payload,
            Some(Payload::Delete {
                id: TaskId::new("abc")
            })
        );
        assert_eq!(
            parse("/done abc").payload,
            Some(Payload::Complete {
                id: TaskId::new("abc")
            })
        );
        assert_eq!(
            parse("/complete").error,
            Some(CommandError::Parse(ParseError::MissingTaskId))
        );
    }

    #[test]
    fn test_slash_unsupported_alias() {
        let cmd = parse("/Status");
        assert_eq!(cmd.intent, Intent::Unknown);
        assert_eq!(
            cmd.error,
            Some(CommandError::Parse(ParseError::UnsupportedCommand(
                "status".into()
            )))
        );
        assert_eq!(parse("/").intent, Intent::Unknown);
    }

    #[test]
    fn test_tag_never_read_as_priority_or_assignee() {
        let draft = parse("/add Wrap up #done #high").draft().cloned().unwrap();
        assert_eq!(draft.tags, vec!["done", "high"]);
        assert_eq!(draft.priority, TaskPriority::Medium);
        assert_eq!(draft.assignee, None);
    }

    #[test]
    fn test_custom_matcher_list() {
        let parser = CommandParser::with_matchers(vec![Box::new(HelpPhrase)]);
        assert_eq!(parser.parse_on("help", today()).intent, Intent::Help);
        assert_eq!(parser.parse_on("/help", today()).intent, Intent::Unknown);
    }
}
