//! Field extraction for task requests
//!
//! Two grammars live here:
//! - `label: value` fragments used by the inline (`|`) and multiline create
//!   formats, with zh-TW and English labels
//! - inline markers used by slash commands (`#tag`, `@priority`, `:assignee`,
//!   `status:`, `hours:`, `due:`)
//!
//! Every marker must start a whitespace-delimited token, so one extractor can
//! never consume text another one is looking for.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use super::dates::{parse_due_date, parse_duration_hours};
use crate::task::{model::push_tag, TaskDraft, TaskPatch, TaskPriority, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldLabel {
    Priority,
    Assignee,
    EstimatedHours,
    DueDate,
    Status,
    Description,
    Tags,
}

/// Checked in order; the first label that matches owns the fragment
static FIELD_LABELS: LazyLock<Vec<(FieldLabel, Regex)>> = LazyLock::new(|| {
    let label = |alternatives: &str| {
        Regex::new(&format!(r"(?is)^(?:{alternatives})\s*[:：]\s*(.+)$")).expect("field label pattern")
    };
    vec![
        (FieldLabel::Priority, label("優先級|優先|priority")),
        (FieldLabel::Assignee, label("負責人|指派|負責|assignee|owner")),
        (FieldLabel::EstimatedHours, label("預估時間|預估|時間|hours|hour|estimate")),
        (FieldLabel::DueDate, label("截止日期|截止|due|deadline")),
        (FieldLabel::Status, label("狀態|status")),
        (FieldLabel::Description, label("描述|說明|description|desc")),
        (FieldLabel::Tags, label("標籤|tags|tag")),
    ]
});

static TAG_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,，、\s]+").expect("tag separator pattern"));

/// Apply one `label: value` fragment to a draft.
///
/// Returns false when no label matched or the value could not be read; the
/// fragment is then dropped without touching the draft.
pub fn apply_field(fragment: &str, draft: &mut TaskDraft, today: NaiveDate) -> bool {
    let fragment = fragment.trim();

    let Some((label, value)) = FIELD_LABELS.iter().find_map(|(label, re)| {
        re.captures(fragment)
            .and_then(|caps| caps.get(1))
            .map(|value| (*label, value.as_str().trim()))
    }) else {
        return false;
    };

    match label {
        FieldLabel::Priority => draft.priority = TaskPriority::parse_or_default(value),
        FieldLabel::Assignee => draft.assignee = Some(value.to_string()),
        FieldLabel::EstimatedHours => match parse_duration_hours(value) {
            Some(hours) => draft.estimated_hours = Some(hours),
            None => return false,
        },
        FieldLabel::DueDate => match parse_due_date(value, today) {
            Some(due) => draft.due_date = Some(due),
            None => return false,
        },
        FieldLabel::Status => draft.status = TaskStatus::parse_or_default(value),
        FieldLabel::Description => draft.description = Some(value.to_string()),
        FieldLabel::Tags => {
            draft.tags.clear();
            for tag in TAG_SPLIT_RE.split(value) {
                draft.add_tag(tag);
            }
        }
    }
    true
}

/// What the slash-command markers found, plus the text they left behind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerFields {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assignee: Option<String>,
    pub tags: Vec<String>,
    pub estimated_hours: Option<f64>,
    pub due_date: Option<NaiveDate>,
    /// Remaining text with single spaces
    pub rest: String,
}

impl MarkerFields {
    /// Split the leftover text on the first `|` into title and description
    pub fn title_and_description(&self) -> (String, Option<String>) {
        match self.rest.split_once('|') {
            Some((title, description)) => {
                let description = description.trim();
                (
                    title.trim().to_string(),
                    (!description.is_empty()).then(|| description.to_string()),
                )
            }
            None => (self.rest.trim().to_string(), None),
        }
    }

    pub fn into_draft(self) -> TaskDraft {
        let (title, description) = self.title_and_description();
        TaskDraft {
            title,
            description,
            status: self.status.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
            assignee: self.assignee,
            tags: self.tags,
            estimated_hours: self.estimated_hours,
            due_date: self.due_date,
        }
    }

    pub fn into_patch(self) -> TaskPatch {
        let (title, description) = self.title_and_description();
        TaskPatch {
            title: (!title.is_empty()).then_some(title),
            description,
            status: self.status,
            priority: self.priority,
            assignee: self.assignee,
            tags: (!self.tags.is_empty()).then_some(self.tags),
            estimated_hours: self.estimated_hours,
            due_date: self.due_date,
        }
    }
}

/// One marker rule: a pattern whose first group is the value, and the code
/// that stores it. `apply` returns false to leave the match in the text.
pub struct Extractor {
    pub name: &'static str,
    pattern: &'static LazyLock<Regex>,
    repeat: bool,
    apply: fn(&str, &mut MarkerFields, NaiveDate) -> bool,
}

impl Extractor {
    /// Run over `text`, storing values and returning the text without the
    /// consumed matches
    fn run(&self, text: &str, fields: &mut MarkerFields, today: NaiveDate) -> String {
        let mut kept = String::with_capacity(text.len());
        let mut last = 0;

        for caps in self.pattern.captures_iter(text) {
            let (Some(whole), Some(value)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if !(self.apply)(value.as_str(), fields, today) {
                continue;
            }
            kept.push_str(&text[last..whole.start()]);
            kept.push(' ');
            last = whole.end();
            if !self.repeat {
                break;
            }
        }

        kept.push_str(&text[last..]);
        kept
    }
}

static STATUS_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|\s)(?:status|狀態):(\S+)").expect("status marker"));

static HOURS_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|\s)(?:hours?|預估):(\S+)").expect("hours marker"));

static DUE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|\s)(?:due|截止):(\S+)").expect("due marker"));

static TAG_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)#(\w[\w-]*)").expect("tag marker"));

static PRIORITY_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)@(\w+)").expect("priority marker"));

static ASSIGNEE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s):(\w[\w.-]*)").expect("assignee marker"));

/// Keyed markers run before the bare `:assignee` marker
pub static EXTRACTORS: [Extractor; 6] = [
    Extractor {
        name: "status",
        pattern: &STATUS_MARKER,
        repeat: false,
        apply: |value, fields, _| match TaskStatus::parse(value) {
            Some(status) => {
                fields.status = Some(status);
                true
            }
            None => false,
        },
    },
    Extractor {
        name: "hours",
        pattern: &HOURS_MARKER,
        repeat: false,
        apply: |value, fields, _| match parse_duration_hours(value) {
            Some(hours) => {
                fields.estimated_hours = Some(hours);
                true
            }
            None => false,
        },
    },
    Extractor {
        name: "due",
        pattern: &DUE_MARKER,
        repeat: false,
        apply: |value, fields, today| match parse_due_date(value, today) {
            Some(due) => {
                fields.due_date = Some(due);
                true
            }
            None => false,
        },
    },
    Extractor {
        name: "tag",
        pattern: &TAG_MARKER,
        repeat: true,
        apply: |value, fields, _| {
            push_tag(&mut fields.tags, value);
            true
        },
    },
    Extractor {
        name: "priority",
        pattern: &PRIORITY_MARKER,
        repeat: false,
        apply: |value, fields, _| match TaskPriority::parse(value) {
            Some(priority) => {
                fields.priority = Some(priority);
                true
            }
            None => false,
        },
    },
    Extractor {
        name: "assignee",
        pattern: &ASSIGNEE_MARKER,
        repeat: false,
        apply: |value, fields, _| {
            fields.assignee = Some(value.to_string());
            true
        },
    },
];

/// Run every slash marker over `text`
pub fn extract_markers(text: &str, today: NaiveDate) -> MarkerFields {
    let mut fields = MarkerFields::default();
    let mut remaining = text.to_string();

    for extractor in EXTRACTORS.iter() {
        remaining = extractor.run(&remaining, &mut fields, today);
    }

    fields.rest = remaining.split_whitespace().collect::<Vec<_>>().join(" ");
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn draft_with(fragments: &[&str]) -> TaskDraft {
        let mut draft = TaskDraft::new("t");
        for fragment in fragments {
            apply_field(fragment, &mut draft, today());
        }
        draft
    }

    #[test]
    fn test_field_labels_bilingual() {
        let draft = draft_with(&[
            "優先級：高",
            "負責人：張三",
            "預估時間：2天",
            "截止日期：7月11日",
            "狀態：進行中",
            "描述：登入頁面壞掉",
            "標籤：前端，緊急 mobile",
        ]);
        assert_eq!(draft.priority, TaskPriority::High);
        assert_eq!(draft.assignee.as_deref(), Some("張三"));
        assert_eq!(draft.estimated_hours, Some(16.0));
        assert_eq!(draft.due_date, NaiveDate::from_ymd_opt(2026, 7, 11));
        assert_eq!(draft.status, TaskStatus::InProgress);
        assert_eq!(draft.description.as_deref(), Some("登入頁面壞掉"));
        assert_eq!(draft.tags, vec!["前端", "緊急", "mobile"]);
    }

    #[test]
    fn test_field_labels_english_case_insensitive() {
        let draft = draft_with(&["Priority: urgent", "ASSIGNEE: Amy", "hours: 3h", "Due: tomorrow"]);
        assert_eq!(draft.priority, TaskPriority::Urgent);
        assert_eq!(draft.assignee.as_deref(), Some("Amy"));
        assert_eq!(draft.estimated_hours, Some(3.0));
        assert_eq!(draft.due_date, NaiveDate::from_ymd_opt(2026, 3, 11));
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let draft = draft_with(&["priority: whenever", "status: someday"]);
        assert_eq!(draft.priority, TaskPriority::Medium);
        assert_eq!(draft.status, TaskStatus::Todo);
    }

    #[test]
    fn test_unrecognized_fragments_are_dropped() {
        let mut draft = TaskDraft::new("t");
        let before = draft.clone();
        assert!(!apply_field("colour: red", &mut draft, today()));
        assert!(!apply_field("no separator here", &mut draft, today()));
        assert!(!apply_field("預估時間：很久", &mut draft, today()));
        assert_eq!(draft, before);
    }

    #[test]
    fn test_markers_scenario() {
        let fields = extract_markers("Fix bug #mobile @high :john", today());
        assert_eq!(fields.rest, "Fix bug");
        assert_eq!(fields.tags, vec!["mobile"]);
        assert_eq!(fields.priority, Some(TaskPriority::High));
        assert_eq!(fields.assignee.as_deref(), Some("john"));
    }

    #[test]
    fn test_markers_do_not_overlap() {
        let fields = extract_markers("Ship it #done #urgent", today());
        assert_eq!(fields.tags, vec!["done", "urgent"]);
        assert_eq!(fields.priority, None);
        assert_eq!(fields.assignee, None);
        assert_eq!(fields.status, None);
        assert_eq!(fields.rest, "Ship it");
    }

    #[test]
    fn test_keyed_markers_are_not_assignees() {
        let fields = extract_markers("Plan hours:8 due:2026-12-31 status:in-progress", today());
        assert_eq!(fields.estimated_hours, Some(8.0));
        assert_eq!(fields.due_date, NaiveDate::from_ymd_opt(2026, 12, 31));
        assert_eq!(fields.status, Some(TaskStatus::InProgress));
        assert_eq!(fields.assignee, None);
        assert_eq!(fields.rest, "Plan");
    }

    #[test]
    fn test_unknown_priority_marker_stays_in_title() {
        let fields = extract_markers("Call @home @low", today());
        assert_eq!(fields.priority, Some(TaskPriority::Low));
        assert_eq!(fields.rest, "Call @home");
    }

    #[test]
    fn test_marker_description_split() {
        let draft = extract_markers("Fix login | users stuck on spinner #web", today()).into_draft();
        assert_eq!(draft.title, "Fix login");
        assert_eq!(draft.description.as_deref(), Some("users stuck on spinner"));
        assert_eq!(draft.tags, vec!["web"]);
    }

    #[test]
    fn test_markers_into_patch() {
        let patch = extract_markers("@urgent", today()).into_patch();
        assert_eq!(patch.priority, Some(TaskPriority::Urgent));
        assert_eq!(patch.title, None);

        assert!(extract_markers("", today()).into_patch().is_empty());
    }

    #[test]
    fn test_extractor_order() {
        let names: Vec<_> = EXTRACTORS.iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["status", "hours", "due", "tag", "priority", "assignee"]);
    }
}
