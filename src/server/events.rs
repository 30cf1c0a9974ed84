//! LINE webhook payloads

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub destination: Option<String>,

    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Message,
    Follow,
    Unfollow,
    Join,
    Leave,
    Postback,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventKind,

    #[serde(default)]
    pub reply_token: Option<String>,

    #[serde(default)]
    pub source: Source,

    #[serde(default)]
    pub message: Option<Message>,

    #[serde(default)]
    pub postback: Option<Postback>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub room_id: Option<String>,
}

impl Source {
    /// Best identifier for logs: user, else group, else room
    pub fn id(&self) -> &str {
        self.user_id
            .as_deref()
            .or(self.group_id.as_deref())
            .or(self.room_id.as_deref())
            .unwrap_or("unknown")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postback {
    pub data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostbackAction {
    action: String,
    #[serde(default)]
    task_id: Option<String>,
}

/// What to do about one webhook event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventAction {
    /// Run this text through the message processor
    Process(String),
    Greet(Greeting),
    /// Reply with the postback failure text
    BadPostback,
    /// Reply with the unknown action text
    UnknownAction(String),
    /// Nothing to send; the reason is logged
    Ignore(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Greeting {
    Follow,
    Join,
}

impl Event {
    pub fn action(&self) -> EventAction {
        match self.kind {
            EventKind::Message => match &self.message {
                Some(Message {
                    kind,
                    text: Some(text),
                    ..
                }) if kind == "text" => EventAction::Process(text.clone()),
                _ => EventAction::Ignore("non-text message"),
            },
            EventKind::Follow => EventAction::Greet(Greeting::Follow),
            EventKind::Join => EventAction::Greet(Greeting::Join),
            EventKind::Unfollow => EventAction::Ignore("unfollowed"),
            EventKind::Leave => EventAction::Ignore("left group"),
            EventKind::Postback => match &self.postback {
                Some(postback) => postback_action(&postback.data),
                None => EventAction::BadPostback,
            },
            EventKind::Other => EventAction::Ignore("unhandled event type"),
        }
    }
}

fn postback_action(data: &str) -> EventAction {
    let Ok(action) = serde_json::from_str::<PostbackAction>(data) else {
        return EventAction::BadPostback;
    };
    match (action.action.as_str(), action.task_id) {
        ("complete_task", Some(id)) if !id.trim().is_empty() => {
            EventAction::Process(format!("/complete {}", id.trim()))
        }
        ("complete_task", _) => EventAction::BadPostback,
        (other, _) => EventAction::UnknownAction(other.to_string()),
    }
}
