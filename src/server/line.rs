//! LINE Messaging API reply client

use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::error::{Result, ServerError};

/// LINE rejects text messages longer than this
pub const MAX_TEXT_CHARS: usize = 5000;

#[derive(Clone)]
pub struct LineClient {
    client: reqwest::Client,
    api_base: String,
    access_token: Option<String>,
}

impl LineClient {
    pub fn new(api_base: &str, access_token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("task-relay/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    /// Answer an event with one text message
    pub async fn reply(&self, reply_token: &str, text: &str) -> Result<()> {
        let url = format!("{}/v2/bot/message/reply", self.api_base);
        let body = json!({
            "replyToken": reply_token,
            "messages": [{ "type": "text", "text": clip(text) }],
        });

        let mut req = self.client.post(&url).json(&body);
        if let Some(token) = &self.access_token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServerError::LineApi {
                status: status.as_u16(),
                body,
            });
        }
        debug!(chars = text.chars().count(), "Sent reply");
        Ok(())
    }
}

fn clip(text: &str) -> String {
    match text.char_indices().nth(MAX_TEXT_CHARS) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
