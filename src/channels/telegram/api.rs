use super::TelegramError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const API_BASE_ENV: &str = "BACKUPBOT_TELEGRAM_API_BASE";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_GRACE: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct TelegramApiClient {
    api_base: String,
    token: String,
    agent: ureq::Agent,
}

impl std::fmt::Debug for TelegramApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramApiClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct TelegramEnvelope<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

fn markup(keyboard: &[Vec<InlineButton>]) -> Value {
    json!({ "inline_keyboard": keyboard })
}

impl TelegramApiClient {
    pub fn new(token: String) -> Self {
        let api_base = std::env::var(API_BASE_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string());
        Self {
            api_base,
            token,
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.api_base.trim_end_matches('/'),
            self.token
        )
    }

    fn decode<T: for<'de> Deserialize<'de>>(
        method: &str,
        result: Result<ureq::Response, ureq::Error>,
    ) -> Result<T, TelegramError> {
        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                let description = response
                    .into_json::<TelegramEnvelope<Value>>()
                    .ok()
                    .and_then(|envelope| envelope.description)
                    .unwrap_or_else(|| format!("{method} failed with http status {code}"));
                return Err(TelegramError::ApiResponse(description));
            }
            Err(err) => return Err(TelegramError::ApiRequest(err.to_string())),
        };

        let envelope = response
            .into_json::<TelegramEnvelope<T>>()
            .map_err(|e| TelegramError::ApiRequest(e.to_string()))?;
        if !envelope.ok {
            return Err(TelegramError::ApiResponse(
                envelope
                    .description
                    .unwrap_or_else(|| format!("{method} failed")),
            ));
        }
        envelope
            .result
            .ok_or_else(|| TelegramError::ApiResponse(format!("{method} returned no result")))
    }

    fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        body: Value,
        timeout: Duration,
    ) -> Result<T, TelegramError> {
        let result = self
            .agent
            .post(&self.endpoint(method))
            .timeout(timeout)
            .send_json(body);
        Self::decode(method, result)
    }

    pub fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&[Vec<InlineButton>]>,
    ) -> Result<(), TelegramError> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });
        if let Some(keyboard) = keyboard {
            body["reply_markup"] = markup(keyboard);
        }
        let _: Value = self.post_json("sendMessage", body, SEND_TIMEOUT)?;
        Ok(())
    }

    pub fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: &[Vec<InlineButton>],
    ) -> Result<(), TelegramError> {
        let body = json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
            "parse_mode": "Markdown",
            "reply_markup": markup(keyboard),
        });
        let _: Value = self.post_json("editMessageText", body, SEND_TIMEOUT)?;
        Ok(())
    }

    pub fn answer_callback_query(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), TelegramError> {
        let mut body = json!({ "callback_query_id": callback_id });
        if let Some(text) = text {
            body["text"] = json!(text);
            body["show_alert"] = json!(show_alert);
        }
        let _: Value = self.post_json("answerCallbackQuery", body, SEND_TIMEOUT)?;
        Ok(())
    }

    /// Long-polls for updates after `offset`. The HTTP timeout is padded past
    /// the server-side poll window.
    pub fn get_updates(
        &self,
        offset: Option<i64>,
        poll_timeout: Duration,
    ) -> Result<Vec<Update>, TelegramError> {
        let mut query = vec![
            ("timeout", poll_timeout.as_secs().to_string()),
            (
                "allowed_updates",
                r#"["message","callback_query"]"#.to_string(),
            ),
        ];
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }
        let encoded = query
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{}?{encoded}", self.endpoint("getUpdates"));

        let result = self
            .agent
            .get(&url)
            .timeout(poll_timeout + POLL_GRACE)
            .call();
        Self::decode("getUpdates", result)
    }
}
