use crate::channels::telegram::{resolve_credentials, TelegramApiClient};
use crate::config::TelegramConfig;
use std::sync::atomic::{AtomicBool, Ordering};

/// Best-effort outbound status channel. Implementations log and swallow
/// delivery failures; callers never observe them.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, message: &str);
}

pub fn success_message(task_name: &str, archive_name: &str) -> String {
    format!(
        "✅ *Backup succeeded*\n\nTask: `{}`\nArchive: `{}`",
        inline_code(task_name),
        inline_code(archive_name)
    )
}

/// Telegram caps a message at 4096 UTF-16 units; a reason of this many chars
/// stays under it even when every char needs two units.
pub const MAX_REASON_CHARS: usize = 2000;

pub fn failure_message(task_name: &str, reason: &str) -> String {
    format!(
        "❌ *Backup failed*\n\nTask: `{}`\n\nReason:\n`{}`",
        inline_code(task_name),
        inline_code(&tail_chars(reason.trim(), MAX_REASON_CHARS))
    )
}

// Command output ends with the decisive error line, so the tail is kept.
fn tail_chars(raw: &str, limit: usize) -> String {
    let count = raw.chars().count();
    if count <= limit {
        return raw.to_string();
    }
    let tail: String = raw.chars().skip(count - limit).collect();
    format!("…{tail}")
}

// Telegram's legacy Markdown has no escape inside code spans.
fn inline_code(raw: &str) -> String {
    raw.replace('`', "'")
}

#[derive(Debug)]
pub struct TelegramNotifier {
    target: Option<(TelegramApiClient, i64)>,
    disabled_reason: Option<String>,
    warned: AtomicBool,
}

impl TelegramNotifier {
    pub fn new(client: TelegramApiClient, chat_id: i64) -> Self {
        Self {
            target: Some((client, chat_id)),
            disabled_reason: None,
            warned: AtomicBool::new(false),
        }
    }

    /// Resolves credentials once. Missing token or chat id yields a disabled
    /// notifier rather than an error.
    pub fn from_config(config: &TelegramConfig) -> Self {
        match resolve_credentials(config) {
            Ok(credentials) => Self::new(
                TelegramApiClient::new(credentials.token),
                credentials.chat_id,
            ),
            Err(err) => Self {
                target: None,
                disabled_reason: Some(err.to_string()),
                warned: AtomicBool::new(false),
            },
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }
}

impl NotificationSink for TelegramNotifier {
    fn notify(&self, message: &str) {
        let Some((client, chat_id)) = &self.target else {
            if !self.warned.swap(true, Ordering::Relaxed) {
                tracing::warn!(
                    reason = self.disabled_reason.as_deref().unwrap_or("not configured"),
                    "telegram notifications disabled; message not sent"
                );
            }
            return;
        };
        if let Err(err) = client.send_message(*chat_id, message, None) {
            tracing::error!(error = %err, "failed to deliver telegram notification");
        }
    }
}
