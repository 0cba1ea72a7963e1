use super::TelegramError;
use crate::config::TelegramConfig;

pub const TOKEN_ENV: &str = "TELEGRAM_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramCredentials {
    pub token: String,
    pub chat_id: i64,
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Bot token, with `TELEGRAM_TOKEN` taking precedence over the config file.
pub fn resolve_token(config: &TelegramConfig) -> Option<String> {
    non_empty_env(TOKEN_ENV).or_else(|| {
        config
            .token
            .as_ref()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

pub fn resolve_credentials(config: &TelegramConfig) -> Result<TelegramCredentials, TelegramError> {
    let token = resolve_token(config).ok_or(TelegramError::MissingToken)?;
    let chat_id = config.chat_id.ok_or(TelegramError::MissingChatId)?;
    Ok(TelegramCredentials { token, chat_id })
}
