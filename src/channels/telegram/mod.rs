pub mod api;
pub mod auth;

pub use api::{
    CallbackQuery, Chat, InlineButton, Message, TelegramApiClient, Update, User, API_BASE_ENV,
};
pub use auth::{resolve_credentials, resolve_token, TelegramCredentials, TOKEN_ENV};

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("telegram token is not configured (set `{TOKEN_ENV}` or `telegram.token`)")]
    MissingToken,
    #[error("telegram chat id is not configured (`telegram.chat_id`)")]
    MissingChatId,
    #[error("telegram api request failed: {0}")]
    ApiRequest(String),
    #[error("telegram api responded with error `{0}`")]
    ApiResponse(String),
}
