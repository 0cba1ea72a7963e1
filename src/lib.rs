pub mod app;
pub mod bot;
pub mod channels;
pub mod command;
pub mod config;
pub mod crontab;
pub mod notify;
pub mod pipeline;
