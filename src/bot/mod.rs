pub mod actions;
pub mod frontend;
pub mod launcher;
pub mod runtime;

pub use actions::{BotAction, BotCommand};
pub use frontend::{Dispatch, Frontend, Interaction, Reply, Screen};
pub use launcher::JobLauncher;
pub use runtime::BotRuntime;
