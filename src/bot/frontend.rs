use super::actions::{BotAction, BotCommand};
use crate::channels::telegram::{InlineButton, Update};
use crate::config::BackupConfig;
use std::sync::Arc;

const DENIED_TEXT: &str = "⛔ Access denied.";

/// One inbound chat event, reduced to what the state machine needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Command {
        sender_id: i64,
        chat_id: i64,
        text: String,
    },
    Callback {
        callback_id: String,
        sender_id: i64,
        chat_id: i64,
        message_id: i64,
        data: String,
    },
}

impl Interaction {
    /// `None` for updates the bot ignores (no sender, no text, no payload).
    pub fn from_update(update: &Update) -> Option<Self> {
        if let Some(callback) = &update.callback_query {
            let message = callback.message.as_ref()?;
            return Some(Self::Callback {
                callback_id: callback.id.clone(),
                sender_id: callback.from.id,
                chat_id: message.chat.id,
                message_id: message.message_id,
                data: callback.data.clone().unwrap_or_default(),
            });
        }
        let message = update.message.as_ref()?;
        Some(Self::Command {
            sender_id: message.from.as_ref()?.id,
            chat_id: message.chat.id,
            text: message.text.clone()?,
        })
    }

    pub fn sender_id(&self) -> i64 {
        match self {
            Self::Command { sender_id, .. } | Self::Callback { sender_id, .. } => *sender_id,
        }
    }

    pub fn chat_id(&self) -> i64 {
        match self {
            Self::Command { chat_id, .. } | Self::Callback { chat_id, .. } => *chat_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    Help,
    TaskList(Vec<String>),
    Confirm(String),
    Launched(String),
    LaunchFailed { task: String, reason: String },
    UnknownTask(String),
    UnknownAction,
    Hint,
    Denied,
}

/// Text plus inline keyboard for a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Vec<Vec<InlineButton>>,
}

fn button(text: &str, action: BotAction) -> InlineButton {
    InlineButton::new(text, action.encode())
}

fn main_menu_keyboard() -> Vec<Vec<InlineButton>> {
    vec![vec![button("📦 Manual backup", BotAction::TaskList)]]
}

fn back_to_menu_keyboard() -> Vec<Vec<InlineButton>> {
    vec![vec![button("⬅️ Main menu", BotAction::MainMenu)]]
}

impl Screen {
    pub fn render(&self) -> Reply {
        match self {
            Screen::MainMenu => Reply {
                text: "*Backup bot*\n\nChoose an action:".to_string(),
                keyboard: main_menu_keyboard(),
            },
            Screen::Help => Reply {
                text: "*Backup bot*\n\n/start opens the main menu.\n\
                       Pick *Manual backup*, choose a task and confirm to run it \
                       in the background. The result arrives as a separate message."
                    .to_string(),
                keyboard: main_menu_keyboard(),
            },
            Screen::TaskList(names) if names.is_empty() => Reply {
                text: "No backup tasks are configured.".to_string(),
                keyboard: back_to_menu_keyboard(),
            },
            Screen::TaskList(names) => {
                let mut keyboard: Vec<Vec<InlineButton>> = names
                    .iter()
                    .map(|name| vec![button(name, BotAction::SelectTask(name.clone()))])
                    .collect();
                keyboard.extend(back_to_menu_keyboard());
                Reply {
                    text: "Select a task to back up:".to_string(),
                    keyboard,
                }
            }
            Screen::Confirm(name) => Reply {
                text: format!("Run backup task `{name}` now?"),
                keyboard: vec![vec![
                    button("✅ Start", BotAction::ConfirmBackup(name.clone())),
                    button("✖️ Cancel", BotAction::TaskList),
                ]],
            },
            Screen::Launched(name) => Reply {
                text: format!(
                    "🚀 Backup `{name}` started in the background.\n\
                     You will be notified when it finishes."
                ),
                keyboard: main_menu_keyboard(),
            },
            Screen::LaunchFailed { task, reason } => Reply {
                text: format!("❌ Could not start backup `{task}`: {reason}"),
                keyboard: main_menu_keyboard(),
            },
            Screen::UnknownTask(name) => Reply {
                text: format!("Task `{name}` is not configured."),
                keyboard: vec![vec![button("⬅️ Back", BotAction::TaskList)]],
            },
            Screen::UnknownAction => Reply {
                text: "Unknown action.".to_string(),
                keyboard: main_menu_keyboard(),
            },
            Screen::Hint => Reply {
                text: "Send /start to open the menu.".to_string(),
                keyboard: Vec::new(),
            },
            Screen::Denied => Reply {
                text: DENIED_TEXT.to_string(),
                keyboard: Vec::new(),
            },
        }
    }
}

/// Outcome of handling one interaction: what to show, and which task (if
/// any) to launch in the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub screen: Screen,
    pub launch: Option<String>,
}

impl Dispatch {
    fn show(screen: Screen) -> Self {
        Self {
            screen,
            launch: None,
        }
    }
}

/// Authorization-gated menu state machine. Holds no per-chat state: each
/// button payload carries everything needed for the next transition.
#[derive(Debug, Clone)]
pub struct Frontend {
    config: Arc<BackupConfig>,
    authorized_id: i64,
}

impl Frontend {
    pub fn new(config: Arc<BackupConfig>, authorized_id: i64) -> Self {
        Self {
            config,
            authorized_id,
        }
    }

    pub fn is_authorized(&self, interaction: &Interaction) -> bool {
        interaction.sender_id() == self.authorized_id
    }

    pub fn handle(&self, interaction: &Interaction) -> Dispatch {
        if !self.is_authorized(interaction) {
            tracing::warn!(
                sender_id = interaction.sender_id(),
                "rejected interaction from unauthorized sender"
            );
            return Dispatch::show(Screen::Denied);
        }

        match interaction {
            Interaction::Command { text, .. } => match BotCommand::parse(text) {
                Some(BotCommand::Start) => Dispatch::show(Screen::MainMenu),
                Some(BotCommand::Help) => Dispatch::show(Screen::Help),
                None => Dispatch::show(Screen::Hint),
            },
            Interaction::Callback { data, .. } => match BotAction::parse(data) {
                Ok(action) => self.dispatch_action(action),
                Err(err) => {
                    tracing::warn!(error = %err, "ignoring callback payload");
                    Dispatch::show(Screen::UnknownAction)
                }
            },
        }
    }

    fn dispatch_action(&self, action: BotAction) -> Dispatch {
        match action {
            BotAction::MainMenu => Dispatch::show(Screen::MainMenu),
            BotAction::TaskList => Dispatch::show(Screen::TaskList(
                self.config
                    .task_names()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            )),
            BotAction::SelectTask(name) => match self.config.find_task(&name) {
                Ok(_) => Dispatch::show(Screen::Confirm(name)),
                Err(_) => Dispatch::show(Screen::UnknownTask(name)),
            },
            BotAction::ConfirmBackup(name) => match self.config.find_task(&name) {
                Ok(_) => Dispatch {
                    screen: Screen::Launched(name.clone()),
                    launch: Some(name),
                },
                Err(_) => Dispatch::show(Screen::UnknownTask(name)),
            },
        }
    }
}
