/// Button payloads. Encoded as `action` or `action:<task name>`; everything
/// after the first `:` is the task name, so names may contain `:` themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotAction {
    MainMenu,
    TaskList,
    SelectTask(String),
    ConfirmBackup(String),
}

const MAIN_MENU: &str = "main_menu";
const TASK_LIST: &str = "manual_backup";
const SELECT_TASK: &str = "select_task";
const CONFIRM_BACKUP: &str = "confirm_backup";

impl BotAction {
    pub fn encode(&self) -> String {
        match self {
            Self::MainMenu => MAIN_MENU.to_string(),
            Self::TaskList => TASK_LIST.to_string(),
            Self::SelectTask(name) => format!("{SELECT_TASK}:{name}"),
            Self::ConfirmBackup(name) => format!("{CONFIRM_BACKUP}:{name}"),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        let (action, param) = match raw.split_once(':') {
            Some((action, param)) => (action, Some(param)),
            None => (raw, None),
        };
        match (action, param) {
            (MAIN_MENU, None) => Ok(Self::MainMenu),
            (TASK_LIST, None) => Ok(Self::TaskList),
            (SELECT_TASK, Some(name)) if !name.is_empty() => Ok(Self::SelectTask(name.to_string())),
            (CONFIRM_BACKUP, Some(name)) if !name.is_empty() => {
                Ok(Self::ConfirmBackup(name.to_string()))
            }
            _ => Err(format!("unknown bot action `{raw}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
}

impl BotCommand {
    /// Accepts `/start`, `/help` and the group-chat form `/start@botname`.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let command = word.strip_prefix('/')?;
        let command = command.split_once('@').map_or(command, |(cmd, _)| cmd);
        match command {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            _ => None,
        }
    }
}
