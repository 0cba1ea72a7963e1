use super::frontend::{Dispatch, Frontend, Interaction, Screen};
use super::launcher::JobLauncher;
use crate::channels::telegram::{TelegramApiClient, TelegramError, Update};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

pub const POLL_TIMEOUT: Duration = Duration::from_secs(30);
pub const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Single-threaded interaction loop. It only dispatches and launches; backup
/// jobs run on their own threads and report through the notifier.
pub struct BotRuntime {
    api: TelegramApiClient,
    frontend: Frontend,
    launcher: JobLauncher,
    poll_timeout: Duration,
    error_backoff: Duration,
}

impl BotRuntime {
    pub fn new(api: TelegramApiClient, frontend: Frontend, launcher: JobLauncher) -> Self {
        Self {
            api,
            frontend,
            launcher,
            poll_timeout: POLL_TIMEOUT,
            error_backoff: ERROR_BACKOFF,
        }
    }

    pub fn with_poll_timing(mut self, poll_timeout: Duration, error_backoff: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self.error_backoff = error_backoff;
        self
    }

    pub fn run_until_stop(&self, stop: &AtomicBool) {
        tracing::info!("bot polling started");
        let mut offset = None;
        while !stop.load(Ordering::Relaxed) {
            if let Err(err) = self.poll_once(&mut offset) {
                tracing::error!(error = %err, "telegram polling failed");
                sleep_with_stop(stop, self.error_backoff);
            }
        }
        tracing::info!("bot polling stopped");
    }

    /// Fetches one batch of updates and handles each in order. Returns the
    /// number of updates consumed.
    pub fn poll_once(&self, offset: &mut Option<i64>) -> Result<usize, TelegramError> {
        let updates = self.api.get_updates(*offset, self.poll_timeout)?;
        for update in &updates {
            *offset = Some(update.update_id + 1);
            self.handle_update(update);
        }
        Ok(updates.len())
    }

    fn handle_update(&self, update: &Update) {
        let Some(interaction) = Interaction::from_update(update) else {
            return;
        };
        let dispatch = self.frontend.handle(&interaction);
        let screen = self.launch(dispatch);
        self.deliver(&interaction, &screen);
    }

    fn launch(&self, dispatch: Dispatch) -> Screen {
        let Some(task) = dispatch.launch else {
            return dispatch.screen;
        };
        match self.launcher.launch(&task) {
            Ok(_detached) => dispatch.screen,
            Err(err) => {
                tracing::error!(task = %task, error = %err, "failed to spawn backup job");
                Screen::LaunchFailed {
                    task,
                    reason: err.to_string(),
                }
            }
        }
    }

    fn deliver(&self, interaction: &Interaction, screen: &Screen) {
        let reply = screen.render();
        let result = match interaction {
            Interaction::Command { chat_id, .. } => {
                let keyboard = (!reply.keyboard.is_empty()).then_some(reply.keyboard.as_slice());
                self.api.send_message(*chat_id, &reply.text, keyboard)
            }
            Interaction::Callback { callback_id, .. } if *screen == Screen::Denied => {
                self.api
                    .answer_callback_query(callback_id, Some(&reply.text), true)
            }
            Interaction::Callback {
                callback_id,
                chat_id,
                message_id,
                ..
            } => self
                .api
                .answer_callback_query(callback_id, None, false)
                .and_then(|_| {
                    self.api
                        .edit_message_text(*chat_id, *message_id, &reply.text, &reply.keyboard)
                }),
        };
        if let Err(err) = result {
            tracing::warn!(
                chat_id = interaction.chat_id(),
                error = %err,
                "failed to deliver bot reply"
            );
        }
    }
}

fn sleep_with_stop(stop: &AtomicBool, total: Duration) -> bool {
    let mut remaining = total;
    while remaining > Duration::from_millis(0) {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        let step = remaining.min(Duration::from_millis(200));
        thread::sleep(step);
        remaining = remaining.saturating_sub(step);
    }
    !stop.load(Ordering::Relaxed)
}
