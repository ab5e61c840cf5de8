use std::sync::Arc;

use tokio::{sync::mpsc::UnboundedSender, time::sleep};

use crate::{
    api::ClassifierClient,
    config::UiConfig,
    domain::{ClassificationResult, History, HistoryEntry, Submission, Upload},
    storage::{LocalStorage, AUTO_REFRESH_KEY, DARK_MODE_KEY, HISTORY_KEY},
};

use super::{
    clipboard::Clipboard,
    confirm::{ConfirmAction, ConfirmDialog},
    debounce::Debouncer,
    events::{Event, SubmitMode},
    notification::{NotificationKind, NotificationState},
    shortcuts::Shortcut,
};

pub const MSG_EMPTY_INPUT: &str = "Please enter some text or select a file";
pub const MSG_BUSY: &str = "A classification is already in progress";
pub const MSG_CLASSIFIED: &str = "Email classified successfully!";
pub const MSG_NOTHING_TO_CLEAR: &str = "There is nothing to clear";
pub const MSG_CLEARED: &str = "Fields cleared successfully";
pub const MSG_HISTORY_EMPTY: &str = "History is already empty";
pub const MSG_HISTORY_CLEARED: &str = "History cleared successfully";
pub const MSG_HISTORY_LOADED: &str = "Item loaded from history";
pub const MSG_COPIED: &str = "Reply copied to clipboard!";
pub const MSG_COPY_FAILED: &str = "Failed to copy reply";
pub const MSG_AUTO_ON: &str = "Auto-refresh enabled - results will update automatically";
pub const MSG_AUTO_OFF: &str = "Auto-refresh disabled";

pub struct ControllerDeps {
    pub classifier: ClassifierClient,
    pub storage: Arc<LocalStorage>,
    pub clipboard: Arc<dyn Clipboard>,
}

/// State of the email form. Owned by one event-loop task: every mutation
/// happens in [`EmailController::handle`], async work reports back through
/// the event channel.
pub struct EmailController {
    raw_text: String,
    file: Option<Upload>,
    loading: bool,
    result: Option<ClassificationResult>,
    dark_mode: bool,
    auto_refresh: bool,
    last_processed_text: String,
    notification: NotificationState,
    confirm: ConfirmDialog,
    history: History,
    debouncer: Debouncer,
    revision: u64,
    config: UiConfig,
    deps: ControllerDeps,
    events: UnboundedSender<Event>,
}

impl EmailController {
    pub fn new(config: UiConfig, deps: ControllerDeps, events: UnboundedSender<Event>) -> Self {
        let dark_mode = deps.storage.get_flag(DARK_MODE_KEY);
        let auto_refresh = deps.storage.get_flag(AUTO_REFRESH_KEY);
        let history = match deps.storage.get_json::<Vec<HistoryEntry>>(HISTORY_KEY) {
            Ok(entries) => History::from_entries(entries.unwrap_or_default()),
            Err(err) => {
                tracing::warn!(target: "controller", error = %err, "stored history unreadable; starting empty");
                History::default()
            }
        };

        Self {
            raw_text: String::new(),
            file: None,
            loading: false,
            result: None,
            dark_mode,
            auto_refresh,
            last_processed_text: String::new(),
            notification: NotificationState::default(),
            confirm: ConfirmDialog::default(),
            history,
            debouncer: Debouncer::new(config.debounce),
            revision: 0,
            config,
            deps,
            events,
        }
    }

    pub fn handle(&mut self, event: Event) {
        match event {
            Event::TextChanged(text) => self.set_text(text),
            Event::AppendText(line) => {
                let mut text = self.raw_text.clone();
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&line);
                self.set_text(text);
            }
            Event::FileSelected(upload) => self.select_file(upload),
            Event::Submit => self.submit(),
            Event::ClearAll => self.clear_all(),
            Event::ToggleDarkMode => self.toggle_dark_mode(),
            Event::ToggleAutoRefresh => self.toggle_auto_refresh(),
            Event::CopyReply => self.copy_reply(),
            Event::ClearHistory => self.clear_history(),
            Event::LoadFromHistory(index) => self.load_from_history(index),
            Event::Confirm => {
                if let Some(action) = self.confirm.confirm() {
                    self.run_confirmed(action);
                }
                self.touch();
            }
            Event::Reject => {
                if let Some(action) = self.confirm.reject() {
                    self.run_confirmed(action);
                }
                self.touch();
            }
            Event::Shortcut(shortcut) => self.on_shortcut(shortcut),
            Event::Notify { message, kind } => self.notify(message, kind),
            Event::DebounceElapsed { generation } => self.on_debounce_elapsed(generation),
            Event::SubmitFinished {
                mode,
                text,
                outcome,
            } => self.on_submit_finished(mode, text, outcome),
            Event::CopyFinished(outcome) => match outcome {
                Ok(()) => self.notify(MSG_COPIED, NotificationKind::Success),
                Err(err) => {
                    tracing::warn!(target: "controller", error = %err, "clipboard write failed");
                    self.notify(MSG_COPY_FAILED, NotificationKind::Error);
                }
            },
            Event::NotificationExpired { id } => {
                if self.notification.expire(id) {
                    self.touch();
                }
            }
            Event::ResetInputs => {
                self.raw_text.clear();
                self.file = None;
                tracing::debug!(target: "controller", "inputs cleared after submission");
                self.touch();
            }
        }
    }

    pub fn submit(&mut self) {
        let Some(submission) = Submission::from_inputs(&self.raw_text, self.file.as_ref()) else {
            self.notify(MSG_EMPTY_INPUT, NotificationKind::Error);
            return;
        };
        if self.loading {
            self.notify(MSG_BUSY, NotificationKind::Info);
            return;
        }

        let label = if self.raw_text.is_empty() {
            self.file.as_ref().map(|f| f.name.clone()).unwrap_or_default()
        } else {
            self.raw_text.clone()
        };
        self.loading = true;
        self.result = None;
        self.touch();
        self.spawn_classify(SubmitMode::Interactive, submission, label);
    }

    fn auto_submit(&mut self) {
        if !self.should_auto_submit() {
            return;
        }
        let text = self.raw_text.clone();
        self.loading = true;
        self.touch();
        self.spawn_classify(SubmitMode::Auto, Submission::Text(text.clone()), text);
    }

    fn spawn_classify(&self, mode: SubmitMode, submission: Submission, text: String) {
        let classifier = self.deps.classifier.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = classifier.classify(&submission).await;
            let _ = events.send(Event::SubmitFinished {
                mode,
                text,
                outcome,
            });
        });
    }

    fn on_submit_finished(
        &mut self,
        mode: SubmitMode,
        text: String,
        outcome: Result<ClassificationResult, crate::api::ApiError>,
    ) {
        self.loading = false;
        self.touch();
        match (mode, outcome) {
            (SubmitMode::Interactive, Ok(result)) => {
                self.result = Some(result.clone());
                self.save_to_history(HistoryEntry::new(text, result));
                self.notify(MSG_CLASSIFIED, NotificationKind::Success);
                self.schedule(self.config.reset_delay, Event::ResetInputs);
            }
            (SubmitMode::Interactive, Err(err)) => {
                tracing::warn!(target: "controller", error = %err, "classification failed");
                self.notify(err.to_string(), NotificationKind::Error);
            }
            (SubmitMode::Auto, Ok(result)) => {
                self.result = Some(result.clone());
                self.last_processed_text = text.clone();
                self.save_to_history(HistoryEntry::new(text, result).auto_generated());
            }
            (SubmitMode::Auto, Err(err)) => {
                tracing::warn!(target: "controller", error = %err, "auto-refresh error");
            }
        }
    }

    /// Text watcher: every edit lands here, and arms the debounce timer when
    /// auto-refresh applies to the new text.
    pub fn set_text(&mut self, text: String) {
        self.raw_text = text;
        self.touch();
        if self.auto_refresh
            && self.raw_text.chars().count() > self.config.auto_submit_min_chars
            && self.raw_text != self.last_processed_text
        {
            self.debouncer.schedule(&self.events);
        }
    }

    fn on_debounce_elapsed(&mut self, generation: u64) {
        if !self.debouncer.fire(generation) {
            return;
        }
        if !self.loading && !self.raw_text.trim().is_empty() {
            self.auto_submit();
        }
    }

    fn should_auto_submit(&self) -> bool {
        self.auto_refresh
            && !self.raw_text.is_empty()
            && self.raw_text.chars().count() > self.config.auto_submit_min_chars
            && self.raw_text != self.last_processed_text
    }

    pub fn select_file(&mut self, upload: Upload) {
        let message = format!("File selected: {}", upload.name);
        self.file = Some(upload);
        self.notify(message, NotificationKind::Success);
    }

    pub fn clear_all(&mut self) {
        if self.has_content() {
            self.confirm.open(
                "Clear all fields",
                "Are you sure you want to clear all fields? This cannot be undone.",
                ConfirmAction::ClearAll,
                None,
            );
            self.touch();
        } else {
            self.notify(MSG_NOTHING_TO_CLEAR, NotificationKind::Info);
        }
    }

    fn run_confirmed(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::ClearAll => {
                self.raw_text.clear();
                self.file = None;
                self.result = None;
                self.debouncer.cancel();
                self.touch();
                self.notify(MSG_CLEARED, NotificationKind::Success);
            }
            ConfirmAction::ClearHistory => {
                self.history.clear();
                if let Err(err) = self.deps.storage.remove_item(HISTORY_KEY) {
                    tracing::warn!(target: "controller", error = %err, "failed to drop stored history");
                }
                self.touch();
                self.notify(MSG_HISTORY_CLEARED, NotificationKind::Success);
            }
        }
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
        self.persist_flag(DARK_MODE_KEY, self.dark_mode);
        self.touch();
    }

    pub fn toggle_auto_refresh(&mut self) {
        self.auto_refresh = !self.auto_refresh;
        self.persist_flag(AUTO_REFRESH_KEY, self.auto_refresh);
        if self.auto_refresh {
            self.notify(MSG_AUTO_ON, NotificationKind::Info);
        } else {
            self.debouncer.cancel();
            self.notify(MSG_AUTO_OFF, NotificationKind::Info);
        }
    }

    pub fn copy_reply(&mut self) {
        let Some(reply) = self
            .result
            .as_ref()
            .and_then(|result| result.suggested_reply())
            .map(str::to_string)
        else {
            return;
        };
        let clipboard = self.deps.clipboard.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = clipboard.write_text(&reply).await;
            let _ = events.send(Event::CopyFinished(outcome));
        });
    }

    pub fn save_to_history(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
        if let Err(err) = self
            .deps
            .storage
            .set_json(HISTORY_KEY, self.history.entries())
        {
            tracing::warn!(target: "controller", error = %err, "failed to persist history");
        }
        self.touch();
    }

    pub fn clear_history(&mut self) {
        if self.history.is_empty() {
            self.notify(MSG_HISTORY_EMPTY, NotificationKind::Info);
            return;
        }
        self.confirm.open(
            "Clear history",
            "Are you sure you want to clear the whole history? This cannot be undone.",
            ConfirmAction::ClearHistory,
            None,
        );
        self.touch();
    }

    pub fn load_from_history(&mut self, index: usize) {
        let Some(entry) = self.history.get(index).cloned() else {
            self.notify(format!("No history entry #{}", index + 1), NotificationKind::Error);
            return;
        };
        self.set_text(entry.text);
        self.result = Some(entry.result);
        self.notify(MSG_HISTORY_LOADED, NotificationKind::Info);
    }

    fn on_shortcut(&mut self, shortcut: Shortcut) {
        match shortcut {
            Shortcut::Submit => {
                if !self.loading && (!self.raw_text.is_empty() || self.file.is_some()) {
                    self.submit();
                }
            }
            Shortcut::Clear => {
                if self.has_content() {
                    self.clear_all();
                }
            }
            Shortcut::CopyReply => {
                if self.reply().is_some() {
                    self.copy_reply();
                }
            }
        }
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: NotificationKind) {
        let id = self.notification.present(message, kind);
        self.touch();
        self.schedule(self.config.notification_ttl, Event::NotificationExpired { id });
    }

    fn schedule(&self, delay: std::time::Duration, event: Event) {
        let events = self.events.clone();
        tokio::spawn(async move {
            sleep(delay).await;
            let _ = events.send(event);
        });
    }

    fn persist_flag(&self, key: &str, value: bool) {
        if let Err(err) = self.deps.storage.set_flag(key, value) {
            tracing::warn!(target: "controller", key, error = %err, "failed to persist flag");
        }
    }

    fn has_content(&self) -> bool {
        !self.raw_text.is_empty() || self.file.is_some() || self.result.is_some()
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn file(&self) -> Option<&Upload> {
        self.file.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn result(&self) -> Option<&ClassificationResult> {
        self.result.as_ref()
    }

    pub fn reply(&self) -> Option<&str> {
        self.result.as_ref().and_then(|result| result.suggested_reply())
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    pub fn notification(&self) -> &NotificationState {
        &self.notification
    }

    pub fn confirm_dialog(&self) -> &ConfirmDialog {
        &self.confirm
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Bumped on every state change; the renderer redraws when it moves.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
