use crate::{
    api::ApiError,
    domain::{ClassificationResult, Upload},
};

use super::{clipboard::ClipboardError, notification::NotificationKind, shortcuts::Shortcut};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    Interactive,
    /// Debounced background submission; failures are only logged.
    Auto,
}

/// Everything the controller reacts to. User intents come from the front end;
/// the rest are posted back by timers and background tasks.
#[derive(Debug)]
pub enum Event {
    TextChanged(String),
    AppendText(String),
    FileSelected(Upload),
    Submit,
    ClearAll,
    ToggleDarkMode,
    ToggleAutoRefresh,
    CopyReply,
    ClearHistory,
    LoadFromHistory(usize),
    Confirm,
    Reject,
    Shortcut(Shortcut),
    Notify {
        message: String,
        kind: NotificationKind,
    },

    DebounceElapsed {
        generation: u64,
    },
    SubmitFinished {
        mode: SubmitMode,
        text: String,
        outcome: Result<ClassificationResult, ApiError>,
    },
    CopyFinished(Result<(), ClipboardError>),
    NotificationExpired {
        id: u64,
    },
    ResetInputs,
}
