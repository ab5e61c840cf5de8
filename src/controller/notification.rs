#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationKind {
    Success,
    Error,
    #[default]
    Info,
}

/// Transient toast. `id` grows with every new message so a dismissal timer
/// only hides the message it was started for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationState {
    pub show: bool,
    pub message: String,
    pub kind: NotificationKind,
    pub id: u64,
}

impl NotificationState {
    pub fn present(&mut self, message: impl Into<String>, kind: NotificationKind) -> u64 {
        self.id += 1;
        self.message = message.into();
        self.kind = kind;
        self.show = true;
        self.id
    }

    /// Returns true when the notification was hidden.
    pub fn expire(&mut self, id: u64) -> bool {
        if self.show && self.id == id {
            self.show = false;
            true
        } else {
            false
        }
    }
}
