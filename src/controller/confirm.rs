/// Deferred work a confirmation dialog can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    ClearAll,
    ClearHistory,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmDialog {
    pub show: bool,
    pub title: String,
    pub message: String,
    pub on_confirm: Option<ConfirmAction>,
    pub on_reject: Option<ConfirmAction>,
}

impl ConfirmDialog {
    pub fn open(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
        on_confirm: ConfirmAction,
        on_reject: Option<ConfirmAction>,
    ) {
        self.title = title.into();
        self.message = message.into();
        self.on_confirm = Some(on_confirm);
        self.on_reject = on_reject;
        self.show = true;
    }

    /// Closes the dialog and hands back the confirm action, if it was open.
    pub fn confirm(&mut self) -> Option<ConfirmAction> {
        if !self.show {
            return None;
        }
        let action = self.on_confirm;
        self.hide();
        action
    }

    pub fn reject(&mut self) -> Option<ConfirmAction> {
        if !self.show {
            return None;
        }
        let action = self.on_reject;
        self.hide();
        action
    }

    pub fn hide(&mut self) {
        *self = Self::default();
    }
}
