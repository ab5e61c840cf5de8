//! Email form controller: input state, submissions, debounced auto-refresh,
//! notifications, confirmation dialog and the persisted history.

pub mod clipboard;
pub mod confirm;
mod debounce;
mod email;
pub mod events;
pub mod notification;
pub mod shortcuts;

pub use clipboard::{Clipboard, ClipboardError};
pub use confirm::ConfirmDialog;
pub use email::{ControllerDeps, EmailController};
pub use events::Event;
pub use notification::{NotificationKind, NotificationState};
pub use shortcuts::{KeyChord, Shortcut};
