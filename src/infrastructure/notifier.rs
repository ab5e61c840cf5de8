use std::io::{self, Write};

use crate::worker::{NotificationSink, PushNotification};

/// Shows worker notifications as lines on the terminal.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl NotificationSink for TerminalNotifier {
    fn show(&self, notification: &PushNotification) {
        let actions = notification
            .actions
            .iter()
            .map(|action| format!("[{}] {}", action.action, action.title))
            .collect::<Vec<_>>()
            .join("  ");
        print_line(&format!(
            "\u{1F514} {}: {}    {}",
            notification.title, notification.body, actions
        ));
    }

    fn close(&self) {
        tracing::debug!(target: "worker", "notification closed");
    }

    fn open_window(&self, path: &str) {
        print_line(&format!("\u{2197} opening app at {path}"));
    }
}

fn print_line(line: &str) {
    let mut stdout = io::stdout().lock();
    if let Err(err) = writeln!(stdout, "{line}") {
        tracing::warn!(target: "worker", error = %err, "failed to print notification");
    }
}
