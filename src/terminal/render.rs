use std::fmt::Write;

use chrono_tz::Tz;

use crate::{
    controller::{ConfirmDialog, EmailController, NotificationKind, NotificationState},
    domain::{ClassificationResult, ConfidenceTier, History, HISTORY_LIMIT},
};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// ANSI palette; the dark theme swaps to the bright variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub dark: bool,
}

impl Theme {
    fn tier(&self, tier: ConfidenceTier) -> &'static str {
        match (tier, self.dark) {
            (ConfidenceTier::Good, false) => "\x1b[32m",
            (ConfidenceTier::Warn, false) => "\x1b[33m",
            (ConfidenceTier::Bad, false) => "\x1b[31m",
            (ConfidenceTier::Good, true) => "\x1b[92m",
            (ConfidenceTier::Warn, true) => "\x1b[93m",
            (ConfidenceTier::Bad, true) => "\x1b[91m",
        }
    }

    fn notification(&self, kind: NotificationKind) -> &'static str {
        match kind {
            NotificationKind::Success => self.tier(ConfidenceTier::Good),
            NotificationKind::Error => self.tier(ConfidenceTier::Bad),
            NotificationKind::Info if self.dark => "\x1b[96m",
            NotificationKind::Info => "\x1b[36m",
        }
    }
}

pub fn render_view(controller: &EmailController) -> String {
    let theme = Theme {
        dark: controller.dark_mode(),
    };
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{DIM}── AutoU ── theme: {} · auto-refresh: {}{}{RESET}",
        if theme.dark { "dark" } else { "light" },
        if controller.auto_refresh() { "on" } else { "off" },
        if controller.is_loading() { " · classifying…" } else { "" },
    );

    let draft = controller.raw_text();
    if !draft.is_empty() {
        let lines = draft.lines().count();
        let preview: String = draft.chars().take(60).collect();
        let preview = preview.replace('\n', " ⏎ ");
        let _ = writeln!(out, "draft ({lines} lines): {preview}");
    }
    if let Some(file) = controller.file() {
        let _ = writeln!(out, "file: {} ({} bytes)", file.name, file.bytes.len());
    }
    if let Some(result) = controller.result() {
        out.push_str(&render_result(result, theme));
    }
    if let Some(line) = render_notification(controller.notification(), theme) {
        let _ = writeln!(out, "{line}");
    }
    if let Some(block) = render_confirm(controller.confirm_dialog()) {
        out.push_str(&block);
    }
    out
}

pub fn render_result(result: &ClassificationResult, theme: Theme) -> String {
    let mut out = String::new();
    if let Some(category) = result.category() {
        let _ = writeln!(
            out,
            "{BOLD}category{RESET}: {category}{}",
            score_suffix(result.confidence(), theme)
        );
    } else if let Some(score) = result.confidence() {
        let _ = writeln!(out, "{BOLD}confidence{RESET}:{}", score_suffix(Some(score), theme));
    }
    if let Some(intent) = result.intent() {
        let _ = writeln!(
            out,
            "{BOLD}intent{RESET}: {intent}{}",
            score_suffix(result.intent_score(), theme)
        );
    }
    if let Some(reply) = result.suggested_reply() {
        let source = result
            .reply_source()
            .map(|source| format!(" {DIM}({source}){RESET}"))
            .unwrap_or_default();
        let _ = writeln!(out, "{BOLD}suggested reply{RESET}{source}:");
        for line in reply.lines() {
            let _ = writeln!(out, "  {line}");
        }
    }
    out
}

fn score_suffix(score: Option<f64>, theme: Theme) -> String {
    match score {
        Some(score) => {
            let tier = ConfidenceTier::from_score(score);
            format!(
                " {}{:.0}% [{}]{RESET}",
                theme.tier(tier),
                score * 100.0,
                tier.label()
            )
        }
        None => String::new(),
    }
}

pub fn render_notification(state: &NotificationState, theme: Theme) -> Option<String> {
    state.show.then(|| {
        let icon = match state.kind {
            NotificationKind::Success => "✔",
            NotificationKind::Error => "✖",
            NotificationKind::Info => "ℹ",
        };
        format!("{}{icon} {}{RESET}", theme.notification(state.kind), state.message)
    })
}

pub fn render_confirm(dialog: &ConfirmDialog) -> Option<String> {
    dialog.show.then(|| {
        format!(
            "{BOLD}{}{RESET}\n{}\n  :yes to confirm, :no to cancel\n",
            dialog.title, dialog.message
        )
    })
}

pub fn render_history(history: &History, tz: &Tz) -> String {
    if history.is_empty() {
        return "history is empty\n".to_string();
    }
    let mut out = format!("{BOLD}history{RESET} ({}/{HISTORY_LIMIT})\n", history.len());
    for (position, entry) in history.entries().iter().enumerate() {
        let preview: String = entry.text.chars().take(48).collect();
        let preview = preview.replace('\n', " ");
        let category = entry.result.category().unwrap_or("-");
        let auto = if entry.is_auto_generated() { " (auto)" } else { "" };
        let _ = writeln!(
            out,
            "{:>2}. {} {category}{auto} {DIM}{preview}{RESET}",
            position + 1,
            entry.format_timestamp(tz),
        );
    }
    out
}
