use std::path::PathBuf;

use thiserror::Error;

use crate::controller::{shortcuts::ChordParseError, Event, KeyChord, Shortcut};

pub const HELP: &str = "\
Type or paste the email; every line is appended to the draft.
  :submit              classify the draft (or the selected file)
  :set [text]          replace the draft (empty clears it)
  :file <path>         attach a .txt or .pdf file
  :clear               clear text, file and result
  :copy                copy the suggested reply
  :dark / :auto        toggle dark mode / auto-refresh
  :history             list recent classifications
  :load <n>            restore history entry n
  :clear-history       forget all history
  :yes / :no           answer the confirmation dialog
  :key <chord>         ctrl+enter, ctrl+l, ctrl+shift+c
  :sw <cmd> [arg]      worker: install, activate, skip, version, update,
                       push, click, sync
  :show                redraw   :help   :quit
Lines starting with '::' are taken literally.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Submit,
    SetText(String),
    Clear,
    ToggleDark,
    ToggleAuto,
    Copy,
    ClearHistory,
    Load(usize),
    Yes,
    No,
    Key(Shortcut),
}

impl Command {
    pub fn into_event(self) -> Event {
        match self {
            Command::Submit => Event::Submit,
            Command::SetText(text) => Event::TextChanged(text),
            Command::Clear => Event::ClearAll,
            Command::ToggleDark => Event::ToggleDarkMode,
            Command::ToggleAuto => Event::ToggleAutoRefresh,
            Command::Copy => Event::CopyReply,
            Command::ClearHistory => Event::ClearHistory,
            Command::Load(index) => Event::LoadFromHistory(index),
            Command::Yes => Event::Confirm,
            Command::No => Event::Reject,
            Command::Key(shortcut) => Event::Shortcut(shortcut),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerCommand {
    Install,
    Activate,
    SkipWaiting,
    Version,
    UpdateFound,
    Push(Option<String>),
    Click(Option<String>),
    Sync(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Text(String),
    Command(Command),
    AttachFile(PathBuf),
    Worker(WorkerCommand),
    History,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command :{0} (try :help)")]
    Unknown(String),
    #[error(":{0} needs an argument")]
    MissingArgument(&'static str),
    #[error("not a history position: {0}")]
    BadIndex(String),
    #[error(transparent)]
    Chord(#[from] ChordParseError),
    #[error("no shortcut is bound to {0}")]
    Unbound(String),
}

pub fn parse_line(line: &str) -> Result<Input, InputError> {
    if let Some(literal) = line.strip_prefix("::") {
        return Ok(Input::Text(format!(":{literal}")));
    }
    let Some(command) = line.strip_prefix(':') else {
        return Ok(Input::Text(line.to_string()));
    };

    let command = command.trim();
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|arg| !arg.is_empty())),
        None => (command, None),
    };

    let input = match name {
        "submit" | "s" => Input::Command(Command::Submit),
        "set" => Input::Command(Command::SetText(arg.unwrap_or_default().to_string())),
        "clear" => Input::Command(Command::Clear),
        "dark" => Input::Command(Command::ToggleDark),
        "auto" => Input::Command(Command::ToggleAuto),
        "copy" => Input::Command(Command::Copy),
        "clear-history" => Input::Command(Command::ClearHistory),
        "yes" | "y" => Input::Command(Command::Yes),
        "no" | "n" => Input::Command(Command::No),
        "history" | "h" => Input::History,
        "show" => Input::Show,
        "help" | "?" => Input::Help,
        "quit" | "q" | "exit" => Input::Quit,
        "file" => Input::AttachFile(PathBuf::from(arg.ok_or(InputError::MissingArgument("file"))?)),
        "load" => {
            let raw = arg.ok_or(InputError::MissingArgument("load"))?;
            let position = raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| InputError::BadIndex(raw.to_string()))?;
            Input::Command(Command::Load(position - 1))
        }
        "key" => {
            let raw = arg.ok_or(InputError::MissingArgument("key"))?;
            let chord: KeyChord = raw.parse()?;
            let shortcut = chord
                .shortcut()
                .ok_or_else(|| InputError::Unbound(raw.to_string()))?;
            Input::Command(Command::Key(shortcut))
        }
        "sw" => Input::Worker(parse_worker(arg)?),
        other => return Err(InputError::Unknown(other.to_string())),
    };
    Ok(input)
}

fn parse_worker(arg: Option<&str>) -> Result<WorkerCommand, InputError> {
    let arg = arg.ok_or(InputError::MissingArgument("sw"))?;
    let (name, rest) = match arg.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, Some(rest.trim().to_string()).filter(|r| !r.is_empty())),
        None => (arg, None),
    };
    Ok(match name {
        "install" => WorkerCommand::Install,
        "activate" => WorkerCommand::Activate,
        "skip" => WorkerCommand::SkipWaiting,
        "version" => WorkerCommand::Version,
        "update" => WorkerCommand::UpdateFound,
        "push" => WorkerCommand::Push(rest),
        "click" => WorkerCommand::Click(rest),
        "sync" => WorkerCommand::Sync(rest.unwrap_or_else(|| "background-sync".to_string())),
        other => return Err(InputError::Unknown(format!("sw {other}"))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_text() {
        assert_eq!(parse_line("Hi there").unwrap(), Input::Text("Hi there".into()));
        assert_eq!(parse_line("").unwrap(), Input::Text(String::new()));
        assert_eq!(parse_line("::note").unwrap(), Input::Text(":note".into()));
    }

    #[test]
    fn commands_parse_with_arguments() {
        assert_eq!(parse_line(":submit").unwrap(), Input::Command(Command::Submit));
        assert_eq!(parse_line(":load 3").unwrap(), Input::Command(Command::Load(2)));
        assert_eq!(
            parse_line(":set Hello  there").unwrap(),
            Input::Command(Command::SetText("Hello  there".into()))
        );
        assert_eq!(parse_line(":set").unwrap(), Input::Command(Command::SetText(String::new())));
        assert_eq!(
            parse_line(":file  ./mail.pdf ").unwrap(),
            Input::AttachFile(PathBuf::from("./mail.pdf"))
        );
        assert_eq!(
            parse_line(":key ctrl+shift+c").unwrap(),
            Input::Command(Command::Key(Shortcut::CopyReply))
        );
    }

    #[test]
    fn worker_commands_parse() {
        assert_eq!(parse_line(":sw skip").unwrap(), Input::Worker(WorkerCommand::SkipWaiting));
        assert_eq!(parse_line(":sw install").unwrap(), Input::Worker(WorkerCommand::Install));
        assert_eq!(parse_line(":sw activate").unwrap(), Input::Worker(WorkerCommand::Activate));
        assert_eq!(
            parse_line(":sw push 2 new emails").unwrap(),
            Input::Worker(WorkerCommand::Push(Some("2 new emails".into())))
        );
        assert_eq!(
            parse_line(":sw sync").unwrap(),
            Input::Worker(WorkerCommand::Sync("background-sync".into()))
        );
    }

    #[test]
    fn bad_commands_are_reported() {
        assert_eq!(parse_line(":load 0"), Err(InputError::BadIndex("0".into())));
        assert_eq!(parse_line(":file"), Err(InputError::MissingArgument("file")));
        assert_eq!(parse_line(":bogus"), Err(InputError::Unknown("bogus".into())));
        assert!(matches!(parse_line(":key ctrl+tab"), Err(InputError::Chord(_))));
        assert_eq!(parse_line(":key ctrl+x"), Err(InputError::Unbound("ctrl+x".into())));
    }
}
