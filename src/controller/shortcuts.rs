use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub ctrl: bool,
    pub shift: bool,
    pub key: Key,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Ctrl+Enter
    Submit,
    /// Ctrl+L
    Clear,
    /// Ctrl+Shift+C
    CopyReply,
}

impl KeyChord {
    pub fn shortcut(&self) -> Option<Shortcut> {
        if !self.ctrl {
            return None;
        }
        match (self.key, self.shift) {
            (Key::Enter, _) => Some(Shortcut::Submit),
            (Key::Char('l'), false) => Some(Shortcut::Clear),
            (Key::Char('c'), true) => Some(Shortcut::CopyReply),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognised key chord: {0}")]
pub struct ChordParseError(String);

impl FromStr for KeyChord {
    type Err = ChordParseError;

    /// Parses chords such as `ctrl+enter` or `Ctrl+Shift+C`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut ctrl = false;
        let mut shift = false;
        let mut key = None;
        for part in raw.split('+').map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" | "^" => ctrl = true,
                "shift" => shift = true,
                "enter" | "return" => key = Some(Key::Enter),
                other => {
                    let mut chars = other.chars();
                    match (chars.next(), chars.next()) {
                        (Some(ch), None) => key = Some(Key::Char(ch)),
                        _ => return Err(ChordParseError(raw.to_string())),
                    }
                }
            }
        }
        key.map(|key| KeyChord { ctrl, shift, key })
            .ok_or_else(|| ChordParseError(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shortcut(raw: &str) -> Option<Shortcut> {
        raw.parse::<KeyChord>().ok().and_then(|chord| chord.shortcut())
    }

    #[test]
    fn bindings_match_expected_chords() {
        assert_eq!(shortcut("ctrl+enter"), Some(Shortcut::Submit));
        assert_eq!(shortcut("Ctrl+L"), Some(Shortcut::Clear));
        assert_eq!(shortcut("ctrl+shift+c"), Some(Shortcut::CopyReply));
    }

    #[test]
    fn near_misses_are_not_bound() {
        assert_eq!(shortcut("ctrl+c"), None);
        assert_eq!(shortcut("shift+enter"), None);
        assert_eq!(shortcut("ctrl+shift+l"), None);
        assert!("ctrl+".parse::<KeyChord>().is_err());
        assert!("ctrl+tab".parse::<KeyChord>().is_err());
    }
}
