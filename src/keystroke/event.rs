//! Keystroke event types

use super::is_printable;
use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// Modifier keys held for a keystroke
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub gui: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        gui: false,
        alt: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        gui: false,
        alt: false,
    };

    pub const GUI: Modifiers = Modifiers {
        ctrl: false,
        gui: true,
        alt: false,
    };

    pub const ALT: Modifiers = Modifiers {
        ctrl: false,
        gui: false,
        alt: true,
    };

    /// Collect the distinct modifiers named in a prefix such as `"gui+CTRL+GUI+"`.
    /// Order and repetition in the source text do not matter.
    pub fn from_prefix(prefix: &str) -> Self {
        let upper = prefix.to_ascii_uppercase();
        Self {
            ctrl: upper.contains("CTRL+"),
            gui: upper.contains("GUI+"),
            alt: upper.contains("ALT+"),
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.ctrl || self.gui || self.alt)
    }

    /// Modifier names sorted alphabetically (ALT, CTRL, GUI)
    pub fn sorted_names(&self) -> Vec<&'static str> {
        let mut names = Vec::with_capacity(3);
        if self.alt {
            names.push("ALT");
        }
        if self.ctrl {
            names.push("CTRL");
        }
        if self.gui {
            names.push("GUI");
        }
        names
    }

    /// Modifier names in replay-script order (GUI, CTRL, ALT)
    pub fn script_names(&self) -> Vec<&'static str> {
        let mut names = Vec::with_capacity(3);
        if self.gui {
            names.push("GUI");
        }
        if self.ctrl {
            names.push("CTRL");
        }
        if self.alt {
            names.push("ALT");
        }
        names
    }

    pub fn union(self, other: Modifiers) -> Modifiers {
        Modifiers {
            ctrl: self.ctrl || other.ctrl,
            gui: self.gui || other.gui,
            alt: self.alt || other.alt,
        }
    }
}

impl fmt::Display for Modifiers {
    /// Canonical firmware order: `CTRL+GUI+ALT`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(3);
        if self.ctrl {
            parts.push("CTRL");
        }
        if self.gui {
            parts.push("GUI");
        }
        if self.alt {
            parts.push("ALT");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// The key part of a keystroke
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    /// A single printable character
    Char(char),
    /// A special key name without brackets, uppercase (`ENTER`, `F1`, `ARROWUP`)
    Special(String),
}

impl Key {
    /// Interpret a raw tokenizer key.
    ///
    /// Accepts `<NAME>` tokens and single characters. `\r` and `\n` become
    /// `ENTER`, `\t` becomes `TAB`; any other non-printable character, an empty
    /// string or an empty bracket pair yields `None`.
    pub fn parse(raw: &str) -> Option<Key> {
        let mut chars = raw.chars();
        let first = chars.next()?;

        if chars.next().is_none() {
            return match first {
                '\r' | '\n' => Some(Key::Special("ENTER".to_string())),
                '\t' => Some(Key::Special("TAB".to_string())),
                c if is_printable(c) => Some(Key::Char(c)),
                _ => None,
            };
        }

        let inner = raw.strip_prefix('<')?.strip_suffix('>')?;
        if inner.is_empty() {
            return None;
        }
        Some(Key::Special(inner.to_ascii_uppercase()))
    }

    pub fn is_special(&self) -> bool {
        matches!(self, Key::Special(_))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c),
            Key::Special(name) => write!(f, "<{}>", name),
        }
    }
}

/// One recognized keypress with its capture time
#[derive(Debug, Clone, PartialEq)]
pub struct KeystrokeEvent {
    pub modifiers: Modifiers,
    pub key: Key,
    pub timestamp: Instant,
}

impl KeystrokeEvent {
    pub fn new(modifiers: Modifiers, key: Key, timestamp: Instant) -> Self {
        Self {
            modifiers,
            key,
            timestamp,
        }
    }

    pub fn is_special(&self) -> bool {
        self.key.is_special()
    }

    /// Text appended to the signature buffer for this event:
    /// `[ALT+CTRL+key]` with modifiers, `[NAME]` for a bare special key,
    /// the literal character otherwise.
    pub fn signature_text(&self) -> String {
        if !self.modifiers.is_empty() {
            format!("[{}+{}]", self.modifiers.sorted_names().join("+"), self.key)
        } else {
            match &self.key {
                Key::Special(name) => format!("[{}]", name),
                Key::Char(c) => c.to_string(),
            }
        }
    }
}
