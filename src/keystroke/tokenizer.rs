//! Keystroke line tokenizer
//!
//! Firmware output concatenates keystrokes with no separator, for example
//! `GUI+rpowershell<ENTER>` is GUI+r, the letters of "powershell", then Enter.

use super::{is_printable, Modifiers};
use regex::Regex;
use std::sync::LazyLock;

/// One or more modifier prefixes followed by a special key or one non-space character
static MODIFIED_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^((?:CTRL\+|GUI\+|ALT\+)+)(<[A-Z0-9_]+>|[^\s<])").unwrap()
});

static SPECIAL_KEY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^<[A-Z0-9_]+>").unwrap());

/// A `(modifiers, key)` pair as it appears on the wire.
///
/// `key` is either a single character or a bracketed special key such as `<ENTER>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub modifiers: Modifiers,
    pub key: String,
}

impl Token {
    pub fn new(modifiers: Modifiers, key: impl Into<String>) -> Self {
        Self {
            modifiers,
            key: key.into(),
        }
    }

    pub fn plain(key: impl Into<String>) -> Self {
        Self::new(Modifiers::NONE, key)
    }
}

/// Split a keystroke line into ordered tokens.
///
/// Never fails: characters that are not part of a recognized token and are
/// not printable (or are a stray `<`, `>` or `+`) are dropped.
pub fn parse_line(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];

        if let Some(caps) = MODIFIED_KEY.captures(rest) {
            let modifiers = Modifiers::from_prefix(&caps[1]);
            tokens.push(Token::new(modifiers, &caps[2]));
            pos += caps[0].len();
            continue;
        }

        if let Some(m) = SPECIAL_KEY.find(rest) {
            tokens.push(Token::plain(m.as_str()));
            pos += m.end();
            continue;
        }

        let Some(c) = rest.chars().next() else {
            break;
        };
        match c {
            '\r' | '\n' => tokens.push(Token::plain("<ENTER>")),
            '<' | '>' | '+' => {}
            c if is_printable(c) => tokens.push(Token::plain(c)),
            _ => {}
        }
        pos += c.len_utf8();
    }

    tokens
}
