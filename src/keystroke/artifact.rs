//! CTRL artifact correction
//!
//! Some companion devices prefix every injected keystroke with a spurious
//! CTRL modifier, so "pow" arrives as `CTRL+pCTRL+oCTRL+w`. When enabled, the
//! filter strips those prefixes before the line is classified and tokenized,
//! while leaving lines that look like genuine shortcuts alone.
//!
//! Applying the filter twice is not the same as applying it once: stripping
//! can splice a new `CTRL+` together (`CTRLCTRL++a` becomes `CTRL+a`), which a
//! second pass may then treat differently. Callers apply it exactly once per line.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

const CTRL_TOKEN: &str = "CTRL+";

/// The whole line is one or more `CTRL+<letter>` groups separated by whitespace
static SHORTCUT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*CTRL\+[A-Za-z](?:\s+CTRL\+[A-Za-z])*\s*$").unwrap());
static LEADING_SHORTCUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^CTRL\+[A-Za-z](?:\s|$)").unwrap());
static STANDALONE_CTRL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bCTRL\b(\+)?").unwrap());
static SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());
static TRAILING_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +\n").unwrap());
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Togglable per-line CTRL artifact filter
#[derive(Debug, Clone, Default)]
pub struct ArtifactFilter {
    enabled: bool,
}

impl ArtifactFilter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Flip the toggle, returning the new state
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    /// Correct one line. Identity when the filter is disabled.
    pub fn filter<'a>(&self, line: &'a str) -> Cow<'a, str> {
        if !self.enabled {
            return Cow::Borrowed(line);
        }

        let positions: Vec<usize> = line.match_indices(CTRL_TOKEN).map(|(i, _)| i).collect();
        let strip = match positions.len() {
            0 => false,
            1 | 2 => {
                if SHORTCUT_LINE.is_match(line) {
                    false
                } else if positions.len() == 2 {
                    let between = &line[positions[0] + CTRL_TOKEN.len()..positions[1]];
                    !between.chars().any(char::is_whitespace)
                } else {
                    false
                }
            }
            _ => true,
        };

        if !strip {
            return Cow::Borrowed(line);
        }

        let corrected = strip_artifacts(line);
        if corrected.is_empty() {
            return Cow::Borrowed(line);
        }
        log::debug!("ctrl artifact: {:?} -> {:?}", line, corrected);
        Cow::Owned(corrected)
    }
}

fn strip_artifacts(line: &str) -> String {
    let (kept, rest) = match LEADING_SHORTCUT.find(line) {
        // Keep "CTRL+x" itself; the separator goes through cleanup with the rest
        Some(_) => line.split_at(CTRL_TOKEN.len() + 1),
        None => ("", line),
    };

    let stripped = rest.replace(CTRL_TOKEN, "");
    let stripped = STANDALONE_CTRL.replace_all(&stripped, |caps: &Captures| {
        if caps.get(1).is_some() {
            caps[0].to_string()
        } else {
            String::new()
        }
    });

    let joined = format!("{}{}", kept, stripped);
    let cleaned = SPACE_RUN.replace_all(&joined, " ");
    let cleaned = TRAILING_SPACE.replace_all(&cleaned, "\n");
    let cleaned = BLANK_LINES.replace_all(&cleaned, "\n").into_owned();

    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        cleaned
    } else {
        trimmed.to_string()
    }
}
