//! Keystroke line handling: artifact correction, classification and tokenizing

pub mod artifact;
mod classifier;
mod event;
pub mod keymap;
mod tokenizer;

pub use artifact::ArtifactFilter;
pub use classifier::{is_indented, is_keystroke_line, IGNORE_PATTERNS, IGNORE_RULES};
pub use event::{Key, KeystrokeEvent, Modifiers};
pub use keymap::{script_name_for_char, script_name_for_special, SCRIPT_KEYMAP};
pub use tokenizer::{parse_line, Token};

use unicode_general_category::{get_general_category, GeneralCategory};

/// Printable in the sense the firmware stream uses it: visible glyphs plus the
/// plain space.
///
/// Other (`C*`) and separator (`Z*`) categories are not printable, so
/// invisible format characters such as U+200B or a byte-order mark never
/// become keystrokes. A `char` is never a surrogate.
pub fn is_printable(c: char) -> bool {
    match get_general_category(c) {
        GeneralCategory::Control
        | GeneralCategory::Format
        | GeneralCategory::PrivateUse
        | GeneralCategory::Unassigned
        | GeneralCategory::LineSeparator
        | GeneralCategory::ParagraphSeparator => false,
        GeneralCategory::SpaceSeparator => c == ' ',
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_accepts_glyphs_and_space() {
        for c in ['a', 'Z', '0', '<', '+', ' ', 'é', '↵'] {
            assert!(is_printable(c), "{:?} should be printable", c);
        }
    }

    #[test]
    fn printable_rejects_controls_and_other_whitespace() {
        for c in ['\r', '\n', '\t', '\x00', '\x1b', '\u{7f}', '\u{a0}'] {
            assert!(!is_printable(c), "{:?} should not be printable", c);
        }
    }

    #[test]
    fn printable_rejects_invisible_and_unassigned() {
        let invisible = [
            '\u{200b}', // zero-width space
            '\u{200d}', // zero-width joiner
            '\u{feff}', // byte-order mark
            '\u{ad}',   // soft hyphen
            '\u{2028}', // line separator
            '\u{2029}', // paragraph separator
            '\u{3000}', // ideographic space
            '\u{e000}', // private use
            '\u{378}',  // unassigned
        ];
        for c in invisible {
            assert!(!is_printable(c), "{:?} should not be printable", c);
        }
    }
}
