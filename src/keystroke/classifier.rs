//! Keystroke line classification
//!
//! The watchdog interleaves injected keystrokes with its own status output
//! (attach/detach notices, descriptor dumps, mass-storage traffic, UI markers).
//! Only the former should reach the tokenizer.

use super::is_printable;
use crate::rules::RuleSet;
use regex::Regex;
use std::sync::LazyLock;

/// Longest line still considered keystroke data
const MAX_LINE_CHARS: usize = 150;
/// Plain text lines must be shorter than this to count as typed characters
const MAX_PLAIN_TEXT_CHARS: usize = 80;
/// Minimum share of printable characters for plain text
const MIN_PRINTABLE_RATIO: f64 = 0.8;

/// Firmware status output that never carries keystrokes, as
/// `(pattern, category)`. Matched case-insensitively anywhere in the line.
pub const IGNORE_PATTERNS: &[(&str, &str)] = &[
    // Device lifecycle
    (r"Device\s+(attached|removed)", "device lifecycle"),
    (r"address\s*=", "device lifecycle"),
    (r"instance\s*=", "device lifecycle"),
    (r"unmounted", "device lifecycle"),
    (r"mounted", "device lifecycle"),
    // HID status
    (r"HID\s+device", "hid status"),
    (r"HID\s+Interface", "hid status"),
    (r"HID\s+received", "hid status"),
    (r"HID\s+Sending", "hid status"),
    (r"cannot\s+request", "hid status"),
    (r"Protocol\s*=", "hid status"),
    // USB descriptors
    (r"VID\s*=", "descriptor"),
    (r"PID\s*=", "descriptor"),
    (r"ID\s+[0-9a-f]{4}:[0-9a-f]{4}", "descriptor"),
    (r"Device\s+Descriptor", "descriptor"),
    (r"bLength", "descriptor"),
    (r"bDescriptor", "descriptor"),
    (r"bcdUSB", "descriptor"),
    (r"bcdDevice", "descriptor"),
    (r"bDeviceClass", "descriptor"),
    (r"bDeviceSubClass", "descriptor"),
    (r"bDeviceProtocol", "descriptor"),
    (r"bMaxPacketSize", "descriptor"),
    (r"bNumConfig", "descriptor"),
    (r"idVendor", "descriptor"),
    (r"idProduct", "descriptor"),
    (r"iManufacturer", "descriptor"),
    (r"iSerialNumber", "descriptor"),
    // Mass storage and CDC
    (r"Mass\s+Device", "storage"),
    (r"CDC\s+Device", "storage"),
    (r"Read\s+LBA", "storage"),
    (r"Write\s+LBA", "storage"),
    // Alert brackets
    (r"\[\+\]", "alert bracket"),
    (r"\[!\]", "alert bracket"),
    (r"\[!!\]", "alert bracket"),
    (r"\[!!!\]", "alert bracket"),
    (r"\[\?\]", "alert bracket"),
    // Separator rules
    (r"^===+", "separator"),
    (r"^---+", "separator"),
    // UI and status markers
    (r"BTN_", "ui marker"),
    (r"OLED", "ui marker"),
    (r"Selftest", "ui marker"),
    (r"Cerberus\s+(Ready|-)", "ui marker"),
    (r"^Error:", "ui marker"),
    (r"SUSPICIOUS", "ui marker"),
    (r"AUTOMATED\s+TYPING", "ui marker"),
    (r"keys/sec", "ui marker"),
    // Mouse reports
    (r"\(-?\d+\s+-?\d+\s+-?\d+\)", "mouse"),
    (r"MOUSE:", "mouse"),
    // Descriptor page markers
    (r"\[Desc\s+\d+/\d+\]", "page marker"),
];

pub static IGNORE_RULES: LazyLock<RuleSet<&'static str>> =
    LazyLock::new(|| RuleSet::case_insensitive(IGNORE_PATTERNS.iter().copied()));

static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\s*:\s*\d+").unwrap());
static HEX_LITERAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"0x[0-9a-fA-F]+").unwrap());
static MODIFIER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(CTRL|GUI|ALT)\+.").unwrap());
static SPECIAL_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<[A-Z0-9_]+>").unwrap());

/// Descriptor dumps are indented by two or more spaces; keystroke lines never are.
pub fn is_indented(line: &str) -> bool {
    line.starts_with("  ")
}

/// Decide whether a line is keystroke telemetry.
///
/// Rejection rules run first, in order; the line is accepted only if it then
/// carries a modifier prefix, a bracketed special key, or is short printable text.
pub fn is_keystroke_line(line: &str) -> bool {
    if is_indented(line) {
        return false;
    }

    let text = line.trim();
    if text.is_empty() {
        return false;
    }

    if let Some(rule) = IGNORE_RULES.first_match(text) {
        log::trace!("ignored ({}): {}", rule.payload, text);
        return false;
    }

    let char_count = text.chars().count();
    if char_count > MAX_LINE_CHARS {
        return false;
    }

    // Status lines use a bare '='
    if text.contains('=') && !text.contains('<') && !text.contains('+') {
        return false;
    }

    if TIMESTAMP.is_match(text) || HEX_LITERAL.is_match(text) {
        return false;
    }

    if MODIFIER_PREFIX.is_match(text) || SPECIAL_KEY.is_match(text) {
        return true;
    }

    is_plain_text(text, char_count)
}

fn is_plain_text(text: &str, char_count: usize) -> bool {
    if char_count >= MAX_PLAIN_TEXT_CHARS {
        return false;
    }
    let printable = text.chars().filter(|c| is_printable(*c)).count();
    if (printable as f64) < char_count as f64 * MIN_PRINTABLE_RATIO {
        return false;
    }
    text.chars()
        .all(|c| is_printable(c) || matches!(c, '<' | '>' | '+' | '\r' | '\n'))
}
