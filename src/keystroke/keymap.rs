//! Firmware special-key names and their replay-script equivalents

use std::collections::HashMap;
use std::sync::LazyLock;

/// Firmware special-key name (bracket-stripped, uppercase) to script key name
pub static SCRIPT_KEYMAP: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Arrows
    map.insert("ARROWUP", "UPARROW");
    map.insert("ARROWDOWN", "DOWNARROW");
    map.insert("ARROWLEFT", "LEFTARROW");
    map.insert("ARROWRIGHT", "RIGHTARROW");
    map.insert("UP", "UPARROW");
    map.insert("DOWN", "DOWNARROW");
    map.insert("LEFT", "LEFTARROW");
    map.insert("RIGHT", "RIGHTARROW");

    // Navigation cluster
    map.insert("HOME", "HOME");
    map.insert("END", "END");
    map.insert("PAGEUP", "PAGEUP");
    map.insert("PAGEDOWN", "PAGEDOWN");
    map.insert("DELETE", "DELETE");
    map.insert("DEL", "DELETE");
    map.insert("INSERT", "INSERT");
    map.insert("INS", "INSERT");

    // Function row
    map.insert("F1", "F1");
    map.insert("F2", "F2");
    map.insert("F3", "F3");
    map.insert("F4", "F4");
    map.insert("F5", "F5");
    map.insert("F6", "F6");
    map.insert("F7", "F7");
    map.insert("F8", "F8");
    map.insert("F9", "F9");
    map.insert("F10", "F10");
    map.insert("F11", "F11");
    map.insert("F12", "F12");

    // Editing
    map.insert("ENTER", "ENTER");
    map.insert("RETURN", "ENTER");
    map.insert("TAB", "TAB");
    map.insert("ESC", "ESCAPE");
    map.insert("ESCAPE", "ESCAPE");
    map.insert("SPACE", "SPACE");
    map.insert("BACKSPACE", "BACKSPACE");
    map.insert("BKSP", "BACKSPACE");

    // System keys
    map.insert("PAUSE", "PAUSE");
    map.insert("BREAK", "PAUSE");
    map.insert("PRINTSCREEN", "PRINTSCREEN");
    map.insert("PRTSC", "PRINTSCREEN");
    map.insert("SCROLLLOCK", "SCROLLLOCK");
    map.insert("CAPSLOCK", "CAPSLOCK");
    map.insert("NUMLOCK", "NUMLOCK");
    map.insert("MENU", "MENU");
    map.insert("APP", "MENU");

    // Bare modifiers
    map.insert("CTRL", "CTRL");
    map.insert("CONTROL", "CTRL");
    map.insert("SHIFT", "SHIFT");
    map.insert("ALT", "ALT");
    map.insert("GUI", "GUI");
    map.insert("WINDOWS", "GUI");
    map.insert("WIN", "GUI");

    // Numeric keypad
    map.insert("KP0", "KEYPAD_0");
    map.insert("KP1", "KEYPAD_1");
    map.insert("KP2", "KEYPAD_2");
    map.insert("KP3", "KEYPAD_3");
    map.insert("KP4", "KEYPAD_4");
    map.insert("KP5", "KEYPAD_5");
    map.insert("KP6", "KEYPAD_6");
    map.insert("KP7", "KEYPAD_7");
    map.insert("KP8", "KEYPAD_8");
    map.insert("KP9", "KEYPAD_9");
    map.insert("KPPLUS", "KEYPAD_PLUS");
    map.insert("KPMINUS", "KEYPAD_MINUS");
    map.insert("KPASTERISK", "KEYPAD_ASTERISK");
    map.insert("KPSLASH", "KEYPAD_SLASH");
    map.insert("KPDOT", "KEYPAD_PERIOD");
    map.insert("KPENTER", "KEYPAD_ENTER");

    map
});

/// Script name for a special key. Unknown names fall back to themselves.
pub fn script_name_for_special(name: &str) -> String {
    let upper = name.to_ascii_uppercase();
    SCRIPT_KEYMAP
        .get(upper.as_str())
        .map(|s| s.to_string())
        .unwrap_or(upper)
}

/// Script command for a literal control character, if it has one
pub fn script_name_for_char(c: char) -> Option<&'static str> {
    match c {
        '\r' | '\n' => Some("ENTER"),
        '\t' => Some("TAB"),
        _ => None,
    }
}
