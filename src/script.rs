//! Replay script encoding
//!
//! Captured keystrokes are re-encoded as a line-oriented replay script that
//! compatible injection hardware can play back:
//!
//! ```text
//! REM <comment>
//! STRING <literal text>
//! DELAY <milliseconds>
//! GUI r
//! ENTER
//! ```

use crate::config::ScriptConfig;
use crate::error::ExportError;
use crate::keystroke::{script_name_for_char, script_name_for_special, Key, KeystrokeEvent};
use chrono::{DateTime, Local};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

const NO_DATA: &str = "REM No keystroke data captured";

/// Encodes keystroke events into replay script text
#[derive(Debug, Clone)]
pub struct ScriptEncoder {
    delay_gap: Duration,
    min_delay_ms: u64,
}

impl ScriptEncoder {
    pub fn new(config: &ScriptConfig) -> Self {
        Self {
            delay_gap: config.delay_gap(),
            min_delay_ms: config.min_delay_ms,
        }
    }

    /// Encode events with a header stamped with the current local time
    pub fn encode<'a, I>(&self, events: I) -> String
    where
        I: IntoIterator<Item = &'a KeystrokeEvent>,
    {
        self.encode_at(events, Local::now())
    }

    /// Encode events with an explicit header timestamp
    pub fn encode_at<'a, I>(&self, events: I, generated: DateTime<Local>) -> String
    where
        I: IntoIterator<Item = &'a KeystrokeEvent>,
    {
        let events: Vec<&KeystrokeEvent> = events.into_iter().collect();
        if events.is_empty() {
            return format!("{}\n", NO_DATA);
        }

        let mut lines = vec![
            "REM Keystroke replay script".to_string(),
            "REM Captured from HID watchdog telemetry".to_string(),
            format!("REM Generated: {}", generated.format("%Y-%m-%d %H:%M:%S")),
            format!("REM Events: {}", events.len()),
        ];
        lines.extend(self.encode_body(&events));

        let mut script = lines.join("\n");
        script.push('\n');
        script
    }

    fn encode_body(&self, events: &[&KeystrokeEvent]) -> Vec<String> {
        let mut body = BodyWriter::default();
        let mut previous: Option<Instant> = None;

        for event in events {
            if let Some(prev) = previous {
                let gap = event.timestamp.saturating_duration_since(prev);
                if gap > self.delay_gap {
                    body.flush();
                    let gap_ms = (gap.as_secs_f64() * 1000.0).round() as u64;
                    if gap_ms >= self.min_delay_ms {
                        body.command(format!("DELAY {}", gap_ms));
                    }
                }
            }
            previous = Some(event.timestamp);

            if !event.modifiers.is_empty() {
                let modifiers = event.modifiers.script_names().join(" ");
                body.command(format!("{} {}", modifiers, key_name(&event.key)));
                continue;
            }

            match &event.key {
                Key::Special(name) => body.command(script_name_for_special(name)),
                Key::Char(c) => match script_name_for_char(*c) {
                    Some(command) => body.command(command.to_string()),
                    None => body.pending.push(*c),
                },
            }
        }

        body.flush();
        merge_delays(body.lines)
    }
}

impl Default for ScriptEncoder {
    fn default() -> Self {
        Self::new(&ScriptConfig::default())
    }
}

/// Body lines plus characters waiting to become a STRING line
#[derive(Default)]
struct BodyWriter {
    lines: Vec<String>,
    pending: String,
}

impl BodyWriter {
    fn flush(&mut self) {
        if !self.pending.is_empty() {
            self.lines.push(format!("STRING {}", self.pending));
            self.pending.clear();
        }
    }

    /// Emit a command line, flushing any pending text first
    fn command(&mut self, line: String) {
        self.flush();
        self.lines.push(line);
    }
}

/// Key name following a modifier list: mapped special name, or the lowercased character
fn key_name(key: &Key) -> String {
    match key {
        Key::Special(name) => script_name_for_special(name),
        Key::Char(c) => match script_name_for_char(*c) {
            Some(command) => command.to_string(),
            None => c.to_lowercase().collect(),
        },
    }
}

fn delay_ms(line: &str) -> Option<u64> {
    line.strip_prefix("DELAY ")?.trim().parse().ok()
}

/// Sum runs of adjacent DELAY lines and drop empty lines
fn merge_delays(lines: Vec<String>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(ms) = delay_ms(&line) {
            if let Some(prev_ms) = merged.last().and_then(|prev| delay_ms(prev)) {
                if let Some(prev) = merged.last_mut() {
                    *prev = format!("DELAY {}", prev_ms + ms);
                }
                continue;
            }
        }
        merged.push(line);
    }
    merged
}

/// Encode events with default timing settings
pub fn export_script<'a, I>(events: I) -> String
where
    I: IntoIterator<Item = &'a KeystrokeEvent>,
{
    ScriptEncoder::default().encode(events)
}

/// Write a script as UTF-8 text
pub fn write_script(path: &Path, script: &str) -> Result<(), ExportError> {
    fs::write(path, script)?;
    log::info!("replay script written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystroke::Modifiers;

    fn event(base: Instant, ms: u64, modifiers: Modifiers, key: Key) -> KeystrokeEvent {
        KeystrokeEvent::new(modifiers, key, base + Duration::from_millis(ms))
    }

    fn body(script: &str) -> Vec<&str> {
        script.lines().filter(|l| !l.starts_with("REM")).collect()
    }

    #[test]
    fn empty_capture_is_single_comment() {
        let events: Vec<KeystrokeEvent> = Vec::new();
        assert_eq!(export_script(&events), "REM No keystroke data captured\n");
    }

    #[test]
    fn run_dialog_sequence() {
        let base = Instant::now();
        let events = vec![
            event(base, 0, Modifiers::GUI, Key::Char('r')),
            event(base, 50, Modifiers::NONE, Key::Char('p')),
            event(base, 60, Modifiers::NONE, Key::Char('o')),
            event(base, 200, Modifiers::NONE, Key::Special("ENTER".into())),
        ];
        let script = export_script(&events);
        assert_eq!(body(&script), vec!["GUI r", "STRING po", "DELAY 140", "ENTER"]);
    }

    #[test]
    fn header_describes_capture() {
        let base = Instant::now();
        let events = vec![event(base, 0, Modifiers::NONE, Key::Char('a'))];
        let script = export_script(&events);
        let header: Vec<_> = script.lines().filter(|l| l.starts_with("REM")).collect();
        assert_eq!(header.len(), 4);
        assert!(header[2].starts_with("REM Generated: "));
        assert_eq!(header[3], "REM Events: 1");
        assert!(script.ends_with("STRING a\n"));
    }

    #[test]
    fn modifier_combos_use_fixed_order() {
        let base = Instant::now();
        let events = vec![
            event(
                base,
                0,
                Modifiers::CTRL.union(Modifiers::ALT),
                Key::Special("DEL".into()),
            ),
            event(
                base,
                10,
                Modifiers::ALT.union(Modifiers::GUI).union(Modifiers::CTRL),
                Key::Char('T'),
            ),
        ];
        let script = export_script(&events);
        assert_eq!(body(&script), vec!["CTRL ALT DELETE", "GUI CTRL ALT t"]);
    }

    #[test]
    fn special_keys_flush_pending_text() {
        let base = Instant::now();
        let events = vec![
            event(base, 0, Modifiers::NONE, Key::Char('l')),
            event(base, 10, Modifiers::NONE, Key::Char('s')),
            event(base, 20, Modifiers::NONE, Key::Special("ARROWUP".into())),
            event(base, 30, Modifiers::NONE, Key::Char('X')),
            event(base, 40, Modifiers::NONE, Key::Special("MEDIA_PLAY".into())),
        ];
        let script = export_script(&events);
        assert_eq!(
            body(&script),
            vec!["STRING ls", "UPARROW", "STRING X", "MEDIA_PLAY"]
        );
    }

    #[test]
    fn gaps_below_threshold_produce_no_delay() {
        let base = Instant::now();
        let events = vec![
            event(base, 0, Modifiers::NONE, Key::Char('a')),
            event(base, 100, Modifiers::NONE, Key::Char('b')),
            event(base, 199, Modifiers::NONE, Key::Char('c')),
        ];
        let script = export_script(&events);
        assert_eq!(body(&script), vec!["STRING abc"]);
    }

    #[test]
    fn long_gap_splits_string() {
        let base = Instant::now();
        let events = vec![
            event(base, 0, Modifiers::NONE, Key::Char('a')),
            event(base, 1500, Modifiers::NONE, Key::Char('b')),
        ];
        let script = export_script(&events);
        assert_eq!(body(&script), vec!["STRING a", "DELAY 1500", "STRING b"]);
    }

    #[test]
    fn min_delay_suppresses_short_delays() {
        let encoder = ScriptEncoder::new(&ScriptConfig {
            delay_gap_ms: 10,
            min_delay_ms: 50,
        });
        let base = Instant::now();
        let events = vec![
            event(base, 0, Modifiers::NONE, Key::Char('a')),
            event(base, 30, Modifiers::NONE, Key::Char('b')),
        ];
        let script = encoder.encode(&events);
        assert_eq!(body(&script), vec!["STRING a", "STRING b"]);
    }

    #[test]
    fn adjacent_delays_are_merged() {
        let lines = vec![
            "STRING a".to_string(),
            "DELAY 100".to_string(),
            String::new(),
            "DELAY 250".to_string(),
            "DELAY 50".to_string(),
            "ENTER".to_string(),
            "DELAY 10".to_string(),
        ];
        assert_eq!(
            merge_delays(lines),
            vec!["STRING a", "DELAY 400", "ENTER", "DELAY 10"]
        );
    }

    #[test]
    fn output_never_has_adjacent_delays() {
        let base = Instant::now();
        let events: Vec<_> = (0..10)
            .map(|i| {
                let key = if i % 3 == 0 {
                    Key::Special("TAB".into())
                } else {
                    Key::Char('z')
                };
                event(base, i * 400, Modifiers::NONE, key)
            })
            .collect();
        let script = export_script(&events);
        let lines: Vec<_> = script.lines().collect();
        for pair in lines.windows(2) {
            assert!(!(pair[0].starts_with("DELAY") && pair[1].starts_with("DELAY")));
        }
        assert!(lines.iter().all(|l| !l.is_empty()));
    }

    #[test]
    fn write_script_creates_file() {
        let path = std::env::temp_dir().join(format!(
            "hid-telemetry-script-{}.txt",
            std::process::id()
        ));
        write_script(&path, "STRING hi\n").expect("write script");
        assert_eq!(fs::read_to_string(&path).expect("read back"), "STRING hi\n");
        let _ = fs::remove_file(&path);
    }
}
