//! Session-scoped analyzer state

use super::signatures::{Alert, SignatureMatcher};
use super::velocity::{TypingTier, VelocityEstimator};
use crate::config::{AnalyzerConfig, VelocityConfig};
use crate::keystroke::{is_keystroke_line, parse_line, Key, KeystrokeEvent, Token};
use std::collections::VecDeque;
use std::time::Instant;

/// Accumulates keystrokes for one capture session, from creation or reset
/// until the next reset.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalyzerConfig,
    /// Captured events, oldest first
    events: VecDeque<KeystrokeEvent>,
    /// Recent timestamps for velocity
    velocity: VelocityEstimator,
    /// Normalized text for signature matching, capped in characters
    signature_buffer: String,
    signature_buffer_chars: usize,
    signatures: SignatureMatcher,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            velocity: VelocityEstimator::new(config.timing_window),
            events: VecDeque::new(),
            signature_buffer: String::new(),
            signature_buffer_chars: 0,
            signatures: SignatureMatcher::new(),
            config,
        }
    }

    /// Ingest one line captured now. Returns the number of events added.
    pub fn add_line(&mut self, line: &str) -> usize {
        self.add_line_at(line, Instant::now())
    }

    /// Ingest one line with an explicit capture time.
    ///
    /// Lines that are not keystroke telemetry are ignored.
    pub fn add_line_at(&mut self, line: &str, timestamp: Instant) -> usize {
        if !is_keystroke_line(line) {
            log::debug!("not keystroke data: {:?}", line);
            return 0;
        }

        let mut added = 0;
        for token in parse_line(line.trim()) {
            if !token.key.trim().is_empty() && self.add_token_at(&token, timestamp) {
                added += 1;
            }
        }
        added
    }

    /// Record a single token. Returns false if its key is not a valid keystroke.
    pub fn add_token_at(&mut self, token: &Token, timestamp: Instant) -> bool {
        let Some(key) = Key::parse(token.key.trim()) else {
            return false;
        };
        self.add_event(KeystrokeEvent::new(token.modifiers, key, timestamp));
        true
    }

    fn add_event(&mut self, event: KeystrokeEvent) {
        self.velocity.record(event.timestamp);
        self.push_signature_text(&event.signature_text());

        self.events.push_back(event);
        if self.config.max_events > 0 {
            while self.events.len() > self.config.max_events {
                self.events.pop_front();
            }
        }
    }

    fn push_signature_text(&mut self, text: &str) {
        self.signature_buffer.push_str(text);
        self.signature_buffer_chars += text.chars().count();

        let cap = self.config.signature_buffer_chars;
        if self.signature_buffer_chars > cap {
            let excess = self.signature_buffer_chars - cap;
            let cut = self
                .signature_buffer
                .char_indices()
                .nth(excess)
                .map(|(i, _)| i)
                .unwrap_or(self.signature_buffer.len());
            self.signature_buffer.drain(..cut);
            self.signature_buffer_chars = cap;
        }
    }

    /// New signature hits in the current buffer, each reported once per session
    pub fn check_patterns(&mut self) -> Vec<Alert> {
        self.signatures.check(&self.signature_buffer)
    }

    /// Events per second over the timing window
    pub fn typing_speed(&self) -> f64 {
        self.velocity.typing_speed()
    }

    pub fn is_automated(&self, threshold: f64) -> bool {
        self.velocity.is_automated(threshold)
    }

    pub fn typing_tier(&self, thresholds: &VelocityConfig) -> TypingTier {
        self.velocity.tier(thresholds)
    }

    /// Captured events, oldest first
    pub fn events(&self) -> impl Iterator<Item = &KeystrokeEvent> {
        self.events.iter()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn fired_alerts(&self) -> &[Alert] {
        self.signatures.fired()
    }

    pub fn fired_count(&self) -> usize {
        self.signatures.fired_count()
    }

    pub fn signature_buffer(&self) -> &str {
        &self.signature_buffer
    }

    /// Tail of the signature buffer for display, with line breaks shown as `↵`
    /// and tabs as `→`.
    pub fn display_buffer(&self, max_chars: usize) -> String {
        let skip = self.signature_buffer_chars.saturating_sub(max_chars);
        self.signature_buffer
            .chars()
            .skip(skip)
            .map(|c| match c {
                '\r' | '\n' => '↵',
                '\t' => '→',
                other => other,
            })
            .collect()
    }

    /// Return to the freshly constructed state
    pub fn reset(&mut self) {
        self.events.clear();
        self.velocity.reset();
        self.signature_buffer.clear();
        self.signature_buffer_chars = 0;
        self.signatures.reset();
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystroke::Modifiers;
    use std::time::Duration;

    #[test]
    fn status_lines_add_nothing() {
        let mut analyzer = Analyzer::default();
        assert_eq!(analyzer.add_line("Device attached, address = 3"), 0);
        assert_eq!(analyzer.add_line("  bLength 18"), 0);
        assert_eq!(analyzer.event_count(), 0);
        assert_eq!(analyzer.signature_buffer(), "");
    }

    #[test]
    fn keystroke_line_is_recorded() {
        let mut analyzer = Analyzer::default();
        assert_eq!(analyzer.add_line("GUI+rcmd<ENTER>"), 5);
        assert_eq!(analyzer.signature_buffer(), "[GUI+r]cmd[ENTER]");

        let events: Vec<_> = analyzer.events().collect();
        assert_eq!(events[0].modifiers, Modifiers::GUI);
        assert_eq!(events[0].key, Key::Char('r'));
        assert_eq!(events[4].key, Key::Special("ENTER".into()));
        assert!(events[4].is_special());
    }

    #[test]
    fn spaces_are_not_events() {
        let mut analyzer = Analyzer::default();
        assert_eq!(analyzer.add_line("net user"), 7);
        assert_eq!(analyzer.signature_buffer(), "netuser");
    }

    #[test]
    fn modifiers_are_sorted_in_buffer() {
        let mut analyzer = Analyzer::default();
        analyzer.add_line("GUI+CTRL+ALT+<DELETE>");
        assert_eq!(analyzer.signature_buffer(), "[ALT+CTRL+GUI+<DELETE>]");
    }

    #[test]
    fn signature_buffer_keeps_last_chars() {
        let mut analyzer = Analyzer::new(AnalyzerConfig {
            signature_buffer_chars: 10,
            ..AnalyzerConfig::default()
        });
        analyzer.add_line("abcdefgh");
        analyzer.add_line("ijkl");
        assert_eq!(analyzer.signature_buffer(), "cdefghijkl");

        analyzer.add_line("<F1>");
        assert_eq!(analyzer.signature_buffer(), "ghijkl[F1]");
        assert_eq!(analyzer.signature_buffer().chars().count(), 10);
    }

    #[test]
    fn default_buffer_is_capped_at_1000() {
        let mut analyzer = Analyzer::default();
        for _ in 0..30 {
            analyzer.add_line(&"q".repeat(60));
        }
        assert_eq!(analyzer.signature_buffer().len(), 1000);
        assert_eq!(analyzer.event_count(), 1800);
    }

    #[test]
    fn events_are_bounded_by_config() {
        let mut analyzer = Analyzer::new(AnalyzerConfig {
            max_events: 5,
            ..AnalyzerConfig::default()
        });
        analyzer.add_line("abcdefgh");
        let keys: Vec<_> = analyzer.events().map(|e| e.key.to_string()).collect();
        assert_eq!(keys, vec!["d", "e", "f", "g", "h"]);
    }

    #[test]
    fn invalid_token_key_is_rejected() {
        let mut analyzer = Analyzer::default();
        let now = Instant::now();
        assert!(!analyzer.add_token_at(&Token::plain("\x07"), now));
        assert!(!analyzer.add_token_at(&Token::plain("\t"), now));
        assert!(analyzer.add_token_at(&Token::plain("<tab>"), now));
        assert_eq!(analyzer.signature_buffer(), "[TAB]");
        assert_eq!(analyzer.event_count(), 1);
    }

    #[test]
    fn velocity_follows_line_timestamps() {
        let mut analyzer = Analyzer::default();
        let base = Instant::now();
        analyzer.add_line_at("a", base);
        analyzer.add_line_at("b", base + Duration::from_secs(1));
        analyzer.add_line_at("c", base + Duration::from_secs(2));
        assert!((analyzer.typing_speed() - 1.5).abs() < 1e-9);
        assert!(!analyzer.is_automated(40.0));
    }

    #[test]
    fn check_patterns_deduplicates() {
        let mut analyzer = Analyzer::default();
        analyzer.add_line("powershell");
        assert_eq!(analyzer.check_patterns().len(), 1);
        analyzer.add_line("powershell");
        assert!(analyzer.check_patterns().is_empty());
        assert_eq!(analyzer.fired_count(), 1);
    }

    #[test]
    fn display_buffer_renders_tail() {
        let mut analyzer = Analyzer::default();
        analyzer.add_line("hello<ENTER>");
        assert_eq!(analyzer.display_buffer(500), "hello[ENTER]");
        assert_eq!(analyzer.display_buffer(7), "[ENTER]");
    }

    #[test]
    fn reset_matches_fresh_state() {
        let mut analyzer = Analyzer::default();
        analyzer.add_line("GUI+rpowershell<ENTER>");
        analyzer.check_patterns();
        analyzer.reset();

        let fresh = Analyzer::default();
        assert_eq!(analyzer.event_count(), fresh.event_count());
        assert_eq!(analyzer.typing_speed(), fresh.typing_speed());
        assert_eq!(analyzer.signature_buffer(), fresh.signature_buffer());
        assert_eq!(analyzer.fired_count(), 0);

        analyzer.add_line("GUI+rpowershell<ENTER>");
        assert_eq!(analyzer.check_patterns().len(), 2);
    }
}
