//! Line-at-a-time telemetry pipeline
//!
//! A [`Monitor`] is what a stream consumer drives: it corrects the CTRL
//! artifact, feeds the analyzer, and reports newly fired signatures. It is
//! single-threaded and keeps no locks; callers serialize access.

use crate::analysis::{Alert, Analyzer, TypingTier};
use crate::config::{Config, ScriptConfig, VelocityConfig};
use crate::keystroke::{is_indented, ArtifactFilter, KeystrokeEvent};
use crate::report::{SessionReport, Telemetry};
use crate::script::ScriptEncoder;
use std::time::Instant;

/// Telemetry pipeline for one capture session
pub struct Monitor {
    filter: ArtifactFilter,
    analyzer: Analyzer,
    velocity: VelocityConfig,
    script: ScriptConfig,
    /// Tier seen after the last processed line, for transition logging
    last_tier: TypingTier,
    /// Session start (creation or last reset)
    start_time: Instant,
    /// Lines delivered, keystroke or not
    pub total_lines: u64,
}

impl Monitor {
    pub fn new(config: Config) -> Self {
        Self {
            filter: ArtifactFilter::new(config.filter.ctrl_artifact_fix),
            analyzer: Analyzer::new(config.analyzer),
            velocity: config.velocity,
            script: config.script,
            last_tier: TypingTier::Normal,
            start_time: Instant::now(),
            total_lines: 0,
        }
    }

    /// Process one decoded line captured now
    pub fn process_line(&mut self, line: &str) -> Vec<Alert> {
        self.process_line_at(line, Instant::now())
    }

    /// Process one decoded line with an explicit capture time.
    ///
    /// Returns the signatures that fired for the first time this session.
    pub fn process_line_at(&mut self, line: &str, timestamp: Instant) -> Vec<Alert> {
        self.total_lines += 1;

        // Indentation is judged on the line as delivered, before the filter trims it
        if is_indented(line) {
            log::debug!("indented status line: {:?}", line);
            return Vec::new();
        }

        let corrected = self.filter.filter(line);
        if self.analyzer.add_line_at(&corrected, timestamp) == 0 {
            return Vec::new();
        }

        let alerts = self.analyzer.check_patterns();
        for alert in &alerts {
            log::warn!("signature fired: {} ({})", alert.name, alert.severity);
        }

        let tier = self.analyzer.typing_tier(&self.velocity);
        if tier != self.last_tier {
            if tier != TypingTier::Normal {
                log::warn!(
                    "typing rate {:.1} k/s: {}",
                    self.analyzer.typing_speed(),
                    tier.as_str()
                );
            }
            self.last_tier = tier;
        }

        alerts
    }

    pub fn ctrl_fix_enabled(&self) -> bool {
        self.filter.is_enabled()
    }

    pub fn set_ctrl_fix(&mut self, enabled: bool) {
        self.filter.set_enabled(enabled);
    }

    /// Flip the CTRL artifact filter, returning the new state
    pub fn toggle_ctrl_fix(&mut self) -> bool {
        let enabled = self.filter.toggle();
        log::info!(
            "CTRL artifact filter {}",
            if enabled { "enabled" } else { "disabled" }
        );
        enabled
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn events(&self) -> impl Iterator<Item = &KeystrokeEvent> {
        self.analyzer.events()
    }

    pub fn typing_speed(&self) -> f64 {
        self.analyzer.typing_speed()
    }

    pub fn is_automated(&self) -> bool {
        self.analyzer
            .is_automated(self.velocity.automation_threshold)
    }

    pub fn typing_tier(&self) -> TypingTier {
        self.analyzer.typing_tier(&self.velocity)
    }

    /// Snapshot of the numeric telemetry
    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            event_count: self.analyzer.event_count(),
            typing_speed: self.analyzer.typing_speed(),
            tier: self.typing_tier(),
            fired_signatures: self.analyzer.fired_count(),
            ctrl_fix_enabled: self.filter.is_enabled(),
        }
    }

    /// Replay script for the captured events
    pub fn export_script(&self) -> String {
        ScriptEncoder::new(&self.script).encode(self.analyzer.events())
    }

    /// Session report for the current state
    pub fn report(&self) -> SessionReport {
        SessionReport::new(
            self.start_time,
            self.telemetry(),
            self.analyzer.fired_alerts(),
        )
    }

    /// Clear the capture session. The filter toggle is a setting and survives.
    pub fn reset(&mut self) {
        self.analyzer.reset();
        self.last_tier = TypingTier::Normal;
        self.start_time = Instant::now();
        self.total_lines = 0;
        log::info!("capture session reset");
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn status_lines_are_counted_but_ignored() {
        let mut monitor = Monitor::default();
        assert!(monitor.process_line("Device attached, address = 1").is_empty());
        assert_eq!(monitor.total_lines, 1);
        assert_eq!(monitor.telemetry().event_count, 0);
    }

    #[test]
    fn ctrl_fix_changes_what_is_typed() {
        let mut plain = Monitor::default();
        plain.process_line("CTRL+pCTRL+wCTRL+sCTRL+h");
        assert!(plain.events().all(|e| e.modifiers.ctrl));

        let mut fixed = Monitor::default();
        fixed.set_ctrl_fix(true);
        let alerts = fixed.process_line("CTRL+pCTRL+wCTRL+sCTRL+h");
        assert!(fixed.events().all(|e| e.modifiers.is_empty()));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].name, "Shell access");
    }

    #[test]
    fn invisible_characters_do_not_hide_signatures() {
        let mut monitor = Monitor::default();
        let alerts = monitor.process_line("\u{feff}GUI+rcm\u{200b}d<ENTER>");
        let names: Vec<_> = alerts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["WIN+R (Run)", "Shell access"]);
        assert_eq!(monitor.analyzer().signature_buffer(), "[GUI+r]cmd[ENTER]");

        let script = monitor.export_script();
        let body: Vec<_> = script.lines().filter(|l| !l.starts_with("REM")).collect();
        assert_eq!(body, vec!["GUI r", "STRING cmd", "ENTER"]);
    }

    #[test]
    fn indented_lines_stay_rejected_with_ctrl_fix() {
        let line = "  CTRL+aCTRL+bCTRL+c";
        for enabled in [false, true] {
            let mut monitor = Monitor::default();
            monitor.set_ctrl_fix(enabled);
            assert!(monitor.process_line(line).is_empty());
            assert_eq!(monitor.telemetry().event_count, 0, "ctrl fix {}", enabled);
            assert_eq!(monitor.total_lines, 1);
        }

        let mut monitor = Monitor::default();
        monitor.set_ctrl_fix(true);
        monitor.process_line("CTRL+aCTRL+bCTRL+c");
        assert_eq!(monitor.analyzer().signature_buffer(), "abc");
    }

    #[test]
    fn toggle_reports_new_state() {
        let mut monitor = Monitor::default();
        assert!(!monitor.ctrl_fix_enabled());
        assert!(monitor.toggle_ctrl_fix());
        assert!(monitor.telemetry().ctrl_fix_enabled);
        assert!(!monitor.toggle_ctrl_fix());
    }

    #[test]
    fn burst_is_flagged_automated() {
        let mut monitor = Monitor::default();
        let base = Instant::now();
        for i in 0..20 {
            monitor.process_line_at("a", base + Duration::from_millis(i * 5));
        }
        assert!(monitor.is_automated());
        assert!(monitor.telemetry().is_automated());
    }

    #[test]
    fn reset_keeps_filter_setting() {
        let mut monitor = Monitor::default();
        monitor.set_ctrl_fix(true);
        monitor.process_line("GUI+rcmd<ENTER>");
        monitor.reset();
        assert!(monitor.ctrl_fix_enabled());
        assert_eq!(monitor.total_lines, 0);
        assert_eq!(monitor.telemetry().event_count, 0);
        assert_eq!(monitor.export_script(), "REM No keystroke data captured\n");
    }
}
