//! Telemetry snapshot and session report export

use crate::analysis::{Alert, TypingTier};
use crate::error::ExportError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Numeric telemetry polled by collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Telemetry {
    /// Events currently retained for replay
    pub event_count: usize,
    /// Events per second over the timing window
    pub typing_speed: f64,
    /// Presentation tier for the current speed
    pub tier: TypingTier,
    /// Signatures fired this session
    pub fired_signatures: usize,
    /// Whether the CTRL artifact filter is active
    pub ctrl_fix_enabled: bool,
}

impl Telemetry {
    pub fn is_automated(&self) -> bool {
        self.tier == TypingTier::Automated
    }

    pub fn is_suspicious(&self) -> bool {
        self.tier == TypingTier::Suspicious
    }

    /// One-line summary, e.g. `events=12 speed=4.2 k/s tier=Normal alerts=1`
    pub fn summary(&self) -> String {
        format!(
            "events={} speed={:.1} k/s tier={} alerts={}",
            self.event_count,
            self.typing_speed,
            self.tier.as_str(),
            self.fired_signatures
        )
    }
}

/// Complete session report
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// Telemetry at report time
    pub telemetry: Telemetry,
    /// Fired alerts in firing order
    pub alerts: Vec<Alert>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Report generation timestamp
    pub generated_at: String,
    /// Application version
    pub version: String,
    /// Session duration in seconds
    pub duration_secs: f64,
}

impl SessionReport {
    /// Create a new session report
    pub fn new(start_time: Instant, telemetry: Telemetry, alerts: &[Alert]) -> Self {
        let now: DateTime<Utc> = Utc::now();

        Self {
            metadata: ReportMetadata {
                generated_at: now.to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                duration_secs: start_time.elapsed().as_secs_f64(),
            },
            telemetry,
            alerts: alerts.to_vec(),
        }
    }

    /// Export report to JSON file
    pub fn export_json(&self, path: &Path) -> Result<(), ExportError> {
        let json = self.to_json()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        log::info!("session report written to {}", path.display());
        Ok(())
    }

    /// Export report to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
