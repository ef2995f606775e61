//! HID Telemetry - keystroke analysis for USB watchdog debug streams
//!
//! Turns the line-oriented debug output of a USB watchdog into keystroke
//! telemetry: it separates injected keystrokes from firmware noise,
//! reconstructs what was typed, flags known attack signatures, estimates
//! whether input is automated, and re-encodes captures as replay scripts.

pub mod analysis;
pub mod config;
pub mod error;
pub mod keystroke;
pub mod monitor;
pub mod report;
pub mod rules;
pub mod script;

pub use analysis::{Alert, Analyzer, Severity, TypingTier};
pub use config::Config;
pub use keystroke::{is_keystroke_line, parse_line, ArtifactFilter, KeystrokeEvent};
pub use monitor::Monitor;
pub use report::{SessionReport, Telemetry};
pub use script::{export_script, ScriptEncoder};
