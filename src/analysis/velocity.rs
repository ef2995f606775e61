//! Typing velocity estimation
//!
//! Injection hardware types far faster than a person. The estimator keeps a
//! bounded window of keystroke timestamps and reports the rate across it.

use crate::config::VelocityConfig;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Instant;

/// Presentation tier for a typing rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypingTier {
    Normal,
    Suspicious,
    Automated,
}

impl TypingTier {
    /// Classify a rate against the configured thresholds
    pub fn classify(speed: f64, thresholds: &VelocityConfig) -> Self {
        if speed > thresholds.automation_threshold {
            Self::Automated
        } else if speed > thresholds.suspicious_threshold {
            Self::Suspicious
        } else {
            Self::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Suspicious => "SUSPICIOUS",
            Self::Automated => "AUTOMATED",
        }
    }
}

/// Sliding window of keystroke timestamps
#[derive(Debug, Clone)]
pub struct VelocityEstimator {
    window: VecDeque<Instant>,
    capacity: usize,
}

impl VelocityEstimator {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            window: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Record a keystroke time, dropping the oldest beyond capacity
    pub fn record(&mut self, timestamp: Instant) {
        self.window.push_back(timestamp);
        if self.window.len() > self.capacity {
            self.window.pop_front();
        }
    }

    /// Events per second across the window; 0 with fewer than two samples or
    /// a zero-length window.
    pub fn typing_speed(&self) -> f64 {
        let (Some(first), Some(last)) = (self.window.front(), self.window.back()) else {
            return 0.0;
        };
        if self.window.len() < 2 {
            return 0.0;
        }
        let duration = last.saturating_duration_since(*first).as_secs_f64();
        if duration > 0.0 {
            self.window.len() as f64 / duration
        } else {
            0.0
        }
    }

    pub fn is_automated(&self, threshold: f64) -> bool {
        self.typing_speed() > threshold
    }

    pub fn tier(&self, thresholds: &VelocityConfig) -> TypingTier {
        TypingTier::classify(self.typing_speed(), thresholds)
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }
}

impl Default for VelocityEstimator {
    fn default() -> Self {
        Self::new(100)
    }
}
