//! Attack signature catalog and matcher
//!
//! Signatures are searched case-insensitively in the signature buffer, where
//! modified keys appear as `[ALT+CTRL+GUI+key]` (modifiers sorted) and bare
//! special keys as `[NAME]`. The firmware stream carries no spaces as keys, so
//! multi-word commands are matched with optional whitespace.

use crate::rules::RuleSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

/// Alert severity, shared with the collaborator's coloring vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Danger,
    Warning,
    Info,
    Success,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Danger => "danger",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cataloged attack indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub pattern: &'static str,
    pub name: &'static str,
    pub severity: Severity,
}

impl Signature {
    const fn new(pattern: &'static str, name: &'static str, severity: Severity) -> Self {
        Self {
            pattern,
            name,
            severity,
        }
    }
}

/// Static signature catalog, in reporting order
pub const SIGNATURES: &[Signature] = &[
    Signature::new(r"GUI\+r\]", "WIN+R (Run)", Severity::Danger),
    Signature::new(r"GUI\+x\]", "WIN+X (Power)", Severity::Warning),
    Signature::new(r"ALT\+CTRL\+", "CTRL+ALT combo", Severity::Warning),
    Signature::new(r"(cmd|powershell|pwsh)", "Shell access", Severity::Danger),
    Signature::new(r"(invoke-webrequest|iwr|wget|curl)", "Download", Severity::Danger),
    Signature::new(r"(iex|invoke-expression)", "Code exec", Severity::Danger),
    Signature::new(r"(base64|-enc)", "Encoded cmd", Severity::Danger),
    Signature::new(r"net\s*(user|localgroup)", "User manipulation", Severity::Danger),
    Signature::new(r"(schtasks|reg\s*add)", "Persistence", Severity::Danger),
];

static SIGNATURE_RULES: LazyLock<RuleSet<Signature>> =
    LazyLock::new(|| RuleSet::case_insensitive(SIGNATURES.iter().map(|s| (s.pattern, *s))));

/// A fired signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub name: String,
    pub severity: Severity,
}

impl Alert {
    pub fn new(name: impl Into<String>, severity: Severity) -> Self {
        Self {
            name: name.into(),
            severity,
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ALERT] {}", self.name)
    }
}

/// Matches the catalog against text, reporting each signature once per session
#[derive(Debug, Clone, Default)]
pub struct SignatureMatcher {
    fired_names: HashSet<&'static str>,
    fired: Vec<Alert>,
}

impl SignatureMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signatures present in `text` that have not fired yet this session.
    /// Returned signatures are marked as fired.
    pub fn check(&mut self, text: &str) -> Vec<Alert> {
        let mut found = Vec::new();
        for rule in SIGNATURE_RULES.matches(text) {
            let signature = rule.payload;
            if self.fired_names.insert(signature.name) {
                let alert = Alert::new(signature.name, signature.severity);
                self.fired.push(alert.clone());
                found.push(alert);
            }
        }
        found
    }

    pub fn has_fired(&self, name: &str) -> bool {
        self.fired_names.contains(name)
    }

    /// All alerts fired this session, in firing order
    pub fn fired(&self) -> &[Alert] {
        &self.fired
    }

    pub fn fired_count(&self) -> usize {
        self.fired.len()
    }

    pub fn reset(&mut self) {
        self.fired_names.clear();
        self.fired.clear();
    }
}
