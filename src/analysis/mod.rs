//! Keystroke analysis: session state, attack signatures and typing velocity

mod signatures;
mod state;
mod velocity;

pub use signatures::{Alert, Severity, Signature, SignatureMatcher, SIGNATURES};
pub use state::Analyzer;
pub use velocity::{TypingTier, VelocityEstimator};
