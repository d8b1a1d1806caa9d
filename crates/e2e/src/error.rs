//! Error types for the verification flow

use std::path::PathBuf;
use thiserror::Error;

use crate::runner::RunPhase;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Server not ready on {url} after {attempts} attempts")]
    ServerNotReady { url: String, attempts: u32 },

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright bridge error: {0}")]
    Bridge(String),

    #[error("Bridge exited before answering `{0}`")]
    BridgeClosed(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Step failed: {step} - {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Artifact check failed for {}: {reason}", path.display())]
    Artifact { path: PathBuf, reason: String },

    #[error("{phase} failed: {source}")]
    PhaseFailed {
        phase: RunPhase,
        #[source]
        source: Box<E2eError>,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl E2eError {
    /// Tag an error with the run phase it escaped from.
    pub fn in_phase(self, phase: RunPhase) -> Self {
        match self {
            E2eError::PhaseFailed { .. } => self,
            other => E2eError::PhaseFailed {
                phase,
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, with phase wrapping removed
    pub fn root(&self) -> &E2eError {
        match self {
            E2eError::PhaseFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
