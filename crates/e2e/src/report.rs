//! Artifact reporting
//!
//! The externally consumed result of a run is two `KEY=value` lines on stdout.
//! Alongside, a JSON run report records what happened for humans and CI logs.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::{E2eError, E2eResult};
use crate::render::RenderMode;
use crate::runner::RunPhase;
use crate::scene::SceneOutcome;
use crate::session::SessionOutcome;
use crate::state::ApplicationState;

pub const WIREFRAME_KEY: &str = "WIRE_FRAME_SHOT";
pub const SHADED_KEY: &str = "SHADED_SHOT";

/// Tolerance for filesystem timestamp granularity only
///
/// Kernel mtimes come from a coarse clock and FAT-style filesystems round to
/// two seconds, so a file written just after the run started can carry an
/// mtime slightly before it. A file older than this still fails the check.
pub const MTIME_SLACK: Duration = Duration::from_secs(2);

/// A screenshot that passed its post-capture checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub mode: RenderMode,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub sha256: String,
}

impl Artifact {
    /// Check that `path` holds a non-empty file written no earlier than `since`
    pub fn verify(mode: RenderMode, path: &Path, since: SystemTime) -> E2eResult<Self> {
        let metadata = std::fs::metadata(path).map_err(|e| E2eError::Artifact {
            path: path.to_path_buf(),
            reason: format!("not readable: {}", e),
        })?;

        if metadata.len() == 0 {
            return Err(E2eError::Artifact {
                path: path.to_path_buf(),
                reason: "file is empty".to_string(),
            });
        }

        let modified = metadata.modified()?;
        if modified + MTIME_SLACK < since {
            return Err(E2eError::Artifact {
                path: path.to_path_buf(),
                reason: "file predates this run".to_string(),
            });
        }

        Ok(Self {
            mode,
            path: path.to_path_buf(),
            size_bytes: metadata.len(),
            sha256: hash_file(path)?,
        })
    }
}

fn hash_file(path: &Path) -> E2eResult<String> {
    let data = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

/// Print the two `*_SHOT=` lines
pub fn write_shot_lines<W: Write>(out: &mut W, wireframe: &Path, shaded: &Path) -> E2eResult<()> {
    writeln!(out, "{}={}", WIREFRAME_KEY, wireframe.display())?;
    writeln!(out, "{}={}", SHADED_KEY, shaded.display())?;
    out.flush()?;
    Ok(())
}

/// Time spent in one phase of the run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTiming {
    pub phase: RunPhase,
    pub duration_ms: u64,
}

/// Everything a run observed, success or not
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub base_url: String,
    pub username: Option<String>,
    pub probe_attempts: u32,
    pub states: Vec<ApplicationState>,
    pub session: Option<SessionOutcome>,
    pub scene: Option<SceneOutcome>,
    pub phases: Vec<PhaseTiming>,
    pub artifacts: Vec<Artifact>,
    pub success: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn new(base_url: &str) -> Self {
        Self {
            started_at: Utc::now(),
            base_url: base_url.to_string(),
            username: None,
            probe_attempts: 0,
            states: Vec::new(),
            session: None,
            scene: None,
            phases: Vec::new(),
            artifacts: Vec::new(),
            success: false,
            error: None,
            duration_ms: 0,
        }
    }

    /// Phase the run last entered
    pub fn last_phase(&self) -> Option<RunPhase> {
        self.phases.last().map(|p| p.phase)
    }

    pub fn artifact(&self, mode: RenderMode) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.mode == mode)
    }

    /// Write the report as pretty JSON
    pub fn write(&self, path: &Path) -> E2eResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;

        info!("Report written to: {}", path.display());
        Ok(())
    }
}
