//! Verification runner - sequences the stages and owns the browser lifetime

use std::fmt;
use std::future::Future;
use std::io::Write;
use std::time::{Instant, SystemTime};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::VerifyConfig;
use crate::credentials::SessionCredentials;
use crate::driver::BrowserDriver;
use crate::error::{E2eError, E2eResult};
use crate::probe;
use crate::render::{RenderDriver, RenderMode};
use crate::report::{write_shot_lines, Artifact, PhaseTiming, RunReport};
use crate::scene::SceneSetup;
use crate::session::SessionEstablisher;
use crate::state::{query_state, ApplicationState, StateMarkers};

/// States of a run, in the order they are entered
///
/// `Authenticating` and `CreatingProject` are skipped when the application is
/// already past them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunPhase {
    Probing,
    Authenticating,
    CreatingProject,
    SceneReady,
    ObjectAdded,
    WireframeCaptured,
    ShadedCaptured,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunPhase::Probing => "probing",
            RunPhase::Authenticating => "authenticating",
            RunPhase::CreatingProject => "creating project",
            RunPhase::SceneReady => "waiting for scene",
            RunPhase::ObjectAdded => "adding object",
            RunPhase::WireframeCaptured => "capturing wireframe",
            RunPhase::ShadedCaptured => "capturing shaded",
            RunPhase::Done => "done",
        };
        f.write_str(s)
    }
}

/// Report plus the verdict of a finished run
#[derive(Debug)]
pub struct RunOutcome {
    pub report: RunReport,
    pub result: E2eResult<()>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Drives one verification run against a live browser
pub struct VerifyRunner {
    config: VerifyConfig,
}

impl VerifyRunner {
    pub fn new(config: VerifyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Run with freshly generated credentials
    pub async fn execute<D, W>(&self, driver: &mut D, out: &mut W) -> RunOutcome
    where
        D: BrowserDriver + ?Sized,
        W: Write,
    {
        self.execute_with(driver, &SessionCredentials::generate(), out)
            .await
    }

    /// Run the whole flow, close the browser, then report
    ///
    /// The driver is closed on every path. The `*_SHOT=` lines reach `out`
    /// only when both screenshots were captured and verified.
    pub async fn execute_with<D, W>(
        &self,
        driver: &mut D,
        credentials: &SessionCredentials,
        out: &mut W,
    ) -> RunOutcome
    where
        D: BrowserDriver + ?Sized,
        W: Write,
    {
        let start = Instant::now();
        let mut report = RunReport::new(&self.config.base_url);
        report.username = Some(credentials.username.clone());

        let mut result = self.flow(driver, credentials, &mut report).await;

        if let Err(e) = driver.close().await {
            warn!("Failed to close browser: {}", e);
        }

        if result.is_ok() {
            result = write_shot_lines(out, &self.config.wireframe_path, &self.config.shaded_path);
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        report.success = result.is_ok();
        match &result {
            Ok(()) => info!("Verification finished in {} ms", report.duration_ms),
            Err(e) => {
                error!("Verification failed: {}", e);
                report.error = Some(e.to_string());
            }
        }

        RunOutcome { report, result }
    }

    async fn flow<D>(
        &self,
        driver: &mut D,
        credentials: &SessionCredentials,
        report: &mut RunReport,
    ) -> E2eResult<()>
    where
        D: BrowserDriver + ?Sized,
    {
        let config = &self.config;
        let started = SystemTime::now();
        let markers = StateMarkers::from_contract(&config.ui);

        let attempts = phase(report, RunPhase::Probing, async {
            probe::wait_for_target(driver, &config.base_url, &config.probe).await
        })
        .await?;
        report.probe_attempts = attempts;

        let state = query_state(driver, &markers)
            .await
            .map_err(|e| e.in_phase(RunPhase::Probing))?;
        report.states.push(state);

        let establisher =
            SessionEstablisher::new(&config.ui, &config.readiness, config.timeouts.element());
        let session = if state.is_authenticated() {
            establisher.establish(driver, state, credentials).await?
        } else {
            phase(report, RunPhase::Authenticating, async {
                establisher.establish(driver, state, credentials).await
            })
            .await?
        };
        report.session = Some(session);

        let scene = SceneSetup {
            ui: &config.ui,
            project: &config.project,
            element_timeout: config.timeouts.element(),
            load_timeout: config.timeouts.load_state(),
            scene_timeout: config.timeouts.scene(),
        };
        // Settling belongs to whichever phase brought the page here
        let entered = report.last_phase().unwrap_or(RunPhase::Probing);
        let settled = scene
            .settled_state(driver)
            .await
            .map_err(|e| e.in_phase(entered))?;
        report.states.push(settled);

        let project = if settled == ApplicationState::NoProject {
            phase(report, RunPhase::CreatingProject, async {
                scene.ensure_project(driver, settled).await
            })
            .await?
        } else {
            scene.ensure_project(driver, settled).await?
        };
        report.scene = Some(project);

        phase(report, RunPhase::SceneReady, async { scene.wait_for_scene(driver).await }).await?;

        let render = RenderDriver {
            ui: &config.ui,
            readiness: &config.readiness,
            timeout: config.timeouts.element(),
        };
        phase(report, RunPhase::ObjectAdded, async { render.add_cube(driver).await }).await?;

        let shots = [
            (RunPhase::WireframeCaptured, RenderMode::Wireframe, &config.wireframe_path),
            (RunPhase::ShadedCaptured, RenderMode::Shaded, &config.shaded_path),
        ];
        for (run_phase, mode, path) in shots {
            let artifact = phase(report, run_phase, async {
                render.capture(driver, mode, path).await?;
                Artifact::verify(mode, path, started)
            })
            .await?;
            debug!(?artifact, "Artifact verified");
            report.artifacts.push(artifact);
        }

        report.phases.push(PhaseTiming {
            phase: RunPhase::Done,
            duration_ms: 0,
        });
        Ok(())
    }
}

/// Run one phase, record its timing, and tag any error with it
async fn phase<T, F>(report: &mut RunReport, phase: RunPhase, work: F) -> E2eResult<T>
where
    F: Future<Output = E2eResult<T>>,
{
    info!("Phase: {}", phase);
    let start = Instant::now();
    let result = work.await;

    report.phases.push(PhaseTiming {
        phase,
        duration_ms: start.elapsed().as_millis() as u64,
    });

    result.map_err(|e: E2eError| e.in_phase(phase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_are_ordered() {
        assert!(RunPhase::Probing < RunPhase::Authenticating);
        assert!(RunPhase::CreatingProject < RunPhase::SceneReady);
        assert!(RunPhase::ShadedCaptured < RunPhase::Done);
    }

    #[test]
    fn test_phase_error_wraps_once() {
        let err = E2eError::Timeout("text=Wireframe".to_string())
            .in_phase(RunPhase::SceneReady)
            .in_phase(RunPhase::ObjectAdded);
        assert_eq!(
            err.to_string(),
            "waiting for scene failed: Timeout waiting for: text=Wireframe"
        );
        assert!(matches!(err.root(), E2eError::Timeout(_)));
    }

    #[test]
    fn test_runner_exposes_its_config() {
        let runner = VerifyRunner::new(VerifyConfig::default());
        assert_eq!(runner.config().base_url, "http://localhost:5173");
        assert_eq!(runner.config().probe.attempts, 30);
    }

    #[test]
    fn test_phase_serializes_as_state_name() {
        assert_eq!(
            serde_json::to_value(RunPhase::WireframeCaptured).unwrap(),
            serde_json::json!("WIREFRAME_CAPTURED")
        );
    }
}
