//! Explicit application state query
//!
//! Instead of scattering "is this element here?" checks through the flow, the
//! driver reports the presence of a fixed set of markers in one call and
//! [`ApplicationState::classify`] turns that into a single typed state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::UiContract;
use crate::driver::{BrowserDriver, Locator};
use crate::error::E2eResult;

/// Where the editor currently is, as far as the flow cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationState {
    /// Login form is showing
    Unauthenticated,
    /// Logged in, but no known screen is showing yet
    Authenticated,
    /// Project list with a "create project" affordance
    NoProject,
    /// Editor is mounted, scene toolbar not yet visible
    ProjectOpen,
    /// Editor scene view with render-mode toggles
    SceneReady,
}

impl ApplicationState {
    /// Classify a marker snapshot; earlier checks win
    pub fn classify(snapshot: &MarkerSnapshot) -> Self {
        if snapshot.login_form {
            ApplicationState::Unauthenticated
        } else if snapshot.create_project {
            ApplicationState::NoProject
        } else if snapshot.scene_marker {
            ApplicationState::SceneReady
        } else if snapshot.editor_canvas {
            ApplicationState::ProjectOpen
        } else {
            ApplicationState::Authenticated
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, ApplicationState::Unauthenticated)
    }
}

impl fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApplicationState::Unauthenticated => "unauthenticated",
            ApplicationState::Authenticated => "authenticated",
            ApplicationState::NoProject => "no-project",
            ApplicationState::ProjectOpen => "project-open",
            ApplicationState::SceneReady => "scene-ready",
        };
        f.write_str(s)
    }
}

/// Locators whose presence defines the application state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMarkers {
    pub login_form: Locator,
    pub create_project: Locator,
    pub scene_marker: Locator,
    pub editor_canvas: Locator,
}

impl StateMarkers {
    pub fn from_contract(ui: &UiContract) -> Self {
        Self {
            login_form: ui.login_username(),
            create_project: ui.create_project_link(),
            scene_marker: ui.scene_marker(),
            editor_canvas: ui.editor_canvas(),
        }
    }
}

/// Which markers were present at query time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSnapshot {
    pub login_form: bool,
    pub create_project: bool,
    pub scene_marker: bool,
    pub editor_canvas: bool,
}

/// Query the driver for the current application state
pub async fn query_state<D>(driver: &mut D, markers: &StateMarkers) -> E2eResult<ApplicationState>
where
    D: BrowserDriver + ?Sized,
{
    let snapshot = driver.page_markers(markers).await?;
    let state = ApplicationState::classify(&snapshot);
    tracing::debug!(?snapshot, %state, "Application state");
    Ok(state)
}
