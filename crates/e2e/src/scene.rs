//! Scene setup - open a project and wait for the editor scene view

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{ProjectConfig, UiContract};
use crate::driver::{BrowserDriver, ClickOptions, LoadState, WaitState};
use crate::error::E2eResult;
use crate::state::{query_state, ApplicationState, StateMarkers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneOutcome {
    /// A project was already open
    Existing,
    /// Created the configured project
    Created,
}

pub struct SceneSetup<'a> {
    pub ui: &'a UiContract,
    pub project: &'a ProjectConfig,
    pub element_timeout: Duration,
    pub load_timeout: Duration,
    pub scene_timeout: Duration,
}

impl SceneSetup<'_> {
    /// State of the page once the post-login network traffic has settled
    pub async fn settled_state<D>(&self, driver: &mut D) -> E2eResult<ApplicationState>
    where
        D: BrowserDriver + ?Sized,
    {
        driver
            .wait_for_load_state(LoadState::NetworkIdle, self.load_timeout)
            .await?;
        query_state(driver, &StateMarkers::from_contract(self.ui)).await
    }

    /// Create the project if the project list is showing
    pub async fn ensure_project<D>(&self, driver: &mut D, state: ApplicationState) -> E2eResult<SceneOutcome>
    where
        D: BrowserDriver + ?Sized,
    {
        if state != ApplicationState::NoProject {
            info!("Assuming a project is open ({})", state);
            return Ok(SceneOutcome::Existing);
        }

        let ui = self.ui;
        info!("Creating project '{}'", self.project.name);

        let click = ClickOptions::default().within(self.element_timeout);
        driver.click(&ui.create_project_link(), click).await?;
        driver
            .wait_for(&ui.project_name(), WaitState::Visible, self.element_timeout)
            .await?;
        driver.fill(&ui.project_name(), &self.project.name).await?;
        driver
            .fill(&ui.project_description(), &self.project.description)
            .await?;
        driver.click(&ui.create_project_button(), click).await?;

        Ok(SceneOutcome::Created)
    }

    /// Synchronisation point for both branches
    pub async fn wait_for_scene<D>(&self, driver: &mut D) -> E2eResult<()>
    where
        D: BrowserDriver + ?Sized,
    {
        driver
            .wait_for(&self.ui.scene_marker(), WaitState::Visible, self.scene_timeout)
            .await?;
        info!("Scene view is ready");
        Ok(())
    }
}
