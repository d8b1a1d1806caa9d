//! Session establishment - register and log in when the login form is showing

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{ReadinessConfig, UiContract};
use crate::credentials::SessionCredentials;
use crate::driver::{BrowserDriver, ClickOptions, DialogAction, WaitState};
use crate::error::E2eResult;
use crate::readiness::Readiness;
use crate::state::ApplicationState;

/// How the flow ended up with a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    /// Already logged in; nothing was touched
    Existing,
    /// Registered a fresh account and logged in with it
    Registered,
}

pub struct SessionEstablisher<'a> {
    ui: &'a UiContract,
    readiness: &'a ReadinessConfig,
    element_timeout: Duration,
}

impl<'a> SessionEstablisher<'a> {
    pub fn new(ui: &'a UiContract, readiness: &'a ReadinessConfig, element_timeout: Duration) -> Self {
        Self {
            ui,
            readiness,
            element_timeout,
        }
    }

    /// Make sure the page is logged in
    pub async fn establish<D>(
        &self,
        driver: &mut D,
        state: ApplicationState,
        credentials: &SessionCredentials,
    ) -> E2eResult<SessionOutcome>
    where
        D: BrowserDriver + ?Sized,
    {
        if state.is_authenticated() {
            info!("Existing session detected ({})", state);
            return Ok(SessionOutcome::Existing);
        }

        self.register(driver, credentials).await?;
        self.login(driver, credentials).await?;
        Ok(SessionOutcome::Registered)
    }

    async fn register<D>(&self, driver: &mut D, credentials: &SessionCredentials) -> E2eResult<()>
    where
        D: BrowserDriver + ?Sized,
    {
        let ui = self.ui;
        info!("Registering {}", credentials.username);

        driver
            .click(&ui.register_link(), ClickOptions::forced().within(self.element_timeout))
            .await?;
        driver
            .wait_for(&ui.register_username(), WaitState::Visible, self.element_timeout)
            .await?;

        driver.fill(&ui.register_username(), &credentials.username).await?;
        driver.fill(&ui.register_email(), &credentials.email).await?;
        driver.fill(&ui.register_password(), &credentials.password).await?;

        // Registration confirms through a native dialog
        driver.arm_dialog_once(DialogAction::Accept).await?;
        driver
            .click(&ui.register_button(), ClickOptions::default().within(self.element_timeout))
            .await?;

        Readiness::new()
            .floor(Duration::from_millis(self.readiness.registration_floor_ms))
            .visible(ui.login_username())
            .wait(driver, self.element_timeout)
            .await
    }

    async fn login<D>(&self, driver: &mut D, credentials: &SessionCredentials) -> E2eResult<()>
    where
        D: BrowserDriver + ?Sized,
    {
        let ui = self.ui;
        info!("Logging in as {}", credentials.username);

        driver.fill(&ui.login_username(), &credentials.username).await?;
        driver.fill(&ui.login_password(), &credentials.password).await?;
        driver
            .click(&ui.login_button(), ClickOptions::default().within(self.element_timeout))
            .await
    }
}
