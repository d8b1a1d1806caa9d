//! Object and render-mode driving

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{ReadinessConfig, UiContract};
use crate::driver::{BrowserDriver, ClickOptions, Locator};
use crate::error::E2eResult;
use crate::readiness::Readiness;

/// Viewport render modes the editor offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    Wireframe,
    Shaded,
}

impl RenderMode {
    fn toggle(&self, ui: &UiContract) -> Locator {
        match self {
            RenderMode::Wireframe => ui.wireframe_toggle(),
            RenderMode::Shaded => ui.shaded_toggle(),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Wireframe => f.write_str("wireframe"),
            RenderMode::Shaded => f.write_str("shaded"),
        }
    }
}

pub struct RenderDriver<'a> {
    pub ui: &'a UiContract,
    pub readiness: &'a ReadinessConfig,
    pub timeout: Duration,
}

impl RenderDriver<'_> {
    /// Add a cube through the "add object" menu
    pub async fn add_cube<D>(&self, driver: &mut D) -> E2eResult<()>
    where
        D: BrowserDriver + ?Sized,
    {
        let ui = self.ui;
        let click = ClickOptions::default().within(self.timeout);
        driver.click(&ui.add_menu(), click).await?;
        driver.click(&ui.cube_item(), click).await?;

        // The menu closes once the object has been created
        Readiness::new()
            .hidden(ui.cube_item())
            .frames(self.readiness.frames)
            .floor(Duration::from_millis(self.readiness.object_floor_ms))
            .wait(driver, self.timeout)
            .await?;

        info!("Cube added");
        Ok(())
    }

    /// Switch to `mode` and capture a full-page screenshot once it has painted
    pub async fn capture<D>(&self, driver: &mut D, mode: RenderMode, path: &Path) -> E2eResult<()>
    where
        D: BrowserDriver + ?Sized,
    {
        let toggle = mode.toggle(self.ui);
        driver
            .click(&toggle, ClickOptions::default().within(self.timeout))
            .await?;

        Readiness::new()
            .has_class(toggle, &self.readiness.active_mode_class)
            .frames(self.readiness.frames)
            .floor(Duration::from_millis(self.readiness.render_floor_ms))
            .wait(driver, self.timeout)
            .await?;

        driver.screenshot(path, true).await?;
        info!("Captured {} screenshot: {}", mode, path.display());
        Ok(())
    }
}
