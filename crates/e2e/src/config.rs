//! Run configuration
//!
//! Everything the flow needs to know about the target lives here: where it is,
//! where screenshots go, how long to wait, and which UI contract points to
//! drive. Sections default to the DigitalTwinEditor dev server and can be
//! overridden from a TOML file and then from the command line.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::driver::Locator;
use crate::error::{E2eError, E2eResult};

/// Top-level configuration for one verification run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Base URL of the editor SPA
    pub base_url: String,

    /// Where the wireframe screenshot is written
    pub wireframe_path: PathBuf,

    /// Where the shaded screenshot is written
    pub shaded_path: PathBuf,

    pub probe: ProbeConfig,
    pub browser: BrowserConfig,
    pub timeouts: TimeoutConfig,
    pub project: ProjectConfig,
    pub readiness: ReadinessConfig,
    pub ui: UiContract,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        let tmp = std::env::temp_dir();
        Self {
            base_url: "http://localhost:5173".to_string(),
            wireframe_path: tmp.join("claude-wireframe.png"),
            shaded_path: tmp.join("claude-shaded.png"),
            probe: ProbeConfig::default(),
            browser: BrowserConfig::default(),
            timeouts: TimeoutConfig::default(),
            project: ProjectConfig::default(),
            readiness: ReadinessConfig::default(),
            ui: UiContract::default(),
        }
    }
}

impl VerifyConfig {
    /// Load configuration from file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject configurations the flow cannot run with
    pub fn validate(&self) -> E2eResult<()> {
        if self.probe.attempts == 0 {
            return Err(E2eError::InvalidConfig(
                "probe.attempts must be at least 1".to_string(),
            ));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(E2eError::InvalidConfig(format!(
                "base_url must be http(s): {}",
                self.base_url
            )));
        }
        for path in [&self.wireframe_path, &self.shaded_path] {
            if !path.is_absolute() {
                return Err(E2eError::InvalidConfig(format!(
                    "screenshot paths must be absolute: {}",
                    path.display()
                )));
            }
        }
        if self.wireframe_path == self.shaded_path {
            return Err(E2eError::InvalidConfig(
                "wireframe_path and shaded_path must differ".to_string(),
            ));
        }
        Ok(())
    }
}

/// Availability probe budget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Number of page loads to try
    pub attempts: u32,

    /// Pause between failed attempts
    pub interval_ms: u64,

    /// Timeout for a single page load
    pub attempt_timeout_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            attempts: 30,
            interval_ms: 1000,
            attempt_timeout_ms: 5000,
        }
    }
}

impl ProbeConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

/// How the Playwright bridge is launched
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub engine: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Directory `playwright` is resolved from (usually the app checkout)
    pub playwright_dir: PathBuf,

    /// Node.js executable
    pub node_binary: PathBuf,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            engine: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            playwright_dir: PathBuf::from("."),
            node_binary: PathBuf::from("node"),
        }
    }
}

/// Bounded waits on UI elements
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Waits for form fields and buttons
    pub element_ms: u64,

    /// Wait for the editor's scene marker after login / project creation
    pub scene_ms: u64,

    /// Network-idle wait after login
    pub load_state_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            element_ms: 5000,
            scene_ms: 20_000,
            load_state_ms: 30_000,
        }
    }
}

impl TimeoutConfig {
    pub fn element(&self) -> Duration {
        Duration::from_millis(self.element_ms)
    }

    pub fn scene(&self) -> Duration {
        Duration::from_millis(self.scene_ms)
    }

    pub fn load_state(&self) -> Duration {
        Duration::from_millis(self.load_state_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub description: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Wireframe Test".to_string(),
            description: "wireframe check".to_string(),
        }
    }
}

/// Completion signals used in place of fixed sleeps
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Animation frames that must elapse after a UI change before it counts as painted
    pub frames: u32,

    /// Minimum pause after registration before the login form is awaited
    pub registration_floor_ms: u64,

    /// Minimum pause after adding the cube
    pub object_floor_ms: u64,

    /// Minimum pause after a render-mode switch
    pub render_floor_ms: u64,

    /// Class the render-mode toggle carries while it is the active mode
    pub active_mode_class: String,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            frames: 2,
            registration_floor_ms: 500,
            object_floor_ms: 0,
            render_floor_ms: 0,
            active_mode_class: "text-white".to_string(),
        }
    }
}

/// UI contract points of the editor
///
/// Ids are CSS selectors; labels are matched as visible text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiContract {
    pub login_username: String,
    pub login_password: String,
    pub login_button: String,
    pub register_link: String,
    pub register_username: String,
    pub register_email: String,
    pub register_password: String,
    pub register_button: String,
    pub create_project_link: String,
    pub project_name: String,
    pub project_description: String,
    pub create_project_button: String,
    pub scene_marker: String,
    pub editor_canvas: String,
    pub add_menu: String,
    pub cube_item: String,
    pub wireframe_toggle: String,
    pub shaded_toggle: String,
}

impl Default for UiContract {
    fn default() -> Self {
        Self {
            login_username: "#username".to_string(),
            login_password: "#password".to_string(),
            login_button: "登录".to_string(),
            register_link: "还没有账号？立即注册".to_string(),
            register_username: "#reg-username".to_string(),
            register_email: "#reg-email".to_string(),
            register_password: "#reg-password".to_string(),
            register_button: "注册".to_string(),
            create_project_link: "创建新项目".to_string(),
            project_name: "#project-name".to_string(),
            project_description: "#project-description".to_string(),
            create_project_button: "创建项目".to_string(),
            scene_marker: "Wireframe".to_string(),
            editor_canvas: "canvas".to_string(),
            add_menu: "添加".to_string(),
            cube_item: "立方体 (Cube)".to_string(),
            wireframe_toggle: "Wireframe".to_string(),
            shaded_toggle: "Shaded".to_string(),
        }
    }
}

impl UiContract {
    pub fn login_username(&self) -> Locator {
        Locator::css(&self.login_username)
    }

    pub fn login_password(&self) -> Locator {
        Locator::css(&self.login_password)
    }

    pub fn login_button(&self) -> Locator {
        Locator::button(&self.login_button)
    }

    pub fn register_link(&self) -> Locator {
        Locator::text(&self.register_link)
    }

    pub fn register_username(&self) -> Locator {
        Locator::css(&self.register_username)
    }

    pub fn register_email(&self) -> Locator {
        Locator::css(&self.register_email)
    }

    pub fn register_password(&self) -> Locator {
        Locator::css(&self.register_password)
    }

    pub fn register_button(&self) -> Locator {
        Locator::button(&self.register_button)
    }

    pub fn create_project_link(&self) -> Locator {
        Locator::text(&self.create_project_link)
    }

    pub fn project_name(&self) -> Locator {
        Locator::css(&self.project_name)
    }

    pub fn project_description(&self) -> Locator {
        Locator::css(&self.project_description)
    }

    pub fn create_project_button(&self) -> Locator {
        Locator::has_text("button", &self.create_project_button)
    }

    pub fn scene_marker(&self) -> Locator {
        Locator::text(&self.scene_marker)
    }

    pub fn editor_canvas(&self) -> Locator {
        Locator::css(&self.editor_canvas)
    }

    pub fn add_menu(&self) -> Locator {
        Locator::text(&self.add_menu)
    }

    pub fn cube_item(&self) -> Locator {
        Locator::text(&self.cube_item)
    }

    pub fn wireframe_toggle(&self) -> Locator {
        Locator::text(&self.wireframe_toggle)
    }

    pub fn shaded_toggle(&self) -> Locator {
        Locator::text(&self.shaded_toggle)
    }
}
