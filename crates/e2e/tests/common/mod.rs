//! In-memory stand-in for the editor, driven through `BrowserDriver`
//!
//! Models just enough of the SPA's screens to walk the verification flow:
//! login, registration, project list, project form, and the editor.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use twin_e2e::config::UiContract;
use twin_e2e::driver::{BrowserDriver, ClickOptions, DialogAction, LoadState, Locator, WaitState};
use twin_e2e::readiness::Condition;
use twin_e2e::render::RenderMode;
use twin_e2e::state::{MarkerSnapshot, StateMarkers};
use twin_e2e::{E2eError, E2eResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Blank,
    Login,
    Register,
    Projects,
    ProjectForm,
    Editor,
}

/// Recorded driver calls
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Goto(String),
    Count(Locator),
    Click(Locator),
    Fill(Locator, String),
    WaitFor(Locator),
    WaitForLoadState,
    ArmDialog(DialogAction),
    Screenshot(PathBuf),
    Markers,
    WaitUntil(Condition),
    Close,
}

/// How the fake editor starts out
#[derive(Debug, Clone)]
pub struct FakeApp {
    /// Page loads that fail before the server answers
    pub unreachable_for: u32,
    pub logged_in: bool,
    pub has_project: bool,
    pub register_button: bool,
    pub scene_marker: bool,
    pub shaded_toggle: bool,
    /// Whether the network ever goes idle after login
    pub settles: bool,
    /// Whether screenshots reach the disk
    pub writes_screenshots: bool,
}

impl FakeApp {
    pub fn fresh() -> Self {
        Self {
            unreachable_for: 0,
            logged_in: false,
            has_project: false,
            register_button: true,
            scene_marker: true,
            shaded_toggle: true,
            settles: true,
            writes_screenshots: true,
        }
    }

    pub fn returning() -> Self {
        Self {
            logged_in: true,
            has_project: true,
            ..Self::fresh()
        }
    }
}

pub struct ScriptedDriver {
    pub ui: UiContract,
    pub app: FakeApp,
    pub calls: Vec<Call>,
    pub screen: Screen,
    pub goto_attempts: u32,
    pub dialogs_armed: u32,
    pub pending_dialog: bool,
    pub registered: Option<(String, String)>,
    pub click_timeouts: Vec<Option<u64>>,
    pub inputs: HashMap<String, String>,
    pub add_menu_open: bool,
    pub cubes: u32,
    pub mode: RenderMode,
    pub closed: u32,
}

impl ScriptedDriver {
    pub fn new(app: FakeApp) -> Self {
        Self {
            ui: UiContract::default(),
            app,
            calls: Vec::new(),
            screen: Screen::Blank,
            goto_attempts: 0,
            dialogs_armed: 0,
            pending_dialog: false,
            registered: None,
            click_timeouts: Vec::new(),
            inputs: HashMap::new(),
            add_menu_open: false,
            cubes: 0,
            mode: RenderMode::Shaded,
            closed: 0,
        }
    }

    pub fn clicks(&self, locator: &Locator) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Click(l) if l == locator))
            .count()
    }

    pub fn fills(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::Fill(..))).count()
    }

    /// Clicks and fills, the calls that change the page
    pub fn interactions(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Click(_) | Call::Fill(..)))
            .count()
    }

    fn present(&self, locator: &Locator) -> bool {
        let ui = &self.ui;
        match self.screen {
            Screen::Blank => false,
            Screen::Login => [ui.login_username(), ui.login_password(), ui.login_button(), ui.register_link()]
                .contains(locator),
            Screen::Register => {
                let mut on_screen = vec![ui.register_username(), ui.register_email(), ui.register_password()];
                if self.app.register_button {
                    on_screen.push(ui.register_button());
                }
                on_screen.contains(locator)
            }
            Screen::Projects => *locator == ui.create_project_link(),
            Screen::ProjectForm => [ui.project_name(), ui.project_description(), ui.create_project_button()]
                .contains(locator),
            Screen::Editor => {
                let mut on_screen = vec![ui.editor_canvas(), ui.add_menu()];
                if self.app.shaded_toggle {
                    on_screen.push(ui.shaded_toggle());
                }
                if self.app.scene_marker {
                    on_screen.push(ui.scene_marker());
                    on_screen.push(ui.wireframe_toggle());
                }
                if self.add_menu_open {
                    on_screen.push(ui.cube_item());
                }
                on_screen.contains(locator)
            }
        }
    }

    fn landing_screen(&self) -> Screen {
        match (self.app.logged_in, self.app.has_project) {
            (false, _) => Screen::Login,
            (true, false) => Screen::Projects,
            (true, true) => Screen::Editor,
        }
    }

    fn input(&self, locator: &Locator) -> String {
        self.inputs.get(&locator.to_string()).cloned().unwrap_or_default()
    }

    fn missing(&self, what: &str, locator: &Locator) -> E2eError {
        E2eError::Timeout(format!("{} {} on {:?}", what, locator, self.screen))
    }
}

#[async_trait]
impl BrowserDriver for ScriptedDriver {
    async fn goto(&mut self, url: &str, _wait_until: LoadState, _timeout: Duration) -> E2eResult<()> {
        self.calls.push(Call::Goto(url.to_string()));
        self.goto_attempts += 1;
        if self.goto_attempts <= self.app.unreachable_for {
            return Err(E2eError::StepFailed {
                step: "goto".to_string(),
                reason: "net::ERR_CONNECTION_REFUSED".to_string(),
            });
        }
        self.screen = self.landing_screen();
        Ok(())
    }

    async fn count(&mut self, locator: &Locator) -> E2eResult<usize> {
        self.calls.push(Call::Count(locator.clone()));
        Ok(usize::from(self.present(locator)))
    }

    async fn click(&mut self, locator: &Locator, options: ClickOptions) -> E2eResult<()> {
        self.calls.push(Call::Click(locator.clone()));
        self.click_timeouts.push(options.timeout_ms);
        if !self.present(locator) {
            return Err(self.missing("click", locator));
        }

        let ui = self.ui.clone();
        match self.screen {
            Screen::Login if *locator == ui.register_link() => self.screen = Screen::Register,
            Screen::Login if *locator == ui.login_button() => {
                let entered = (self.input(&ui.login_username()), self.input(&ui.login_password()));
                if self.registered.as_ref() != Some(&entered) {
                    return Err(E2eError::StepFailed {
                        step: "login".to_string(),
                        reason: "bad credentials".to_string(),
                    });
                }
                self.app.logged_in = true;
                self.screen = self.landing_screen();
            }
            Screen::Register if *locator == ui.register_button() => {
                // An unhandled confirm blocks the page
                if !self.pending_dialog {
                    return Err(E2eError::Timeout("registration dialog was not handled".to_string()));
                }
                self.pending_dialog = false;
                self.registered = Some((
                    self.input(&ui.register_username()),
                    self.input(&ui.register_password()),
                ));
                self.inputs.clear();
                self.screen = Screen::Login;
            }
            Screen::Projects => self.screen = Screen::ProjectForm,
            Screen::ProjectForm if *locator == ui.create_project_button() => {
                self.app.has_project = true;
                self.screen = Screen::Editor;
            }
            Screen::Editor if *locator == ui.add_menu() => self.add_menu_open = true,
            Screen::Editor if *locator == ui.cube_item() => {
                self.cubes += 1;
                self.add_menu_open = false;
            }
            Screen::Editor if *locator == ui.wireframe_toggle() => self.mode = RenderMode::Wireframe,
            Screen::Editor if *locator == ui.shaded_toggle() => self.mode = RenderMode::Shaded,
            _ => {}
        }
        Ok(())
    }

    async fn fill(&mut self, locator: &Locator, value: &str) -> E2eResult<()> {
        self.calls.push(Call::Fill(locator.clone(), value.to_string()));
        if !self.present(locator) {
            return Err(self.missing("fill", locator));
        }
        self.inputs.insert(locator.to_string(), value.to_string());
        Ok(())
    }

    async fn wait_for(&mut self, locator: &Locator, state: WaitState, _timeout: Duration) -> E2eResult<()> {
        self.calls.push(Call::WaitFor(locator.clone()));
        let present = self.present(locator);
        match state {
            WaitState::Visible | WaitState::Attached if present => Ok(()),
            WaitState::Hidden | WaitState::Detached if !present => Ok(()),
            _ => Err(self.missing("wait_for", locator)),
        }
    }

    async fn wait_for_load_state(&mut self, _state: LoadState, _timeout: Duration) -> E2eResult<()> {
        self.calls.push(Call::WaitForLoadState);
        if !self.app.settles {
            return Err(E2eError::Timeout("networkidle".to_string()));
        }
        Ok(())
    }

    async fn arm_dialog_once(&mut self, action: DialogAction) -> E2eResult<()> {
        self.calls.push(Call::ArmDialog(action));
        self.dialogs_armed += 1;
        self.pending_dialog = true;
        Ok(())
    }

    async fn screenshot(&mut self, path: &Path, _full_page: bool) -> E2eResult<()> {
        self.calls.push(Call::Screenshot(path.to_path_buf()));
        if self.screen != Screen::Editor {
            return Err(E2eError::StepFailed {
                step: "screenshot".to_string(),
                reason: "editor not open".to_string(),
            });
        }
        if self.app.writes_screenshots {
            std::fs::write(path, format!("\u{89}PNG fake {} cubes={}", self.mode, self.cubes))?;
        }
        Ok(())
    }

    async fn page_markers(&mut self, markers: &StateMarkers) -> E2eResult<MarkerSnapshot> {
        self.calls.push(Call::Markers);
        Ok(MarkerSnapshot {
            login_form: self.present(&markers.login_form),
            create_project: self.present(&markers.create_project),
            scene_marker: self.present(&markers.scene_marker),
            editor_canvas: self.present(&markers.editor_canvas),
        })
    }

    async fn wait_until(&mut self, condition: &Condition, _timeout: Duration) -> E2eResult<()> {
        self.calls.push(Call::WaitUntil(condition.clone()));
        let holds = match condition {
            Condition::Visible { locator } => self.present(locator),
            Condition::Hidden { locator } => !self.present(locator),
            Condition::HasClass { locator, class } => {
                let active = match self.mode {
                    RenderMode::Wireframe => self.ui.wireframe_toggle(),
                    RenderMode::Shaded => self.ui.shaded_toggle(),
                };
                class == "text-white" && *locator == active
            }
            Condition::AnimationFrames { .. } => true,
        };
        if holds {
            Ok(())
        } else {
            Err(E2eError::Timeout(format!("{:?}", condition)))
        }
    }

    async fn close(&mut self) -> E2eResult<()> {
        self.calls.push(Call::Close);
        self.closed += 1;
        Ok(())
    }
}
