//! Browser driver seam
//!
//! The flow only talks to the browser through [`BrowserDriver`]. The
//! production implementation is the Playwright bridge; tests substitute a
//! scripted driver.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::E2eResult;
use crate::readiness::Condition;
use crate::state::{MarkerSnapshot, StateMarkers};

/// How an element is found on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Locator {
    /// A CSS selector
    Css { selector: String },

    /// Visible text (Playwright `text=` semantics)
    Text { text: String },

    /// An ARIA role with an accessible name
    Role {
        role: String,
        name: String,
        exact: bool,
    },

    /// A CSS selector narrowed to elements containing the text
    HasText { selector: String, text: String },
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css {
            selector: selector.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Locator::Text { text: text.into() }
    }

    /// A button matched by its exact accessible name
    pub fn button(name: impl Into<String>) -> Self {
        Locator::Role {
            role: "button".to_string(),
            name: name.into(),
            exact: true,
        }
    }

    pub fn has_text(selector: impl Into<String>, text: impl Into<String>) -> Self {
        Locator::HasText {
            selector: selector.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css { selector } => write!(f, "{}", selector),
            Locator::Text { text } => write!(f, "text={}", text),
            Locator::Role { role, name, exact } => {
                write!(f, "role={}[name=\"{}\"{}]", role, name, if *exact { "s" } else { "i" })
            }
            Locator::HasText { selector, text } => write!(f, "{}:has-text(\"{}\")", selector, text),
        }
    }
}

/// Page load milestones
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Load,
    #[serde(rename = "domcontentloaded")]
    DomContentLoaded,
    #[default]
    #[serde(rename = "networkidle")]
    NetworkIdle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

/// What to do with the next native dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogAction {
    Accept,
    Dismiss,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickOptions {
    /// Skip actionability checks
    pub force: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl ClickOptions {
    pub fn forced() -> Self {
        Self {
            force: true,
            ..Default::default()
        }
    }

    /// Give up on the click after `timeout`
    pub fn within(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }
}

/// A single live browser page
///
/// Every call is awaited to completion before the next one is issued. A call
/// that cannot find its element within its timeout returns an error; nothing
/// retries.
#[async_trait]
pub trait BrowserDriver: Send {
    /// Load `url` and wait for `wait_until`
    async fn goto(&mut self, url: &str, wait_until: LoadState, timeout: Duration) -> E2eResult<()>;

    /// Number of elements currently matching `locator`
    async fn count(&mut self, locator: &Locator) -> E2eResult<usize>;

    async fn click(&mut self, locator: &Locator, options: ClickOptions) -> E2eResult<()>;

    async fn fill(&mut self, locator: &Locator, value: &str) -> E2eResult<()>;

    async fn wait_for(&mut self, locator: &Locator, state: WaitState, timeout: Duration) -> E2eResult<()>;

    async fn wait_for_load_state(&mut self, state: LoadState, timeout: Duration) -> E2eResult<()>;

    /// Arm a handler for the next native dialog only; it disarms itself after firing
    async fn arm_dialog_once(&mut self, action: DialogAction) -> E2eResult<()>;

    async fn screenshot(&mut self, path: &Path, full_page: bool) -> E2eResult<()>;

    /// Presence of every state marker, collected in one round trip
    async fn page_markers(&mut self, markers: &StateMarkers) -> E2eResult<MarkerSnapshot>;

    /// Block until `condition` holds on the page
    async fn wait_until(&mut self, condition: &Condition, timeout: Duration) -> E2eResult<()>;

    /// Close the page and the browser. Safe to call more than once.
    async fn close(&mut self) -> E2eResult<()>;
}
