//! DigitalTwinEditor wireframe verification
//!
//! This crate drives a running editor through a user-like session and leaves
//! two screenshots behind for visual comparison:
//! - Probes the editor URL until it serves a page
//! - Registers and logs in a throwaway account when the login form is showing
//! - Creates a project when the project list is showing
//! - Adds a cube, then captures the viewport in wireframe and shaded mode
//! - Prints the two screenshot paths as `KEY=value` lines
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  VerifyRunner (Rust)                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  PROBING            probe::wait_for_target                  │
//! │  AUTHENTICATING?    SessionEstablisher::establish           │
//! │  CREATING_PROJECT?  SceneSetup::ensure_project              │
//! │  SCENE_READY        SceneSetup::wait_for_scene              │
//! │  OBJECT_ADDED       RenderDriver::add_cube                  │
//! │  *_CAPTURED         RenderDriver::capture + Artifact::verify│
//! │  DONE               driver.close(), then *_SHOT= lines      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BrowserDriver (trait)                                      │
//! │    └── PlaywrightBridge ── line-delimited JSON ── node      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod credentials;
pub mod driver;
pub mod error;
pub mod playwright;
pub mod probe;
pub mod readiness;
pub mod render;
pub mod report;
pub mod runner;
pub mod scene;
pub mod session;
pub mod state;

pub use config::VerifyConfig;
pub use driver::BrowserDriver;
pub use error::{E2eError, E2eResult};
pub use playwright::PlaywrightBridge;
pub use runner::{RunOutcome, RunPhase, VerifyRunner};
