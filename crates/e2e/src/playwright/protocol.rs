//! Wire types for the bridge's line-delimited JSON protocol

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::driver::{DialogAction, LoadState, Locator, WaitState};
use crate::error::E2eError;
use crate::readiness::Condition;
use crate::state::StateMarkers;

#[derive(Debug, Serialize)]
pub struct Request<'a, A> {
    pub id: u64,
    pub cmd: &'a str,
    pub args: A,
}

/// Any line the bridge writes: a response (has `id`) or an event
#[derive(Debug, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<Failure>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

/// What a bridge line means to a caller waiting on one request id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The answer being waited for
    Reply,
    /// Unsolicited event; keep reading
    Event,
    /// Answer to an earlier request that already timed out; keep reading
    Stale,
    /// Missing or future id; the stream is out of sync
    Unexpected,
}

impl Message {
    pub fn disposition(&self, waiting_for: u64) -> Disposition {
        if self.event.is_some() {
            return Disposition::Event;
        }
        match self.id {
            Some(id) if id == waiting_for => Disposition::Reply,
            Some(id) if id < waiting_for => Disposition::Stale,
            _ => Disposition::Unexpected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    Error,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn into_error(self, cmd: &str) -> E2eError {
        match self.kind {
            FailureKind::Timeout => E2eError::Timeout(format!("{}: {}", cmd, self.message)),
            FailureKind::Error => E2eError::StepFailed {
                step: cmd.to_string(),
                reason: self.message,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Serialize)]
pub struct LaunchArgs<'a> {
    pub browser: &'a str,
    pub headless: bool,
    pub viewport: Viewport,
}

#[derive(Debug, Serialize)]
pub struct GotoArgs<'a> {
    pub url: &'a str,
    pub wait_until: LoadState,
    pub timeout_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct TargetArgs<'a> {
    pub target: &'a Locator,
}

#[derive(Debug, Serialize)]
pub struct ClickArgs<'a> {
    pub target: &'a Locator,
    pub force: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct FillArgs<'a> {
    pub target: &'a Locator,
    pub value: &'a str,
}

#[derive(Debug, Serialize)]
pub struct WaitForArgs<'a> {
    pub target: &'a Locator,
    pub state: WaitState,
    pub timeout_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct LoadStateArgs {
    pub state: LoadState,
    pub timeout_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct DialogArgs {
    pub action: DialogAction,
}

#[derive(Debug, Serialize)]
pub struct ScreenshotArgs<'a> {
    pub path: &'a Path,
    pub full_page: bool,
}

#[derive(Debug, Serialize)]
pub struct MarkersArgs<'a> {
    pub markers: &'a StateMarkers,
}

#[derive(Debug, Serialize)]
pub struct ConditionArgs<'a> {
    pub condition: &'a Condition,
    pub timeout_ms: u64,
}
