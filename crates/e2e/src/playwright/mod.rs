//! Playwright browser automation
//!
//! A small Node.js bridge script (embedded below) owns the browser. This side
//! writes one JSON request per line to its stdin and reads one JSON response
//! per line from its stdout, skipping event lines.

mod protocol;

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

use crate::config::BrowserConfig;
use crate::driver::{BrowserDriver, ClickOptions, DialogAction, LoadState, Locator, WaitState};
use crate::error::{E2eError, E2eResult};
use crate::readiness::Condition;
use crate::state::{MarkerSnapshot, StateMarkers};

use protocol::{
    ClickArgs, ConditionArgs, DialogArgs, Disposition, FillArgs, GotoArgs, LaunchArgs, LoadStateArgs, MarkersArgs,
    Message, Request, ScreenshotArgs, TargetArgs, Viewport, WaitForArgs,
};

const BRIDGE_SCRIPT: &str = include_str!("bridge.js");

/// Budget for calls that carry no timeout of their own (Playwright's default)
const DEFAULT_CALL_BUDGET: Duration = Duration::from_secs(30);

/// Slack on top of a call's own timeout before the bridge is considered hung
const BRIDGE_GRACE: Duration = Duration::from_secs(10);

/// Live bridge process with one open page
pub struct PlaywrightBridge {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    next_id: u64,
    closed: bool,

    /// Holds the staged bridge script
    _script_dir: TempDir,
}

impl PlaywrightBridge {
    /// Spawn the bridge and open a page
    pub async fn launch(config: &BrowserConfig) -> E2eResult<Self> {
        Self::check_playwright_installed(config).await?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("twin-e2e-bridge.js");
        std::fs::write(&script_path, BRIDGE_SCRIPT)?;

        debug!("Starting Playwright bridge: {}", script_path.display());

        // stdout belongs to the protocol; bridge diagnostics go to our stderr
        let mut child = TokioCommand::new(&config.node_binary)
            .arg(&script_path)
            .current_dir(&config.playwright_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                E2eError::Bridge(format!(
                    "Failed to spawn {}: {}",
                    config.node_binary.display(),
                    e
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Bridge("bridge stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Bridge("bridge stdout not captured".to_string()))?;

        let mut bridge = Self {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
            next_id: 0,
            closed: false,
            _script_dir: script_dir,
        };

        let launched: serde_json::Value = bridge
            .call(
                "launch",
                LaunchArgs {
                    browser: config.engine.as_str(),
                    headless: config.headless,
                    viewport: Viewport {
                        width: config.viewport_width,
                        height: config.viewport_height,
                    },
                },
                DEFAULT_CALL_BUDGET,
            )
            .await?;

        info!(
            "Launched {} {} (headless: {})",
            config.engine.as_str(),
            launched["version"].as_str().unwrap_or("unknown"),
            config.headless
        );
        Ok(bridge)
    }

    /// Check that `playwright` resolves from the configured directory
    async fn check_playwright_installed(config: &BrowserConfig) -> E2eResult<()> {
        let status = TokioCommand::new(&config.node_binary)
            .args(["-e", "require.resolve('playwright', { paths: [process.cwd()] })"])
            .current_dir(&config.playwright_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await;

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    /// Send one request and wait for its response
    async fn call<A, R>(&mut self, cmd: &str, args: A, budget: Duration) -> E2eResult<R>
    where
        A: Serialize,
        R: DeserializeOwned,
    {
        if self.closed {
            return Err(E2eError::Bridge(format!("`{}` after close", cmd)));
        }

        self.next_id += 1;
        let id = self.next_id;
        let line = serde_json::to_string(&Request { id, cmd, args })?;
        trace!("bridge <- {}", line);

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| E2eError::BridgeClosed(cmd.to_string()))?;
        stdin.write_all(line.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;

        let message = timeout(budget + BRIDGE_GRACE, self.read_response(id, cmd))
            .await
            .map_err(|_| E2eError::Bridge(format!("no answer to `{}` within {:?}", cmd, budget + BRIDGE_GRACE)))??;

        if !message.ok {
            return Err(match message.error {
                Some(failure) => failure.into_error(cmd),
                None => E2eError::Bridge(format!("`{}` failed without detail", cmd)),
            });
        }

        let result = message.result.unwrap_or(serde_json::Value::Null);
        Ok(serde_json::from_value(result)?)
    }

    async fn read_response(&mut self, id: u64, cmd: &str) -> E2eResult<Message> {
        loop {
            let mut line = String::new();
            if self.stdout.read_line(&mut line).await? == 0 {
                return Err(E2eError::BridgeClosed(cmd.to_string()));
            }
            trace!("bridge -> {}", line.trim());

            let message: Message = serde_json::from_str(&line)
                .map_err(|e| E2eError::Bridge(format!("Invalid response: {}", e)))?;

            match message.disposition(id) {
                Disposition::Reply => return Ok(message),
                Disposition::Event => {
                    info!(
                        "Bridge event {}: {}",
                        message.event.as_deref().unwrap_or_default(),
                        message.detail.clone().unwrap_or_default()
                    );
                }
                // Late answer to a call we already gave up on
                Disposition::Stale => {
                    debug!("Dropping stale response {:?} while waiting for {}", message.id, id);
                }
                Disposition::Unexpected => {
                    return Err(E2eError::Bridge(format!(
                        "response id {:?} does not match request {}",
                        message.id, id
                    )))
                }
            }
        }
    }

    async fn call_void<A: Serialize>(&mut self, cmd: &str, args: A, budget: Duration) -> E2eResult<()> {
        let _: serde_json::Value = self.call(cmd, args, budget).await?;
        Ok(())
    }

    /// Stop the bridge process
    fn terminate(&mut self) {
        // Try graceful shutdown first
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = self.child.id() {
                let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
            }
        }

        let _ = self.child.start_kill();
    }
}

#[async_trait]
impl BrowserDriver for PlaywrightBridge {
    async fn goto(&mut self, url: &str, wait_until: LoadState, timeout: Duration) -> E2eResult<()> {
        let args = GotoArgs {
            url,
            wait_until,
            timeout_ms: timeout.as_millis() as u64,
        };
        self.call_void("goto", args, timeout).await
    }

    async fn count(&mut self, locator: &Locator) -> E2eResult<usize> {
        self.call("count", TargetArgs { target: locator }, DEFAULT_CALL_BUDGET)
            .await
    }

    async fn click(&mut self, locator: &Locator, options: ClickOptions) -> E2eResult<()> {
        let budget = options
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_CALL_BUDGET);
        let args = ClickArgs {
            target: locator,
            force: options.force,
            timeout_ms: options.timeout_ms,
        };
        self.call_void("click", args, budget).await
    }

    async fn fill(&mut self, locator: &Locator, value: &str) -> E2eResult<()> {
        let args = FillArgs {
            target: locator,
            value,
        };
        self.call_void("fill", args, DEFAULT_CALL_BUDGET).await
    }

    async fn wait_for(&mut self, locator: &Locator, state: WaitState, timeout: Duration) -> E2eResult<()> {
        let args = WaitForArgs {
            target: locator,
            state,
            timeout_ms: timeout.as_millis() as u64,
        };
        self.call_void("wait_for", args, timeout).await
    }

    async fn wait_for_load_state(&mut self, state: LoadState, timeout: Duration) -> E2eResult<()> {
        let args = LoadStateArgs {
            state,
            timeout_ms: timeout.as_millis() as u64,
        };
        self.call_void("wait_for_load_state", args, timeout).await
    }

    async fn arm_dialog_once(&mut self, action: DialogAction) -> E2eResult<()> {
        self.call_void("arm_dialog", DialogArgs { action }, DEFAULT_CALL_BUDGET)
            .await
    }

    async fn screenshot(&mut self, path: &Path, full_page: bool) -> E2eResult<()> {
        self.call_void("screenshot", ScreenshotArgs { path, full_page }, DEFAULT_CALL_BUDGET)
            .await
    }

    async fn page_markers(&mut self, markers: &StateMarkers) -> E2eResult<MarkerSnapshot> {
        self.call("markers", MarkersArgs { markers }, DEFAULT_CALL_BUDGET)
            .await
    }

    async fn wait_until(&mut self, condition: &Condition, timeout: Duration) -> E2eResult<()> {
        let args = ConditionArgs {
            condition,
            timeout_ms: timeout.as_millis() as u64,
        };
        self.call_void("wait_until", args, timeout).await
    }

    async fn close(&mut self) -> E2eResult<()> {
        if self.closed {
            return Ok(());
        }

        let result = self.call_void("close", (), DEFAULT_CALL_BUDGET).await;
        self.closed = true;

        // EOF on stdin lets the bridge exit on its own
        self.stdin.take();
        match timeout(Duration::from_secs(5), self.child.wait()).await {
            Ok(Ok(status)) => debug!("Bridge exited: {}", status),
            Ok(Err(e)) => warn!("Failed to reap bridge: {}", e),
            Err(_) => {
                warn!("Bridge did not exit, killing it");
                self.terminate();
            }
        }

        result
    }
}

impl Drop for PlaywrightBridge {
    fn drop(&mut self) {
        if !self.closed {
            self.terminate();
        }
    }
}
