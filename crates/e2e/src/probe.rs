//! Availability probe - wait for the editor to serve its first page

use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::ProbeConfig;
use crate::driver::{BrowserDriver, LoadState};
use crate::error::{E2eError, E2eResult};

/// Load `url` until one attempt reaches network idle
///
/// Returns the number of attempts used. The page from the successful load
/// stays open for the rest of the run.
pub async fn wait_for_target<D>(driver: &mut D, url: &str, config: &ProbeConfig) -> E2eResult<u32>
where
    D: BrowserDriver + ?Sized,
{
    let mut attempts = 0;

    while attempts < config.attempts {
        attempts += 1;

        match driver
            .goto(url, LoadState::NetworkIdle, config.attempt_timeout())
            .await
        {
            Ok(()) => {
                info!("Target is up at {} (attempt {})", url, attempts);
                return Ok(attempts);
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for {} to respond...", url);
                }
                debug!("Probe attempt {} failed: {}", attempts, e);
            }
        }

        if attempts < config.attempts {
            sleep(config.interval()).await;
        }
    }

    Err(E2eError::ServerNotReady {
        url: url.to_string(),
        attempts,
    })
}
