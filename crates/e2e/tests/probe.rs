//! Availability probe timing, on a paused clock

mod common;

use std::time::Duration;

use tokio::time::Instant;

use common::{Call, FakeApp, ScriptedDriver};
use twin_e2e::config::ProbeConfig;
use twin_e2e::probe::wait_for_target;
use twin_e2e::E2eError;

const URL: &str = "http://localhost:5173";

fn goto_count(driver: &ScriptedDriver) -> usize {
    driver
        .calls
        .iter()
        .filter(|c| matches!(c, Call::Goto(_)))
        .count()
}

#[tokio::test(start_paused = true)]
async fn test_never_reachable_gives_up_after_thirty_attempts() {
    let mut driver = ScriptedDriver::new(FakeApp {
        unreachable_for: u32::MAX,
        ..FakeApp::fresh()
    });

    let start = Instant::now();
    let err = wait_for_target(&mut driver, URL, &ProbeConfig::default())
        .await
        .unwrap_err();
    let elapsed = start.elapsed();

    match err {
        E2eError::ServerNotReady { url, attempts } => {
            assert_eq!(url, URL);
            assert_eq!(attempts, 30);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(goto_count(&driver), 30);

    // One interval between attempts, none after the last
    assert!(elapsed >= Duration::from_secs(29), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(30), "elapsed {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_reachable_on_fifth_attempt() {
    let mut driver = ScriptedDriver::new(FakeApp {
        unreachable_for: 4,
        ..FakeApp::fresh()
    });

    let start = Instant::now();
    let attempts = wait_for_target(&mut driver, URL, &ProbeConfig::default())
        .await
        .unwrap();

    assert_eq!(attempts, 5);
    assert_eq!(goto_count(&driver), 5);
    assert_eq!(start.elapsed(), Duration::from_secs(4));
}

#[tokio::test(start_paused = true)]
async fn test_reachable_immediately_does_not_sleep() {
    let mut driver = ScriptedDriver::new(FakeApp::returning());

    let start = Instant::now();
    let attempts = wait_for_target(&mut driver, URL, &ProbeConfig::default())
        .await
        .unwrap();

    assert_eq!(attempts, 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_custom_attempt_budget() {
    let mut driver = ScriptedDriver::new(FakeApp {
        unreachable_for: u32::MAX,
        ..FakeApp::fresh()
    });
    let config = ProbeConfig {
        attempts: 3,
        interval_ms: 250,
        ..Default::default()
    };

    let start = Instant::now();
    let err = wait_for_target(&mut driver, URL, &config).await.unwrap_err();

    assert!(matches!(err, E2eError::ServerNotReady { attempts: 3, .. }));
    assert_eq!(start.elapsed(), Duration::from_millis(500));
}
