//! verify-wireframe - capture wireframe and shaded screenshots of the editor
//!
//! On success prints `WIRE_FRAME_SHOT=<path>` and `SHADED_SHOT=<path>` on
//! stdout. Logs go to stderr.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use twin_e2e::config::Browser;
use twin_e2e::{E2eResult, PlaywrightBridge, VerifyConfig, VerifyRunner};

#[derive(Parser, Debug)]
#[command(name = "verify-wireframe")]
#[command(about = "Drive the editor to wireframe and shaded mode and capture both")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, env = "TWIN_E2E_CONFIG", default_value = "twin-e2e.toml")]
    config: PathBuf,

    /// Base URL of the editor
    #[arg(long, env = "TWIN_E2E_BASE_URL")]
    base_url: Option<String>,

    /// Wireframe screenshot path
    #[arg(long, env = "TWIN_E2E_WIREFRAME_PATH")]
    wireframe_path: Option<PathBuf>,

    /// Shaded screenshot path
    #[arg(long, env = "TWIN_E2E_SHADED_PATH")]
    shaded_path: Option<PathBuf>,

    /// Browser engine
    #[arg(long, value_enum, env = "TWIN_E2E_BROWSER")]
    browser: Option<Browser>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Directory `playwright` is installed under
    #[arg(long, env = "TWIN_E2E_PLAYWRIGHT_DIR")]
    playwright_dir: Option<PathBuf>,

    /// Write a JSON run report here
    #[arg(long, env = "TWIN_E2E_REPORT")]
    report: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> E2eResult<(VerifyConfig, Option<PathBuf>)> {
        let mut config = VerifyConfig::load(&self.config)?;

        if let Some(url) = self.base_url {
            config.base_url = url;
        }
        if let Some(path) = self.wireframe_path {
            config.wireframe_path = path;
        }
        if let Some(path) = self.shaded_path {
            config.shaded_path = path;
        }
        if let Some(browser) = self.browser {
            config.browser.engine = browser;
        }
        if self.headed {
            config.browser.headless = false;
        }
        if let Some(dir) = self.playwright_dir {
            config.browser.playwright_dir = dir;
        }

        config.validate()?;
        Ok((config, self.report))
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for the *_SHOT= lines
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let (config, report_path) = match cli.into_config() {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            std::process::exit(2);
        }
    };

    let code = rt.block_on(async_main(config, report_path));
    std::process::exit(code);
}

async fn async_main(config: VerifyConfig, report_path: Option<PathBuf>) -> i32 {
    let mut bridge = match PlaywrightBridge::launch(&config.browser).await {
        Ok(bridge) => bridge,
        Err(e) => {
            tracing::error!("Could not start the browser: {}", e);
            return 2;
        }
    };

    let runner = VerifyRunner::new(config);
    let mut stdout = std::io::stdout();
    let outcome = runner.execute(&mut bridge, &mut stdout).await;

    if let Some(path) = report_path {
        if let Err(e) = outcome.report.write(&path) {
            tracing::warn!("Failed to write report: {}", e);
        }
    }

    if outcome.is_success() {
        0
    } else {
        1
    }
}
