//! ClickMap entry point.
//!
//! Loads the configuration, wires the platform adapters into a
//! [`ModeController`] and hands it to the [`ControllerHost`], then waits for
//! Ctrl-C.
//!
//! ```text
//! main()
//!  ├─ load_config_from()        -- config.toml or defaults
//!  ├─ platform_injector()       -- SendInput / XTest
//!  ├─ ModeController::new()     -- optional --profile, --play
//!  └─ ControllerHost::init()    -- controller thread + key hook
//!       ...ctrl_c()...
//!     ControllerHost::teardown()
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use clickmap_app::application::manage_profiles::ProfileRepository;
use clickmap_app::application::mode_controller::{Mode, ModeController};
use clickmap_app::application::synthesize_click::ClickSynthesizer;
use clickmap_app::infrastructure::controller_host::ControllerHost;
use clickmap_app::infrastructure::key_listener::platform_listener;
use clickmap_app::infrastructure::pointer_injection::platform_injector;
use clickmap_app::infrastructure::storage::config::{config_file_path, load_config_from, save_config_to};
use clickmap_app::infrastructure::storage::profile_store::ProfileStore;
use clickmap_app::infrastructure::ui_bridge::TracingViewNotifier;

/// Remaps keys to mouse clicks at fixed screen points.
#[derive(Debug, Parser)]
#[command(name = "clickmap", version, about)]
struct Cli {
    /// Configuration file (defaults to the platform config directory).
    #[arg(long, env = "CLICKMAP_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding profile files.
    #[arg(long, env = "CLICKMAP_PROFILE_DIR")]
    profile_dir: Option<PathBuf>,

    /// Profile to load at start.
    #[arg(long, env = "CLICKMAP_PROFILE")]
    profile: Option<String>,

    /// Start in Play mode.
    #[arg(long)]
    play: bool,

    /// Print the stored profile names and exit.
    #[arg(long)]
    list_profiles: bool,

    /// Write the effective configuration to the config file and exit.
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => config_file_path().context("locating the configuration directory")?,
    };
    let config = load_config_from(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;

    // `RUST_LOG` wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.general.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if cli.init_config {
        save_config_to(&config_path, &config)
            .with_context(|| format!("writing configuration to {}", config_path.display()))?;
        info!(path = %config_path.display(), "configuration written");
        return Ok(());
    }

    let profile_dir = match cli.profile_dir {
        Some(dir) => dir,
        None => config.profile_dir().context("locating the profile directory")?,
    };
    let store = ProfileStore::new(profile_dir);

    if cli.list_profiles {
        for name in store.list().context("listing profiles")? {
            println!("{name}");
        }
        return Ok(());
    }

    info!(profiles = %store.dir().display(), "ClickMap starting");

    let injector = platform_injector().context("opening pointer injection")?;
    let clicker = ClickSynthesizer::new(injector, config.click_settings());
    let origin = clicker
        .desktop_origin()
        .context("querying the virtual desktop")?;
    let geometry = config.geometry(origin);

    let mut controller = ModeController::new(
        geometry,
        clicker,
        Box::new(store),
        Box::new(TracingViewNotifier),
    );
    if let Some(name) = &cli.profile {
        controller
            .load_profile(name)
            .with_context(|| format!("loading profile {name:?}"))?;
    }
    if cli.play {
        controller.set_mode(Mode::Play);
    }

    let mut host = ControllerHost::init(controller, platform_listener(), config.decision_budget())
        .context("starting the key listener")?;

    info!("ClickMap ready.  Press Ctrl-C to exit.");
    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;
    info!("shutdown signal received");

    host.teardown();
    info!("ClickMap stopped");
    Ok(())
}
