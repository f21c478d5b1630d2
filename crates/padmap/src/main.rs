//! padmap entry point.
//!
//! ```text
//! main()
//!  └─ load config           -- platform dir or --config
//!  └─ build adapters        -- XInput + SendInput, or mock + logging for --dry-run
//!  └─ MapperController      -- rules imported from config, saved back on change
//!       ├─ poll task        (tokio interval, edge detection)
//!       └─ dispatch task    (rule resolution, key injection)
//!  └─ Ctrl-C → stop()       -- drains the queue, releases every held key
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use padmap::application::controller::{MapperController, MapperError, MapperState};
use padmap::application::key_state::KeyboardEmulator;
use padmap::application::poll_device::{DeviceStateSource, PollSettings};
use padmap::infrastructure::device::mock::MockGamepad;
use padmap::infrastructure::keyboard::logging::LoggingKeyboard;
use padmap::infrastructure::storage::config::{self, AppConfig};
use padmap_core::{InputSymbol, KeyCode, Modifier};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Maps game controller buttons to keyboard keys.
#[derive(Debug, Parser)]
#[command(name = "padmap", about = "Gamepad-to-keyboard remapper", version)]
struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, env = "PADMAP_CONFIG")]
    config: Option<PathBuf>,

    /// XInput slot (0-3); overrides `[polling] device_index`.
    #[arg(long)]
    device: Option<u32>,

    /// Log filter; overrides `[general] log_level`.  `RUST_LOG` wins over both.
    #[arg(long)]
    log_level: Option<String>,

    /// Log key signals instead of injecting them, with an idle mock pad.
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum Command {
    /// Start mapping until Ctrl-C (default).
    Run,
    /// List the configured rules.
    Rules,
    /// List input symbols and key names usable in the config file.
    Symbols,
}

impl Cli {
    fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => config::config_file_path().context("locating the config file"),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config_path()?;

    // Warnings raised while loading (a corrupt file being moved aside) need a
    // subscriber before the configured one exists.
    let app_config = {
        let _bootstrap = tracing::subscriber::set_default(bootstrap_subscriber());
        config::load_config_from(&config_path)
            .with_context(|| format!("loading config from {}", config_path.display()))?
    };

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| app_config.general.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&cli, app_config, config_path).await,
        Command::Rules => {
            print_rules(&app_config, &config_path);
            Ok(())
        }
        Command::Symbols => {
            print_symbols();
            Ok(())
        }
    }
}

/// Warn-level subscriber used only while the config file is read.
fn bootstrap_subscriber() -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("warn"))
        .finish()
}

async fn run(cli: &Cli, app_config: AppConfig, config_path: PathBuf) -> anyhow::Result<()> {
    let mut settings = PollSettings::from(&app_config.polling);
    if let Some(device) = cli.device {
        settings.device_index = device;
    }

    let (device, keyboard) = build_adapters(cli.dry_run)?;
    let controller = MapperController::new(device, keyboard, settings);
    controller.import_rules(app_config.rules.clone());

    controller.set_on_state_change(|state| match state {
        MapperState::Running => info!("padmap running.  Press Ctrl-C to exit."),
        MapperState::Stopped => info!("padmap stopped"),
    });
    controller.set_on_error(|e| error!("{e}"));
    let saved = AppConfig {
        rules: Vec::new(),
        ..app_config
    };
    controller.set_on_rules_change(move |rules| {
        let cfg = AppConfig {
            rules: rules.to_vec(),
            ..saved.clone()
        };
        if let Err(e) = config::save_config_to(&config_path, &cfg) {
            warn!("failed to save rules: {e}");
        }
    });

    controller.start().await.context("starting the mapper")?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for Ctrl-C: {e}");
    } else {
        info!("shutdown signal received");
    }

    controller.stop().await;
    Ok(())
}

fn build_adapters(
    dry_run: bool,
) -> Result<(Arc<dyn DeviceStateSource>, Arc<dyn KeyboardEmulator>), MapperError> {
    if dry_run {
        info!("dry run: idle mock controller, key signals are logged only");
        return Ok((Arc::new(MockGamepad::new()), Arc::new(LoggingKeyboard::new())));
    }
    physical_adapters()
}

#[cfg(target_os = "windows")]
fn physical_adapters() -> Result<(Arc<dyn DeviceStateSource>, Arc<dyn KeyboardEmulator>), MapperError> {
    use padmap::infrastructure::device::windows::XInputGamepad;
    use padmap::infrastructure::keyboard::windows::SendInputKeyboard;

    Ok((Arc::new(XInputGamepad::new()), Arc::new(SendInputKeyboard::new())))
}

#[cfg(not(target_os = "windows"))]
fn physical_adapters() -> Result<(Arc<dyn DeviceStateSource>, Arc<dyn KeyboardEmulator>), MapperError> {
    use padmap::application::poll_device::DeviceError;

    Err(MapperError::DeviceUnavailable(DeviceError::Platform(
        "XInput is only available on Windows; use --dry-run".to_string(),
    )))
}

// ── Listings ──────────────────────────────────────────────────────────────────

fn print_rules(app_config: &AppConfig, config_path: &std::path::Path) {
    println!("Rules in {}:", config_path.display());
    if app_config.rules.is_empty() {
        println!("  (none)");
    }
    for rule in &app_config.rules {
        let state = if rule.enabled { " " } else { "-" };
        match &rule.name {
            Some(name) => println!("{state} {rule}  [{name}]  {}", rule.id),
            None => println!("{state} {rule}  {}", rule.id),
        }
    }
}

fn print_symbols() {
    println!("Input symbols:");
    for symbol in InputSymbol::ALL {
        println!("  {:<22} {}", config_name(&symbol), symbol.label());
    }
    println!("Modifiers:");
    for modifier in Modifier::ALL {
        println!("  {:<22} {}", config_name(&modifier), modifier.label());
    }
    println!("Keys:");
    for key in KeyCode::ALL {
        println!("  {:<22} {}", config_name(&key), key.label());
    }
}

/// The name a value is written as in the config file.
fn config_name<T: serde::Serialize>(value: &T) -> String {
    toml::Value::try_from(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_default()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_run_without_overrides() {
        // Arrange / Act
        let cli = Cli::parse_from(["padmap"]);

        // Assert
        assert_eq!(cli.command, None);
        assert_eq!(cli.device, None);
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_cli_parses_flags_and_subcommand() {
        let cli = Cli::parse_from(["padmap", "--device", "2", "--dry-run", "--config", "/tmp/p.toml", "rules"]);

        assert_eq!(cli.device, Some(2));
        assert!(cli.dry_run);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/p.toml")));
        assert_eq!(cli.command, Some(Command::Rules));
    }

    #[test]
    fn test_config_name_matches_serialized_form() {
        assert_eq!(config_name(&InputSymbol::LeftStickUp), "left_stick_up");
        assert_eq!(config_name(&KeyCode::PageUp), "page_up");
        assert_eq!(config_name(&Modifier::Ctrl), "ctrl");
    }

    #[test]
    fn test_bootstrap_subscriber_passes_warnings_only() {
        // Arrange
        let subscriber = bootstrap_subscriber();

        // Act / Assert
        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(tracing::Level::WARN));
            assert!(!tracing::enabled!(tracing::Level::INFO));
        });
    }

    #[test]
    fn test_dry_run_adapters_are_always_available() {
        assert!(build_adapters(true).is_ok());
    }
}
