//! MCare CLI server
//!
//! ```sh
//! # Run with default config (~/.config/mcare/config.toml)
//! mcare-service
//!
//! # Custom config path
//! mcare-service --config /etc/mcare/config.toml
//!
//! # Validate config without starting
//! mcare-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use mcare::config::AppConfig;
use mcare::server::{init_tracing, ServerHandle, ServerOptions};

/// MCare: student duty scheduling and QR attendance backend.
#[derive(Parser, Debug)]
#[command(
    name = "mcare-service",
    version,
    about = "Student duty scheduling and QR attendance backend",
    long_about = "MCare REST API server: groups, duty schedules with e-mail \
                  notifications, daily duty reminders and QR attendance.\n\n\
                  Default config: ~/.config/mcare/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "MCARE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Skip seeding the default admin user.
    #[arg(long)]
    no_admin: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(mcare::default_config_path);

    let mut config = AppConfig::load_or_default(&config_path)?;
    config.apply_env_overrides();

    if let Some(port) = cli.api_port {
        config.server.api_port = port;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    config.validate()?;

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}:{}", config.server.api_host, config.server.api_port);
        println!("   Database    : {}", config.database.connection_url());
        println!("   Mail        : {}", if config.mail.enabled { "smtp" } else { "log only" });
        println!(
            "   Reminders   : {}",
            if config.reminder.enabled { config.reminder.time.as_str() } else { "disabled" }
        );
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        create_default_admin: !cli.no_admin,
    })
    .await?;

    handle.install_signal_handler();
    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
