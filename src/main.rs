//! Park-Eazy server
//!
//! ```sh
//! # Run with default config (~/.config/park-eazy/config.toml)
//! park-eazy
//!
//! # Custom config path, in-memory store
//! park-eazy --config ./dev.toml --database-url memory
//!
//! # Validate config without starting
//! park-eazy --check
//!
//! # Mint a development token for the configured admin identity
//! park-eazy token --role super-admin
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};

use park_eazy::config::{resolve_config_path, AppConfig};
use park_eazy::domain::user::UserRole;
use park_eazy::infrastructure::crypto::jwt::create_token;
use park_eazy::server::{init_tracing, ServerHandle, ServerOptions};

/// Park-Eazy: parking slot search, reservation and checkout.
#[derive(Parser, Debug)]
#[command(
    name = "park-eazy",
    version,
    about = "Parking reservation service",
    long_about = "Park-Eazy REST + WebSocket server for parking slot search, \
                  reservations and checkout.\n\n\
                  Default config: ~/.config/park-eazy/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "PARK_EAZY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the database URL (`memory` for the in-process store).
    #[arg(long)]
    database_url: Option<String>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a signed session token for the configured admin identity.
    Token {
        #[arg(long, value_enum, default_value_t = RoleArg::SuperAdmin)]
        role: RoleArg,
    },
    /// Write the effective configuration to the config path.
    InitConfig,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RoleArg {
    User,
    Admin,
    SuperAdmin,
}

impl From<RoleArg> for UserRole {
    fn from(r: RoleArg) -> Self {
        match r {
            RoleArg::User => UserRole::User,
            RoleArg::Admin => UserRole::Admin,
            RoleArg::SuperAdmin => UserRole::SuperAdmin,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.clone().unwrap_or_else(resolve_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config from {}: {}", config_path.display(), e);
            if cli.check {
                return Err(e.into());
            }
            error!("Using default configuration.");
            AppConfig::default()
        }
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.port {
        info!(port, "CLI override: server.port");
        config.server.port = port;
    }
    if let Some(url) = cli.database_url {
        info!(url = %url, "CLI override: database.url");
        config.database.url = url;
    }
    if let Some(level) = cli.log_level {
        info!(level = %level, "CLI override: logging.level");
        config.logging.level = level;
    }

    match cli.command {
        Some(Command::Token { role }) => {
            let user = config.admin_user(role.into());
            println!("{}", create_token(&user, &config.jwt_config())?);
            return Ok(());
        }
        Some(Command::InitConfig) => {
            config.save(&config_path)?;
            println!("Configuration written to {}", config_path.display());
            return Ok(());
        }
        None => {}
    }

    if cli.check {
        config.validate()?;
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Address     : {}", config.listen_address());
        println!("   Database    : {}", config.database.url);
        println!("   Currency    : {} ({})", config.currency.code, config.currency.symbol);
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
