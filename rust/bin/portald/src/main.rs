//! `portald` — the captive-portal voucher server binary.
//!
//! Usage:
//!   portald -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/portald/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod bootstrap;
mod config;
mod routes;

use clap::Parser;
use portal_core::Module;
use tracing::info;

use config::ServerConfig;

/// Captive-portal voucher server.
#[derive(Parser, Debug)]
#[command(name = "portald", about = "Captive-portal voucher server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides the config file).
    #[arg(long = "listen")]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    // Verify configuration is valid.
    bootstrap::verify_config(&server_config)?;

    let listen = cli
        .listen
        .or_else(|| server_config.listen.clone())
        .unwrap_or_else(|| "0.0.0.0:8080".to_string());

    // Initialize storage.
    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let core_config = portal_core::ServiceConfig {
        data_dir: Some(data_dir),
        listen: listen.clone(),
        ..Default::default()
    };

    let sql: Box<dyn portal_sql::SQLStore> = Box::new(
        portal_sql::SqliteStore::open(&core_config.resolve_sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    // Initialize the vouchers module.
    let voucher_service = portal_vouchers::service::VoucherService::new(sql)
        .map_err(|e| anyhow::anyhow!("failed to initialize voucher service: {}", e))?;
    let vouchers_module = portal_vouchers::VouchersModule::new(voucher_service);
    info!("Vouchers module initialized");

    let portal_routes = vouchers_module.portal_routes();
    let module_routes = vec![(vouchers_module.name(), vouchers_module.routes())];

    // Build router.
    let app = routes::build_router(module_routes, portal_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    info!("portald listening on {}", listen);
    axum::serve(listener, app).await?;

    Ok(())
}
