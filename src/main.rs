//! Crimewatch - a web dashboard for SQL analytics over crime records.

use crimewatch::cli::Cli;
use crimewatch::config::{Config, ConnectionConfig};
use crimewatch::dashboard::{self, AppState};
use crimewatch::db::{self, DatabaseClient, MockDatabaseClient};
use crimewatch::error::{DashboardError, Result};
use crimewatch::logging;
use crimewatch::registry::QueryRegistry;
use crimewatch::session::SessionStore;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e.message());
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Load configuration file
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let db: Box<dyn DatabaseClient> = if cli.mock_db {
        info!("Using mock database");
        Box::new(MockDatabaseClient::new())
    } else {
        let connection = resolve_connection(&cli, &config)?.ok_or_else(|| {
            DashboardError::config(
                "No database connection configured. \
                 Pass a connection string, set DATABASE_URL, or add one to the config file.",
            )
        })?;
        info!("Connecting to {}", connection.display_string());
        db::connect(&connection).await?
    };

    let bind = cli.bind.clone().unwrap_or_else(|| config.server.bind.clone());

    let state = AppState {
        db: Arc::from(db),
        registry: Arc::new(QueryRegistry::with_defaults()),
        sessions: Arc::new(SessionStore::new()),
    };

    let app = dashboard::router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .map_err(|e| DashboardError::config(format!("Cannot bind {bind}: {e}")))?;

    info!("Dashboard listening on http://{bind}/dashboard");

    axum::serve(listener, app)
        .await
        .map_err(|e| DashboardError::internal(e.to_string()))
}

/// Resolves the final connection configuration.
///
/// Precedence: CLI arguments, then a named connection from the config, then
/// the default connection from the config, then `DATABASE_URL`, with `PG*`
/// environment variables filling remaining gaps.
fn resolve_connection(cli: &Cli, config: &Config) -> Result<Option<ConnectionConfig>> {
    let mut connection = cli.to_connection_config()?;

    if connection.is_none() {
        if let Some(name) = cli.connection_name() {
            connection = config.get_connection(Some(name)).cloned();
            if connection.is_none() {
                return Err(DashboardError::config(format!(
                    "Connection '{}' not found in config file",
                    name
                )));
            }
        }
    }

    if connection.is_none() {
        connection = config.get_connection(None).cloned();
    }

    if connection.is_none() {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            connection = Some(ConnectionConfig::from_connection_string(&url)?);
        }
    }

    // Apply environment variable defaults
    if let Some(ref mut conn) = connection {
        conn.apply_env_defaults();
    }

    Ok(connection)
}
