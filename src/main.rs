//! Sitedash - single-document site content dashboard
//!
//! One binary, two roles: `serve` runs the REST API over SQLite, and
//! `dashboard` (the default) opens the desktop editor against that API.

mod app;
mod core;
mod server;
mod store;
mod sync;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use app::SiteDashApp;
use clap::{Parser, Subcommand};
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::core::config::{AppConfig, Environment, ServerConfig};

/// Sitedash site content dashboard
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Open the desktop dashboard
    #[command(visible_alias = "d")]
    Dashboard {
        /// REST API base URL, including the /api prefix
        #[arg(long, env = "SITEDASH_API_BASE_URL")]
        api_url: Option<String>,
    },

    /// Run the REST API server
    #[command(visible_alias = "s")]
    Serve {
        /// Port number to listen on
        #[arg(short, long, env = "PORT", default_value_t = ServerConfig::DEFAULT_PORT)]
        port: u16,

        /// SQLite database file
        #[arg(long, env = "DATABASE_PATH", value_hint = clap::ValueHint::FilePath)]
        database: Option<PathBuf>,

        /// Origin allowed to call the API from a browser
        #[arg(long, env = "FRONTEND_URL", default_value = ServerConfig::DEFAULT_ALLOWED_ORIGIN)]
        frontend_url: String,

        /// Deployment mode; development includes error details in responses
        #[arg(long = "env", env = "SITEDASH_ENV", value_enum, default_value_t = Environment::Production)]
        environment: Environment,
    },
}

fn server_config(
    port: u16,
    database: Option<PathBuf>,
    frontend_url: String,
    environment: Environment,
) -> ServerConfig {
    ServerConfig {
        port,
        database: database.unwrap_or_else(ServerConfig::default_database),
        allowed_origin: frontend_url,
        environment,
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Dashboard { api_url: None }) {
        Commands::Serve {
            port,
            database,
            frontend_url,
            environment,
        } => {
            let config = server_config(port, database, frontend_url, environment);
            tracing::info!("Starting Sitedash API server ({:?})...", config.environment);
            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            runtime.block_on(server::serve(config))
        }
        Commands::Dashboard { api_url } => run_dashboard(api_url),
    }
}

fn run_dashboard(api_url: Option<String>) -> Result<()> {
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Using default settings: {}", e);
        AppConfig::default()
    });
    if let Some(url) = api_url {
        config.api_base_url = url;
    }

    tracing::info!("Starting Sitedash dashboard...");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Sitedash"),
        ..Default::default()
    };

    eframe::run_native(
        "Sitedash",
        native_options,
        Box::new(|cc| Ok(Box::new(SiteDashApp::new(cc, config)?))),
    )
    .map_err(|e| anyhow::anyhow!("Dashboard failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_dashboard() {
        let cli = Cli::try_parse_from(["sitedash"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["sitedash", "serve"]).unwrap();
        let Some(Commands::Serve {
            port, frontend_url, ..
        }) = cli.command
        else {
            panic!("expected serve");
        };
        // PORT / FRONTEND_URL may be set in the test environment
        if std::env::var_os("PORT").is_none() {
            assert_eq!(port, 5000);
        }
        if std::env::var_os("FRONTEND_URL").is_none() {
            assert_eq!(frontend_url, "http://localhost:5173");
        }
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from([
            "sitedash",
            "serve",
            "--port",
            "8080",
            "--database",
            "/tmp/site.db",
            "--frontend-url",
            "https://admin.example.org",
            "--env",
            "development",
        ])
        .unwrap();

        let Some(Commands::Serve {
            port,
            database,
            frontend_url,
            environment,
        }) = cli.command
        else {
            panic!("expected serve");
        };
        let config = server_config(port, database, frontend_url, environment);
        assert_eq!(config.port, 8080);
        assert_eq!(config.database, PathBuf::from("/tmp/site.db"));
        assert_eq!(config.allowed_origin, "https://admin.example.org");
        assert!(config.expose_errors());
    }
}
