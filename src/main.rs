//! Table Checker - Main entry point.
//!
//! Serves schema snapshots over HTTP, over line-delimited proxy events on
//! stdio, or prints a one-shot report.

use clap::Parser;
use std::sync::Arc;
use table_checker::api::{RequestRouter, Responder};
use table_checker::config::{Config, RunMode};
use table_checker::db::{SchemaInspector, SqlxConnectionProvider};
use table_checker::report::render_report;
use table_checker::transport::{HttpTransport, StdioTransport, Transport};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr so stdout stays reserved for responses and reports.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse();

    // Initialize logging
    init_tracing(&config);

    let params = match config.connection_params() {
        Ok(params) => params,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("Usage: table-checker --db-host <HOST> --db-name <NAME> --db-user <USER>");
            eprintln!("       table-checker --db-backend sqlite --db-name <PATH>");
            eprintln!();
            eprintln!("The password is read from TC_DB_PASSWORD or from the file named by");
            eprintln!("TC_DB_PASSWORD_FILE.");
            eprintln!();
            eprintln!("Examples:");
            eprintln!("  TC_DB_PASSWORD=... table-checker --db-host localhost --db-name app --db-user app");
            eprintln!("  table-checker --mode report --db-backend sqlite --db-name data.db");
            eprintln!("  table-checker --mode stdio --db-backend mysql --db-host localhost --db-name sales --db-user root");
            std::process::exit(1);
        }
    };

    info!(
        mode = %config.mode,
        backend = %params.db_type,
        target = %params.target(),
        "Starting table checker v{}",
        env!("CARGO_PKG_VERSION")
    );

    let provider = SqlxConnectionProvider::new(params);

    let result = match config.mode {
        RunMode::Report => match SchemaInspector::read_schema(&provider).await {
            Ok(snapshot) => {
                print!("{}", render_report(&snapshot));
                Ok(())
            }
            Err(e) => Err(e),
        },
        RunMode::Http => {
            let responder = Arc::new(Responder::new(
                RequestRouter::new(config.stage()),
                provider,
            ));
            info!(
                host = %config.http_host,
                port = config.http_port,
                "Using HTTP transport"
            );
            let transport = HttpTransport::new(responder, &config.http_host, config.http_port);
            transport.run().await
        }
        RunMode::Stdio => {
            let responder = Arc::new(Responder::new(
                RequestRouter::new(config.stage()),
                provider,
            ));
            info!("Using stdio transport");
            StdioTransport::new(responder).run().await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Table checker failed");
        return Err(e.into());
    }

    info!("Shutdown complete");
    Ok(())
}
