//! contact-relay
//!
//! HTTP relay for a portfolio contact form.
//!
//! ```text
//!   Browser form
//!       │  POST /contact (JSON)
//!       ▼
//!  ┌──────────────────────────────────────────────┐
//!  │ request id → trace → timeout → CORS → limit  │
//!  │        → [rate limit] → submit_contact       │
//!  │                    │                         │
//!  │           validate + normalize               │
//!  │                    │                         │
//!  │          ContactSink::deliver                │
//!  └────────────────────┼─────────────────────────┘
//!                       ▼
//!        MongoDB  |  SMTP mailbox  |  form API
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use contact_relay::config::{load_config, RelayConfig};
use contact_relay::delivery::MongoSink;
use contact_relay::lifecycle;
use contact_relay::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "contact-relay")]
#[command(about = "Contact form relay server", long_about = None)]
struct Cli {
    /// TOML config file; environment variables override it
    #[arg(short, long, env = "CONTACT_RELAY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API (default)
    Serve,
    /// Create or update the MongoDB collection, its validator and indexes
    InitDb,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("contact-relay: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        delivery = %config.delivery.kind,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::InitDb => init_db(config).await,
    }
}

async fn serve(config: RelayConfig) -> ExitCode {
    match lifecycle::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Relay stopped with an error");
            ExitCode::FAILURE
        }
    }
}

async fn init_db(config: RelayConfig) -> ExitCode {
    let sink = MongoSink::new(config.delivery.mongo);
    match sink.ensure_collection().await {
        Ok(()) => {
            tracing::info!("Contacts collection is ready");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Collection setup failed");
            ExitCode::from(2)
        }
    }
}
