//! imaginary-adapter
//!
//! Translates friendly image URLs into imaginary calls.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────┐
//!                          │               IMAGINARY ADAPTER              │
//!     Client Request       │  ┌────────┐    ┌────────────┐    ┌────────┐  │
//!     GET /uploads/a.png   │  │ axum   │───▶│ translator │───▶│  URL   │  │
//!     ?method=fit&...   ───┼─▶│ server │    │ (validate) │    │ builder│  │
//!                          │  └────────┘    └─────┬──────┘    └───┬────┘  │
//!                          │                      │ 404 JSON      │       │
//!                          │                      ▼               ▼       │
//!     Client Response      │  ┌────────┐                   ┌───────────┐   │
//!     ◀────────────────────┼──│ stream │◀──────────────────│ forwarder │◀──┼── imaginary
//!                          │  └────────┘                   └───────────┘   │
//!                          └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use imaginary_adapter::config::load_config;
use imaginary_adapter::lifecycle::startup;
use imaginary_adapter::observability::logging;

#[derive(Parser)]
#[command(name = "imaginary-adapter")]
#[command(about = "HTTP adapter translating image requests into imaginary calls", long_about = None)]
struct Cli {
    /// Optional TOML configuration file. ADAPTER_* variables override it.
    #[arg(short, long, env = "ADAPTER_CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("imaginary-adapter: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.check {
        println!("configuration OK");
        return ExitCode::SUCCESS;
    }

    if let Err(e) = logging::init(&config.observability) {
        eprintln!("imaginary-adapter: failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.bind_address(),
        imaginary_host = %config.imaginary.host,
        file_path_prefix = %config.imaginary.file_path_prefix,
        default_type = %config.imaginary.default_type,
        "imaginary-adapter starting"
    );

    match startup::run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}
