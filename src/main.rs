//! mevzuat-mcp: MCP server for Turkish legislation from mevzuat.gov.tr
//!
//! Serves MCP over HTTP by default, or over stdio with `--stdio`.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use mevzuat_mcp::config::{self, Config};
use mevzuat_mcp::legislation::{LegislationClient, MevzuatClient, MevzuatClientConfig};
use mevzuat_mcp::mcp::auth::AuthGate;
use mevzuat_mcp::mcp::dispatcher::Dispatcher;
use mevzuat_mcp::mcp::server::{self, AppState};
use mevzuat_mcp::mcp::transport;

/// MCP server for Turkish legislation.
///
/// Exposes search, table-of-contents and content lookups against
/// mevzuat.gov.tr as MCP tools.
#[derive(Parser, Debug)]
#[command(name = "mevzuat-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,

    /// Serve MCP over stdin/stdout instead of HTTP
    #[arg(long)]
    stdio: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "info" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" | "warning" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber.
///
/// Logs always go to stderr; stdout is reserved for the stdio transport.
fn init_tracing(level: Level, log_file: Option<&Path>) -> std::io::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(())
}

/// Runs the configured transport until it stops.
async fn run(cfg: &Config, stdio: bool, client: Arc<dyn LegislationClient>) -> Result<(), String> {
    let dispatcher = Dispatcher::new(client);

    if stdio {
        return transport::serve_stdio(&dispatcher)
            .await
            .map_err(|e| e.to_string());
    }

    let auth = AuthGate::new(cfg.auth.api_key.clone(), cfg.auth.allowed_origin.clone());
    let state = Arc::new(AppState::new(dispatcher, auth));
    let app = server::router(state, &cfg.cors);

    server::serve(cfg.server.bind_addr(), app)
        .await
        .map_err(|e| e.to_string())
}

/// Entry point for the mevzuat-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    let config_path = args.config.as_deref();
    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if config_path.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!("\nConfig is read from: {}", default_path.display());
                    eprintln!("Create one based on config/example-config.json");
                }
            }
            return ExitCode::FAILURE;
        }
    };

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    if let Err(e) = init_tracing(log_level, cfg.logging.file.as_deref()) {
        eprintln!("Failed to open log file: {e}");
        return ExitCode::FAILURE;
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting mevzuat-mcp server"
    );

    if cfg.uses_placeholder_api_key() && !args.stdio {
        warn!("Using the placeholder API key; set MCP_API_KEY or auth.api_key");
    }
    if cfg.auth.allowed_origin.is_none() && !args.stdio {
        info!("No allowed origin configured; requests carrying an Origin header will be refused");
    }

    let client = match MevzuatClient::new(MevzuatClientConfig {
        base_url: cfg.upstream.base_url.clone(),
        timeout: cfg.upstream.timeout(),
    }) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to create upstream client");
            return ExitCode::FAILURE;
        }
    };

    info!(
        base_url = client.base_url(),
        timeout_secs = cfg.upstream.timeout_secs,
        "Upstream client ready"
    );

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let client: Arc<dyn LegislationClient> = Arc::new(client);
    let result = runtime.block_on(run(&cfg, args.stdio, client));

    // Closes any connections still held by the upstream client's pool.
    drop(runtime);

    match result {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
