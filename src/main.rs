use clap::Parser;
use std::future::IntoFuture;
use std::panic::{self, PanicHookInfo};
use std::sync::Arc;
use switchbot_exporter::app::{self, BluerScanner};
use switchbot_exporter::metrics::{self, Exporter, MetricsState};
use switchbot_exporter::store::DeviceStateStore;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Exit codes for the application
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_PANIC: i32 = 2;

#[derive(Parser, Debug)]
#[command(author, about, version)]
struct Options {
    /// Address for the Prometheus scrape endpoint.
    #[arg(long, default_value = "0.0.0.0:2112")]
    listen_address: String,

    /// Verbose output, log rejected payloads at debug level
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

/// Errors that terminate the process. All of these occur at startup or when
/// the HTTP server dies; nothing in the decode pipeline is fatal.
#[derive(Error, Debug)]
enum MainError {
    #[error(transparent)]
    Run(#[from] app::RunError),
    #[error("metrics setup failed: {0}")]
    Metrics(#[from] prometheus::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Wire the store, the scrape endpoint and the scan consumer together, then
/// run until one of them finishes or a shutdown signal arrives.
async fn run(options: Options) -> Result<(), MainError> {
    let store = Arc::new(DeviceStateStore::new());
    let exporter = Arc::new(Exporter::new()?);

    let router = metrics::router(MetricsState {
        store: Arc::clone(&store),
        exporter,
    });
    let listener = tokio::net::TcpListener::bind(&options.listen_address).await?;
    info!(address = %options.listen_address, "serving metrics");

    let scanner = BluerScanner;

    tokio::select! {
        result = app::run(&scanner, Arc::clone(&store)) => result?,
        result = axum::serve(listener, router).into_future() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("received shutdown signal");
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Set up panic hook to ensure clean exit codes for process managers
    // (e.g., systemd) that monitor exit status
    panic::set_hook(Box::new(move |info: &PanicHookInfo| {
        eprintln!("Panic! {}", info);
        std::process::exit(EXIT_PANIC);
    }));

    let options = Options::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if options.verbose { "debug" } else { "info" })
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(options).await {
        Ok(_) => std::process::exit(EXIT_SUCCESS),
        Err(why) => {
            eprintln!("error: {}", why);
            std::process::exit(EXIT_ERROR);
        }
    }
}
