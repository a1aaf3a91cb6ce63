use std::fs::File;

use penguinsurf::config::{Config, ConfigError};
use penguinsurf::doctor;
use penguinsurf::host::ConsoleHost;
use penguinsurf::router::Router;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    // Log to a file so stdout stays reserved for the listing
    let log_file = File::create(std::env::temp_dir().join("penguinsurf.log")).ok();

    if let Some(file) = log_file {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .with_ansi(false)
            .with_writer(file)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match Config::load() {
        Ok(config) => config,
        Err(ConfigError::NoConfigDir) => {
            warn!("no config directory on this platform, using defaults");
            Config::default()
        }
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.first().map(String::as_str) == Some("doctor") {
        let results = doctor::run_checks(&config).await;
        doctor::print_results(&results);
        return;
    }

    // Invoked like a media-center plugin: <plugin-url> <handle> <?query>
    let plugin_url = args
        .first()
        .cloned()
        .unwrap_or_else(|| config.addon.plugin_url());

    let handle = match args.get(1).map(|h| h.parse::<i32>()) {
        None => -1,
        Some(Ok(handle)) => handle,
        Some(Err(_)) => {
            eprintln!("Usage: penguinsurf [<plugin-url> <handle> [<?query>]] | doctor");
            std::process::exit(2);
        }
    };

    let query = args.get(2).map(String::as_str).unwrap_or_default();

    info!(plugin_url = %plugin_url, handle, query, "plugin invoked");

    let router = Router::from_config(&config, &plugin_url);
    let mut host = ConsoleHost::new(handle);
    router.route(&mut host, query).await;
}
