use crate::archive::{ArchiveClient, StreamSource};
use crate::config::{ArchiveMode, Config};
use crate::tmdb::TmdbClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckStatus {
    /// ANSI colour and glyph for the status
    fn marker(self) -> (&'static str, &'static str) {
        match self {
            CheckStatus::Ok => ("\x1b[32m", "✓"),
            CheckStatus::Warning => ("\x1b[33m", "⚠"),
            CheckStatus::Error => ("\x1b[31m", "✗"),
        }
    }
}

#[derive(Debug)]
pub struct CheckResult {
    pub name: &'static str,
    pub status: CheckStatus,
    pub message: String,
}

fn check(status: CheckStatus, name: &'static str, message: impl Into<String>) -> CheckResult {
    CheckResult {
        name,
        status,
        message: message.into(),
    }
}

pub async fn run_checks(config: &Config) -> Vec<CheckResult> {
    vec![
        check_config(),
        check_tmdb(config).await,
        check_archive(config).await,
        check_region(config),
    ]
}

fn check_config() -> CheckResult {
    match Config::config_path() {
        Ok(path) if path.exists() => check(
            CheckStatus::Ok,
            "Config",
            format!("Loaded from {}", path.display()),
        ),
        Ok(path) => check(
            CheckStatus::Warning,
            "Config",
            format!("No file at {}, using defaults", path.display()),
        ),
        Err(e) => check(CheckStatus::Warning, "Config", format!("{}, using defaults", e)),
    }
}

async fn check_tmdb(config: &Config) -> CheckResult {
    let tmdb = config.tmdb();

    let Some(client) = TmdbClient::with_base_url(tmdb.apikey.as_deref(), &tmdb.base_url) else {
        return check(
            CheckStatus::Warning,
            "TMDB",
            "No API key configured. Serving the built-in catalog.",
        );
    };

    match client.get_popular_movies().await {
        Ok(_) => check(CheckStatus::Ok, "TMDB", "API key valid"),
        Err(e) => check(CheckStatus::Error, "TMDB", format!("API error: {}", e)),
    }
}

async fn check_archive(config: &Config) -> CheckResult {
    if config.archive.mode == ArchiveMode::Canned {
        return check(CheckStatus::Ok, "Archive", "Using the built-in stream table");
    }

    let client = ArchiveClient::with_base_url(&config.archive.base_url);

    match client.search("Night of the Living Dead").await {
        Ok(Some(_)) => check(
            CheckStatus::Ok,
            "Archive",
            format!("Search working at {}", client.base_url()),
        ),
        Ok(None) => check(
            CheckStatus::Warning,
            "Archive",
            "Connected but search returned nothing",
        ),
        Err(e) => check(CheckStatus::Error, "Archive", format!("Connection failed: {}", e)),
    }
}

fn check_region(config: &Config) -> CheckResult {
    let region = &config.region;

    if region.restricted_host == region.proxy_host {
        return check(
            CheckStatus::Warning,
            "Region",
            "Proxy host equals restricted host, bypass is a no-op",
        );
    }

    check(
        CheckStatus::Ok,
        "Region",
        format!("{} -> {}", region.restricted_host, region.proxy_host),
    )
}

/// One-line verdict printed under the check list
fn summary(results: &[CheckResult]) -> String {
    let count = |status| results.iter().filter(|r| r.status == status).count();

    match (count(CheckStatus::Error), count(CheckStatus::Warning)) {
        (0, 0) => "all checks passed".to_string(),
        (0, warnings) => format!("{} warning(s), the addon runs with reduced features", warnings),
        (errors, warnings) => format!("{} error(s), {} warning(s)", errors, warnings),
    }
}

pub fn print_results(results: &[CheckResult]) {
    println!("penguinsurf doctor");

    for result in results {
        let (color, glyph) = result.status.marker();
        println!(
            "  {}{} {:<8}\x1b[0m {}",
            color, glyph, result.name, result.message
        );
    }

    println!("\n  {}", summary(results));
}
