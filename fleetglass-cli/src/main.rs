//! Fleetglass CLI
//!
//! Runs a manifest of glass-damage work item requests against the fleet
//! operations portal through a local WebDriver server.
//!
//! Usage:
//!   fleetglass vehicles.csv
//!   fleetglass vehicles.csv --headless --results outcomes.json

use anyhow::{bail, Context, Result};
use clap::Parser;
use fleetglass::login::{LoginFlow, LoginStatus, PortalLogin};
use fleetglass::webdriver::{self, WebDriverSettings};
use fleetglass::{manifest, BatchRunner, Credentials, WorkflowOutcome};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "fleetglass")]
#[command(about = "Create missing glass-damage work items for a fleet of vehicles")]
struct Cli {
    /// Manifest file with an MVA,DamageType,Location header
    input: PathBuf,

    /// WebDriver server to attach to
    #[arg(long, env = "WEBDRIVER_URL", default_value = "http://localhost:9515")]
    webdriver_url: String,

    /// URL of the fleet operations application
    #[arg(long, env = "FLEETGLASS_APP_URL")]
    app_url: String,

    /// Run the browser without a visible window
    #[arg(long)]
    headless: bool,

    /// Write per-MVA outcomes to this file as JSON
    #[arg(long)]
    results: Option<PathBuf>,
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stderr()))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();
    let cli = Cli::parse();

    let credentials = Credentials::from_env().context("incomplete login configuration")?;
    let requests = manifest::load_requests(&cli.input)
        .with_context(|| format!("cannot load manifest {}", cli.input.display()))?;
    if requests.is_empty() {
        bail!("manifest {} contains no vehicles", cli.input.display());
    }

    let settings = WebDriverSettings {
        server_url: cli.webdriver_url.clone(),
        app_url: cli.app_url.clone(),
        headless: cli.headless,
    };
    let session = webdriver::connect(&settings)
        .await
        .with_context(|| format!("cannot attach to WebDriver at {}", cli.webdriver_url))?;

    let result = run(&session, &credentials, &requests, cli.results.as_deref()).await;

    // The session is released exactly once, on both the success and the
    // error path.
    if let Err(e) = session.close().await {
        error!("[SESSION] close failed: {e}");
    }
    result
}

async fn run(
    session: &fleetglass::Session,
    credentials: &Credentials,
    requests: &[fleetglass::WorkItemRequest],
    results_path: Option<&std::path::Path>,
) -> Result<()> {
    match PortalLogin::new(session).login(credentials).await? {
        LoginStatus::Ok => {}
        LoginStatus::Rejected(reason) => bail!("login rejected: {reason}"),
    }

    let handler = fleetglass::handler_for("GLASS").context("no glass handler available")?;
    let outcomes = BatchRunner::new(session, handler).run(requests).await;
    summarize(&outcomes);

    if let Some(path) = results_path {
        let json = serde_json::to_string_pretty(&outcomes)?;
        std::fs::write(path, json)
            .with_context(|| format!("cannot write results to {}", path.display()))?;
        info!("[RESULTS] Outcomes written to {}", path.display());
    }

    // Per-MVA failures are reported in the summary only; a non-zero exit is
    // reserved for bootstrap errors (config, manifest, connect, login).
    Ok(())
}

fn summarize(outcomes: &[WorkflowOutcome]) {
    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    let skipped = outcomes.len() - succeeded - outcomes.iter().filter(|o| o.is_failure()).count();
    let failed = outcomes.iter().filter(|o| o.is_failure()).count();
    info!(
        "[SUMMARY] {} vehicle(s): {succeeded} succeeded, {skipped} skipped, {failed} failed",
        outcomes.len()
    );
    for outcome in outcomes.iter().filter(|o| o.is_failure()) {
        match outcome.reason {
            Some(reason) => error!("[SUMMARY] {} failed: {reason}", outcome.mva),
            None => error!("[SUMMARY] {} failed", outcome.mva),
        }
    }
}
