mod config;
mod context;
mod platform;
mod reconcile;
mod report;
mod source;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::{debug, info, info_span, Instrument};
use tracing_subscriber::EnvFilter;

use config::{Config, ConfigError};
use context::{ContextError, EventPayload, Inputs};
use platform::{HerokuClient, Platform, PlatformError};
use reconcile::Reconciler;
use report::{Outcome, Reporter};
use source::{GitHubClient, SourceControl, SourceError};

/// Review Apps: create, update or destroy the Heroku review app of the
/// pull request that triggered the current CI run.
#[derive(Parser, Debug)]
#[command(name = "review-apps", version, about)]
struct Cli {
    /// Lifecycle step: create, update or destroy. Anything else is a no-op.
    #[arg(long, env = "INPUT_ACTION", default_value = "")]
    action: String,

    /// Heroku pipeline the review apps belong to
    #[arg(long, env = "HEROKU_PIPELINE_ID")]
    pipeline: Option<String>,

    /// Path to the pull_request event payload written by the runner
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf>,

    /// Config file (defaults to .review-apps.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Exit non-zero when the action fails
    #[arg(long)]
    fail_on_error: bool,
}

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

#[tokio::main]
async fn main() -> ExitCode {
    let runner_debug = std::env::var("RUNNER_DEBUG").is_ok_and(|v| v == "1");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(if runner_debug { "debug" } else { "info" })),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let reporter = Reporter::new(std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true"));

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            reporter.error("Failed to load configuration", Some(&err));
            return ExitCode::from(u8::from(cli.fail_on_error));
        }
    };
    let fail_on_error = cli.fail_on_error || config.fail_on_error();

    let span = info_span!("review_app", action = %cli.action);
    let outcome = match run(&cli, &config, &reporter).instrument(span).await {
        Ok(outcome) => outcome,
        Err(err) => {
            reporter.error("Review app action aborted", Some(&err));
            return ExitCode::from(u8::from(fail_on_error));
        }
    };

    report::print_summary(&outcome);
    info!(
        outcome = %outcome,
        annotations = reporter.emitted().len(),
        "done"
    );
    ExitCode::from(report::exit_status(&outcome, fail_on_error))
}

async fn run(cli: &Cli, config: &Config, reporter: &Reporter) -> Result<Outcome, RunError> {
    let event_path = cli
        .event_path
        .as_deref()
        .ok_or(ContextError::MissingEventPath)?;
    debug!(path = %event_path.display(), "reading event payload");
    let event = context::load_event(event_path)?;

    let inputs = Inputs {
        action: cli.action.clone(),
        pipeline_id: cli
            .pipeline
            .clone()
            .or_else(|| config.heroku.pipeline_id.clone()),
        repository: std::env::var("GITHUB_REPOSITORY").ok(),
    };

    execute(
        &event,
        &inputs,
        reporter,
        || HerokuClient::from_config(config),
        || {
            config
                .github_token()
                .map(|token| GitHubClient::new(config.github_api_url(), token))
                .transpose()
        },
    )
    .await
}

/// Context, then client construction, then reconciliation. Forks stop
/// before either client is built. `connect_source` yields `None` when no
/// GitHub token is configured.
async fn execute<P, S, F, G>(
    event: &EventPayload,
    inputs: &Inputs,
    reporter: &Reporter,
    connect: F,
    connect_source: G,
) -> Result<Outcome, RunError>
where
    P: Platform,
    S: SourceControl,
    F: FnOnce() -> Result<P, PlatformError>,
    G: FnOnce() -> Result<Option<S>, SourceError>,
{
    let Some(context) = context::extract(event, inputs)? else {
        return Ok(Outcome::SkippedFork);
    };

    debug!("connecting to heroku");
    let platform = connect()?;
    let source = connect_source()?;
    let source = source.as_ref().map(|client| client as &dyn SourceControl);

    Ok(Reconciler::new(&context, &platform, source, reporter)
        .reconcile()
        .await)
}
