//! likecast - Like tweets without tripping over the rate limit

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use liblikecast::classify::format_reset_time;
use liblikecast::config::CredentialOverrides;
use liblikecast::countdown::{format_clock, format_wait, CancelFlag, Countdown, CountdownOutcome};
use liblikecast::gate::PasswordGate;
use liblikecast::logging::LoggingConfig;
use liblikecast::{
    ActionOutcome, ActionService, AuthSession, CapacityStatus, Config, ErrorKind, LikecastError,
    RateLimitTracker, Result,
};
use zeroize::Zeroizing;

#[derive(Parser, Debug)]
#[command(name = "likecast")]
#[command(version)]
#[command(about = "Like tweets through the Twitter API with rate-limit awareness")]
#[command(long_about = "\
likecast - Like tweets through the Twitter API with rate-limit awareness

DESCRIPTION:
    likecast authenticates with your Twitter credentials, checks that each
    tweet exists, and likes it. When Twitter refuses a request because the
    rate limit is exhausted, likecast reports when the window resets and can
    wait for it with a live countdown.

USAGE:
    # Check which account the credentials belong to
    likecast whoami

    # Show a tweet before liking it
    likecast preview 1460323737035677698

    # Like several tweets, waiting out any rate limit and retrying once
    likecast like 1460323737035677698 1460323737035677699 --wait --retry

    # JSON output for scripting
    likecast --format json like 1460323737035677698 | jq '.results[].liked'

CONFIGURATION:
    Configuration file: ~/.config/likecast/config.toml (or $LIKECAST_CONFIG)

    [app]
    password = \"...\"       # optional shared password

    [twitter]
    bearer_token = \"...\"   # flags and TWITTER_* env vars override these
    api_key = \"...\"
    api_secret = \"...\"
    access_token = \"...\"
    access_secret = \"...\"

    [limits]
    quota = 50             # likes per window
    window_secs = 86400
    fallback_retry_secs = 180

EXIT CODES:
    0 - Success
    1 - Remote or configuration error
    2 - Authentication or password failure
    3 - Invalid input (bad tweet id, missing credentials)
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file
    #[arg(long, global = true, env = "LIKECAST_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Shared password, if the configuration sets one (prompted otherwise)
    #[arg(long, global = true, env = "LIKECAST_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// App bearer token used for tweet lookups
    #[arg(long, global = true, env = "TWITTER_BEARER_TOKEN", hide_env_values = true)]
    bearer_token: Option<String>,

    /// OAuth consumer key
    #[arg(long, global = true, env = "TWITTER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// OAuth consumer secret
    #[arg(long, global = true, env = "TWITTER_API_SECRET", hide_env_values = true)]
    api_secret: Option<String>,

    /// OAuth user access token
    #[arg(long, global = true, env = "TWITTER_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// OAuth user access token secret
    #[arg(long, global = true, env = "TWITTER_ACCESS_SECRET", hide_env_values = true)]
    access_secret: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "text", value_name = "FORMAT")]
    #[arg(value_parser = ["text", "json"])]
    format: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Authenticate and show the account the credentials belong to
    Whoami,

    /// Check that a tweet exists and show a preview of it
    Preview {
        /// Tweet id
        tweet_id: String,
    },

    /// Like one or more tweets, in order
    Like {
        /// Tweet ids
        #[arg(required = true)]
        tweet_ids: Vec<String>,

        /// On a rate limit, count down until the window resets
        #[arg(long)]
        wait: bool,

        /// After a completed countdown, try the same tweet once more
        #[arg(long, requires = "wait")]
        retry: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env(cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(mut cli: Cli) -> Result<()> {
    if let Commands::Preview { tweet_id } = &cli.command {
        validate_tweet_id(tweet_id)?;
    }
    if let Commands::Like { tweet_ids, .. } = &cli.command {
        tweet_ids.iter().try_for_each(|id| validate_tweet_id(id))?;
    }

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    let gate = PasswordGate::new(config.gate_password());
    let given = take_password(&mut cli);
    let attempt = read_password(&gate, given)?;
    gate.check(attempt.as_deref().map(String::as_str))?;

    let credentials = config.twitter.credentials(CredentialOverrides {
        bearer_token: cli.bearer_token.take(),
        api_key: cli.api_key.take(),
        api_secret: cli.api_secret.take(),
        access_token: cli.access_token.take(),
        access_secret: cli.access_secret.take(),
    });
    let missing = credentials.missing_fields();
    if !missing.is_empty() {
        return Err(LikecastError::InvalidInput(format!(
            "Missing Twitter credentials: {}",
            missing.join(", ")
        )));
    }

    let session = AuthSession::authenticate(credentials, &config.twitter).await?;
    let service = ActionService::from_config(&config);
    let json = cli.format == "json";

    match cli.command {
        Commands::Whoami => {
            let identity = session.identity();
            if json {
                print_json(&serde_json::json!(identity));
            } else {
                println!("@{} ({})", identity.username, identity.id);
            }
            Ok(())
        }
        Commands::Preview { tweet_id } => {
            let summary = service.preview(Some(&session), &tweet_id).await?;
            if json {
                print_json(&serde_json::json!(summary));
            } else {
                println!("Tweet {}:\n{}", summary.id, summary.preview);
            }
            Ok(())
        }
        Commands::Like {
            tweet_ids,
            wait,
            retry,
        } => {
            let options = LikeOptions { wait, retry, json };
            like_all(&service, &session, &tweet_ids, options).await
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LikeOptions {
    wait: bool,
    retry: bool,
    json: bool,
}

/// Like each id through one session and tracker, reporting every outcome
///
/// Stops early if a countdown is cancelled. Returns the last failure so the
/// exit code reflects it.
async fn like_all(
    service: &ActionService,
    session: &AuthSession,
    tweet_ids: &[String],
    options: LikeOptions,
) -> Result<()> {
    let mut tracker = service.tracker();
    let mut results = Vec::with_capacity(tweet_ids.len());
    let mut last_failure = None;

    for tweet_id in tweet_ids {
        let (outcome, cancelled) = like_one(service, session, &mut tracker, tweet_id, options).await;

        if !options.json {
            report_outcome(tweet_id, &outcome);
        }
        results.push(outcome_json(tweet_id, &outcome));
        if let ActionOutcome::Failed { kind, .. } = outcome {
            last_failure = Some(kind);
        }

        if cancelled {
            tracing::info!("Countdown cancelled, skipping remaining tweets");
            break;
        }
    }

    let status = service.status(&mut tracker, now());
    if options.json {
        print_json(&serde_json::json!({
            "results": results,
            "status": status,
        }));
    } else {
        report_status(&status);
    }

    match last_failure {
        Some(kind) => Err(LikecastError::Action(kind)),
        None => Ok(()),
    }
}

/// Returns the final outcome and whether a countdown was cancelled
async fn like_one(
    service: &ActionService,
    session: &AuthSession,
    tracker: &mut RateLimitTracker,
    tweet_id: &str,
    options: LikeOptions,
) -> (ActionOutcome, bool) {
    let outcome = service.like(Some(session), tracker, tweet_id, now()).await;

    let Some(ErrorKind::RateLimited { reset_at, .. }) = outcome.error_kind().cloned() else {
        return (outcome, false);
    };
    if !options.wait {
        return (outcome, false);
    }

    if !options.json {
        eprintln!("{}", failure_message(&outcome));
    }
    match wait_for_reset(reset_at).await {
        CountdownOutcome::Cancelled => (outcome, true),
        CountdownOutcome::Completed if options.retry => {
            tracing::info!("Retrying like of {}", tweet_id);
            (service.like(Some(session), tracker, tweet_id, now()).await, false)
        }
        CountdownOutcome::Completed => (outcome, false),
    }
}

/// Count down to `reset_at` on stderr; Ctrl-C cancels
async fn wait_for_reset(reset_at: i64) -> CountdownOutcome {
    let cancel = CancelFlag::new();
    let trigger = cancel.clone();
    let listener = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    let countdown = Countdown::until(reset_at, now());
    eprintln!(
        "Waiting {} for the rate limit to reset at {} (Ctrl-C to stop)",
        format_wait(countdown.total_secs()),
        format_reset_time(reset_at)
    );

    let outcome = countdown
        .run(
            |remaining| eprint!("\rTime remaining: {}", format_clock(remaining)),
            || cancel.is_cancelled(),
        )
        .await;
    eprintln!();
    listener.abort();

    if outcome == CountdownOutcome::Cancelled {
        eprintln!("Countdown cancelled");
    }
    outcome
}

/// Move the `--password` value out of the parsed arguments
fn take_password(cli: &mut Cli) -> Option<Zeroizing<String>> {
    cli.password.take().map(Zeroizing::new)
}

fn read_password(
    gate: &PasswordGate,
    given: Option<Zeroizing<String>>,
) -> Result<Option<Zeroizing<String>>> {
    if gate.is_open() {
        return Ok(None);
    }
    if given.is_some() {
        return Ok(given);
    }
    if !std::io::stdin().is_terminal() {
        return Ok(None);
    }

    rpassword::prompt_password("Password: ")
        .map(|p| Some(Zeroizing::new(p)))
        .map_err(|e| LikecastError::Gate(format!("Failed to read password: {}", e)))
}

/// Tweet ids are decimal snowflakes
fn validate_tweet_id(tweet_id: &str) -> Result<()> {
    if tweet_id.is_empty() || !tweet_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(LikecastError::InvalidInput(format!(
            "Invalid tweet ID '{}': expected digits only",
            tweet_id
        )));
    }
    Ok(())
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn report_outcome(tweet_id: &str, outcome: &ActionOutcome) {
    match outcome {
        ActionOutcome::Liked { .. } => println!("Liked tweet {}", tweet_id),
        ActionOutcome::Failed { .. } => eprintln!("{}", failure_message(outcome)),
    }
}

fn failure_message(outcome: &ActionOutcome) -> &str {
    match outcome {
        ActionOutcome::Failed { message, .. } => message.as_str(),
        ActionOutcome::Liked { .. } => "",
    }
}

fn report_status(status: &CapacityStatus) {
    match status.span_secs {
        Some(span) => eprintln!(
            "{} like(s) in the last {}; about {:.0} remaining in the current window",
            status.recent_count,
            format_wait(span.max(0) as u64),
            status.estimated_remaining
        ),
        None => eprintln!(
            "No recent likes; about {:.0} remaining in the current window",
            status.estimated_remaining
        ),
    }
    if let Some(window) = status.active_limit {
        eprintln!(
            "Rate limited until {} ({}s)",
            format_reset_time(window.reset_at),
            window.retry_after_secs
        );
    }
}

fn outcome_json(tweet_id: &str, outcome: &ActionOutcome) -> serde_json::Value {
    match outcome {
        ActionOutcome::Liked { response } => serde_json::json!({
            "tweet_id": tweet_id,
            "liked": response.liked,
            "response": response.raw,
        }),
        ActionOutcome::Failed { kind, message } => {
            let mut value = serde_json::json!({
                "tweet_id": tweet_id,
                "liked": false,
                "error": kind_label(kind),
                "message": message,
            });
            if let ErrorKind::RateLimited {
                reset_at,
                retry_after_secs,
            } = kind
            {
                value["reset_at"] = serde_json::json!(reset_at);
                value["retry_after_secs"] = serde_json::json!(retry_after_secs);
            }
            value
        }
    }
}

fn kind_label(kind: &ErrorKind) -> &'static str {
    match kind {
        ErrorKind::NotAuthenticated => "not_authenticated",
        ErrorKind::TargetNotFound => "target_not_found",
        ErrorKind::RateLimited { .. } => "rate_limited",
        ErrorKind::Unauthorized => "unauthorized",
        ErrorKind::Forbidden => "forbidden",
        ErrorKind::Transport { .. } => "transport",
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => tracing::error!("Failed to render JSON output: {}", e),
    }
}
