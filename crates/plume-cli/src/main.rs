//! plume: command-line front end for note generation and critique.
//!
//! Every command runs one fresh session: the quota starts full and nothing
//! is kept after the process exits. Results go to stdout as JSON, logs go to
//! stderr.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use plume_core::{Attachment, CritiqueRequest, Error, GenerationRequest, Goal, Purpose, Tone};
use plume_inference::{GeminiBackend, Orchestrator};

#[derive(Parser)]
#[command(name = "plume")]
#[command(author, version, about = "Xiaohongshu note generation and critique")]
#[command(propagate_version = true)]
struct Cli {
    /// Give up on the request after this many seconds (not charged)
    #[arg(long, global = true, env = "PLUME_DEADLINE_SECS")]
    deadline_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate two alternative notes from product images and key points
    Generate {
        /// Marketing goal: growth, sales, traffic, brand-exposure
        #[arg(short, long, default_value = "growth")]
        goal: Goal,

        /// Tone: authentic, emotional, professional, humorous, minimal
        #[arg(short, long, default_value = "authentic")]
        tone: Tone,

        /// Selling points the copy must mention
        #[arg(short, long)]
        key_points: String,

        /// Existing draft to build on
        #[arg(short, long)]
        draft: Option<String>,

        /// Brand or company background
        #[arg(long, conflicts_with = "brand_file")]
        brand: Option<String>,

        /// Read the brand background from a file
        #[arg(long)]
        brand_file: Option<PathBuf>,

        /// Product image (repeat for more; first 4 are sent)
        #[arg(short, long = "image", required = true, num_args = 1..)]
        images: Vec<PathBuf>,
    },

    /// Score an existing note and get a rewritten version
    Critique {
        /// Note title (at most 50 characters)
        #[arg(long)]
        title: String,

        /// Note body (at most 2000 characters)
        #[arg(long, required_unless_present = "body_file", conflicts_with = "body_file")]
        body: Option<String>,

        /// Read the note body from a file
        #[arg(long)]
        body_file: Option<PathBuf>,

        /// Purpose: growth, conversion, personal-brand
        #[arg(short, long, default_value = "growth")]
        purpose: Purpose,
    },

    /// Show the per-session quota
    Quota,

    /// List accepted goals, tones and purposes with their labels
    Options,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<Error>() {
                Some(plume_error) => {
                    error!(error_kind = plume_error.kind(), error = %plume_error, "Command failed");
                    eprintln!("{}", plume_error.user_message());
                }
                None => {
                    error!(error = %e, "Command failed");
                    eprintln!("Error: {:#}", e);
                }
            }
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing on stderr, or a daily-rotated file when `LOG_FILE` is set.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional)
///   LOG_ANSI    - "true"/"false" override ANSI colors
///   RUST_LOG    - standard env filter (default: "plume=info,plume_inference=info")
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "plume=info,plume_inference=info".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(ref path) = log_file {
        let path = Path::new(path);
        let file_dir = path.parent().unwrap_or(Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("plume.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let deadline = cli.deadline_secs;

    match cli.command {
        Commands::Generate {
            goal,
            tone,
            key_points,
            draft,
            brand,
            brand_file,
            images,
        } => {
            let brand = match brand_file {
                Some(path) => Some(read_text(&path)?),
                None => brand,
            };
            let mut request = GenerationRequest::new(goal, tone, key_points)
                .with_attachments(images.into_iter().map(Attachment::from_path));
            if let Some(brand) = brand {
                request = request.with_brand_context(brand);
            }
            if let Some(draft) = draft {
                request = request.with_draft(draft);
            }

            let orchestrator = orchestrator()?;
            let result = with_deadline(deadline, orchestrator.submit_generation(request)).await?;
            print_json(&result)?;
        }
        Commands::Critique {
            title,
            body,
            body_file,
            purpose,
        } => {
            let body = match body_file {
                Some(path) => read_text(&path)?,
                None => body.unwrap_or_default(),
            };

            let orchestrator = orchestrator()?;
            let result = with_deadline(
                deadline,
                orchestrator.submit_critique(CritiqueRequest::new(title, body, purpose)),
            )
            .await?;

            let tier = result.tier();
            info!(score = result.score, tier = ?tier, "Critique scored");
            print_json(&serde_json::json!({
                "critique": result,
                "tier": tier,
                "verdict": tier.verdict(),
            }))?;
        }
        Commands::Quota => {
            let orchestrator = orchestrator()?;
            print_json(&serde_json::json!({
                "limit": orchestrator.quota_limit(),
                "remaining": orchestrator.remaining_quota(),
                "quota": orchestrator.quota_state(),
                "historyCapacity": orchestrator.history_capacity(),
                "model": orchestrator.backend().model_name(),
            }))?;
        }
        Commands::Options => {
            let pairs = |items: Vec<(&'static str, &'static str)>| {
                items
                    .into_iter()
                    .map(|(value, label)| serde_json::json!({ "value": value, "label": label }))
                    .collect::<Vec<_>>()
            };
            print_json(&serde_json::json!({
                "goals": pairs(Goal::ALL.iter().map(|g| (g.as_str(), g.label())).collect()),
                "tones": pairs(Tone::ALL.iter().map(|t| (t.as_str(), t.label())).collect()),
                "purposes": pairs(Purpose::ALL.iter().map(|p| (p.as_str(), p.label())).collect()),
            }))?;
        }
    }

    Ok(())
}

fn orchestrator() -> anyhow::Result<Orchestrator> {
    let backend = GeminiBackend::from_env()?;
    Ok(Orchestrator::with_env_limits(Arc::new(backend))?)
}

/// Host-side deadline. Dropping the submission on expiry refunds its quota.
async fn with_deadline<T>(
    deadline_secs: Option<u64>,
    submission: impl Future<Output = plume_core::Result<T>>,
) -> plume_core::Result<T> {
    match deadline_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), submission)
            .await
            .map_err(|_| Error::Backend(format!("no response within {}s", secs)))?,
        None => submission.await,
    }
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
