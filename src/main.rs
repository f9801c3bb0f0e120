//! CLI entry point for the remote translation client.

use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use murasaki_remote::{
    ConnectionProfile, RemoteClient, RemoteError, TaskEventHandler, TaskStatus,
    TranslationRequest,
};
use serde::Serialize;
use tracing::{debug, info, warn};

mod cli;

use cli::{Args, Command, TranslateArgs};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(command = ?args.command, "CLI arguments parsed");

    let profile = resolve_profile(&args)?;
    info!(server = profile.base_url(), "using remote server");
    let client = RemoteClient::new(profile)?;

    match args.command {
        Command::Health => {
            let check = client.test_connection().await;
            if !check.ok {
                bail!("server unreachable: {}", check.message);
            }
            print_json(&check)?;
        }
        Command::Status => print_json(&client.server_status().await?)?,
        Command::Models => print_json(&client.list_models().await?)?,
        Command::Glossaries => print_json(&client.list_glossaries().await?)?,
        Command::Upload { path } => print_json(&client.upload_file(&path).await?)?,
        Command::Task { id } => print_json(&client.task_status(&id).await?)?,
        Command::Cancel { id } => {
            let message = client.cancel_task(&id).await?;
            println!("{message}");
        }
        Command::Download { id, output } => {
            let bytes = client.download_result(&id).await?;
            tokio::fs::write(&output, &bytes)
                .await
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!(path = %output.display(), bytes = bytes.len(), "result saved");
        }
        Command::Translate(translate) => {
            let result = run_translate(&client, translate, args.quiet).await?;
            println!("{result}");
        }
    }

    Ok(())
}

/// Builds the connection profile: flags first, environment as fallback.
fn resolve_profile(args: &Args) -> Result<ConnectionProfile> {
    let mut profile = match &args.server {
        Some(server) => ConnectionProfile::new(server)?
            .with_api_key(std::env::var(murasaki_remote::config::ENV_API_KEY).ok()),
        None => ConnectionProfile::from_env()
            .context("no server given; pass --server or set MURASAKI_SERVER_URL")?,
    };
    if args.api_key.is_some() {
        profile = profile.with_api_key(args.api_key.clone());
    }
    if let Some(timeout_ms) = args.timeout_ms {
        profile = profile.with_timeout_ms(timeout_ms);
    }
    Ok(profile)
}

async fn run_translate(client: &RemoteClient, args: TranslateArgs, quiet: bool) -> Result<String> {
    let mut request = match (&args.text, &args.file) {
        (Some(text), _) => TranslationRequest::for_text(text.clone()),
        (None, Some(file)) => {
            let uploaded = client.upload_file(file).await?;
            info!(file_id = %uploaded.file_id, "source uploaded");
            TranslationRequest::for_file(uploaded.file_path)
        }
        (None, None) => bail!("either --text or --file is required"),
    };
    request.model = args.model;
    request.glossary = args.glossary;
    if let Some(preset) = args.preset {
        request.preset = preset;
    }

    if !args.follow {
        return poll_with_progress(client, &request, quiet).await;
    }

    let created = client.create_translation(&request).await?;
    let stream = client.subscribe(&created.task_id).await?;
    let mut printer = FollowPrinter::default();
    stream.dispatch(&mut printer).await;

    match printer.outcome {
        Some(Ok(result)) => Ok(result),
        Some(Err(message)) => bail!("task {} failed: {message}", created.task_id),
        None => {
            // Stream dropped before a terminal event; fall back to polling.
            warn!(task_id = %created.task_id, "event stream ended early; polling instead");
            Ok(client.poller().wait(&created.task_id, None).await?)
        }
    }
}

async fn poll_with_progress(
    client: &RemoteClient,
    request: &TranslationRequest,
    quiet: bool,
) -> Result<String> {
    let bar = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(1000)
    };
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {percent:>3}% {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut on_progress = |progress: f64, line: &str| {
        bar.set_position((progress.clamp(0.0, 1.0) * 1000.0) as u64);
        bar.set_message(line.to_string());
    };
    let outcome = client
        .poller()
        .translate_and_wait(request, Some(&mut on_progress))
        .await;
    bar.finish_and_clear();
    Ok(outcome?)
}

/// Prints stream events to stderr and remembers the terminal outcome.
#[derive(Default)]
struct FollowPrinter {
    outcome: Option<Result<String, String>>,
}

impl TaskEventHandler for FollowPrinter {
    fn on_log(&mut self, message: &str) {
        eprintln!("{message}");
    }

    fn on_progress(&mut self, progress: f64, current_block: u32, total_blocks: u32) {
        eprintln!("[{current_block}/{total_blocks}] {:.0}%", progress * 100.0);
    }

    fn on_complete(&mut self, status: TaskStatus, result: Option<&str>, error: Option<&str>) {
        self.outcome = Some(match status {
            TaskStatus::Completed => Ok(result.unwrap_or_default().to_string()),
            other => Err(error.unwrap_or(other.as_str()).to_string()),
        });
    }

    fn on_error(&mut self, error: &RemoteError) {
        warn!(%error, "event stream error");
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
