use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use revox_cli::config::ClientConfig;
use revox_cli::render;
use revox_converter::api::ConverterApi;
use revox_converter::events::RunEvent;
use revox_converter::runner::{run_conversion, ConversionRequest, FinishedRun, RunOutcome};
use revox_core::naming::converted_filename;
use revox_core::run::{ArtifactSlot, PollPolicy, RunPhase};
use revox_core::validate;

#[derive(Parser)]
#[command(name = "revox", version, about = "Client for a remote voice-conversion service")]
struct Args {
    /// Base URL of the conversion service (overrides `REVOX_SERVER_URL`).
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the artist models available on the server.
    Artists,

    /// Convert an audio file with a selected artist model.
    Convert {
        /// Path to the audio file to convert.
        #[arg(long)]
        file: PathBuf,

        /// Artist model to convert with (see `revox artists`).
        #[arg(long)]
        artist: String,

        /// Where to write the converted audio. Defaults to
        /// `converted_{artist}_{file}` in the current directory.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "revox=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = ClientConfig::from_env();
    let server_url = args.server.unwrap_or(config.server_url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;
    let api = ConverterApi::with_client(client, server_url);
    tracing::debug!(server = %api.base_url(), "Using conversion service");

    match args.command {
        Command::Artists => list_artists(&api).await,
        Command::Convert {
            file,
            artist,
            output,
        } => convert(&api, file, artist, output).await,
    }
}

async fn list_artists(api: &ConverterApi) -> anyhow::Result<()> {
    let artists = api.list_artists().await?;
    if artists.is_empty() {
        println!("No artist models found on server.");
        return Ok(());
    }
    for artist in artists {
        println!("{artist}");
    }
    Ok(())
}

async fn convert(
    api: &ConverterApi,
    file: PathBuf,
    artist: String,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    validate::validate_source_file(&file_name)?;

    // Submission is only possible against the server's artist list.
    let artists = api.list_artists().await?;
    validate::validate_artist_selection(&artist, &artists)?;

    let bytes = tokio::fs::read(&file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let (event_tx, mut event_rx) = broadcast::channel(256);
    let printer = tokio::spawn(async move {
        while let Ok(event) = event_rx.recv().await {
            // Terminal outcomes are summarized once below.
            if matches!(event, RunEvent::RunStarted { .. } | RunEvent::Waiting { .. }) {
                println!("{}", render::describe_event(&event));
            }
        }
    });

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let mut slot = ArtifactSlot::new();
    slot.begin_run();

    println!("Uploading and starting conversion...");
    let request = ConversionRequest {
        file_name: file_name.clone(),
        bytes,
        artist: artist.clone(),
    };
    let outcome = run_conversion(api, request, &PollPolicy::default(), &event_tx, &cancel).await;

    drop(event_tx);
    let _ = printer.await;

    match outcome {
        RunOutcome::Finished(FinishedRun { phase, .. }) => {
            let line = render::summary(&phase);
            match phase {
                RunPhase::Ready { artifact } => {
                    let artifact = slot.store(artifact);
                    let path = output
                        .unwrap_or_else(|| PathBuf::from(converted_filename(&artist, &file_name)));
                    tokio::fs::write(&path, &artifact.bytes)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("{line}");
                    println!("Saved converted audio to {}", path.display());
                    Ok(())
                }
                _ => anyhow::bail!("{line}"),
            }
        }
        RunOutcome::SubmissionFailed(e) => Err(e.into()),
        RunOutcome::Cancelled => {
            println!("Conversion cancelled.");
            Ok(())
        }
    }
}
