use anyhow::{Context, Result};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use screen_recorder::{
    Artifact, CaptureBackendFactory, CaptureSource, Config, Recorder, RecorderEvent,
    ScreenRecorderApp, TransferClient,
};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "screen-recorder")]
#[command(about = "Record a capture source, then download or upload the result")]
struct Args {
    /// Config file (extension optional)
    #[arg(short, long, default_value = "config/screen-recorder")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record from a media file replayed as a live capture
    Record {
        /// Source media file
        source: PathBuf,

        /// Stop after this many seconds (the configured maximum still applies)
        #[arg(short, long)]
        duration: Option<u64>,

        /// Directory the recording is downloaded into
        #[arg(short, long, default_value = ".")]
        output: String,

        /// Upload the recording once finished
        #[arg(short, long)]
        upload: bool,
    },
    /// List recordings stored by the backend
    List,
    /// Upload an existing recording file
    Upload {
        /// File to upload
        file: PathBuf,
    },
    /// Print the playback URL of a stored recording
    Url {
        /// Recording id
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} using backend {}", cfg.service.name, cfg.backend.base_url);

    let transfer = TransferClient::new(&cfg.backend.base_url, cfg.backend.timeout())
        .context("Failed to create transfer client")?
        .with_upload_mime_type(&cfg.backend.upload_mime_type);

    match args.command {
        Command::Record {
            source,
            duration,
            output,
            upload,
        } => record(&cfg, transfer, source, duration, &output, upload).await,
        Command::List => {
            let recordings = transfer.list().await?;
            if recordings.is_empty() {
                info!("No recordings stored");
            }
            for recording in &recordings {
                println!(
                    "{}\t{}\t{}",
                    recording.id,
                    recording.filename,
                    transfer.playback_url(&recording.id)
                );
            }
            Ok(())
        }
        Command::Upload { file } => {
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let artifact = Artifact::assemble(&[Bytes::from(data)], &cfg.recording.mime_type);
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| cfg.recording.filename.clone());

            let recording = transfer.upload(&artifact, &filename).await?;
            println!("{}\t{}", recording.id, transfer.playback_url(&recording.id));
            Ok(())
        }
        Command::Url { id } => {
            println!("{}", transfer.playback_url(&id));
            Ok(())
        }
    }
}

async fn record(
    cfg: &Config,
    transfer: TransferClient,
    source: PathBuf,
    duration: Option<u64>,
    output: &str,
    upload: bool,
) -> Result<()> {
    let backend = CaptureBackendFactory::create(CaptureSource::File(source), cfg.capture.clone());
    let recorder = Recorder::spawn(backend, cfg.recording.recorder_config());
    let mut app = ScreenRecorderApp::new(recorder, transfer, &cfg.recording.filename);

    let mut events = app.recorder().subscribe();
    app.start().await.context("Failed to start recording")?;

    info!(
        "Recording (max {}s). Press Ctrl+C to stop",
        cfg.recording.max_duration_secs
    );

    let limit = async {
        match duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        _ = limit => info!("Requested duration reached"),
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
        _ = wait_for_stop(&mut events) => {},
    }

    let Some(artifact) = app.stop().await? else {
        warn!("Nothing was recorded");
        return Ok(());
    };
    info!("Recorded {} bytes ({})", artifact.len(), artifact.object_url());

    let output_dir = PathBuf::from(shellexpand::tilde(output).as_ref());
    if let Some(path) = app.download(&output_dir).await? {
        println!("{}", path.display());
    }

    if upload {
        match app.upload().await? {
            Some(recording) => println!("{}", app.playback_url(&recording)),
            None => warn!("Recording is empty, skipped upload"),
        }
    }

    Ok(())
}

/// Log elapsed time until the recorder stops on its own
async fn wait_for_stop(events: &mut broadcast::Receiver<RecorderEvent>) {
    loop {
        match events.recv().await {
            Ok(RecorderEvent::Tick { elapsed_secs }) => info!("Recording... Time: {}s", elapsed_secs),
            Ok(RecorderEvent::Stopped { reason, .. }) => {
                info!("Recording stopped ({:?})", reason);
                return;
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}
