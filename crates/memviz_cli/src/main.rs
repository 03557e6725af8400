//! MemViz CLI
//!
//! Loads recorded program traces and steps through their memory snapshots.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod render;
mod sample;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use memviz_core::ReplayId;
use memviz_replay::Recording;
use memviz_runtime::{ReplayService, ServiceConfig};
use memviz_storage::StoreConfig;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Store location when neither `--config` nor `--store-dir` names one
const DEFAULT_STORE_DIR: &str = ".memviz/replays";

#[derive(Parser)]
#[command(name = "memviz")]
#[command(about = "MemViz - step through recorded program memory", long_about = None)]
struct Cli {
    /// Service configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding stored replays
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,
    /// Log as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the built-in demo recording
    Sample {
        /// Output path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Store a recording as a new replay
    Load {
        /// Recording file
        file: PathBuf,
    },
    /// Load, start and stream a recording in one go
    Play {
        /// Recording file
        file: PathBuf,
        /// Pause between steps in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Print every snapshot in full
        #[arg(long)]
        full: bool,
    },
    /// List stored replays
    List,
    /// Show a replay and its current snapshot
    Show {
        /// Replay ID
        id: ReplayId,
    },
    /// Start a replay
    Start {
        /// Replay ID
        id: ReplayId,
    },
    /// Advance one step
    Forward {
        /// Replay ID
        id: ReplayId,
    },
    /// Go back one step
    Back {
        /// Replay ID
        id: ReplayId,
    },
    /// Pause a running replay
    Pause {
        /// Replay ID
        id: ReplayId,
    },
    /// Resume a paused replay
    Resume {
        /// Replay ID
        id: ReplayId,
    },
    /// Rewind a replay
    Reset {
        /// Replay ID
        id: ReplayId,
    },
    /// Jump to a step index
    Goto {
        /// Replay ID
        id: ReplayId,
        /// Zero-based step index
        #[arg(short, long, allow_negative_numbers = true)]
        step: i64,
    },
    /// Stop a replay with an error
    Fail {
        /// Replay ID
        id: ReplayId,
        /// Error message
        #[arg(short, long)]
        message: String,
    },
    /// Stream the remaining steps of a replay
    Stream {
        /// Replay ID
        id: ReplayId,
        /// Pause between steps in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Print every snapshot in full
        #[arg(long)]
        full: bool,
    },
    /// Delete a stored replay
    Delete {
        /// Replay ID
        id: ReplayId,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("memviz=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(cli: &Cli) -> Result<ServiceConfig> {
    let config = match &cli.config {
        Some(path) => ServiceConfig::from_path(path)
            .wrap_err_with(|| format!("reading config {}", path.display()))?,
        None => ServiceConfig::default()
            .with_store(StoreConfig::default().with_file_dir(DEFAULT_STORE_DIR)),
    };

    Ok(match &cli.store_dir {
        Some(dir) => {
            let store = config.store.clone().with_file_dir(dir);
            config.with_store(store)
        }
        None => config,
    })
}

async fn read_recording(path: &Path) -> Result<Recording> {
    let json = tokio::fs::read_to_string(path)
        .await
        .wrap_err_with(|| format!("reading recording {}", path.display()))?;
    Recording::from_json(&json).wrap_err_with(|| format!("parsing recording {}", path.display()))
}

/// Progress bar position after `delivered` steps of a stream that began at
/// `start_index`
///
/// The first delivered step is the one already current, so it counts as
/// reaching `start_index + 1`.
fn progress_position(start_index: i64, delivered: u64) -> u64 {
    u64::try_from(start_index).unwrap_or(0) + delivered
}

/// Drive a replay to its end, cancelling on Ctrl-C
async fn stream(service: &ReplayService, id: ReplayId, full: bool) -> Result<()> {
    let view = service.get(id).await?;
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let progress = ProgressBar::new(view.total_steps as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut steps = service.stream_steps(id, cancel.clone());
    let mut delivered = 0;
    while let Some(step) = steps.next().await {
        delivered += 1;
        progress.set_position(progress_position(view.current_step_index, delivered));
        progress.suspend(|| {
            if full {
                render::snapshot(&step);
                println!();
            } else {
                println!("{}", render::step_line(&step));
            }
        });
    }
    progress.finish_and_clear();

    if cancel.is_cancelled() {
        println!("{}", console::style("stream cancelled").yellow());
    }
    render::view(&service.get(id).await?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.json);

    if let Commands::Sample { output } = &cli.command {
        let json = sample::linked_node()?.to_json()?;
        match output {
            Some(path) => {
                tokio::fs::write(path, json)
                    .await
                    .wrap_err_with(|| format!("writing {}", path.display()))?;
                println!("wrote {}", path.display());
            }
            None => println!("{}", json),
        }
        return Ok(());
    }

    let mut config = load_config(&cli)?;
    if let Commands::Play {
        delay_ms: Some(ms), ..
    }
    | Commands::Stream {
        delay_ms: Some(ms), ..
    } = &cli.command
    {
        config = config.with_stream_step_delay_ms(*ms);
    }
    tracing::debug!(store = ?config.store, "opening replay service");
    let service = ReplayService::open(config).await?;

    match cli.command {
        Commands::Sample { .. } => {}
        Commands::Load { file } => {
            let view = service.create(read_recording(&file).await?).await?;
            render::view(&view);
        }
        Commands::Play { file, full, .. } => {
            let id = service.create(read_recording(&file).await?).await?.id;
            service.start(id).await?;
            stream(&service, id, full).await?;
        }
        Commands::List => render::list(&service.list().await?),
        Commands::Show { id } => {
            let view = service.get(id).await?;
            render::view(&view);
            if let Some(step) = &view.current_step {
                println!();
                render::snapshot(step);
            }
        }
        Commands::Start { id } => render::view(&service.start(id).await?),
        Commands::Forward { id } => render::view(&service.step_forward(id).await?),
        Commands::Back { id } => render::view(&service.step_backward(id).await?),
        Commands::Pause { id } => render::view(&service.pause(id).await?),
        Commands::Resume { id } => render::view(&service.resume(id).await?),
        Commands::Reset { id } => render::view(&service.reset(id).await?),
        Commands::Goto { id, step } => render::view(&service.go_to_step(id, step).await?),
        Commands::Fail { id, message } => render::view(&service.set_error(id, message).await?),
        Commands::Stream { id, full, .. } => stream(&service, id, full).await?,
        Commands::Delete { id } => {
            service.delete(id).await?;
            println!("deleted {}", id);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_goto_with_negative_index() {
        let id = ReplayId::new();
        let cli = Cli::try_parse_from(["memviz", "goto", &id.to_string(), "--step", "-1"]).unwrap();
        match cli.command {
            Commands::Goto { id: parsed, step } => {
                assert_eq!(parsed, id);
                assert_eq!(step, -1);
            }
            _ => panic!("expected goto"),
        }
    }

    #[test]
    fn test_store_dir_overrides_default() {
        let cli = Cli::try_parse_from(["memviz", "--store-dir", "/tmp/replays", "list"]).unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(
            config.store,
            StoreConfig::default().with_file_dir("/tmp/replays")
        );
    }

    #[test]
    fn test_config_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memviz.json");
        std::fs::write(&path, r#"{ "stream_step_delay_ms": 25 }"#).unwrap();

        let cli = Cli::try_parse_from(["memviz", "--config", path.to_str().unwrap(), "list"]).unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.stream_step_delay_ms, 25);
    }

    #[tokio::test]
    async fn test_sample_recording_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.json");
        std::fs::write(&path, sample::linked_node().unwrap().to_json().unwrap()).unwrap();

        let recording = read_recording(&path).await.unwrap();
        assert_eq!(recording.len(), 6);
    }

    #[tokio::test]
    async fn test_progress_counts_delivered_steps() {
        use memviz_memory::OperationKind;
        use memviz_replay::SimulationStep;

        let recording = [10u32, 20, 30].iter().fold(Recording::new("int x;", "c"), |rec, n| {
            rec.with_step(
                SimulationStep::builder(*n, 1, "x++;", OperationKind::Assignment)
                    .build()
                    .unwrap(),
            )
        });
        let service = ReplayService::new(
            std::sync::Arc::new(memviz_storage::InMemoryRepository::new()),
            ServiceConfig::default().with_stream_step_delay_ms(0),
        );
        let id = service.create(recording).await.unwrap().id;
        service.start(id).await.unwrap();
        let view = service.get(id).await.unwrap();

        let mut positions = Vec::new();
        let mut steps = service.stream_steps(id, CancellationToken::new());
        let mut delivered = 0;
        while steps.next().await.is_some() {
            delivered += 1;
            positions.push(progress_position(view.current_step_index, delivered));
        }
        assert_eq!(positions, vec![1, 2, 3]);
        assert!(positions.iter().all(|p| *p <= view.total_steps as u64));
    }

    #[test]
    fn test_progress_resumes_from_current_index() {
        assert_eq!(progress_position(2, 1), 3);
        assert_eq!(progress_position(-1, 0), 0);
    }

    #[test]
    fn test_swap_fixture_loads() {
        let recording = Recording::from_json(include_str!("../fixtures/swap.json")).unwrap();
        let replay = recording.into_aggregate().unwrap();
        assert_eq!(replay.total_steps(), 6);

        let call = replay.steps().get(1).unwrap();
        assert_eq!(call.frames().len(), 2);
        assert_eq!(call.frames()[1].size(), 16);
        assert!(call.pointers().iter().all(|p| p.is_valid()));
    }
}
