use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use scroll_backdrop::{
    config::Configuration,
    frames::FrameStore,
    mapper::ScrollProgress,
    tasks,
    theme::{Theme, ThemeStore},
};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "scroll-backdrop",
    version,
    about = "Scroll-driven image-sequence backdrop"
)]
struct Args {
    /// Path to YAML config
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
    /// Use this theme instead of the stored preference (dark or light)
    #[arg(long, value_name = "THEME")]
    theme: Option<Theme>,
    /// Render the frame at this scroll progress (0..=1) to a PNG and exit
    #[arg(long, value_name = "PROGRESS")]
    snapshot: Option<f64>,
    /// Output file for --snapshot
    #[arg(long = "snapshot-out", value_name = "FILE", default_value = "backdrop.png")]
    snapshot_out: PathBuf,
    /// Canvas size for --snapshot, as WIDTHxHEIGHT
    #[arg(long = "snapshot-size", value_name = "WxH", default_value = "1920x1080", value_parser = parse_size)]
    snapshot_size: (u32, u32),
}

fn parse_size(raw: &str) -> Result<(u32, u32)> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .with_context(|| format!("expected WIDTHxHEIGHT, got '{raw}'"))?;
    let w: u32 = w.trim().parse().context("invalid width")?;
    let h: u32 = h.trim().parse().context("invalid height")?;
    if w == 0 || h == 0 {
        bail!("snapshot size must be non-zero");
    }
    Ok((w, h))
}

#[tokio::main]
async fn main() -> Result<()> {
    // init tracing (RUST_LOG controls level, default = info)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let Args {
        config,
        theme,
        snapshot,
        snapshot_out,
        snapshot_size,
    } = Args::parse();

    let cfg = Configuration::from_yaml_file(&config)
        .with_context(|| format!("failed to load configuration from {}", config.display()))?
        .validated()
        .context("invalid configuration values")?;
    tracing::info!("Loaded configuration from {}:\n{:#?}", config.display(), cfg);

    let sequence = cfg.frame_sequence().context("failed to resolve frame list")?;
    if sequence.is_empty() {
        tracing::warn!("no frames configured; the backdrop will stay empty");
    }

    let theme_store = ThemeStore::new(cfg.theme_store_path.clone());
    let theme = theme.unwrap_or_else(|| theme_store.load());
    tracing::info!(%theme, store = %theme_store.path().display(), "theme selected");

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    if let Some(progress) = snapshot {
        tasks::snapshot::render_to_file(
            &cfg,
            &sequence,
            ScrollProgress::new(progress),
            snapshot_size,
            theme,
            &snapshot_out,
            cancel,
        )
        .await?;
        return Ok(());
    }

    let (load_tx, load_rx) = mpsc::unbounded_channel(); // Store -> Loader
    let (ready_tx, ready_rx) = mpsc::unbounded_channel(); // Loader -> Viewer
    let store = FrameStore::initialize(&sequence, &cfg.asset_base(), &load_tx);
    drop(load_tx);

    let mut tasks = JoinSet::new();

    // FrameLoader
    tasks.spawn({
        let cancel = cancel.clone();
        let max_in_flight = cfg.loader_max_concurrent_decodes;
        async move {
            tasks::loader::run(load_rx, ready_tx, cancel, max_in_flight)
                .await
                .context("loader task failed")
        }
    });

    // Run the windowed viewer on the main thread (blocking) after spawning other tasks
    if let Err(e) =
        tasks::viewer::run_windowed(cfg, store, ready_rx, cancel.clone(), theme, theme_store)
            .context("viewer failed")
    {
        tracing::error!("{e:?}");
    }
    // In-flight decodes may still finish; they only fill slots nobody reads.
    cancel.cancel();

    while let Some(res) = tasks.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("task error: {e:?}"),
            Err(e) => tracing::error!("join error: {e}"),
        }
    }

    Ok(())
}
