//! Headless rendering of a single backdrop frame to a PNG.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Configuration;
use crate::frames::{FrameSequence, FrameStore};
use crate::mapper::ScrollProgress;
use crate::processing::filter::BackdropFilter;
use crate::render::canvas::{Canvas, CpuCanvas};
use crate::render::renderer::RenderOutcome;
use crate::tasks::{loader, scheduler::UpdateScheduler};
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotReport {
    pub index: Option<usize>,
    pub outcome: RenderOutcome,
    pub frames: usize,
    pub ready: usize,
}

/// Load the sequence, render the frame at `progress` onto a `width`×`height`
/// canvas, flatten it with the theme's backdrop filter and write `out`.
///
/// A frame that failed to load still produces an image (page background only),
/// matching what a viewer would show.
pub async fn render_to_file(
    cfg: &Configuration,
    sequence: &FrameSequence,
    progress: ScrollProgress,
    (width, height): (u32, u32),
    theme: Theme,
    out: &Path,
    cancel: CancellationToken,
) -> Result<SnapshotReport> {
    let (req_tx, req_rx) = mpsc::unbounded_channel();
    let (ready_tx, _ready_rx) = mpsc::unbounded_channel();
    let store = FrameStore::initialize(sequence, &cfg.asset_base(), &req_tx);
    drop(req_tx);

    loader::run(req_rx, ready_tx, cancel, cfg.loader_max_concurrent_decodes)
        .await
        .context("frame loader failed")?;

    let mut scheduler = UpdateScheduler::new(store, CpuCanvas::new(0, 0), false);
    let outcome = scheduler
        .mount(width, height, progress)
        .unwrap_or(RenderOutcome::SurfaceUnavailable);
    let report = SnapshotReport {
        index: scheduler.current_index(),
        outcome,
        frames: scheduler.store().len(),
        ready: scheduler.store().ready_count(),
    };
    if !outcome.painted() {
        warn!(?outcome, "snapshot frame was not painted; writing background only");
    }

    let canvas = scheduler.canvas();
    let (cw, ch) = canvas.size();
    let image = BackdropFilter::new(&cfg.backdrop, theme).compose(cw, ch, canvas.pixels());
    scheduler.teardown();

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    image
        .save(out)
        .with_context(|| format!("failed to write snapshot to {}", out.display()))?;
    info!(
        path = %out.display(),
        index = ?report.index,
        ready = report.ready,
        frames = report.frames,
        "snapshot written"
    );
    Ok(report)
}
