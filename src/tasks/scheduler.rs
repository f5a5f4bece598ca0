//! Decides when the backdrop repaints.
//!
//! One render on mount, one per scroll-progress notification, one per
//! viewport resize (after the buffer has been resized). Once torn down,
//! every notification is ignored before the canvas is touched.

use tracing::{debug, info};

use crate::events::FrameReady;
use crate::frames::FrameStore;
use crate::mapper::{ScrollProgress, map_index};
use crate::render::canvas::Canvas;
use crate::render::renderer::{RenderOutcome, render_frame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Unmounted,
    Mounted,
    TornDown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub renders: u64,
    pub painted: u64,
    pub skipped: u64,
}

pub struct UpdateScheduler<C> {
    store: FrameStore,
    canvas: C,
    progress: ScrollProgress,
    repaint_on_ready: bool,
    lifecycle: Lifecycle,
    stats: RenderStats,
}

impl<C: Canvas> UpdateScheduler<C> {
    pub fn new(store: FrameStore, canvas: C, repaint_on_ready: bool) -> Self {
        Self {
            store,
            canvas,
            progress: ScrollProgress::START,
            repaint_on_ready,
            lifecycle: Lifecycle::Unmounted,
            stats: RenderStats::default(),
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    pub fn progress(&self) -> ScrollProgress {
        self.progress
    }

    pub fn current_index(&self) -> Option<usize> {
        map_index(self.progress, self.store.len())
    }

    /// Size the buffer to the viewport and paint whatever is ready.
    pub fn mount(&mut self, width: u32, height: u32, progress: ScrollProgress) -> Option<RenderOutcome> {
        if self.lifecycle != Lifecycle::Unmounted {
            debug!(lifecycle = ?self.lifecycle, "mount ignored");
            return None;
        }
        self.lifecycle = Lifecycle::Mounted;
        self.progress = progress;
        info!(width, height, frames = self.store.len(), "backdrop mounted");
        self.canvas.resize(width, height);
        Some(self.render())
    }

    pub fn on_progress(&mut self, progress: ScrollProgress) -> Option<RenderOutcome> {
        if self.lifecycle != Lifecycle::Mounted {
            return None;
        }
        self.progress = progress;
        Some(self.render())
    }

    /// Resizing the buffer wipes it, so the repaint here is mandatory. A new
    /// viewport height also moves progress; the one render uses `progress`.
    pub fn on_resize(&mut self, width: u32, height: u32, progress: ScrollProgress) -> Option<RenderOutcome> {
        if self.lifecycle != Lifecycle::Mounted {
            return None;
        }
        self.progress = progress;
        self.canvas.resize(width, height);
        debug!(width, height, "backdrop buffer resized");
        Some(self.render())
    }

    /// Only acts when repaint-on-ready is enabled and the decoded frame is
    /// the one currently under the scroll position.
    pub fn on_frame_ready(&mut self, FrameReady(index): FrameReady) -> Option<RenderOutcome> {
        if self.lifecycle != Lifecycle::Mounted || !self.repaint_on_ready {
            return None;
        }
        if self.current_index() != Some(index) {
            return None;
        }
        Some(self.render())
    }

    /// Stop reacting to notifications. Late loads and events become no-ops.
    pub fn teardown(&mut self) {
        if self.lifecycle == Lifecycle::TornDown {
            return;
        }
        self.lifecycle = Lifecycle::TornDown;
        info!(
            renders = self.stats.renders,
            painted = self.stats.painted,
            ready = self.store.ready_count(),
            frames = self.store.len(),
            "backdrop torn down"
        );
    }

    fn render(&mut self) -> RenderOutcome {
        let outcome = match self.current_index() {
            Some(index) => render_frame(&self.store, index, &mut self.canvas),
            None => RenderOutcome::Empty,
        };
        self.stats.renders += 1;
        if outcome.painted() {
            self.stats.painted += 1;
        } else {
            self.stats.skipped += 1;
        }
        outcome
    }
}
