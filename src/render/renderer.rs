use tracing::{trace, warn};

use crate::frames::FrameStore;
use crate::processing::layout::cover_rect;
use crate::render::canvas::Canvas;

/// What a single render call did to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The frame at this index was drawn.
    Painted(usize),
    /// The frame has not finished decoding; the previous pixels stay visible.
    NotReady(usize),
    /// The sequence holds no frames.
    Empty,
    /// Index past the end of the sequence.
    OutOfRange(usize),
    /// The drawing surface has no area to paint into.
    SurfaceUnavailable,
    /// The canvas was cleared but resampling the frame failed.
    DrawFailed(usize),
}

impl RenderOutcome {
    pub fn painted(self) -> bool {
        matches!(self, Self::Painted(_))
    }
}

/// Paint the frame at `index` cover-fitted onto `canvas`.
///
/// Anything short of a ready frame and a usable surface leaves the canvas
/// untouched. Otherwise the whole canvas is cleared before the draw so no
/// part of the previous frame survives.
pub fn render_frame<C>(store: &FrameStore, index: usize, canvas: &mut C) -> RenderOutcome
where
    C: Canvas + ?Sized,
{
    if store.is_empty() {
        return RenderOutcome::Empty;
    }
    let Some(asset) = store.get(index) else {
        return RenderOutcome::OutOfRange(index);
    };
    let Some(frame) = asset.ready() else {
        trace!(index, "frame not ready; keeping previous paint");
        return RenderOutcome::NotReady(index);
    };
    let (width, height) = canvas.size();
    if width == 0 || height == 0 {
        return RenderOutcome::SurfaceUnavailable;
    }

    let rect = cover_rect(width, height, frame.width, frame.height);
    canvas.clear();
    if let Err(err) = canvas.draw_image(frame, rect) {
        warn!(index, path = %frame.path.display(), error = ?err, "failed to draw frame");
        return RenderOutcome::DrawFailed(index);
    }
    trace!(index, x = rect.x, y = rect.y, w = rect.width, h = rect.height, "frame painted");
    RenderOutcome::Painted(index)
}
