use crate::mapper::ScrollProgress;

/// Virtual scroll region the backdrop tracks.
///
/// Mirrors a page's vertical scroll: a content height, a viewport height and
/// the offset of the viewport's top edge. Progress is how far the offset has
/// travelled through the scrollable range.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollTracker {
    offset_px: f64,
    content_height_px: f64,
    viewport_height_px: f64,
}

impl ScrollTracker {
    pub fn new(content_height_px: f64, viewport_height_px: f64) -> Self {
        Self {
            offset_px: 0.0,
            content_height_px: content_height_px.max(0.0),
            viewport_height_px: viewport_height_px.max(0.0),
        }
    }

    pub fn offset_px(&self) -> f64 {
        self.offset_px
    }

    fn max_offset(&self) -> f64 {
        (self.content_height_px - self.viewport_height_px).max(0.0)
    }

    pub fn progress(&self) -> ScrollProgress {
        let max = self.max_offset();
        if max <= 0.0 {
            return ScrollProgress::START;
        }
        ScrollProgress::new(self.offset_px / max)
    }

    /// Move by `dy` pixels (positive scrolls down). Returns whether the offset changed.
    pub fn scroll_by(&mut self, dy: f64) -> bool {
        if !dy.is_finite() {
            return false;
        }
        self.set_offset(self.offset_px + dy)
    }

    /// Scroll one viewport height minus a small overlap, like PageDown/PageUp.
    pub fn page(&mut self, direction: i32) -> bool {
        let step = (self.viewport_height_px * 0.9).max(1.0);
        self.scroll_by(step * f64::from(direction.signum()))
    }

    pub fn scroll_to_start(&mut self) -> bool {
        self.set_offset(0.0)
    }

    pub fn scroll_to_end(&mut self) -> bool {
        self.set_offset(self.max_offset())
    }

    /// A taller viewport shrinks the scrollable range; the offset is re-clamped.
    /// Returns whether progress moved, which it can without the offset moving.
    pub fn set_viewport_height(&mut self, height_px: f64) -> bool {
        let before = self.progress();
        self.viewport_height_px = height_px.max(0.0);
        self.set_offset(self.offset_px);
        self.progress() != before
    }

    fn set_offset(&mut self, offset: f64) -> bool {
        let clamped = offset.clamp(0.0, self.max_offset());
        if clamped == self.offset_px {
            return false;
        }
        self.offset_px = clamped;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_tracks_offset_through_scrollable_range() {
        let mut t = ScrollTracker::new(2000.0, 1000.0);
        assert_eq!(t.progress(), ScrollProgress::START);
        assert!(t.scroll_by(500.0));
        assert!((t.progress().value() - 0.5).abs() < 1e-9);
        assert!(t.scroll_to_end());
        assert_eq!(t.progress(), ScrollProgress::END);
    }

    #[test]
    fn offset_is_clamped_and_reports_no_change_at_edges() {
        let mut t = ScrollTracker::new(2000.0, 1000.0);
        assert!(!t.scroll_by(-10.0));
        assert!(t.scroll_by(5000.0));
        assert_eq!(t.offset_px(), 1000.0);
        assert!(!t.scroll_by(1.0));
        assert!(t.scroll_to_start());
        assert_eq!(t.offset_px(), 0.0);
    }

    #[test]
    fn content_shorter_than_viewport_never_scrolls() {
        let mut t = ScrollTracker::new(500.0, 1000.0);
        assert!(!t.scroll_by(100.0));
        assert_eq!(t.progress(), ScrollProgress::START);
    }

    #[test]
    fn growing_viewport_reclamps_offset() {
        let mut t = ScrollTracker::new(2000.0, 1000.0);
        t.scroll_to_end();
        assert!(t.set_viewport_height(1500.0));
        assert_eq!(t.offset_px(), 500.0);
        assert_eq!(t.progress(), ScrollProgress::END);
    }

    #[test]
    fn viewport_change_reports_progress_shift_with_offset_unchanged() {
        let mut t = ScrollTracker::new(2000.0, 1000.0);
        t.scroll_by(500.0);
        assert!(t.set_viewport_height(1200.0));
        assert_eq!(t.offset_px(), 500.0);
        assert!((t.progress().value() - 0.625).abs() < 1e-9);
        assert!(!t.set_viewport_height(1200.0));
    }

    #[test]
    fn paging_moves_most_of_a_viewport() {
        let mut t = ScrollTracker::new(10_000.0, 1000.0);
        assert!(t.page(1));
        assert!((t.offset_px() - 900.0).abs() < 1e-9);
        assert!(t.page(-1));
        assert_eq!(t.offset_px(), 0.0);
    }
}
