// progress.rs - scroll offset -> progress, plus the tail-page lock and its one-shot hint

use crate::pose::ScrollProgress;

pub fn crossed_tail_boundary(progress: ScrollProgress) -> bool {
    progress >= ScrollProgress::TAIL
}

/// Per-screen paging flags. `edge_indicator_shown` only ever goes false -> true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingState {
    pub user_interaction_enabled: bool,
    pub edge_indicator_shown: bool,
}

impl Default for PagingState {
    fn default() -> Self {
        Self {
            user_interaction_enabled: true,
            edge_indicator_shown: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleOutcome {
    pub user_interaction_enabled: bool,
    /// True only on the first settle onto the tail page.
    pub show_edge_indicator: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ScrollTracker {
    latest: ScrollProgress,
    paging: PagingState,
}

impl ScrollTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs on every offset change, so it stays O(1) and allocation free.
    pub fn on_scroll_changed(&mut self, offset_x: f32, page_width: f32) -> ScrollProgress {
        self.latest = ScrollProgress::from_offset(offset_x, page_width);
        self.latest
    }

    pub fn progress(&self) -> ScrollProgress {
        self.latest
    }

    pub fn paging(&self) -> PagingState {
        self.paging
    }

    pub fn set_user_interaction_enabled(&mut self, enabled: bool) {
        self.paging.user_interaction_enabled = enabled;
    }

    /// Scrolling came to rest (finger lifted without fling, or deceleration ended).
    pub fn settle(&mut self) -> SettleOutcome {
        let at_tail = crossed_tail_boundary(self.latest);
        self.paging.user_interaction_enabled = !at_tail;

        let show_edge_indicator = at_tail && !self.paging.edge_indicator_shown;
        if show_edge_indicator {
            self.paging.edge_indicator_shown = true;
            log::info!("paging locked on tail page, showing edge hint");
        } else if at_tail {
            log::debug!("paging locked on tail page");
        }

        SettleOutcome {
            user_interaction_enabled: self.paging.user_interaction_enabled,
            show_edge_indicator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_boundary_is_inclusive_at_three() {
        assert!(!crossed_tail_boundary(ScrollProgress(2.999)));
        assert!(crossed_tail_boundary(ScrollProgress(3.0)));
        assert!(crossed_tail_boundary(ScrollProgress(3.5)));
    }

    #[test]
    fn scroll_change_normalises_by_page_width() {
        let mut tracker = ScrollTracker::new();
        let progress = tracker.on_scroll_changed(562.5, 375.0);
        assert_eq!(progress, ScrollProgress(1.5));
        assert_eq!(tracker.progress(), ScrollProgress(1.5));
    }

    #[test]
    fn settling_on_tail_locks_paging_and_fires_hint_once() {
        let mut tracker = ScrollTracker::new();
        tracker.on_scroll_changed(1125.0, 375.0);

        let first = tracker.settle();
        assert!(!first.user_interaction_enabled);
        assert!(first.show_edge_indicator);

        tracker.on_scroll_changed(750.0, 375.0);
        let back = tracker.settle();
        assert!(back.user_interaction_enabled);
        assert!(!back.show_edge_indicator);

        tracker.on_scroll_changed(1125.0, 375.0);
        let again = tracker.settle();
        assert!(!again.user_interaction_enabled);
        assert!(!again.show_edge_indicator);
        assert!(tracker.paging().edge_indicator_shown);
    }

    #[test]
    fn settling_before_tail_keeps_interaction() {
        let mut tracker = ScrollTracker::new();
        tracker.on_scroll_changed(1124.0, 375.0);
        let outcome = tracker.settle();
        assert!(outcome.user_interaction_enabled);
        assert!(!tracker.paging().edge_indicator_shown);
    }
}
