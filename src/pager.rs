// pager.rs - horizontally paged scroll position with animated snapping

use std::time::{Duration, Instant};

use crate::tween::{Easing, NumberTween};

/// Fling speed (px/s) above which a release advances one page in the fling direction.
const FLING_VELOCITY: f32 = 300.0;

#[derive(Debug, Clone)]
struct ScrollAnimation {
    tween: NumberTween,
    started: Instant,
}

/// Emitted by `tick` and the mutators so the screen can react.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PagerUpdate {
    /// New content offset if it moved.
    pub offset_changed: Option<f32>,
    /// Scrolling came to rest.
    pub settled: bool,
}

#[derive(Debug, Clone)]
pub struct PagedScroll {
    offset_x: f32,
    page_width: f32,
    page_count: usize,
    animation_duration: Duration,
    animation: Option<ScrollAnimation>,
    dragging: bool,
    pub user_interaction_enabled: bool,
}

impl PagedScroll {
    pub fn new(page_width: f32, page_count: usize, animation_duration: Duration) -> Self {
        Self {
            offset_x: 0.0,
            page_width,
            page_count: page_count.max(1),
            animation_duration,
            animation: None,
            dragging: false,
            user_interaction_enabled: true,
        }
    }

    pub fn offset_x(&self) -> f32 {
        self.offset_x
    }

    pub fn page_width(&self) -> f32 {
        self.page_width
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn max_offset(&self) -> f32 {
        (self.page_count - 1) as f32 * self.page_width
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Keeps the current page in place when the viewport is resized.
    pub fn set_page_width(&mut self, page_width: f32) -> PagerUpdate {
        if page_width <= 0.0 || page_width == self.page_width {
            return PagerUpdate::default();
        }
        let progress = if self.page_width > 0.0 {
            self.offset_x / self.page_width
        } else {
            0.0
        };
        self.page_width = page_width;
        self.animation = None;
        self.move_to(progress * page_width)
    }

    /// Programmatic scroll. Not clamped: the edge swipe drives past the last page.
    pub fn set_offset(&mut self, offset_x: f32, animated: bool, now: Instant) -> PagerUpdate {
        if !animated || self.animation_duration.is_zero() {
            self.animation = None;
            return self.move_to(offset_x);
        }
        self.animation = Some(ScrollAnimation {
            tween: NumberTween::new(
                self.offset_x as f64,
                offset_x as f64,
                self.animation_duration,
            )
            .with_easing(Easing::EaseOut),
            started: now,
        });
        PagerUpdate::default()
    }

    pub fn scroll_to_page(&mut self, page: usize, animated: bool, now: Instant) -> PagerUpdate {
        let page = page.min(self.page_count - 1);
        self.set_offset(page as f32 * self.page_width, animated, now)
    }

    pub fn begin_drag(&mut self) -> bool {
        if !self.user_interaction_enabled {
            return false;
        }
        self.animation = None;
        self.dragging = true;
        true
    }

    /// Finger moved by `dx` px; content moves the other way.
    pub fn drag_by(&mut self, dx: f32) -> PagerUpdate {
        if !self.dragging {
            return PagerUpdate::default();
        }
        let target = (self.offset_x - dx).clamp(0.0, self.max_offset());
        self.move_to(target)
    }

    /// Releases the drag and snaps to a whole page. Settles right away if
    /// already resting on one.
    pub fn end_drag(&mut self, velocity_x: f32, now: Instant) -> PagerUpdate {
        if !self.dragging {
            return PagerUpdate::default();
        }
        self.dragging = false;
        if self.page_width <= 0.0 {
            return PagerUpdate { offset_changed: None, settled: true };
        }

        let exact = self.offset_x / self.page_width;
        let page = if velocity_x <= -FLING_VELOCITY {
            exact.floor() + 1.0
        } else if velocity_x >= FLING_VELOCITY {
            exact.ceil() - 1.0
        } else {
            exact.round()
        };
        let target = page.clamp(0.0, (self.page_count - 1) as f32) * self.page_width;

        if (target - self.offset_x).abs() < f32::EPSILON {
            return PagerUpdate { offset_changed: None, settled: true };
        }
        self.set_offset(target, true, now)
    }

    /// Scroll wheel / trackpad: one notch pages once.
    pub fn step_page(&mut self, direction: i32, now: Instant) -> PagerUpdate {
        if !self.user_interaction_enabled || direction == 0 || self.page_width <= 0.0 {
            return PagerUpdate::default();
        }
        let current = (self.animation_target().unwrap_or(self.offset_x) / self.page_width).round();
        let page = (current as i32 + direction.signum()).clamp(0, self.page_count as i32 - 1);
        self.scroll_to_page(page as usize, true, now)
    }

    fn animation_target(&self) -> Option<f32> {
        self.animation.as_ref().map(|a| a.tween.end as f32)
    }

    pub fn tick(&mut self, now: Instant) -> PagerUpdate {
        let Some(animation) = &self.animation else {
            return PagerUpdate::default();
        };
        let elapsed = now.saturating_duration_since(animation.started);
        let value = animation.tween.value_at(elapsed) as f32;
        let finished = animation.tween.is_finished(elapsed);

        let mut update = self.move_to(value);
        if finished {
            self.animation = None;
            update.settled = true;
        }
        update
    }

    fn move_to(&mut self, offset_x: f32) -> PagerUpdate {
        if offset_x == self.offset_x {
            return PagerUpdate::default();
        }
        self.offset_x = offset_x;
        PagerUpdate {
            offset_changed: Some(offset_x),
            settled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pager() -> PagedScroll {
        PagedScroll::new(400.0, 4, Duration::from_millis(300))
    }

    #[test]
    fn immediate_offset_reports_change() {
        let mut pager = pager();
        let update = pager.set_offset(650.0, false, Instant::now());
        assert_eq!(update.offset_changed, Some(650.0));
        assert_eq!(pager.offset_x(), 650.0);
    }

    #[test]
    fn animated_offset_settles_at_target() {
        let mut pager = pager();
        let start = Instant::now();
        pager.set_offset(800.0, true, start);
        assert!(pager.is_animating());

        let mid = pager.tick(start + Duration::from_millis(150));
        assert!(!mid.settled);
        let mid_offset = mid.offset_changed.expect("moved");
        assert!(mid_offset > 0.0 && mid_offset < 800.0);

        let end = pager.tick(start + Duration::from_millis(300));
        assert!(end.settled);
        assert_eq!(pager.offset_x(), 800.0);
        assert!(!pager.is_animating());
    }

    #[test]
    fn drag_is_clamped_to_content() {
        let mut pager = pager();
        assert!(pager.begin_drag());
        pager.drag_by(100.0);
        assert_eq!(pager.offset_x(), 0.0);
        pager.drag_by(-5000.0);
        assert_eq!(pager.offset_x(), 1200.0);
    }

    #[test]
    fn release_snaps_to_nearest_page() {
        let mut pager = pager();
        let now = Instant::now();
        pager.begin_drag();
        pager.drag_by(-260.0);
        pager.end_drag(0.0, now);
        pager.tick(now + Duration::from_secs(1));
        assert_eq!(pager.offset_x(), 400.0);
    }

    #[test]
    fn fling_advances_one_page() {
        let mut pager = pager();
        let now = Instant::now();
        pager.begin_drag();
        pager.drag_by(-60.0);
        pager.end_drag(-900.0, now);
        pager.tick(now + Duration::from_secs(1));
        assert_eq!(pager.offset_x(), 400.0);
    }

    #[test]
    fn release_on_a_page_settles_immediately() {
        let mut pager = pager();
        pager.begin_drag();
        let update = pager.end_drag(0.0, Instant::now());
        assert!(update.settled);
    }

    #[test]
    fn locked_pager_refuses_drags_and_steps() {
        let mut pager = pager();
        pager.user_interaction_enabled = false;
        assert!(!pager.begin_drag());
        assert_eq!(pager.step_page(1, Instant::now()), PagerUpdate::default());
    }

    #[test]
    fn resize_keeps_progress() {
        let mut pager = pager();
        pager.set_offset(600.0, false, Instant::now());
        pager.set_page_width(200.0);
        assert_eq!(pager.offset_x(), 300.0);
    }
}
