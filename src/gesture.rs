// gesture.rs - single-finger drag on the 3D view while paging is locked on the tail page
//
// A drag starting inside the left edge band pulls the pager back (edge swipe);
// anywhere else it spins the focused model. The mode is fixed at drag-begin.

use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    EdgeSwipe,
    ModelRotate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSession {
    pub origin_x: f32,
    pub mode: DragMode,
    pub initial_model_rotation_y: f32,
}

/// What the screen should do in response to a drag event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureCommand {
    None,
    /// Move the pager immediately, no animation.
    SetScrollOffset { offset_x: f32 },
    /// Animate the pager to a whole page and set paging interaction.
    SnapToPage {
        progress: f32,
        offset_x: f32,
        user_interaction_enabled: bool,
    },
    /// Set the focused model's yaw (radians). Camera and pager are untouched.
    RotateModel { yaw: f32 },
}

#[derive(Debug, Clone)]
pub struct GestureCoordinator {
    pub edge_threshold: f32,
    pub release_velocity_threshold: f32,
    pub snap_back_progress: f32,
    pub rotation_per_view_width: f32,
    session: Option<GestureSession>,
}

impl GestureCoordinator {
    pub fn new(edge_threshold: f32) -> Self {
        Self {
            edge_threshold,
            release_velocity_threshold: 500.0,
            snap_back_progress: 2.5,
            rotation_per_view_width: PI,
            session: None,
        }
    }

    /// Edge band is a fifth of the screen width.
    pub fn for_screen_width(screen_width: f32) -> Self {
        Self::new(screen_width / 5.0)
    }

    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Starts a session. A second begin while one is live keeps the live one.
    pub fn drag_began(&mut self, touch_x: f32, current_model_yaw: f32) -> DragMode {
        if let Some(session) = &self.session {
            log::warn!("drag began while a {:?} drag is still active, ignoring", session.mode);
            return session.mode;
        }

        let mode = if touch_x <= self.edge_threshold {
            DragMode::EdgeSwipe
        } else {
            DragMode::ModelRotate
        };
        log::debug!("drag began at x={touch_x:.1}: {mode:?}");

        self.session = Some(GestureSession {
            origin_x: touch_x,
            mode,
            initial_model_rotation_y: current_model_yaw,
        });
        mode
    }

    pub fn drag_moved(&self, touch_x: f32, page_width: f32, view_width: f32) -> GestureCommand {
        let Some(session) = &self.session else {
            return GestureCommand::None;
        };
        let dx = touch_x - session.origin_x;

        match session.mode {
            DragMode::EdgeSwipe => GestureCommand::SetScrollOffset {
                offset_x: 3.0 * page_width - dx,
            },
            DragMode::ModelRotate => {
                if view_width <= 0.0 {
                    return GestureCommand::None;
                }
                GestureCommand::RotateModel {
                    yaw: session.initial_model_rotation_y
                        + dx / view_width * self.rotation_per_view_width,
                }
            }
        }
    }

    /// Ends (or cancels) the session; both are handled the same way.
    pub fn drag_ended(
        &mut self,
        velocity_x: f32,
        current_progress: f32,
        page_width: f32,
    ) -> GestureCommand {
        let Some(session) = self.session.take() else {
            return GestureCommand::None;
        };

        match session.mode {
            DragMode::EdgeSwipe => {
                if velocity_x >= self.release_velocity_threshold
                    || current_progress < self.snap_back_progress
                {
                    GestureCommand::SnapToPage {
                        progress: 2.0,
                        offset_x: 2.0 * page_width,
                        user_interaction_enabled: true,
                    }
                } else {
                    GestureCommand::SnapToPage {
                        progress: 3.0,
                        offset_x: 3.0 * page_width,
                        user_interaction_enabled: false,
                    }
                }
            }
            DragMode::ModelRotate => GestureCommand::None,
        }
    }

    pub fn drag_cancelled(
        &mut self,
        velocity_x: f32,
        current_progress: f32,
        page_width: f32,
    ) -> GestureCommand {
        self.drag_ended(velocity_x, current_progress, page_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: f32 = 375.0;

    #[test]
    fn mode_is_decided_by_touch_location() {
        let mut edge = GestureCoordinator::for_screen_width(375.0);
        assert_eq!(edge.edge_threshold, 75.0);
        assert_eq!(edge.drag_began(10.0, 0.0), DragMode::EdgeSwipe);

        let mut rotate = GestureCoordinator::for_screen_width(375.0);
        assert_eq!(rotate.drag_began(200.0, 0.0), DragMode::ModelRotate);
    }

    #[test]
    fn threshold_itself_counts_as_edge() {
        let mut coordinator = GestureCoordinator::new(75.0);
        assert_eq!(coordinator.drag_began(75.0, 0.0), DragMode::EdgeSwipe);
    }

    #[test]
    fn only_one_session_at_a_time() {
        let mut coordinator = GestureCoordinator::new(75.0);
        coordinator.drag_began(10.0, 0.0);
        // mode is not re-evaluated from the new location
        assert_eq!(coordinator.drag_began(300.0, 1.0), DragMode::EdgeSwipe);
        assert_eq!(coordinator.session().map(|s| s.origin_x), Some(10.0));
    }

    #[test]
    fn edge_swipe_synthesises_scroll_offset() {
        let mut coordinator = GestureCoordinator::new(75.0);
        coordinator.drag_began(10.0, 0.0);
        assert_eq!(
            coordinator.drag_moved(110.0, PAGE, PAGE),
            GestureCommand::SetScrollOffset { offset_x: 3.0 * PAGE - 100.0 }
        );
    }

    #[test]
    fn fast_release_snaps_back_to_lifts_page() {
        let mut coordinator = GestureCoordinator::new(75.0);
        coordinator.drag_began(10.0, 0.0);
        assert_eq!(
            coordinator.drag_ended(600.0, 2.9, PAGE),
            GestureCommand::SnapToPage {
                progress: 2.0,
                offset_x: 2.0 * PAGE,
                user_interaction_enabled: true,
            }
        );
        assert!(!coordinator.is_active());
    }

    #[test]
    fn slow_release_past_halfway_snaps_back() {
        let mut coordinator = GestureCoordinator::new(75.0);
        coordinator.drag_began(10.0, 0.0);
        match coordinator.drag_ended(0.0, 2.0, PAGE) {
            GestureCommand::SnapToPage { progress, user_interaction_enabled, .. } => {
                assert_eq!(progress, 2.0);
                assert!(user_interaction_enabled);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn slow_short_release_returns_to_tail_and_locks() {
        let mut coordinator = GestureCoordinator::new(75.0);
        coordinator.drag_began(10.0, 0.0);
        assert_eq!(
            coordinator.drag_cancelled(0.0, 2.9, PAGE),
            GestureCommand::SnapToPage {
                progress: 3.0,
                offset_x: 3.0 * PAGE,
                user_interaction_enabled: false,
            }
        );
    }

    #[test]
    fn rotation_follows_horizontal_travel() {
        let mut coordinator = GestureCoordinator::new(75.0);
        coordinator.drag_began(200.0, 0.25);
        match coordinator.drag_moved(387.5, PAGE, 375.0) {
            GestureCommand::RotateModel { yaw } => assert!((yaw - (0.25 + PI / 2.0)).abs() < 1e-6),
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(coordinator.drag_ended(900.0, 3.0, PAGE), GestureCommand::None);
        assert!(!coordinator.is_active());
    }

    #[test]
    fn events_without_a_session_do_nothing() {
        let mut coordinator = GestureCoordinator::new(75.0);
        assert_eq!(coordinator.drag_moved(50.0, PAGE, PAGE), GestureCommand::None);
        assert_eq!(coordinator.drag_ended(0.0, 3.0, PAGE), GestureCommand::None);
    }
}
