// render.rs - the only writer of the live camera: applies poses, optionally over a short transition

use std::time::{Duration, Instant};

use glam::{EulerRot, Mat4, Quat};

use crate::pose::CameraPose;

/// Live-scroll pose changes blend over this window.
pub const POSE_TRANSITION: Duration = Duration::from_millis(60);

/// Whatever owns the actual camera node.
pub trait CameraTarget {
    fn set_camera_pose(&mut self, pose: &CameraPose);
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    from: CameraPose,
    to: CameraPose,
    started: Instant,
}

#[derive(Debug, Clone)]
pub struct CameraRig {
    transition_duration: Duration,
    current: Option<CameraPose>,
    transition: Option<Transition>,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(POSE_TRANSITION)
    }
}

impl CameraRig {
    pub fn new(transition_duration: Duration) -> Self {
        Self {
            transition_duration,
            current: None,
            transition: None,
        }
    }

    /// `animated` blends from whatever is on screen now. The first pose ever,
    /// or a non-animated one, lands immediately.
    pub fn apply(&mut self, pose: CameraPose, animated: bool, now: Instant) {
        let on_screen = self.sample(now);
        match on_screen {
            Some(from) if animated && !self.transition_duration.is_zero() => {
                self.transition = Some(Transition {
                    from,
                    to: pose,
                    started: now,
                });
            }
            _ => {
                self.transition = None;
            }
        }
        self.current = Some(pose);
    }

    /// Target pose of the latest `apply`, ignoring any running transition.
    pub fn target(&self) -> Option<CameraPose> {
        self.current
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn sample(&self, now: Instant) -> Option<CameraPose> {
        match &self.transition {
            Some(t) => {
                let elapsed = now.saturating_duration_since(t.started);
                if elapsed >= self.transition_duration {
                    Some(t.to)
                } else {
                    let k = elapsed.as_secs_f32() / self.transition_duration.as_secs_f32();
                    Some(t.from.lerp(&t.to, k))
                }
            }
            None => self.current,
        }
    }

    /// Writes the pose for `now` into the camera; drops finished transitions.
    pub fn present(&mut self, now: Instant, target: &mut impl CameraTarget) {
        let Some(pose) = self.sample(now) else {
            return;
        };
        if let Some(t) = &self.transition {
            if now.saturating_duration_since(t.started) >= self.transition_duration {
                self.transition = None;
            }
        }
        target.set_camera_pose(&pose);
    }
}

/// Camera-to-world rotation: yaw about Y, then pitch about X.
pub fn camera_rotation(pose: &CameraPose) -> Quat {
    Quat::from_euler(EulerRot::YXZ, pose.euler_y, pose.euler_x, 0.0)
}

pub fn view_matrix(pose: &CameraPose) -> Mat4 {
    Mat4::from_rotation_translation(camera_rotation(pose), pose.position).inverse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{compute_pose, PerturbationOffset, ScrollProgress};
    use glam::Vec3;

    #[derive(Default)]
    struct Recorder(Vec<CameraPose>);

    impl CameraTarget for Recorder {
        fn set_camera_pose(&mut self, pose: &CameraPose) {
            self.0.push(*pose);
        }
    }

    fn pose_at(progress: f32) -> CameraPose {
        compute_pose(ScrollProgress(progress), PerturbationOffset::ZERO)
    }

    #[test]
    fn first_pose_is_applied_without_transition() {
        let mut rig = CameraRig::default();
        let now = Instant::now();
        rig.apply(pose_at(1.0), true, now);
        assert!(!rig.is_transitioning());
        assert_eq!(rig.sample(now), Some(pose_at(1.0)));
    }

    #[test]
    fn animated_apply_blends_over_sixty_millis() {
        let mut rig = CameraRig::default();
        let t0 = Instant::now();
        rig.apply(pose_at(0.0), false, t0);
        rig.apply(pose_at(1.0), true, t0);

        let halfway = rig.sample(t0 + Duration::from_millis(30)).expect("pose");
        let expected = pose_at(0.0).lerp(&pose_at(1.0), 0.5);
        assert!((halfway.position - expected.position).length() < 1e-5);

        let mut recorder = Recorder::default();
        rig.present(t0 + Duration::from_millis(60), &mut recorder);
        assert_eq!(recorder.0, vec![pose_at(1.0)]);
        assert!(!rig.is_transitioning());
    }

    #[test]
    fn immediate_apply_cancels_running_transition() {
        let mut rig = CameraRig::default();
        let t0 = Instant::now();
        rig.apply(pose_at(0.0), false, t0);
        rig.apply(pose_at(2.0), true, t0);
        rig.apply(pose_at(3.0), false, t0 + Duration::from_millis(10));
        assert!(!rig.is_transitioning());
        assert_eq!(rig.sample(t0 + Duration::from_millis(11)), Some(pose_at(3.0)));
    }

    #[test]
    fn present_before_any_pose_is_a_no_op() {
        let mut rig = CameraRig::default();
        let mut recorder = Recorder::default();
        rig.present(Instant::now(), &mut recorder);
        assert!(recorder.0.is_empty());
    }

    #[test]
    fn view_matrix_moves_camera_to_origin() {
        let pose = pose_at(1.5);
        let eye = view_matrix(&pose).transform_point3(pose.position);
        assert!(eye.length() < 1e-5);
        // zero yaw/pitch looks down -Z
        let flat = CameraPose { position: Vec3::ZERO, euler_x: 0.0, euler_y: 0.0 };
        let ahead = view_matrix(&flat).transform_point3(Vec3::new(0.0, 0.0, -1.0));
        assert!((ahead - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
    }
}
