// pose.rs - scroll progress + tilt perturbation -> camera pose
//
// Five linear segments, one per stretch of the paged scroll:
//   A  progress <= 0        parked on the avatar
//   B  0 < progress <= 1    pan from general stats to measurements
//   C  1 < progress <= 2    dolly towards the dumbbells
//   D  2 < progress < 3     slide over to the focused avatar
//   E  progress >= 3        parked on the focused avatar
// Adjacent segments agree exactly at their shared boundary.

use glam::Vec3;

/// Normalised horizontal scroll position, one unit per page width.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct ScrollProgress(pub f32);

impl ScrollProgress {
    /// Progress at or beyond which the paging view locks onto the last page.
    pub const TAIL: ScrollProgress = ScrollProgress(3.0);

    /// A zero or negative page width (layout not done yet) maps to the first page.
    pub fn from_offset(offset_x: f32, page_width: f32) -> Self {
        if page_width > 0.0 {
            ScrollProgress(offset_x / page_width)
        } else {
            ScrollProgress(0.0)
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }

    pub fn segment(self) -> PoseSegment {
        let p = self.0;
        if p <= 0.0 {
            PoseSegment::A
        } else if p <= 1.0 {
            PoseSegment::B
        } else if p <= 2.0 {
            PoseSegment::C
        } else if p < 3.0 {
            PoseSegment::D
        } else {
            PoseSegment::E
        }
    }

    /// Nearest page, clamped into `0..page_count`.
    pub fn page_index(self, page_count: usize) -> usize {
        let last = page_count.saturating_sub(1) as f32;
        self.0.round().clamp(0.0, last) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseSegment {
    A,
    B,
    C,
    D,
    E,
}

/// Tilt offset in degrees, added on top of the scroll-driven orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PerturbationOffset {
    pub horizontal_angle: f32,
    pub vertical_angle: f32,
}

impl PerturbationOffset {
    pub const ZERO: PerturbationOffset = PerturbationOffset {
        horizontal_angle: 0.0,
        vertical_angle: 0.0,
    };
}

/// Camera position plus pitch (`euler_x`) and yaw (`euler_y`) in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub euler_x: f32,
    pub euler_y: f32,
}

impl CameraPose {
    pub fn lerp(&self, to: &CameraPose, t: f32) -> CameraPose {
        CameraPose {
            position: self.position.lerp(to.position, t),
            euler_x: self.euler_x + (to.euler_x - self.euler_x) * t,
            euler_y: self.euler_y + (to.euler_y - self.euler_y) * t,
        }
    }
}

/// Scroll-driven pose before perturbation, angles still in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BasePose {
    position: Vec3,
    pitch_deg: f32,
    yaw_deg: f32,
}

fn base_pose(progress: ScrollProgress) -> BasePose {
    let raw = progress.value();
    match progress.segment() {
        PoseSegment::A => BasePose {
            position: Vec3::new(1.0, 1.5, 3.5),
            pitch_deg: -6.0,
            yaw_deg: 19.0,
        },
        PoseSegment::B => {
            let p = raw;
            BasePose {
                position: Vec3::new(1.0 - p, 1.5, 3.5),
                pitch_deg: -6.0,
                yaw_deg: 19.0 - 44.0 * p,
            }
        }
        PoseSegment::C => {
            let p = raw - 1.0;
            BasePose {
                position: Vec3::new(3.0 * p, 1.5 - 0.5 * p, 3.5 - p),
                pitch_deg: -6.0 - 10.0 * p,
                yaw_deg: -25.0 + 22.0 * p,
            }
        }
        PoseSegment::D => {
            let p = raw - 2.0;
            BasePose {
                position: Vec3::new(3.0 + 2.0 * p, 1.0 + 0.2 * p, 2.5),
                pitch_deg: -16.0 - p,
                yaw_deg: -3.0 + 3.0 * p,
            }
        }
        PoseSegment::E => BasePose {
            position: Vec3::new(5.0, 1.2, 2.5),
            pitch_deg: -17.0,
            yaw_deg: 0.0,
        },
    }
}

/// Pure and total: defined for every real progress, never accumulated.
pub fn compute_pose(progress: ScrollProgress, perturbation: PerturbationOffset) -> CameraPose {
    let base = base_pose(progress);
    // Convert separately so the perturbation stays strictly additive in radians.
    CameraPose {
        position: base.position,
        euler_x: base.pitch_deg.to_radians() + perturbation.vertical_angle.to_radians(),
        euler_y: base.yaw_deg.to_radians() + perturbation.horizontal_angle.to_radians(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn assert_pose_close(a: &CameraPose, b: &CameraPose, tol: f32) {
        assert!(
            (a.position - b.position).abs().max_element() <= tol,
            "position {:?} vs {:?}",
            a.position,
            b.position
        );
        assert!((a.euler_x - b.euler_x).abs() <= tol, "euler_x {} vs {}", a.euler_x, b.euler_x);
        assert!((a.euler_y - b.euler_y).abs() <= tol, "euler_y {} vs {}", a.euler_y, b.euler_y);
    }

    #[test]
    fn segments_are_selected_by_half_open_ranges() {
        assert_eq!(ScrollProgress(-0.5).segment(), PoseSegment::A);
        assert_eq!(ScrollProgress(0.0).segment(), PoseSegment::A);
        assert_eq!(ScrollProgress(1.0).segment(), PoseSegment::B);
        assert_eq!(ScrollProgress(2.0).segment(), PoseSegment::C);
        assert_eq!(ScrollProgress(2.999).segment(), PoseSegment::D);
        assert_eq!(ScrollProgress(3.0).segment(), PoseSegment::E);
        assert_eq!(ScrollProgress(12.0).segment(), PoseSegment::E);
    }

    #[test]
    fn pose_is_continuous_at_every_boundary() {
        for boundary in [0.0f32, 1.0, 2.0, 3.0] {
            let at = compute_pose(ScrollProgress(boundary), PerturbationOffset::ZERO);
            let below = compute_pose(ScrollProgress(boundary - EPS), PerturbationOffset::ZERO);
            let above = compute_pose(ScrollProgress(boundary + EPS), PerturbationOffset::ZERO);
            assert_pose_close(&below, &at, 1e-3);
            assert_pose_close(&above, &at, 1e-3);
        }
    }

    #[test]
    fn boundary_values_match_both_formulas_exactly() {
        // C at p=1 and D at p=0 both land on (3, 1, 2.5), (-16°, -3°)
        let at_two = base_pose(ScrollProgress(2.0));
        assert_eq!(at_two.position, Vec3::new(3.0, 1.0, 2.5));
        assert_eq!(at_two.pitch_deg, -16.0);
        assert_eq!(at_two.yaw_deg, -3.0);

        let at_one = base_pose(ScrollProgress(1.0));
        assert_eq!(at_one.position, Vec3::new(0.0, 1.5, 3.5));
        assert_eq!(at_one.yaw_deg, -25.0);
    }

    #[test]
    fn mid_segment_c_matches_worked_example() {
        let pose = compute_pose(ScrollProgress(1.5), PerturbationOffset::ZERO);
        assert_eq!(pose.position, Vec3::new(1.5, 1.25, 3.0));
        assert!((pose.euler_x - (-11.0f32).to_radians()).abs() < 1e-6);
        assert!((pose.euler_y - (-14.0f32).to_radians()).abs() < 1e-6);
    }

    #[test]
    fn parked_segments_ignore_how_far_out_of_range_progress_is() {
        let far_left = compute_pose(ScrollProgress(-40.0), PerturbationOffset::ZERO);
        assert_eq!(far_left.position, Vec3::new(1.0, 1.5, 3.5));
        let far_right = compute_pose(ScrollProgress(9.0), PerturbationOffset::ZERO);
        assert_eq!(far_right.position, Vec3::new(5.0, 1.2, 2.5));
        assert_eq!(far_right.euler_y, 0.0);
    }

    #[test]
    fn perturbation_is_added_to_euler_angles_only() {
        let tilt = PerturbationOffset {
            horizontal_angle: 6.5,
            vertical_angle: -3.25,
        };
        for progress in [-1.0f32, 0.0, 0.4, 1.0, 1.7, 2.0, 2.5, 3.0, 4.2] {
            let plain = compute_pose(ScrollProgress(progress), PerturbationOffset::ZERO);
            let tilted = compute_pose(ScrollProgress(progress), tilt);
            assert_eq!(tilted.position, plain.position);
            assert_eq!(tilted.euler_x, plain.euler_x + tilt.vertical_angle.to_radians());
            assert_eq!(tilted.euler_y, plain.euler_y + tilt.horizontal_angle.to_radians());
        }
    }

    #[test]
    fn progress_from_offset_handles_unlaid_out_page() {
        assert_eq!(ScrollProgress::from_offset(750.0, 375.0), ScrollProgress(2.0));
        assert_eq!(ScrollProgress::from_offset(750.0, 0.0), ScrollProgress(0.0));
    }

    #[test]
    fn page_index_rounds_and_clamps() {
        assert_eq!(ScrollProgress(1.4).page_index(4), 1);
        assert_eq!(ScrollProgress(1.6).page_index(4), 2);
        assert_eq!(ScrollProgress(-2.0).page_index(4), 0);
        assert_eq!(ScrollProgress(7.0).page_index(4), 3);
    }

    #[test]
    fn lerp_halfway_between_poses() {
        let a = compute_pose(ScrollProgress(0.0), PerturbationOffset::ZERO);
        let b = compute_pose(ScrollProgress(3.0), PerturbationOffset::ZERO);
        let mid = a.lerp(&b, 0.5);
        assert_pose_close(&mid, &CameraPose {
            position: Vec3::new(3.0, 1.35, 3.0),
            euler_x: (a.euler_x + b.euler_x) / 2.0,
            euler_y: (a.euler_y + b.euler_y) / 2.0,
        }, 1e-6);
    }
}
