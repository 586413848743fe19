// motion.rs - device tilt (viewer offset) -> bounded camera angle offset

use crate::pose::PerturbationOffset;

pub const DEFAULT_MAX_HORIZONTAL_ANGLE: f32 = 8.0;
pub const DEFAULT_MAX_VERTICAL_ANGLE: f32 = 5.0;

/// Scales a viewer offset in `[-1, 1]` on each axis into degrees.
/// A tilt source that is unavailable simply never calls `update`.
#[derive(Debug, Clone)]
pub struct PerturbationSource {
    max_horizontal_angle: f32,
    max_vertical_angle: f32,
    current: PerturbationOffset,
}

impl Default for PerturbationSource {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HORIZONTAL_ANGLE, DEFAULT_MAX_VERTICAL_ANGLE)
    }
}

impl PerturbationSource {
    pub fn new(max_horizontal_angle: f32, max_vertical_angle: f32) -> Self {
        Self {
            max_horizontal_angle: max_horizontal_angle.abs(),
            max_vertical_angle: max_vertical_angle.abs(),
            current: PerturbationOffset::ZERO,
        }
    }

    pub fn update(
        &mut self,
        viewer_offset_horizontal: f32,
        viewer_offset_vertical: f32,
    ) -> PerturbationOffset {
        let h = unit_offset(viewer_offset_horizontal);
        let v = unit_offset(viewer_offset_vertical);

        self.current = PerturbationOffset {
            horizontal_angle: self.max_horizontal_angle * h,
            vertical_angle: self.max_vertical_angle * v,
        };
        self.current
    }

    pub fn reset(&mut self) -> PerturbationOffset {
        self.current = PerturbationOffset::ZERO;
        self.current
    }

    pub fn offset(&self) -> PerturbationOffset {
        self.current
    }
}

// NaN from the sensor must not reach the pose
fn unit_offset(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_scales_linearly_by_the_maxima() {
        let mut source = PerturbationSource::default();
        let offset = source.update(0.5, -1.0);
        assert_eq!(offset.horizontal_angle, 4.0);
        assert_eq!(offset.vertical_angle, -5.0);
        assert_eq!(source.offset(), offset);
    }

    #[test]
    fn update_never_exceeds_the_maxima() {
        let mut source = PerturbationSource::default();
        let offset = source.update(3.0, -7.5);
        assert_eq!(offset.horizontal_angle, 8.0);
        assert_eq!(offset.vertical_angle, -5.0);
    }

    #[test]
    fn non_finite_signal_contributes_nothing() {
        let mut source = PerturbationSource::default();
        let offset = source.update(f32::NAN, f32::INFINITY);
        assert_eq!(offset, PerturbationOffset::ZERO);
    }

    #[test]
    fn reset_always_zeroes() {
        let mut source = PerturbationSource::default();
        assert_eq!(source.reset(), PerturbationOffset::ZERO);
        source.update(0.9, 0.3);
        assert_eq!(source.reset(), PerturbationOffset::ZERO);
        assert_eq!(source.offset(), PerturbationOffset::ZERO);
    }
}
