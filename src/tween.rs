// tween.rs - time based interpolation helpers (number labels, pager animation, hint fades)

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    EaseOut,
    EaseInOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// Interpolates from `start` to `end` over `duration`. Stateless: callers keep the clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberTween {
    pub start: f64,
    pub end: f64,
    pub duration: Duration,
    pub easing: Easing,
}

impl NumberTween {
    pub fn new(start: f64, end: f64, duration: Duration) -> Self {
        Self {
            start,
            end,
            duration,
            easing: Easing::Linear,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn fraction(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() || elapsed >= self.duration {
            return 1.0;
        }
        self.easing
            .apply(elapsed.as_secs_f64() / self.duration.as_secs_f64())
    }

    pub fn value_at(&self, elapsed: Duration) -> f64 {
        if self.is_finished(elapsed) {
            return self.end;
        }
        self.start + (self.end - self.start) * self.fraction(elapsed)
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

/// One decimal, trailing `.0` dropped: 18.0 -> "18", 18.25 -> "18.3".
pub fn format_number(value: f64) -> String {
    let text = format!("{value:.1}");
    match text.strip_suffix(".0") {
        Some(whole) if whole == "-0" => "0".to_string(),
        Some(whole) => whole.to_string(),
        None => text,
    }
}

/// A counting label, e.g. the body-fat percentage on first appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelAnimation {
    pub tween: NumberTween,
    pub suffix: String,
}

impl LabelAnimation {
    pub fn new(tween: NumberTween, suffix: impl Into<String>) -> Self {
        Self {
            tween,
            suffix: suffix.into(),
        }
    }

    pub fn text_at(&self, elapsed: Duration) -> String {
        format!("{}{}", format_number(self.tween.value_at(elapsed)), self.suffix)
    }
}

/// Fade in, then fade out, then gone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeEnvelope {
    pub fade_in: Duration,
    pub fade_out: Duration,
}

impl FadeEnvelope {
    pub const EDGE_HINT: FadeEnvelope = FadeEnvelope {
        fade_in: Duration::from_millis(500),
        fade_out: Duration::from_millis(1500),
    };

    pub fn alpha_at(&self, elapsed: Duration) -> f32 {
        if elapsed < self.fade_in {
            return NumberTween::new(0.0, 1.0, self.fade_in).value_at(elapsed) as f32;
        }
        let out = elapsed - self.fade_in;
        NumberTween::new(1.0, 0.0, self.fade_out).value_at(out) as f32
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.fade_in + self.fade_out
    }
}
