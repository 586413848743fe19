// config.rs - stored preferences (read only) and screen tunables, both JSON

use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::AvatarColor;

/// Values the rest of the app writes; this screen only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Tilt ("perspective") effect on the 3D background.
    pub perspective_enabled: bool,
    pub avatar_color: i32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            perspective_enabled: true,
            avatar_color: 1,
        }
    }
}

impl Preferences {
    pub fn avatar_color(&self) -> AvatarColor {
        AvatarColor::from_raw(self.avatar_color).unwrap_or_else(|| {
            log::warn!("unknown avatar color {}, using stock", self.avatar_color);
            AvatarColor::default()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub page_count: usize,
    pub pose_transition_ms: u64,
    pub scroll_animation_ms: u64,
    /// Fraction of the screen width that starts an edge swipe.
    pub edge_swipe_fraction: f32,
    /// Fraction of the view width where a tap returns to the lifts page.
    pub edge_tap_fraction: f32,
    pub release_velocity_threshold: f32,
    pub snap_back_progress: f32,
    pub max_horizontal_tilt_deg: f32,
    pub max_vertical_tilt_deg: f32,
    /// Model yaw per full view width of drag, radians.
    pub rotation_per_view_width: f32,
    pub intro_label_ms: u64,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            page_count: 4,
            pose_transition_ms: 60,
            scroll_animation_ms: 300,
            edge_swipe_fraction: 0.2,
            edge_tap_fraction: 0.25,
            release_velocity_threshold: 500.0,
            snap_back_progress: 2.5,
            max_horizontal_tilt_deg: 8.0,
            max_vertical_tilt_deg: 5.0,
            rotation_per_view_width: std::f32::consts::PI,
            intro_label_ms: 1000,
        }
    }
}

impl ScreenConfig {
    pub fn pose_transition(&self) -> Duration {
        Duration::from_millis(self.pose_transition_ms)
    }

    pub fn scroll_animation(&self) -> Duration {
        Duration::from_millis(self.scroll_animation_ms)
    }

    pub fn intro_label_duration(&self) -> Duration {
        Duration::from_millis(self.intro_label_ms)
    }
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Missing or broken files fall back to defaults.
pub fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match load_json(path) {
        Ok(value) => value,
        Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("{} not found, using defaults", path.display());
            T::default()
        }
        Err(e) => {
            log::warn!("{}: {e}, using defaults", path.display());
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config: ScreenConfig =
            serde_json::from_str(r#"{"scroll_animation_ms": 450}"#).expect("valid");
        assert_eq!(config.scroll_animation(), Duration::from_millis(450));
        assert_eq!(config.pose_transition(), Duration::from_millis(60));
        assert_eq!(config.page_count, 4);
    }

    #[test]
    fn preferences_default_to_tilt_on_and_stock_colour() {
        let prefs: Preferences = serde_json::from_str("{}").expect("valid");
        assert!(prefs.perspective_enabled);
        assert_eq!(prefs.avatar_color(), AvatarColor::Yellow);
    }

    #[test]
    fn unknown_colour_falls_back() {
        let prefs = Preferences {
            perspective_enabled: false,
            avatar_color: 42,
        };
        assert_eq!(prefs.avatar_color(), AvatarColor::Yellow);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let prefs: Preferences =
            load_json_or_default(Path::new("/definitely/not/here/preferences.json"));
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let path = std::env::temp_dir().join(format!("stats-config-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").expect("write temp file");
        let result: Result<ScreenConfig, _> = load_json(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
