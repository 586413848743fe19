// lib.rs - scroll-driven camera for the statistics screen's shared 3D background

pub mod config;
pub mod error;
pub mod gesture;
pub mod loader;
pub mod model;
pub mod motion;
pub mod pager;
pub mod pose;
pub mod progress;
pub mod render;
pub mod routes;
pub mod scene;
pub mod session;
pub mod tween;

pub use error::{ConfigError, LoadError, SceneError};
pub use pose::{compute_pose, CameraPose, PerturbationOffset, ScrollProgress};
pub use session::{FrameState, StatisticsSession};
