// error.rs - failure taxonomy for scene binding, model loading and config files

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("scene graph has no node named `{0}`")]
    MissingNode(String),
    #[error("node `{node}` still has {remaining} child node(s) after removing its model")]
    ResidualChildren { node: String, remaining: usize },
    #[error("scene has not been handed off to the screen yet")]
    NotReady,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("model asset `{0}` not found")]
    AssetNotFound(String),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("model loader thread has shut down")]
    Disconnected,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}
