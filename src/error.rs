use crate::navigation::Level;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputConfigError {
    #[error("Field \"{0}\" must be a positive integer, got 0")]
    ZeroDimension(&'static str),
    #[error("Field \"{field}\" is not a positive integer: \"{value}\"")]
    NotAnInteger { field: &'static str, value: String },
    #[error("Field \"{field}\" must be at most {max}")]
    TooLarge { field: &'static str, max: u64 },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config JSON")]
    Json(#[from] serde_json::Error),
    #[error("Zoom bounds are inverted: min {min} > max {max}")]
    ZoomBounds { min: f32, max: f32 },
    #[error("Fit padding must be a finite non-negative number, got {0}")]
    FitPadding(f32),
}

#[derive(Debug, thiserror::Error)]
pub enum NavigatorError {
    #[error("Rendering surface is missing or unusable ({width}x{height})")]
    MissingSurface { width: f32, height: f32 },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("No clickable node labelled \"{label}\" at level {level}")]
    UnknownNode { label: String, level: Level },
}

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Clipboard is not available on this platform")]
    Unavailable,
    #[error("Clipboard write failed: {0}")]
    WriteFailed(String),
}
