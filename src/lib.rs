pub mod camera;
pub mod code_panel;
pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod levels;
pub mod navigation;
pub mod navigator;
pub mod scene;
pub mod shapes;

pub use camera::{Camera, SurfaceSize};
pub use config::{InputConfig, NavigatorOptions};
pub use error::{ClipboardError, ConfigError, InputConfigError, NavigatorError};
pub use navigation::{Level, LevelPayload, NavigationChange, NavigationStack};
pub use navigator::{ArchitectureNavigator, NavigatorSnapshot};
pub use shapes::{ResNetDepth, ShapeTable, compute_shapes};
