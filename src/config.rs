use crate::camera::SurfaceSize;
use crate::code_panel::CodePanelMode;
use crate::error::{ConfigError, InputConfigError};
use crate::shapes::ResNetDepth;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const INPUT_FIELD_NAMES: [&str; 4] = ["batch", "channels", "height", "width"];

/// Largest accepted value per field, same order as [`INPUT_FIELD_NAMES`].
/// Keeps every shape and parameter count well inside `u64`.
pub const INPUT_FIELD_MAX: [u64; 4] = [65_536, 65_536, 1 << 20, 1 << 20];

/// Input tensor dimensions in NCHW order. Every field is a positive integer
/// no larger than its [`INPUT_FIELD_MAX`] entry, checked at construction and
/// on deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInputConfig", into = "RawInputConfig")]
pub struct InputConfig {
    n: u64,
    c: u64,
    h: u64,
    w: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawInputConfig {
    n: u64,
    c: u64,
    h: u64,
    w: u64,
}

impl TryFrom<RawInputConfig> for InputConfig {
    type Error = InputConfigError;

    fn try_from(value: RawInputConfig) -> Result<Self, Self::Error> {
        InputConfig::new(value.n, value.c, value.h, value.w)
    }
}

impl From<InputConfig> for RawInputConfig {
    fn from(value: InputConfig) -> Self {
        Self {
            n: value.n,
            c: value.c,
            h: value.h,
            w: value.w,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            n: 1,
            c: 3,
            h: 224,
            w: 224,
        }
    }
}

impl InputConfig {
    pub fn new(n: u64, c: u64, h: u64, w: u64) -> Result<Self, InputConfigError> {
        let fields = INPUT_FIELD_NAMES.iter().zip(INPUT_FIELD_MAX);
        for ((name, max), value) in fields.zip([n, c, h, w]) {
            if value == 0 {
                return Err(InputConfigError::ZeroDimension(name));
            }
            if value > max {
                return Err(InputConfigError::TooLarge { field: name, max });
            }
        }
        Ok(Self { n, c, h, w })
    }

    /// Parses the four form fields (batch, channels, height, width).
    pub fn parse_fields(fields: &[&str; 4]) -> Result<Self, InputConfigError> {
        let mut values = [0u64; 4];
        for (i, text) in fields.iter().enumerate() {
            let trimmed = text.trim();
            values[i] =
                trimmed
                    .parse::<u64>()
                    .map_err(|_| InputConfigError::NotAnInteger {
                        field: INPUT_FIELD_NAMES[i],
                        value: trimmed.to_string(),
                    })?;
        }
        Self::new(values[0], values[1], values[2], values[3])
    }

    pub fn n(&self) -> u64 {
        self.n
    }

    pub fn c(&self) -> u64 {
        self.c
    }

    pub fn h(&self) -> u64 {
        self.h
    }

    pub fn w(&self) -> u64 {
        self.w
    }

    pub fn as_array(&self) -> [u64; 4] {
        [self.n, self.c, self.h, self.w]
    }
}

impl core::fmt::Display for InputConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.n, self.c, self.h, self.w)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorOptions {
    pub depth: ResNetDepth,
    pub code_panel_mode: CodePanelMode,
    pub surface: SurfaceSize,
    pub fit_padding: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub input: InputConfig,
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self {
            depth: ResNetDepth::ResNet50,
            code_panel_mode: CodePanelMode::Generic,
            surface: SurfaceSize::new(1200.0, 640.0),
            fit_padding: 40.0,
            min_zoom: 0.1,
            max_zoom: 8.0,
            input: InputConfig::default(),
        }
    }
}

impl NavigatorOptions {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let options = Self::from_json_str(&text)?;
        log::info!("Loaded navigator options from {}", path.display());
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom > 0.0) || self.min_zoom > self.max_zoom {
            return Err(ConfigError::ZoomBounds {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        if !self.fit_padding.is_finite() || self.fit_padding < 0.0 {
            return Err(ConfigError::FitPadding(self.fit_padding));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fields_trims_whitespace() {
        let config = InputConfig::parse_fields(&[" 2", "3 ", "128", "96"]).unwrap();
        assert_eq!(config.as_array(), [2, 3, 128, 96]);
    }

    #[test]
    fn test_parse_fields_rejects_negative() {
        let err = InputConfig::parse_fields(&["1", "3", "-224", "224"]).unwrap_err();
        assert_eq!(
            err,
            InputConfigError::NotAnInteger {
                field: "height",
                value: "-224".to_string()
            }
        );
    }

    #[test]
    fn test_new_rejects_oversized_fields() {
        assert_eq!(
            InputConfig::new(1, 10_000_000_000_000_000, 224, 224),
            Err(InputConfigError::TooLarge {
                field: "channels",
                max: 65_536
            })
        );
        assert!(InputConfig::new(65_536, 65_536, 1 << 20, 1 << 20).is_ok());
        assert!(matches!(
            InputConfig::new(1, 3, u64::MAX, 224),
            Err(InputConfigError::TooLarge { field: "height", .. })
        ));
    }

    #[test]
    fn test_deserialize_rejects_zero() {
        let res: Result<InputConfig, _> = serde_json::from_str(r#"{"n":1,"c":0,"h":8,"w":8}"#);
        assert!(res.is_err());
    }
}
