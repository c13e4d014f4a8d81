//! Static output of the current frame: a standalone SVG of the scene and an
//! HTML page wrapping it with the side panels.

mod html;
mod svg;

pub use html::render_html;
pub use svg::{render_svg, svg_markup};

use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    #[default]
    Svg,
    Html,
    Json,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Html => "text/html; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_format_parse() {
        assert_eq!(ExportFormat::from_str("HTML").unwrap(), ExportFormat::Html);
        assert_eq!(ExportFormat::Json.to_string(), "json");
        assert!(ExportFormat::from_str("png").is_err());
    }
}
