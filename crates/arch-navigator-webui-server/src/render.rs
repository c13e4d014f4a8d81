use anyhow::{Context, Result};
use arch_navigator::export::{ExportFormat, render_html, render_svg};
use arch_navigator::{ArchitectureNavigator, InputConfig, NavigatorOptions, ResNetDepth};
use serde::Deserialize;
use std::str::FromStr;

/// Query string of `GET /render`. Missing input fields fall back to the
/// defaults; `path` is a comma separated list of node labels to click.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RenderQuery {
    pub format: Option<String>,
    pub path: Option<String>,
    pub depth: Option<String>,
    pub n: Option<u64>,
    pub c: Option<u64>,
    pub h: Option<u64>,
    pub w: Option<u64>,
}

pub(crate) struct Rendered {
    pub content_type: &'static str,
    pub body: String,
}

pub(crate) fn render_query(query: &RenderQuery) -> Result<Rendered> {
    let format = match &query.format {
        Some(x) => ExportFormat::from_str(x).with_context(|| format!("Unknown format \"{x}\""))?,
        None => ExportFormat::default(),
    };
    let mut options = NavigatorOptions::default();
    if let Some(depth) = &query.depth {
        options.depth =
            ResNetDepth::from_str(depth).with_context(|| format!("Unknown depth \"{depth}\""))?;
    }
    let base = options.input;
    options.input = InputConfig::new(
        query.n.unwrap_or(base.n()),
        query.c.unwrap_or(base.c()),
        query.h.unwrap_or(base.h()),
        query.w.unwrap_or(base.w()),
    )?;

    let mut navigator = ArchitectureNavigator::new(options)?;
    let labels = query
        .path
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .collect::<Vec<_>>();
    navigator.navigate_labels(&labels)?;

    let body = match format {
        ExportFormat::Svg => render_svg(navigator.scene(), navigator.camera(), navigator.surface()),
        ExportFormat::Html => render_html(&navigator),
        ExportFormat::Json => serde_json::to_string(&navigator.snapshot())?,
    };
    Ok(Rendered {
        content_type: format.content_type(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_path() {
        let query = RenderQuery {
            format: Some("json".into()),
            path: Some("Backbone, Stage 2".into()),
            ..Default::default()
        };
        let rendered = render_query(&query).unwrap();
        assert_eq!(rendered.content_type, "application/json");
        let value: serde_json::Value = serde_json::from_str(&rendered.body).unwrap();
        assert_eq!(value["level"], "Stage");
    }

    #[test]
    fn test_render_rejects_bad_input() {
        let zero = RenderQuery {
            h: Some(0),
            ..Default::default()
        };
        assert!(render_query(&zero).is_err());

        let huge = RenderQuery {
            c: Some(10_000_000_000_000_000),
            ..Default::default()
        };
        let err = render_query(&huge).err().unwrap();
        assert!(format!("{err:#}").contains("\"channels\" must be at most 65536"));

        let unknown = RenderQuery {
            path: Some("Backbone,Stage 9".into()),
            ..Default::default()
        };
        assert!(render_query(&unknown).is_err());

        let format = RenderQuery {
            format: Some("png".into()),
            ..Default::default()
        };
        assert!(render_query(&format).is_err());
    }
}
