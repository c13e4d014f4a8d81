use arch_navigator::code_panel::{
    Clipboard, CodePanelMode, CopyOutcome, PythonHighlighter, SyntaxHighlighter, TokenKind,
    code_for, copy_code, highlight_or_plain,
};
use arch_navigator::export::{render_html, render_svg};
use arch_navigator::navigation::Level;
use arch_navigator::{
    ArchitectureNavigator, ClipboardError, ConfigError, NavigatorError, NavigatorOptions,
    ResNetDepth,
};
use std::io::Write;
use strum::IntoEnumIterator;

fn navigator_at(labels: &[&str]) -> ArchitectureNavigator {
    let mut navigator = ArchitectureNavigator::new(NavigatorOptions::default()).unwrap();
    navigator.navigate_labels(labels).unwrap();
    navigator
}

#[test]
fn test_svg_matches_scene() {
    let navigator = navigator_at(&["Backbone", "Stage 2", "Block 1"]);
    let scene = navigator.scene();
    let svg = render_svg(scene, navigator.camera(), navigator.surface());

    assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"1200\""));
    assert_eq!(svg.matches("<rect ").count(), scene.nodes().len());
    assert_eq!(svg.matches("<path class=\"edge").count(), scene.edges().len());
    assert_eq!(svg.matches("<path class=\"edge skip\"").count(), 1);
    assert_eq!(svg.matches("<circle ").count(), scene.ports().len());
    assert!(svg.contains(&navigator.camera().svg_transform()));
    assert!(svg.contains("y = ReLU(F(x) + x)"));
    assert!(svg.contains("W_s · x"));
    // only F(x) is clickable here
    assert_eq!(svg.matches("class=\"node clickable\"").count(), 1);
    assert!(svg.contains("data-target=\"Fx\""));
}

#[test]
fn test_html_formula_panel_only_at_residual() {
    for (labels, expect_formula) in [
        (vec![], false),
        (vec!["Backbone", "Stage 2"], false),
        (vec!["Backbone", "Stage 2", "Block 3"], true),
        (vec!["Backbone", "Stage 2", "Block 3", "F(x)"], false),
    ] {
        let navigator = navigator_at(&labels);
        let html = render_html(&navigator);
        assert_eq!(
            html.contains("<section class=\"formula\">"),
            expect_formula,
            "at {}",
            navigator.breadcrumb()
        );
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(&format!(
            "<nav class=\"breadcrumb\">{}</nav>",
            navigator.breadcrumb()
        )));
        assert!(html.contains("<svg"));
        assert_eq!(html.matches("<tr><td>").count(), navigator.shape_table().rows().count());
        assert!(html.contains("<pre class=\"code\"><code>"));
    }
}

#[test]
fn test_html_escapes_code() {
    let navigator = navigator_at(&["Backbone"]);
    let html = render_html(&navigator);
    assert!(html.contains("<span class=\"tok-keyword\">class</span>"));
    assert!(html.contains("<span class=\"tok-keyword\">import</span>"));
    assert!(html.contains("<span class=\"tok-builtin\">super</span>"));
    assert!(html.contains("<span class=\"tok-comment\"># 256 channels, stride 4"));
    // every byte of the snippet survives highlighting
    let start = html.find("<pre class=\"code\"><code>").unwrap();
    let body = &html[start..];
    assert!(!body.contains("<span class=\"tok-plain"));
}

#[test]
fn test_code_for_every_level() {
    for level in Level::iter() {
        let code = code_for(level);
        assert!(code.contains("import torch"), "{level}");
        let spans = highlight_or_plain(None, code);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].kind, TokenKind::Plain);
        assert_eq!(spans[0].range, 0..code.len());
    }
    assert!(code_for(Level::Residual).contains("self.shortcut"));
    assert!(code_for(Level::Fx).contains("nn.Conv2d(mid, mid, 3"));
}

#[test]
fn test_code_panel_mode() {
    let generic = navigator_at(&["Backbone", "Stage 2", "Block 3"]);
    assert_eq!(generic.code(), code_for(Level::Residual));

    let mut annotated = ArchitectureNavigator::new(NavigatorOptions {
        code_panel_mode: CodePanelMode::Annotated,
        ..NavigatorOptions::default()
    })
    .unwrap();
    annotated
        .navigate_labels(&["Backbone", "Stage 2", "Block 3"])
        .unwrap();
    assert!(annotated.code().starts_with("# layer2[2]: 512 -> 512 channels at 28x28\n"));
    assert!(annotated.code().ends_with(code_for(Level::Residual)));
    annotated.back();
    assert!(annotated.code().starts_with("# layer2: 4 blocks"));
    annotated.back();
    assert_eq!(annotated.code(), code_for(Level::Backbone));
}

struct FailingClipboard;

impl Clipboard for FailingClipboard {
    fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::WriteFailed("permission denied".into()))
    }
}

struct UnavailableClipboard;

impl Clipboard for UnavailableClipboard {
    fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable)
    }
}

#[derive(Default)]
struct MemoryClipboard(Option<String>);

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.0 = Some(text.to_string());
        Ok(())
    }
}

#[test]
fn test_copy_code_fallbacks() {
    let code = code_for(Level::ConvBlock);
    assert_eq!(copy_code(None, code), CopyOutcome::Fallback(code.to_string()));
    assert_eq!(
        copy_code(Some(&mut FailingClipboard), code),
        CopyOutcome::Fallback(code.to_string())
    );
    let mut clipboard = MemoryClipboard::default();
    assert_eq!(copy_code(Some(&mut clipboard), code), CopyOutcome::Copied);
    assert_eq!(clipboard.0.as_deref(), Some(code));

    let highlighter = PythonHighlighter::new().unwrap();
    let highlighter: &dyn SyntaxHighlighter = &highlighter;
    let spans = highlight_or_plain(Some(highlighter), code);
    assert!(spans.iter().any(|x| x.kind == TokenKind::Keyword));
    let rebuilt = spans.iter().map(|x| &code[x.range.clone()]).collect::<String>();
    assert_eq!(rebuilt, code);

    let mut unavailable = UnavailableClipboard;
    assert_eq!(
        copy_code(Some(&mut unavailable), code),
        CopyOutcome::Fallback(code.to_string())
    );
}

#[test]
fn test_load_options_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"depth": "ResNet152", "code_panel_mode": "Annotated", "input": {{"n": 8, "c": 1, "h": 96, "w": 128}}}}"#
    )
    .unwrap();
    let options = NavigatorOptions::load(file.path()).unwrap();
    assert_eq!(options.depth, ResNetDepth::ResNet152);
    assert_eq!(options.code_panel_mode, CodePanelMode::Annotated);
    assert_eq!(options.input.as_array(), [8, 1, 96, 128]);
    // omitted fields keep their defaults
    assert_eq!(options.surface, NavigatorOptions::default().surface);

    let navigator = ArchitectureNavigator::new(options).unwrap();
    assert_eq!(navigator.shape_table().conv1.shape, vec![8, 64, 48, 64]);
}

#[test]
fn test_invalid_options() {
    assert!(matches!(
        NavigatorOptions::from_json_str(r#"{"min_zoom": 4.0, "max_zoom": 2.0}"#),
        Err(ConfigError::ZoomBounds { .. })
    ));
    assert!(matches!(
        NavigatorOptions::from_json_str(r#"{"input": {"n": 1, "c": 3, "h": 0, "w": 224}}"#),
        Err(ConfigError::Json(_))
    ));
    assert!(matches!(
        NavigatorOptions::from_json_str(r#"{"fit_padding": -4.0}"#),
        Err(ConfigError::FitPadding(_))
    ));
    let options = NavigatorOptions {
        fit_padding: f32::INFINITY,
        ..NavigatorOptions::default()
    };
    assert!(matches!(options.validate(), Err(ConfigError::FitPadding(_))));
    assert!(matches!(
        ArchitectureNavigator::new(options),
        Err(NavigatorError::Config(ConfigError::FitPadding(_)))
    ));
    assert!(matches!(
        NavigatorOptions::from_json_str(r#"{"input": {"n": 1, "c": 3, "h": 2000000, "w": 224}}"#),
        Err(ConfigError::Json(_))
    ));
    assert!(matches!(
        NavigatorOptions::from_json_str("{"),
        Err(ConfigError::Json(_))
    ));
    assert!(matches!(
        NavigatorOptions::load(std::path::Path::new("/nonexistent/options.json")),
        Err(ConfigError::Io(_))
    ));
}
