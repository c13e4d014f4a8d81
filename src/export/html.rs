use super::svg::svg_markup;
use crate::code_panel::{PythonHighlighter, SyntaxHighlighter, TokenKind, highlight_or_plain};
use crate::levels::{RESIDUAL_FORMULA, format_count};
use crate::navigation::LevelPayload;
use crate::navigator::ArchitectureNavigator;
use maud::{DOCTYPE, Markup, PreEscaped, html};

const STYLE: &str = "\
body { font-family: Helvetica, Arial, sans-serif; margin: 0; display: flex; color: #1a202c; }
main { flex: 1; padding: 16px; }
aside { width: 420px; padding: 16px; background: #f7fafc; border-left: 1px solid #e2e8f0; }
nav.breadcrumb { font-size: 14px; margin-bottom: 8px; }
section.formula { background: #fffaf0; border: 1px solid #d9822b; padding: 8px 12px; margin: 8px 0; }
table.shapes { border-collapse: collapse; font-size: 12px; width: 100%; }
table.shapes td, table.shapes th { border-bottom: 1px solid #e2e8f0; padding: 2px 6px; text-align: left; }
pre.code { background: #1e1e1e; color: #d4d4d4; padding: 10px; font-size: 12px; overflow-x: auto; }
.tok-keyword { color: #c586c0; }
.tok-builtin { color: #4ec9b0; }
.tok-string { color: #ce9178; }
.tok-number { color: #b5cea8; }
.tok-comment { color: #6a9955; }
path.edge:hover { stroke: #2b6cb0; stroke-dasharray: 6 4; animation: edge-dash 0.6s linear infinite; }
@keyframes edge-dash { to { stroke-dashoffset: -10; } }
";

/// Standalone page: breadcrumb and diagram on the left; formula panel (at the
/// residual level), shape table and code on the right.
pub fn render_html(navigator: &ArchitectureNavigator) -> String {
    let breadcrumb = navigator.breadcrumb();
    let page = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (navigator.options().depth.to_string()) " · " (breadcrumb) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                main {
                    nav class="breadcrumb" { (breadcrumb) }
                    (svg_markup(navigator.scene(), navigator.camera(), navigator.surface()))
                }
                aside {
                    @if navigator.show_formula_panel() {
                        (formula_panel(navigator))
                    }
                    (shape_table(navigator))
                    (code_panel(navigator.code()))
                }
            }
        }
    };
    page.into_string()
}

fn formula_panel(navigator: &ArchitectureNavigator) -> Markup {
    let shortcut = match navigator.top().payload() {
        LevelPayload::Residual(target) if target.has_projection() => Some(format!(
            "Block {} of stage {} changes the shape, so x passes through a 1×1 projection (stride {}) before the add.",
            target.block,
            target.stage,
            target.stride()
        )),
        LevelPayload::Residual(target) => Some(format!(
            "Block {} of stage {} keeps the shape, so x is added unchanged.",
            target.block, target.stage
        )),
        _ => None,
    };
    html! {
        section class="formula" {
            h3 { "Residual connection" }
            p { code { (RESIDUAL_FORMULA) } }
            @if let Some(shortcut) = shortcut {
                p { (shortcut) }
            }
        }
    }
}

fn shape_table(navigator: &ArchitectureNavigator) -> Markup {
    let shapes = navigator.shape_table();
    html! {
        h3 { "Shapes for input " (navigator.input().to_string()) }
        table class="shapes" {
            tr { th { "Layer" } th { "Shape" } th { "Scale" } th { "Params" } }
            @for row in shapes.rows() {
                tr {
                    td { (row.name) }
                    td { (row.format_shape()) }
                    td { (row.scale) }
                    td { (format_count(row.parameters)) }
                }
            }
            tr {
                th colspan="3" { "Total" }
                th { (format_count(shapes.total_parameters())) }
            }
        }
    }
}

fn code_panel(code: &str) -> Markup {
    let highlighter = PythonHighlighter::new();
    let highlighter = highlighter.as_ref().map(|x| x as &dyn SyntaxHighlighter);
    html! {
        h3 { "PyTorch" }
        pre class="code" {
            code {
                @for span in highlight_or_plain(highlighter, code) {
                    @match token_class(span.kind) {
                        Some(class) => {
                            span class=(class) { (&code[span.range]) }
                        }
                        None => {
                            (&code[span.range])
                        }
                    }
                }
            }
        }
    }
}

fn token_class(kind: TokenKind) -> Option<&'static str> {
    match kind {
        TokenKind::Plain => None,
        TokenKind::Keyword => Some("tok-keyword"),
        TokenKind::Builtin => Some("tok-builtin"),
        TokenKind::String => Some("tok-string"),
        TokenKind::Number => Some("tok-number"),
        TokenKind::Comment => Some("tok-comment"),
    }
}
