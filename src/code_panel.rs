use crate::error::ClipboardError;
use crate::navigation::{Level, LevelPayload, NavigationFrame, StageKind};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::ops::Range;
use syntect::easy::ScopeRangeIterator;
use syntect::parsing::{ParseState, Scope, ScopeStack, SyntaxSet};
use syntect::util::LinesWithEndings;

const MODEL_CODE: &str = r#"import torch
import torchvision.models as models

model = models.resnet50(weights=models.ResNet50_Weights.DEFAULT)
model.eval()

x = torch.randn(1, 3, 224, 224)
with torch.no_grad():
    logits = model(x)          # [1, 1000]
probs = logits.softmax(dim=1)
"#;

const BACKBONE_CODE: &str = r#"import torch.nn as nn

class Backbone(nn.Module):
    def __init__(self, resnet):
        super().__init__()
        self.stem = nn.Sequential(resnet.conv1, resnet.bn1, resnet.relu, resnet.maxpool)
        self.layer1 = resnet.layer1    # 256 channels, stride 4
        self.layer2 = resnet.layer2    # 512 channels, stride 8
        self.layer3 = resnet.layer3    # 1024 channels, stride 16
        self.layer4 = resnet.layer4    # 2048 channels, stride 32

    def forward(self, x):
        x = self.stem(x)
        x = self.layer1(x)
        x = self.layer2(x)
        x = self.layer3(x)
        return self.layer4(x)
"#;

const STAGE_CODE: &str = r#"import torch.nn as nn

def make_stage(in_channels, out_channels, blocks, stride):
    layers = [Bottleneck(in_channels, out_channels, stride=stride)]
    for _ in range(1, blocks):
        layers.append(Bottleneck(out_channels, out_channels, stride=1))
    return nn.Sequential(*layers)

# ResNet50: blocks = [3, 4, 6, 3]
stage = make_stage(256, 512, blocks=4, stride=2)
"#;

const RESIDUAL_CODE: &str = r#"import torch.nn as nn

class Bottleneck(nn.Module):
    def __init__(self, in_channels, out_channels, stride=1):
        super().__init__()
        self.fx = BottleneckFx(in_channels, out_channels, stride)
        self.shortcut = nn.Identity()
        if stride != 1 or in_channels != out_channels:
            self.shortcut = nn.Sequential(
                nn.Conv2d(in_channels, out_channels, 1, stride=stride, bias=False),
                nn.BatchNorm2d(out_channels),
            )
        self.relu = nn.ReLU(inplace=True)

    def forward(self, x):
        return self.relu(self.fx(x) + self.shortcut(x))   # y = F(x) + x
"#;

const FX_CODE: &str = r#"import torch.nn as nn

class BottleneckFx(nn.Module):
    def __init__(self, in_channels, out_channels, stride=1):
        super().__init__()
        mid = out_channels // 4
        self.body = nn.Sequential(
            nn.Conv2d(in_channels, mid, 1, bias=False),
            nn.BatchNorm2d(mid),
            nn.ReLU(inplace=True),
            nn.Conv2d(mid, mid, 3, stride=stride, padding=1, bias=False),
            nn.BatchNorm2d(mid),
            nn.ReLU(inplace=True),
            nn.Conv2d(mid, out_channels, 1, bias=False),
            nn.BatchNorm2d(out_channels),
        )

    def forward(self, x):
        return self.body(x)
"#;

const CONV_BLOCK_CODE: &str = r#"import torch.nn as nn

def conv_bn_relu(in_channels, out_channels, kernel, stride=1):
    return nn.Sequential(
        nn.Conv2d(in_channels, out_channels, kernel,
                  stride=stride, padding=kernel // 2, bias=False),
        nn.BatchNorm2d(out_channels),
        nn.ReLU(inplace=True),
    )
"#;

pub fn code_for(level: Level) -> &'static str {
    match level {
        Level::Model => MODEL_CODE,
        Level::Backbone => BACKBONE_CODE,
        Level::Stage => STAGE_CODE,
        Level::Residual => RESIDUAL_CODE,
        Level::Fx => FX_CODE,
        Level::ConvBlock => CONV_BLOCK_CODE,
    }
}

/// Whether the snippet should mention which stage/block the user drilled
/// into. `Generic` shows the same literal snippet for every index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CodePanelMode {
    #[default]
    Generic,
    Annotated,
}

fn annotation(payload: &LevelPayload) -> Option<String> {
    match payload {
        LevelPayload::Model | LevelPayload::Backbone => None,
        LevelPayload::Stage(target) => Some(match target.kind {
            StageKind::Stage { index, block_count } => format!(
                "# layer{index}: {block_count} blocks, {} channels, {}x{} feature map",
                target.channels, target.height, target.width
            ),
            StageKind::Head => format!(
                "# head: avgpool over {}x{} -> fc({}, 1000)",
                target.height, target.width, target.channels
            ),
        }),
        LevelPayload::Residual(target) | LevelPayload::Fx(target) => Some(format!(
            "# layer{}[{}]: {} -> {} channels at {}x{}",
            target.stage,
            target.block.saturating_sub(1),
            target.in_channels,
            target.channels,
            target.height,
            target.width
        )),
        LevelPayload::ConvBlock(target) => Some(format!(
            "# layer{}[{}] conv{}: {}x{} conv, {} -> {} channels, stride {}",
            target.stage,
            target.block.saturating_sub(1),
            target.position,
            target.kernel,
            target.kernel,
            target.in_channels,
            target.out_channels,
            target.stride
        )),
    }
}

pub fn code_for_frame(frame: &NavigationFrame, mode: CodePanelMode) -> Cow<'static, str> {
    let code = code_for(frame.level());
    match mode {
        CodePanelMode::Generic => Cow::Borrowed(code),
        CodePanelMode::Annotated => match annotation(frame.payload()) {
            Some(header) => Cow::Owned(format!("{header}\n{code}")),
            None => Cow::Borrowed(code),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Plain,
    Keyword,
    Builtin,
    String,
    Number,
    Comment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSpan {
    pub range: Range<usize>,
    pub kind: TokenKind,
}

pub trait SyntaxHighlighter {
    fn highlight(&self, code: &str) -> Vec<HighlightSpan>;
}

/// Falls back to one plain span covering the whole snippet when no
/// highlighter is available.
pub fn highlight_or_plain(
    highlighter: Option<&dyn SyntaxHighlighter>,
    code: &str,
) -> Vec<HighlightSpan> {
    match highlighter {
        Some(x) => x.highlight(code),
        None => vec![HighlightSpan {
            range: 0..code.len(),
            kind: TokenKind::Plain,
        }],
    }
}

/// Scope prefixes in priority order. The innermost scope with a match
/// decides the kind of a token.
const SCOPE_KINDS: &[(&str, TokenKind)] = &[
    ("comment", TokenKind::Comment),
    ("string", TokenKind::String),
    ("constant.numeric", TokenKind::Number),
    ("constant.language", TokenKind::Keyword),
    ("keyword.operator", TokenKind::Plain),
    ("keyword", TokenKind::Keyword),
    ("storage", TokenKind::Keyword),
    ("support", TokenKind::Builtin),
    ("variable.language", TokenKind::Builtin),
];

fn push_span(spans: &mut Vec<HighlightSpan>, range: Range<usize>, kind: TokenKind) {
    if range.is_empty() {
        return;
    }
    if let Some(last) = spans.last_mut() {
        if last.kind == kind && last.range.end == range.start {
            last.range.end = range.end;
            return;
        }
    }
    spans.push(HighlightSpan { range, kind });
}

/// Python highlighting over syntect's bundled grammar. Spans carry token
/// kinds taken from the parsed scopes; colours are left to the consumer.
pub struct PythonHighlighter {
    syntax_set: SyntaxSet,
    scope_kinds: Vec<(Scope, TokenKind)>,
}

impl PythonHighlighter {
    /// Loads the bundled syntaxes. `None` if they have no Python grammar.
    pub fn new() -> Option<Self> {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        syntax_set.find_syntax_by_token("python")?;
        let scope_kinds = SCOPE_KINDS
            .iter()
            .filter_map(|(prefix, kind)| Scope::new(prefix).ok().map(|x| (x, *kind)))
            .collect();
        Some(Self {
            syntax_set,
            scope_kinds,
        })
    }

    fn classify(&self, stack: &ScopeStack) -> TokenKind {
        for scope in stack.as_slice().iter().rev() {
            for (prefix, kind) in &self.scope_kinds {
                if prefix.is_prefix_of(*scope) {
                    return *kind;
                }
            }
        }
        TokenKind::Plain
    }
}

impl SyntaxHighlighter for PythonHighlighter {
    fn highlight(&self, code: &str) -> Vec<HighlightSpan> {
        let mut spans = vec![];
        if let Some(syntax) = self.syntax_set.find_syntax_by_token("python") {
            let mut state = ParseState::new(syntax);
            let mut stack = ScopeStack::new();
            let mut offset = 0;
            'lines: for line in LinesWithEndings::from(code) {
                let ops = match state.parse_line(line, &self.syntax_set) {
                    Ok(ops) => ops,
                    Err(err) => {
                        log::warn!("Python highlighting stopped: {err:?}");
                        break;
                    }
                };
                for (range, op) in ScopeRangeIterator::new(&ops, line) {
                    if let Err(err) = stack.apply(op) {
                        log::warn!("Python highlighting stopped: {err:?}");
                        break 'lines;
                    }
                    let kind = self.classify(&stack);
                    push_span(&mut spans, offset + range.start..offset + range.end, kind);
                }
                offset += line.len();
            }
        }
        // whatever could not be parsed stays plain
        let covered = spans.last().map(|x| x.range.end).unwrap_or(0);
        push_span(&mut spans, covered..code.len(), TokenKind::Plain);
        spans
    }
}

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    /// The clipboard was unavailable; the caller should show this text in a
    /// selectable box instead.
    Fallback(String),
}

pub fn copy_code(clipboard: Option<&mut dyn Clipboard>, code: &str) -> CopyOutcome {
    let Some(clipboard) = clipboard else {
        log::debug!("No clipboard available, using text fallback");
        return CopyOutcome::Fallback(code.to_string());
    };
    match clipboard.write_text(code) {
        Ok(()) => CopyOutcome::Copied,
        Err(err) => {
            log::warn!("Copy to clipboard failed: {err}");
            CopyOutcome::Fallback(code.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_covers_whole_snippet() {
        let highlighter = PythonHighlighter::new().unwrap();
        let code = code_for(Level::Fx);
        let spans = highlighter.highlight(code);
        assert_eq!(spans.first().unwrap().range.start, 0);
        assert_eq!(spans.last().unwrap().range.end, code.len());
        for pair in spans.windows(2) {
            assert_eq!(pair[0].range.end, pair[1].range.start);
        }
    }

    #[test]
    fn test_highlight_classifies_tokens() {
        let highlighter = PythonHighlighter::new().unwrap();
        let code = "def f(x):  # hi\n    return 'a' + 3\n";
        let spans = highlighter.highlight(code);
        // kind of the span holding the first and last byte of `text`
        let kind_of = |text: &str| {
            let start = code.find(text).unwrap();
            let end = start + text.len() - 1;
            let first = spans.iter().find(|x| x.range.contains(&start)).map(|x| x.kind);
            let last = spans.iter().find(|x| x.range.contains(&end)).map(|x| x.kind);
            assert_eq!(first, last, "{text}");
            first
        };
        assert_eq!(kind_of("def"), Some(TokenKind::Keyword));
        assert_eq!(kind_of("return"), Some(TokenKind::Keyword));
        assert_eq!(kind_of("# hi"), Some(TokenKind::Comment));
        assert_eq!(kind_of("'a'"), Some(TokenKind::String));
        assert_eq!(kind_of("3"), Some(TokenKind::Number));
        assert_eq!(kind_of("f(x)"), Some(TokenKind::Plain));
    }

    #[test]
    fn test_highlight_unparsed_tail_is_plain() {
        let highlighter = PythonHighlighter::new().unwrap();
        let dyn_highlighter: &dyn SyntaxHighlighter = &highlighter;
        assert!(highlight_or_plain(Some(dyn_highlighter), "").is_empty());
        let code = "x = \"never closed";
        let spans = highlighter.highlight(code);
        assert_eq!(spans.last().unwrap().range.end, code.len());
    }
}
