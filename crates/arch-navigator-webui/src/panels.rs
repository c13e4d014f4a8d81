use crate::clipboard::ClipboardSupport;
use arch_navigator::code_panel::{
    Clipboard, CopyOutcome, PythonHighlighter, SyntaxHighlighter, TokenKind, copy_code,
    highlight_or_plain,
};
use arch_navigator::config::INPUT_FIELD_NAMES;
use arch_navigator::levels::RESIDUAL_FORMULA;
use arch_navigator::{ArchitectureNavigator, ClipboardError, InputConfig, LevelPayload};
use egui::text::LayoutJob;
use egui::{Color32, FontId, RichText, TextFormat, Ui};

/// Text backing the N/C/H/W fields, kept separately from the applied input
/// so half-typed values survive between frames.
pub(crate) struct InputForm {
    fields: [String; 4],
    error: Option<String>,
}

impl InputForm {
    pub(crate) fn new(input: InputConfig) -> Self {
        Self {
            fields: input.as_array().map(|x| x.to_string()),
            error: None,
        }
    }

    fn sync(&mut self, input: InputConfig) {
        self.fields = input.as_array().map(|x| x.to_string());
        self.error = None;
    }

    pub(crate) fn show(&mut self, ui: &mut Ui, navigator: &mut ArchitectureNavigator) {
        ui.heading("Input tensor");
        egui::Grid::new("input_form").num_columns(2).show(ui, |ui| {
            for (name, field) in INPUT_FIELD_NAMES.iter().zip(self.fields.iter_mut()) {
                ui.label(*name);
                ui.add(egui::TextEdit::singleline(field).desired_width(80.0));
                ui.end_row();
            }
        });
        ui.horizontal(|ui| {
            if ui.button("Apply").clicked() {
                let [n, c, h, w] = &self.fields;
                let applied = navigator.apply_form(&[n, c, h, w].map(|x| x.as_str()));
                match applied {
                    Ok(()) => self.sync(navigator.input()),
                    Err(err) => self.error = Some(err.to_string()),
                }
            }
            if ui.button("Reset").clicked() {
                navigator.reset_input();
                self.sync(navigator.input());
            }
        });
        if let Some(err) = &self.error {
            ui.scope(|ui| {
                ui.visuals_mut().override_text_color = Some(Color32::RED);
                ui.style_mut().override_text_style = Some(egui::TextStyle::Monospace);
                ui.label(err);
            });
        }
    }
}

pub(crate) fn formula_panel(ui: &mut Ui, navigator: &ArchitectureNavigator) {
    ui.heading("Residual connection");
    ui.label(RichText::new(RESIDUAL_FORMULA).monospace().size(16.0));
    if let LevelPayload::Residual(target) = navigator.top().payload() {
        if target.has_projection() {
            ui.label(format!(
                "The shortcut projects x with a 1×1 conv (stride {}) so it matches F(x).",
                target.stride()
            ));
        } else {
            ui.label("The shortcut adds x unchanged.");
        }
    }
}

pub(crate) fn shape_table(ui: &mut Ui, navigator: &ArchitectureNavigator) {
    let shapes = navigator.shape_table();
    ui.heading(format!("Shapes for {}", navigator.input()));
    egui::Grid::new("shape_table")
        .num_columns(4)
        .striped(true)
        .show(ui, |ui| {
            ui.strong("Layer");
            ui.strong("Shape");
            ui.strong("Scale");
            ui.strong("Params");
            ui.end_row();
            for row in shapes.rows() {
                ui.label(&row.name);
                ui.monospace(row.format_shape());
                ui.label(&row.scale);
                ui.label(row.parameters.to_string());
                ui.end_row();
            }
            ui.strong("Total");
            ui.label("");
            ui.label("");
            ui.strong(shapes.total_parameters().to_string());
            ui.end_row();
        });
}

struct EguiClipboard<'a> {
    ctx: &'a egui::Context,
}

impl Clipboard for EguiClipboard<'_> {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        ClipboardSupport::detect().check()?;
        self.ctx.copy_text(text.to_string());
        Ok(())
    }
}

fn token_color(kind: TokenKind, ui: &Ui) -> Color32 {
    match kind {
        TokenKind::Plain => ui.visuals().text_color(),
        TokenKind::Keyword => Color32::from_rgb(0xc5, 0x86, 0xc0),
        TokenKind::Builtin => Color32::from_rgb(0x4e, 0xc9, 0xb0),
        TokenKind::String => Color32::from_rgb(0xce, 0x91, 0x78),
        TokenKind::Number => Color32::from_rgb(0xb5, 0xce, 0xa8),
        TokenKind::Comment => Color32::from_rgb(0x6a, 0x99, 0x55),
    }
}

/// Code for the current level with a copy button. When copying fails the
/// snippet is shown in a selectable box instead.
pub(crate) fn code_panel(
    ui: &mut Ui,
    navigator: &ArchitectureNavigator,
    highlighter: Option<&PythonHighlighter>,
    fallback: &mut Option<String>,
) {
    let code = navigator.code();
    if fallback.as_deref().is_some_and(|x| x != code) {
        *fallback = None;
    }
    ui.horizontal(|ui| {
        ui.heading("PyTorch");
        if ui.button("Copy").clicked() {
            let mut clipboard = EguiClipboard { ctx: ui.ctx() };
            *fallback = match copy_code(Some(&mut clipboard), code) {
                CopyOutcome::Copied => None,
                CopyOutcome::Fallback(text) => Some(text),
            };
        }
    });

    let font = FontId::monospace(12.0);
    let highlighter = highlighter.map(|x| x as &dyn SyntaxHighlighter);
    let mut job = LayoutJob::default();
    for span in highlight_or_plain(highlighter, code) {
        job.append(
            &code[span.range.clone()],
            0.0,
            TextFormat {
                font_id: font.clone(),
                color: token_color(span.kind, ui),
                ..Default::default()
            },
        );
    }
    egui::ScrollArea::both()
        .id_salt("code_panel")
        .max_height(320.0)
        .show(ui, |ui| {
            ui.label(job);
        });

    if let Some(text) = fallback {
        ui.label("Clipboard unavailable, select and copy manually:");
        ui.add(
            egui::TextEdit::multiline(text)
                .code_editor()
                .desired_rows(6),
        );
    }
}
