use crate::diagram;
use crate::panels::{self, InputForm};
use arch_navigator::code_panel::{CodePanelMode, PythonHighlighter};
use arch_navigator::{ArchitectureNavigator, InputConfig, NavigatorOptions, ResNetDepth};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// What survives a page reload.
// if we add new fields, give them default values when deserializing old state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct PersistedState {
    depth: ResNetDepth,
    code_panel_mode: CodePanelMode,
    input: InputConfig,
}

pub struct NavigatorApp {
    navigator: Option<ArchitectureNavigator>,
    startup_error: Option<String>,
    form: InputForm,
    highlighter: Option<PythonHighlighter>,
    copy_fallback: Option<String>,
}

impl NavigatorApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let persisted: PersistedState = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        let options = NavigatorOptions {
            depth: persisted.depth,
            code_panel_mode: persisted.code_panel_mode,
            ..NavigatorOptions::default()
        };
        let (navigator, startup_error) = match ArchitectureNavigator::new(options) {
            Ok(mut navigator) => {
                if persisted.input != navigator.input() {
                    navigator.apply_input(persisted.input);
                }
                (Some(navigator), None)
            }
            Err(err) => {
                log::error!("Failed to start navigator: {err}");
                (None, Some(err.to_string()))
            }
        };
        let form = InputForm::new(
            navigator
                .as_ref()
                .map(|x| x.input())
                .unwrap_or_default(),
        );

        let highlighter = PythonHighlighter::new();
        if highlighter.is_none() {
            log::warn!("No Python grammar available, code panel stays plain");
        }

        Self {
            navigator,
            startup_error,
            form,
            highlighter,
            copy_fallback: None,
        }
    }

    fn persisted(&self) -> Option<PersistedState> {
        let navigator = self.navigator.as_ref()?;
        Some(PersistedState {
            depth: navigator.options().depth,
            code_panel_mode: navigator.options().code_panel_mode,
            input: navigator.input(),
        })
    }
}

impl eframe::App for NavigatorApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Some(state) = self.persisted() {
            eframe::set_value(storage, eframe::APP_KEY, &state);
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let Some(navigator) = &mut self.navigator else {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.heading("Architecture Navigator");
                if let Some(err) = &self.startup_error {
                    ui.colored_label(egui::Color32::RED, err);
                }
            });
            return;
        };

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                egui::widgets::global_theme_preference_switch(ui);
                ui.heading("Architecture Navigator");

                let mut depth = navigator.options().depth;
                egui::ComboBox::from_id_salt("depth")
                    .selected_text(depth.to_string())
                    .show_ui(ui, |ui| {
                        for which in ResNetDepth::iter() {
                            ui.selectable_value(&mut depth, which, which.to_string());
                        }
                    });
                if depth != navigator.options().depth {
                    navigator.set_depth(depth);
                }

                ui.separator();
                if ui
                    .add_enabled(navigator.can_go_back(), egui::Button::new("⬅ Back"))
                    .clicked()
                {
                    navigator.back();
                }
                ui.label(navigator.breadcrumb());
            });
        });

        egui::SidePanel::right("details_panel")
            .resizable(true)
            .default_width(420.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    if navigator.show_formula_panel() {
                        panels::formula_panel(ui, navigator);
                        ui.separator();
                    }
                    self.form.show(ui, navigator);
                    ui.separator();
                    panels::shape_table(ui, navigator);
                    ui.separator();
                    panels::code_panel(
                        ui,
                        navigator,
                        self.highlighter.as_ref(),
                        &mut self.copy_fallback,
                    );
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            diagram::show(ui, navigator);
        });
    }
}
