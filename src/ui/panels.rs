use std::time::Instant;

use eframe::egui::{self, Color32, RichText, ScrollArea, TextEdit, Ui};

use crate::data::export;
use crate::data::facet;
use crate::data::filter::{DEFAULT_LENGTH_RANGE, filter_boats};
use crate::state::{AppState, YEAR_INPUT_FALLBACK};

const SLIDER_YEARS: (i64, i64) = (1980, 2026);
const SLIDER_LENGTH: (f64, f64) = (0.0, 100.0);
const OPTION_LIST_HEIGHT: f32 = 160.0;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    let now = Instant::now();

    ui.heading("Filters");
    ui.separator();

    if ui
        .add_sized([ui.available_width(), 24.0], egui::Button::new("Reset Filters"))
        .clicked()
    {
        state.reset_filters();
    }
    ui.add_space(6.0);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            builder_section(ui, state, now);
            ui.separator();
            model_section(ui, state, now);
            ui.separator();
            year_section(ui, state, now);
            ui.separator();
            length_section(ui, state, now);
            ui.separator();

            let mut include_sold = state.draft.include_sold;
            if ui.checkbox(&mut include_sold, "Include Sold Boats").changed() {
                state.toggle_sold(now);
            }
        });
}

fn builder_section(ui: &mut Ui, state: &mut AppState, now: Instant) {
    ui.strong("Builder");
    ui.add(TextEdit::singleline(&mut state.builder_search).hint_text("Search builders..."));

    let mut toggled: Option<String> = None;
    ScrollArea::vertical()
        .id_salt("builder_options")
        .max_height(OPTION_LIST_HEIGHT)
        .show(ui, |ui: &mut Ui| {
            let options = facet::search_options(&state.available_builders, &state.builder_search);
            if options.is_empty() {
                ui.label(RichText::new("No matches").italics().weak());
            }
            for builder in options {
                let mut checked = state.draft.builders.contains(builder);
                if ui.checkbox(&mut checked, builder).changed() {
                    toggled = Some(builder.to_string());
                }
            }
        });

    if let Some(builder) = toggled {
        state.toggle_builder(&builder, now);
    }
}

fn model_section(ui: &mut Ui, state: &mut AppState, now: Instant) {
    ui.strong("Model");
    ui.add(TextEdit::singleline(&mut state.model_search).hint_text("Search models..."));

    let mut toggled: Option<String> = None;
    ScrollArea::vertical()
        .id_salt("model_options")
        .max_height(OPTION_LIST_HEIGHT)
        .show(ui, |ui: &mut Ui| {
            let options = facet::search_options(&state.available_models, &state.model_search);
            if options.is_empty() {
                let hint = if state.available_models.is_empty() {
                    "Select a builder first"
                } else {
                    "No matches"
                };
                ui.label(RichText::new(hint).italics().weak());
            }
            for model in options {
                let mut checked = state.draft.models.contains(model);
                if ui.checkbox(&mut checked, model).changed() {
                    toggled = Some(model.to_string());
                }
            }
        });

    if let Some(model) = toggled {
        state.toggle_model(&model, now);
    }
}

fn year_section(ui: &mut Ui, state: &mut AppState, now: Instant) {
    let input = &mut state.year_input;
    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Year Built");
        ui.monospace(format!("{} — {}", input.value.0, input.value.1));
    });

    // Slider drags only move the local echo; release commits.
    let (lo, hi) = input.value;
    let mut commit = false;
    let r = ui.add(egui::Slider::new(&mut input.value.0, SLIDER_YEARS.0..=hi).text("from"));
    commit |= r.drag_stopped() || (r.changed() && !r.dragged());
    let r = ui.add(egui::Slider::new(&mut input.value.1, lo..=SLIDER_YEARS.1).text("to"));
    commit |= r.drag_stopped() || (r.changed() && !r.dragged());

    let mut committed = commit.then_some(input.value);
    ui.horizontal(|ui: &mut Ui| {
        if ui.add(TextEdit::singleline(&mut input.text[0]).desired_width(56.0)).lost_focus() {
            committed = Some(input.commit_text(0, YEAR_INPUT_FALLBACK.0, SLIDER_YEARS));
        }
        ui.label("-");
        if ui.add(TextEdit::singleline(&mut input.text[1]).desired_width(56.0)).lost_focus() {
            committed = Some(input.commit_text(1, YEAR_INPUT_FALLBACK.1, SLIDER_YEARS));
        }
    });

    if let Some(range) = committed {
        state.set_year_range(range, now);
    }
}

fn length_section(ui: &mut Ui, state: &mut AppState, now: Instant) {
    let input = &mut state.length_input;
    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Length (m)");
        ui.monospace(format!("{}m — {}m", input.value.0, input.value.1));
    });

    let (lo, hi) = input.value;
    let mut commit = false;
    let r = ui.add(
        egui::Slider::new(&mut input.value.0, SLIDER_LENGTH.0..=hi)
            .step_by(0.5)
            .text("from"),
    );
    commit |= r.drag_stopped() || (r.changed() && !r.dragged());
    let r = ui.add(
        egui::Slider::new(&mut input.value.1, lo..=SLIDER_LENGTH.1)
            .step_by(0.5)
            .text("to"),
    );
    commit |= r.drag_stopped() || (r.changed() && !r.dragged());

    let mut committed = commit.then_some(input.value);
    ui.horizontal(|ui: &mut Ui| {
        if ui.add(TextEdit::singleline(&mut input.text[0]).desired_width(56.0)).lost_focus() {
            committed = Some(input.commit_text(0, DEFAULT_LENGTH_RANGE.0, SLIDER_LENGTH));
        }
        ui.label("-");
        if ui.add(TextEdit::singleline(&mut input.text[1]).desired_width(56.0)).lost_focus() {
            committed = Some(input.commit_text(1, DEFAULT_LENGTH_RANGE.1, SLIDER_LENGTH));
        }
    });

    if let Some(range) = committed {
        state.set_length_range(range, now);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
            if ui.button("Export CSV…").clicked() {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} boats loaded, {} visible",
            state.collection.len(),
            state.view().snapshot.indices.len()
        ));
        if state.has_pending() {
            ui.label(RichText::new("updating…").weak());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open listings snapshot")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Opening {}", path.display());
        state.open_file(path);
    }
}

/// Save the listings passing the applied filters as CSV.
pub fn export_dialog(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export inventory")
        .add_filter("CSV", &["csv"])
        .set_file_name("inventory.csv")
        .save_file()
    else {
        return;
    };

    let rows = filter_boats(state.collection.boats(), &state.committed);
    let result = std::fs::File::create(&path)
        .map_err(anyhow::Error::from)
        .and_then(|file| export::export_csv(&rows, file));
    match result {
        Ok(count) => {
            log::info!("Exported {count} listings to {}", path.display());
            state.status_message = None;
        }
        Err(e) => {
            log::error!("Failed to export: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
