use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::format_price_full;
use crate::data::model::Boat;
use crate::state::DashboardView;

/// Rows shown in the inventory table; the remainder is summarised below it.
pub const MAX_TABLE_ROWS: usize = 50;

const ROW_HEIGHT: f32 = 36.0;

/// Footer text for the rows left out of the table, if any.
pub fn remainder_note(total: usize) -> Option<String> {
    (total > MAX_TABLE_ROWS).then(|| format!("Showing {MAX_TABLE_ROWS} of {total} rows"))
}

/// Render the first [`MAX_TABLE_ROWS`] visible listings. Returns the
/// collection index of a clicked row.
pub fn inventory_table(ui: &mut Ui, view: &DashboardView<'_>) -> Option<usize> {
    let total = view.snapshot.indices.len();
    let rows: Vec<(usize, &Boat)> = view.visible_boats().take(MAX_TABLE_ROWS).collect();

    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Inventory List");
        ui.label(RichText::new(format!("{total} assets")).weak());
    });

    let mut clicked = None;
    TableBuilder::new(ui)
        .id_salt("inventory")
        .striped(true)
        .sense(egui::Sense::click())
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::exact(56.0))
        .column(Column::auto().at_least(120.0))
        .column(Column::auto().at_least(120.0))
        .column(Column::exact(48.0))
        .column(Column::exact(60.0))
        .column(Column::auto().at_least(100.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["Image", "Builder", "Model", "Year", "Length", "Price", "Status"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                let (idx, boat) = rows[row.index()];
                row.col(|ui: &mut Ui| match &boat.image_url {
                    Some(url) => {
                        ui.add(egui::Image::new(url.as_str()).max_width(48.0).max_height(32.0));
                    }
                    None => {
                        ui.label(RichText::new("N/A").small().weak());
                    }
                });
                row.col(|ui: &mut Ui| {
                    ui.label(RichText::new(&boat.builder).strong());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&boat.model);
                });
                row.col(|ui: &mut Ui| {
                    ui.monospace(boat.year_built.map(|y| y.to_string()).unwrap_or_default());
                });
                row.col(|ui: &mut Ui| {
                    ui.monospace(boat.length.map(|l| format!("{l}m")).unwrap_or_default());
                });
                row.col(|ui: &mut Ui| {
                    match boat.price_eur.filter(|p| *p != 0.0 && p.is_finite()) {
                        Some(price) => ui.monospace(format_price_full(price)),
                        None => ui.label(RichText::new("-").weak()),
                    };
                });
                row.col(|ui: &mut Ui| {
                    if boat.is_sold {
                        ui.label(RichText::new("SOLD").small().color(Color32::GRAY));
                    } else {
                        ui.label(RichText::new("ACTIVE").small().strong().color(Color32::from_rgb(16, 185, 129)));
                    }
                });
                if row.response().clicked() {
                    clicked = Some(idx);
                }
            });
        });

    if let Some(note) = remainder_note(total) {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(RichText::new(note).small().weak());
        });
    }

    clicked
}
