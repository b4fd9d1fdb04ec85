use eframe::egui::{self, RichText, Ui};

use crate::data::aggregate::Kpis;

const CARDS_PER_ROW: usize = 4;
const CARD_WIDTH: f32 = 170.0;

/// Render the KPI cards in a 4 × 2 grid.
pub fn kpi_grid(ui: &mut Ui, kpis: &Kpis) {
    let cards = kpis.cards();
    egui::Grid::new("kpi_grid")
        .num_columns(CARDS_PER_ROW)
        .spacing([12.0, 12.0])
        .show(ui, |ui: &mut Ui| {
            for (i, card) in cards.iter().enumerate() {
                egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
                    ui.set_width(CARD_WIDTH);
                    ui.label(RichText::new(card.title.to_uppercase()).small().weak());
                    let value = RichText::new(&card.value).strong();
                    ui.label(if card.small { value.size(14.0) } else { value.size(20.0) });
                    ui.label(RichText::new(card.subtext.to_uppercase()).small().weak());
                });
                if (i + 1) % CARDS_PER_ROW == 0 {
                    ui.end_row();
                }
            }
        });
}
