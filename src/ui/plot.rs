use eframe::egui::{self, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::color::ACCENT;
use crate::data::aggregate::{HISTOGRAM_LABELS, ScatterPoint, format_currency, format_price_full};
use crate::state::{AppState, DashboardView};

const CHART_HEIGHT: f32 = 280.0;
const MIN_RADIUS: f32 = 2.0;
const MAX_RADIUS: f32 = 7.0;

// ---------------------------------------------------------------------------
// Price vs Year scatter
// ---------------------------------------------------------------------------

/// Marker radius for a length, scaled linearly into the [`MIN_RADIUS`,
/// `MAX_RADIUS`] band over the lengths present.
pub fn marker_radius(length: f64, min_len: f64, max_len: f64) -> f32 {
    let span = max_len - min_len;
    if !(span > f64::EPSILON) {
        return (MIN_RADIUS + MAX_RADIUS) / 2.0;
    }
    let t = ((length - min_len) / span).clamp(0.0, 1.0) as f32;
    MIN_RADIUS + t * (MAX_RADIUS - MIN_RADIUS)
}

/// Render the scatter of price against year; marker size follows length,
/// colour follows builder.
pub fn scatter_chart(ui: &mut Ui, view: &DashboardView<'_>) {
    ui.strong("PRICE VS YEAR");
    let points: &[ScatterPoint] = &view.snapshot.scatter;
    let (min_len, max_len) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p.length), hi.max(p.length))
    });

    Plot::new("price_vs_year")
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("Price")
        .y_axis_formatter(|mark, _range| format!("€{}k", (mark.value / 1000.0).round()))
        .label_formatter(|name, value| {
            format!("{name}\nYear: {:.0}\nPrice: {}", value.x, format_price_full(value.y))
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for p in points {
                let name = if p.model.is_empty() {
                    p.builder.clone()
                } else {
                    format!("{} {}", p.builder, p.model)
                };
                plot_ui.points(
                    Points::new(PlotPoints::new(vec![[p.year, p.price]]))
                        .name(name)
                        .color(view.color_map.color_for(&p.builder))
                        .radius(marker_radius(p.length, min_len, max_len))
                        .filled(true),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Price distribution histogram
// ---------------------------------------------------------------------------

pub fn histogram_chart(ui: &mut Ui, counts: &[usize; 5]) {
    ui.strong("PRICE DISTRIBUTION");
    let bars: Vec<Bar> = counts
        .iter()
        .zip(HISTOGRAM_LABELS)
        .enumerate()
        .map(|(i, (count, label))| {
            Bar::new(i as f64, *count as f64)
                .name(label)
                .width(0.6)
                .fill(ACCENT)
        })
        .collect();

    Plot::new("price_distribution")
        .height(CHART_HEIGHT)
        .x_axis_formatter(|mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() < 1e-6 && (0.0..5.0).contains(&idx) {
                HISTOGRAM_LABELS[idx as usize].to_string()
            } else {
                String::new()
            }
        })
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(ACCENT));
        });
}

// ---------------------------------------------------------------------------
// Price history window
// ---------------------------------------------------------------------------

/// Floating window with the recorded prices of the selected listing.
pub fn price_history_window(ctx: &egui::Context, state: &mut AppState) {
    let Some(boat) = state.selected_boat() else {
        return;
    };
    let title = format!("{} {}", boat.builder, boat.model);
    let details = [
        ("Year", boat.year_built.map(|y| y.to_string())),
        ("Length", boat.length.map(|l| format!("{l}m"))),
        ("Price", boat.price_eur.map(format_price_full)),
        ("Country", boat.country.clone()),
        ("VAT", boat.vat_status.clone()),
        ("Updated", boat.navinet_updated_at.clone()),
        ("Last seen", boat.last_seen_at.clone()),
    ];

    let mut open = true;
    egui::Window::new(RichText::new(title).strong())
        .id(egui::Id::new("price_history"))
        .open(&mut open)
        .resizable(true)
        .default_width(420.0)
        .show(ctx, |ui: &mut Ui| {
            egui::Grid::new("boat_details")
                .num_columns(2)
                .spacing([16.0, 4.0])
                .show(ui, |ui: &mut Ui| {
                    for (label, value) in &details {
                        ui.label(*label);
                        ui.label(value.as_deref().unwrap_or("-"));
                        ui.end_row();
                    }
                });
            ui.separator();

            let history: Vec<[f64; 2]> = state
                .price_history
                .iter()
                .enumerate()
                .filter_map(|(i, p)| p.price_eur.map(|price| [i as f64, price]))
                .collect();
            if state.is_loading_history() {
                ui.horizontal(|ui: &mut Ui| {
                    ui.spinner();
                    ui.label("Loading price history…");
                });
                return;
            }
            if history.is_empty() {
                ui.label(RichText::new("No price history recorded").italics().weak());
                return;
            }

            Plot::new("price_history_plot")
                .height(180.0)
                .legend(Legend::default())
                .x_axis_label("Observation")
                .y_axis_formatter(|mark, _range| format_currency(mark.value))
                .show(ui, |plot_ui| {
                    plot_ui.line(
                        Line::new(PlotPoints::new(history))
                            .name("Price")
                            .color(ACCENT)
                            .width(1.5),
                    );
                });

            egui::Grid::new("price_history_rows")
                .striped(true)
                .num_columns(2)
                .show(ui, |ui: &mut Ui| {
                    for p in &state.price_history {
                        ui.label(p.recorded_at.as_deref().unwrap_or("-"));
                        ui.label(p.price_eur.map(format_price_full).unwrap_or_else(|| "-".to_string()));
                        ui.end_row();
                    }
                });
        });

    if !open {
        state.clear_selection();
    }
}
