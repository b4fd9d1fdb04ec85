use std::time::{Duration, Instant};

use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{kpi, panels, plot, table};

const HISTORY_POLL_INTERVAL: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct BatooApp {
    pub state: AppState,
}

impl BatooApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for BatooApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Apply debounced filter changes ----
        let now = Instant::now();
        self.state.flush_pending(now);
        if let Some(deadline) = self.state.pending_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }

        // ---- Pick up background price-history fetches ----
        self.state.poll_history();
        if self.state.is_loading_history() {
            ctx.request_repaint_after(HISTORY_POLL_INTERVAL);
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs, charts, table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(idx) = dashboard(ui, &mut self.state) {
                self.state.select_boat(idx);
            }
        });

        plot::price_history_window(ctx, &mut self.state);
    }
}

/// Render the main dashboard. Returns the collection index of a clicked
/// inventory row.
fn dashboard(ui: &mut Ui, state: &mut AppState) -> Option<usize> {
    let view = state.view();
    let mut clicked = None;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Market Overview");
            ui.label(
                RichText::new(format!(
                    "Real-time valuation analytics for {} assets",
                    view.snapshot.indices.len()
                ))
                .weak(),
            );
            ui.separator();

            kpi::kpi_grid(ui, &view.snapshot.kpis);
            ui.add_space(12.0);

            if view.snapshot.indices.is_empty() {
                ui.group(|ui: &mut Ui| {
                    ui.set_min_height(120.0);
                    ui.centered_and_justified(|ui: &mut Ui| {
                        ui.label(RichText::new("No data available for current filters").weak());
                    });
                });
            } else {
                ui.columns(2, |cols: &mut [Ui]| {
                    plot::scatter_chart(&mut cols[0], &view);
                    plot::histogram_chart(&mut cols[1], &view.snapshot.histogram);
                });
            }
            ui.add_space(12.0);

            clicked = table::inventory_table(ui, &view);
        });

    clicked
}
