mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use app::BatooApp;
use config::AppConfig;
use data::source;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::from_env();
    let mut state = AppState::new(config.filter_debounce);
    match source::source_from_config(&config) {
        Ok(Some(src)) => {
            let kind = if config.has_backend() { "backend" } else { "file" };
            log::info!("Using {kind} data source {}", src.describe());
            state.source = Some(src);
            state.reload();
        }
        Ok(None) => {
            log::info!(
                "No backend configured; set {} and {}, or open a snapshot file",
                config::ENV_SUPABASE_URL,
                config::ENV_SUPABASE_KEY
            );
        }
        Err(e) => {
            log::error!("Failed to set up data source: {e}");
            state.status_message = Some(format!("Error: {e}"));
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Batoo – Boat Market Dashboard",
        options,
        Box::new(|cc| {
            // Install image loaders so listing thumbnails can be fetched and shown.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(BatooApp::new(state)))
        }),
    )
}
