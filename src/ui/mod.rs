pub mod app;
pub mod login_popup;
pub mod settings_panel;
pub mod tile;

use crate::config_loader::MasterConfig;
use crate::shinobi::ShinobiClient;
use anyhow::{anyhow, Result};
use log::info;
use std::sync::Arc;
use tokio::runtime::Runtime;

const WINDOW_TITLE: &str = "Shinobi View";

/// Opens the viewer window and blocks until it is closed.
pub fn run_viewer(
    config: MasterConfig,
    config_path: String,
    runtime: Runtime,
    client: Arc<ShinobiClient>,
    fullscreen: bool,
) -> Result<()> {
    info!("🖥️ Opening viewer window (fullscreen: {})", fullscreen);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([1280.0, 720.0])
            .with_fullscreen(fullscreen),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::ViewerApp::new(cc, config, config_path, runtime, client, fullscreen)))
        }),
    )
    .map_err(|e| anyhow!("Viewer window failed: {}", e))
}
