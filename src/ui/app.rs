use crate::config_loader::{self, MasterConfig};
use crate::core::layout;
use crate::core::monitor_manager::{self, MonitorManager};
use crate::core::monitor_poller::RepaintHook;
use crate::core::snapshot_source::SnapshotSource;
use crate::shinobi::login::apply_credentials;
use crate::shinobi::ShinobiClient;
use crate::ui::login_popup::LoginPopup;
use crate::ui::settings_panel::{SettingsAction, SettingsPanel};
use crate::ui::tile;
use eframe::{App, CreationContext, Frame};
use egui::{Color32, TextureHandle};
use log::{error, info, warn};
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;

pub struct ViewerApp {
    config: MasterConfig,
    config_path: String,
    runtime: Runtime,
    client: Arc<ShinobiClient>,
    repaint: RepaintHook,
    manager: Option<MonitorManager>,
    textures: Vec<Option<TextureHandle>>,
    fullscreen: bool,
    settings: Option<SettingsPanel>,
    login: Option<LoginPopup>,
    notice: Option<String>,
}

impl ViewerApp {
    pub fn new(
        cc: &CreationContext,
        config: MasterConfig,
        config_path: String,
        runtime: Runtime,
        client: Arc<ShinobiClient>,
        fullscreen: bool,
    ) -> Self {
        let ctx = cc.egui_ctx.clone();
        let repaint: RepaintHook = Arc::new(move || ctx.request_repaint());

        let mut app = ViewerApp {
            login: None,
            config,
            config_path,
            runtime,
            client,
            repaint,
            manager: None,
            textures: Vec::new(),
            fullscreen,
            settings: None,
            notice: None,
        };
        if app.config.has_credentials() {
            app.add_monitors();
        } else {
            info!("🔑 No API key or group key configured, asking for login.");
            app.login = Some(LoginPopup::new(&app.config.shinobi.server));
        }
        app
    }

    /// Builds the configured layout and starts a poller per tile.
    fn add_monitors(&mut self) {
        self.remove_monitors();
        self.notice = None;

        let layout = match monitor_manager::resolve_layout(&self.config) {
            Ok(layout) => layout,
            Err(e) => {
                warn!("⚠️ {}. Falling back to the automatic grid.", e);
                self.notice = Some(format!("{}; using auto layout", e));
                layout::auto_layout(self.config.monitors.len())
            }
        };

        let source = Arc::clone(&self.client) as Arc<dyn SnapshotSource>;
        let mut manager = MonitorManager::new(&self.config, layout, source, Arc::clone(&self.repaint));
        manager.start_all(self.runtime.handle());
        self.textures = (0..manager.len()).map(|_| None).collect();
        self.manager = Some(manager);
    }

    fn remove_monitors(&mut self) {
        if let Some(mut manager) = self.manager.take() {
            manager.stop_all();
        }
        self.textures.clear();
    }

    fn save_config(&mut self) {
        if let Err(e) = config_loader::save_config(&self.config_path, &self.config) {
            error!("❌ Failed to save configuration: {:#}", e);
            if let Some(settings) = self.settings.as_mut() {
                settings.set_status(format!("Could not save settings: {:#}", e));
            }
        }
    }

    fn open_settings(&mut self) {
        if self.settings.is_some() {
            return;
        }
        self.remove_monitors();
        let layouts = layout::available_layouts(Path::new(&self.config.app_settings.layouts_directory));
        self.settings = Some(SettingsPanel::new(layouts));
    }

    fn close_settings(&mut self) {
        self.settings = None;
        self.save_config();
        if self.config.has_credentials() {
            self.add_monitors();
        } else if self.login.is_none() {
            self.login = Some(LoginPopup::new(&self.config.shinobi.server));
        }
    }

    fn toggle_fullscreen(&mut self, ctx: &egui::Context) {
        self.fullscreen = !self.fullscreen;
        ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(self.fullscreen));
        self.config.app_settings.fullscreen = self.fullscreen;
        self.save_config();
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let (f11, f12) = ctx.input(|i| (i.key_pressed(egui::Key::F11), i.key_pressed(egui::Key::F12)));
        if f11 {
            self.toggle_fullscreen(ctx);
        }
        if f12 {
            if self.settings.is_some() {
                self.close_settings();
            } else {
                self.open_settings();
            }
        }
    }

    fn show_monitors(&mut self, ctx: &egui::Context) {
        if let Some(manager) = &self.manager {
            for (tile, slot) in manager.tiles().iter().zip(self.textures.iter_mut()) {
                if let Some(frame) = tile.poller.take_latest_frame() {
                    let name = format!("monitor-{}", tile.poller.monitor_id());
                    tile::upload_frame(ctx, slot, &name, frame);
                }
            }
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(Color32::BLACK))
            .show(ctx, |ui| {
                let area = ui.max_rect();
                let manager = match &self.manager {
                    Some(manager) if !manager.is_empty() => manager,
                    _ => {
                        if self.login.is_none() {
                            ui.centered_and_justified(|ui| ui.label("No monitors"));
                        }
                        return;
                    }
                };
                for (tile, texture) in manager.tiles().iter().zip(self.textures.iter()) {
                    let rect = tile::cell_to_rect(tile.cell, area);
                    tile::paint_tile(ui, rect, texture.as_ref(), tile.poller.state(), &tile.poller.monitor_id());
                }
                if let Some(notice) = &self.notice {
                    ui.painter().text(
                        area.left_bottom() + egui::vec2(8.0, -8.0),
                        egui::Align2::LEFT_BOTTOM,
                        notice,
                        egui::FontId::proportional(12.0),
                        Color32::LIGHT_RED,
                    );
                }
            });
    }
}

impl App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.handle_keys(ctx);

        if let Some(settings) = self.settings.as_mut() {
            match settings.show(ctx, &mut self.config, self.runtime.handle(), &self.client) {
                SettingsAction::None => {}
                SettingsAction::Changed => self.save_config(),
                SettingsAction::Close => self.close_settings(),
            }
            return;
        }

        self.show_monitors(ctx);

        if let Some(login) = self.login.as_mut() {
            if let Some((server, credentials)) = login.show(ctx, self.runtime.handle(), &self.client) {
                self.login = None;
                apply_credentials(&mut self.config, &server, credentials);
                self.save_config();
                self.add_monitors();
            }
        }
    }
}

impl Drop for ViewerApp {
    fn drop(&mut self) {
        self.remove_monitors();
    }
}
