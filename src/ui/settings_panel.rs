use crate::config_loader::MasterConfig;
use crate::core::monitor_selection::MonitorSelection;
use crate::shinobi::models::MonitorSummary;
use crate::shinobi::ShinobiClient;
use crate::shinobi_config::AUTO_LAYOUT;
use crossbeam_channel::{Receiver, TryRecvError};
use egui::{Color32, RichText};
use log::{info, warn};
use std::sync::Arc;
use tokio::runtime::Handle;

type RefreshResult = Result<Vec<MonitorSummary>, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingsTab {
    Connection,
    Monitors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    None,
    /// Config was edited and should be written to disk.
    Changed,
    Close,
}

enum RowEdit {
    Toggle(usize),
    Up(usize),
    Down(usize),
}

pub struct SettingsPanel {
    tab: SettingsTab,
    layouts: Vec<String>,
    selection: Option<MonitorSelection>,
    refresh: Option<Receiver<RefreshResult>>,
    status: Option<String>,
}

impl SettingsPanel {
    pub fn new(available_layouts: Vec<String>) -> Self {
        let mut layouts = vec![AUTO_LAYOUT.to_string()];
        layouts.extend(available_layouts.into_iter().filter(|l| l != AUTO_LAYOUT));
        SettingsPanel {
            tab: SettingsTab::Connection,
            layouts,
            selection: None,
            refresh: None,
            status: None,
        }
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        config: &mut MasterConfig,
        runtime: &Handle,
        client: &Arc<ShinobiClient>,
    ) -> SettingsAction {
        self.poll_refresh(config);
        let mut action = SettingsAction::None;

        egui::SidePanel::left("settings_sidebar")
            .resizable(false)
            .default_width(160.0)
            .show(ctx, |ui| {
                ui.heading("Settings");
                ui.separator();
                ui.selectable_value(&mut self.tab, SettingsTab::Connection, "Connection");
                ui.selectable_value(&mut self.tab, SettingsTab::Monitors, "Monitors");
                ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                    if ui.button("Close").clicked() {
                        action = SettingsAction::Close;
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(status) = &self.status {
                ui.colored_label(Color32::LIGHT_RED, status.as_str());
                ui.separator();
            }
            let changed = match self.tab {
                SettingsTab::Connection => self.connection_tab(ui, config),
                SettingsTab::Monitors => self.monitors_tab(ui, config, runtime, client),
            };
            if changed && action == SettingsAction::None {
                action = SettingsAction::Changed;
            }
        });
        action
    }

    fn connection_tab(&mut self, ui: &mut egui::Ui, config: &mut MasterConfig) -> bool {
        let mut changed = false;
        egui::Grid::new("connection_grid")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("Server URL").on_hover_text("URL of shinobi server");
                changed |= commit_on_focus_loss(ui.text_edit_singleline(&mut config.shinobi.server));
                ui.end_row();

                ui.label("API Key").on_hover_text("Server API key");
                changed |= commit_on_focus_loss(ui.text_edit_singleline(&mut config.shinobi.api_key));
                ui.end_row();

                ui.label("Group Key").on_hover_text("User group key");
                changed |= commit_on_focus_loss(ui.text_edit_singleline(&mut config.shinobi.group_key));
                ui.end_row();

                ui.label("Layout").on_hover_text("Monitors layout on screen");
                let before = config.shinobi.layout.clone();
                egui::ComboBox::from_id_salt("layout_picker")
                    .selected_text(config.shinobi.layout.as_str())
                    .show_ui(ui, |ui| {
                        for name in &self.layouts {
                            ui.selectable_value(&mut config.shinobi.layout, name.clone(), name.as_str());
                        }
                    });
                changed |= before != config.shinobi.layout;
                ui.end_row();
            });
        changed
    }

    fn monitors_tab(
        &mut self,
        ui: &mut egui::Ui,
        config: &mut MasterConfig,
        runtime: &Handle,
        client: &Arc<ShinobiClient>,
    ) -> bool {
        ui.horizontal(|ui| {
            let refreshing = self.refresh.is_some();
            if ui
                .add_enabled(!refreshing, egui::Button::new("Refresh"))
                .on_hover_text("Get all monitors list")
                .clicked()
            {
                self.start_refresh(ui.ctx(), config, runtime, client);
            }
            if refreshing {
                ui.spinner();
            }
        });
        ui.separator();

        let Some(selection) = self.selection.as_mut() else {
            ui.label("Press Refresh to load the monitor list from the server.");
            return false;
        };
        if selection.is_empty() {
            ui.label("No monitors to show");
            return false;
        }

        let mut edit = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("monitor_rows").striped(true).num_columns(4).show(ui, |ui| {
                let last = selection.rows().len() - 1;
                for (idx, row) in selection.rows().iter().enumerate() {
                    let mut enabled = row.enabled;
                    if ui.checkbox(&mut enabled, row.summary.name.as_str()).changed() {
                        edit = Some(RowEdit::Toggle(idx));
                    }
                    ui.label(RichText::new(row.summary.mid.as_str()).weak());
                    ui.label(row.summary.groups.join(", "));
                    ui.horizontal(|ui| {
                        if ui.add_enabled(idx > 0, egui::Button::new("up")).clicked() {
                            edit = Some(RowEdit::Up(idx));
                        }
                        if ui.add_enabled(idx < last, egui::Button::new("down")).clicked() {
                            edit = Some(RowEdit::Down(idx));
                        }
                    });
                    ui.end_row();
                }
            });
        });

        let changed = match edit {
            Some(RowEdit::Toggle(i)) => selection.toggle(i),
            Some(RowEdit::Up(i)) => selection.move_up(i),
            Some(RowEdit::Down(i)) => selection.move_down(i),
            None => false,
        };
        if changed {
            config.monitors = selection.enabled_ids();
        }
        changed
    }

    fn start_refresh(
        &mut self,
        ctx: &egui::Context,
        config: &MasterConfig,
        runtime: &Handle,
        client: &Arc<ShinobiClient>,
    ) {
        let server = config.shinobi.server_base().to_string();
        let api_key = config.shinobi.api_key.clone();
        let group_key = config.shinobi.group_key.clone();
        let client = Arc::clone(client);
        let ctx = ctx.clone();
        let (tx, rx) = crossbeam_channel::bounded(1);
        info!("🔄 Refreshing monitor list from {}", server);

        runtime.spawn(async move {
            let result = client
                .list_monitors(&server, &api_key, &group_key)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(result);
            ctx.request_repaint();
        });
        self.status = None;
        self.refresh = Some(rx);
    }

    fn poll_refresh(&mut self, config: &MasterConfig) {
        let Some(rx) = &self.refresh else { return };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err("Monitor list request was interrupted".to_string()),
        };
        self.refresh = None;
        match result {
            Ok(monitors) => {
                self.selection = Some(MonitorSelection::from_server(monitors, &config.monitors));
            }
            Err(msg) => {
                warn!("⚠️ Failed to refresh monitor list: {}", msg);
                self.status = Some(format!("Failed to get monitors list: {}", msg));
            }
        }
    }
}

fn commit_on_focus_loss(response: egui::Response) -> bool {
    response.lost_focus()
}
