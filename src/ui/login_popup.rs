use crate::errors::AppError;
use crate::shinobi::login::LoginRequest;
use crate::shinobi::models::Credentials;
use crate::shinobi::ShinobiClient;
use crossbeam_channel::{Receiver, TryRecvError};
use egui::{Align2, Color32};
use log::debug;
use std::sync::Arc;
use tokio::runtime::Handle;

type LoginResult = Result<Credentials, String>;

/// Modal shown when no API key is configured. Stays open until a login succeeds.
pub struct LoginPopup {
    request: LoginRequest,
    message: String,
    pending: Option<Receiver<LoginResult>>,
}

impl LoginPopup {
    pub fn new(server: &str) -> Self {
        LoginPopup {
            request: LoginRequest { server: server.to_string(), ..Default::default() },
            message: String::new(),
            pending: None,
        }
    }

    fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns the server base URL and the keys once the server accepts the login.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        runtime: &Handle,
        client: &Arc<ShinobiClient>,
    ) -> Option<(String, Credentials)> {
        if let Some(outcome) = self.poll_pending() {
            return Some(outcome);
        }

        let mut submit = false;
        let busy = self.is_busy();
        egui::Window::new("Login")
            .collapsible(false)
            .resizable(false)
            .default_width(330.0)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.add_enabled_ui(!busy, |ui| {
                    ui.label("Server URL");
                    ui.text_edit_singleline(&mut self.request.server);
                    ui.label("E-mail");
                    ui.text_edit_singleline(&mut self.request.email);
                    ui.label("Password");
                    let password = ui.add(egui::TextEdit::singleline(&mut self.request.password).password(true));
                    if password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        submit = true;
                    }
                    ui.add_space(8.0);
                    if ui.button("Login").clicked() {
                        submit = true;
                    }
                });
                if busy {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Logging in…");
                    });
                } else if !self.message.is_empty() {
                    ui.colored_label(Color32::LIGHT_RED, self.message.as_str());
                }
            });

        if submit && !busy {
            self.submit(ctx, runtime, client);
        }
        None
    }

    fn submit(&mut self, ctx: &egui::Context, runtime: &Handle, client: &Arc<ShinobiClient>) {
        if let Err(msg) = self.request.validate() {
            self.message = msg.to_string();
            return;
        }
        self.message.clear();

        let (tx, rx) = crossbeam_channel::bounded(1);
        let request = self.request.clone();
        let client = Arc::clone(client);
        let ctx = ctx.clone();
        runtime.spawn(async move {
            let result = request.submit(&client).await.map_err(|e| match e {
                AppError::Login(msg) => msg,
                other => other.to_string(),
            });
            let _ = tx.send(result);
            ctx.request_repaint();
        });
        self.pending = Some(rx);
    }

    fn poll_pending(&mut self) -> Option<(String, Credentials)> {
        let result = match self.pending.as_ref()?.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err("Login request was interrupted".to_string()),
        };
        self.pending = None;
        match result {
            Ok(credentials) => {
                self.message.clear();
                Some((self.request.server_base(), credentials))
            }
            Err(msg) => {
                debug!("Login attempt failed: {}", msg);
                self.message = msg;
                None
            }
        }
    }
}
