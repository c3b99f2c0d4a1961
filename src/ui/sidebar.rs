//! Sidebar with connection status and site actions

use eframe::egui::{self, Color32, RichText};

use crate::app::SiteDashApp;
use crate::sync::worker::NoticeKind;

enum SidebarAction {
    Reload,
    CheckHealth,
    Reset,
    OpenPublicPage,
    Settings,
}

/// Sidebar panel
pub struct Sidebar;

impl Sidebar {
    /// Show the sidebar
    pub fn show(ui: &mut egui::Ui, app: &mut SiteDashApp) {
        let mut action = None;

        ui.vertical(|ui| {
            ui.heading("Site");
            ui.add_space(4.0);

            let (text, color) = if app.snapshot.store_reachable {
                ("Online", Color32::from_rgb(22, 163, 74))
            } else {
                ("Offline", Color32::from_rgb(217, 119, 6))
            };
            ui.horizontal(|ui| {
                ui.label(RichText::new("●").color(color));
                ui.label(text);
                if app.is_busy() {
                    ui.spinner();
                }
            });
            ui.label(RichText::new(&app.config.api_base_url).small().weak());

            if let Some(notice) = &app.notice {
                ui.add_space(6.0);
                ui.label(RichText::new(&notice.text).color(notice_color(notice.kind)));
            }

            ui.separator();

            let idle = !app.is_busy();
            if ui
                .add_enabled(idle, egui::Button::new("Reload"))
                .on_hover_text("Ctrl+R")
                .clicked()
            {
                action = Some(SidebarAction::Reload);
            }
            if ui
                .add_enabled(idle, egui::Button::new("Check connection"))
                .clicked()
            {
                action = Some(SidebarAction::CheckHealth);
            }
            if ui.button("Open public page").clicked() {
                action = Some(SidebarAction::OpenPublicPage);
            }

            ui.add_space(8.0);
            ui.collapsing("Danger zone", |ui| {
                if app.confirm_reset {
                    ui.label("Delete the stored site and restore defaults?");
                    ui.horizontal(|ui| {
                        if ui.button("Cancel").clicked() {
                            app.confirm_reset = false;
                        }
                        if ui
                            .add_enabled(idle, egui::Button::new("Reset"))
                            .clicked()
                        {
                            action = Some(SidebarAction::Reset);
                        }
                    });
                } else if ui.button("Reset to defaults...").clicked() {
                    app.confirm_reset = true;
                }
            });

            ui.separator();
            ui.collapsing("Local copy", |ui| {
                ui.label(RichText::new(app.cache_path.display().to_string()).small());
            });
            if ui.button("Settings...").clicked() {
                action = Some(SidebarAction::Settings);
            }
        });

        match action {
            Some(SidebarAction::Reload) => app.reload(),
            Some(SidebarAction::CheckHealth) => app.check_health(),
            Some(SidebarAction::Reset) => {
                app.confirm_reset = false;
                app.reset();
            }
            Some(SidebarAction::OpenPublicPage) => app.open_public_page(),
            Some(SidebarAction::Settings) => app.settings.open(&app.config),
            None => {}
        }
    }
}

pub fn notice_color(kind: NoticeKind) -> Color32 {
    match kind {
        NoticeKind::Info => Color32::from_rgb(37, 99, 235),
        NoticeKind::Success => Color32::from_rgb(22, 163, 74),
        NoticeKind::Warning => Color32::from_rgb(217, 119, 6),
        NoticeKind::Error => Color32::from_rgb(220, 38, 38),
    }
}
