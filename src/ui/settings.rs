//! Settings window

use eframe::egui;

use crate::core::config::AppConfig;

/// Editable copy of the connection settings
#[derive(Default)]
pub struct SettingsDialog {
    pub visible: bool,
    pub api_base_url: String,
    pub cloud_name: String,
    pub upload_preset: String,
}

impl SettingsDialog {
    pub fn open(&mut self, config: &AppConfig) {
        self.api_base_url = config.api_base_url.clone();
        self.cloud_name = config.upload.cloud_name.clone().unwrap_or_default();
        self.upload_preset = config.upload.upload_preset.clone().unwrap_or_default();
        self.visible = true;
    }

    /// Copy the fields into `config`. Blank credentials clear the setting.
    pub fn apply_to(&self, config: &mut AppConfig) {
        let url = self.api_base_url.trim();
        if !url.is_empty() {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        config.upload.cloud_name = non_blank(&self.cloud_name);
        config.upload.upload_preset = non_blank(&self.upload_preset);
    }

    /// Returns true when the user saved
    pub fn show(&mut self, ctx: &egui::Context) -> bool {
        let mut saved = false;

        if self.visible {
            egui::Window::new("Settings")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    egui::Grid::new("settings_grid")
                        .num_columns(2)
                        .spacing([8.0, 6.0])
                        .show(ui, |ui| {
                            ui.label("API base URL");
                            ui.text_edit_singleline(&mut self.api_base_url);
                            ui.end_row();

                            ui.label("Cloudinary cloud name");
                            ui.text_edit_singleline(&mut self.cloud_name);
                            ui.end_row();

                            ui.label("Upload preset");
                            ui.text_edit_singleline(&mut self.upload_preset);
                            ui.end_row();
                        });

                    ui.label(egui::RichText::new("Changes apply on next start").small().weak());

                    ui.horizontal(|ui| {
                        if ui.button("Cancel").clicked() {
                            self.visible = false;
                        }
                        if ui.button("Save").clicked() {
                            saved = true;
                            self.visible = false;
                        }
                    });
                });
        }

        saved
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_dialog() {
        let mut config = AppConfig::default();
        config.upload.cloud_name = Some("demo".to_string());

        let mut dialog = SettingsDialog::default();
        dialog.open(&config);
        assert!(dialog.visible);
        assert_eq!(dialog.cloud_name, "demo");

        dialog.api_base_url = " https://cms.example.org/api/ ".to_string();
        dialog.cloud_name = "  ".to_string();
        dialog.upload_preset = "unsigned".to_string();
        dialog.apply_to(&mut config);

        assert_eq!(config.api_base_url, "https://cms.example.org/api");
        assert_eq!(config.upload.cloud_name, None);
        assert_eq!(config.upload.upload_preset.as_deref(), Some("unsigned"));
    }

    #[test]
    fn test_blank_url_keeps_previous() {
        let mut config = AppConfig::default();
        let dialog = SettingsDialog::default();
        dialog.apply_to(&mut config);
        assert_eq!(config.api_base_url, "http://localhost:5000/api");
    }
}
