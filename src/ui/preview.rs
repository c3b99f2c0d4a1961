//! Rendered website preview

use eframe::egui::{self, Color32, RichText};

use crate::app::SiteDashApp;

const HEADER_FILL: Color32 = Color32::from_rgb(30, 58, 138);
const FOOTER_FILL: Color32 = Color32::from_rgb(17, 24, 39);

/// Website preview panel
pub struct PreviewPanel;

impl PreviewPanel {
    /// Show the preview panel
    pub fn show(ui: &mut egui::Ui, app: &mut SiteDashApp) {
        // Clone up front to avoid borrow conflicts with the closures
        let config = app.snapshot.config.clone();
        let root = app.config.site_root().to_string();

        egui::ScrollArea::vertical()
            .id_salt("preview_scroll")
            .show(ui, |ui| {
                egui::Frame::new()
                    .fill(HEADER_FILL)
                    .inner_margin(egui::Margin::symmetric(16, 12))
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.horizontal_wrapped(|ui| {
                            if !config.header.image_url.is_empty() {
                                ui.add(
                                    egui::Image::new(config.header.image_url.as_str())
                                        .fit_to_exact_size(egui::vec2(48.0, 48.0))
                                        .corner_radius(8.0),
                                );
                            }
                            ui.label(
                                RichText::new(&config.header.title)
                                    .heading()
                                    .color(Color32::WHITE),
                            );
                            ui.add_space(24.0);
                            for link in &config.navbar {
                                let label = RichText::new(&link.label).color(Color32::WHITE);
                                if link.has_safe_url() {
                                    ui.hyperlink_to(label, resolve_link(&root, &link.url));
                                } else {
                                    ui.label(label);
                                }
                            }
                        });
                    });

                ui.add_space(24.0);
                ui.vertical_centered(|ui| {
                    ui.heading("Welcome to Your Website");
                    ui.label("Header, navbar and footer on this page are edited from the dashboard.");
                });
                ui.add_space(48.0);

                egui::Frame::new()
                    .fill(FOOTER_FILL)
                    .inner_margin(egui::Margin::symmetric(16, 12))
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        let muted = Color32::from_rgb(209, 213, 219);
                        let footer = &config.footer;
                        ui.horizontal(|ui| {
                            ui.label(RichText::new("Email:").color(muted));
                            ui.hyperlink_to(&footer.email, format!("mailto:{}", footer.email));
                        });
                        ui.label(RichText::new(format!("Phone: {}", footer.phone)).color(muted));
                        ui.label(RichText::new(format!("Address: {}", footer.address)).color(muted));
                    });
            });
    }
}

/// Site-relative links resolve against the server root
fn resolve_link(root: &str, url: &str) -> String {
    if url.starts_with('/') {
        format!("{root}{url}")
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_link() {
        assert_eq!(
            resolve_link("http://localhost:5000", "/about"),
            "http://localhost:5000/about"
        );
        assert_eq!(
            resolve_link("http://localhost:5000", "https://blog.example"),
            "https://blog.example"
        );
    }
}
