//! Dashboard editor form

use std::sync::OnceLock;

use eframe::egui::{self, Color32, RichText};
use regex_lite::Regex;

use crate::app::SiteDashApp;
use crate::core::site::{
    is_linkable, FooterUpdate, HeaderUpdate, NavLink, SiteConfiguration, SiteUpdate, NAVBAR_LEN,
};

/// Form state, edited freely and only applied on save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftForm {
    pub title: String,
    pub navbar: Vec<NavLink>,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Edited since the last load or save
    pub dirty: bool,
}

impl DraftForm {
    /// Copy a document into the form. The form always shows exactly
    /// [`NAVBAR_LEN`] link rows, so a stored navbar of the wrong length
    /// can still be repaired.
    pub fn from_config(config: &SiteConfiguration) -> Self {
        let mut navbar = config.navbar.clone();
        navbar.resize_with(NAVBAR_LEN, NavLink::default);
        Self {
            title: config.header.title.clone(),
            navbar,
            email: config.footer.email.clone(),
            phone: config.footer.phone.clone(),
            address: config.footer.address.clone(),
            dirty: false,
        }
    }

    /// Form-level checks, then the update to apply. The header image is
    /// managed by the uploader and not part of the form.
    pub fn to_update(&self) -> Result<SiteUpdate, String> {
        if self.title.trim().is_empty() {
            return Err("Please enter a header title".to_string());
        }

        if !self.email.is_empty() && !is_valid_email(&self.email) {
            return Err("Please enter a valid email address".to_string());
        }

        for (i, link) in self.navbar.iter().enumerate() {
            if !link.url.is_empty() && !is_linkable(&link.url) {
                return Err(format!(
                    "Link {} URL should start with http://, https://, or /",
                    i + 1
                ));
            }
        }

        Ok(SiteUpdate {
            header: Some(HeaderUpdate {
                title: Some(self.title.clone()),
                image_url: None,
            }),
            navbar: Some(self.navbar.clone()),
            footer: Some(FooterUpdate {
                email: Some(self.email.clone()),
                phone: Some(self.phone.clone()),
                address: Some(self.address.clone()),
            }),
        })
    }
}

fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
        .map_or(true, |re| re.is_match(email))
}

enum EditorAction {
    Save,
    PickImage,
    RemoveImage,
}

/// Editor panel
pub struct EditorPanel;

impl EditorPanel {
    /// Show the editor panel
    pub fn show(ui: &mut egui::Ui, app: &mut SiteDashApp) {
        let mut action = None;
        let busy = app.is_busy();

        egui::ScrollArea::vertical()
            .id_salt("editor_scroll")
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Dashboard Editor");
                    if !app.snapshot.store_reachable {
                        ui.label(
                            RichText::new("Offline Mode (local cache only)")
                                .small()
                                .color(Color32::from_rgb(146, 64, 14))
                                .background_color(Color32::from_rgb(254, 243, 199)),
                        );
                    }
                });
                ui.add_space(8.0);

                let mut changed = false;

                ui.group(|ui| {
                    ui.label(RichText::new("Header Settings").strong());
                    ui.label("Header Title");
                    changed |= ui
                        .add(
                            egui::TextEdit::singleline(&mut app.draft.title)
                                .hint_text("Enter header title")
                                .desired_width(f32::INFINITY),
                        )
                        .changed();

                    ui.add_space(4.0);
                    ui.label("Header Image");
                    let image_url = app.snapshot.config.header.image_url.clone();
                    if !image_url.is_empty() {
                        ui.add(
                            egui::Image::new(image_url)
                                .max_size(egui::vec2(128.0, 128.0))
                                .corner_radius(8.0),
                        );
                    }
                    ui.horizontal(|ui| {
                        if ui
                            .add_enabled(!busy, egui::Button::new("Choose image..."))
                            .on_hover_text("JPG, PNG, GIF or WebP, up to 5MB")
                            .clicked()
                        {
                            action = Some(EditorAction::PickImage);
                        }
                        if !app.snapshot.config.header.image_url.is_empty()
                            && ui.button("Remove image").clicked()
                        {
                            action = Some(EditorAction::RemoveImage);
                        }
                    });
                });

                ui.add_space(8.0);
                ui.group(|ui| {
                    ui.label(RichText::new("Navbar Links (3 links)").strong());
                    egui::Grid::new("navbar_grid")
                        .num_columns(3)
                        .spacing([8.0, 4.0])
                        .show(ui, |ui| {
                            for (i, link) in app.draft.navbar.iter_mut().enumerate() {
                                ui.label(format!("Link {}", i + 1));
                                changed |= ui
                                    .add(
                                        egui::TextEdit::singleline(&mut link.label)
                                            .hint_text(format!("Label {}", i + 1)),
                                    )
                                    .changed();
                                changed |= ui
                                    .add(
                                        egui::TextEdit::singleline(&mut link.url)
                                            .hint_text("https://example.com"),
                                    )
                                    .changed();
                                ui.end_row();
                            }
                        });
                });

                ui.add_space(8.0);
                ui.group(|ui| {
                    ui.label(RichText::new("Footer Contact Information").strong());
                    egui::Grid::new("footer_grid")
                        .num_columns(2)
                        .spacing([8.0, 4.0])
                        .show(ui, |ui| {
                            ui.label("Email Address");
                            changed |= ui
                                .add(
                                    egui::TextEdit::singleline(&mut app.draft.email)
                                        .hint_text("email@example.com"),
                                )
                                .changed();
                            ui.end_row();

                            ui.label("Phone Number");
                            changed |= ui
                                .add(
                                    egui::TextEdit::singleline(&mut app.draft.phone)
                                        .hint_text("+1 (555) 123-4567"),
                                )
                                .changed();
                            ui.end_row();

                            ui.label("Address");
                            changed |= ui
                                .add(
                                    egui::TextEdit::singleline(&mut app.draft.address)
                                        .hint_text("123 Main St, City, Country"),
                                )
                                .changed();
                            ui.end_row();
                        });
                });

                if changed {
                    app.draft.dirty = true;
                }

                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    let label = if busy {
                        "Working..."
                    } else {
                        "Save All Changes"
                    };
                    if ui
                        .add_enabled(!busy, egui::Button::new(label))
                        .clicked()
                    {
                        action = Some(EditorAction::Save);
                    }
                    if busy {
                        ui.spinner();
                    }
                    if app.draft.dirty {
                        ui.label(RichText::new("Unsaved changes").italics());
                    }
                });
            });

        match action {
            Some(EditorAction::Save) => app.save(),
            Some(EditorAction::PickImage) => app.pick_image(),
            Some(EditorAction::RemoveImage) => app.apply(SiteUpdate::image_url("")),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> DraftForm {
        DraftForm::from_config(&SiteConfiguration::default())
    }

    #[test]
    fn test_from_config_is_clean() {
        let form = draft();
        assert!(!form.dirty);
        assert_eq!(form.title, "My Site");
        assert_eq!(form.navbar.len(), 3);
    }

    #[test]
    fn test_wrong_length_navbar_gets_exact_rows() {
        let mut config = SiteConfiguration::default();
        config.navbar.clear();
        assert_eq!(DraftForm::from_config(&config).navbar.len(), NAVBAR_LEN);

        config.navbar = vec![NavLink::new("A", "/a"); 5];
        let form = DraftForm::from_config(&config);
        assert_eq!(form.navbar, vec![NavLink::new("A", "/a"); NAVBAR_LEN]);
    }

    #[test]
    fn test_valid_form_builds_full_update() {
        let update = draft().to_update().unwrap();
        let mut config = SiteConfiguration::default();
        config.header.image_url = "https://cdn/keep.png".to_string();
        config.apply(update);
        assert_eq!(config.header.image_url, "https://cdn/keep.png");
        assert_eq!(config.navbar, SiteConfiguration::default().navbar);
    }

    #[test]
    fn test_blank_title_rejected() {
        let mut form = draft();
        form.title = "   ".to_string();
        assert_eq!(form.to_update().unwrap_err(), "Please enter a header title");
    }

    #[test]
    fn test_email_format() {
        let mut form = draft();
        form.email = "not-an-email".to_string();
        assert!(form.to_update().is_err());

        form.email = "a b@example.com".to_string();
        assert!(form.to_update().is_err());

        form.email = String::new();
        assert!(form.to_update().is_ok());

        form.email = "owner@shop.example".to_string();
        assert!(form.to_update().is_ok());
    }

    #[test]
    fn test_link_url_prefix() {
        let mut form = draft();
        form.navbar[1].url = "about".to_string();
        assert_eq!(
            form.to_update().unwrap_err(),
            "Link 2 URL should start with http://, https://, or /"
        );

        form.navbar[1].url = "https://about.example".to_string();
        assert!(form.to_update().is_ok());

        // Empty urls pass the form and are caught when persisting
        form.navbar[1].url.clear();
        assert!(form.to_update().is_ok());
    }
}
