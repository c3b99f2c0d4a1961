//! Main application state and UI coordination

use std::path::PathBuf;

use anyhow::{Context, Result};
use eframe::egui;

use crate::core::config::AppConfig;
use crate::core::local_cache::FileCache;
use crate::core::site::SiteUpdate;
use crate::core::upload::{check_image, ImageUploader, UploadError, IMAGE_EXTENSIONS};
use crate::sync::remote::HttpRemote;
use crate::sync::worker::{Notice, NoticeKind, SyncCommand, SyncEvent, SyncHandle, SyncSnapshot};
use crate::sync::SyncService;
use crate::ui::{
    editor::{DraftForm, EditorPanel},
    preview::PreviewPanel,
    settings::SettingsDialog,
    sidebar::Sidebar,
};

/// View mode for the content area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    Editor,
    Website,
    #[default]
    Split,
}

/// Main application state
pub struct SiteDashApp {
    /// Application configuration
    pub config: AppConfig,
    /// Channel to the sync thread
    sync: SyncHandle,
    /// Last document and connectivity reported by the sync thread
    pub snapshot: SyncSnapshot,
    /// Editor form contents
    pub draft: DraftForm,
    /// Latest status line
    pub notice: Option<Notice>,
    /// Commands sent but not yet finished
    pending: usize,
    /// Current view mode
    pub view_mode: ViewMode,
    /// Whether sidebar is visible
    pub sidebar_visible: bool,
    /// Where the local copy lives
    pub cache_path: PathBuf,
    /// Reset asked for and awaiting confirmation
    pub confirm_reset: bool,
    pub settings: SettingsDialog,
}

impl SiteDashApp {
    /// Create a new application instance and start loading the site
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Result<Self> {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        if config.ui.theme == "dark" {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
        } else {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
        }

        let cache = FileCache::default_location();
        let cache_path = cache.path().to_path_buf();
        let remote = HttpRemote::new(&config.api_base_url, config.request_timeout())
            .context("Failed to build HTTP client")?;
        tracing::info!("Using API at {}", remote.base_url());
        let service = SyncService::new(remote, cache);
        let snapshot = SyncSnapshot {
            config: service.current().clone(),
            store_reachable: service.is_store_reachable(),
        };

        let uploader = match ImageUploader::from_config(&config.upload, config.request_timeout()) {
            Ok(uploader) => Some(uploader),
            Err(UploadError::NotConfigured) => {
                tracing::info!("Image uploads disabled: no image host configured");
                None
            }
            Err(e) => {
                tracing::warn!("Image uploads disabled: {}", e);
                None
            }
        };

        let ctx = cc.egui_ctx.clone();
        let sync = SyncHandle::spawn(service, uploader, move || ctx.request_repaint())?;

        let mut app = Self {
            draft: DraftForm::from_config(&snapshot.config),
            snapshot,
            config,
            sync,
            notice: None,
            pending: 0,
            view_mode: ViewMode::default(),
            sidebar_visible: true,
            cache_path,
            confirm_reset: false,
            settings: SettingsDialog::default(),
        };
        app.send(SyncCommand::Load);
        Ok(app)
    }

    /// Whether the sync thread is working on something
    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }

    fn send(&mut self, command: SyncCommand) {
        if self.sync.send(command) {
            self.pending += 1;
        } else {
            self.set_notice(NoticeKind::Error, "Sync thread stopped; restart the dashboard");
        }
    }

    fn set_notice(&mut self, kind: NoticeKind, text: impl Into<String>) {
        self.notice = Some(Notice::new(kind, text));
    }

    fn process_events(&mut self) {
        for event in self.sync.poll() {
            match event {
                SyncEvent::Loaded(snapshot) => {
                    self.draft = DraftForm::from_config(&snapshot.config);
                    self.snapshot = snapshot;
                }
                SyncEvent::Updated(snapshot) => {
                    if !self.draft.dirty {
                        self.draft = DraftForm::from_config(&snapshot.config);
                    }
                    self.snapshot = snapshot;
                }
                SyncEvent::Notice(notice) => self.notice = Some(notice),
                SyncEvent::Idle => self.pending = self.pending.saturating_sub(1),
            }
        }
    }

    /// Validate the form, then apply and persist it
    pub fn save(&mut self) {
        match self.draft.to_update() {
            Ok(update) => {
                self.draft.dirty = false;
                self.send(SyncCommand::Save(update));
            }
            Err(message) => self.set_notice(NoticeKind::Error, message),
        }
    }

    /// Apply an update to the working copy without persisting
    pub fn apply(&mut self, update: SiteUpdate) {
        if update.is_empty() {
            return;
        }
        self.send(SyncCommand::Apply(update));
    }

    /// Discard form edits and refresh from the store
    pub fn reload(&mut self) {
        self.send(SyncCommand::Load);
    }

    pub fn reset(&mut self) {
        self.send(SyncCommand::Reset);
    }

    pub fn check_health(&mut self) {
        self.send(SyncCommand::CheckHealth);
    }

    /// Pick a header image and hand it to the uploader
    pub fn pick_image(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
        else {
            return;
        };

        match check_image(&path) {
            Ok(_) => {
                self.set_notice(NoticeKind::Info, "Uploading image...");
                self.send(SyncCommand::UploadImage(path));
            }
            Err(e) => self.set_notice(NoticeKind::Error, e.to_string()),
        }
    }

    /// Open the server-rendered page in the browser
    pub fn open_public_page(&mut self) {
        let url = self.config.public_page_url();
        if let Err(e) = open::that(&url) {
            tracing::error!("Failed to open {}: {}", url, e);
            self.set_notice(NoticeKind::Error, format!("Could not open {url}"));
        }
    }

    fn save_settings(&mut self) {
        self.settings.apply_to(&mut self.config);
        match self.config.save() {
            Ok(()) => self.set_notice(NoticeKind::Info, "Settings saved. Restart to apply."),
            Err(e) => {
                tracing::error!("Failed to save settings: {}", e);
                self.set_notice(NoticeKind::Error, format!("Failed to save settings: {e}"));
            }
        }
    }

    /// Render the top menu bar
    fn render_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Save").clicked() {
                        self.save();
                        ui.close();
                    }
                    if ui.button("Reload").clicked() {
                        self.reload();
                        ui.close();
                    }
                    if ui.button("Open Public Page").clicked() {
                        self.open_public_page();
                        ui.close();
                    }
                    if ui.button("Settings...").clicked() {
                        self.settings.open(&self.config);
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Toggle Sidebar").clicked() {
                        self.sidebar_visible = !self.sidebar_visible;
                        ui.close();
                    }
                    ui.separator();
                    if ui.selectable_label(self.view_mode == ViewMode::Editor, "Editor Only").clicked() {
                        self.view_mode = ViewMode::Editor;
                        ui.close();
                    }
                    if ui.selectable_label(self.view_mode == ViewMode::Website, "Website Only").clicked() {
                        self.view_mode = ViewMode::Website;
                        ui.close();
                    }
                    if ui.selectable_label(self.view_mode == ViewMode::Split, "Split View").clicked() {
                        self.view_mode = ViewMode::Split;
                        ui.close();
                    }
                });
            });
        });
    }
}

impl eframe::App for SiteDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_events();

        // Handle keyboard shortcuts
        let (save, reload, toggle_sidebar) = ctx.input(|i| {
            (
                i.modifiers.command && i.key_pressed(egui::Key::S),
                i.modifiers.command && i.key_pressed(egui::Key::R),
                i.modifiers.command && i.key_pressed(egui::Key::B),
            )
        });
        if save && !self.is_busy() {
            self.save();
        }
        if reload && !self.is_busy() {
            self.reload();
        }
        if toggle_sidebar {
            self.sidebar_visible = !self.sidebar_visible;
        }

        self.render_menu_bar(ctx);

        if self.sidebar_visible {
            egui::SidePanel::left("sidebar")
                .resizable(true)
                .default_width(self.config.ui.sidebar_width)
                .min_width(180.0)
                .show(ctx, |ui| {
                    Sidebar::show(ui, self);
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            match self.view_mode {
                ViewMode::Editor => {
                    EditorPanel::show(ui, self);
                }
                ViewMode::Website => {
                    PreviewPanel::show(ui, self);
                }
                ViewMode::Split => {
                    // Split view: editor on left, website on right
                    let available_width = ui.available_width();
                    ui.horizontal(|ui| {
                        ui.set_min_width(available_width);

                        ui.vertical(|ui| {
                            ui.set_width(available_width / 2.0 - 4.0);
                            EditorPanel::show(ui, self);
                        });

                        ui.separator();

                        ui.vertical(|ui| {
                            ui.set_width(available_width / 2.0 - 4.0);
                            PreviewPanel::show(ui, self);
                        });
                    });
                }
            }
        });

        if self.settings.show(ctx) {
            self.save_settings();
        }
    }
}
