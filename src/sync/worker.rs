//! Background thread that owns the sync service.
//!
//! The dashboard never blocks on the network: it sends [`SyncCommand`]s and
//! drains [`SyncEvent`]s once per frame. Commands run one at a time, so the
//! service sees a single thread of control.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};

use super::remote::{RemoteStore, SaveReceipt};
use super::SyncService;
use crate::core::error::SyncError;
use crate::core::local_cache::LocalCache;
use crate::core::site::{SiteConfiguration, SiteUpdate};
use crate::core::upload::{ImageUploader, UploadError};

/// Work for the sync thread
#[derive(Debug)]
pub enum SyncCommand {
    /// Refresh from the store
    Load,
    /// Merge an update into the working copy
    Apply(SiteUpdate),
    /// Merge an update, then persist the result
    Save(SiteUpdate),
    /// Delete the stored document, then reload
    Reset,
    /// Upload a header image and apply its URL
    UploadImage(PathBuf),
    /// Check store health without touching the document
    CheckHealth,
    Shutdown,
}

/// Working copy and connectivity at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSnapshot {
    pub config: SiteConfiguration,
    pub store_reachable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

/// A user-facing status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A document came from the store (or the fallback); editors should
    /// take it over
    Loaded(SyncSnapshot),
    /// The working copy changed locally
    Updated(SyncSnapshot),
    Notice(Notice),
    /// The command queue is drained
    Idle,
}

/// Translate the result of a save into a status line
pub fn save_notice(result: &Result<SaveReceipt, SyncError>, was_reachable: bool) -> Notice {
    match result {
        Ok(receipt) => Notice::new(NoticeKind::Success, receipt.message.clone()),
        Err(e) if !e.is_soft() => Notice::new(NoticeKind::Error, e.to_string()),
        Err(SyncError::Offline) if !was_reachable => Notice::new(
            NoticeKind::Info,
            "Changes saved locally (offline mode)",
        ),
        Err(e) => Notice::new(
            NoticeKind::Warning,
            format!("Saved locally, but backend sync failed: {e}"),
        ),
    }
}

/// Dashboard-side handle to the sync thread
pub struct SyncHandle {
    commands: Sender<SyncCommand>,
    events: Receiver<SyncEvent>,
    thread: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Move the service onto its own thread. `notify` runs after every event,
    /// typically to request a repaint.
    pub fn spawn<R, C>(
        service: SyncService<R, C>,
        uploader: Option<ImageUploader>,
        notify: impl Fn() + Send + 'static,
    ) -> Result<Self>
    where
        R: RemoteStore + 'static,
        C: LocalCache + 'static,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to build sync runtime")?;

        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("sitedash-sync".to_string())
            .spawn(move || {
                let worker = Worker {
                    service,
                    uploader,
                    runtime,
                    events: event_tx,
                    notify: Box::new(notify),
                };
                worker.run(command_rx);
            })
            .context("Failed to spawn sync thread")?;

        Ok(Self {
            commands: command_tx,
            events: event_rx,
            thread: Some(thread),
        })
    }

    /// Queue a command; returns false once the thread has stopped
    pub fn send(&self, command: SyncCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    /// Drain pending events without blocking
    pub fn poll(&self) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        let _ = self.commands.send(SyncCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

struct Worker<R, C> {
    service: SyncService<R, C>,
    uploader: Option<ImageUploader>,
    runtime: tokio::runtime::Runtime,
    events: Sender<SyncEvent>,
    notify: Box<dyn Fn() + Send>,
}

impl<R: RemoteStore, C: LocalCache> Worker<R, C> {
    fn run(mut self, commands: Receiver<SyncCommand>) {
        while let Ok(command) = commands.recv() {
            tracing::debug!("Sync command: {:?}", command);
            match command {
                SyncCommand::Shutdown => break,
                SyncCommand::Load => self.load(),
                SyncCommand::Apply(update) => {
                    self.service.update(update);
                    self.emit(SyncEvent::Updated(self.snapshot()));
                }
                SyncCommand::Save(update) => self.save(update),
                SyncCommand::Reset => self.reset(),
                SyncCommand::UploadImage(path) => self.upload(path),
                SyncCommand::CheckHealth => self.check_health(),
            }
            self.emit(SyncEvent::Idle);
        }
        tracing::debug!("Sync thread stopped");
    }

    fn emit(&self, event: SyncEvent) {
        if self.events.send(event).is_ok() {
            (self.notify)();
        }
    }

    fn notice(&self, kind: NoticeKind, text: impl Into<String>) {
        self.emit(SyncEvent::Notice(Notice::new(kind, text)));
    }

    fn snapshot(&self) -> SyncSnapshot {
        SyncSnapshot {
            config: self.service.current().clone(),
            store_reachable: self.service.is_store_reachable(),
        }
    }

    fn load(&mut self) {
        self.runtime.block_on(self.service.load());
        self.emit(SyncEvent::Loaded(self.snapshot()));
        if !self.service.is_store_reachable() {
            self.notice(
                NoticeKind::Warning,
                "Backend not available, working from the local copy",
            );
        }
    }

    fn save(&mut self, update: SiteUpdate) {
        let was_reachable = self.service.is_store_reachable();
        self.service.update(update);
        let result = self.runtime.block_on(self.service.persist());
        self.emit(SyncEvent::Updated(self.snapshot()));
        self.emit(SyncEvent::Notice(save_notice(&result, was_reachable)));
    }

    fn reset(&mut self) {
        match self.runtime.block_on(self.service.reset()) {
            Ok(message) => {
                self.load();
                self.notice(NoticeKind::Success, message);
            }
            Err(e) => {
                self.emit(SyncEvent::Updated(self.snapshot()));
                self.notice(NoticeKind::Error, format!("Reset failed: {e}"));
            }
        }
    }

    fn check_health(&mut self) {
        let result = self.runtime.block_on(self.service.check_health());
        self.emit(SyncEvent::Updated(self.snapshot()));
        match result {
            Ok(report) => self.notice(
                NoticeKind::Info,
                format!("{} ({})", report.message, report.timestamp),
            ),
            Err(e) => self.notice(NoticeKind::Warning, format!("Backend not available: {e}")),
        }
    }

    fn upload(&mut self, path: PathBuf) {
        let result = match &self.uploader {
            Some(uploader) => self.runtime.block_on(uploader.upload(&path)),
            None => Err(UploadError::NotConfigured),
        };
        match result {
            Ok(url) => {
                self.service.update(SiteUpdate::image_url(url));
                self.emit(SyncEvent::Updated(self.snapshot()));
                self.notice(NoticeKind::Success, "Image uploaded successfully!");
            }
            Err(e) => {
                tracing::error!("Image upload failed: {}", e);
                self.notice(NoticeKind::Error, e.to_string());
            }
        }
    }
}
