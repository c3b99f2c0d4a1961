//! Synchronization between the client's working copy, the local cache and
//! the remote document store.
//!
//! One [`SyncService`] exists per client session. It starts from the cached
//! document (or the synthesized default), refreshes from the store on
//! [`SyncService::load`], mirrors every local edit into the cache, and only
//! talks to the store again when asked to persist or reset. Writes are
//! last-writer-wins: two sessions saving in turn silently overwrite each
//! other, with no version check.

pub mod remote;
pub mod worker;

use crate::core::error::SyncError;
use crate::core::local_cache::LocalCache;
use crate::core::site::{SiteConfiguration, SiteUpdate};

use crate::core::error::StoreError;
use remote::{HealthReport, RemoteStore, SaveReceipt};

/// The client's authoritative in-process copy of the site document
pub struct SyncService<R, C> {
    remote: R,
    cache: C,
    current: SiteConfiguration,
    store_reachable: bool,
}

impl<R: RemoteStore, C: LocalCache> SyncService<R, C> {
    /// Start from the cached document, or the default when the cache is
    /// empty or unreadable. Call [`load`](Self::load) next.
    pub fn new(remote: R, cache: C) -> Self {
        let current = cache.read().unwrap_or_default();
        Self {
            remote,
            cache,
            current,
            store_reachable: true,
        }
    }

    pub fn current(&self) -> &SiteConfiguration {
        &self.current
    }

    pub fn is_store_reachable(&self) -> bool {
        self.store_reachable
    }

    /// Refresh from the store. On failure the current document stays in
    /// place and the store is marked unreachable; nothing is retried.
    pub async fn load(&mut self) -> &SiteConfiguration {
        match self.remote.fetch().await {
            Ok(fetched) => {
                self.current = fetched.unwrap_or_default();
                self.cache.write(&self.current);
                if !self.store_reachable {
                    tracing::info!("Store reachable again");
                }
                self.store_reachable = true;
            }
            Err(e) => {
                tracing::warn!("Store not available, using local copy: {}", e);
                self.store_reachable = false;
            }
        }
        &self.current
    }

    /// Merge a partial update into the working copy and write it through to
    /// the cache. No store I/O.
    pub fn update(&mut self, update: SiteUpdate) -> &SiteConfiguration {
        self.current.apply(update);
        self.cache.write(&self.current);
        &self.current
    }

    /// Write the working copy to the store. Any failure, a rejection
    /// included, marks the store unreachable until the next successful load.
    pub async fn persist(&mut self) -> Result<SaveReceipt, SyncError> {
        self.current.validate()?;

        if !self.store_reachable {
            tracing::info!("Store offline, keeping changes in the local cache only");
            return Err(SyncError::Offline);
        }

        match self.remote.save(&self.current).await {
            Ok(receipt) => {
                tracing::info!("Saved site document: {}", receipt.message);
                Ok(receipt)
            }
            Err(e) => {
                tracing::error!("Failed to save site document: {}", e);
                self.store_reachable = false;
                Err(e.into())
            }
        }
    }

    /// Check store health. Only updates connectivity; the document is untouched.
    pub async fn check_health(&mut self) -> Result<HealthReport, StoreError> {
        let result = self.remote.health().await;
        self.store_reachable = result.is_ok();
        result
    }

    /// Delete every stored document. The working copy and the cache are left
    /// alone; a later [`load`](Self::load) observes the default.
    pub async fn reset(&mut self) -> Result<String, SyncError> {
        if !self.store_reachable {
            return Err(SyncError::Offline);
        }

        match self.remote.reset().await {
            Ok(message) => {
                tracing::info!("Reset site document: {}", message);
                Ok(message)
            }
            Err(e) => {
                tracing::error!("Failed to reset site document: {}", e);
                self.store_reachable = false;
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory doubles for the store and the cache

    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::remote::{HealthReport, RemoteStore, SaveReceipt};
    use crate::core::error::StoreError;
    use crate::core::local_cache::LocalCache;
    use crate::core::site::SiteConfiguration;

    #[derive(Debug, Default)]
    pub struct FakeState {
        pub document: Option<SiteConfiguration>,
        pub offline: bool,
        pub reject_with: Option<u16>,
        pub fetches: usize,
        pub saves: usize,
        pub resets: usize,
    }

    /// Shared handle: clones see the same store
    #[derive(Debug, Clone, Default)]
    pub struct FakeRemote(pub Arc<Mutex<FakeState>>);

    impl FakeRemote {
        pub fn holding(config: SiteConfiguration) -> Self {
            let remote = Self::default();
            remote.state().document = Some(config);
            remote
        }

        pub fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
            self.0.lock().unwrap()
        }

        pub fn set_offline(&self, offline: bool) {
            self.state().offline = offline;
        }

        fn gate(state: &FakeState) -> Result<(), StoreError> {
            if state.offline {
                return Err(StoreError::Unavailable("connection refused".to_string()));
            }
            if let Some(status) = state.reject_with {
                return Err(StoreError::Rejected {
                    status,
                    message: "rejected".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RemoteStore for FakeRemote {
        async fn fetch(&self) -> Result<Option<SiteConfiguration>, StoreError> {
            let mut state = self.state();
            state.fetches += 1;
            Self::gate(&state)?;
            Ok(state.document.clone())
        }

        async fn save(&self, config: &SiteConfiguration) -> Result<SaveReceipt, StoreError> {
            let mut state = self.state();
            state.saves += 1;
            Self::gate(&state)?;
            state.document = Some(config.clone());
            Ok(SaveReceipt {
                message: "Component data saved successfully".to_string(),
                data: config.clone(),
            })
        }

        async fn reset(&self) -> Result<String, StoreError> {
            let mut state = self.state();
            state.resets += 1;
            Self::gate(&state)?;
            state.document = None;
            Ok("All component data reset to defaults".to_string())
        }

        async fn health(&self) -> Result<HealthReport, StoreError> {
            Self::gate(&self.state())?;
            Ok(HealthReport {
                status: "OK".to_string(),
                message: "fake".to_string(),
                timestamp: String::new(),
            })
        }
    }

    #[derive(Debug, Clone, Default)]
    pub struct MemoryCache(pub Arc<Mutex<Option<SiteConfiguration>>>);

    impl MemoryCache {
        pub fn holding(config: SiteConfiguration) -> Self {
            Self(Arc::new(Mutex::new(Some(config))))
        }

        pub fn snapshot(&self) -> Option<SiteConfiguration> {
            self.0.lock().unwrap().clone()
        }
    }

    impl LocalCache for MemoryCache {
        fn read(&self) -> Option<SiteConfiguration> {
            self.snapshot()
        }

        fn write(&self, config: &SiteConfiguration) {
            *self.0.lock().unwrap() = Some(config.clone());
        }
    }
}
