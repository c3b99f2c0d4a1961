//! Error types shared by the store, the sync service and the server

use thiserror::Error;

/// A document that must not be written
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required fields: header, navbar, and footer are required")]
    MissingSections,
    #[error("Navbar must contain exactly 3 links")]
    NavbarLength(usize),
    #[error("Each navbar link must have a label and url")]
    IncompleteLink { index: usize },
    #[error("Invalid request body: {0}")]
    Malformed(String),
}

/// Failure talking to a document store, local or remote
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport failure: connection refused, timeout, DNS
    #[error("store unreachable: {0}")]
    Unavailable(String),
    /// The store answered with a non-success status
    #[error("{message} (status {status})")]
    Rejected { status: u16, message: String },
    /// The storage engine failed
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("could not decode stored document: {0}")]
    Decode(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Decode(e.to_string())
    }
}

/// Result of a sync operation that did not go through
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("store not available")]
    Offline,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SyncError {
    /// Soft failures leave the local state intact and only degrade syncing
    pub fn is_soft(&self) -> bool {
        !matches!(self, SyncError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_message() {
        let err = StoreError::Rejected {
            status: 400,
            message: "Navbar must contain exactly 3 links".into(),
        };
        assert_eq!(err.to_string(), "Navbar must contain exactly 3 links (status 400)");
    }

    #[test]
    fn test_sync_error_messages() {
        assert_eq!(SyncError::Offline.to_string(), "store not available");
        let err = SyncError::from(ValidationError::NavbarLength(2));
        assert_eq!(err.to_string(), "Navbar must contain exactly 3 links");
        assert!(!err.is_soft());
        assert!(SyncError::Offline.is_soft());
    }
}
