//! Store client factory and scoped handles.
//!
//! A [`StoreFactory`] is built once at startup for the configured project. Each
//! operation then acquires its own [`StoreHandle`] through
//! [`StoreFactory::connect`] and releases it by dropping it, on every exit path.
//! Handles share the project's opened database.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use enlist_core::ProjectId;

use crate::error::Result;
use crate::rocks::RocksBackend;
use crate::DocumentBackend;

/// Produces handles to the document store of one project.
pub struct StoreFactory<B: DocumentBackend = RocksBackend> {
    project_id: ProjectId,
    backend: Arc<B>,
    open_handles: Arc<AtomicUsize>,
}

impl StoreFactory<RocksBackend> {
    /// Open the database of `project_id` under `data_dir`.
    ///
    /// Each project gets its own directory, `data_dir/<project_id>`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the database cannot be opened.
    pub fn open<P: AsRef<Path>>(data_dir: P, project_id: ProjectId) -> Result<Self> {
        let path = data_dir.as_ref().join(project_id.as_str());
        tracing::info!(project_id = %project_id, path = %path.display(), "Opening document store");
        let backend = RocksBackend::open(path)?;
        Ok(Self::with_backend(project_id, backend))
    }
}

impl<B: DocumentBackend> StoreFactory<B> {
    /// Build a factory over an already opened backend.
    #[must_use]
    pub fn with_backend(project_id: ProjectId, backend: B) -> Self {
        Self {
            project_id,
            backend: Arc::new(backend),
            open_handles: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The project this factory connects to.
    #[must_use]
    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    /// Number of handles currently acquired and not yet released.
    #[must_use]
    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    /// Acquire a handle to the store.
    ///
    /// There is no retry: a failure here aborts the caller's startup or request.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the store cannot be reached.
    pub fn connect(&self) -> Result<StoreHandle<B>> {
        if let Err(e) = self.backend.ping() {
            tracing::error!(
                project_id = %self.project_id,
                error = %e,
                "Failed to connect to document store"
            );
            return Err(e);
        }

        self.open_handles.fetch_add(1, Ordering::SeqCst);
        let handle = StoreHandle {
            id: Uuid::new_v4(),
            backend: Arc::clone(&self.backend),
            open_handles: Arc::clone(&self.open_handles),
        };
        tracing::trace!(
            handle = %handle.id,
            project_id = %self.project_id,
            "Store handle acquired"
        );
        Ok(handle)
    }
}

impl<B: DocumentBackend> Clone for StoreFactory<B> {
    fn clone(&self) -> Self {
        Self {
            project_id: self.project_id.clone(),
            backend: Arc::clone(&self.backend),
            open_handles: Arc::clone(&self.open_handles),
        }
    }
}

/// A scoped connection to the document store.
///
/// The access-layer operations are methods on this type (see the `access` and
/// `transfer` modules). Dropping the handle releases it.
pub struct StoreHandle<B: DocumentBackend = RocksBackend> {
    id: Uuid,
    pub(crate) backend: Arc<B>,
    open_handles: Arc<AtomicUsize>,
}

impl<B: DocumentBackend> StoreHandle<B> {
    /// Identifier of this handle, for correlating log lines.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl<B: DocumentBackend> Drop for StoreHandle<B> {
    fn drop(&mut self) {
        self.open_handles.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(handle = %self.id, "Store handle released");
    }
}
