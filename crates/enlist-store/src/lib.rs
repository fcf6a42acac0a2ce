//! Document storage layer for enlist.
//!
//! This crate provides a schema-free document store on top of a `RocksDB`
//! transaction database, and the entity access layer the service calls into.
//!
//! # Architecture
//!
//! - [`DocumentBackend`]: the raw store. Reads, merge-writes, bounded scans and
//!   pessimistic multi-document transactions. [`RocksBackend`] is the production
//!   implementation.
//! - [`StoreFactory`]: resolves a project to its backend and hands out scoped
//!   [`StoreHandle`]s. One handle is acquired per operation and released when it
//!   is dropped.
//! - Access layer (methods on `StoreHandle`): `upsert`, `get_by_id`,
//!   `find_by_field`, their error-preserving counterparts `lookup` and `query`,
//!   and the two-document `transfer`.
//!
//! # Example
//!
//! ```no_run
//! use enlist_core::{Fields, ProjectId};
//! use enlist_store::StoreFactory;
//!
//! let factory = StoreFactory::open("/tmp/enlist-data", ProjectId::new("demo").unwrap()).unwrap();
//!
//! let handle = factory.connect().unwrap();
//! let mut fields = Fields::new();
//! fields.insert("balance".into(), 1_300_000.0.into());
//! assert!(handle.upsert("accounts", "1001", &fields).is_saved());
//!
//! let account = handle.get_by_id("accounts", "1001");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod access;
pub mod error;
pub mod factory;
pub mod keys;
pub mod rocks;
pub mod transfer;

pub use access::{Operation, SaveStatus};
pub use error::{Result, StoreError};
pub use factory::{StoreFactory, StoreHandle};
pub use rocks::RocksBackend;
pub use transfer::{TransferError, TransferReceipt};

use enlist_core::{DocumentRef, EntityRecord, FieldFilter, Fields};

/// The storage trait defining all document operations.
///
/// This trait abstracts the storage layer, allowing for different implementations
/// (e.g., `RocksDB`, or fault-injecting backends in tests).
pub trait DocumentBackend: Send + Sync {
    /// Check that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if it is not.
    fn ping(&self) -> Result<()>;

    /// Get a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails. A missing document is
    /// `Ok(None)`, not an error.
    fn get(&self, doc: &DocumentRef) -> Result<Option<EntityRecord>>;

    /// Merge `fields` into a document, creating it if needed, and return the
    /// document as written.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn merge(&self, doc: &DocumentRef, fields: &Fields) -> Result<EntityRecord>;

    /// Return up to `limit` documents of `collection` matching `filter`, in
    /// ascending id order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn scan(&self, collection: &str, filter: &FieldFilter, limit: usize)
        -> Result<Vec<EntityRecord>>;

    /// Run `body` as one atomic unit over `docs`.
    ///
    /// Every document is locked for writing and then read; `body` receives the
    /// current documents in the order of `docs` (`None` for missing ones) and
    /// returns a value plus one merge-write per document (an empty map writes
    /// nothing). The writes are committed together, or, if `body` fails or any
    /// write fails, not at all. Transactions touching the same document are
    /// serialized.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `body`, or a `StoreError` (converted into
    /// `E`) if locking, reading, writing or committing fails.
    fn transact<T, E, F>(&self, docs: &[DocumentRef], body: F) -> std::result::Result<T, E>
    where
        Self: Sized,
        E: From<StoreError>,
        F: FnOnce(&[Option<EntityRecord>]) -> std::result::Result<(T, Vec<Fields>), E>;
}
