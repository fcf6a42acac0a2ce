//! Generic entity access layer.
//!
//! Collection-agnostic operations on a [`StoreHandle`]. Store failures never reach
//! callers of `upsert`, `get_by_id` or `find_by_field` verbatim: a failed write
//! becomes [`SaveStatus::SaveFailed`], a failed read becomes an empty result, and
//! the failure is logged with its [`Operation`] code. A missing document is not a
//! failure and is not logged as one.
//!
//! Callers that must tell "nothing there" apart from "the store failed" use
//! [`StoreHandle::lookup`] and [`StoreHandle::query`] instead.

use serde_json::Value;

use enlist_core::{
    validate_collection, DocumentRef, EntityRecord, FieldFilter, Fields, QueryOp, QUERY_MAX_LIMIT,
};

use crate::error::{Result, StoreError};
use crate::factory::StoreHandle;
use crate::DocumentBackend;

/// Access-layer operations, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Create a document that must not exist yet.
    Insert,
    /// Merge-write a document.
    Save,
    /// Query documents by field.
    Query,
    /// Read a document by id.
    Get,
    /// Remove a document.
    Delete,
}

impl Operation {
    /// Code logged when this operation fails.
    #[must_use]
    pub const fn failure_code(self) -> &'static str {
        match self {
            Self::Insert => "RECORD-INSERT-FAILED",
            Self::Save => "RECORD-SAVE-FAILED",
            Self::Query => "RECORD-QUERY-FAILED",
            Self::Get => "RECORD-READ-FAILED",
            Self::Delete => "RECORD-DELETE-FAILED",
        }
    }
}

/// Outcome of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// The fields were merged into the document.
    Saved,
    /// The write failed; nothing was changed.
    SaveFailed,
}

impl SaveStatus {
    /// Whether the write succeeded.
    #[must_use]
    pub const fn is_saved(self) -> bool {
        matches!(self, Self::Saved)
    }

    /// Status code of the outcome.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Saved => "success",
            Self::SaveFailed => Operation::Save.failure_code(),
        }
    }
}

impl<B: DocumentBackend> StoreHandle<B> {
    /// Build a reference to a document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidReference` if the collection or id is malformed.
    pub fn doc(&self, collection: &str, id: &str) -> Result<DocumentRef> {
        Ok(DocumentRef::new(collection, id)?)
    }

    /// Merge `fields` into the document `id` of `collection`, creating it if needed.
    ///
    /// Keys present in `fields` overwrite, absent keys are preserved; repeating
    /// the same upsert leaves the document unchanged. Never fails: the outcome is
    /// the returned status.
    pub fn upsert(&self, collection: &str, id: &str, fields: &Fields) -> SaveStatus {
        let result = self
            .doc(collection, id)
            .and_then(|doc| self.backend.merge(&doc, fields));

        match result {
            Ok(record) => {
                tracing::debug!(
                    collection,
                    id,
                    update_time = %record.update_time,
                    "Entity saved"
                );
                SaveStatus::Saved
            }
            Err(e) => {
                tracing::error!(
                    code = Operation::Save.failure_code(),
                    collection,
                    id,
                    error = %e,
                    "Failed to save entity"
                );
                SaveStatus::SaveFailed
            }
        }
    }

    /// Read the document `id` of `collection`, keeping failures distinct.
    ///
    /// # Errors
    ///
    /// Returns the store error if the read fails. A missing document is `Ok(None)`.
    pub fn lookup(&self, collection: &str, id: &str) -> Result<Option<EntityRecord>> {
        let doc = self.doc(collection, id)?;
        match self.backend.get(&doc) {
            Err(e) if e.is_not_found() => Ok(None),
            other => other,
        }
    }

    /// Read the document `id` of `collection`.
    ///
    /// Returns `None` both when the document does not exist and when the read
    /// fails; only the latter is logged.
    #[must_use]
    pub fn get_by_id(&self, collection: &str, id: &str) -> Option<EntityRecord> {
        match self.lookup(collection, id) {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(
                    code = Operation::Get.failure_code(),
                    collection,
                    id,
                    error = %e,
                    "Failed to read entity"
                );
                None
            }
        }
    }

    /// Return up to [`QUERY_MAX_LIMIT`] documents of `collection` matching
    /// `filter`, keeping failures distinct.
    ///
    /// # Errors
    ///
    /// Returns the store error if the query fails. No match is `Ok(vec![])`.
    pub fn query(&self, collection: &str, filter: &FieldFilter) -> Result<Vec<EntityRecord>> {
        validate_collection(collection)?;
        match self.backend.scan(collection, filter, QUERY_MAX_LIMIT) {
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            other => other,
        }
    }

    /// Return up to [`QUERY_MAX_LIMIT`] documents of `collection` whose `field`
    /// compares to `value` under `op`.
    ///
    /// Returns an empty list both when nothing matches and when the query fails;
    /// only the latter is logged as an error.
    #[must_use]
    pub fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        op: QueryOp,
        value: impl Into<Value>,
    ) -> Vec<EntityRecord> {
        let result = FieldFilter::new(field, op, value)
            .map_err(StoreError::from)
            .and_then(|filter| self.query(collection, &filter).map(|docs| (filter, docs)));

        match result {
            Ok((filter, docs)) => {
                if docs.is_empty() {
                    tracing::debug!(collection, filter = %filter, "No record found for the query");
                }
                docs
            }
            Err(e) => {
                tracing::error!(
                    code = Operation::Query.failure_code(),
                    collection,
                    field,
                    op = %op,
                    error = %e,
                    "Failed to query entities"
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::StoreFactory;
    use enlist_core::ProjectId;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// In-memory sink for formatted log lines.
    #[derive(Clone, Default)]
    struct LogCapture(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Run `f` and return everything it logged.
    fn logs_of(f: impl FnOnce()) -> String {
        let capture = LogCapture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = capture.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn create_test_factory() -> (StoreFactory, TempDir) {
        let dir = TempDir::new().unwrap();
        let factory = StoreFactory::open(dir.path(), ProjectId::new("access").unwrap()).unwrap();
        (factory, dir)
    }

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    /// Backend whose every call fails like an unreachable server.
    struct UnreachableBackend {
        reachable_for_ping: bool,
    }

    impl DocumentBackend for UnreachableBackend {
        fn ping(&self) -> Result<()> {
            if self.reachable_for_ping {
                Ok(())
            } else {
                Err(StoreError::Unavailable("connection refused".into()))
            }
        }

        fn get(&self, _doc: &DocumentRef) -> Result<Option<EntityRecord>> {
            Err(StoreError::Unavailable("transport closed".into()))
        }

        fn merge(&self, _doc: &DocumentRef, _fields: &Fields) -> Result<EntityRecord> {
            Err(StoreError::Unavailable("transport closed".into()))
        }

        fn scan(&self, _: &str, _: &FieldFilter, _: usize) -> Result<Vec<EntityRecord>> {
            Err(StoreError::Unavailable("transport closed".into()))
        }

        fn transact<T, E, F>(&self, _docs: &[DocumentRef], _body: F) -> std::result::Result<T, E>
        where
            E: From<StoreError>,
            F: FnOnce(&[Option<EntityRecord>]) -> std::result::Result<(T, Vec<Fields>), E>,
        {
            Err(StoreError::Unavailable("transport closed".into()).into())
        }
    }

    fn unreachable_factory() -> StoreFactory<UnreachableBackend> {
        StoreFactory::with_backend(
            ProjectId::new("faulty").unwrap(),
            UnreachableBackend {
                reachable_for_ping: true,
            },
        )
    }

    #[test]
    fn upsert_merges_fields() {
        let (factory, _dir) = create_test_factory();
        let handle = factory.connect().unwrap();

        assert_eq!(handle.upsert("things", "t1", &fields(json!({"a": 1}))), SaveStatus::Saved);
        assert_eq!(handle.upsert("things", "t1", &fields(json!({"b": 2}))), SaveStatus::Saved);

        let record = handle.get_by_id("things", "t1").unwrap();
        assert_eq!(record.fields["a"], 1);
        assert_eq!(record.fields["b"], 2);
    }

    #[test]
    fn upsert_is_idempotent() {
        let (factory, _dir) = create_test_factory();
        let handle = factory.connect().unwrap();
        let update = fields(json!({"name": "Om Prakash", "balance": 10.0}));

        handle.upsert("things", "t1", &update);
        let first = handle.get_by_id("things", "t1").unwrap();
        handle.upsert("things", "t1", &update);
        let second = handle.get_by_id("things", "t1").unwrap();

        assert_eq!(first.fields, second.fields);
    }

    #[test]
    fn upsert_with_bad_id_reports_failure() {
        let (factory, _dir) = create_test_factory();
        let handle = factory.connect().unwrap();

        let status = handle.upsert("things", "a/b", &fields(json!({"a": 1})));
        assert_eq!(status, SaveStatus::SaveFailed);
        assert_eq!(status.code(), "RECORD-SAVE-FAILED");
    }

    #[test]
    fn missing_document_is_not_an_error() {
        let (factory, _dir) = create_test_factory();
        let handle = factory.connect().unwrap();

        assert!(handle.get_by_id("things", "missing").is_none());
        assert!(handle.lookup("things", "missing").unwrap().is_none());
    }

    #[test]
    fn transport_fault_collapses_to_none_but_lookup_reports_it() {
        let factory = unreachable_factory();
        let handle = factory.connect().unwrap();

        assert!(handle.get_by_id("things", "t1").is_none());
        assert!(matches!(
            handle.lookup("things", "t1"),
            Err(StoreError::Unavailable(_))
        ));
    }

    #[test]
    fn missing_document_is_not_logged_as_failure() {
        let (factory, _dir) = create_test_factory();
        let handle = factory.connect().unwrap();

        let logs = logs_of(|| assert!(handle.get_by_id("things", "missing").is_none()));

        assert!(!logs.contains("RECORD-READ-FAILED"), "{logs}");
        assert!(!logs.contains("ERROR"), "{logs}");
    }

    #[test]
    fn transport_fault_is_logged_with_read_code() {
        let factory = unreachable_factory();
        let handle = factory.connect().unwrap();

        let logs = logs_of(|| assert!(handle.get_by_id("things", "t1").is_none()));

        assert!(logs.contains("ERROR"), "{logs}");
        assert!(logs.contains("RECORD-READ-FAILED"), "{logs}");
        assert!(logs.contains("Failed to read entity"), "{logs}");
    }

    #[test]
    fn transport_fault_on_write_is_save_failed() {
        let factory = unreachable_factory();
        let handle = factory.connect().unwrap();

        assert_eq!(
            handle.upsert("things", "t1", &fields(json!({"a": 1}))),
            SaveStatus::SaveFailed
        );
    }

    #[test]
    fn transport_fault_on_query_collapses_to_empty() {
        let factory = unreachable_factory();
        let handle = factory.connect().unwrap();

        assert!(handle
            .find_by_field("things", "status", QueryOp::Eq, true)
            .is_empty());
        let filter = FieldFilter::eq("status", true).unwrap();
        assert!(handle.query("things", &filter).is_err());
    }

    #[test]
    fn connect_fails_when_store_unreachable() {
        let factory = StoreFactory::with_backend(
            ProjectId::new("down").unwrap(),
            UnreachableBackend {
                reachable_for_ping: false,
            },
        );

        assert!(matches!(factory.connect(), Err(StoreError::Unavailable(_))));
        assert_eq!(factory.open_handles(), 0);
    }

    #[test]
    fn query_is_capped() {
        let (factory, _dir) = create_test_factory();
        let handle = factory.connect().unwrap();
        for i in 0..150 {
            let id = format!("sub-{i:03}");
            assert!(handle
                .upsert("subscribers", &id, &fields(json!({"status": true})))
                .is_saved());
        }

        let found = handle.find_by_field("subscribers", "status", QueryOp::Eq, true);
        assert_eq!(found.len(), QUERY_MAX_LIMIT);
    }

    #[test]
    fn query_filters_by_field() {
        let (factory, _dir) = create_test_factory();
        let handle = factory.connect().unwrap();
        handle.upsert("subscribers", "a", &fields(json!({"status": true})));
        handle.upsert("subscribers", "b", &fields(json!({"status": false})));
        handle.upsert("subscribers", "c", &fields(json!({"status": true})));

        let active = handle.find_by_field("subscribers", "status", QueryOp::Eq, true);
        let ids: Vec<_> = active.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        assert!(handle
            .find_by_field("subscribers", "status", QueryOp::Eq, "yes")
            .is_empty());
    }

    #[test]
    fn query_with_invalid_input_collapses_to_empty() {
        let (factory, _dir) = create_test_factory();
        let handle = factory.connect().unwrap();

        assert!(handle.find_by_field("", "status", QueryOp::Eq, true).is_empty());
        assert!(handle.find_by_field("subscribers", "", QueryOp::Eq, true).is_empty());
    }

    #[test]
    fn operation_codes() {
        assert_eq!(Operation::Get.failure_code(), "RECORD-READ-FAILED");
        assert_eq!(Operation::Query.failure_code(), "RECORD-QUERY-FAILED");
        assert_eq!(Operation::Delete.failure_code(), "RECORD-DELETE-FAILED");
        assert_eq!(SaveStatus::Saved.code(), "success");
    }
}
