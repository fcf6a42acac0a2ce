//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksBackend` implementation of the `DocumentBackend`
//! trait on a pessimistic `TransactionDB`. Documents are stored as CBOR envelopes
//! holding the field map and the store-assigned timestamps.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rocksdb::{
    Direction, IteratorMode, MultiThreaded, Options, Transaction, TransactionDB,
    TransactionDBOptions,
};
use serde::{Deserialize, Serialize};

use enlist_core::{merge_fields, DocumentRef, EntityRecord, FieldFilter, Fields};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::DocumentBackend;

/// How long a transaction waits for a document lock held by another one.
const LOCK_TIMEOUT_MS: i64 = 5_000;

/// Key read by `ping`. An empty collection name is never valid, so no document
/// can live here.
const PING_KEY: &[u8] = b"\0ping";

type Db = TransactionDB<MultiThreaded>;

/// RocksDB-backed document storage.
pub struct RocksBackend {
    db: Db,
    path: PathBuf,
}

/// On-disk form of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredDocument {
    fields: Fields,
    create_time: DateTime<Utc>,
    update_time: DateTime<Utc>,
}

impl StoredDocument {
    fn empty(now: DateTime<Utc>) -> Self {
        Self {
            fields: Fields::new(),
            create_time: now,
            update_time: now,
        }
    }

    fn into_record(self, id: &str) -> EntityRecord {
        EntityRecord {
            id: id.to_string(),
            fields: self.fields,
            create_time: self.create_time,
            update_time: self.update_time,
        }
    }
}

impl RocksBackend {
    /// Open or create a document database at the given path.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&path).map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let mut opts = Options::default();
        opts.create_if_missing(true);

        let mut txn_opts = TransactionDBOptions::default();
        txn_opts.set_txn_lock_timeout(LOCK_TIMEOUT_MS);

        let db = Db::open(&opts, &txn_opts, &path)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        tracing::debug!(path = %path.display(), "Document database opened");

        Ok(Self { db, path })
    }

    /// The directory holding the database.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize a value using CBOR.
    fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Lock a document for writing and read its current state.
    fn read_for_update(txn: &Transaction<'_, Db>, key: &[u8]) -> Result<Option<StoredDocument>> {
        txn.get_for_update(key, true)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }
}

impl DocumentBackend for RocksBackend {
    fn ping(&self) -> Result<()> {
        self.db
            .get(PING_KEY)
            .map(|_| ())
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn get(&self, doc: &DocumentRef) -> Result<Option<EntityRecord>> {
        let key = keys::document_key(doc);

        self.db
            .get(key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize::<StoredDocument>(&data))
            .transpose()
            .map(|stored| stored.map(|s| s.into_record(doc.id())))
    }

    fn merge(&self, doc: &DocumentRef, fields: &Fields) -> Result<EntityRecord> {
        let key = keys::document_key(doc);
        let txn = self.db.transaction();
        let now = Utc::now();

        let mut document =
            Self::read_for_update(&txn, &key)?.unwrap_or_else(|| StoredDocument::empty(now));
        merge_fields(&mut document.fields, fields);
        document.update_time = now;

        txn.put(&key, Self::serialize(&document)?)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        txn.commit()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(document.into_record(doc.id()))
    }

    fn scan(
        &self,
        collection: &str,
        filter: &FieldFilter,
        limit: usize,
    ) -> Result<Vec<EntityRecord>> {
        let prefix = keys::collection_prefix(collection);
        let iter = self
            .db
            .iterator(IteratorMode::From(&prefix, Direction::Forward));

        let mut records = Vec::new();
        for item in iter {
            if records.len() >= limit {
                break;
            }

            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }

            let id = keys::id_from_key(&key)
                .ok_or_else(|| StoreError::Serialization("document id is not UTF-8".into()))?;
            let record = Self::deserialize::<StoredDocument>(&value)?.into_record(id);
            if filter.matches(&record) {
                records.push(record);
            }
        }

        Ok(records)
    }

    fn transact<T, E, F>(&self, docs: &[DocumentRef], body: F) -> std::result::Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&[Option<EntityRecord>]) -> std::result::Result<(T, Vec<Fields>), E>,
    {
        let keys: Vec<Vec<u8>> = docs.iter().map(keys::document_key).collect();
        let txn = self.db.transaction();

        // BTreeMap iteration order is key order, so every transaction takes its
        // locks in the same order and two transfers over one pair cannot deadlock.
        let mut current: BTreeMap<Vec<u8>, Option<StoredDocument>> =
            keys.iter().map(|key| (key.clone(), None)).collect();
        for (key, slot) in &mut current {
            *slot = Self::read_for_update(&txn, key)?;
        }

        let records: Vec<Option<EntityRecord>> = docs
            .iter()
            .zip(&keys)
            .map(|(doc, key)| {
                current
                    .get(key.as_slice())
                    .cloned()
                    .flatten()
                    .map(|stored| stored.into_record(doc.id()))
            })
            .collect();

        // On error the transaction is dropped uncommitted, which rolls it back.
        let (value, writes) = body(&records)?;

        if writes.len() != docs.len() {
            return Err(StoreError::Database(format!(
                "transaction produced {} writes for {} documents",
                writes.len(),
                docs.len()
            ))
            .into());
        }

        let now = Utc::now();
        for (key, fields) in keys.iter().zip(&writes) {
            if fields.is_empty() {
                continue;
            }
            let slot = current.entry(key.clone()).or_insert(None);
            let mut document = slot.take().unwrap_or_else(|| StoredDocument::empty(now));
            merge_fields(&mut document.fields, fields);
            document.update_time = now;
            txn.put(key, Self::serialize(&document)?)
                .map_err(|e| StoreError::Database(e.to_string()))?;
            *slot = Some(document);
        }

        txn.commit()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_backend() -> (RocksBackend, TempDir) {
        let dir = TempDir::new().unwrap();
        let backend = RocksBackend::open(dir.path()).unwrap();
        (backend, dir)
    }

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    fn doc(collection: &str, id: &str) -> DocumentRef {
        DocumentRef::new(collection, id).unwrap()
    }

    #[test]
    fn ping_succeeds_on_open_database() {
        let (backend, _dir) = create_test_backend();
        backend.ping().unwrap();
    }

    #[test]
    fn merge_creates_then_updates() {
        let (backend, _dir) = create_test_backend();
        let account = doc("accounts", "1001");

        let created = backend.merge(&account, &fields(json!({"a": 1}))).unwrap();
        let updated = backend.merge(&account, &fields(json!({"b": 2}))).unwrap();

        assert_eq!(updated.create_time, created.create_time);
        assert!(updated.update_time >= created.update_time);

        let stored = backend.get(&account).unwrap().unwrap();
        assert_eq!(stored.id, "1001");
        assert_eq!(serde_json::Value::Object(stored.fields), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn get_missing_document_is_none() {
        let (backend, _dir) = create_test_backend();
        assert!(backend.get(&doc("accounts", "nope")).unwrap().is_none());
    }

    #[test]
    fn floats_survive_storage() {
        let (backend, _dir) = create_test_backend();
        let account = doc("accounts", "1013");
        backend
            .merge(&account, &fields(json!({"balance": 130_000_000.5})))
            .unwrap();

        let stored = backend.get(&account).unwrap().unwrap();
        assert!((stored.balance().unwrap() - 130_000_000.5).abs() < f64::EPSILON);
    }

    #[test]
    fn scan_stays_within_collection_and_limit() {
        let (backend, _dir) = create_test_backend();
        for i in 0..5 {
            backend
                .merge(&doc("accounts", &format!("a{i}")), &fields(json!({"kind": "x"})))
                .unwrap();
            backend
                .merge(&doc("accounts2", &format!("b{i}")), &fields(json!({"kind": "x"})))
                .unwrap();
        }

        let filter = FieldFilter::eq("kind", "x").unwrap();
        let all = backend.scan("accounts", &filter, 100).unwrap();
        assert_eq!(all.len(), 5);
        assert!(all.iter().all(|r| r.id.starts_with('a')));

        let ids: Vec<_> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a0", "a1", "a2", "a3", "a4"]);

        let capped = backend.scan("accounts", &filter, 3).unwrap();
        assert_eq!(capped.len(), 3);
    }

    #[test]
    fn transact_commits_all_writes() {
        let (backend, _dir) = create_test_backend();
        let a = doc("accounts", "a");
        let b = doc("accounts", "b");
        backend.merge(&a, &fields(json!({"n": 1}))).unwrap();

        let seen = backend
            .transact::<_, StoreError, _>(&[a.clone(), b.clone()], |current| {
                let present = current.iter().filter(|d| d.is_some()).count();
                Ok((
                    present,
                    vec![fields(json!({"n": 10})), fields(json!({"n": 20}))],
                ))
            })
            .unwrap();

        assert_eq!(seen, 1);
        assert_eq!(backend.get(&a).unwrap().unwrap().fields["n"], 10);
        assert_eq!(backend.get(&b).unwrap().unwrap().fields["n"], 20);
    }

    #[test]
    fn transact_rolls_back_when_body_fails() {
        let (backend, _dir) = create_test_backend();
        let a = doc("accounts", "a");
        backend.merge(&a, &fields(json!({"n": 1}))).unwrap();

        let result = backend.transact::<(), StoreError, _>(&[a.clone()], |_| {
            Err(StoreError::Database("boom".into()))
        });

        assert!(result.is_err());
        assert_eq!(backend.get(&a).unwrap().unwrap().fields["n"], 1);
    }

    #[test]
    fn transact_skips_empty_writes() {
        let (backend, _dir) = create_test_backend();
        let a = doc("accounts", "a");

        backend
            .transact::<_, StoreError, _>(&[a.clone()], |_| Ok(((), vec![Fields::new()])))
            .unwrap();

        assert!(backend.get(&a).unwrap().is_none());
    }

    #[test]
    fn transact_rejects_mismatched_writes() {
        let (backend, _dir) = create_test_backend();
        let a = doc("accounts", "a");

        let result = backend.transact::<(), StoreError, _>(&[a.clone()], |_| Ok(((), vec![])));

        assert!(matches!(result, Err(StoreError::Database(_))));
    }
}
