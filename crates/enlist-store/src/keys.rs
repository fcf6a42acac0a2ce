//! Key encoding utilities for `RocksDB`.
//!
//! Every document lives in the default column family under
//! `collection || 0x00 || id`. Collection names cannot contain a NUL byte, so a
//! collection's documents form one contiguous, id-ordered key range.

use enlist_core::DocumentRef;

const SEPARATOR: u8 = 0;

/// Create the key of a document.
#[must_use]
pub fn document_key(doc: &DocumentRef) -> Vec<u8> {
    let mut key = collection_prefix(doc.collection());
    key.extend_from_slice(doc.id().as_bytes());
    key
}

/// Create the prefix shared by all documents of a collection.
#[must_use]
pub fn collection_prefix(collection: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(collection.len() + 1);
    key.extend_from_slice(collection.as_bytes());
    key.push(SEPARATOR);
    key
}

/// Extract the document id from a document key.
///
/// Returns `None` if the key has no separator or the id is not UTF-8.
#[must_use]
pub fn id_from_key(key: &[u8]) -> Option<&str> {
    let split = key.iter().position(|b| *b == SEPARATOR)?;
    std::str::from_utf8(&key[split + 1..]).ok()
}
