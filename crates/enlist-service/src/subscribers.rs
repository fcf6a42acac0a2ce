//! Subscriber persistence.
//!
//! Subscribers live in the `subscribers` collection keyed by email address.
//! Every operation acquires its own store handle and releases it on return.

use enlist_core::{
    EntityRecord, QueryOp, Subscriber, CREATION_DATE_FIELD, SUBSCRIBER_COLLECTION,
};
use enlist_store::{DocumentBackend, StoreFactory};

/// Stored name of the active flag.
const STATUS_FIELD: &str = "status";

/// Save `subscriber` with merge semantics. Returns whether the write succeeded.
///
/// A subscription that already exists keeps its stored creation date.
pub fn save_subscriber<B: DocumentBackend>(
    factory: &StoreFactory<B>,
    subscriber: &Subscriber,
) -> bool {
    let mut fields = match subscriber.to_fields() {
        Ok(fields) => fields,
        Err(e) => {
            tracing::error!(email = %subscriber.email, error = %e, "Failed to encode subscriber");
            return false;
        }
    };

    let Ok(handle) = factory.connect() else {
        return false;
    };

    let existing = handle
        .lookup(SUBSCRIBER_COLLECTION, &subscriber.email)
        .ok()
        .flatten();
    if existing.is_some_and(|record| record.fields.contains_key(CREATION_DATE_FIELD)) {
        fields.remove(CREATION_DATE_FIELD);
    }

    handle
        .upsert(SUBSCRIBER_COLLECTION, &subscriber.email, &fields)
        .is_saved()
}

/// Fetch the subscriber registered under `email`.
pub fn get_subscriber<B: DocumentBackend>(
    factory: &StoreFactory<B>,
    email: &str,
) -> Option<Subscriber> {
    let handle = factory.connect().ok()?;
    let record = handle.get_by_id(SUBSCRIBER_COLLECTION, email)?;
    decode(&record)
}

/// Active subscribers, at most one page.
pub fn find_active_subscribers<B: DocumentBackend>(factory: &StoreFactory<B>) -> Vec<Subscriber> {
    let Ok(handle) = factory.connect() else {
        return Vec::new();
    };

    handle
        .find_by_field(SUBSCRIBER_COLLECTION, STATUS_FIELD, QueryOp::Eq, true)
        .iter()
        .filter_map(decode)
        .collect()
}

fn decode(record: &EntityRecord) -> Option<Subscriber> {
    match Subscriber::from_record(record) {
        Ok(subscriber) => Some(subscriber),
        Err(e) => {
            tracing::warn!(id = %record.id, error = %e, "Skipping unreadable subscriber record");
            None
        }
    }
}
