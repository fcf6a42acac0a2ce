//! Core types and utilities for enlist.
//!
//! This crate provides the foundational types shared by the store and the service:
//!
//! - **Identifiers**: `ProjectId`, `DocumentRef`
//! - **Records**: `EntityRecord`, `Fields`, merge-write semantics
//! - **Queries**: `FieldFilter`, `QueryOp`, `QUERY_MAX_LIMIT`
//! - **Subscribers**: `Subscriber`
//! - **Transfers**: `plan_transfer`, `Balances`, `TransferRejection`
//!
//! # Records
//!
//! Records are schema-free at this level: a record is a JSON object keyed by field
//! name. Schema is imposed by callers through the typed accessors on `EntityRecord`
//! or by decoding the whole record into a caller type.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod query;
pub mod record;
pub mod subscriber;
pub mod transfer;

pub use error::{FieldError, QueryError};
pub use ids::{validate_collection, DocumentRef, IdError, ProjectId};
pub use query::{FieldFilter, QueryOp, QUERY_MAX_LIMIT};
pub use record::{fields_from, merge_fields, EntityRecord, Fields};
pub use subscriber::{Subscriber, CREATION_DATE_FIELD, SUBSCRIBER_COLLECTION};
pub use transfer::{plan_transfer, validate_amount, Balances, TransferRejection, BALANCE_FIELD};
