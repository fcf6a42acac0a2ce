//! HTTP request handlers.

pub mod health;
pub mod subscribe;
pub mod subscribers;
pub mod transfer;
