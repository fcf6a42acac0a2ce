//! Enlist HTTP service.
//!
//! This crate provides the HTTP API over the enlist document store:
//!
//! - Email subscriptions (`/api/subscribe`, `/api/subscribers`)
//! - Atomic balance transfers between account documents (`/api/transfer`)
//! - Health reporting (`/health`)
//!
//! # Authentication
//!
//! Subscription endpoints are public. The transfer endpoint requires the
//! service API key in the `x-api-key` header.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::unused_async)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod mail;
pub mod routes;
pub mod state;
pub mod subscribers;
pub mod telemetry;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use mail::MailSettings;
pub use routes::create_router;
pub use state::AppState;
