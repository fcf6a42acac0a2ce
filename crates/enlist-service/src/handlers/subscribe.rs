//! Subscription handler.

use std::sync::Arc;

use axum::extract::{Query, State};
use serde::Deserialize;

use enlist_core::Subscriber;

use crate::error::ApiError;
use crate::state::AppState;
use crate::subscribers::save_subscriber;

/// Shortest accepted email address, in bytes.
const EMAIL_MIN_LEN: usize = 5;
/// Longest accepted email address, in bytes.
const EMAIL_MAX_LEN: usize = 254;
/// Shortest name that is stored.
const NAME_MIN_LEN: usize = 2;
/// Longest name that is stored.
const NAME_MAX_LEN: usize = 50;

/// Subscription query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SubscribeParams {
    /// Email address to subscribe.
    #[serde(default)]
    pub email: String,
    /// Optional display name.
    #[serde(default)]
    pub name: String,
}

/// Create or refresh a subscription.
///
/// The name is ignored unless it is between 2 and 50 bytes long.
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SubscribeParams>,
) -> Result<String, ApiError> {
    tracing::debug!("Subscription request received");

    if !is_valid_email(&params.email) {
        let msg = "Please provide valid Email";
        tracing::info!(email_len = params.email.len(), "{msg}");
        return Err(ApiError::BadRequest(msg.into()));
    }

    let mut subscriber = Subscriber::new(params.email.as_str());
    if is_valid_name(&params.name) {
        subscriber = subscriber.with_name(params.name);
    }

    if !save_subscriber(&state.store, &subscriber) {
        return Err(ApiError::Internal(format!(
            "failed to save subscription for {}",
            subscriber.email
        )));
    }

    let msg = format!("Subscription created successfully for Email {}", subscriber.email);
    tracing::info!(email = %subscriber.email, "Subscription created");
    Ok(msg)
}

/// Whether `email` has an acceptable length.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    (EMAIL_MIN_LEN..=EMAIL_MAX_LEN).contains(&email.len())
}

/// Whether `name` has an acceptable length.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    (NAME_MIN_LEN..=NAME_MAX_LEN).contains(&name.len())
}
