//! Subscriber listing handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use enlist_core::Subscriber;

use crate::error::ApiError;
use crate::state::AppState;
use crate::subscribers::{find_active_subscribers, get_subscriber};

/// Active subscriber listing.
#[derive(Debug, Serialize)]
pub struct SubscriberList {
    /// The subscribers, ordered by email.
    pub subscribers: Vec<Subscriber>,
    /// Number of subscribers returned.
    pub count: usize,
}

/// List active subscribers.
pub async fn list_subscribers(State(state): State<Arc<AppState>>) -> Json<SubscriberList> {
    let subscribers = find_active_subscribers(&state.store);
    Json(SubscriberList {
        count: subscribers.len(),
        subscribers,
    })
}

/// Get one subscriber by email.
pub async fn get_subscriber_by_email(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<Subscriber>, ApiError> {
    get_subscriber(&state.store, &email)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("subscriber not found: {email}")))
}
