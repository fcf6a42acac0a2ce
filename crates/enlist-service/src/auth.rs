//! Service-to-service authentication.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the service API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Header naming the calling service.
pub const SERVICE_NAME_HEADER: &str = "x-service-name";

/// Service authentication via API key.
///
/// Requests without a key, with the wrong key, or to a service that has no
/// key configured are rejected with 401.
#[derive(Debug, Clone)]
pub struct ServiceAuth {
    /// The service name or identifier.
    pub service_name: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for ServiceAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let api_key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let expected_key = state
            .config
            .service_api_key
            .as_ref()
            .ok_or(ApiError::Unauthorized)?;

        if api_key != expected_key {
            tracing::warn!("Rejected request with invalid service API key");
            return Err(ApiError::Unauthorized);
        }

        let service_name = parts
            .headers
            .get(SERVICE_NAME_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self { service_name })
    }
}
