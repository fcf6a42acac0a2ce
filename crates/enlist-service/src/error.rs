//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use enlist_store::{StoreError, TransferError};

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request is well formed but the stored data cannot be used for it.
    #[error("unprocessable: {0}")]
    Unprocessable(String),

    /// Insufficient funds in the sending account.
    #[error("insufficient funds: balance={balance}, amount={amount}")]
    InsufficientFunds {
        /// Current balance.
        balance: f64,
        /// Requested amount.
        amount: f64,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::Unprocessable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "unprocessable",
                msg.clone(),
                None,
            ),
            Self::InsufficientFunds { balance, amount } => (
                StatusCode::PAYMENT_REQUIRED,
                "insufficient_funds",
                "Insufficient balance in sender account".to_string(),
                Some(serde_json::json!({
                    "balance": balance,
                    "amount": amount
                })),
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { document } => Self::NotFound(format!("not found: {document}")),
            StoreError::InvalidReference(e) => Self::BadRequest(e.to_string()),
            StoreError::InvalidQuery(e) => Self::BadRequest(e.to_string()),
            StoreError::Database(msg)
            | StoreError::Serialization(msg)
            | StoreError::Unavailable(msg) => Self::Internal(msg),
        }
    }
}

impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::InsufficientFunds { balance, amount } => {
                Self::InsufficientFunds { balance, amount }
            }
            TransferError::InvalidAmount(_) | TransferError::SameAccount(_) => {
                Self::BadRequest(err.to_string())
            }
            TransferError::NotFound(document) => {
                Self::NotFound(format!("account not found: {document}"))
            }
            TransferError::Field { .. } | TransferError::BalanceOverflow { .. } => {
                Self::Unprocessable(err.to_string())
            }
            TransferError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enlist_core::{FieldError, IdError};

    #[test]
    fn transfer_errors_map_to_statuses() {
        let cases = [
            (
                ApiError::from(TransferError::InsufficientFunds {
                    balance: 10.0,
                    amount: 20.0,
                }),
                StatusCode::PAYMENT_REQUIRED,
            ),
            (
                ApiError::from(TransferError::InvalidAmount(-1.0)),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(TransferError::SameAccount("accounts/1".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(TransferError::NotFound("accounts/1".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(TransferError::Field {
                    document: "accounts/1".into(),
                    source: FieldError::Missing {
                        field: "balance".into(),
                    },
                }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::from(TransferError::BalanceOverflow {
                    balance: f64::MAX,
                    amount: 1e308,
                }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::from(TransferError::Store(StoreError::Database("boom".into()))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn store_errors_map_to_statuses() {
        let bad_ref = StoreError::InvalidReference(IdError::Empty { what: "id" });
        assert_eq!(
            ApiError::from(bad_ref).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StoreError::Unavailable("down".into()))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
