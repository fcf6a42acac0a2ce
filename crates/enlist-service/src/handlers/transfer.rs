//! Balance transfer handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use enlist_store::{TransferError, TransferReceipt};

use crate::auth::ServiceAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Collection used when a request does not name one.
pub const DEFAULT_ACCOUNT_COLLECTION: &str = "accounts";

fn default_collection() -> String {
    DEFAULT_ACCOUNT_COLLECTION.to_string()
}

/// Transfer request.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Collection holding both accounts.
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Id of the paying account.
    pub sender: String,
    /// Id of the receiving account.
    pub receiver: String,
    /// Amount to move.
    pub amount: f64,
}

/// One side of a committed transfer.
#[derive(Debug, Serialize)]
pub struct AccountBalance {
    /// Account id.
    pub id: String,
    /// Balance after the transfer.
    pub balance: f64,
}

/// Transfer response.
#[derive(Debug, Serialize)]
pub struct TransferResponse {
    /// Collection holding both accounts.
    pub collection: String,
    /// Amount moved.
    pub amount: f64,
    /// The paying account.
    pub sender: AccountBalance,
    /// The receiving account.
    pub receiver: AccountBalance,
}

impl From<TransferReceipt> for TransferResponse {
    fn from(receipt: TransferReceipt) -> Self {
        Self {
            collection: receipt.sender.collection().to_string(),
            amount: receipt.amount,
            sender: AccountBalance {
                id: receipt.sender.id().to_string(),
                balance: receipt.balances.sender,
            },
            receiver: AccountBalance {
                id: receipt.receiver.id().to_string(),
                balance: receipt.balances.receiver,
            },
        }
    }
}

/// Move an amount between two accounts of one collection.
///
/// Requires service API key authentication.
pub async fn transfer(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
    Json(body): Json<TransferRequest>,
) -> Result<Json<TransferResponse>, ApiError> {
    tracing::debug!(
        service = %auth.service_name,
        collection = %body.collection,
        sender = %body.sender,
        receiver = %body.receiver,
        amount = body.amount,
        "Transfer requested"
    );

    let factory = state.store.clone();

    // The transaction may wait on document locks held by another request.
    let receipt = tokio::task::spawn_blocking(move || -> Result<TransferReceipt, TransferError> {
        let handle = factory.connect()?;
        let sender = handle.doc(&body.collection, &body.sender)?;
        let receiver = handle.doc(&body.collection, &body.receiver)?;
        handle.transfer(&sender, &receiver, body.amount)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("transfer task failed: {e}")))??;

    Ok(Json(receipt.into()))
}
