//! Atomic balance transfer between two account documents.

use serde_json::Value;

use enlist_core::{
    plan_transfer, validate_amount, Balances, DocumentRef, EntityRecord, FieldError, Fields,
    TransferRejection, BALANCE_FIELD,
};

use crate::error::StoreError;
use crate::factory::StoreHandle;
use crate::DocumentBackend;

/// Errors that can occur during a transfer.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The sender's balance does not strictly exceed the amount.
    #[error("insufficient balance in sender account: balance={balance}, amount={amount}")]
    InsufficientFunds {
        /// Sender balance when the transfer was attempted.
        balance: f64,
        /// Requested amount.
        amount: f64,
    },

    /// The amount is not a positive finite number.
    #[error("invalid transfer amount: {0}")]
    InvalidAmount(f64),

    /// The receiver's balance would overflow to a non-finite number.
    #[error("receiver balance would overflow: balance={balance}, amount={amount}")]
    BalanceOverflow {
        /// Receiver balance when the transfer was attempted.
        balance: f64,
        /// Requested amount.
        amount: f64,
    },

    /// Sender and receiver are the same document.
    #[error("sender and receiver are the same account: {0}")]
    SameAccount(String),

    /// One of the documents does not exist.
    #[error("account not found: {0}")]
    NotFound(String),

    /// A balance could not be read as a number.
    #[error("bad balance on {document}: {source}")]
    Field {
        /// The `collection/id` holding the bad balance.
        document: String,
        /// What was wrong with the field.
        source: FieldError,
    },

    /// The store failed while locking, reading, writing or committing.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<TransferRejection> for TransferError {
    fn from(rejection: TransferRejection) -> Self {
        match rejection {
            TransferRejection::InsufficientFunds { balance, amount } => {
                Self::InsufficientFunds { balance, amount }
            }
            TransferRejection::InvalidAmount(amount) => Self::InvalidAmount(amount),
            TransferRejection::BalanceOverflow { balance, amount } => {
                Self::BalanceOverflow { balance, amount }
            }
        }
    }
}

/// Result of a committed transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    /// The paying account.
    pub sender: DocumentRef,
    /// The receiving account.
    pub receiver: DocumentRef,
    /// The amount moved.
    pub amount: f64,
    /// Balances after the transfer.
    pub balances: Balances,
}

impl<B: DocumentBackend> StoreHandle<B> {
    /// Move `amount` from the `balance` of `sender` to that of `receiver`.
    ///
    /// Both documents are locked and read in one transaction; the new balances
    /// are written together or not at all. The sender must hold strictly more
    /// than `amount`. Calling this twice performs two transfers.
    ///
    /// # Errors
    ///
    /// - `TransferError::InsufficientFunds` if the sender balance is not above `amount`.
    /// - `TransferError::InvalidAmount` if `amount` is not positive and finite.
    /// - `TransferError::BalanceOverflow` if the receiver balance would stop being finite.
    /// - `TransferError::SameAccount` if sender and receiver are one document.
    /// - `TransferError::NotFound` if either document is missing.
    /// - `TransferError::Field` if either balance is missing or not a number.
    /// - `TransferError::Store` if the transaction itself fails.
    pub fn transfer(
        &self,
        sender: &DocumentRef,
        receiver: &DocumentRef,
        amount: f64,
    ) -> Result<TransferReceipt, TransferError> {
        let result = self.run_transfer(sender, receiver, amount);

        match &result {
            Ok(receipt) => tracing::info!(
                sender = %sender,
                receiver = %receiver,
                amount,
                sender_balance = receipt.balances.sender,
                receiver_balance = receipt.balances.receiver,
                "Transfer committed"
            ),
            Err(TransferError::InsufficientFunds { balance, .. }) => tracing::info!(
                sender = %sender,
                receiver = %receiver,
                amount,
                balance,
                "Transfer refused: insufficient balance in sender account"
            ),
            Err(TransferError::Store(e)) => tracing::error!(
                sender = %sender,
                receiver = %receiver,
                amount,
                error = %e,
                "Transaction error has occurred"
            ),
            Err(e) => tracing::warn!(
                sender = %sender,
                receiver = %receiver,
                amount,
                error = %e,
                "Transfer refused"
            ),
        }

        result
    }

    fn run_transfer(
        &self,
        sender: &DocumentRef,
        receiver: &DocumentRef,
        amount: f64,
    ) -> Result<TransferReceipt, TransferError> {
        validate_amount(amount)?;
        if sender == receiver {
            return Err(TransferError::SameAccount(sender.to_string()));
        }

        let docs = [sender.clone(), receiver.clone()];
        let balances = self.backend.transact(&docs, |current| {
            let sender_balance = balance_of(sender, current[0].as_ref())?;
            let receiver_balance = balance_of(receiver, current[1].as_ref())?;

            let next = plan_transfer(
                Balances {
                    sender: sender_balance,
                    receiver: receiver_balance,
                },
                amount,
            )?;

            Ok((
                next,
                vec![balance_write(next.sender), balance_write(next.receiver)],
            ))
        })?;

        Ok(TransferReceipt {
            sender: sender.clone(),
            receiver: receiver.clone(),
            amount,
            balances,
        })
    }
}

fn balance_of(doc: &DocumentRef, record: Option<&EntityRecord>) -> Result<f64, TransferError> {
    let record = record.ok_or_else(|| TransferError::NotFound(doc.to_string()))?;
    record.balance().map_err(|source| TransferError::Field {
        document: doc.to_string(),
        source,
    })
}

fn balance_write(balance: f64) -> Fields {
    let mut fields = Fields::new();
    fields.insert(BALANCE_FIELD.to_string(), Value::from(balance));
    fields
}
