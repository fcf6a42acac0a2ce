//! Balance transfer arithmetic.
//!
//! The rule that decides whether a transfer may happen is kept free of any store
//! access: the store reads both balances under a transaction, hands them to
//! [`plan_transfer`], and writes back whatever it returns.

/// Field holding an account's balance.
pub const BALANCE_FIELD: &str = "balance";

/// Balances of the two accounts involved in a transfer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Balances {
    /// Balance of the paying account.
    pub sender: f64,
    /// Balance of the receiving account.
    pub receiver: f64,
}

/// Why a transfer was refused.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum TransferRejection {
    /// The sender's balance does not strictly exceed the amount.
    #[error("insufficient funds: balance={balance}, amount={amount}")]
    InsufficientFunds {
        /// Sender balance at the time of the transfer.
        balance: f64,
        /// Requested amount.
        amount: f64,
    },

    /// The amount is not a positive finite number.
    #[error("invalid transfer amount: {0}")]
    InvalidAmount(f64),

    /// The receiver's balance would no longer be a finite number.
    #[error("receiver balance overflow: balance={balance}, amount={amount}")]
    BalanceOverflow {
        /// Receiver balance at the time of the transfer.
        balance: f64,
        /// Requested amount.
        amount: f64,
    },
}

/// Check that an amount can be transferred at all.
///
/// # Errors
///
/// Returns `TransferRejection::InvalidAmount` unless `amount` is finite and positive.
pub fn validate_amount(amount: f64) -> Result<(), TransferRejection> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(TransferRejection::InvalidAmount(amount))
    }
}

/// Compute the balances after moving `amount` from sender to receiver.
///
/// The sender must hold strictly more than `amount`; a transfer that would take
/// the balance to exactly zero is refused.
///
/// # Errors
///
/// Returns `TransferRejection::InsufficientFunds` when `current.sender <= amount`
/// `TransferRejection::InvalidAmount` for non-positive or non-finite amounts, and
/// `TransferRejection::BalanceOverflow` when the receiver's new balance is not finite.
pub fn plan_transfer(current: Balances, amount: f64) -> Result<Balances, TransferRejection> {
    validate_amount(amount)?;
    if current.sender <= amount {
        return Err(TransferRejection::InsufficientFunds {
            balance: current.sender,
            amount,
        });
    }

    let receiver = current.receiver + amount;
    if !receiver.is_finite() {
        return Err(TransferRejection::BalanceOverflow {
            balance: current.receiver,
            amount,
        });
    }

    Ok(Balances {
        sender: current.sender - amount,
        receiver,
    })
}
