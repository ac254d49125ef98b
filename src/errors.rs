// Copyright (c) 2025 Coinkeep Developers.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failure taxonomy for the wallet ledger core.
///
/// Validation failures (`InvalidTransfer`, `NotFound`) are raised before any
/// write. `StoreUnavailable` wraps persistence failures; the wrapping storage
/// transaction rolls back and the whole operation can be retried because
/// balance reconciliation is idempotent. `NoDifference` is a soft outcome of
/// the cash-adjustment path, not a real fault.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("transfer source and destination wallets must differ")]
    InvalidTransfer,
    #[error("invalid schedule cadence: {0}")]
    InvalidSchedule(&'static str),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("ledger store unavailable: {0}")]
    StoreUnavailable(#[from] rusqlite::Error),
    #[error("counted balance matches the stored balance within tolerance")]
    NoDifference,
}

impl LedgerError {
    pub fn wallet_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "wallet",
            id,
        }
    }

    pub fn transaction_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "transaction",
            id,
        }
    }

    pub fn transfer_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "transfer",
            id,
        }
    }

    pub fn schedule_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "scheduled transfer",
            id,
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
