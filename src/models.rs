// Copyright (c) 2025 Coinkeep Developers.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: i64,
    pub profile_id: i64,
    pub name: String,
    pub currency: String,
    /// Immutable baseline the wallet started with.
    pub initial_balance: Decimal,
    /// Cached sum; authoritative value is always recomputable from history.
    pub current_balance: Decimal,
}

/// Direction of a transaction. The stored amount is a positive scalar; the
/// kind alone decides whether it adds to or subtracts from a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(anyhow!("Invalid transaction kind '{}'", other)),
        }
    }

    /// Signed contribution of `amount` to a wallet balance.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            TransactionKind::Income => amount,
            TransactionKind::Expense => -amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub profile_id: i64,
    /// None while unassigned; such transactions affect no wallet balance.
    pub wallet_id: Option<i64>,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub currency: String,
    pub date: NaiveDate,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    /// Audit classification (e.g. "cash_adjustment"); reconciliation never
    /// branches on it.
    pub subtype: Option<String>,
}

impl Transaction {
    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub id: i64,
    pub profile_id: i64,
    pub from_wallet_id: i64,
    pub to_wallet_id: i64,
    /// Denominated in the source wallet's currency.
    pub amount: Decimal,
    pub currency: String,
    /// Destination-currency value captured at creation; None when both
    /// wallets share a currency or no rate was available.
    pub converted_amount: Option<Decimal>,
    pub date: NaiveDate,
    pub description: Option<String>,
}

impl Transfer {
    /// Value credited to the destination wallet.
    pub fn credited_amount(&self) -> Decimal {
        self.converted_amount.unwrap_or(self.amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(anyhow!(
                "Invalid frequency '{}', expected daily|weekly|monthly",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTransfer {
    pub id: i64,
    pub profile_id: i64,
    pub from_wallet_id: i64,
    pub to_wallet_id: i64,
    pub amount: Decimal,
    pub currency: String,
    pub frequency: Frequency,
    /// 0 = Monday .. 6 = Sunday; required iff weekly.
    pub day_of_week: Option<u32>,
    /// 1..=31, clamped to short months at computation time; required iff monthly.
    pub day_of_month: Option<u32>,
    pub next_run_date: NaiveDate,
    pub last_run_date: Option<NaiveDate>,
    pub is_active: bool,
    /// None = repeats forever.
    pub total_occurrences: Option<u32>,
    pub remaining_occurrences: Option<u32>,
    pub description: Option<String>,
}
