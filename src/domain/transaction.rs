use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An immutable historical fact. The engine layers overrides and synthetic
/// items on top of transactions but never rewrites them; confirmation flows
/// return updated copies for the caller to persist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub date: NaiveDate,
    /// Always positive; direction comes from `kind`.
    pub amount: f64,
    pub currency: String,
    pub kind: TransactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub description: String,
    /// Shared id linking the two legs of a confirmed transfer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<Uuid>,
}

impl Transaction {
    pub fn new(
        account_id: Uuid,
        date: NaiveDate,
        amount: f64,
        currency: impl Into<String>,
        kind: TransactionKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            date,
            amount,
            currency: currency.into(),
            kind,
            category: None,
            description: description.into(),
            transfer_id: None,
        }
    }

    /// Signed delta this transaction applies to its account's balance.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionKind {
    Income,
    Expense,
}
