use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::rule::Frequency;

/// A financial account as seen by the engine. Structural data (loan terms,
/// card cycle, property costs) lives in the kind variant so downstream code
/// never probes for optional fields at runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    /// ISO 4217 code of the currency the account is denominated in.
    pub currency: String,
    /// Authoritative current balance, maintained by the caller.
    pub balance: f64,
    pub kind: AccountKind,
}

impl Account {
    pub fn new(name: impl Into<String>, currency: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            currency: currency.into(),
            balance: 0.0,
            kind,
        }
    }

    pub fn with_balance(mut self, balance: f64) -> Self {
        self.balance = balance;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AccountKind {
    Checking,
    Savings,
    Cash,
    Loan(LoanTerms),
    CreditCard(CardTerms),
    Property(Vec<PropertyCost>),
}

/// Structural data describing a fixed-payment amortized loan.
///
/// Rate and duration are optional because imported records are often
/// incomplete; synthesis skips accounts that lack them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoanTerms {
    pub principal: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_rate_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_months: Option<u32>,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_day_of_month: Option<u32>,
}

/// Billing-cycle configuration for a credit card account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardTerms {
    /// Day of month on which a statement period opens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_day: Option<u32>,
    /// Day of month on which the statement balance falls due.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_day: Option<u32>,
}

/// One configured recurring cost attached to a property account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyCost {
    pub kind: PropertyCostKind,
    pub amount: f64,
    pub currency: String,
    pub frequency: Frequency,
    pub first_due: NaiveDate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PropertyCostKind {
    Tax,
    Insurance,
    Hoa,
    RentalIncome,
}

impl PropertyCostKind {
    pub fn label(&self) -> &'static str {
        match self {
            PropertyCostKind::Tax => "Property tax",
            PropertyCostKind::Insurance => "Insurance",
            PropertyCostKind::Hoa => "HOA fees",
            PropertyCostKind::RentalIncome => "Rental income",
        }
    }
}
