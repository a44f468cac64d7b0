use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recurring income, expense, or transfer definition. User rules are
/// persisted by the caller; synthetic rules are regenerated on every read
/// from structural account data and marked `is_synthetic`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringRule {
    pub id: Uuid,
    pub source_account: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_account: Option<Uuid>,
    pub kind: RuleKind,
    /// Always positive; direction comes from `kind`.
    pub amount: f64,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub description: String,
    pub frequency: Frequency,
    /// Number of frequency units between occurrences; zero is malformed.
    pub interval_count: u32,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Anchor day for monthly/yearly stepping; defaults to the day of
    /// `start_date`. Clamped to the last valid day of short months.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_day_of_month: Option<u32>,
    #[serde(default)]
    pub weekend_adjustment: WeekendAdjustment,
    #[serde(default)]
    pub is_synthetic: bool,
    /// Cursor advanced after posting an occurrence. When present, expansion
    /// starts here instead of `start_date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_due: Option<NaiveDate>,
}

impl RecurringRule {
    pub fn new(
        source_account: Uuid,
        kind: RuleKind,
        amount: f64,
        currency: impl Into<String>,
        description: impl Into<String>,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_account,
            destination_account: None,
            kind,
            amount,
            currency: currency.into(),
            category: None,
            description: description.into(),
            frequency,
            interval_count: 1,
            start_date,
            end_date: None,
            due_day_of_month: None,
            weekend_adjustment: WeekendAdjustment::default(),
            is_synthetic: false,
            next_due: None,
        }
    }

    pub fn with_due_day(mut self, day: u32) -> Self {
        self.due_day_of_month = Some(day);
        self
    }

    pub fn with_end_date(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn with_interval(mut self, count: u32) -> Self {
        self.interval_count = count;
        self
    }

    pub fn with_weekend_adjustment(mut self, adjustment: WeekendAdjustment) -> Self {
        self.weekend_adjustment = adjustment;
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RuleKind {
    Income,
    Expense,
    Transfer,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// What to do when a computed occurrence lands on a Saturday or Sunday.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum WeekendAdjustment {
    /// Leave the date unadjusted.
    #[default]
    On,
    /// Move to the nearest weekday before the weekend.
    Before,
    /// Move to the next weekday after the weekend.
    After,
}

/// Per-occurrence edit keyed by `(rule_id, original_date)`. Overrides never
/// change the rule itself, only the one materialized occurrence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OccurrenceOverride {
    pub rule_id: Uuid,
    pub original_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub skipped: bool,
}

impl OccurrenceOverride {
    pub fn skip(rule_id: Uuid, original_date: NaiveDate) -> Self {
        Self {
            rule_id,
            original_date,
            date: None,
            amount: None,
            description: None,
            skipped: true,
        }
    }

    pub fn reschedule(rule_id: Uuid, original_date: NaiveDate, date: NaiveDate) -> Self {
        Self {
            rule_id,
            original_date,
            date: Some(date),
            amount: None,
            description: None,
            skipped: false,
        }
    }
}

/// One concrete, dated instance of a recurring rule after overrides.
///
/// `original_date` is the computed schedule date and stays the override
/// lookup key; `effective_date` is what every downstream consumer buckets by.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Occurrence {
    pub rule_id: Uuid,
    pub account_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_account: Option<Uuid>,
    pub kind: RuleKind,
    pub original_date: NaiveDate,
    pub effective_date: NaiveDate,
    pub amount: f64,
    pub currency: String,
    pub description: String,
    pub overridden: bool,
}

impl Occurrence {
    /// Signed delta this occurrence applies to the given account, or zero
    /// when the occurrence does not touch it.
    pub fn signed_amount_for(&self, account_id: Uuid) -> f64 {
        match self.kind {
            RuleKind::Income => {
                if self.account_id == account_id {
                    self.amount
                } else {
                    0.0
                }
            }
            RuleKind::Expense => {
                if self.account_id == account_id {
                    -self.amount
                } else {
                    0.0
                }
            }
            RuleKind::Transfer => {
                if self.account_id == account_id {
                    -self.amount
                } else if self.destination_account == Some(account_id) {
                    self.amount
                } else {
                    0.0
                }
            }
        }
    }
}
