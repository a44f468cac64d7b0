//! Input and output records exchanged with the surrounding application.
//!
//! The engine receives immutable snapshots of these per call and never
//! mutates them in place; updated records are returned for the caller to
//! persist.

pub mod account;
pub mod rule;
pub mod transaction;
pub mod window;

pub use account::{Account, AccountKind, CardTerms, LoanTerms, PropertyCost, PropertyCostKind};
pub use rule::{
    Frequency, Occurrence, OccurrenceOverride, RecurringRule, RuleKind, WeekendAdjustment,
};
pub use transaction::{Transaction, TransactionKind};
pub use window::DateWindow;
