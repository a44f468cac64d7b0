//! Schedule materialization: recurrence expansion, synthetic rules derived
//! from structural account data, and loan amortization.

pub mod amortization;
pub mod cadence;
pub mod expand;
pub mod synthetic;

pub use amortization::{
    annuity_payment, build_schedule, outstanding_balance, LoanPaymentOverride, PaymentStatus,
    ScheduledPayment,
};
pub use expand::{
    expand_all, expand_rule, next_due_after, ExpansionReport, OverrideIndex, RuleFailure,
    ScheduledStatus, MAX_OCCURRENCES_PER_RULE,
};
pub use synthetic::{statement_window, synthesize};
