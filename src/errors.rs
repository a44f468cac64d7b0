use thiserror::Error;
use uuid::Uuid;

/// Error type shared by every engine component.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// The rule cannot be expanded at all (zero interval, non-advancing step).
    #[error("malformed rule {rule_id}: {reason}")]
    MalformedRule { rule_id: Uuid, reason: String },
    /// The expansion guard tripped; the rule produced too many occurrences.
    #[error("rule {rule_id} exceeded the occurrence cap")]
    IterationCapExceeded { rule_id: Uuid },
    /// No rate is known for the currency; silently assuming 1:1 would corrupt
    /// every downstream aggregate, so this propagates.
    #[error("no exchange rate for currency {0}")]
    UnknownCurrency(String),
    /// A loan account is missing a field the amortization schedule needs.
    #[error("loan account {account_id} is missing {field}")]
    MissingLoanTerms { account_id: Uuid, field: &'static str },
    /// A date window with end before start.
    #[error("invalid window: {0}")]
    InvalidWindow(String),
}
