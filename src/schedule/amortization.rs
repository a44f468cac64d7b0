//! Loan amortization: fixed-payment declining-balance schedules, reconciled
//! against posted payments and manual per-installment overrides.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::round_cents;
use crate::domain::{LoanTerms, Transaction, TransactionKind};
use crate::errors::EngineError;
use crate::schedule::cadence;

/// One installment of a loan schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduledPayment {
    pub installment: u32,
    pub date: NaiveDate,
    pub total: f64,
    pub principal: f64,
    pub interest: f64,
    /// Balance still owed after this installment.
    pub remaining_balance: f64,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
    Paid,
    Overdue,
    Upcoming,
}

/// Manual replacement for a computed installment, keyed by
/// `(account_id, installment)`. Used when a real-world payment deviated from
/// the theoretical split.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoanPaymentOverride {
    pub account_id: Uuid,
    pub installment: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest: Option<f64>,
}

/// Constant payment of a declining-balance loan. A zero rate degenerates to
/// straight-line repayment.
pub fn annuity_payment(principal: f64, monthly_rate: f64, months: u32) -> f64 {
    if months == 0 {
        return 0.0;
    }
    if monthly_rate.abs() < f64::EPSILON {
        return principal / months as f64;
    }
    principal * monthly_rate / (1.0 - (1.0 + monthly_rate).powi(-(months as i32)))
}

/// Builds the full installment schedule for a loan account.
///
/// Interest is the running balance times the periodic rate; principal is the
/// remainder of the constant payment. Posted expense transactions on the loan
/// account, dated no later than `today`, consume installments oldest-first
/// and mark them `Paid`; unmatched past-due installments are `Overdue`,
/// future ones `Upcoming`. Overrides replace any
/// computed field for their row, and an overridden principal carries through
/// to subsequent balances.
pub fn build_schedule(
    account_id: Uuid,
    terms: &LoanTerms,
    transactions: &[Transaction],
    overrides: &[LoanPaymentOverride],
    today: NaiveDate,
) -> Result<Vec<ScheduledPayment>, EngineError> {
    let rate_pct = terms.annual_rate_pct.ok_or(EngineError::MissingLoanTerms {
        account_id,
        field: "interest rate",
    })?;
    let months = terms
        .duration_months
        .filter(|m| *m > 0)
        .ok_or(EngineError::MissingLoanTerms {
            account_id,
            field: "duration",
        })?;

    let monthly_rate = rate_pct / 100.0 / 12.0;
    let payment = annuity_payment(terms.principal, monthly_rate, months);
    let due_day = terms.due_day_of_month.unwrap_or(terms.start_date.day());

    // Only posted expenses count as payments; incomes on the loan account
    // (the disbursement itself, refunds) must not consume installments.
    let paid_count = transactions
        .iter()
        .filter(|txn| {
            txn.account_id == account_id
                && txn.kind == TransactionKind::Expense
                && txn.date <= today
        })
        .count();

    let mut schedule = Vec::with_capacity(months as usize);
    let mut balance = terms.principal;
    for installment in 1..=months {
        let mut interest = round_cents(balance * monthly_rate);
        let mut principal_part = round_cents(payment - interest);
        if installment == months || principal_part > balance {
            principal_part = round_cents(balance);
        }
        let mut date = {
            let shifted = cadence::shift_month(terms.start_date, installment as i32);
            cadence::clamp_day(shifted.year(), shifted.month(), due_day)
        };
        let mut total = round_cents(principal_part + interest);

        if let Some(ov) = overrides
            .iter()
            .find(|ov| ov.account_id == account_id && ov.installment == installment)
        {
            if let Some(replaced) = ov.date {
                date = replaced;
            }
            if let Some(replaced) = ov.principal {
                principal_part = replaced;
            }
            if let Some(replaced) = ov.interest {
                interest = replaced;
            }
            total = ov.total.unwrap_or_else(|| round_cents(principal_part + interest));
        }

        balance = round_cents(balance - principal_part);
        let status = if (installment as usize) <= paid_count {
            PaymentStatus::Paid
        } else if date < today {
            PaymentStatus::Overdue
        } else {
            PaymentStatus::Upcoming
        };
        schedule.push(ScheduledPayment {
            installment,
            date,
            total,
            principal: principal_part,
            interest,
            remaining_balance: balance.max(0.0),
            status,
        });
    }

    Ok(schedule)
}

/// Principal plus interest not yet marked paid, never below zero. This is the
/// balance shown for a loan account.
pub fn outstanding_balance(schedule: &[ScheduledPayment]) -> f64 {
    let remaining: f64 = schedule
        .iter()
        .filter(|payment| payment.status != PaymentStatus::Paid)
        .map(|payment| payment.principal + payment.interest)
        .sum();
    round_cents(remaining.max(0.0))
}
