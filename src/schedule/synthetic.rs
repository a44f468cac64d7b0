//! Synthetic schedules: implicit recurring items derived from structural
//! account data. Loan annuities, credit-card statement payments, and property
//! costs all come out as ordinary [`RecurringRule`]s so downstream code
//! treats them uniformly with user-defined rules.
//!
//! Synthetic rules are regenerated on every read and never persisted.

use chrono::{Datelike, NaiveDate};
use tracing::warn;
use uuid::Uuid;

use crate::currency::round_cents;
use crate::domain::{
    Account, AccountKind, CardTerms, DateWindow, Frequency, LoanTerms, PropertyCost,
    PropertyCostKind, RecurringRule, RuleKind, Transaction, TransactionKind,
};
use crate::schedule::amortization::annuity_payment;
use crate::schedule::cadence;

/// Derives synthetic recurring rules from every structural account. Accounts
/// with missing structural fields are skipped, not errors: their absence only
/// degrades forecasting.
pub fn synthesize(
    accounts: &[Account],
    transactions: &[Transaction],
    today: NaiveDate,
) -> Vec<RecurringRule> {
    let mut rules = Vec::new();
    for account in accounts {
        match &account.kind {
            AccountKind::Loan(terms) => {
                if let Some(rule) = loan_rule(account, terms) {
                    rules.push(rule);
                }
            }
            AccountKind::CreditCard(terms) => {
                if let Some(rule) = card_rule(account, terms, transactions, today) {
                    rules.push(rule);
                }
            }
            AccountKind::Property(costs) => {
                rules.extend(property_rules(account, costs));
            }
            AccountKind::Checking | AccountKind::Savings | AccountKind::Cash => {}
        }
    }
    rules
}

fn loan_rule(account: &Account, terms: &LoanTerms) -> Option<RecurringRule> {
    let (Some(rate_pct), Some(months)) = (terms.annual_rate_pct, terms.duration_months) else {
        warn!(account = %account.name, "loan missing rate or duration, skipping synthesis");
        return None;
    };
    if months == 0 {
        warn!(account = %account.name, "loan has zero duration, skipping synthesis");
        return None;
    }
    let payment = round_cents(annuity_payment(terms.principal, rate_pct / 100.0 / 12.0, months));
    let due_day = terms.due_day_of_month.unwrap_or(terms.start_date.day());
    let first_due = {
        let shifted = cadence::shift_month(terms.start_date, 1);
        cadence::clamp_day(shifted.year(), shifted.month(), due_day)
    };
    let last_due = {
        let shifted = cadence::shift_month(terms.start_date, months as i32);
        cadence::clamp_day(shifted.year(), shifted.month(), due_day)
    };

    let mut rule = RecurringRule::new(
        account.id,
        RuleKind::Expense,
        payment,
        account.currency.clone(),
        format!("Loan payment for {}", account.name),
        Frequency::Monthly,
        first_due,
    )
    .with_due_day(due_day)
    .with_end_date(last_due);
    rule.category = Some("Loan".to_string());
    rule.is_synthetic = true;
    Some(rule)
}

fn card_rule(
    account: &Account,
    terms: &CardTerms,
    transactions: &[Transaction],
    today: NaiveDate,
) -> Option<RecurringRule> {
    let payment_day = terms.payment_day?;
    let window = statement_window(terms, today)?;
    let balance = statement_balance(account.id, transactions, window);
    if balance <= 0.0 {
        return None;
    }
    let due = first_due_on_day(payment_day, window.end);

    let mut rule = RecurringRule::new(
        account.id,
        RuleKind::Expense,
        balance,
        account.currency.clone(),
        format!("Credit card payment for {}", account.name),
        Frequency::Monthly,
        due,
    )
    .with_due_day(payment_day);
    rule.category = Some("Credit card".to_string());
    rule.is_synthetic = true;
    Some(rule)
}

fn property_rules(account: &Account, costs: &[PropertyCost]) -> Vec<RecurringRule> {
    costs
        .iter()
        .map(|cost| {
            let kind = match cost.kind {
                PropertyCostKind::RentalIncome => RuleKind::Income,
                _ => RuleKind::Expense,
            };
            let mut rule = RecurringRule::new(
                account.id,
                kind,
                cost.amount,
                cost.currency.clone(),
                format!("{} for {}", cost.kind.label(), account.name),
                cost.frequency,
                cost.first_due,
            );
            rule.category = Some("Property".to_string());
            rule.is_synthetic = true;
            rule
        })
        .collect()
}

/// The most recent *closed* billing cycle as of `reference`. Cycles open on
/// the card's statement day each month; the cycle containing `reference` is
/// still open, so the window is the one before it.
pub fn statement_window(terms: &CardTerms, reference: NaiveDate) -> Option<DateWindow> {
    let statement_day = terms.statement_day?;
    let current_open = most_recent_on_day(statement_day, reference);
    let previous_open = {
        let shifted = cadence::shift_month(current_open, -1);
        cadence::clamp_day(shifted.year(), shifted.month(), statement_day)
    };
    DateWindow::new(previous_open, current_open.pred_opt()?).ok()
}

/// Net amount owed for transactions on the card inside the statement window:
/// spend minus payments and refunds.
fn statement_balance(account_id: Uuid, transactions: &[Transaction], window: DateWindow) -> f64 {
    let net: f64 = transactions
        .iter()
        .filter(|txn| txn.account_id == account_id && window.contains(txn.date))
        .map(|txn| match txn.kind {
            TransactionKind::Expense => txn.amount,
            TransactionKind::Income => -txn.amount,
        })
        .sum();
    round_cents(net)
}

/// Most recent date with the given day-of-month at or before `reference`.
fn most_recent_on_day(day: u32, reference: NaiveDate) -> NaiveDate {
    let candidate = cadence::clamp_day(reference.year(), reference.month(), day);
    if candidate <= reference {
        candidate
    } else {
        let shifted = cadence::shift_month(candidate, -1);
        cadence::clamp_day(shifted.year(), shifted.month(), day)
    }
}

/// First date with the given day-of-month strictly after `after`.
fn first_due_on_day(day: u32, after: NaiveDate) -> NaiveDate {
    let candidate = cadence::clamp_day(after.year(), after.month(), day);
    if candidate > after {
        candidate
    } else {
        let shifted = cadence::shift_month(candidate, 1);
        cadence::clamp_day(shifted.year(), shifted.month(), day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn statement_window_is_previous_cycle() {
        let terms = CardTerms {
            statement_day: Some(5),
            payment_day: Some(20),
        };
        let window = statement_window(&terms, d(2024, 6, 10)).unwrap();
        assert_eq!(window.start, d(2024, 5, 5));
        assert_eq!(window.end, d(2024, 6, 4));
    }

    #[test]
    fn statement_window_before_statement_day_goes_back_two_opens() {
        let terms = CardTerms {
            statement_day: Some(15),
            payment_day: Some(1),
        };
        let window = statement_window(&terms, d(2024, 6, 10)).unwrap();
        assert_eq!(window.start, d(2024, 4, 15));
        assert_eq!(window.end, d(2024, 5, 14));
    }

    #[test]
    fn statement_window_requires_statement_day() {
        let terms = CardTerms {
            statement_day: None,
            payment_day: Some(1),
        };
        assert!(statement_window(&terms, d(2024, 6, 10)).is_none());
    }

    #[test]
    fn due_date_lands_after_cycle_close() {
        assert_eq!(first_due_on_day(20, d(2024, 6, 4)), d(2024, 6, 20));
        assert_eq!(first_due_on_day(1, d(2024, 6, 4)), d(2024, 7, 1));
    }
}
