//! Transfer reconciliation: detects expense/income pairs across accounts
//! that look like internal money movements and proposes links.

use std::collections::HashSet;

use tracing::debug;
use uuid::Uuid;

use crate::currency::RateTable;
use crate::domain::{Account, Transaction, TransactionKind};
use crate::errors::EngineError;

/// Maximum date distance between the two legs of a candidate pair.
pub const TRANSFER_MATCH_WINDOW_DAYS: i64 = 1;

/// A proposed pairing of one expense with one income transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSuggestion {
    pub expense_id: Uuid,
    pub income_id: Uuid,
}

/// Finds candidate transfer pairs: an expense and an income in different
/// accounts whose EUR amounts match to the cent within the date window.
/// Already-linked transactions are excluded, and each income is consumed by
/// at most one suggestion (first match in date order wins). Unknown
/// currencies propagate as errors since a misconverted amount would pair the
/// wrong legs.
pub fn find_candidates(
    transactions: &[Transaction],
    rates: &RateTable,
) -> Result<Vec<TransferSuggestion>, EngineError> {
    let mut expenses = Vec::new();
    let mut incomes = Vec::new();
    for txn in transactions {
        if txn.transfer_id.is_some() {
            continue;
        }
        let cents = (rates.to_eur(txn.amount.abs(), &txn.currency)? * 100.0).round() as i64;
        match txn.kind {
            TransactionKind::Expense => expenses.push((txn, cents)),
            TransactionKind::Income => incomes.push((txn, cents)),
        }
    }
    expenses.sort_by_key(|(txn, _)| (txn.date, txn.id));
    incomes.sort_by_key(|(txn, _)| (txn.date, txn.id));

    let mut consumed: HashSet<Uuid> = HashSet::new();
    let mut suggestions = Vec::new();
    for (expense, expense_cents) in &expenses {
        let matched = incomes.iter().find(|(income, income_cents)| {
            !consumed.contains(&income.id)
                && income.account_id != expense.account_id
                && income_cents == expense_cents
                && (income.date - expense.date).num_days().abs() <= TRANSFER_MATCH_WINDOW_DAYS
        });
        if let Some((income, _)) = matched {
            consumed.insert(income.id);
            suggestions.push(TransferSuggestion {
                expense_id: expense.id,
                income_id: income.id,
            });
        }
    }
    debug!(candidates = suggestions.len(), "transfer candidate search finished");
    Ok(suggestions)
}

/// Confirms a suggestion: returns updated copies of both transactions
/// sharing a fresh transfer id, with descriptions rewritten to name the
/// counterpart account. Amounts and kinds are never touched. Because the
/// copies carry a `transfer_id`, a re-run of [`find_candidates`] will not
/// suggest the pair again.
pub fn confirm(
    suggestion: &TransferSuggestion,
    transactions: &[Transaction],
    accounts: &[Account],
) -> Option<(Transaction, Transaction)> {
    let expense = transactions.iter().find(|t| t.id == suggestion.expense_id)?;
    let income = transactions.iter().find(|t| t.id == suggestion.income_id)?;
    let expense_account = accounts.iter().find(|a| a.id == expense.account_id)?;
    let income_account = accounts.iter().find(|a| a.id == income.account_id)?;

    let transfer_id = Uuid::new_v4();
    let mut out_expense = expense.clone();
    let mut out_income = income.clone();
    out_expense.transfer_id = Some(transfer_id);
    out_income.transfer_id = Some(transfer_id);
    out_expense.description = directed_description(&expense.description, "to", income_account);
    out_income.description = directed_description(&income.description, "from", expense_account);
    Some((out_expense, out_income))
}

/// Keeps a description that already names the counterpart account, otherwise
/// rewrites it with an explicit direction.
fn directed_description(current: &str, direction: &str, counterpart: &Account) -> String {
    if current
        .to_lowercase()
        .contains(&counterpart.name.to_lowercase())
    {
        current.to_string()
    } else {
        format!("Transfer {} {}", direction, counterpart.name)
    }
}
