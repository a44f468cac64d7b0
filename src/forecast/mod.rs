//! Balance projection: a two-phase daily walk that replays historical
//! transactions backward from the authoritative current balance, then applies
//! projected occurrences forward from today.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::currency::{round_cents, RateTable};
use crate::domain::{Account, Occurrence, Transaction};
use crate::errors::EngineError;
use crate::schedule::cadence;

/// The enumerated forecast horizons offered to callers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ForecastHorizon {
    ThreeMonths,
    SixMonths,
    EndOfYear,
    OneYear,
}

impl ForecastHorizon {
    pub fn end_date(&self, today: NaiveDate) -> NaiveDate {
        match self {
            ForecastHorizon::ThreeMonths => cadence::shift_month(today, 3),
            ForecastHorizon::SixMonths => cadence::shift_month(today, 6),
            ForecastHorizon::EndOfYear => cadence::clamp_day(today.year(), 12, 31),
            ForecastHorizon::OneYear => cadence::shift_month(today, 12),
        }
    }
}

/// One day of a balance series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub balance: f64,
}

/// A projected balance series for one account (or a whole portfolio when
/// `account_id` is `None`), with the lowest projected point for risk
/// warnings. The lowest-balance summary only considers dates after today;
/// historical dips are facts, not forecasts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastSeries {
    pub account_id: Option<Uuid>,
    pub currency: String,
    pub points: Vec<ForecastPoint>,
    pub lowest_projected: Option<ForecastPoint>,
}

impl ForecastSeries {
    pub fn point_at(&self, date: NaiveDate) -> Option<&ForecastPoint> {
        self.points.iter().find(|point| point.date == date)
    }
}

/// Projects one account's balance from `window_start` to `horizon_end`.
///
/// Phase 1 (dates up to today) works backward from the account's stored
/// balance so incremental summation errors cannot drift the series away from
/// the authoritative figure; today's point always equals the stored balance
/// exactly. Phase 2 applies projected occurrences forward. Amounts in other
/// currencies are normalized into the account currency, and an unknown
/// currency aborts the projection rather than corrupting it.
///
/// A horizon ending on or before today yields a degenerate series with no
/// projected phase and no lowest-balance summary.
pub fn project_account(
    account: &Account,
    transactions: &[Transaction],
    occurrences: &[Occurrence],
    window_start: NaiveDate,
    today: NaiveDate,
    horizon_end: NaiveDate,
    rates: &RateTable,
) -> Result<ForecastSeries, EngineError> {
    let window_start = window_start.min(today);

    // Per-day signed deltas, in the account's currency.
    let mut historical: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for txn in transactions {
        if txn.account_id != account.id || txn.date > today || txn.date < window_start {
            continue;
        }
        let amount = rates.convert(txn.signed_amount(), &txn.currency, &account.currency)?;
        *historical.entry(txn.date).or_insert(0.0) += amount;
    }

    let mut projected: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for occ in occurrences {
        if occ.effective_date <= today || occ.effective_date > horizon_end {
            continue;
        }
        let signed = occ.signed_amount_for(account.id);
        if signed == 0.0 {
            continue;
        }
        let amount = rates.convert(signed, &occ.currency, &account.currency)?;
        *projected.entry(occ.effective_date).or_insert(0.0) += amount;
    }

    // Phase 1: walk backward from today so the series always reconciles with
    // the stored balance.
    let mut points = Vec::new();
    let mut balance = account.balance;
    let mut day = today;
    loop {
        points.push(ForecastPoint {
            date: day,
            balance: round_cents(balance),
        });
        if day == window_start {
            break;
        }
        balance -= historical.get(&day).copied().unwrap_or(0.0);
        day = day.pred_opt().expect("date range underflow");
    }
    points.reverse();

    // Phase 2: forward from today's actual balance.
    let mut lowest: Option<ForecastPoint> = None;
    let mut balance = account.balance;
    let mut day = today;
    while day < horizon_end {
        day += Duration::days(1);
        balance += projected.get(&day).copied().unwrap_or(0.0);
        let point = ForecastPoint {
            date: day,
            balance: round_cents(balance),
        };
        points.push(point);
        if lowest.map_or(true, |low| point.balance < low.balance) {
            lowest = Some(point);
        }
    }

    debug!(
        account = %account.name,
        points = points.len(),
        "balance projection finished"
    );
    Ok(ForecastSeries {
        account_id: Some(account.id),
        currency: account.currency.clone(),
        points,
        lowest_projected: lowest,
    })
}

/// Projects the EUR-normalized sum of several accounts over the same axis.
pub fn project_portfolio(
    accounts: &[Account],
    transactions: &[Transaction],
    occurrences: &[Occurrence],
    window_start: NaiveDate,
    today: NaiveDate,
    horizon_end: NaiveDate,
    rates: &RateTable,
) -> Result<ForecastSeries, EngineError> {
    let mut combined: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for account in accounts {
        let series = project_account(
            account,
            transactions,
            occurrences,
            window_start,
            today,
            horizon_end,
            rates,
        )?;
        for point in &series.points {
            let eur = rates.to_eur(point.balance, &account.currency)?;
            *combined.entry(point.date).or_insert(0.0) += eur;
        }
    }

    let points: Vec<ForecastPoint> = combined
        .into_iter()
        .map(|(date, balance)| ForecastPoint {
            date,
            balance: round_cents(balance),
        })
        .collect();
    let lowest = points
        .iter()
        .filter(|point| point.date > today)
        .fold(None, |low: Option<ForecastPoint>, point| {
            if low.map_or(true, |l| point.balance < l.balance) {
                Some(*point)
            } else {
                low
            }
        });

    Ok(ForecastSeries {
        account_id: None,
        currency: "EUR".to_string(),
        points,
        lowest_projected: lowest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn horizon_end_dates() {
        let today = d(2024, 3, 15);
        assert_eq!(ForecastHorizon::ThreeMonths.end_date(today), d(2024, 6, 15));
        assert_eq!(ForecastHorizon::SixMonths.end_date(today), d(2024, 9, 15));
        assert_eq!(ForecastHorizon::EndOfYear.end_date(today), d(2024, 12, 31));
        assert_eq!(ForecastHorizon::OneYear.end_date(today), d(2025, 3, 15));
    }
}
