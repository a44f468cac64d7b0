//! Recurrence expansion: turns a rule plus a date window into the ordered
//! list of concrete occurrences, applying per-occurrence overrides.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{DateWindow, Occurrence, OccurrenceOverride, RecurringRule};
use crate::errors::EngineError;
use crate::schedule::cadence;

/// Hard cap on expansion iterations per rule. Tripping it is a fatal data
/// error for that rule, never a silent truncation.
pub const MAX_OCCURRENCES_PER_RULE: usize = 1024;

const PENDING_WINDOW_DAYS: i64 = 7;

/// Classification of an occurrence's effective date against a reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledStatus {
    Overdue,
    Pending,
    Future,
}

impl ScheduledStatus {
    pub fn classify(effective: NaiveDate, reference: NaiveDate) -> ScheduledStatus {
        if effective < reference {
            return ScheduledStatus::Overdue;
        }
        let pending_cutoff = reference + Duration::days(PENDING_WINDOW_DAYS);
        if effective <= pending_cutoff {
            ScheduledStatus::Pending
        } else {
            ScheduledStatus::Future
        }
    }
}

/// Overrides indexed by their `(rule_id, original_date)` key. At most one
/// override per key; duplicates keep the first seen.
#[derive(Debug, Clone, Default)]
pub struct OverrideIndex {
    map: HashMap<(Uuid, NaiveDate), OccurrenceOverride>,
}

impl OverrideIndex {
    pub fn new(overrides: &[OccurrenceOverride]) -> Self {
        let mut map = HashMap::new();
        for ov in overrides {
            map.entry((ov.rule_id, ov.original_date))
                .or_insert_with(|| ov.clone());
        }
        Self { map }
    }

    pub fn get(&self, rule_id: Uuid, original_date: NaiveDate) -> Option<&OccurrenceOverride> {
        self.map.get(&(rule_id, original_date))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// One rule that failed to expand, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleFailure {
    pub rule_id: Uuid,
    pub error: EngineError,
}

/// Outcome of a batch expansion: whatever expanded cleanly, plus per-rule
/// failures. A malformed rule never aborts its siblings.
#[derive(Debug, Clone, Default)]
pub struct ExpansionReport {
    pub occurrences: Vec<Occurrence>,
    pub failures: Vec<RuleFailure>,
}

/// Expands a single rule over `window`, applying overrides.
///
/// The schedule date (after the month/day clamp and weekend adjustment) is
/// the override lookup key and decides window membership; an override may
/// then move the effective date anywhere, including outside the window.
/// Pure function of its inputs.
pub fn expand_rule(
    rule: &RecurringRule,
    window: DateWindow,
    overrides: &OverrideIndex,
) -> Result<Vec<Occurrence>, EngineError> {
    if rule.interval_count == 0 {
        return Err(EngineError::MalformedRule {
            rule_id: rule.id,
            reason: "interval count is zero".to_string(),
        });
    }
    if let Some(end) = rule.end_date {
        if end < rule.start_date {
            return Err(EngineError::MalformedRule {
                rule_id: rule.id,
                reason: format!("end date {} precedes start date {}", end, rule.start_date),
            });
        }
    }

    let cursor = rule.next_due.unwrap_or(rule.start_date).max(rule.start_date);
    let lower = window.start.max(cursor);
    let hard_end = rule.end_date.map_or(window.end, |end| end.min(window.end));
    if hard_end < lower {
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    let mut step = cadence::first_step_near(rule.frequency, rule.interval_count, rule.start_date, lower);
    let mut previous_raw: Option<NaiveDate> = None;
    let mut iterations = 0usize;

    loop {
        iterations += 1;
        if iterations > MAX_OCCURRENCES_PER_RULE {
            return Err(EngineError::IterationCapExceeded { rule_id: rule.id });
        }

        let raw = cadence::step_date(
            rule.frequency,
            rule.interval_count,
            rule.start_date,
            rule.due_day_of_month,
            step,
        );
        if let Some(previous) = previous_raw {
            if raw <= previous {
                return Err(EngineError::MalformedRule {
                    rule_id: rule.id,
                    reason: "schedule does not advance".to_string(),
                });
            }
        }
        previous_raw = Some(raw);
        // A weekend adjustment moves a date by at most two days, so a raw
        // date can still land inside the window until it is that far past
        // the end. The adjusted date decides membership.
        if raw > hard_end + Duration::days(2) {
            break;
        }
        step += 1;

        let scheduled = cadence::adjust_weekend(raw, rule.weekend_adjustment);
        if scheduled < lower || scheduled > hard_end {
            continue;
        }
        if let Some(ov) = overrides.get(rule.id, scheduled) {
            if ov.skipped {
                continue;
            }
            out.push(Occurrence {
                rule_id: rule.id,
                account_id: rule.source_account,
                destination_account: rule.destination_account,
                kind: rule.kind,
                original_date: scheduled,
                effective_date: ov.date.unwrap_or(scheduled),
                amount: ov.amount.unwrap_or(rule.amount),
                currency: rule.currency.clone(),
                description: ov
                    .description
                    .clone()
                    .unwrap_or_else(|| rule.description.clone()),
                overridden: true,
            });
        } else {
            out.push(Occurrence {
                rule_id: rule.id,
                account_id: rule.source_account,
                destination_account: rule.destination_account,
                kind: rule.kind,
                original_date: scheduled,
                effective_date: scheduled,
                amount: rule.amount,
                currency: rule.currency.clone(),
                description: rule.description.clone(),
                overridden: false,
            });
        }
    }

    Ok(out)
}

/// Expands every rule over the same window, collecting partial results.
pub fn expand_all(
    rules: &[RecurringRule],
    window: DateWindow,
    overrides: &[OccurrenceOverride],
) -> ExpansionReport {
    let index = OverrideIndex::new(overrides);
    let mut report = ExpansionReport::default();
    for rule in rules {
        match expand_rule(rule, window, &index) {
            Ok(occurrences) => report.occurrences.extend(occurrences),
            Err(error) => report.failures.push(RuleFailure {
                rule_id: rule.id,
                error,
            }),
        }
    }
    report
        .occurrences
        .sort_by_key(|occ| (occ.effective_date, occ.rule_id));
    debug!(
        expanded = report.occurrences.len(),
        failed = report.failures.len(),
        "recurrence expansion finished"
    );
    report
}

/// First schedule date strictly after `after`, for advancing a rule's
/// `next_due` cursor once an occurrence has been posted. Returns `None` when
/// the rule has run past its end date.
pub fn next_due_after(
    rule: &RecurringRule,
    after: NaiveDate,
) -> Result<Option<NaiveDate>, EngineError> {
    if rule.interval_count == 0 {
        return Err(EngineError::MalformedRule {
            rule_id: rule.id,
            reason: "interval count is zero".to_string(),
        });
    }
    let mut step = cadence::first_step_near(
        rule.frequency,
        rule.interval_count,
        rule.start_date,
        after.max(rule.start_date),
    );
    let mut iterations = 0usize;
    loop {
        iterations += 1;
        if iterations > MAX_OCCURRENCES_PER_RULE {
            return Err(EngineError::IterationCapExceeded { rule_id: rule.id });
        }
        let raw = cadence::step_date(
            rule.frequency,
            rule.interval_count,
            rule.start_date,
            rule.due_day_of_month,
            step,
        );
        step += 1;
        let scheduled = cadence::adjust_weekend(raw, rule.weekend_adjustment);
        if scheduled <= after {
            continue;
        }
        if let Some(end) = rule.end_date {
            if scheduled > end {
                return Ok(None);
            }
        }
        return Ok(Some(scheduled));
    }
}
