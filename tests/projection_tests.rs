use chrono::NaiveDate;
use forecast_core::currency::RateTable;
use forecast_core::domain::{
    Account, AccountKind, DateWindow, Frequency, Occurrence, RecurringRule, RuleKind, Transaction,
    TransactionKind,
};
use forecast_core::forecast::{project_account, project_portfolio, ForecastHorizon};
use forecast_core::schedule::{expand_all, synthesize};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn eur_account(balance: f64) -> Account {
    Account::new("Checking", "EUR", AccountKind::Checking).with_balance(balance)
}

fn occurrence(rule: &RecurringRule, date: NaiveDate) -> Occurrence {
    Occurrence {
        rule_id: rule.id,
        account_id: rule.source_account,
        destination_account: rule.destination_account,
        kind: rule.kind,
        original_date: date,
        effective_date: date,
        amount: rule.amount,
        currency: rule.currency.clone(),
        description: rule.description.clone(),
        overridden: false,
    }
}

#[test]
fn today_point_equals_stored_balance_exactly() {
    let account = eur_account(1_234.56);
    let today = d(2024, 6, 10);
    let transactions = vec![
        Transaction::new(account.id, d(2024, 6, 3), 333.33, "EUR", TransactionKind::Income, "salary"),
        Transaction::new(account.id, d(2024, 6, 7), 41.99, "EUR", TransactionKind::Expense, "groceries"),
        Transaction::new(account.id, d(2024, 6, 9), 12.5, "EUR", TransactionKind::Expense, "lunch"),
    ];
    let series = project_account(
        &account,
        &transactions,
        &[],
        d(2024, 6, 1),
        today,
        d(2024, 7, 10),
        &RateTable::default(),
    )
    .unwrap();

    assert_eq!(series.point_at(today).unwrap().balance, 1_234.56);
}

#[test]
fn historical_phase_walks_backward_from_today() {
    let account = eur_account(100.0);
    let today = d(2024, 6, 10);
    let transactions = vec![
        Transaction::new(account.id, d(2024, 6, 8), 50.0, "EUR", TransactionKind::Income, "refund"),
        Transaction::new(account.id, d(2024, 6, 9), 20.0, "EUR", TransactionKind::Expense, "fuel"),
    ];
    let series = project_account(
        &account,
        &transactions,
        &[],
        d(2024, 6, 7),
        today,
        today,
        &RateTable::default(),
    )
    .unwrap();

    assert_eq!(series.point_at(d(2024, 6, 7)).unwrap().balance, 70.0);
    assert_eq!(series.point_at(d(2024, 6, 8)).unwrap().balance, 120.0);
    assert_eq!(series.point_at(d(2024, 6, 9)).unwrap().balance, 100.0);
    assert_eq!(series.point_at(d(2024, 6, 10)).unwrap().balance, 100.0);
}

#[test]
fn empty_window_is_a_flat_series() {
    let account = eur_account(500.0);
    let series = project_account(
        &account,
        &[],
        &[],
        d(2024, 6, 1),
        d(2024, 6, 10),
        d(2024, 6, 20),
        &RateTable::default(),
    )
    .unwrap();
    assert!(series.points.iter().all(|p| p.balance == 500.0));
    assert_eq!(series.points.len(), 20);
}

#[test]
fn projected_phase_applies_occurrences_and_tracks_lowest() {
    let account = eur_account(100.0);
    let today = d(2024, 6, 10);
    let rent = RecurringRule::new(
        account.id,
        RuleKind::Expense,
        40.0,
        "EUR",
        "Rent",
        Frequency::Monthly,
        d(2024, 6, 15),
    );
    let salary = RecurringRule::new(
        account.id,
        RuleKind::Income,
        30.0,
        "EUR",
        "Salary",
        Frequency::Monthly,
        d(2024, 6, 20),
    );
    let occurrences = vec![
        occurrence(&rent, d(2024, 6, 15)),
        occurrence(&salary, d(2024, 6, 20)),
    ];
    let series = project_account(
        &account,
        &[],
        &occurrences,
        today,
        today,
        d(2024, 6, 30),
        &RateTable::default(),
    )
    .unwrap();

    assert_eq!(series.point_at(d(2024, 6, 14)).unwrap().balance, 100.0);
    assert_eq!(series.point_at(d(2024, 6, 15)).unwrap().balance, 60.0);
    assert_eq!(series.point_at(d(2024, 6, 20)).unwrap().balance, 90.0);
    let lowest = series.lowest_projected.unwrap();
    assert_eq!(lowest.date, d(2024, 6, 15));
    assert_eq!(lowest.balance, 60.0);
}

#[test]
fn lowest_balance_ignores_historical_dips() {
    let account = eur_account(100.0);
    let today = d(2024, 6, 10);
    // Big historical swing: balance was far lower last week.
    let transactions = vec![Transaction::new(
        account.id,
        d(2024, 6, 5),
        1_000.0,
        "EUR",
        TransactionKind::Income,
        "bonus",
    )];
    let series = project_account(
        &account,
        &transactions,
        &[],
        d(2024, 6, 1),
        today,
        d(2024, 6, 12),
        &RateTable::default(),
    )
    .unwrap();

    // Historical minimum is -900, but the projected phase never dips.
    assert_eq!(series.point_at(d(2024, 6, 4)).unwrap().balance, -900.0);
    let lowest = series.lowest_projected.unwrap();
    assert_eq!(lowest.balance, 100.0);
}

#[test]
fn horizon_before_today_yields_degenerate_series() {
    let account = eur_account(250.0);
    let today = d(2024, 6, 10);
    let series = project_account(
        &account,
        &[],
        &[],
        d(2024, 6, 1),
        today,
        d(2024, 5, 1),
        &RateTable::default(),
    )
    .unwrap();
    assert!(series.lowest_projected.is_none());
    assert_eq!(series.points.last().unwrap().date, today);
}

#[test]
fn occurrences_in_other_currencies_are_normalized() {
    let account = eur_account(100.0);
    let today = d(2024, 6, 10);
    let rule = RecurringRule::new(
        account.id,
        RuleKind::Expense,
        100.0,
        "USD",
        "Subscription",
        Frequency::Monthly,
        d(2024, 6, 15),
    );
    let occurrences = vec![occurrence(&rule, d(2024, 6, 15))];
    let rates = RateTable::empty().with_rate("USD", 0.5);
    let series = project_account(
        &account,
        &[],
        &occurrences,
        today,
        today,
        d(2024, 6, 20),
        &rates,
    )
    .unwrap();
    assert_eq!(series.point_at(d(2024, 6, 15)).unwrap().balance, 50.0);
}

#[test]
fn unknown_currency_aborts_projection() {
    let account = eur_account(100.0);
    let today = d(2024, 6, 10);
    let transactions = vec![Transaction::new(
        account.id,
        d(2024, 6, 5),
        10.0,
        "XXX",
        TransactionKind::Expense,
        "mystery",
    )];
    assert!(project_account(
        &account,
        &transactions,
        &[],
        d(2024, 6, 1),
        today,
        d(2024, 6, 20),
        &RateTable::default(),
    )
    .is_err());
}

#[test]
fn transfer_occurrences_hit_both_accounts() {
    let source = eur_account(100.0);
    let destination =
        Account::new("Savings", "EUR", AccountKind::Savings).with_balance(10.0);
    let today = d(2024, 6, 10);

    let mut rule = RecurringRule::new(
        source.id,
        RuleKind::Transfer,
        25.0,
        "EUR",
        "Savings sweep",
        Frequency::Monthly,
        d(2024, 6, 15),
    );
    rule.destination_account = Some(destination.id);
    let occurrences = vec![occurrence(&rule, d(2024, 6, 15))];
    let rates = RateTable::default();

    let source_series = project_account(
        &source, &[], &occurrences, today, today, d(2024, 6, 20), &rates,
    )
    .unwrap();
    let destination_series = project_account(
        &destination, &[], &occurrences, today, today, d(2024, 6, 20), &rates,
    )
    .unwrap();

    assert_eq!(source_series.point_at(d(2024, 6, 15)).unwrap().balance, 75.0);
    assert_eq!(
        destination_series.point_at(d(2024, 6, 15)).unwrap().balance,
        35.0
    );
}

#[test]
fn portfolio_series_sums_accounts_in_eur() {
    let eur = eur_account(100.0);
    let usd = Account::new("US checking", "USD", AccountKind::Checking).with_balance(200.0);
    let today = d(2024, 6, 10);
    let rates = RateTable::empty().with_rate("USD", 0.5);

    let series = project_portfolio(
        &[eur, usd],
        &[],
        &[],
        today,
        today,
        d(2024, 6, 12),
        &rates,
    )
    .unwrap();

    // 100 EUR + 200 USD * 0.5 = 200 EUR.
    assert_eq!(series.currency, "EUR");
    assert!(series.points.iter().all(|p| p.balance == 200.0));
}

#[test]
fn horizon_variants_extend_from_today() {
    let today = d(2024, 2, 29);
    assert_eq!(ForecastHorizon::ThreeMonths.end_date(today), d(2024, 5, 29));
    assert_eq!(ForecastHorizon::EndOfYear.end_date(today), d(2024, 12, 31));
}

#[test]
fn end_to_end_rules_to_forecast() {
    let account = eur_account(1_000.0);
    let today = d(2024, 1, 15);
    let rent = RecurringRule::new(
        account.id,
        RuleKind::Expense,
        100.0,
        "EUR",
        "Rent",
        Frequency::Monthly,
        d(2024, 1, 31),
    )
    .with_due_day(31);

    let horizon_end = ForecastHorizon::ThreeMonths.end_date(today);
    let window = DateWindow::new(today, horizon_end).unwrap();
    let mut rules = vec![rent];
    rules.extend(synthesize(&[account.clone()], &[], today));
    let report = expand_all(&rules, window, &[]);
    assert!(report.failures.is_empty());

    let series = project_account(
        &account,
        &[],
        &report.occurrences,
        today,
        today,
        horizon_end,
        &RateTable::default(),
    )
    .unwrap();

    // Rent on Jan 31, Feb 29 (leap year), Mar 31 leaves 700 by the horizon.
    assert_eq!(series.point_at(d(2024, 1, 31)).unwrap().balance, 900.0);
    assert_eq!(series.point_at(d(2024, 2, 29)).unwrap().balance, 800.0);
    assert_eq!(series.point_at(d(2024, 3, 31)).unwrap().balance, 700.0);
    assert_eq!(series.points.last().unwrap().balance, 700.0);
}
