//! Aggregation engine - Derived statistics over in-memory transaction lists.
//!
//! Every function here is pure: no I/O, inputs are borrowed immutably and an empty list
//! yields zero or empty results. Date filters compare against the user-assigned `date`,
//! never the audit timestamps. Calendar keys (months, days, period starts) are taken in
//! UTC. Functions that depend on the current time come in pairs: `foo` reads the clock
//! and delegates to `foo_at`, which takes `now` explicitly.

use crate::entities::transaction::TransactionType;
use crate::entities::{CategoryModel, TransactionModel};
use crate::errors::Error;
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

/// Fallback colors for categories that are missing from the category list.
pub const CHART_COLORS: [&str; 15] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#FFA726", "#66BB6A", "#AB47BC", "#FFCA28", "#78909C",
    "#4CAF50", "#8BC34A", "#2196F3", "#FF9800", "#9C27B0", "#795548", "#607D8B",
];

/// Inclusive `{start, end}` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// First instant included
    pub start: DateTime<Utc>,
    /// Last instant included
    pub end: DateTime<Utc>,
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::default()).and_utc()
}

impl DateRange {
    /// Window between two instants, both included.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window covering whole calendar days: from midnight of `start` through the last
    /// instant of `end`.
    #[must_use]
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: start_of_day(start),
            end: start_of_day(end)
                .checked_add_signed(Duration::days(1))
                .map_or(DateTime::<Utc>::MAX_UTC, |next| next - Duration::nanoseconds(1)),
        }
    }

    /// Whether `at` lies inside the window.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

fn in_range(transaction: &TransactionModel, range: Option<&DateRange>) -> bool {
    range.is_none_or(|r| r.contains(transaction.date))
}

fn sum_of(
    transactions: &[TransactionModel],
    transaction_type: TransactionType,
    range: Option<&DateRange>,
) -> f64 {
    transactions
        .iter()
        .filter(|t| t.transaction_type == transaction_type && in_range(t, range))
        .map(|t| t.amount)
        .sum()
}

/// Sum of income amounts, optionally restricted to `range`.
#[must_use]
pub fn total_income(transactions: &[TransactionModel], range: Option<&DateRange>) -> f64 {
    sum_of(transactions, TransactionType::Income, range)
}

/// Sum of expense amounts, optionally restricted to `range`.
#[must_use]
pub fn total_expense(transactions: &[TransactionModel], range: Option<&DateRange>) -> f64 {
    sum_of(transactions, TransactionType::Expense, range)
}

/// Income minus expense over the same filter.
#[must_use]
pub fn balance(transactions: &[TransactionModel], range: Option<&DateRange>) -> f64 {
    total_income(transactions, range) - total_expense(transactions, range)
}

/// Totals over a whole transaction set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TransactionStats {
    /// Sum of income amounts
    pub total_income: f64,
    /// Sum of expense amounts
    pub total_expense: f64,
    /// Number of transactions of either type
    pub transaction_count: u64,
}

impl TransactionStats {
    /// Income minus expense.
    #[must_use]
    pub fn balance(&self) -> f64 {
        self.total_income - self.total_expense
    }
}

/// Computes [`TransactionStats`] for an in-memory list.
#[must_use]
pub fn summarize(transactions: &[TransactionModel]) -> TransactionStats {
    TransactionStats {
        total_income: total_income(transactions, None),
        total_expense: total_expense(transactions, None),
        transaction_count: transactions.len() as u64,
    }
}

/// Summed expense amount for one category id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// Category id as referenced by the transactions
    pub category_id: String,
    /// Summed amount
    pub amount: f64,
}

/// Groups expenses by `category_id`, largest total first. Equal totals keep the order
/// in which their categories were first encountered.
#[must_use]
pub fn expenses_by_category(
    transactions: &[TransactionModel],
    range: Option<&DateRange>,
) -> Vec<CategoryTotal> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for t in transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Expense && in_range(t, range))
    {
        if let Some(&i) = index.get(t.category_id.as_str()) {
            totals[i].amount += t.amount;
        } else {
            index.insert(&t.category_id, totals.len());
            totals.push(CategoryTotal {
                category_id: t.category_id.clone(),
                amount: t.amount,
            });
        }
    }

    totals.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    totals
}

/// A known category with its summed expense amount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryExpense {
    /// The category
    pub category: CategoryModel,
    /// Summed expense amount
    pub amount: f64,
}

/// Expense totals for categories in `categories`, in list order, skipping categories
/// with nothing spent. Expenses filed under unknown ids are ignored.
#[must_use]
pub fn category_expenses(
    transactions: &[TransactionModel],
    categories: &[CategoryModel],
    range: Option<&DateRange>,
) -> Vec<CategoryExpense> {
    let totals: HashMap<String, f64> = expenses_by_category(transactions, range)
        .into_iter()
        .map(|t| (t.category_id, t.amount))
        .collect();

    categories
        .iter()
        .filter_map(|c| {
            totals
                .get(&c.id)
                .filter(|amount| **amount > 0.0)
                .map(|&amount| CategoryExpense {
                    category: c.clone(),
                    amount,
                })
        })
        .collect()
}

/// One slice of an expense breakdown chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownSlice {
    /// Category id
    pub category_id: String,
    /// Category name, or the id if the category is unknown
    pub name: String,
    /// Category color, or a palette color if the category is unknown
    pub color: String,
    /// Summed amount
    pub amount: f64,
    /// Share of the total expense in percent
    pub percentage: f64,
}

/// [`expenses_by_category`] decorated for display and cut to the `limit` largest.
/// Percentages are relative to the total of all categories, not only the ones kept.
#[must_use]
pub fn expense_breakdown(
    transactions: &[TransactionModel],
    categories: &[CategoryModel],
    range: Option<&DateRange>,
    limit: usize,
) -> Vec<BreakdownSlice> {
    let totals = expenses_by_category(transactions, range);
    let total: f64 = totals.iter().map(|t| t.amount).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    totals
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, t)| {
            let category = categories.iter().find(|c| c.id == t.category_id);
            BreakdownSlice {
                name: category.map_or_else(|| t.category_id.clone(), |c| c.name.clone()),
                color: category.map_or_else(
                    || CHART_COLORS[i % CHART_COLORS.len()].to_string(),
                    |c| c.color.clone(),
                ),
                percentage: t.amount / total * 100.0,
                amount: t.amount,
                category_id: t.category_id,
            }
        })
        .collect()
}

/// Income, expense and balance for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    /// `YYYY-MM`
    pub month: String,
    /// Income that month
    pub income: f64,
    /// Expense that month
    pub expense: f64,
    /// Income minus expense
    pub balance: f64,
}

/// Per-month totals for transactions dated within the last `months_back` calendar months
/// up to `now`, oldest month first. Months without transactions are omitted.
#[must_use]
pub fn monthly_trends_at(
    transactions: &[TransactionModel],
    months_back: u32,
    now: DateTime<Utc>,
) -> Vec<MonthlyTrend> {
    let start = now
        .checked_sub_months(Months::new(months_back))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let window = DateRange::new(start, now);

    let mut months: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for t in transactions.iter().filter(|t| window.contains(t.date)) {
        let entry = months.entry(t.date.format("%Y-%m").to_string()).or_default();
        match t.transaction_type {
            TransactionType::Income => entry.0 += t.amount,
            TransactionType::Expense => entry.1 += t.amount,
        }
    }

    months
        .into_iter()
        .map(|(month, (income, expense))| MonthlyTrend {
            month,
            income,
            expense,
            balance: income - expense,
        })
        .collect()
}

/// [`monthly_trends_at`] with the current time.
#[must_use]
pub fn monthly_trends(transactions: &[TransactionModel], months_back: u32) -> Vec<MonthlyTrend> {
    monthly_trends_at(transactions, months_back, Utc::now())
}

/// Average monthly income and expense across a trend series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MonthlyAverages {
    /// Mean income per listed month
    pub income: f64,
    /// Mean expense per listed month
    pub expense: f64,
}

/// Means over the months present in `trends`; zero when there are none.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn monthly_averages(trends: &[MonthlyTrend]) -> MonthlyAverages {
    if trends.is_empty() {
        return MonthlyAverages::default();
    }
    let n = trends.len() as f64;
    MonthlyAverages {
        income: trends.iter().map(|m| m.income).sum::<f64>() / n,
        expense: trends.iter().map(|m| m.expense).sum::<f64>() / n,
    }
}

/// Expense total for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySpending {
    /// The UTC calendar day
    pub date: NaiveDate,
    /// Summed expense
    pub amount: f64,
}

/// Per-day expense totals over the trailing `days_back` days, oldest first.
/// Days without expenses are omitted.
#[must_use]
pub fn daily_spending_at(
    transactions: &[TransactionModel],
    days_back: u32,
    now: DateTime<Utc>,
) -> Vec<DailySpending> {
    let start = now
        .checked_sub_signed(Duration::days(i64::from(days_back)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let window = DateRange::new(start, now);

    let mut days: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for t in transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Expense && window.contains(t.date))
    {
        *days.entry(t.date.date_naive()).or_default() += t.amount;
    }

    days.into_iter()
        .map(|(date, amount)| DailySpending { date, amount })
        .collect()
}

/// [`daily_spending_at`] with the current time.
#[must_use]
pub fn daily_spending(transactions: &[TransactionModel], days_back: u32) -> Vec<DailySpending> {
    daily_spending_at(transactions, days_back, Utc::now())
}

/// The in-progress period a projection covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionPeriod {
    /// Sunday through Saturday
    Weekly,
    /// The calendar month
    Monthly,
}

/// Linear extrapolation of spending over the current period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingProjection {
    /// Midnight at the start of the period
    pub period_start: DateTime<Utc>,
    /// Expense from `period_start` through now
    pub spent: f64,
    /// Days since the period started, today included
    pub days_elapsed: i64,
    /// Length of the period in days
    pub total_days: i64,
    /// `total_days - days_elapsed`
    pub days_remaining: i64,
    /// `spent / days_elapsed`
    pub average_daily: f64,
    /// `average_daily * total_days`
    pub projected_total: f64,
    /// `days_elapsed / total_days * 100`
    pub progress_percentage: f64,
}

/// Projects total spend for the week or month containing `now`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn spending_projection_at(
    transactions: &[TransactionModel],
    period: ProjectionPeriod,
    now: DateTime<Utc>,
) -> SpendingProjection {
    let today = now.date_naive();
    let (first_day, total_days) = match period {
        ProjectionPeriod::Weekly => (
            today - Duration::days(i64::from(today.weekday().num_days_from_sunday())),
            7,
        ),
        ProjectionPeriod::Monthly => {
            let first = today.with_day(1).unwrap_or(today);
            let total = first
                .checked_add_months(Months::new(1))
                .map_or(31, |next| (next - first).num_days());
            (first, total)
        }
    };

    let period_start = start_of_day(first_day);
    let spent = total_expense(transactions, Some(&DateRange::new(period_start, now)));
    let days_elapsed = (today - first_day).num_days() + 1;
    let average_daily = spent / days_elapsed as f64;

    SpendingProjection {
        period_start,
        spent,
        days_elapsed,
        total_days,
        days_remaining: total_days - days_elapsed,
        average_daily,
        projected_total: average_daily * total_days as f64,
        progress_percentage: days_elapsed as f64 / total_days as f64 * 100.0,
    }
}

/// [`spending_projection_at`] with the current time.
#[must_use]
pub fn spending_projection(
    transactions: &[TransactionModel],
    period: ProjectionPeriod,
) -> SpendingProjection {
    spending_projection_at(transactions, period, Utc::now())
}

/// Look-back windows offered by the statistics view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatsPeriod {
    /// Last 7 days
    #[serde(rename = "7d")]
    Week,
    /// Last 30 days
    #[serde(rename = "30d")]
    Month,
    /// Last 90 days
    #[serde(rename = "90d")]
    Quarter,
    /// Last calendar year
    #[serde(rename = "1y")]
    Year,
}

impl StatsPeriod {
    /// Window ending at `now`.
    #[must_use]
    pub fn range_at(self, now: DateTime<Utc>) -> DateRange {
        let start = match self {
            Self::Week => now - Duration::days(7),
            Self::Month => now - Duration::days(30),
            Self::Quarter => now - Duration::days(90),
            Self::Year => now
                .checked_sub_months(Months::new(12))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        };
        DateRange::new(start, now)
    }

    /// Window ending now.
    #[must_use]
    pub fn range(self) -> DateRange {
        self.range_at(Utc::now())
    }

    /// How many months of trend data go with this window.
    #[must_use]
    pub const fn trend_months(self) -> u32 {
        match self {
            Self::Year => 12,
            Self::Quarter => 3,
            Self::Week | Self::Month => 1,
        }
    }

    /// Short label, e.g. `30d`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Week => "7d",
            Self::Month => "30d",
            Self::Quarter => "90d",
            Self::Year => "1y",
        }
    }
}

impl FromStr for StatsPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "7d" => Ok(Self::Week),
            "30d" => Ok(Self::Month),
            "90d" => Ok(Self::Quarter),
            "1y" => Ok(Self::Year),
            other => Err(Error::validation(format!(
                "unknown period '{other}', expected one of 7d, 30d, 90d, 1y"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{category, transaction};
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn january() -> DateRange {
        DateRange::from_dates(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    fn three_entries() -> Vec<TransactionModel> {
        vec![
            transaction(TransactionType::Income, 100.0, "salary", at(2024, 1, 5)),
            transaction(TransactionType::Expense, 40.0, "food", at(2024, 1, 10)),
            transaction(TransactionType::Income, 50.0, "bonus", at(2024, 2, 1)),
        ]
    }

    #[test]
    fn test_empty_list_is_zero() {
        assert_eq!(total_income(&[], None), 0.0);
        assert_eq!(total_expense(&[], None), 0.0);
        assert_eq!(balance(&[], None), 0.0);
        assert!(expenses_by_category(&[], None).is_empty());
        assert!(monthly_trends_at(&[], 12, at(2024, 6, 1)).is_empty());
        assert_eq!(summarize(&[]), TransactionStats::default());
    }

    #[test]
    fn test_totals_within_range() {
        let list = three_entries();
        let range = january();
        assert_eq!(total_income(&list, Some(&range)), 100.0);
        assert_eq!(total_expense(&list, Some(&range)), 40.0);
        assert_eq!(balance(&list, Some(&range)), 60.0);
        assert_eq!(balance(&list, None), 110.0);
    }

    #[test]
    fn test_range_ending_on_last_date() {
        let range =
            DateRange::from_dates(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), NaiveDate::MAX);
        assert_eq!(range.end, DateTime::<Utc>::MAX_UTC);
        assert!(range.contains(at(2030, 6, 1)));
    }

    #[test]
    fn test_range_end_is_inclusive() {
        let late = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap();
        let list = vec![transaction(TransactionType::Expense, 5.0, "food", late)];
        assert_eq!(total_expense(&list, Some(&january())), 5.0);
    }

    #[test]
    fn test_expenses_by_category_sorted_desc() {
        let list = vec![
            transaction(TransactionType::Expense, 30.0, "catA", at(2024, 1, 1)),
            transaction(TransactionType::Expense, 70.0, "catB", at(2024, 1, 2)),
            transaction(TransactionType::Expense, 20.0, "catA", at(2024, 1, 3)),
            transaction(TransactionType::Income, 500.0, "salary", at(2024, 1, 3)),
        ];
        let totals = expenses_by_category(&list, None);
        assert_eq!(
            totals,
            vec![
                CategoryTotal {
                    category_id: "catB".to_string(),
                    amount: 70.0
                },
                CategoryTotal {
                    category_id: "catA".to_string(),
                    amount: 50.0
                },
            ]
        );
    }

    #[test]
    fn test_expenses_by_category_ties_keep_encounter_order() {
        let list = vec![
            transaction(TransactionType::Expense, 10.0, "first", at(2024, 1, 1)),
            transaction(TransactionType::Expense, 10.0, "second", at(2024, 1, 2)),
        ];
        let ids: Vec<_> = expenses_by_category(&list, None)
            .into_iter()
            .map(|t| t.category_id)
            .collect();
        assert_eq!(ids, ["first", "second"]);
    }

    #[test]
    fn test_category_expenses_follow_category_order() {
        let categories = vec![
            category("food", TransactionType::Expense),
            category("rent", TransactionType::Expense),
            category("transport", TransactionType::Expense),
        ];
        let list = vec![
            transaction(TransactionType::Expense, 5.0, "transport", at(2024, 1, 1)),
            transaction(TransactionType::Expense, 9.0, "food", at(2024, 1, 1)),
            transaction(TransactionType::Expense, 3.0, "unknown", at(2024, 1, 1)),
        ];
        let result = category_expenses(&list, &categories, None);
        let ids: Vec<_> = result.iter().map(|c| c.category.id.as_str()).collect();
        assert_eq!(ids, ["food", "transport"]);
        assert_eq!(result[0].amount, 9.0);
    }

    #[test]
    fn test_expense_breakdown_percentages_and_fallbacks() {
        let categories = vec![category("food", TransactionType::Expense)];
        let list = vec![
            transaction(TransactionType::Expense, 75.0, "food", at(2024, 1, 1)),
            transaction(TransactionType::Expense, 25.0, "mystery", at(2024, 1, 1)),
        ];
        let slices = expense_breakdown(&list, &categories, None, 8);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].name, "Food");
        assert_eq!(slices[0].percentage, 75.0);
        assert_eq!(slices[1].name, "mystery");
        assert_eq!(slices[1].color, CHART_COLORS[1]);

        assert_eq!(expense_breakdown(&list, &categories, None, 1).len(), 1);
        assert!(expense_breakdown(&[], &categories, None, 8).is_empty());
    }

    #[test]
    fn test_monthly_trends_omit_empty_months() {
        let list = vec![
            transaction(TransactionType::Income, 100.0, "salary", at(2024, 1, 5)),
            transaction(TransactionType::Expense, 30.0, "food", at(2024, 1, 20)),
            transaction(TransactionType::Expense, 10.0, "food", at(2024, 3, 2)),
        ];
        let trends = monthly_trends_at(&list, 12, at(2024, 3, 15));
        let months: Vec<_> = trends.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, ["2024-01", "2024-03"]);
        assert_eq!(trends[0].balance, 70.0);
        assert_eq!(trends[1].expense, 10.0);
    }

    #[test]
    fn test_monthly_trends_window() {
        let list = vec![
            transaction(TransactionType::Expense, 1.0, "food", at(2023, 12, 31)),
            transaction(TransactionType::Expense, 2.0, "food", at(2024, 3, 1)),
        ];
        let trends = monthly_trends_at(&list, 1, at(2024, 3, 15));
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].month, "2024-03");
    }

    #[test]
    fn test_monthly_averages() {
        let list = three_entries();
        let trends = monthly_trends_at(&list, 12, at(2024, 2, 10));
        let averages = monthly_averages(&trends);
        assert_eq!(averages.income, 75.0);
        assert_eq!(averages.expense, 20.0);
        assert_eq!(monthly_averages(&[]), MonthlyAverages::default());
    }

    #[test]
    fn test_daily_spending_groups_by_day() {
        let list = vec![
            transaction(TransactionType::Expense, 4.0, "food", at(2024, 1, 10)),
            transaction(TransactionType::Expense, 6.0, "food", at(2024, 1, 10)),
            transaction(TransactionType::Expense, 1.0, "food", at(2024, 1, 12)),
            transaction(TransactionType::Income, 99.0, "salary", at(2024, 1, 11)),
            transaction(TransactionType::Expense, 50.0, "food", at(2023, 11, 1)),
        ];
        let days = daily_spending_at(&list, 30, at(2024, 1, 15));
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(days[0].amount, 10.0);
        assert_eq!(days[1].amount, 1.0);
    }

    #[test]
    fn test_daily_spending_unbounded_window() {
        let now = at(2024, 1, 15);
        let list = vec![
            transaction(TransactionType::Expense, 4.0, "food", now),
            transaction(TransactionType::Expense, 2.0, "food", at(1990, 3, 1)),
        ];
        let days = daily_spending_at(&list, u32::MAX, now);
        assert_eq!(days.len(), 2);
        assert_eq!(days[1].amount, 4.0);
    }

    #[test]
    fn test_monthly_projection() {
        // 2024-04 has 30 days; on the 10th, 100 spent so far.
        let list = vec![
            transaction(TransactionType::Expense, 60.0, "food", at(2024, 4, 1)),
            transaction(TransactionType::Expense, 40.0, "food", at(2024, 4, 9)),
            transaction(TransactionType::Expense, 500.0, "food", at(2024, 3, 31)),
        ];
        let p = spending_projection_at(&list, ProjectionPeriod::Monthly, at(2024, 4, 10));
        assert_eq!(p.spent, 100.0);
        assert_eq!(p.days_elapsed, 10);
        assert_eq!(p.total_days, 30);
        assert_eq!(p.days_remaining, 20);
        assert_eq!(p.average_daily, 10.0);
        assert_eq!(p.projected_total, 300.0);
        assert!((p.progress_percentage - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_weekly_projection_starts_sunday() {
        // 2024-01-10 is a Wednesday; the week began Sunday 2024-01-07.
        let list = vec![
            transaction(TransactionType::Expense, 21.0, "food", at(2024, 1, 7)),
            transaction(TransactionType::Expense, 9.0, "food", at(2024, 1, 6)),
        ];
        let p = spending_projection_at(&list, ProjectionPeriod::Weekly, at(2024, 1, 10));
        assert_eq!(
            p.period_start,
            Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 0).unwrap()
        );
        assert_eq!(p.spent, 21.0);
        assert_eq!(p.days_elapsed, 4);
        assert_eq!(p.days_remaining, 3);
        assert_eq!(p.projected_total, 21.0 / 4.0 * 7.0);
    }

    #[test]
    fn test_stats_period_parsing_and_ranges() {
        let now = at(2024, 6, 15);
        assert_eq!("90d".parse::<StatsPeriod>().unwrap(), StatsPeriod::Quarter);
        assert!("2w".parse::<StatsPeriod>().is_err());
        assert_eq!(StatsPeriod::Year.range_at(now).start, at(2023, 6, 15));
        assert_eq!(StatsPeriod::Week.range_at(now).start, at(2024, 6, 8));
        assert_eq!(StatsPeriod::Year.trend_months(), 12);
        assert_eq!(StatsPeriod::Quarter.trend_months(), 3);
        assert_eq!(StatsPeriod::Month.trend_months(), 1);
    }
}
