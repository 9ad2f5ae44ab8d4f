//! Aggregations: month closing, annual rollup, history, dashboard

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::format::month_abbrev;
use crate::models::{
    saturating_sum, BalanceSummary, FixedExpense, MonthKey, MonthlyReport, Transaction,
};
use crate::recurring::{upcoming, UpcomingExpense};
use crate::types::{Category, CategoryPalette, TransactionType};

/// One labelled value for a bar or pie chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataPoint {
    pub label: String,
    pub value: Decimal,
    pub color: String,
}

/// Total per category with its share of the whole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Decimal,
    /// 0..=100
    pub percentage: Decimal,
}

fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|p| p.round_dp(2))
        .unwrap_or(Decimal::ZERO)
}

/// Sum amounts per category, largest first; ties by category key
pub fn category_totals<I>(items: I) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = (Category, Decimal)>,
{
    let mut sums: HashMap<Category, Decimal> = HashMap::new();
    for (category, amount) in items {
        let sum = sums.entry(category).or_insert(Decimal::ZERO);
        *sum = sum.saturating_add(amount);
    }
    let whole = saturating_sum(sums.values().copied());
    let mut totals: Vec<CategoryTotal> = sums
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category,
            total,
            percentage: percentage(total, whole),
        })
        .collect();
    totals.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.category.as_str().cmp(b.category.as_str()))
    });
    totals
}

/// Expense totals per category over a transaction set
pub fn expense_by_category<'a, I>(transactions: I) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    category_totals(
        transactions
            .into_iter()
            .filter(|t| t.is_expense())
            .map(|t| (t.category, t.amount)),
    )
}

/// Expense category with the largest total
pub fn top_expense_category<'a, I>(transactions: I) -> Option<Category>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    expense_by_category(transactions).first().map(|c| c.category)
}

/// Snapshot one month's transactions into a closing
pub fn build_monthly_report(
    id: String,
    month: MonthKey,
    transactions: &[&Transaction],
    archived_at: DateTime<Utc>,
) -> MonthlyReport {
    let summary = BalanceSummary::from_transactions(transactions.iter().copied());
    MonthlyReport {
        id,
        month_key: month,
        month_name: month.display_name(),
        total_income: summary.total_income,
        total_expense: summary.total_expense,
        balance: summary.total_balance,
        top_category: top_expense_category(transactions.iter().copied()),
        archived_at,
    }
}

// ==================== Annual rollup ====================

/// One calendar month of the annual view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualMonth {
    pub month: MonthKey,
    /// Short label for charts ("Jan", "Fev", ...)
    pub label: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
    /// Running balance from January through this month
    pub cumulative: Decimal,
    pub closed: bool,
}

/// A month singled out as best or worst
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthHighlight {
    pub month: MonthKey,
    pub month_name: String,
    pub balance: Decimal,
}

impl From<&MonthlyReport> for MonthHighlight {
    fn from(r: &MonthlyReport) -> Self {
        Self {
            month: r.month_key,
            month_name: r.month_name.clone(),
            balance: r.balance,
        }
    }
}

/// Rollup of one year's closings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualSummary {
    pub year: i32,
    /// Always twelve entries, January first
    pub months: Vec<AnnualMonth>,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
    pub best_month: Option<MonthHighlight>,
    pub worst_month: Option<MonthHighlight>,
    /// Most frequent dominant category across the closings
    pub top_category: Option<Category>,
    pub closed_months: usize,
    /// Balance as a percentage of income, one decimal; income 0 counts as 1
    pub savings_rate: Decimal,
}

/// `balance / income * 100`, treating zero income as 1
pub fn savings_rate(balance: Decimal, income: Decimal) -> Decimal {
    let base = if income.is_zero() { Decimal::ONE } else { income };
    balance
        .checked_div(base)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|rate| rate.round_dp(1))
        .unwrap_or(Decimal::ZERO)
}

/// Build the annual rollup for `year`
///
/// Best and worst month ties go to the earlier month. Category frequency
/// ties go to the smallest category key.
pub fn annual_summary(reports: &[MonthlyReport], year: i32) -> AnnualSummary {
    let mut year_reports: Vec<&MonthlyReport> =
        reports.iter().filter(|r| r.month_key.year == year).collect();
    year_reports.sort_by_key(|r| r.month_key);

    let mut cumulative = Decimal::ZERO;
    let months: Vec<AnnualMonth> = (1..=12)
        .filter_map(|m| MonthKey::new(year, m))
        .map(|month| {
            let report = year_reports.iter().find(|r| r.month_key == month);
            let (income, expense, balance) = report
                .map(|r| (r.total_income, r.total_expense, r.balance))
                .unwrap_or_default();
            cumulative = cumulative.saturating_add(balance);
            AnnualMonth {
                month,
                label: month_abbrev(month.month),
                income,
                expense,
                balance,
                cumulative,
                closed: report.is_some(),
            }
        })
        .collect();

    let mut best: Option<&MonthlyReport> = None;
    let mut worst: Option<&MonthlyReport> = None;
    for r in year_reports.iter().copied() {
        if best.map(|b| r.balance > b.balance).unwrap_or(true) {
            best = Some(r);
        }
        if worst.map(|w| r.balance < w.balance).unwrap_or(true) {
            worst = Some(r);
        }
    }

    let mut frequency: HashMap<Category, usize> = HashMap::new();
    for category in year_reports.iter().filter_map(|r| r.top_category) {
        *frequency.entry(category).or_insert(0) += 1;
    }
    let top_category = frequency
        .into_iter()
        .max_by(|(ca, na), (cb, nb)| na.cmp(nb).then_with(|| cb.as_str().cmp(ca.as_str())))
        .map(|(c, _)| c);

    let total_income = saturating_sum(months.iter().map(|m| m.income));
    let balance = saturating_sum(months.iter().map(|m| m.balance));
    AnnualSummary {
        year,
        total_income,
        total_expense: saturating_sum(months.iter().map(|m| m.expense)),
        balance,
        savings_rate: savings_rate(balance, total_income),
        months,
        best_month: best.map(MonthHighlight::from),
        worst_month: worst.map(MonthHighlight::from),
        top_category,
        closed_months: year_reports.len(),
    }
}

/// Years with closings, newest first; the current year when there are none
pub fn available_years(reports: &[MonthlyReport], today: NaiveDate) -> Vec<i32> {
    let mut years: Vec<i32> = reports.iter().map(|r| r.month_key.year).collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    if years.is_empty() {
        years.push(today.year());
    }
    years
}

// ==================== History view ====================

/// Selection for the history view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryQuery {
    /// Defaults to the newest available year
    pub year: Option<i32>,
    pub category: Option<Category>,
    /// 1-based; clamped to the available pages
    pub page: usize,
}

/// Fixed expenses as a whole, with per-category shares
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedSummary {
    pub total: Decimal,
    pub distribution: Vec<CategoryTotal>,
}

pub fn fixed_summary(fixed: &[FixedExpense]) -> FixedSummary {
    FixedSummary {
        total: saturating_sum(fixed.iter().map(|e| e.amount)),
        distribution: category_totals(fixed.iter().map(|e| (e.category, e.amount))),
    }
}

/// Everything the history view shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryView {
    pub years: Vec<i32>,
    pub year: i32,
    pub category: Option<Category>,
    /// Dominant categories present across all closings, by key
    pub categories: Vec<Category>,
    /// Closings on the current page, newest month first
    pub reports: Vec<MonthlyReport>,
    /// Every closing matching the year and category, for export
    pub matching: usize,
    pub page: usize,
    pub total_pages: usize,
    /// Totals over the selected year regardless of category filter
    pub year_totals: BalanceSummary,
    pub fixed: FixedSummary,
    pub upcoming: Vec<UpcomingExpense>,
}

/// Closings matching a year and optional dominant category, newest first
pub fn filter_reports<'a>(
    reports: &'a [MonthlyReport],
    year: i32,
    category: Option<Category>,
) -> Vec<&'a MonthlyReport> {
    let mut matching: Vec<&MonthlyReport> = reports
        .iter()
        .filter(|r| r.month_key.year == year)
        .filter(|r| category.map(|c| r.top_category == Some(c)).unwrap_or(true))
        .collect();
    matching.sort_by(|a, b| b.month_key.cmp(&a.month_key));
    matching
}

pub fn history_view(
    reports: &[MonthlyReport],
    fixed: &[FixedExpense],
    query: &HistoryQuery,
    today: NaiveDate,
    page_size: usize,
    upcoming_limit: usize,
) -> HistoryView {
    let years = available_years(reports, today);
    let year = query
        .year
        .filter(|y| years.contains(y))
        .unwrap_or(years[0]);

    let mut categories: Vec<Category> = reports.iter().filter_map(|r| r.top_category).collect();
    categories.sort_by_key(|c| c.as_str());
    categories.dedup();

    let matching = filter_reports(reports, year, query.category);
    let page_size = page_size.max(1);
    let total_pages = matching.len().div_ceil(page_size).max(1);
    let page = query.page.clamp(1, total_pages);
    let page_reports = matching
        .iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .map(|r| (*r).clone())
        .collect();

    let mut year_totals = BalanceSummary::default();
    for r in reports.iter().filter(|r| r.month_key.year == year) {
        year_totals.total_income = year_totals.total_income.saturating_add(r.total_income);
        year_totals.total_expense = year_totals.total_expense.saturating_add(r.total_expense);
        year_totals.total_balance = year_totals.total_balance.saturating_add(r.balance);
    }

    HistoryView {
        years,
        year,
        category: query.category,
        categories,
        reports: page_reports,
        matching: matching.len(),
        page,
        total_pages,
        year_totals,
        fixed: fixed_summary(fixed),
        upcoming: upcoming(fixed, today, upcoming_limit),
    }
}

// ==================== Dashboard ====================

/// Monthly goal progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub goal: Decimal,
    pub spent: Decimal,
    /// Capped at 100
    pub percent: Decimal,
    pub over: bool,
}

/// Progress toward a spending goal; `None` when no goal is set
pub fn goal_progress(spent: Decimal, goal: Decimal) -> Option<GoalProgress> {
    if goal <= Decimal::ZERO {
        return None;
    }
    Some(GoalProgress {
        goal,
        spent,
        percent: percentage(spent, goal).min(Decimal::ONE_HUNDRED),
        over: spent > goal,
    })
}

/// True when spending moved from at-or-under the goal to over it
pub fn goal_crossed(before: Decimal, after: Decimal, goal: Decimal) -> bool {
    goal > Decimal::ZERO && before <= goal && after > goal
}

/// Everything the dashboard shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub summary: BalanceSummary,
    /// Newest first
    pub recent: Vec<Transaction>,
    pub expense_by_category: Vec<ChartDataPoint>,
    /// Largest first
    pub fixed_bars: Vec<ChartDataPoint>,
    pub fixed_total: Decimal,
    pub cash_flow: Vec<ChartDataPoint>,
    pub goal: Option<GoalProgress>,
}

/// Transactions sorted newest first; equal dates keep insertion order reversed
pub fn newest_first(transactions: &[Transaction]) -> Vec<&Transaction> {
    let mut sorted: Vec<(usize, &Transaction)> = transactions.iter().enumerate().collect();
    sorted.sort_by(|(ia, a), (ib, b)| b.date.cmp(&a.date).then_with(|| ib.cmp(ia)));
    sorted.into_iter().map(|(_, t)| t).collect()
}

pub fn dashboard(
    transactions: &[Transaction],
    fixed: &[FixedExpense],
    goal: Decimal,
    recent_count: usize,
    palette: &CategoryPalette,
) -> Dashboard {
    let summary = BalanceSummary::from_transactions(transactions);

    let recent = newest_first(transactions)
        .into_iter()
        .take(recent_count)
        .cloned()
        .collect();

    let expense_by_category = expense_by_category(transactions)
        .into_iter()
        .map(|c| ChartDataPoint {
            label: c.category.label().to_string(),
            value: c.total,
            color: palette.color(c.category).to_string(),
        })
        .collect();

    let mut fixed_sorted: Vec<&FixedExpense> = fixed.iter().collect();
    fixed_sorted.sort_by(|a, b| b.amount.cmp(&a.amount));
    let fixed_bars = fixed_sorted
        .into_iter()
        .map(|e| ChartDataPoint {
            label: e.description.clone(),
            value: e.amount,
            color: palette.color(e.category).to_string(),
        })
        .collect();

    let cash_flow = vec![
        ChartDataPoint {
            label: TransactionType::Income.label().to_string(),
            value: summary.total_income,
            color: "#10b981".to_string(),
        },
        ChartDataPoint {
            label: TransactionType::Expense.label().to_string(),
            value: summary.total_expense,
            color: "#ef4444".to_string(),
        },
    ];

    Dashboard {
        summary,
        recent,
        expense_by_category,
        fixed_bars,
        fixed_total: saturating_sum(fixed.iter().map(|e| e.amount)),
        cash_flow,
        goal: goal_progress(summary.total_expense, goal),
    }
}
