//! Fixed-expense projection and materialization

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{FixedExpense, GeneratedMonth, MonthKey, MonthlyReport, Transaction};
use crate::types::TransactionType;

/// How close a due date is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Critical,
    Warning,
    Normal,
}

impl Urgency {
    pub fn from_days(days: i64) -> Self {
        if days <= 3 {
            Urgency::Critical
        } else if days <= 7 {
            Urgency::Warning
        } else {
            Urgency::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Critical => "critical",
            Urgency::Warning => "warning",
            Urgency::Normal => "normal",
        }
    }
}

/// A fixed expense with its next due date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingExpense {
    pub expense: FixedExpense,
    pub due_date: NaiveDate,
    pub days_until: i64,
    pub urgency: Urgency,
}

impl UpcomingExpense {
    /// "Hoje", "Amanhã" or "Restam N d"
    pub fn label(&self) -> String {
        match self.days_until {
            0 => "Hoje".to_string(),
            1 => "Amanhã".to_string(),
            n => format!("Restam {} d", n),
        }
    }
}

/// Earliest date on or after `today` whose day of month is `day`
///
/// Months that do not have `day` are skipped. `None` when `day` is outside
/// 1..=31.
pub fn next_occurrence(day: u32, today: NaiveDate) -> Option<NaiveDate> {
    if !(1..=31).contains(&day) {
        return None;
    }
    let mut month = MonthKey::from_date(today);
    // Any day 1..=31 occurs within the next few months
    for _ in 0..4 {
        if let Some(date) = month.day(day) {
            if date >= today {
                return Some(date);
            }
        }
        month = month.next();
    }
    None
}

/// Project every fixed expense and keep the `limit` soonest
pub fn upcoming(expenses: &[FixedExpense], today: NaiveDate, limit: usize) -> Vec<UpcomingExpense> {
    let mut projected: Vec<UpcomingExpense> = expenses
        .iter()
        .filter_map(|e| {
            let due_date = next_occurrence(e.day_of_month, today)?;
            let days_until = (due_date - today).num_days();
            Some(UpcomingExpense {
                expense: e.clone(),
                due_date,
                days_until,
                urgency: Urgency::from_days(days_until),
            })
        })
        .collect();
    projected.sort_by(|a, b| a.due_date.cmp(&b.due_date));
    projected.truncate(limit);
    projected
}

/// Due date of `day` in `month`, clamped to the month's last day
pub fn due_date_in_month(day: u32, month: MonthKey) -> NaiveDate {
    month
        .day(day.min(month.days_in_month()).max(1))
        .unwrap_or_else(|| month.last_day())
}

/// Transactions that fixed expenses owe for the current month
///
/// A fixed expense owes one transaction per month once its (clamped) due
/// day has been reached. `generated` records the months already produced,
/// so deleting a generated transaction does not bring it back. Linked
/// transactions in the month also count, for ledgers saved before the
/// record existed. Months that already have a closing are left alone.
/// `new_id` supplies identifiers for the generated transactions.
pub fn materialize(
    fixed: &[FixedExpense],
    generated: &[GeneratedMonth],
    transactions: &[Transaction],
    reports: &[MonthlyReport],
    today: NaiveDate,
    mut new_id: impl FnMut() -> String,
) -> Vec<Transaction> {
    let month = MonthKey::from_date(today);
    if reports.iter().any(|r| r.month_key == month) {
        return Vec::new();
    }

    fixed
        .iter()
        .filter(|e| {
            let due = due_date_in_month(e.day_of_month, month);
            let recorded = generated
                .iter()
                .any(|g| g.fixed_expense_id == e.id && g.month == month);
            let linked = transactions.iter().any(|t| {
                t.fixed_expense_id.as_deref() == Some(e.id.as_str()) && month.contains(t.date)
            });
            due <= today && !recorded && !linked
        })
        .map(|e| Transaction {
            id: new_id(),
            description: e.description.clone(),
            amount: e.amount,
            kind: TransactionType::Expense,
            category: e.category,
            date: due_date_in_month(e.day_of_month, month),
            observations: None,
            is_fixed: true,
            fixed_expense_id: Some(e.id.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;
    use chrono::Datelike;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixed(id: &str, day: u32) -> FixedExpense {
        FixedExpense {
            id: id.to_string(),
            description: format!("Conta {}", id),
            amount: Decimal::from(100),
            category: Category::Bills,
            day_of_month: day,
        }
    }

    #[test]
    fn test_day_passed_projects_next_month() {
        let today = date(2024, 5, 10);
        let next = next_occurrence(5, today).unwrap();
        assert_eq!(next, date(2024, 6, 5));

        let up = upcoming(&[fixed("a", 5)], today, 5);
        assert_eq!(up[0].days_until, 26);
        assert_eq!(up[0].urgency, Urgency::Normal);
    }

    #[test]
    fn test_same_day_is_today() {
        let today = date(2024, 5, 10);
        let up = upcoming(&[fixed("a", 10)], today, 5);
        assert_eq!(up[0].due_date, today);
        assert_eq!(up[0].label(), "Hoje");
        assert_eq!(up[0].urgency, Urgency::Critical);
    }

    #[test]
    fn test_skips_months_without_the_day() {
        // 31 after Jan 31 is not in February
        assert_eq!(next_occurrence(31, date(2024, 2, 1)), Some(date(2024, 3, 31)));
        assert_eq!(next_occurrence(30, date(2023, 2, 10)), Some(date(2023, 3, 30)));
        assert_eq!(next_occurrence(29, date(2024, 2, 29)), Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_projection_property() {
        let start = date(2024, 1, 1);
        for offset in 0..400 {
            let today = start + chrono::Duration::days(offset);
            for day in 1..=31 {
                let next = next_occurrence(day, today).unwrap();
                assert_eq!(next.day(), day);
                assert!(next >= today);
                let mut probe = today;
                while probe < next {
                    assert_ne!(probe.day(), day);
                    probe = probe.succ_opt().unwrap();
                }
            }
        }
    }

    #[test]
    fn test_invalid_day() {
        assert_eq!(next_occurrence(0, date(2024, 1, 1)), None);
        assert_eq!(next_occurrence(32, date(2024, 1, 1)), None);
    }

    #[test]
    fn test_urgency_thresholds_and_labels() {
        assert_eq!(Urgency::from_days(3), Urgency::Critical);
        assert_eq!(Urgency::from_days(4), Urgency::Warning);
        assert_eq!(Urgency::from_days(7), Urgency::Warning);
        assert_eq!(Urgency::from_days(8), Urgency::Normal);

        let today = date(2024, 5, 10);
        let up = upcoming(&[fixed("a", 11), fixed("b", 14)], today, 5);
        assert_eq!(up[0].label(), "Amanhã");
        assert_eq!(up[1].label(), "Restam 4 d");
    }

    #[test]
    fn test_upcoming_sorted_and_truncated() {
        let today = date(2024, 5, 10);
        let expenses: Vec<FixedExpense> = [1, 20, 12, 5, 15, 11, 28]
            .iter()
            .map(|d| fixed(&d.to_string(), *d))
            .collect();
        let up = upcoming(&expenses, today, 5);
        assert_eq!(up.len(), 5);
        let days: Vec<u32> = up.iter().map(|u| u.expense.day_of_month).collect();
        assert_eq!(days, vec![11, 12, 15, 20, 28]);
    }

    #[test]
    fn test_due_date_clamps_to_month_end() {
        let feb = MonthKey::new(2023, 2).unwrap();
        assert_eq!(due_date_in_month(31, feb), date(2023, 2, 28));
        assert_eq!(due_date_in_month(5, feb), date(2023, 2, 5));
    }

    #[test]
    fn test_materialize_is_idempotent() {
        let today = date(2024, 5, 10);
        let expenses = vec![fixed("due", 5), fixed("later", 20)];
        let mut counter = 0;
        let mut ids = || {
            counter += 1;
            format!("gen-{}", counter)
        };

        let first = materialize(&expenses, &[], &[], &[], today, &mut ids);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].date, date(2024, 5, 5));
        assert!(first[0].is_fixed);
        assert_eq!(first[0].fixed_expense_id.as_deref(), Some("due"));

        let second = materialize(&expenses, &[], &first, &[], today, &mut ids);
        assert!(second.is_empty());
    }

    #[test]
    fn test_materialize_respects_generated_record() {
        let today = date(2024, 5, 10);
        let record = GeneratedMonth {
            fixed_expense_id: "due".to_string(),
            month: MonthKey::new(2024, 5).unwrap(),
        };
        // The transaction itself was deleted, only the record remains
        let again = materialize(&[fixed("due", 5)], &[record.clone()], &[], &[], today, || {
            "x".to_string()
        });
        assert!(again.is_empty());

        // Next month is owed again
        let june = materialize(&[fixed("due", 5)], &[record], &[], &[], date(2024, 6, 5), || {
            "x".to_string()
        });
        assert_eq!(june.len(), 1);
    }

    #[test]
    fn test_materialize_skips_closed_month() {
        let today = date(2024, 5, 10);
        let report = MonthlyReport {
            id: "r".to_string(),
            month_key: MonthKey::new(2024, 5).unwrap(),
            month_name: "Maio de 2024".to_string(),
            total_income: Decimal::ZERO,
            total_expense: Decimal::ZERO,
            balance: Decimal::ZERO,
            top_category: None,
            archived_at: chrono::Utc::now(),
        };
        let generated =
            materialize(&[fixed("a", 1)], &[], &[], &[report], today, || "x".to_string());
        assert!(generated.is_empty());
    }
}
