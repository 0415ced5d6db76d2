// 📊 Reports - data behind the budget bar, the category pie and the trend line
//
// Rendering is left to the caller (TUI, CLI table, whatever); these functions
// only shape numbers out of the record store.

use crate::db::RecordStore;
use crate::error::Result;
use crate::expense::{Category, YearMonth};
use crate::money::Money;
use crate::policy::config::monthly_budget;
use serde::Serialize;

/// Budget vs. spend for one month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub month: String,
    /// Zero when no budget is set
    pub budget: Money,
    pub spent: Money,
    /// `max(0, budget - spent)`
    pub savings: Money,
    /// Share of the budget used, clamped to 0-100; 0 without a budget
    pub percent_used: f64,
}

impl BudgetStatus {
    pub fn has_budget(&self) -> bool {
        self.budget.is_positive()
    }

    pub fn summary(&self) -> String {
        format!(
            "Budget: {} | Spent: {} | Savings: {}",
            self.budget.whole_units(),
            self.spent.whole_units(),
            self.savings.whole_units()
        )
    }
}

pub fn budget_status<S: RecordStore + ?Sized>(store: &S, month: YearMonth) -> Result<BudgetStatus> {
    let budget = monthly_budget(store)?.unwrap_or(Money::ZERO);
    let spent = store.sum_expenses(month, None)?;

    let percent_used = if budget.is_positive() {
        (spent.as_f64() / budget.as_f64() * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    Ok(BudgetStatus {
        month: month.to_string(),
        budget,
        spent,
        savings: budget.saturating_excess_over(spent),
        percent_used,
    })
}

/// One slice of the category pie
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: Category,
    pub total: Money,
    pub percent: f64,
}

/// Per-category spend for a month, largest first. Empty month, empty list.
pub fn category_breakdown<S: RecordStore + ?Sized>(store: &S, month: YearMonth) -> Result<Vec<CategoryShare>> {
    let totals = store.category_totals(month)?;
    let grand_total: Money = totals.iter().map(|(_, total)| *total).sum();

    Ok(totals
        .into_iter()
        .map(|(category, total)| CategoryShare {
            percent: if grand_total.is_positive() {
                total.as_f64() / grand_total.as_f64() * 100.0
            } else {
                0.0
            },
            category,
            total,
        })
        .collect())
}

/// Totals of the last `months` months that have expenses, oldest first
pub fn monthly_trend<S: RecordStore + ?Sized>(store: &S, months: usize) -> Result<Vec<(YearMonth, Money)>> {
    let mut totals = store.monthly_totals(months)?;
    totals.reverse();
    Ok(totals)
}
