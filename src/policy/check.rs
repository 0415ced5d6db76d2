// 🚦 Pre-Commit Check - should this expense be recorded?
//
// Steps run in a fixed order and each can reject:
//   1. category limit   (prompt, overridable)
//   2. unwanted + block (no prompt, never overridable)
//   3. monthly budget   (prompt, overridable)
//
// The check only reads. Prompts go through the caller's `Confirm`, so the
// engine never talks to a terminal or a window itself.

use super::config::PolicyConfig;
use crate::db::RecordStore;
use crate::error::{Result, TrackerError};
use crate::expense::{Category, YearMonth};
use crate::money::Money;
use chrono::NaiveDate;
use std::fmt;
use tracing::{debug, warn};

/// An expense that has passed input validation but is not stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedExpense {
    pub amount: Money,
    pub category: Category,
    pub date: NaiveDate,
}

impl ProposedExpense {
    pub fn month(&self) -> YearMonth {
        YearMonth::of(self.date)
    }
}

// ============================================================================
// PROMPTS
// ============================================================================

/// A yes/no question put to the user while checking an expense.
///
/// The answer keeps the polarity of each question as asked:
/// - `CategoryLimit` asks "cancel this expense?", so **yes rejects**
/// - `Budget` asks "add anyway?", so **no rejects**
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    CategoryLimit {
        category: Category,
        amount: Money,
        limit: Money,
        spent: Money,
    },
    Budget {
        amount: Money,
        budget: Money,
        spent: Money,
    },
}

impl Prompt {
    pub fn title(&self) -> &'static str {
        match self {
            Prompt::CategoryLimit { .. } => "Category limit exceeded",
            Prompt::Budget { .. } => "Budget exceeded",
        }
    }

    pub fn question(&self) -> String {
        match self {
            Prompt::CategoryLimit { category, amount, limit, .. } => format!(
                "Adding {} will exceed the limit for '{}' (limit {}).\nDo you want to CANCEL this expense?",
                amount, category, limit
            ),
            Prompt::Budget { budget, spent, .. } => format!(
                "This expense will make monthly spend exceed budget (Budget {}).\nSpent now: {}.\nAdd anyway?",
                budget, spent
            ),
        }
    }

    /// True when answering "yes" rejects the expense
    pub fn yes_rejects(&self) -> bool {
        matches!(self, Prompt::CategoryLimit { .. })
    }

    /// Whether a given answer rejects the expense
    pub fn rejects_on(&self, answer: bool) -> bool {
        answer == self.yes_rejects()
    }

    /// How far past the limit/budget the expense would go
    pub fn overshoot(&self) -> Money {
        match self {
            Prompt::CategoryLimit { amount, limit, spent, .. } => (*spent + *amount).saturating_excess_over(*limit),
            Prompt::Budget { amount, budget, spent } => (*spent + *amount).saturating_excess_over(*budget),
        }
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title(), self.question())
    }
}

/// Answers prompts raised by the pre-commit check
pub trait Confirm {
    /// The user's literal yes (`true`) / no (`false`) to `prompt.question()`
    fn confirm(&mut self, prompt: &Prompt) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&Prompt) -> bool,
{
    fn confirm(&mut self, prompt: &Prompt) -> bool {
        self(prompt)
    }
}

/// Always answers so that the expense goes ahead
#[derive(Debug, Clone, Copy, Default)]
pub struct Proceed;

impl Confirm for Proceed {
    fn confirm(&mut self, prompt: &Prompt) -> bool {
        !prompt.yes_rejects()
    }
}

/// Always answers so that the expense is dropped
#[derive(Debug, Clone, Copy, Default)]
pub struct Decline;

impl Confirm for Decline {
    fn confirm(&mut self, prompt: &Prompt) -> bool {
        prompt.yes_rejects()
    }
}

// ============================================================================
// DECISION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// User chose to cancel at the category limit prompt
    CategoryLimitDeclined,
    /// Category is unwanted and block mode is on
    BlockedUnwanted,
    /// User chose not to add at the budget prompt
    BudgetDeclined,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::CategoryLimitDeclined => write!(f, "cancelled at category limit"),
            RejectReason::BlockedUnwanted => {
                write!(f, "category is marked as UNWANTED and block mode is ON")
            }
            RejectReason::BudgetDeclined => write!(f, "cancelled at monthly budget"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// `overrides` lists the prompts the user chose to go past; non-empty
    /// means allowed with warning
    Allow { overrides: Vec<Prompt> },
    Reject(RejectReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }

    pub fn has_warnings(&self) -> bool {
        matches!(self, Decision::Allow { overrides } if !overrides.is_empty())
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Decision::Reject(reason) => Some(*reason),
            Decision::Allow { .. } => None,
        }
    }
}

// ============================================================================
// CHECK
// ============================================================================

pub fn check_expense<S, C>(
    store: &S,
    config: &PolicyConfig,
    expense: &ProposedExpense,
    confirm: &mut C,
) -> Result<Decision>
where
    S: RecordStore + ?Sized,
    C: Confirm + ?Sized,
{
    let amount = expense.amount.expense_amount()?;
    let category = expense.category.canonical()?;
    let month = expense.month();
    let mut overrides = Vec::new();

    // 1) per-category limit
    if let Some(limit) = config.category_limit(&category) {
        let spent = store.sum_expenses(month, Some(&category))?;
        if total_with(spent, amount)? > limit {
            let prompt = Prompt::CategoryLimit {
                category: category.clone(),
                amount,
                limit,
                spent,
            };
            let answer = confirm.confirm(&prompt);
            if prompt.rejects_on(answer) {
                warn!(%category, %limit, "rejected at category limit");
                return Ok(Decision::Reject(RejectReason::CategoryLimitDeclined));
            }
            debug!(%category, "category limit overridden");
            overrides.push(prompt);
        }
    }

    // 2) unwanted category & block mode
    if config.is_blocked(&category) {
        warn!(%category, "blocked unwanted category");
        return Ok(Decision::Reject(RejectReason::BlockedUnwanted));
    }

    // 3) monthly budget
    if let Some(budget) = config.monthly_budget {
        let spent = store.sum_expenses(month, None)?;
        if total_with(spent, amount)? > budget {
            let prompt = Prompt::Budget {
                amount,
                budget,
                spent,
            };
            let answer = confirm.confirm(&prompt);
            if prompt.rejects_on(answer) {
                warn!(%budget, %spent, "rejected at monthly budget");
                return Ok(Decision::Reject(RejectReason::BudgetDeclined));
            }
            debug!("monthly budget overridden");
            overrides.push(prompt);
        }
    }

    Ok(Decision::Allow { overrides })
}

/// Month spend after adding `amount`; overflow is an invalid amount, never a wrap
fn total_with(spent: Money, amount: Money) -> Result<Money> {
    spent.checked_add(amount).ok_or_else(|| {
        TrackerError::InvalidAmount(format!("{} on top of {} already spent is out of range", amount, spent))
    })
}
