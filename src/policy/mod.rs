// 🛡️ Policy Engine - budget & category-limit enforcement, projections, advice
//
// Every call reads fresh state from the record store. Input validation
// (amount, category, date) always happens before the first store query.

pub mod advice;
pub mod check;
pub mod config;
pub mod projection;

pub use advice::{build_suggestions, overshoot, Suggestion, DEFAULT_CURRENCY_SYMBOL, TOP_CATEGORIES};
pub use check::{check_expense, Confirm, Decision, Decline, Proceed, Prompt, ProposedExpense, RejectReason};
pub use config::PolicyConfig;
pub use projection::project_month_end;

use crate::db::RecordStore;
use crate::error::Result;
use crate::expense::{parse_date, Category, NewExpense, YearMonth};
use crate::money::Money;
use chrono::{Local, NaiveDate};
use tracing::{debug, info};

/// Outcome of `submit_expense`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Committed { id: i64, overrides: Vec<Prompt> },
    Rejected(RejectReason),
}

pub struct PolicyEngine<'s, S: RecordStore + ?Sized> {
    store: &'s S,
    today: NaiveDate,
    currency: String,
}

impl<'s, S: RecordStore + ?Sized> PolicyEngine<'s, S> {
    /// Engine over `store`, with "today" taken from the local clock
    pub fn new(store: &'s S) -> Self {
        PolicyEngine {
            store,
            today: Local::now().date_naive(),
            currency: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }

    /// Pin "today" (decides which month is the current one for projections)
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn with_currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency = symbol.into();
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn current_month(&self) -> YearMonth {
        YearMonth::of(self.today)
    }

    pub fn store(&self) -> &'s S {
        self.store
    }

    pub fn config(&self) -> Result<PolicyConfig> {
        PolicyConfig::load(self.store)
    }

    // ========================================================================
    // PRE-COMMIT CHECK
    // ========================================================================

    /// Decide whether an expense may be recorded. Does not write anything.
    ///
    /// Fails with `InvalidAmount` / `InvalidCategory` / `InvalidDate` before
    /// touching the store.
    pub fn evaluate_proposed_expense<C: Confirm + ?Sized>(
        &self,
        amount: Money,
        category: &Category,
        date: &str,
        confirm: &mut C,
    ) -> Result<Decision> {
        let proposed = validate_proposal(amount, category, date)?;
        let config = self.config()?;
        check_expense(self.store, &config, &proposed, confirm)
    }

    /// Run the pre-commit check and, when allowed, store the expense
    ///
    /// `NewExpense` fields are public, so amount and category are validated
    /// again here and the canonical category is what gets stored.
    pub fn submit_expense<C: Confirm + ?Sized>(&self, expense: &NewExpense, confirm: &mut C) -> Result<Submission> {
        let expense = NewExpense {
            amount: expense.amount.expense_amount()?,
            category: expense.category.canonical()?,
            description: expense.description.clone(),
            date: expense.date,
        };
        let proposed = ProposedExpense {
            amount: expense.amount,
            category: expense.category.clone(),
            date: expense.date,
        };

        let config = self.config()?;
        match check_expense(self.store, &config, &proposed, confirm)? {
            Decision::Allow { overrides } => {
                let id = self.store.insert_expense(&expense)?;
                info!(id, overrides = overrides.len(), "expense committed");
                Ok(Submission::Committed { id, overrides })
            }
            Decision::Reject(reason) => Ok(Submission::Rejected(reason)),
        }
    }

    // ========================================================================
    // MONTH AGGREGATES
    // ========================================================================

    pub fn month_total(&self, year: i32, month: u32) -> Result<Money> {
        let month = YearMonth::new(year, month)?;
        self.store.sum_expenses(month, None)
    }

    pub fn month_category_total(&self, year: i32, month: u32, category: &Category) -> Result<Money> {
        let month = YearMonth::new(year, month)?;
        self.store.sum_expenses(month, Some(category))
    }

    // ========================================================================
    // PROJECTION & RECOMMENDATIONS
    // ========================================================================

    pub fn projection(&self, year: i32, month: u32) -> Result<Money> {
        let month = YearMonth::new(year, month)?;
        let spent = self.store.sum_expenses(month, None)?;
        let projected = project_month_end(spent, month, self.today);
        debug!(%month, %spent, %projected, "month-end projection");
        Ok(projected)
    }

    /// Ordered suggestions for a month. Any store failure fails the whole list.
    pub fn recommendations(&self, year: i32, month: u32) -> Result<Vec<Suggestion>> {
        let ym = YearMonth::new(year, month)?;
        let config = self.config()?;
        let projected = self.projection(year, month)?;
        let overshoot = overshoot(config.monthly_budget, projected);

        let top_categories = if overshoot.is_positive() {
            self.store.category_totals(ym)?
        } else {
            Vec::new()
        };

        let unwanted_spend = config
            .unwanted_categories
            .iter()
            .map(|category| -> Result<(Category, Money)> {
                Ok((category.clone(), self.store.sum_expenses(ym, Some(category))?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(build_suggestions(overshoot, &top_categories, &unwanted_spend))
    }

    /// `recommendations` rendered with this engine's currency symbol
    pub fn suggestions(&self, year: i32, month: u32) -> Result<Vec<String>> {
        Ok(self
            .recommendations(year, month)?
            .iter()
            .map(|s| s.render(&self.currency))
            .collect())
    }
}

fn validate_proposal(amount: Money, category: &Category, date: &str) -> Result<ProposedExpense> {
    let amount = amount.expense_amount()?;
    let category = category.canonical()?;
    let date = parse_date(date)?;

    Ok(ProposedExpense { amount, category, date })
}

// ============================================================================
// TEST SUPPORT
// ============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use crate::db::{ExpenseFilter, RecordStore, SqliteStore};
    use crate::error::{Result, TrackerError};
    use crate::expense::{Category, Expense, NewExpense, YearMonth};
    use crate::money::Money;
    use std::cell::Cell;

    /// SQLite store that counts every call and can be told to start failing
    pub struct CountingStore {
        inner: SqliteStore,
        calls: Cell<usize>,
        fail_after: Cell<Option<usize>>,
    }

    impl CountingStore {
        pub fn new() -> Self {
            CountingStore {
                inner: SqliteStore::open_in_memory().unwrap(),
                calls: Cell::new(0),
                fail_after: Cell::new(None),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.get()
        }

        pub fn reset_calls(&self) {
            self.calls.set(0);
        }

        /// Calls beyond the next `n` return `StoreUnavailable`
        pub fn fail_after(&self, n: usize) {
            self.reset_calls();
            self.fail_after.set(Some(n));
        }

        pub fn add(&self, cents: i64, category: Category, date: &str) {
            let expense = NewExpense::new(Money::from_cents(cents), category, None, date).unwrap();
            self.inner.insert_expense(&expense).unwrap();
        }

        fn tick(&self) -> Result<()> {
            let n = self.calls.get() + 1;
            self.calls.set(n);
            match self.fail_after.get() {
                Some(limit) if n > limit => Err(TrackerError::StoreUnavailable("disk unplugged".to_string())),
                _ => Ok(()),
            }
        }
    }

    impl RecordStore for CountingStore {
        fn insert_expense(&self, expense: &NewExpense) -> Result<i64> {
            self.tick()?;
            self.inner.insert_expense(expense)
        }

        fn delete_expense(&self, id: i64) -> Result<bool> {
            self.tick()?;
            self.inner.delete_expense(id)
        }

        fn query_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
            self.tick()?;
            self.inner.query_expenses(filter)
        }

        fn sum_expenses(&self, month: YearMonth, category: Option<&Category>) -> Result<Money> {
            self.tick()?;
            self.inner.sum_expenses(month, category)
        }

        fn category_totals(&self, month: YearMonth) -> Result<Vec<(Category, Money)>> {
            self.tick()?;
            self.inner.category_totals(month)
        }

        fn monthly_totals(&self, limit: usize) -> Result<Vec<(YearMonth, Money)>> {
            self.tick()?;
            self.inner.monthly_totals(limit)
        }

        fn get_setting(&self, key: &str) -> Result<Option<String>> {
            self.tick()?;
            self.inner.get_setting(key)
        }

        fn set_setting(&self, key: &str, value: &str) -> Result<()> {
            self.tick()?;
            self.inner.set_setting(key, value)
        }

        fn remove_setting(&self, key: &str) -> Result<()> {
            self.tick()?;
            self.inner.remove_setting(key)
        }

        fn settings_with_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>> {
            self.tick()?;
            self.inner.settings_with_prefix(prefix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::config::*;
    use super::testing::CountingStore;
    use super::*;
    use crate::db::{ExpenseFilter, SqliteStore};
    use crate::error::TrackerError;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn never_asked(prompt: &Prompt) -> bool {
        panic!("unexpected prompt: {}", prompt);
    }

    // ------------------------------------------------------------------------
    // fail fast
    // ------------------------------------------------------------------------

    #[test]
    fn test_invalid_input_never_reaches_the_store() {
        let store = CountingStore::new();
        let engine = PolicyEngine::new(&store);

        for amount in [Money::ZERO, Money::from_cents(-500)] {
            let err = engine
                .evaluate_proposed_expense(amount, &Category::Food, "2024-03-05", &mut never_asked)
                .unwrap_err();
            assert!(matches!(err, TrackerError::InvalidAmount(_)));
        }

        for date in ["2024-02-30", "05/03/2024", "", "2024-03"] {
            let err = engine
                .evaluate_proposed_expense(Money::from_units(10), &Category::Food, date, &mut never_asked)
                .unwrap_err();
            assert!(matches!(err, TrackerError::InvalidDate(_)), "{date:?} should be invalid");
        }

        let blank = Category::Custom("  ".to_string());
        let err = engine
            .evaluate_proposed_expense(Money::from_units(10), &blank, "2024-03-05", &mut never_asked)
            .unwrap_err();
        assert!(matches!(err, TrackerError::InvalidCategory(_)));

        assert_eq!(store.calls(), 0);
        println!("✅ Fail-fast validation test PASSED");
    }

    #[test]
    fn test_bad_month_numbers_are_invalid_dates() {
        let store = CountingStore::new();
        let engine = PolicyEngine::new(&store);

        assert!(matches!(engine.month_total(2024, 13), Err(TrackerError::InvalidDate(_))));
        assert!(matches!(engine.projection(2024, 0), Err(TrackerError::InvalidDate(_))));
        assert!(matches!(engine.suggestions(2024, 14), Err(TrackerError::InvalidDate(_))));
        assert_eq!(store.calls(), 0);
    }

    // ------------------------------------------------------------------------
    // category limit
    // ------------------------------------------------------------------------

    #[test]
    fn test_category_limit_prompt_yes_cancels() {
        let store = CountingStore::new();
        set_category_limit(&store, &Category::Food, Money::from_units(1000)).unwrap();
        store.add(800_00, Category::Food, "2024-03-02");
        let engine = PolicyEngine::new(&store);

        let mut seen = Vec::new();
        let decision = engine
            .evaluate_proposed_expense(Money::from_units(300), &Category::Food, "2024-03-20", &mut |p: &Prompt| {
                seen.push(p.clone());
                true
            })
            .unwrap();

        assert_eq!(decision, Decision::Reject(RejectReason::CategoryLimitDeclined));
        assert_eq!(
            seen,
            vec![Prompt::CategoryLimit {
                category: Category::Food,
                amount: Money::from_units(300),
                limit: Money::from_units(1000),
                spent: Money::from_units(800),
            }]
        );
    }

    #[test]
    fn test_category_limit_prompt_no_continues() {
        let store = CountingStore::new();
        set_category_limit(&store, &Category::Food, Money::from_units(1000)).unwrap();
        store.add(800_00, Category::Food, "2024-03-02");
        let engine = PolicyEngine::new(&store);

        let decision = engine
            .evaluate_proposed_expense(Money::from_units(300), &Category::Food, "2024-03-20", &mut |_: &Prompt| false)
            .unwrap();

        assert!(decision.is_allowed());
        assert!(decision.has_warnings());
    }

    #[test]
    fn test_limit_only_counts_same_month_and_category() {
        let store = CountingStore::new();
        set_category_limit(&store, &Category::Food, Money::from_units(1000)).unwrap();
        store.add(900_00, Category::Food, "2024-02-28");
        store.add(900_00, Category::Travel, "2024-03-01");
        let engine = PolicyEngine::new(&store);

        let decision = engine
            .evaluate_proposed_expense(Money::from_units(1000), &Category::Food, "2024-03-01", &mut never_asked)
            .unwrap();
        assert_eq!(decision, Decision::Allow { overrides: vec![] });
    }

    #[test]
    fn test_exactly_reaching_limit_does_not_prompt() {
        let store = CountingStore::new();
        set_category_limit(&store, &Category::Food, Money::from_units(1000)).unwrap();
        store.add(700_00, Category::Food, "2024-03-02");
        let engine = PolicyEngine::new(&store);

        let decision = engine
            .evaluate_proposed_expense(Money::from_units(300), &Category::Food, "2024-03-03", &mut never_asked)
            .unwrap();
        assert!(decision.is_allowed());
    }

    // ------------------------------------------------------------------------
    // unwanted + block mode
    // ------------------------------------------------------------------------

    #[test]
    fn test_blocked_unwanted_category_rejects_without_prompt() {
        let store = CountingStore::new();
        mark_category_unwanted(&store, &Category::JunkFood, true).unwrap();
        set_block_mode(&store, true).unwrap();
        let engine = PolicyEngine::new(&store);

        for amount in [Money::from_cents(1), Money::from_units(10_000)] {
            let decision = engine
                .evaluate_proposed_expense(amount, &Category::JunkFood, "2024-03-05", &mut never_asked)
                .unwrap();
            assert_eq!(decision, Decision::Reject(RejectReason::BlockedUnwanted));
        }
        println!("✅ Block mode test PASSED");
    }

    #[test]
    fn test_unwanted_without_block_mode_is_allowed() {
        let store = CountingStore::new();
        mark_category_unwanted(&store, &Category::JunkFood, true).unwrap();
        let engine = PolicyEngine::new(&store);

        let decision = engine
            .evaluate_proposed_expense(Money::from_units(5), &Category::JunkFood, "2024-03-05", &mut never_asked)
            .unwrap();
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_limit_override_still_blocked_by_block_mode() {
        let store = CountingStore::new();
        set_category_limit(&store, &Category::JunkFood, Money::from_units(10)).unwrap();
        mark_category_unwanted(&store, &Category::JunkFood, true).unwrap();
        set_block_mode(&store, true).unwrap();
        let engine = PolicyEngine::new(&store);

        let mut prompts = 0;
        let decision = engine
            .evaluate_proposed_expense(Money::from_units(20), &Category::JunkFood, "2024-03-05", &mut |_: &Prompt| {
                prompts += 1;
                false
            })
            .unwrap();

        // limit prompt comes first, then the block applies regardless
        assert_eq!(prompts, 1);
        assert_eq!(decision, Decision::Reject(RejectReason::BlockedUnwanted));
    }

    // ------------------------------------------------------------------------
    // monthly budget
    // ------------------------------------------------------------------------

    #[test]
    fn test_budget_prompt_no_rejects_yes_allows() {
        let store = CountingStore::new();
        set_monthly_budget(&store, Money::from_units(5000)).unwrap();
        store.add(4900_00, Category::Bills, "2024-03-01");
        let engine = PolicyEngine::new(&store);

        let declined = engine
            .evaluate_proposed_expense(Money::from_units(200), &Category::Food, "2024-03-09", &mut Decline)
            .unwrap();
        assert_eq!(declined, Decision::Reject(RejectReason::BudgetDeclined));

        let accepted = engine
            .evaluate_proposed_expense(Money::from_units(200), &Category::Food, "2024-03-09", &mut |p: &Prompt| {
                assert_eq!(
                    *p,
                    Prompt::Budget {
                        amount: Money::from_units(200),
                        budget: Money::from_units(5000),
                        spent: Money::from_units(4900),
                    }
                );
                true
            })
            .unwrap();
        assert!(accepted.has_warnings());
    }

    #[test]
    fn test_zero_budget_never_prompts() {
        let store = CountingStore::new();
        set_monthly_budget(&store, Money::ZERO).unwrap();
        store.add(1_000_000_00, Category::Bills, "2024-03-01");
        let engine = PolicyEngine::new(&store);

        let decision = engine
            .evaluate_proposed_expense(Money::from_units(1), &Category::Food, "2024-03-09", &mut never_asked)
            .unwrap();
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_both_overrides_are_reported() {
        let store = CountingStore::new();
        set_category_limit(&store, &Category::Travel, Money::from_units(100)).unwrap();
        set_monthly_budget(&store, Money::from_units(100)).unwrap();
        let engine = PolicyEngine::new(&store);

        match engine
            .evaluate_proposed_expense(Money::from_units(150), &Category::Travel, "2024-03-09", &mut Proceed)
            .unwrap()
        {
            Decision::Allow { overrides } => {
                assert_eq!(overrides.len(), 2);
                assert!(matches!(overrides[0], Prompt::CategoryLimit { .. }));
                assert!(matches!(overrides[1], Prompt::Budget { .. }));
            }
            other => panic!("expected allow, got {:?}", other),
        }
    }

    #[test]
    fn test_check_writes_nothing() {
        let store = CountingStore::new();
        set_monthly_budget(&store, Money::from_units(10)).unwrap();
        let engine = PolicyEngine::new(&store);

        engine
            .evaluate_proposed_expense(Money::from_units(50), &Category::Food, "2024-03-09", &mut Proceed)
            .unwrap();
        assert!(store.query_expenses(&ExpenseFilter::all()).unwrap().is_empty());
    }

    #[test]
    fn test_store_failure_aborts_check() {
        let store = CountingStore::new();
        set_monthly_budget(&store, Money::from_units(10)).unwrap();
        store.fail_after(1);
        let engine = PolicyEngine::new(&store);

        let err = engine
            .evaluate_proposed_expense(Money::from_units(50), &Category::Food, "2024-03-09", &mut Proceed)
            .unwrap_err();
        assert!(matches!(err, TrackerError::StoreUnavailable(_)));
    }

    // ------------------------------------------------------------------------
    // submit
    // ------------------------------------------------------------------------

    #[test]
    fn test_submit_commits_only_when_allowed() {
        let store = SqliteStore::open_in_memory().unwrap();
        mark_category_unwanted(&store, &Category::JunkFood, true).unwrap();
        set_block_mode(&store, true).unwrap();
        let engine = PolicyEngine::new(&store);

        let chips = NewExpense::new(Money::from_units(3), Category::JunkFood, Some("chips"), "2024-03-01").unwrap();
        assert_eq!(
            engine.submit_expense(&chips, &mut never_asked).unwrap(),
            Submission::Rejected(RejectReason::BlockedUnwanted)
        );

        let rent = NewExpense::new(Money::from_units(900), Category::Bills, Some("rent"), "2024-03-01").unwrap();
        let committed = engine.submit_expense(&rent, &mut never_asked).unwrap();
        assert!(matches!(committed, Submission::Committed { overrides, .. } if overrides.is_empty()));

        let stored = store.query_expenses(&ExpenseFilter::all()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].category, Category::Bills);
    }

    #[test]
    fn test_builtin_names_spelled_as_custom_are_still_limited_and_blocked() {
        let store = SqliteStore::open_in_memory().unwrap();
        mark_category_unwanted(&store, &Category::JunkFood, true).unwrap();
        set_block_mode(&store, true).unwrap();
        set_category_limit(&store, &Category::Food, Money::from_units(10)).unwrap();
        let engine = PolicyEngine::new(&store);

        let junk_alias = Category::Custom("JunkFood".to_string());
        let decision = engine
            .evaluate_proposed_expense(Money::from_units(5), &junk_alias, "2024-03-05", &mut Decline)
            .unwrap();
        assert_eq!(decision, Decision::Reject(RejectReason::BlockedUnwanted));

        // struct literal skips NewExpense::new
        let sneaky = NewExpense {
            amount: Money::from_units(5),
            category: junk_alias,
            description: None,
            date: day(2024, 3, 5),
        };
        assert_eq!(
            engine.submit_expense(&sneaky, &mut Proceed).unwrap(),
            Submission::Rejected(RejectReason::BlockedUnwanted)
        );
        assert!(store.query_expenses(&ExpenseFilter::all()).unwrap().is_empty());

        let mut seen = Vec::new();
        let decision = engine
            .evaluate_proposed_expense(
                Money::from_units(500),
                &Category::Custom(" Food".to_string()),
                "2024-03-05",
                &mut |p: &Prompt| {
                    seen.push(p.clone());
                    true
                },
            )
            .unwrap();
        assert_eq!(decision, Decision::Reject(RejectReason::CategoryLimitDeclined));
        assert!(matches!(&seen[..], [Prompt::CategoryLimit { category: Category::Food, .. }]));
    }

    #[test]
    fn test_submit_refuses_blank_category() {
        let store = SqliteStore::open_in_memory().unwrap();
        let engine = PolicyEngine::new(&store);

        let blank = NewExpense {
            amount: Money::from_units(5),
            category: Category::Custom(String::new()),
            description: None,
            date: day(2024, 3, 5),
        };
        let err = engine.submit_expense(&blank, &mut never_asked).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidCategory(_)));

        // listing keeps working
        assert!(store.query_expenses(&ExpenseFilter::all()).unwrap().is_empty());
    }

    #[test]
    fn test_oversized_amounts_are_invalid_not_a_panic() {
        let store = CountingStore::new();
        set_monthly_budget(&store, Money::from_units(100)).unwrap();
        store.add(50_00, Category::Food, "2024-03-01");
        store.reset_calls();
        let engine = PolicyEngine::new(&store);

        let huge = "92233720368547758".parse::<Money>().unwrap();
        let err = engine
            .evaluate_proposed_expense(huge, &Category::Food, "2024-03-05", &mut never_asked)
            .unwrap_err();
        assert!(matches!(err, TrackerError::InvalidAmount(_)));
        assert_eq!(store.calls(), 0);

        // a month total already at the edge of the range
        let edge = SqliteStore::open_in_memory().unwrap();
        set_monthly_budget(&edge, Money::from_units(100)).unwrap();
        edge.insert_expense(&NewExpense {
            amount: Money::from_cents(i64::MAX - 5),
            category: Category::Bills,
            description: None,
            date: day(2024, 3, 1),
        })
        .unwrap();
        let err = PolicyEngine::new(&edge)
            .evaluate_proposed_expense(Money::from_units(1), &Category::Food, "2024-03-05", &mut never_asked)
            .unwrap_err();
        assert!(matches!(err, TrackerError::InvalidAmount(_)));
    }

    // ------------------------------------------------------------------------
    // aggregates & projection
    // ------------------------------------------------------------------------

    #[test]
    fn test_month_totals() {
        let store = CountingStore::new();
        store.add(100_00, Category::Food, "2024-03-01");
        store.add(50_25, Category::Food, "2024-03-31");
        store.add(70_00, Category::Travel, "2024-03-15");
        let engine = PolicyEngine::new(&store);

        assert_eq!(engine.month_total(2024, 3).unwrap(), Money::from_cents(220_25));
        assert_eq!(
            engine.month_category_total(2024, 3, &Category::Food).unwrap(),
            Money::from_cents(150_25)
        );
        assert_eq!(engine.month_total(2024, 4).unwrap(), Money::ZERO);
        assert_eq!(
            engine.month_category_total(2024, 4, &Category::Medical).unwrap(),
            Money::ZERO
        );
    }

    #[test]
    fn test_projection_current_and_past_month() {
        let store = CountingStore::new();
        store.add(1500_00, Category::Food, "2024-04-03");
        store.add(800_00, Category::Food, "2024-03-10");

        let engine = PolicyEngine::new(&store).with_today(day(2024, 4, 15));
        // 1500 / 15 * 30
        assert_eq!(engine.projection(2024, 4).unwrap(), Money::from_units(3000));
        // past month: actual total
        assert_eq!(engine.projection(2024, 3).unwrap(), Money::from_units(800));
    }

    #[test]
    fn test_projection_is_idempotent() {
        let store = CountingStore::new();
        store.add(123_45, Category::Food, "2024-04-03");
        let engine = PolicyEngine::new(&store).with_today(day(2024, 4, 7));

        let first = engine.projection(2024, 4).unwrap();
        let second = engine.projection(2024, 4).unwrap();
        assert_eq!(first, second);
        assert_eq!(engine.month_total(2024, 4).unwrap(), Money::from_cents(123_45));
    }

    // ------------------------------------------------------------------------
    // recommendations
    // ------------------------------------------------------------------------

    #[test]
    fn test_recommendations_overshoot_ordering() {
        let store = CountingStore::new();
        set_monthly_budget(&store, Money::from_units(5000)).unwrap();
        store.add(2000_00, Category::Food, "2024-03-02");
        store.add(1500_00, Category::Travel, "2024-03-05");
        store.add(2500_00, Category::Bills, "2024-03-01");
        // March is over, so projected == 6000
        let engine = PolicyEngine::new(&store).with_today(day(2024, 4, 1));

        let recs = engine.recommendations(2024, 3).unwrap();
        assert_eq!(
            recs,
            vec![
                Suggestion::Overshoot { amount: Money::from_units(1000) },
                Suggestion::CutCategory { category: Category::Bills, spent: Money::from_units(2500) },
                Suggestion::CutCategory { category: Category::Food, spent: Money::from_units(2000) },
                Suggestion::CutCategory { category: Category::Travel, spent: Money::from_units(1500) },
            ]
        );
    }

    #[test]
    fn test_recommendations_current_month_overshoot() {
        let store = CountingStore::new();
        set_monthly_budget(&store, Money::from_units(5000)).unwrap();
        store.add(800_00, Category::Food, "2024-04-01");
        store.add(600_00, Category::Travel, "2024-04-02");
        // 1400 by day 7 of 30 -> 6000 projected
        let engine = PolicyEngine::new(&store).with_today(day(2024, 4, 7));

        assert_eq!(engine.projection(2024, 4).unwrap(), Money::from_units(6000));
        let lines = engine.suggestions(2024, 4).unwrap();
        assert_eq!(
            lines,
            vec![
                "Projected overshoot: ₹1000. Try to cut this month by ₹1000.".to_string(),
                "Top: Food — spent ₹800. Consider cutting 20-40% from Food.".to_string(),
                "Top: Travel — spent ₹600. Consider cutting 20-40% from Travel.".to_string(),
            ]
        );
    }

    #[test]
    fn test_recommendations_on_track_with_unwanted_warnings() {
        let store = CountingStore::new();
        mark_category_unwanted(&store, &Category::Cosmetics, true).unwrap();
        mark_category_unwanted(&store, &Category::JunkFood, true).unwrap();
        mark_category_unwanted(&store, &Category::Dress, true).unwrap();
        store.add(40_00, Category::JunkFood, "2024-03-03");
        store.add(60_00, Category::Cosmetics, "2024-03-04");
        let engine = PolicyEngine::new(&store).with_today(day(2024, 3, 10));

        let recs = engine.recommendations(2024, 3).unwrap();
        assert_eq!(
            recs,
            vec![
                Suggestion::OnTrack,
                Suggestion::AvoidUnwanted { category: Category::Cosmetics, spent: Money::from_units(60) },
                Suggestion::AvoidUnwanted { category: Category::JunkFood, spent: Money::from_units(40) },
            ]
        );
    }

    #[test]
    fn test_recommendations_fail_as_a_whole() {
        let store = CountingStore::new();
        mark_category_unwanted(&store, &Category::JunkFood, true).unwrap();
        mark_category_unwanted(&store, &Category::Dress, true).unwrap();
        let engine = PolicyEngine::new(&store).with_today(day(2024, 3, 10));

        store.reset_calls();
        let healthy = engine.recommendations(2024, 3).unwrap();
        let calls_needed = store.calls();
        assert_eq!(healthy, vec![Suggestion::OnTrack]);

        // losing the store on the very last query still yields no list at all
        store.fail_after(calls_needed - 1);
        let err = engine.recommendations(2024, 3).unwrap_err();
        assert!(matches!(err, TrackerError::StoreUnavailable(_)));
    }

    #[test]
    fn test_custom_currency_symbol() {
        let store = CountingStore::new();
        let engine = PolicyEngine::new(&store).with_currency_symbol("€");
        mark_category_unwanted(&store, &Category::Trip, true).unwrap();
        store.add(10_00, Category::Trip, "2024-03-03");

        let lines = engine.suggestions(2024, 3).unwrap();
        assert!(lines[1].contains("€10"));
    }
}
