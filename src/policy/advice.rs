// 💡 Recommendations - what to do about this month's spending

use crate::expense::Category;
use crate::money::Money;
use std::fmt;

/// How many top-spending categories get a "cut" suggestion
pub const TOP_CATEGORIES: usize = 5;

pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    /// Projection goes past the budget by `amount`
    Overshoot { amount: Money },
    /// One of the top spending categories; cut 20-40%
    CutCategory { category: Category, spent: Money },
    OnTrack,
    /// An unwanted category already has spending this month
    AvoidUnwanted { category: Category, spent: Money },
}

impl Suggestion {
    pub fn render(&self, currency: &str) -> String {
        match self {
            Suggestion::Overshoot { amount } => format!(
                "Projected overshoot: {c}{n}. Try to cut this month by {c}{n}.",
                c = currency,
                n = amount.whole_units()
            ),
            Suggestion::CutCategory { category, spent } => format!(
                "Top: {cat} — spent {c}{n}. Consider cutting 20-40% from {cat}.",
                cat = category,
                c = currency,
                n = spent.whole_units()
            ),
            Suggestion::OnTrack => {
                "You're on track — projected spending is within budget. Consider adding to savings."
                    .to_string()
            }
            Suggestion::AvoidUnwanted { category, spent } => format!(
                "Unwanted category {} already has {}{} this month. Avoid further purchases in this category.",
                category,
                currency,
                spent.whole_units()
            ),
        }
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(DEFAULT_CURRENCY_SYMBOL))
    }
}

/// Overshoot of the projection past a set budget; zero without a budget
pub fn overshoot(budget: Option<Money>, projected: Money) -> Money {
    match budget {
        Some(budget) if budget.is_positive() => projected.saturating_excess_over(budget),
        _ => Money::ZERO,
    }
}

/// Assemble the ordered suggestion list.
///
/// `top_categories` is only consulted when there is an overshoot and must be
/// sorted by spend, largest first. `unwanted_spend` is in settings order;
/// entries with nothing spent are skipped.
pub fn build_suggestions(
    overshoot: Money,
    top_categories: &[(Category, Money)],
    unwanted_spend: &[(Category, Money)],
) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    if overshoot.is_positive() {
        suggestions.push(Suggestion::Overshoot { amount: overshoot });
        suggestions.extend(top_categories.iter().take(TOP_CATEGORIES).map(|(category, spent)| {
            Suggestion::CutCategory {
                category: category.clone(),
                spent: *spent,
            }
        }));
    } else {
        suggestions.push(Suggestion::OnTrack);
    }

    suggestions.extend(
        unwanted_spend
            .iter()
            .filter(|(_, spent)| spent.is_positive())
            .map(|(category, spent)| Suggestion::AvoidUnwanted {
                category: category.clone(),
                spent: *spent,
            }),
    );

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overshoot_needs_a_budget() {
        assert_eq!(overshoot(None, Money::from_units(6000)), Money::ZERO);
        assert_eq!(overshoot(Some(Money::ZERO), Money::from_units(6000)), Money::ZERO);
        assert_eq!(
            overshoot(Some(Money::from_units(5000)), Money::from_units(6000)),
            Money::from_units(1000)
        );
        assert_eq!(
            overshoot(Some(Money::from_units(5000)), Money::from_units(4000)),
            Money::ZERO
        );
    }

    #[test]
    fn test_overshoot_then_top_categories_in_order() {
        let top = vec![
            (Category::Food, Money::from_units(2000)),
            (Category::Travel, Money::from_units(1500)),
        ];
        let suggestions = build_suggestions(Money::from_units(1000), &top, &[]);

        assert_eq!(
            suggestions,
            vec![
                Suggestion::Overshoot { amount: Money::from_units(1000) },
                Suggestion::CutCategory { category: Category::Food, spent: Money::from_units(2000) },
                Suggestion::CutCategory { category: Category::Travel, spent: Money::from_units(1500) },
            ]
        );
        assert_eq!(
            suggestions[0].to_string(),
            "Projected overshoot: ₹1000. Try to cut this month by ₹1000."
        );
        assert_eq!(
            suggestions[1].render("$"),
            "Top: Food — spent $2000. Consider cutting 20-40% from Food."
        );
    }

    #[test]
    fn test_at_most_five_cut_suggestions() {
        let top: Vec<_> = Category::BUILTIN
            .iter()
            .cloned()
            .zip((1..=10).rev().map(Money::from_units))
            .collect();
        let suggestions = build_suggestions(Money::from_units(1), &top, &[]);

        assert_eq!(suggestions.len(), 1 + TOP_CATEGORIES);
    }

    #[test]
    fn test_on_track_and_unwanted_warnings() {
        let unwanted = vec![
            (Category::JunkFood, Money::from_units(120)),
            (Category::Cosmetics, Money::ZERO),
            (Category::Dress, Money::from_cents(4950)),
        ];
        let suggestions = build_suggestions(Money::ZERO, &[(Category::Food, Money::from_units(5))], &unwanted);

        assert_eq!(
            suggestions,
            vec![
                Suggestion::OnTrack,
                Suggestion::AvoidUnwanted { category: Category::JunkFood, spent: Money::from_units(120) },
                Suggestion::AvoidUnwanted { category: Category::Dress, spent: Money::from_cents(4950) },
            ]
        );
        assert_eq!(
            suggestions[0].to_string(),
            "You're on track — projected spending is within budget. Consider adding to savings."
        );
        assert_eq!(
            suggestions[2].to_string(),
            "Unwanted category Dress already has ₹50 this month. Avoid further purchases in this category."
        );
    }
}
