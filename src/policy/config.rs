// ⚙️ Policy Config - typed view over the key/value settings
//
// Settings live in the record store as strings:
//   monthly_budget        decimal, 0 = no budget
//   limit_<category>      decimal
//   unwanted_<category>   "1" / "0"
//   block_mode            "1" / "0"
// `PolicyConfig::load` reads them once per operation; nothing is cached.

use crate::db::RecordStore;
use crate::error::{Result, TrackerError};
use crate::expense::Category;
use crate::money::Money;
use std::collections::HashMap;
use tracing::info;

pub const MONTHLY_BUDGET_KEY: &str = "monthly_budget";
pub const BLOCK_MODE_KEY: &str = "block_mode";
pub const LIMIT_PREFIX: &str = "limit_";
pub const UNWANTED_PREFIX: &str = "unwanted_";

const TRUE_FLAG: &str = "1";
const FALSE_FLAG: &str = "0";

pub fn limit_key(category: &Category) -> String {
    format!("{}{}", LIMIT_PREFIX, category.name())
}

pub fn unwanted_key(category: &Category) -> String {
    format!("{}{}", UNWANTED_PREFIX, category.name())
}

fn parse_money_setting(key: &str, value: &str) -> Result<Money> {
    value.parse::<Money>().map_err(|_| TrackerError::CorruptSetting {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn category_from_key(key: &str, prefix: &str) -> Result<Category> {
    key[prefix.len()..].parse().map_err(|_| TrackerError::CorruptSetting {
        key: key.to_string(),
        value: String::new(),
    })
}

// ============================================================================
// POLICY CONFIG
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyConfig {
    /// `None` when unset or stored as 0
    pub monthly_budget: Option<Money>,
    pub category_limits: HashMap<Category, Money>,
    /// Flagged categories in settings enumeration order
    pub unwanted_categories: Vec<Category>,
    pub block_mode: bool,
}

impl PolicyConfig {
    pub fn load<S: RecordStore + ?Sized>(store: &S) -> Result<PolicyConfig> {
        let monthly_budget = match store.get_setting(MONTHLY_BUDGET_KEY)? {
            Some(raw) => Some(parse_money_setting(MONTHLY_BUDGET_KEY, &raw)?).filter(|b| b.is_positive()),
            None => None,
        };

        let mut category_limits = HashMap::new();
        for (key, value) in store.settings_with_prefix(LIMIT_PREFIX)? {
            let category = category_from_key(&key, LIMIT_PREFIX)?;
            category_limits.insert(category, parse_money_setting(&key, &value)?);
        }

        let mut unwanted_categories = Vec::new();
        for (key, value) in store.settings_with_prefix(UNWANTED_PREFIX)? {
            if value == TRUE_FLAG {
                unwanted_categories.push(category_from_key(&key, UNWANTED_PREFIX)?);
            }
        }

        let block_mode = store.get_setting(BLOCK_MODE_KEY)?.as_deref() == Some(TRUE_FLAG);

        Ok(PolicyConfig {
            monthly_budget,
            category_limits,
            unwanted_categories,
            block_mode,
        })
    }

    // Lookups go through the canonical form, the same name the store matches on.

    pub fn category_limit(&self, category: &Category) -> Option<Money> {
        let category = category.canonical().ok()?;
        self.category_limits.get(&category).copied()
    }

    pub fn is_unwanted(&self, category: &Category) -> bool {
        category
            .canonical()
            .map(|c| self.unwanted_categories.contains(&c))
            .unwrap_or(false)
    }

    /// Unwanted and block mode on: no override possible
    pub fn is_blocked(&self, category: &Category) -> bool {
        self.block_mode && self.is_unwanted(category)
    }
}

// ============================================================================
// SETTINGS ACCESSORS
// ============================================================================

/// A budget of 0 clears it
pub fn set_monthly_budget<S: RecordStore + ?Sized>(store: &S, amount: Money) -> Result<()> {
    if amount < Money::ZERO {
        return Err(TrackerError::InvalidAmount(format!("budget {} is negative", amount)));
    }
    store.set_setting(MONTHLY_BUDGET_KEY, &amount.to_string())?;
    info!(%amount, "monthly budget set");
    Ok(())
}

pub fn monthly_budget<S: RecordStore + ?Sized>(store: &S) -> Result<Option<Money>> {
    match store.get_setting(MONTHLY_BUDGET_KEY)? {
        Some(raw) => Ok(Some(parse_money_setting(MONTHLY_BUDGET_KEY, &raw)?).filter(|b| b.is_positive())),
        None => Ok(None),
    }
}

pub fn set_category_limit<S: RecordStore + ?Sized>(store: &S, category: &Category, amount: Money) -> Result<()> {
    if amount < Money::ZERO {
        return Err(TrackerError::InvalidAmount(format!("limit {} is negative", amount)));
    }
    let category = &category.canonical()?;
    store.set_setting(&limit_key(category), &amount.to_string())?;
    info!(%category, %amount, "category limit set");
    Ok(())
}

/// A limit of 0 is a real limit (every expense exceeds it), unlike the budget
pub fn category_limit<S: RecordStore + ?Sized>(store: &S, category: &Category) -> Result<Option<Money>> {
    let key = limit_key(&category.canonical()?);
    store
        .get_setting(&key)?
        .map(|raw| parse_money_setting(&key, &raw))
        .transpose()
}

pub fn clear_category_limit<S: RecordStore + ?Sized>(store: &S, category: &Category) -> Result<()> {
    let category = &category.canonical()?;
    store.remove_setting(&limit_key(category))?;
    info!(%category, "category limit cleared");
    Ok(())
}

pub fn mark_category_unwanted<S: RecordStore + ?Sized>(store: &S, category: &Category, unwanted: bool) -> Result<()> {
    let category = &category.canonical()?;
    let flag = if unwanted { TRUE_FLAG } else { FALSE_FLAG };
    store.set_setting(&unwanted_key(category), flag)?;
    info!(%category, unwanted, "unwanted flag set");
    Ok(())
}

pub fn is_category_unwanted<S: RecordStore + ?Sized>(store: &S, category: &Category) -> Result<bool> {
    Ok(store.get_setting(&unwanted_key(&category.canonical()?))?.as_deref() == Some(TRUE_FLAG))
}

pub fn set_block_mode<S: RecordStore + ?Sized>(store: &S, enabled: bool) -> Result<()> {
    store.set_setting(BLOCK_MODE_KEY, if enabled { TRUE_FLAG } else { FALSE_FLAG })?;
    info!(enabled, "block mode set");
    Ok(())
}

pub fn block_mode<S: RecordStore + ?Sized>(store: &S) -> Result<bool> {
    Ok(store.get_setting(BLOCK_MODE_KEY)?.as_deref() == Some(TRUE_FLAG))
}
