//! Domain Models
//!
//! Portfolio buckets, balances, normalized allocations and rebalance directives.
//! Uses `rust_decimal` for all monetary values and fractions - never use f64 for money!

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{AdvisorError, Result};
use crate::format::format_percent;

/// A portfolio bucket
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Tokens simply held in the wallet
    Hodl,

    /// Deposits supplied to lending markets
    Lending,

    /// Liquidity-pool positions
    LiquidityPool,

    /// Borrowed debt
    Borrowing,

    /// Native bitcoin held outside DeFi
    #[serde(rename = "BTC NATIF", alias = "btc_natif")]
    BtcNative,
}

impl Category {
    /// Upper-case label used in tables and directives
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hodl => "HODL",
            Self::Lending => "LENDING",
            Self::LiquidityPool => "LIQUIDITY_POOL",
            Self::Borrowing => "BORROWING",
            Self::BtcNative => "BTC NATIF",
        }
    }

    /// Only borrowing represents debt
    pub fn is_debt(&self) -> bool {
        matches!(self, Self::Borrowing)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered, duplicate-free list of categories tracked by a variant.
///
/// The order is canonical: normalization and directive detection always
/// walk it front to back, so output is reproducible.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySet(Vec<Category>);

impl CategorySet {
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
        let mut ordered = Vec::new();
        for category in categories {
            if !ordered.contains(&category) {
                ordered.push(category);
            }
        }
        Self(ordered)
    }

    /// hodl, lending, liquidity_pool, borrowing
    pub fn strategy_checker() -> Self {
        Self::new([
            Category::Hodl,
            Category::Lending,
            Category::LiquidityPool,
            Category::Borrowing,
        ])
    }

    /// BTC NATIF, lending, borrowing, hodl, liquidity_pool
    pub fn wallet_backtest() -> Self {
        Self::new([
            Category::BtcNative,
            Category::Lending,
            Category::Borrowing,
            Category::Hodl,
            Category::LiquidityPool,
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        self.0.iter().copied()
    }

    pub fn contains(&self, category: Category) -> bool {
        self.0.contains(&category)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Which categories count towards total exposure (the normalization denominator)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureRule {
    /// Sum of every non-debt category
    #[default]
    ExcludeDebt,

    /// Sum of every category, debt included
    IncludeAll,
}

impl ExposureRule {
    pub fn includes(&self, category: Category) -> bool {
        match self {
            Self::ExcludeDebt => !category.is_debt(),
            Self::IncludeAll => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExcludeDebt => "exclude_debt",
            Self::IncludeAll => "include_all",
        }
    }
}

impl FromStr for ExposureRule {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "exclude_debt" | "exclude-debt" => Ok(Self::ExcludeDebt),
            "include_all" | "include-all" => Ok(Self::IncludeAll),
            other => Err(AdvisorError::Config(format!(
                "unknown exposure rule '{}' (expected exclude_debt or include_all)",
                other
            ))),
        }
    }
}

/// Sum that reports `Decimal` overflow as `InvalidInput`
pub(crate) fn checked_sum(values: impl IntoIterator<Item = Decimal>, what: &str) -> Result<Decimal> {
    values.into_iter().try_fold(Decimal::ZERO, |acc, value| {
        acc.checked_add(value)
            .ok_or_else(|| AdvisorError::InvalidInput(format!("{} exceeds the supported range", what)))
    })
}

/// Raw per-category balances in USD
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Portfolio {
    balances: HashMap<Category, Decimal>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, category: Category, amount: Decimal) -> Self {
        self.set(category, amount);
        self
    }

    pub fn set(&mut self, category: Category, amount: Decimal) {
        self.balances.insert(category, amount);
    }

    /// Balance of a category; missing categories read as zero
    pub fn amount(&self, category: Category) -> Decimal {
        self.balances.get(&category).copied().unwrap_or(Decimal::ZERO)
    }

    /// Total exposure over `categories` under `rule`
    pub fn exposure(&self, categories: &CategorySet, rule: ExposureRule) -> Result<Decimal> {
        checked_sum(
            categories
                .iter()
                .filter(|c| rule.includes(*c))
                .map(|c| self.amount(c)),
            "total exposure",
        )
    }

    /// Total debt over `categories`
    pub fn debt(&self, categories: &CategorySet) -> Result<Decimal> {
        checked_sum(
            categories
                .iter()
                .filter(Category::is_debt)
                .map(|c| self.amount(c)),
            "total debt",
        )
    }

    /// Reject negative balances
    pub fn validate(&self) -> Result<()> {
        let mut negative: Vec<_> = self
            .balances
            .iter()
            .filter(|(_, amount)| amount.is_sign_negative() && !amount.is_zero())
            .map(|(category, _)| *category)
            .collect();
        negative.sort();

        match negative.first() {
            Some(category) => Err(AdvisorError::InvalidInput(format!(
                "balance for {} must not be negative",
                category
            ))),
            None => Ok(()),
        }
    }
}

impl FromIterator<(Category, Decimal)> for Portfolio {
    fn from_iter<I: IntoIterator<Item = (Category, Decimal)>>(iter: I) -> Self {
        Self {
            balances: iter.into_iter().collect(),
        }
    }
}

/// Target fraction per category. Missing categories target zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetAllocation(HashMap<Category, Decimal>);

impl TargetAllocation {
    pub fn get(&self, category: Category) -> Decimal {
        self.0.get(&category).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn sum(&self) -> Result<Decimal> {
        checked_sum(self.0.values().copied(), "target sum")
    }

    /// Whether `category` has an explicit target (zero included)
    pub fn contains(&self, category: Category) -> bool {
        self.0.contains_key(&category)
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.0.keys().copied()
    }

    /// Targets laid out in the canonical order of `categories`
    pub fn ordered(&self, categories: &CategorySet) -> Vec<CategoryShare> {
        categories
            .iter()
            .map(|c| CategoryShare::new(c, self.get(c)))
            .collect()
    }
}

impl FromIterator<(Category, Decimal)> for TargetAllocation {
    fn from_iter<I: IntoIterator<Item = (Category, Decimal)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A category and its fraction of total exposure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: Category,
    pub fraction: Decimal,
}

impl CategoryShare {
    pub fn new(category: Category, fraction: Decimal) -> Self {
        Self { category, fraction }
    }
}

/// Current allocation as fractions of total exposure, in canonical order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedPortfolio {
    shares: Vec<CategoryShare>,
}

impl NormalizedPortfolio {
    pub fn new(shares: Vec<CategoryShare>) -> Self {
        Self { shares }
    }

    pub fn get(&self, category: Category) -> Decimal {
        self.shares
            .iter()
            .find(|s| s.category == category)
            .map(|s| s.fraction)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryShare> {
        self.shares.iter()
    }

    /// Sum of fractions for the categories `rule` counts as exposure
    pub fn exposure_sum(&self, rule: ExposureRule) -> Decimal {
        self.shares
            .iter()
            .filter(|s| rule.includes(s.category))
            .map(|s| s.fraction)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    pub fn is_zero(&self) -> bool {
        self.shares.iter().all(|s| s.fraction.is_zero())
    }
}

/// Which way a category has to move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Increase,
    Decrease,
}

impl Direction {
    /// Verb shown to the user
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Increase => "INCREASE",
            Self::Decrease => "REDUCE",
        }
    }
}

/// A rebalancing recommendation for one category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    pub category: Category,
    pub direction: Direction,

    /// Absolute deviation from target, as a fraction
    pub magnitude: Decimal,
}

impl Directive {
    pub fn increase(category: Category, magnitude: Decimal) -> Self {
        Self { category, direction: Direction::Increase, magnitude }
    }

    pub fn decrease(category: Category, magnitude: Decimal) -> Self {
        Self { category, direction: Direction::Decrease, magnitude }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} by {}",
            self.direction.verb(),
            self.category.label(),
            format_percent(self.magnitude)
        )
    }
}
