//! Rebalancing
//!
//! Normalizes raw balances into fractions of exposure and compares them
//! against target allocations.

use rust_decimal::Decimal;

use crate::error::{AdvisorError, Result};
use crate::model::{
    CategorySet, CategoryShare, Directive, ExposureRule, NormalizedPortfolio, Portfolio,
    TargetAllocation,
};

/// Convert raw balances into fractions of total exposure.
///
/// An empty wallet (zero exposure) yields all-zero fractions instead of
/// dividing by zero. Debt is still reported as a fraction of exposure when
/// `rule` leaves it out of the denominator, so a tiny exposure against a
/// large debt can exceed the `Decimal` range; that is an `InvalidInput`.
pub fn normalize(portfolio: &Portfolio, categories: &CategorySet, rule: ExposureRule) -> Result<NormalizedPortfolio> {
    let total = portfolio.exposure(categories, rule)?;

    let shares = categories
        .iter()
        .map(|category| -> Result<CategoryShare> {
            let fraction = if total > Decimal::ZERO {
                portfolio.amount(category).checked_div(total).ok_or_else(|| {
                    AdvisorError::InvalidInput(format!(
                        "{} is out of range relative to a total exposure of {}",
                        category, total
                    ))
                })?
            } else {
                Decimal::ZERO
            };
            Ok(CategoryShare::new(category, fraction))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(NormalizedPortfolio::new(shares))
}

/// Compare `current` against `targets`, in the canonical order of `current`.
///
/// A directive is issued only when the deviation is strictly beyond
/// `threshold`; a deviation of exactly `threshold` is tolerated.
pub fn detect_actions(
    targets: &TargetAllocation,
    threshold: Decimal,
    current: &NormalizedPortfolio,
) -> Vec<Directive> {
    let mut actions = Vec::new();

    for share in current.iter() {
        let delta = share.fraction.saturating_sub(targets.get(share.category));

        if delta > threshold {
            actions.push(Directive::decrease(share.category, delta));
        } else if delta < -threshold {
            actions.push(Directive::increase(share.category, -delta));
        }
    }

    for action in &actions {
        tracing::debug!(%action, "Rebalance directive");
    }

    actions
}
