//! Composite Profiles
//!
//! Linear blend of several profiles' targets by user-supplied weights.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{AdvisorError, Result};
use crate::model::{Category, TargetAllocation, checked_sum};
use crate::strategy::catalog::{Profile, ProfileName};

/// Raw weights per profile, e.g. slider values 0-100. Normalized on blend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    #[serde(default, alias = "SAFE")]
    pub safe: Decimal,
    #[serde(default, alias = "MID")]
    pub mid: Decimal,
    #[serde(default, alias = "DEGEN")]
    pub degen: Decimal,
}

impl BlendWeights {
    pub fn new(safe: Decimal, mid: Decimal, degen: Decimal) -> Self {
        Self { safe, mid, degen }
    }
}

/// A target allocation formed by blending named profiles
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompositeProfile {
    /// Normalized weights (sum to 1), in the order they were supplied
    pub weights: Vec<(ProfileName, Decimal)>,

    pub targets: TargetAllocation,

    /// No threshold concept is inherited from the blended profiles;
    /// directive detection needs one supplied explicitly
    pub threshold: Option<Decimal>,
}

impl CompositeProfile {
    pub fn with_threshold(mut self, threshold: Decimal) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn weight(&self, name: ProfileName) -> Decimal {
        self.weights
            .iter()
            .filter(|(n, _)| *n == name)
            .map(|(_, w)| *w)
            .sum()
    }
}

/// Blend `components` into one target allocation.
///
/// Weights are normalized by their sum; categories a profile does not
/// define contribute zero for that profile.
pub fn blend(components: &[(&Profile, Decimal)]) -> Result<CompositeProfile> {
    if let Some((profile, weight)) = components.iter().find(|(_, w)| *w < Decimal::ZERO) {
        return Err(AdvisorError::InvalidInput(format!(
            "weight for {} must not be negative (got {})",
            profile.name, weight
        )));
    }

    let total = checked_sum(components.iter().map(|(_, w)| *w), "blend weight sum")?;
    if total.is_zero() {
        return Err(AdvisorError::UndefinedBlend);
    }

    let weights: Vec<(ProfileName, Decimal)> = components
        .iter()
        .map(|(profile, w)| (profile.name, *w / total))
        .collect();

    let categories: BTreeSet<Category> = components
        .iter()
        .flat_map(|(profile, _)| profile.targets.categories())
        .collect();

    let targets = categories
        .into_iter()
        .map(|category| -> Result<(Category, Decimal)> {
            let contributions = components
                .iter()
                .zip(&weights)
                .map(|((profile, _), (_, w))| {
                    w.checked_mul(profile.targets.get(category)).ok_or_else(|| {
                        AdvisorError::InvalidInput(format!("{} target of {} is out of range", category, profile.name))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok((category, checked_sum(contributions, "blended target")?))
        })
        .collect::<Result<TargetAllocation>>()?;

    tracing::debug!(?weights, "Blended composite profile");

    Ok(CompositeProfile { weights, targets, threshold: None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::ProfileCatalog;
    use rust_decimal_macros::dec;

    #[test]
    fn test_equal_weights_average_targets() {
        let catalog = ProfileCatalog::standard();
        let composite = catalog.blend(&BlendWeights::new(dec!(1), dec!(0), dec!(1))).unwrap();

        assert_eq!(composite.targets.get(Category::Hodl), dec!(0.25));
        assert_eq!(composite.targets.get(Category::Lending), dec!(0.40));
        assert_eq!(composite.targets.get(Category::LiquidityPool), dec!(0.25));
        assert_eq!(composite.targets.get(Category::Borrowing), dec!(0.10));
        assert_eq!(composite.weight(ProfileName::Safe), dec!(0.5));
        assert_eq!(composite.weight(ProfileName::Mid), Decimal::ZERO);
        assert!(composite.threshold.is_none());
    }

    #[test]
    fn test_slider_weights_are_normalized() {
        // slider positions 40 / 60 / 0
        let catalog = ProfileCatalog::standard();
        let composite = catalog.blend(&BlendWeights::new(dec!(40), dec!(60), dec!(0))).unwrap();

        assert_eq!(composite.targets.get(Category::Hodl), dec!(0.30));
        assert_eq!(composite.targets.get(Category::Lending), dec!(0.45));
        assert_eq!(composite.targets.get(Category::LiquidityPool), dec!(0.19));
        assert_eq!(composite.targets.get(Category::Borrowing), dec!(0.06));
        assert_eq!(composite.targets.sum().unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_single_profile_blend_is_identity() {
        let catalog = ProfileCatalog::standard();
        let composite = catalog.blend(&BlendWeights::new(dec!(0), dec!(0), dec!(7))).unwrap();
        assert_eq!(composite.targets, catalog.get(ProfileName::Degen).targets);
    }

    #[test]
    fn test_zero_weights_undefined() {
        let catalog = ProfileCatalog::standard();
        let result = catalog.blend(&BlendWeights::default());
        assert!(matches!(result, Err(AdvisorError::UndefinedBlend)));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let catalog = ProfileCatalog::standard();
        let result = catalog.blend(&BlendWeights::new(dec!(1), dec!(-1), dec!(1)));
        assert!(matches!(result, Err(AdvisorError::InvalidInput(_))));
    }

    #[test]
    fn test_absent_category_contributes_zero() {
        let btc_only = Profile::new(ProfileName::Safe, "btc", [(Category::BtcNative, Decimal::ONE)], dec!(0.05));
        let hodl_only = Profile::new(ProfileName::Degen, "hodl", [(Category::Hodl, Decimal::ONE)], dec!(0.1));

        let composite = blend(&[(&btc_only, dec!(3)), (&hodl_only, dec!(1))]).unwrap();
        assert_eq!(composite.targets.get(Category::BtcNative), dec!(0.75));
        assert_eq!(composite.targets.get(Category::Hodl), dec!(0.25));
        assert_eq!(composite.targets.get(Category::Lending), Decimal::ZERO);
    }

    #[test]
    fn test_threshold_is_explicit() {
        let catalog = ProfileCatalog::standard();
        let composite = catalog.blend(&BlendWeights::new(dec!(1), dec!(1), dec!(0))).unwrap();
        assert!(composite.threshold.is_none());
        assert_eq!(composite.with_threshold(dec!(0.05)).threshold, Some(dec!(0.05)));
    }

    #[test]
    fn test_weight_sum_overflow_rejected() {
        let catalog = ProfileCatalog::standard();
        let result = catalog.blend(&BlendWeights::new(Decimal::MAX, Decimal::MAX, dec!(0)));
        assert!(matches!(result, Err(AdvisorError::InvalidInput(_))));

        // a single huge weight still normalizes to 1
        let composite = catalog.blend(&BlendWeights::new(Decimal::MAX, dec!(0), dec!(0))).unwrap();
        assert_eq!(composite.targets, catalog.get(ProfileName::Safe).targets);
    }
}
