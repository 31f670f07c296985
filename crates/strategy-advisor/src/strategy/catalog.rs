//! Profile Catalog
//!
//! The three risk profiles (SAFE, MID, DEGEN) with their target allocations
//! and rebalance thresholds.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{AdvisorError, Result};
use crate::model::{Category, CategorySet, TargetAllocation};
use crate::strategy::blend::{BlendWeights, CompositeProfile, blend};

/// Allowed drift of a target sum away from 1
const TARGET_SUM_TOLERANCE: Decimal = dec!(0.000000001);

/// Profile identifier, in ascending risk order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProfileName {
    Safe,
    Mid,
    Degen,
}

impl ProfileName {
    pub const ALL: [ProfileName; 3] = [Self::Safe, Self::Mid, Self::Degen];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::Mid => "MID",
            Self::Degen => "DEGEN",
        }
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileName {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "SAFE" => Ok(Self::Safe),
            "MID" => Ok(Self::Mid),
            "DEGEN" => Ok(Self::Degen),
            _ => Err(AdvisorError::UnknownProfile(s.to_string())),
        }
    }
}

/// A named target allocation with its rebalance threshold
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: ProfileName,
    pub description: String,
    pub targets: TargetAllocation,

    /// Maximum tolerated deviation before a directive is issued
    pub threshold: Decimal,
}

impl Profile {
    pub fn new(
        name: ProfileName,
        description: impl Into<String>,
        targets: impl IntoIterator<Item = (Category, Decimal)>,
        threshold: Decimal,
    ) -> Self {
        Self {
            name,
            description: description.into(),
            targets: targets.into_iter().collect(),
            threshold,
        }
    }

    /// Targets must be non-negative and sum to 1; threshold must lie in [0, 1]
    pub fn validate(&self) -> Result<()> {
        if let Some(category) = self.targets.categories().find(|c| self.targets.get(*c) < Decimal::ZERO) {
            return Err(AdvisorError::InvalidProfile(format!(
                "{}: target for {} is negative",
                self.name, category
            )));
        }

        let sum = self
            .targets
            .sum()
            .map_err(|_| AdvisorError::InvalidProfile(format!("{}: targets are out of range", self.name)))?;
        if (sum - Decimal::ONE).abs() > TARGET_SUM_TOLERANCE {
            return Err(AdvisorError::InvalidProfile(format!(
                "{}: targets sum to {}, expected 1",
                self.name, sum
            )));
        }

        if self.threshold < Decimal::ZERO || self.threshold > Decimal::ONE {
            return Err(AdvisorError::InvalidProfile(format!(
                "{}: threshold {} outside [0, 1]",
                self.name, self.threshold
            )));
        }

        Ok(())
    }
}

/// On-disk layout of a custom catalog
#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    profiles: Vec<Profile>,
}

/// The full set of risk profiles
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileCatalog {
    safe: Profile,
    mid: Profile,
    degen: Profile,
}

impl Default for ProfileCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl ProfileCatalog {
    /// Built-in profiles for the hodl / lending / liquidity_pool / borrowing buckets
    pub fn standard() -> Self {
        Self {
            safe: Profile::new(
                ProfileName::Safe,
                "Capital preservation, low leverage, low volatility",
                [
                    (Category::Hodl, dec!(0.45)),
                    (Category::Lending, dec!(0.45)),
                    (Category::LiquidityPool, dec!(0.10)),
                    (Category::Borrowing, dec!(0.00)),
                ],
                dec!(0.05),
            ),
            mid: Profile::new(
                ProfileName::Mid,
                "Balanced yield and risk, moderate leverage",
                [
                    (Category::Hodl, dec!(0.20)),
                    (Category::Lending, dec!(0.45)),
                    (Category::LiquidityPool, dec!(0.25)),
                    (Category::Borrowing, dec!(0.10)),
                ],
                dec!(0.05),
            ),
            degen: Profile::new(
                ProfileName::Degen,
                "Maximum yield, high leverage, high volatility",
                [
                    (Category::Hodl, dec!(0.05)),
                    (Category::Lending, dec!(0.35)),
                    (Category::LiquidityPool, dec!(0.40)),
                    (Category::Borrowing, dec!(0.20)),
                ],
                dec!(0.10),
            ),
        }
    }

    /// Built-in profiles for the BTC NATIF / lending / borrowing / hodl /
    /// liquidity_pool buckets.
    ///
    /// The legacy backtest tables over-allocate (SAFE 150%, MID 130%,
    /// DEGEN 110%); each is rescaled by its own sum so the relative weights
    /// survive and the targets add up to 1.
    pub fn wallet_backtest() -> Self {
        Self {
            safe: Profile::new(
                ProfileName::Safe,
                "Capital preservation",
                rescaled([
                    (Category::BtcNative, dec!(0.50)),
                    (Category::Lending, dec!(0.70)),
                    (Category::Borrowing, dec!(0.05)),
                    (Category::Hodl, dec!(0.15)),
                    (Category::LiquidityPool, dec!(0.10)),
                ]),
                dec!(0.05),
            ),
            mid: Profile::new(
                ProfileName::Mid,
                "Balanced yield",
                rescaled([
                    (Category::BtcNative, dec!(0.30)),
                    (Category::Lending, dec!(0.50)),
                    (Category::Borrowing, dec!(0.15)),
                    (Category::Hodl, dec!(0.10)),
                    (Category::LiquidityPool, dec!(0.25)),
                ]),
                dec!(0.05),
            ),
            degen: Profile::new(
                ProfileName::Degen,
                "Aggressive yield, very high risk",
                rescaled([
                    (Category::BtcNative, dec!(0.10)),
                    (Category::Lending, dec!(0.25)),
                    (Category::Borrowing, dec!(0.20)),
                    (Category::Hodl, dec!(0.05)),
                    (Category::LiquidityPool, dec!(0.50)),
                ]),
                dec!(0.10),
            ),
        }
    }

    /// Every profile must target exactly the tracked `categories`
    /// (zero targets included), or balances and targets drift apart.
    pub fn check_categories(&self, categories: &CategorySet) -> Result<()> {
        for profile in self.iter() {
            if let Some(extra) = profile.targets.categories().find(|c| !categories.contains(*c)) {
                return Err(AdvisorError::Config(format!(
                    "{} targets {}, which is not a tracked category",
                    profile.name, extra
                )));
            }
            if let Some(missing) = categories.iter().find(|c| !profile.targets.contains(*c)) {
                return Err(AdvisorError::Config(format!(
                    "{} has no target for tracked category {}",
                    profile.name, missing
                )));
            }
        }
        Ok(())
    }

    /// Build from an arbitrary list; each name must appear exactly once
    pub fn from_profiles(profiles: Vec<Profile>) -> Result<Self> {
        let mut safe = None;
        let mut mid = None;
        let mut degen = None;

        for profile in profiles {
            profile.validate()?;
            let slot = match profile.name {
                ProfileName::Safe => &mut safe,
                ProfileName::Mid => &mut mid,
                ProfileName::Degen => &mut degen,
            };
            if slot.is_some() {
                return Err(AdvisorError::InvalidProfile(format!(
                    "{} defined more than once",
                    profile.name
                )));
            }
            *slot = Some(profile);
        }

        let missing = |name: ProfileName| AdvisorError::InvalidProfile(format!("{} is missing", name));

        Ok(Self {
            safe: safe.ok_or_else(|| missing(ProfileName::Safe))?,
            mid: mid.ok_or_else(|| missing(ProfileName::Mid))?,
            degen: degen.ok_or_else(|| missing(ProfileName::Degen))?,
        })
    }

    /// Parse a catalog from `{"profiles": [...]}` JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_profiles(file.profiles)
    }

    /// Load a catalog file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        tracing::info!("Loaded profile catalog from {}", path.display());
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String> {
        let file = CatalogFile { profiles: self.iter().cloned().collect() };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn get(&self, name: ProfileName) -> &Profile {
        match name {
            ProfileName::Safe => &self.safe,
            ProfileName::Mid => &self.mid,
            ProfileName::Degen => &self.degen,
        }
    }

    /// Case-insensitive lookup by name
    pub fn get_by_name(&self, name: &str) -> Result<&Profile> {
        Ok(self.get(name.parse()?))
    }

    /// Profiles in ascending risk order
    pub fn iter(&self) -> impl Iterator<Item = &Profile> {
        [&self.safe, &self.mid, &self.degen].into_iter()
    }

    /// Blend the three profiles by weight
    pub fn blend(&self, weights: &BlendWeights) -> Result<CompositeProfile> {
        blend(&[
            (&self.safe, weights.safe),
            (&self.mid, weights.mid),
            (&self.degen, weights.degen),
        ])
    }
}

/// Scale `raw` so it sums to 1
fn rescaled<const N: usize>(raw: [(Category, Decimal); N]) -> Vec<(Category, Decimal)> {
    let total: Decimal = raw.iter().map(|(_, t)| *t).sum();
    raw.into_iter().map(|(category, t)| (category, t / total)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::format_percent;

    #[test]
    fn test_standard_catalog_is_valid() {
        let catalog = ProfileCatalog::standard();
        for profile in catalog.iter() {
            profile.validate().unwrap();
        }

        let safe = catalog.get(ProfileName::Safe);
        assert_eq!(safe.targets.get(Category::Hodl), dec!(0.45));
        assert_eq!(safe.threshold, dec!(0.05));
        assert_eq!(catalog.get(ProfileName::Degen).threshold, dec!(0.10));
    }

    #[test]
    fn test_lookup_by_name() {
        let catalog = ProfileCatalog::standard();
        assert_eq!(catalog.get_by_name("degen").unwrap().name, ProfileName::Degen);
        assert!(matches!(
            catalog.get_by_name("YOLO"),
            Err(AdvisorError::UnknownProfile(_))
        ));
    }

    #[test]
    fn test_targets_must_sum_to_one() {
        let bad = Profile::new(
            ProfileName::Safe,
            "too much",
            [(Category::Hodl, dec!(0.50)), (Category::Lending, dec!(0.70))],
            dec!(0.05),
        );
        assert!(matches!(bad.validate(), Err(AdvisorError::InvalidProfile(_))));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let mut profile = ProfileCatalog::standard().get(ProfileName::Mid).clone();
        profile.threshold = dec!(-0.01);
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip_keeps_values() {
        let catalog = ProfileCatalog::standard();
        let json = catalog.to_json().unwrap();
        let parsed = ProfileCatalog::from_json(&json).unwrap();
        assert_eq!(parsed, catalog);
    }

    #[test]
    fn test_catalog_requires_every_profile() {
        let json = r#"{"profiles": [
            {"name": "SAFE", "description": "all lending",
             "targets": {"lending": 1.0}, "threshold": 0.05}
        ]}"#;
        assert!(matches!(
            ProfileCatalog::from_json(json),
            Err(AdvisorError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_catalog_rejects_duplicates() {
        let safe = ProfileCatalog::standard().get(ProfileName::Safe).clone();
        let result = ProfileCatalog::from_profiles(vec![safe.clone(), safe]);
        assert!(result.is_err());
    }

    #[test]
    fn test_backtest_catalog_is_valid() {
        let catalog = ProfileCatalog::wallet_backtest();
        for profile in catalog.iter() {
            profile.validate().unwrap();
        }
        catalog.check_categories(&CategorySet::wallet_backtest()).unwrap();

        // 0.50 of a 1.50 table
        let safe = catalog.get(ProfileName::Safe);
        assert_eq!(format_percent(safe.targets.get(Category::BtcNative)), "33.3%");
        assert_eq!(catalog.get(ProfileName::Degen).threshold, dec!(0.10));
    }

    #[test]
    fn test_category_mismatch_rejected() {
        let standard = ProfileCatalog::standard();
        standard.check_categories(&CategorySet::strategy_checker()).unwrap();
        assert!(matches!(
            standard.check_categories(&CategorySet::wallet_backtest()),
            Err(AdvisorError::Config(_))
        ));
        assert!(matches!(
            ProfileCatalog::wallet_backtest().check_categories(&CategorySet::strategy_checker()),
            Err(AdvisorError::Config(_))
        ));
    }

    #[test]
    fn test_out_of_range_targets_rejected() {
        let bad = Profile::new(
            ProfileName::Safe,
            "overflowing",
            [(Category::Hodl, Decimal::MAX), (Category::Lending, Decimal::MAX)],
            dec!(0.05),
        );
        assert!(matches!(bad.validate(), Err(AdvisorError::InvalidProfile(_))));
    }
}
