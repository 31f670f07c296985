//! Configuration
//!
//! Variant settings (category set + exposure rule) and environment loading.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{AdvisorError, Result};
use crate::model::{CategorySet, ExposureRule};
use crate::strategy::ProfileCatalog;
use crate::svckit::AllocationAnalyzer;

pub const ENV_VARIANT: &str = "ADVISOR_VARIANT";
pub const ENV_EXPOSURE_RULE: &str = "ADVISOR_EXPOSURE_RULE";
pub const ENV_COMPOSITE_THRESHOLD: &str = "ADVISOR_COMPOSITE_THRESHOLD";
pub const ENV_PROFILES_PATH: &str = "ADVISOR_PROFILES_PATH";

/// Preset bucket layouts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// hodl / lending / liquidity_pool / borrowing, debt outside exposure
    #[default]
    StrategyChecker,

    /// Adds BTC NATIF, debt counted in exposure
    WalletBacktest,
}

impl FromStr for Variant {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "strategy" | "strategy_checker" => Ok(Self::StrategyChecker),
            "backtest" | "wallet_backtest" => Ok(Self::WalletBacktest),
            other => Err(AdvisorError::Config(format!(
                "unknown variant '{}' (expected strategy or backtest)",
                other
            ))),
        }
    }
}

/// Which categories are tracked and how exposure is summed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AllocationSettings {
    pub categories: CategorySet,
    pub exposure_rule: ExposureRule,
}

impl Default for AllocationSettings {
    fn default() -> Self {
        Self::strategy_checker()
    }
}

impl AllocationSettings {
    pub fn strategy_checker() -> Self {
        Self {
            categories: CategorySet::strategy_checker(),
            exposure_rule: ExposureRule::ExcludeDebt,
        }
    }

    pub fn wallet_backtest() -> Self {
        Self {
            categories: CategorySet::wallet_backtest(),
            exposure_rule: ExposureRule::IncludeAll,
        }
    }

    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::StrategyChecker => Self::strategy_checker(),
            Variant::WalletBacktest => Self::wallet_backtest(),
        }
    }

    pub fn with_exposure_rule(mut self, rule: ExposureRule) -> Self {
        self.exposure_rule = rule;
        self
    }
}

/// Advisor configuration, usually read from the environment
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdvisorConfig {
    pub variant: Variant,

    /// Overrides the variant's exposure rule
    pub exposure_rule: Option<ExposureRule>,

    /// Threshold for composite profiles; `None` means comparison only
    pub composite_threshold: Option<Decimal>,

    /// Custom catalog file; the built-in catalog otherwise
    pub profiles_path: Option<PathBuf>,
}

impl AdvisorConfig {
    /// Read `ADVISOR_*` variables from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let variant = get(ENV_VARIANT)
            .map(|v| v.parse::<Variant>())
            .transpose()?
            .unwrap_or_default();
        let exposure_rule = get(ENV_EXPOSURE_RULE)
            .map(|v| v.parse::<ExposureRule>())
            .transpose()?;

        let composite_threshold = get(ENV_COMPOSITE_THRESHOLD)
            .map(|v| {
                Decimal::from_str(v.trim()).map_err(|e| {
                    AdvisorError::Config(format!("{}: '{}' is not a decimal ({})", ENV_COMPOSITE_THRESHOLD, v, e))
                })
            })
            .transpose()?;

        if let Some(t) = composite_threshold.filter(|t| *t < Decimal::ZERO || *t > Decimal::ONE) {
            return Err(AdvisorError::Config(format!(
                "{} must be a fraction in [0, 1], got {}",
                ENV_COMPOSITE_THRESHOLD, t
            )));
        }

        Ok(Self {
            variant,
            exposure_rule,
            composite_threshold,
            profiles_path: get(ENV_PROFILES_PATH).map(PathBuf::from),
        })
    }

    pub fn settings(&self) -> AllocationSettings {
        let settings = AllocationSettings::for_variant(self.variant);
        match self.exposure_rule {
            Some(rule) => settings.with_exposure_rule(rule),
            None => settings,
        }
    }

    pub fn catalog(&self) -> Result<ProfileCatalog> {
        match &self.profiles_path {
            Some(path) => ProfileCatalog::load(path),
            None => Ok(match self.variant {
                Variant::StrategyChecker => ProfileCatalog::standard(),
                Variant::WalletBacktest => ProfileCatalog::wallet_backtest(),
            }),
        }
    }

    /// Analyzer for the configured variant; fails when the catalog's target
    /// categories differ from the tracked ones
    pub fn build_analyzer(&self) -> Result<AllocationAnalyzer> {
        let settings = self.settings();
        let catalog = self.catalog()?;
        catalog.check_categories(&settings.categories)?;

        let analyzer = AllocationAnalyzer::new(settings, catalog).with_composite_threshold(self.composite_threshold);
        Ok(analyzer)
    }
}
