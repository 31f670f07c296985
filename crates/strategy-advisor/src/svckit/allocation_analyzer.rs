//! Allocation Analyzer
//!
//! Entry point for "how far is this wallet from my strategy": normalizes the
//! balances, resolves the target profile (named or blended) and lists the
//! rebalancing directives.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::AllocationSettings;
use crate::error::{AdvisorError, Result};
use crate::format::{format_percent, format_usd};
use crate::model::{CategoryShare, Directive, ExposureRule, NormalizedPortfolio, Portfolio, TargetAllocation};
use crate::strategy::{BlendWeights, ProfileCatalog, ProfileName, detect_actions, normalize};

/// Which target allocation to compare against
#[derive(Clone, Debug, PartialEq)]
pub enum ProfileSelection {
    /// One of the catalog profiles, with its own threshold
    Named(ProfileName),

    /// A weighted blend; `threshold` overrides the analyzer default
    Composite {
        weights: BlendWeights,
        threshold: Option<Decimal>,
    },
}

impl ProfileSelection {
    pub fn composite(weights: BlendWeights) -> Self {
        Self::Composite { weights, threshold: None }
    }
}

/// Result of comparing a portfolio against a profile
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AllocationReport {
    /// Profile label, e.g. "SAFE" or "COMPOSITE"
    pub profile: String,

    pub description: String,
    pub exposure_rule: ExposureRule,
    pub total_exposure: Decimal,
    pub debt: Decimal,

    /// Current fractions, canonical order
    pub normalized: NormalizedPortfolio,

    /// Target fractions, canonical order
    pub targets: Vec<CategoryShare>,

    /// `None` when no threshold applies (composite comparison only)
    pub threshold: Option<Decimal>,

    pub directives: Vec<Directive>,
}

impl AllocationReport {
    /// No directive was issued
    pub fn is_aligned(&self) -> bool {
        self.directives.is_empty()
    }

    /// Text rendering: allocation table followed by recommended actions
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("═══ ALLOCATION vs {} ═══\n", self.profile));
        s.push_str(&format!("{}\n\n", self.description));

        let exposure_label = match self.exposure_rule {
            ExposureRule::ExcludeDebt => "Total value (excluding debt)",
            ExposureRule::IncludeAll => "Total exposure",
        };
        s.push_str(&format!("{}: {}\n", exposure_label, format_usd(self.total_exposure, 0)));
        s.push_str(&format!("Debt (borrowing): {}\n\n", format_usd(self.debt, 0)));

        s.push_str(&format!("  {:<16} {:>8} {:>8}\n", "Position", "Actual", "Target"));
        for (actual, target) in self.normalized.iter().zip(&self.targets) {
            s.push_str(&format!(
                "  {:<16} {:>8} {:>8}\n",
                actual.category.label(),
                format_percent(actual.fraction),
                format_percent(target.fraction)
            ));
        }
        s.push('\n');

        if self.threshold.is_none() {
            s.push_str("No rebalance threshold set: comparison only\n");
        } else if self.is_aligned() {
            s.push_str("✓ Portfolio is aligned with the strategy\n");
        } else {
            s.push_str("Recommended actions:\n");
            for directive in &self.directives {
                s.push_str(&format!("  • {}\n", directive));
            }
        }

        s.push_str("\nNo transaction executed • No wallet management\n");
        s
    }
}

/// Compares portfolios against the profile catalog under one variant's settings
#[derive(Clone, Debug)]
pub struct AllocationAnalyzer {
    settings: AllocationSettings,
    catalog: ProfileCatalog,

    /// Threshold used for composite profiles when the request supplies none
    composite_threshold: Option<Decimal>,
}

impl Default for AllocationAnalyzer {
    fn default() -> Self {
        Self::new(AllocationSettings::default(), ProfileCatalog::standard())
    }
}

impl AllocationAnalyzer {
    pub fn new(settings: AllocationSettings, catalog: ProfileCatalog) -> Self {
        Self { settings, catalog, composite_threshold: None }
    }

    pub fn with_composite_threshold(mut self, threshold: Option<Decimal>) -> Self {
        self.composite_threshold = threshold;
        self
    }

    pub fn settings(&self) -> &AllocationSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &ProfileCatalog {
        &self.catalog
    }

    pub fn composite_threshold(&self) -> Option<Decimal> {
        self.composite_threshold
    }

    /// Normalize `portfolio` and compare it against the selected profile
    pub fn analyze(&self, portfolio: &Portfolio, selection: &ProfileSelection) -> Result<AllocationReport> {
        portfolio.validate()?;

        let (label, description, targets, threshold) = self.resolve(selection)?;
        let categories = &self.settings.categories;
        let rule = self.settings.exposure_rule;

        let total_exposure = portfolio.exposure(categories, rule)?;
        if total_exposure.is_zero() {
            tracing::debug!("Zero exposure: every fraction reads 0");
        }

        let normalized = normalize(portfolio, categories, rule)?;
        let directives = match threshold {
            Some(t) => detect_actions(&targets, t, &normalized),
            None => Vec::new(),
        };

        tracing::info!(
            profile = %label,
            exposure = %total_exposure,
            directives = directives.len(),
            "Allocation analyzed"
        );

        Ok(AllocationReport {
            profile: label,
            description,
            exposure_rule: rule,
            total_exposure,
            debt: portfolio.debt(categories)?,
            targets: targets.ordered(categories),
            normalized,
            threshold,
            directives,
        })
    }

    fn resolve(&self, selection: &ProfileSelection) -> Result<(String, String, TargetAllocation, Option<Decimal>)> {
        match selection {
            ProfileSelection::Named(name) => {
                let profile = self.catalog.get(*name);
                Ok((
                    profile.name.to_string(),
                    profile.description.clone(),
                    profile.targets.clone(),
                    Some(profile.threshold),
                ))
            }
            ProfileSelection::Composite { weights, threshold } => {
                let threshold = threshold.or(self.composite_threshold);
                if let Some(t) = threshold.filter(|t| *t < Decimal::ZERO || *t > Decimal::ONE) {
                    return Err(AdvisorError::InvalidInput(format!(
                        "threshold {} outside [0, 1]",
                        t
                    )));
                }

                let composite = self.catalog.blend(weights)?;
                let mix = composite
                    .weights
                    .iter()
                    .filter(|(_, w)| !w.is_zero())
                    .map(|(name, w)| format!("{} {}", name, format_percent(*w)))
                    .collect::<Vec<_>>()
                    .join(" / ");

                Ok(("COMPOSITE".into(), format!("Blend: {}", mix), composite.targets, threshold))
            }
        }
    }
}
