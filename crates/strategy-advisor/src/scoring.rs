//! Health Scoring
//!
//! Heuristic stability / risk / yield scores for a treasury and the risk
//! profile they imply. Every value is recomputed from the inputs; nothing is
//! cached or persisted.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, Result};
use crate::format::{format_percent, format_usd};
use crate::strategy::ProfileName;

/// Upper bound of the LTV input, in percent
pub const MAX_LTV: Decimal = dec!(80);

/// Upper bound of the APR input, in percent
pub const MAX_APR: Decimal = dec!(30);

/// Treasury composition and leverage/yield parameters
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreInputs {
    #[serde(default)]
    pub btc: Decimal,
    #[serde(default)]
    pub eth: Decimal,
    #[serde(default)]
    pub stablecoins: Decimal,
    #[serde(default)]
    pub other: Decimal,

    /// Loan-to-value, percent in [0, 80]
    #[serde(default)]
    pub ltv: Decimal,

    /// Annual yield, percent in [0, 30]
    #[serde(default)]
    pub apr: Decimal,
}

impl ScoreInputs {
    /// Treasury total; `None` when it exceeds the `Decimal` range
    pub fn total(&self) -> Option<Decimal> {
        self.btc
            .checked_add(self.eth)?
            .checked_add(self.stablecoins)?
            .checked_add(self.other)
    }

    /// Share of the treasury held in stablecoins; zero for an empty treasury
    pub fn stable_ratio(&self) -> Decimal {
        let ratio = match self.total() {
            Some(total) => self.stablecoins.checked_div(total),
            // the ratio is scale-free, so an out-of-range total is summed in quarters
            None => {
                let quarter = |amount: Decimal| amount / dec!(4);
                let total = quarter(self.btc) + quarter(self.eth) + quarter(self.stablecoins) + quarter(self.other);
                quarter(self.stablecoins).checked_div(total)
            }
        };
        ratio.unwrap_or(Decimal::ZERO).clamp(Decimal::ZERO, Decimal::ONE)
    }

    /// Share held in volatile assets; zero for an empty treasury
    pub fn non_stable_ratio(&self) -> Decimal {
        match self.total() {
            Some(total) if total <= Decimal::ZERO => Decimal::ZERO,
            _ => Decimal::ONE - self.stable_ratio(),
        }
    }

    /// Check every input against its declared domain
    pub fn validate(&self) -> Result<()> {
        for (field, amount) in [
            ("btc", self.btc),
            ("eth", self.eth),
            ("stablecoins", self.stablecoins),
            ("other", self.other),
        ] {
            if amount < Decimal::ZERO {
                return Err(AdvisorError::InvalidInput(format!(
                    "{} must not be negative (got {})",
                    field, amount
                )));
            }
        }

        if self.ltv < Decimal::ZERO || self.ltv > MAX_LTV {
            return Err(AdvisorError::InvalidInput(format!(
                "ltv must be within 0-{}% (got {})",
                MAX_LTV, self.ltv
            )));
        }

        if self.apr < Decimal::ZERO || self.apr > MAX_APR {
            return Err(AdvisorError::InvalidInput(format!(
                "apr must be within 0-{}% (got {})",
                MAX_APR, self.apr
            )));
        }

        Ok(())
    }
}

/// Scores in [0, 100] and the derived profile
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub stability: Decimal,
    pub risk: Decimal,
    #[serde(rename = "yield")]
    pub yield_score: Decimal,

    /// Mean of the three sub-scores, truncated
    pub overall: u8,

    pub profile: ProfileName,
}

impl ScoreResult {
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Health score: {}/100 ({})\n", self.overall, self.profile));
        s.push_str(&format!("  Stability: {:>6.1}\n", self.stability));
        s.push_str(&format!("  Risk:      {:>6.1}\n", self.risk));
        s.push_str(&format!("  Yield:     {:>6.1}\n", self.yield_score));
        s
    }
}

/// Score a treasury.
///
/// ```text
/// stability = min(100, stable_ratio * 70 + max(0, 50 - ltv))
/// risk      = max(0, 100 - ltv * 1.2)
/// yield     = min(100, apr * 2 + non_stable_ratio * 40)
/// overall   = floor((stability + risk + yield) / 3)
/// ```
///
/// LTV and APR outside their domains are clamped here; use
/// [`ScoreInputs::validate`] to reject them instead.
pub fn score(inputs: &ScoreInputs) -> ScoreResult {
    let hundred = dec!(100);
    let ltv = inputs.ltv.clamp(Decimal::ZERO, MAX_LTV);
    let apr = inputs.apr.clamp(Decimal::ZERO, MAX_APR);

    let stability = (inputs.stable_ratio() * dec!(70) + (dec!(50) - ltv).max(Decimal::ZERO)).min(hundred);
    let risk = (hundred - ltv * dec!(1.2)).max(Decimal::ZERO);
    let yield_score = (apr * dec!(2) + inputs.non_stable_ratio() * dec!(40)).min(hundred);

    let overall = ((stability + risk + yield_score) / dec!(3))
        .floor()
        .to_u8()
        .unwrap_or(0);

    let profile = classify(stability, yield_score, ltv);

    ScoreResult { stability, risk, yield_score, overall, profile }
}

/// First match wins: SAFE, then DEGEN, otherwise MID
fn classify(stability: Decimal, yield_score: Decimal, ltv: Decimal) -> ProfileName {
    if stability >= dec!(70) && ltv < dec!(40) {
        ProfileName::Safe
    } else if yield_score >= dec!(65) || ltv > dec!(55) {
        ProfileName::Degen
    } else {
        ProfileName::Mid
    }
}

/// One-line description of a treasury, for logs and reports
pub fn describe_inputs(inputs: &ScoreInputs) -> String {
    format!(
        "{} total, {} stable, LTV {}%, APR {}%",
        inputs
            .total()
            .map_or_else(|| "out-of-range".to_string(), |total| format_usd(total, 0)),
        format_percent(inputs.stable_ratio()),
        inputs.ltv,
        inputs.apr
    )
}
