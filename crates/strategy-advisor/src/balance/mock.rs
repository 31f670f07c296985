//! Mock Balance Source
//!
//! For testing and demo purposes. Derives a stable, fake portfolio from the
//! tail of an EVM address; no network access.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::BalanceSource;
use crate::error::{AdvisorError, Result};
use crate::model::{Category, Portfolio};

/// Address-seeded fake balances
#[derive(Clone, Copy, Debug, Default)]
pub struct MockBalanceSource;

impl MockBalanceSource {
    pub fn new() -> Self {
        Self
    }

    /// Seed in 0..100 from the last four characters of `address`
    fn seed(address: &str) -> Result<u32> {
        let invalid = || AdvisorError::InvalidIdentifier(address.to_string());

        if !address.starts_with("0x") {
            return Err(invalid());
        }

        let start = address.len().saturating_sub(4);
        let tail = address.get(start..).ok_or_else(invalid)?;
        let digits = tail.strip_prefix("0x").unwrap_or(tail);
        if digits.is_empty() {
            return Err(invalid());
        }

        let value = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
        Ok(value % 100)
    }

    /// (category, base USD, USD per seed step)
    const LAYOUT: [(Category, i64, i64); 4] = [
        (Category::Hodl, 2000, 10),
        (Category::Lending, 3500, 20),
        (Category::LiquidityPool, 2500, 15),
        (Category::Borrowing, 1200, 5),
    ];
}

#[async_trait]
impl BalanceSource for MockBalanceSource {
    async fn fetch(&self, identifier: &str) -> Result<Portfolio> {
        let seed = match Self::seed(identifier) {
            Ok(seed) => seed,
            Err(e) => {
                tracing::warn!("Rejected wallet identifier: {}", identifier);
                return Err(e);
            }
        };

        let seed = i64::from(seed);
        let portfolio = Self::LAYOUT
            .iter()
            .map(|(category, base, step)| (*category, Decimal::from(base + step * seed)))
            .collect();

        tracing::debug!(seed, "Mock balances generated");
        Ok(portfolio)
    }

    fn name(&self) -> &str {
        "MockBalances"
    }
}
