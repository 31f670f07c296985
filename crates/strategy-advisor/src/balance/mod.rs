//! Balance Sources
//!
//! Where portfolio balances come from. The core never reads chain state
//! itself; it only consumes whatever a `BalanceSource` returns.

mod mock;

pub use mock::MockBalanceSource;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::Portfolio;

/// Balance lookup for a wallet identifier (Strategy pattern)
///
/// Implementations reject identifiers they cannot resolve with
/// `AdvisorError::InvalidIdentifier`.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Per-category balances for `identifier`, in USD
    async fn fetch(&self, identifier: &str) -> Result<Portfolio>;

    /// Source name
    fn name(&self) -> &str;
}
