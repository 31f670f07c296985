//! Application State

use std::sync::Arc;

use strategy_advisor::AllocationAnalyzer;
use strategy_advisor::balance::BalanceSource;

use crate::auth::AccessGate;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Allocation analyzer bound to the configured variant and catalog
    pub analyzer: Arc<AllocationAnalyzer>,

    /// Wallet balance lookup (mock source by default)
    pub balances: Arc<dyn BalanceSource>,

    /// Access-code gate for the `/api` routes
    pub access: AccessGate,
}
