//! # strategy-advisor
//!
//! Read-only DeFi strategy advisor: compares a wallet's allocation against a
//! risk profile and scores the health of a treasury.
//!
//! ## Pipelines
//!
//! ```text
//! ┌───────────┐   ┌────────────┐   ┌────────────────┐   ┌─────────────┐
//! │ balances  │──▶│ normalize  │──▶│ detect_actions │──▶│ directives  │
//! └───────────┘   └────────────┘   └────────────────┘   └─────────────┘
//!                                          ▲
//!                      SAFE / MID / DEGEN ─┤
//!                      or weighted blend ──┘
//!
//! ┌───────────┐   ┌────────────────────────────┐   ┌──────────────────┐
//! │ treasury  │──▶│ stability / risk / yield   │──▶│ overall, profile │
//! └───────────┘   └────────────────────────────┘   └──────────────────┘
//! ```
//!
//! ## Example: SAFE profile, $6,000 wallet
//!
//! ```text
//!   Position          Actual   Target
//!   HODL               33.3%    45.0%   → INCREASE HODL by 11.7%
//!   LENDING            50.0%    45.0%   (exactly on the 5% threshold)
//!   LIQUIDITY_POOL     16.7%    10.0%   → REDUCE LIQUIDITY_POOL by 6.7%
//!   BORROWING           0.0%     0.0%
//! ```
//!
//! Nothing here moves funds, signs transactions or reads chain state.

pub mod balance;
pub mod config;
pub mod error;
pub mod format;
pub mod model;
pub mod scoring;
pub mod strategy;
pub mod svckit;

pub use config::{AdvisorConfig, AllocationSettings, Variant};
pub use error::{AdvisorError, Result};
pub use model::{
    Category, CategorySet, CategoryShare, Direction, Directive, ExposureRule, NormalizedPortfolio,
    Portfolio, TargetAllocation,
};
pub use scoring::{ScoreInputs, ScoreResult, score};
pub use strategy::{BlendWeights, CompositeProfile, Profile, ProfileCatalog, ProfileName};
pub use svckit::{AllocationAnalyzer, AllocationReport, ProfileSelection, analyze_health};
