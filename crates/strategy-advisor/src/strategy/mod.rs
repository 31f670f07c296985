//! Allocation Strategies
//!
//! Risk profiles, composite blends and the rebalance engine.

mod blend;
mod catalog;
mod rebalance;

pub use blend::{BlendWeights, CompositeProfile, blend};
pub use catalog::{Profile, ProfileCatalog, ProfileName};
pub use rebalance::{detect_actions, normalize};
