//! Service Kit
//!
//! The two analysis entry points exposed to callers: allocation comparison
//! and treasury health scoring.

mod allocation_analyzer;
mod health_analyzer;

pub use allocation_analyzer::{AllocationAnalyzer, AllocationReport, ProfileSelection};
pub use health_analyzer::analyze_health;
