//! Health Analyzer
//!
//! Validated entry point to the scoring engine.

use crate::error::Result;
use crate::scoring::{ScoreInputs, ScoreResult, describe_inputs, score};

/// Validate `inputs` against their domains, then score them
pub fn analyze_health(inputs: &ScoreInputs) -> Result<ScoreResult> {
    inputs.validate()?;

    let result = score(inputs);
    tracing::info!(
        overall = result.overall,
        profile = %result.profile,
        "Health scored: {}",
        describe_inputs(inputs)
    );

    Ok(result)
}
