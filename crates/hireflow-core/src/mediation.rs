//! Negotiation mediator integration.
//!
//! Called at most once per round, and only after a discrepancy was detected.
//! A failed or unparseable mediation is a soft failure: the round continues
//! on raw scores.

use std::time::Duration;

use crate::capability::{bounded, Mediator};
use crate::domain::{ConsensusResult, EvaluationSet};
use crate::error::StageFailure;
use crate::metrics::METRICS;
use crate::obs;
use crate::parse;

/// Ask the mediator for a consensus. Returns `None` on any failure.
///
/// A returned consensus always has its score inside `[1, 10]`.
pub async fn negotiate(
    mediator: &dyn Mediator,
    evaluations: &EvaluationSet,
    limit: Duration,
) -> Option<ConsensusResult> {
    METRICS.inc_negotiations();

    let attempt = async {
        let text = bounded(limit, mediator.mediate(evaluations)).await?;
        Ok::<_, StageFailure>(parse::parse_consensus(&text)?)
    };

    match attempt.await {
        Ok(consensus) => {
            obs::emit_negotiation_completed(consensus.score);
            Some(consensus)
        }
        Err(failure) => {
            obs::emit_negotiation_failed(&failure);
            None
        }
    }
}
