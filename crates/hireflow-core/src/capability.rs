//! External capability interfaces consumed by the pipeline.
//!
//! Production wires these to language-model services (see `hireflow-agents`);
//! tests inject the scripted implementations in [`crate::fakes`].

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;

use crate::domain::{CandidateProfile, ConsensusResult, EvaluationSet, EvaluatorRole};
use crate::error::{CapabilityError, StageFailure};

/// Produces one evaluator's free-text judgment of a candidate.
///
/// The text is expected to embed a JSON object with at least `score` and
/// `recommendation`.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn invoke(
        &self,
        role: EvaluatorRole,
        candidate: &CandidateProfile,
    ) -> Result<String, CapabilityError>;
}

/// Reconciles disagreeing evaluations.
///
/// The text is expected to embed `{"consensus_score": .., "reasoning": ..}`.
#[async_trait]
pub trait Mediator: Send + Sync {
    async fn mediate(&self, evaluations: &EvaluationSet) -> Result<String, CapabilityError>;
}

/// Turns evaluations (and consensus, when present) into a verdict.
///
/// The text is expected to embed `final_decision`, `confidence_score`,
/// `reasoning` and `details`.
#[async_trait]
pub trait Judge: Send + Sync {
    async fn judge(
        &self,
        evaluations: &EvaluationSet,
        consensus: Option<&ConsensusResult>,
    ) -> Result<String, CapabilityError>;
}

/// Writes one follow-up question for an inconclusive round.
#[async_trait]
pub trait Clarifier: Send + Sync {
    async fn clarify(&self, evaluations: &EvaluationSet) -> Result<String, CapabilityError>;
}

/// Await a capability call under `limit`, converting errors, timeouts and
/// panics into a [`StageFailure`].
pub(crate) async fn bounded<F>(limit: Duration, call: F) -> Result<String, StageFailure>
where
    F: Future<Output = Result<String, CapabilityError>>,
{
    let guarded = AssertUnwindSafe(call).catch_unwind();
    match tokio::time::timeout(limit, guarded).await {
        Ok(Ok(Ok(text))) => Ok(text),
        Ok(Ok(Err(e))) => Err(StageFailure::Capability(e)),
        Ok(Err(_panic)) => Err(StageFailure::Aborted("capability panicked".to_string())),
        Err(_elapsed) => Err(StageFailure::TimedOut(limit)),
    }
}
