//! Failure-isolated, concurrent evaluator fan-out.
//!
//! Every role runs in its own task inside a [`JoinSet`], bounded by its own
//! timeout. A branch that errors, times out, returns malformed text, or panics
//! is replaced by a placeholder; siblings are unaffected. Fan-in waits for all
//! branches. Dropping the returned future aborts every outstanding branch.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, instrument, warn};

use crate::capability::{bounded, Evaluator};
use crate::domain::{CandidateProfile, EvaluationResult, EvaluationSet, EvaluatorRole};
use crate::error::StageFailure;
use crate::metrics::METRICS;
use crate::obs;
use crate::parse;

/// Collapse duplicate roles, keeping the first occurrence.
pub fn dedup_roles(roles: &[EvaluatorRole]) -> Vec<EvaluatorRole> {
    let mut seen = Vec::with_capacity(roles.len());
    for role in roles {
        if !seen.contains(role) {
            seen.push(*role);
        }
    }
    seen
}

/// Invoke `evaluator` once per role, concurrently, and collect a complete set.
///
/// The result has exactly one entry per distinct role in `roles`, regardless
/// of how many branches failed or in which order they finished.
#[instrument(skip_all, fields(candidate_id = %candidate.id, evaluators = roles.len()))]
pub async fn evaluate_panel(
    evaluator: Arc<dyn Evaluator>,
    candidate: Arc<CandidateProfile>,
    roles: &[EvaluatorRole],
    per_evaluator_timeout: Duration,
) -> EvaluationSet {
    let roles = dedup_roles(roles);
    let mut branches = JoinSet::new();

    for role in roles.iter().copied() {
        let evaluator = Arc::clone(&evaluator);
        let candidate = Arc::clone(&candidate);
        branches.spawn(async move {
            let result =
                evaluate_one(evaluator.as_ref(), role, &candidate, per_evaluator_timeout).await;
            (role, result)
        });
    }

    let mut collected: BTreeMap<EvaluatorRole, EvaluationResult> = BTreeMap::new();
    while let Some(joined) = branches.join_next().await {
        match joined {
            Ok((role, result)) => {
                collected.insert(role, result);
            }
            Err(e) => warn!(error = %e, "evaluator branch did not complete"),
        }
    }

    let mut set = EvaluationSet::new();
    for role in roles {
        let result = collected.remove(&role).unwrap_or_else(|| {
            let failure = StageFailure::Aborted("evaluator task panicked".to_string());
            record_failure(role, &failure);
            EvaluationResult::placeholder(role, failure.to_string())
        });
        set.insert(result);
    }
    set
}

/// One branch: invoke, bound, parse, validate. Never fails.
async fn evaluate_one(
    evaluator: &dyn Evaluator,
    role: EvaluatorRole,
    candidate: &CandidateProfile,
    limit: Duration,
) -> EvaluationResult {
    let attempt = async {
        let text = bounded(limit, evaluator.invoke(role, candidate)).await?;
        Ok::<_, StageFailure>(parse::parse_evaluation(role, &text)?)
    };

    match attempt.await {
        Ok(result) => {
            debug!(role = %role, score = result.score, "evaluator succeeded");
            result
        }
        Err(failure) => {
            record_failure(role, &failure);
            EvaluationResult::placeholder(role, failure.to_string())
        }
    }
}

fn record_failure(role: EvaluatorRole, failure: &StageFailure) {
    obs::emit_evaluator_failed(role, failure);
    METRICS.inc_evaluator_failures();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_roles_keeps_first_occurrence_order() {
        let roles = [
            EvaluatorRole::Sales,
            EvaluatorRole::Rh,
            EvaluatorRole::Sales,
            EvaluatorRole::Manager,
            EvaluatorRole::Rh,
        ];
        assert_eq!(
            dedup_roles(&roles),
            vec![
                EvaluatorRole::Sales,
                EvaluatorRole::Rh,
                EvaluatorRole::Manager
            ]
        );
    }
}
