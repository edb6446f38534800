//! Decision synthesis: judge the round, then ask for a follow-up question if
//! the verdict is inconclusive.
//!
//! The judge owns the boundary between numbers and categories. This module
//! only validates what comes back, attaches the round's own numeric snapshot,
//! and degrades to a fixed manual-review decision when judgment is unusable.

use chrono::Utc;

use crate::capability::{bounded, Clarifier, Judge};
use crate::config::SynthesisConfig;
use crate::domain::{ConsensusResult, Decision, DecisionDetails, EvaluationSet, Outcome};
use crate::error::StageFailure;
use crate::metrics::METRICS;
use crate::obs;
use crate::parse::{self, Judgment};

/// Produce exactly one decision for the round. Never fails.
pub async fn synthesize_decision(
    judge: &dyn Judge,
    clarifier: &dyn Clarifier,
    evaluations: &EvaluationSet,
    consensus: Option<&ConsensusResult>,
    config: &SynthesisConfig,
) -> Decision {
    let mut decision = match request_judgment(judge, evaluations, consensus, config).await {
        Ok(judgment) => decision_from_judgment(judgment, evaluations, consensus, config),
        Err(failure) => {
            obs::emit_decision_fallback(&failure);
            METRICS.inc_judgment_fallbacks();
            Decision::manual_review_fallback(Utc::now())
        }
    };

    if decision.needs_clarification() {
        match request_clarification(clarifier, evaluations, config).await {
            Ok(question) => {
                decision.attach_clarification(question);
                obs::emit_clarification_attached();
                METRICS.inc_clarifications();
            }
            Err(failure) => obs::emit_clarification_failed(&failure),
        }
    }

    decision
}

async fn request_judgment(
    judge: &dyn Judge,
    evaluations: &EvaluationSet,
    consensus: Option<&ConsensusResult>,
    config: &SynthesisConfig,
) -> Result<Judgment, StageFailure> {
    let text = bounded(config.judgment_timeout, judge.judge(evaluations, consensus)).await?;
    Ok(parse::parse_judgment(&text)?)
}

async fn request_clarification(
    clarifier: &dyn Clarifier,
    evaluations: &EvaluationSet,
    config: &SynthesisConfig,
) -> Result<String, StageFailure> {
    let text = bounded(config.clarification_timeout, clarifier.clarify(evaluations)).await?;
    Ok(parse::parse_clarification(&text)?)
}

/// Combine a validated judgment with the round's numeric snapshot.
pub fn decision_from_judgment(
    judgment: Judgment,
    evaluations: &EvaluationSet,
    consensus: Option<&ConsensusResult>,
    config: &SynthesisConfig,
) -> Decision {
    let details = DecisionDetails {
        scores: evaluations.scores(),
        mean: evaluations.mean(),
        weighted_score: judgment
            .weighted_score
            .or_else(|| evaluations.weighted_score(&config.weights)),
        consensus_score: consensus.map(|c| c.score),
        judge_details: judgment.details,
    };

    // A follow-up question only belongs to an inconclusive verdict.
    let clarification_question = judgment
        .clarification_question
        .filter(|_| judgment.outcome == Outcome::Maybe);

    Decision {
        outcome: judgment.outcome,
        confidence: judgment.confidence,
        rationale: judgment.rationale,
        details,
        clarification_question,
        manual_review: false,
        decided_at: Utc::now(),
    }
}
