//! Round driver: `pending -> evaluating -> [negotiating] -> synthesizing -> decided`.
//!
//! [`Synthesizer`] owns the four capabilities and the configuration and runs
//! one round per call. The round always ends in a [`Decision`]; only explicit
//! cancellation ends it without one.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{warn, Instrument};
use uuid::Uuid;

use crate::cancel::CancelSignal;
use crate::capability::{Clarifier, Evaluator, Judge, Mediator};
use crate::config::SynthesisConfig;
use crate::discrepancy::{detect_discrepancy, DiscrepancyReport};
use crate::domain::{CandidateProfile, ConsensusResult, Decision, EvaluationSet, EvaluatorRole};
use crate::error::{SynthesisError, SynthesisResult};
use crate::mediation::negotiate;
use crate::metrics::METRICS;
use crate::obs;
use crate::orchestrator::evaluate_panel;
use crate::synthesizer::synthesize_decision;

/// Lifecycle state of one evaluation round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    Pending,
    Evaluating,
    Negotiating,
    Synthesizing,
    Decided,
}

impl RoundState {
    /// Whether `next` may directly follow `self`.
    pub fn can_advance_to(self, next: RoundState) -> bool {
        use RoundState::*;
        matches!(
            (self, next),
            (Pending, Evaluating)
                | (Evaluating, Negotiating)
                | (Evaluating, Synthesizing)
                | (Negotiating, Synthesizing)
                | (Synthesizing, Decided)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == RoundState::Decided
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoundState::Pending => "pending",
            RoundState::Evaluating => "evaluating",
            RoundState::Negotiating => "negotiating",
            RoundState::Synthesizing => "synthesizing",
            RoundState::Decided => "decided",
        }
    }
}

impl std::fmt::Display for RoundState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered record of the states a round has visited.
#[derive(Debug)]
struct RoundProgress {
    round_id: Uuid,
    visited: Vec<RoundState>,
}

impl RoundProgress {
    fn new(round_id: Uuid) -> Self {
        Self {
            round_id,
            visited: vec![RoundState::Pending],
        }
    }

    fn current(&self) -> RoundState {
        self.visited
            .last()
            .copied()
            .unwrap_or(RoundState::Pending)
    }

    fn advance(&mut self, next: RoundState) {
        let from = self.current();
        if !from.can_advance_to(next) {
            warn!(from = %from, to = %next, "unexpected round transition");
        }
        obs::emit_transition(&self.round_id, from, next);
        self.visited.push(next);
    }
}

/// Everything one round produced, for the caller to persist or present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub round_id: Uuid,
    pub candidate_id: String,
    /// One entry per requested role; failed evaluators hold placeholders.
    pub evaluations: EvaluationSet,
    pub discrepancy: DiscrepancyReport,
    /// Present only when negotiation ran and succeeded.
    pub consensus: Option<ConsensusResult>,
    pub decision: Decision,
    pub transitions: Vec<RoundState>,
}

impl RoundOutcome {
    /// Whether the round passed through `negotiating`.
    pub fn negotiated(&self) -> bool {
        self.transitions.contains(&RoundState::Negotiating)
    }
}

/// Runs evaluation rounds against a fixed set of capabilities.
#[derive(Clone)]
pub struct Synthesizer {
    evaluator: Arc<dyn Evaluator>,
    mediator: Arc<dyn Mediator>,
    judge: Arc<dyn Judge>,
    clarifier: Arc<dyn Clarifier>,
    config: SynthesisConfig,
}

impl Synthesizer {
    pub fn new(
        evaluator: Arc<dyn Evaluator>,
        mediator: Arc<dyn Mediator>,
        judge: Arc<dyn Judge>,
        clarifier: Arc<dyn Clarifier>,
        config: SynthesisConfig,
    ) -> Self {
        Self {
            evaluator,
            mediator,
            judge,
            clarifier,
            config,
        }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Run one full round. Always returns a decision.
    pub async fn synthesize(
        &self,
        candidate: &CandidateProfile,
        roles: &[EvaluatorRole],
    ) -> RoundOutcome {
        let round_id = Uuid::new_v4();
        let span = obs::round_span(&round_id, &candidate.id);
        self.run_round(round_id, candidate, roles)
            .instrument(span)
            .await
    }

    /// Run one round, abandoning it as soon as `cancel` fires.
    ///
    /// Abandoning drops the round future, which aborts every outstanding
    /// evaluator task and any in-flight mediation, judgment or clarification.
    pub async fn synthesize_cancellable(
        &self,
        candidate: &CandidateProfile,
        roles: &[EvaluatorRole],
        cancel: &CancelSignal,
    ) -> SynthesisResult<RoundOutcome> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                obs::emit_round_cancelled(&candidate.id);
                Err(SynthesisError::Cancelled)
            }
            outcome = self.synthesize(candidate, roles) => Ok(outcome),
        }
    }

    async fn run_round(
        &self,
        round_id: Uuid,
        candidate: &CandidateProfile,
        roles: &[EvaluatorRole],
    ) -> RoundOutcome {
        let started = Instant::now();
        let mut progress = RoundProgress::new(round_id);
        obs::emit_round_started(&round_id, &candidate.id, roles.len());

        progress.advance(RoundState::Evaluating);
        let evaluations = evaluate_panel(
            Arc::clone(&self.evaluator),
            Arc::new(candidate.clone()),
            roles,
            self.config.evaluator_timeout,
        )
        .await;

        let discrepancy = detect_discrepancy(&evaluations, self.config.discrepancy_threshold);
        obs::emit_discrepancy(&discrepancy);

        let consensus = if discrepancy.requires_negotiation {
            progress.advance(RoundState::Negotiating);
            negotiate(
                self.mediator.as_ref(),
                &evaluations,
                self.config.mediation_timeout,
            )
            .await
        } else {
            None
        };

        progress.advance(RoundState::Synthesizing);
        let decision = synthesize_decision(
            self.judge.as_ref(),
            self.clarifier.as_ref(),
            &evaluations,
            consensus.as_ref(),
            &self.config,
        )
        .await;

        progress.advance(RoundState::Decided);
        METRICS.inc_rounds_completed();
        obs::emit_round_decided(
            &round_id,
            decision.outcome,
            decision.confidence,
            started.elapsed().as_millis() as u64,
        );

        RoundOutcome {
            round_id,
            candidate_id: candidate.id.clone(),
            evaluations,
            discrepancy,
            consensus,
            decision,
            transitions: progress.visited,
        }
    }
}
