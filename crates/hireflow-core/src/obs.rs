//! Structured observability hooks for the evaluation round lifecycle.
//!
//! This module provides:
//! - A round-scoped tracing span, attached to the round future with `Instrument`
//! - Emission functions for lifecycle events: start, transitions, evaluator
//!   failures, negotiation, decision fallback, clarification, and completion
//!
//! Events are emitted at `info!` level, failures at `warn!`
//! (filter with `RUST_LOG` / `HIREFLOW_LOG`).

use tracing::{info, warn};
use uuid::Uuid;

use crate::discrepancy::DiscrepancyReport;
use crate::domain::{EvaluatorRole, Outcome};
use crate::error::StageFailure;
use crate::round::RoundState;

/// Span tagged with the round and candidate ids.
pub fn round_span(round_id: &Uuid, candidate_id: &str) -> tracing::Span {
    tracing::info_span!("hireflow.round", round_id = %round_id, candidate_id = %candidate_id)
}

pub fn emit_round_started(round_id: &Uuid, candidate_id: &str, evaluators: usize) {
    info!(
        event = "round.started",
        round_id = %round_id,
        candidate_id = %candidate_id,
        evaluators = evaluators,
    );
}

pub fn emit_transition(round_id: &Uuid, from: RoundState, to: RoundState) {
    info!(event = "round.transition", round_id = %round_id, from = %from, to = %to);
}

pub fn emit_evaluator_failed(role: EvaluatorRole, failure: &StageFailure) {
    warn!(event = "evaluator.failed", role = %role, error = %failure);
}

pub fn emit_discrepancy(report: &DiscrepancyReport) {
    if report.requires_negotiation {
        info!(
            event = "negotiation.required",
            max_deviation = report.max_deviation,
            threshold = report.threshold,
        );
    } else {
        info!(
            event = "negotiation.skipped",
            max_deviation = report.max_deviation,
            threshold = report.threshold,
        );
    }
}

pub fn emit_negotiation_completed(consensus_score: f64) {
    info!(event = "negotiation.completed", consensus_score = consensus_score);
}

pub fn emit_negotiation_failed(failure: &StageFailure) {
    warn!(event = "negotiation.failed", error = %failure);
}

pub fn emit_decision_fallback(failure: &StageFailure) {
    warn!(event = "decision.fallback", error = %failure);
}

pub fn emit_clarification_attached() {
    info!(event = "clarification.attached");
}

pub fn emit_clarification_failed(failure: &StageFailure) {
    warn!(event = "clarification.failed", error = %failure);
}

pub fn emit_round_decided(round_id: &Uuid, outcome: Outcome, confidence: f64, duration_ms: u64) {
    info!(
        event = "round.decided",
        round_id = %round_id,
        outcome = %outcome,
        confidence = confidence,
        duration_ms = duration_ms,
    );
}

pub fn emit_round_cancelled(candidate_id: &str) {
    warn!(event = "round.cancelled", candidate_id = %candidate_id);
}
