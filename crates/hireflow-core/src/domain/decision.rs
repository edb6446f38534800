//! Round output: `Outcome`, `ConsensusResult`, `DecisionDetails`, `Decision`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::evaluation::EvaluatorRole;

/// Confidence attached to the manual-review fallback.
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Rationale attached to the manual-review fallback.
pub const MANUAL_REVIEW_RATIONALE: &str =
    "Automated synthesis was unavailable; manual review is required.";

/// Sentence appended to the rationale when a clarification question is attached.
pub const FOLLOW_UP_NOTE: &str = "A follow-up interview question is recommended before deciding.";

/// The categorical hiring outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Hire,
    Reject,
    Maybe,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Hire => "HIRE",
            Outcome::Reject => "REJECT",
            Outcome::Maybe => "MAYBE",
        }
    }

    /// Parse a wire label, case-insensitively. `PASS` is a synonym for `REJECT`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "HIRE" => Some(Outcome::Hire),
            "REJECT" | "PASS" => Some(Outcome::Reject),
            "MAYBE" => Some(Outcome::Maybe),
            _ => None,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reconciled score produced by the negotiation mediator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// Within `[SCORE_MIN, SCORE_MAX]`.
    pub score: f64,
    pub rationale: String,
}

/// Numeric snapshot behind a decision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionDetails {
    /// Raw score of every evaluator in the round.
    #[serde(default)]
    pub scores: BTreeMap<EvaluatorRole, f64>,
    /// Unweighted mean of `scores`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighted_score: Option<f64>,
    /// Present when negotiation ran and succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consensus_score: Option<f64>,
    /// Whatever extra structure the judge returned under `details`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judge_details: Option<serde_json::Value>,
}

impl DecisionDetails {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Final output of one evaluation round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub outcome: Outcome,
    /// Within `[0, 1]`.
    pub confidence: f64,
    pub rationale: String,
    pub details: DecisionDetails,
    /// Only ever set on a `MAYBE` outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarification_question: Option<String>,
    /// True only for the fallback produced when judgment failed.
    #[serde(default)]
    pub manual_review: bool,
    pub decided_at: DateTime<Utc>,
}

impl Decision {
    /// Fixed neutral decision used when the judge is unreachable or unparseable.
    pub fn manual_review_fallback(now: DateTime<Utc>) -> Self {
        Self {
            outcome: Outcome::Maybe,
            confidence: FALLBACK_CONFIDENCE,
            rationale: MANUAL_REVIEW_RATIONALE.to_string(),
            details: DecisionDetails::default(),
            clarification_question: None,
            manual_review: true,
            decided_at: now,
        }
    }

    pub fn needs_clarification(&self) -> bool {
        self.outcome == Outcome::Maybe && self.clarification_question.is_none()
    }

    pub(crate) fn attach_clarification(&mut self, question: String) {
        self.clarification_question = Some(question);
        if !self.rationale.is_empty() && !self.rationale.ends_with(char::is_whitespace) {
            self.rationale.push(' ');
        }
        self.rationale.push_str(FOLLOW_UP_NOTE);
    }
}
