//! Domain model for an evaluation round.

pub mod candidate;
pub mod decision;
pub mod evaluation;

pub use candidate::CandidateProfile;
pub use decision::{
    ConsensusResult, Decision, DecisionDetails, Outcome, FALLBACK_CONFIDENCE, FOLLOW_UP_NOTE,
    MANUAL_REVIEW_RATIONALE,
};
pub use evaluation::{
    EvaluationResult, EvaluationSet, EvaluatorRole, Recommendation, FAILURE_ASPECT,
    PLACEHOLDER_SCORE, SCORE_MAX, SCORE_MIN,
};
