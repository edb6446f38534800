//! Hireflow Core
//!
//! Synthesizes one hiring decision from several independent evaluator opinions:
//!
//! - [`orchestrator`] fans out to every evaluator concurrently, isolating failures
//! - [`discrepancy`] decides whether the panel disagrees enough to negotiate
//! - [`mediation`] asks a mediator for a consensus score when it does
//! - [`synthesizer`] turns evaluations (and consensus) into a [`Decision`]
//! - [`round`] drives the whole round and is the entry point for callers
//!
//! Capabilities (evaluators, mediator, judge, clarifier) are injected through
//! the traits in [`capability`].

pub mod cancel;
pub mod capability;
pub mod config;
pub mod discrepancy;
pub mod domain;
pub mod error;
pub mod fakes;
pub mod mediation;
pub mod metrics;
pub mod obs;
pub mod orchestrator;
pub mod parse;
pub mod round;
pub mod synthesizer;
pub mod telemetry;

pub use cancel::CancelSignal;
pub use capability::{Clarifier, Evaluator, Judge, Mediator};
pub use config::{DecisionCutoffs, RoleWeights, SynthesisConfig};
pub use discrepancy::{detect_discrepancy, requires_negotiation, DiscrepancyReport};
pub use domain::{
    CandidateProfile, ConsensusResult, Decision, DecisionDetails, EvaluationResult,
    EvaluationSet, EvaluatorRole, Outcome, Recommendation,
};
pub use error::{
    CapabilityError, ConfigError, ParseError, StageFailure, SynthesisError, SynthesisResult,
};
pub use metrics::METRICS;
pub use orchestrator::evaluate_panel;
pub use round::{RoundOutcome, RoundState, Synthesizer};
pub use telemetry::init_tracing;

/// Hireflow version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
