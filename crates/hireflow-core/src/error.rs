//! Error taxonomy for the synthesis pipeline.
//!
//! Only [`SynthesisError`] can leave a round, and only through the cancellable
//! entry point. Every other error here is converted into a degraded value
//! (placeholder evaluation, skipped consensus, fallback decision) before it
//! reaches the caller.

use std::time::Duration;

/// Failure reported by an external capability (evaluator, mediator, judge, clarifier).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapabilityError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("service rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("capability returned an empty response")]
    EmptyResponse,

    #[error("{0}")]
    Other(String),
}

/// Why a capability response could not be turned into a typed value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("response is empty")]
    Empty,

    #[error("no JSON object found in response")]
    NoJsonObject,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is invalid: {detail}")]
    InvalidField { field: &'static str, detail: String },

    #[error("field `{field}` = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("unrecognized {kind} `{label}`")]
    UnknownLabel { kind: &'static str, label: String },
}

/// A single pipeline stage that did not produce a usable value.
///
/// Carried into placeholder rationales and log events; never returned to the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StageFailure {
    #[error("capability failed: {0}")]
    Capability(#[from] CapabilityError),

    #[error("timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),

    #[error("unusable response: {0}")]
    Parse(#[from] ParseError),

    #[error("aborted: {0}")]
    Aborted(String),
}

/// Invalid or unparseable configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key}={value:?} is not valid: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that can end a round without a decision.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
    #[error("evaluation round cancelled")]
    Cancelled,
}

/// Result type for round-level operations.
pub type SynthesisResult<T> = std::result::Result<T, SynthesisError>;
