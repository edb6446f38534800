//! Round configuration: discrepancy threshold, per-stage timeouts, role weights,
//! and the post-hoc decision cutoffs.
//!
//! Nothing in the pipeline reads global constants; every threshold arrives here.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{EvaluatorRole, Outcome};
use crate::error::ConfigError;

pub const ENV_DISCREPANCY_THRESHOLD: &str = "HIREFLOW_DISCREPANCY_THRESHOLD";
pub const ENV_EVALUATOR_TIMEOUT: &str = "HIREFLOW_EVALUATOR_TIMEOUT_SECS";
pub const ENV_MEDIATION_TIMEOUT: &str = "HIREFLOW_MEDIATION_TIMEOUT_SECS";
pub const ENV_JUDGMENT_TIMEOUT: &str = "HIREFLOW_JUDGMENT_TIMEOUT_SECS";
pub const ENV_CLARIFICATION_TIMEOUT: &str = "HIREFLOW_CLARIFICATION_TIMEOUT_SECS";
pub const ENV_HIRE_CUTOFF: &str = "HIREFLOW_HIRE_CUTOFF";
pub const ENV_REJECT_CUTOFF: &str = "HIREFLOW_REJECT_CUTOFF";

/// Relative weight of each evaluator in the weighted score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleWeights {
    pub rh: f64,
    pub manager: f64,
    pub sales: f64,
}

impl Default for RoleWeights {
    fn default() -> Self {
        Self {
            rh: 0.4,
            manager: 0.3,
            sales: 0.3,
        }
    }
}

impl RoleWeights {
    pub fn weight(&self, role: EvaluatorRole) -> f64 {
        match role {
            EvaluatorRole::Rh => self.rh,
            EvaluatorRole::Manager => self.manager,
            EvaluatorRole::Sales => self.sales,
        }
    }
}

/// Deterministic score-to-outcome mapping for callers that want one.
///
/// The synthesizer never applies this; the judge owns the category boundary.
/// Callers may run it over `DecisionDetails::mean` or `weighted_score` after the fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionCutoffs {
    /// Scores at or above this are `HIRE`.
    pub hire: f64,
    /// Scores strictly below this are `REJECT`.
    pub reject: f64,
}

impl Default for DecisionCutoffs {
    fn default() -> Self {
        Self {
            hire: 7.5,
            reject: 6.0,
        }
    }
}

impl DecisionCutoffs {
    pub fn classify(&self, score: f64) -> Outcome {
        if score >= self.hire {
            Outcome::Hire
        } else if score < self.reject {
            Outcome::Reject
        } else {
            Outcome::Maybe
        }
    }
}

/// Configuration for one [`crate::round::Synthesizer`].
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    /// Negotiation runs when the largest deviation from the mean exceeds this.
    pub discrepancy_threshold: f64,
    pub evaluator_timeout: Duration,
    pub mediation_timeout: Duration,
    pub judgment_timeout: Duration,
    pub clarification_timeout: Duration,
    pub weights: RoleWeights,
    pub cutoffs: DecisionCutoffs,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            discrepancy_threshold: 2.0,
            evaluator_timeout: Duration::from_secs(60),
            mediation_timeout: Duration::from_secs(60),
            judgment_timeout: Duration::from_secs(60),
            clarification_timeout: Duration::from_secs(30),
            weights: RoleWeights::default(),
            cutoffs: DecisionCutoffs::default(),
        }
    }
}

impl SynthesisConfig {
    /// Defaults overridden by `HIREFLOW_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `HIREFLOW_*` key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = parse_f64(&lookup, ENV_DISCREPANCY_THRESHOLD)? {
            config.discrepancy_threshold = v;
        }
        if let Some(v) = parse_secs(&lookup, ENV_EVALUATOR_TIMEOUT)? {
            config.evaluator_timeout = v;
        }
        if let Some(v) = parse_secs(&lookup, ENV_MEDIATION_TIMEOUT)? {
            config.mediation_timeout = v;
        }
        if let Some(v) = parse_secs(&lookup, ENV_JUDGMENT_TIMEOUT)? {
            config.judgment_timeout = v;
        }
        if let Some(v) = parse_secs(&lookup, ENV_CLARIFICATION_TIMEOUT)? {
            config.clarification_timeout = v;
        }
        if let Some(v) = parse_f64(&lookup, ENV_HIRE_CUTOFF)? {
            config.cutoffs.hire = v;
        }
        if let Some(v) = parse_f64(&lookup, ENV_REJECT_CUTOFF)? {
            config.cutoffs.reject = v;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_discrepancy_threshold(mut self, threshold: f64) -> Self {
        self.discrepancy_threshold = threshold;
        self
    }

    pub fn with_evaluator_timeout(mut self, timeout: Duration) -> Self {
        self.evaluator_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.discrepancy_threshold.is_finite() || self.discrepancy_threshold < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "discrepancy threshold must be a non-negative number, got {}",
                self.discrepancy_threshold
            )));
        }

        let timeouts = [
            ("evaluator", self.evaluator_timeout),
            ("mediation", self.mediation_timeout),
            ("judgment", self.judgment_timeout),
            ("clarification", self.clarification_timeout),
        ];
        if let Some((stage, _)) = timeouts.iter().find(|(_, t)| t.is_zero()) {
            return Err(ConfigError::Invalid(format!(
                "{stage} timeout must be greater than zero"
            )));
        }

        let weights = [self.weights.rh, self.weights.manager, self.weights.sales];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ConfigError::Invalid(
                "role weights must be non-negative numbers".to_string(),
            ));
        }

        if !self.cutoffs.hire.is_finite() || !self.cutoffs.reject.is_finite() {
            return Err(ConfigError::Invalid("cutoffs must be finite".to_string()));
        }
        if self.cutoffs.reject > self.cutoffs.hire {
            return Err(ConfigError::Invalid(format!(
                "reject cutoff {} is above hire cutoff {}",
                self.cutoffs.reject, self.cutoffs.hire
            )));
        }
        Ok(())
    }
}

fn parse_f64<F>(lookup: &F, key: &str) -> Result<Option<f64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        })
}

fn parse_secs<F>(lookup: &F, key: &str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let secs: f64 = raw.trim().parse().map_err(|e: std::num::ParseFloatError| {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        }
    })?;
    Duration::try_from_secs_f64(secs)
        .map(Some)
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        })
}
