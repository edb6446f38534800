//! Evaluator vocabulary: `EvaluatorRole`, `Recommendation`, `EvaluationResult`, `EvaluationSet`.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::RoleWeights;
use crate::error::ParseError;

/// Lowest score an evaluator may give.
pub const SCORE_MIN: f64 = 1.0;
/// Highest score an evaluator may give.
pub const SCORE_MAX: f64 = 10.0;
/// Neutral score carried by a placeholder result.
pub const PLACEHOLDER_SCORE: f64 = 5.0;

/// Key under which a placeholder records why its evaluator failed.
pub const FAILURE_ASPECT: &str = "failure";

/// The evaluator roles on a hiring panel.
///
/// Declaration order is the iteration order of an [`EvaluationSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluatorRole {
    Rh,
    Manager,
    Sales,
}

impl EvaluatorRole {
    pub const ALL: [EvaluatorRole; 3] = [
        EvaluatorRole::Rh,
        EvaluatorRole::Manager,
        EvaluatorRole::Sales,
    ];

    /// The full panel in canonical order.
    pub fn standard_panel() -> Vec<EvaluatorRole> {
        Self::ALL.to_vec()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EvaluatorRole::Rh => "rh",
            EvaluatorRole::Manager => "manager",
            EvaluatorRole::Sales => "sales",
        }
    }

    /// What this evaluator judges (used in prompts and logs).
    pub fn focus(self) -> &'static str {
        match self {
            EvaluatorRole::Rh => "technical skills",
            EvaluatorRole::Manager => "culture fit and team dynamics",
            EvaluatorRole::Sales => "client understanding and business acumen",
        }
    }
}

impl std::fmt::Display for EvaluatorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvaluatorRole {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rh" | "technical" => Ok(EvaluatorRole::Rh),
            "manager" | "culture" => Ok(EvaluatorRole::Manager),
            "sales" | "client" => Ok(EvaluatorRole::Sales),
            other => Err(ParseError::UnknownLabel {
                kind: "evaluator role",
                label: other.to_string(),
            }),
        }
    }
}

/// An evaluator's categorical verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    StrongYes,
    Yes,
    Maybe,
    No,
}

impl Recommendation {
    pub fn as_str(self) -> &'static str {
        match self {
            Recommendation::StrongYes => "STRONG_YES",
            Recommendation::Yes => "YES",
            Recommendation::Maybe => "MAYBE",
            Recommendation::No => "NO",
        }
    }

    /// Parse a wire label. Case-insensitive; spaces and hyphens count as underscores.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "STRONG_YES" => Some(Recommendation::StrongYes),
            "YES" => Some(Recommendation::Yes),
            "MAYBE" => Some(Recommendation::Maybe),
            "NO" => Some(Recommendation::No),
            _ => None,
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One evaluator's judgment of one candidate for one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub evaluator: EvaluatorRole,
    /// Always within `[SCORE_MIN, SCORE_MAX]`, placeholders included.
    pub score: f64,
    pub recommendation: Recommendation,
    /// Named aspects of the judgment (justification, strengths, red flags, ...).
    #[serde(default)]
    pub rationale: BTreeMap<String, String>,
    /// Set only on placeholders: why the evaluator produced no real judgment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl EvaluationResult {
    /// A real judgment. Rejects scores outside `[SCORE_MIN, SCORE_MAX]`.
    pub fn new(
        evaluator: EvaluatorRole,
        score: f64,
        recommendation: Recommendation,
    ) -> Result<Self, ParseError> {
        if !score.is_finite() || !(SCORE_MIN..=SCORE_MAX).contains(&score) {
            return Err(ParseError::OutOfRange {
                field: "score",
                value: score,
                min: SCORE_MIN,
                max: SCORE_MAX,
            });
        }
        Ok(Self {
            evaluator,
            score,
            recommendation,
            rationale: BTreeMap::new(),
            failure: None,
        })
    }

    pub fn with_aspect(mut self, aspect: impl Into<String>, text: impl Into<String>) -> Self {
        self.rationale.insert(aspect.into(), text.into());
        self
    }

    /// Neutral stand-in for an evaluator that failed.
    pub fn placeholder(evaluator: EvaluatorRole, cause: impl Into<String>) -> Self {
        let cause = cause.into();
        let mut rationale = BTreeMap::new();
        rationale.insert(FAILURE_ASPECT.to_string(), cause.clone());
        Self {
            evaluator,
            score: PLACEHOLDER_SCORE,
            recommendation: Recommendation::Maybe,
            rationale,
            failure: Some(cause),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.failure.is_some()
    }
}

/// Complete mapping of evaluator role to result for one round.
///
/// Every requested role has an entry; failed evaluators hold placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationSet {
    results: BTreeMap<EvaluatorRole, EvaluationResult>,
}

impl EvaluationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set keyed by each result's evaluator. Later duplicates replace earlier ones.
    pub fn from_results(results: impl IntoIterator<Item = EvaluationResult>) -> Self {
        Self {
            results: results.into_iter().map(|r| (r.evaluator, r)).collect(),
        }
    }

    pub fn get(&self, role: EvaluatorRole) -> Option<&EvaluationResult> {
        self.results.get(&role)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EvaluatorRole, &EvaluationResult)> {
        self.results.iter()
    }

    pub fn roles(&self) -> Vec<EvaluatorRole> {
        self.results.keys().copied().collect()
    }

    pub fn scores(&self) -> BTreeMap<EvaluatorRole, f64> {
        self.results.iter().map(|(r, e)| (*r, e.score)).collect()
    }

    /// Unweighted arithmetic mean of all scores, placeholders included.
    pub fn mean(&self) -> Option<f64> {
        if self.results.is_empty() {
            return None;
        }
        let total: f64 = self.results.values().map(|e| e.score).sum();
        Some(total / self.results.len() as f64)
    }

    /// Mean weighted by `weights`, renormalized over the roles present.
    pub fn weighted_score(&self, weights: &RoleWeights) -> Option<f64> {
        let (sum, weight_total) = self
            .results
            .iter()
            .fold((0.0, 0.0), |(sum, total), (role, e)| {
                let w = weights.weight(*role);
                (sum + w * e.score, total + w)
            });
        (weight_total > 0.0).then(|| sum / weight_total)
    }

    /// Roles whose entry is a placeholder.
    pub fn placeholders(&self) -> Vec<EvaluatorRole> {
        self.results
            .values()
            .filter(|e| e.is_placeholder())
            .map(|e| e.evaluator)
            .collect()
    }

    /// SHA-256 hex digest of the canonical JSON form.
    ///
    /// Identical sets always produce identical digests (keys are ordered).
    pub fn digest(&self) -> Result<String, serde_json::Error> {
        use sha2::Digest as _;
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(sha2::Sha256::digest(&bytes)))
    }

    pub(crate) fn insert(&mut self, result: EvaluationResult) {
        self.results.insert(result.evaluator, result);
    }
}
