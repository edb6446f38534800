//! Discrepancy detection: does the panel disagree enough to negotiate?
//!
//! Pure function of the evaluation set and the configured threshold.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{EvaluationSet, EvaluatorRole};

/// How far each evaluator sits from the panel mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscrepancyReport {
    /// `None` only for an empty set.
    pub mean: Option<f64>,
    /// Absolute deviation of each score from `mean`.
    pub deviations: BTreeMap<EvaluatorRole, f64>,
    pub max_deviation: f64,
    pub threshold: f64,
    /// `max_deviation > threshold`.
    pub requires_negotiation: bool,
}

/// Compare every score against the mean of all scores.
///
/// Placeholders take part with their neutral score. Negotiation is required
/// iff the largest absolute deviation strictly exceeds `threshold`.
pub fn detect_discrepancy(evaluations: &EvaluationSet, threshold: f64) -> DiscrepancyReport {
    let Some(mean) = evaluations.mean() else {
        return DiscrepancyReport {
            mean: None,
            deviations: BTreeMap::new(),
            max_deviation: 0.0,
            threshold,
            requires_negotiation: false,
        };
    };

    let deviations: BTreeMap<EvaluatorRole, f64> = evaluations
        .iter()
        .map(|(role, e)| (*role, (e.score - mean).abs()))
        .collect();
    let max_deviation = deviations.values().copied().fold(0.0, f64::max);

    DiscrepancyReport {
        mean: Some(mean),
        deviations,
        max_deviation,
        threshold,
        requires_negotiation: max_deviation > threshold,
    }
}

/// Shorthand for `detect_discrepancy(..).requires_negotiation`.
pub fn requires_negotiation(evaluations: &EvaluationSet, threshold: f64) -> bool {
    detect_discrepancy(evaluations, threshold).requires_negotiation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EvaluationResult, Recommendation};

    fn set(scores: &[(EvaluatorRole, f64)]) -> EvaluationSet {
        EvaluationSet::from_results(scores.iter().map(|(role, score)| {
            EvaluationResult::new(*role, *score, Recommendation::Yes).unwrap()
        }))
    }

    #[test]
    fn test_close_scores_do_not_require_negotiation() {
        let report = detect_discrepancy(
            &set(&[
                (EvaluatorRole::Rh, 8.0),
                (EvaluatorRole::Manager, 7.0),
                (EvaluatorRole::Sales, 8.0),
            ]),
            2.0,
        );
        let mean = report.mean.unwrap();
        assert!((mean - 23.0 / 3.0).abs() < 1e-9);
        assert!((report.max_deviation - 2.0 / 3.0).abs() < 1e-9);
        assert!(!report.requires_negotiation);
    }

    #[test]
    fn test_spread_scores_require_negotiation() {
        let report = detect_discrepancy(
            &set(&[
                (EvaluatorRole::Rh, 9.0),
                (EvaluatorRole::Manager, 4.0),
                (EvaluatorRole::Sales, 8.0),
            ]),
            2.0,
        );
        assert_eq!(report.mean, Some(7.0));
        assert_eq!(report.max_deviation, 3.0);
        assert_eq!(report.deviations[&EvaluatorRole::Manager], 3.0);
        assert!(report.requires_negotiation);
    }

    #[test]
    fn test_deviation_equal_to_threshold_does_not_trigger() {
        let evaluations = set(&[(EvaluatorRole::Rh, 9.0), (EvaluatorRole::Manager, 5.0)]);
        assert!(!requires_negotiation(&evaluations, 2.0));
        assert!(requires_negotiation(&evaluations, 1.99));
    }

    #[test]
    fn test_is_deterministic() {
        let evaluations = set(&[
            (EvaluatorRole::Rh, 2.5),
            (EvaluatorRole::Manager, 9.5),
            (EvaluatorRole::Sales, 6.0),
        ]);
        let first = detect_discrepancy(&evaluations, 1.5);
        for _ in 0..10 {
            assert_eq!(detect_discrepancy(&evaluations, 1.5), first);
        }
    }

    #[test]
    fn test_empty_and_single_evaluator_sets() {
        assert!(!requires_negotiation(&EvaluationSet::new(), 0.0));
        assert!(!requires_negotiation(&set(&[(EvaluatorRole::Sales, 1.0)]), 0.0));
    }
}
