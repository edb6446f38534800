//! End-to-end round tests against scripted capabilities.

use std::sync::Arc;
use std::time::Duration;

use hireflow_core::domain::{FOLLOW_UP_NOTE, MANUAL_REVIEW_RATIONALE, PLACEHOLDER_SCORE};
use hireflow_core::fakes::{Script, ScriptedCapability, ScriptedEvaluator};
use hireflow_core::{
    CandidateProfile, EvaluatorRole, Outcome, Recommendation, RoundOutcome, RoundState,
    SynthesisConfig, Synthesizer,
};

use EvaluatorRole::{Manager, Rh, Sales};

struct Panel {
    evaluator: Arc<ScriptedEvaluator>,
    mediator: Arc<ScriptedCapability>,
    judge: Arc<ScriptedCapability>,
    clarifier: Arc<ScriptedCapability>,
}

impl Panel {
    fn new(evaluator: ScriptedEvaluator, mediator: Script, judge: Script, clarifier: Script) -> Self {
        Self {
            evaluator: Arc::new(evaluator),
            mediator: Arc::new(ScriptedCapability::new(mediator)),
            judge: Arc::new(ScriptedCapability::new(judge)),
            clarifier: Arc::new(ScriptedCapability::new(clarifier)),
        }
    }

    fn synthesizer(&self, config: SynthesisConfig) -> Synthesizer {
        Synthesizer::new(
            self.evaluator.clone(),
            self.mediator.clone(),
            self.judge.clone(),
            self.clarifier.clone(),
            config,
        )
    }

    async fn run(&self) -> RoundOutcome {
        self.synthesizer(SynthesisConfig::default())
            .synthesize(&candidate(), &EvaluatorRole::standard_panel())
            .await
    }
}

fn candidate() -> CandidateProfile {
    CandidateProfile::new(
        "test-001",
        "Senior Backend Engineer with 7 years experience; led a team of 3.",
        "Senior Backend Engineer",
    )
    .with_name("Alice")
}

fn hire_judgment() -> Script {
    Script::judgment("HIRE", 0.85, "Consistently strong across the panel")
}

fn question() -> Script {
    Script::reply("Can you walk us through a production incident you owned end to end?")
}

#[tokio::test]
async fn test_close_scores_skip_mediation() {
    let panel = Panel::new(
        ScriptedEvaluator::with_scores(&[(Rh, 8.0), (Manager, 7.0), (Sales, 8.0)]),
        Script::consensus(7.5, "unused"),
        hire_judgment(),
        question(),
    );

    let outcome = panel.run().await;

    assert_eq!(panel.mediator.call_count(), 0);
    assert!(!outcome.discrepancy.requires_negotiation);
    assert!((outcome.discrepancy.max_deviation - 2.0 / 3.0).abs() < 1e-9);
    assert!(outcome.consensus.is_none());
    assert!(!outcome.negotiated());
    assert_eq!(panel.judge.last_consensus(), None);

    let decision = &outcome.decision;
    assert_eq!(decision.outcome, Outcome::Hire);
    assert_eq!(decision.details.consensus_score, None);
    assert_eq!(decision.details.scores[&Manager], 7.0);
    assert!((decision.details.mean.unwrap() - 23.0 / 3.0).abs() < 1e-9);
    assert_eq!(panel.clarifier.call_count(), 0);
}

#[tokio::test]
async fn test_spread_scores_trigger_single_mediation() {
    let panel = Panel::new(
        ScriptedEvaluator::with_scores(&[(Rh, 9.0), (Manager, 4.0), (Sales, 8.0)]),
        Script::consensus(7.5, "Manager concerns are about ramp-up, not ability"),
        hire_judgment(),
        question(),
    );

    let outcome = panel.run().await;

    assert_eq!(panel.mediator.call_count(), 1);
    assert_eq!(outcome.discrepancy.mean, Some(7.0));
    assert_eq!(outcome.discrepancy.max_deviation, 3.0);
    assert!(outcome.negotiated());

    let consensus = outcome.consensus.clone().expect("mediation succeeded");
    assert_eq!(consensus.score, 7.5);
    assert_eq!(panel.judge.last_consensus(), Some(consensus));
    assert_eq!(outcome.decision.details.consensus_score, Some(7.5));
    assert_eq!(outcome.decision.details.mean, Some(7.0));
}

#[tokio::test]
async fn test_failed_evaluator_gets_placeholder_and_round_completes() {
    let evaluator = ScriptedEvaluator::with_scores(&[(Rh, 8.0), (Sales, 7.0)])
        .with(Manager, Script::fail("request timed out"));
    let panel = Panel::new(evaluator, Script::consensus(6.0, "x"), hire_judgment(), question());

    let outcome = panel.run().await;

    assert_eq!(outcome.evaluations.len(), 3);
    let manager = outcome.evaluations.get(Manager).expect("manager entry present");
    assert!(manager.is_placeholder());
    assert_eq!(manager.score, PLACEHOLDER_SCORE);
    assert_eq!(manager.recommendation, Recommendation::Maybe);
    assert!(manager.failure.as_deref().unwrap().contains("request timed out"));

    assert!(!outcome.evaluations.get(Rh).unwrap().is_placeholder());
    assert_eq!(outcome.evaluations.placeholders(), vec![Manager]);
    assert_eq!(*outcome.transitions.last().unwrap(), RoundState::Decided);
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_evaluator_gets_placeholder() {
    let evaluator = ScriptedEvaluator::with_scores(&[(Rh, 8.0), (Sales, 7.0)])
        .with(Manager, Script::Hang);
    let panel = Panel::new(evaluator, Script::consensus(6.0, "x"), hire_judgment(), question());
    let config = SynthesisConfig::default().with_evaluator_timeout(Duration::from_secs(5));

    let outcome = panel
        .synthesizer(config)
        .synthesize(&candidate(), &EvaluatorRole::standard_panel())
        .await;

    let manager = outcome.evaluations.get(Manager).unwrap();
    assert!(manager.is_placeholder());
    assert!(manager.failure.as_deref().unwrap().contains("timed out after 5000ms"));
    assert_eq!(outcome.decision.outcome, Outcome::Hire);
}

#[tokio::test]
async fn test_maybe_without_question_gets_exactly_one_clarification() {
    let panel = Panel::new(
        ScriptedEvaluator::with_scores(&[(Rh, 7.0), (Manager, 6.0), (Sales, 6.5)]),
        Script::consensus(6.5, "unused"),
        Script::judgment("MAYBE", 0.55, "Mixed signals on ownership"),
        Script::reply("\n  How do you prioritise competing client requests?  \n"),
    );

    let outcome = panel.run().await;
    let decision = &outcome.decision;

    assert_eq!(decision.outcome, Outcome::Maybe);
    assert_eq!(panel.clarifier.call_count(), 1);
    assert_eq!(
        decision.clarification_question.as_deref(),
        Some("How do you prioritise competing client requests?")
    );
    assert!(decision.rationale.starts_with("Mixed signals on ownership"));
    assert!(decision.rationale.ends_with(FOLLOW_UP_NOTE));
}

#[tokio::test]
async fn test_judge_supplied_question_is_kept() {
    let judge = Script::reply(
        r#"{"final_decision": "MAYBE", "confidence_score": 0.5, "reasoning": "borderline",
            "clarification_question": "Why are you leaving your current role?"}"#,
    );
    let panel = Panel::new(
        ScriptedEvaluator::with_scores(&[(Rh, 6.0), (Manager, 6.0), (Sales, 6.0)]),
        Script::consensus(6.0, "unused"),
        judge,
        question(),
    );

    let outcome = panel.run().await;

    assert_eq!(panel.clarifier.call_count(), 0);
    assert_eq!(
        outcome.decision.clarification_question.as_deref(),
        Some("Why are you leaving your current role?")
    );
    assert_eq!(outcome.decision.rationale, "borderline");
}

#[tokio::test]
async fn test_judge_question_on_conclusive_outcome_is_dropped() {
    for label in ["HIRE", "REJECT"] {
        let judge = Script::reply(format!(
            r#"{{"final_decision": "{label}", "confidence_score": 0.9, "reasoning": "clear call",
                "clarification_question": "Why leave?"}}"#
        ));
        let panel = Panel::new(
            ScriptedEvaluator::with_scores(&[(Rh, 8.0), (Manager, 8.0), (Sales, 8.0)]),
            Script::consensus(8.0, "unused"),
            judge,
            question(),
        );

        let outcome = panel.run().await;

        assert_ne!(outcome.decision.outcome, Outcome::Maybe);
        assert_eq!(outcome.decision.clarification_question, None, "{label}");
        assert_eq!(outcome.decision.rationale, "clear call");
        assert_eq!(panel.clarifier.call_count(), 0);
    }
}

#[tokio::test]
async fn test_every_capability_failing_still_yields_decision() {
    let evaluator = ScriptedEvaluator::new()
        .with(Rh, Script::fail("down"))
        .with(Manager, Script::fail("down"))
        .with(Sales, Script::fail("down"));
    let panel = Panel::new(
        evaluator,
        Script::fail("mediator down"),
        Script::fail("judge down"),
        Script::fail("clarifier down"),
    );

    let outcome = panel.run().await;

    assert_eq!(outcome.evaluations.len(), 3);
    assert_eq!(outcome.evaluations.placeholders().len(), 3);
    // All placeholders share the neutral score, so nothing to negotiate.
    assert_eq!(panel.mediator.call_count(), 0);

    let decision = &outcome.decision;
    assert_eq!(decision.outcome, Outcome::Maybe);
    assert_eq!(decision.confidence, 0.5);
    assert_eq!(decision.rationale, MANUAL_REVIEW_RATIONALE);
    assert!(decision.details.is_empty());
    assert!(decision.manual_review);
    assert_eq!(panel.clarifier.call_count(), 1);
    assert_eq!(decision.clarification_question, None);
}

#[tokio::test]
async fn test_mediator_failure_is_soft() {
    let panel = Panel::new(
        ScriptedEvaluator::with_scores(&[(Rh, 10.0), (Manager, 2.0), (Sales, 7.0)]),
        Script::fail("mediator unreachable"),
        Script::judgment("REJECT", 0.6, "Culture concerns dominate"),
        question(),
    );

    let outcome = panel.run().await;

    assert_eq!(panel.mediator.call_count(), 1);
    assert!(outcome.negotiated());
    assert!(outcome.consensus.is_none());
    assert_eq!(panel.judge.last_consensus(), None);
    assert_eq!(outcome.decision.outcome, Outcome::Reject);
    assert_eq!(outcome.decision.details.consensus_score, None);
}

#[tokio::test]
async fn test_out_of_range_consensus_is_discarded() {
    let panel = Panel::new(
        ScriptedEvaluator::with_scores(&[(Rh, 10.0), (Manager, 2.0), (Sales, 7.0)]),
        Script::consensus(14.0, "overflow"),
        hire_judgment(),
        question(),
    );

    let outcome = panel.run().await;

    assert_eq!(panel.mediator.call_count(), 1);
    assert!(outcome.consensus.is_none());
}

#[tokio::test]
async fn test_unparseable_judgment_falls_back_and_asks_for_clarification() {
    let panel = Panel::new(
        ScriptedEvaluator::with_scores(&[(Rh, 8.0), (Manager, 8.0), (Sales, 8.0)]),
        Script::consensus(8.0, "unused"),
        Script::reply("I would hire them, they seem great."),
        question(),
    );

    let outcome = panel.run().await;
    let decision = &outcome.decision;

    assert!(decision.manual_review);
    assert_eq!(decision.outcome, Outcome::Maybe);
    assert!(decision.details.is_empty());
    assert!(decision.clarification_question.is_some());
    assert!(decision.rationale.starts_with(MANUAL_REVIEW_RATIONALE));
}

#[tokio::test]
async fn test_pass_label_maps_to_reject() {
    let panel = Panel::new(
        ScriptedEvaluator::with_scores(&[(Rh, 4.0), (Manager, 5.0), (Sales, 4.5)]),
        Script::consensus(4.5, "unused"),
        Script::judgment("PASS", 0.9, "Below the bar"),
        question(),
    );

    let outcome = panel.run().await;
    assert_eq!(outcome.decision.outcome, Outcome::Reject);
}

#[tokio::test]
async fn test_mediator_invocation_follows_discrepancy_decision() {
    let cases: [[f64; 3]; 6] = [
        [8.0, 7.0, 8.0],
        [9.0, 4.0, 8.0],
        [5.0, 5.0, 5.0],
        [1.0, 10.0, 5.5],
        [7.0, 9.0, 5.0],
        [6.0, 9.5, 6.0],
    ];
    let config = SynthesisConfig::default();

    for [rh, manager, sales] in cases {
        let panel = Panel::new(
            ScriptedEvaluator::with_scores(&[(Rh, rh), (Manager, manager), (Sales, sales)]),
            Script::consensus(6.0, "reconciled"),
            hire_judgment(),
            question(),
        );
        let outcome = panel.run().await;

        let expected = usize::from(outcome.discrepancy.max_deviation > config.discrepancy_threshold);
        assert_eq!(
            panel.mediator.call_count(),
            expected,
            "scores {rh}/{manager}/{sales}"
        );
        if let Some(consensus) = &outcome.consensus {
            assert!((1.0..=10.0).contains(&consensus.score));
        }
        assert!((0.0..=1.0).contains(&outcome.decision.confidence));
    }
}

#[tokio::test]
async fn test_transitions_follow_round_state_machine() {
    let panel = Panel::new(
        ScriptedEvaluator::with_scores(&[(Rh, 9.0), (Manager, 4.0), (Sales, 8.0)]),
        Script::consensus(7.0, "ok"),
        hire_judgment(),
        question(),
    );
    let outcome = panel.run().await;

    assert_eq!(
        outcome.transitions,
        vec![
            RoundState::Pending,
            RoundState::Evaluating,
            RoundState::Negotiating,
            RoundState::Synthesizing,
            RoundState::Decided,
        ]
    );
    for pair in outcome.transitions.windows(2) {
        assert!(pair[0].can_advance_to(pair[1]));
    }
}

#[tokio::test]
async fn test_round_outcome_serializes_for_persistence() {
    let panel = Panel::new(
        ScriptedEvaluator::with_scores(&[(Rh, 8.0), (Manager, 7.0), (Sales, 8.0)]),
        Script::consensus(7.5, "unused"),
        hire_judgment(),
        question(),
    );
    let outcome = panel.run().await;

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["decision"]["outcome"], "HIRE");
    assert_eq!(json["evaluations"]["rh"]["score"], 8.0);
    assert_eq!(json["transitions"][0], "pending");
    assert_eq!(json["candidate_id"], "test-001");
    assert!(outcome.evaluations.digest().unwrap().len() == 64);
}
