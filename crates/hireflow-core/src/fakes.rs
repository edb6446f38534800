//! Scripted in-memory capabilities (testing and offline runs)
//!
//! Provides `ScriptedEvaluator` (one script per role) and `ScriptedCapability`
//! (one script for a mediator, judge or clarifier). Both count their calls so
//! tests can assert how often the pipeline reached them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::capability::{Clarifier, Evaluator, Judge, Mediator};
use crate::domain::{CandidateProfile, ConsensusResult, EvaluationSet, EvaluatorRole};
use crate::error::CapabilityError;

/// What a scripted capability does when called.
#[derive(Debug, Clone)]
pub enum Script {
    /// Return this text.
    Reply(String),
    /// Return this text after a delay.
    Delayed(Duration, String),
    /// Fail with `CapabilityError::Transport`.
    Fail(String),
    /// Never resolve.
    Hang,
    /// Panic inside the call.
    Panic,
}

impl Script {
    pub fn reply(text: impl Into<String>) -> Self {
        Script::Reply(text.into())
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Script::Fail(message.into())
    }

    /// Evaluator reply wrapping a JSON object in prose.
    pub fn evaluation(score: f64, recommendation: &str) -> Self {
        Script::Reply(format!(
            "After reviewing the candidate, here is my assessment:\n\
             {{\"score\": {score}, \"recommendation\": \"{recommendation}\", \
             \"justification\": \"scripted evaluation\"}}\n"
        ))
    }

    /// Mediator reply.
    pub fn consensus(score: f64, reasoning: &str) -> Self {
        Script::Reply(format!(
            "{{\"consensus_score\": {score}, \"reasoning\": \"{reasoning}\"}}"
        ))
    }

    /// Judge reply.
    pub fn judgment(final_decision: &str, confidence: f64, reasoning: &str) -> Self {
        Script::Reply(format!(
            "Decision follows.\n{{\"final_decision\": \"{final_decision}\", \
             \"confidence_score\": {confidence}, \"reasoning\": \"{reasoning}\", \
             \"details\": {{}}}}"
        ))
    }

    async fn play(&self) -> Result<String, CapabilityError> {
        match self {
            Script::Reply(text) => Ok(text.clone()),
            Script::Delayed(delay, text) => {
                tokio::time::sleep(*delay).await;
                Ok(text.clone())
            }
            Script::Fail(message) => Err(CapabilityError::Transport(message.clone())),
            Script::Hang => std::future::pending().await,
            Script::Panic => panic!("scripted capability panic"),
        }
    }
}

/// Evaluator whose answer depends only on the role asked.
#[derive(Debug, Default)]
pub struct ScriptedEvaluator {
    scripts: HashMap<EvaluatorRole, Script>,
    calls: Mutex<Vec<EvaluatorRole>>,
    completed: AtomicUsize,
}

impl ScriptedEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, role: EvaluatorRole, script: Script) -> Self {
        self.scripts.insert(role, script);
        self
    }

    /// Every listed role replies with a well-formed evaluation.
    pub fn with_scores(scores: &[(EvaluatorRole, f64)]) -> Self {
        scores.iter().fold(Self::new(), |fake, (role, score)| {
            let recommendation = if *score >= 7.0 { "YES" } else { "MAYBE" };
            fake.with(*role, Script::evaluation(*score, recommendation))
        })
    }

    /// Roles invoked so far, in call order.
    pub fn calls(&self) -> Vec<EvaluatorRole> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Calls whose script ran to the end (replied or failed).
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Evaluator for ScriptedEvaluator {
    async fn invoke(
        &self,
        role: EvaluatorRole,
        _candidate: &CandidateProfile,
    ) -> Result<String, CapabilityError> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(role);
        let result = match self.scripts.get(&role) {
            Some(script) => script.play().await,
            None => Err(CapabilityError::Other(format!("no script for role {role}"))),
        };
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}

/// Mediator, judge or clarifier that always plays the same script.
#[derive(Debug)]
pub struct ScriptedCapability {
    script: Script,
    calls: AtomicUsize,
    last_consensus: Mutex<Option<ConsensusResult>>,
}

impl ScriptedCapability {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            last_consensus: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Consensus passed to the most recent `judge` call.
    pub fn last_consensus(&self) -> Option<ConsensusResult> {
        self.last_consensus.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    async fn respond(&self) -> Result<String, CapabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script.play().await
    }
}

#[async_trait]
impl Mediator for ScriptedCapability {
    async fn mediate(&self, _evaluations: &EvaluationSet) -> Result<String, CapabilityError> {
        self.respond().await
    }
}

#[async_trait]
impl Judge for ScriptedCapability {
    async fn judge(
        &self,
        _evaluations: &EvaluationSet,
        consensus: Option<&ConsensusResult>,
    ) -> Result<String, CapabilityError> {
        *self.last_consensus.lock().unwrap_or_else(PoisonError::into_inner) = consensus.cloned();
        self.respond().await
    }
}

#[async_trait]
impl Clarifier for ScriptedCapability {
    async fn clarify(&self, _evaluations: &EvaluationSet) -> Result<String, CapabilityError> {
        self.respond().await
    }
}
