//! Capability implementations backed by a [`Completion`]
//!
//! Each adapter builds its prompt, sends it, and hands the raw text back to the
//! core pipeline, which does all parsing and validation.

use std::sync::Arc;

use async_trait::async_trait;
use hireflow_core::{
    CandidateProfile, CapabilityError, Clarifier, ConsensusResult, EvaluationSet, Evaluator,
    EvaluatorRole, Judge, Mediator, RoleWeights, SynthesisConfig, Synthesizer,
};
use tracing::debug;

use crate::client::{Completion, MessagesClient};
use crate::config::ModelConfig;
use crate::error::Result;
use crate::prompts::{self, Prompt};

async fn send(client: &dyn Completion, prompt: Prompt) -> std::result::Result<String, CapabilityError> {
    client
        .complete(&prompt.system, &prompt.user)
        .await
        .map_err(CapabilityError::from)
}

/// One instance serves every role; the role picks the persona.
pub struct PromptedEvaluator {
    client: Arc<dyn Completion>,
}

impl PromptedEvaluator {
    pub fn new(client: Arc<dyn Completion>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Evaluator for PromptedEvaluator {
    async fn invoke(
        &self,
        role: EvaluatorRole,
        candidate: &CandidateProfile,
    ) -> std::result::Result<String, CapabilityError> {
        debug!(role = %role, candidate_id = %candidate.id, "requesting evaluation");
        send(self.client.as_ref(), prompts::evaluation(role, candidate)).await
    }
}

pub struct PromptedMediator {
    client: Arc<dyn Completion>,
}

impl PromptedMediator {
    pub fn new(client: Arc<dyn Completion>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Mediator for PromptedMediator {
    async fn mediate(
        &self,
        evaluations: &EvaluationSet,
    ) -> std::result::Result<String, CapabilityError> {
        send(self.client.as_ref(), prompts::mediation(evaluations)).await
    }
}

/// Judge that tells the model which role weights to apply.
pub struct PromptedJudge {
    client: Arc<dyn Completion>,
    weights: RoleWeights,
}

impl PromptedJudge {
    pub fn new(client: Arc<dyn Completion>, weights: RoleWeights) -> Self {
        Self { client, weights }
    }
}

#[async_trait]
impl Judge for PromptedJudge {
    async fn judge(
        &self,
        evaluations: &EvaluationSet,
        consensus: Option<&ConsensusResult>,
    ) -> std::result::Result<String, CapabilityError> {
        let prompt = prompts::judgment(evaluations, consensus, &self.weights);
        send(self.client.as_ref(), prompt).await
    }
}

pub struct PromptedClarifier {
    client: Arc<dyn Completion>,
}

impl PromptedClarifier {
    pub fn new(client: Arc<dyn Completion>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Clarifier for PromptedClarifier {
    async fn clarify(
        &self,
        evaluations: &EvaluationSet,
    ) -> std::result::Result<String, CapabilityError> {
        send(self.client.as_ref(), prompts::clarification(evaluations)).await
    }
}

/// The four capabilities of a round, sharing one completion client.
#[derive(Clone)]
pub struct AgentPanel {
    pub evaluator: Arc<dyn Evaluator>,
    pub mediator: Arc<dyn Mediator>,
    pub judge: Arc<dyn Judge>,
    pub clarifier: Arc<dyn Clarifier>,
}

impl AgentPanel {
    /// Build a panel talking to the messages API described by `config`.
    pub fn from_config(config: ModelConfig, weights: RoleWeights) -> Result<Self> {
        let client: Arc<dyn Completion> = Arc::new(MessagesClient::new(config)?);
        Ok(Self::with_completion(client, weights))
    }

    pub fn with_completion(client: Arc<dyn Completion>, weights: RoleWeights) -> Self {
        Self {
            evaluator: Arc::new(PromptedEvaluator::new(Arc::clone(&client))),
            mediator: Arc::new(PromptedMediator::new(Arc::clone(&client))),
            judge: Arc::new(PromptedJudge::new(Arc::clone(&client), weights)),
            clarifier: Arc::new(PromptedClarifier::new(client)),
        }
    }

    pub fn into_synthesizer(self, config: SynthesisConfig) -> Synthesizer {
        Synthesizer::new(
            self.evaluator,
            self.mediator,
            self.judge,
            self.clarifier,
            config,
        )
    }
}
