//! Hireflow CLI
//!
//! The `hireflow` command runs candidate evaluation rounds.
//!
//! ## Commands
//!
//! - `evaluate`: Run one full round for a candidate file and print the decision
//! - `classify`: Map a numeric score to HIRE / MAYBE / REJECT with fixed cutoffs

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use hireflow_agents::{AgentPanel, ModelConfig};
use hireflow_core::{
    CancelSignal, CandidateProfile, DecisionCutoffs, EvaluatorRole, Outcome, RoundOutcome,
    SynthesisConfig, Synthesizer, METRICS,
};
use serde::Serialize;
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "hireflow")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Multi-evaluator hiring decision synthesis", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one evaluation round for a candidate
    Evaluate {
        /// Path to candidate profile (JSON)
        #[arg(short, long)]
        candidate: PathBuf,

        /// Evaluator roles to consult, comma separated
        #[arg(long, value_delimiter = ',', default_values_t = EvaluatorRole::standard_panel())]
        roles: Vec<EvaluatorRole>,

        /// Max deviation from the mean tolerated before negotiation
        #[arg(long)]
        threshold: Option<f64>,

        /// Per-evaluator timeout in seconds
        #[arg(long)]
        evaluator_timeout: Option<u64>,

        /// Model override
        #[arg(long, env = "HIREFLOW_MODEL")]
        model: Option<String>,

        /// Print the full round outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Map a score to an outcome using the decision cutoffs
    Classify {
        /// Score in [1, 10]
        score: f64,

        /// Scores at or above this are HIRE
        #[arg(long)]
        hire_cutoff: Option<f64>,

        /// Scores below this are REJECT
        #[arg(long)]
        reject_cutoff: Option<f64>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    hireflow_core::init_tracing(cli.json_logs, level);

    match cli.command {
        Commands::Evaluate {
            candidate,
            roles,
            threshold,
            evaluator_timeout,
            model,
            json,
        } => {
            let config = round_config(
                SynthesisConfig::from_env().context("invalid HIREFLOW_* configuration")?,
                threshold,
                evaluator_timeout,
            )?;
            let mut model_config = ModelConfig::from_env().context("invalid model configuration")?;
            if let Some(model) = model.as_deref() {
                model_config = model_config.with_model(model);
            }
            let synthesizer = AgentPanel::from_config(model_config, config.weights.clone())
                .context("Failed to set up model client")?
                .into_synthesizer(config);

            cmd_evaluate(&synthesizer, &candidate, &roles, json).await
        }
        Commands::Classify {
            score,
            hire_cutoff,
            reject_cutoff,
            json,
        } => {
            let config =
                SynthesisConfig::from_env().context("invalid HIREFLOW_* configuration")?;
            cmd_classify(score, cutoffs(config, hire_cutoff, reject_cutoff)?, json)
        }
    }
}

/// Apply command-line overrides on top of the environment configuration.
fn round_config(
    mut config: SynthesisConfig,
    threshold: Option<f64>,
    evaluator_timeout: Option<u64>,
) -> Result<SynthesisConfig> {
    if let Some(threshold) = threshold {
        config = config.with_discrepancy_threshold(threshold);
    }
    if let Some(secs) = evaluator_timeout {
        config = config.with_evaluator_timeout(Duration::from_secs(secs));
    }
    config.validate()?;
    Ok(config)
}

fn cutoffs(
    mut config: SynthesisConfig,
    hire: Option<f64>,
    reject: Option<f64>,
) -> Result<DecisionCutoffs> {
    if let Some(hire) = hire {
        config.cutoffs.hire = hire;
    }
    if let Some(reject) = reject {
        config.cutoffs.reject = reject;
    }
    config.validate()?;
    Ok(config.cutoffs)
}

fn load_candidate(path: &Path) -> Result<CandidateProfile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read candidate file {}", path.display()))?;
    let candidate: CandidateProfile = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid candidate profile in {}", path.display()))?;
    if candidate.resume.trim().is_empty() {
        bail!("candidate {} has an empty resume", candidate.id);
    }
    Ok(candidate)
}

async fn cmd_evaluate(
    synthesizer: &Synthesizer,
    path: &Path,
    roles: &[EvaluatorRole],
    json: bool,
) -> Result<()> {
    let candidate = load_candidate(path)?;
    info!(candidate_id = %candidate.id, roles = roles.len(), "Starting evaluation round");

    let cancel = CancelSignal::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling round");
            trigger.cancel();
        }
    });

    let outcome = synthesizer
        .synthesize_cancellable(&candidate, roles, &cancel)
        .await?;
    METRICS.flush();

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", OutcomeReport(&outcome));
    }
    Ok(())
}

/// Human-readable summary of a finished round.
struct OutcomeReport<'a>(&'a RoundOutcome);

impl fmt::Display for OutcomeReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self.0;
        let decision = &outcome.decision;

        writeln!(f, "Candidate: {}", outcome.candidate_id)?;
        writeln!(f, "Round:     {}", outcome.round_id)?;
        writeln!(f)?;
        writeln!(f, "Evaluations:")?;
        for (role, result) in outcome.evaluations.iter() {
            let marker = if result.is_placeholder() {
                " (placeholder)"
            } else {
                ""
            };
            writeln!(
                f,
                "  {:<8} {:>4.1}  {}{}",
                role.as_str(),
                result.score,
                result.recommendation,
                marker
            )?;
            if let Some(failure) = &result.failure {
                writeln!(f, "           {failure}")?;
            }
        }

        let report = &outcome.discrepancy;
        if let Some(mean) = report.mean {
            writeln!(
                f,
                "  mean {:.2}, max deviation {:.2} (threshold {:.2})",
                mean, report.max_deviation, report.threshold
            )?;
        }
        if let Some(consensus) = &outcome.consensus {
            writeln!(f)?;
            writeln!(f, "Consensus: {:.1}  {}", consensus.score, consensus.rationale)?;
        } else if outcome.negotiated() {
            writeln!(f)?;
            writeln!(f, "Consensus: negotiation failed")?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "Decision:   {} (confidence {:.2})",
            decision.outcome, decision.confidence
        )?;
        if decision.manual_review {
            writeln!(f, "            manual review required")?;
        }
        if let Some(weighted) = decision.details.weighted_score {
            writeln!(f, "Weighted:   {weighted:.2}")?;
        }
        writeln!(f, "Rationale:  {}", decision.rationale)?;
        if let Some(question) = &decision.clarification_question {
            writeln!(f, "Follow-up:  {question}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct Classification {
    score: f64,
    outcome: Outcome,
    hire_cutoff: f64,
    reject_cutoff: f64,
}

fn classify(score: f64, cutoffs: &DecisionCutoffs) -> Result<Classification> {
    if !(1.0..=10.0).contains(&score) {
        bail!("score {score} is outside [1, 10]");
    }
    Ok(Classification {
        score,
        outcome: cutoffs.classify(score),
        hire_cutoff: cutoffs.hire,
        reject_cutoff: cutoffs.reject,
    })
}

fn cmd_classify(score: f64, cutoffs: DecisionCutoffs, json: bool) -> Result<()> {
    let result = classify(score, &cutoffs)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{} -> {}", result.score, result.outcome);
    }
    Ok(())
}
