//! Prompt builders
//!
//! Pure functions: each returns the system and user text for one capability.
//! Every user prompt ends by asking for the JSON object the core parser reads.

use std::fmt::Write as _;

use hireflow_core::{
    CandidateProfile, ConsensusResult, EvaluationSet, EvaluatorRole, RoleWeights,
};

pub struct Prompt {
    pub system: String,
    pub user: String,
}

fn evaluator_persona(role: EvaluatorRole) -> &'static str {
    match role {
        EvaluatorRole::Rh => {
            "You are an expert technical recruiter. You judge correctness, \
             problem-solving approach, code quality thinking and depth of understanding. \
             Be fair but rigorous: a good developer scores 7 or more."
        }
        EvaluatorRole::Manager => {
            "You are an experienced engineering manager assessing culture fit. \
             You look at how the candidate handles failure, communicates, resolves \
             conflict and grows."
        }
        EvaluatorRole::Sales => {
            "You are a sales and product manager. You judge whether the candidate \
             understands the root of a client problem and proposes pragmatic, \
             business-aware solutions."
        }
    }
}

pub fn evaluation(role: EvaluatorRole, candidate: &CandidateProfile) -> Prompt {
    let system = format!(
        "{}\nYou are evaluating {} for the {} position, focusing on {}.",
        evaluator_persona(role),
        candidate.display_name(),
        candidate.target_role,
        role.focus(),
    );

    let user = format!(
        "Candidate CV:\n{}\n\n\
         Assess this candidate for the {} position from your perspective.\n\
         Respond with a JSON object:\n\
         {{\n  \"score\": <number 1-10>,\n  \
         \"recommendation\": \"STRONG_YES|YES|MAYBE|NO\",\n  \
         \"justification\": \"<text>\",\n  \
         \"strengths\": [\"<strength>\"],\n  \
         \"red_flags\": [\"<flag>\"]\n}}",
        candidate.resume, candidate.target_role,
    );

    Prompt { system, user }
}

fn render_evaluations(evaluations: &EvaluationSet) -> String {
    let mut out = String::new();
    for (role, result) in evaluations.iter() {
        let _ = writeln!(
            out,
            "{} evaluation ({}): score {}/10, recommendation {}",
            role,
            role.focus(),
            result.score,
            result.recommendation
        );
        for (aspect, text) in &result.rationale {
            let _ = writeln!(out, "  {aspect}: {text}");
        }
    }
    out
}

pub fn mediation(evaluations: &EvaluationSet) -> Prompt {
    let system = "You are facilitating one round of discussion between hiring evaluators \
                  who disagree. Explain where the gap comes from and propose a single \
                  reconciled score."
        .to_string();

    let user = format!(
        "{}\nThe scores above diverge. Weigh each perspective and reconcile them.\n\
         Respond with a JSON object:\n\
         {{\n  \"consensus_score\": <number 1-10>,\n  \"reasoning\": \"<why>\"\n}}",
        render_evaluations(evaluations),
    );

    Prompt { system, user }
}

pub fn judgment(
    evaluations: &EvaluationSet,
    consensus: Option<&ConsensusResult>,
    weights: &RoleWeights,
) -> Prompt {
    let system = "You are the final decision maker in a hiring process. Synthesize the \
                  evaluations into a clear HIRE, REJECT or MAYBE decision.\n\
                  - HIRE: weighted score of 7.5 or more and no critical red flags\n\
                  - REJECT: weighted score below 6.0 or several critical red flags\n\
                  - MAYBE: anything in between; warrants a follow-up interview"
        .to_string();

    let mut user = render_evaluations(evaluations);
    let _ = writeln!(
        user,
        "\nWeights: rh {:.0}%, manager {:.0}%, sales {:.0}%",
        weights.rh * 100.0,
        weights.manager * 100.0,
        weights.sales * 100.0
    );
    match consensus {
        Some(c) => {
            let _ = writeln!(
                user,
                "Negotiated consensus score: {} ({})",
                c.score, c.rationale
            );
        }
        None => user.push_str("Negotiated consensus: none\n"),
    }
    user.push_str(
        "\nRespond with a JSON object:\n\
         {\n  \"final_decision\": \"HIRE|REJECT|MAYBE\",\n  \
         \"confidence_score\": <number 0-1>,\n  \
         \"weighted_score\": <number 1-10>,\n  \
         \"reasoning\": \"<text>\",\n  \
         \"details\": {\"critical_factors\": [\"<factor>\"], \"next_steps\": \"<text>\"}\n}",
    );

    Prompt { system, user }
}

pub fn clarification(evaluations: &EvaluationSet) -> Prompt {
    let system = "You help hiring panels resolve inconclusive interviews by writing one \
                  targeted follow-up question."
        .to_string();

    let user = format!(
        "{}\nThe panel could not reach a clear decision. Write the single interview \
         question that would best resolve the uncertainty. Reply with the question only.",
        render_evaluations(evaluations),
    );

    Prompt { system, user }
}
