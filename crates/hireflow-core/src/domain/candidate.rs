//! Candidate input, read-only to the pipeline.

use serde::{Deserialize, Serialize};

/// The candidate under evaluation.
///
/// Intake and validation happen upstream; the pipeline only reads this value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-text resume content.
    #[serde(alias = "cv_text")]
    pub resume: String,
    /// Role the candidate is being assessed for.
    #[serde(alias = "role_applying")]
    pub target_role: String,
}

impl CandidateProfile {
    pub fn new(
        id: impl Into<String>,
        resume: impl Into<String>,
        target_role: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            resume: resume.into(),
            target_role: target_role.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name if known, otherwise the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}
