//! Data model for the mentorship feature.

use serde::{Deserialize, Serialize};

/// A structured study plan recovered from model output.
///
/// All five fields are required. A reply missing any of them is rejected as
/// an [`ExtractionFailure`] — never returned as a partially-filled plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorshipPlan {
    pub student_goal: String,
    pub current_issues: Vec<String>,
    pub roadmap: Vec<String>,
    pub resources: Vec<String>,
    pub project_idea: String,
}

/// Error-as-data result when no plan can be recovered from a request.
/// Carries the original model text so callers can surface it for debugging
/// (empty when the invocation itself failed and no text was produced).
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ExtractionFailure {
    pub message: String,
    pub raw_output: String,
}

impl ExtractionFailure {
    /// The model produced text, but no structured plan could be recovered.
    pub fn parse(raw_output: impl Into<String>) -> Self {
        Self {
            message: "could not parse model output as a mentorship plan".to_string(),
            raw_output: raw_output.into(),
        }
    }

    /// The model produced a JSON object, but required keys are absent.
    pub fn missing_keys(missing: &[&str], raw_output: impl Into<String>) -> Self {
        Self {
            message: format!("model output is missing expected keys: {}", missing.join(", ")),
            raw_output: raw_output.into(),
        }
    }

    /// The call to the text-generation service itself failed.
    pub fn invocation(cause: impl std::fmt::Display) -> Self {
        Self {
            message: format!("model invocation failed: {cause}"),
            raw_output: String::new(),
        }
    }
}

/// Who spoke a prior conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Student,
    Mentor,
}

impl Speaker {
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::Student => "Student",
            Speaker::Mentor => "Mentor",
        }
    }
}

/// One prior conversation turn. History is caller-owned: the core
/// interpolates it into the prompt but never stores or mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}
