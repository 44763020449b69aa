//! Mentorship Request Orchestrator — one prompt, one model call, one
//! normalization pass. No retries: a failed invocation or unparseable reply
//! is reported to the caller as an [`ExtractionFailure`].

use tracing::debug;

use crate::llm_client::TextGenerator;
use crate::mentorship::models::{ExtractionFailure, MentorshipPlan, Turn};
use crate::mentorship::normalizer::normalize;
use crate::mentorship::prompts::{MENTORSHIP_PROMPT_TEMPLATE, MENTORSHIP_SYSTEM};

/// Sampling temperature for plan generation. Low and fixed: replies must
/// stay machine-parseable.
const PLAN_TEMPERATURE: f32 = 0.3;

/// Turns a free-text learning goal (plus optional caller-supplied history)
/// into a structured plan.
pub async fn request_plan(
    llm: &dyn TextGenerator,
    student_input: &str,
    history: &[Turn],
) -> Result<MentorshipPlan, ExtractionFailure> {
    let prompt = MENTORSHIP_PROMPT_TEMPLATE
        .replace("{history}", &render_history(history))
        .replace("{student_input}", student_input);

    let raw = llm
        .generate(&prompt, MENTORSHIP_SYSTEM, PLAN_TEMPERATURE)
        .await
        .map_err(ExtractionFailure::invocation)?;

    debug!("model reply received: {} bytes", raw.len());

    normalize(&raw)
}

/// Renders history as speaker-tagged lines for prompt interpolation.
/// Empty history renders as "(none)" so the template never shows a hole.
fn render_history(history: &[Turn]) -> String {
    if history.is_empty() {
        return "(none)".to_string();
    }
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.speaker.label(), turn.text))
        .collect::<Vec<_>>()
        .join("\n")
}
