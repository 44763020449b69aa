//! Response Normalizer — recovers a structured [`MentorshipPlan`] from
//! unreliable free-text model output.
//!
//! Models asked for "JSON only" still wrap replies in code fences, prepend
//! commentary, or emit near-JSON (single quotes, trailing commas). The
//! normalizer runs an ordered chain of recovery attempts; the first parse
//! that yields a JSON value wins:
//!
//! 1. whole trimmed text
//! 2. whole text with code fences stripped
//! 3. the first balanced `{ ... }` span
//! 4. that same span after tolerant rewriting
//!
//! The parsed value must then be an object carrying all five required keys.

use serde_json::Value;

use crate::mentorship::models::{ExtractionFailure, MentorshipPlan};

/// Keys a reply must contain to count as a plan.
const REQUIRED_KEYS: [&str; 5] = [
    "student_goal",
    "current_issues",
    "roadmap",
    "resources",
    "project_idea",
];

/// Recovers a plan from raw model text, or reports why it could not.
/// The original text travels with every failure so callers can display it.
pub fn normalize(raw_text: &str) -> Result<MentorshipPlan, ExtractionFailure> {
    let value = parse_candidates(raw_text.trim())
        .ok_or_else(|| ExtractionFailure::parse(raw_text))?;

    let Some(object) = value.as_object() else {
        return Err(ExtractionFailure::parse(raw_text));
    };

    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !object.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(ExtractionFailure::missing_keys(&missing, raw_text));
    }

    // Keys present but with the wrong shape (e.g. roadmap as a string) still
    // fail deserialization; extra keys are ignored.
    serde_json::from_value(value).map_err(|_| ExtractionFailure::parse(raw_text))
}

/// The ordered fallback chain. Returns the first JSON value any strategy
/// recovers, or `None` when every attempt fails.
fn parse_candidates(trimmed: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    let unfenced = strip_code_fences(trimmed);
    if let Ok(value) = serde_json::from_str::<Value>(unfenced) {
        return Some(value);
    }

    let span = balanced_object_span(unfenced)?;
    if let Ok(value) = serde_json::from_str::<Value>(span) {
        return Some(value);
    }

    serde_json::from_str::<Value>(&rewrite_tolerant(span)).ok()
}

/// Strips ``` fences (with an optional language tag) wrapped around a reply.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // The language tag, if any, runs to the end of the opening line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.strip_suffix("```").map(str::trim).unwrap_or_else(|| body.trim())
}

/// Finds the first top-level balanced `{ ... }` span. Depth counting is
/// string- and escape-aware so braces inside string literals do not
/// terminate the span early. Later spans are never considered.
fn balanced_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + idx]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Rewrites a near-JSON span into strict JSON: single-quoted keys and strings
/// become double-quoted, and trailing commas before `}` / `]` are dropped.
/// A character scanner — never an expression evaluator, so nothing in the
/// model output is executed.
fn rewrite_tolerant(span: &str) -> String {
    let mut out = String::with_capacity(span.len());
    let mut chars = span.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                // Copy a double-quoted string verbatim, honoring escapes.
                out.push('"');
                let mut escaped = false;
                for c in chars.by_ref() {
                    out.push(c);
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == '"' {
                        break;
                    }
                }
            }
            '\'' => {
                // Convert a single-quoted string to double-quoted.
                out.push('"');
                let mut escaped = false;
                while let Some(c) = chars.next() {
                    if escaped {
                        if c == '\'' {
                            out.push('\'');
                        } else {
                            out.push('\\');
                            out.push(c);
                        }
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == '\'' {
                        break;
                    } else if c == '"' {
                        out.push_str("\\\"");
                    } else {
                        out.push(c);
                    }
                }
                out.push('"');
            }
            ',' => {
                let mut lookahead = chars.clone();
                let next_significant = loop {
                    match lookahead.next() {
                        Some(c) if c.is_whitespace() => continue,
                        other => break other,
                    }
                };
                if !matches!(next_significant, Some('}') | Some(']')) {
                    out.push(',');
                }
            }
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_PLAN: &str = r#"{"student_goal":"Learn DSA","current_issues":["No schedule"],"roadmap":["Week1: arrays","Week2: trees"],"resources":["NeetCode"],"project_idea":"Build a visualizer"}"#;

    fn assert_is_dsa_plan(plan: &MentorshipPlan) {
        assert_eq!(plan.student_goal, "Learn DSA");
        assert_eq!(plan.current_issues, vec!["No schedule"]);
        assert_eq!(plan.roadmap, vec!["Week1: arrays", "Week2: trees"]);
        assert_eq!(plan.resources, vec!["NeetCode"]);
        assert_eq!(plan.project_idea, "Build a visualizer");
    }

    #[test]
    fn test_well_formed_literal_round_trips() {
        let plan = normalize(FULL_PLAN).unwrap();
        assert_is_dsa_plan(&plan);
    }

    #[test]
    fn test_pretty_printed_literal_parses() {
        let pretty = serde_json::to_string_pretty(
            &serde_json::from_str::<Value>(FULL_PLAN).unwrap(),
        )
        .unwrap();
        let plan = normalize(&pretty).unwrap();
        assert_is_dsa_plan(&plan);
    }

    #[test]
    fn test_fenced_with_language_tag_matches_unwrapped() {
        let fenced = format!("```json\n{FULL_PLAN}\n```");
        assert_eq!(normalize(&fenced).unwrap(), normalize(FULL_PLAN).unwrap());
    }

    #[test]
    fn test_fenced_without_language_tag_matches_unwrapped() {
        let fenced = format!("```\n{FULL_PLAN}\n```");
        assert_eq!(normalize(&fenced).unwrap(), normalize(FULL_PLAN).unwrap());
    }

    #[test]
    fn test_preamble_before_fenced_object_is_ignored() {
        let input = format!("Sure! ```json\n{FULL_PLAN}\n```");
        let plan = normalize(&input).unwrap();
        assert_is_dsa_plan(&plan);
    }

    #[test]
    fn test_narrative_preamble_before_object_is_ignored() {
        let input = format!("Here is the plan you asked for:\n\n{FULL_PLAN}\n\nGood luck!");
        let plan = normalize(&input).unwrap();
        assert_is_dsa_plan(&plan);
    }

    #[test]
    fn test_braces_inside_string_values_do_not_truncate_span() {
        let input = r#"Plan below {"student_goal":"Master {generics}","current_issues":["stuck on } syntax"],"roadmap":["Week1"],"resources":["docs"],"project_idea":"parser"}"#;
        let plan = normalize(input).unwrap();
        assert_eq!(plan.student_goal, "Master {generics}");
        assert_eq!(plan.current_issues, vec!["stuck on } syntax"]);
    }

    #[test]
    fn test_only_first_balanced_span_is_considered() {
        let second = FULL_PLAN;
        let input = format!(
            r#"{{"student_goal":"first","current_issues":[],"roadmap":[],"resources":[]}} and also {second}"#
        );
        // The first object is missing project_idea; the complete second object
        // must not rescue it.
        let failure = normalize(&input).unwrap_err();
        assert!(failure.message.contains("missing expected keys"));
        assert!(failure.message.contains("project_idea"));
    }

    #[test]
    fn test_missing_key_is_failure_not_partial_plan() {
        let input = r#"{"student_goal":"g","current_issues":["i"],"roadmap":["r"],"resources":["s"]}"#;
        let failure = normalize(input).unwrap_err();
        assert!(failure.message.contains("missing expected keys"));
        assert!(failure.message.contains("project_idea"));
        assert_eq!(failure.raw_output, input);
    }

    #[test]
    fn test_no_brace_returns_raw_text_verbatim() {
        let failure = normalize("I cannot help with that.").unwrap_err();
        assert_eq!(failure.raw_output, "I cannot help with that.");
        assert!(failure.message.contains("could not parse"));
    }

    #[test]
    fn test_single_quotes_and_trailing_commas_recover() {
        let input = "{'student_goal': 'Learn SQL', 'current_issues': ['No practice',], 'roadmap': ['Week1: SELECT', 'Week2: JOINs',], 'resources': ['SQLBolt'], 'project_idea': 'Query a csv',}";
        let plan = normalize(input).unwrap();
        assert_eq!(plan.student_goal, "Learn SQL");
        assert_eq!(plan.roadmap, vec!["Week1: SELECT", "Week2: JOINs"]);
        assert_eq!(plan.project_idea, "Query a csv");
    }

    #[test]
    fn test_apostrophe_inside_single_quoted_string() {
        let input = r#"{'student_goal': 'Don\'t give up on math', 'current_issues': [], 'roadmap': ['Week1'], 'resources': ['Khan Academy'], 'project_idea': 'stats notebook'}"#;
        let plan = normalize(input).unwrap();
        assert_eq!(plan.student_goal, "Don't give up on math");
    }

    #[test]
    fn test_extra_keys_are_ignored_not_rejected() {
        let input = r#"{"student_goal":"g","current_issues":[],"roadmap":["r"],"resources":["s"],"project_idea":"p","confidence":0.9}"#;
        let plan = normalize(input).unwrap();
        assert_eq!(plan.student_goal, "g");
    }

    #[test]
    fn test_wrong_field_shape_is_parse_failure() {
        // roadmap must be an array of strings
        let input = r#"{"student_goal":"g","current_issues":[],"roadmap":"not a list","resources":[],"project_idea":"p"}"#;
        let failure = normalize(input).unwrap_err();
        assert!(failure.message.contains("could not parse"));
        assert_eq!(failure.raw_output, input);
    }

    #[test]
    fn test_non_object_json_is_failure() {
        let failure = normalize("[1, 2, 3]").unwrap_err();
        assert!(failure.message.contains("could not parse"));
    }

    #[test]
    fn test_unbalanced_object_is_failure() {
        let input = r#"{"student_goal":"g","current_issues":["#;
        let failure = normalize(input).unwrap_err();
        assert_eq!(failure.raw_output, input);
    }

    #[test]
    fn test_strip_code_fences_variants() {
        assert_eq!(strip_code_fences("```json\n{\"k\":1}\n```"), "{\"k\":1}");
        assert_eq!(strip_code_fences("```\n{\"k\":1}\n```"), "{\"k\":1}");
        assert_eq!(strip_code_fences("{\"k\":1}"), "{\"k\":1}");
    }

    #[test]
    fn test_balanced_span_skips_preamble_and_trailer() {
        let text = r#"noise {"a": {"b": 1}} trailing"#;
        assert_eq!(balanced_object_span(text), Some(r#"{"a": {"b": 1}}"#));
    }

    #[test]
    fn test_rewrite_tolerant_leaves_strict_json_alone() {
        let strict = r#"{"a": "it's fine, really", "b": [1, 2]}"#;
        assert_eq!(rewrite_tolerant(strict), strict);
    }
}
