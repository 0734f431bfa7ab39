//! Scoring request construction: validation bounds, time-budget banding,
//! and the natural-language instruction sent to the scoring oracle.

use serde::{Deserialize, Serialize};

use crate::catalog::{TIMER_MAX, TIMER_MIN};
use crate::domain::Difficulty;
use crate::util::word_count;

/// Everything the oracle needs to judge one explanation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
  pub prompt: String,
  pub explanation: String,
  pub topic: String,
  /// Audience descriptor text. Free-form because custom personas flow
  /// through here; the six canonical labels are just the common case.
  pub audience: String,
  pub difficulty: Difficulty,
  pub timer_duration: u32,
  pub time_used: u32,
}

/// Bounds-check a request before any network traffic. The message names
/// the offending field so the client can show it.
pub fn validate(req: &ScoreRequest) -> Result<(), String> {
  fn len_in(s: &str, min: usize, max: usize) -> bool {
    let n = s.chars().count();
    n >= min && n <= max
  }

  if !len_in(&req.prompt, 1, 1000) {
    return Err("prompt must be 1-1000 characters".into());
  }
  if !len_in(&req.explanation, 1, 10_000) {
    return Err("explanation must be 1-10000 characters".into());
  }
  if !len_in(&req.topic, 1, 200) {
    return Err("topic must be 1-200 characters".into());
  }
  if !len_in(&req.audience, 1, 100) {
    return Err("audience must be 1-100 characters".into());
  }
  if req.timer_duration < TIMER_MIN || req.timer_duration > TIMER_MAX {
    return Err(format!("timerDuration must be in [{}, {}] seconds", TIMER_MIN, TIMER_MAX));
  }
  Ok(())
}

/// Qualitative expectation band derived from the timer budget.
/// The thresholds are a policy decision: 60 s and below is "short",
/// 61-120 s "moderate", anything longer "extended".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeBand {
  Short,
  Moderate,
  Extended,
}

impl TimeBand {
  pub fn for_duration(timer_duration: u32) -> Self {
    if timer_duration <= 60 {
      TimeBand::Short
    } else if timer_duration <= 120 {
      TimeBand::Moderate
    } else {
      TimeBand::Extended
    }
  }

  pub fn time_context(&self) -> &'static str {
    match self {
      TimeBand::Short => {
        "very short time (≤60s) - expect bullet points or a brief paragraph covering key ideas only"
      }
      TimeBand::Moderate => {
        "moderate time (60-120s) - expect 1-2 paragraphs with main concepts and an example"
      }
      TimeBand::Extended => {
        "extended time (>120s) - expect well-developed explanation with examples, nuance, and structure"
      }
    }
  }

  pub fn completeness_note(&self) -> &'static str {
    match self {
      TimeBand::Short => {
        "For this short timeframe, completeness means hitting 2-3 key points, not exhaustive coverage"
      }
      TimeBand::Moderate => "Should cover main concepts with at least one concrete example or analogy",
      TimeBand::Extended => {
        "Should provide thorough coverage with examples, context, and possibly counterexamples"
      }
    }
  }
}

/// Render the full scoring instruction. Pure function of the request; the
/// embedded output contract demands exactly one JSON object in the reply.
pub fn build_scoring_prompt(req: &ScoreRequest) -> String {
  let band = TimeBand::for_duration(req.timer_duration);
  let words = word_count(&req.explanation);

  format!(
    r#"You are an expert communication coach and subject matter expert in "{topic}". Evaluate how well someone explained a concept under time pressure.

## Context
- **Prompt given**: "{prompt}"
- **Target audience**: {audience}
- **Difficulty level**: {difficulty}
- **Time allowed**: {duration} seconds ({time_context})
- **Time used**: {time_used} seconds
- **Word count**: {words} words

## The Explanation
"""
{explanation}
"""

## Evaluation Guidelines

**Time-Adjusted Expectations**:
- {completeness_note}
- Minor typos, grammar issues, or abrupt endings are acceptable given time pressure
- Prioritize clarity and accuracy over polish
- Judge completeness relative to the time constraint - shorter times should NOT be penalized for brevity

**Scoring Dimensions**:
1. **Clarity** (1-10): Is it understandable for the target audience?
2. **Accuracy** (1-10): Are the core concepts technically correct?
3. **Structure** (1-10): Is there logical flow (even if brief)?
4. **Completeness** (1-10): Does it cover what's reasonable given {duration} seconds?
5. **Conciseness** (1-10): Efficient use of limited time?

### Overall
Weighted: Clarity 25%, Accuracy 25%, Structure 20%, Completeness 15%, Conciseness 15%.

Also provide a model explanation — a concise, well-structured explanation that could realistically be typed within {duration} seconds, demonstrating ideal clarity and structure for {audience}.

Respond with ONLY this JSON (no markdown fences, no preamble):

{{
  "clarity": {{"score": <1-10>, "feedback": "<2-3 sentences>"}},
  "accuracy": {{"score": <1-10>, "feedback": "<2-3 sentences>"}},
  "structure": {{"score": <1-10>, "feedback": "<2-3 sentences>"}},
  "completeness": {{"score": <1-10>, "feedback": "<2-3 sentences>"}},
  "conciseness": {{"score": <1-10>, "feedback": "<2-3 sentences>"}},
  "overall": {{
    "score": <1-10>,
    "grade": "<A+ to F>",
    "summary": "<2-3 sentences>",
    "strengths": ["<strength>", "<strength>"],
    "improvements": ["<improvement>", "<improvement>"]
  }},
  "model_explanation": "<A concise, well-structured model explanation>"
}}"#,
    topic = req.topic,
    prompt = req.prompt,
    audience = req.audience,
    difficulty = req.difficulty.as_str(),
    duration = req.timer_duration,
    time_context = band.time_context(),
    time_used = req.time_used,
    words = words,
    explanation = req.explanation,
    completeness_note = band.completeness_note(),
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  fn req() -> ScoreRequest {
    ScoreRequest {
      prompt: "Explain closures to a teenager.".into(),
      explanation: "short answer".into(),
      topic: "JavaScript".into(),
      audience: "a teenager".into(),
      difficulty: Difficulty::Intermediate,
      timer_duration: 60,
      time_used: 45,
    }
  }

  #[test]
  fn banding_is_a_step_function() {
    assert_eq!(TimeBand::for_duration(60), TimeBand::Short);
    assert_eq!(TimeBand::for_duration(61), TimeBand::Moderate);
    assert_eq!(TimeBand::for_duration(120), TimeBand::Moderate);
    assert_eq!(TimeBand::for_duration(121), TimeBand::Extended);
  }

  #[test]
  fn short_timer_selects_short_band_note() {
    let text = build_scoring_prompt(&req());
    assert!(text.contains("hitting 2-3 key points"));
    assert!(text.contains("Word count**: 2 words"));
  }

  #[test]
  fn instruction_embeds_weights_and_contract() {
    let text = build_scoring_prompt(&req());
    assert!(text.contains("Clarity 25%, Accuracy 25%, Structure 20%, Completeness 15%, Conciseness 15%"));
    assert!(text.contains("\"model_explanation\""));
    assert!(text.contains("Respond with ONLY this JSON"));
  }

  #[test]
  fn validate_accepts_in_bounds_requests() {
    assert!(validate(&req()).is_ok());
  }

  #[test]
  fn validate_rejects_out_of_bounds() {
    let mut r = req();
    r.explanation = String::new();
    assert!(validate(&r).is_err());

    let mut r = req();
    r.timer_duration = 5;
    assert!(validate(&r).unwrap_err().contains("timerDuration"));

    let mut r = req();
    r.timer_duration = 601;
    assert!(validate(&r).is_err());

    let mut r = req();
    r.prompt = "p".repeat(1001);
    assert!(validate(&r).is_err());

    let mut r = req();
    r.audience = String::new();
    assert!(validate(&r).unwrap_err().contains("audience"));
  }
}
