//! Scoring oracle client.
//!
//! One chat-completion call per submission; the reply is free text that must
//! contain exactly one JSON object somewhere inside it. We bracket-match from
//! the first `{` to the last `}`, parse, and map strictly into `ScoreResult`.
//! Calls are instrumented and log model names and latencies (not contents).
//!
//! NOTE: We never log the API key.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::domain::{ScoreCategory, ScoreOverall, ScoreResult};
use crate::scoring::{build_scoring_prompt, validate, ScoreRequest};
use crate::util::trunc_for_log;

/// Outcomes of a scoring call, ordered from "your fault" to "our fault".
#[derive(Debug, Error)]
pub enum ScoreError {
  /// Request rejected before any network traffic.
  #[error("Invalid request: {0}")]
  InvalidRequest(String),
  /// Network failure, HTTP error, or no oracle configured.
  #[error("Scoring failed: {0}")]
  Unavailable(String),
  /// The oracle answered, but not with a usable JSON object.
  #[error("Failed to parse scoring response")]
  Parse,
}

#[derive(Clone)]
pub struct Oracle {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl Oracle {
  /// Construct the client if we find ORACLE_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("ORACLE_API_KEY").ok()?;
    let base_url =
      std::env::var("ORACLE_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("ORACLE_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  /// Validate, build the scoring instruction, make one completion call,
  /// and parse the reply. No retries; a failure is reported to the caller.
  #[instrument(level = "info", skip(self, req), fields(model = %self.model, topic = %req.topic, timer = req.timer_duration))]
  pub async fn score(&self, req: &ScoreRequest) -> Result<ScoreResult, ScoreError> {
    validate(req).map_err(ScoreError::InvalidRequest)?;

    let instruction = build_scoring_prompt(req);
    let start = std::time::Instant::now();
    let text = self.complete(&instruction).await.map_err(ScoreError::Unavailable)?;
    let elapsed = start.elapsed();

    match parse_score_result(&text) {
      Ok(result) => {
        info!(target: "scoring", ?elapsed, overall = result.overall.score, "Oracle verdict parsed");
        Ok(result)
      }
      Err(e) => {
        error!(target: "scoring", ?elapsed, error = %e, reply = %trunc_for_log(&text, 400), "Oracle reply did not contain a valid verdict");
        Err(ScoreError::Parse)
      }
    }
  }

  /// Plain-text chat completion carrying the scoring instruction.
  #[instrument(level = "info", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
  async fn complete(&self, prompt: &str) -> Result<String, String> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![ChatMessageReq { role: "user".into(), content: prompt.into() }],
      temperature: 0.2,
      max_tokens: Some(2000),
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "thinkfast-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await.map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      // Error bodies can be whole HTML pages; never log or return them raw.
      let msg = extract_oracle_error(&body).unwrap_or_else(|| trunc_for_log(&body, 300));
      return Err(format!("oracle HTTP {}: {}", status, msg));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "Oracle usage");
    }
    let text = body.choices.first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default();

    Ok(text)
  }
}

/// Isolate the JSON object embedded in the oracle's free-text reply:
/// everything from the first `{` to the last `}` inclusive.
pub fn extract_json(text: &str) -> Option<&str> {
  let start = text.find('{')?;
  let end = text.rfind('}')?;
  if end < start {
    return None;
  }
  Some(&text[start..=end])
}

/// Strict mapping of the oracle's reply into a `ScoreResult`.
///
/// All five categories must be present with integer scores in [1,10];
/// `overall.score` is bounds-checked the same way but deliberately not
/// verified against the advertised weighting (the oracle owns that
/// computation). `model_explanation` defaults to empty when absent.
pub fn parse_score_result(text: &str) -> Result<ScoreResult, String> {
  let json = extract_json(text).ok_or("no JSON object in oracle reply")?;
  let raw: RawScore = serde_json::from_str(json).map_err(|e| e.to_string())?;

  let map_category = |name: &str, c: RawCategory| -> Result<ScoreCategory, String> {
    if !(1..=10).contains(&c.score) {
      return Err(format!("{} score {} out of range", name, c.score));
    }
    Ok(ScoreCategory { score: c.score as u8, feedback: c.feedback })
  };

  if !(1..=10).contains(&raw.overall.score) {
    return Err(format!("overall score {} out of range", raw.overall.score));
  }

  Ok(ScoreResult {
    clarity: map_category("clarity", raw.clarity)?,
    accuracy: map_category("accuracy", raw.accuracy)?,
    structure: map_category("structure", raw.structure)?,
    completeness: map_category("completeness", raw.completeness)?,
    conciseness: map_category("conciseness", raw.conciseness)?,
    overall: ScoreOverall {
      score: raw.overall.score as u8,
      grade: raw.overall.grade,
      summary: raw.overall.summary,
      strengths: raw.overall.strengths,
      improvements: raw.overall.improvements,
    },
    model_explanation: raw.model_explanation.unwrap_or_default(),
  })
}

// --- Raw oracle-side JSON shapes ---

#[derive(Deserialize)]
struct RawScore {
  clarity: RawCategory,
  accuracy: RawCategory,
  structure: RawCategory,
  completeness: RawCategory,
  conciseness: RawCategory,
  overall: RawOverall,
  #[serde(default)]
  model_explanation: Option<String>,
}

#[derive(Deserialize)]
struct RawCategory {
  score: i64,
  feedback: String,
}

#[derive(Deserialize)]
struct RawOverall {
  score: i64,
  grade: String,
  summary: String,
  #[serde(default)]
  strengths: Vec<String>,
  #[serde(default)]
  improvements: Vec<String>,
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an oracle error body.
fn extract_oracle_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn verdict_json() -> String {
    r#"{
      "clarity": {"score": 8, "feedback": "Clear."},
      "accuracy": {"score": 7, "feedback": "Mostly right."},
      "structure": {"score": 6, "feedback": "Decent flow."},
      "completeness": {"score": 7, "feedback": "Covers key points."},
      "conciseness": {"score": 9, "feedback": "Tight."},
      "overall": {
        "score": 7,
        "grade": "B",
        "summary": "Solid explanation.",
        "strengths": ["clarity"],
        "improvements": ["more examples"]
      },
      "model_explanation": "A closure is a function plus its captured scope."
    }"#
      .to_string()
  }

  #[test]
  fn extracts_object_surrounded_by_prose() {
    let text = format!("Here you go: {} done", verdict_json());
    let result = parse_score_result(&text).unwrap();
    assert_eq!(result.clarity.score, 8);
    assert_eq!(result.overall.grade, "B");
    assert_eq!(result.model_explanation, "A closure is a function plus its captured scope.");
  }

  #[test]
  fn no_brace_is_a_parse_failure() {
    assert!(parse_score_result("the oracle rambled with no json at all").is_err());
    assert!(extract_json("nothing here").is_none());
    assert!(extract_json("} backwards {").is_none());
  }

  #[test]
  fn missing_category_is_rejected() {
    let text = verdict_json().replace("\"accuracy\"", "\"accuracyX\"");
    assert!(parse_score_result(&text).is_err());
  }

  #[test]
  fn out_of_range_score_is_rejected() {
    let text = verdict_json().replace("\"score\": 8", "\"score\": 12");
    assert!(parse_score_result(&text).is_err());
    let text = verdict_json().replace("\"score\": 9", "\"score\": 0");
    assert!(parse_score_result(&text).is_err());
  }

  #[test]
  fn fractional_score_is_rejected() {
    let text = verdict_json().replace("\"score\": 7,", "\"score\": 7.5,");
    assert!(parse_score_result(&text).is_err());
  }

  #[test]
  fn missing_model_explanation_defaults_to_empty() {
    let text = verdict_json().replace(
      ",\n      \"model_explanation\": \"A closure is a function plus its captured scope.\"",
      "",
    );
    let result = parse_score_result(&text).unwrap();
    assert_eq!(result.model_explanation, "");
  }
}
