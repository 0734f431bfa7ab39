//! Domain models: topics, audiences, prompts, score results, attempts, phases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category tag used to group topics in the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicCategory {
  Technology,
  Science,
  Humanities,
  Business,
  Lifestyle,
  Custom,
}

/// A practice topic, either preset or user-added.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Topic {
  pub id: String,
  pub name: String,
  pub category: TopicCategory,
}

/// Who the explanation is addressed to. `Custom` carries no label of its
/// own; the sanitized persona string travels in `Prompt::audience_label`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Audience {
  Child,
  Teenager,
  NonTechnical,
  Peer,
  Executive,
  Interviewer,
  Custom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Beginner,
  Intermediate,
  Advanced,
}

impl Default for Difficulty {
  fn default() -> Self { Difficulty::Intermediate }
}

impl Difficulty {
  pub fn as_str(&self) -> &'static str {
    match self {
      Difficulty::Beginner => "beginner",
      Difficulty::Intermediate => "intermediate",
      Difficulty::Advanced => "advanced",
    }
  }
}

/// One generated practice prompt. Immutable once created; embedded in the
/// Attempt rather than persisted on its own.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
  pub id: String,
  pub text: String,
  pub topic: String,
  pub concept: String,
  pub audience: Audience,
  /// Descriptor substituted into the template: a canonical persona label
  /// or the sanitized custom persona verbatim.
  pub audience_label: String,
  pub difficulty: Difficulty,
}

/// One scored dimension (1-10 plus feedback text).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreCategory {
  pub score: u8,
  pub feedback: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreOverall {
  pub score: u8,
  pub grade: String,
  pub summary: String,
  pub strengths: Vec<String>,
  pub improvements: Vec<String>,
}

/// Full scoring verdict as returned by the oracle, after strict mapping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
  pub clarity: ScoreCategory,
  pub accuracy: ScoreCategory,
  pub structure: ScoreCategory,
  pub completeness: ScoreCategory,
  pub conciseness: ScoreCategory,
  pub overall: ScoreOverall,
  #[serde(default)]
  pub model_explanation: String,
}

/// Durable record of one completed practice round.
/// `time_used` is clamped to `timer_duration` before the attempt exists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
  pub id: String,
  pub prompt: Prompt,
  pub explanation: String,
  pub timer_duration: u32,
  pub time_used: u32,
  pub word_count: usize,
  pub score: ScoreResult,
  pub created_at: DateTime<Utc>,
}

/// Phases of the practice session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
  TopicSelect,
  PromptDisplay,
  Typing,
  Submitting,
  Results,
}
