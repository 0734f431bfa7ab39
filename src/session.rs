//! The practice session state machine.
//!
//! Phases: TopicSelect -> PromptDisplay -> Typing -> Submitting -> Results,
//! with resets back to TopicSelect and retry from Results. The machine is
//! synchronous and owns no I/O; the WebSocket loop drives it, performs the
//! scoring call between `begin_submit` and `complete_submit`/`fail_submit`,
//! and persists the resulting attempt. A submission failure lands back in
//! Typing with the draft untouched, so no user work is lost.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::{DEFAULT_TIMER, TIMER_MAX, TIMER_MIN};
use crate::domain::{Attempt, Difficulty, Phase, Prompt, ScoreResult};
use crate::prompt_gen::generate_prompt;
use crate::scoring::ScoreRequest;
use crate::timer::Countdown;
use crate::util::word_count;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
  #[error("action '{action}' is not allowed in phase {from:?}")]
  InvalidTransition { from: Phase, action: &'static str },
  #[error("cannot submit an empty explanation")]
  EmptyExplanation,
  #[error("timer duration must be in [{TIMER_MIN}, {TIMER_MAX}] seconds")]
  InvalidDuration,
  #[error("no topics available to draw from")]
  NoTopics,
}

pub struct Session {
  phase: Phase,
  selected_topics: Vec<String>,
  persona: String,
  difficulty: Difficulty,
  countdown: Countdown,
  prompt: Option<Prompt>,
  explanation: String,
  score: Option<ScoreResult>,
  started_at: Option<Instant>,
  pending_time_used: Option<u32>,
}

impl Session {
  pub fn new(timer_duration: u32, persona: String) -> Self {
    Self {
      phase: Phase::TopicSelect,
      selected_topics: Vec::new(),
      persona,
      difficulty: Difficulty::default(),
      countdown: Countdown::new(timer_duration),
      prompt: None,
      explanation: String::new(),
      score: None,
      started_at: None,
      pending_time_used: None,
    }
  }

  pub fn phase(&self) -> Phase { self.phase }
  pub fn prompt(&self) -> Option<&Prompt> { self.prompt.as_ref() }
  pub fn explanation(&self) -> &str { &self.explanation }
  pub fn score(&self) -> Option<&ScoreResult> { self.score.as_ref() }
  pub fn countdown(&self) -> &Countdown { &self.countdown }
  pub fn selected_topics(&self) -> &[String] { &self.selected_topics }
  pub fn persona(&self) -> &str { &self.persona }

  fn guard(&self, allowed: &[Phase], action: &'static str) -> Result<(), SessionError> {
    if allowed.contains(&self.phase) {
      Ok(())
    } else {
      Err(SessionError::InvalidTransition { from: self.phase, action: action })
    }
  }

  /// Replace the explicit topic selection. Empty means "draw from the
  /// whole pool".
  pub fn select_topics(&mut self, topics: Vec<String>) -> Result<(), SessionError> {
    self.guard(&[Phase::TopicSelect], "select_topics")?;
    self.selected_topics = topics;
    Ok(())
  }

  pub fn set_timer_duration(&mut self, seconds: u32) -> Result<(), SessionError> {
    self.guard(&[Phase::TopicSelect], "set_timer")?;
    if !(TIMER_MIN..=TIMER_MAX).contains(&seconds) {
      return Err(SessionError::InvalidDuration);
    }
    self.countdown.set_duration(seconds);
    Ok(())
  }

  /// Raw persona text; sanitization happens at prompt-generation time.
  pub fn set_persona(&mut self, persona: String) -> Result<(), SessionError> {
    self.guard(&[Phase::TopicSelect], "set_persona")?;
    self.persona = persona;
    Ok(())
  }

  /// Produce a fresh prompt and move to PromptDisplay. Legal from
  /// TopicSelect (generate), PromptDisplay (skip), and Results (retry);
  /// a stale explanation or score from a previous round is cleared.
  pub fn generate<R: Rng + ?Sized>(
    &mut self,
    pool: &[String],
    custom_concepts: &HashMap<String, Vec<String>>,
    rng: &mut R,
  ) -> Result<&Prompt, SessionError> {
    self.guard(&[Phase::TopicSelect, Phase::PromptDisplay, Phase::Results], "generate")?;

    let active: Vec<&String> = if self.selected_topics.is_empty() {
      pool.iter().collect()
    } else {
      self.selected_topics.iter().collect()
    };
    let topic = active.choose(rng).ok_or(SessionError::NoTopics)?;

    let persona = if self.persona.trim().is_empty() { None } else { Some(self.persona.as_str()) };
    let prompt = generate_prompt(topic, self.difficulty, persona, custom_concepts, rng);
    info!(target: "practice", topic = %prompt.topic, concept = %prompt.concept, audience = %prompt.audience_label, "Prompt generated");

    self.explanation.clear();
    self.score = None;
    self.started_at = None;
    self.pending_time_used = None;
    self.countdown.reset();
    self.phase = Phase::PromptDisplay;
    Ok(self.prompt.insert(prompt))
  }

  /// Begin the timed-writing phase: record the start instant and start
  /// the countdown from the full configured duration.
  pub fn start(&mut self, now: Instant) -> Result<(), SessionError> {
    self.guard(&[Phase::PromptDisplay], "start")?;
    self.started_at = Some(now);
    self.countdown.reset();
    self.countdown.start();
    self.phase = Phase::Typing;
    Ok(())
  }

  /// Replace the draft. Rejected once the countdown has expired, mirroring
  /// the locked input field.
  pub fn update_draft(&mut self, text: String) -> Result<(), SessionError> {
    self.guard(&[Phase::Typing], "draft")?;
    if self.countdown.is_expired() {
      return Err(SessionError::InvalidTransition { from: self.phase, action: "draft" });
    }
    self.explanation = text;
    Ok(())
  }

  /// Advance the countdown one second. Only ticks while typing; returns
  /// true exactly when this tick expired the countdown.
  pub fn tick(&mut self) -> bool {
    if self.phase != Phase::Typing {
      return false;
    }
    self.countdown.tick()
  }

  /// Expiry forces a submission only when there is something to submit.
  pub fn should_auto_submit(&self) -> bool {
    self.phase == Phase::Typing
      && self.countdown.is_expired()
      && !self.explanation.trim().is_empty()
  }

  /// Typing -> Submitting. Pauses the countdown, clamps the elapsed time
  /// to the configured duration, and hands back the request the driver
  /// sends to the oracle.
  pub fn begin_submit(&mut self, now: Instant) -> Result<ScoreRequest, SessionError> {
    self.guard(&[Phase::Typing], "submit")?;
    let explanation = self.explanation.trim().to_string();
    if explanation.is_empty() {
      return Err(SessionError::EmptyExplanation);
    }
    let prompt = match &self.prompt {
      Some(p) => p,
      None => return Err(SessionError::InvalidTransition { from: self.phase, action: "submit" }),
    };

    self.countdown.pause();
    let elapsed = self
      .started_at
      .map(|t| now.saturating_duration_since(t).as_secs_f64().round() as u32)
      .unwrap_or(0);
    let time_used = elapsed.min(self.countdown.duration());
    self.pending_time_used = Some(time_used);
    self.phase = Phase::Submitting;
    debug!(target: "practice", time_used, "Submission started");

    Ok(ScoreRequest {
      prompt: prompt.text.clone(),
      explanation,
      topic: prompt.topic.clone(),
      audience: prompt.audience_label.clone(),
      difficulty: prompt.difficulty,
      timer_duration: self.countdown.duration(),
      time_used,
    })
  }

  /// Scoring succeeded: move to Results and hand back the durable record
  /// for the driver to persist.
  pub fn complete_submit(&mut self, result: ScoreResult) -> Result<Attempt, SessionError> {
    self.guard(&[Phase::Submitting], "complete_submit")?;
    let prompt = match &self.prompt {
      Some(p) => p.clone(),
      None => {
        return Err(SessionError::InvalidTransition { from: self.phase, action: "complete_submit" })
      }
    };

    let explanation = self.explanation.trim().to_string();
    let attempt = Attempt {
      id: Uuid::new_v4().to_string(),
      prompt,
      explanation: explanation.clone(),
      timer_duration: self.countdown.duration(),
      time_used: self.pending_time_used.unwrap_or(0),
      word_count: word_count(&explanation),
      score: result.clone(),
      created_at: Utc::now(),
    };
    self.score = Some(result);
    self.phase = Phase::Results;
    Ok(attempt)
  }

  /// Scoring failed: back to Typing, draft intact, nothing recorded.
  pub fn fail_submit(&mut self) -> Result<(), SessionError> {
    self.guard(&[Phase::Submitting], "fail_submit")?;
    self.pending_time_used = None;
    self.phase = Phase::Typing;
    Ok(())
  }

  /// Back to topic selection, clearing the round. Not allowed while a
  /// scoring call is in flight.
  pub fn reset(&mut self) -> Result<(), SessionError> {
    self.guard(&[Phase::TopicSelect, Phase::PromptDisplay, Phase::Typing, Phase::Results], "reset")?;
    self.prompt = None;
    self.explanation.clear();
    self.score = None;
    self.started_at = None;
    self.pending_time_used = None;
    self.countdown.reset();
    self.phase = Phase::TopicSelect;
    Ok(())
  }
}

impl Default for Session {
  fn default() -> Self {
    Self::new(DEFAULT_TIMER, String::new())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{ScoreCategory, ScoreOverall};
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn pool() -> Vec<String> {
    vec!["JavaScript".into(), "Physics".into()]
  }

  fn fake_score() -> ScoreResult {
    let c = |s: u8| ScoreCategory { score: s, feedback: "ok".into() };
    ScoreResult {
      clarity: c(8),
      accuracy: c(8),
      structure: c(7),
      completeness: c(7),
      conciseness: c(8),
      overall: ScoreOverall {
        score: 8,
        grade: "A-".into(),
        summary: "good".into(),
        strengths: vec![],
        improvements: vec![],
      },
      model_explanation: String::new(),
    }
  }

  fn typing_session(rng: &mut StdRng) -> Session {
    let mut s = Session::new(60, String::new());
    s.generate(&pool(), &HashMap::new(), rng).unwrap();
    s.start(Instant::now()).unwrap();
    s
  }

  #[test]
  fn happy_path_reaches_results_with_clamped_time() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut s = typing_session(&mut rng);
    s.update_draft("  an explanation with words  ".into()).unwrap();

    let req = s.begin_submit(Instant::now()).unwrap();
    assert_eq!(s.phase(), Phase::Submitting);
    assert_eq!(req.explanation, "an explanation with words");
    assert!(req.time_used <= req.timer_duration);

    let attempt = s.complete_submit(fake_score()).unwrap();
    assert_eq!(s.phase(), Phase::Results);
    assert_eq!(attempt.word_count, 4);
    assert!(attempt.time_used <= attempt.timer_duration);
    assert!(s.score().is_some());
  }

  #[test]
  fn generate_clears_stale_round_state() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut s = typing_session(&mut rng);
    s.update_draft("draft".into()).unwrap();
    s.begin_submit(Instant::now()).unwrap();
    s.complete_submit(fake_score()).unwrap();

    // retry from Results
    s.generate(&pool(), &HashMap::new(), &mut rng).unwrap();
    assert_eq!(s.phase(), Phase::PromptDisplay);
    assert_eq!(s.explanation(), "");
    assert!(s.score().is_none());
  }

  #[test]
  fn empty_explanation_cannot_be_submitted() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut s = typing_session(&mut rng);
    s.update_draft("   ".into()).unwrap();
    assert_eq!(s.begin_submit(Instant::now()), Err(SessionError::EmptyExplanation));
    assert_eq!(s.phase(), Phase::Typing);
  }

  #[test]
  fn failed_scoring_reverts_to_typing_with_draft_intact() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut s = typing_session(&mut rng);
    s.update_draft("my explanation".into()).unwrap();
    s.begin_submit(Instant::now()).unwrap();
    s.fail_submit().unwrap();
    assert_eq!(s.phase(), Phase::Typing);
    assert_eq!(s.explanation(), "my explanation");
    // resubmission is a fresh user action reusing the same text
    assert!(s.begin_submit(Instant::now()).is_ok());
  }

  #[test]
  fn auto_submit_requires_expiry_and_a_non_empty_draft() {
    let mut rng = StdRng::seed_from_u64(6);
    let mut s = Session::new(2, String::new());
    s.generate(&pool(), &HashMap::new(), &mut rng).unwrap();
    s.start(Instant::now()).unwrap();

    assert!(!s.should_auto_submit());
    s.tick();
    let expired = s.tick();
    assert!(expired);
    // expired but empty: the round just ends, no submission
    assert!(!s.should_auto_submit());

    let mut s = Session::new(2, String::new());
    s.generate(&pool(), &HashMap::new(), &mut rng).unwrap();
    s.start(Instant::now()).unwrap();
    s.update_draft("something".into()).unwrap();
    s.tick();
    s.tick();
    assert!(s.should_auto_submit());
  }

  #[test]
  fn draft_is_locked_after_expiry() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut s = Session::new(1, String::new());
    s.generate(&pool(), &HashMap::new(), &mut rng).unwrap();
    s.start(Instant::now()).unwrap();
    s.tick();
    assert!(s.update_draft("late edit".into()).is_err());
  }

  #[test]
  fn illegal_transitions_are_rejected() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut s = Session::new(60, String::new());

    assert!(s.start(Instant::now()).is_err());
    assert!(s.begin_submit(Instant::now()).is_err());
    assert!(s.complete_submit(fake_score()).is_err());
    assert!(s.fail_submit().is_err());

    s.generate(&pool(), &HashMap::new(), &mut rng).unwrap();
    // topic/timer/persona changes are only legal before a round starts
    assert!(s.select_topics(vec!["Physics".into()]).is_err());
    assert!(s.set_timer_duration(90).is_err());
    assert!(s.set_persona("someone".into()).is_err());

    s.start(Instant::now()).unwrap();
    s.update_draft("text".into()).unwrap();
    s.begin_submit(Instant::now()).unwrap();
    // no reset while the scoring call is in flight
    assert!(s.reset().is_err());
  }

  #[test]
  fn reset_returns_to_topic_select_from_any_resting_phase() {
    let mut rng = StdRng::seed_from_u64(9);

    let mut s = typing_session(&mut rng);
    s.reset().unwrap();
    assert_eq!(s.phase(), Phase::TopicSelect);
    assert!(s.prompt().is_none());

    let mut s = typing_session(&mut rng);
    s.update_draft("words".into()).unwrap();
    s.begin_submit(Instant::now()).unwrap();
    s.complete_submit(fake_score()).unwrap();
    s.reset().unwrap();
    assert_eq!(s.phase(), Phase::TopicSelect);
  }

  #[test]
  fn selection_restricts_the_draw() {
    let mut rng = StdRng::seed_from_u64(10);
    let mut s = Session::new(60, String::new());
    s.select_topics(vec!["Physics".into()]).unwrap();
    for _ in 0..10 {
      let p = s.generate(&pool(), &HashMap::new(), &mut rng).unwrap();
      assert_eq!(p.topic, "Physics");
      s.reset().unwrap();
    }
  }

  #[test]
  fn timer_duration_bounds_are_enforced() {
    let mut s = Session::new(60, String::new());
    assert_eq!(s.set_timer_duration(5), Err(SessionError::InvalidDuration));
    assert_eq!(s.set_timer_duration(601), Err(SessionError::InvalidDuration));
    s.set_timer_duration(600).unwrap();
    assert_eq!(s.countdown().duration(), 600);
  }
}
