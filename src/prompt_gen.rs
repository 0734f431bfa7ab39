//! Prompt generation: pick a concept from the topic's pool, an audience
//! persona, and a phrasing template, then render the practice prompt.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::catalog::{audience_label, concept_pool, FIXED_AUDIENCES, PROMPT_TEMPLATES};
use crate::domain::{Audience, Difficulty, Prompt};
use crate::persona::sanitize_persona;
use crate::util::fill_template;

/// Generate a prompt for `topic`. Total: any topic string produces a
/// prompt with non-empty text, whether or not the topic has a known pool.
///
/// A non-empty sanitized `custom_persona` is used verbatim as the audience
/// descriptor; otherwise one of the six fixed personas is drawn. User-added
/// concepts for the topic participate in the draw alongside the preset pool.
pub fn generate_prompt<R: Rng + ?Sized>(
  topic: &str,
  difficulty: Difficulty,
  custom_persona: Option<&str>,
  custom_concepts: &HashMap<String, Vec<String>>,
  rng: &mut R,
) -> Prompt {
  let mut pool: Vec<&str> = concept_pool(topic).map(|p| p.to_vec()).unwrap_or_default();
  if let Some(extra) = custom_concepts.get(topic) {
    pool.extend(extra.iter().map(String::as_str));
  }
  let concept = match pool.choose(rng) {
    Some(c) => (*c).to_string(),
    None => format!("a key concept from {}", topic),
  };

  let sanitized = custom_persona.map(sanitize_persona).unwrap_or_default();
  let (audience, label) = if sanitized.is_empty() {
    // choose() on a non-empty fixed array cannot fail
    let a = *FIXED_AUDIENCES.choose(rng).unwrap_or(&Audience::Peer);
    (a, audience_label(a).to_string())
  } else {
    (Audience::Custom, sanitized)
  };

  let template = PROMPT_TEMPLATES.choose(rng).unwrap_or(&PROMPT_TEMPLATES[0]);
  let text = fill_template(template, &[("concept", &concept), ("audience", &label)]);

  Prompt {
    id: Uuid::new_v4().to_string(),
    text,
    topic: topic.to_string(),
    concept,
    audience,
    audience_label: label,
    difficulty,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::PROMPT_TEMPLATES;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn matches_some_template(p: &Prompt) -> bool {
    PROMPT_TEMPLATES.iter().any(|t| {
      let expected = fill_template(t, &[("concept", &p.concept), ("audience", &p.audience_label)]);
      expected == p.text
    })
  }

  #[test]
  fn known_topic_draws_from_fixed_sets() {
    let mut rng = StdRng::seed_from_u64(7);
    let none: HashMap<String, Vec<String>> = HashMap::new();
    for _ in 0..50 {
      let p = generate_prompt("JavaScript", Difficulty::Intermediate, None, &none, &mut rng);
      assert!(!p.text.is_empty());
      assert!(concept_pool("JavaScript").unwrap().contains(&p.concept.as_str()));
      assert!(FIXED_AUDIENCES.contains(&p.audience));
      assert_eq!(p.audience_label, audience_label(p.audience));
      assert!(matches_some_template(&p), "unexpected text: {}", p.text);
    }
  }

  #[test]
  fn unknown_topic_uses_placeholder_concept() {
    let mut rng = StdRng::seed_from_u64(1);
    let none = HashMap::new();
    let p = generate_prompt("Beekeeping", Difficulty::Beginner, None, &none, &mut rng);
    assert_eq!(p.concept, "a key concept from Beekeeping");
    assert!(!p.text.is_empty());
    assert!(p.text.contains("a key concept from Beekeeping"));
  }

  #[test]
  fn custom_persona_used_verbatim_after_sanitizing() {
    let mut rng = StdRng::seed_from_u64(2);
    let none = HashMap::new();
    let p = generate_prompt(
      "Python",
      Difficulty::Advanced,
      Some("  a grandmother <learning> tech "),
      &none,
      &mut rng,
    );
    assert_eq!(p.audience, Audience::Custom);
    assert_eq!(p.audience_label, "a grandmother learning tech");
    assert!(p.text.contains("a grandmother learning tech"));
  }

  #[test]
  fn blank_persona_falls_back_to_fixed_audience() {
    let mut rng = StdRng::seed_from_u64(3);
    let none = HashMap::new();
    let p = generate_prompt("Physics", Difficulty::Intermediate, Some("<<<>>>"), &none, &mut rng);
    assert!(FIXED_AUDIENCES.contains(&p.audience));
  }

  #[test]
  fn user_added_concepts_join_the_pool() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut extra = HashMap::new();
    extra.insert("Chess".to_string(), vec!["zugzwang".to_string()]);
    let p = generate_prompt("Chess", Difficulty::Intermediate, None, &extra, &mut rng);
    assert_eq!(p.concept, "zugzwang");
  }
}
