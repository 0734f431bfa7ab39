//! Built-in content: preset topics, concept pools, audience personas,
//! prompt templates, and timer presets. This is what makes the app useful
//! before the user adds anything of their own.

use crate::domain::{Audience, Topic, TopicCategory};

pub const TIMER_PRESETS: [u32; 6] = [30, 60, 90, 120, 180, 300];
pub const DEFAULT_TIMER: u32 = 60;
pub const TIMER_MIN: u32 = 10;
pub const TIMER_MAX: u32 = 600;

pub const MAX_PERSONA_LENGTH: usize = 50;

/// The six personas a prompt may be addressed to when no custom persona
/// is configured.
pub const FIXED_AUDIENCES: [Audience; 6] = [
  Audience::Child,
  Audience::Teenager,
  Audience::NonTechnical,
  Audience::Peer,
  Audience::Executive,
  Audience::Interviewer,
];

/// Canonical descriptor text substituted into prompt templates.
pub fn audience_label(audience: Audience) -> &'static str {
  match audience {
    Audience::Child => "a 10-year-old child",
    Audience::Teenager => "a teenager",
    Audience::NonTechnical => "a non-technical adult",
    Audience::Peer => "a peer with similar expertise",
    Audience::Executive => "a business executive",
    Audience::Interviewer => "a job interviewer",
    Audience::Custom => "a general audience",
  }
}

/// The eight phrasing templates. `{concept}` and `{audience}` are filled
/// by the prompt generator.
pub const PROMPT_TEMPLATES: [&str; 8] = [
  "Explain {concept} to {audience}.",
  "What is {concept} and why does it matter? Explain for {audience}.",
  "Describe how {concept} works to {audience}.",
  "Summarize {concept} in a way that {audience} would understand.",
  "What are the most important things to know about {concept}? Explain for {audience}.",
  "Walk through {concept} step by step for {audience}.",
  "If {audience} asked you about {concept}, what would you say?",
  "What common misconceptions exist about {concept}? Explain for {audience}.",
];

/// Concept pool for a preset topic. Custom topics return None and get a
/// generic placeholder concept instead.
pub fn concept_pool(topic: &str) -> Option<&'static [&'static str]> {
  let pool: &'static [&'static str] = match topic {
    "JavaScript" => &[
      "closures",
      "promises",
      "the event loop",
      "prototypal inheritance",
      "async/await",
      "hoisting",
      "higher-order functions",
      "the DOM",
    ],
    "Python" => &[
      "decorators",
      "generators",
      "list comprehensions",
      "the GIL",
      "duck typing",
      "context managers",
      "virtual environments",
      "dunder methods",
    ],
    "Machine Learning" => &[
      "gradient descent",
      "overfitting",
      "neural networks",
      "supervised vs unsupervised learning",
      "backpropagation",
      "bias-variance tradeoff",
      "decision trees",
      "cross-validation",
    ],
    "Web Development" => &[
      "REST APIs",
      "CORS",
      "cookies vs sessions",
      "DNS resolution",
      "HTTPS/TLS",
      "caching strategies",
      "WebSockets",
      "responsive design",
    ],
    "Databases" => &[
      "SQL joins",
      "indexing",
      "ACID properties",
      "normalization",
      "NoSQL vs SQL",
      "transactions",
      "connection pooling",
      "sharding",
    ],
    "Operating Systems" => &[
      "processes vs threads",
      "virtual memory",
      "deadlocks",
      "file systems",
      "context switching",
      "scheduling algorithms",
      "system calls",
      "page replacement",
    ],
    "Networking" => &[
      "TCP vs UDP",
      "HTTP/2",
      "load balancing",
      "CDNs",
      "the OSI model",
      "subnetting",
      "packet routing",
      "firewalls",
    ],
    "Data Structures" => &[
      "hash tables",
      "binary trees",
      "linked lists vs arrays",
      "graphs",
      "stacks and queues",
      "heaps",
      "tries",
      "B-trees",
    ],
    "Physics" => &[
      "gravity",
      "quantum entanglement",
      "thermodynamics",
      "special relativity",
      "electromagnetic waves",
      "entropy",
      "wave-particle duality",
      "Newton's laws",
    ],
    "Economics" => &[
      "supply and demand",
      "inflation",
      "opportunity cost",
      "game theory",
      "monetary policy",
      "comparative advantage",
      "market equilibrium",
      "externalities",
    ],
    _ => return None,
  };
  Some(pool)
}

/// The ten preset topics shown before the user adds custom ones.
pub fn preset_topics() -> Vec<Topic> {
  fn t(id: &str, name: &str, category: TopicCategory) -> Topic {
    Topic { id: id.into(), name: name.into(), category }
  }
  vec![
    t("javascript", "JavaScript", TopicCategory::Technology),
    t("python", "Python", TopicCategory::Technology),
    t("ml", "Machine Learning", TopicCategory::Technology),
    t("webdev", "Web Development", TopicCategory::Technology),
    t("databases", "Databases", TopicCategory::Technology),
    t("os", "Operating Systems", TopicCategory::Technology),
    t("networking", "Networking", TopicCategory::Technology),
    t("dsa", "Data Structures", TopicCategory::Technology),
    t("physics", "Physics", TopicCategory::Science),
    t("economics", "Economics", TopicCategory::Humanities),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_preset_topic_has_a_concept_pool() {
    for topic in preset_topics() {
      let pool = concept_pool(&topic.name);
      assert!(pool.is_some(), "no pool for {}", topic.name);
      assert_eq!(pool.unwrap().len(), 8);
    }
  }

  #[test]
  fn unknown_topic_has_no_pool() {
    assert!(concept_pool("Underwater Basket Weaving").is_none());
  }
}
