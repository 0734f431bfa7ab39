//! Loading the optional practice configuration (extra topics and concept
//! pools) from TOML.
//!
//! See `PracticeConfig` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::TopicCategory;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct PracticeConfig {
  #[serde(default)]
  pub topics: Vec<TopicCfg>,
}

/// Topic entry accepted in TOML configuration. Concepts are optional; a
/// topic without any gets the generic placeholder concept at generation
/// time, same as a topic typed in by the user.
#[derive(Clone, Debug, Deserialize)]
pub struct TopicCfg {
  pub name: String,
  #[serde(default)]
  pub category: Option<TopicCategory>,
  #[serde(default)]
  pub concepts: Vec<String>,
}

/// Attempt to load `PracticeConfig` from PRACTICE_CONFIG_PATH. On any
/// parsing/IO error, returns None.
pub fn load_practice_config_from_env() -> Option<PracticeConfig> {
  let path = std::env::var("PRACTICE_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<PracticeConfig>(&s) {
      Ok(cfg) => {
        info!(target: "thinkfast_backend", %path, topics = cfg.topics.len(), "Loaded practice config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "thinkfast_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "thinkfast_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_topic_bank() {
    let cfg: PracticeConfig = toml::from_str(
      r#"
        [[topics]]
        name = "Chess"
        category = "lifestyle"
        concepts = ["zugzwang", "forks"]

        [[topics]]
        name = "Gardening"
      "#,
    )
    .unwrap();
    assert_eq!(cfg.topics.len(), 2);
    assert_eq!(cfg.topics[0].name, "Chess");
    assert_eq!(cfg.topics[0].category, Some(TopicCategory::Lifestyle));
    assert_eq!(cfg.topics[0].concepts, vec!["zugzwang", "forks"]);
    assert!(cfg.topics[1].concepts.is_empty());
  }
}
