//! Application state: the attempt store, the optional scoring oracle, the
//! configured topic bank, and the single practice session.
//!
//! One session exists per process; this is a single-user tool and the
//! WebSocket loop is the only writer. The stateless prompt/score endpoints
//! never touch the session.

use std::collections::HashMap;

use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::catalog::{preset_topics, DEFAULT_TIMER};
use crate::config::{load_practice_config_from_env, TopicCfg};
use crate::oracle::Oracle;
use crate::session::Session;
use crate::store::{AttemptStore, FileStore, KvStore, MemoryStore};
use crate::util::format_timer_label;

pub struct AppState {
    pub store: AttemptStore,
    pub oracle: Option<Oracle>,
    pub session: Mutex<Session>,
    config_topics: Vec<TopicCfg>,
}

impl AppState {
    /// Build state from env: persistence directory, optional TOML topic
    /// bank, optional oracle client, and a session seeded from saved
    /// preferences.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let kv: Box<dyn KvStore> = {
            let dir = std::env::var("STORE_PATH").unwrap_or_else(|_| "./data".into());
            match FileStore::new(&dir) {
                Ok(fs) => {
                    info!(target: "thinkfast_backend", %dir, "Attempt store on disk");
                    Box::new(fs)
                }
                Err(e) => {
                    warn!(target: "thinkfast_backend", %dir, error = %e, "Store directory unusable; falling back to memory");
                    Box::new(MemoryStore::default())
                }
            }
        };
        let store = AttemptStore::new(kv);

        let config_topics = load_practice_config_from_env().map(|c| c.topics).unwrap_or_default();

        let oracle = Oracle::from_env();
        if let Some(o) = &oracle {
            info!(target: "thinkfast_backend", base_url = %o.base_url, model = %o.model, "Scoring oracle enabled.");
        } else {
            info!(target: "thinkfast_backend", "Scoring oracle disabled (no ORACLE_API_KEY). Submissions will fail until one is configured.");
        }

        let timer = store.timer_duration().unwrap_or(DEFAULT_TIMER);
        let persona = store.custom_persona();
        info!(
            target: "practice",
            timer = %format_timer_label(timer),
            persona_set = !persona.is_empty(),
            "Saved preferences loaded"
        );
        let session = Session::new(timer, persona);

        let state = Self { store, oracle, session: Mutex::new(session), config_topics };
        info!(
            target: "practice",
            preset = preset_topics().len(),
            configured = state.config_topics.len(),
            custom = state.store.custom_topics().len(),
            attempts = state.store.attempts().len(),
            "Startup inventory"
        );
        state
    }

    /// Every topic a prompt may be drawn from: presets, then the TOML
    /// bank, then user-added topics, deduplicated in that order.
    pub fn topic_pool(&self) -> Vec<String> {
        let mut pool: Vec<String> = preset_topics().into_iter().map(|t| t.name).collect();
        for name in self
            .config_topics
            .iter()
            .map(|t| t.name.clone())
            .chain(self.store.custom_topics())
        {
            if !pool.contains(&name) {
                pool.push(name);
            }
        }
        pool
    }

    /// User/config-added concepts, keyed by topic name. These join the
    /// preset pools inside the prompt generator.
    pub fn concept_overlays(&self) -> HashMap<String, Vec<String>> {
        let mut map = self.store.custom_concepts();
        for t in &self.config_topics {
            if t.concepts.is_empty() {
                continue;
            }
            let entry = map.entry(t.name.clone()).or_default();
            for c in &t.concepts {
                if !entry.contains(c) {
                    entry.push(c.clone());
                }
            }
        }
        map
    }
}
