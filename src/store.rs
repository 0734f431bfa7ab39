//! Attempt history and preference persistence.
//!
//! Everything goes through the `KvStore` trait (string keys, JSON string
//! values) so the file-backed store used in production can be swapped for
//! the in-memory one in tests. Reads of a missing key yield defaults.
//! Read-modify-write is not atomic across calls; there is exactly one
//! writer (the single user session), which is the whole locking story.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, warn};

use crate::domain::Attempt;

const ATTEMPTS_KEY: &str = "thinkfast_attempts";
const TOPICS_KEY: &str = "thinkfast_custom_topics";
const TIMER_KEY: &str = "thinkfast_timer";
const PERSONA_KEY: &str = "thinkfast_persona";
const CONCEPTS_KEY: &str = "thinkfast_custom_concepts";

/// Minimal key-value persistence surface.
pub trait KvStore: Send + Sync {
  fn get(&self, key: &str) -> Option<String>;
  fn set(&self, key: &str, value: &str);
  fn remove(&self, key: &str);
}

/// HashMap-backed store for tests and memory-only runs.
#[derive(Default)]
pub struct MemoryStore {
  map: Mutex<HashMap<String, String>>,
}

impl KvStore for MemoryStore {
  fn get(&self, key: &str) -> Option<String> {
    self.map.lock().ok().and_then(|m| m.get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) {
    if let Ok(mut m) = self.map.lock() {
      m.insert(key.to_string(), value.to_string());
    }
  }

  fn remove(&self, key: &str) {
    if let Ok(mut m) = self.map.lock() {
      m.remove(key);
    }
  }
}

/// One JSON file per key under a directory. Writes are best-effort: an I/O
/// failure is logged and the value is simply not persisted.
pub struct FileStore {
  dir: PathBuf,
}

impl FileStore {
  pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
    let dir = dir.into();
    std::fs::create_dir_all(&dir)?;
    Ok(Self { dir })
  }

  fn path_for(&self, key: &str) -> PathBuf {
    self.dir.join(format!("{}.json", key))
  }
}

impl KvStore for FileStore {
  fn get(&self, key: &str) -> Option<String> {
    std::fs::read_to_string(self.path_for(key)).ok()
  }

  fn set(&self, key: &str, value: &str) {
    if let Err(e) = std::fs::write(self.path_for(key), value) {
      error!(target: "store", %key, error = %e, "Failed to persist value");
    }
  }

  fn remove(&self, key: &str) {
    match std::fs::remove_file(self.path_for(key)) {
      Ok(()) => {}
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
      Err(e) => error!(target: "store", %key, error = %e, "Failed to remove value"),
    }
  }
}

/// Namespaced access to attempt history, custom topics/concepts, and the
/// timer/persona preferences, on top of an injected `KvStore`.
pub struct AttemptStore {
  kv: Box<dyn KvStore>,
}

impl AttemptStore {
  pub fn new(kv: Box<dyn KvStore>) -> Self {
    Self { kv }
  }

  fn read_json<T: DeserializeOwned + Default>(&self, key: &str) -> T {
    match self.kv.get(key) {
      None => T::default(),
      Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(target: "store", %key, error = %e, "Corrupt stored value; using default");
        T::default()
      }),
    }
  }

  fn write_json<T: Serialize>(&self, key: &str, value: &T) {
    match serde_json::to_string(value) {
      Ok(raw) => self.kv.set(key, &raw),
      Err(e) => error!(target: "store", %key, error = %e, "Failed to serialize value"),
    }
  }

  // --- Attempt history (newest first) ---

  pub fn attempts(&self) -> Vec<Attempt> {
    self.read_json(ATTEMPTS_KEY)
  }

  /// Prepend the new attempt so reads come back newest-first.
  pub fn save_attempt(&self, attempt: &Attempt) {
    let mut attempts = self.attempts();
    attempts.insert(0, attempt.clone());
    self.write_json(ATTEMPTS_KEY, &attempts);
  }

  pub fn get_attempt(&self, id: &str) -> Option<Attempt> {
    self.attempts().into_iter().find(|a| a.id == id)
  }

  /// Returns true when an attempt with this id existed.
  pub fn delete_attempt(&self, id: &str) -> bool {
    let attempts = self.attempts();
    let remaining: Vec<Attempt> = attempts.iter().filter(|a| a.id != id).cloned().collect();
    let removed = remaining.len() != attempts.len();
    if removed {
      self.write_json(ATTEMPTS_KEY, &remaining);
    }
    removed
  }

  pub fn clear_attempts(&self) {
    self.kv.remove(ATTEMPTS_KEY);
  }

  // --- Custom topics ---

  pub fn custom_topics(&self) -> Vec<String> {
    self.read_json(TOPICS_KEY)
  }

  /// Add a topic name, deduplicated. Returns false when already present.
  pub fn add_custom_topic(&self, name: &str) -> bool {
    let mut topics = self.custom_topics();
    if topics.iter().any(|t| t == name) {
      return false;
    }
    topics.push(name.to_string());
    self.write_json(TOPICS_KEY, &topics);
    true
  }

  // --- Custom concepts (topic -> user-added concepts) ---

  pub fn custom_concepts(&self) -> HashMap<String, Vec<String>> {
    self.read_json(CONCEPTS_KEY)
  }

  pub fn add_custom_concept(&self, topic: &str, concept: &str) -> bool {
    let mut map = self.custom_concepts();
    let entry = map.entry(topic.to_string()).or_default();
    if entry.iter().any(|c| c == concept) {
      return false;
    }
    entry.push(concept.to_string());
    self.write_json(CONCEPTS_KEY, &map);
    true
  }

  // --- Preferences ---

  pub fn timer_duration(&self) -> Option<u32> {
    self.kv.get(TIMER_KEY).and_then(|raw| serde_json::from_str(&raw).ok())
  }

  pub fn save_timer_duration(&self, duration: u32) {
    self.write_json(TIMER_KEY, &duration);
  }

  pub fn custom_persona(&self) -> String {
    self.read_json(PERSONA_KEY)
  }

  pub fn save_custom_persona(&self, persona: &str) {
    self.write_json(PERSONA_KEY, &persona);
  }
}
