//! HTTP endpoint handlers. These are thin wrappers over the prompt/scoring
//! pipeline and the attempt store; the interactive session lives on the
//! WebSocket side. Each handler is instrumented and logs basic result info.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{info, instrument, warn};

use crate::catalog::TIMER_PRESETS;
use crate::domain::Difficulty;
use crate::oracle::ScoreError;
use crate::prompt_gen::generate_prompt;
use crate::protocol::*;
use crate::scoring::{self, ScoreRequest};
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

/// Full topic pool: presets, the configured bank, and user-added topics.
/// Timer presets ride along so the client can render duration choices.
#[instrument(level = "info", skip(state))]
pub async fn http_list_topics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(TopicsOut {
    success: true,
    topics: state.topic_pool(),
    timer_presets: TIMER_PRESETS.to_vec(),
  })
}

/// `GET /api/v1/prompt?topic=..&difficulty=..` - stateless prompt
/// generation. Difficulty defaults to intermediate; a missing topic is the
/// one rejection.
#[instrument(level = "info", skip(state))]
pub async fn http_get_prompt(
  State(state): State<Arc<AppState>>,
  Query(q): Query<PromptQuery>,
) -> Response {
  let topic = match q.topic {
    Some(t) if !t.trim().is_empty() => t,
    _ => {
      return (StatusCode::BAD_REQUEST, Json(ErrorOut::new("topic is required"))).into_response();
    }
  };
  let difficulty = q.difficulty.unwrap_or(Difficulty::Intermediate);

  let overlays = state.concept_overlays();
  let prompt = generate_prompt(&topic, difficulty, None, &overlays, &mut rand::thread_rng());
  info!(target: "practice", %topic, concept = %prompt.concept, "HTTP prompt served");
  Json(PromptOut { success: true, prompt }).into_response()
}

/// `POST /api/v1/score` - validate, consult the oracle, and return the
/// parsed verdict. 400 for rejected requests, 500 for oracle/parse trouble.
#[instrument(level = "info", skip(state, req), fields(topic = %req.topic, explanation_len = req.explanation.len()))]
pub async fn http_post_score(
  State(state): State<Arc<AppState>>,
  Json(req): Json<ScoreRequest>,
) -> Response {
  // Bounds come first: a malformed request is a 400 with the field named,
  // whether or not an oracle is configured.
  if let Err(msg) = scoring::validate(&req) {
    warn!(target: "scoring", %msg, "Score request rejected");
    return (
      StatusCode::BAD_REQUEST,
      Json(ErrorOut::new(ScoreError::InvalidRequest(msg).to_string())),
    )
      .into_response();
  }

  let oracle = match &state.oracle {
    Some(o) => o,
    None => {
      warn!(target: "scoring", "Score requested but no oracle is configured");
      return (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorOut::new("Scoring failed: no oracle configured")),
      )
        .into_response();
    }
  };

  match oracle.score(&req).await {
    Ok(result) => {
      info!(target: "scoring", overall = result.overall.score, "HTTP score served");
      Json(ScoreOut { success: true, result }).into_response()
    }
    Err(e @ ScoreError::InvalidRequest(_)) => {
      (StatusCode::BAD_REQUEST, Json(ErrorOut::new(e.to_string()))).into_response()
    }
    Err(e) => {
      (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorOut::new(e.to_string()))).into_response()
    }
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_attempts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let attempts = state.store.attempts();
  Json(AttemptsOut { success: true, attempts })
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_attempt(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Response {
  match state.store.get_attempt(&id) {
    Some(attempt) => Json(AttemptOut { success: true, attempt }).into_response(),
    None => (StatusCode::NOT_FOUND, Json(ErrorOut::new("attempt not found"))).into_response(),
  }
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_delete_attempt(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Response {
  if state.store.delete_attempt(&id) {
    info!(target: "practice", %id, "Attempt deleted");
    Json(OkOut { success: true }).into_response()
  } else {
    (StatusCode::NOT_FOUND, Json(ErrorOut::new("attempt not found"))).into_response()
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_clear_attempts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  state.store.clear_attempts();
  info!(target: "practice", "Attempt history cleared");
  Json(OkOut { success: true })
}
