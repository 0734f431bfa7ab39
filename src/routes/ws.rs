//! WebSocket upgrade + the practice session loop.
//!
//! The socket is the session's driver: client messages trigger state-machine
//! transitions, and a one-second interval is armed only while the countdown
//! is running, so pausing or resetting the timer leaves no pending tick. On
//! expiry with a non-empty draft the loop performs the same submission path
//! as an explicit Submit.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tokio::time::{interval_at, Interval};
use tracing::{debug, error, info, instrument};

use crate::protocol::{ClientWsMessage, ServerWsMessage, SessionSnapshot};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "thinkfast_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn send(socket: &mut WebSocket, msg: &ServerWsMessage) -> bool {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  if let Err(e) = socket.send(Message::Text(out)).await {
    error!(target: "thinkfast_backend", error = %e, "WS send error");
    return false;
  }
  true
}

async fn snapshot(state: &AppState) -> ServerWsMessage {
  let session = state.session.lock().await;
  ServerWsMessage::State { session: SessionSnapshot::of(&session) }
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "thinkfast_backend", "WebSocket connected");

  let hello = snapshot(&state).await;
  if !send(&mut socket, &hello).await {
    return;
  }

  let mut ticker: Option<Interval> = None;
  loop {
    // Arm the ticker only while the countdown runs; drop it otherwise so a
    // paused or reset timer cannot fire a stray tick.
    let running = state.session.lock().await.countdown().is_running();
    if running && ticker.is_none() {
      let period = Duration::from_secs(1);
      ticker = Some(interval_at(tokio::time::Instant::now() + period, period));
    } else if !running {
      ticker = None;
    }

    let tick_due = async {
      match ticker.as_mut() {
        Some(iv) => {
          iv.tick().await;
        }
        None => std::future::pending().await,
      }
    };

    tokio::select! {
      incoming = socket.recv() => {
        let msg = match incoming {
          Some(Ok(Message::Text(txt))) => txt,
          Some(Ok(Message::Ping(payload))) => {
            let _ = socket.send(Message::Pong(payload)).await;
            continue;
          }
          Some(Ok(Message::Close(_))) | None => break,
          Some(Ok(_)) => continue,
          Some(Err(e)) => {
            error!(target: "thinkfast_backend", error = %e, "WS receive error");
            break;
          }
        };

        match serde_json::from_str::<ClientWsMessage>(&msg) {
          Ok(incoming) => {
            debug!(target: "thinkfast_backend", "WS received: {:?}", &incoming);
            if !handle_client_ws(incoming, &state, &mut socket).await {
              break;
            }
          }
          Err(e) => {
            let reply = ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) };
            if !send(&mut socket, &reply).await {
              break;
            }
          }
        }
      }

      _ = tick_due => {
        let (remaining, percent, expired) = {
          let mut session = state.session.lock().await;
          let expired = session.tick();
          (session.countdown().remaining(), session.countdown().percent_remaining(), expired)
        };
        if !send(&mut socket, &ServerWsMessage::Tick { remaining, percent }).await {
          break;
        }
        if expired {
          let auto = state.session.lock().await.should_auto_submit();
          info!(target: "practice", auto_submitting = auto, "Countdown expired");
          if !send(&mut socket, &ServerWsMessage::Expired { auto_submitting: auto }).await {
            break;
          }
          if auto && !submit(&state, &mut socket).await {
            break;
          }
        }
      }
    }
  }
  info!(target: "thinkfast_backend", "WebSocket disconnected");
}

/// Apply one client message. Returns false when the socket died mid-reply.
async fn handle_client_ws(msg: ClientWsMessage, state: &Arc<AppState>, socket: &mut WebSocket) -> bool {
  let reply = match msg {
    ClientWsMessage::Ping => Some(ServerWsMessage::Pong),

    ClientWsMessage::SelectTopics { topics } => {
      let mut session = state.session.lock().await;
      match session.select_topics(topics) {
        Ok(()) => Some(ServerWsMessage::State { session: SessionSnapshot::of(&session) }),
        Err(e) => Some(ServerWsMessage::Error { message: e.to_string() }),
      }
    }

    ClientWsMessage::AddTopic { name } => {
      let name = name.trim().to_string();
      if name.is_empty() {
        Some(ServerWsMessage::Error { message: "topic name is empty".into() })
      } else {
        state.store.add_custom_topic(&name);
        Some(snapshot(state).await)
      }
    }

    ClientWsMessage::AddConcept { topic, concept } => {
      let concept = concept.trim().to_string();
      if concept.is_empty() {
        Some(ServerWsMessage::Error { message: "concept is empty".into() })
      } else {
        state.store.add_custom_concept(&topic, &concept);
        Some(snapshot(state).await)
      }
    }

    ClientWsMessage::SetTimer { duration } => {
      let mut session = state.session.lock().await;
      match session.set_timer_duration(duration) {
        Ok(()) => {
          state.store.save_timer_duration(duration);
          Some(ServerWsMessage::State { session: SessionSnapshot::of(&session) })
        }
        Err(e) => Some(ServerWsMessage::Error { message: e.to_string() }),
      }
    }

    ClientWsMessage::SetPersona { persona } => {
      let mut session = state.session.lock().await;
      match session.set_persona(persona.clone()) {
        Ok(()) => {
          state.store.save_custom_persona(&persona);
          Some(ServerWsMessage::State { session: SessionSnapshot::of(&session) })
        }
        Err(e) => Some(ServerWsMessage::Error { message: e.to_string() }),
      }
    }

    ClientWsMessage::Generate => {
      let pool = state.topic_pool();
      let overlays = state.concept_overlays();
      let mut session = state.session.lock().await;
      let outcome = session.generate(&pool, &overlays, &mut rand::thread_rng()).map(|_| ());
      match outcome {
        Ok(()) => Some(ServerWsMessage::State { session: SessionSnapshot::of(&session) }),
        Err(e) => Some(ServerWsMessage::Error { message: e.to_string() }),
      }
    }

    ClientWsMessage::Start => {
      let mut session = state.session.lock().await;
      match session.start(Instant::now()) {
        Ok(()) => Some(ServerWsMessage::State { session: SessionSnapshot::of(&session) }),
        Err(e) => Some(ServerWsMessage::Error { message: e.to_string() }),
      }
    }

    ClientWsMessage::Draft { text } => {
      let mut session = state.session.lock().await;
      match session.update_draft(text) {
        // drafts are chatty; no snapshot echo, ticks carry the clock
        Ok(()) => None,
        Err(e) => Some(ServerWsMessage::Error { message: e.to_string() }),
      }
    }

    ClientWsMessage::Submit => {
      return submit(state, socket).await;
    }

    ClientWsMessage::Reset => {
      let mut session = state.session.lock().await;
      match session.reset() {
        Ok(()) => Some(ServerWsMessage::State { session: SessionSnapshot::of(&session) }),
        Err(e) => Some(ServerWsMessage::Error { message: e.to_string() }),
      }
    }
  };

  match reply {
    Some(reply) => send(socket, &reply).await,
    None => true,
  }
}

/// Shared submission path for explicit Submit and timer-expiry auto-submit.
/// The session lock is never held across the oracle call.
async fn submit(state: &Arc<AppState>, socket: &mut WebSocket) -> bool {
  let req = {
    let mut session = state.session.lock().await;
    match session.begin_submit(Instant::now()) {
      Ok(req) => req,
      Err(e) => {
        drop(session);
        return send(socket, &ServerWsMessage::Error { message: e.to_string() }).await;
      }
    }
  };

  if !send(socket, &snapshot(state).await).await {
    return false;
  }

  let verdict = match &state.oracle {
    Some(oracle) => oracle.score(&req).await,
    None => Err(crate::oracle::ScoreError::Unavailable("no oracle configured".into())),
  };

  match verdict {
    Ok(result) => {
      let attempt = {
        let mut session = state.session.lock().await;
        match session.complete_submit(result) {
          Ok(attempt) => attempt,
          Err(e) => {
            drop(session);
            return send(socket, &ServerWsMessage::Error { message: e.to_string() }).await;
          }
        }
      };
      state.store.save_attempt(&attempt);
      info!(target: "practice", attempt_id = %attempt.id, overall = attempt.score.overall.score, "Attempt recorded");
      if !send(socket, &ServerWsMessage::Scored { attempt }).await {
        return false;
      }
      send(socket, &snapshot(state).await).await
    }
    Err(e) => {
      error!(target: "scoring", error = %e, "Submission failed; session reverted to typing");
      {
        let mut session = state.session.lock().await;
        let _ = session.fail_submit();
      }
      if !send(socket, &ServerWsMessage::ScoreFailed { message: e.to_string() }).await {
        return false;
      }
      send(socket, &snapshot(state).await).await
    }
  }
}
