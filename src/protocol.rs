//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Attempt, Difficulty, Phase, Prompt, ScoreResult};
use crate::session::Session;

/// Messages the client can send over WebSocket to drive the session.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    SelectTopics {
        topics: Vec<String>,
    },
    AddTopic {
        name: String,
    },
    AddConcept {
        topic: String,
        concept: String,
    },
    SetTimer {
        duration: u32,
    },
    SetPersona {
        persona: String,
    },
    /// New prompt: generate from TopicSelect, skip from PromptDisplay,
    /// retry from Results.
    Generate,
    Start,
    Draft {
        text: String,
    },
    Submit,
    Reset,
}

/// Messages the server pushes back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    /// Full session snapshot after any state-changing action.
    State {
        session: SessionSnapshot,
    },
    Tick {
        remaining: u32,
        percent: f32,
    },
    /// The countdown ran out. `auto_submitting` tells the client whether a
    /// scoring call was triggered (non-empty draft) or the round just ended.
    Expired {
        #[serde(rename = "autoSubmitting")]
        auto_submitting: bool,
    },
    Scored {
        attempt: Attempt,
    },
    ScoreFailed {
        message: String,
    },
    Error {
        message: String,
    },
}

/// Client-facing view of the live session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub selected_topics: Vec<String>,
    pub timer_duration: u32,
    pub time_remaining: u32,
    pub persona: String,
    pub prompt: Option<Prompt>,
    pub explanation: String,
    pub score: Option<ScoreResult>,
}

impl SessionSnapshot {
    pub fn of(session: &Session) -> Self {
        Self {
            phase: session.phase(),
            selected_topics: session.selected_topics().to_vec(),
            timer_duration: session.countdown().duration(),
            time_remaining: session.countdown().remaining(),
            persona: session.persona().to_string(),
            prompt: session.prompt().cloned(),
            explanation: session.explanation().to_string(),
            score: session.score().cloned(),
        }
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct PromptQuery {
    pub topic: Option<String>,
    pub difficulty: Option<Difficulty>,
}

#[derive(Serialize)]
pub struct PromptOut {
    pub success: bool,
    pub prompt: Prompt,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicsOut {
    pub success: bool,
    pub topics: Vec<String>,
    pub timer_presets: Vec<u32>,
}

#[derive(Serialize)]
pub struct ScoreOut {
    pub success: bool,
    pub result: ScoreResult,
}

#[derive(Serialize)]
pub struct AttemptsOut {
    pub success: bool,
    pub attempts: Vec<Attempt>,
}

#[derive(Serialize)]
pub struct AttemptOut {
    pub success: bool,
    pub attempt: Attempt,
}

#[derive(Serialize)]
pub struct OkOut {
    pub success: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub success: bool,
    pub error: String,
}

impl ErrorOut {
    pub fn new(error: impl Into<String>) -> Self {
        Self { success: false, error: error.into() }
    }
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
