//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic; we reply with a single JSON message per request.
//! The loop also forwards store change events so clients can resync subject
//! and riddle lists without polling.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use rand::Rng;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, instrument, warn};

use crate::logic;
use crate::protocol::{subject_out, ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

/// Simulated thinking pause before a question reply, in milliseconds.
/// Presentation only: the classification runs after the pause and is
/// unaffected by it.
const THINK_DELAY_MS: std::ops::RangeInclusive<u64> = 300..=800;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    info!(target: "turtlesoup_backend", "WebSocket upgrade requested");
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    info!(target: "turtlesoup_backend", "WebSocket connected");
    let mut changes = state.subscribe_changes();

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                let Some(Ok(msg)) = incoming else { break };
                match msg {
                    Message::Text(txt) => {
                        // Parse, dispatch, serialize response.
                        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
                            Ok(incoming) => {
                                debug!(target: "turtlesoup_backend", "WS received: {:?}", &incoming);
                                handle_client_ws(incoming, &state).await
                            }
                            Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
                        };

                        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
                            serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
                        });

                        if let Err(e) = socket.send(Message::Text(out)).await {
                            error!(target: "turtlesoup_backend", error = %e, "WS send error");
                            break;
                        }
                    }
                    Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            changed = changes.recv() => {
                match changed {
                    Ok(scope) => {
                        let push = ServerWsMessage::DataChanged { scope };
                        let out = serde_json::to_string(&push)
                            .unwrap_or_else(|_| r#"{"type":"error","message":"Serialization error"}"#.into());
                        if socket.send(Message::Text(out)).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Client missed events; it will resync on the next push.
                        warn!(target: "turtlesoup_backend", skipped, "WS change feed lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }
    info!(target: "turtlesoup_backend", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
    match msg {
        ClientWsMessage::Ping => ServerWsMessage::Pong,

        ClientWsMessage::ListSubjects => {
            let subjects = state
                .subjects_sorted()
                .await
                .iter()
                .map(|(id, s)| subject_out(id, s))
                .collect();
            ServerWsMessage::Subjects { subjects }
        }

        ClientWsMessage::NewRiddle { subject, difficulty } => {
            let (riddle, notice) = logic::serve_riddle(state, &subject, difficulty).await;
            let greeting = riddle.as_ref().map(|_| logic::GREETING.to_string());
            ServerWsMessage::Riddle { riddle, greeting, notice }
        }

        ClientWsMessage::AskQuestion { riddle_id, question } => {
            let pause = rand::thread_rng().gen_range(THINK_DELAY_MS);
            tokio::time::sleep(Duration::from_millis(pause)).await;

            match logic::ask_question(state, &riddle_id, &question).await {
                Ok(text) => ServerWsMessage::Reply { text },
                Err(notice) => ServerWsMessage::Notice { notice },
            }
        }

        ClientWsMessage::GuessAnswer { riddle_id, guess } => {
            match logic::guess_answer(state, &riddle_id, &guess).await {
                Ok(out) => ServerWsMessage::GuessResult {
                    correct: out.correct,
                    solution: out.solution,
                    chat: out.chat,
                    notice: out.notice,
                },
                Err(notice) => ServerWsMessage::Notice { notice },
            }
        }
    }
}
