//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Admin handlers validate the session token first and pass the resulting
//! capability down; game handlers need no credentials.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use tracing::{info, instrument};

use crate::admin;
use crate::logic;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
    Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_subjects(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let subjects = state
        .subjects_sorted()
        .await
        .iter()
        .map(|(id, s)| subject_out(id, s))
        .collect();
    Json(SubjectsOut { subjects })
}

#[instrument(level = "info", skip(state), fields(subject = %q.subject, difficulty = ?q.difficulty))]
pub async fn http_get_riddle(
    State(state): State<Arc<AppState>>,
    Query(q): Query<RiddleQuery>,
) -> impl IntoResponse {
    let (riddle, notice) = logic::serve_riddle(&state, &q.subject, q.difficulty).await;
    let greeting = riddle.as_ref().map(|_| logic::GREETING.to_string());
    if let Some(r) = &riddle {
        info!(target: "riddle", id = %r.id, "HTTP riddle served");
    }
    Json(RiddlePickOut { riddle, greeting, notice })
}

#[instrument(level = "info", skip(state, body), fields(%body.riddle_id, question_len = body.question.len()))]
pub async fn http_post_ask(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AskIn>,
) -> impl IntoResponse {
    match logic::ask_question(&state, &body.riddle_id, &body.question).await {
        Ok(reply) => Json(AskOut { reply: Some(reply), notice: None }),
        Err(notice) => Json(AskOut { reply: None, notice: Some(notice) }),
    }
}

#[instrument(level = "info", skip(state, body), fields(%body.riddle_id, guess_len = body.guess.len()))]
pub async fn http_post_guess(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GuessIn>,
) -> impl IntoResponse {
    match logic::guess_answer(&state, &body.riddle_id, &body.guess).await {
        Ok(out) => Json(out),
        Err(notice) => Json(GuessOut { correct: false, solution: None, chat: None, notice }),
    }
}

//
// Admin surface
//

#[instrument(level = "info", skip(state, body))]
pub async fn http_admin_login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginIn>,
) -> impl IntoResponse {
    match admin::login(&state, &body.password).await {
        Ok(session) => Json(LoginOut {
            ok: true,
            token: Some(session.token().to_string()),
            notice: Notice::success("管理员登录成功"),
        }),
        Err(message) => Json(LoginOut { ok: false, token: None, notice: Notice::error(message) }),
    }
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_admin_logout(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LogoutIn>,
) -> impl IntoResponse {
    let message = admin::logout(&state, &body.token).await;
    Json(ActionOut { ok: true, notice: Notice::info(message) })
}

#[instrument(level = "info", skip(state, q))]
pub async fn http_admin_riddles(
    State(state): State<Arc<AppState>>,
    Query(q): Query<AdminRiddlesQuery>,
) -> impl IntoResponse {
    if state.authorize(&q.token).await.is_none() {
        return Json(ActionOut::denied()).into_response();
    }
    let riddles = admin::list_riddles(&state, q.search.as_deref()).await;
    info!(target: "riddle", count = riddles.len(), "HTTP admin riddle list served");
    Json(AdminRiddlesOut { riddles }).into_response()
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_admin_save_riddle(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SaveRiddleIn>,
) -> impl IntoResponse {
    let Some(session) = state.authorize(&body.token).await else {
        return Json(ActionOut::denied());
    };
    match admin::save_riddle(&state, &session, body.riddle).await {
        Ok((_, message)) => Json(ActionOut { ok: true, notice: Notice::success(message) }),
        Err(message) => Json(ActionOut { ok: false, notice: Notice::error(message) }),
    }
}

#[instrument(level = "info", skip(state, body), fields(%body.id))]
pub async fn http_admin_delete_riddle(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DeleteRiddleIn>,
) -> impl IntoResponse {
    let Some(session) = state.authorize(&body.token).await else {
        return Json(ActionOut::denied());
    };
    match admin::delete_riddle(&state, &session, &body.id).await {
        Ok(message) => Json(ActionOut { ok: true, notice: Notice::success(message) }),
        Err(message) => Json(ActionOut { ok: false, notice: Notice::error(message) }),
    }
}

#[instrument(level = "info", skip(state, body), fields(name = %body.name))]
pub async fn http_admin_add_subject(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddSubjectIn>,
) -> impl IntoResponse {
    let Some(session) = state.authorize(&body.token).await else {
        return Json(ActionOut::denied());
    };
    match admin::add_subject(&state, &session, &body.name, body.color).await {
        Ok(message) => Json(ActionOut { ok: true, notice: Notice::success(message) }),
        Err(message) => Json(ActionOut { ok: false, notice: Notice::error(message) }),
    }
}

#[instrument(level = "info", skip(state, body), fields(%body.id))]
pub async fn http_admin_delete_subject(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DeleteSubjectIn>,
) -> impl IntoResponse {
    let Some(session) = state.authorize(&body.token).await else {
        return Json(ActionOut::denied());
    };
    match admin::delete_subject(&state, &session, &body.id).await {
        Ok(message) => Json(ActionOut { ok: true, notice: Notice::success(message) }),
        Err(message) => Json(ActionOut { ok: false, notice: Notice::error(message) }),
    }
}
