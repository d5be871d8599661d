use std::sync::Arc;

use actix_web::{delete, get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::CallerIdentity,
    errors::{AppError, AppResult},
    models::dto::{AnswerRequest, AnswerResponse, ResultListResponse, SessionResponse},
    services::{quiz_service::QuizProvider, session_store::SharedSession},
};

/// Looks up a session the caller is allowed to drive. Sessions bound to a
/// user are invisible to everybody else; only the user id is compared.
async fn session_for(
    state: &AppState,
    session_id: &str,
    caller: &CallerIdentity,
) -> AppResult<SharedSession> {
    let session = state.sessions.get(session_id).await?;

    let visible = session.lock().await.is_visible_to(caller.0.as_ref());

    if visible {
        Ok(session)
    } else {
        Err(AppError::NotFound(format!(
            "Quiz session '{}' not found",
            session_id
        )))
    }
}

#[post("/api/quiz/sessions")]
async fn create_session(
    state: web::Data<AppState>,
    caller: CallerIdentity,
) -> Result<HttpResponse, AppError> {
    let provider: Arc<dyn QuizProvider> = state.quiz_service.clone();
    let (session_id, session) = state.sessions.create(provider, caller.0).await;

    let mut session = session.lock().await;
    if let Err(err) = session.load_quiz().await {
        log::info!("Session {} started without a playable quiz: {}", session_id, err);
    }

    Ok(HttpResponse::Created().json(SessionResponse {
        session_id,
        snapshot: session.snapshot(),
    }))
}

#[get("/api/quiz/sessions/{id}")]
async fn get_session(
    state: web::Data<AppState>,
    id: web::Path<String>,
    caller: CallerIdentity,
) -> Result<HttpResponse, AppError> {
    let session_id = id.into_inner();
    let session = session_for(&state, &session_id, &caller).await?;
    let snapshot = session.lock().await.snapshot();

    Ok(HttpResponse::Ok().json(SessionResponse {
        session_id,
        snapshot,
    }))
}

/// Manual retry after a failed load.
#[post("/api/quiz/sessions/{id}/load")]
async fn reload_session(
    state: web::Data<AppState>,
    id: web::Path<String>,
    caller: CallerIdentity,
) -> Result<HttpResponse, AppError> {
    let session_id = id.into_inner();
    let session = session_for(&state, &session_id, &caller).await?;
    let mut session = session.lock().await;

    match session.load_quiz().await {
        Ok(()) => {}
        Err(err) if err.is_retryable_load_error() => {}
        Err(err) => return Err(err),
    }

    Ok(HttpResponse::Ok().json(SessionResponse {
        session_id,
        snapshot: session.snapshot(),
    }))
}

#[post("/api/quiz/sessions/{id}/answer")]
async fn answer_question(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<AnswerRequest>,
    caller: CallerIdentity,
) -> Result<HttpResponse, AppError> {
    let session = session_for(&state, &id, &caller).await?;
    let mut session = session.lock().await;

    let feedback = session.answer(request.option_index)?;

    Ok(HttpResponse::Ok().json(AnswerResponse {
        feedback,
        snapshot: session.snapshot(),
    }))
}

#[post("/api/quiz/sessions/{id}/advance")]
async fn advance_session(
    state: web::Data<AppState>,
    id: web::Path<String>,
    caller: CallerIdentity,
) -> Result<HttpResponse, AppError> {
    let session_id = id.into_inner();
    let session = session_for(&state, &session_id, &caller).await?;
    let mut session = session.lock().await;

    session.advance().await?;

    Ok(HttpResponse::Ok().json(SessionResponse {
        session_id,
        snapshot: session.snapshot(),
    }))
}

#[delete("/api/quiz/sessions/{id}")]
async fn delete_session(
    state: web::Data<AppState>,
    id: web::Path<String>,
    caller: CallerIdentity,
) -> Result<HttpResponse, AppError> {
    session_for(&state, &id, &caller).await?;
    state.sessions.remove(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// The caller's saved results, newest first.
#[get("/api/quiz/results")]
async fn list_my_results(
    state: web::Data<AppState>,
    caller: CallerIdentity,
) -> Result<HttpResponse, AppError> {
    let identity = caller
        .0
        .ok_or_else(|| AppError::Unauthenticated("Not authenticated".to_string()))?;

    let results = state.quiz_service.results_for(&identity).await?;
    Ok(HttpResponse::Ok().json(ResultListResponse::from(results)))
}
