use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use portal_types::api::UpdateStudySessionRequest;
use portal_types::models::StudySession;

use crate::auth::AppState;
use crate::error::{ApiError, ApiJson, ApiResult};
use crate::middleware::AuthUser;
use crate::resources::{Insertable, session_to_row};

/// PUT /study-sessions/:id — full replacement of one session. The store
/// filters by (id, owner), so a caller can never overwrite another user's
/// session by guessing its id; a non-matching pair is a plain NotFound.
pub async fn update_study_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<UpdateStudySessionRequest>,
) -> ApiResult<Json<StudySession>> {
    StudySession::validate(&req).map_err(ApiError::BadRequest)?;

    let session = StudySession {
        id,
        user_id: claims.sub,
        subject: req.subject,
        topic: req.topic,
        duration: req.duration,
        difficulty: req.difficulty,
        completed: req.completed,
        date: req.date,
    };

    let db = state.clone();
    let row = session_to_row(&session);
    let updated =
        tokio::task::spawn_blocking(move || db.db.update_study_session(&row.id, &row.user_id, &row))
            .await??;

    if !updated {
        return Err(ApiError::NotFound("Session not found"));
    }

    Ok(Json(session))
}
