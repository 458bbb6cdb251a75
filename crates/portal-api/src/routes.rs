use axum::{
    Router,
    routing::{get, post, put},
};

use portal_types::models::{Book, CommonQuestion, InterviewTip, MockInterview, StudySession};

use crate::auth::{self, AppState};
use crate::profile;
use crate::resources::{create, list_all, list_owned};
use crate::sessions;

/// The whole REST surface. Handlers taking [`crate::middleware::AuthUser`]
/// are bearer-gated; everything else is public.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route(
            "/student",
            get(profile::get_student).put(profile::update_student),
        )
        .route(
            "/study-sessions",
            get(list_owned::<StudySession>).post(create::<StudySession>),
        )
        .route("/study-sessions/{id}", put(sessions::update_study_session))
        .route("/books", get(list_all::<Book>).post(create::<Book>))
        .route(
            "/interview-tips",
            get(list_all::<InterviewTip>).post(create::<InterviewTip>),
        )
        .route("/common-questions", get(list_all::<CommonQuestion>))
        .route(
            "/mock-interviews",
            get(list_owned::<MockInterview>).post(create::<MockInterview>),
        )
        .with_state(state)
}
