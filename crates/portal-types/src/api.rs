use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Difficulty;

// -- JWT Claims --

/// JWT claims shared between portal-api (REST middleware) and portal-client
/// (expiry checking). Canonical definition lives here in portal-types to
/// eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignupResponse {
    pub message: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

// -- Profile --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Relative path under /uploads, or null when no photo was ever set.
    pub photo: Option<String>,
}

// -- Resource create payloads --

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CreateStudySessionRequest {
    pub subject: String,
    pub topic: String,
    pub duration: u32,
    pub difficulty: Difficulty,
    pub completed: bool,
    pub date: NaiveDate,
}

/// Full-replacement payload for PUT /study-sessions/:id. Same shape as
/// create; the row keeps its id and owner.
pub type UpdateStudySessionRequest = CreateStudySessionRequest;

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub price: f64,
    pub condition: String,
    pub contact: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CreateInterviewTipRequest {
    pub tip: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMockInterviewRequest {
    pub mentor: String,
    pub date: NaiveDate,
    pub time: String,
}

// -- Errors --

/// Every error response carries this body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
