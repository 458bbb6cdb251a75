use anyhow::Context;
use axum::{
    Json,
    extract::{Multipart, State},
};
use tracing::info;

use portal_db::models::UserRow;
use portal_types::api::StudentProfile;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;

/// 5 MB cap on profile photos
const MAX_PHOTO_SIZE: usize = 5 * 1024 * 1024;

/// GET /student — the caller's own profile projection.
pub async fn get_student(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<StudentProfile>> {
    let db = state.clone();
    let user = tokio::task::spawn_blocking(move || db.db.get_user_by_id(&claims.sub.to_string()))
        .await??
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(profile_from_row(user)?))
}

/// PUT /student — multipart form with `name`, `email`, and an optional
/// `photo` file part.
pub async fn update_student(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<StudentProfile>> {
    let mut name: Option<String> = None;
    let mut email: Option<String> = None;
    let mut photo: Option<(String, axum::body::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed form: {}", e)))?
    {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some("name") => {
                name = Some(field.text().await.map_err(bad_field)?);
            }
            Some("email") => {
                email = Some(field.text().await.map_err(bad_field)?);
            }
            Some("photo") => {
                let file_name = field
                    .file_name()
                    .map(str::to_owned)
                    .unwrap_or_else(|| "photo".into());
                let bytes = field.bytes().await.map_err(bad_field)?;
                if bytes.len() > MAX_PHOTO_SIZE {
                    return Err(ApiError::BadRequest("photo too large".into()));
                }
                // An empty file part means the client sent no photo
                if !bytes.is_empty() {
                    photo = Some((file_name, bytes));
                }
            }
            other => {
                return Err(ApiError::BadRequest(format!(
                    "unknown form field '{}'",
                    other.unwrap_or("")
                )));
            }
        }
    }

    let name = name
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("name is required".into()))?;
    let email = email
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("email is required".into()))?;

    // The photo is written before the store update. A crash between the two
    // leaves an orphaned file, which is only a cleanup concern.
    let photo_path = match photo {
        Some((file_name, bytes)) => {
            tokio::fs::create_dir_all(&state.upload_dir)
                .await
                .context("creating upload directory")?;

            let stored_name = format!(
                "{}-{}",
                chrono::Utc::now().timestamp_millis(),
                sanitize_file_name(&file_name)
            );
            let dest = state.upload_dir.join(&stored_name);
            tokio::fs::write(&dest, &bytes)
                .await
                .with_context(|| format!("writing photo to {}", dest.display()))?;

            info!(user = %claims.sub, file = %stored_name, "profile photo stored");
            Some(format!("uploads/{}", stored_name))
        }
        None => None,
    };

    let db = state.clone();
    let user = tokio::task::spawn_blocking(move || {
        db.db.update_user_profile(
            &claims.sub.to_string(),
            &name,
            &email,
            photo_path.as_deref(),
        )
    })
    .await??
    .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(profile_from_row(user)?))
}

fn bad_field(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::BadRequest(format!("malformed form field: {}", e))
}

fn profile_from_row(row: UserRow) -> anyhow::Result<StudentProfile> {
    Ok(StudentProfile {
        id: row
            .id
            .parse()
            .with_context(|| format!("corrupt user id '{}'", row.id))?,
        name: row.username,
        email: row.email,
        // Stored as a relative path; served back under /uploads
        photo: row.photo.map(|p| format!("/{}", p)),
    })
}

/// Keeps uploaded file names path-safe.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
