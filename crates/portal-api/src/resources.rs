use std::str::FromStr;

use anyhow::{Context, anyhow};
use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;
use uuid::Uuid;

use portal_db::Database;
use portal_db::models::{
    BookRow, CommonQuestionRow, InterviewTipRow, MockInterviewRow, StudySessionRow,
};
use portal_types::api::{
    CreateBookRequest, CreateInterviewTipRequest, CreateMockInterviewRequest,
    CreateStudySessionRequest,
};
use portal_types::models::{
    Book, CommonQuestion, Difficulty, InterviewTip, MockInterview, StudySession,
};

use crate::auth::AppState;
use crate::error::{ApiError, ApiJson, ApiResult};
use crate::middleware::AuthUser;

/// Caller identity resolved against the credential store at write time, used
/// to stamp owner id and the denormalized display name onto new rows.
pub struct Owner {
    pub id: Uuid,
    pub name: String,
}

/// One collection of the portal, served through the generic handlers below
/// instead of a copy-pasted route set per collection.
pub trait Resource: Serialize + Send + Sized + 'static {
    /// Collection name for log lines.
    const NAME: &'static str;
    /// Owner-scoped collections gate `list` behind auth and filter rows by
    /// the caller's id; shared collections return everything to anyone.
    const OWNER_SCOPED: bool;

    /// `owner` is Some for owner-scoped collections, None for shared ones.
    fn list(db: &Database, owner: Option<Uuid>) -> anyhow::Result<Vec<Self>>;
}

/// Collections that accept authenticated creates. Read-only seed data
/// (common questions) implements only [`Resource`].
pub trait Insertable: Resource {
    type Create: DeserializeOwned + Send + 'static;

    /// Server-side required-field validation, before any DB work.
    fn validate(req: &Self::Create) -> Result<(), String>;

    fn insert(db: &Database, owner: &Owner, req: Self::Create) -> anyhow::Result<Self>;
}

// -- Generic handlers --

pub async fn list_owned<R: Resource>(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<Vec<R>>> {
    debug_assert!(R::OWNER_SCOPED);

    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || R::list(&db.db, Some(claims.sub))).await??;
    Ok(Json(rows))
}

pub async fn list_all<R: Resource>(State(state): State<AppState>) -> ApiResult<Json<Vec<R>>> {
    debug_assert!(!R::OWNER_SCOPED);

    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || R::list(&db.db, None)).await??;
    Ok(Json(rows))
}

pub async fn create<R: Insertable>(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<R::Create>,
) -> ApiResult<(StatusCode, Json<R>)> {
    R::validate(&req).map_err(ApiError::BadRequest)?;

    let db = state.clone();
    let created = tokio::task::spawn_blocking(move || -> Result<R, ApiError> {
        // Resolve the caller so new rows carry the current display name.
        let user = db
            .db
            .get_user_by_id(&claims.sub.to_string())?
            .ok_or(ApiError::NotFound("User not found"))?;
        let owner = Owner {
            id: claims.sub,
            name: user.username,
        };
        Ok(R::insert(&db.db, &owner, req)?)
    })
    .await??;

    info!(collection = R::NAME, "resource created");
    Ok((StatusCode::CREATED, Json(created)))
}

// -- Collection implementations --

impl Resource for StudySession {
    const NAME: &'static str = "study_sessions";
    const OWNER_SCOPED: bool = true;

    fn list(db: &Database, owner: Option<Uuid>) -> anyhow::Result<Vec<Self>> {
        let owner = owner.ok_or_else(|| anyhow!("study sessions are owner-scoped"))?;
        db.list_study_sessions(&owner.to_string())?
            .into_iter()
            .map(session_from_row)
            .collect()
    }
}

impl Insertable for StudySession {
    type Create = CreateStudySessionRequest;

    fn validate(req: &Self::Create) -> Result<(), String> {
        require_present(&req.subject, "subject")?;
        require_present(&req.topic, "topic")?;
        if req.duration == 0 {
            return Err("duration must be positive".into());
        }
        Ok(())
    }

    fn insert(db: &Database, owner: &Owner, req: Self::Create) -> anyhow::Result<Self> {
        let session = StudySession {
            id: Uuid::new_v4(),
            user_id: owner.id,
            subject: req.subject,
            topic: req.topic,
            duration: req.duration,
            difficulty: req.difficulty,
            completed: req.completed,
            date: req.date,
        };
        db.insert_study_session(&session_to_row(&session))?;
        Ok(session)
    }
}

impl Resource for Book {
    const NAME: &'static str = "books";
    const OWNER_SCOPED: bool = false;

    fn list(db: &Database, _owner: Option<Uuid>) -> anyhow::Result<Vec<Self>> {
        db.list_books()?.into_iter().map(book_from_row).collect()
    }
}

impl Insertable for Book {
    type Create = CreateBookRequest;

    fn validate(req: &Self::Create) -> Result<(), String> {
        require_present(&req.title, "title")?;
        require_present(&req.author, "author")?;
        require_present(&req.condition, "condition")?;
        require_present(&req.contact, "contact")?;
        if !req.price.is_finite() || req.price < 0.0 {
            return Err("price must be a non-negative number".into());
        }
        Ok(())
    }

    fn insert(db: &Database, owner: &Owner, req: Self::Create) -> anyhow::Result<Self> {
        let book = Book {
            id: Uuid::new_v4(),
            title: req.title,
            author: req.author,
            price: req.price,
            condition: req.condition,
            contact: req.contact,
            seller_id: owner.id,
            seller_name: owner.name.clone(),
            created_at: Utc::now(),
        };
        db.insert_book(&BookRow {
            id: book.id.to_string(),
            title: book.title.clone(),
            author: book.author.clone(),
            price: book.price,
            condition: book.condition.clone(),
            contact: book.contact.clone(),
            seller_id: book.seller_id.to_string(),
            seller_name: book.seller_name.clone(),
            created_at: book.created_at.to_rfc3339(),
        })?;
        Ok(book)
    }
}

impl Resource for InterviewTip {
    const NAME: &'static str = "interview_tips";
    const OWNER_SCOPED: bool = false;

    fn list(db: &Database, _owner: Option<Uuid>) -> anyhow::Result<Vec<Self>> {
        db.list_interview_tips()?
            .into_iter()
            .map(tip_from_row)
            .collect()
    }
}

impl Insertable for InterviewTip {
    type Create = CreateInterviewTipRequest;

    fn validate(req: &Self::Create) -> Result<(), String> {
        require_present(&req.tip, "tip")
    }

    fn insert(db: &Database, owner: &Owner, req: Self::Create) -> anyhow::Result<Self> {
        let tip = InterviewTip {
            id: Uuid::new_v4(),
            tip: req.tip,
            user_id: owner.id,
            user_name: owner.name.clone(),
            created_at: Utc::now(),
        };
        db.insert_interview_tip(&InterviewTipRow {
            id: tip.id.to_string(),
            tip: tip.tip.clone(),
            user_id: tip.user_id.to_string(),
            user_name: tip.user_name.clone(),
            created_at: tip.created_at.to_rfc3339(),
        })?;
        Ok(tip)
    }
}

impl Resource for CommonQuestion {
    const NAME: &'static str = "common_questions";
    const OWNER_SCOPED: bool = false;

    fn list(db: &Database, _owner: Option<Uuid>) -> anyhow::Result<Vec<Self>> {
        db.list_common_questions()?
            .into_iter()
            .map(question_from_row)
            .collect()
    }
}

impl Resource for MockInterview {
    const NAME: &'static str = "mock_interviews";
    const OWNER_SCOPED: bool = true;

    fn list(db: &Database, owner: Option<Uuid>) -> anyhow::Result<Vec<Self>> {
        let owner = owner.ok_or_else(|| anyhow!("mock interviews are owner-scoped"))?;
        db.list_mock_interviews(&owner.to_string())?
            .into_iter()
            .map(interview_from_row)
            .collect()
    }
}

impl Insertable for MockInterview {
    type Create = CreateMockInterviewRequest;

    fn validate(req: &Self::Create) -> Result<(), String> {
        require_present(&req.mentor, "mentor")?;
        require_present(&req.time, "time")
    }

    fn insert(db: &Database, owner: &Owner, req: Self::Create) -> anyhow::Result<Self> {
        let interview = MockInterview {
            id: Uuid::new_v4(),
            user_id: owner.id,
            user_name: owner.name.clone(),
            mentor: req.mentor,
            date: req.date,
            time: req.time,
            created_at: Utc::now(),
        };
        db.insert_mock_interview(&MockInterviewRow {
            id: interview.id.to_string(),
            user_id: interview.user_id.to_string(),
            user_name: interview.user_name.clone(),
            mentor: interview.mentor.clone(),
            date: interview.date.to_string(),
            time: interview.time.clone(),
            created_at: interview.created_at.to_rfc3339(),
        })?;
        Ok(interview)
    }
}

// -- Row conversions --

pub(crate) fn session_to_row(session: &StudySession) -> StudySessionRow {
    StudySessionRow {
        id: session.id.to_string(),
        user_id: session.user_id.to_string(),
        subject: session.subject.clone(),
        topic: session.topic.clone(),
        duration: session.duration,
        difficulty: session.difficulty.as_str().to_string(),
        completed: session.completed,
        date: session.date.to_string(),
    }
}

fn session_from_row(row: StudySessionRow) -> anyhow::Result<StudySession> {
    Ok(StudySession {
        id: parse_uuid(&row.id)?,
        user_id: parse_uuid(&row.user_id)?,
        subject: row.subject,
        topic: row.topic,
        duration: row.duration,
        difficulty: Difficulty::from_str(&row.difficulty).map_err(anyhow::Error::msg)?,
        completed: row.completed,
        date: parse_date(&row.date)?,
    })
}

fn book_from_row(row: BookRow) -> anyhow::Result<Book> {
    Ok(Book {
        id: parse_uuid(&row.id)?,
        title: row.title,
        author: row.author,
        price: row.price,
        condition: row.condition,
        contact: row.contact,
        seller_id: parse_uuid(&row.seller_id)?,
        seller_name: row.seller_name,
        created_at: parse_timestamp(&row.created_at)?,
    })
}

fn tip_from_row(row: InterviewTipRow) -> anyhow::Result<InterviewTip> {
    Ok(InterviewTip {
        id: parse_uuid(&row.id)?,
        tip: row.tip,
        user_id: parse_uuid(&row.user_id)?,
        user_name: row.user_name,
        created_at: parse_timestamp(&row.created_at)?,
    })
}

fn question_from_row(row: CommonQuestionRow) -> anyhow::Result<CommonQuestion> {
    Ok(CommonQuestion {
        id: parse_uuid(&row.id)?,
        question: row.question,
        created_at: parse_timestamp(&row.created_at)?,
    })
}

fn interview_from_row(row: MockInterviewRow) -> anyhow::Result<MockInterview> {
    Ok(MockInterview {
        id: parse_uuid(&row.id)?,
        user_id: parse_uuid(&row.user_id)?,
        user_name: row.user_name,
        mentor: row.mentor,
        date: parse_date(&row.date)?,
        time: row.time,
        created_at: parse_timestamp(&row.created_at)?,
    })
}

fn parse_uuid(s: &str) -> anyhow::Result<Uuid> {
    s.parse().with_context(|| format!("corrupt uuid '{}'", s))
}

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    s.parse().with_context(|| format!("corrupt date '{}'", s))
}

fn parse_timestamp(s: &str) -> anyhow::Result<DateTime<Utc>> {
    s.parse::<DateTime<Utc>>()
        .with_context(|| format!("corrupt timestamp '{}'", s))
}

fn require_present(field: &str, name: &'static str) -> Result<(), String> {
    if field.trim().is_empty() {
        Err(format!("{} is required", name))
    } else {
        Ok(())
    }
}
