//! Typed client for the student-portal REST API.
//!
//! Authenticated calls take an explicit [`Session`] rather than reading a
//! token from ambient storage; the session's expiry is checked before each
//! request.

mod session;

pub use session::Session;

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use portal_types::api::{
    CreateBookRequest, CreateInterviewTipRequest, CreateMockInterviewRequest,
    CreateStudySessionRequest, ErrorBody, LoginRequest, LoginResponse, SignupRequest,
    SignupResponse, StudentProfile, UpdateStudySessionRequest,
};
use portal_types::models::{Book, CommonQuestion, InterviewTip, MockInterview, StudySession};

#[derive(Debug, Error)]
pub enum ClientError {
    /// The session's token has expired; the caller must log in again.
    #[error("session expired, log in again")]
    SessionExpired,

    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The server answered with an error status and a `{"error": ...}` body.
    #[error("{status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub struct PortalClient {
    http: reqwest::Client,
    base_url: String,
}

impl PortalClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    // -- Auth --

    pub async fn signup(&self, req: &SignupRequest) -> Result<SignupResponse, ClientError> {
        self.post_json("/signup", None, req).await
    }

    /// Logs in and converts the issued token into an explicit [`Session`].
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let resp: LoginResponse = self
            .post_json(
                "/login",
                None,
                &LoginRequest {
                    email: email.into(),
                    password: password.into(),
                },
            )
            .await?;
        Session::from_token(resp.token)
    }

    // -- Profile --

    pub async fn profile(&self, session: &Session) -> Result<StudentProfile, ClientError> {
        self.get_json("/student", Some(session)).await
    }

    /// Updates name/email, optionally attaching a photo as a multipart file
    /// part.
    pub async fn update_profile(
        &self,
        session: &Session,
        name: &str,
        email: &str,
        photo: Option<(String, Vec<u8>)>,
    ) -> Result<StudentProfile, ClientError> {
        let token = session.bearer()?;

        let mut form = reqwest::multipart::Form::new()
            .text("name", name.to_string())
            .text("email", email.to_string());
        if let Some((file_name, bytes)) = photo {
            form = form.part(
                "photo",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            );
        }

        let resp = self
            .http
            .put(format!("{}/student", self.base_url))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        Self::decode(resp).await
    }

    // -- Study sessions --

    pub async fn study_sessions(&self, session: &Session) -> Result<Vec<StudySession>, ClientError> {
        self.get_json("/study-sessions", Some(session)).await
    }

    pub async fn create_study_session(
        &self,
        session: &Session,
        req: &CreateStudySessionRequest,
    ) -> Result<StudySession, ClientError> {
        self.post_json("/study-sessions", Some(session), req).await
    }

    pub async fn update_study_session(
        &self,
        session: &Session,
        id: Uuid,
        req: &UpdateStudySessionRequest,
    ) -> Result<StudySession, ClientError> {
        let token = session.bearer()?;
        let resp = self
            .http
            .put(format!("{}/study-sessions/{}", self.base_url, id))
            .bearer_auth(token)
            .json(req)
            .send()
            .await?;
        Self::decode(resp).await
    }

    // -- Books --

    pub async fn books(&self) -> Result<Vec<Book>, ClientError> {
        self.get_json("/books", None).await
    }

    pub async fn create_book(
        &self,
        session: &Session,
        req: &CreateBookRequest,
    ) -> Result<Book, ClientError> {
        self.post_json("/books", Some(session), req).await
    }

    // -- Interview prep --

    pub async fn interview_tips(&self) -> Result<Vec<InterviewTip>, ClientError> {
        self.get_json("/interview-tips", None).await
    }

    pub async fn create_interview_tip(
        &self,
        session: &Session,
        req: &CreateInterviewTipRequest,
    ) -> Result<InterviewTip, ClientError> {
        self.post_json("/interview-tips", Some(session), req).await
    }

    pub async fn common_questions(&self) -> Result<Vec<CommonQuestion>, ClientError> {
        self.get_json("/common-questions", None).await
    }

    pub async fn mock_interviews(&self, session: &Session) -> Result<Vec<MockInterview>, ClientError> {
        self.get_json("/mock-interviews", Some(session)).await
    }

    pub async fn create_mock_interview(
        &self,
        session: &Session,
        req: &CreateMockInterviewRequest,
    ) -> Result<MockInterview, ClientError> {
        self.post_json("/mock-interviews", Some(session), req).await
    }

    // -- Plumbing --

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        session: Option<&Session>,
    ) -> Result<T, ClientError> {
        let mut req = self.http.get(format!("{}{}", self.base_url, path));
        if let Some(session) = session {
            req = req.bearer_auth(session.bearer()?);
        }
        Self::decode(req.send().await?).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        session: Option<&Session>,
        body: &B,
    ) -> Result<T, ClientError> {
        let mut req = self.http.post(format!("{}{}", self.base_url, path)).json(body);
        if let Some(session) = session {
            req = req.bearer_auth(session.bearer()?);
        }
        Self::decode(req.send().await?).await
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }

        let message = match resp.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };
        Err(ClientError::Api { status, message })
    }
}
