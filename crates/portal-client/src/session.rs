use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::ClientError;

/// Client-side session state: the bearer token plus its expiry, carried
/// explicitly and checked before every authenticated call rather than read
/// from ambient storage.
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ExpClaim {
    exp: i64,
}

impl Session {
    /// Builds a session from a freshly issued token, reading the expiry out
    /// of the JWT payload. The signature is not (and cannot be) verified
    /// client-side; the server remains the authority.
    pub fn from_token(token: String) -> Result<Self, ClientError> {
        let payload = token
            .split('.')
            .nth(1)
            .ok_or_else(|| ClientError::MalformedToken("not a JWT".into()))?;

        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| ClientError::MalformedToken(e.to_string()))?;

        let claim: ExpClaim = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::MalformedToken(e.to_string()))?;

        let expires_at = DateTime::from_timestamp(claim.exp, 0)
            .ok_or_else(|| ClientError::MalformedToken("exp out of range".into()))?;

        Ok(Self { token, expires_at })
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// The raw token, gated on expiry so no call ever goes out with a token
    /// the server is guaranteed to reject.
    pub(crate) fn bearer(&self) -> Result<&str, ClientError> {
        if self.is_expired() {
            return Err(ClientError::SessionExpired);
        }
        Ok(&self.token)
    }
}
