// Authentication Collaborator - session state for the admin surface
//
// The aggregation layer has zero dependency on identity; gating happens in
// the callers. StaticAuth covers the single-administrator deployment model:
// one configured credential, one opaque session token.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub email: String,
    pub token: String,
    pub signed_in_at: DateTime<Utc>,
}

pub trait AuthProvider {
    fn sign_in(&mut self, email: &str, password: &str) -> Result<Session>;

    fn sign_out(&mut self);

    fn current_session(&self) -> Option<&Session>;

    /// Whether a presented token belongs to the live session.
    fn verify_token(&self, token: &str) -> bool;
}

/// Single-admin provider with a statically configured credential.
pub struct StaticAuth {
    admin_email: String,
    admin_password: String,
    session: Option<Session>,
}

impl StaticAuth {
    pub fn new(admin_email: String, admin_password: String) -> Self {
        StaticAuth {
            admin_email,
            admin_password,
            session: None,
        }
    }

    fn issue_token(email: &str, at: DateTime<Utc>) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{}{}{}", email, at.to_rfc3339(), uuid::Uuid::new_v4()));
        format!("{:x}", hasher.finalize())
    }
}

impl AuthProvider for StaticAuth {
    fn sign_in(&mut self, email: &str, password: &str) -> Result<Session> {
        if email != self.admin_email || password != self.admin_password {
            bail!("Invalid credentials");
        }
        let now = Utc::now();
        let session = Session {
            email: email.to_string(),
            token: Self::issue_token(email, now),
            signed_in_at: now,
        };
        self.session = Some(session.clone());
        Ok(session)
    }

    fn sign_out(&mut self) {
        self.session = None;
    }

    fn current_session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn verify_token(&self, token: &str) -> bool {
        matches!(&self.session, Some(s) if s.token == token && !token.is_empty())
    }
}
