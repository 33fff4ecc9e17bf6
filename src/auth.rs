//! Registration, login and the logged-in session
//!
//! A `Session` is either logged out or logged in as one user. Logging in
//! creates a `MatchEngine` scoped to that user; logging out drops it along
//! with any match in progress.

use log::{info, warn};
use sha2::{Digest, Sha256};
use std::rc::Rc;
use thiserror::Error;

use crate::consts::MIN_PASSWORD_LEN;
use crate::engine::{MatchContext, MatchEngine, PlayerLabels};
use crate::history::HistoryReporter;
use crate::persistence::{CredentialStore, StoreError};
use crate::sim::{MatchPhase, MatchRules};

/// Input rejected before touching storage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all fields")]
    EmptyField,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("User '{0}' already exists")]
    Conflict(String),
    #[error("Wrong username or password")]
    InvalidCredentials,
    /// Not recoverable; the caller should end the session
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl AuthError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, AuthError::Storage(_))
    }
}

/// SHA-256 of the UTF-8 password, lowercase hex
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

enum SessionState {
    LoggedOut,
    LoggedIn {
        username: String,
        engine: MatchEngine,
    },
}

pub struct Session {
    store: Rc<CredentialStore>,
    rules: MatchRules,
    labels: PlayerLabels,
    state: SessionState,
}

impl Session {
    pub fn new(store: Rc<CredentialStore>, rules: MatchRules, labels: PlayerLabels) -> Self {
        Self {
            store,
            rules,
            labels,
            state: SessionState::LoggedOut,
        }
    }

    pub fn store(&self) -> &Rc<CredentialStore> {
        &self.store
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.state, SessionState::LoggedIn { .. })
    }

    pub fn username(&self) -> Option<&str> {
        match &self.state {
            SessionState::LoggedIn { username, .. } => Some(username),
            SessionState::LoggedOut => None,
        }
    }

    /// The logged-in user's engine
    pub fn engine_mut(&mut self) -> Option<&mut MatchEngine> {
        match &mut self.state {
            SessionState::LoggedIn { engine, .. } => Some(engine),
            SessionState::LoggedOut => None,
        }
    }

    /// History for the logged-in user
    pub fn history(&self) -> Option<HistoryReporter> {
        self.username().map(|username| {
            HistoryReporter::new(Rc::clone(&self.store), username, &self.labels.left)
        })
    }

    /// Create an account. Leaves the session logged out either way.
    pub fn register(&self, username: &str, password: &str, confirm: &str) -> Result<(), AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() || confirm.is_empty() {
            return Err(ValidationError::EmptyField.into());
        }
        if password != confirm {
            return Err(ValidationError::PasswordMismatch.into());
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            }
            .into());
        }

        if self.store.user_exists(username)? {
            return Err(AuthError::Conflict(username.to_string()));
        }
        // Lost a race with another process between the check and the insert
        if !self.store.create_user(username, &hash_password(password))? {
            return Err(AuthError::Conflict(username.to_string()));
        }

        info!("Registered {}", username);
        Ok(())
    }

    /// Log in, replacing any previous engine with one scoped to this user
    pub fn login(&mut self, username: &str, password: &str) -> Result<(), AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ValidationError::EmptyField.into());
        }
        if !self.store.verify_user(username, &hash_password(password))? {
            warn!("Failed login for {}", username);
            return Err(AuthError::InvalidCredentials);
        }

        if let Some(previous) = self.username() {
            info!("{} replaced by a new login", previous);
        }

        let context = MatchContext {
            username: username.to_string(),
            store: Rc::clone(&self.store),
        };
        let engine = MatchEngine::new(context, self.rules, self.labels.clone());
        self.state = SessionState::LoggedIn {
            username: username.to_string(),
            engine,
        };
        info!("{} logged in", username);
        Ok(())
    }

    /// Returns true if someone was logged in
    pub fn logout(&mut self) -> bool {
        match std::mem::replace(&mut self.state, SessionState::LoggedOut) {
            SessionState::LoggedIn { username, engine } => {
                if engine.phase() != MatchPhase::Idle {
                    info!("Discarding match in progress for {}", username);
                }
                info!("{} logged out", username);
                true
            }
            SessionState::LoggedOut => false,
        }
    }
}
