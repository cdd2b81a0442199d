use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::dto::{LoginRequest, RegisterRequest, UpdateProfileRequest, UserResponse};
use crate::backend::RecipeBackend;
use crate::error::ApiError;
use crate::session::{SessionStore, StoredUser};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_email(email: &str) -> Result<String, ApiError> {
    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::validation("email", "is not a valid address"));
    }
    Ok(email)
}

fn require_username(username: &str) -> Result<String, ApiError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ApiError::validation("username", "is required"));
    }
    Ok(username.to_string())
}

fn check_password(password: &str) -> Result<(), ApiError> {
    if password.len() < 8 {
        return Err(ApiError::validation(
            "password",
            "must be at least 8 characters",
        ));
    }
    Ok(())
}

/// Persist the identity for later runs. A write failure downgrades to
/// a warning: the remote operation already succeeded, the user just
/// will not stay logged in across restarts.
fn persist(sessions: &SessionStore, user: UserResponse) -> StoredUser {
    let stored = StoredUser {
        id: user.id,
        username: user.username,
        email: user.email,
    };
    if let Err(error) = sessions.save(&stored) {
        warn!(%error, "failed to persist session");
    }
    stored
}

pub async fn register(
    backend: &dyn RecipeBackend,
    sessions: &SessionStore,
    username: &str,
    email: &str,
    password: &str,
) -> Result<StoredUser, ApiError> {
    let username = require_username(username)?;
    let email = normalize_email(email)?;
    check_password(password)?;

    let user = backend
        .register(&RegisterRequest {
            username,
            email,
            password: password.to_string(),
        })
        .await?;
    info!(user_id = user.id, username = %user.username, "user registered");
    Ok(persist(sessions, user))
}

pub async fn login(
    backend: &dyn RecipeBackend,
    sessions: &SessionStore,
    email: &str,
    password: &str,
) -> Result<StoredUser, ApiError> {
    let email = normalize_email(email)?;
    if password.is_empty() {
        return Err(ApiError::validation("password", "is required"));
    }

    let user = backend
        .login(&LoginRequest {
            email,
            password: password.to_string(),
        })
        .await?;
    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok(persist(sessions, user))
}

pub fn logout(sessions: &SessionStore) -> anyhow::Result<()> {
    sessions.clear()
}

/// Self-service profile update for the authenticated user. The
/// password is only changed when one is supplied.
pub async fn update_profile(
    backend: &dyn RecipeBackend,
    sessions: &SessionStore,
    current: &StoredUser,
    username: &str,
    email: &str,
    password: Option<&str>,
) -> Result<StoredUser, ApiError> {
    let username = require_username(username)?;
    let email = normalize_email(email)?;
    if let Some(password) = password {
        check_password(password)?;
    }

    let user = backend
        .update_user(
            current.id,
            &UpdateProfileRequest {
                username,
                email,
                password: password.map(str::to_string),
            },
        )
        .await?;
    info!(user_id = user.id, "profile updated");
    Ok(persist(sessions, user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::FakeBackend;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn temp_sessions() -> SessionStore {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        SessionStore::new(std::env::temp_dir().join(format!(
            "smartrecipes-users-test-{}-{}.json",
            std::process::id(),
            n
        )))
    }

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("alice@example.com"));
        assert!(!is_valid_email("alice@example"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@example.com"));
    }

    #[tokio::test]
    async fn register_normalizes_email_and_persists_the_session() {
        let backend = FakeBackend::new();
        let sessions = temp_sessions();

        let stored = register(&backend, &sessions, "alice", "  Alice@Example.COM ", "hunter2hunter2")
            .await
            .unwrap();
        assert_eq!(stored.email, "alice@example.com");
        assert_eq!(sessions.load(), Some(stored));
        sessions.clear().unwrap();
    }

    #[tokio::test]
    async fn short_password_is_rejected_before_the_request() {
        let backend = FakeBackend::new();
        let sessions = temp_sessions();

        let err = register(&backend, &sessions, "alice", "alice@example.com", "short").await;
        assert!(matches!(
            err,
            Err(ApiError::Validation { field: "password", .. })
        ));
        assert_eq!(sessions.load(), None);
    }

    #[tokio::test]
    async fn login_roundtrip_and_bad_credentials() {
        let backend = FakeBackend::new();
        let sessions = temp_sessions();
        backend.seed_user("alice", "alice@example.com", "hunter2hunter2");

        let stored = login(&backend, &sessions, "alice@example.com", "hunter2hunter2")
            .await
            .unwrap();
        assert_eq!(stored.username, "alice");
        assert_eq!(sessions.load(), Some(stored));

        let err = login(&backend, &sessions, "alice@example.com", "wrong").await;
        assert!(matches!(err, Err(ApiError::FetchFailed { .. })));
        sessions.clear().unwrap();
    }

    #[tokio::test]
    async fn logout_clears_the_stored_identity() {
        let backend = FakeBackend::new();
        let sessions = temp_sessions();
        backend.seed_user("alice", "alice@example.com", "hunter2hunter2");
        login(&backend, &sessions, "alice@example.com", "hunter2hunter2")
            .await
            .unwrap();

        logout(&sessions).unwrap();
        assert_eq!(sessions.load(), None);
    }

    #[tokio::test]
    async fn profile_update_keeps_the_id_and_refreshes_the_session() {
        let backend = FakeBackend::new();
        let sessions = temp_sessions();
        let user = backend.seed_user("alice", "alice@example.com", "hunter2hunter2");
        let current = StoredUser {
            id: user.id,
            username: user.username,
            email: user.email,
        };

        let updated = update_profile(
            &backend,
            &sessions,
            &current,
            "alice2",
            "alice2@example.com",
            None,
        )
        .await
        .unwrap();
        assert_eq!(updated.id, current.id);
        assert_eq!(updated.username, "alice2");
        assert_eq!(sessions.load(), Some(updated));
        sessions.clear().unwrap();
    }
}
