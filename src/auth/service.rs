use crate::auth::password::PasswordHasher;
use crate::auth::session::SessionManager;
use crate::db::models::{Session, User};
use crate::db::UserStore;
use crate::error::{AppError, AuthError, SignupError};
use tracing::info;

/// Orchestrates login, signup, logout, and auth checks. Holds no state of
/// its own; everything persistent lives in the injected stores.
#[derive(Clone)]
pub struct AuthService {
    users: UserStore,
    sessions: SessionManager,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(users: UserStore, sessions: SessionManager, hasher: PasswordHasher) -> Self {
        Self {
            users,
            sessions,
            hasher,
        }
    }

    /// Verifies credentials and opens a session. The error is the same
    /// whether the username is unknown or the password is wrong, so the
    /// response does not reveal which usernames exist.
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, Session), AppError> {
        let user = match self.users.find_by_username(username).await? {
            Some(user) => user,
            None => return Err(AuthError::InvalidCredentials.into()),
        };

        if !self.hasher.verify(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials.into());
        }

        let session = self.sessions.create(user.id).await?;
        info!("user {} logged in", user.id);
        Ok((user, session))
    }

    /// Creates an account and logs it in. The existence pre-checks give the
    /// caller a precise duplicate message; the insert itself still relies
    /// on the unique constraints, so a concurrent signup racing past the
    /// pre-check is caught there.
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, Session), AppError> {
        if self.users.username_exists(username).await? {
            return Err(SignupError::DuplicateUsername.into());
        }
        if self.users.email_exists(email).await? {
            return Err(SignupError::DuplicateEmail.into());
        }

        let password_hash = self.hasher.hash(password)?;
        let user = self.users.create(username, email, &password_hash).await?;
        let session = self.sessions.create(user.id).await?;
        info!("created account for user {}", user.id);
        Ok((user, session))
    }

    /// Idempotent: logging out without a session, or twice, succeeds.
    pub async fn logout(&self, token: Option<&str>) -> Result<(), AppError> {
        if let Some(token) = token {
            self.sessions.destroy(token).await?;
        }
        Ok(())
    }

    /// Resolves a session token to its user. `Ok(None)` for a missing,
    /// unknown, or expired token. A session pointing at a deleted user is
    /// destroyed and treated as absent.
    pub async fn check_auth(&self, token: Option<&str>) -> Result<Option<User>, AppError> {
        let token = match token {
            Some(token) => token,
            None => return Ok(None),
        };

        let user_id = match self.sessions.validate(token).await? {
            Some(user_id) => user_id,
            None => return Ok(None),
        };

        match self.users.find_by_id(user_id).await? {
            Some(user) => Ok(Some(user)),
            None => {
                self.sessions.destroy(token).await?;
                Ok(None)
            }
        }
    }

    pub async fn sweep_expired_sessions(&self) -> Result<u64, AppError> {
        self.sessions.sweep_expired().await
    }
}
