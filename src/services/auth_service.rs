use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::auth::{AccessToken, JwtError, PasswordHasher, PasswordRules, TokenService};
use crate::config::SecurityConfig;
use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, User, UserClaim};
use crate::database::repository::UserStore;
use crate::types::{FieldErrors, LoginRequest, RegisterRequest, Validate};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Credentials failed validation")]
    Validation(FieldErrors),
    #[error("Email is already registered")]
    DuplicateEmail,
    #[error("Incorrect user or password")]
    InvalidCredentials,
    #[error("User temporarily locked out after too many invalid attempts")]
    LockedOut,
    #[error("User not found: {0}")]
    UserNotFound(String),
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Token(#[from] JwtError),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone)]
pub struct LockoutPolicy {
    pub enabled: bool,
    pub max_failed_attempts: u32,
    pub duration: Duration,
}

impl LockoutPolicy {
    pub fn from_config(security: &SecurityConfig) -> Self {
        Self {
            enabled: security.lockout_enabled,
            max_failed_attempts: security.max_failed_attempts.max(1),
            duration: security.lockout_duration(),
        }
    }
}

/// Registration and login on top of the credential store.
///
/// Failure messages are deliberately generic: an unknown email and a wrong
/// password both come back as `InvalidCredentials`.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    rules: PasswordRules,
    tokens: TokenService,
    lockout: LockoutPolicy,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService, security: &SecurityConfig) -> Self {
        Self {
            users,
            hasher: PasswordHasher::default(),
            rules: PasswordRules::from_config(security),
            tokens,
            lockout: LockoutPolicy::from_config(security),
        }
    }

    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AccessToken, AuthError> {
        let mut errors = request.validate().err().unwrap_or_default();
        let password = request.password.unwrap_or_default();
        if !password.is_empty() {
            let problems = self.rules.check(&password);
            if !problems.is_empty() {
                errors.insert("password".to_string(), problems.join(" "));
            }
        }
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        let email = request.email.unwrap_or_default().trim().to_string();
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.hash(password).await?;
        let user = self
            .users
            .create(NewUser {
                email,
                password_hash,
                email_confirmed: true,
            })
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict(_) => AuthError::DuplicateEmail,
                other => AuthError::Database(other),
            })?;

        tracing::info!("Registered user {}", user.id);
        self.issue_token(&user).await
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AccessToken, AuthError> {
        request.validate().map_err(AuthError::Validation)?;
        let email = request.email.unwrap_or_default();
        let password = request.password.unwrap_or_default();

        let Some(user) = self.users.find_by_email(&email).await? else {
            tracing::warn!("Login refused: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let now = Utc::now();
        if self.lockout.enabled && user.is_locked_out(now) {
            tracing::warn!("Login refused: user {} is locked out", user.id);
            return Err(AuthError::LockedOut);
        }

        if self.verify(password, user.password_hash.clone()).await? {
            if user.failed_login_count != 0 || user.lockout_end.is_some() {
                self.users.update_lockout(user.id, 0, None).await?;
            }
            tracing::info!("User {} logged in", user.id);
            return self.issue_token(&user).await;
        }

        if !self.lockout.enabled {
            tracing::warn!("Login refused: bad password for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let failures = self.users.record_failed_login(user.id).await?;
        if failures.max(0) as u32 >= self.lockout.max_failed_attempts {
            let until = now + self.lockout.duration;
            self.users.update_lockout(user.id, 0, Some(until)).await?;
            tracing::warn!("User {} locked out until {} after {} failed logins", user.id, until, failures);
            return Err(AuthError::LockedOut);
        }

        tracing::warn!("Login refused: bad password for user {} ({} failures)", user.id, failures);
        Err(AuthError::InvalidCredentials)
    }

    pub async fn grant_claim(&self, email: &str, claim: UserClaim) -> Result<(), AuthError> {
        let user = self.find_user(email).await?;
        self.users.add_claim(user.id, &claim).await?;
        tracing::info!("Granted claim {}={} to user {}", claim.claim_type, claim.claim_value, user.id);
        Ok(())
    }

    pub async fn grant_role(&self, email: &str, role: &str) -> Result<(), AuthError> {
        let user = self.find_user(email).await?;
        self.users.add_role(user.id, role).await?;
        tracing::info!("Granted role {} to user {}", role, user.id);
        Ok(())
    }

    async fn find_user(&self, email: &str) -> Result<User, AuthError> {
        self.users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(email.to_string()))
    }

    async fn issue_token(&self, user: &User) -> Result<AccessToken, AuthError> {
        let roles = self.users.roles(user.id).await?;
        let claims = self.users.claims(user.id).await?;
        Ok(self.tokens.issue(user, roles, claims)?)
    }

    // Argon2 is CPU-bound; keep it off the async workers
    async fn hash(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    async fn verify(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }
}
