use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::user::normalize_email;
use crate::database::models::{NewUser, Provider, User, UserClaim};

/// Persistence for the provider collection.
///
/// Write operations return the number of affected rows; callers decide what
/// a zero means for them.
#[async_trait]
pub trait ProviderStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Provider>, DatabaseError>;
    async fn find(&self, id: Uuid) -> Result<Option<Provider>, DatabaseError>;
    async fn insert(&self, provider: &Provider) -> Result<u64, DatabaseError>;
    async fn replace(&self, provider: &Provider) -> Result<u64, DatabaseError>;
    async fn delete(&self, id: Uuid) -> Result<u64, DatabaseError>;
    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Credential, role and claim storage behind the auth service
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    /// Fails with `DatabaseError::Conflict` when the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError>;
    /// Increments the failure counter in one step and returns the new value
    async fn record_failed_login(&self, id: Uuid) -> Result<i32, DatabaseError>;
    async fn update_lockout(
        &self,
        id: Uuid,
        failed_login_count: i32,
        lockout_end: Option<DateTime<Utc>>,
    ) -> Result<(), DatabaseError>;
    async fn roles(&self, id: Uuid) -> Result<Vec<String>, DatabaseError>;
    async fn claims(&self, id: Uuid) -> Result<Vec<UserClaim>, DatabaseError>;
    async fn add_role(&self, id: Uuid, role: &str) -> Result<(), DatabaseError>;
    async fn add_claim(&self, id: Uuid, claim: &UserClaim) -> Result<(), DatabaseError>;
}

pub struct PgProviderStore {
    pool: PgPool,
}

impl PgProviderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProviderStore for PgProviderStore {
    async fn list(&self) -> Result<Vec<Provider>, DatabaseError> {
        let providers = sqlx::query_as::<_, Provider>(
            "SELECT id, name, document FROM providers ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(providers)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Provider>, DatabaseError> {
        let provider = sqlx::query_as::<_, Provider>(
            "SELECT id, name, document FROM providers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(provider)
    }

    async fn insert(&self, provider: &Provider) -> Result<u64, DatabaseError> {
        let result = sqlx::query("INSERT INTO providers (id, name, document) VALUES ($1, $2, $3)")
            .bind(provider.id)
            .bind(&provider.name)
            .bind(&provider.document)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn replace(&self, provider: &Provider) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "UPDATE providers SET name = $2, document = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(provider.id)
        .bind(&provider.name)
        .bind(&provider.document)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: Uuid) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM providers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, email, normalized_email, password_hash, email_confirmed, \
                            failed_login_count, lockout_end, created_at";

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE normalized_email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (id, email, normalized_email, password_hash, email_confirmed)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            USER_COLUMNS
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(user.email.trim())
            .bind(user.normalized_email())
            .bind(&user.password_hash)
            .bind(user.email_confirmed)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn record_failed_login(&self, id: Uuid) -> Result<i32, DatabaseError> {
        let failures = sqlx::query_scalar::<_, i32>(
            "UPDATE users SET failed_login_count = failed_login_count + 1
             WHERE id = $1
             RETURNING failed_login_count",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(failures)
    }

    async fn update_lockout(
        &self,
        id: Uuid,
        failed_login_count: i32,
        lockout_end: Option<DateTime<Utc>>,
    ) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE users SET failed_login_count = $2, lockout_end = $3 WHERE id = $1")
            .bind(id)
            .bind(failed_login_count)
            .bind(lockout_end)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn roles(&self, id: Uuid) -> Result<Vec<String>, DatabaseError> {
        let roles = sqlx::query_scalar::<_, String>(
            "SELECT role FROM user_roles WHERE user_id = $1 ORDER BY role",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    async fn claims(&self, id: Uuid) -> Result<Vec<UserClaim>, DatabaseError> {
        let claims = sqlx::query_as::<_, UserClaim>(
            "SELECT claim_type, claim_value FROM user_claims WHERE user_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(claims)
    }

    async fn add_role(&self, id: Uuid, role: &str) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(id)
            .bind(role)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn add_claim(&self, id: Uuid, claim: &UserClaim) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO user_claims (user_id, claim_type, claim_value) VALUES ($1, $2, $3)
             ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(&claim.claim_type)
        .bind(&claim.claim_value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
