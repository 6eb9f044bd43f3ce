//! In-memory stores and state builders for router and service tests.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{ClaimPolicy, PasswordHasher, TokenService};
use crate::config::{AppConfig, SecurityConfig};
use crate::database::manager::DatabaseError;
use crate::database::models::user::normalize_email;
use crate::database::models::{NewUser, Provider, User, UserClaim};
use crate::database::repository::{ProviderStore, UserStore};
use crate::services::{AuthService, ProviderService};

/// Provider store backed by a map.
///
/// `fail_writes(true)` makes every write report zero affected rows, which is
/// what a concurrent delete looks like to the service.
#[derive(Default)]
pub struct MemoryProviderStore {
    rows: RwLock<HashMap<Uuid, Provider>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryProviderStore {
    /// Attempted insert/replace/delete calls so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn begin_write(&self) -> bool {
        self.writes.fetch_add(1, Ordering::SeqCst);
        !self.fail_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderStore for MemoryProviderStore {
    async fn list(&self) -> Result<Vec<Provider>, DatabaseError> {
        let mut providers: Vec<Provider> = self.rows.read().await.values().cloned().collect();
        providers.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(providers)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Provider>, DatabaseError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn insert(&self, provider: &Provider) -> Result<u64, DatabaseError> {
        if !self.begin_write() {
            return Ok(0);
        }
        let mut rows = self.rows.write().await;
        if rows.contains_key(&provider.id) {
            return Err(DatabaseError::Conflict(format!("duplicate id {}", provider.id)));
        }
        rows.insert(provider.id, provider.clone());
        Ok(1)
    }

    async fn replace(&self, provider: &Provider) -> Result<u64, DatabaseError> {
        if !self.begin_write() {
            return Ok(0);
        }
        match self.rows.write().await.get_mut(&provider.id) {
            Some(row) => {
                *row = provider.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<u64, DatabaseError> {
        if !self.begin_write() {
            return Ok(0);
        }
        Ok(self.rows.write().await.remove(&id).map_or(0, |_| 1))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[derive(Default)]
struct UserRecord {
    user: Option<User>,
    roles: Vec<String>,
    claims: Vec<UserClaim>,
}

/// User store keyed by normalized email
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryUserStore {
    async fn with_user<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut UserRecord) -> T,
    ) -> Result<T, DatabaseError> {
        let mut users = self.users.write().await;
        let record = users
            .values_mut()
            .find(|r| r.user.as_ref().map(|u| u.id) == Some(id))
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", id)))?;
        Ok(f(record))
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let users = self.users.read().await;
        Ok(users.get(&normalize_email(email)).and_then(|r| r.user.clone()))
    }

    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let key = user.normalized_email();
        let mut users = self.users.write().await;
        if users.contains_key(&key) {
            return Err(DatabaseError::Conflict(format!("email {} taken", key)));
        }

        let created = User {
            id: Uuid::new_v4(),
            email: user.email.trim().to_string(),
            normalized_email: key.clone(),
            password_hash: user.password_hash,
            email_confirmed: user.email_confirmed,
            failed_login_count: 0,
            lockout_end: None,
            created_at: Utc::now(),
        };
        users.insert(
            key,
            UserRecord {
                user: Some(created.clone()),
                ..UserRecord::default()
            },
        );
        Ok(created)
    }

    async fn record_failed_login(&self, id: Uuid) -> Result<i32, DatabaseError> {
        self.with_user(id, |record| {
            record.user.as_mut().map_or(0, |user| {
                user.failed_login_count += 1;
                user.failed_login_count
            })
        })
        .await
    }

    async fn update_lockout(
        &self,
        id: Uuid,
        failed_login_count: i32,
        lockout_end: Option<DateTime<Utc>>,
    ) -> Result<(), DatabaseError> {
        self.with_user(id, |record| {
            if let Some(user) = record.user.as_mut() {
                user.failed_login_count = failed_login_count;
                user.lockout_end = lockout_end;
            }
        })
        .await
    }

    async fn roles(&self, id: Uuid) -> Result<Vec<String>, DatabaseError> {
        self.with_user(id, |record| record.roles.clone()).await
    }

    async fn claims(&self, id: Uuid) -> Result<Vec<UserClaim>, DatabaseError> {
        self.with_user(id, |record| record.claims.clone()).await
    }

    async fn add_role(&self, id: Uuid, role: &str) -> Result<(), DatabaseError> {
        self.with_user(id, |record| {
            if !record.roles.iter().any(|r| r == role) {
                record.roles.push(role.to_string());
            }
        })
        .await
    }

    async fn add_claim(&self, id: Uuid, claim: &UserClaim) -> Result<(), DatabaseError> {
        self.with_user(id, |record| {
            if !record.claims.contains(claim) {
                record.claims.push(claim.clone());
            }
        })
        .await
    }
}

/// Application state wired to in-memory stores
pub struct TestContext {
    pub state: AppState,
    pub providers: Arc<MemoryProviderStore>,
    pub users: Arc<MemoryUserStore>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_security(&AppConfig::development().security)
    }

    pub fn with_security(security: &SecurityConfig) -> Self {
        let providers = Arc::new(MemoryProviderStore::default());
        let users = Arc::new(MemoryUserStore::default());
        let tokens = TokenService::new(security);

        let state = AppState {
            providers: ProviderService::new(providers.clone()),
            auth: AuthService::new(users.clone(), tokens, security)
                .with_hasher(PasswordHasher::with_cost(1024, 1)),
            delete_policy: ClaimPolicy::provider_remove(security),
        };

        Self {
            state,
            providers,
            users,
        }
    }
}
