use crate::config::SecurityConfig;
use crate::middleware::AuthUser;

/// Authorization rule requiring one named claim on the bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimPolicy {
    pub name: &'static str,
    pub claim_type: String,
    pub claim_value: String,
}

impl ClaimPolicy {
    pub fn new(name: &'static str, claim_type: impl Into<String>, claim_value: impl Into<String>) -> Self {
        Self {
            name,
            claim_type: claim_type.into(),
            claim_value: claim_value.into(),
        }
    }

    /// Guards DELETE /provider/:id
    pub fn provider_remove(security: &SecurityConfig) -> Self {
        Self::new(
            "provider-remove",
            security.delete_claim_type.clone(),
            security.delete_claim_value.clone(),
        )
    }

    pub fn is_satisfied_by(&self, user: &AuthUser) -> bool {
        user.has_claim(&self.claim_type, &self.claim_value)
    }
}
