pub mod auth_service;
pub mod provider_service;

pub use auth_service::{AuthError, AuthService, LockoutPolicy};
pub use provider_service::{ProviderError, ProviderService};
