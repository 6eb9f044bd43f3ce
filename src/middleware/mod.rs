pub mod auth;
pub mod payload;
pub mod response;

pub use auth::{jwt_auth_middleware, require_claim, AuthUser};
pub use payload::Payload;
pub use response::{ApiResponse, ApiResult};
