// handlers/public/auth/login.rs - POST /login handler

use axum::extract::State;

use crate::app::AppState;
use crate::auth::AccessToken;
use crate::middleware::{ApiResponse, ApiResult, Payload};
use crate::types::LoginRequest;

/// POST /login - Authenticate user and receive JWT token
///
/// Expected Input:
/// ```json
/// { "email": "user@example.com", "password": "Secret1!" }
/// ```
///
/// Unknown email, wrong password and an active lockout all answer 400 with
/// a message that does not say which one happened beyond "locked out".
pub async fn login_post(
    State(state): State<AppState>,
    Payload(payload): Payload<LoginRequest>,
) -> ApiResult<AccessToken> {
    let token = state.auth.login(payload).await?;
    Ok(ApiResponse::success(token))
}
