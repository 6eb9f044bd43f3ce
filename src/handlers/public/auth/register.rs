// handlers/public/auth/register.rs - POST /register handler

use axum::extract::State;

use crate::app::AppState;
use crate::auth::AccessToken;
use crate::middleware::{ApiResponse, ApiResult, Payload};
use crate::types::RegisterRequest;

/// POST /register - Register new user account
///
/// Expected Input:
/// ```json
/// {
///   "email": "user@example.com",
///   "password": "Secret1!",
///   "confirm_password": "Secret1!"   // Optional: checked when present
/// }
/// ```
///
/// The account is created with a confirmed email and the response carries
/// a token right away, same shape as /login.
pub async fn register_post(
    State(state): State<AppState>,
    Payload(payload): Payload<RegisterRequest>,
) -> ApiResult<AccessToken> {
    let token = state.auth.register(payload).await?;
    Ok(ApiResponse::success(token))
}
