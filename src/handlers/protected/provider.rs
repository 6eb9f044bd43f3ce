use axum::extract::{Extension, Path, State};

use crate::app::AppState;
use crate::database::models::Provider;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Payload};
use crate::types::ProviderInput;

/// POST /provider - create a provider; 201 with a Location header
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Payload(payload): Payload<ProviderInput>,
) -> ApiResult<Provider> {
    let provider = state.providers.create(payload).await?;
    tracing::debug!("Provider {} created by user {}", provider.id, user.user_id);

    let location = format!("/provider/{}", provider.id);
    Ok(ApiResponse::created(provider, location))
}

/// PUT /provider/:id - full overwrite of an existing provider
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Payload(payload): Payload<ProviderInput>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    state.providers.replace(id, payload).await?;
    tracing::debug!("Provider {} replaced by user {}", id, user.user_id);

    Ok(ApiResponse::no_content())
}

/// DELETE /provider/:id - remove a provider (claim policy enforced by the router)
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    state.providers.delete(id).await?;
    tracing::debug!("Provider {} deleted by user {}", id, user.user_id);

    Ok(ApiResponse::no_content())
}
