use axum::extract::{Path, State};

use crate::app::AppState;
use crate::database::models::Provider;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /provider - list every provider
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Provider>> {
    let providers = state.providers.list().await?;
    Ok(ApiResponse::success(providers))
}

/// GET /provider/:id - show single provider by id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Provider> {
    let id = parse_id(&id)?;
    let provider = state.providers.get(id).await?;
    Ok(ApiResponse::success(provider))
}
