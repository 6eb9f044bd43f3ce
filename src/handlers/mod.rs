// handlers/mod.rs - two security tiers
//
// Public (no auth) → Protected (JWT auth, optionally a claim policy)
pub mod public; // Tier 1: anonymous access (/register, /login, GET /provider)
pub mod protected; // Tier 2: bearer token required (POST/PUT/DELETE /provider)

use uuid::Uuid;

use crate::error::ApiError;

/// Path ids that are not UUIDs can never match a record, so they are 404s
pub(crate) fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::not_found("Provider not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_ids_are_not_found() {
        let err = parse_id("not-a-uuid").unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);

        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }
}
