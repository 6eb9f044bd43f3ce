// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Routes here sit behind `jwt_auth_middleware`, so an `AuthUser` is always
// present in the request extensions. DELETE also runs `require_claim`.

pub mod provider;
