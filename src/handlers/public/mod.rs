// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition plus read-only provider access. Every input here comes
// from an anonymous caller, so payloads are validated in full before use.

pub mod auth;
pub mod provider;
