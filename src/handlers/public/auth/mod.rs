// handlers/public/auth/mod.rs - token acquisition endpoints

pub mod login; // POST /login - authenticate and get JWT
pub mod register; // POST /register - create account and get JWT

pub use login::login_post;
pub use register::register_post;
