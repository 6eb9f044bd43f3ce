//! Password hashing (Argon2id) and the shape rules a new password must meet.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::config::SecurityConfig;

#[derive(Debug, Clone)]
pub struct PasswordHasher {
    memory_cost: u32,
    time_cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        // OWASP recommended settings for Argon2id
        Self {
            memory_cost: 19 * 1024,
            time_cost: 2,
        }
    }
}

impl PasswordHasher {
    pub fn with_cost(memory_cost: u32, time_cost: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
        }
    }

    /// Returns the PHC-formatted hash string
    pub fn hash(&self, password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let params = Params::new(self.memory_cost, self.time_cost, 1, None)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        Ok(argon2.hash_password(password.as_bytes(), &salt)?.to_string())
    }

    /// False on mismatch and on a stored hash that cannot be parsed
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            tracing::warn!("Stored password hash is not a valid PHC string");
            return false;
        };

        // Parameters come from the PHC string, so default() verifies any cost
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[derive(Debug, Clone)]
pub struct PasswordRules {
    pub min_length: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,
}

impl Default for PasswordRules {
    fn default() -> Self {
        Self {
            min_length: 6,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
        }
    }
}

impl PasswordRules {
    pub fn from_config(security: &SecurityConfig) -> Self {
        Self {
            min_length: security.password_min_length,
            ..Self::default()
        }
    }

    /// Every rule the password breaks, in a fixed order
    pub fn check(&self, password: &str) -> Vec<String> {
        let mut problems = Vec::new();

        if password.chars().count() < self.min_length {
            problems.push(format!("Passwords must be at least {} characters", self.min_length));
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            problems.push("Passwords must have at least one digit ('0'-'9')".to_string());
        }
        if self.require_lowercase && !password.chars().any(char::is_lowercase) {
            problems.push("Passwords must have at least one lowercase ('a'-'z')".to_string());
        }
        if self.require_uppercase && !password.chars().any(char::is_uppercase) {
            problems.push("Passwords must have at least one uppercase ('A'-'Z')".to_string());
        }
        if self.require_non_alphanumeric && password.chars().all(char::is_alphanumeric) {
            problems.push("Passwords must have at least one non alphanumeric character".to_string());
        }

        problems
    }
}
