//! Request payloads and the validation applied to them before persistence

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Field name → first problem found with it
pub type FieldErrors = HashMap<String, String>;

pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}

pub const NAME_MIN_LENGTH: usize = 2;
pub const NAME_MAX_LENGTH: usize = 100;
pub const DOCUMENT_MIN_LENGTH: usize = 11;
pub const DOCUMENT_MAX_LENGTH: usize = 14;
pub const EMAIL_MAX_LENGTH: usize = 256;

/// Body of POST /provider and PUT /provider/:id.
///
/// Fields are optional so a missing one is reported as a field error rather
/// than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderInput {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
}

impl Validate for ProviderInput {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if let Err(msg) = validate_name(self.name.as_deref()) {
            errors.insert("name".to_string(), msg);
        }
        if let Err(msg) = validate_document(self.document.as_deref()) {
            errors.insert("document".to_string(), msg);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub confirm_password: Option<String>,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if let Err(msg) = validate_email_format(self.email.as_deref().unwrap_or_default()) {
            errors.insert("email".to_string(), msg);
        }
        match self.password.as_deref() {
            None | Some("") => {
                errors.insert("password".to_string(), "The field password is required".to_string());
            }
            Some(password) => {
                if let Some(confirm) = self.confirm_password.as_deref() {
                    if confirm != password {
                        errors.insert(
                            "confirm_password".to_string(),
                            "The passwords do not match".to_string(),
                        );
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if let Err(msg) = validate_email_format(self.email.as_deref().unwrap_or_default()) {
            errors.insert("email".to_string(), msg);
        }
        if self.password.as_deref().unwrap_or_default().is_empty() {
            errors.insert("password".to_string(), "The field password is required".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

pub fn validate_name(name: Option<&str>) -> Result<(), String> {
    let name = name.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err("The field name is required".to_string());
    }

    let len = name.chars().count();
    if !(NAME_MIN_LENGTH..=NAME_MAX_LENGTH).contains(&len) {
        return Err(format!(
            "The field name must have between {} and {} characters",
            NAME_MIN_LENGTH, NAME_MAX_LENGTH
        ));
    }

    Ok(())
}

/// Tax identifier: 11 digits (CPF) up to 14 digits (CNPJ)
pub fn validate_document(document: Option<&str>) -> Result<(), String> {
    let document = document.map(str::trim).unwrap_or_default();
    if document.is_empty() {
        return Err("The field document is required".to_string());
    }

    if !document.chars().all(|c| c.is_ascii_digit()) {
        return Err("The field document may only contain digits".to_string());
    }

    if !(DOCUMENT_MIN_LENGTH..=DOCUMENT_MAX_LENGTH).contains(&document.len()) {
        return Err(format!(
            "The field document must have between {} and {} digits",
            DOCUMENT_MIN_LENGTH, DOCUMENT_MAX_LENGTH
        ));
    }

    Ok(())
}

pub fn validate_email_format(email: &str) -> Result<(), String> {
    let email = email.trim();
    if email.is_empty() {
        return Err("The field email is required".to_string());
    }

    if email.len() > EMAIL_MAX_LENGTH {
        return Err(format!("The field email must be at most {} characters", EMAIL_MAX_LENGTH));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err("The field email is not a valid e-mail address".to_string());
    };
    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err("The field email is not a valid e-mail address".to_string());
    }

    Ok(())
}
