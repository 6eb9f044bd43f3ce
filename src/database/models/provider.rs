use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A provider row. Only ever built from input that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Provider {
    pub id: Uuid,
    pub name: String,
    pub document: String,
}
