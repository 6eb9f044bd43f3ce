use std::sync::Arc;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::Provider;
use crate::database::repository::ProviderStore;
use crate::types::{FieldErrors, ProviderInput, Validate};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider not found: {0}")]
    NotFound(Uuid),
    #[error("Provider failed validation")]
    Validation(FieldErrors),
    #[error("Body id {body} does not match path id {path}")]
    IdMismatch { path: Uuid, body: Uuid },
    #[error("Provider could not be saved ({0})")]
    SaveFailed(&'static str),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Create/read/replace/delete on the provider collection.
///
/// Validation runs before any write; a write that touches zero rows is a
/// `SaveFailed`, never a `NotFound`.
#[derive(Clone)]
pub struct ProviderService {
    store: Arc<dyn ProviderStore>,
}

impl ProviderService {
    pub fn new(store: Arc<dyn ProviderStore>) -> Self {
        Self { store }
    }

    pub async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(self.store.health_check().await?)
    }

    pub async fn list(&self) -> Result<Vec<Provider>, ProviderError> {
        Ok(self.store.list().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Provider, ProviderError> {
        self.store.find(id).await?.ok_or(ProviderError::NotFound(id))
    }

    pub async fn create(&self, input: ProviderInput) -> Result<Provider, ProviderError> {
        input.validate().map_err(ProviderError::Validation)?;

        let provider = into_provider(Uuid::new_v4(), input);
        if self.store.insert(&provider).await? == 0 {
            return Err(ProviderError::SaveFailed("insert"));
        }

        tracing::info!("Created provider {}", provider.id);
        Ok(provider)
    }

    /// Full overwrite of an existing record
    pub async fn replace(&self, id: Uuid, input: ProviderInput) -> Result<Provider, ProviderError> {
        self.get(id).await?;

        input.validate().map_err(ProviderError::Validation)?;
        if let Some(body) = input.id {
            if body != id {
                return Err(ProviderError::IdMismatch { path: id, body });
            }
        }

        let provider = into_provider(id, input);
        if self.store.replace(&provider).await? == 0 {
            return Err(ProviderError::SaveFailed("update"));
        }

        tracing::info!("Replaced provider {}", id);
        Ok(provider)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ProviderError> {
        self.get(id).await?;

        if self.store.delete(id).await? == 0 {
            return Err(ProviderError::SaveFailed("delete"));
        }

        tracing::info!("Deleted provider {}", id);
        Ok(())
    }
}

fn into_provider(id: Uuid, input: ProviderInput) -> Provider {
    Provider {
        id,
        name: input.name.unwrap_or_default().trim().to_string(),
        document: input.document.unwrap_or_default().trim().to_string(),
    }
}
