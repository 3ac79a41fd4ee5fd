//! Backend REST collaborator.
//!
//! The dashboard talks to a resource-oriented CRUD API. Stores live at the
//! top level (`/api/stores`); every other entity is a collection scoped under
//! its store (`/api/{store}/{segment}`).

mod client;
mod error;

use async_trait::async_trait;

pub use client::HttpClient;
pub use error::ApiError;

use crate::form::Resource;
use crate::model::{Store, StoreId, StoreInput};

/// Top-level store collection.
#[async_trait]
pub trait StoreDirectory: Send + Sync {
    async fn list_stores(&self) -> Result<Vec<Store>, ApiError>;

    async fn create_store(&self, input: &StoreInput) -> Result<Store, ApiError>;
}

/// Store-scoped collection of one resource type.
#[async_trait]
pub trait ResourceApi<R: Resource>: Send + Sync {
    async fn list(&self, store: &StoreId) -> Result<Vec<R>, ApiError>;

    /// Mutations only report success; the saved record comes back with the
    /// next `list`.
    async fn create(&self, store: &StoreId, input: &R::Input) -> Result<(), ApiError>;

    async fn update(&self, store: &StoreId, id: &R::Id, input: &R::Input)
    -> Result<(), ApiError>;

    async fn delete(&self, store: &StoreId, id: &R::Id) -> Result<(), ApiError>;
}
