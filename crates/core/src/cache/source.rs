//! The network boundary an `EntityCache` reads through

use async_trait::async_trait;

use crate::auth::Credential;
use crate::error::Result;

/// A value addressable by a string id
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
}

/// Remote collection of entities
#[async_trait]
pub trait EntitySource: Send + Sync + 'static {
    type Entity: Entity;
    /// Item of the bulk listing; may carry more than the entity itself
    type Listed: AsRef<Self::Entity> + Send + 'static;
    type Draft: Send + Sync;
    type Patch: Send + Sync;

    async fn fetch_all(&self) -> Result<Vec<Self::Listed>>;

    async fn fetch_by_id(&self, id: &str) -> Result<Self::Entity>;

    async fn create(&self, draft: &Self::Draft, credential: &Credential) -> Result<Self::Entity>;

    async fn update(
        &self,
        id: &str,
        patch: &Self::Patch,
        credential: &Credential,
    ) -> Result<Self::Entity>;

    async fn delete(&self, id: &str, credential: &Credential) -> Result<()>;
}
