//! Entity cache with in-flight request deduplication

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::source::{Entity, EntitySource};
use crate::auth::Credential;
use crate::error::{Error, Result};

type PendingFetch<E> = Shared<BoxFuture<'static, Result<E>>>;

struct CacheState<E> {
    entries: HashMap<String, E>,
    pending: HashMap<String, PendingFetch<E>>,
}

struct Inner<S: EntitySource> {
    source: S,
    state: Mutex<CacheState<S::Entity>>,
}

impl<S: EntitySource> Inner<S> {
    fn lock(&self) -> MutexGuard<'_, CacheState<S::Entity>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Session-wide cache of entities keyed by id.
///
/// Lookups by id are served from memory once an entity is known, and
/// concurrent lookups of an unknown id share a single fetch. Hits are never
/// revalidated: an entity changed elsewhere stays stale until a write through
/// this cache replaces or removes it.
///
/// Cloning is cheap and yields a handle to the same cache.
pub struct EntityCache<S: EntitySource> {
    inner: Arc<Inner<S>>,
}

impl<S: EntitySource> Clone for EntityCache<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: EntitySource> EntityCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                state: Mutex::new(CacheState {
                    entries: HashMap::new(),
                    pending: HashMap::new(),
                }),
            }),
        }
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }

    /// Cached entity, without touching the network
    pub fn peek(&self, id: &str) -> Option<S::Entity> {
        self.inner.lock().entries.get(id).cloned()
    }

    /// Resolve an entity by id.
    ///
    /// Must be called from within a tokio runtime: a miss spawns the fetch
    /// as a task so that it completes, and fills the cache, even if every
    /// caller stops waiting for it.
    pub async fn get_by_id(&self, id: &str) -> Result<S::Entity> {
        let fetch = {
            let mut state = self.inner.lock();

            if let Some(entity) = state.entries.get(id) {
                tracing::debug!(id, "entity cache hit");
                return Ok(entity.clone());
            }

            match state.pending.get(id) {
                Some(fetch) => {
                    tracing::debug!(id, "joining in-flight fetch");
                    fetch.clone()
                }
                None => {
                    let fetch = self.spawn_fetch(id.to_string());
                    state.pending.insert(id.to_string(), fetch.clone());
                    fetch
                }
            }
        };

        fetch.await
    }

    // Called with the state lock held; the spawned task takes the same lock
    // to settle, so it cannot remove its pending entry before it is inserted.
    fn spawn_fetch(&self, id: String) -> PendingFetch<S::Entity> {
        tracing::debug!(id = %id, "fetching entity");
        let inner = Arc::clone(&self.inner);

        let task = tokio::spawn(async move {
            let result = inner.source.fetch_by_id(&id).await;

            let mut state = inner.lock();
            match &result {
                Ok(entity) => {
                    state.entries.insert(id.clone(), entity.clone());
                }
                Err(e) => tracing::warn!(id = %id, "entity fetch failed: {}", e),
            }
            state.pending.remove(&id);

            result
        });

        async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(Error::Api(format!("fetch task failed: {}", e))),
            }
        }
        .boxed()
        .shared()
    }

    /// Fetch the full listing and refresh every entity in it
    pub async fn get_all(&self) -> Result<Vec<S::Listed>> {
        let listed = self.inner.source.fetch_all().await?;

        let mut state = self.inner.lock();
        for item in &listed {
            let entity: &S::Entity = item.as_ref();
            state
                .entries
                .insert(entity.id().to_string(), entity.clone());
        }
        tracing::debug!(count = listed.len(), "entity cache refreshed from listing");

        Ok(listed)
    }

    pub async fn create(
        &self,
        draft: &S::Draft,
        credential: Option<&Credential>,
    ) -> Result<S::Entity> {
        let credential = require_credential(credential)?;
        let entity = self.inner.source.create(draft, credential).await?;
        self.store(&entity);
        Ok(entity)
    }

    pub async fn update(
        &self,
        id: &str,
        patch: &S::Patch,
        credential: Option<&Credential>,
    ) -> Result<S::Entity> {
        let credential = require_credential(credential)?;
        let entity = self.inner.source.update(id, patch, credential).await?;
        self.store(&entity);
        Ok(entity)
    }

    pub async fn delete(&self, id: &str, credential: Option<&Credential>) -> Result<()> {
        let credential = require_credential(credential)?;
        self.inner.source.delete(id, credential).await?;
        self.inner.lock().entries.remove(id);
        Ok(())
    }

    fn store(&self, entity: &S::Entity) {
        self.inner
            .lock()
            .entries
            .insert(entity.id().to_string(), entity.clone());
    }
}

fn require_credential(credential: Option<&Credential>) -> Result<&Credential> {
    credential.ok_or_else(|| Error::Unauthorized("Authorization header is required".to_string()))
}
