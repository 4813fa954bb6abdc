//! View bindings: a live subscription plus an imperative API, scoped to one
//! collection view or one resource.
//!
//! A binding pairs a passive `response` (a watch receiver over the bound
//! cache key) with an `api` exposing the synchronizer's operations, bound to
//! the binding's own scope: list params for collection bindings, the current
//! id for resource bindings. Bindings never fetch on their own; nothing
//! happens until the host calls an operation.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::adapter::{ResourceAdapter, ResourceRef};
use crate::entry::EntryOf;
use crate::error::SyncError;
use crate::remote::RemoteClient;
use crate::store::{CacheStore, Subscribe};
use crate::sync::Synchronizer;

/// Everything a binding factory needs, passed explicitly.
pub struct SyncConfig<A, P, S> {
  /// Mapping layer for the resource family.
  pub adapter: Arc<A>,
  /// Zero-argument accessor producing the remote client. Runs once per
  /// binding construction, so it may consult whatever context produces
  /// clients at that moment (connection state, auth).
  pub client_provider: P,
  /// Cache store that bindings subscribe to and operations write through.
  pub store: Arc<S>,
}

/// Builds collection- and resource-scoped bindings for one resource family.
pub struct SyncFactory<A, C, S> {
  adapter: Arc<A>,
  client_provider: Box<dyn Fn() -> Arc<C> + Send + Sync>,
  store: Arc<S>,
}

impl<A, C, S> SyncFactory<A, C, S>
where
  A: ResourceAdapter + 'static,
  C: RemoteClient<A> + 'static,
  S: CacheStore<EntryOf<A>> + Subscribe<EntryOf<A>> + 'static,
{
  pub fn new<P>(config: SyncConfig<A, P, S>) -> Self
  where
    P: Fn() -> Arc<C> + Send + Sync + 'static,
  {
    Self {
      adapter: config.adapter,
      client_provider: Box::new(config.client_provider),
      store: config.store,
    }
  }

  fn synchronizer(&self) -> Synchronizer<A, C, S> {
    Synchronizer::new(
      Arc::clone(&self.adapter),
      (self.client_provider)(),
      Arc::clone(&self.store),
    )
  }

  /// Binding over the collection view for `params`.
  pub fn collection(
    &self,
    params: Option<A::ListParams>,
  ) -> Result<CollectionBinding<A, C, S>, SyncError> {
    let key = self.adapter.collection_key(params.as_ref())?;
    debug!(key = %key, "building collection binding");
    let response = self
      .store
      .subscribe(&key)
      .map_err(|source| SyncError::Store { key: key.canon(), source })?;
    Ok(CollectionBinding {
      response,
      api: CollectionApi {
        sync: self.synchronizer(),
        params,
      },
    })
  }

  /// Binding over one resource. `id: None` binds to nothing: the response
  /// side stays empty and id-taking operations reject until an id exists.
  pub fn resource(&self, id: Option<&str>) -> Result<ResourceBinding<A, C, S>, SyncError> {
    let response = match id {
      Some(id) => {
        let key = self.adapter.resource_key(ResourceRef::Id(id));
        debug!(key = %key, "building resource binding");
        let receiver = self
          .store
          .subscribe(&key)
          .map_err(|source| SyncError::Store { key: key.canon(), source })?;
        Some(receiver)
      }
      None => None,
    };
    Ok(ResourceBinding {
      response,
      api: ResourceApi {
        sync: self.synchronizer(),
        id: id.map(str::to_owned),
      },
    })
  }
}

// ============================================================================
// Collection bindings
// ============================================================================

/// Live collection view plus its operations.
pub struct CollectionBinding<A, C, S>
where
  A: ResourceAdapter,
{
  /// Current entry at the collection key, updated on every committed write.
  pub response: watch::Receiver<Option<EntryOf<A>>>,
  /// Operations, with `list` bound to this binding's params.
  pub api: CollectionApi<A, C, S>,
}

/// Operations scoped to one collection view.
pub struct CollectionApi<A, C, S>
where
  A: ResourceAdapter,
{
  sync: Synchronizer<A, C, S>,
  params: Option<A::ListParams>,
}

impl<A, C, S> CollectionApi<A, C, S>
where
  A: ResourceAdapter + 'static,
  C: RemoteClient<A>,
  S: CacheStore<EntryOf<A>>,
{
  /// Refresh the bound collection view.
  pub async fn list(&self) -> Result<A::Collection, SyncError> {
    self.sync.list(self.params.as_ref()).await
  }

  pub async fn create(&self, params: C::CreateParams) -> Result<A::Resource, SyncError> {
    self.sync.create(params).await
  }

  pub async fn view(&self, id: &str) -> Result<A::Resource, SyncError> {
    self.sync.view(id).await
  }

  pub async fn update(&self, id: &str, params: C::UpdateParams) -> Result<A::Resource, SyncError> {
    self.sync.update(id, params).await
  }

  pub async fn partial(&self, id: &str, params: C::PatchParams) -> Result<A::Resource, SyncError> {
    self.sync.partial(id, params).await
  }

  pub async fn remove(&self, id: &str) -> Result<(), SyncError> {
    self.sync.remove(id).await
  }
}

// ============================================================================
// Resource bindings
// ============================================================================

/// Live single-resource view plus its operations.
pub struct ResourceBinding<A, C, S>
where
  A: ResourceAdapter,
{
  /// Current entry at the resource key. `None` when no id is bound, since
  /// there is no key to observe yet.
  pub response: Option<watch::Receiver<Option<EntryOf<A>>>>,
  /// Operations bound to this binding's id.
  pub api: ResourceApi<A, C, S>,
}

/// Operations scoped to one resource.
///
/// `create` needs no id. The rest fail with [`SyncError::MissingId`] before
/// any remote call when the binding has none.
pub struct ResourceApi<A, C, S> {
  sync: Synchronizer<A, C, S>,
  id: Option<String>,
}

impl<A, C, S> ResourceApi<A, C, S>
where
  A: ResourceAdapter + 'static,
  C: RemoteClient<A>,
  S: CacheStore<EntryOf<A>>,
{
  /// The id operations are bound to, when there is one.
  pub fn id(&self) -> Option<&str> {
    self.id.as_deref()
  }

  fn bound_id(&self, op: &'static str) -> Result<&str, SyncError> {
    self.id.as_deref().ok_or(SyncError::MissingId { op })
  }

  /// Create needs no id; the new resource's identity comes from the remote.
  pub async fn create(&self, params: C::CreateParams) -> Result<A::Resource, SyncError> {
    self.sync.create(params).await
  }

  pub async fn view(&self) -> Result<A::Resource, SyncError> {
    let id = self.bound_id("view")?;
    self.sync.view(id).await
  }

  pub async fn update(&self, params: C::UpdateParams) -> Result<A::Resource, SyncError> {
    let id = self.bound_id("update")?;
    self.sync.update(id, params).await
  }

  pub async fn partial(&self, params: C::PatchParams) -> Result<A::Resource, SyncError> {
    let id = self.bound_id("partial")?;
    self.sync.partial(id, params).await
  }

  pub async fn remove(&self) -> Result<(), SyncError> {
    let id = self.bound_id("remove")?;
    self.sync.remove(id).await
  }
}
