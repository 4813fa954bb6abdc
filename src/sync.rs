//! The synchronization engine: remote calls composed with ordered cache
//! propagation.
//!
//! Every operation is one remote round trip followed by a fixed sequence of
//! awaited cache writes. Writes never schedule refetches; the value being
//! written came from the remote moments ago. Failure policy:
//!
//! - remote rejection: surfaced unchanged, zero writes run;
//! - write failure: surfaced, earlier writes of the operation stay
//!   committed, later ones never run. The divergence heals on the next
//!   successful fetch of either key.
//!
//! Concurrent operations are not serialized against each other. The store's
//! per-key write atomicity is the only coordination, so when two operations
//! race on a key the later-completing write wins.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::adapter::{ResourceAdapter, ResourceRef};
use crate::entry::{Entry, EntryOf};
use crate::error::SyncError;
use crate::key::CacheKey;
use crate::remote::RemoteClient;
use crate::store::{CacheStore, WriteOp, WriteOptions};

/// Runs remote operations and propagates their results into the cache
/// through the adapter.
pub struct Synchronizer<A, C, S> {
  adapter: Arc<A>,
  client: Arc<C>,
  store: Arc<S>,
}

impl<A, C, S> Clone for Synchronizer<A, C, S> {
  fn clone(&self) -> Self {
    Self {
      adapter: Arc::clone(&self.adapter),
      client: Arc::clone(&self.client),
      store: Arc::clone(&self.store),
    }
  }
}

impl<A, C, S> Synchronizer<A, C, S>
where
  A: ResourceAdapter + 'static,
  C: RemoteClient<A>,
  S: CacheStore<EntryOf<A>>,
{
  pub fn new(adapter: Arc<A>, client: Arc<C>, store: Arc<S>) -> Self {
    Self { adapter, client, store }
  }

  /// The adapter driving key derivation and merges.
  pub fn adapter(&self) -> &A {
    &self.adapter
  }

  /// Fetch the collection view for `params` and propagate it.
  ///
  /// 1. Write the collection to its own key.
  /// 2. Write every contained resource to its resource key, in the order
  ///    the adapter's `all` yields them.
  ///
  /// Both steps are awaited in order. The remote result is returned whether
  /// or not the caller reads the cache afterwards.
  pub async fn list(&self, params: Option<&A::ListParams>) -> Result<A::Collection, SyncError> {
    let collection_key = self.adapter.collection_key(params)?;
    let collection = self.client.list(params).await?;

    let resources = self.adapter.all(&collection);
    debug!(
      store = self.store.name(),
      key = %collection_key,
      resources = resources.len(),
      "propagating listed collection"
    );

    self.set(&collection_key, Entry::Collection(collection.clone())).await?;
    for resource in resources {
      let key = self.adapter.resource_key(ResourceRef::Resource(&resource));
      self.set(&key, Entry::Resource(resource)).await?;
    }

    Ok(collection)
  }

  /// Create a resource remotely, then fold it into the cache.
  pub async fn create(&self, params: C::CreateParams) -> Result<A::Resource, SyncError> {
    let resource = self.client.create(params).await?;
    self.propagate_resource("create", resource.clone()).await?;
    Ok(resource)
  }

  /// Fetch one resource by id, then fold it into the cache.
  pub async fn view(&self, id: &str) -> Result<A::Resource, SyncError> {
    let resource = self.client.view(id).await?;
    self.propagate_resource("view", resource.clone()).await?;
    Ok(resource)
  }

  /// Replace one resource remotely, then fold the result into the cache.
  pub async fn update(&self, id: &str, params: C::UpdateParams) -> Result<A::Resource, SyncError> {
    let resource = self.client.update(id, params).await?;
    self.propagate_resource("update", resource.clone()).await?;
    Ok(resource)
  }

  /// Patch one resource remotely, then fold the result into the cache.
  pub async fn partial(&self, id: &str, params: C::PatchParams) -> Result<A::Resource, SyncError> {
    let resource = self.client.partial(id, params).await?;
    self.propagate_resource("partial", resource.clone()).await?;
    Ok(resource)
  }

  /// Remove one resource remotely, excise it from the unparameterized
  /// collection entry, and tombstone its resource entry.
  ///
  /// The tombstone marks confirmed absence; observers can tell "deleted"
  /// from "never fetched".
  pub async fn remove(&self, id: &str) -> Result<(), SyncError> {
    self.client.remove(id).await?;

    let collection_key = self.adapter.collection_key(None)?;
    debug!(store = self.store.name(), key = %collection_key, id, "propagating remove");

    let adapter = Arc::clone(&self.adapter);
    let owned_id = id.to_owned();
    let canon = collection_key.canon();
    self
      .update_entry(&collection_key, move |previous| match previous {
        Some(Entry::Collection(collection)) => {
          Some(Entry::Collection(adapter.remove(&owned_id, collection)))
        }
        Some(_) => {
          warn!(key = %canon, "collection key holds a non-collection entry, leaving it untouched");
          None
        }
        None => None,
      })
      .await?;

    let resource_key = self.adapter.resource_key(ResourceRef::Id(id));
    self.set(&resource_key, Entry::Tombstone).await
  }

  /// Shared propagation for operations resolving to a single resource:
  /// upsert into the unparameterized collection entry, then write the
  /// resource entry itself.
  ///
  /// The collection update tolerates an absent entry. A collection nobody
  /// has listed yet is not fabricated from one resource, and parameterized
  /// collection entries are never touched here; those re-derive from the
  /// next list.
  async fn propagate_resource(&self, op: &'static str, resource: A::Resource) -> Result<(), SyncError> {
    let collection_key = self.adapter.collection_key(None)?;
    let resource_key = self.adapter.resource_key(ResourceRef::Resource(&resource));
    debug!(
      store = self.store.name(),
      key = %resource_key,
      collection = %collection_key,
      op,
      "propagating resource"
    );

    let adapter = Arc::clone(&self.adapter);
    let canon = collection_key.canon();
    let for_collection = resource.clone();
    self
      .update_entry(&collection_key, move |previous| match previous {
        Some(Entry::Collection(collection)) => {
          Some(Entry::Collection(adapter.upsert(for_collection, collection)))
        }
        Some(_) => {
          warn!(key = %canon, "collection key holds a non-collection entry, leaving it untouched");
          None
        }
        None => None,
      })
      .await?;

    self.set(&resource_key, Entry::Resource(resource)).await
  }

  async fn set(&self, key: &CacheKey, entry: EntryOf<A>) -> Result<(), SyncError> {
    self
      .store
      .write(key, WriteOp::Set(entry), WriteOptions::no_refetch())
      .await
      .map_err(|source| SyncError::Store { key: key.canon(), source })
  }

  async fn update_entry(
    &self,
    key: &CacheKey,
    f: impl FnOnce(Option<EntryOf<A>>) -> Option<EntryOf<A>> + Send + 'static,
  ) -> Result<(), SyncError> {
    self
      .store
      .write(key, WriteOp::update(f), WriteOptions::no_refetch())
      .await
      .map_err(|source| SyncError::Store { key: key.canon(), source })
  }
}
