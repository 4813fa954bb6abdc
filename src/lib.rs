//! Keeps client-side cache entries consistent across two views of the same
//! remote data: collections, addressed by list params, and single resources,
//! addressed by id.
//!
//! After any successful remote operation (list, create, view, update,
//! partial update, remove) the [`Synchronizer`] propagates the result into
//! the collection entry and every affected resource entry of a cache store,
//! without ever triggering a refetch of data it already holds fresh. What a
//! collection looks like inside is the [`ResourceAdapter`]'s business: a
//! plain array, a paginated wrapper, anything that can enumerate, upsert,
//! and remove resources.
//!
//! The crate does not dedupe requests, retry, or cache at the network level.
//! It maintains referential consistency of already-fetched data; scheduling
//! revalidation and reacting to changes are the host's concern, and bindings
//! expose a watch subscription for exactly that.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use resync::{HttpClient, JsonAdapter, MemoryStore, SyncConfig, SyncFactory};
//!
//! let endpoint: url::Url = "https://api.example.com/todos".parse()?;
//! let factory = SyncFactory::new(SyncConfig {
//!   adapter: Arc::new(JsonAdapter::new("todos")),
//!   client_provider: move || Arc::new(HttpClient::new(endpoint.clone())),
//!   store: Arc::new(MemoryStore::new()),
//! });
//!
//! // A binding pairs a live view with the operations that maintain it.
//! let binding = factory.collection(None)?;
//! let todos = binding.api.list().await?;   // fetched, cached, propagated
//! binding.api.remove("1").await?;          // excised from the collection, tombstoned
//! // binding.response has observed both changes.
//! ```

pub mod adapter;
pub mod bind;
pub mod entry;
pub mod error;
pub mod key;
pub mod remote;
pub mod store;
pub mod sync;

pub use adapter::{JsonAdapter, ResourceAdapter, ResourceRef};
pub use bind::{
  CollectionApi, CollectionBinding, ResourceApi, ResourceBinding, SyncConfig, SyncFactory,
};
pub use entry::{Entry, EntryOf};
pub use error::{KeyError, RemoteError, StoreError, SyncError};
pub use key::{CacheKey, KeyPart};
pub use remote::{HttpClient, RemoteClient, RemoteResult};
pub use store::{CacheStore, MemoryStore, SqliteStore, Subscribe, WriteOp, WriteOptions};
pub use sync::Synchronizer;
