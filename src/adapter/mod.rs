//! Mapping layer between a domain's resource and collection types and the
//! cache's addressing and merge primitives.
//!
//! One adapter instance describes one resource family under one scope
//! prefix. The synchronizer routes every key derivation and collection merge
//! through it and never looks inside a collection itself, so paginated or
//! otherwise wrapped collections work as long as the adapter can enumerate,
//! upsert, and remove their resources.

mod json;
pub mod merge;

pub use json::JsonAdapter;

use serde::Serialize;

use crate::error::KeyError;
use crate::key::CacheKey;

/// A resource addressed either by its full value or by bare id.
///
/// Remove-style operations only ever hold an id; everything else can hand
/// over the value itself. Both forms of the same resource must land on the
/// same key.
#[derive(Debug, Clone, Copy)]
pub enum ResourceRef<'a, R> {
  /// Bare identifier.
  Id(&'a str),
  /// Full resource value.
  Resource(&'a R),
}

/// Capability set mapping one resource family onto cache primitives.
///
/// Implementations must be pure: same inputs, same outputs, no interior
/// state, no I/O. `upsert` and `remove` consume the collection and return a
/// new one, so callers holding the previous value keep an untouched copy.
pub trait ResourceAdapter: Send + Sync {
  /// Single domain record with a stable string identity.
  type Resource: Clone + Send + Sync + 'static;
  /// Aggregate of resources. May be a plain sequence or a richer structure
  /// with its own metadata; opaque to everything but the adapter.
  type Collection: Clone + Send + Sync + 'static;
  /// Filter params addressing one collection view.
  type ListParams: Serialize + Send + Sync + 'static;

  /// Key prefix naming this resource family, e.g. `"todos"`.
  fn scope(&self) -> &str;

  /// Stable identity of a resource. Repeated calls on the same value must
  /// return the same id.
  fn id(&self, resource: &Self::Resource) -> String;

  /// Every resource inside `collection`, in the collection's own order.
  fn all(&self, collection: &Self::Collection) -> Vec<Self::Resource>;

  /// New collection with `resource` replacing its id match, or appended when
  /// nothing matches.
  fn upsert(&self, resource: Self::Resource, collection: Self::Collection) -> Self::Collection;

  /// New collection with the id match excised. Collections without a match
  /// come back unchanged.
  fn remove(&self, id: &str, collection: Self::Collection) -> Self::Collection;

  /// Cache key addressing one resource, from either form of it.
  ///
  /// The provided implementation derives the id as needed, so
  /// `resource_key(Id)` and `resource_key(Resource)` agree for the same
  /// resource.
  fn resource_key(&self, target: ResourceRef<'_, Self::Resource>) -> CacheKey {
    let id = match target {
      ResourceRef::Id(id) => id.to_owned(),
      ResourceRef::Resource(resource) => self.id(resource),
    };
    CacheKey::resource(self.scope(), &id)
  }

  /// Cache key addressing the collection view for `params`.
  ///
  /// `None` addresses the canonical, unfiltered collection, which is the
  /// entry single-resource mutations maintain.
  fn collection_key(&self, params: Option<&Self::ListParams>) -> Result<CacheKey, KeyError> {
    CacheKey::collection(self.scope(), params)
  }
}
