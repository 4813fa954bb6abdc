//! Cache entry values: what a key can hold.

use serde::{Deserialize, Serialize};

use crate::adapter::ResourceAdapter;

/// Value stored at a cache key.
///
/// A collection key holds `Collection`; a resource key holds `Resource`
/// while the resource exists and `Tombstone` once a remove confirmed its
/// absence. A key with no entry at all means "never fetched", which is a
/// different state than a tombstone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entry<C, R> {
  /// A whole collection, as fetched by list or maintained by propagation.
  Collection(C),
  /// A single resource.
  Resource(R),
  /// Confirmed absence after a successful remove.
  Tombstone,
}

impl<C, R> Entry<C, R> {
  /// The collection inside, if this is a collection entry.
  pub fn as_collection(&self) -> Option<&C> {
    match self {
      Entry::Collection(collection) => Some(collection),
      _ => None,
    }
  }

  /// The resource inside, if this is a resource entry.
  pub fn as_resource(&self) -> Option<&R> {
    match self {
      Entry::Resource(resource) => Some(resource),
      _ => None,
    }
  }

  /// True for the tombstone left behind by a remove.
  pub fn is_tombstone(&self) -> bool {
    matches!(self, Entry::Tombstone)
  }
}

/// Entry type for a given adapter's collection and resource types.
pub type EntryOf<A> = Entry<<A as ResourceAdapter>::Collection, <A as ResourceAdapter>::Resource>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_accessors_match_variants() {
    let entry: Entry<Vec<u32>, u32> = Entry::Collection(vec![1, 2]);
    assert_eq!(entry.as_collection(), Some(&vec![1, 2]));
    assert_eq!(entry.as_resource(), None);
    assert!(!entry.is_tombstone());

    let entry: Entry<Vec<u32>, u32> = Entry::Resource(7);
    assert_eq!(entry.as_resource(), Some(&7));
    assert_eq!(entry.as_collection(), None);

    let entry: Entry<Vec<u32>, u32> = Entry::Tombstone;
    assert!(entry.is_tombstone());
    assert_eq!(entry.as_resource(), None);
  }

  #[test]
  fn test_tombstone_serializes_distinct_from_values() {
    let tombstone: Entry<Vec<u32>, u32> = Entry::Tombstone;
    let resource: Entry<Vec<u32>, u32> = Entry::Resource(1);
    let encoded_tombstone = serde_json::to_string(&tombstone).unwrap();
    let encoded_resource = serde_json::to_string(&resource).unwrap();
    assert_ne!(encoded_tombstone, encoded_resource);

    let decoded: Entry<Vec<u32>, u32> = serde_json::from_str(&encoded_tombstone).unwrap();
    assert!(decoded.is_tombstone());
  }
}
