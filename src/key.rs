//! Cache addressing: structural keys for collection and resource entries.
//!
//! A [`CacheKey`] is an ordered sequence of parts: the scope prefix naming a
//! resource family, a kind marker, and either a resource id or the
//! canonicalized list params. Keys compare by value, so two keys built from
//! logically equal params are the same key no matter how the params were
//! assembled.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::KeyError;

/// One part of a cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPart {
  /// Plain text: scope prefix, kind marker, or resource id.
  Text(String),
  /// Canonicalized list params.
  Params(Value),
}

impl KeyPart {
  fn to_value(&self) -> Value {
    match self {
      KeyPart::Text(text) => Value::String(text.clone()),
      KeyPart::Params(params) => params.clone(),
    }
  }
}

/// Kind markers keep resource and collection keys from colliding even when
/// an id happens to equal some params rendering.
const KIND_RESOURCE: &str = "one";
const KIND_COLLECTION: &str = "list";

/// Structural address of one cache entry.
///
/// Stores index entries by the canonical string form ([`CacheKey::canon`]);
/// [`CacheKey::storage_hash`] gives a fixed-length digest for backends that
/// want short primary keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
  parts: Vec<KeyPart>,
}

impl CacheKey {
  /// Key addressing a single resource by id.
  pub fn resource(scope: &str, id: &str) -> Self {
    Self {
      parts: vec![
        KeyPart::Text(scope.to_owned()),
        KeyPart::Text(KIND_RESOURCE.to_owned()),
        KeyPart::Text(id.to_owned()),
      ],
    }
  }

  /// Key addressing the collection entry for the given list params.
  ///
  /// `None` addresses the canonical, unfiltered collection. Params go
  /// through their JSON form with object keys sorted at every level, so the
  /// key must not depend on how a params map was assembled.
  pub fn collection<P: Serialize>(scope: &str, params: Option<&P>) -> Result<Self, KeyError> {
    let mut parts = vec![
      KeyPart::Text(scope.to_owned()),
      KeyPart::Text(KIND_COLLECTION.to_owned()),
    ];
    if let Some(params) = params {
      let value = serde_json::to_value(params).map_err(|source| KeyError {
        scope: scope.to_owned(),
        source,
      })?;
      parts.push(KeyPart::Params(sorted(value)));
    }
    Ok(Self { parts })
  }

  /// The scope prefix this key belongs to.
  pub fn scope(&self) -> &str {
    match self.parts.first() {
      Some(KeyPart::Text(scope)) => scope,
      _ => "",
    }
  }

  /// The parts of this key, in order.
  pub fn parts(&self) -> &[KeyPart] {
    &self.parts
  }

  /// Canonical string form: the parts rendered as a compact JSON array.
  pub fn canon(&self) -> String {
    Value::Array(self.parts.iter().map(KeyPart::to_value).collect()).to_string()
  }

  /// SHA-256 of the canonical form, hex-encoded.
  ///
  /// The canonical form grows with params; this stays at 64 characters.
  pub fn storage_hash(&self) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.canon().as_bytes());
    hex::encode(hasher.finalize())
  }
}

impl std::fmt::Display for CacheKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.canon())
  }
}

/// Rebuild a JSON value with object keys in sorted order at every level.
///
/// serde_json's default map already iterates sorted; this keeps the
/// canonical form stable even when the `preserve_order` feature gets unified
/// into a build.
fn sorted(value: Value) -> Value {
  match value {
    Value::Object(map) => {
      let mut pairs: Vec<(String, Value)> = map.into_iter().collect();
      pairs.sort_by(|a, b| a.0.cmp(&b.0));
      let mut out = serde_json::Map::new();
      for (key, inner) in pairs {
        out.insert(key, sorted(inner));
      }
      Value::Object(out)
    }
    Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
    other => other,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_resource_key_is_stable() {
    let a = CacheKey::resource("todos", "1");
    let b = CacheKey::resource("todos", "1");
    assert_eq!(a, b);
    assert_eq!(a.canon(), r#"["todos","one","1"]"#);
  }

  #[test]
  fn test_collection_key_without_params() {
    let key = CacheKey::collection("todos", None::<&Value>).unwrap();
    assert_eq!(key.canon(), r#"["todos","list"]"#);
    assert_eq!(key.scope(), "todos");
  }

  #[test]
  fn test_params_yield_the_same_key_regardless_of_assembly_order() {
    let mut first = serde_json::Map::new();
    first.insert("page".to_owned(), json!(2));
    first.insert("done".to_owned(), json!(true));
    let mut second = serde_json::Map::new();
    second.insert("done".to_owned(), json!(true));
    second.insert("page".to_owned(), json!(2));

    let a = CacheKey::collection("todos", Some(&Value::Object(first))).unwrap();
    let b = CacheKey::collection("todos", Some(&Value::Object(second))).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.canon(), b.canon());
    assert_eq!(a.canon(), r#"["todos","list",{"done":true,"page":2}]"#);
  }

  #[test]
  fn test_nested_params_are_canonicalized_too() {
    let a = CacheKey::collection("todos", Some(&json!({"filter": {"b": 1, "a": 2}}))).unwrap();
    assert_eq!(a.canon(), r#"["todos","list",{"filter":{"a":2,"b":1}}]"#);
  }

  #[test]
  fn test_distinct_params_yield_distinct_keys() {
    let none = CacheKey::collection("todos", None::<&Value>).unwrap();
    let empty = CacheKey::collection("todos", Some(&json!({}))).unwrap();
    let paged = CacheKey::collection("todos", Some(&json!({"page": 1}))).unwrap();
    assert_ne!(none, empty);
    assert_ne!(empty, paged);
  }

  #[test]
  fn test_resource_and_collection_keys_never_collide() {
    let resource = CacheKey::resource("todos", "1");
    let collection = CacheKey::collection("todos", Some(&json!("1"))).unwrap();
    assert_ne!(resource, collection);
    assert_ne!(resource.canon(), collection.canon());
  }

  #[test]
  fn test_storage_hash_is_stable_and_fixed_length() {
    let a = CacheKey::resource("todos", "1").storage_hash();
    let b = CacheKey::resource("todos", "1").storage_hash();
    assert_eq!(a, b);
    assert_eq!(a.len(), 64);
    assert_ne!(a, CacheKey::resource("todos", "2").storage_hash());
  }
}
