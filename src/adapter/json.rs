//! Default adapter over plain JSON values.

use serde_json::Value;

use super::{merge, ResourceAdapter};

/// Adapter for resource families whose collection is a plain JSON array and
/// whose identity lives in one field of each resource object.
///
/// The id field defaults to `"id"`. String values are used as-is; any other
/// value renders in its JSON form, so numeric ids work too. Resources
/// missing the field map to the empty id and never match an explicit one.
#[derive(Debug, Clone)]
pub struct JsonAdapter {
  scope: String,
  id_field: String,
}

impl JsonAdapter {
  /// Adapter for `scope` with the default `"id"` field.
  pub fn new(scope: impl Into<String>) -> Self {
    Self {
      scope: scope.into(),
      id_field: "id".to_owned(),
    }
  }

  /// Read the identity from a different field.
  pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
    self.id_field = field.into();
    self
  }
}

impl ResourceAdapter for JsonAdapter {
  type Resource = Value;
  type Collection = Vec<Value>;
  type ListParams = Value;

  fn scope(&self) -> &str {
    &self.scope
  }

  fn id(&self, resource: &Value) -> String {
    match resource.get(&self.id_field) {
      Some(Value::String(id)) => id.clone(),
      Some(other) => other.to_string(),
      None => String::new(),
    }
  }

  fn all(&self, collection: &Vec<Value>) -> Vec<Value> {
    collection.clone()
  }

  fn upsert(&self, resource: Value, collection: Vec<Value>) -> Vec<Value> {
    merge::upsert_by_id(resource, collection, |value| self.id(value)).0
  }

  fn remove(&self, id: &str, collection: Vec<Value>) -> Vec<Value> {
    merge::remove_by_id(id, collection, |value| self.id(value)).0
  }
}
