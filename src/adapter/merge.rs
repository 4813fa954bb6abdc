//! Default merge strategies over plain resource sequences.
//!
//! Adapters whose collections are (or contain) an ordered sequence can build
//! their `upsert` and `remove` on these, sharing the replace-in-place and
//! excise-preserving-order semantics across integrations.

/// Replace the first element whose id matches `resource`, or append it.
///
/// Matched elements are replaced in place, keeping the sequence order.
/// Returns the new sequence and whether an append happened (`false` means an
/// existing element was replaced).
pub fn upsert_by_id<R>(
  resource: R,
  mut items: Vec<R>,
  id_of: impl Fn(&R) -> String,
) -> (Vec<R>, bool) {
  let id = id_of(&resource);
  match items.iter().position(|item| id_of(item) == id) {
    Some(index) => {
      items[index] = resource;
      (items, false)
    }
    None => {
      items.push(resource);
      (items, true)
    }
  }
}

/// Excise every element whose id matches, preserving the order of the rest.
///
/// Sequences without a match come back unchanged. Returns the new sequence
/// and whether anything was removed.
pub fn remove_by_id<R>(
  id: &str,
  mut items: Vec<R>,
  id_of: impl Fn(&R) -> String,
) -> (Vec<R>, bool) {
  let len_before = items.len();
  items.retain(|item| id_of(item) != id);
  let removed = items.len() != len_before;
  (items, removed)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Clone, PartialEq)]
  struct Item {
    id: &'static str,
    value: u32,
  }

  fn item(id: &'static str, value: u32) -> Item {
    Item { id, value }
  }

  fn id_of(item: &Item) -> String {
    item.id.to_owned()
  }

  #[test]
  fn test_upsert_appends_unknown_id_at_the_end() {
    let items = vec![item("1", 1), item("2", 2)];
    let (merged, appended) = upsert_by_id(item("3", 3), items.clone(), id_of);
    assert!(appended);
    assert_eq!(merged.len(), 3);
    assert_eq!(&merged[..2], &items[..]);
    assert_eq!(merged[2], item("3", 3));
  }

  #[test]
  fn test_upsert_replaces_match_in_place() {
    let items = vec![item("1", 1), item("2", 2), item("3", 3)];
    let (merged, appended) = upsert_by_id(item("2", 20), items.clone(), id_of);
    assert!(!appended);
    assert_eq!(merged.len(), items.len());
    assert_eq!(merged[0], items[0]);
    assert_eq!(merged[1], item("2", 20));
    assert_eq!(merged[2], items[2]);
  }

  #[test]
  fn test_remove_without_match_leaves_sequence_unchanged() {
    let items = vec![item("1", 1), item("2", 2)];
    let (kept, removed) = remove_by_id("9", items.clone(), id_of);
    assert!(!removed);
    assert_eq!(kept, items);
  }

  #[test]
  fn test_remove_excises_only_the_match() {
    let items = vec![item("1", 1), item("2", 2), item("3", 3)];
    let (kept, removed) = remove_by_id("2", items, id_of);
    assert!(removed);
    assert_eq!(kept, vec![item("1", 1), item("3", 3)]);
  }
}
