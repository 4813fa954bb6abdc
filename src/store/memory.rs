//! In-memory store backed by one watch channel per key.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::StoreError;
use crate::key::CacheKey;

use super::{CacheStore, Subscribe, WriteOp, WriteOptions};

/// Reference in-memory backend.
///
/// Every key owns a watch channel holding its current value. Subscribing
/// hands out a receiver on that channel, so observers see the present value
/// immediately and every committed change after it. Updater writes that
/// decline to change anything notify nobody.
///
/// Writes to one key run under the map lock, which makes updaters atomic per
/// key. The store never fetches, so the refetch flag has no effect here.
pub struct MemoryStore<V> {
  channels: Mutex<HashMap<String, watch::Sender<Option<V>>>>,
}

impl<V> MemoryStore<V> {
  pub fn new() -> Self {
    Self {
      channels: Mutex::new(HashMap::new()),
    }
  }
}

impl<V> Default for MemoryStore<V> {
  fn default() -> Self {
    Self::new()
  }
}

impl<V: Clone + Send + Sync + 'static> MemoryStore<V> {
  fn with_channel<T>(
    &self,
    key: &CacheKey,
    f: impl FnOnce(&watch::Sender<Option<V>>) -> T,
  ) -> Result<T, StoreError> {
    let mut channels = self
      .channels
      .lock()
      .map_err(|e| StoreError::message(format!("store lock poisoned: {}", e)))?;
    let sender = channels
      .entry(key.canon())
      .or_insert_with(|| watch::channel(None).0);
    Ok(f(sender))
  }
}

#[async_trait]
impl<V: Clone + Send + Sync + 'static> CacheStore<V> for MemoryStore<V> {
  fn name(&self) -> &'static str {
    "memory"
  }

  async fn read(&self, key: &CacheKey) -> Result<Option<V>, StoreError> {
    let channels = self
      .channels
      .lock()
      .map_err(|e| StoreError::message(format!("store lock poisoned: {}", e)))?;
    Ok(channels.get(&key.canon()).and_then(|sender| sender.borrow().clone()))
  }

  async fn write(
    &self,
    key: &CacheKey,
    op: WriteOp<V>,
    _opts: WriteOptions,
  ) -> Result<(), StoreError> {
    self.with_channel(key, |sender| match op {
      WriteOp::Set(value) => {
        sender.send_replace(Some(value));
      }
      WriteOp::Update(f) => {
        sender.send_if_modified(|slot| match f(slot.clone()) {
          Some(next) => {
            *slot = Some(next);
            true
          }
          None => false,
        });
      }
    })
  }
}

impl<V: Clone + Send + Sync + 'static> Subscribe<V> for MemoryStore<V> {
  fn subscribe(&self, key: &CacheKey) -> Result<watch::Receiver<Option<V>>, StoreError> {
    self.with_channel(key, |sender| sender.subscribe())
  }
}
