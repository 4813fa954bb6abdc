//! External cache store contract and reference backends.
//!
//! The synchronizer never owns cache entries; it issues writes against a
//! store that does. A write targets one key and is either a literal value or
//! an updater over the previous value. Stores index entries by the key's
//! canonical string form.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::StoreError;
use crate::key::CacheKey;

/// One write against one cache key.
pub enum WriteOp<V> {
  /// Store this value, replacing whatever the key held.
  Set(V),
  /// Derive the new value from the previous one. Returning `None` leaves
  /// the entry exactly as it was; in particular, absent entries stay absent
  /// and observers are not notified.
  Update(Box<dyn FnOnce(Option<V>) -> Option<V> + Send>),
}

impl<V> WriteOp<V> {
  /// Updater-form write from a closure.
  pub fn update(f: impl FnOnce(Option<V>) -> Option<V> + Send + 'static) -> Self {
    WriteOp::Update(Box::new(f))
  }

  /// `"set"` or `"update"`, for diagnostics.
  pub fn kind(&self) -> &'static str {
    match self {
      WriteOp::Set(_) => "set",
      WriteOp::Update(_) => "update",
    }
  }
}

/// Flags attached to a single cache write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteOptions {
  /// Suppress any refetch a reactive layer would otherwise schedule for
  /// this write. Propagation writes always set this: the value being
  /// written came from the remote moments ago.
  pub suppress_refetch: bool,
}

impl WriteOptions {
  /// Options for propagation writes. Fresh data, no refetch wanted.
  pub fn no_refetch() -> Self {
    Self { suppress_refetch: true }
  }
}

/// A key-value cache owning the entries the synchronizer maintains.
///
/// Updater-form writes must observe the previous value atomically with
/// respect to other writers of the same key. Nothing here schedules fetches;
/// backends bridged to a reactive fetch layer decide what the refetch flag
/// means for them.
#[async_trait]
pub trait CacheStore<V: Send + 'static>: Send + Sync {
  /// Backend name for diagnostics, e.g. `"memory"` or `"sqlite"`.
  fn name(&self) -> &'static str;

  /// Current value at `key`; `None` when the key was never written.
  async fn read(&self, key: &CacheKey) -> Result<Option<V>, StoreError>;

  /// Commit one write against `key`.
  async fn write(&self, key: &CacheKey, op: WriteOp<V>, opts: WriteOptions)
    -> Result<(), StoreError>;
}

/// Observation side of a store: a live view over one key.
///
/// Passive reads and re-render triggers hang off this. The synchronizer core
/// never subscribes; bindings do.
pub trait Subscribe<V> {
  /// Watch the value at `key`. The receiver starts at the current value
  /// (`None` when never written) and sees every committed change.
  fn subscribe(&self, key: &CacheKey) -> Result<watch::Receiver<Option<V>>, StoreError>;
}
