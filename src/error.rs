//! Error taxonomy for synchronizer operations and their collaborators.
//!
//! Remote and store failures are wrapped transparently: whatever the
//! transport or backend reported is what the caller sees. Only the two
//! conditions this crate itself detects (a missing resource id, and list
//! params that cannot be canonicalized) get structured variants of their own.

use thiserror::Error;

// ============================================================================
// Collaborator errors
// ============================================================================

/// Failure inside a remote client, carried through to the caller unchanged.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct RemoteError(Box<dyn std::error::Error + Send + Sync>);

impl RemoteError {
  /// Wrap a transport or decoding failure.
  pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
    Self(source.into())
  }

  /// A remote failure carrying only a message.
  pub fn message(msg: impl Into<String>) -> Self {
    Self(msg.into().into())
  }
}

/// Failure inside a cache store backend.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct StoreError(Box<dyn std::error::Error + Send + Sync>);

impl StoreError {
  /// Wrap a backend failure.
  pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
    Self(source.into())
  }

  /// A backend failure carrying only a message.
  pub fn message(msg: impl Into<String>) -> Self {
    Self(msg.into().into())
  }
}

/// List params that could not be canonicalized into a cache key.
#[derive(Debug, Error)]
#[error("cache key for scope {scope:?} could not be built from list params")]
pub struct KeyError {
  /// Scope prefix of the key being built.
  pub scope: String,
  #[source]
  pub source: serde_json::Error,
}

// ============================================================================
// Operation errors
// ============================================================================

/// Errors surfaced by synchronizer operations.
#[derive(Debug, Error)]
pub enum SyncError {
  /// A resource-scoped operation was invoked without a bound id. Raised
  /// before any remote call is attempted.
  #[error("resource id is required for {op}")]
  MissingId {
    /// Operation that needed the id.
    op: &'static str,
  },

  /// Key derivation failed; no remote call was made.
  #[error(transparent)]
  Key(#[from] KeyError),

  /// The remote call was rejected. No cache propagation ran.
  #[error(transparent)]
  Remote(#[from] RemoteError),

  /// A propagation write failed. Writes already committed stay committed;
  /// later writes of the same operation never ran.
  #[error("cache write failed for key {key}")]
  Store {
    /// Canonical form of the key whose write failed.
    key: String,
    #[source]
    source: StoreError,
  },
}

impl SyncError {
  /// True for the identifier-missing rejection.
  pub fn is_missing_id(&self) -> bool {
    matches!(self, SyncError::MissingId { .. })
  }
}
