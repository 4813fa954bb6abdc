//! Remote client capability set: the operations a backend must offer.

mod http;

pub use http::HttpClient;

use async_trait::async_trait;

use crate::adapter::ResourceAdapter;
use crate::error::RemoteError;

/// Outcome of one remote round trip.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// The six remote operations the synchronizer composes with cache
/// propagation.
///
/// Every method may suspend for a network round trip and may fail;
/// rejections reach the synchronizer's caller unchanged. Retry,
/// deduplication, and timeouts are the implementation's own business and
/// nothing downstream adds them.
#[async_trait]
pub trait RemoteClient<A: ResourceAdapter>: Send + Sync {
  /// Payload creating a new resource.
  type CreateParams: Send + Sync + 'static;
  /// Full-replacement payload for `update`.
  type UpdateParams: Send + Sync + 'static;
  /// Partial payload for `partial`.
  type PatchParams: Send + Sync + 'static;

  /// Fetch the collection view for `params`.
  async fn list(&self, params: Option<&A::ListParams>) -> RemoteResult<A::Collection>;

  /// Create a resource; returns it with its server-assigned identity.
  async fn create(&self, params: Self::CreateParams) -> RemoteResult<A::Resource>;

  /// Fetch one resource by id.
  async fn view(&self, id: &str) -> RemoteResult<A::Resource>;

  /// Replace one resource; returns the stored result.
  async fn update(&self, id: &str, params: Self::UpdateParams) -> RemoteResult<A::Resource>;

  /// Patch one resource; returns the stored result.
  async fn partial(&self, id: &str, params: Self::PatchParams) -> RemoteResult<A::Resource>;

  /// Delete one resource. Success carries no body.
  async fn remove(&self, id: &str) -> RemoteResult<()>;
}
