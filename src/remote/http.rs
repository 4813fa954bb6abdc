//! JSON REST implementation of the remote capability set.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use url::Url;

use crate::adapter::ResourceAdapter;
use crate::error::RemoteError;

use super::{RemoteClient, RemoteResult};

/// Remote client speaking plain JSON REST conventions against one collection
/// endpoint: `GET /` lists, `POST /` creates, and `GET`, `PUT`, `PATCH`,
/// `DELETE /{id}` address single resources. List params become the query
/// string.
///
/// Works with any adapter whose resource is a JSON value and whose
/// collection is a JSON array, [`JsonAdapter`](crate::adapter::JsonAdapter)
/// included. Timeouts and connection policy belong to the injected
/// [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpClient {
  endpoint: Url,
  http: Client,
}

impl HttpClient {
  /// Client for one collection endpoint, e.g. `https://api.example.com/todos`.
  pub fn new(endpoint: Url) -> Self {
    Self {
      endpoint,
      http: Client::new(),
    }
  }

  /// Use a preconfigured [`reqwest::Client`] for timeouts, proxies, or
  /// default headers.
  pub fn with_http(mut self, http: Client) -> Self {
    self.http = http;
    self
  }

  fn resource_url(&self, id: &str) -> RemoteResult<Url> {
    let mut url = self.endpoint.clone();
    url
      .path_segments_mut()
      .map_err(|_| RemoteError::message("endpoint URL cannot address resources by path"))?
      .pop_if_empty()
      .push(id);
    Ok(url)
  }
}

#[async_trait]
impl<A> RemoteClient<A> for HttpClient
where
  A: ResourceAdapter<Resource = Value, Collection = Vec<Value>, ListParams = Value>,
{
  type CreateParams = Value;
  type UpdateParams = Value;
  type PatchParams = Value;

  async fn list(&self, params: Option<&Value>) -> RemoteResult<Vec<Value>> {
    let mut request = self.http.get(self.endpoint.clone());
    if let Some(params) = params {
      request = request.query(params);
    }
    let response = request.send().await.map_err(RemoteError::new)?;
    match into_json(response).await? {
      Value::Array(items) => Ok(items),
      other => Err(RemoteError::message(format!(
        "expected a JSON array from list, got {}",
        json_kind(&other)
      ))),
    }
  }

  async fn create(&self, params: Value) -> RemoteResult<Value> {
    let response = self
      .http
      .post(self.endpoint.clone())
      .json(&params)
      .send()
      .await
      .map_err(RemoteError::new)?;
    into_json(response).await
  }

  async fn view(&self, id: &str) -> RemoteResult<Value> {
    let response = self
      .http
      .get(self.resource_url(id)?)
      .send()
      .await
      .map_err(RemoteError::new)?;
    into_json(response).await
  }

  async fn update(&self, id: &str, params: Value) -> RemoteResult<Value> {
    let response = self
      .http
      .put(self.resource_url(id)?)
      .json(&params)
      .send()
      .await
      .map_err(RemoteError::new)?;
    into_json(response).await
  }

  async fn partial(&self, id: &str, params: Value) -> RemoteResult<Value> {
    let response = self
      .http
      .patch(self.resource_url(id)?)
      .json(&params)
      .send()
      .await
      .map_err(RemoteError::new)?;
    into_json(response).await
  }

  async fn remove(&self, id: &str) -> RemoteResult<()> {
    let response = self
      .http
      .delete(self.resource_url(id)?)
      .send()
      .await
      .map_err(RemoteError::new)?;
    response.error_for_status().map_err(RemoteError::new)?;
    Ok(())
  }
}

async fn into_json(response: Response) -> RemoteResult<Value> {
  let response = response.error_for_status().map_err(RemoteError::new)?;
  response.json().await.map_err(RemoteError::new)
}

/// Human name of a JSON value's shape, for error messages.
fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_resource_url_appends_one_segment() {
    let client = HttpClient::new(Url::parse("https://api.example.com/todos").unwrap());
    let url = client.resource_url("42").unwrap();
    assert_eq!(url.as_str(), "https://api.example.com/todos/42");
  }

  #[test]
  fn test_resource_url_handles_trailing_slash_and_escapes() {
    let client = HttpClient::new(Url::parse("https://api.example.com/todos/").unwrap());
    let url = client.resource_url("a b").unwrap();
    assert_eq!(url.as_str(), "https://api.example.com/todos/a%20b");
  }

  #[test]
  fn test_json_kind_names_shapes() {
    assert_eq!(json_kind(&Value::Null), "null");
    assert_eq!(json_kind(&serde_json::json!({"a": 1})), "an object");
  }
}
