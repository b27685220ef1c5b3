//! REST client for one resource endpoint family
//!
//! Maps the five [`RemoteResource`] calls onto `GET/POST/PUT/DELETE` against
//! `{base}/{path}` and `{base}/{path}/{id}`. Non-success statuses become
//! [`TransportError::Status`], using the backend's `detail` field when the
//! error body carries one.

use std::fmt::Display;
use std::future::Future;
use std::marker::PhantomData;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::{Entity, RemoteResource, TransportError};

/// Build the shared HTTP client for all resources
pub fn http_client(config: &ApiConfig) -> Result<Client, TransportError> {
    Client::builder()
        .timeout(config.timeout())
        .user_agent(concat!("geowatch/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(network)
}

/// HTTP-backed [`RemoteResource`]
///
/// `T` is the entity type, `D` the draft sent on create.
pub struct HttpResource<T, D> {
    client: Client,
    endpoint: String,
    _marker: PhantomData<fn() -> (T, D)>,
}

impl<T, D> Clone for HttpResource<T, D> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, D> std::fmt::Debug for HttpResource<T, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResource")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl<T, D> HttpResource<T, D> {
    pub fn new(client: Client, config: &ApiConfig, path: &str) -> Self {
        Self {
            client,
            endpoint: config.endpoint(path),
            _marker: PhantomData,
        }
    }

    /// Collection URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// URL of one entity, or of a nested path below it
    pub fn item_url(&self, id: &impl Display, nested: Option<&str>) -> String {
        let id = id.to_string();
        let id = urlencoding::encode(&id);
        match nested {
            Some(nested) => format!("{}/{}/{}", self.endpoint, id, nested),
            None => format!("{}/{}", self.endpoint, id),
        }
    }

    /// `GET` an arbitrary JSON document below this resource
    pub(crate) fn get_json<O>(
        &self,
        url: String,
    ) -> impl Future<Output = Result<O, TransportError>> + Send
    where
        O: DeserializeOwned + Send,
    {
        send_json(self.client.get(url))
    }
}

impl<T, D> RemoteResource for HttpResource<T, D>
where
    T: Entity + Serialize + DeserializeOwned,
    D: Serialize + Send + Sync,
{
    type Entity = T;
    type Draft = D;

    fn list(&self) -> impl Future<Output = Result<Vec<T>, TransportError>> + Send {
        send_json(self.client.get(&self.endpoint))
    }

    fn create(&self, draft: &D) -> impl Future<Output = Result<T, TransportError>> + Send {
        send_json(self.client.post(&self.endpoint).json(draft))
    }

    fn get(&self, id: &T::Id) -> impl Future<Output = Result<T, TransportError>> + Send {
        send_json(self.client.get(self.item_url(id, None)))
    }

    fn update(&self, entity: &T) -> impl Future<Output = Result<T, TransportError>> + Send {
        send_json(
            self.client
                .put(self.item_url(entity.id(), None))
                .json(entity),
        )
    }

    fn delete(&self, id: &T::Id) -> impl Future<Output = Result<(), TransportError>> + Send {
        let request = self.client.delete(self.item_url(id, None));
        async move {
            let response = request.send().await.map_err(network)?;
            check_status(response).await.map(drop)
        }
    }
}

async fn send_json<O: DeserializeOwned>(request: RequestBuilder) -> Result<O, TransportError> {
    let response = request.send().await.map_err(network)?;
    let response = check_status(response).await?;
    response
        .json::<O>()
        .await
        .map_err(|e| TransportError::Decode(e.to_string()))
}

async fn check_status(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), body = %body, "Backend returned an error");
    let fallback = status.canonical_reason().unwrap_or("unknown error");
    Err(TransportError::Status {
        status: status.as_u16(),
        message: error_detail(&body).unwrap_or_else(|| fallback.to_string()),
    })
}

/// Error body shape used by the backend (`{"detail": ...}`)
#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

fn error_detail(body: &str) -> Option<String> {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => Some(detail),
        // Validation errors carry a structured detail; keep it as JSON text
        Ok(ErrorBody { detail }) => Some(detail.to_string()),
        Err(_) => {
            let body = body.trim();
            (!body.is_empty()).then(|| body.to_string())
        }
    }
}

fn network(err: reqwest::Error) -> TransportError {
    TransportError::Network(err.to_string())
}
