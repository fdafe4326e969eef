//! Resource Client: one HTTP round trip per call, envelope unwrapped.
//!
//! Calls are attempted exactly once. There is no caching and no dedup of identical concurrent
//! calls; callers decide whether and how to present or retry a failure.

use crate::config::CoreConfig;
use crate::envelope::{rejection, unwrap_item, unwrap_list};
use crate::export::{ExportBlob, ExportQuery};
use crate::resource::{ActionMethod, ActionSpec, Resource};
use crate::{OpsError, OpsResult};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;
use std::marker::PhantomData;

/// Backend operations for one resource collection.
#[async_trait]
pub trait ResourceApi<R: Resource>: Send + Sync {
    /// Fetch the whole collection.
    async fn list(&self) -> OpsResult<Vec<R>>;

    /// Read the current server copy of one record.
    ///
    /// The default lists the collection and picks the record out, which is what the hospital
    /// pages do before a guarded transition.
    async fn fetch(&self, id: &str) -> OpsResult<Option<R>> {
        let records = self.list().await?;
        Ok(records.into_iter().find(|r| r.id() == id))
    }

    async fn create(&self, payload: &Value) -> OpsResult<R>;

    async fn update(&self, id: &str, payload: &Value) -> OpsResult<R>;

    async fn remove(&self, id: &str) -> OpsResult<()>;

    /// Issue a status-transition action and return the updated record.
    async fn perform(
        &self,
        id: &str,
        action: &ActionSpec<R::Status>,
        payload: &Value,
    ) -> OpsResult<R>;

    /// Download a server-rendered export of the collection.
    async fn export(&self, query: &ExportQuery) -> OpsResult<ExportBlob>;
}

/// Shared HTTP plumbing: base URL, bearer token and the pooled reqwest client.
#[derive(Clone, Debug)]
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpClient {
    pub fn new(cfg: &CoreConfig) -> OpsResult<Self> {
        let inner = reqwest::Client::builder()
            .timeout(cfg.request_timeout())
            .build()
            .map_err(OpsError::Transport)?;

        Ok(Self {
            inner,
            base_url: cfg.api_base_url().to_string(),
            auth_token: cfg.auth_token().map(str::to_string),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join `path` onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.inner.request(method, self.url(path));
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> OpsResult<Response> {
        let response = builder.send().await.map_err(OpsError::Transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        Err(rejection(status.as_u16(), &body))
    }

    async fn send_json(&self, builder: RequestBuilder) -> OpsResult<Value> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await.map_err(OpsError::Transport)?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| OpsError::Decode(e.to_string()))
    }
}

/// [`ResourceApi`] over the hospital REST backend.
pub struct HttpResourceClient<R> {
    http: HttpClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for HttpResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> HttpResourceClient<R> {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            _resource: PhantomData,
        }
    }

    fn item_path(id: &str) -> String {
        format!("{}/{}", R::COLLECTION_PATH, id)
    }
}

#[async_trait]
impl<R: Resource> ResourceApi<R> for HttpResourceClient<R> {
    async fn list(&self) -> OpsResult<Vec<R>> {
        tracing::debug!("GET {}", R::COLLECTION_PATH);
        let body = self
            .http
            .send_json(self.http.request(Method::GET, R::COLLECTION_PATH))
            .await?;
        unwrap_list(body)
    }

    async fn create(&self, payload: &Value) -> OpsResult<R> {
        tracing::debug!("POST {}", R::COLLECTION_PATH);
        let body = self
            .http
            .send_json(self.http.request(Method::POST, R::COLLECTION_PATH).json(payload))
            .await?;
        unwrap_item(body)
    }

    async fn update(&self, id: &str, payload: &Value) -> OpsResult<R> {
        let path = Self::item_path(id);
        tracing::debug!("PUT {}", path);
        let body = self
            .http
            .send_json(self.http.request(Method::PUT, &path).json(payload))
            .await?;
        unwrap_item(body)
    }

    async fn remove(&self, id: &str) -> OpsResult<()> {
        let path = Self::item_path(id);
        tracing::debug!("DELETE {}", path);
        self.http
            .send(self.http.request(Method::DELETE, &path))
            .await?;
        Ok(())
    }

    async fn perform(
        &self,
        id: &str,
        action: &ActionSpec<R::Status>,
        payload: &Value,
    ) -> OpsResult<R> {
        let path = format!("{}/{}", Self::item_path(id), action.name);
        let method = match action.method {
            ActionMethod::Post => Method::POST,
            ActionMethod::Put => Method::PUT,
        };
        tracing::debug!("{} {}", method, path);
        let body = self
            .http
            .send_json(self.http.request(method, &path).json(payload))
            .await?;
        unwrap_item(body)
    }

    async fn export(&self, query: &ExportQuery) -> OpsResult<ExportBlob> {
        if !R::SUPPORTS_EXPORT {
            return Err(OpsError::InvalidInput(format!(
                "{} records cannot be exported",
                R::LABEL
            )));
        }

        let path = format!("{}/export", R::COLLECTION_PATH);
        tracing::debug!("GET {} {:?}", path, query.params());
        let response = self
            .http
            .send(self.http.request(Method::GET, &path).query(&query.params()))
            .await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| query.format.content_type().to_string());
        let bytes = response.bytes().await.map_err(OpsError::Transport)?;

        Ok(ExportBlob::new::<R>(query.format, content_type, bytes.to_vec()))
    }
}
