//! HTTP transport implementation.
//!
//! Talks to the remote service over JSON with `reqwest`. Every request
//! carries the revision header and the bearer credential. Dropping a
//! pending call drops the underlying `reqwest` future, which aborts the
//! request.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::transport::RemoteService;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use todo_sync_protocol::{
    bearer, ElementRequest, ElementResponse, Endpoint, HttpMethod, ItemNetworkModel,
    ListRequest, ListResponse, AUTHORIZATION_HEADER, REVISION_HEADER, STATUS_OK,
};

/// HTTP-based remote service.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpTransport {
    /// Creates a transport for the service described by `config`.
    ///
    /// # Errors
    ///
    /// Returns a non-retryable transport error if the client cannot be built.
    pub fn new(config: &SyncConfig) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SyncError::transport_fatal(e.to_string()))?;
        Ok(Self::with_client(client, &config.base_url, &config.token))
    }

    /// Creates a transport around an existing client.
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds a request for `endpoint` with the standard headers.
    fn request(&self, endpoint: &Endpoint, revision: i64) -> reqwest::RequestBuilder {
        let method = match endpoint.method() {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        self.client
            .request(method, endpoint.url(&self.base_url))
            .header(REVISION_HEADER, revision.to_string())
            .header(AUTHORIZATION_HEADER, bearer(&self.token))
    }

    async fn call<Req, Res>(
        &self,
        endpoint: Endpoint,
        revision: i64,
        body: Option<&Req>,
    ) -> SyncResult<Res>
    where
        Req: Serialize + Sync,
        Res: DeserializeOwned + Send,
    {
        let mut builder = self.request(&endpoint, revision);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        tracing::debug!(%endpoint, revision, "sending request");
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(SyncError::Http {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        if bytes.is_empty() {
            return Err(SyncError::Protocol(format!("{endpoint}: empty response body")));
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| SyncError::Protocol(format!("{endpoint}: invalid response: {e}")))
    }

    async fn element<Req>(
        &self,
        endpoint: Endpoint,
        revision: i64,
        body: Option<&Req>,
    ) -> SyncResult<ElementResponse>
    where
        Req: Serialize + Sync,
    {
        let response: ElementResponse = self.call(endpoint.clone(), revision, body).await?;
        expect_ok(&response.status, &endpoint)?;
        Ok(response)
    }
}

fn transport_error(err: reqwest::Error) -> SyncError {
    if err.is_builder() {
        SyncError::transport_fatal(err.to_string())
    } else {
        SyncError::transport_retryable(err.to_string())
    }
}

/// Rejects responses whose `status` is not `ok`.
fn expect_ok(status: &str, endpoint: &Endpoint) -> SyncResult<()> {
    if status == STATUS_OK {
        Ok(())
    } else {
        Err(SyncError::Protocol(format!(
            "{endpoint}: unexpected status {status:?}"
        )))
    }
}

#[async_trait]
impl RemoteService for HttpTransport {
    async fn list(&self, revision: i64) -> SyncResult<ListResponse> {
        let endpoint = Endpoint::List;
        let response: ListResponse = self.call::<(), _>(endpoint.clone(), revision, None).await?;
        expect_ok(&response.status, &endpoint)?;
        Ok(response)
    }

    async fn update(
        &self,
        revision: i64,
        list: Vec<ItemNetworkModel>,
    ) -> SyncResult<ListResponse> {
        let endpoint = Endpoint::Update;
        let body = ListRequest { list };
        let response: ListResponse = self.call(endpoint.clone(), revision, Some(&body)).await?;
        expect_ok(&response.status, &endpoint)?;
        Ok(response)
    }

    async fn get(&self, revision: i64, id: &str) -> SyncResult<ElementResponse> {
        self.element::<()>(Endpoint::Get(id.to_string()), revision, None)
            .await
    }

    async fn add(&self, revision: i64, element: ItemNetworkModel) -> SyncResult<ElementResponse> {
        let body = ElementRequest { element };
        self.element(Endpoint::Add, revision, Some(&body)).await
    }

    async fn edit(
        &self,
        revision: i64,
        element: ItemNetworkModel,
    ) -> SyncResult<ElementResponse> {
        let endpoint = Endpoint::Edit(element.id.clone());
        let body = ElementRequest { element };
        self.element(endpoint, revision, Some(&body)).await
    }

    async fn remove(&self, revision: i64, id: &str) -> SyncResult<ElementResponse> {
        self.element::<()>(Endpoint::Remove(id.to_string()), revision, None)
            .await
    }
}
