use crate::endpoint::api_url;
use crate::{Error, Result};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::time::Duration;
use tracing::debug;
use tryll_types::{ChunkDetail, FeedbackRecord, ServerConfig};

/// HTTP side-channel of the chat backend.
///
/// Every call returns an owned future so the controller can spawn it and
/// keep processing events while the request is in flight.
pub trait ChatApi: Send + Sync {
    /// `GET /config`
    fn fetch_config(&self) -> BoxFuture<'static, Result<ServerConfig>>;

    /// `GET /chunks?ids=a,b,c`
    fn fetch_chunks(&self, ids: Vec<String>) -> BoxFuture<'static, Result<Vec<ChunkDetail>>>;

    /// `POST /feedback`
    fn submit_feedback(&self, record: FeedbackRecord) -> BoxFuture<'static, Result<()>>;
}

/// `reqwest`-backed client for the chat API
#[derive(Debug, Clone)]
pub struct HttpChatApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpChatApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /chunks` with the ids comma-joined into one encoded `ids` parameter
    fn chunks_request(&self, ids: &[String]) -> Result<reqwest::Request> {
        Ok(self
            .http
            .get(api_url(&self.base_url, "chunks"))
            .query(&[("ids", ids.join(","))])
            .build()?)
    }
}

impl ChatApi for HttpChatApi {
    fn fetch_config(&self) -> BoxFuture<'static, Result<ServerConfig>> {
        let http = self.http.clone();
        let url = api_url(&self.base_url, "config");
        get_config(http, url).boxed()
    }

    fn fetch_chunks(&self, ids: Vec<String>) -> BoxFuture<'static, Result<Vec<ChunkDetail>>> {
        match self.chunks_request(&ids) {
            Ok(request) => get_chunks(self.http.clone(), request).boxed(),
            Err(err) => futures::future::ready(Err(err)).boxed(),
        }
    }

    fn submit_feedback(&self, record: FeedbackRecord) -> BoxFuture<'static, Result<()>> {
        let http = self.http.clone();
        let url = api_url(&self.base_url, "feedback");
        post_feedback(http, url, record).boxed()
    }
}

async fn get_config(http: reqwest::Client, url: String) -> Result<ServerConfig> {
    debug!(url = %url, "fetching server config");
    let resp = http.get(&url).send().await?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(Error::Request(format!("GET {} failed ({}): {}", url, status, text)));
    }

    let config: ServerConfig = resp.json().await?;
    if let Some(err) = config.error() {
        return Err(Error::Request(format!("server config unavailable: {}", err)));
    }
    Ok(config)
}

async fn get_chunks(http: reqwest::Client, request: reqwest::Request) -> Result<Vec<ChunkDetail>> {
    let url = request.url().to_string();
    debug!(url = %url, "fetching chunk details");
    let resp = http.execute(request).await?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(Error::Request(format!("GET {} failed ({}): {}", url, status, text)));
    }

    Ok(resp.json().await?)
}

async fn post_feedback(http: reqwest::Client, url: String, record: FeedbackRecord) -> Result<()> {
    debug!(url = %url, kind = record.feedback_type.as_str(), "submitting feedback");
    let resp = http.post(&url).json(&record).send().await?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(Error::Request(format!("POST {} failed ({}): {}", url, status, text)));
    }
    Ok(())
}
