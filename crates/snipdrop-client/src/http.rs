//! REST client for the snippet service.
//!
//! Every call maps transport failures to `SyncError::Connection`, non-success
//! statuses to `SyncError::Remote` and undecodable bodies to
//! `SyncError::Serialization`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use snipdrop_core::{
    Category, Classification, ConnectionContext, LineRange, Seed, Snippet, SnapshotOptions,
    SnippetService, SyncError, TrackedApplication,
};
use tracing::{debug, instrument};

#[derive(Serialize)]
struct ConnectRequest<'a> {
    application: &'a TrackedApplication,
}

#[derive(Deserialize)]
struct SnapshotResponse {
    #[serde(default)]
    iterable: Vec<Snippet>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSnippetRequest<'a> {
    application: &'a TrackedApplication,
    text: &'a str,
    name: Option<&'a str>,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    classification: Option<Classification>,
    file_path: Option<&'a str>,
    line_range: LineRange,
    mechanism: &'static str,
}

#[derive(Serialize)]
struct ReclassifyRequest<'a> {
    asset: &'a str,
    ext: &'a Category,
}

/// Snippet service client over HTTP/JSON.
pub struct HttpSnippetService {
    http: Client,
    base_url: String,
}

impl HttpSnippetService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SyncError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Connection(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check the status and decode a JSON body.
    async fn read_json<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T, SyncError> {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| SyncError::Connection(format!("Failed to read {} response: {}", what, e)))?;

        if !status.is_success() {
            return Err(SyncError::Remote(format!("{} returned {}: {}", what, status, body)));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl SnippetService for HttpSnippetService {
    #[instrument(skip(self), level = "debug")]
    async fn connect(&self, identity: TrackedApplication) -> Result<ConnectionContext, SyncError> {
        let resp = self
            .http
            .post(self.url("/connect"))
            .json(&ConnectRequest {
                application: &identity,
            })
            .send()
            .await
            .map_err(|e| SyncError::Connection(format!("Connect request failed: {}", e)))?;

        let context: ConnectionContext = Self::read_json(resp, "connect").await?;
        debug!("Connected as {:?} on {:?}", context.application.name, context.application.platform);
        Ok(context)
    }

    #[instrument(skip(self), level = "debug")]
    async fn snapshot(&self, options: SnapshotOptions) -> Result<Vec<Snippet>, SyncError> {
        let resp = self
            .http
            .get(self.url("/assets"))
            .query(&[
                ("transferables", options.transferables),
                ("suggested", options.suggested),
                ("pseudo", options.pseudo),
            ])
            .send()
            .await
            .map_err(|e| SyncError::Connection(format!("Snapshot request failed: {}", e)))?;

        let snapshot: SnapshotResponse = Self::read_json(resp, "snapshot").await?;
        debug!("Snapshot returned {} snippets", snapshot.iterable.len());
        Ok(snapshot.iterable)
    }

    #[instrument(skip(self, context, seed), level = "debug", fields(text_len = seed.text.len()))]
    async fn create_snippet(
        &self,
        context: &ConnectionContext,
        seed: &Seed,
    ) -> Result<Snippet, SyncError> {
        let request = CreateSnippetRequest {
            application: &context.application,
            text: &seed.text,
            name: seed.name.as_deref(),
            description: &seed.description,
            classification: seed.classification(),
            file_path: seed.file_path.as_deref(),
            line_range: seed.line_range,
            mechanism: "MANUAL",
        };

        let resp = self
            .http
            .post(self.url("/assets/create"))
            .query(&[("transferables", true)])
            .json(&request)
            .send()
            .await
            .map_err(|e| SyncError::Connection(format!("Create request failed: {}", e)))?;

        let snippet: Snippet = Self::read_json(resp, "create").await?;
        debug!("Created snippet {}", snippet.id);
        Ok(snippet)
    }

    #[instrument(skip(self), level = "debug")]
    async fn reclassify(&self, snippet_id: &str, category: &Category) -> Result<Snippet, SyncError> {
        let resp = self
            .http
            .post(self.url("/asset/reclassify"))
            .query(&[("transferables", false)])
            .json(&ReclassifyRequest {
                asset: snippet_id,
                ext: category,
            })
            .send()
            .await
            .map_err(|e| SyncError::Connection(format!("Reclassify request failed: {}", e)))?;

        let snippet: Snippet = Self::read_json(resp, "reclassify").await?;
        debug!("Reclassified snippet {} as {}", snippet.id, category);
        Ok(snippet)
    }
}
