//! Client for the auxiliary file-retrieval endpoint.
//!
//! Some platform clients hand out only local file references for
//! attachments and voice messages. A side-channel HTTP service resolves
//! those references to base64 payloads.

use crate::{ForwardError, Result};
use mirrorbot_core::config::FileApi;
use mirrorbot_core::SecretString;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// Output format requested for voice messages.
pub const VOICE_FORMAT: &str = "ogg";

/// Auxiliary file endpoint client.
#[derive(Debug, Clone)]
pub struct FileApiClient {
    client: reqwest::Client,
    endpoint: Url,
    token: SecretString,
}

/// Response envelope of every auxiliary operation.
#[derive(Debug, Clone, Deserialize)]
pub struct FileApiResponse {
    /// `"ok"` on success.
    pub status: String,

    /// Payload, present on success.
    #[serde(default)]
    pub data: Option<FilePayload>,
}

/// Payload of a successful retrieval.
#[derive(Debug, Clone, Deserialize)]
pub struct FilePayload {
    /// File content, base64-encoded.
    #[serde(default)]
    pub base64: Option<String>,

    /// File size in bytes, reported for voice messages.
    #[serde(default)]
    pub file_size: Option<u64>,
}

impl FileApiResponse {
    /// Whether the endpoint reported success.
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// The base64 payload of a successful response.
    pub fn into_base64(self) -> Result<String> {
        if !self.is_ok() {
            return Err(ForwardError::FileApi(format!("status '{}'", self.status)));
        }
        self.data
            .and_then(|d| d.base64)
            .ok_or_else(|| ForwardError::FileApi("response carries no payload".to_string()))
    }
}

#[derive(Serialize)]
struct GetFileRequest<'a> {
    file_id: &'a str,
}

#[derive(Serialize)]
struct GetRecordRequest<'a> {
    file: &'a str,
    out_format: &'a str,
}

impl FileApiClient {
    /// Create a client for a configured endpoint.
    pub fn new(client: reqwest::Client, api: &FileApi) -> Self {
        Self {
            client,
            endpoint: api.endpoint.clone(),
            token: api.token.clone(),
        }
    }

    /// Base URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Retrieve an attachment by platform file id.
    pub async fn get_file(&self, file_id: &str) -> Result<FileApiResponse> {
        self.call("get_file", &GetFileRequest { file_id }).await
    }

    /// Retrieve a voice message by file reference, converted to `out_format`.
    pub async fn get_record(&self, file: &str, out_format: &str) -> Result<FileApiResponse> {
        self.call("get_record", &GetRecordRequest { file, out_format })
            .await
    }

    async fn call<B: Serialize + ?Sized>(
        &self,
        operation: &str,
        body: &B,
    ) -> Result<FileApiResponse> {
        let url = format!(
            "{}/{}",
            self.endpoint.as_str().trim_end_matches('/'),
            operation
        );
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.token.expose_secret())
            .json(body)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<FileApiResponse>().await?)
    }
}
