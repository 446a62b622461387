//! REST client for the conversion service HTTP endpoints.
//!
//! Wraps the service API (artist listing, multipart job submission,
//! result retrieval) using [`reqwest`], and classifies result
//! responses into [`PollReply`] values for the state machine.

use revox_core::run::PollReply;
use serde::Deserialize;

/// HTTP client for a single conversion service instance.
pub struct ConverterApi {
    client: reqwest::Client,
    base_url: String,
}

/// Response returned by `POST /convert` after successfully queuing a
/// conversion job.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Server-assigned identifier for the queued job.
    pub job_id: String,
}

/// Structured status body returned by `GET /result/{job_id}` while the
/// artifact is not (or never will be) available.
#[derive(Debug, Deserialize)]
struct JobStatusBody {
    status: String,
    #[serde(default)]
    error: Option<String>,
}

/// Errors from the conversion service REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ConverterApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Conversion service error ({status}): {detail}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Human-readable detail, from the error body when present.
        detail: String,
    },

    /// A 2xx response whose body did not have the expected shape.
    #[error("Malformed response from conversion service: {0}")]
    MalformedResponse(String),
}

impl ConverterApi {
    /// Create a new API client for a conversion service.
    ///
    /// * `base_url` - Base HTTP URL, e.g. `http://host:8000`.
    pub fn new(base_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful to carry a configured timeout or connection pool).
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base HTTP URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List the artist models available on the server.
    ///
    /// Sends a `GET /artists` request. The returned list may be empty,
    /// in which case submission is not possible.
    pub async fn list_artists(&self) -> Result<Vec<String>, ConverterApiError> {
        let response = self
            .client
            .get(format!("{}/artists", self.base_url))
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        Ok(response.json::<Vec<String>>().await?)
    }

    /// Submit an audio file for conversion.
    ///
    /// Sends a `POST /convert` request with a multipart body carrying
    /// the `file` part (binary, original filename) and the `artist`
    /// text part. Returns the server-assigned job identifier.
    pub async fn submit_conversion(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        artist: &str,
    ) -> Result<SubmitResponse, ConverterApiError> {
        let form = reqwest::multipart::Form::new()
            .text("artist", artist.to_string())
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string()),
            );

        let response = self
            .client
            .post(format!("{}/convert", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        match serde_json::from_str::<SubmitResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            // A success response without a job_id field is as fatal as
            // a rejected upload.
            Err(_) => Err(ConverterApiError::MalformedResponse(body)),
        }
    }

    /// Fetch the current result of a job and classify the response.
    ///
    /// Sends a `GET /result/{job_id}` request. An audio content type is
    /// definitive and yields [`PollReply::Audio`] with the artifact
    /// bytes; a 2xx JSON body yields [`PollReply::Status`]; anything
    /// else is [`PollReply::Unavailable`] and the caller keeps waiting.
    pub async fn fetch_result(&self, job_id: &str) -> Result<PollReply, ConverterApiError> {
        let response = self
            .client
            .get(format!("{}/result/{}", self.base_url, job_id))
            .send()
            .await?;

        let http_status = response.status().as_u16();
        if !response.status().is_success() {
            return Ok(PollReply::Unavailable {
                http_status: Some(http_status),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if content_type.starts_with("audio") {
            let bytes = response.bytes().await?.to_vec();
            return Ok(PollReply::Audio {
                content_type,
                bytes,
            });
        }

        let body = response.text().await?;
        Ok(classify_status_body(http_status, &body))
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`ConverterApiError::Api`]
    /// carrying the extracted (or synthesized) detail on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ConverterApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = extract_detail(&body).unwrap_or_else(|| {
                format!("Conversion request failed with status: {}", status.as_u16())
            });
            return Err(ConverterApiError::Api {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(response)
    }
}

/// Classify a 2xx non-audio result body.
///
/// An unreadable body is treated like "not ready yet" rather than a
/// hard failure; the attempt budget bounds how long that can go on.
fn classify_status_body(http_status: u16, body: &str) -> PollReply {
    match serde_json::from_str::<JobStatusBody>(body) {
        Ok(parsed) => PollReply::Status {
            status: parsed.status,
            error: parsed.error,
        },
        Err(_) => PollReply::Unavailable {
            http_status: Some(http_status),
        },
    }
}

/// Pull the human-readable `detail` string out of a structured error
/// body, if there is one.
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("detail")?.as_str().map(str::to_string)
}
