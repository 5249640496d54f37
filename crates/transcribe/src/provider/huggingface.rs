use async_trait::async_trait;
use reqwest::{Client, header};
use secrecy::ExposeSecret;
use url::Url;

use crate::{error::RelayError, outcome::UpstreamOutcome, types::UpstreamRequest};

use super::TranscriptionProvider;

/// Hosted inference API addressed as `<base>/<model id>`
pub(crate) struct HuggingFaceProvider {
    client: Client,
    base_url: Url,
}

impl HuggingFaceProvider {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn model_url(&self, model: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            model.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl TranscriptionProvider for HuggingFaceProvider {
    async fn transcribe(&self, request: UpstreamRequest) -> crate::error::Result<UpstreamOutcome> {
        let url = self.model_url(&request.model);

        tracing::debug!(
            url = %url,
            bytes = request.audio.len(),
            content_type = %request.content_type,
            "sending audio upstream"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(request.api_token.expose_secret())
            .header(header::CONTENT_TYPE, &request.content_type)
            .header(header::ACCEPT, "application/json")
            .body(request.audio)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        tracing::debug!(%status, bytes = body.len(), "upstream responded");

        Ok(UpstreamOutcome::decode(status, &body))
    }

    fn name(&self) -> &str {
        "huggingface"
    }
}

fn transport_error(err: reqwest::Error) -> RelayError {
    if err.is_timeout() {
        RelayError::Timeout
    } else {
        RelayError::Internal(format!("request to transcription service failed: {err}"))
    }
}
