pub(crate) mod huggingface;

use async_trait::async_trait;

use crate::{outcome::UpstreamOutcome, types::UpstreamRequest};

/// An inference service that turns audio into a transcription
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Send one request upstream and classify the answer
    ///
    /// Transport failures are errors; any HTTP answer, successful or not,
    /// is an [`UpstreamOutcome`].
    async fn transcribe(&self, request: UpstreamRequest) -> crate::error::Result<UpstreamOutcome>;

    /// Provider name for logs
    fn name(&self) -> &str;
}
