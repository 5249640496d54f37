use jiff::Timestamp;
use scribe_config::UploadConfig;
use secrecy::SecretString;

use crate::{
    error::{RelayError, Result},
    http_client::http_client,
    media,
    models::ModelCatalog,
    provider::{TranscriptionProvider, huggingface::HuggingFaceProvider},
    request::{FORM_OVERHEAD_BYTES, UploadedFile},
    types::{TranscriptionMetadata, TranscriptionResult, UpstreamRequest},
};

/// Relay between uploaded audio and the inference provider
///
/// Holds only read-only state; one instance serves every request.
pub struct Server {
    provider: Box<dyn TranscriptionProvider>,
    catalog: ModelCatalog,
    api_token: Option<SecretString>,
    upload: UploadConfig,
}

impl Server {
    /// Assemble a server from its parts
    ///
    /// Use [`TranscribeServerBuilder`] to build one from configuration.
    pub fn new(
        provider: Box<dyn TranscriptionProvider>,
        catalog: ModelCatalog,
        api_token: Option<SecretString>,
        upload: UploadConfig,
    ) -> Self {
        Self {
            provider,
            catalog,
            api_token,
            upload,
        }
    }

    /// Selectable models
    pub const fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Upload intake settings
    pub const fn upload_config(&self) -> &UploadConfig {
        &self.upload
    }

    /// Request body limit for the upload route
    pub(crate) fn body_limit(&self) -> usize {
        usize::try_from(self.upload.max_bytes.saturating_add(FORM_OVERHEAD_BYTES)).unwrap_or(usize::MAX)
    }

    /// Transcribe a staged upload with the model named by `model_key`
    ///
    /// Makes at most one upstream call. The staged file is owned here and is
    /// removed before this returns, on success and on every error.
    pub async fn transcribe(&self, upload: UploadedFile, model_key: Option<&str>) -> Result<TranscriptionResult> {
        let model = self.catalog.resolve(model_key).to_string();

        let Some(api_token) = self.api_token.clone() else {
            return Err(RelayError::MissingCredential);
        };

        let content_type = media::resolve_content_type(upload.declared_content_type(), upload.filename());

        let audio = upload
            .read()
            .await
            .map_err(|e| RelayError::Internal(format!("failed to read uploaded file: {e}")))?;

        let filename = upload.filename().to_string();
        let size = upload.size();

        // The bytes are in memory from here on
        upload.discard().await;

        tracing::info!(
            provider = self.provider.name(),
            model = %model,
            filename = %filename,
            size,
            content_type = %content_type,
            "transcribing upload"
        );

        let outcome = self
            .provider
            .transcribe(UpstreamRequest {
                model: model.clone(),
                audio,
                content_type: content_type.clone(),
                api_token,
            })
            .await?;

        let transcription = outcome.into_result()?;

        tracing::info!(model = %model, filename = %filename, "transcription complete");

        Ok(TranscriptionResult {
            success: true,
            transcription,
            metadata: TranscriptionMetadata {
                model,
                filename,
                size,
                content_type,
                timestamp: Timestamp::now(),
            },
        })
    }
}

/// Builder for constructing the relay from configuration
pub struct TranscribeServerBuilder<'a> {
    config: &'a scribe_config::Config,
}

impl<'a> TranscribeServerBuilder<'a> {
    pub const fn new(config: &'a scribe_config::Config) -> Self {
        Self { config }
    }

    pub fn build(self) -> Result<Server> {
        let transcription = &self.config.transcription;

        let catalog = ModelCatalog::from_config(transcription)?;

        let client = http_client(transcription.timeout())
            .map_err(|e| RelayError::Configuration(format!("failed to build HTTP client: {e}")))?;

        let provider = HuggingFaceProvider::new(client, transcription.base_url.clone());

        tracing::debug!(
            base_url = %transcription.base_url,
            timeout_secs = transcription.timeout_seconds,
            models = catalog.len(),
            default_model = catalog.default_key(),
            credential = transcription.api_token().is_some(),
            "transcription relay initialized"
        );

        Ok(Server::new(
            Box::new(provider),
            catalog,
            transcription.api_token().cloned(),
            self.config.server.upload.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        path::Path,
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use async_trait::async_trait;
    use scribe_config::TranscriptionConfig;
    use secrecy::ExposeSecret;
    use serde_json::json;

    use super::*;
    use crate::outcome::UpstreamOutcome;

    #[derive(Debug, Clone)]
    struct Seen {
        model: String,
        content_type: String,
        audio: Vec<u8>,
        token: String,
    }

    /// Provider double that answers with a fixed outcome and records calls
    #[derive(Clone)]
    struct StubProvider {
        answer: Arc<dyn Fn() -> Result<UpstreamOutcome> + Send + Sync>,
        calls: Arc<AtomicUsize>,
        seen: Arc<Mutex<Vec<Seen>>>,
    }

    impl StubProvider {
        fn answering(answer: impl Fn() -> Result<UpstreamOutcome> + Send + Sync + 'static) -> Self {
            Self {
                answer: Arc::new(answer),
                calls: Arc::new(AtomicUsize::new(0)),
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl TranscriptionProvider for StubProvider {
        async fn transcribe(&self, request: UpstreamRequest) -> Result<UpstreamOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(Seen {
                model: request.model,
                content_type: request.content_type,
                audio: request.audio,
                token: request.api_token.expose_secret().to_string(),
            });
            (self.answer)()
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn server(provider: &StubProvider, token: Option<&str>) -> Server {
        let catalog = ModelCatalog::from_config(&TranscriptionConfig::default()).unwrap();
        Server::new(
            Box::new(provider.clone()),
            catalog,
            token.map(SecretString::from),
            UploadConfig::default(),
        )
    }

    fn upload(dir: &Path, filename: &str, content_type: Option<&str>) -> (UploadedFile, std::path::PathBuf) {
        let file = UploadedFile::from_bytes(dir, filename, content_type, b"fake audio");
        let path = file.path().to_path_buf();
        (file, path)
    }

    #[tokio::test]
    async fn success_wraps_upstream_body() {
        let provider = StubProvider::answering(|| Ok(UpstreamOutcome::Success(json!({"text": "hello"}))));
        let server = server(&provider, Some("hf_test"));
        let dir = tempfile::tempdir().unwrap();
        let (file, path) = upload(dir.path(), "talk.mp3", Some("application/octet-stream"));

        let result = server.transcribe(file, Some("fast")).await.unwrap();

        assert!(result.success);
        assert_eq!(result.transcription, json!({"text": "hello"}));
        assert_eq!(result.metadata.model, "openai/whisper-large-v3-turbo");
        assert_eq!(result.metadata.filename, "talk.mp3");
        assert_eq!(result.metadata.size, 10);
        assert_eq!(result.metadata.content_type, "audio/mpeg");
        assert!(!path.exists());

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "openai/whisper-large-v3-turbo");
        assert_eq!(seen[0].content_type, "audio/mpeg");
        assert_eq!(seen[0].audio, b"fake audio");
        assert_eq!(seen[0].token, "hf_test");
    }

    #[tokio::test]
    async fn staged_file_is_gone_before_upstream_call() {
        let dir = tempfile::tempdir().unwrap();
        let (file, path) = upload(dir.path(), "talk.wav", Some("audio/wav"));
        let seen_path = path.clone();
        let provider = StubProvider::answering(move || {
            assert!(!seen_path.exists());
            Ok(UpstreamOutcome::Success(json!({"text": "hi"})))
        });
        let server = server(&provider, Some("hf_test"));

        let result = server.transcribe(file, None).await.unwrap();

        assert_eq!(result.metadata.size, 10);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn unknown_model_uses_default() {
        let provider = StubProvider::answering(|| Ok(UpstreamOutcome::Success(json!({"text": ""}))));
        let server = server(&provider, Some("hf_test"));
        let dir = tempfile::tempdir().unwrap();
        let (file, _) = upload(dir.path(), "talk.wav", Some("audio/wav"));

        let result = server.transcribe(file, Some("gigantic")).await.unwrap();

        assert_eq!(result.metadata.model, "openai/whisper-large-v3");
    }

    #[tokio::test]
    async fn missing_token_skips_upstream_and_cleans_up() {
        let provider = StubProvider::answering(|| Ok(UpstreamOutcome::Success(json!({}))));
        let server = server(&provider, None);
        let dir = tempfile::tempdir().unwrap();
        let (file, path) = upload(dir.path(), "talk.wav", None);

        let err = server.transcribe(file, None).await.unwrap_err();

        assert!(matches!(err, RelayError::MissingCredential));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn upstream_failures_clean_up() {
        let outcomes = [
            UpstreamOutcome::AuthFailed,
            UpstreamOutcome::RateLimited,
            UpstreamOutcome::Loading,
            UpstreamOutcome::OtherFailure { status: 400, detail: None },
        ];

        for outcome in outcomes {
            let expected = outcome.clone().into_result().unwrap_err().to_string();
            let provider = StubProvider::answering(move || Ok(outcome.clone()));
            let server = server(&provider, Some("hf_test"));
            let dir = tempfile::tempdir().unwrap();
            let (file, path) = upload(dir.path(), "talk.ogg", None);

            let err = server.transcribe(file, None).await.unwrap_err();

            assert_eq!(err.to_string(), expected);
            assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
            assert!(!path.exists());
        }
    }

    #[tokio::test]
    async fn transport_failures_clean_up() {
        let provider = StubProvider::answering(|| Err(RelayError::Timeout));
        let server = server(&provider, Some("hf_test"));
        let dir = tempfile::tempdir().unwrap();
        let (file, path) = upload(dir.path(), "talk.ogg", None);

        let err = server.transcribe(file, None).await.unwrap_err();

        assert!(matches!(err, RelayError::Timeout));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn unreadable_upload_is_internal_error() {
        let provider = StubProvider::answering(|| Ok(UpstreamOutcome::Success(json!({}))));
        let server = server(&provider, Some("hf_test"));
        let dir = tempfile::tempdir().unwrap();
        let (file, path) = upload(dir.path(), "talk.ogg", None);
        std::fs::remove_file(&path).unwrap();

        let err = server.transcribe(file, None).await.unwrap_err();

        assert!(matches!(err, RelayError::Internal(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn body_limit_leaves_room_for_form_fields() {
        let provider = StubProvider::answering(|| Ok(UpstreamOutcome::Success(json!({}))));
        let server = server(&provider, None);
        assert_eq!(server.body_limit(), (100 << 20) + (64 << 10));
    }
}
