use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use axum::{
    body::Body,
    extract::{
        FromRequest, Multipart,
        multipart::{Field, MultipartError},
    },
};
use http::StatusCode;
use scribe_config::UploadConfig;
use tokio::io::AsyncWriteExt;

use crate::{
    Server,
    error::{RelayError, Result},
    media,
};

/// Room for multipart boundaries and text fields on top of the file size limit
pub const FORM_OVERHEAD_BYTES: u64 = 64 << 10;

/// Query parameter and form field naming the model key
const MODEL_FIELD: &str = "model";

/// An uploaded audio file staged on disk for the duration of one request
///
/// The staged file is removed by [`UploadedFile::discard`] once its bytes
/// are no longer needed, or when this value is dropped, whichever way the
/// request ends. Removal failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct UploadedFile {
    path: PathBuf,
    filename: String,
    content_type: Option<String>,
    size: u64,
    removed: bool,
}

impl UploadedFile {
    /// Filename as sent by the client
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Media type declared by the client, if any
    pub fn declared_content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Size in bytes
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Location of the staged file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file into memory
    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }

    /// Remove the staged file on the async runtime
    pub async fn discard(mut self) {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "removed staged upload");
                self.removed = true;
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => self.removed = true,
            Err(err) => tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "failed to remove staged upload"
            ),
        }
    }

    /// Stream a multipart field to a new file in the staging directory
    async fn stage(
        mut field: Field<'_>,
        filename: String,
        content_type: Option<String>,
        config: &UploadConfig,
    ) -> Result<Self> {
        let (file, path) = tempfile::Builder::new()
            .prefix("scribe-upload-")
            .tempfile_in(config.staging_dir())
            .map_err(|e| RelayError::Internal(format!("failed to create upload file: {e}")))?
            .into_parts();

        let path = path
            .keep()
            .map_err(|e| RelayError::Internal(format!("failed to stage upload file: {e}")))?;

        let mut upload = Self {
            path,
            filename,
            content_type,
            size: 0,
            removed: false,
        };

        let mut file = tokio::fs::File::from_std(file);

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| multipart_error(e, config.max_bytes))?
        {
            upload.size = upload
                .size
                .saturating_add(u64::try_from(chunk.len()).unwrap_or(u64::MAX));

            if upload.size > config.max_bytes {
                return Err(RelayError::FileTooLarge {
                    limit: config.max_bytes,
                });
            }

            file.write_all(&chunk)
                .await
                .map_err(|e| RelayError::Internal(format!("failed to write upload file: {e}")))?;
        }

        file.flush()
            .await
            .map_err(|e| RelayError::Internal(format!("failed to write upload file: {e}")))?;

        tracing::debug!(
            path = %upload.path.display(),
            filename = %upload.filename,
            size = upload.size,
            "staged upload"
        );

        Ok(upload)
    }
}

// Backstop for early exits: a single blocking unlink on the worker thread.
impl Drop for UploadedFile {
    fn drop(&mut self) {
        if self.removed {
            return;
        }

        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed staged upload"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "failed to remove staged upload"
            ),
        }
    }
}

/// Fields of a transcription request
#[derive(Debug)]
pub struct UploadForm {
    /// The staged audio file
    pub file: UploadedFile,
    /// Model key from the query string, or from a `model` form field
    pub model: Option<String>,
}

/// Extractor that validates a multipart upload and stages its audio file
pub struct ExtractUpload(pub UploadForm);

impl FromRequest<Arc<Server>> for ExtractUpload {
    type Rejection = RelayError;

    async fn from_request(request: http::Request<Body>, server: &Arc<Server>) -> Result<Self> {
        let config = server.upload_config();

        let query_model = request.uri().query().and_then(model_from_query);

        if let Some(length) = declared_length(&request)
            && length > config.max_bytes.saturating_add(FORM_OVERHEAD_BYTES)
        {
            return Err(RelayError::FileTooLarge {
                limit: config.max_bytes,
            });
        }

        let mut multipart = Multipart::from_request(request, server).await.map_err(|rejection| {
            tracing::debug!(%rejection, "request is not a multipart upload");
            RelayError::NoFile
        })?;

        let (file, form_model) = read_form(&mut multipart, config).await?;

        Ok(Self(UploadForm {
            file,
            model: query_model.or(form_model),
        }))
    }
}

/// Walk the form, staging the single audio file and picking up a model field
async fn read_form(multipart: &mut Multipart, config: &UploadConfig) -> Result<(UploadedFile, Option<String>)> {
    let mut file: Option<UploadedFile> = None;
    let mut model = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, config.max_bytes))?
    {
        let name = field.name().unwrap_or_default().to_string();

        let Some(filename) = field.file_name().map(str::to_string) else {
            if name == MODEL_FIELD {
                model = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| multipart_error(e, config.max_bytes))?,
                );
            }
            continue;
        };

        let declared = field.content_type().map(str::to_string);

        if !media::is_accepted_upload(&name, &config.field_name, &filename, declared.as_deref()) {
            return Err(RelayError::InvalidFileType(filename));
        }

        if name != config.field_name {
            return Err(RelayError::UnexpectedField {
                found: name,
                expected: config.field_name.clone(),
            });
        }

        if file.is_some() {
            return Err(RelayError::TooManyFiles(name));
        }

        file = Some(UploadedFile::stage(field, filename, declared, config).await?);
    }

    let file = file.ok_or(RelayError::NoFile)?;

    Ok((file, model))
}

fn model_from_query(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == MODEL_FIELD)
        .map(|(_, value)| value.into_owned())
}

fn declared_length(request: &http::Request<Body>) -> Option<u64> {
    request
        .headers()
        .get(http::header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

fn multipart_error(err: MultipartError, limit: u64) -> RelayError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        RelayError::FileTooLarge { limit }
    } else {
        RelayError::MalformedUpload(err.body_text())
    }
}

#[cfg(test)]
impl UploadedFile {
    /// Stage `bytes` directly, bypassing multipart parsing
    pub(crate) fn from_bytes(dir: &Path, filename: &str, content_type: Option<&str>, bytes: &[u8]) -> Self {
        use std::io::Write;

        let mut file = tempfile::Builder::new()
            .prefix("scribe-upload-")
            .tempfile_in(dir)
            .unwrap();
        file.write_all(bytes).unwrap();
        let path = file.into_temp_path().keep().unwrap();

        Self {
            path,
            filename: filename.to_string(),
            content_type: content_type.map(str::to_string),
            size: bytes.len() as u64,
            removed: false,
        }
    }
}
