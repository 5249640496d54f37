//! Media type handling for uploaded audio

use std::path::Path;

/// Sent upstream when neither the declared type nor the extension says otherwise
pub const FALLBACK_CONTENT_TYPE: &str = "audio/wav";

/// Declared type browsers use when they do not know the file type
const UNKNOWN_BINARY: &str = "application/octet-stream";

/// Extensions accepted at intake regardless of the declared media type
const ACCEPTED_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a", "aac"];

/// Media type to send upstream for an uploaded file
///
/// A specific declared type is kept as is. A missing, empty or generic binary
/// type is replaced by one inferred from the filename's extension.
pub fn resolve_content_type(declared: Option<&str>, filename: &str) -> String {
    match declared.map(str::trim) {
        Some(declared) if !declared.is_empty() && !declared.eq_ignore_ascii_case(UNKNOWN_BINARY) => {
            declared.to_string()
        }
        _ => content_type_for_extension(filename).to_string(),
    }
}

fn content_type_for_extension(filename: &str) -> &'static str {
    match extension(filename).as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        Some("m4a") => "audio/mp4",
        Some("flac") => "audio/flac",
        _ => FALLBACK_CONTENT_TYPE,
    }
}

/// Whether a file part may be taken in as audio
///
/// Accepted when the declared type is `audio/*`, when it arrives under the
/// upload field, or when its extension is a known audio extension.
pub fn is_accepted_upload(field_name: &str, upload_field: &str, filename: &str, declared: Option<&str>) -> bool {
    declared.is_some_and(|ct| ct.trim().to_ascii_lowercase().starts_with("audio/"))
        || field_name == upload_field
        || extension(filename).is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}
