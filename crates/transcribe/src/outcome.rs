use http::StatusCode;
use serde_json::Value;

/// Classified result of one upstream inference call
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamOutcome {
    /// 2xx with the provider's response body
    Success(Value),
    /// 401, the server's credential was rejected
    AuthFailed,
    /// 429
    RateLimited,
    /// 503, the model is being loaded on the provider side
    Loading,
    /// Any other status, with the provider's own error message when it sent one
    OtherFailure { status: u16, detail: Option<String> },
}

impl UpstreamOutcome {
    /// Decode a raw upstream response
    pub fn decode(status: StatusCode, body: &[u8]) -> Self {
        if status.is_success() {
            return Self::Success(success_body(body));
        }

        match status.as_u16() {
            401 => Self::AuthFailed,
            429 => Self::RateLimited,
            503 => Self::Loading,
            status => Self::OtherFailure {
                status,
                detail: error_detail(body),
            },
        }
    }
}

/// The provider normally answers with JSON; anything else is passed on as text
fn success_body(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

/// Error message from `{"error": "..."}` (or a list of them), else the raw text
fn error_detail(body: &[u8]) -> Option<String> {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        return match value.get("error") {
            Some(Value::String(message)) => Some(message.clone()),
            Some(Value::Array(messages)) => {
                let joined = messages.iter().filter_map(Value::as_str).collect::<Vec<_>>().join("; ");
                (!joined.is_empty()).then_some(joined)
            }
            _ => None,
        };
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
