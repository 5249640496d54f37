use std::time::Duration;

use serde::Deserialize;

/// Origins allowed when neither the config file nor `ALLOWED_ORIGINS` names any
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:3000", "http://localhost:5173", "https://scribe.app"];

/// Cross-origin policy for browser clients
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins (wildcard "*" or explicit list)
    #[serde(default = "default_origins")]
    pub origins: AnyOrArray,
    /// Allowed HTTP methods (wildcard "*" or explicit list)
    #[serde(default = "default_methods")]
    pub methods: AnyOrArray,
    /// Allowed request headers (wildcard "*" or explicit list)
    #[serde(default)]
    pub headers: AnyOrArray,
    /// Allow credentials
    #[serde(default)]
    pub credentials: bool,
    /// Max age for preflight cache in seconds
    #[serde(default)]
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: default_origins(),
            methods: default_methods(),
            headers: AnyOrArray::Any,
            credentials: false,
            max_age: None,
        }
    }
}

impl CorsConfig {
    /// Get max age as Duration
    pub fn max_age_duration(&self) -> Option<Duration> {
        self.max_age.map(Duration::from_secs)
    }

    /// Replace the origin list with a comma-separated value such as `ALLOWED_ORIGINS`
    ///
    /// Blank entries are dropped; a lone `*` allows any origin. An input with no
    /// usable entries leaves the current origins untouched.
    pub fn set_origins_from_list(&mut self, raw: &str) {
        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() {
            return;
        }

        self.origins = AnyOrArray::from(origins);
    }
}

fn default_origins() -> AnyOrArray {
    AnyOrArray::List(DEFAULT_ALLOWED_ORIGINS.iter().map(|o| (*o).to_string()).collect())
}

fn default_methods() -> AnyOrArray {
    AnyOrArray::List(vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()])
}

/// Either a wildcard "*" or explicit list of values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnyOrArray {
    /// Match any value
    #[default]
    Any,
    /// Explicit list
    List(Vec<String>),
}

impl From<Vec<String>> for AnyOrArray {
    fn from(values: Vec<String>) -> Self {
        if values.iter().any(|v| v == "*") {
            Self::Any
        } else {
            Self::List(values)
        }
    }
}

impl<'de> Deserialize<'de> for AnyOrArray {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(Vec<String>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::One(value) => Self::from(vec![value]),
            Raw::Many(values) => Self::from(values),
        })
    }
}
