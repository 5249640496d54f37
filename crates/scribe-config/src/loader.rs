use std::path::Path;

use secrecy::SecretString;

use crate::Config;

/// Environment variable holding the upstream bearer token
pub const API_TOKEN_ENV: &str = "HF_API_TOKEN";

/// Environment variable holding comma-separated allowed CORS origins
pub const ALLOWED_ORIGINS_ENV: &str = "ALLOWED_ORIGINS";

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, deserializes,
    /// applies environment overrides and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let mut config = Self::parse(&raw)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Load from `path` when given, otherwise start from defaults
    ///
    /// Environment overrides and validation apply in both cases.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`Config::load`]
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parse raw TOML text after placeholder expansion, without overrides or validation
    ///
    /// # Errors
    ///
    /// Returns an error if expansion or TOML parsing fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))
    }

    /// Apply `HF_API_TOKEN` and `ALLOWED_ORIGINS` on top of the loaded values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var(API_TOKEN_ENV)
            && !token.trim().is_empty()
        {
            self.transcription.api_token = Some(SecretString::from(token));
        }

        if let Ok(origins) = std::env::var(ALLOWED_ORIGINS_ENV) {
            self.server.cors.set_origins_from_list(&origins);
        }
    }

    /// Validate that the configuration is internally consistent
    ///
    /// A missing upstream token is not an error here, and nothing is logged
    /// for it; requests report it individually so the health and model
    /// endpoints keep working.
    ///
    /// # Errors
    ///
    /// Returns an error if the model table, upload limits or timeout are unusable
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_models()?;
        self.validate_limits()
    }

    fn validate_models(&self) -> anyhow::Result<()> {
        let transcription = &self.transcription;

        if transcription.models.is_empty() {
            anyhow::bail!("transcription.models must define at least one model");
        }

        for (key, model) in &transcription.models {
            if model.id.trim().is_empty() {
                anyhow::bail!("transcription model '{key}' has an empty id");
            }
        }

        if !transcription.models.contains_key(&transcription.default_model) {
            anyhow::bail!(
                "transcription.default_model '{}' is not defined in transcription.models",
                transcription.default_model
            );
        }

        Ok(())
    }

    fn validate_limits(&self) -> anyhow::Result<()> {
        if self.server.upload.max_bytes == 0 {
            anyhow::bail!("server.upload.max_bytes must be greater than 0");
        }

        if self.server.upload.field_name.trim().is_empty() {
            anyhow::bail!("server.upload.field_name must not be empty");
        }

        if self.server.health.enabled && !self.server.health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/'");
        }

        if self.transcription.timeout_seconds == 0 {
            anyhow::bail!("transcription.timeout_seconds must be greater than 0");
        }

        Ok(())
    }
}
