use crate::core::verifier::VerifierSettings;
use crate::utils::error::{MetricsError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Settings for the remote verification channel, loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    pub channel: ChannelConfig,
    pub polling: Option<PollingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub endpoint: String,
    pub instance_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    pub initial_delay_seconds: Option<u64>,
    pub poll_interval_seconds: Option<u64>,
    pub max_attempts: Option<u32>,
    pub overall_timeout_seconds: Option<u64>,
}

impl VerifierConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MetricsError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content)?;

        toml::from_str(&processed).map_err(|e| MetricsError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` placeholders with environment values; unknown
    /// variables are left as-is so validation reports them.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Timing knobs for the orchestrator; unset values fall back to the
    /// deployment defaults.
    pub fn settings(&self) -> VerifierSettings {
        let defaults = VerifierSettings::default();
        let polling = self.polling.as_ref();

        VerifierSettings {
            initial_delay: polling
                .and_then(|p| p.initial_delay_seconds)
                .map(Duration::from_secs)
                .unwrap_or(defaults.initial_delay),
            poll_interval: polling
                .and_then(|p| p.poll_interval_seconds)
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_interval),
            max_attempts: polling
                .and_then(|p| p.max_attempts)
                .unwrap_or(defaults.max_attempts),
            overall_timeout: polling
                .and_then(|p| p.overall_timeout_seconds)
                .map(Duration::from_secs)
                .unwrap_or(defaults.overall_timeout),
        }
    }
}

impl Validate for VerifierConfig {
    fn validate(&self) -> Result<()> {
        validate_url("channel.endpoint", &self.channel.endpoint)?;
        validate_non_empty_string("channel.instance_id", &self.channel.instance_id)?;

        if let Some(polling) = &self.polling {
            if let Some(attempts) = polling.max_attempts {
                validate_positive_number("polling.max_attempts", attempts as usize, 1)?;
            }
            if let Some(interval) = polling.poll_interval_seconds {
                validate_range("polling.poll_interval_seconds", interval, 1, 300)?;
            }
            if let Some(timeout) = polling.overall_timeout_seconds {
                validate_positive_number("polling.overall_timeout_seconds", timeout as usize, 1)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_config() {
        let toml_content = r#"
[channel]
endpoint = "https://verifier.example.com"
instance_id = "i-0abc123"

[polling]
initial_delay_seconds = 1
poll_interval_seconds = 2
max_attempts = 10
overall_timeout_seconds = 60
"#;

        let config = VerifierConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());

        let settings = config.settings();
        assert_eq!(settings.initial_delay, Duration::from_secs(1));
        assert_eq!(settings.poll_interval, Duration::from_secs(2));
        assert_eq!(settings.max_attempts, 10);
        assert_eq!(settings.overall_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_missing_polling_section_uses_defaults() {
        let toml_content = r#"
[channel]
endpoint = "https://verifier.example.com"
instance_id = "i-0abc123"
"#;

        let config = VerifierConfig::from_toml_str(toml_content).unwrap();
        let defaults = VerifierSettings::default();
        let settings = config.settings();

        assert_eq!(settings.max_attempts, defaults.max_attempts);
        assert_eq!(settings.poll_interval, defaults.poll_interval);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_VERIFIER_ENDPOINT", "https://test.verifier.com");

        let toml_content = r#"
[channel]
endpoint = "${TEST_VERIFIER_ENDPOINT}"
instance_id = "i-0abc123"
"#;

        let config = VerifierConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.channel.endpoint, "https://test.verifier.com");

        std::env::remove_var("TEST_VERIFIER_ENDPOINT");
    }

    #[test]
    fn test_validation_rejects_bad_endpoint() {
        let toml_content = r#"
[channel]
endpoint = "not-a-url"
instance_id = "i-0abc123"
"#;

        let config = VerifierConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_attempts() {
        let toml_content = r#"
[channel]
endpoint = "https://verifier.example.com"
instance_id = "i-0abc123"

[polling]
max_attempts = 0
"#;

        let config = VerifierConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[channel]
endpoint = "https://verifier.example.com"
instance_id = "i-0abc123"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = VerifierConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.channel.instance_id, "i-0abc123");
    }
}
