//! Application configuration
//!
//! Central configuration for the capture console. Values can be overridden
//! with `INQUEST_*` environment variables.

/// Configuration for the indicator device gateway
#[derive(Clone, Debug)]
pub struct IndicatorConfig {
    /// Whether indicator commands are sent at all
    pub enabled: bool,

    /// Base URL of the device gateway
    pub base_url: String,

    /// Guilt score at or above which the "high" color is shown
    pub guilt_threshold: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://192.168.20.178".to_string(),
            guilt_threshold: 60.0,
        }
    }
}

/// Configuration for the complete console
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Base URL of the transcription/analysis API
    pub api_base_url: String,

    /// Indicator device configuration
    pub indicator: IndicatorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            indicator: IndicatorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Build the configuration from defaults plus environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base) = std::env::var("INQUEST_API_BASE") {
            config.api_base_url = base;
        }
        if let Ok(base) = std::env::var("INQUEST_INDICATOR_BASE") {
            config.indicator.base_url = base;
        }
        if let Ok(enabled) = std::env::var("INQUEST_INDICATOR_ENABLED") {
            config.indicator.enabled = enabled != "false" && enabled != "0";
        }
        if let Ok(threshold) = std::env::var("INQUEST_GUILT_THRESHOLD") {
            if let Ok(value) = threshold.parse::<f64>() {
                config.indicator.guilt_threshold = value;
            }
        }

        config
    }

    /// Set the API base URL
    pub fn with_api_base(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = base_url.into();
        self
    }

    /// Disable the indicator device
    pub fn without_indicator(mut self) -> Self {
        self.indicator.enabled = false;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.api_base_url.trim().is_empty() {
            return Err("API base URL is required".to_string());
        }
        if self.indicator.enabled && self.indicator.base_url.trim().is_empty() {
            return Err("Indicator base URL is required when the indicator is enabled".to_string());
        }
        if !self.indicator.guilt_threshold.is_finite() {
            return Err("Guilt threshold must be a finite number".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.indicator.enabled);
        assert_eq!(config.indicator.guilt_threshold, 60.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = AppConfig::default()
            .with_api_base("http://example.test")
            .without_indicator();

        assert_eq!(config.api_base_url, "http://example.test");
        assert!(!config.indicator.enabled);
    }

    #[test]
    fn test_validate_rejects_empty_api_base() {
        let config = AppConfig::default().with_api_base("  ");
        assert!(config.validate().is_err());
    }
}
