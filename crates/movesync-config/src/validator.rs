//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Turn the first error into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_engine(config, &mut result);
        Self::validate_retry(config, &mut result);
        Self::validate_browser(config, &mut result);
        Self::validate_selectors(config, &mut result);
        Self::validate_service(config, &mut result);

        result
    }

    fn validate_engine(config: &Config, result: &mut ValidationResult) {
        Self::check_http_url("engine.endpoint", &config.engine.endpoint, result);

        if config.engine.timeout_seconds == 0 {
            result.add_error(ValidationError::new(
                "engine.timeout_seconds",
                "timeout_seconds must be greater than 0",
            ));
        }
    }

    fn validate_retry(config: &Config, result: &mut ValidationResult) {
        if config.retry.max_retries == 0 {
            result.add_error(ValidationError::new(
                "retry.max_retries",
                "max_retries must be greater than 0",
            ));
        }

        if config.retry.backoff_ms > 30_000 {
            result.add_warning(ValidationWarning::new(
                "retry.backoff_ms",
                "backoff is very high (>30s), the opponent clock keeps running meanwhile",
            ));
        }
    }

    fn validate_browser(config: &Config, result: &mut ValidationResult) {
        Self::check_http_url("browser.endpoint", &config.browser.endpoint, result);

        if config.browser.page_url_pattern.is_empty() {
            result.add_warning(ValidationWarning::new(
                "browser.page_url_pattern",
                "empty pattern attaches to the first open tab",
            ));
        }
    }

    fn validate_selectors(config: &Config, result: &mut ValidationResult) {
        let selectors = &config.selectors;
        let entries = [
            ("selectors.ply", &selectors.ply),
            ("selectors.figurine", &selectors.figurine),
            ("selectors.figurine_attribute", &selectors.figurine_attribute),
            ("selectors.move_list", &selectors.move_list),
            ("selectors.move_input", &selectors.move_input),
            ("selectors.game_result", &selectors.game_result),
        ];

        for (path, value) in entries {
            if value.trim().is_empty() {
                result.add_error(ValidationError::new(path, "selector cannot be empty"));
            }
        }
    }

    fn validate_service(config: &Config, result: &mut ValidationResult) {
        let service = &config.service;

        if service.port == 0 {
            result.add_error(ValidationError::new("service.port", "Port cannot be 0"));
        }

        if service.host.is_empty() {
            result.add_error(ValidationError::new("service.host", "Host cannot be empty"));
        }

        if service.engine_path.is_empty() {
            result.add_error(ValidationError::new(
                "service.engine_path",
                "engine_path cannot be empty",
            ));
        }

        if service.movetime_ms == 0 {
            result.add_error(ValidationError::new(
                "service.movetime_ms",
                "movetime_ms must be greater than 0",
            ));
        } else if service.movetime_ms > 60_000 {
            result.add_warning(ValidationWarning::new(
                "service.movetime_ms",
                "movetime is very high (>60s), requests may time out on the client",
            ));
        }

        if service.threads == 0 {
            result.add_error(ValidationError::new(
                "service.threads",
                "threads must be greater than 0",
            ));
        }
    }

    fn check_http_url(path: &str, url: &str, result: &mut ValidationResult) {
        if url.is_empty() {
            result.add_error(ValidationError::new(path, "endpoint cannot be empty"));
        } else if !url.starts_with("http://") && !url.starts_with("https://") {
            result.add_error(ValidationError::new(
                path,
                "endpoint must start with http:// or https://",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
