//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

const VALID_MODES: [&str; 2] = ["all", "onscreen"];
const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

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

    /// Turn the first error, if any, into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(ConfigError::InvalidValue {
                field: err.path,
                message: err.message,
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

        Self::validate_digest(config, &mut result);
        Self::validate_viewport(config, &mut result);
        Self::validate_logging(config, &mut result);

        result
    }

    fn validate_digest(config: &Config, result: &mut ValidationResult) {
        let digest = &config.digest;

        if !VALID_MODES.contains(&digest.mode.as_str()) {
            result.add_error(ValidationError::new(
                "digest.mode",
                format!(
                    "Unknown mode '{}', valid values: {:?}",
                    digest.mode, VALID_MODES
                ),
            ));
        } else if digest.include_position && digest.mode != "onscreen" {
            result.add_error(ValidationError::new(
                "digest.include_position",
                "include_position requires mode = \"onscreen\"",
            ));
        }

        if digest.text_limit == 0 {
            result.add_error(ValidationError::new(
                "digest.text_limit",
                "text_limit must be greater than 0",
            ));
        }
    }

    fn validate_viewport(config: &Config, result: &mut ValidationResult) {
        if config.viewport.width == 0 || config.viewport.height == 0 {
            result.add_warning(ValidationWarning::new(
                "viewport",
                "Zero-sized viewport: onscreen digests will be empty",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        let level = config.logging.level.to_ascii_lowercase();
        // Full directives like "domsift_core=debug" are passed through as-is.
        if !level.contains('=') && !LOG_LEVELS.contains(&level.as_str()) {
            result.add_warning(ValidationWarning::new(
                "logging.level",
                format!(
                    "Unknown log level '{}', valid values: {:?}",
                    config.logging.level, LOG_LEVELS
                ),
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
