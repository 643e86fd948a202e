//! Semantic configuration checks.
//!
//! Syntactic validity is serde's job; this pass collects every semantic
//! violation instead of stopping at the first.

use std::fmt;

use regex::Regex;
use tracing::Level;

use crate::config::schema::LogConfig;

#[derive(Debug)]
pub enum ValidationError {
    SampleRateOutOfRange(f64),
    ZeroCaptureLimit,
    BadPattern { pattern: String, message: String },
    BadLevel(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::SampleRateOutOfRange(rate) => {
                write!(f, "activation.sample_rate {rate} is not within [0, 1]")
            }
            ValidationError::ZeroCaptureLimit => {
                write!(f, "body_capture_limit must be greater than zero")
            }
            ValidationError::BadPattern { pattern, message } => {
                write!(f, "obfuscate.body_patterns entry {pattern:?}: {message}")
            }
            ValidationError::BadLevel(level) => {
                write!(f, "sink.level {level:?} is not a valid level")
            }
        }
    }
}

pub fn validate_config(config: &LogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !(0.0..=1.0).contains(&config.activation.sample_rate) {
        errors.push(ValidationError::SampleRateOutOfRange(
            config.activation.sample_rate,
        ));
    }

    if config.body_capture_limit == 0 {
        errors.push(ValidationError::ZeroCaptureLimit);
    }

    for pattern in &config.obfuscate.body_patterns {
        if let Err(error) = Regex::new(pattern) {
            errors.push(ValidationError::BadPattern {
                pattern: pattern.clone(),
                message: error.to_string(),
            });
        }
    }

    if config.sink.level.parse::<Level>().is_err() {
        errors.push(ValidationError::BadLevel(config.sink.level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&LogConfig::default()).is_ok());
    }

    #[test]
    fn test_all_violations_are_collected() {
        let mut config = LogConfig::default();
        config.activation.sample_rate = -0.5;
        config.body_capture_limit = 0;
        config.obfuscate.body_patterns = vec!["([unclosed".to_string()];
        config.sink.level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }
}
