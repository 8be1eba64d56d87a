// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Message and run-configuration validation.
//!
//! Both checks fill resolved defaults into their argument in place and fail
//! on the first violation. The validator is stateless apart from the default
//! library set, so one instance can serve concurrent runs.

use crate::adapter::HttpAdapter;
use crate::error::ValidationError;
use crate::model::{HttpMessage, TestConfig};
use crate::types::{
    Orientation, DEFAULT_CONCURRENCY, DEFAULT_ITERATIONS, MAX_CONCURRENCY, MAX_DURATION,
    MAX_ITERATIONS, MAX_MESSAGE_SIZE, MIN_CONCURRENCY, MIN_ITERATIONS,
};

/// Request-line method tokens recognized by orientation detection.
const METHODS: [&str; 9] = [
    "GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS", "CONNECT", "TRACE",
];

/// Validator for benchmark input.
#[derive(Debug, Clone)]
pub struct Validator {
    default_libraries: Vec<String>,
}

impl Validator {
    /// Create a validator that fills in `default_libraries` when a run names none.
    pub fn new(default_libraries: Vec<String>) -> Self {
        Self { default_libraries }
    }

    /// Library set used for runs that name none.
    pub fn default_libraries(&self) -> &[String] {
        &self.default_libraries
    }

    /// Check the message, resolving its orientation.
    ///
    /// On success `msg.message_type` holds the canonical tag.
    pub fn validate_message(&self, msg: &mut HttpMessage) -> Result<Orientation, ValidationError> {
        if msg.raw.is_empty() {
            return Err(ValidationError::EmptyMessage);
        }

        if msg.raw.len() > MAX_MESSAGE_SIZE {
            return Err(ValidationError::TooLarge {
                size: msg.raw.len(),
                max: MAX_MESSAGE_SIZE,
            });
        }

        if msg.message_type.is_empty() {
            msg.message_type = detect_orientation(&msg.raw)?.as_str().to_string();
        }

        let orientation: Orientation = msg.message_type.parse()?;

        // Precondition gate with the reference parser, not a benchmarked parse.
        let parsed = match orientation {
            Orientation::Request => HttpAdapter::parse_request(msg.raw.as_bytes()).map(|_| ()),
            Orientation::Response => HttpAdapter::parse_response(msg.raw.as_bytes()).map(|_| ()),
        };
        parsed.map_err(|e| ValidationError::MalformedMessage {
            reason: e.to_string(),
        })?;

        Ok(orientation)
    }

    /// Apply defaults, then enforce bounds.
    pub fn validate_config(&self, config: &mut TestConfig) -> Result<(), ValidationError> {
        if config.iterations == 0 {
            config.iterations = DEFAULT_ITERATIONS;
        }
        if config.concurrency == 0 {
            config.concurrency = DEFAULT_CONCURRENCY;
        }
        if config.libraries.is_empty() {
            config.libraries = self.default_libraries.clone();
        }

        if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&config.iterations) {
            return Err(ValidationError::OutOfRange {
                field: "iterations",
                value: config.iterations.to_string(),
                bound: format!("must be between {} and {}", MIN_ITERATIONS, MAX_ITERATIONS),
            });
        }

        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&config.concurrency) {
            return Err(ValidationError::OutOfRange {
                field: "concurrency",
                value: config.concurrency.to_string(),
                bound: format!(
                    "must be between {} and {}",
                    MIN_CONCURRENCY, MAX_CONCURRENCY
                ),
            });
        }

        if let Some(duration) = config.duration {
            if duration > MAX_DURATION {
                return Err(ValidationError::OutOfRange {
                    field: "duration",
                    value: format!("{:?}", duration),
                    bound: format!("must not exceed {:?}", MAX_DURATION),
                });
            }
        }

        Ok(())
    }
}

/// Infer the orientation from the first non-empty line.
pub fn detect_orientation(raw: &str) -> Result<Orientation, ValidationError> {
    let first_line = raw
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");

    let is_request = METHODS.iter().any(|method| {
        first_line
            .strip_prefix(method)
            .is_some_and(|rest| rest.starts_with(' '))
    });
    if is_request {
        return Ok(Orientation::Request);
    }

    if first_line.starts_with("HTTP/") {
        return Ok(Orientation::Response);
    }

    Err(ValidationError::UndetectableType {
        first_line: first_line.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn validator() -> Validator {
        Validator::new(vec!["http".to_string(), "httparse".to_string()])
    }

    #[test]
    fn test_detect_request() {
        assert_eq!(
            detect_orientation("GET / HTTP/1.1\r\n\r\n"),
            Ok(Orientation::Request)
        );
        assert_eq!(
            detect_orientation("\r\n\r\nOPTIONS * HTTP/1.1\r\n\r\n"),
            Ok(Orientation::Request)
        );
    }

    #[test]
    fn test_detect_response() {
        assert_eq!(
            detect_orientation("HTTP/1.1 200 OK\r\n\r\n"),
            Ok(Orientation::Response)
        );
    }

    #[test]
    fn test_detect_requires_space_after_method() {
        assert!(matches!(
            detect_orientation("GETX / HTTP/1.1\r\n\r\n"),
            Err(ValidationError::UndetectableType { .. })
        ));
        assert!(matches!(
            detect_orientation("hello world"),
            Err(ValidationError::UndetectableType { first_line }) if first_line == "hello world"
        ));
    }

    #[test]
    fn test_empty_message() {
        let mut msg = HttpMessage::new("");
        assert_eq!(
            validator().validate_message(&mut msg),
            Err(ValidationError::EmptyMessage)
        );
    }

    #[test]
    fn test_too_large_message() {
        let raw = format!("GET / HTTP/1.1\r\nX-Pad: {}\r\n\r\n", "a".repeat(MAX_MESSAGE_SIZE));
        let mut msg = HttpMessage::new(raw);
        assert!(matches!(
            validator().validate_message(&mut msg),
            Err(ValidationError::TooLarge { max, .. }) if max == MAX_MESSAGE_SIZE
        ));
    }

    #[test]
    fn test_message_type_filled_in() {
        let mut msg = HttpMessage::new("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n");
        let orientation = validator().validate_message(&mut msg).unwrap();
        assert_eq!(orientation, Orientation::Response);
        assert_eq!(msg.message_type, "response");
    }

    #[test]
    fn test_invalid_message_type() {
        let mut msg = HttpMessage::new("GET / HTTP/1.1\r\n\r\n").with_type("query");
        assert_eq!(
            validator().validate_message(&mut msg),
            Err(ValidationError::InvalidType {
                value: "query".to_string()
            })
        );
    }

    #[test]
    fn test_supplied_type_mismatch_is_malformed() {
        let mut msg = HttpMessage::new("GET / HTTP/1.1\r\n\r\n").with_type("response");
        assert!(matches!(
            validator().validate_message(&mut msg),
            Err(ValidationError::MalformedMessage { .. })
        ));
    }

    #[test]
    fn test_malformed_body() {
        let mut msg = HttpMessage::new("POST / HTTP/1.1\r\nContent-Length: 99\r\n\r\nshort");
        assert!(matches!(
            validator().validate_message(&mut msg),
            Err(ValidationError::MalformedMessage { .. })
        ));
    }

    #[test]
    fn test_config_defaults() {
        let mut config = TestConfig::default();
        validator().validate_config(&mut config).unwrap();
        assert_eq!(config.iterations, 10_000);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.libraries, vec!["http", "httparse"]);
    }

    #[test]
    fn test_concurrency_checked_after_iteration_default() {
        let mut config = TestConfig {
            iterations: 0,
            concurrency: 200,
            ..TestConfig::default()
        };
        let err = validator().validate_config(&mut config).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "concurrency", .. }));
        assert_eq!(config.iterations, 10_000);
    }

    #[test]
    fn test_iteration_bounds() {
        let mut config = TestConfig {
            iterations: MAX_ITERATIONS + 1,
            ..TestConfig::default()
        };
        assert!(matches!(
            validator().validate_config(&mut config),
            Err(ValidationError::OutOfRange { field: "iterations", .. })
        ));

        let mut config = TestConfig {
            iterations: -5,
            ..TestConfig::default()
        };
        assert!(validator().validate_config(&mut config).is_err());

        let mut config = TestConfig {
            iterations: MAX_ITERATIONS,
            concurrency: MAX_CONCURRENCY,
            ..TestConfig::default()
        };
        assert!(validator().validate_config(&mut config).is_ok());
    }

    #[test]
    fn test_duration_cap() {
        let mut config = TestConfig {
            duration: Some(Duration::from_secs(31)),
            ..TestConfig::default()
        };
        assert!(matches!(
            validator().validate_config(&mut config),
            Err(ValidationError::OutOfRange { field: "duration", .. })
        ));

        let mut config = TestConfig {
            duration: Some(Duration::from_secs(30)),
            ..TestConfig::default()
        };
        assert!(validator().validate_config(&mut config).is_ok());
    }

    #[test]
    fn test_explicit_libraries_kept() {
        let mut config = TestConfig {
            libraries: vec!["httparse".to_string(), "unknown".to_string()],
            ..TestConfig::default()
        };
        validator().validate_config(&mut config).unwrap();
        assert_eq!(config.libraries, vec!["httparse", "unknown"]);
    }
}
