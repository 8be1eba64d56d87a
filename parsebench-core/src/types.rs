// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Message orientation and run limits.
//!
//! The orientation is kept as a closed enum once resolved; the wire form
//! is the lowercase tag ("request" / "response").

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum raw message size: 1 MiB.
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;
/// Smallest accepted iteration count.
pub const MIN_ITERATIONS: i64 = 1;
/// Largest accepted iteration count.
pub const MAX_ITERATIONS: i64 = 10_000_000;
/// Smallest accepted worker count.
pub const MIN_CONCURRENCY: i64 = 1;
/// Largest accepted worker count.
pub const MAX_CONCURRENCY: i64 = 100;
/// Upper bound for the optional duration cap.
pub const MAX_DURATION: Duration = Duration::from_secs(30);
/// Iterations used when the caller leaves the field unset.
pub const DEFAULT_ITERATIONS: i64 = 10_000;
/// Workers used when the caller leaves the field unset.
pub const DEFAULT_CONCURRENCY: i64 = 1;

/// Whether a message is an HTTP request or an HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Request,
    Response,
}

impl Orientation {
    /// Wire tag for the orientation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Response => "response",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "request" => Ok(Self::Request),
            "response" => Ok(Self::Response),
            other => Err(ValidationError::InvalidType {
                value: other.to_string(),
            }),
        }
    }
}
