// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Zero-copy backend: httparse over a stack header array.
//!
//! Only the message head is parsed. The body is never touched, so no
//! per-parse heap allocation happens on this path.

use httparse::Status;

use super::{head_error, ParserAdapter, MAX_HEADERS};
use crate::error::AdapterError;
use crate::types::Orientation;

/// High-throughput head parser.
#[derive(Debug, Clone)]
pub struct HttparseAdapter {
    orientation: Orientation,
}

impl HttparseAdapter {
    /// Registry name of this backend.
    pub const NAME: &'static str = "httparse";

    pub fn new(orientation: Orientation) -> Self {
        Self { orientation }
    }
}

impl ParserAdapter for HttparseAdapter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }

    fn parse(&mut self, raw: &[u8]) -> Result<(), AdapterError> {
        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let status = match self.orientation {
            Orientation::Request => httparse::Request::new(&mut headers).parse(raw),
            Orientation::Response => httparse::Response::new(&mut headers).parse(raw),
        };

        match status.map_err(head_error)? {
            Status::Complete(_) => Ok(()),
            Status::Partial => Err(AdapterError::parse("incomplete message")),
        }
    }
}
