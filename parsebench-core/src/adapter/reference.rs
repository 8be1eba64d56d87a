// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Reference backend producing fully typed `http` messages.
//!
//! The head is tokenized with httparse, then every component is validated
//! into `http` types and the body is framed per RFC 9112: chunked decoding,
//! Content-Length, or read-to-end for responses. This is the strict parser
//! the validator gates messages with.

use std::hint::black_box;

use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use httparse::Status;

use super::{head_error, version_from, ParserAdapter, MAX_HEADERS};
use crate::error::AdapterError;
use crate::types::Orientation;

/// How the message body is delimited.
#[derive(Debug, PartialEq, Eq)]
enum Framing {
    Empty,
    Length(usize),
    Chunked,
    UntilEnd,
}

/// Full-object parser built on the `http` crate types.
#[derive(Debug, Clone)]
pub struct HttpAdapter {
    orientation: Orientation,
}

impl HttpAdapter {
    /// Registry name of this backend.
    pub const NAME: &'static str = "http";

    pub fn new(orientation: Orientation) -> Self {
        Self { orientation }
    }

    /// Parse a complete request including its body.
    pub fn parse_request(raw: &[u8]) -> Result<http::Request<Vec<u8>>, AdapterError> {
        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut req = httparse::Request::new(&mut headers);
        let head_len = match req.parse(raw).map_err(head_error)? {
            Status::Complete(n) => n,
            Status::Partial => return Err(AdapterError::parse("incomplete message")),
        };

        let method = req
            .method
            .ok_or_else(|| AdapterError::parse("missing method"))?;
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|e| AdapterError::parse(format!("invalid method: {}", e)))?;
        let uri: Uri = req
            .path
            .ok_or_else(|| AdapterError::parse("missing request target"))?
            .parse()
            .map_err(|e| AdapterError::parse(format!("invalid request target: {}", e)))?;
        let version = version_from(req.version)?;
        let header_map = collect_headers(req.headers)?;

        let framing = body_framing(&header_map, Orientation::Request)?;
        let body = read_body(framing, &raw[head_len..])?;

        let mut request = http::Request::builder()
            .method(method)
            .uri(uri)
            .version(version)
            .body(body)
            .map_err(|e| AdapterError::parse(e.to_string()))?;
        *request.headers_mut() = header_map;
        Ok(request)
    }

    /// Parse a complete response including its body.
    pub fn parse_response(raw: &[u8]) -> Result<http::Response<Vec<u8>>, AdapterError> {
        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut resp = httparse::Response::new(&mut headers);
        let head_len = match resp.parse(raw).map_err(head_error)? {
            Status::Complete(n) => n,
            Status::Partial => return Err(AdapterError::parse("incomplete message")),
        };

        let code = resp
            .code
            .ok_or_else(|| AdapterError::parse("missing status code"))?;
        let status = StatusCode::from_u16(code)
            .map_err(|e| AdapterError::parse(format!("invalid status code: {}", e)))?;
        let version = version_from(resp.version)?;
        let header_map = collect_headers(resp.headers)?;

        // 1xx, 204 and 304 never carry a body.
        let framing = if status.is_informational()
            || status == StatusCode::NO_CONTENT
            || status == StatusCode::NOT_MODIFIED
        {
            Framing::Empty
        } else {
            body_framing(&header_map, Orientation::Response)?
        };
        let body = read_body(framing, &raw[head_len..])?;

        let mut response = http::Response::builder()
            .status(status)
            .version(version)
            .body(body)
            .map_err(|e| AdapterError::parse(e.to_string()))?;
        *response.headers_mut() = header_map;
        Ok(response)
    }
}

impl ParserAdapter for HttpAdapter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }

    fn parse(&mut self, raw: &[u8]) -> Result<(), AdapterError> {
        match self.orientation {
            Orientation::Request => {
                black_box(Self::parse_request(raw)?);
            }
            Orientation::Response => {
                black_box(Self::parse_response(raw)?);
            }
        }
        Ok(())
    }
}

fn collect_headers(parsed: &[httparse::Header<'_>]) -> Result<HeaderMap, AdapterError> {
    let mut map = HeaderMap::with_capacity(parsed.len());
    for header in parsed {
        let name = HeaderName::from_bytes(header.name.as_bytes())
            .map_err(|_| AdapterError::parse(format!("invalid header name: {}", header.name)))?;
        let value = HeaderValue::from_bytes(header.value)
            .map_err(|_| AdapterError::parse(format!("invalid value for header {}", header.name)))?;
        map.append(name, value);
    }
    Ok(map)
}

fn body_framing(headers: &HeaderMap, orientation: Orientation) -> Result<Framing, AdapterError> {
    if let Some(te) = headers.get_all(TRANSFER_ENCODING).iter().last() {
        let te = te
            .to_str()
            .map_err(|_| AdapterError::parse("invalid Transfer-Encoding"))?;
        let chunked = te
            .rsplit(',')
            .next()
            .map(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
            .unwrap_or(false);
        return match (chunked, orientation) {
            (true, _) => Ok(Framing::Chunked),
            (false, Orientation::Response) => Ok(Framing::UntilEnd),
            (false, Orientation::Request) => Err(AdapterError::parse(format!(
                "unsupported transfer encoding: {}",
                te
            ))),
        };
    }

    let mut length: Option<usize> = None;
    for value in headers.get_all(CONTENT_LENGTH) {
        let parsed = value
            .to_str()
            .ok()
            .map(str::trim)
            .filter(|v| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|v| v.parse::<usize>().ok())
            .ok_or_else(|| AdapterError::parse("invalid Content-Length"))?;
        match length {
            Some(existing) if existing != parsed => {
                return Err(AdapterError::parse("conflicting Content-Length headers"));
            }
            _ => length = Some(parsed),
        }
    }

    Ok(match (length, orientation) {
        (Some(0), _) => Framing::Empty,
        (Some(n), _) => Framing::Length(n),
        (None, Orientation::Request) => Framing::Empty,
        (None, Orientation::Response) => Framing::UntilEnd,
    })
}

fn read_body(framing: Framing, rest: &[u8]) -> Result<Vec<u8>, AdapterError> {
    match framing {
        Framing::Empty => Ok(Vec::new()),
        Framing::UntilEnd => Ok(rest.to_vec()),
        Framing::Length(n) => {
            if rest.len() < n {
                return Err(AdapterError::parse(format!(
                    "body shorter than Content-Length ({} < {})",
                    rest.len(),
                    n
                )));
            }
            Ok(rest[..n].to_vec())
        }
        Framing::Chunked => decode_chunked(rest),
    }
}

fn decode_chunked(mut buf: &[u8]) -> Result<Vec<u8>, AdapterError> {
    let mut body = Vec::new();
    loop {
        let (consumed, size) = match httparse::parse_chunk_size(buf) {
            Ok(Status::Complete(parsed)) => parsed,
            Ok(Status::Partial) => return Err(AdapterError::parse("incomplete chunk size line")),
            Err(_) => return Err(AdapterError::parse("invalid chunk size line")),
        };
        buf = &buf[consumed..];

        if size == 0 {
            let mut trailers = [httparse::EMPTY_HEADER; MAX_HEADERS];
            return match httparse::parse_headers(buf, &mut trailers).map_err(head_error)? {
                Status::Complete(_) => Ok(body),
                Status::Partial => Err(AdapterError::parse("incomplete chunked trailer")),
            };
        }

        let size = usize::try_from(size)
            .ok()
            .filter(|s| *s <= buf.len())
            .ok_or_else(|| AdapterError::parse("truncated chunk"))?;
        body.extend_from_slice(&buf[..size]);
        buf = &buf[size..];

        buf = if let Some(next) = buf.strip_prefix(b"\r\n") {
            next
        } else if let Some(next) = buf.strip_prefix(b"\n") {
            next
        } else {
            return Err(AdapterError::parse("missing chunk terminator"));
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_request() {
        let req = HttpAdapter::parse_request(b"GET /x HTTP/1.1\r\nHost: a\r\n\r\n").unwrap();
        assert_eq!(req.method(), Method::GET);
        assert_eq!(req.uri().path(), "/x");
        assert_eq!(req.version(), http::Version::HTTP_11);
        assert_eq!(req.headers()["host"], "a");
        assert!(req.body().is_empty());
    }

    #[test]
    fn test_request_body_by_content_length() {
        let raw = b"POST /submit HTTP/1.1\r\nHost: a\r\nContent-Length: 5\r\n\r\nhelloEXTRA";
        let req = HttpAdapter::parse_request(raw).unwrap();
        assert_eq!(req.body(), b"hello");
    }

    #[test]
    fn test_request_body_truncated() {
        let raw = b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc";
        let err = HttpAdapter::parse_request(raw).unwrap_err();
        assert!(err.to_string().contains("body shorter"));
    }

    #[test]
    fn test_invalid_content_length() {
        let raw = b"POST / HTTP/1.1\r\nContent-Length: -1\r\n\r\n";
        assert!(HttpAdapter::parse_request(raw).is_err());

        let raw = b"POST / HTTP/1.1\r\nContent-Length: 2\r\nContent-Length: 3\r\n\r\nabc";
        assert!(HttpAdapter::parse_request(raw).is_err());
    }

    #[test]
    fn test_chunked_request() {
        let raw = b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n";
        let req = HttpAdapter::parse_request(raw).unwrap();
        assert_eq!(req.body(), b"Wikipedia");
    }

    #[test]
    fn test_chunked_truncated() {
        let raw = b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n9\r\nWiki";
        assert!(HttpAdapter::parse_request(raw).is_err());
    }

    #[test]
    fn test_incomplete_head() {
        let err = HttpAdapter::parse_request(b"GET / HTTP/1.1\r\nHost: a").unwrap_err();
        assert_eq!(err, AdapterError::parse("incomplete message"));
    }

    #[test]
    fn test_response_with_body_until_end() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nhello world";
        let resp = HttpAdapter::parse_response(raw).unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.body(), b"hello world");
    }

    #[test]
    fn test_no_content_response_ignores_trailing_bytes() {
        let raw = b"HTTP/1.1 204 No Content\r\n\r\nleftover";
        let resp = HttpAdapter::parse_response(raw).unwrap();
        assert!(resp.body().is_empty());
    }

    #[test]
    fn test_request_parsed_as_response_fails() {
        let mut adapter = HttpAdapter::new(Orientation::Response);
        assert!(adapter.parse(b"GET / HTTP/1.1\r\n\r\n").is_err());
    }

    #[test]
    fn test_too_many_headers() {
        let mut raw = String::from("GET / HTTP/1.1\r\n");
        for i in 0..(MAX_HEADERS + 1) {
            raw.push_str(&format!("X-H{}: v\r\n", i));
        }
        raw.push_str("\r\n");
        assert!(HttpAdapter::parse_request(raw.as_bytes()).is_err());
    }
}
