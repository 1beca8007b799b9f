use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;
use url::form_urlencoded;

use crate::filter::QueryParameters;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("empty request")]
    Empty,

    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),

    #[error("invalid Content-Length: {0:?}")]
    InvalidContentLength(String),
}

#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub query_params: QueryParameters,
    pub headers: HashMap<String, String>,
}

impl Request {
    /// Declared body length; zero when the header is absent.
    pub fn content_length(&self) -> Result<u64, RequestError> {
        match self.headers.get("content-length") {
            Some(value) => value
                .parse()
                .map_err(|_| RequestError::InvalidContentLength(value.clone())),
            None => Ok(0),
        }
    }
}

/// Splits `target` into its path and decoded query parameters. A key given
/// more than once keeps its last value.
pub fn split_target(target: &str) -> (String, QueryParameters) {
    match target.split_once('?') {
        Some((path, query)) => {
            let params = form_urlencoded::parse(query.as_bytes())
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect();
            (path.to_string(), params)
        }
        None => (target.to_string(), HashMap::new()),
    }
}

pub fn parse_http_request(buffer: &[u8]) -> Result<Request, RequestError> {
    let request_str = String::from_utf8_lossy(buffer).to_string();

    // Only the header section matters; bodies are never inspected.
    let header_end = request_str.find("\r\n\r\n").unwrap_or(request_str.len());
    let mut lines = request_str[..header_end].lines();
    let request_line = lines.next().filter(|l| !l.trim().is_empty()).ok_or(RequestError::Empty)?;

    // e.g. "GET /teams?id=2 HTTP/1.1"
    let mut parts = request_line.split_whitespace();
    let (method, target) = match (parts.next(), parts.next()) {
        (Some(method), Some(target)) => (method.to_string(), target),
        _ => return Err(RequestError::MalformedRequestLine(request_line.to_string())),
    };
    let (path, query_params) = split_target(target);

    let mut headers = HashMap::new();
    for line in lines {
        if let Some((key, value)) = line.split_once(':') {
            headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    debug!(%method, %path, ?query_params, "Parsed request");

    Ok(Request {
        method,
        path,
        query_params,
        headers,
    })
}
