//! HTTP transport
//!
//! The client talks to the network through the [`Transport`] trait so the
//! request/response normalization can be exercised without a server.

use serde_json::Value;
use std::fmt;
use std::io::Read;
use std::time::Duration;
use thiserror::Error;

/// HTTP methods used by the REST backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status and body of a completed exchange, whatever the status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The exchange could not be completed (DNS, connection, I/O)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Performs a single HTTP exchange
pub trait Transport: Send + Sync {
    /// Send `method url` with an optional JSON body.
    ///
    /// Non-success statuses are returned as `Ok`; only failures to complete
    /// the exchange are errors.
    fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<RawResponse, TransportError>;
}

/// Blocking transport backed by a `ureq` agent
#[derive(Debug, Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HttpTransport {
    /// Create a transport; `None` means requests may wait indefinitely
    pub fn new(timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            agent: builder.build(),
        }
    }
}

impl Transport for HttpTransport {
    fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<RawResponse, TransportError> {
        let request = self
            .agent
            .request(method.as_str(), url)
            .set("Accept", "application/json");

        let result = match body {
            Some(json) => request.send_json(json.clone()),
            None => request.call(),
        };

        // ureq reports 4xx/5xx as errors; the caller wants them as responses
        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => {
                return Err(TransportError(transport.to_string()))
            }
        };

        let status = response.status();
        let mut body = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|e| TransportError(format!("failed to read response body: {}", e)))?;

        Ok(RawResponse { status, body })
    }
}
