//! REST API integration
//!
//! Client for the requirements-traceability backend. Requirement calls are
//! namespaced under the selected project; project calls are global.

pub mod client;
pub mod error;
pub mod transport;

pub use client::{normalize, Api, ApiClient, ExportKind, Scope};
pub use error::ApiError;
pub use transport::{HttpTransport, Method, RawResponse, Transport, TransportError};
