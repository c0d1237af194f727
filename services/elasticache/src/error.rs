// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use bytes::Bytes;
use http::StatusCode;
use log::debug;
use serde::Deserialize;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Maximum characters of a response body kept in error messages.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Errors returned by [`crate::Client`].
#[derive(Debug, Error)]
pub enum Error {
    /// Credentials could not be loaded or refreshed. No request was sent.
    #[error("configuration error: {0}")]
    Config(#[source] cachesign_core::Error),

    /// The request could not be signed. No request was sent.
    #[error("signing error: {0}")]
    Signing(#[source] cachesign_core::Error),

    /// Transport failure that is not one of the classified service errors.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Classified service error.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The caller supplied parser rejected a successful response.
    #[error("failed to parse response: {0}")]
    Parse(#[source] anyhow::Error),
}

impl Error {
    /// Kind of the service error, if this is one.
    pub fn service_kind(&self) -> Option<ServiceErrorKind> {
        match self {
            Error::Service(e) => Some(e.kind),
            _ => None,
        }
    }

    /// The resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.service_kind() == Some(ServiceErrorKind::NotFound)
    }

    /// The identifier is already in use.
    pub fn is_identifier_taken(&self) -> bool {
        self.service_kind() == Some(ServiceErrorKind::IdentifierTaken)
    }

    /// The service rejected a parameter value.
    pub fn is_invalid_instance(&self) -> bool {
        self.service_kind() == Some(ServiceErrorKind::InvalidInstance)
    }

    /// Request id reported by the service, if any.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Error::Service(e) => e.request_id.as_deref(),
            Error::Transport(e) => e.request_id(),
            _ => None,
        }
    }
}

/// Failure while exchanging a request with the service.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The service answered with a status other than 200.
    #[error("unexpected status {status} from {endpoint}: {}", body_excerpt(.body))]
    Status {
        /// Endpoint URL the request was sent to.
        endpoint: String,
        /// Response status.
        status: StatusCode,
        /// Raw response body.
        body: Bytes,
        /// Value of the `x-amzn-requestid` header.
        request_id: Option<String>,
    },

    /// The request never produced a response.
    #[error("failed to send request to {endpoint}")]
    Network {
        /// Endpoint URL the request was sent to.
        endpoint: String,
        /// Underlying failure.
        #[source]
        source: cachesign_core::Error,
    },
}

impl TransportError {
    /// Status of the response, if one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Network { .. } => None,
        }
    }

    /// Raw response body, if one was received.
    pub fn body(&self) -> Option<&Bytes> {
        match self {
            TransportError::Status { body, .. } => Some(body),
            TransportError::Network { .. } => None,
        }
    }

    /// Request id from the response headers, if any.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            TransportError::Status { request_id, .. } => request_id.as_deref(),
            TransportError::Network { .. } => None,
        }
    }

    /// Server errors and transient network failures may be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Status { status, .. } => status.is_server_error(),
            TransportError::Network { source, .. } => source.is_retryable(),
        }
    }
}

/// Semantic kinds of service errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// Cluster, security group or parameter group does not exist.
    NotFound,
    /// Identifier is already in use.
    IdentifierTaken,
    /// A parameter value was rejected.
    InvalidInstance,
}

impl ServiceErrorKind {
    /// Map a service error code. Only exact matches are classified.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "CacheClusterNotFound"
            | "CacheSecurityGroupNotFound"
            | "CacheParameterGroupNotFound" => Some(ServiceErrorKind::NotFound),
            "CacheSecurityGroupAlreadyExists" => Some(ServiceErrorKind::IdentifierTaken),
            "InvalidParameterValue" => Some(ServiceErrorKind::InvalidInstance),
            _ => None,
        }
    }
}

impl Display for ServiceErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceErrorKind::NotFound => write!(f, "not found"),
            ServiceErrorKind::IdentifierTaken => write!(f, "identifier taken"),
            ServiceErrorKind::InvalidInstance => write!(f, "invalid instance"),
        }
    }
}

/// Service error classified from an error response.
#[derive(Debug, Error)]
#[error("{kind}: [{code}] {message}")]
pub struct ServiceError {
    /// Semantic kind.
    pub kind: ServiceErrorKind,
    /// Error code reported by the service.
    pub code: String,
    /// Message reported by the service, empty if none.
    pub message: String,
    /// Request id reported by the service.
    pub request_id: Option<String>,
    /// The transport failure this error was classified from.
    #[source]
    pub transport: TransportError,
}

/// Error response document of the query API.
///
/// ```xml
/// <ErrorResponse>
///   <Error>
///     <Type>Sender</Type>
///     <Code>CacheClusterNotFound</Code>
///     <Message>Cache cluster foo not found.</Message>
///   </Error>
///   <RequestId>7a62c49f-347e-4fc4-9331-6e8eEXAMPLE</RequestId>
/// </ErrorResponse>
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ErrorResponse {
    /// The error.
    pub error: ErrorDetail,
    /// Request id.
    pub request_id: Option<String>,
}

/// Error element of [`ErrorResponse`].
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ErrorDetail {
    /// `Sender` or `Receiver`.
    pub r#type: Option<String>,
    /// Error code.
    pub code: String,
    /// Human readable message.
    pub message: Option<String>,
}

/// Turn a transport failure into a classified error.
///
/// Unclassified codes, bodies without a code and network failures are
/// returned as [`Error::Transport`] unchanged.
pub fn classify(err: TransportError) -> Error {
    let TransportError::Status { body, .. } = &err else {
        return Error::Transport(err);
    };

    let body = String::from_utf8_lossy(body);
    let Some(detail) = extract_error(&body) else {
        debug!("no error code found in response body");
        return Error::Transport(err);
    };
    let Some(kind) = ServiceErrorKind::from_code(&detail.error.code) else {
        debug!("error code {} is not classified", detail.error.code);
        return Error::Transport(err);
    };

    let request_id = detail
        .request_id
        .or_else(|| err.request_id().map(|v| v.to_string()));
    Error::Service(ServiceError {
        kind,
        code: detail.error.code,
        message: detail.error.message.unwrap_or_default(),
        request_id,
        transport: err,
    })
}

/// Extract the error detail, structured parse first, raw `<Code>` scan after.
fn extract_error(body: &str) -> Option<ErrorResponse> {
    if let Ok(resp) = quick_xml::de::from_str::<ErrorResponse>(body) {
        if !resp.error.code.is_empty() {
            return Some(resp);
        }
    }

    let code = scan_element(body, "Code")?;
    if code.is_empty() {
        return None;
    }
    Some(ErrorResponse {
        error: ErrorDetail {
            r#type: None,
            code: code.to_string(),
            message: scan_element(body, "Message").map(|v| v.to_string()),
        },
        request_id: scan_element(body, "RequestId").map(|v| v.to_string()),
    })
}

fn scan_element<'a>(body: &'a str, name: &str) -> Option<&'a str> {
    let open = format!("<{name}>");
    let close = format!("</{name}>");

    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(body[start..end].trim())
}

fn body_excerpt(body: &Bytes) -> String {
    truncate_str(&String::from_utf8_lossy(body), MAX_ERROR_BODY_CHARS).to_string()
}

/// Truncates a string to at most `max_chars` characters on a valid UTF-8 boundary.
fn truncate_str(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
