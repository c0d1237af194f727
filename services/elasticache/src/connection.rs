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

use crate::constants::X_AMZN_REQUESTID;
use crate::{Endpoint, TransportError};
use bytes::Bytes;
use cachesign_core::{Context, Error, HttpSend, Result};
use http::header::{CONTENT_TYPE, HOST};
use http::{HeaderValue, Method, StatusCode, Uri};
use log::{debug, warn};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Connection sends signed bodies to one endpoint.
///
/// The channel comes from the [`Context`]'s [`HttpSend`]; whether it stays
/// open between calls is decided by that implementation.
#[derive(Clone)]
pub struct Connection {
    url: String,
    uri: Uri,
    host: HeaderValue,
    http: Arc<dyn HttpSend>,
    retry_limit: u32,
}

impl Debug for Connection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("url", &self.url)
            .field("retry_limit", &self.retry_limit)
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Create a connection to `endpoint`.
    ///
    /// `retry_limit` is the total number of attempts made for idempotent sends.
    pub fn new(ctx: &Context, endpoint: &Endpoint, retry_limit: u32) -> Result<Self> {
        let url = endpoint.url();
        let uri: Uri = url.parse()?;
        let host = HeaderValue::from_str(&endpoint.host_header())?;

        Ok(Self {
            url,
            uri,
            host,
            http: ctx.http(),
            retry_limit: retry_limit.max(1),
        })
    }

    /// URL requests are sent to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST `body` and wait for the full response.
    ///
    /// Any status other than 200 is returned as [`TransportError::Status`].
    /// Idempotent sends are retried on server errors and transient network
    /// failures, with the channel reset before every retry.
    pub fn send(
        &self,
        body: Bytes,
        idempotent: bool,
    ) -> std::result::Result<http::Response<Bytes>, TransportError> {
        let attempts = if idempotent { self.retry_limit } else { 1 };

        let mut attempt = 1;
        loop {
            let err = match self.send_once(body.clone()) {
                Ok(resp) => return Ok(resp),
                Err(err) => err,
            };

            let retry = attempt < attempts && err.is_retryable();
            // At most one reset per failed attempt.
            if retry || matches!(err, TransportError::Network { .. }) {
                self.reset();
            }
            if !retry {
                return Err(err);
            }

            warn!("request to {} failed on attempt {attempt}, retrying: {err}", self.url);
            attempt += 1;
        }
    }

    /// Tear down the channel; the next send reconnects.
    pub fn reset(&self) {
        debug!("resetting connection to {}", self.url);
        self.http.reset();
    }

    fn send_once(&self, body: Bytes) -> std::result::Result<http::Response<Bytes>, TransportError> {
        let mut req = http::Request::new(body);
        *req.method_mut() = Method::POST;
        *req.uri_mut() = self.uri.clone();
        req.headers_mut().insert(HOST, self.host.clone());
        req.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=utf-8"),
        );

        let resp = self
            .http
            .http_send(req)
            .map_err(|source: Error| TransportError::Network {
                endpoint: self.url.clone(),
                source,
            })?;

        if resp.status() == StatusCode::OK {
            return Ok(resp);
        }

        let request_id = resp
            .headers()
            .get(X_AMZN_REQUESTID)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let status = resp.status();
        debug!("request to {} got status {status}", self.url);

        Err(TransportError::Status {
            endpoint: self.url.clone(),
            status,
            body: resp.into_body(),
            request_id,
        })
    }
}
