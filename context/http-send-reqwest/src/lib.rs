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

//! Blocking [`reqwest`] implementation of [`HttpSend`].

use bytes::Bytes;
use cachesign_core::{Error, HttpSend, Result};
use log::debug;
use reqwest::blocking::Client;
use std::sync::Mutex;
use std::time::Duration;

/// ReqwestHttpSend sends requests with a blocking reqwest client.
///
/// The client is built lazily on first send. [`HttpSend::reset`] drops it
/// together with its connection pool, so the next send reconnects.
///
/// With `persistent` disabled no idle connection is kept, which makes every
/// send open a fresh channel.
#[derive(Debug)]
pub struct ReqwestHttpSend {
    persistent: bool,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,

    client: Mutex<Option<Client>>,
}

impl Default for ReqwestHttpSend {
    fn default() -> Self {
        Self {
            persistent: true,
            timeout: None,
            connect_timeout: None,
            client: Mutex::new(None),
        }
    }
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with persistent connections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep connections open across sends.
    pub fn with_persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    /// Set the total timeout of one request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the timeout for establishing a connection.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    fn client(&self) -> Result<Client> {
        let mut guard = self.client.lock().expect("lock poisoned");
        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }

        let mut builder = Client::builder();
        if !self.persistent {
            builder = builder.pool_max_idle_per_host(0);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::config_invalid("failed to build http client").with_source(e))?;

        *guard = Some(client.clone());
        Ok(client)
    }

    #[cfg(test)]
    fn is_connected(&self) -> bool {
        self.client.lock().expect("lock poisoned").is_some()
    }
}

impl HttpSend for ReqwestHttpSend {
    fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let client = self.client()?;

        let (parts, body) = req.into_parts();
        let uri = parts.uri.to_string();
        let resp = client
            .request(parts.method, &uri)
            .headers(parts.headers)
            .body(body.to_vec())
            .send()
            .map_err(|e| {
                let retryable = e.is_timeout() || e.is_connect();
                Error::unexpected("failed to send http request")
                    .with_source(e)
                    .with_context(format!("uri: {uri}"))
                    .set_retryable(retryable)
            })?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().map_err(|e| {
            Error::unexpected("failed to read http response body")
                .with_source(e)
                .with_context(format!("uri: {uri}"))
                .set_retryable(true)
        })?;

        let mut builder = http::Response::builder().status(status);
        for (name, value) in headers.iter() {
            builder = builder.header(name, value);
        }
        Ok(builder.body(body)?)
    }

    fn reset(&self) {
        if self.client.lock().expect("lock poisoned").take().is_some() {
            debug!("http client dropped, next send will reconnect");
        }
    }
}
