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

use crate::constants::{API_VERSION, DEFAULT_PATH, DEFAULT_PORT, DEFAULT_SCHEME, SERVICE_NAME};

/// Endpoint describes where requests go and which API version they speak.
///
/// Immutable once the client is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// `https` or `http`.
    pub scheme: String,
    /// Host name, e.g. `elasticache.us-east-1.amazonaws.com`.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Request path, always starting with `/`.
    pub path: String,
    /// API version sent as `Version`.
    pub api_version: String,
}

impl Endpoint {
    /// Build the default endpoint for a region.
    pub fn for_region(region: &str) -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            host: format!("{SERVICE_NAME}.{region}.amazonaws.com"),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.to_string(),
            api_version: API_VERSION.to_string(),
        }
    }

    /// Full URL of the endpoint: `https://host:443/`.
    pub fn url(&self) -> String {
        format!("{}://{}:{}{}", self.scheme, self.host, self.port, self.path)
    }

    /// Value of the `Host` header and of the host line in the string to sign.
    ///
    /// The host is lower-cased and the port is only kept when it is not the
    /// default one of the scheme.
    pub fn host_header(&self) -> String {
        let host = self.host.to_lowercase();
        let default_port = match self.scheme.as_str() {
            "http" => 80,
            "https" => 443,
            _ => 0,
        };

        if self.port == default_port {
            host
        } else {
            format!("{host}:{}", self.port)
        }
    }
}
