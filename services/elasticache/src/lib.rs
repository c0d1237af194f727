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

//! Signed query API client for the cache cluster management service.
//!
//! Calls are signed with signature version 2 over form encoded parameters
//! and sent with a blocking HTTP client. Failures are classified into a few
//! semantic kinds, everything else is returned unchanged.
//!
//! ## Example
//!
//! ```no_run
//! use cachesign_elasticache::response::raw_body;
//! use cachesign_elasticache::{Client, Config, Operation, Params};
//!
//! fn main() -> Result<(), cachesign_elasticache::Error> {
//!     let client = Client::new(Config {
//!         region: Some("us-west-2".to_string()),
//!         ..Default::default()
//!     })?;
//!
//!     let mut params = Params::new();
//!     params.insert("ShowCacheNodeInfo".to_string(), true.into());
//!
//!     let body = client.request(Operation::DescribeCacheClusters, &params, raw_body)?;
//!     println!("{}", String::from_utf8_lossy(&body));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

mod constants;

mod client;
pub use client::CallOptions;
pub use client::Client;

mod config;
pub use config::Config;

mod connection;
pub use connection::Connection;

mod credential;
pub use credential::Credential;

mod endpoint;
pub use endpoint::Endpoint;

mod error;
pub use error::classify;
pub use error::Error;
pub use error::ErrorDetail;
pub use error::ErrorResponse;
pub use error::ServiceError;
pub use error::ServiceErrorKind;
pub use error::TransportError;

mod operation;
pub use operation::Operation;

mod params;
pub use params::flatten;
pub use params::Params;
pub use params::Value;

mod provide_credential;
pub use provide_credential::*;

pub mod response;

mod sign_request;
pub use sign_request::canonical_query_string;
pub use sign_request::string_to_sign;
pub use sign_request::RequestSigner;
pub use sign_request::SignatureMethod;
