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

use crate::constants::*;
use crate::params::{flatten, Params};
use crate::{Credential, Endpoint};
use cachesign_core::hash::{base64_hmac_sha1, base64_hmac_sha256};
use cachesign_core::time::{format_iso8601_with_separator, now, DateTime};
use cachesign_core::{Error, Result};
use log::debug;
use percent_encoding::utf8_percent_encode;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Keyed-hash algorithm of signature version 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureMethod {
    /// `HmacSHA256`
    #[default]
    HmacSha256,
    /// `HmacSHA1`
    HmacSha1,
}

impl SignatureMethod {
    /// Value of the `SignatureMethod` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureMethod::HmacSha256 => "HmacSHA256",
            SignatureMethod::HmacSha1 => "HmacSHA1",
        }
    }

    fn sign(&self, key: &[u8], content: &[u8]) -> String {
        match self {
            SignatureMethod::HmacSha256 => base64_hmac_sha256(key, content),
            SignatureMethod::HmacSha1 => base64_hmac_sha1(key, content),
        }
    }
}

impl Display for SignatureMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "HmacSHA256" => Ok(SignatureMethod::HmacSha256),
            "HmacSHA1" => Ok(SignatureMethod::HmacSha1),
            v => Err(Error::config_invalid(format!(
                "signature method {v} is not supported"
            ))),
        }
    }
}

/// RequestSigner that implements query API signature version 2.
///
/// - [Signature Version 2 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-2.html)
///
/// The output is the complete form-encoded request body, including the
/// trailing `Signature` parameter.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    endpoint: Endpoint,
    method: SignatureMethod,

    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer for the given endpoint.
    pub fn new(endpoint: Endpoint, method: SignatureMethod) -> Self {
        Self {
            endpoint,
            method,

            time: None,
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Sign `action` with `params` and return the encoded request body.
    pub fn sign(&self, action: &str, params: &Params, cred: &Credential) -> Result<String> {
        if action.is_empty() {
            return Err(Error::request_invalid("action must not be empty"));
        }
        if cred.access_key_id.is_empty() || cred.secret_access_key.is_empty() {
            return Err(Error::credential_invalid(
                "access key id and secret access key are required for signing",
            ));
        }

        let now = self.time.unwrap_or_else(now);

        let mut query = flatten(params)?;
        // Metadata always wins over caller supplied keys.
        query.insert(PARAM_ACTION.to_string(), action.to_string());
        query.insert(
            PARAM_VERSION.to_string(),
            self.endpoint.api_version.clone(),
        );
        query.insert(
            PARAM_ACCESS_KEY_ID.to_string(),
            cred.access_key_id.clone(),
        );
        match &cred.session_token {
            Some(token) => {
                query.insert(PARAM_SECURITY_TOKEN.to_string(), token.clone());
            }
            None => {
                query.remove(PARAM_SECURITY_TOKEN);
            }
        }
        query.insert(
            PARAM_TIMESTAMP.to_string(),
            format_iso8601_with_separator(now),
        );
        query.insert(
            PARAM_SIGNATURE_METHOD.to_string(),
            self.method.as_str().to_string(),
        );
        query.insert(
            PARAM_SIGNATURE_VERSION.to_string(),
            SIGNATURE_VERSION.to_string(),
        );
        query.remove(PARAM_SIGNATURE);

        let canonical = canonical_query_string(&query);
        let string_to_sign = string_to_sign(
            &self.endpoint.host_header(),
            &self.endpoint.path,
            &canonical,
        );
        debug!("calculated string to sign: {string_to_sign}");

        let signature = self
            .method
            .sign(cred.secret_access_key.as_bytes(), string_to_sign.as_bytes());

        Ok(format!(
            "{canonical}&{PARAM_SIGNATURE}={}",
            utf8_percent_encode(&signature, &QUERY_ENCODE_SET)
        ))
    }
}

/// Build the canonical query string.
///
/// Keys are sorted by byte order, keys and values are percent encoded with
/// [`QUERY_ENCODE_SET`], pairs are joined by `&`.
pub fn canonical_query_string(query: &BTreeMap<String, String>) -> String {
    query
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                utf8_percent_encode(k, &QUERY_ENCODE_SET),
                utf8_percent_encode(v, &QUERY_ENCODE_SET)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the string to sign.
///
/// ```text
/// POST
/// elasticache.us-east-1.amazonaws.com
/// /
/// AWSAccessKeyId=...&Action=...
/// ```
pub fn string_to_sign(host: &str, path: &str, canonical_query: &str) -> String {
    format!("POST\n{host}\n{path}\n{canonical_query}")
}
