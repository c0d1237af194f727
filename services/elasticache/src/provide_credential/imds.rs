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

use crate::constants::{AWS_EC2_METADATA_DISABLED, AWS_EC2_METADATA_SERVICE_ENDPOINT};
use crate::Credential;
use bytes::Bytes;
use cachesign_core::time::{now, parse_rfc3339, DateTime};
use cachesign_core::{Context, Error, ProvideCredential, Result};
use http::header::CONTENT_LENGTH;
use http::{Method, StatusCode};
use log::debug;
use serde::Deserialize;
use std::sync::{Arc, Mutex};

const DEFAULT_ENDPOINT: &str = "http://169.254.169.254";
// 21600s (6h) is recommended by AWS.
const TOKEN_TTL_SECONDS: i64 = 21600;

/// IMDSv2CredentialProvider loads the instance profile credentials from the
/// EC2 instance metadata service.
///
/// The session token is cached and refreshed 10 minutes before it expires.
#[derive(Debug, Clone)]
pub struct IMDSv2CredentialProvider {
    endpoint: Option<String>,
    disabled: bool,
    token: Arc<Mutex<(String, DateTime)>>,
}

impl Default for IMDSv2CredentialProvider {
    fn default() -> Self {
        Self {
            endpoint: None,
            disabled: false,
            token: Arc::new(Mutex::new((String::new(), DateTime::default()))),
        }
    }
}

impl IMDSv2CredentialProvider {
    /// Create a new `IMDSv2CredentialProvider` instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint for the metadata service.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Never contact the metadata service.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    fn get_endpoint(&self, ctx: &Context) -> String {
        self.endpoint.clone().unwrap_or_else(|| {
            ctx.env_var(AWS_EC2_METADATA_SERVICE_ENDPOINT)
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
        })
    }

    fn load_ec2_metadata_token(&self, ctx: &Context) -> Result<String> {
        {
            let (token, expires_in) = self.token.lock().expect("lock poisoned").clone();
            if expires_in > now() {
                return Ok(token);
            }
        }

        let endpoint = self.get_endpoint(ctx);
        let url = format!("{endpoint}/latest/api/token");
        let req = http::Request::builder()
            .uri(&url)
            .method(Method::PUT)
            .header(CONTENT_LENGTH, "0")
            .header(
                "x-aws-ec2-metadata-token-ttl-seconds",
                TOKEN_TTL_SECONDS.to_string(),
            )
            .body(Bytes::new())
            .map_err(|e| {
                Error::request_invalid("failed to build IMDS token request")
                    .with_source(e)
                    .with_context(format!("url: {url}"))
            })?;

        let resp = ctx.http_send_as_string(req).map_err(|e| {
            Error::unexpected("failed to connect to IMDS")
                .with_source(e)
                .with_context(format!("endpoint: {endpoint}"))
                .with_context("hint: check if running on EC2 instance")
                .set_retryable(true)
        })?;
        if resp.status() != StatusCode::OK {
            return Err(imds_error("fetch_imds_token", resp.status(), resp.body()));
        }

        let ec2_token = resp.into_body();
        // Refresh 10 minutes ahead of the real expiry.
        let expires_in = now()
            + chrono::TimeDelta::try_seconds(TOKEN_TTL_SECONDS - 600).expect("in bounds");
        *self.token.lock().expect("lock poisoned") = (ec2_token.clone(), expires_in);

        Ok(ec2_token)
    }

    fn get(&self, ctx: &Context, token: &str, path: &str, operation: &str) -> Result<String> {
        let url = format!(
            "{}/latest/meta-data/iam/security-credentials/{path}",
            self.get_endpoint(ctx)
        );
        let req = http::Request::builder()
            .uri(&url)
            .method(Method::GET)
            .header("x-aws-ec2-metadata-token", token)
            .body(Bytes::new())
            .map_err(|e| {
                Error::request_invalid("failed to build IMDS request")
                    .with_source(e)
                    .with_context(format!("url: {url}"))
            })?;

        let resp = ctx.http_send_as_string(req).map_err(|e| {
            Error::unexpected("failed to request IMDS")
                .with_source(e)
                .with_context(format!("operation: {operation}"))
                .set_retryable(true)
        })?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            // The token was revoked before its ttl, fetch a new one next time.
            *self.token.lock().expect("lock poisoned") = (String::new(), DateTime::default());
        }
        if resp.status() != StatusCode::OK {
            return Err(imds_error(operation, resp.status(), resp.body()));
        }
        Ok(resp.into_body())
    }
}

impl ProvideCredential for IMDSv2CredentialProvider {
    type Credential = Credential;

    fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let disabled_env = ctx
            .env_var(AWS_EC2_METADATA_DISABLED)
            .map(|v| v == "true")
            .unwrap_or(false);
        if self.disabled || disabled_env {
            debug!("IMDS is disabled, skipping");
            return Ok(None);
        }

        let token = self.load_ec2_metadata_token(ctx)?;

        // The role list holds one role name per line, the first one is used.
        let profiles = self.get(ctx, &token, "", "list_instance_profiles")?;
        let Some(profile_name) = profiles.lines().map(str::trim).find(|v| !v.is_empty()) else {
            return Err(
                Error::config_invalid("no IAM role attached to EC2 instance")
                    .with_context("hint: attach an IAM role to your EC2 instance"),
            );
        };

        let content = self.get(ctx, &token, profile_name, "fetch_credentials")?;
        let resp: Ec2MetadataIamSecurityCredentials =
            serde_json::from_str(&content).map_err(|e| {
                Error::unexpected("failed to parse IMDS credentials response")
                    .with_source(e)
                    .with_context(format!("response_length: {}", content.len()))
                    .with_context(format!("profile: {profile_name}"))
            })?;

        match resp.code.as_str() {
            "Success" => {}
            "AssumeRoleUnauthorizedAccess" => {
                return Err(Error::credential_denied(format!(
                    "EC2 instance not authorized to assume role: {}",
                    resp.message
                ))
                .with_context(format!("error_code: {}", resp.code))
                .with_context(format!("profile: {profile_name}")));
            }
            code if code.contains("Expired") => {
                return Err(Error::credential_expired(format!(
                    "IMDS credentials expired: {}",
                    resp.message
                ))
                .with_context(format!("error_code: {}", resp.code))
                .with_context(format!("profile: {profile_name}")));
            }
            _ => {
                return Err(Error::unexpected(format!(
                    "IMDS returned error: [{}] {}",
                    resp.code, resp.message
                ))
                .with_context(format!("profile: {profile_name}")));
            }
        }

        let expires_in = parse_rfc3339(&resp.expiration).map_err(|e| {
            Error::unexpected("failed to parse IMDS credential expiration time")
                .with_source(e)
                .with_context(format!("expiration_value: {}", resp.expiration))
        })?;

        Ok(Some(Credential {
            access_key_id: resp.access_key_id,
            secret_access_key: resp.secret_access_key,
            session_token: Some(resp.token),
            expires_in: Some(expires_in),
        }))
    }
}

fn imds_error(operation: &str, status: StatusCode, body: &str) -> Error {
    let err = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::credential_denied(format!("IMDS {operation} denied with status {status}"))
        }
        StatusCode::NOT_FOUND => {
            Error::config_invalid(format!("IMDS {operation} not found with status {status}"))
        }
        s if s.is_server_error() => {
            Error::unexpected(format!("IMDS {operation} failed with status {status}"))
                .set_retryable(true)
        }
        _ => Error::unexpected(format!("IMDS {operation} failed with status {status}")),
    };
    err.with_context(format!("response: {body}"))
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Ec2MetadataIamSecurityCredentials {
    access_key_id: String,
    secret_access_key: String,
    token: String,
    expiration: String,

    code: String,
    message: String,
}
