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
use crate::{Credential, Endpoint, SignatureMethod};
use cachesign_core::time::DateTime;
use cachesign_core::utils::Redact;
use cachesign_core::Context;
use std::fmt::{Debug, Formatter};
use std::time::Duration;

/// Config for the cache cluster management client.
#[derive(Clone)]
pub struct Config {
    /// `region` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_REGION`, then `AWS_DEFAULT_REGION`
    /// - default to `us-east-1`
    pub region: Option<String>,
    /// Host override, default to `elasticache.<region>.amazonaws.com`.
    pub host: Option<String>,
    /// Path override, default to `/`.
    pub path: Option<String>,
    /// Port override, default to `443`.
    pub port: Option<u16>,
    /// Scheme override, default to `https`.
    pub scheme: Option<String>,
    /// Keep the connection open across calls.
    pub persistent: bool,

    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_ACCESS_KEY_ID`, only if neither key is set and
    ///   `use_iam_profile` is off
    pub access_key_id: Option<String>,
    /// `secret_access_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_SECRET_ACCESS_KEY`, together with `access_key_id`
    pub secret_access_key: Option<String>,
    /// `session_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_SESSION_TOKEN`, only when the keys come from env
    pub session_token: Option<String>,
    /// Expiry of the configured credential, `None` for long-lived keys.
    pub credentials_expire_at: Option<DateTime>,
    /// Fetch credentials from the instance profile metadata service instead
    /// of env keys. Keys set in this config are still used first.
    pub use_iam_profile: bool,
    /// `ec2_metadata_disabled` value will be loaded from:
    ///
    /// - this field
    /// - env value: `AWS_EC2_METADATA_DISABLED`
    pub ec2_metadata_disabled: bool,

    /// Keyed-hash algorithm used for signing.
    pub signature_method: SignatureMethod,
    /// Total timeout of one request.
    pub timeout: Option<Duration>,
    /// Timeout for establishing a connection.
    pub connect_timeout: Option<Duration>,
    /// Maximum attempts for idempotent calls on transient failures.
    pub retry_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: None,
            host: None,
            path: None,
            port: None,
            scheme: None,
            persistent: false,
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            credentials_expire_at: None,
            use_iam_profile: false,
            ec2_metadata_disabled: false,
            signature_method: SignatureMethod::default(),
            timeout: None,
            connect_timeout: None,
            retry_limit: DEFAULT_RETRY_LIMIT,
        }
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("region", &self.region)
            .field("host", &self.host)
            .field("path", &self.path)
            .field("port", &self.port)
            .field("scheme", &self.scheme)
            .field("persistent", &self.persistent)
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .field("credentials_expire_at", &self.credentials_expire_at)
            .field("use_iam_profile", &self.use_iam_profile)
            .field("ec2_metadata_disabled", &self.ec2_metadata_disabled)
            .field("signature_method", &self.signature_method)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("retry_limit", &self.retry_limit)
            .finish()
    }
}

impl Config {
    /// Fill unset fields from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let envs = ctx.env_vars();

        if self.region.is_none() {
            self.region = envs
                .get(AWS_REGION)
                .or_else(|| envs.get(AWS_DEFAULT_REGION))
                .cloned();
        }
        // Keys and token are taken from env as one set, never mixed with
        // configured ones.
        if self.access_key_id.is_none()
            && self.secret_access_key.is_none()
            && !self.use_iam_profile
        {
            if let (Some(ak), Some(sk)) =
                (envs.get(AWS_ACCESS_KEY_ID), envs.get(AWS_SECRET_ACCESS_KEY))
            {
                self.access_key_id = Some(ak.clone());
                self.secret_access_key = Some(sk.clone());
                if self.session_token.is_none() {
                    self.session_token = envs.get(AWS_SESSION_TOKEN).cloned();
                }
            }
        }
        if let Some(v) = envs.get(AWS_EC2_METADATA_DISABLED) {
            self.ec2_metadata_disabled = v == "true";
        }

        self
    }

    /// Region in use, default to `us-east-1`.
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Resolve the endpoint descriptor from region and overrides.
    pub fn endpoint(&self) -> Endpoint {
        let mut ep = Endpoint::for_region(self.region());
        if let Some(v) = &self.host {
            ep.host = v.clone();
        }
        if let Some(v) = &self.path {
            ep.path = v.clone();
        }
        if let Some(v) = self.port {
            ep.port = v;
        }
        if let Some(v) = &self.scheme {
            ep.scheme = v.clone();
        }
        ep
    }

    /// The statically configured credential, if both keys are present.
    pub fn credential(&self) -> Option<Credential> {
        let (Some(ak), Some(sk)) = (&self.access_key_id, &self.secret_access_key) else {
            return None;
        };

        Some(Credential {
            access_key_id: ak.clone(),
            secret_access_key: sk.clone(),
            session_token: self.session_token.clone(),
            expires_in: self.credentials_expire_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachesign_core::StaticEnv;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn ctx_with_envs(envs: &[(&str, &str)]) -> Context {
        Context::new().with_env(StaticEnv {
            envs: envs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        })
    }

    #[test]
    fn test_default_endpoint() {
        let ep = Config::default().endpoint();
        assert_eq!(ep.url(), "https://elasticache.us-east-1.amazonaws.com:443/");
    }

    #[test]
    fn test_endpoint_overrides() {
        let cfg = Config {
            region: Some("ap-southeast-2".to_string()),
            host: Some("localhost".to_string()),
            port: Some(4566),
            scheme: Some("http".to_string()),
            path: Some("/elasticache/".to_string()),
            ..Default::default()
        };
        assert_eq!(cfg.endpoint().url(), "http://localhost:4566/elasticache/");
    }

    #[test]
    fn test_from_env_fills_unset_fields() {
        let ctx = ctx_with_envs(&[
            (AWS_DEFAULT_REGION, "eu-central-1"),
            (AWS_ACCESS_KEY_ID, "env_access_key"),
            (AWS_SECRET_ACCESS_KEY, "env_secret_key"),
            (AWS_SESSION_TOKEN, "env_session_token"),
            (AWS_EC2_METADATA_DISABLED, "true"),
        ]);

        let cfg = Config::default().from_env(&ctx);

        assert_eq!(cfg.region(), "eu-central-1");
        assert_eq!(cfg.access_key_id.as_deref(), Some("env_access_key"));
        assert_eq!(cfg.secret_access_key.as_deref(), Some("env_secret_key"));
        assert_eq!(cfg.session_token.as_deref(), Some("env_session_token"));
        assert!(cfg.ec2_metadata_disabled);
    }

    #[test]
    fn test_from_env_keeps_configured_keys_apart_from_env() {
        let ctx = ctx_with_envs(&[
            (AWS_ACCESS_KEY_ID, "env_access_key"),
            (AWS_SECRET_ACCESS_KEY, "env_secret_key"),
            (AWS_SESSION_TOKEN, "env_session_token"),
        ]);

        let cfg = Config {
            access_key_id: Some("config_access_key".to_string()),
            secret_access_key: Some("config_secret_key".to_string()),
            ..Default::default()
        }
        .from_env(&ctx);
        let cred = cfg.credential().expect("credential must be built");
        assert_eq!(cred.access_key_id, "config_access_key");
        assert_eq!(cred.secret_access_key, "config_secret_key");
        assert!(cred.session_token.is_none());

        // A half configured pair is not completed from env.
        let cfg = Config {
            access_key_id: Some("config_access_key".to_string()),
            ..Default::default()
        }
        .from_env(&ctx);
        assert!(cfg.secret_access_key.is_none());
        assert!(cfg.session_token.is_none());
        assert!(cfg.credential().is_none());
    }

    #[test]
    fn test_from_env_skips_env_keys_with_iam_profile() {
        let ctx = ctx_with_envs(&[
            (AWS_ACCESS_KEY_ID, "env_access_key"),
            (AWS_SECRET_ACCESS_KEY, "env_secret_key"),
            (AWS_SESSION_TOKEN, "env_session_token"),
        ]);

        let cfg = Config {
            use_iam_profile: true,
            ..Default::default()
        }
        .from_env(&ctx);
        assert!(cfg.access_key_id.is_none());
        assert!(cfg.session_token.is_none());
        assert!(cfg.credential().is_none());
    }

    #[test]
    fn test_aws_region_wins_over_default_region() {
        let ctx = ctx_with_envs(&[(AWS_REGION, "us-west-2"), (AWS_DEFAULT_REGION, "eu-west-1")]);
        assert_eq!(Config::default().from_env(&ctx).region(), "us-west-2");
    }

    #[test]
    fn test_static_credential_requires_both_keys() {
        let cfg = Config {
            access_key_id: Some("ak".to_string()),
            ..Default::default()
        };
        assert!(cfg.credential().is_none());

        let cfg = Config {
            secret_access_key: Some("sk".to_string()),
            session_token: Some("token".to_string()),
            ..cfg
        };
        let cred = cfg.credential().expect("credential must be built");
        assert_eq!(cred.session_token.as_deref(), Some("token"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let cfg = Config {
            secret_access_key: Some("wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY".to_string()),
            ..Default::default()
        };
        assert!(!format!("{cfg:?}").contains("K7MDENG"));
    }
}
