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

use crate::provide_credential::{
    EnvCredentialProvider, IMDSv2CredentialProvider, StaticCredentialProvider,
};
use crate::{Config, Credential};
use cachesign_core::{Context, ProvideCredential, ProvideCredentialChain, Result};

/// DefaultCredentialProvider is a loader that will try to load credential via default chains.
///
/// Resolution order:
///
/// 1. Keys set in [`Config`]
/// 2. Environment variables, or EC2 IMDSv2 if [`Config::use_iam_profile`]
///    is set
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl DefaultCredentialProvider {
    /// Create a new `DefaultCredentialProvider` instance from config.
    pub fn new(config: &Config) -> Self {
        let mut chain = ProvideCredentialChain::new();
        if let Some(cred) = config.credential() {
            chain = chain.push(StaticCredentialProvider::from(cred));
        }
        if config.use_iam_profile {
            chain = chain.push(
                IMDSv2CredentialProvider::new().with_disabled(config.ec2_metadata_disabled),
            );
        } else {
            chain = chain.push(EnvCredentialProvider::new());
        }

        Self { chain }
    }

    /// Create with a custom credential chain.
    pub fn with_chain(chain: ProvideCredentialChain<Credential>) -> Self {
        Self { chain }
    }
}

impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY};
    use cachesign_core::time::now;
    use cachesign_core::StaticEnv;
    use chrono::TimeDelta;
    use std::collections::HashMap;

    fn env_ctx() -> Context {
        Context::new().with_env(StaticEnv {
            envs: HashMap::from([
                (AWS_ACCESS_KEY_ID.to_string(), "env_access_key".to_string()),
                (AWS_SECRET_ACCESS_KEY.to_string(), "env_secret_key".to_string()),
            ]),
        })
    }

    #[test]
    fn test_config_keys_come_first() -> anyhow::Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let config = Config {
            access_key_id: Some("config_access_key".to_string()),
            secret_access_key: Some("config_secret_key".to_string()),
            ..Default::default()
        };
        let cred = DefaultCredentialProvider::new(&config)
            .provide_credential(&env_ctx())?
            .expect("credential must be provided");
        assert_eq!(cred.access_key_id, "config_access_key");
        Ok(())
    }

    #[test]
    fn test_expired_config_keys_fall_back_to_env() -> anyhow::Result<()> {
        let config = Config {
            access_key_id: Some("config_access_key".to_string()),
            secret_access_key: Some("config_secret_key".to_string()),
            credentials_expire_at: Some(now() - TimeDelta::try_minutes(1).expect("in bounds")),
            ..Default::default()
        };
        let cred = DefaultCredentialProvider::new(&config)
            .provide_credential(&env_ctx())?
            .expect("credential must be provided");
        assert_eq!(cred.access_key_id, "env_access_key");
        Ok(())
    }

    #[test]
    fn test_iam_profile_ignores_env_keys() -> anyhow::Result<()> {
        let config = Config {
            use_iam_profile: true,
            ec2_metadata_disabled: true,
            ..Default::default()
        };
        let cred = DefaultCredentialProvider::new(&config).provide_credential(&env_ctx())?;
        assert!(cred.is_none());
        Ok(())
    }

    #[test]
    fn test_nothing_configured() -> anyhow::Result<()> {
        let ctx = Context::new().with_env(StaticEnv::default());
        let cred = DefaultCredentialProvider::new(&Config::default()).provide_credential(&ctx)?;
        assert!(cred.is_none());
        Ok(())
    }
}
