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

use crate::error::classify;
use crate::{
    Config, Connection, Credential, DefaultCredentialProvider, Endpoint, Error, Operation,
    Params, RequestSigner,
};
use bytes::Bytes;
use cachesign_core::{Context, CredentialStore, OsEnv, ProvideCredential};
use cachesign_http_send_reqwest::ReqwestHttpSend;
use log::debug;

/// Per call options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Allow retries on transient transport failures.
    pub idempotent: bool,
}

/// Client signs and dispatches calls to the cache cluster management API.
///
/// Every call runs through the same steps on the calling thread:
///
/// 1. refresh the credential if it has expired
/// 2. sign the parameters
/// 3. send the signed body
/// 4. hand the body to the parser, or classify the failure
///
/// `Client` is `Send + Sync`; share it behind an `Arc` to call from many
/// threads.
#[derive(Debug)]
pub struct Client {
    endpoint: Endpoint,
    store: CredentialStore<Credential>,
    signer: RequestSigner,
    connection: Connection,
}

impl Client {
    /// Build a client that talks over reqwest and reads the process env.
    pub fn new(config: Config) -> Result<Self, Error> {
        let mut http = ReqwestHttpSend::new().with_persistent(config.persistent);
        if let Some(timeout) = config.timeout {
            http = http.with_timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            http = http.with_connect_timeout(timeout);
        }

        let ctx = Context::new().with_http_send(http).with_env(OsEnv);
        Self::with_context(ctx, config)
    }

    /// Build a client on the given context.
    ///
    /// Unset config fields are filled from the context env and credentials
    /// come from [`DefaultCredentialProvider`].
    pub fn with_context(ctx: Context, config: Config) -> Result<Self, Error> {
        let config = config.from_env(&ctx);
        let provider = DefaultCredentialProvider::new(&config);
        Self::with_provider(ctx, config, provider)
    }

    /// Build a client that refreshes credentials from `provider`.
    ///
    /// Keys set in `config` are used until they expire.
    pub fn with_provider(
        ctx: Context,
        config: Config,
        provider: impl ProvideCredential<Credential = Credential>,
    ) -> Result<Self, Error> {
        let endpoint = config.endpoint();
        debug!("building client for endpoint {}", endpoint.url());

        let connection =
            Connection::new(&ctx, &endpoint, config.retry_limit).map_err(Error::Config)?;
        let signer = RequestSigner::new(endpoint.clone(), config.signature_method);

        let mut store = CredentialStore::new(ctx, provider);
        if let Some(cred) = config.credential() {
            store = store.with_credential(cred);
        }

        Ok(Self {
            endpoint,
            store,
            signer,
            connection,
        })
    }

    /// Sign and send `action` with `params`, then run `parser` on the body.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no usable credential can be loaded; nothing is sent
    /// - [`Error::Signing`] if the parameters can't be signed; nothing is sent
    /// - [`Error::Service`] for the classified service error codes
    /// - [`Error::Transport`] for every other transport failure, unchanged
    /// - [`Error::Parse`] if `parser` fails
    pub fn call<T, F>(
        &self,
        action: &str,
        params: &Params,
        options: CallOptions,
        parser: F,
    ) -> Result<T, Error>
    where
        F: FnOnce(Bytes) -> anyhow::Result<T>,
    {
        let cred = self.store.refresh_if_expired().map_err(Error::Config)?;
        let body = self
            .signer
            .sign(action, params, &cred)
            .map_err(Error::Signing)?;

        debug!("sending {action} to {}", self.connection.url());
        let resp = self
            .connection
            .send(Bytes::from(body), options.idempotent)
            .map_err(classify)?;

        parser(resp.into_body()).map_err(Error::Parse)
    }

    /// Call a registered operation, with retries allowed for read-only ones.
    pub fn request<T, F>(&self, operation: Operation, params: &Params, parser: F) -> Result<T, Error>
    where
        F: FnOnce(Bytes) -> anyhow::Result<T>,
    {
        self.call(
            operation.action(),
            params,
            CallOptions {
                idempotent: operation.is_idempotent(),
            },
            parser,
        )
    }

    /// Reset the connection; the next call reconnects.
    pub fn reload(&self) {
        self.connection.reset();
    }

    /// Endpoint this client talks to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The credential currently held, without refreshing it.
    pub fn credential(&self) -> Option<Credential> {
        self.store.current()
    }

    /// Load a fresh credential from the provider now.
    pub fn refresh_credential(&self) -> Result<Credential, Error> {
        self.store.refresh().map_err(Error::Config)
    }
}
