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

use crate::{Context, Error, ProvideCredential, Result, SigningCredential};
use log::debug;
use std::fmt::{self, Debug};
use std::sync::{Arc, Mutex, RwLock};

/// CredentialStore holds the credential used for signing and refreshes it
/// from a [`ProvideCredential`] when it expires.
///
/// Reads only take a read lock. Refreshes are serialized by a separate
/// mutex, so concurrent callers that observe the same expiry trigger exactly
/// one load and all see the same refreshed credential.
#[derive(Clone)]
pub struct CredentialStore<K: SigningCredential> {
    ctx: Context,
    provider: Arc<dyn ProvideCredential<Credential = K>>,
    credential: Arc<RwLock<Option<K>>>,
    refresh_lock: Arc<Mutex<()>>,
}

impl<K: SigningCredential> Debug for CredentialStore<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("provider", &self.provider)
            .field("credential", &self.current())
            .finish()
    }
}

impl<K: SigningCredential> CredentialStore<K> {
    /// Create a new store that loads lazily on first use.
    pub fn new(ctx: Context, provider: impl ProvideCredential<Credential = K>) -> Self {
        Self {
            ctx,
            provider: Arc::new(provider),
            credential: Arc::new(RwLock::new(None)),
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Seed the store with an initial credential.
    pub fn with_credential(self, credential: K) -> Self {
        *self.credential.write().expect("lock poisoned") = Some(credential);
        self
    }

    /// Return the held credential without checking expiry.
    pub fn current(&self) -> Option<K> {
        self.credential.read().expect("lock poisoned").clone()
    }

    /// Check if the held credential is expired.
    ///
    /// An empty store counts as expired.
    pub fn is_expired(&self) -> bool {
        match self.credential.read().expect("lock poisoned").as_ref() {
            Some(k) => k.is_expired(),
            None => true,
        }
    }

    /// Load a new credential from the provider and replace the held one.
    pub fn refresh(&self) -> Result<K> {
        let _guard = self.refresh_lock.lock().expect("lock poisoned");
        self.load()
    }

    /// Return the held credential, refreshing it first if it is missing,
    /// invalid or expired.
    pub fn refresh_if_expired(&self) -> Result<K> {
        if let Some(k) = self.usable() {
            return Ok(k);
        }

        let _guard = self.refresh_lock.lock().expect("lock poisoned");
        // Another caller may have refreshed while we waited.
        if let Some(k) = self.usable() {
            return Ok(k);
        }
        self.load()
    }

    fn usable(&self) -> Option<K> {
        self.current().filter(|k| k.is_valid() && !k.is_expired())
    }

    // Caller must hold `refresh_lock`.
    fn load(&self) -> Result<K> {
        debug!("refreshing credential via {:?}", self.provider);

        let Some(k) = self.provider.provide_credential(&self.ctx)? else {
            return Err(Error::config_invalid("no valid credential found")
                .with_context(format!("provider: {:?}", self.provider)));
        };
        if !k.is_valid() {
            return Err(Error::credential_invalid("loaded credential is invalid")
                .with_context(format!("provider: {:?}", self.provider)));
        }
        if k.is_expired() {
            return Err(Error::credential_expired("loaded credential is already expired")
                .with_context(format!("provider: {:?}", self.provider)));
        }

        *self.credential.write().expect("lock poisoned") = Some(k.clone());
        Ok(k)
    }
}
