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

use crate::Credential;
use cachesign_core::{Context, ProvideCredential, Result};
use std::fmt::{Debug, Formatter};

/// FnCredentialProvider calls a closure every time credentials are needed.
///
/// ```
/// use cachesign_elasticache::{Credential, FnCredentialProvider};
///
/// let provider = FnCredentialProvider::new(|_| {
///     Ok(Some(Credential {
///         access_key_id: "access_key_id".to_string(),
///         secret_access_key: "secret_access_key".to_string(),
///         ..Default::default()
///     }))
/// });
/// ```
pub struct FnCredentialProvider<F> {
    f: F,
}

impl<F> FnCredentialProvider<F>
where
    F: Fn(&Context) -> Result<Option<Credential>> + Send + Sync + Unpin + 'static,
{
    /// Create a provider from `f`.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Debug for FnCredentialProvider<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnCredentialProvider").finish_non_exhaustive()
    }
}

impl<F> ProvideCredential for FnCredentialProvider<F>
where
    F: Fn(&Context) -> Result<Option<Credential>> + Send + Sync + Unpin + 'static,
{
    type Credential = Credential;

    fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        (self.f)(ctx)
    }
}
