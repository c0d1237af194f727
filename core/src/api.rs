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

use crate::time::{is_expired_at, now, DateTime};
use crate::{Context, Result};
use std::fmt::Debug;

/// SigningCredential is the trait implemented by credentials used for signing.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Check if the credential carries everything needed to sign.
    fn is_valid(&self) -> bool;

    /// The instant after which the credential must not be used.
    ///
    /// `None` means the credential never expires.
    fn expires_at(&self) -> Option<DateTime> {
        None
    }

    /// Check if the credential has expired.
    fn is_expired(&self) -> bool {
        is_expired_at(self.expires_at(), now())
    }
}

/// ProvideCredential is the trait used to load credentials from a trust source.
///
/// Returning `Ok(None)` means this source has nothing to offer, which lets
/// a chain move on to the next provider.
pub trait ProvideCredential: Debug + Send + Sync + Unpin + 'static {
    /// Credential returned by this provider.
    type Credential: Send + Sync + Unpin + 'static;

    /// Load credential from the current context.
    fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>>;
}
