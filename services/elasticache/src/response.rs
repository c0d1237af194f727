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

//! Parsers for successful responses, ready to pass to [`crate::Client::call`].

use anyhow::Context as _;
use bytes::Bytes;
use serde::de::DeserializeOwned;

/// Hand the body back untouched.
pub fn raw_body(body: Bytes) -> anyhow::Result<Bytes> {
    Ok(body)
}

/// Decode the body as UTF-8 text.
pub fn text_body(body: Bytes) -> anyhow::Result<String> {
    String::from_utf8(body.to_vec()).context("response body is not valid utf-8")
}

/// Deserialize the XML body into `T`.
///
/// The root element is not matched against `T`, so a type describing the
/// inside of `<DescribeCacheClustersResponse>` can be used directly.
pub fn parse_xml<T: DeserializeOwned>(body: Bytes) -> anyhow::Result<T> {
    let text = text_body(body)?;
    quick_xml::de::from_str(&text).with_context(|| {
        format!(
            "failed to deserialize response as {}",
            std::any::type_name::<T>()
        )
    })
}
