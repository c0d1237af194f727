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

use cachesign_core::{Error, Result};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Parameters of one call, keyed by parameter name.
pub type Params = BTreeMap<String, Value>;

/// Value is a parameter value before flattening.
///
/// Lists become `Key.1`, `Key.2`, ... and maps become `Key.Sub`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Omitted from the request.
    Null,
    /// A plain string value.
    String(String),
    /// Numbered members, starting at 1.
    List(Vec<Value>),
    /// Named members.
    Map(BTreeMap<String, Value>),
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::String(v.clone())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::String(v.to_string())
    }
}

macro_rules! value_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::String(v.to_string())
                }
            }
        )*
    };
}

value_from_integer!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(v: BTreeMap<String, T>) -> Self {
        Value::Map(v.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

/// Flatten nested params into the flat form-parameter map.
///
/// Already flattened keys such as `SecurityGroupNames.1` pass through as-is,
/// so both forms of the same request produce the same output. Producing one
/// key twice, or an empty key, is a [`cachesign_core::ErrorKind::RequestInvalid`] error.
pub fn flatten(params: &Params) -> Result<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for (k, v) in params {
        if k.is_empty() {
            return Err(Error::request_invalid("parameter name must not be empty"));
        }
        flatten_value(k.clone(), v, &mut out)?;
    }
    Ok(out)
}

fn flatten_value(key: String, value: &Value, out: &mut BTreeMap<String, String>) -> Result<()> {
    match value {
        Value::Null => Ok(()),
        Value::String(s) => match out.entry(key) {
            Entry::Vacant(e) => {
                e.insert(s.clone());
                Ok(())
            }
            Entry::Occupied(e) => Err(Error::request_invalid("parameter is given more than once")
                .with_context(format!("key: {}", e.key()))),
        },
        Value::List(values) => {
            for (idx, v) in values.iter().enumerate() {
                flatten_value(format!("{key}.{}", idx + 1), v, out)?;
            }
            Ok(())
        }
        Value::Map(values) => {
            for (sub, v) in values {
                if sub.is_empty() {
                    return Err(Error::request_invalid("nested parameter name must not be empty")
                        .with_context(format!("key: {key}")));
                }
                flatten_value(format!("{key}.{sub}"), v, out)?;
            }
            Ok(())
        }
    }
}
