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

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

// Service defaults.
pub const SERVICE_NAME: &str = "elasticache";
pub const API_VERSION: &str = "2011-07-15";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_SCHEME: &str = "https";
pub const DEFAULT_PORT: u16 = 443;
pub const DEFAULT_PATH: &str = "/";
pub const DEFAULT_RETRY_LIMIT: u32 = 4;

// Signature version 2 query parameters.
pub const PARAM_ACTION: &str = "Action";
pub const PARAM_VERSION: &str = "Version";
pub const PARAM_ACCESS_KEY_ID: &str = "AWSAccessKeyId";
pub const PARAM_SECURITY_TOKEN: &str = "SecurityToken";
pub const PARAM_TIMESTAMP: &str = "Timestamp";
pub const PARAM_SIGNATURE_METHOD: &str = "SignatureMethod";
pub const PARAM_SIGNATURE_VERSION: &str = "SignatureVersion";
pub const PARAM_SIGNATURE: &str = "Signature";
pub const SIGNATURE_VERSION: &str = "2";

// Headers used in responses.
pub const X_AMZN_REQUESTID: &str = "x-amzn-requestid";

// Env values used in aws services.
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
pub const AWS_REGION: &str = "AWS_REGION";
pub const AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
pub const AWS_EC2_METADATA_DISABLED: &str = "AWS_EC2_METADATA_DISABLED";
pub const AWS_EC2_METADATA_SERVICE_ENDPOINT: &str = "AWS_EC2_METADATA_SERVICE_ENDPOINT";

/// AsciiSet for form parameters in signature version 2.
///
/// - Encode every byte except the unreserved characters: 'A'-'Z', 'a'-'z', '0'-'9', '-', '.', '_', and '~'.
/// - Space becomes `%20`, never `+`.
pub static QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
