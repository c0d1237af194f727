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

use cachesign_core::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

macro_rules! operations {
    ($($(#[$meta:meta])* $variant:ident => $name:literal,)*) => {
        /// Operations supported by the cache cluster management API.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Operation {
            $($(#[$meta])* $variant,)*
        }

        impl Operation {
            /// Every supported operation.
            pub const ALL: &'static [Operation] = &[$(Operation::$variant,)*];

            /// Value of the `Action` parameter, e.g. `DescribeCacheClusters`.
            pub fn action(&self) -> &'static str {
                match self {
                    $(Operation::$variant => stringify!($variant),)*
                }
            }

            /// Snake case name, e.g. `describe_cache_clusters`.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Operation::$variant => $name,)*
                }
            }
        }
    };
}

operations! {
    /// Create a cache cluster.
    CreateCacheCluster => "create_cache_cluster",
    /// Delete a cache cluster.
    DeleteCacheCluster => "delete_cache_cluster",
    /// List cache clusters.
    DescribeCacheClusters => "describe_cache_clusters",
    /// Change the settings of a cache cluster.
    ModifyCacheCluster => "modify_cache_cluster",
    /// Reboot some or all nodes of a cache cluster.
    RebootCacheCluster => "reboot_cache_cluster",
    /// Create a cache parameter group.
    CreateCacheParameterGroup => "create_cache_parameter_group",
    /// Delete a cache parameter group.
    DeleteCacheParameterGroup => "delete_cache_parameter_group",
    /// List cache parameter groups.
    DescribeCacheParameterGroups => "describe_cache_parameter_groups",
    /// Change parameters of a cache parameter group.
    ModifyCacheParameterGroup => "modify_cache_parameter_group",
    /// Reset parameters of a cache parameter group to their defaults.
    ResetCacheParameterGroup => "reset_cache_parameter_group",
    /// List the default parameters of an engine.
    DescribeEngineDefaultParameters => "describe_engine_default_parameters",
    /// List the parameters of a cache parameter group.
    DescribeCacheParameters => "describe_cache_parameters",
    /// Create a cache security group.
    CreateCacheSecurityGroup => "create_cache_security_group",
    /// Delete a cache security group.
    DeleteCacheSecurityGroup => "delete_cache_security_group",
    /// List cache security groups.
    DescribeCacheSecurityGroups => "describe_cache_security_groups",
    /// Allow an EC2 security group to reach a cache security group.
    AuthorizeCacheSecurityGroupIngress => "authorize_cache_security_group_ingress",
    /// Remove an ingress rule from a cache security group.
    RevokeCacheSecurityGroupIngress => "revoke_cache_security_group_ingress",
    /// List events.
    DescribeEvents => "describe_events",
}

impl Operation {
    /// Read-only operations may be retried on transient failures.
    pub fn is_idempotent(&self) -> bool {
        self.action().starts_with("Describe")
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.action())
    }
}

impl FromStr for Operation {
    type Err = Error;

    /// Parse either the action (`DescribeEvents`) or the snake case name
    /// (`describe_events`).
    fn from_str(s: &str) -> cachesign_core::Result<Self> {
        Operation::ALL
            .iter()
            .find(|op| op.action() == s || op.name() == s)
            .copied()
            .ok_or_else(|| Error::request_invalid(format!("unknown operation: {s}")))
    }
}
