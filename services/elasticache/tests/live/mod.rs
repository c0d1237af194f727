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

use anyhow::Result;
use cachesign_elasticache::response::{raw_body, text_body};
use cachesign_elasticache::{Client, Config, Operation, Params};
use log::{debug, warn};
use std::env;

fn init_live_client() -> Option<Client> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("CACHESIGN_ELASTICACHE_TEST").ok().as_deref() != Some("on") {
        return None;
    }

    let config = Config {
        region: env::var("CACHESIGN_ELASTICACHE_REGION").ok(),
        access_key_id: Some(
            env::var("CACHESIGN_ELASTICACHE_ACCESS_KEY")
                .expect("env CACHESIGN_ELASTICACHE_ACCESS_KEY must set"),
        ),
        secret_access_key: Some(
            env::var("CACHESIGN_ELASTICACHE_SECRET_KEY")
                .expect("env CACHESIGN_ELASTICACHE_SECRET_KEY must set"),
        ),
        session_token: env::var("CACHESIGN_ELASTICACHE_SESSION_TOKEN").ok(),
        persistent: true,
        ..Default::default()
    };

    Some(Client::new(config).expect("client must build"))
}

#[test]
fn test_live_describe_cache_clusters() -> Result<()> {
    let Some(client) = init_live_client() else {
        warn!("CACHESIGN_ELASTICACHE_TEST is not set, skipped");
        return Ok(());
    };

    let mut params = Params::new();
    params.insert("MaxRecords".to_string(), 20u32.into());
    let body = client.request(Operation::DescribeCacheClusters, &params, text_body)?;
    debug!("got response: {body}");
    assert!(body.contains("DescribeCacheClustersResult"));
    Ok(())
}

#[test]
fn test_live_missing_cluster_is_not_found() -> Result<()> {
    let Some(client) = init_live_client() else {
        warn!("CACHESIGN_ELASTICACHE_TEST is not set, skipped");
        return Ok(());
    };

    let mut params = Params::new();
    params.insert(
        "CacheClusterId".to_string(),
        "cachesign-surely-not-exist".into(),
    );
    let err = client
        .request(Operation::DescribeCacheClusters, &params, raw_body)
        .expect_err("cluster must not exist");
    debug!("got error: {err}");
    assert!(err.is_not_found());
    Ok(())
}
