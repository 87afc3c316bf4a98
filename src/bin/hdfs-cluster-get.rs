// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use kube::Client;

use hdfs_operator::bootstrap::{fetch_cluster, init_tracing, target_key};
use hdfs_operator::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    let client = Client::try_default()
        .await
        .context("failed to build Kubernetes client")?;

    let key = target_key(std::env::args().nth(1).as_deref(), &config)?;
    let cluster = fetch_cluster(client, &key)
        .await
        .with_context(|| format!("failed to fetch HdfsCluster {}", key))?;
    print!("{}", serde_yaml::to_string(&cluster)?);
    Ok(())
}
