// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use kube::Client;
use tracing::info;

use hdfs_operator::bootstrap::{fetch_cluster, init_tracing, target_key};
use hdfs_operator::config::Config;
use hdfs_operator::manager::{Manager, NameNodeManager};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    let client = Client::try_default()
        .await
        .context("failed to build Kubernetes client")?;

    let key = target_key(std::env::args().nth(1).as_deref(), &config)?;
    let cluster = fetch_cluster(client.clone(), &key)
        .await
        .with_context(|| format!("failed to fetch HdfsCluster {}", key))?;
    NameNodeManager::from_client(client)
        .sync(&cluster)
        .await
        .with_context(|| format!("name node sync failed for {}", cluster.key()))?;

    info!("Name node tier of {} is in sync", cluster.key());
    Ok(())
}
