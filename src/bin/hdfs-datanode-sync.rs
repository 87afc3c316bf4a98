// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use kube::Client;
use std::sync::Arc;
use tracing::info;

use hdfs_operator::bootstrap::{fetch_cluster, init_tracing, target_key};
use hdfs_operator::config::Config;
use hdfs_operator::controller::HdfsClusterControl;
use hdfs_operator::manager::{DataNodeManager, DataNodeScaler, NameNodeManager};

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
    let control = HdfsClusterControl::new(
        NameNodeManager::from_client(client.clone()),
        DataNodeManager::from_client(client, Arc::new(DataNodeScaler)),
    );
    control
        .sync_data_nodes(&cluster)
        .await
        .with_context(|| format!("data node sync failed for {}", cluster.key()))?;

    info!("Data node tier of {} is in sync", cluster.key());
    Ok(())
}
