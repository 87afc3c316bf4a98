// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use k8s_openapi::api::apps::v1::StatefulSet;
use kube::{Api, Client};
use kube_runtime::watcher;
use std::sync::Arc;
use tracing::{info, warn};

use hdfs_operator::bootstrap::init_tracing;
use hdfs_operator::config::Config;
use hdfs_operator::constants::OPERATOR_NAME;
use hdfs_operator::controller::{HdfsClusterControl, HdfsClusterController};
use hdfs_operator::kubernetes::{wait_for_hdfs_cluster_crd, CacheSynced, Informer};
use hdfs_operator::manager::{DataNodeManager, DataNodeScaler, NameNodeManager};
use hdfs_operator::naming::{datanode_labels, label_selector};
use hdfs_operator::types::HdfsCluster;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    info!("Starting {}", OPERATOR_NAME);

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: watch_namespace={}, workers={}",
        config.watch_namespace.as_deref().unwrap_or("<all>"),
        config.workers
    );

    let client = Client::try_default()
        .await
        .context("failed to build Kubernetes client")?;
    info!("Connected to Kubernetes cluster");

    info!("Waiting for HdfsCluster CRD to become available...");
    wait_for_hdfs_cluster_crd(&client).await?;

    let (clusters, sets): (Api<HdfsCluster>, Api<StatefulSet>) = match &config.watch_namespace {
        Some(ns) => (
            Api::namespaced(client.clone(), ns),
            Api::namespaced(client.clone(), ns),
        ),
        None => (Api::all(client.clone()), Api::all(client.clone())),
    };

    let cluster_informer = Informer::new(clusters, watcher::Config::default());
    let set_informer = Informer::new(
        sets,
        watcher::Config::default().labels(&label_selector(&datanode_labels())),
    );
    let cluster_store = cluster_informer.store();
    let set_store = set_informer.store();

    let control = HdfsClusterControl::new(
        NameNodeManager::from_client(client.clone()),
        DataNodeManager::from_client(client, Arc::new(DataNodeScaler)),
    );
    let cache_synced: Vec<Arc<dyn CacheSynced>> =
        vec![Arc::new(cluster_store.clone()), Arc::new(set_store)];
    let controller = Arc::new(HdfsClusterController::new(
        Arc::new(cluster_store),
        Arc::new(control),
        cache_synced,
        &config,
    ));

    let informers = [
        tokio::spawn(cluster_informer.run(controller.clone())),
        tokio::spawn(set_informer.run(controller.clone())),
    ];

    let result = controller
        .run(config.workers, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await;

    for informer in informers {
        informer.abort();
    }
    result.context("HdfsCluster controller failed")?;

    info!("{} stopped", OPERATOR_NAME);
    Ok(())
}
