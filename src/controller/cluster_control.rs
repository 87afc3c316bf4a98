// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Orders one reconcile pass across the tiers: NameNode first, then the
//! availability gate, then DataNodes.

use crate::error::{HdfsOperatorError, Result};
use crate::manager::{CheckAvailability, Manager};
use crate::types::HdfsCluster;
use async_trait::async_trait;
use tracing::{error, info, instrument};

/// Brings one HdfsCluster's children in line with its spec
#[async_trait]
pub trait ClusterControl: Send + Sync {
    async fn update_cluster(&self, cluster: &HdfsCluster) -> Result<()>;
}

pub struct HdfsClusterControl<N, D> {
    namenode: N,
    datanode: D,
}

impl<N, D> HdfsClusterControl<N, D>
where
    N: Manager + CheckAvailability,
    D: Manager,
{
    pub fn new(namenode: N, datanode: D) -> Self {
        Self { namenode, datanode }
    }

    /// Sync only the DataNode tier, still behind the NameNode availability gate
    #[instrument(skip(self, cluster), fields(cluster = %cluster.key()))]
    pub async fn sync_data_nodes(&self, cluster: &HdfsCluster) -> Result<()> {
        self.ensure_namenode_available(cluster).await?;
        self.datanode.sync(cluster).await
    }

    async fn ensure_namenode_available(&self, cluster: &HdfsCluster) -> Result<()> {
        if !self.namenode.check_availability(cluster).await {
            error!("Name node service is not available");
            return Err(HdfsOperatorError::NameNodeUnavailable(cluster.key()));
        }
        Ok(())
    }
}

#[async_trait]
impl<N, D> ClusterControl for HdfsClusterControl<N, D>
where
    N: Manager + CheckAvailability,
    D: Manager,
{
    #[instrument(skip(self, cluster), fields(cluster = %cluster.key()))]
    async fn update_cluster(&self, cluster: &HdfsCluster) -> Result<()> {
        if let Err(e) = self.namenode.sync(cluster).await {
            error!("Update hdfs cluster failed: {}", e);
            return Err(e);
        }
        self.ensure_namenode_available(cluster).await?;
        if let Err(e) = self.datanode.sync(cluster).await {
            error!("Update hdfs cluster failed: {}", e);
            return Err(e);
        }
        info!("Hdfs cluster reconciled");
        Ok(())
    }
}
