// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! HdfsCluster controller - turns HdfsCluster and DataNode StatefulSet
//! events into queued cluster keys and drives reconcile workers.

use crate::config::Config;
use crate::constants::crd::{GROUP, KIND};
use crate::controller::cluster_control::ClusterControl;
use crate::controller::key::ReconcileKey;
use crate::controller::queue::{ItemBackoff, WorkQueue};
use crate::error::{HdfsOperatorError, Result};
use crate::kubernetes::{CacheSynced, EventHandler, WatchEvent};
use crate::types::HdfsCluster;
use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::ResourceExt;
use kube_runtime::reflector::{ObjectRef, Store};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Read access to the HdfsCluster cache
pub trait ClusterLister: Send + Sync {
    fn get(&self, namespace: &str, name: &str) -> Option<Arc<HdfsCluster>>;
    fn keys(&self) -> Vec<ReconcileKey>;
}

impl ClusterLister for Store<HdfsCluster> {
    fn get(&self, namespace: &str, name: &str) -> Option<Arc<HdfsCluster>> {
        Store::get(self, &ObjectRef::new(name).within(namespace))
    }

    fn keys(&self) -> Vec<ReconcileKey> {
        self.state()
            .iter()
            .filter_map(|cluster| ReconcileKey::for_object(cluster.as_ref()).ok())
            .collect()
    }
}

pub struct HdfsClusterController {
    clusters: Arc<dyn ClusterLister>,
    control: Arc<dyn ClusterControl>,
    queue: Arc<WorkQueue<ReconcileKey>>,
    cache_synced: Vec<Arc<dyn CacheSynced>>,
    resync_period: Duration,
}

impl HdfsClusterController {
    pub fn new(
        clusters: Arc<dyn ClusterLister>,
        control: Arc<dyn ClusterControl>,
        cache_synced: Vec<Arc<dyn CacheSynced>>,
        config: &Config,
    ) -> Self {
        let backoff = ItemBackoff {
            base: config.retry_base_delay,
            max: config.retry_max_delay,
        };
        Self {
            clusters,
            control,
            queue: Arc::new(WorkQueue::new(backoff)),
            cache_synced,
            resync_period: config.resync_period,
        }
    }

    /// Wait for the caches, then reconcile with `workers` workers until
    /// `shutdown` resolves. In-flight reconciles finish before returning.
    pub async fn run(
        self: Arc<Self>,
        workers: usize,
        shutdown: impl Future<Output = ()> + Send,
    ) -> Result<()> {
        info!("Starting HdfsCluster controller");
        tokio::pin!(shutdown);

        let synced = tokio::select! {
            synced = self.wait_for_caches() => synced,
            _ = &mut shutdown => {
                info!("Shutdown requested before caches synced");
                self.queue.shut_down();
                return Ok(());
            }
        };
        if !synced {
            self.queue.shut_down();
            return Err(HdfsOperatorError::CacheSyncFailed);
        }

        info!("Caches synced, starting {} workers", workers);
        let handles: Vec<_> = (0..workers)
            .map(|id| {
                let controller = Arc::clone(&self);
                tokio::spawn(async move { controller.worker(id).await })
            })
            .collect();
        let resync = tokio::spawn(Arc::clone(&self).resync_loop());

        shutdown.await;
        info!("Shutting down HdfsCluster controller");
        self.queue.shut_down();
        resync.abort();

        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Worker exited abnormally: {}", e);
            }
        }
        Ok(())
    }

    async fn wait_for_caches(&self) -> bool {
        for cache in &self.cache_synced {
            if !cache.wait_synced().await {
                warn!("Unable to sync caches for HdfsCluster controller");
                return false;
            }
        }
        true
    }

    async fn worker(&self, id: usize) {
        debug!("Worker {} started", id);
        while self.process_next_work_item().await {}
        debug!("Worker {} stopped", id);
    }

    /// Re-enqueue every cached HdfsCluster each resync period
    async fn resync_loop(self: Arc<Self>) {
        if self.resync_period.is_zero() {
            return;
        }
        let mut ticker = tokio::time::interval(self.resync_period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let keys = self.clusters.keys();
            debug!("Resyncing {} HdfsClusters", keys.len());
            for key in keys {
                self.queue.add(key);
            }
        }
    }

    /// Handle one queued key. Returns false once the queue is shut down.
    async fn process_next_work_item(&self) -> bool {
        let Some(key) = self.queue.get().await else {
            return false;
        };

        match self.sync(&key).await {
            Ok(()) => self.queue.forget(&key),
            Err(e) => {
                warn!("Error syncing HdfsCluster {}, requeueing: {}", key, e);
                self.queue.add_rate_limited(key.clone());
            }
        }
        self.queue.done(&key);
        true
    }

    #[instrument(skip(self), fields(cluster = %key))]
    async fn sync(&self, key: &ReconcileKey) -> Result<()> {
        let started = Instant::now();
        debug!("Started syncing HdfsCluster");

        let Some(cluster) = self.clusters.get(&key.namespace, &key.name) else {
            info!("HdfsCluster has been deleted");
            return Ok(());
        };

        let result = self.control.update_cluster(&cluster).await;
        debug!("Finished syncing HdfsCluster ({:?})", started.elapsed());
        result
    }

    fn enqueue(&self, key: ReconcileKey) {
        debug!("Enqueueing HdfsCluster {}", key);
        self.queue.add(key);
    }

    fn enqueue_cluster(&self, cluster: &HdfsCluster) {
        match ReconcileKey::for_object(cluster) {
            Ok(key) => self.enqueue(key),
            Err(e) => warn!("Couldn't get key for HdfsCluster: {}", e),
        }
    }

    fn enqueue_owner(&self, set: &StatefulSet) {
        if let Some(key) = self.resolve_cluster_from_set(set) {
            self.enqueue(key);
        }
    }

    /// The HdfsCluster controlling `set`, if it is still the one in the cache
    fn resolve_cluster_from_set(&self, set: &StatefulSet) -> Option<ReconcileKey> {
        let owner = controller_of(set)?;
        if owner.kind != KIND || api_group(&owner.api_version) != GROUP {
            return None;
        }

        let namespace = set.namespace().unwrap_or_default();
        let cluster = self.clusters.get(&namespace, &owner.name)?;
        if cluster.uid().as_deref() != Some(owner.uid.as_str()) {
            debug!(
                "StatefulSet {} references a replaced HdfsCluster {}",
                set.name_any(),
                owner.name
            );
            return None;
        }
        Some(ReconcileKey::new(namespace, owner.name.clone()))
    }
}

fn controller_of(set: &StatefulSet) -> Option<&OwnerReference> {
    set.metadata
        .owner_references
        .as_ref()?
        .iter()
        .find(|owner| owner.controller == Some(true))
}

fn api_group(api_version: &str) -> &str {
    match api_version.split_once('/') {
        Some((group, _)) => group,
        None => "",
    }
}

impl EventHandler<HdfsCluster> for HdfsClusterController {
    fn on_event(&self, event: WatchEvent<HdfsCluster>) {
        match event {
            WatchEvent::Added(cluster) => {
                debug!("Adding HdfsCluster {}", cluster.key());
                self.enqueue_cluster(&cluster);
            }
            WatchEvent::Updated { new, .. } => {
                debug!("Updating HdfsCluster {}", new.key());
                self.enqueue_cluster(&new);
            }
            WatchEvent::Deleted(cluster) => {
                debug!("Deleting HdfsCluster {}", cluster.key());
                self.enqueue_cluster(&cluster);
            }
        }
    }
}

impl EventHandler<StatefulSet> for HdfsClusterController {
    fn on_event(&self, event: WatchEvent<StatefulSet>) {
        match event {
            WatchEvent::Added(set) => {
                if set.metadata.deletion_timestamp.is_some() {
                    debug!("StatefulSet {} added while terminating", set.name_any());
                }
                self.enqueue_owner(&set);
            }
            WatchEvent::Updated { old, new } => {
                if old.resource_version() == new.resource_version() {
                    return;
                }
                self.enqueue_owner(&new);
                let old_owner = controller_of(&old).map(|o| o.uid.as_str());
                let new_owner = controller_of(&new).map(|o| o.uid.as_str());
                if old_owner.is_some() && old_owner != new_owner {
                    self.enqueue_owner(&old);
                }
            }
            WatchEvent::Deleted(set) => {
                debug!("StatefulSet {} deleted", set.name_any());
                self.enqueue_owner(&set);
            }
        }
    }
}
