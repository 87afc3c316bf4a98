// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Startup gate on the HdfsCluster CRD being served by the API server.

use crate::constants::crd::{GROUP, KIND, POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS, VERSION};
use crate::error::{HdfsOperatorError, Result};
use kube::core::GroupVersionKind;
use kube::discovery::pinned_kind;
use kube::Client;
use std::time::Duration;
use tracing::{info, warn};

/// Block until `storage.io/v1alpha1` serves the HdfsCluster kind, polling
/// with a doubling interval capped at [`POLL_MAX_INTERVAL_SECS`].
pub async fn wait_for_hdfs_cluster_crd(client: &Client) -> Result<()> {
    let gvk = GroupVersionKind::gvk(GROUP, VERSION, KIND);
    let mut interval = Duration::from_secs(POLL_INTERVAL_SECS);

    while !crd_served(client, &gvk).await {
        info!(
            "{}.{}/{} not served yet, polling again in {:?}",
            KIND, GROUP, VERSION, interval
        );
        tokio::time::sleep(interval).await;
        interval = next_interval(interval);
    }

    info!("{}.{}/{} is served", KIND, GROUP, VERSION);
    Ok(())
}

fn next_interval(interval: Duration) -> Duration {
    interval
        .saturating_mul(2)
        .min(Duration::from_secs(POLL_MAX_INTERVAL_SECS))
}

async fn crd_served(client: &Client, gvk: &GroupVersionKind) -> bool {
    match lookup_kind(client, gvk).await {
        Ok(served) => served,
        Err(e) => {
            warn!("Discovery of {} failed: {}", gvk.kind, e);
            false
        }
    }
}

/// Resolve the kind through the group-version's resource list. An unknown
/// group-version or a list without the kind means not served.
async fn lookup_kind(client: &Client, gvk: &GroupVersionKind) -> Result<bool> {
    match pinned_kind(client, gvk).await {
        Ok(_) => Ok(true),
        Err(kube::Error::Discovery(_)) => Ok(false),
        Err(e) => {
            let err = HdfsOperatorError::from(e);
            if err.is_not_found() {
                Ok(false)
            } else {
                Err(err)
            }
        }
    }
}
