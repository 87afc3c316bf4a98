// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! DataNode scale-out policy.

use crate::error::{HdfsOperatorError, Result};
use crate::types::HdfsCluster;
use k8s_openapi::api::apps::v1::StatefulSet;
use kube::ResourceExt;
use tracing::info;

/// Decides the replica count applied in one reconcile pass
pub trait Scaler: Send + Sync {
    /// Adjust `desired` given the `live` StatefulSet
    fn scale_out(
        &self,
        cluster: &HdfsCluster,
        live: &StatefulSet,
        desired: &mut StatefulSet,
    ) -> Result<()>;
}

/// Adds exactly one DataNode per pass, so the next pass observes the new
/// member before another one is added
#[derive(Debug, Default, Clone, Copy)]
pub struct DataNodeScaler;

impl Scaler for DataNodeScaler {
    fn scale_out(
        &self,
        cluster: &HdfsCluster,
        live: &StatefulSet,
        desired: &mut StatefulSet,
    ) -> Result<()> {
        info!(
            "Scaling out {} from {} replicas",
            cluster.key(),
            replicas(live)
        );
        increase_replicas(desired, live)
    }
}

/// Replica count of a StatefulSet; Kubernetes defaults an unset count to 1
pub fn replicas(set: &StatefulSet) -> i32 {
    set.spec.as_ref().and_then(|s| s.replicas).unwrap_or(1)
}

fn increase_replicas(desired: &mut StatefulSet, live: &StatefulSet) -> Result<()> {
    let spec = desired.spec.as_mut().ok_or_else(|| {
        HdfsOperatorError::MissingMetadata(format!(
            "StatefulSet {} has no spec",
            desired.metadata.name.clone().unwrap_or_else(|| live.name_any())
        ))
    })?;
    spec.replicas = Some(replicas(live).saturating_add(1));
    Ok(())
}
