// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Desired-state managers for the NameNode and DataNode tiers.

pub mod datanode;
pub mod namenode;
pub mod scaler;

pub use datanode::DataNodeManager;
pub use namenode::NameNodeManager;
pub use scaler::{DataNodeScaler, Scaler};

use crate::error::Result;
use crate::kubernetes::ObjectControl;
use crate::types::HdfsCluster;
use async_trait::async_trait;
use kube::{Resource, ResourceExt};
use tracing::{debug, info};

/// Converges one tier's child objects toward the cluster spec
#[async_trait]
pub trait Manager: Send + Sync {
    async fn sync(&self, cluster: &HdfsCluster) -> Result<()>;
}

/// Reports whether a tier is serving
#[async_trait]
pub trait CheckAvailability: Send + Sync {
    async fn check_availability(&self, cluster: &HdfsCluster) -> bool;
}

/// Create `desired` unless an object with its name already exists.
///
/// Returns true when a create was issued. Lookup errors other than
/// not-found propagate.
pub(crate) async fn ensure_exists<K>(
    control: &dyn ObjectControl<K>,
    namespace: &str,
    desired: &K,
) -> Result<bool>
where
    K: Resource + Sync,
    K::DynamicType: Default,
{
    let name = desired.name_any();
    let kind = K::kind(&K::DynamicType::default()).to_string();

    if control.get(namespace, &name).await?.is_some() {
        debug!("{} {}/{} already exists", kind, namespace, name);
        return Ok(false);
    }

    control.create(namespace, desired).await?;
    info!("Created {} {}/{}", kind, namespace, name);
    Ok(true)
}
