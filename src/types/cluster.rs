// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{HdfsOperatorError, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::{CustomResource, Resource, ResourceExt};
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[kube(group = "storage.io", version = "v1alpha1", kind = "HdfsCluster")]
#[kube(namespaced)]
pub struct HdfsClusterSpec {
    #[serde(alias = "masterTier")]
    pub name_node: NameNodeSpec,
    #[serde(alias = "workerTier")]
    pub data_node: DataNodeSpec,
}

/// Desired state of the NameNode (master) tier
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct NameNodeSpec {
    /// Size of the metadata volume, e.g. "10Gi"
    #[serde(alias = "storageSize")]
    pub storage: String,
    #[serde(alias = "storageClassName")]
    pub storage_class: String,
}

/// Desired state of the DataNode (worker) tier
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct DataNodeSpec {
    /// Size of each DataNode's block volume
    #[serde(alias = "storageSize")]
    pub storage: String,
    #[serde(alias = "storageClassName")]
    pub storage_class: String,
    #[serde(alias = "desiredReplicaCount")]
    pub replicas: i32,
}

impl HdfsCluster {
    /// Namespace of this cluster, "default" when unset
    pub fn namespace_or_default(&self) -> String {
        self.namespace().unwrap_or_else(|| "default".to_string())
    }

    /// `namespace/name` identifier used in logs
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace_or_default(), self.name_any())
    }

    /// Controller owner reference attached to every child object
    pub fn owner_ref(&self) -> Result<OwnerReference> {
        let owner = self.controller_owner_ref(&()).ok_or_else(|| {
            HdfsOperatorError::MissingMetadata(format!(
                "HdfsCluster {} has no name or uid",
                self.key()
            ))
        })?;
        Ok(OwnerReference {
            block_owner_deletion: Some(true),
            ..owner
        })
    }
}
