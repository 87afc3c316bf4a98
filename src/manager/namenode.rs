// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! NameNode tier: NodePort Service, metadata PVC and a single-replica Deployment.

use crate::constants::namenode::{
    APP, HTTP_PORT, HTTP_SERVICE_PORT, IMAGE, MOUNT_PATH, RPC_PORT, VOLUME_NAME,
};
use crate::error::Result;
use crate::kubernetes::control::{
    DeploymentControl, KubeControl, KubePodControl, PodControl, PvcControl, ServiceControl,
};
use crate::manager::{ensure_exists, CheckAvailability, Manager};
use crate::naming::{
    namenode_deployment_name, namenode_labels, namenode_pvc_name, namenode_service_name,
};
use crate::types::HdfsCluster;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EnvVar, PersistentVolumeClaim, PersistentVolumeClaimSpec,
    PersistentVolumeClaimVolumeSource, PodSpec, PodTemplateSpec, Service, ServicePort,
    ServiceSpec, Volume, VolumeMount, VolumeResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::api::ObjectMeta;
use kube::{Client, ResourceExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

pub struct NameNodeManager {
    services: Arc<ServiceControl>,
    pvcs: Arc<PvcControl>,
    deployments: Arc<DeploymentControl>,
    pods: Arc<dyn PodControl>,
}

impl NameNodeManager {
    pub fn new(
        services: Arc<ServiceControl>,
        pvcs: Arc<PvcControl>,
        deployments: Arc<DeploymentControl>,
        pods: Arc<dyn PodControl>,
    ) -> Self {
        Self {
            services,
            pvcs,
            deployments,
            pods,
        }
    }

    /// Manager wired to the Kubernetes API
    pub fn from_client(client: Client) -> Self {
        Self::new(
            Arc::new(KubeControl::<Service>::new(client.clone())),
            Arc::new(KubeControl::<PersistentVolumeClaim>::new(client.clone())),
            Arc::new(KubeControl::<Deployment>::new(client.clone())),
            Arc::new(KubePodControl::new(client)),
        )
    }

    async fn sync_service(&self, cluster: &HdfsCluster) -> Result<()> {
        let service = namenode_service(cluster)?;
        ensure_exists(self.services.as_ref(), &cluster.namespace_or_default(), &service).await?;
        Ok(())
    }

    async fn sync_pvc(&self, cluster: &HdfsCluster) -> Result<()> {
        let pvc = namenode_pvc(cluster)?;
        ensure_exists(self.pvcs.as_ref(), &cluster.namespace_or_default(), &pvc).await?;
        Ok(())
    }

    async fn sync_deployment(&self, cluster: &HdfsCluster) -> Result<()> {
        let deployment = namenode_deployment(cluster)?;
        ensure_exists(
            self.deployments.as_ref(),
            &cluster.namespace_or_default(),
            &deployment,
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Manager for NameNodeManager {
    #[instrument(skip(self, cluster), fields(cluster = %cluster.key()))]
    async fn sync(&self, cluster: &HdfsCluster) -> Result<()> {
        if let Err(e) = self.sync_service(cluster).await {
            error!("Failed to sync name node service: {}", e);
            return Err(e);
        }
        if let Err(e) = self.sync_pvc(cluster).await {
            error!("Failed to sync name node pvc: {}", e);
            return Err(e);
        }
        if let Err(e) = self.sync_deployment(cluster).await {
            error!("Failed to sync name node deployment: {}", e);
            return Err(e);
        }
        info!("Name node tier in sync");
        Ok(())
    }
}

#[async_trait]
impl CheckAvailability for NameNodeManager {
    #[instrument(skip(self, cluster), fields(cluster = %cluster.key()))]
    async fn check_availability(&self, cluster: &HdfsCluster) -> bool {
        let not_running = match self
            .pods
            .not_running_pods(&cluster.namespace_or_default(), &namenode_labels())
            .await
        {
            Ok(pods) => pods,
            Err(e) => {
                error!("Failed to check name node pod status: {}", e);
                return false;
            }
        };

        if let Some((pod, phase)) = not_running.iter().next() {
            warn!("Name node pod {} is {}", pod, phase);
            return false;
        }
        true
    }
}

fn object_meta(cluster: &HdfsCluster, name: String) -> Result<ObjectMeta> {
    Ok(ObjectMeta {
        name: Some(name),
        namespace: Some(cluster.namespace_or_default()),
        labels: Some(namenode_labels()),
        owner_references: Some(vec![cluster.owner_ref()?]),
        ..Default::default()
    })
}

/// NodePort Service exposing the NameNode RPC and web ports
pub fn namenode_service(cluster: &HdfsCluster) -> Result<Service> {
    Ok(Service {
        metadata: object_meta(cluster, namenode_service_name(&cluster.name_any()))?,
        spec: Some(ServiceSpec {
            type_: Some("NodePort".to_string()),
            ports: Some(vec![
                ServicePort {
                    name: Some("nn-rpc".to_string()),
                    port: RPC_PORT,
                    target_port: Some(IntOrString::Int(RPC_PORT)),
                    protocol: Some("TCP".to_string()),
                    ..Default::default()
                },
                ServicePort {
                    name: Some("nn-web".to_string()),
                    port: HTTP_SERVICE_PORT,
                    target_port: Some(IntOrString::Int(HTTP_PORT)),
                    protocol: Some("TCP".to_string()),
                    ..Default::default()
                },
            ]),
            selector: Some(namenode_labels()),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// ReadWriteOnce claim holding the NameNode metadata directory
pub fn namenode_pvc(cluster: &HdfsCluster) -> Result<PersistentVolumeClaim> {
    let spec = &cluster.spec.name_node;
    Ok(PersistentVolumeClaim {
        metadata: object_meta(cluster, namenode_pvc_name(&cluster.name_any()))?,
        spec: Some(PersistentVolumeClaimSpec {
            access_modes: Some(vec!["ReadWriteOnce".to_string()]),
            storage_class_name: Some(spec.storage_class.clone()),
            resources: Some(VolumeResourceRequirements {
                requests: Some(BTreeMap::from([(
                    "storage".to_string(),
                    Quantity(spec.storage.clone()),
                )])),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// Single-replica NameNode Deployment mounting the metadata claim
pub fn namenode_deployment(cluster: &HdfsCluster) -> Result<Deployment> {
    let name = cluster.name_any();
    Ok(Deployment {
        metadata: object_meta(cluster, namenode_deployment_name(&name))?,
        spec: Some(DeploymentSpec {
            replicas: Some(1),
            selector: LabelSelector {
                match_labels: Some(namenode_labels()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(namenode_labels()),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: APP.to_string(),
                        image: Some(IMAGE.to_string()),
                        env: Some(vec![EnvVar {
                            name: "CLUSTER_NAME".to_string(),
                            value: Some(name.clone()),
                            ..Default::default()
                        }]),
                        ports: Some(vec![
                            ContainerPort {
                                container_port: RPC_PORT,
                                name: Some("nn-rpc".to_string()),
                                ..Default::default()
                            },
                            ContainerPort {
                                container_port: HTTP_PORT,
                                name: Some("nn-web".to_string()),
                                ..Default::default()
                            },
                        ]),
                        volume_mounts: Some(vec![VolumeMount {
                            name: VOLUME_NAME.to_string(),
                            mount_path: MOUNT_PATH.to_string(),
                            ..Default::default()
                        }]),
                        ..Default::default()
                    }],
                    volumes: Some(vec![Volume {
                        name: VOLUME_NAME.to_string(),
                        persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
                            claim_name: namenode_pvc_name(&name),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }]),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    })
}
