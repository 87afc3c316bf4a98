// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! DataNode tier: headless Service and the DataNode StatefulSet.

use crate::constants::datanode::{
    APP, DATA_PORT, HTTP_PORT, IMAGE, IPC_PORT, MOUNT_PATH, VOLUME_NAME,
};
use crate::error::Result;
use crate::kubernetes::control::{KubeControl, ServiceControl, StatefulSetControl};
use crate::manager::scaler::replicas;
use crate::manager::{ensure_exists, Manager, Scaler};
use crate::naming::{
    datanode_labels, datanode_service_name, datanode_statefulset_name, namenode_address,
};
use crate::types::HdfsCluster;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{StatefulSet, StatefulSetSpec};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EnvVar, PersistentVolumeClaim, PersistentVolumeClaimSpec,
    PodSpec, PodTemplateSpec, Service, ServicePort, ServiceSpec, VolumeMount,
    VolumeResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::api::ObjectMeta;
use kube::{Client, ResourceExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub struct DataNodeManager {
    services: Arc<ServiceControl>,
    sets: Arc<StatefulSetControl>,
    scaler: Arc<dyn Scaler>,
}

impl DataNodeManager {
    pub fn new(
        services: Arc<ServiceControl>,
        sets: Arc<StatefulSetControl>,
        scaler: Arc<dyn Scaler>,
    ) -> Self {
        Self {
            services,
            sets,
            scaler,
        }
    }

    /// Manager wired to the Kubernetes API
    pub fn from_client(client: Client, scaler: Arc<dyn Scaler>) -> Self {
        Self::new(
            Arc::new(KubeControl::<Service>::new(client.clone())),
            Arc::new(KubeControl::<StatefulSet>::new(client)),
            scaler,
        )
    }

    async fn sync_service(&self, cluster: &HdfsCluster) -> Result<()> {
        let service = datanode_service(cluster)?;
        ensure_exists(self.services.as_ref(), &cluster.namespace_or_default(), &service).await?;
        Ok(())
    }

    async fn sync_stateful_set(&self, cluster: &HdfsCluster) -> Result<()> {
        let namespace = cluster.namespace_or_default();
        let name = datanode_statefulset_name(&cluster.name_any());

        let Some(live) = self.sets.get(&namespace, &name).await? else {
            let desired = datanode_stateful_set(cluster, initial_replicas(cluster))?;
            self.sets.create(&namespace, &desired).await?;
            info!("Created StatefulSet {}/{}", namespace, name);
            return Ok(());
        };

        let target = cluster.spec.data_node.replicas;
        let current = replicas(&live);
        if current > target {
            // Scale-down is not supported; leave the live set alone
            warn!(
                "StatefulSet {}/{} has {} replicas, above the desired {}; not scaling down",
                namespace, name, current, target
            );
            return Ok(());
        }
        if current == target {
            debug!("StatefulSet {}/{} at {} replicas", namespace, name, current);
            return Ok(());
        }

        let mut desired = datanode_stateful_set(cluster, target)?;
        self.scaler.scale_out(cluster, &live, &mut desired)?;

        // Only the replica count changes; the rest of the live object stays as is
        let mut updated = live.clone();
        if let Some(spec) = updated.spec.as_mut() {
            spec.replicas = desired.spec.as_ref().and_then(|s| s.replicas);
        }
        self.sets.update(&namespace, &updated).await?;
        info!(
            "Scaled StatefulSet {}/{} from {} to {} replicas (desired {})",
            namespace,
            name,
            current,
            replicas(&updated),
            target
        );
        Ok(())
    }
}

#[async_trait]
impl Manager for DataNodeManager {
    #[instrument(skip(self, cluster), fields(cluster = %cluster.key()))]
    async fn sync(&self, cluster: &HdfsCluster) -> Result<()> {
        if let Err(e) = self.sync_service(cluster).await {
            error!("Failed to sync data node service: {}", e);
            return Err(e);
        }
        if let Err(e) = self.sync_stateful_set(cluster).await {
            error!("Failed to sync data node statefulset: {}", e);
            return Err(e);
        }
        Ok(())
    }
}

/// Replica count for a freshly created StatefulSet: one member, or none when
/// zero DataNodes are requested
fn initial_replicas(cluster: &HdfsCluster) -> i32 {
    cluster.spec.data_node.replicas.clamp(0, 1)
}

fn object_meta(cluster: &HdfsCluster, name: String) -> Result<ObjectMeta> {
    Ok(ObjectMeta {
        name: Some(name),
        namespace: Some(cluster.namespace_or_default()),
        labels: Some(datanode_labels()),
        owner_references: Some(vec![cluster.owner_ref()?]),
        ..Default::default()
    })
}

/// Headless Service giving each DataNode a stable DNS name
pub fn datanode_service(cluster: &HdfsCluster) -> Result<Service> {
    let port = |name: &str, number: i32| ServicePort {
        name: Some(name.to_string()),
        port: number,
        target_port: Some(IntOrString::Int(number)),
        protocol: Some("TCP".to_string()),
        ..Default::default()
    };

    Ok(Service {
        metadata: object_meta(cluster, datanode_service_name(&cluster.name_any()))?,
        spec: Some(ServiceSpec {
            cluster_ip: Some("None".to_string()),
            ports: Some(vec![
                port("dn-data", DATA_PORT),
                port("dn-ipc", IPC_PORT),
                port("dn-web", HTTP_PORT),
            ]),
            selector: Some(datanode_labels()),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// DataNode StatefulSet with one block volume per member
pub fn datanode_stateful_set(cluster: &HdfsCluster, replicas: i32) -> Result<StatefulSet> {
    let name = cluster.name_any();
    let spec = &cluster.spec.data_node;

    Ok(StatefulSet {
        metadata: object_meta(cluster, datanode_statefulset_name(&name))?,
        spec: Some(StatefulSetSpec {
            replicas: Some(replicas),
            service_name: datanode_service_name(&name).into(),
            selector: LabelSelector {
                match_labels: Some(datanode_labels()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(datanode_labels()),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: APP.to_string(),
                        image: Some(IMAGE.to_string()),
                        env: Some(vec![
                            EnvVar {
                                name: "CLUSTER_NAME".to_string(),
                                value: Some(name.clone()),
                                ..Default::default()
                            },
                            EnvVar {
                                name: "CORE_CONF_fs_defaultFS".to_string(),
                                value: Some(namenode_address(&name)),
                                ..Default::default()
                            },
                        ]),
                        ports: Some(vec![
                            ContainerPort {
                                container_port: DATA_PORT,
                                name: Some("dn-data".to_string()),
                                ..Default::default()
                            },
                            ContainerPort {
                                container_port: IPC_PORT,
                                name: Some("dn-ipc".to_string()),
                                ..Default::default()
                            },
                            ContainerPort {
                                container_port: HTTP_PORT,
                                name: Some("dn-web".to_string()),
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
                    ..Default::default()
                }),
            },
            volume_claim_templates: Some(vec![PersistentVolumeClaim {
                metadata: ObjectMeta {
                    name: Some(VOLUME_NAME.to_string()),
                    labels: Some(datanode_labels()),
                    ..Default::default()
                },
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
            }]),
            ..Default::default()
        }),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::DataNodeScaler;
    use crate::test_utils::{make_cluster, FakeControl};

    struct Fixture {
        services: Arc<FakeControl<Service>>,
        sets: Arc<FakeControl<StatefulSet>>,
        manager: DataNodeManager,
    }

    fn fixture() -> Fixture {
        let services = FakeControl::<Service>::new();
        let sets = FakeControl::<StatefulSet>::new();
        let manager = DataNodeManager::new(services.clone(), sets.clone(), Arc::new(DataNodeScaler));
        Fixture {
            services,
            sets,
            manager,
        }
    }

    fn live_replicas(f: &Fixture) -> i32 {
        replicas(&f.sets.stored("hdfs", "demo-datanode").unwrap())
    }

    #[tokio::test]
    async fn test_first_sync_creates_service_and_one_member() {
        let f = fixture();
        let cluster = make_cluster("demo", "hdfs", 3);

        f.manager.sync(&cluster).await.unwrap();

        assert!(f.services.stored("hdfs", "demodn").is_some());
        assert_eq!(f.sets.creates(), 1);
        assert_eq!(f.sets.updates(), 0);
        assert_eq!(live_replicas(&f), 1);
    }

    #[tokio::test]
    async fn test_zero_desired_creates_empty_set() {
        let f = fixture();
        let cluster = make_cluster("demo", "hdfs", 0);

        f.manager.sync(&cluster).await.unwrap();

        assert_eq!(live_replicas(&f), 0);
    }

    #[tokio::test]
    async fn test_each_pass_adds_exactly_one_member() {
        let f = fixture();
        let cluster = make_cluster("demo", "hdfs", 3);

        f.manager.sync(&cluster).await.unwrap();
        assert_eq!(live_replicas(&f), 1);

        f.manager.sync(&cluster).await.unwrap();
        assert_eq!(live_replicas(&f), 2);

        f.manager.sync(&cluster).await.unwrap();
        assert_eq!(live_replicas(&f), 3);

        f.manager.sync(&cluster).await.unwrap();
        assert_eq!(live_replicas(&f), 3);
        assert_eq!(f.sets.updates(), 2);
        assert_eq!(f.services.creates(), 1);
    }

    #[tokio::test]
    async fn test_scale_out_never_jumps_to_desired() {
        let f = fixture();
        let cluster = make_cluster("demo", "hdfs", 10);
        f.sets
            .insert("hdfs", datanode_stateful_set(&cluster, 4).unwrap());

        f.manager.sync(&cluster).await.unwrap();

        assert_eq!(live_replicas(&f), 5);
    }

    #[tokio::test]
    async fn test_scale_down_is_a_no_op() {
        let f = fixture();
        let cluster = make_cluster("demo", "hdfs", 1);
        f.sets
            .insert("hdfs", datanode_stateful_set(&cluster, 4).unwrap());

        f.manager.sync(&cluster).await.unwrap();

        assert_eq!(live_replicas(&f), 4);
        assert_eq!(f.sets.updates(), 0);
    }

    #[tokio::test]
    async fn test_update_error_propagates() {
        let f = fixture();
        let cluster = make_cluster("demo", "hdfs", 3);
        f.sets
            .insert("hdfs", datanode_stateful_set(&cluster, 1).unwrap());
        f.sets.fail_updates_with(409);

        assert!(f.manager.sync(&cluster).await.is_err());
        assert_eq!(live_replicas(&f), 1);
    }

    #[tokio::test]
    async fn test_service_error_skips_stateful_set() {
        let f = fixture();
        f.services.fail_creates_with(500);
        let cluster = make_cluster("demo", "hdfs", 3);

        assert!(f.manager.sync(&cluster).await.is_err());
        assert_eq!(f.sets.gets(), 0);
    }

    #[test]
    fn test_workers_locate_namenode() {
        let cluster = make_cluster("demo", "hdfs", 3);

        let set = datanode_stateful_set(&cluster, 1).unwrap();
        let env = set.spec.unwrap().template.spec.unwrap().containers[0]
            .env
            .clone()
            .unwrap();

        let default_fs = env
            .iter()
            .find(|e| e.name == "CORE_CONF_fs_defaultFS")
            .unwrap();
        assert_eq!(default_fs.value.as_deref(), Some("hdfs://demo-nn:8020"));
    }

    #[test]
    fn test_stateful_set_uses_headless_service_and_claim_template() {
        let cluster = make_cluster("demo", "hdfs", 3);

        let spec = datanode_stateful_set(&cluster, 1).unwrap().spec.unwrap();
        let spec_json = serde_json::to_value(&spec).unwrap();
        let claim = &spec.volume_claim_templates.unwrap()[0];

        assert_eq!(spec_json["serviceName"], "demodn");
        assert_eq!(claim.metadata.name.as_deref(), Some("hdfs-data"));
        assert_eq!(
            claim.spec.as_ref().unwrap().storage_class_name.as_deref(),
            Some("standard")
        );

        let service = datanode_service(&cluster).unwrap();
        assert_eq!(
            service.spec.unwrap().cluster_ip.as_deref(),
            Some("None")
        );
    }
}
