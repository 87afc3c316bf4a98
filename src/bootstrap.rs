// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Process setup shared by the operator and the one-shot tools.

use crate::config::Config;
use crate::controller::ReconcileKey;
use crate::error::Result;
use crate::types::HdfsCluster;
use kube::{Api, Client};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber; `RUST_LOG` overrides the `info` default
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Cluster a one-shot tool targets: `[namespace/]name` from the command
/// line, else `CLUSTER_NAMESPACE`/`CLUSTER_NAME`. A bare name takes the
/// configured namespace.
pub fn target_key(arg: Option<&str>, config: &Config) -> Result<ReconcileKey> {
    let Some(arg) = arg else {
        return Ok(ReconcileKey::new(
            &config.cluster_namespace,
            &config.cluster_name,
        ));
    };
    let mut key: ReconcileKey = arg.parse()?;
    if key.namespace.is_empty() {
        key.namespace = config.cluster_namespace.clone();
    }
    Ok(key)
}

/// Fetch one HdfsCluster straight from the API server
pub async fn fetch_cluster(client: Client, key: &ReconcileKey) -> Result<HdfsCluster> {
    info!("Fetching HdfsCluster {}", key);
    let clusters: Api<HdfsCluster> = Api::namespaced(client, &key.namespace);
    Ok(clusters.get(&key.name).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockService;

    #[test]
    fn test_target_defaults_to_config() {
        let config = Config {
            cluster_namespace: "hdfs".to_string(),
            ..Default::default()
        };

        assert_eq!(
            target_key(None, &config).unwrap(),
            ReconcileKey::new("hdfs", "demo")
        );
    }

    #[test]
    fn test_target_argument_overrides_config() {
        let config = Config {
            cluster_namespace: "hdfs".to_string(),
            ..Default::default()
        };

        assert_eq!(
            target_key(Some("storage/big"), &config).unwrap(),
            ReconcileKey::new("storage", "big")
        );
        assert_eq!(
            target_key(Some("small"), &config).unwrap(),
            ReconcileKey::new("hdfs", "small")
        );
        assert!(target_key(Some("a/b/c"), &config).is_err());
    }

    #[tokio::test]
    async fn test_fetch_cluster() {
        let body = serde_json::json!({
            "apiVersion": "storage.io/v1alpha1",
            "kind": "HdfsCluster",
            "metadata": { "name": "demo", "namespace": "hdfs", "uid": "uid-demo" },
            "spec": {
                "name_node": { "storage": "10Gi", "storage_class": "standard" },
                "data_node": { "storage": "5Gi", "storage_class": "standard", "replicas": 3 }
            }
        })
        .to_string();
        let client = MockService::new()
            .on_get(
                "/apis/storage.io/v1alpha1/namespaces/hdfs/hdfsclusters/demo",
                200,
                &body,
            )
            .into_client();

        let cluster = fetch_cluster(client, &ReconcileKey::new("hdfs", "demo"))
            .await
            .unwrap();

        assert_eq!(cluster.key(), "hdfs/demo");
        assert_eq!(cluster.spec.data_node.replicas, 3);
    }

    #[tokio::test]
    async fn test_fetch_missing_cluster_is_not_found() {
        let client = MockService::new().into_client();

        let err = fetch_cluster(client, &ReconcileKey::new("default", "demo"))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }
}
