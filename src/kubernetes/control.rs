// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-kind resource control used by the tier managers.
//!
//! Managers only see the [`ObjectControl`] and [`PodControl`] traits, so the
//! kube-backed implementations here can be swapped for in-memory fakes.

use crate::constants::OPERATOR_NAME;
use crate::error::{HdfsOperatorError, Result};
use crate::naming::label_selector;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{PersistentVolumeClaim, Pod, Service};
use k8s_openapi::NamespaceResourceScope;
use kube::{
    api::{ListParams, PostParams},
    Api, Client, Resource, ResourceExt,
};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::marker::PhantomData;
use tracing::{debug, instrument};

/// Get, create and update objects of one kind, scoped to a namespace
#[async_trait]
pub trait ObjectControl<K>: Send + Sync {
    /// Fetch an object by name; `Ok(None)` when it does not exist
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<K>>;
    async fn create(&self, namespace: &str, object: &K) -> Result<K>;
    /// Replace an existing object; `object` must carry the live resource version
    async fn update(&self, namespace: &str, object: &K) -> Result<K>;
}

pub type ServiceControl = dyn ObjectControl<Service>;
pub type PvcControl = dyn ObjectControl<PersistentVolumeClaim>;
pub type DeploymentControl = dyn ObjectControl<Deployment>;
pub type StatefulSetControl = dyn ObjectControl<StatefulSet>;

/// Pod health queries by label selector
#[async_trait]
pub trait PodControl: Send + Sync {
    /// Name and phase of every matching pod whose phase is not `Running`
    async fn not_running_pods(
        &self,
        namespace: &str,
        selector: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>>;
}

/// [`ObjectControl`] backed by the Kubernetes API
pub struct KubeControl<K> {
    client: Client,
    _kind: PhantomData<fn() -> K>,
}

impl<K> KubeControl<K> {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }
}

impl<K> KubeControl<K>
where
    K: Resource<Scope = NamespaceResourceScope>,
    K::DynamicType: Default,
{
    fn api(&self, namespace: &str) -> Api<K> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl<K> ObjectControl<K> for KubeControl<K>
where
    K: Resource<Scope = NamespaceResourceScope>
        + Clone
        + DeserializeOwned
        + Serialize
        + Debug
        + Send
        + Sync
        + 'static,
    K::DynamicType: Default,
{
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<K>> {
        match self.api(namespace).get(name).await {
            Ok(object) => Ok(Some(object)),
            Err(kube::Error::Api(err)) if err.code == 404 => {
                debug!("{} {}/{} not found", K::kind(&K::DynamicType::default()), namespace, name);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create(&self, namespace: &str, object: &K) -> Result<K> {
        Ok(self
            .api(namespace)
            .create(&write_params(), object)
            .await?)
    }

    async fn update(&self, namespace: &str, object: &K) -> Result<K> {
        let name = object.meta().name.clone().ok_or_else(|| {
            HdfsOperatorError::MissingMetadata(format!(
                "cannot update unnamed {} in {}",
                K::kind(&K::DynamicType::default()),
                namespace
            ))
        })?;

        Ok(self
            .api(namespace)
            .replace(&name, &write_params(), object)
            .await?)
    }
}

/// Writes are attributed to the operator in managedFields
fn write_params() -> PostParams {
    PostParams {
        field_manager: Some(OPERATOR_NAME.to_string()),
        ..Default::default()
    }
}

/// [`PodControl`] backed by the Kubernetes API
pub struct KubePodControl {
    client: Client,
}

impl KubePodControl {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PodControl for KubePodControl {
    #[instrument(skip(self, selector), fields(selector = %label_selector(selector)))]
    async fn not_running_pods(
        &self,
        namespace: &str,
        selector: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let lp = ListParams::default().labels(&label_selector(selector));
        let pod_list = pods.list(&lp).await?;

        Ok(pod_list
            .items
            .iter()
            .filter_map(|pod| {
                let phase = pod
                    .status
                    .as_ref()
                    .and_then(|s| s.phase.clone())
                    .unwrap_or_else(|| "Unknown".to_string());
                (phase != "Running").then(|| (pod.name_any(), phase))
            })
            .collect())
    }
}
