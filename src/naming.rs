// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deterministic child object names and tier labels.
//!
//! Names are part of the operator's compatibility surface: existing clusters
//! are found again by these exact strings.

use crate::constants::{datanode, namenode, APP_LABEL};
use std::collections::BTreeMap;

pub fn namenode_service_name(cluster_name: &str) -> String {
    format!("{}-nn", cluster_name)
}

pub fn namenode_pvc_name(cluster_name: &str) -> String {
    format!("{}-namenode", cluster_name)
}

pub fn namenode_deployment_name(cluster_name: &str) -> String {
    format!("{}-namenode", cluster_name)
}

pub fn datanode_service_name(cluster_name: &str) -> String {
    format!("{}dn", cluster_name)
}

pub fn datanode_statefulset_name(cluster_name: &str) -> String {
    format!("{}-datanode", cluster_name)
}

/// `hdfs://` URI DataNodes use to reach the NameNode RPC port
pub fn namenode_address(cluster_name: &str) -> String {
    format!(
        "hdfs://{}:{}",
        namenode_service_name(cluster_name),
        namenode::RPC_PORT
    )
}

pub fn namenode_labels() -> BTreeMap<String, String> {
    BTreeMap::from([(APP_LABEL.to_string(), namenode::APP.to_string())])
}

pub fn datanode_labels() -> BTreeMap<String, String> {
    BTreeMap::from([(APP_LABEL.to_string(), datanode::APP.to_string())])
}

/// Render labels as a Kubernetes label selector string (`k=v,k2=v2`)
pub fn label_selector(labels: &BTreeMap<String, String>) -> String {
    labels
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}
