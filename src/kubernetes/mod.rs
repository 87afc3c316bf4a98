// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes collaborators: resource control, watch caches and CRD discovery.

pub mod control;
pub mod crd;
pub mod informer;

pub use control::{KubeControl, KubePodControl, ObjectControl, PodControl};
pub use crd::wait_for_hdfs_cluster_crd;
pub use informer::{CacheSynced, EventHandler, Informer, WatchEvent};
