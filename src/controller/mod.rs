// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Event-driven reconciliation of HdfsCluster resources.

pub mod cluster_control;
pub mod hdfs_cluster;
pub mod key;
pub mod queue;

pub use cluster_control::{ClusterControl, HdfsClusterControl};
pub use hdfs_cluster::{ClusterLister, HdfsClusterController};
pub use key::ReconcileKey;
pub use queue::{ItemBackoff, WorkQueue};
