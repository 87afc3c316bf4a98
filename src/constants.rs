// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// The operator name used in logs and as field manager on writes
pub const OPERATOR_NAME: &str = "hdfs-operator";

/// HdfsCluster custom resource coordinates
pub mod crd {
    pub const GROUP: &str = "storage.io";
    pub const VERSION: &str = "v1alpha1";
    pub const KIND: &str = "HdfsCluster";
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}

/// Label key shared by both tiers
pub const APP_LABEL: &str = "app";

/// NameNode (master tier) settings
pub mod namenode {
    pub const APP: &str = "namenode";
    pub const IMAGE: &str = "uhopper/hadoop-namenode:2.7.2";
    pub const RPC_PORT: i32 = 8020;
    pub const HTTP_PORT: i32 = 50070;
    /// Port the NodePort service exposes the web UI on
    pub const HTTP_SERVICE_PORT: i32 = 80;
    pub const VOLUME_NAME: &str = "hdfs-name";
    pub const MOUNT_PATH: &str = "/hadoop/dfs/name";
}

/// DataNode (worker tier) settings
pub mod datanode {
    pub const APP: &str = "datanode";
    pub const IMAGE: &str = "uhopper/hadoop-datanode:2.7.2";
    pub const DATA_PORT: i32 = 50010;
    pub const IPC_PORT: i32 = 50020;
    pub const HTTP_PORT: i32 = 50075;
    pub const VOLUME_NAME: &str = "hdfs-data";
    pub const MOUNT_PATH: &str = "/hadoop/dfs/data";
}
