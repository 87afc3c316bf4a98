// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HdfsOperatorError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Name node is not available: {0}")]
    NameNodeUnavailable(String),

    #[error("Invalid reconcile key: {0}")]
    InvalidKey(String),

    #[error("Missing object metadata: {0}")]
    MissingMetadata(String),

    #[error("Failed to sync informer caches")]
    CacheSyncFailed,
}

impl HdfsOperatorError {
    /// True for API errors answered with 404 Not Found
    pub fn is_not_found(&self) -> bool {
        matches!(self, HdfsOperatorError::KubeError(kube::Error::Api(err)) if err.code == 404)
    }
}

pub type Result<T> = std::result::Result<T, HdfsOperatorError>;
