// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{HdfsOperatorError, Result};
use kube::{Resource, ResourceExt};
use std::fmt;
use std::str::FromStr;

/// `namespace/name` of one HdfsCluster; the unit of queuing
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReconcileKey {
    pub namespace: String,
    pub name: String,
}

impl ReconcileKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Key for an object, failing when it carries no name
    pub fn for_object<K: Resource>(obj: &K) -> Result<Self> {
        let name = obj.meta().name.clone().unwrap_or_default();
        if name.is_empty() {
            return Err(HdfsOperatorError::InvalidKey(
                "object has no name".to_string(),
            ));
        }
        Ok(Self::new(obj.namespace().unwrap_or_default(), name))
    }
}

impl fmt::Display for ReconcileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.namespace, self.name)
        }
    }
}

impl FromStr for ReconcileKey {
    type Err = HdfsOperatorError;

    fn from_str(key: &str) -> Result<Self> {
        let parts: Vec<&str> = key.split('/').collect();
        let (namespace, name) = match parts.as_slice() {
            [name] => ("", *name),
            [namespace, name] => (*namespace, *name),
            _ => return Err(HdfsOperatorError::InvalidKey(key.to_string())),
        };
        if name.is_empty() {
            return Err(HdfsOperatorError::InvalidKey(key.to_string()));
        }
        Ok(Self::new(namespace, name))
    }
}
