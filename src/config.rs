// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{bail, Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace to watch; all namespaces when unset
    pub watch_namespace: Option<String>,
    /// Number of reconcile workers
    pub workers: usize,
    /// Interval at which every known HdfsCluster is re-enqueued
    pub resync_period: Duration,
    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,
    /// HdfsCluster the one-shot tools operate on
    pub cluster_namespace: String,
    pub cluster_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            watch_namespace: None,
            workers: 1,
            resync_period: Duration::from_secs(30),
            retry_base_delay: Duration::from_millis(5),
            retry_max_delay: Duration::from_secs(1000),
            cluster_namespace: "default".to_string(),
            cluster_name: "demo".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let workers = parse_var(&lookup, "WORKERS")?.unwrap_or(defaults.workers);
        if workers == 0 {
            bail!("WORKERS must be at least 1");
        }

        let resync_period = parse_var(&lookup, "RESYNC_PERIOD_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.resync_period);
        let retry_base_delay = parse_var(&lookup, "RETRY_BASE_DELAY_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry_base_delay);
        let retry_max_delay = parse_var(&lookup, "RETRY_MAX_DELAY_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.retry_max_delay);

        Ok(Config {
            watch_namespace: lookup("WATCH_NAMESPACE").filter(|ns| !ns.is_empty()),
            workers,
            resync_period,
            retry_base_delay,
            retry_max_delay,
            cluster_namespace: lookup("CLUSTER_NAMESPACE").unwrap_or(defaults.cluster_namespace),
            cluster_name: lookup("CLUSTER_NAME").unwrap_or(defaults.cluster_name),
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{} has an invalid value: {:?}", key, raw))
        })
        .transpose()
}
