// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Watch-backed object cache that fans add/update/delete events out to a handler.

use async_trait::async_trait;
use futures::StreamExt;
use kube::{Api, Resource, ResourceExt};
use kube_runtime::reflector::{store::Writer, ObjectRef, Store};
use kube_runtime::watcher::{self, watcher, Event};
use kube_runtime::WatchStreamExt;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A change observed on a watched object
#[derive(Debug, Clone)]
pub enum WatchEvent<K> {
    Added(Arc<K>),
    Updated { old: Arc<K>, new: Arc<K> },
    Deleted(Arc<K>),
}

/// Receives watch events; implementations must not block
pub trait EventHandler<K>: Send + Sync {
    fn on_event(&self, event: WatchEvent<K>);
}

/// Signals that a cache finished its initial list
#[async_trait]
pub trait CacheSynced: Send + Sync {
    /// Resolves once the cache is populated; false if it never will be
    async fn wait_synced(&self) -> bool;
}

#[async_trait]
impl<K> CacheSynced for Store<K>
where
    K: Resource + Clone + Send + Sync + 'static,
    K::DynamicType: Eq + Hash + Clone + Send + Sync,
{
    async fn wait_synced(&self) -> bool {
        self.wait_until_ready().await.is_ok()
    }
}

/// Watches one kind, keeps a local [`Store`] and forwards events
pub struct Informer<K>
where
    K: Resource + Clone + 'static,
    K::DynamicType: Eq + Hash + Clone,
{
    api: Api<K>,
    config: watcher::Config,
    writer: Writer<K>,
    /// Objects cached before the current relist that it has not returned yet
    relist_pending: Option<HashMap<ObjectRef<K>, Arc<K>>>,
}

impl<K> Informer<K>
where
    K: Resource + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
    K::DynamicType: Default + Eq + Hash + Clone + Send + Sync,
{
    pub fn new(api: Api<K>, config: watcher::Config) -> Self {
        Self {
            api,
            config,
            writer: Writer::default(),
            relist_pending: None,
        }
    }

    /// Read handle on the cache, usable before `run` starts
    pub fn store(&self) -> Store<K> {
        self.writer.as_reader()
    }

    /// Drive the watch until the stream ends, delivering events to `handler`
    pub async fn run(mut self, handler: Arc<dyn EventHandler<K>>) {
        let kind = K::kind(&K::DynamicType::default()).to_string();
        info!("Starting {} informer", kind);

        let reader = self.writer.as_reader();
        let mut stream = watcher(self.api.clone(), self.config.clone())
            .default_backoff()
            .boxed();

        while let Some(item) = stream.next().await {
            match item {
                Ok(event) => self.handle(&reader, event, handler.as_ref()),
                Err(e) => warn!("{} watch error: {}", kind, e),
            }
        }

        info!("{} informer stopped", kind);
    }

    /// Apply one raw watcher event to the cache, then notify `handler`
    fn handle(&mut self, reader: &Store<K>, event: Event<K>, handler: &dyn EventHandler<K>) {
        for watch_event in self.apply(reader, event) {
            handler.on_event(watch_event);
        }
    }

    /// Update the cache and translate a raw watcher event.
    ///
    /// A relist (`Init` .. `InitDone`) replaces the cache wholesale; objects
    /// the relist no longer returns were deleted while the watch was down and
    /// are reported as deletes once it completes.
    fn apply(&mut self, reader: &Store<K>, event: Event<K>) -> Vec<WatchEvent<K>> {
        let translated = match &event {
            Event::Init => {
                self.relist_pending = Some(
                    reader
                        .state()
                        .into_iter()
                        .map(|obj| (ObjectRef::from_obj(obj.as_ref()), obj))
                        .collect(),
                );
                Vec::new()
            }
            Event::InitApply(obj) => {
                if let Some(pending) = self.relist_pending.as_mut() {
                    pending.remove(&ObjectRef::from_obj(obj));
                }
                vec![Self::added_or_updated(reader, obj)]
            }
            Event::Apply(obj) => vec![Self::added_or_updated(reader, obj)],
            Event::Delete(obj) => {
                debug!("Observed delete of {}", obj.name_any());
                vec![WatchEvent::Deleted(Arc::new(obj.clone()))]
            }
            Event::InitDone => self
                .relist_pending
                .take()
                .unwrap_or_default()
                .into_values()
                .map(|gone| {
                    debug!("{} vanished during relist", gone.name_any());
                    WatchEvent::Deleted(gone)
                })
                .collect(),
        };

        self.writer.apply_watcher_event(&event);
        translated
    }

    fn added_or_updated(reader: &Store<K>, obj: &K) -> WatchEvent<K> {
        let new = Arc::new(obj.clone());
        match reader.get(&ObjectRef::from_obj(obj)) {
            Some(old) => WatchEvent::Updated { old, new },
            None => WatchEvent::Added(new),
        }
    }
}
