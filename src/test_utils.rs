// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses and control traits.

use crate::error::{HdfsOperatorError, Result};
use crate::kubernetes::control::{ObjectControl, PodControl};
use crate::types::{DataNodeSpec, HdfsCluster, HdfsClusterSpec, NameNodeSpec};
use async_trait::async_trait;
use http::{Request, Response};
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::error::ErrorResponse;
use kube::{Client, Resource};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    /// Add a response for PUT requests matching the exact path
    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    /// Method and path of every request seen so far
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }

    /// Query string of every request seen so far, empty when absent
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        for ((m, p), resp) in responses.iter() {
            if m == method && path.starts_with(p) {
                return Some(resp.clone());
            }
        }

        None
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        self.queries
            .lock()
            .unwrap()
            .push(req.uri().query().unwrap_or_default().to_string());

        self.requests
            .lock()
            .unwrap()
            .push((method.clone(), path.clone()));
        let response = self.find_response(&method, &path);

        Box::pin(async move {
            let (status, body) =
                response.unwrap_or_else(|| (404, not_found_json("object", &path)));
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// Build an API error as the kube client would return it
pub fn api_error(code: u16, reason: &str) -> HdfsOperatorError {
    HdfsOperatorError::KubeError(kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: format!("injected {}", reason),
        reason: reason.to_string(),
        code,
    }))
}

/// An HdfsCluster with uid, as it would come out of the informer cache
pub fn make_cluster(name: &str, namespace: &str, replicas: i32) -> HdfsCluster {
    HdfsCluster {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            uid: Some(format!("uid-{}", name)),
            resource_version: Some("1".to_string()),
            ..Default::default()
        },
        spec: HdfsClusterSpec {
            name_node: NameNodeSpec {
                storage: "10Gi".to_string(),
                storage_class: "standard".to_string(),
            },
            data_node: DataNodeSpec {
                storage: "5Gi".to_string(),
                storage_class: "standard".to_string(),
                replicas,
            },
        },
    }
}

/// In-memory [`ObjectControl`] with call counters and error injection
pub struct FakeControl<K> {
    objects: Mutex<BTreeMap<(String, String), K>>,
    gets: AtomicUsize,
    creates: AtomicUsize,
    updates: AtomicUsize,
    fail_get: Mutex<Option<u16>>,
    fail_create: Mutex<Option<u16>>,
    fail_update: Mutex<Option<u16>>,
}

impl<K> Default for FakeControl<K> {
    fn default() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            gets: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            fail_get: Mutex::new(None),
            fail_create: Mutex::new(None),
            fail_update: Mutex::new(None),
        }
    }
}

impl<K> FakeControl<K>
where
    K: Resource + Clone,
{
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Seed an object without counting it as a create
    pub fn insert(&self, namespace: &str, object: K) {
        let name = object.meta().name.clone().unwrap_or_default();
        self.objects
            .lock()
            .unwrap()
            .insert((namespace.to_string(), name), object);
    }

    pub fn stored(&self, namespace: &str, name: &str) -> Option<K> {
        self.objects
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn fail_gets_with(&self, code: u16) {
        *self.fail_get.lock().unwrap() = Some(code);
    }

    pub fn fail_creates_with(&self, code: u16) {
        *self.fail_create.lock().unwrap() = Some(code);
    }

    pub fn fail_updates_with(&self, code: u16) {
        *self.fail_update.lock().unwrap() = Some(code);
    }
}

fn injected(slot: &Mutex<Option<u16>>) -> Result<()> {
    match *slot.lock().unwrap() {
        Some(code) => Err(api_error(code, "Injected")),
        None => Ok(()),
    }
}

#[async_trait]
impl<K> ObjectControl<K> for FakeControl<K>
where
    K: Resource + Clone + Send + Sync + 'static,
{
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<K>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        injected(&self.fail_get)?;
        Ok(self.stored(namespace, name))
    }

    async fn create(&self, namespace: &str, object: &K) -> Result<K> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        injected(&self.fail_create)?;

        let name = object.meta().name.clone().unwrap_or_default();
        let mut objects = self.objects.lock().unwrap();
        let key = (namespace.to_string(), name);
        if objects.contains_key(&key) {
            return Err(api_error(409, "AlreadyExists"));
        }

        let mut created = object.clone();
        created.meta_mut().resource_version = Some("1".to_string());
        objects.insert(key, created.clone());
        Ok(created)
    }

    async fn update(&self, namespace: &str, object: &K) -> Result<K> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        injected(&self.fail_update)?;

        let name = object.meta().name.clone().unwrap_or_default();
        let mut objects = self.objects.lock().unwrap();
        let key = (namespace.to_string(), name);
        let Some(current) = objects.get(&key) else {
            return Err(api_error(404, "NotFound"));
        };
        if current.meta().resource_version != object.meta().resource_version {
            return Err(api_error(409, "Conflict"));
        }

        let next_version = current
            .meta()
            .resource_version
            .as_deref()
            .and_then(|rv| rv.parse::<u64>().ok())
            .unwrap_or(0)
            + 1;
        let mut updated = object.clone();
        updated.meta_mut().resource_version = Some(next_version.to_string());
        objects.insert(key, updated.clone());
        Ok(updated)
    }
}

/// In-memory [`PodControl`] holding a fixed list of pod phases
#[derive(Default)]
pub struct FakePodControl {
    pods: Mutex<BTreeMap<String, String>>,
    fail: Mutex<Option<u16>>,
    queries: AtomicUsize,
}

impl FakePodControl {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_phase(&self, pod: &str, phase: &str) {
        self.pods
            .lock()
            .unwrap()
            .insert(pod.to_string(), phase.to_string());
    }

    pub fn fail_with(&self, code: u16) {
        *self.fail.lock().unwrap() = Some(code);
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PodControl for FakePodControl {
    async fn not_running_pods(
        &self,
        _namespace: &str,
        _selector: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        injected(&self.fail)?;
        Ok(self
            .pods
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, phase)| phase.as_str() != "Running")
            .map(|(name, phase)| (name.clone(), phase.clone()))
            .collect())
    }
}
