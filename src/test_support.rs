//! Shared fixtures for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::client::ResourceClient;
use crate::error::{NavigatorResult, TransportError};
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::model::{Bundle, BundleType, Resource, SearchParams};

/// One scripted transport result.
#[derive(Clone)]
pub enum Outcome {
    Respond(HttpResponse),
    Fail(fn() -> TransportError),
}

impl Outcome {
    pub fn status(code: u16) -> Self {
        Outcome::Respond(HttpResponse::new(StatusCode::from_u16(code).unwrap()))
    }

    pub fn json(code: u16, body: serde_json::Value) -> Self {
        Outcome::Respond(HttpResponse::new(StatusCode::from_u16(code).unwrap()).with_body(body.to_string()))
    }
}

/// Transport replaying a fixed script, then repeating the fallback (if any).
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Outcome>>,
    fallback: Option<Outcome>,
    calls: AtomicUsize,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Outcome>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn repeating(outcome: Outcome) -> Self {
        Self {
            fallback: Some(outcome),
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.fallback.clone())
            .expect("transport script exhausted");
        match outcome {
            Outcome::Respond(response) => Ok(response),
            Outcome::Fail(make) => Err(make()),
        }
    }
}

/// In-memory [`ResourceClient`] with canned pages and resources.
#[derive(Default)]
pub struct MockResourceClient {
    pages: Mutex<VecDeque<Bundle>>,
    resources: Mutex<HashMap<(String, String), Resource>>,
    get_calls: AtomicUsize,
    continue_calls: AtomicUsize,
    log: Mutex<Vec<String>>,
}

impl MockResourceClient {
    /// `search` returns the first page; `continue_page` the following ones.
    pub fn with_pages(pages: Vec<Bundle>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            ..Self::default()
        }
    }

    pub fn with_resources(resources: Vec<Resource>) -> Self {
        let client = Self::default();
        {
            let mut map = client.resources.lock().unwrap();
            for r in resources {
                map.insert((r.resource_type().to_string(), r.id().unwrap().to_string()), r);
            }
        }
        client
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn continue_calls(&self) -> usize {
        self.continue_calls.load(Ordering::SeqCst)
    }

    /// `METHOD Type[/id]` for every write.
    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResourceClient for MockResourceClient {
    fn repository(&self) -> &str {
        "mock"
    }

    async fn get_by_id(&self, resource_type: &str, id: &str) -> NavigatorResult<Option<Resource>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let key = (resource_type.to_string(), id.to_string());
        Ok(self.resources.lock().unwrap().get(&key).cloned())
    }

    async fn search(&self, _resource_type: &str, _params: &SearchParams) -> NavigatorResult<Option<Bundle>> {
        Ok(self.pages.lock().unwrap().pop_front())
    }

    async fn continue_page(&self, previous: &Bundle) -> NavigatorResult<Option<Bundle>> {
        self.continue_calls.fetch_add(1, Ordering::SeqCst);
        if previous.next_link().is_none() {
            return Ok(None);
        }
        Ok(self.pages.lock().unwrap().pop_front())
    }

    async fn create(&self, resource: &Resource) -> NavigatorResult<Resource> {
        self.log.lock().unwrap().push(format!("POST {}", resource.resource_type()));
        let mut created = resource.clone();
        if created.id().is_none() {
            created.set_id("created-1");
        }
        Ok(created)
    }

    async fn update(&self, resource: &Resource, version_aware: bool) -> NavigatorResult<Resource> {
        self.log.lock().unwrap().push(format!(
            "PUT {}{}",
            resource.relative_reference().unwrap_or_default(),
            if version_aware { " (version-aware)" } else { "" }
        ));
        Ok(resource.clone())
    }

    async fn delete(&self, resource_type: &str, id: &str) -> NavigatorResult<()> {
        self.log.lock().unwrap().push(format!("DELETE {}/{}", resource_type, id));
        self.resources
            .lock()
            .unwrap()
            .remove(&(resource_type.to_string(), id.to_string()));
        Ok(())
    }

    async fn submit_transaction(&self, _bundle: &Bundle) -> NavigatorResult<Bundle> {
        self.log.lock().unwrap().push("POST [base]".to_string());
        Ok(Bundle::new(BundleType::TransactionResponse))
    }
}
