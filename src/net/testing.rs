use std::{collections::HashMap, sync::Arc};

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use super::types::{Fetch, FetchError, Request, Response, ResponseKind};

/// Scripted network double: answers per URL and records every request.
#[derive(Default)]
pub struct FakeNetwork {
    routes: Mutex<HashMap<String, Option<Response>>>,
    calls: Mutex<Vec<Request>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl FakeNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, url: &str, response: Response) {
        self.routes.lock().insert(url.to_string(), Some(response));
    }

    /// Makes requests to `url` fail at the network layer.
    pub fn fail(&self, url: &str) {
        self.routes.lock().insert(url.to_string(), None);
    }

    /// Holds every request until a permit is added to the returned semaphore.
    pub fn hold(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<Request> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Fetch for FakeNetwork {
    fn fetch<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Response, FetchError>> {
        Box::pin(async move {
            self.calls.lock().push(request.clone());
            let gate = self.gate.lock().clone();
            if let Some(gate) = gate {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }
            let key = request.cache_key();
            match self.routes.lock().get(&key).cloned() {
                Some(Some(response)) => Ok(response),
                Some(None) => Err(FetchError::Offline(key)),
                None => Ok(plain(404, ResponseKind::Basic, b"not found")),
            }
        })
    }
}

pub fn plain(status: u16, kind: ResponseKind, body: &[u8]) -> Response {
    Response {
        status,
        status_text: String::new(),
        kind,
        headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
        body: body.to_vec(),
    }
}

pub fn json(status: u16, value: serde_json::Value) -> Response {
    let mut response = Response::json(status, "", &value);
    response.kind = ResponseKind::Basic;
    response
}
