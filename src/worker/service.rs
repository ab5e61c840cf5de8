use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use futures::future::{join_all, BoxFuture};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use url::Url;

use crate::net::{Fetch, FetchError, Request, Response};

use super::{
    cache::CacheStorage,
    events::{
        ClientMessage, PushNotification, ReplyPort, VersionReply, WorkerEvent, WorkerMessage,
        EXPLORE_ACTION, UPDATE_AVAILABLE_MESSAGE,
    },
    strategy::{self, StrategyContext},
};

const BACKGROUND_SYNC_TAG: &str = "background-sync";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Parsed,
    Installing,
    /// Installed, waiting for the previous generation to let go.
    Waiting,
    Active,
}

/// Where the worker shows push notifications and opens app windows.
pub trait NotificationSink: Send + Sync {
    fn show(&self, notification: &PushNotification);
    fn close(&self);
    fn open_window(&self, path: &str);
}

pub struct OfflineWorker {
    cache: Arc<CacheStorage>,
    network: Arc<dyn Fetch>,
    cache_name: String,
    precache: Vec<Url>,
    state: Mutex<WorkerState>,
    skip_waiting: AtomicBool,
    clients: broadcast::Sender<ClientMessage>,
    notifier: Arc<dyn NotificationSink>,
}

impl OfflineWorker {
    pub fn new(
        cache: Arc<CacheStorage>,
        network: Arc<dyn Fetch>,
        cache_name: String,
        precache: Vec<Url>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        let (clients, _) = broadcast::channel(16);
        Self {
            cache,
            network,
            cache_name,
            precache,
            state: Mutex::new(WorkerState::Parsed),
            skip_waiting: AtomicBool::new(false),
            clients,
            notifier,
        }
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn state(&self) -> WorkerState {
        *self.state.lock()
    }

    /// Connects a client to the worker's broadcast notices.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientMessage> {
        self.clients.subscribe()
    }

    /// Installs this version and activates it right away when no older
    /// generation is around or `force_activate` is set.
    pub async fn register(&self, force_activate: bool) -> WorkerState {
        let had_previous = self.cache.keys().iter().any(|name| name != &self.cache_name);
        if force_activate {
            self.skip_waiting.store(true, Ordering::SeqCst);
        }
        self.install().await;
        if !had_previous && self.state() != WorkerState::Active {
            self.activate();
        }
        self.state()
    }

    pub async fn dispatch(&self, event: WorkerEvent) {
        match event {
            WorkerEvent::Install => self.install().await,
            WorkerEvent::Activate => {
                self.activate();
            }
            WorkerEvent::Push { data } => self.on_push(data.as_deref()),
            WorkerEvent::NotificationClick { action } => {
                self.on_notification_click(action.as_deref())
            }
            WorkerEvent::Message { data, port } => self.on_message(data, port),
            WorkerEvent::Sync { tag } => self.on_sync(&tag),
        }
    }

    /// Pre-populates the versioned cache with the manifest, all or nothing.
    pub async fn install(&self) {
        *self.state.lock() = WorkerState::Installing;
        tracing::info!(target: "worker", cache = %self.cache_name, "installing");
        self.cache.open(&self.cache_name);

        let requests: Vec<Request> = self.precache.iter().cloned().map(Request::get).collect();
        let responses = join_all(requests.iter().map(|request| self.network.fetch(request))).await;

        let mut entries = Vec::with_capacity(requests.len());
        let mut failed = None;
        for (request, response) in requests.iter().zip(responses) {
            match response {
                Ok(response) if response.is_ok() => entries.push((request.cache_key(), response)),
                Ok(response) => {
                    failed = Some(format!("{} answered {}", request.url, response.status));
                    break;
                }
                Err(err) => {
                    failed = Some(format!("{}: {err}", request.url));
                    break;
                }
            }
        }

        match failed {
            None => {
                tracing::info!(target: "worker", entries = entries.len(), "precache stored");
                self.cache.put_all(&self.cache_name, entries);
            }
            Some(reason) => {
                tracing::warn!(target: "worker", %reason, "precache failed; nothing stored");
            }
        }

        *self.state.lock() = WorkerState::Waiting;
        if self.skip_waiting.load(Ordering::SeqCst) {
            self.activate();
        }
    }

    /// Takes control and drops every cache generation but the current one.
    /// Returns the names that were deleted.
    pub fn activate(&self) -> Vec<String> {
        tracing::info!(target: "worker", cache = %self.cache_name, "activating");
        let stale: Vec<String> = self
            .cache
            .keys()
            .into_iter()
            .filter(|name| name != &self.cache_name)
            .collect();
        for name in &stale {
            tracing::info!(target: "worker", cache = %name, "removing stale cache");
            self.cache.delete(name);
        }
        *self.state.lock() = WorkerState::Active;
        stale
    }

    pub fn skip_waiting(&self) {
        self.skip_waiting.store(true, Ordering::SeqCst);
        if self.state() == WorkerState::Waiting {
            self.activate();
        }
    }

    /// Answers an intercepted request. Until the worker is active requests
    /// go straight to the network.
    pub async fn handle_fetch(&self, request: &Request) -> Result<Response, FetchError> {
        if self.state() != WorkerState::Active {
            return self.network.fetch(request).await;
        }
        let ctx = StrategyContext {
            cache: &self.cache,
            cache_name: &self.cache_name,
            network: self.network.as_ref(),
        };
        strategy::respond(&ctx, request).await
    }

    fn on_push(&self, data: Option<&str>) {
        tracing::info!(target: "worker", "push received");
        self.notifier.show(&PushNotification::from_push(data));
    }

    fn on_notification_click(&self, action: Option<&str>) {
        tracing::info!(target: "worker", action = action.unwrap_or("-"), "notification clicked");
        self.notifier.close();
        if action == Some(EXPLORE_ACTION) {
            self.notifier.open_window("/");
        }
    }

    fn on_message(&self, data: serde_json::Value, port: Option<ReplyPort>) {
        let message: WorkerMessage = match serde_json::from_value(data) {
            Ok(message) => message,
            Err(err) => {
                tracing::debug!(target: "worker", error = %err, "ignoring unknown message");
                return;
            }
        };
        tracing::info!(target: "worker", ?message, "message received");

        match message {
            WorkerMessage::SkipWaiting => self.skip_waiting(),
            WorkerMessage::GetVersion => {
                let Some(port) = port else {
                    tracing::warn!(target: "worker", "GET_VERSION without a reply port");
                    return;
                };
                let reply = VersionReply {
                    version: self.cache_name.clone(),
                };
                if port.send(reply).is_err() {
                    tracing::debug!(target: "worker", "version requester went away");
                }
            }
            WorkerMessage::UpdateFound => {
                let notice = ClientMessage::UpdateAvailable {
                    message: UPDATE_AVAILABLE_MESSAGE.to_string(),
                };
                let delivered = self.clients.send(notice).unwrap_or(0);
                tracing::info!(target: "worker", clients = delivered, "update notice broadcast");
            }
        }
    }

    fn on_sync(&self, tag: &str) {
        tracing::info!(target: "worker", %tag, "sync event");
        if tag == BACKGROUND_SYNC_TAG {
            tracing::info!(target: "worker", "running background sync");
        }
    }
}

impl Fetch for OfflineWorker {
    fn fetch<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Response, FetchError>> {
        Box::pin(self.handle_fetch(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{
        testing::{plain, FakeNetwork},
        ResponseKind,
    };
    use serde_json::json as value;
    use tokio::sync::oneshot;

    #[derive(Default)]
    struct RecordingSink {
        shown: Mutex<Vec<PushNotification>>,
        closed: Mutex<usize>,
        opened: Mutex<Vec<String>>,
    }

    impl NotificationSink for RecordingSink {
        fn show(&self, notification: &PushNotification) {
            self.shown.lock().push(notification.clone());
        }
        fn close(&self) {
            *self.closed.lock() += 1;
        }
        fn open_window(&self, path: &str) {
            self.opened.lock().push(path.to_string());
        }
    }

    const CACHE: &str = "autou-v2.0.0";

    struct Harness {
        worker: OfflineWorker,
        cache: Arc<CacheStorage>,
        network: Arc<FakeNetwork>,
        sink: Arc<RecordingSink>,
    }

    fn harness(precache: &[&str]) -> Harness {
        let cache = Arc::new(CacheStorage::new());
        let network = FakeNetwork::new();
        let sink = Arc::new(RecordingSink::default());
        let worker = OfflineWorker::new(
            cache.clone(),
            network.clone(),
            CACHE.to_string(),
            precache.iter().map(|u| Url::parse(u).expect("url")).collect(),
            sink.clone(),
        );
        Harness {
            worker,
            cache,
            network,
            sink,
        }
    }

    #[tokio::test]
    async fn install_precaches_manifest() {
        let h = harness(&["http://app.test/", "http://app.test/static/app.js"]);
        h.network.respond("http://app.test/", plain(200, ResponseKind::Basic, b"index"));
        h.network
            .respond("http://app.test/static/app.js", plain(200, ResponseKind::Basic, b"js"));

        let state = h.worker.register(false).await;
        assert_eq!(state, WorkerState::Active);
        assert_eq!(h.cache.len(CACHE), 2);
    }

    #[tokio::test]
    async fn failed_precache_stores_nothing() {
        let h = harness(&["http://app.test/", "http://app.test/static/app.js"]);
        h.network.respond("http://app.test/", plain(200, ResponseKind::Basic, b"index"));
        h.network.fail("http://app.test/static/app.js");

        h.worker.install().await;
        assert_eq!(h.worker.state(), WorkerState::Waiting);
        assert_eq!(h.cache.len(CACHE), 0);
    }

    #[tokio::test]
    async fn activation_keeps_only_current_generation() {
        let h = harness(&[]);
        h.cache.put("autou-v1.0.0", "k", plain(200, ResponseKind::Basic, b"old"));
        h.cache.put("other-cache", "k", plain(200, ResponseKind::Basic, b"other"));
        h.cache.put(CACHE, "k", plain(200, ResponseKind::Basic, b"new"));

        let mut deleted = h.worker.activate();
        deleted.sort();
        assert_eq!(deleted, vec!["autou-v1.0.0".to_string(), "other-cache".to_string()]);
        assert_eq!(h.cache.keys(), vec![CACHE.to_string()]);
    }

    #[tokio::test]
    async fn upgrade_waits_until_skip_waiting() {
        let h = harness(&[]);
        h.cache.put("autou-v1.0.0", "k", plain(200, ResponseKind::Basic, b"old"));

        assert_eq!(h.worker.register(false).await, WorkerState::Waiting);
        assert_eq!(h.cache.keys().len(), 2);

        h.worker
            .dispatch(WorkerEvent::Message {
                data: value!({ "type": "SKIP_WAITING" }),
                port: None,
            })
            .await;
        assert_eq!(h.worker.state(), WorkerState::Active);
        assert_eq!(h.cache.keys(), vec![CACHE.to_string()]);
    }

    #[tokio::test]
    async fn dispatched_lifecycle_events_install_then_activate() {
        let h = harness(&["http://app.test/"]);
        h.network.respond("http://app.test/", plain(200, ResponseKind::Basic, b"index"));
        h.cache.put("autou-v1.0.0", "k", plain(200, ResponseKind::Basic, b"old"));

        h.worker.dispatch(WorkerEvent::Install).await;
        assert_eq!(h.worker.state(), WorkerState::Waiting);
        assert_eq!(h.cache.len(CACHE), 1);

        h.worker.dispatch(WorkerEvent::Activate).await;
        assert_eq!(h.worker.state(), WorkerState::Active);
        assert_eq!(h.cache.keys(), vec![CACHE.to_string()]);
    }

    #[tokio::test]
    async fn waiting_worker_passes_requests_through() {
        let h = harness(&[]);
        h.worker.install().await;
        let url = "http://app.test/static/app.js";
        h.network.respond(url, plain(200, ResponseKind::Basic, b"js"));

        h.worker
            .fetch(&Request::get(Url::parse(url).expect("url")))
            .await
            .expect("response");
        assert_eq!(h.cache.len(CACHE), 0);

        h.worker.activate();
        h.worker
            .fetch(&Request::get(Url::parse(url).expect("url")))
            .await
            .expect("response");
        assert_eq!(h.cache.len(CACHE), 1);
    }

    #[tokio::test]
    async fn active_worker_answers_offline_api_calls() {
        let h = harness(&[]);
        h.worker.register(false).await;
        h.network.fail("http://app.test/api/process");

        let response = h
            .worker
            .fetch(&Request::post_form(
                Url::parse("http://app.test/api/process").expect("url"),
                Vec::new(),
            ))
            .await
            .expect("fallback");
        assert_eq!(response.status, 503);
        let body: serde_json::Value = response.parse_json().expect("json");
        assert_eq!(body["offline"], value!(true));
    }

    #[tokio::test]
    async fn get_version_replies_on_port() {
        let h = harness(&[]);
        let (tx, rx) = oneshot::channel();
        h.worker
            .dispatch(WorkerEvent::Message {
                data: value!({ "type": "GET_VERSION" }),
                port: Some(tx),
            })
            .await;
        assert_eq!(rx.await.expect("reply").version, CACHE);
    }

    #[tokio::test]
    async fn update_found_reaches_every_client() {
        let h = harness(&[]);
        let mut first = h.worker.subscribe();
        let mut second = h.worker.subscribe();

        h.worker
            .dispatch(WorkerEvent::Message {
                data: value!({ "type": "UPDATE_FOUND" }),
                port: None,
            })
            .await;

        for rx in [&mut first, &mut second] {
            let ClientMessage::UpdateAvailable { message } = rx.recv().await.expect("notice");
            assert_eq!(message, UPDATE_AVAILABLE_MESSAGE);
        }
    }

    #[tokio::test]
    async fn unknown_messages_are_ignored() {
        let h = harness(&[]);
        h.worker
            .dispatch(WorkerEvent::Message {
                data: value!({ "hello": 1 }),
                port: None,
            })
            .await;
        assert_eq!(h.worker.state(), WorkerState::Parsed);
    }

    #[tokio::test]
    async fn push_and_click_drive_the_sink() {
        let h = harness(&[]);
        h.worker
            .dispatch(WorkerEvent::Push {
                data: Some("hello".to_string()),
            })
            .await;
        h.worker
            .dispatch(WorkerEvent::NotificationClick { action: None })
            .await;
        h.worker
            .dispatch(WorkerEvent::NotificationClick {
                action: Some(EXPLORE_ACTION.to_string()),
            })
            .await;

        assert_eq!(h.sink.shown.lock()[0].body, "hello");
        assert_eq!(*h.sink.closed.lock(), 2);
        assert_eq!(*h.sink.opened.lock(), vec!["/".to_string()]);
    }

    #[tokio::test]
    async fn sync_is_a_no_op() {
        let h = harness(&[]);
        h.worker
            .dispatch(WorkerEvent::Sync {
                tag: "background-sync".to_string(),
            })
            .await;
        assert_eq!(h.network.call_count(), 0);
    }
}
