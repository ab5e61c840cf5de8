//! Offline cache worker: intercepts the client's HTTP traffic and applies a
//! caching strategy per URL class, plus push/message/sync lifecycle events.

pub mod cache;
pub mod events;
mod service;
pub mod strategy;

pub use cache::CacheStorage;
pub use events::{ClientMessage, PushNotification, VersionReply, WorkerEvent, WorkerMessage};
pub use service::{NotificationSink, OfflineWorker, WorkerState};
