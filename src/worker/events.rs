use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Commands clients post to the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerMessage {
    SkipWaiting,
    GetVersion,
    UpdateFound,
}

/// Notices the worker broadcasts to every connected client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    UpdateAvailable { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionReply {
    pub version: String,
}

pub type ReplyPort = oneshot::Sender<VersionReply>;

/// Lifecycle and auxiliary events delivered to the worker.
#[derive(Debug)]
pub enum WorkerEvent {
    Install,
    Activate,
    Push { data: Option<String> },
    NotificationClick { action: Option<String> },
    Message {
        data: serde_json::Value,
        port: Option<ReplyPort>,
    },
    Sync { tag: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationData {
    pub date_of_arrival: i64,
    pub primary_key: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

pub const NOTIFICATION_TITLE: &str = "AutoU";
pub const DEFAULT_PUSH_BODY: &str = "New notification from AutoU";
pub const EXPLORE_ACTION: &str = "explore";
pub const UPDATE_AVAILABLE_MESSAGE: &str = "A new version is available. Reload to update.";

impl PushNotification {
    pub fn from_push(data: Option<&str>) -> Self {
        let action_icon = "/static/icons/icon-96x96.png".to_string();
        Self {
            title: NOTIFICATION_TITLE.to_string(),
            body: data.unwrap_or(DEFAULT_PUSH_BODY).to_string(),
            icon: "/static/icons/icon-192x192.png".to_string(),
            badge: "/static/icons/icon-72x72.png".to_string(),
            vibrate: vec![100, 50, 100],
            data: NotificationData {
                date_of_arrival: Utc::now().timestamp_millis(),
                primary_key: 1,
            },
            actions: vec![
                NotificationAction {
                    action: EXPLORE_ACTION.to_string(),
                    title: "Open AutoU".to_string(),
                    icon: action_icon.clone(),
                },
                NotificationAction {
                    action: "close".to_string(),
                    title: "Close".to_string(),
                    icon: action_icon,
                },
            ],
        }
    }
}
