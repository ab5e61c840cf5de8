use futures::future::BoxFuture;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::domain::Upload;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The host could not be reached at all: connection refused, DNS
    /// failure or timeout.
    #[error("network unavailable: {0}")]
    Offline(String),
}

impl FetchError {
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            FetchError::Offline(err.to_string())
        } else {
            FetchError::Network(err)
        }
    }
}

/// Anything that can answer an HTTP request: the plain network, or the
/// offline cache worker sitting in front of it.
pub trait Fetch: Send + Sync {
    fn fetch<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Response, FetchError>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    Text { name: String, value: String },
    File { name: String, upload: Upload },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    #[default]
    Empty,
    Form(Vec<FormField>),
}

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub body: RequestBody,
}

impl Request {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            body: RequestBody::Empty,
        }
    }

    pub fn post_form(url: Url, fields: Vec<FormField>) -> Self {
        Self {
            method: Method::POST,
            url,
            body: RequestBody::Form(fields),
        }
    }

    /// Only GET responses are stored in or served from the cache.
    pub fn is_cacheable(&self) -> bool {
        self.method == Method::GET
    }

    /// Key under which the response is cached: the URL without its fragment.
    pub fn cache_key(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        url.to_string()
    }
}

/// Mirrors the Fetch API response types the cache strategies care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Same-origin response.
    Basic,
    Cors,
    /// Built locally rather than received from the network.
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub kind: ResponseKind,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn json(status: u16, status_text: &str, value: &serde_json::Value) -> Self {
        Self {
            status,
            status_text: status_text.to_string(),
            kind: ResponseKind::Default,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: serde_json::to_vec(value).unwrap_or_default(),
        }
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    #[cfg(test)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn parse_json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}
