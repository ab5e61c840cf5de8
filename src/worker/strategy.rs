use serde_json::json;

use crate::net::{Fetch, FetchError, Request, Response, ResponseKind};

use super::cache::CacheStorage;

const STATIC_MARKERS: &[&str] = &["/static/", "cdn.tailwindcss.com", "unpkg.com"];
const API_MARKER: &str = "/api/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    StaticAsset,
    Api,
    Other,
}

impl RouteClass {
    pub fn of(request: &Request) -> Self {
        let url = request.url.as_str();
        if STATIC_MARKERS.iter().any(|marker| url.contains(marker)) {
            RouteClass::StaticAsset
        } else if url.contains(API_MARKER) {
            RouteClass::Api
        } else {
            RouteClass::Other
        }
    }
}

/// Shared inputs of every strategy.
pub struct StrategyContext<'a> {
    pub cache: &'a CacheStorage,
    pub cache_name: &'a str,
    pub network: &'a dyn Fetch,
}

pub async fn respond(ctx: &StrategyContext<'_>, request: &Request) -> Result<Response, FetchError> {
    match RouteClass::of(request) {
        RouteClass::StaticAsset => cache_first(ctx, request).await,
        RouteClass::Api => network_first(ctx, request).await,
        RouteClass::Other => cache_or_network(ctx, request).await,
    }
}

/// Serves from cache; on a miss fetches and keeps only healthy same-origin
/// responses. Network errors propagate.
pub async fn cache_first(
    ctx: &StrategyContext<'_>,
    request: &Request,
) -> Result<Response, FetchError> {
    let key = request.cache_key();
    if let Some(hit) = lookup(ctx, request) {
        tracing::trace!(target: "worker", url = %key, "static cache hit");
        return Ok(hit);
    }

    let response = ctx.network.fetch(request).await?;
    if request.is_cacheable() && response.status == 200 && response.kind == ResponseKind::Basic {
        ctx.cache.put(ctx.cache_name, &key, response.clone());
    }
    Ok(response)
}

/// Always tries the network first, caching 200s; falls back to the cache and
/// finally to a synthesized offline reply.
pub async fn network_first(
    ctx: &StrategyContext<'_>,
    request: &Request,
) -> Result<Response, FetchError> {
    let key = request.cache_key();
    match ctx.network.fetch(request).await {
        Ok(response) => {
            if request.is_cacheable() && response.status == 200 {
                ctx.cache.put(ctx.cache_name, &key, response.clone());
            }
            Ok(response)
        }
        Err(err) => {
            tracing::warn!(target: "worker", url = %key, error = %err, "api request failed; trying cache");
            Ok(lookup(ctx, request).unwrap_or_else(offline_response))
        }
    }
}

pub async fn cache_or_network(
    ctx: &StrategyContext<'_>,
    request: &Request,
) -> Result<Response, FetchError> {
    match lookup(ctx, request) {
        Some(hit) => Ok(hit),
        None => ctx.network.fetch(request).await,
    }
}

fn lookup(ctx: &StrategyContext<'_>, request: &Request) -> Option<Response> {
    if request.is_cacheable() {
        ctx.cache.match_key(&request.cache_key())
    } else {
        None
    }
}

pub fn offline_response() -> Response {
    Response::json(
        503,
        "Service Unavailable",
        &json!({
            "error": "No internet connection",
            "offline": true,
            "message": "This feature requires an internet connection",
        }),
    )
}
