//! In-memory transport for tests.
//!
//! `ScriptedTransport` implements [`HttpTransport`] without touching the
//! network. Responses are registered per method and path ahead of time; every
//! request is recorded so tests can assert on call counts, headers and bodies.
//!
//! ```rust,ignore
//! let transport = ScriptedTransport::new();
//! transport.respond(Method::GET, "/storefront/categories", 200, json!({ "data": [] }));
//! transport.respond_delayed(
//!     Method::GET,
//!     "/storefront/products?categoryId=2",
//!     200,
//!     json!({ "data": [] }),
//!     Duration::from_millis(50),
//! );
//!
//! let client = ApiClient::new(base_url, Some("acme".into()), images, persistence, transport.clone());
//! // ...
//! assert_eq!(transport.count(Method::GET, "/storefront/categories"), 1);
//! ```
//!
//! Routes match when the request path ends with the registered path and, if
//! the registered path carries a `?query`, the query string is identical.
//! Replies queue up per route; the last one keeps answering once the queue
//! drains.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;

use super::ApiError;
use super::transport::{ApiRequest, ApiResponse, HttpTransport};

/// One canned reply.
#[derive(Debug, Clone)]
struct Reply {
    status: u16,
    body: String,
    delay: Option<Duration>,
}

#[derive(Debug)]
struct Route {
    method: Method,
    path: String,
    query: Option<String>,
    replies: VecDeque<Reply>,
}

impl Route {
    fn matches(&self, request: &ApiRequest) -> bool {
        self.method == request.method
            && request.url.path().ends_with(&self.path)
            && self
                .query
                .as_deref()
                .is_none_or(|q| request.url.query() == Some(q))
    }

    fn next_reply(&mut self) -> Option<Reply> {
        if self.replies.len() > 1 {
            self.replies.pop_front()
        } else {
            self.replies.front().cloned()
        }
    }
}

/// A transport that replays registered responses and records requests.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a JSON reply for `method` + `path` (optionally `path?query`).
    pub fn respond(&self, method: Method, path: &str, status: u16, body: serde_json::Value) {
        self.push(method, path, status, body.to_string(), None);
    }

    /// Queue a JSON reply that is delivered after `delay`.
    pub fn respond_delayed(
        &self,
        method: Method,
        path: &str,
        status: u16,
        body: serde_json::Value,
        delay: Duration,
    ) {
        self.push(method, path, status, body.to_string(), Some(delay));
    }

    /// Queue a raw-text reply (for malformed or empty bodies).
    pub fn respond_raw(&self, method: Method, path: &str, status: u16, body: &str) {
        self.push(method, path, status, body.to_string(), None);
    }

    fn push(&self, method: Method, path: &str, status: u16, body: String, delay: Option<Duration>) {
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p.to_string(), Some(q.to_string())),
            None => (path.to_string(), None),
        };
        let reply = Reply {
            status,
            body,
            delay,
        };

        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(route) = routes
            .iter_mut()
            .find(|r| r.method == method && r.path == path && r.query == query)
        {
            route.replies.push_back(reply);
        } else {
            routes.push(Route {
                method,
                path,
                query,
                replies: VecDeque::from([reply]),
            });
        }
    }

    /// Every request seen so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests whose method matches and path ends with `path`.
    #[must_use]
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.method == method && r.url.path().ends_with(path))
            .count()
    }

    /// Total number of requests.
    #[must_use]
    pub fn total(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Most recent request, if any.
    #[must_use]
    pub fn last_request(&self) -> Option<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let reply = {
            let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
            routes
                .iter_mut()
                .rev()
                .find(|r| r.matches(&request))
                .and_then(Route::next_reply)
        };
        let description = format!("{} {}", request.method, request.url);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let reply =
            reply.ok_or_else(|| ApiError::Transport(format!("no scripted response for {description}")))?;
        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(ApiResponse {
            status: reply.status,
            body: reply.body,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use url::Url;

    use super::*;
    use crate::api::transport::RequestBody;

    fn get(url: &str) -> ApiRequest {
        ApiRequest {
            method: Method::GET,
            url: Url::parse(url).unwrap(),
            headers: vec![],
            body: RequestBody::Empty,
        }
    }

    #[tokio::test]
    async fn test_replies_in_order_then_sticky() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::GET, "/a", 500, json!({}));
        transport.respond(Method::GET, "/a", 200, json!({ "ok": true }));

        let first = transport.send(get("http://x.test/api/a")).await.unwrap();
        let second = transport.send(get("http://x.test/api/a")).await.unwrap();
        let third = transport.send(get("http://x.test/api/a")).await.unwrap();

        assert_eq!(first.status, 500);
        assert_eq!(second.status, 200);
        assert_eq!(third.status, 200);
        assert_eq!(transport.count(Method::GET, "/a"), 3);
    }

    #[tokio::test]
    async fn test_query_must_match_exactly() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::GET, "/p?categoryId=2", 200, json!([2]));
        transport.respond(Method::GET, "/p?categoryId=5", 200, json!([5]));

        let five = transport
            .send(get("http://x.test/p?categoryId=5"))
            .await
            .unwrap();
        assert_eq!(five.body, "[5]");
        assert!(transport.send(get("http://x.test/p")).await.is_err());
    }

    #[tokio::test]
    async fn test_unmatched_request_is_recorded_and_fails() {
        let transport = ScriptedTransport::new();
        let result = transport.send(get("http://x.test/nothing")).await;
        assert!(matches!(result, Err(ApiError::Transport(_))));
        assert_eq!(transport.total(), 1);
    }
}
