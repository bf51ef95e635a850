//! Request orchestration against an in-process transport that records calls.

use async_trait::async_trait;
use bytes::Bytes;
use comrade_reader::cache::CacheKey;
use comrade_reader::params::RequestBody;
use comrade_reader::transport::{Timeouts, TransportRequest, TransportResponse};
use comrade_reader::{
    ApiClient, ApiClientBuilder, CacheBackend, CacheLifetime, Collection, Error, Method, NullCache,
    QueryFormStrategy, RawJsonStrategy, ReaderConfig, RequestSpec, Transport, TransportError,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Color {
    id: u32,
    color_name: String,
}

#[derive(Debug, Clone)]
struct Recorded {
    url: String,
    spec: RequestSpec,
    headers: BTreeMap<String, String>,
    timeouts: Timeouts,
}

struct FakeTransport {
    status: u16,
    body: &'static str,
    calls: AtomicUsize,
    last: Mutex<Option<Recorded>>,
}

impl FakeTransport {
    fn replying(status: u16, body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            status,
            body,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last(&self) -> Recorded {
        self.last.lock().unwrap().clone().expect("no request recorded")
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: TransportRequest<'_>) -> Result<TransportResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(Recorded {
            url: request.url.clone(),
            spec: request.spec.clone(),
            headers: request.headers.clone(),
            timeouts: request.timeouts,
        });
        if self.status >= 400 {
            return Err(TransportError::Status {
                status: self.status,
                body: self.body.to_string(),
            });
        }
        Ok(TransportResponse {
            status: self.status,
            body: Bytes::from_static(self.body.as_bytes()),
        })
    }
}

/// Backend whose reads or writes always fail.
struct BrokenCache {
    fail_fetch: bool,
    fail_save: bool,
}

#[async_trait]
impl CacheBackend for BrokenCache {
    async fn fetch(&self, _: &CacheKey) -> comrade_reader::Result<Option<Bytes>> {
        if self.fail_fetch {
            return Err(Error::cache("backend unavailable"));
        }
        Ok(None)
    }
    async fn save(&self, _: &CacheKey, _: Bytes, _: Duration) -> comrade_reader::Result<()> {
        if self.fail_save {
            return Err(Error::cache("disk full"));
        }
        Ok(())
    }
    async fn delete(&self, _: &CacheKey) -> comrade_reader::Result<bool> {
        Ok(false)
    }
    async fn clear(&self) -> comrade_reader::Result<()> {
        Ok(())
    }
    async fn len(&self) -> comrade_reader::Result<usize> {
        Ok(0)
    }
    fn name(&self) -> &'static str {
        "broken"
    }
}

fn client_with_cache(transport: Arc<FakeTransport>, cache: BrokenCache) -> ApiClient {
    ApiClientBuilder::from_config(ReaderConfig::new("http://api.test"))
        .transport(transport)
        .cache_backend(Arc::new(cache))
        .build()
        .unwrap()
}

const COLOR: &str = r#"{"success":true,"data":{"id":1,"colorName":"red"}}"#;

fn client(transport: Arc<FakeTransport>) -> ApiClient {
    ApiClientBuilder::from_config(ReaderConfig::new("http://api.test"))
        .token("test")
        .transport(transport)
        .build()
        .unwrap()
}

#[tokio::test]
async fn cached_get_calls_transport_once() {
    let transport = FakeTransport::replying(200, COLOR);
    let client = client(transport.clone());

    let first = client
        .get("/colors")
        .form([("page", 1)])
        .ttl(500)
        .execute()
        .await
        .unwrap();
    let second = client
        .get("/colors")
        .form([("page", 1)])
        .ttl(500)
        .execute()
        .await
        .unwrap();

    assert_eq!(transport.calls(), 1);
    assert!(!first.is_cached());
    assert!(second.is_cached());
    assert_eq!(
        first.decode_one::<Color>().unwrap(),
        second.decode_one::<Color>().unwrap()
    );
    let stats = client.cache_stats();
    assert_eq!((stats.hits, stats.misses, stats.sets), (1, 1, 1));
}

#[tokio::test]
async fn negative_ttl_bypasses_cache() {
    let transport = FakeTransport::replying(200, COLOR);
    let client = client(transport.clone());

    for _ in 0..2 {
        client.get("/colors").ttl(-1).execute().await.unwrap();
    }

    assert_eq!(transport.calls(), 2);
    let stats = client.cache_stats();
    assert_eq!((stats.hits, stats.misses, stats.sets), (0, 0, 0));
}

#[tokio::test]
async fn configured_default_ttl_applies_when_unspecified() {
    let transport = FakeTransport::replying(200, COLOR);
    let client = ApiClientBuilder::from_config(ReaderConfig::new("http://api.test"))
        .default_ttl_secs(-1)
        .transport(transport.clone())
        .build()
        .unwrap();

    client.get("/colors").execute().await.unwrap();
    client.get("/colors").execute().await.unwrap();
    assert_eq!(transport.calls(), 2);

    client.get("/colors").ttl(60).execute().await.unwrap();
    client.get("/colors").ttl(60).execute().await.unwrap();
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn different_parameters_are_cached_separately() {
    let transport = FakeTransport::replying(200, COLOR);
    let client = client(transport.clone());

    client.get("/colors").form([("page", 1)]).execute().await.unwrap();
    client.get("/colors").form([("page", 2)]).execute().await.unwrap();
    client.delete("/colors").form([("page", 1)]).execute().await.unwrap();

    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn not_found_for_every_verb() {
    for method in [Method::Get, Method::Post, Method::Put, Method::Delete] {
        let transport = FakeTransport::replying(404, "");
        let client = client(transport.clone());

        let err = client
            .request(method, "/this-should-not-be-found")
            .execute()
            .await
            .unwrap_err();

        assert!(err.is_not_found(), "{method}: {err:?}");
        match err {
            Error::ResourceNotFound { path } => assert_eq!(path, "/this-should-not-be-found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

#[tokio::test]
async fn failed_calls_are_never_cached() {
    let transport = FakeTransport::replying(500, "internal error");
    let client = client(transport.clone());

    for _ in 0..2 {
        let err = client.get("/colors").execute().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(TransportError::Status { status: 500, .. })
        ));
    }

    assert_eq!(transport.calls(), 2);
    assert_eq!(client.cache_stats().sets, 0);
}

#[tokio::test]
async fn post_puts_path_query_and_token_in_query_and_params_in_form() {
    let transport = FakeTransport::replying(200, "{}");
    let client = client(transport.clone()).with_token_field("custom_token_field_name");

    client
        .post("/post-parameters.php?this_is_a_get_parameter=true")
        .form([("integer", 1)])
        .execute()
        .await
        .unwrap();

    let recorded = transport.last();
    assert_eq!(recorded.url, "http://api.test/post-parameters.php");
    assert_eq!(
        recorded.spec.query.get("this_is_a_get_parameter").map(String::as_str),
        Some("true")
    );
    assert_eq!(
        recorded.spec.query.get("custom_token_field_name").map(String::as_str),
        Some("test")
    );
    assert!(!recorded.spec.query.contains_key("token"));
    assert_eq!(
        recorded.spec.form_params().and_then(|f| f.get("integer").cloned()),
        Some(Some("1".to_string()))
    );
}

#[tokio::test]
async fn requests_without_params_still_carry_the_token() {
    let transport = FakeTransport::replying(200, "{}");
    let client = client(transport.clone());

    client.get("/colors").execute().await.unwrap();

    let recorded = transport.last();
    assert_eq!(recorded.spec.query.get("token").map(String::as_str), Some("test"));
    assert_eq!(recorded.spec.body, RequestBody::Empty);
}

#[tokio::test]
async fn raw_json_skips_token_injection() {
    let transport = FakeTransport::replying(200, "{}");
    let client = client(transport.clone());

    client
        .put("/articles/1")
        .json(r#"{"title":"Solidarity"}"#)
        .unwrap()
        .execute()
        .await
        .unwrap();

    let recorded = transport.last();
    assert!(recorded.spec.query.is_empty());
    assert_eq!(
        recorded.spec.json_body(),
        Some(&serde_json::json!({"title": "Solidarity"}))
    );
}

#[tokio::test]
async fn configuration_errors_stop_before_transport() {
    let transport = FakeTransport::replying(200, "{}");
    let client = client(transport.clone());

    let unset = client
        .get("/colors")
        .params(QueryFormStrategy::new())
        .execute()
        .await
        .unwrap_err();
    assert!(matches!(unset, Error::Configuration { .. }));

    let json_get = client
        .get("/colors")
        .params(RawJsonStrategy::new().with_value(serde_json::json!({})))
        .execute()
        .await
        .unwrap_err();
    assert!(matches!(json_get, Error::Configuration { .. }));

    assert!(client.post("/colors").json("{broken").is_err());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn headers_and_timeouts_reach_the_transport() {
    let transport = FakeTransport::replying(200, "{}");
    let client = client(transport.clone());

    client.get("/colors").execute().await.unwrap();
    let recorded = transport.last();
    assert_eq!(
        recorded.headers.get("Content-Type").map(String::as_str),
        Some("application/json")
    );
    assert_eq!(recorded.timeouts, Timeouts::default());

    let traced = client.with_headers(BTreeMap::from([("X-Trace".to_string(), "1".to_string())]));
    traced.get("/colors").ttl(CacheLifetime::Bypass).execute().await.unwrap();
    let recorded = transport.last();
    assert_eq!(recorded.headers.get("X-Trace").map(String::as_str), Some("1"));
    assert!(recorded.headers.contains_key("Content-Type"));
}

#[tokio::test]
async fn paginated_body_decodes_through_client() {
    let transport = FakeTransport::replying(
        200,
        r#"{"results":[{"id":1,"colorName":"red"}],"current_page":1,"max_pages":1}"#,
    );
    let client = client(transport);

    let decoded: Collection<Color> = client
        .get("/colors")
        .execute()
        .await
        .unwrap()
        .decode_many()
        .unwrap();

    let page = decoded.as_paginated().expect("paginated shape");
    assert_eq!(page.items.len(), 1);
    assert_eq!((page.current_page, page.max_pages), (1, 1));
}

#[tokio::test]
async fn null_cache_always_misses() {
    let transport = FakeTransport::replying(200, COLOR);
    let client = ApiClientBuilder::from_config(ReaderConfig::new("http://api.test"))
        .transport(transport.clone())
        .cache_backend(Arc::new(NullCache::new()))
        .build()
        .unwrap();

    client.get("/colors").execute().await.unwrap();
    client.get("/colors").execute().await.unwrap();
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn concurrent_identical_misses_both_succeed() {
    let transport = FakeTransport::replying(200, COLOR);
    let client = client(transport.clone());

    let (a, b) = tokio::join!(
        client.get("/colors").execute(),
        client.get("/colors").execute()
    );
    assert_eq!(
        a.unwrap().decode_one::<Color>().unwrap(),
        b.unwrap().decode_one::<Color>().unwrap()
    );
    assert!((1..=2).contains(&transport.calls()));
}

#[tokio::test]
async fn cache_fetch_failure_stops_before_transport() {
    let transport = FakeTransport::replying(200, COLOR);
    let client = client_with_cache(
        transport.clone(),
        BrokenCache {
            fail_fetch: true,
            fail_save: false,
        },
    );

    let err = client.get("/colors").execute().await.unwrap_err();

    assert!(matches!(err, Error::Cache { .. }));
    assert_eq!(transport.calls(), 0);
    assert_eq!(client.cache_stats().errors, 1);
}

#[tokio::test]
async fn cache_save_failure_surfaces_after_transport() {
    let transport = FakeTransport::replying(200, COLOR);
    let client = client_with_cache(
        transport.clone(),
        BrokenCache {
            fail_fetch: false,
            fail_save: true,
        },
    );

    let err = client.get("/colors").execute().await.unwrap_err();

    assert!(matches!(err, Error::Cache { .. }));
    assert_eq!(transport.calls(), 1);
    let stats = client.cache_stats();
    assert_eq!((stats.misses, stats.sets, stats.errors), (1, 0, 1));
}

#[tokio::test]
async fn broken_cache_is_not_consulted_when_bypassed() {
    let transport = FakeTransport::replying(200, COLOR);
    let client = client_with_cache(
        transport.clone(),
        BrokenCache {
            fail_fetch: true,
            fail_save: true,
        },
    );

    client.get("/colors").bypass_cache().execute().await.unwrap();
    assert_eq!(transport.calls(), 1);
    assert_eq!(client.cache_stats().errors, 0);
}
