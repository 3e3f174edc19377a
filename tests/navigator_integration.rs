//! End-to-end tests through the real transport against a local mock server.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;

use fhir_navigator::model::{Bundle, BundleType, Organization, Patient, Resource, SearchParams, TypedResource};
use fhir_navigator::{NavigatorError, NavigatorFactory};

mod common;

use common::{config_for, start_programmable_backend, MockResponse};

fn patient(id: &str) -> serde_json::Value {
    json!({"resourceType": "Patient", "id": id, "meta": {"versionId": "1"}})
}

#[tokio::test]
async fn test_retry_on_transient_failure() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let backend = start_programmable_backend(move |_| {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            match n {
                0 => MockResponse::status(503),
                1 => MockResponse::status(429).with_header("Retry-After", "0"),
                _ => MockResponse::json(200, patient("1")),
            }
        }
    })
    .await;

    let factory = NavigatorFactory::new(Arc::new(config_for(&backend, "primary"))).unwrap();
    let mut navigator = factory.navigator("primary").unwrap();

    let found: Patient = navigator.get_resource("1").await.unwrap().unwrap();
    assert_eq!(found.id(), Some("1"));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(backend.count("/fhir/Patient/1"), 3);

    // Served from the cache the second time.
    let _: Patient = navigator.get_resource("1").await.unwrap().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retries_give_up_after_max_attempts() {
    let backend = start_programmable_backend(|_| async { MockResponse::status(502) }).await;

    let mut config = config_for(&backend, "primary");
    config.retries.max_attempts = 3;
    let factory = NavigatorFactory::new(Arc::new(config)).unwrap();
    let mut navigator = factory.navigator("primary").unwrap();

    let err = navigator.get_resource::<Patient>("1").await.unwrap_err();
    assert!(matches!(err, NavigatorError::UnexpectedStatus { status: 502, .. }));
    assert_eq!(backend.count("/fhir/Patient/1"), 3);
}

#[tokio::test]
async fn test_non_retryable_status_is_not_retried() {
    let backend = start_programmable_backend(|_| async { MockResponse::status(400) }).await;
    let factory = NavigatorFactory::new(Arc::new(config_for(&backend, "primary"))).unwrap();
    let mut navigator = factory.navigator("primary").unwrap();

    let err = navigator.get_resource::<Patient>("1").await.unwrap_err();
    assert!(matches!(err, NavigatorError::UnexpectedStatus { status: 400, .. }));
    assert_eq!(backend.received().len(), 1);
}

#[tokio::test]
async fn test_cancellation_stops_retry_wait() {
    let backend = start_programmable_backend(|_| async { MockResponse::status(503) }).await;

    let mut config = config_for(&backend, "primary");
    config.retries.seed_delay_ms = 10_000;
    config.retries.max_delay_ms = 20_000;
    let factory = NavigatorFactory::new(Arc::new(config)).unwrap();
    let mut navigator = factory.navigator("primary").unwrap();

    let cancel = navigator.cancellation().clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
    });

    let started = Instant::now();
    let err = navigator.get_resource::<Patient>("1").await.unwrap_err();
    assert!(matches!(err, NavigatorError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(backend.received().len(), 1);
}

#[tokio::test]
async fn test_cancelling_one_navigator_leaves_others_working() {
    let backend = start_programmable_backend(|request| async move {
        match request.path() {
            "/fhir/Patient/busy" => MockResponse::status(503),
            _ => MockResponse::json(200, patient("1")),
        }
    })
    .await;

    let mut config = config_for(&backend, "a");
    config.retries.seed_delay_ms = 10_000;
    config.retries.max_delay_ms = 20_000;
    config
        .repositories
        .push(fhir_navigator::config::RepositoryConfig::new("b", backend.base_url()));
    let factory = NavigatorFactory::new(Arc::new(config)).unwrap();

    let mut first = factory.navigator("a").unwrap();
    let cancel = first.cancellation().clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
    });
    let err = first.get_resource::<Patient>("busy").await.unwrap_err();
    assert!(matches!(err, NavigatorError::Cancelled));

    let mut second = factory.navigator("b").unwrap();
    assert!(second.get_resource::<Patient>("1").await.unwrap().is_some());
    let mut again = factory.navigator("a").unwrap();
    assert!(again.get_resource::<Patient>("1").await.unwrap().is_some());
    assert!(!factory.cancellation().is_cancelled());

    factory.cancellation().cancel();
    let mut after_shutdown = factory.navigator("b").unwrap();
    let err = after_shutdown.get_resource::<Patient>("2").await.unwrap_err();
    assert!(matches!(err, NavigatorError::Cancelled));
}

#[tokio::test]
async fn test_search_follows_next_links() {
    let backend = start_programmable_backend(|request| async move {
        let host = request.header("host").unwrap_or_default().to_string();
        let page = if request.target.contains("page=3") {
            3
        } else if request.target.contains("page=2") {
            2
        } else {
            1
        };
        let mut link = vec![json!({"relation": "self", "url": format!("http://{}{}", host, request.target)})];
        if page < 3 {
            link.push(json!({
                "relation": "next",
                "url": format!("http://{}/fhir?_getpages=abc&page={}", host, page + 1)
            }));
        }
        MockResponse::json(
            200,
            json!({
                "resourceType": "Bundle",
                "type": "searchset",
                "total": 6,
                "link": link,
                "entry": [
                    {"resource": {"resourceType": "Organization", "id": format!("o{}a", page)}},
                    {"resource": {"resourceType": "Organization", "id": format!("o{}b", page)}}
                ]
            }),
        )
    })
    .await;

    let factory = NavigatorFactory::new(Arc::new(config_for(&backend, "primary"))).unwrap();

    let mut navigator = factory.navigator("primary").unwrap();
    let params = SearchParams::new().with("name", "acme");
    let progress = navigator.search::<Organization>(&params, None).await.unwrap();
    assert_eq!(progress.pages, 3);
    assert_eq!(progress.resource_total, 6);
    assert_eq!(progress.bundle_total, Some(6));
    assert!(!progress.has_next_page);
    assert_eq!(navigator.cache().count_of::<Organization>(), 6);

    let first = &backend.received()[0];
    assert_eq!(first.target, "/fhir/Organization?name=acme");
    assert_eq!(first.header("accept"), Some("application/fhir+json"));

    let mut limited = factory.navigator("primary").unwrap();
    let progress = limited.search::<Organization>(&params, Some(2)).await.unwrap();
    assert_eq!(progress.pages, 2);
    assert_eq!(progress.resource_total, 4);
    assert!(progress.has_next_page);
    assert!(progress.is_truncated());
    assert_eq!(limited.cache().count(), 4);
}

#[tokio::test]
async fn test_missing_and_deleted_resources() {
    let backend = start_programmable_backend(|request| async move {
        match (request.method.as_str(), request.path()) {
            ("GET", "/fhir/Patient/gone") => MockResponse::status(410),
            ("DELETE", "/fhir/Patient/1") => MockResponse::status(204),
            _ => MockResponse::status(404),
        }
    })
    .await;

    let factory = NavigatorFactory::new(Arc::new(config_for(&backend, "primary"))).unwrap();
    let mut navigator = factory.navigator("primary").unwrap();

    assert!(navigator.get_resource::<Patient>("missing").await.unwrap().is_none());
    assert!(navigator.get_resource::<Patient>("gone").await.unwrap().is_none());
    navigator.delete_resource::<Patient>("1").await.unwrap();

    let err = navigator.delete_resource::<Patient>("2").await.unwrap_err();
    assert!(matches!(err, NavigatorError::NotFound { .. }));
}

#[tokio::test]
async fn test_update_and_transaction() {
    let backend = start_programmable_backend(|request| async move {
        match (request.method.as_str(), request.path()) {
            ("PUT", "/fhir/Patient/1") => {
                let mut body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
                body["meta"] = json!({"versionId": "2"});
                MockResponse::json(200, body)
            }
            ("POST", "/fhir") => MockResponse::json(
                200,
                json!({"resourceType": "Bundle", "type": "transaction-response", "entry": []}),
            ),
            _ => MockResponse::status(404),
        }
    })
    .await;

    let factory = NavigatorFactory::new(Arc::new(config_for(&backend, "primary"))).unwrap();
    let navigator = factory.navigator("primary").unwrap();

    let original = Patient::from_resource(Resource::from_value(patient("1")).unwrap()).unwrap();
    let updated = navigator.update_resource(&original, true).await.unwrap();
    assert_eq!(updated.version_id(), Some("2"));

    let put = &backend.received()[0];
    assert_eq!(put.header("if-match"), Some("W/\"1\""));
    assert_eq!(put.header("prefer"), Some("return=representation"));
    assert_eq!(put.header("content-type"), Some("application/fhir+json"));

    let response = navigator
        .submit_transaction(&Bundle::new(BundleType::Transaction))
        .await
        .unwrap();
    assert_eq!(response.bundle_type, BundleType::TransactionResponse);
}

#[tokio::test]
async fn test_oauth_token_refreshed_on_unauthorized() {
    let tokens = Arc::new(AtomicU32::new(0));
    let issued = tokens.clone();
    let backend = start_programmable_backend(move |request| {
        let issued = issued.clone();
        async move {
            if request.path() == "/token" {
                assert!(request.body.contains("grant_type=client_credentials"));
                assert!(request.body.contains("client_id=navigator"));
                let n = issued.fetch_add(1, Ordering::SeqCst) + 1;
                return MockResponse::json(
                    200,
                    json!({"access_token": format!("t{}", n), "token_type": "Bearer", "expires_in": 3600}),
                );
            }
            match request.header("authorization") {
                Some("Bearer t2") => MockResponse::json(200, patient("1")),
                _ => MockResponse::status(401),
            }
        }
    })
    .await;

    let mut config = config_for(&backend, "secure");
    let repo = &mut config.repositories[0];
    repo.use_oauth2 = true;
    repo.token_endpoint = format!("http://{}/token", backend.addr);
    repo.client_id = "navigator".into();
    repo.client_secret = "s3cret".into();
    repo.api_key = "k-1".into();

    let factory = NavigatorFactory::new(Arc::new(config)).unwrap();
    let mut navigator = factory.navigator("secure").unwrap();

    let found: Patient = navigator.get_resource("1").await.unwrap().unwrap();
    assert_eq!(found.id(), Some("1"));
    assert_eq!(tokens.load(Ordering::SeqCst), 2);
    assert_eq!(factory.token_store().get("secure").unwrap().value, "t2");

    let reads: Vec<_> = backend
        .received()
        .into_iter()
        .filter(|r| r.path() == "/fhir/Patient/1")
        .collect();
    assert_eq!(reads.len(), 2);
    assert_eq!(reads[0].header("authorization"), Some("Bearer t1"));
    assert_eq!(reads[1].header("authorization"), Some("Bearer t2"));
    assert_eq!(reads[1].header("x-api-key"), Some("k-1"));

    // A second navigator shares the stored token.
    let mut other = factory.navigator("secure").unwrap();
    let _: Patient = other.get_resource("1").await.unwrap().unwrap();
    assert_eq!(tokens.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_basic_auth_header() {
    let backend = start_programmable_backend(|request| async move {
        match request.header("authorization") {
            // "user:pass"
            Some("Basic dXNlcjpwYXNz") => MockResponse::json(200, patient("1")),
            _ => MockResponse::status(401),
        }
    })
    .await;

    let mut config = config_for(&backend, "basic");
    config.repositories[0].use_basic_auth = true;
    config.repositories[0].username = "user".into();
    config.repositories[0].password = "pass".into();

    let factory = NavigatorFactory::new(Arc::new(config)).unwrap();
    let mut navigator = factory.navigator("basic").unwrap();
    assert!(navigator.get_resource::<Patient>("1").await.unwrap().is_some());
}
