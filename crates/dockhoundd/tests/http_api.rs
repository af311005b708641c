//! Integration test for the HTTP façade, driven directly against the
//! `axum::Router` without binding a real socket.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use dockhound_core::{Host, HostStore};
use dockhoundd::api;

#[tokio::test]
async fn list_hosts_returns_global_unicast_records_only() {
    let store = HostStore::spawn();
    let mut sub = store.subscribe().await.unwrap();

    store
        .add_host(Host {
            id: "h1".to_owned(),
            address: std::net::Ipv4Addr::new(10, 0, 0, 5),
            name: "redis.docker".to_owned(),
            aliases: vec!["cache.docker".to_owned()],
        })
        .await
        .unwrap();
    // Loopback: filtered out of the public view.
    store
        .add_host(Host {
            id: "h2".to_owned(),
            address: std::net::Ipv4Addr::new(127, 0, 0, 1),
            name: "local.docker".to_owned(),
            aliases: Vec::new(),
        })
        .await
        .unwrap();
    sub.on_add.recv().await.unwrap();
    sub.on_add.recv().await.unwrap();

    let app = api::router(store);
    let response = app
        .oneshot(Request::builder().uri("/api/v0/hosts").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let hosts = parsed.as_object().unwrap();

    assert_eq!(hosts.len(), 1);
    assert_eq!(hosts["h1"]["name"], "redis.docker");
    assert_eq!(hosts["h1"]["aliases"][0], "cache.docker");
}
