//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use tokio::net::TcpListener;
use uuid::Uuid;

use catalog_gateway::auth::password::hash_password;
use catalog_gateway::config::{GatewayConfig, RoleConfig, UserConfig};
use catalog_gateway::http::HttpServer;
use catalog_gateway::lifecycle::Shutdown;

pub const SIGNING_KEY: &str = "integration-test-signing-key-0123456789";
pub const PASSWORD: &str = "correct horse battery staple";
pub const ALICE: &str = "alice@example.com";
pub const BOB: &str = "bob@example.com";
pub const ORPHAN: &str = "orphan@example.com";

fn password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(PASSWORD).expect("hash test password"))
        .clone()
}

fn user(email: &str, user_name: &str, role_id: &str) -> UserConfig {
    UserConfig {
        id: Uuid::new_v4(),
        email: email.to_string(),
        user_name: user_name.to_string(),
        name: user_name.to_uppercase(),
        surname: "Tester".to_string(),
        password_hash: password_hash(),
        role_id: role_id.to_string(),
        is_deleted: false,
    }
}

/// Config with a valid key, two roles and three users.
///
/// `alice` is an Admin, `bob` a Customer, and `orphan` references a role
/// that does not exist.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.jwt.key = SIGNING_KEY.to_string();
    config.directory.roles = vec![
        RoleConfig {
            id: "role-admin".into(),
            name: "Admin".into(),
            is_deleted: false,
        },
        RoleConfig {
            id: "role-customer".into(),
            name: "Customer".into(),
            is_deleted: false,
        },
    ];
    config.directory.users = vec![
        user(ALICE, "alice", "role-admin"),
        user(BOB, "bob", "role-customer"),
        user(ORPHAN, "orphan", "role-missing"),
    ];
    config
}

/// Start the gateway on an ephemeral port.
///
/// The returned [`Shutdown`] stops the server when triggered or dropped.
pub async fn spawn_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).expect("valid test config");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

pub fn get(path: &str, host: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path).header("host", host);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn login_request(email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/user/login")
        .header("host", "gateway.test")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({ "email": email, "password": password }).to_string(),
        ))
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
