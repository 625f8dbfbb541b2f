use axum::{
    body::Body,
    extract::FromRef,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use crate::{auth::JwtKeys, state::AppState};

/// Sends one request through the router; non-JSON bodies come back as `Value::Null`.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Registers `email` (name "Test") and returns a bearer token for it.
pub async fn obtain_token(app: &Router, email: &str, password: &str) -> String {
    let (status, _) = send(
        app,
        Method::POST,
        "/users/create",
        None,
        Some(json!({ "email": email, "password": password, "name": "Test" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, res) = send(
        app,
        Method::POST,
        "/users/token",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    res["token"].as_str().unwrap().to_string()
}

/// A validly signed token for `user_id`, whether or not that user exists.
pub fn token_for(user_id: Uuid) -> String {
    JwtKeys::from_ref(&AppState::fake()).sign(user_id).unwrap()
}
