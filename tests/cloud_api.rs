use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::{Extension, Router};
use cloud_billing::api_routes;
use cloud_billing::cloud::{
    start_webhook_worker, InMemoryNotifyAdminStore, NotifyAdminService, NotifyAdminStore,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

const SECRET: &str = "cloud-billing-test-secret";

fn app() -> (Router, Arc<InMemoryNotifyAdminStore>) {
    std::env::set_var("JWT_SECRET", SECRET);
    let store = Arc::new(InMemoryNotifyAdminStore::new());
    let service = NotifyAdminService::with_system_providers(store.clone());
    let router = api_routes()
        .layer(Extension(service))
        .layer(Extension(start_webhook_worker()));
    (router, store)
}

fn token(user_id: &str) -> String {
    token_with_role(user_id, "system_user")
}

fn token_with_role(user_id: &str, role: &str) -> String {
    let claims = json!({ "sub": user_id, "role": role, "exp": 9999999999u64 });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn post_json(uri: &str, body: Value, user_id: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(user_id) = user_id {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(user_id)));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn post_as_admin(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::AUTHORIZATION,
            format!("Bearer {}", token_with_role("admin-1", "system_admin")),
        )
        .body(Body::empty())
        .unwrap()
}

async fn stored(store: &InMemoryNotifyAdminStore) -> usize {
    store.list(false).await.unwrap().len() + store.list(true).await.unwrap().len()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn root_responds_ok() {
    let (app, _) = app();
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
    assert_eq!(body, "Cloud Billing API".as_bytes());
}

#[tokio::test]
async fn notify_admin_requires_session() {
    let (app, store) = app();
    let response = app
        .oneshot(post_json(
            "/api/cloud/notify-admin",
            json!({ "required_plan": "cloud-professional", "required_feature": "Start call" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(stored(&store).await, 0);
}

#[tokio::test]
async fn notify_admin_returns_stamped_record() {
    let (app, store) = app();
    let response = app
        .oneshot(post_json(
            "/api/cloud/notify-admin",
            json!({
                "trial_notification": false,
                "required_plan": "cloud-professional",
                "required_feature": "Unlimited Messages",
            }),
            Some("user-42"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(!body["id"].as_str().unwrap_or_default().is_empty());
    assert!(body["create_at"].as_i64().unwrap_or_default() > 0);
    assert_eq!(body["user_id"], json!("user-42"));
    assert_eq!(body["trial"], json!(false));
    assert_eq!(stored(&store).await, 1);
}

#[tokio::test]
async fn notify_admin_rejects_unknown_plan() {
    let (app, store) = app();
    let response = app
        .oneshot(post_json(
            "/api/cloud/notify-admin",
            json!({ "required_plan": "cloud-gold", "required_feature": "Start call" }),
            Some("user-42"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let message = String::from_utf8(body.to_vec()).unwrap();
    assert!(message.contains("required_plan"));
    assert!(message.contains("cloud-gold"));
    assert_eq!(stored(&store).await, 0);
}

#[tokio::test]
async fn notify_admin_twice_for_same_feature_is_forbidden() {
    let (app, store) = app();
    let request = json!({
        "required_plan": "cloud-enterprise",
        "required_feature": "Guest Accounts",
    });
    let first = app
        .clone()
        .oneshot(post_json(
            "/api/cloud/notify-admin",
            request.clone(),
            Some("user-42"),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(post_json("/api/cloud/notify-admin", request, Some("user-42")))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::FORBIDDEN);
    assert_eq!(stored(&store).await, 1);
}

#[tokio::test]
async fn webhook_statuses_follow_payload_shape() {
    let (app, _) = app();
    let accepted = app
        .clone()
        .oneshot(post_json(
            "/api/cloud/webhook",
            json!({
                "event": "failed-payment",
                "failed_payment": { "card_brand": "visa", "last_four": "4242", "failure_message": "declined" },
                "subscription": null,
            }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(accepted.status(), StatusCode::OK);

    let unknown = app
        .clone()
        .oneshot(post_json(
            "/api/cloud/webhook",
            json!({ "event": "invoice-paid" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_IMPLEMENTED);

    let malformed = app
        .oneshot(post_json(
            "/api/cloud/webhook",
            json!({ "event": "send-admin-welcome-email" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn webhook_accepts_capitalised_subscription_flags() {
    let (app, _) = app();
    let response = app
        .oneshot(post_json(
            "/api/cloud/webhook",
            json!({
                "event": "subscription-changed",
                "subscription": {
                    "id": "sub_1",
                    "is_paid_tier": "True",
                    "is_free_trial": "unknown",
                },
            }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn digest_route_is_limited_to_system_admins() {
    let (app, store) = app();
    app.clone()
        .oneshot(post_json(
            "/api/cloud/notify-admin",
            json!({ "required_plan": "cloud-professional", "required_feature": "Start call" }),
            Some("user-7"),
        ))
        .await
        .unwrap();

    let refused = app
        .clone()
        .oneshot(post_json("/api/cloud/notify-admin/digest", json!({}), Some("user-7")))
        .await
        .unwrap();
    assert_eq!(refused.status(), StatusCode::FORBIDDEN);
    assert_eq!(stored(&store).await, 1);

    // key: digest -> admin receives grouped requesters once per window
    let first = app
        .clone()
        .oneshot(post_as_admin("/api/cloud/notify-admin/digest"))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let body = body_json(first).await;
    assert_eq!(body["dispatched"], json!(true));
    assert_eq!(body["entries"][0]["required_feature"], json!("Start call"));
    assert_eq!(body["entries"][0]["user_ids"], json!(["user-7"]));
    assert_eq!(stored(&store).await, 0);

    let again = app
        .oneshot(post_as_admin("/api/cloud/notify-admin/digest"))
        .await
        .unwrap();
    let body = body_json(again).await;
    assert_eq!(body["dispatched"], json!(false));
    assert!(body["entries"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn workspace_name_is_derived_from_dns() {
    let (app, _) = app();
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/cloud/subscription/workspace-name",
            json!({ "id": "sub_1", "dns": "test.mattermost.cloud.com" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "workspace_name": "test" })
    );

    let response = app
        .oneshot(post_json(
            "/api/cloud/subscription/workspace-name",
            json!({ "dns": "" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!({ "workspace_name": "" }));
}
