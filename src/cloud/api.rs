use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ingest::WebhookHandle;
use super::models::Subscription;
use super::notify_admin::{NotifyAdminData, NotifyAdminToUpgradeRequest};
use super::service::{DigestDispatch, NotifyAdminService};
use super::webhook::CwsWebhookPayload;
use crate::error::{AppError, AppResult};
use crate::extractor::AuthUser;

/// key: cloud-api -> rest endpoints
pub fn routes() -> Router {
    Router::new()
        .route("/api/cloud/notify-admin", post(notify_admin_to_upgrade))
        .route("/api/cloud/notify-admin/digest", post(dispatch_admin_digest))
        .route("/api/cloud/webhook", post(cws_webhook))
        .route(
            "/api/cloud/subscription/workspace-name",
            post(workspace_name),
        )
}

pub async fn notify_admin_to_upgrade(
    Extension(service): Extension<NotifyAdminService>,
    AuthUser { user_id, .. }: AuthUser,
    Json(request): Json<NotifyAdminToUpgradeRequest>,
) -> AppResult<Json<NotifyAdminData>> {
    let record = service.save_admin_notification(&user_id, &request).await?;
    Ok(Json(record))
}

#[derive(Debug, Default, Deserialize)]
pub struct DigestQuery {
    #[serde(default)]
    pub trial: bool,
}

/// System admins trigger the upgrade digest; it only goes out once per cool-off window.
pub async fn dispatch_admin_digest(
    Extension(service): Extension<NotifyAdminService>,
    user: AuthUser,
    Query(query): Query<DigestQuery>,
) -> AppResult<Json<DigestDispatch>> {
    user.require_system_admin()?;
    let dispatch = service.dispatch_digest(query.trial).await?;
    Ok(Json(dispatch))
}

pub async fn cws_webhook(
    Extension(webhooks): Extension<WebhookHandle>,
    Json(raw): Json<Value>,
) -> AppResult<StatusCode> {
    let payload = CwsWebhookPayload::from_value(raw)?;
    webhooks.dispatch(payload).await.map_err(|err| {
        tracing::error!(?err, "CWS webhook queue unavailable");
        AppError::Message(err.to_string())
    })?;
    Ok(StatusCode::OK)
}

#[derive(Debug, Serialize)]
pub struct WorkspaceNameResponse {
    pub workspace_name: String,
}

pub async fn workspace_name(Json(subscription): Json<Subscription>) -> Json<WorkspaceNameResponse> {
    Json(WorkspaceNameResponse {
        workspace_name: subscription.workspace_name().to_string(),
    })
}
