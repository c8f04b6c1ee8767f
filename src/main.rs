use std::net::SocketAddr;
use std::sync::Arc;

use axum::Extension;
use cloud_billing::cloud::{start_webhook_worker, InMemoryNotifyAdminStore, NotifyAdminService};
use cloud_billing::{api_routes, config};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    dotenvy::dotenv().ok();
    // Fail fast if the JWT secret is missing
    let _ = config::JWT_SECRET.as_str();

    let notify_admin = NotifyAdminService::with_system_providers(Arc::new(
        InMemoryNotifyAdminStore::new(),
    ));
    tracing::info!(
        cool_off_days = notify_admin.cool_off_days(),
        info_key = config::CLOUD_NOTIFY_ADMIN_INFO,
        "admin upgrade notifications enabled"
    );
    let webhooks = start_webhook_worker();

    let app = api_routes()
        .layer(Extension(notify_admin))
        .layer(Extension(webhooks));

    let addr: SocketAddr = format!("{}:{}", config::BIND_ADDRESS.as_str(), *config::BIND_PORT)
        .parse()
        .map_err(|error| Box::new(error) as Box<dyn std::error::Error>)?;
    tracing::info!(%addr, "Listening for incoming connections");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
