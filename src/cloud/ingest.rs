use anyhow::{anyhow, Result};
use tokio::sync::mpsc::{channel, Sender};
use tracing::{info, warn};

use super::webhook::CwsWebhookPayload;

const WEBHOOK_QUEUE_DEPTH: usize = 64;

/// key: cws-webhook-handle -> enqueue interface
#[derive(Clone)]
pub struct WebhookHandle {
    sender: Sender<CwsWebhookPayload>,
}

impl WebhookHandle {
    pub async fn dispatch(&self, payload: CwsWebhookPayload) -> Result<()> {
        self.sender
            .send(payload)
            .await
            .map_err(|err| anyhow!("failed to enqueue CWS webhook: {err}"))
    }
}

/// key: cws-webhook-worker -> drains ingested payloads
pub fn start_webhook_worker() -> WebhookHandle {
    let (tx, mut rx) = channel(WEBHOOK_QUEUE_DEPTH);
    tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            record_payload(&payload);
        }
    });

    WebhookHandle { sender: tx }
}

fn record_payload(payload: &CwsWebhookPayload) {
    let event = payload.event().as_str();
    let workspace = payload
        .subscription()
        .map(|subscription| subscription.workspace_name())
        .unwrap_or_default();

    match payload {
        CwsWebhookPayload::FailedPayment { failed_payment } => warn!(
            event,
            card_brand = failed_payment.card_brand.as_str(),
            last_four = failed_payment.last_four.as_str(),
            reason = failed_payment.failure_message.as_str(),
            "payment failed"
        ),
        CwsWebhookPayload::FailedPaymentNoCard {} => {
            warn!(event, "payment failed with no card on file")
        }
        CwsWebhookPayload::SendAdminWelcomeEmail {
            cloud_workspace_owner,
        } => info!(
            event,
            owner = cloud_workspace_owner.user_name.as_str(),
            "workspace owner welcome requested"
        ),
        CwsWebhookPayload::SendUpgradeConfirmationEmail {
            cloud_workspace_owner,
            trial_end_at,
            ..
        } => info!(
            event,
            workspace,
            owner = cloud_workspace_owner
                .as_ref()
                .map(|owner| owner.user_name.as_str())
                .unwrap_or_default(),
            trial_end_at = *trial_end_at,
            "upgrade confirmation requested"
        ),
        CwsWebhookPayload::SubscriptionChanged { .. } => {
            let limits = payload
                .product_limits()
                .map(|limits| limits.sections().join(","))
                .unwrap_or_default();
            info!(event, workspace, limits = limits.as_str(), "subscription changed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::models::Subscription;

    #[tokio::test]
    async fn dispatch_accepts_payloads_while_worker_runs() {
        let handle = start_webhook_worker();
        let payload = CwsWebhookPayload::SubscriptionChanged {
            subscription: Some(Subscription {
                dns: "acme.cloud.example.com".into(),
                ..Default::default()
            }),
            product_limits: None,
        };
        handle.dispatch(payload).await.unwrap();
        handle
            .dispatch(CwsWebhookPayload::FailedPaymentNoCard {})
            .await
            .unwrap();
    }
}
