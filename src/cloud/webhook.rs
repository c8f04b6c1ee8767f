use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::limits::ProductLimits;
use super::models::Subscription;

/// key: cws-webhook-events -> event tags emitted by CWS
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WebhookEvent {
    FailedPayment,
    FailedPaymentNoCard,
    SendAdminWelcomeEmail,
    SendUpgradeConfirmationEmail,
    SubscriptionChanged,
}

impl WebhookEvent {
    pub const ALL: [WebhookEvent; 5] = [
        WebhookEvent::FailedPayment,
        WebhookEvent::FailedPaymentNoCard,
        WebhookEvent::SendAdminWelcomeEmail,
        WebhookEvent::SendUpgradeConfirmationEmail,
        WebhookEvent::SubscriptionChanged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookEvent::FailedPayment => "failed-payment",
            WebhookEvent::FailedPaymentNoCard => "failed-payment-no-card",
            WebhookEvent::SendAdminWelcomeEmail => "send-admin-welcome-email",
            WebhookEvent::SendUpgradeConfirmationEmail => "send-upgrade-confirmation-email",
            WebhookEvent::SubscriptionChanged => "subscription-changed",
        }
    }

    pub fn from_tag(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.as_str() == value)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailedPayment {
    pub card_brand: String,
    pub last_four: String,
    pub failure_message: String,
}

/// User that created the workspace from CWS.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudWorkspaceOwner {
    #[serde(rename = "username")]
    pub user_name: String,
}

/// key: cws-webhook-payload -> one variant per event, carrying only its own data
///
/// Keys that do not belong to the event are ignored when decoding and never
/// written when encoding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum CwsWebhookPayload {
    #[serde(rename = "failed-payment")]
    FailedPayment { failed_payment: FailedPayment },
    #[serde(rename = "failed-payment-no-card")]
    FailedPaymentNoCard {},
    #[serde(rename = "send-admin-welcome-email")]
    SendAdminWelcomeEmail {
        cloud_workspace_owner: CloudWorkspaceOwner,
    },
    #[serde(rename = "send-upgrade-confirmation-email")]
    SendUpgradeConfirmationEmail {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cloud_workspace_owner: Option<CloudWorkspaceOwner>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subscription: Option<Subscription>,
        #[serde(
            rename = "trial_end_time_stamp",
            default,
            skip_serializing_if = "is_zero"
        )]
        trial_end_at: i64,
    },
    #[serde(rename = "subscription-changed")]
    SubscriptionChanged {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subscription: Option<Subscription>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        product_limits: Option<ProductLimits>,
    },
}

#[derive(Debug, Error)]
pub enum WebhookPayloadError {
    #[error("unknown webhook event `{0}`")]
    UnknownEvent(String),
    #[error("malformed `{event}` payload: {source}")]
    Malformed {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl CwsWebhookPayload {
    /// Decodes a raw body, telling an unsupported event apart from a bad body.
    pub fn from_value(value: Value) -> Result<Self, WebhookPayloadError> {
        let tag = value
            .get("event")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let event = WebhookEvent::from_tag(tag)
            .ok_or_else(|| WebhookPayloadError::UnknownEvent(tag.to_string()))?;
        serde_json::from_value(value).map_err(|source| WebhookPayloadError::Malformed {
            event: event.as_str(),
            source,
        })
    }

    pub fn event(&self) -> WebhookEvent {
        match self {
            CwsWebhookPayload::FailedPayment { .. } => WebhookEvent::FailedPayment,
            CwsWebhookPayload::FailedPaymentNoCard {} => WebhookEvent::FailedPaymentNoCard,
            CwsWebhookPayload::SendAdminWelcomeEmail { .. } => WebhookEvent::SendAdminWelcomeEmail,
            CwsWebhookPayload::SendUpgradeConfirmationEmail { .. } => {
                WebhookEvent::SendUpgradeConfirmationEmail
            }
            CwsWebhookPayload::SubscriptionChanged { .. } => WebhookEvent::SubscriptionChanged,
        }
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        match self {
            CwsWebhookPayload::SendUpgradeConfirmationEmail { subscription, .. }
            | CwsWebhookPayload::SubscriptionChanged { subscription, .. } => subscription.as_ref(),
            _ => None,
        }
    }

    pub fn product_limits(&self) -> Option<&ProductLimits> {
        match self {
            CwsWebhookPayload::SubscriptionChanged { product_limits, .. } => {
                product_limits.as_ref()
            }
            _ => None,
        }
    }
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_event_tag_resolves() {
        for event in WebhookEvent::ALL {
            assert_eq!(WebhookEvent::from_tag(event.as_str()), Some(event));
        }
        assert_eq!(WebhookEvent::from_tag("invoice-paid"), None);
    }

    #[test]
    fn provider_nulls_for_other_events_are_ignored() {
        let payload = CwsWebhookPayload::from_value(json!({
            "event": "failed-payment-no-card",
            "failed_payment": null,
            "cloud_workspace_owner": null,
            "product_limits": null,
            "subscription": null,
            "trial_end_time_stamp": 0,
        }))
        .unwrap();
        assert_eq!(payload, CwsWebhookPayload::FailedPaymentNoCard {});
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "event": "failed-payment-no-card" })
        );
    }

    #[test]
    fn required_section_must_be_present() {
        let err = CwsWebhookPayload::from_value(json!({
            "event": "send-admin-welcome-email",
            "cloud_workspace_owner": null,
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            WebhookPayloadError::Malformed {
                event: "send-admin-welcome-email",
                ..
            }
        ));
    }

    #[test]
    fn missing_event_is_unknown() {
        let err = CwsWebhookPayload::from_value(json!({ "failed_payment": {} })).unwrap_err();
        assert!(matches!(err, WebhookPayloadError::UnknownEvent(tag) if tag.is_empty()));
    }
}
