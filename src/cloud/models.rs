use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// key: cloud-product-family
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SubscriptionFamily {
    #[default]
    #[serde(rename = "cloud")]
    Cloud,
    #[serde(rename = "on-prem")]
    OnPrem,
}

impl SubscriptionFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionFamily::Cloud => "cloud",
            SubscriptionFamily::OnPrem => "on-prem",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecurringInterval {
    #[default]
    Month,
    Year,
}

impl RecurringInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurringInterval::Month => "month",
            RecurringInterval::Year => "year",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BillingScheme {
    #[default]
    PerSeat,
    FlatFee,
    SalesServe,
}

impl BillingScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingScheme::PerSeat => "per_seat",
            BillingScheme::FlatFee => "flat_fee",
            BillingScheme::SalesServe => "sales_serve",
        }
    }
}

/// key: cloud-product-model -> catalog entry served by CWS
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price_per_seat: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub add_ons: Vec<AddOn>,
    pub sku: String,
    pub price_id: String,
    #[serde(rename = "product_family")]
    pub family: SubscriptionFamily,
    pub recurring_interval: RecurringInterval,
    pub billing_scheme: BillingScheme,
}

/// Trimmed product view handed to non-admin users.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserFacingProduct {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub price_per_seat: f64,
}

impl From<&Product> for UserFacingProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            sku: product.sku.clone(),
            price_per_seat: product.price_per_seat,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddOn {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub price_per_seat: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripeSetupIntent {
    pub id: String,
    pub client_secret: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmPaymentMethodRequest {
    pub stripe_setup_intent_id: String,
    pub subscription_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartCloudTrialRequest {
    pub email: String,
    pub subscription_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateBusinessEmailRequest {
    pub email: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateBusinessEmailResponse {
    pub is_valid: bool,
}

/// key: cloud-customer-model -> signup record, billing info updates
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudCustomer {
    #[serde(flatten)]
    pub info: CloudCustomerInfo,
    pub id: String,
    pub creator_id: String,
    pub create_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
}

/// Editable portion of a customer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudCustomerInfo {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub contact_first_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub contact_last_name: String,
    pub num_employees: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub city: String,
    pub country: String,
    pub line1: String,
    pub line2: String,
    pub postal_code: String,
    pub state: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentMethod {
    #[serde(rename = "type")]
    pub kind: String,
    pub last_four: String,
    pub exp_month: i32,
    pub exp_year: i32,
    pub card_brand: String,
    pub name: String,
}

/// key: cloud-subscription-model -> workspace subscription mirrored from CWS
///
/// `status` and the trial fields are rewritten by provider webhooks; cancellation
/// end-dates the record rather than removing it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subscription {
    pub id: String,
    pub customer_id: String,
    pub product_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub add_ons: Vec<String>,
    pub start_at: i64,
    pub end_at: i64,
    pub create_at: i64,
    pub seats: i32,
    pub status: String,
    pub dns: String,
    #[serde(with = "string_flag")]
    pub is_paid_tier: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_invoice: Option<Invoice>,
    #[serde(with = "string_flag")]
    pub is_free_trial: bool,
    pub trial_end_at: i64,
}

impl Subscription {
    /// First DNS label, e.g. `test` for `test.mattermost.cloud.com`.
    pub fn workspace_name(&self) -> &str {
        self.dns.split('.').next().unwrap_or_default()
    }
}

/// key: cloud-invoice-model -> billing period snapshot
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Invoice {
    pub id: String,
    pub number: String,
    pub create_at: i64,
    pub total: i64,
    pub tax: i64,
    pub status: String,
    pub description: String,
    pub period_start: i64,
    pub period_end: i64,
    pub subscription_id: String,
    #[serde(rename = "line_items", deserialize_with = "null_as_default")]
    pub items: Vec<InvoiceLineItem>,
    pub current_product_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceLineItem {
    pub price_id: String,
    pub total: i64,
    pub quantity: f64,
    pub price_per_unit: i64,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub metadata: HashMap<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionChange {
    pub product_id: String,
}

// CWS sends `null` for empty collections.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Boolean carried as `"true"`/`"false"` on the wire. Text is matched
/// case-insensitively; blank or unrecognised text reads as `false`.
mod string_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Bool(bool),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "true" } else { "false" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match Option::<RawFlag>::deserialize(deserializer)? {
            None => false,
            Some(RawFlag::Bool(value)) => value,
            Some(RawFlag::Text(text)) => parse_text(&text),
        })
    }

    pub(super) fn parse_text(text: &str) -> bool {
        let text = text.trim();
        if text.eq_ignore_ascii_case("true") {
            true
        } else {
            if !text.is_empty() && !text.eq_ignore_ascii_case("false") {
                tracing::warn!(flag = text, "unrecognised subscription flag, reading as false");
            }
            false
        }
    }
}
