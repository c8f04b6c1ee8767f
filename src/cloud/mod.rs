//! Hosted cloud billing records, CWS webhook ingestion and admin upgrade prompts.

pub mod api;
pub mod ingest;
pub mod limits;
pub mod models;
pub mod notify_admin;
pub mod providers;
pub mod service;
pub mod store;
pub mod webhook;

pub use ingest::{start_webhook_worker, WebhookHandle};
pub use limits::{
    BoardsLimits, FilesLimits, IntegrationsLimits, MessagesLimits, ProductLimits, TeamsLimits,
};
pub use models::{
    AddOn, Address, BillingScheme, CloudCustomer, CloudCustomerInfo, ConfirmPaymentMethodRequest,
    Invoice, InvoiceLineItem, PaymentMethod, Product, RecurringInterval, StartCloudTrialRequest,
    StripeSetupIntent, Subscription, SubscriptionChange, SubscriptionFamily, UserFacingProduct,
    ValidateBusinessEmailRequest, ValidateBusinessEmailResponse,
};
pub use notify_admin::{
    CloudSku, InvalidFieldValue, NotifyAdminData, NotifyAdminToUpgradeRequest, PaidFeature,
};
pub use providers::{Clock, IdProvider, SystemClock, UuidIdProvider};
pub use service::{DigestDispatch, FeatureDigest, NotifyAdminService};
pub use store::{InMemoryNotifyAdminStore, NotifyAdminStore};
pub use webhook::{
    CloudWorkspaceOwner, CwsWebhookPayload, FailedPayment, WebhookEvent, WebhookPayloadError,
};
