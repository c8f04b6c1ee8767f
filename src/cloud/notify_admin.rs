use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::providers::{Clock, IdProvider};

/// key: notify-admin-plans -> SKUs a user may ask an admin to buy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CloudSku {
    Starter,
    Professional,
    Enterprise,
}

impl CloudSku {
    pub const ALL: [CloudSku; 3] = [
        CloudSku::Starter,
        CloudSku::Professional,
        CloudSku::Enterprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CloudSku::Starter => "cloud-starter",
            CloudSku::Professional => "cloud-professional",
            CloudSku::Enterprise => "cloud-enterprise",
        }
    }

    pub fn from_sku(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sku| sku.as_str() == value)
    }
}

/// key: notify-admin-features -> paid features a non-admin typically pings an admin about
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PaidFeature {
    GuestAccounts,
    CustomUserGroups,
    CreateMultipleTeams,
    StartCall,
    PlaybooksRetrospective,
    UnlimitedMessages,
    UnlimitedFileStorage,
    UnlimitedIntegrations,
    UnlimitedBoardCards,
    AllProfessionalFeatures,
}

impl PaidFeature {
    pub const ALL: [PaidFeature; 10] = [
        PaidFeature::GuestAccounts,
        PaidFeature::CustomUserGroups,
        PaidFeature::CreateMultipleTeams,
        PaidFeature::StartCall,
        PaidFeature::PlaybooksRetrospective,
        PaidFeature::UnlimitedMessages,
        PaidFeature::UnlimitedFileStorage,
        PaidFeature::UnlimitedIntegrations,
        PaidFeature::UnlimitedBoardCards,
        PaidFeature::AllProfessionalFeatures,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaidFeature::GuestAccounts => "Guest Accounts",
            PaidFeature::CustomUserGroups => "Custom User groups",
            PaidFeature::CreateMultipleTeams => "Create Multiple Teams",
            PaidFeature::StartCall => "Start call",
            PaidFeature::PlaybooksRetrospective => "Playbooks Retrospective",
            PaidFeature::UnlimitedMessages => "Unlimited Messages",
            PaidFeature::UnlimitedFileStorage => "Unlimited File Storage",
            PaidFeature::UnlimitedIntegrations => "Unlimited Integrations",
            PaidFeature::UnlimitedBoardCards => "Unlimited Board cards",
            PaidFeature::AllProfessionalFeatures => "All Professional features",
        }
    }

    pub fn from_name(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|feature| feature.as_str() == value)
    }
}

/// Client supplied a value outside a closed set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid value `{value}` for field `{field}`")]
pub struct InvalidFieldValue {
    pub field: &'static str,
    pub value: String,
}

impl InvalidFieldValue {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

/// key: notify-admin-request -> body of the "notify my admin" action
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyAdminToUpgradeRequest {
    pub trial_notification: bool,
    pub required_plan: String,
    pub required_feature: String,
}

/// key: notify-admin-record -> validated, stamped request awaiting the admin digest
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyAdminData {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub create_at: i64,
    pub user_id: String,
    pub required_plan: String,
    pub required_feature: String,
    pub trial: bool,
}

impl NotifyAdminData {
    /// Unstamped record; run `validate` then `pre_save` before storing it.
    pub fn from_request(user_id: impl Into<String>, request: &NotifyAdminToUpgradeRequest) -> Self {
        Self {
            user_id: user_id.into(),
            required_plan: request.required_plan.clone(),
            required_feature: request.required_feature.clone(),
            trial: request.trial_notification,
            ..Default::default()
        }
    }

    /// Plan is checked before feature; the first bad value is reported.
    pub fn validate(&self) -> Result<(), InvalidFieldValue> {
        if self.plan().is_none() {
            return Err(InvalidFieldValue::new(
                "required_plan",
                self.required_plan.as_str(),
            ));
        }
        if self.feature().is_none() {
            return Err(InvalidFieldValue::new(
                "required_feature",
                self.required_feature.as_str(),
            ));
        }
        Ok(())
    }

    /// Assigns an id when missing and always refreshes `create_at`.
    pub fn pre_save<I, C>(&mut self, ids: &I, clock: &C)
    where
        I: IdProvider + ?Sized,
        C: Clock + ?Sized,
    {
        if self.id.is_empty() {
            self.id = ids.new_id();
        }
        self.create_at = clock.now_millis();
    }

    pub fn plan(&self) -> Option<CloudSku> {
        CloudSku::from_sku(&self.required_plan)
    }

    pub fn feature(&self) -> Option<PaidFeature> {
        PaidFeature::from_name(&self.required_feature)
    }
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}
