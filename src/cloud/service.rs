use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use tracing::{debug, info};

use super::notify_admin::{NotifyAdminData, NotifyAdminToUpgradeRequest};
use super::providers::{Clock, IdProvider, SystemClock, UuidIdProvider};
use super::store::NotifyAdminStore;
use crate::config;
use crate::error::{AppError, AppResult};

/// key: notify-admin-digest -> requesters grouped per plan/feature
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FeatureDigest {
    pub required_plan: String,
    pub required_feature: String,
    pub trial: bool,
    pub user_ids: Vec<String>,
}

/// Outcome of one attempt to send the admin digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DigestDispatch {
    pub dispatched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sent_at: Option<i64>,
    pub entries: Vec<FeatureDigest>,
}

/// key: notify-admin-service -> validate, stamp and store upgrade requests
#[derive(Clone)]
pub struct NotifyAdminService {
    store: Arc<dyn NotifyAdminStore>,
    ids: Arc<dyn IdProvider>,
    clock: Arc<dyn Clock>,
    cool_off_days: i64,
}

impl NotifyAdminService {
    pub fn new(
        store: Arc<dyn NotifyAdminStore>,
        ids: Arc<dyn IdProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            ids,
            clock,
            cool_off_days: *config::CLOUD_NOTIFY_ADMIN_COOL_OFF_DAYS,
        }
    }

    pub fn with_system_providers(store: Arc<dyn NotifyAdminStore>) -> Self {
        Self::new(store, Arc::new(UuidIdProvider), Arc::new(SystemClock))
    }

    pub fn with_cool_off_days(mut self, days: i64) -> Self {
        self.cool_off_days = days.clamp(0, config::MAX_CLOUD_NOTIFY_ADMIN_COOL_OFF_DAYS);
        self
    }

    pub fn cool_off_days(&self) -> i64 {
        self.cool_off_days
    }

    pub async fn save_admin_notification(
        &self,
        user_id: &str,
        request: &NotifyAdminToUpgradeRequest,
    ) -> AppResult<NotifyAdminData> {
        let mut record = NotifyAdminData::from_request(user_id, request);
        record.validate()?;
        record.pre_save(&*self.ids, &*self.clock);

        let stored = self.store.insert_if_absent(record).await.map_err(|err| {
            if matches!(err, AppError::Forbidden(_)) {
                debug!(
                    user_id,
                    feature = request.required_feature.as_str(),
                    "admin already notified for feature"
                );
            }
            err
        })?;
        info!(
            id = stored.id.as_str(),
            user_id,
            plan = stored.required_plan.as_str(),
            feature = stored.required_feature.as_str(),
            trial = stored.trial,
            "admin upgrade notification recorded"
        );
        Ok(stored)
    }

    pub async fn already_notified(&self, user_id: &str, required_feature: &str) -> AppResult<bool> {
        let existing = self
            .store
            .find_by_user_and_feature(user_id, required_feature)
            .await?;
        Ok(existing.is_some())
    }

    pub async fn pending(&self, trial: bool) -> AppResult<Vec<NotifyAdminData>> {
        self.store.list(trial).await
    }

    /// Pending records grouped by plan then feature, requesters in arrival order.
    pub async fn digest(&self, trial: bool) -> AppResult<Vec<FeatureDigest>> {
        let records = self.store.list(trial).await?;
        Ok(group_digest(records, trial))
    }

    /// Whether the admin digest may go out again, given when the last one was sent.
    pub fn dispatch_due(&self, last_sent_at: Option<i64>, now_millis: i64) -> bool {
        let Some(sent_at) = last_sent_at else {
            return true;
        };
        match Duration::try_days(self.cool_off_days) {
            Some(window) => now_millis.saturating_sub(sent_at) >= window.num_milliseconds(),
            None => false,
        }
    }

    /// Sends the digest when the cool-off allows it: claims the send slot,
    /// collects records stamped up to now and clears them.
    pub async fn dispatch_digest(&self, trial: bool) -> AppResult<DigestDispatch> {
        let key = digest_info_key(trial);
        let now = self.clock.now_millis();
        let last_sent_at = self.store.system_value(&key).await?;

        if !self.dispatch_due(last_sent_at, now) {
            debug!(trial, ?last_sent_at, "admin digest still cooling off");
            return Ok(DigestDispatch {
                dispatched: false,
                last_sent_at,
                entries: Vec::new(),
            });
        }
        if !self
            .store
            .compare_and_set_system_value(&key, last_sent_at, now)
            .await?
        {
            debug!(trial, "admin digest claimed by a concurrent dispatch");
            return Ok(DigestDispatch {
                dispatched: false,
                last_sent_at: self.store.system_value(&key).await?,
                entries: Vec::new(),
            });
        }

        let cutoff = now.saturating_add(1);
        let records: Vec<NotifyAdminData> = self
            .store
            .list(trial)
            .await?
            .into_iter()
            .filter(|record| record.create_at < cutoff)
            .collect();
        let entries = group_digest(records, trial);
        self.clear_before(trial, cutoff).await?;
        info!(trial, groups = entries.len(), "admin upgrade digest dispatched");

        Ok(DigestDispatch {
            dispatched: true,
            last_sent_at: Some(now),
            entries,
        })
    }

    pub async fn clear_before(&self, trial: bool, before_millis: i64) -> AppResult<usize> {
        let removed = self.store.delete_before(trial, before_millis).await?;
        if removed > 0 {
            info!(removed, trial, before_millis, "cleared delivered admin notifications");
        }
        Ok(removed)
    }
}

fn digest_info_key(trial: bool) -> String {
    if trial {
        format!("{}_trial", config::CLOUD_NOTIFY_ADMIN_INFO)
    } else {
        config::CLOUD_NOTIFY_ADMIN_INFO.to_string()
    }
}

fn group_digest(records: Vec<NotifyAdminData>, trial: bool) -> Vec<FeatureDigest> {
    let mut grouped: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
    for record in records {
        let user_ids = grouped
            .entry((record.required_plan, record.required_feature))
            .or_default();
        if !user_ids.contains(&record.user_id) {
            user_ids.push(record.user_id);
        }
    }
    grouped
        .into_iter()
        .map(|((required_plan, required_feature), user_ids)| FeatureDigest {
            required_plan,
            required_feature,
            trial,
            user_ids,
        })
        .collect()
}
