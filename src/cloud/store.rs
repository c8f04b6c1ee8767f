use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::notify_admin::NotifyAdminData;
use crate::error::{AppError, AppResult};

/// key: notify-admin-store -> persistence seam for stamped records
///
/// At most one record exists per (user, feature) until it is cleared.
#[async_trait]
pub trait NotifyAdminStore: Send + Sync {
    /// Stores the record unless the user already has one for the same feature,
    /// in which case `AppError::Forbidden` is returned and nothing changes.
    async fn insert_if_absent(&self, record: NotifyAdminData) -> AppResult<NotifyAdminData>;
    async fn find_by_user_and_feature(
        &self,
        user_id: &str,
        required_feature: &str,
    ) -> AppResult<Option<NotifyAdminData>>;
    async fn list(&self, trial: bool) -> AppResult<Vec<NotifyAdminData>>;
    /// Removes records of the given kind created strictly before `before_millis`.
    async fn delete_before(&self, trial: bool, before_millis: i64) -> AppResult<usize>;
    async fn system_value(&self, key: &str) -> AppResult<Option<i64>>;
    /// Writes `value` only if the current value still equals `expected`.
    async fn compare_and_set_system_value(
        &self,
        key: &str,
        expected: Option<i64>,
        value: i64,
    ) -> AppResult<bool>;
}

#[derive(Debug, Default)]
pub struct InMemoryNotifyAdminStore {
    records: DashMap<(String, String), NotifyAdminData>,
    system: DashMap<String, i64>,
}

impl InMemoryNotifyAdminStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotifyAdminStore for InMemoryNotifyAdminStore {
    async fn insert_if_absent(&self, record: NotifyAdminData) -> AppResult<NotifyAdminData> {
        if record.id.is_empty() {
            return Err(AppError::BadRequest(
                "notify admin record must be stamped before it is stored".into(),
            ));
        }
        let key = (record.user_id.clone(), record.required_feature.clone());
        match self.records.entry(key) {
            Entry::Occupied(_) => Err(AppError::Forbidden(format!(
                "already notified about `{}`",
                record.required_feature
            ))),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn find_by_user_and_feature(
        &self,
        user_id: &str,
        required_feature: &str,
    ) -> AppResult<Option<NotifyAdminData>> {
        let key = (user_id.to_string(), required_feature.to_string());
        Ok(self.records.get(&key).map(|entry| entry.value().clone()))
    }

    async fn list(&self, trial: bool) -> AppResult<Vec<NotifyAdminData>> {
        let mut records: Vec<NotifyAdminData> = self
            .records
            .iter()
            .filter(|entry| entry.trial == trial)
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| a.create_at.cmp(&b.create_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    async fn delete_before(&self, trial: bool, before_millis: i64) -> AppResult<usize> {
        let before = self.records.len();
        self.records
            .retain(|_, record| record.trial != trial || record.create_at >= before_millis);
        Ok(before - self.records.len())
    }

    async fn system_value(&self, key: &str) -> AppResult<Option<i64>> {
        Ok(self.system.get(key).map(|entry| *entry.value()))
    }

    async fn compare_and_set_system_value(
        &self,
        key: &str,
        expected: Option<i64>,
        value: i64,
    ) -> AppResult<bool> {
        match self.system.entry(key.to_string()) {
            Entry::Occupied(mut current) if expected == Some(*current.get()) => {
                current.insert(value);
                Ok(true)
            }
            Entry::Vacant(slot) if expected.is_none() => {
                slot.insert(value);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
