//! Automation store port — persistence for the automation snapshot.

use std::future::Future;

use inksync_domain::automation::Automation;
use inksync_domain::error::InkSyncError;

/// Stores the full, ordered list of automations.
///
/// The editor always saves the whole list, so the store replaces the
/// snapshot atomically instead of offering per-automation writes.
pub trait AutomationStore {
    /// Load every automation, in saved order.
    fn load_all(&self) -> impl Future<Output = Result<Vec<Automation>, InkSyncError>> + Send;

    /// Replace the stored snapshot with `automations`.
    fn save_all(
        &self,
        automations: Vec<Automation>,
    ) -> impl Future<Output = Result<(), InkSyncError>> + Send;
}

impl<T: AutomationStore + Send + Sync> AutomationStore for std::sync::Arc<T> {
    fn load_all(&self) -> impl Future<Output = Result<Vec<Automation>, InkSyncError>> + Send {
        (**self).load_all()
    }

    fn save_all(
        &self,
        automations: Vec<Automation>,
    ) -> impl Future<Output = Result<(), InkSyncError>> + Send {
        (**self).save_all(automations)
    }
}
