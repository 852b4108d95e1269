//! Module registry port — what the device reports about its attached modules.

use std::future::Future;

use inksync_domain::device::{ModuleConfig, ModuleDescriptor, ModuleStatus};
use inksync_domain::error::InkSyncError;

pub trait ModuleRegistry {
    /// Which slots currently hold a module.
    fn status(&self) -> impl Future<Output = Result<ModuleStatus, InkSyncError>> + Send;

    /// Descriptor of the module in `slot`, if one is attached.
    fn descriptor(
        &self,
        slot: u8,
    ) -> impl Future<Output = Result<Option<ModuleDescriptor>, InkSyncError>> + Send;

    /// Key configuration of the module `uuid`, created with defaults on
    /// first read. `uuid` has already been checked to be filename-safe.
    fn config(&self, uuid: &str) -> impl Future<Output = Result<ModuleConfig, InkSyncError>> + Send;
}

impl<T: ModuleRegistry + Send + Sync> ModuleRegistry for std::sync::Arc<T> {
    fn status(&self) -> impl Future<Output = Result<ModuleStatus, InkSyncError>> + Send {
        (**self).status()
    }

    fn descriptor(
        &self,
        slot: u8,
    ) -> impl Future<Output = Result<Option<ModuleDescriptor>, InkSyncError>> + Send {
        (**self).descriptor(slot)
    }

    fn config(&self, uuid: &str) -> impl Future<Output = Result<ModuleConfig, InkSyncError>> + Send {
        (**self).config(uuid)
    }
}
