//! Module service — connectivity, descriptors and per-module key configs.
//!
//! Slot numbers and uuids arrive as raw path segments and are checked here
//! before they reach the registry.

use inksync_domain::device::{self, ModuleConfig, ModuleDescriptor, ModuleStatus};
use inksync_domain::error::{InkSyncError, NotFoundError};

use crate::ports::ModuleRegistry;

pub struct ModuleService<M> {
    registry: M,
}

impl<M: ModuleRegistry + Sync> ModuleService<M> {
    pub fn new(registry: M) -> Self {
        Self { registry }
    }

    /// # Errors
    ///
    /// Returns a storage error from the registry.
    pub async fn status(&self) -> Result<ModuleStatus, InkSyncError> {
        self.registry.status().await
    }

    /// Descriptor of the module in `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`InkSyncError::Validation`] for a slot other than `1`/`2` and
    /// [`InkSyncError::NotFound`] when the slot is empty.
    #[tracing::instrument(skip(self))]
    pub async fn descriptor(&self, slot: &str) -> Result<ModuleDescriptor, InkSyncError> {
        let slot = device::parse_slot(slot)?;
        self.registry.descriptor(slot).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Module",
                id: slot.to_string(),
            }
            .into()
        })
    }

    /// Key config of the module `uuid`, created with defaults on first read.
    ///
    /// # Errors
    ///
    /// Returns [`InkSyncError::Validation`] for an unsafe uuid, or a storage
    /// error from the registry.
    #[tracing::instrument(skip(self))]
    pub async fn config(&self, uuid: &str) -> Result<ModuleConfig, InkSyncError> {
        device::validate_module_uuid(uuid)?;
        self.registry.config(uuid).await
    }
}
