//! Automation service — use-cases for managing the automation snapshot.
//!
//! Automations are always persisted as a full, ordered snapshot. The
//! single-item operations below read the snapshot, edit it and write it
//! back under one lock, so concurrent editors never interleave.

use tokio::sync::Mutex;

use inksync_domain::automation::{self, Automation};
use inksync_domain::error::{InkSyncError, NotFoundError};
use inksync_domain::event::Event;
use inksync_domain::id::AutomationId;

use crate::ports::{AutomationStore, EventPublisher};

/// Application service for automation CRUD operations.
pub struct AutomationService<S, P> {
    store: S,
    publisher: P,
    write_lock: Mutex<()>,
}

impl<S, P> AutomationService<S, P>
where
    S: AutomationStore + Sync,
    P: EventPublisher + Sync,
{
    /// Create a new service backed by the given store and event publisher.
    pub fn new(store: S, publisher: P) -> Self {
        Self {
            store,
            publisher,
            write_lock: Mutex::new(()),
        }
    }

    /// List all automations in their saved order.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn list(&self) -> Result<Vec<Automation>, InkSyncError> {
        self.store.load_all().await
    }

    /// Look up an automation by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`InkSyncError::NotFound`] when no automation with `id` exists,
    /// or a storage error from the store.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: AutomationId) -> Result<Automation, InkSyncError> {
        self.store
            .load_all()
            .await?
            .into_iter()
            .find(|automation| automation.id == id)
            .ok_or_else(|| not_found(id))
    }

    /// Replace the whole snapshot after validating every automation.
    ///
    /// # Errors
    ///
    /// Returns [`InkSyncError::Validation`] if any automation is invalid or
    /// two share an id; nothing is written in that case.
    #[tracing::instrument(skip_all, fields(count = automations.len()))]
    pub async fn save_all(
        &self,
        automations: Vec<Automation>,
    ) -> Result<Vec<Automation>, InkSyncError> {
        let _guard = self.write_lock.lock().await;
        self.persist(automations).await
    }

    /// Append a new automation to the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`InkSyncError::Validation`] if invariants fail, or a
    /// storage error from the store.
    #[tracing::instrument(skip(self, automation), fields(automation_name = %automation.name))]
    pub async fn create(&self, automation: Automation) -> Result<Automation, InkSyncError> {
        automation.validate()?;
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.store.load_all().await?;
        snapshot.push(automation.clone());
        self.persist(snapshot).await?;
        Ok(automation)
    }

    /// Append an automation named after its position with the default
    /// trigger and no actions.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the store.
    #[tracing::instrument(skip(self))]
    pub async fn create_default(&self) -> Result<Automation, InkSyncError> {
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.store.load_all().await?;
        let automation = Automation::new_default(snapshot.len());
        snapshot.push(automation.clone());
        self.persist(snapshot).await?;
        Ok(automation)
    }

    /// Replace an existing automation, keeping its position.
    ///
    /// # Errors
    ///
    /// Returns [`InkSyncError::NotFound`] when `automation.id` is unknown,
    /// [`InkSyncError::Validation`] if invariants fail, or a storage error.
    #[tracing::instrument(skip(self, automation), fields(automation_id = %automation.id))]
    pub async fn update(&self, automation: Automation) -> Result<Automation, InkSyncError> {
        automation.validate()?;
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.store.load_all().await?;
        let slot = snapshot
            .iter_mut()
            .find(|existing| existing.id == automation.id)
            .ok_or_else(|| not_found(automation.id))?;
        *slot = automation.clone();
        self.persist(snapshot).await?;
        Ok(automation)
    }

    /// Delete an automation by id.
    ///
    /// # Errors
    ///
    /// Returns [`InkSyncError::NotFound`] when no automation with `id`
    /// exists, or a storage error from the store.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: AutomationId) -> Result<(), InkSyncError> {
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.store.load_all().await?;
        let before = snapshot.len();
        snapshot.retain(|automation| automation.id != id);
        if snapshot.len() == before {
            return Err(not_found(id));
        }
        self.persist(snapshot).await?;
        Ok(())
    }

    /// Enable or disable an automation. Disabling cancels its suspended
    /// runs once the engine sees the saved snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`InkSyncError::NotFound`] when no automation with `id`
    /// exists, or a storage error from the store.
    #[tracing::instrument(skip(self))]
    pub async fn set_enabled(
        &self,
        id: AutomationId,
        enabled: bool,
    ) -> Result<Automation, InkSyncError> {
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.store.load_all().await?;
        let target = snapshot
            .iter_mut()
            .find(|automation| automation.id == id)
            .ok_or_else(|| not_found(id))?;
        target.enabled = enabled;
        let updated = target.clone();
        self.persist(snapshot).await?;
        Ok(updated)
    }

    /// Validate, store and announce a snapshot. Callers hold the write lock.
    async fn persist(&self, automations: Vec<Automation>) -> Result<Vec<Automation>, InkSyncError> {
        automation::validate_snapshot(&automations)?;
        self.store.save_all(automations.clone()).await?;
        tracing::info!(count = automations.len(), "automations saved");
        if let Err(err) = self
            .publisher
            .publish(Event::automations_saved(automations.len()))
            .await
        {
            tracing::warn!(error = ?err, "unable to announce saved automations");
        }
        Ok(automations)
    }
}

fn not_found(id: AutomationId) -> InkSyncError {
    NotFoundError {
        entity: "Automation",
        id: id.to_string(),
    }
    .into()
}
