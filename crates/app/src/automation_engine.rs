//! Automation engine — reacts to device events by starting runs.
//!
//! For each incoming [`DeviceEvent`] the engine loads the automation
//! snapshot, picks the enabled automations whose trigger matches and spawns
//! one independent task per match. Every automation owns a cancellation
//! token that its runs look up each time they enter `wait_for_time`;
//! disabling or deleting the automation cancels it, which fails runs
//! suspended in the wait and runs entering one while it stays disabled.
//! Re-enabling swaps in a fresh token.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use inksync_domain::automation::Automation;
use inksync_domain::device::{DeviceEvent, MODULE_SLOTS};
use inksync_domain::error::InkSyncError;
use inksync_domain::event::{Event, EventType};
use inksync_domain::id::{AutomationId, RunId};
use inksync_domain::run::{Run, RunOutcome};
use inksync_domain::time;
use inksync_domain::variables::{AmbientSnapshot, RunContext};

use crate::ports::{AutomationStore, CalendarStore, EventPublisher, ModuleRegistry, PcEndpoint, WebClient};
use crate::run_executor::{RunExecutor, WaitCancellation};

type Tokens = Arc<Mutex<HashMap<AutomationId, CancellationToken>>>;

/// The token of one automation as it stands when a wait starts.
struct AutomationWait {
    tokens: Tokens,
    automation_id: AutomationId,
}

impl AutomationWait {
    /// Make sure the automation has a token so `reconcile` can cancel it
    /// before the run reaches its first wait.
    fn register(tokens: Tokens, automation_id: AutomationId) -> Self {
        let wait = Self {
            tokens,
            automation_id,
        };
        wait.token();
        wait
    }
}

impl WaitCancellation for AutomationWait {
    fn token(&self) -> CancellationToken {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(self.automation_id)
            .or_default()
            .clone()
    }
}

/// A run started by [`AutomationEngine::process_event`].
#[derive(Debug)]
pub struct RunHandle {
    pub run_id: RunId,
    pub automation_id: AutomationId,
    handle: JoinHandle<RunOutcome>,
}

impl RunHandle {
    /// Wait for the run to finish.
    pub async fn outcome(self) -> RunOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(err) => RunOutcome::Failed {
                action_index: 0,
                reason: format!("run task aborted: {err}"),
            },
        }
    }
}

/// Reactive automation engine.
pub struct AutomationEngine<S, M, P, PC, W, C> {
    store: S,
    modules: M,
    publisher: Arc<P>,
    executor: Arc<RunExecutor<PC, W, C>>,
    tokens: Tokens,
}

impl<S, M, P, PC, W, C> AutomationEngine<S, M, P, PC, W, C>
where
    S: AutomationStore + Sync,
    M: ModuleRegistry + Sync,
    P: EventPublisher + Send + Sync + 'static,
    PC: PcEndpoint + Send + Sync + 'static,
    W: WebClient + Send + Sync + 'static,
    C: CalendarStore + Send + Sync + 'static,
{
    pub fn new(
        store: S,
        modules: M,
        publisher: Arc<P>,
        executor: Arc<RunExecutor<PC, W, C>>,
    ) -> Self {
        Self {
            store,
            modules,
            publisher,
            executor,
            tokens: Arc::default(),
        }
    }

    /// Start a run for every enabled, valid automation whose trigger
    /// matches `event`. No match is not an error: the result is empty.
    ///
    /// # Errors
    ///
    /// Returns [`InkSyncError::Validation`] for an event outside the
    /// device layout, or a storage error when the snapshot cannot be loaded.
    #[tracing::instrument(skip(self, event), fields(event = %event))]
    pub async fn process_event(&self, event: &DeviceEvent) -> Result<Vec<RunHandle>, InkSyncError> {
        event.validate()?;
        let matching: Vec<Automation> = self
            .store
            .load_all()
            .await?
            .into_iter()
            .filter(|automation| automation.enabled && automation.trigger.matches_event(event))
            .filter(|automation| match automation.validate() {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(automation_id = %automation.id, error = ?err, "skipping invalid automation");
                    false
                }
            })
            .collect();

        if matching.is_empty() {
            tracing::debug!("no automation matched");
            return Ok(Vec::new());
        }

        let ambient = self.ambient_snapshot().await;
        let trigger = event.to_string();
        let handles = matching
            .into_iter()
            .map(|automation| {
                let ctx = RunContext::for_event(ambient.clone(), event);
                self.spawn_run(automation, ctx, &trigger)
            })
            .collect();
        Ok(handles)
    }

    fn spawn_run(&self, automation: Automation, mut ctx: RunContext, trigger: &str) -> RunHandle {
        let mut run = Run::triggered(automation.id);
        let run_id = run.id;
        let automation_id = automation.id;
        let wait = AutomationWait::register(Arc::clone(&self.tokens), automation_id);
        let executor = Arc::clone(&self.executor);
        let publisher = Arc::clone(&self.publisher);
        let started = Event::run_started(automation_id, run_id, trigger);
        let span = tracing::info_span!("run", %run_id, %automation_id, automation = %automation.name);

        let handle = tokio::spawn(
            async move {
                tracing::info!("run triggered");
                if let Err(err) = publisher.publish(started).await {
                    tracing::warn!(error = ?err, "unable to publish run start");
                }
                let outcome = executor.run(&automation, &mut run, &mut ctx, &wait).await;
                let finished = Event::run_finished(automation_id, run_id, &outcome);
                if let Err(err) = publisher.publish(finished).await {
                    tracing::warn!(error = ?err, "unable to publish run end");
                }
                outcome
            }
            .instrument(span),
        );

        RunHandle {
            run_id,
            automation_id,
            handle,
        }
    }

    /// Values captured once when a run is triggered. Module lookups that
    /// fail leave the corresponding variables unresolved.
    async fn ambient_snapshot(&self) -> AmbientSnapshot {
        let modules = match self.modules.status().await {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!(error = ?err, "unable to read module status");
                inksync_domain::device::ModuleStatus::default()
            }
        };
        let mut names = [None, None];
        for (name, slot) in names.iter_mut().zip(MODULE_SLOTS) {
            if !modules.is_connected(slot) {
                continue;
            }
            match self.modules.descriptor(slot).await {
                Ok(descriptor) => *name = descriptor.map(|d| d.device_name),
                Err(err) => tracing::warn!(slot, error = ?err, "unable to read module descriptor"),
            }
        }
        let [module1_name, module2_name] = names;
        AmbientSnapshot {
            now: time::local_now(),
            modules,
            module1_name,
            module2_name,
        }
    }

    /// Cancel the token of every automation that is now disabled or gone,
    /// and give re-enabled automations a fresh one.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the snapshot cannot be loaded.
    #[tracing::instrument(skip(self))]
    pub async fn reconcile(&self) -> Result<(), InkSyncError> {
        let enabled: HashSet<AutomationId> = self
            .store
            .load_all()
            .await?
            .into_iter()
            .filter(|automation| automation.enabled)
            .map(|automation| automation.id)
            .collect();
        let mut tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        for (id, token) in tokens.iter_mut() {
            match (enabled.contains(id), token.is_cancelled()) {
                (true, true) => {
                    tracing::debug!(automation_id = %id, "automation re-enabled");
                    *token = CancellationToken::new();
                }
                (false, false) => {
                    tracing::info!(automation_id = %id, "cancelling waits of disabled automation");
                    token.cancel();
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Reconcile on every `automations_saved` event until `shutdown` fires
    /// or the bus closes.
    pub async fn run_forever(&self, mut events: broadcast::Receiver<Event>, shutdown: CancellationToken) {
        tracing::info!("automation engine started");
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                received = events.recv() => match received {
                    Ok(event) if event.event_type == EventType::AutomationsSaved => {
                        if let Err(err) = self.reconcile().await {
                            tracing::error!(error = ?err, "unable to reconcile automations");
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "automation engine lagged behind the event bus");
                        if let Err(err) = self.reconcile().await {
                            tracing::error!(error = ?err, "unable to reconcile automations");
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
        tracing::info!("automation engine stopped");
    }
}
