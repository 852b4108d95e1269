//! Run executor — carries one run through its action sequence.
//!
//! Each action's config is resolved against the run's variables, strictly
//! validated, parsed into an [`ActionCommand`] and executed. The first
//! failing action ends the run as `Failed`; a `stop_if` that holds ends it as
//! `StoppedByCondition`. `wait_for_time` is the only suspension point; it
//! asks its [`WaitCancellation`] for a token when the wait starts.

use chrono::TimeDelta;
use tokio_util::sync::CancellationToken;

use inksync_domain::automation::command::ActionCommand;
use inksync_domain::automation::{Action, Automation};
use inksync_domain::calendar::CalendarEvent;
use inksync_domain::error::{CancelledError, ExecutionError, InkSyncError, ValidationError};
use inksync_domain::run::{Run, RunOutcome, RunState};
use inksync_domain::time;
use inksync_domain::variables::RunContext;

use crate::ports::{CalendarStore, PcEndpoint, WebClient};

/// Where a run gets the token its `wait_for_time` suspends on.
///
/// The token is looked up when each wait starts, so it reflects whether the
/// automation is enabled at that moment rather than when the run began.
pub trait WaitCancellation: Sync {
    fn token(&self) -> CancellationToken;
}

impl WaitCancellation for CancellationToken {
    fn token(&self) -> CancellationToken {
        self.clone()
    }
}

/// What to do after an action succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Executes action sequences against the PC endpoint, the web client and
/// the calendar store.
pub struct RunExecutor<PC, W, C> {
    pc: PC,
    web: W,
    calendar: C,
}

impl<PC, W, C> RunExecutor<PC, W, C>
where
    PC: PcEndpoint + Sync,
    W: WebClient + Sync,
    C: CalendarStore + Sync,
{
    pub fn new(pc: PC, web: W, calendar: C) -> Self {
        Self { pc, web, calendar }
    }

    /// Run every action of `automation` in order and return the outcome.
    ///
    /// `run` must be in the `Triggered` state; it ends in the terminal state
    /// matching the returned outcome.
    pub async fn run(
        &self,
        automation: &Automation,
        run: &mut Run,
        ctx: &mut RunContext,
        cancel: &impl WaitCancellation,
    ) -> RunOutcome {
        transition(run, RunState::Running);
        let outcome = self.run_actions(&automation.actions, ctx, cancel).await;
        transition(run, outcome.state());
        match &outcome {
            RunOutcome::Completed => tracing::info!(run_id = %run.id, "run completed"),
            RunOutcome::StoppedByCondition { action_index } => {
                tracing::info!(run_id = %run.id, action_index, "run stopped by condition");
            }
            RunOutcome::Failed {
                action_index,
                reason,
            } => tracing::warn!(run_id = %run.id, action_index, %reason, "run failed"),
        }
        outcome
    }

    async fn run_actions(
        &self,
        actions: &[Action],
        ctx: &mut RunContext,
        cancel: &impl WaitCancellation,
    ) -> RunOutcome {
        for (index, action) in actions.iter().enumerate() {
            match self.run_action(index, action, ctx, cancel).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) => return RunOutcome::StoppedByCondition { action_index: index },
                Err(err) => {
                    return RunOutcome::Failed {
                        action_index: index,
                        reason: failure_reason(&err),
                    };
                }
            }
        }
        RunOutcome::Completed
    }

    /// Resolve, validate and execute a single action.
    ///
    /// # Errors
    ///
    /// Returns [`InkSyncError::Validation`] when the resolved config is
    /// invalid, [`InkSyncError::Execution`] when a collaborator fails and
    /// [`InkSyncError::Cancelled`] when a wait is cancelled.
    pub async fn run_action(
        &self,
        index: usize,
        action: &Action,
        ctx: &mut RunContext,
        cancel: &impl WaitCancellation,
    ) -> Result<Flow, InkSyncError> {
        let resolved = ctx.resolve_config(action.kind, &action.config);
        let command = ActionCommand::parse(index, action.kind, &resolved)?;
        tracing::debug!(action_index = index, action = %action.kind, "executing action");
        self.execute(command, ctx, cancel).await
    }

    async fn execute(
        &self,
        command: ActionCommand,
        ctx: &mut RunContext,
        cancel: &impl WaitCancellation,
    ) -> Result<Flow, InkSyncError> {
        match command {
            ActionCommand::SimulateKeyPress { key, duration } => {
                self.pc.key_press(&key, duration).await?;
            }
            ActionCommand::SimulateMouseMove { x, y } => self.pc.mouse_move(x, y).await?,
            ActionCommand::SimulateGamepad { button, value } => {
                self.pc.gamepad(&button, value).await?;
            }
            ActionCommand::ExecuteCommand { command } => {
                let output = self.pc.execute_command(&command).await?;
                if !output.success() {
                    return Err(ExecutionError::CommandFailed {
                        exit_code: output.exit_code,
                        stderr: output.stderr,
                    }
                    .into());
                }
            }
            ActionCommand::WebRequest(mut request) => {
                for (_, value) in &mut request.headers {
                    *value = ctx.resolve(value);
                }
                let response = self.web.send(&request).await?;
                tracing::debug!(url = %request.url, status = response.status, "web request answered");
                if !response.is_success() {
                    return Err(ExecutionError::HttpStatus {
                        status: response.status,
                    }
                    .into());
                }
            }
            ActionCommand::AddCalendarEvent {
                offset,
                title,
                description,
            } => {
                let at = TimeDelta::from_std(offset)
                    .ok()
                    .and_then(|delta| time::local_now().checked_add_signed(delta))
                    .ok_or(ValidationError::InvalidCalendarEvent(
                        "time_from_now is out of range",
                    ))?;
                let event = CalendarEvent::point(title, description, at);
                event.validate()?;
                let event = self.calendar.insert(event).await?;
                tracing::debug!(event_id = %event.id, "calendar event added");
            }
            ActionCommand::WaitForTime { duration } => {
                let cancel = cancel.token();
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return Err(CancelledError.into()),
                    () = tokio::time::sleep(duration) => {}
                }
            }
            ActionCommand::SetVariable { variable, value } => ctx.set(variable, value),
            ActionCommand::MapVariable(map) => {
                let input = ctx.operand(&map.variable_in);
                let output = map.apply(&input);
                ctx.set(map.variable_out, output);
            }
            ActionCommand::StopIf(stop) => {
                let lhs = ctx.operand(&stop.variable1);
                let rhs = ctx.operand(&stop.variable2);
                if stop.should_stop(&lhs, &rhs) {
                    return Ok(Flow::Stop);
                }
            }
            ActionCommand::FormatText(format) => {
                let output = format.render(|to| ctx.resolve(to));
                ctx.set(format.output_variable, output);
            }
        }
        Ok(Flow::Continue)
    }
}

fn transition(run: &mut Run, next: RunState) {
    let from = run.state();
    match run.advance(next) {
        Ok(()) => tracing::debug!(run_id = %run.id, %from, to = %next, "run transition"),
        Err(err) => tracing::warn!(run_id = %run.id, %err, "ignored run transition"),
    }
}

/// Human-readable reason recorded on a failed run.
#[must_use]
pub fn failure_reason(err: &InkSyncError) -> String {
    match err {
        InkSyncError::Validation(e) => e.to_string(),
        InkSyncError::NotFound(e) => e.to_string(),
        InkSyncError::Execution(e) => e.to_string(),
        InkSyncError::Cancelled(_) => RunOutcome::CANCELLED.to_string(),
        InkSyncError::Storage(e) => format!("storage error: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use inksync_domain::automation::ActionKind;
    use inksync_domain::device::DeviceEvent;
    use inksync_domain::id::AutomationId;
    use inksync_domain::variables::AmbientSnapshot;
    use serde_json::{Value, json};

    use crate::fakes::{InMemoryCalendar, RecordingPc, StubWeb};

    type Executor = RunExecutor<Arc<RecordingPc>, Arc<StubWeb>, Arc<InMemoryCalendar>>;

    struct Harness {
        pc: Arc<RecordingPc>,
        web: Arc<StubWeb>,
        calendar: Arc<InMemoryCalendar>,
        executor: Executor,
    }

    fn harness_with_web(web: StubWeb) -> Harness {
        let pc = Arc::new(RecordingPc::default());
        let web = Arc::new(web);
        let calendar = Arc::new(InMemoryCalendar::default());
        let executor = RunExecutor::new(Arc::clone(&pc), Arc::clone(&web), Arc::clone(&calendar));
        Harness {
            pc,
            web,
            calendar,
            executor,
        }
    }

    fn harness() -> Harness {
        harness_with_web(StubWeb::default())
    }

    fn action(kind: ActionKind, config: Value) -> Action {
        Action::new(kind, config.as_object().cloned().unwrap())
    }

    fn automation(actions: Vec<Action>) -> Automation {
        Automation {
            id: AutomationId::new(),
            name: "test".to_string(),
            enabled: true,
            kind: inksync_domain::automation::AutomationKind::Pc,
            trigger: inksync_domain::automation::Trigger::default(),
            actions,
        }
    }

    async fn execute(h: &Harness, actions: Vec<Action>, ctx: &mut RunContext) -> RunOutcome {
        let automation = automation(actions);
        let mut run = Run::triggered(automation.id);
        let outcome = h
            .executor
            .run(&automation, &mut run, ctx, &CancellationToken::new())
            .await;
        assert_eq!(run.state(), outcome.state());
        outcome
    }

    #[tokio::test]
    async fn should_stop_before_later_actions_when_condition_holds() {
        let h = harness();
        let mut ctx = RunContext::default();
        let outcome = execute(
            &h,
            vec![
                action(ActionKind::SetVariable, json!({"variable": "x", "value": "5"})),
                action(
                    ActionKind::StopIf,
                    json!({"variable1": "x", "condition": ">", "variable2": "3"}),
                ),
                action(
                    ActionKind::FormatText,
                    json!({"output_variable": "msg", "format": "never", "replacements": []}),
                ),
            ],
            &mut ctx,
        )
        .await;
        assert_eq!(outcome, RunOutcome::StoppedByCondition { action_index: 1 });
        assert_eq!(ctx.get("msg"), None);
    }

    #[tokio::test]
    async fn should_continue_when_inverted_condition_holds() {
        let h = harness();
        let mut ctx = RunContext::default();
        let outcome = execute(
            &h,
            vec![
                action(ActionKind::SetVariable, json!({"variable": "x", "value": "5"})),
                action(
                    ActionKind::StopIf,
                    json!({"variable1": "x", "condition": ">", "variable2": "3", "invert": true}),
                ),
                action(
                    ActionKind::FormatText,
                    json!({
                        "output_variable": "msg",
                        "format": "Hi {name}, {other}",
                        "replacements": [{"from": "{name}", "to": "Bob"}]
                    }),
                ),
            ],
            &mut ctx,
        )
        .await;
        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(ctx.get("msg").as_deref(), Some("Hi Bob, {other}"));
    }

    #[tokio::test]
    async fn should_resolve_trigger_variables_in_pc_primitives() {
        let h = harness();
        let event = DeviceEvent::KeyPress {
            module: 2,
            key: "C".to_string(),
        };
        let mut ctx = RunContext::for_event(AmbientSnapshot::default(), &event);
        let outcome = execute(
            &h,
            vec![
                action(
                    ActionKind::SimulateKeyPress,
                    json!({"key": "F{key_id}", "duration": 40}),
                ),
                action(ActionKind::SimulateMouseMove, json!({"x": -5, "y": 90000})),
                action(ActionKind::SimulateGamepad, json!({"button": "A", "value": "{key_value}"})),
            ],
            &mut ctx,
        )
        .await;
        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(
            h.pc.calls(),
            vec!["key_press FC 40ms", "mouse_move 0,65535", "gamepad A 1"]
        );
    }

    #[tokio::test]
    async fn should_keep_quotes_of_variables_used_in_json_text_fields() {
        let h = harness();
        let mut ctx = RunContext::default();
        let outcome = execute(
            &h,
            vec![
                action(ActionKind::SetVariable, json!({"variable": "v", "value": "say \"hi\""})),
                action(
                    ActionKind::FormatText,
                    json!({
                        "output_variable": "msg",
                        "format": "<{x}>",
                        "replacements": "[{\"from\":\"{x}\",\"to\":\"{v}\"}]"
                    }),
                ),
            ],
            &mut ctx,
        )
        .await;
        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(ctx.get("msg").as_deref(), Some("<say \"hi\">"));
    }

    #[tokio::test]
    async fn should_resolve_header_values_after_parsing() {
        let h = harness();
        let mut ctx = RunContext::default();
        ctx.set("token", "a\"b");
        let outcome = execute(
            &h,
            vec![action(
                ActionKind::WebRequest,
                json!({"url": "https://example.com", "headers": "{\"X-Token\": \"{token}\"}"}),
            )],
            &mut ctx,
        )
        .await;
        assert_eq!(outcome, RunOutcome::Completed);
        let requests = h.web.requests.lock().unwrap();
        assert_eq!(
            requests[0].headers,
            vec![("X-Token".to_string(), "a\"b".to_string())]
        );
    }

    #[tokio::test]
    async fn should_map_knob_value_into_variable() {
        let h = harness();
        let event = DeviceEvent::KnobChange {
            module: 1,
            knob: 0,
            value: 80,
        };
        let mut ctx = RunContext::for_event(AmbientSnapshot::default(), &event);
        let outcome = execute(
            &h,
            vec![action(
                ActionKind::MapVariable,
                json!({
                    "variable_in": "knob_value",
                    "variable_out": "level",
                    "min": 0,
                    "max": 100,
                    "mappings": [{"from": 0, "to": "low"}, {"from": 100, "to": "high"}]
                }),
            )],
            &mut ctx,
        )
        .await;
        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(ctx.get("level").as_deref(), Some("high"));
    }

    #[tokio::test]
    async fn should_fail_when_pc_is_unreachable() {
        let h = harness();
        h.pc.unreachable.store(true, Ordering::SeqCst);
        let mut ctx = RunContext::default();
        let outcome = execute(
            &h,
            vec![
                action(ActionKind::SetVariable, json!({"variable": "x", "value": "1"})),
                action(ActionKind::SimulateKeyPress, json!({"key": "F13"})),
            ],
            &mut ctx,
        )
        .await;
        assert_eq!(
            outcome,
            RunOutcome::Failed {
                action_index: 1,
                reason: "PC endpoint unreachable: agent offline".to_string()
            }
        );
    }

    #[tokio::test]
    async fn should_fail_on_non_zero_exit_code() {
        let h = harness();
        h.pc.exit_code.store(127, Ordering::SeqCst);
        let mut ctx = RunContext::default();
        let outcome = execute(
            &h,
            vec![action(ActionKind::ExecuteCommand, json!({"command": "nope"}))],
            &mut ctx,
        )
        .await;
        assert_eq!(
            outcome,
            RunOutcome::Failed {
                action_index: 0,
                reason: "command exited with status 127: command not found".to_string()
            }
        );
    }

    #[tokio::test]
    async fn should_fail_on_non_success_http_status() {
        let h = harness_with_web(StubWeb::with_status(503));
        let mut ctx = RunContext::default();
        ctx.set("path", "hook");
        let outcome = execute(
            &h,
            vec![action(
                ActionKind::WebRequest,
                json!({"url": "https://example.com/{path}", "method": "POST", "body": "{path}"}),
            )],
            &mut ctx,
        )
        .await;
        assert_eq!(
            outcome,
            RunOutcome::Failed {
                action_index: 0,
                reason: "HTTP request returned status 503".to_string()
            }
        );
        let requests = h.web.requests.lock().unwrap();
        assert_eq!(requests[0].url, "https://example.com/hook");
        assert_eq!(requests[0].body.as_deref(), Some("hook"));
    }

    #[tokio::test]
    async fn should_fail_when_resolved_config_is_invalid() {
        let h = harness();
        let mut ctx = RunContext::default();
        let outcome = execute(
            &h,
            vec![action(
                ActionKind::SimulateGamepad,
                json!({"button": "A", "value": "{missing}"}),
            )],
            &mut ctx,
        )
        .await;
        let RunOutcome::Failed {
            action_index,
            reason,
        } = outcome
        else {
            panic!("expected failure");
        };
        assert_eq!(action_index, 0);
        assert_eq!(reason, "action #1 simulate_gamepad: value must be a number");
        assert!(h.pc.calls().is_empty());
    }

    #[tokio::test]
    async fn should_add_calendar_event_from_now() {
        let h = harness();
        let mut ctx = RunContext::default();
        let before = time::local_now();
        let outcome = execute(
            &h,
            vec![action(
                ActionKind::AddCalendarEvent,
                json!({"time_from_now": 30, "title": "Tea", "description": "green"}),
            )],
            &mut ctx,
        )
        .await;
        assert_eq!(outcome, RunOutcome::Completed);
        let events = h.calendar.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Tea");
        assert_eq!(events[0].start, events[0].end);
        assert!(events[0].start >= before + TimeDelta::minutes(30));
    }

    #[tokio::test(start_paused = true)]
    async fn should_complete_wait() {
        let h = harness();
        let mut ctx = RunContext::default();
        let outcome = execute(
            &h,
            vec![action(
                ActionKind::WaitForTime,
                json!({"minutes": 1, "seconds": 0, "milliseconds": 0}),
            )],
            &mut ctx,
        )
        .await;
        assert_eq!(outcome, RunOutcome::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn should_cancel_run_suspended_in_wait() {
        let h = Arc::new(harness());
        let automation = automation(vec![
            action(
                ActionKind::WaitForTime,
                json!({"minutes": 10, "seconds": 0, "milliseconds": 0}),
            ),
            action(ActionKind::SimulateKeyPress, json!({"key": "F13"})),
        ]);
        let token = CancellationToken::new();

        let task = {
            let h = Arc::clone(&h);
            let token = token.clone();
            tokio::spawn(async move {
                let mut run = Run::triggered(automation.id);
                let mut ctx = RunContext::default();
                h.executor.run(&automation, &mut run, &mut ctx, &token).await
            })
        };

        tokio::time::sleep(Duration::from_secs(1)).await;
        token.cancel();

        let outcome = task.await.unwrap();
        assert_eq!(
            outcome,
            RunOutcome::Failed {
                action_index: 0,
                reason: "cancelled".to_string()
            }
        );
        assert!(outcome.is_cancelled());
        assert!(h.pc.calls().is_empty());
    }

    #[tokio::test]
    async fn should_cancel_at_wait_entry_when_token_already_cancelled() {
        let h = harness();
        let automation = automation(vec![action(
            ActionKind::WaitForTime,
            json!({"minutes": 0, "seconds": 0, "milliseconds": 0}),
        )]);
        let token = CancellationToken::new();
        token.cancel();
        let mut run = Run::triggered(automation.id);
        let mut ctx = RunContext::default();
        let outcome = h.executor.run(&automation, &mut run, &mut ctx, &token).await;
        assert!(outcome.is_cancelled());
    }
}
