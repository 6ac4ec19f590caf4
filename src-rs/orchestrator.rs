//! Drives one command at a time through submission and status polling.
//!
//! Every submission and every `dispose` bumps a generation counter. The poll
//! loop and in-flight submissions remember the generation they started under
//! and drop their results once it moves on, so a superseded task can never
//! write to the conversation or flip the busy flag.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::backend::TaskBackend;
use crate::config::OrchestratorConfig;
use crate::conversation::{ConversationSink, Sender};
use crate::error::TaskError;
use crate::result::SubmitOutcome;
use crate::task::{Task, TaskStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
    Polling,
}

impl Phase {
    pub fn is_busy(self) -> bool {
        self != Phase::Idle
    }
}

pub struct TaskOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    backend: Arc<dyn TaskBackend>,
    sink: Arc<dyn ConversationSink>,
    config: OrchestratorConfig,
    state: Mutex<State>,
    busy: watch::Sender<bool>,
}

struct State {
    phase: Phase,
    generation: u64,
    task: Option<Task>,
    finished: Option<Task>,
    poll: Option<JoinHandle<()>>,
}

impl TaskOrchestrator {
    /// The sink is appended to while internal state is locked, so it must not
    /// call back into the orchestrator.
    pub fn new(
        backend: Arc<dyn TaskBackend>,
        sink: Arc<dyn ConversationSink>,
        config: OrchestratorConfig,
    ) -> Self {
        let (busy, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                backend,
                sink,
                config,
                state: Mutex::new(State {
                    phase: Phase::Idle,
                    generation: 0,
                    task: None,
                    finished: None,
                    poll: None,
                }),
                busy,
            }),
        }
    }

    /// Submits `command` and, once the backend accepts it, starts polling the
    /// resulting task in the background. Resolves as soon as the submission
    /// attempt has been handled; the task result arrives later through the
    /// conversation sink.
    pub async fn submit(&self, command: &str) -> SubmitOutcome {
        if command.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }

        let generation = {
            let mut state = self.inner.lock();
            self.inner.cancel(&mut state);
            self.inner.sink.append(command, Sender::User);
            self.inner.set_phase(&mut state, Phase::Submitting);
            state.generation
        };
        let mut pending = PendingSubmission {
            inner: self.inner.as_ref(),
            generation,
            settled: false,
        };

        info!("submitting command (generation {})", generation);
        let result = self.inner.backend.submit(command).await;

        let mut state = self.inner.lock();
        pending.settled = true;
        if state.generation != generation {
            debug!("submission for generation {} superseded", generation);
            return SubmitOutcome::Superseded;
        }

        match result {
            Ok(task_id) => {
                info!("command accepted as task {}", task_id);
                self.inner
                    .sink
                    .append(&self.inner.config.messages.acknowledged, Sender::Agent);
                state.task = Some(Task {
                    id: task_id.clone(),
                    command: command.to_string(),
                    status: TaskStatus::Pending,
                    result: None,
                    submitted_at: Utc::now(),
                });
                state.poll = Some(tokio::spawn(poll_loop(
                    Arc::clone(&self.inner),
                    generation,
                    task_id.clone(),
                )));
                self.inner.set_phase(&mut state, Phase::Polling);
                SubmitOutcome::Accepted { task_id }
            }
            Err(source) => {
                let err = TaskError::Submission(source);
                warn!("{}", err);
                self.inner
                    .sink
                    .append(&self.inner.config.messages.submission_failed, Sender::Agent);
                self.inner.set_phase(&mut state, Phase::Idle);
                SubmitOutcome::Rejected(err)
            }
        }
    }

    /// Stops any active poll loop without reporting anything. Safe to call at
    /// any time, any number of times.
    pub fn dispose(&self) {
        let mut state = self.inner.lock();
        if state.phase.is_busy() {
            info!("cancelling tracked command (generation {})", state.generation);
        }
        self.inner.cancel(&mut state);
        self.inner.set_phase(&mut state, Phase::Idle);
    }

    pub fn is_busy(&self) -> bool {
        *self.inner.busy.borrow()
    }

    pub fn phase(&self) -> Phase {
        self.inner.lock().phase
    }

    pub fn current_task(&self) -> Option<Task> {
        self.inner.lock().task.clone()
    }

    /// The last task that reached a terminal status, with its report. Cleared
    /// by the next `submit` or `dispose`.
    pub fn finished_task(&self) -> Option<Task> {
        self.inner.lock().finished.clone()
    }

    /// Watch the busy flag instead of polling `is_busy`.
    pub fn subscribe_busy(&self) -> watch::Receiver<bool> {
        self.inner.busy.subscribe()
    }
}

impl Drop for TaskOrchestrator {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn set_phase(&self, state: &mut State, phase: Phase) {
        state.phase = phase;
        self.busy.send_replace(phase.is_busy());
    }

    fn cancel(&self, state: &mut State) {
        state.generation += 1;
        state.task = None;
        state.finished = None;
        if let Some(handle) = state.poll.take() {
            handle.abort();
        }
    }

    fn finish(&self, state: &mut State, text: &str) {
        self.sink.append(text, Sender::Agent);
        state.task = None;
        state.poll = None;
        self.set_phase(state, Phase::Idle);
    }
}

/// Resets the busy flag if a `submit` future is dropped before the backend
/// answered.
struct PendingSubmission<'a> {
    inner: &'a Inner,
    generation: u64,
    settled: bool,
}

impl Drop for PendingSubmission<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut state = self.inner.lock();
        if state.generation == self.generation && state.phase == Phase::Submitting {
            debug!("submit dropped before the backend answered");
            self.inner.set_phase(&mut state, Phase::Idle);
        }
    }
}

async fn poll_loop(inner: Arc<Inner>, generation: u64, task_id: String) {
    let period = inner.config.poll_interval;
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if inner.lock().generation != generation {
            return;
        }

        let result = inner.backend.status(&task_id).await;

        let mut state = inner.lock();
        if state.generation != generation {
            debug!("dropping stale status for task {}", task_id);
            return;
        }

        match result {
            Ok(report) if report.status.is_terminal() => {
                info!("task {} finished with {}", task_id, report.status);
                let text = report
                    .report
                    .filter(|text| !text.trim().is_empty())
                    .unwrap_or_else(|| inner.config.messages.no_detail.clone());
                if let Some(mut task) = state.task.take() {
                    task.status = report.status;
                    task.result = Some(text.clone());
                    state.finished = Some(task);
                }
                inner.finish(&mut state, &text);
                return;
            }
            Ok(report) => {
                debug!("task {} is {}", task_id, report.status);
                if let Some(task) = state.task.as_mut() {
                    task.status = report.status;
                }
            }
            Err(source) => {
                let err = TaskError::Polling {
                    task_id: task_id.clone(),
                    source,
                };
                warn!("{}", err);
                let text = inner.config.messages.polling_failed.clone();
                inner.finish(&mut state, &text);
                return;
            }
        }
    }
}
