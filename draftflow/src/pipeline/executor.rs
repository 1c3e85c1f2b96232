//! Concurrent step scheduler.
//!
//! Launches each step as soon as every key it reads has resolved, so
//! independent steps overlap. A step whose required input resolved to
//! `Absent` is skipped without being invoked, and its outputs resolve to
//! `Absent` in turn. A failing step only affects its own descendants.

use super::result::overall_status;
use super::{PipelineRun, StepGraph};
use crate::cancellation::CancellationToken;
use crate::config::RunnerConfig;
use crate::context::{ContextStore, ContextValue, StepInputs};
use crate::core::{StepOutput, StepRunRecord, StepStatus};
use crate::errors::{DraftflowError, StepExecutionError};
use crate::events::{event_types, EventSink, NoOpEventSink};
use crate::observability::SpanTimer;
use chrono::Utc;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Per-run options.
#[derive(Clone)]
pub struct RunOptions {
    /// Token checked before each step launch.
    pub cancellation: CancellationToken,
    /// Receives lifecycle events.
    pub events: Arc<dyn EventSink>,
    /// Executor settings.
    pub config: RunnerConfig,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            cancellation: CancellationToken::new(),
            events: Arc::new(NoOpEventSink),
            config: RunnerConfig::default(),
        }
    }
}

impl RunOptions {
    /// Creates options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the given cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Uses the given event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    /// Uses the given executor settings.
    #[must_use]
    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }
}

impl std::fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunOptions")
            .field("cancellation", &self.cancellation)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

type StepJoin = BoxFuture<'static, (usize, Result<anyhow::Result<StepOutput>, JoinError>)>;

const CANCELLED: &str = "run cancelled";
const CANCELLED_IN_FLIGHT: &str = "run cancelled; in-flight result discarded";

/// State of one run over a validated graph.
pub(crate) struct Executor<'g> {
    graph: &'g StepGraph,
    pipeline: &'g str,
    terminal_key: &'g str,
    options: RunOptions,
    run_id: Uuid,
    store: ContextStore,
    records: Vec<StepRunRecord>,
    timers: Vec<Option<SpanTimer>>,
    unresolved: Vec<usize>,
    resolved: VecDeque<usize>,
    ready: VecDeque<usize>,
    next_sequence: usize,
    cancelled: bool,
}

impl<'g> Executor<'g> {
    pub(crate) fn new(
        graph: &'g StepGraph,
        pipeline: &'g str,
        terminal_key: &'g str,
        options: RunOptions,
    ) -> Self {
        let records = graph
            .steps()
            .iter()
            .map(|step| StepRunRecord::pending(&step.name))
            .collect();

        Self {
            graph,
            pipeline,
            terminal_key,
            options,
            run_id: Uuid::new_v4(),
            store: ContextStore::new(),
            records,
            timers: vec![None; graph.step_count()],
            unresolved: vec![0; graph.step_count()],
            resolved: VecDeque::new(),
            ready: VecDeque::new(),
            next_sequence: 0,
            cancelled: false,
        }
    }

    /// Runs every step to a terminal status and aggregates the result.
    ///
    /// `initial` must contain exactly the declared initial inputs.
    pub(crate) async fn execute(
        self,
        initial: BTreeMap<String, ContextValue>,
    ) -> Result<PipelineRun, DraftflowError> {
        let span = info_span!("pipeline.run", pipeline = %self.pipeline, run_id = %self.run_id);
        self.drive(initial).instrument(span).await
    }

    async fn drive(
        mut self,
        initial: BTreeMap<String, ContextValue>,
    ) -> Result<PipelineRun, DraftflowError> {
        let run_timer = SpanTimer::start();
        info!(
            steps = self.graph.step_count(),
            terminal_key = %self.terminal_key,
            "Pipeline run started"
        );
        self.emit(event_types::PIPELINE_STARTED, json!({ "steps": self.graph.step_count() }));

        for (key, value) in initial {
            self.store.set(key, value)?;
        }

        let graph = self.graph;
        for (i, step) in graph.steps().iter().enumerate() {
            self.unresolved[i] = step.inputs().filter(|k| !self.store.is_resolved(k)).count();
            if self.unresolved[i] == 0 {
                self.resolved.push_back(i);
            }
        }
        self.settle()?;

        let token = self.options.cancellation.clone();
        let limit = self.options.config.concurrency_limit();
        let mut in_flight: FuturesUnordered<StepJoin> = FuturesUnordered::new();
        let mut running = BTreeSet::new();

        loop {
            if token.is_cancelled() {
                self.cancel_remaining(&running, token.reason())?;
                break;
            }

            while in_flight.len() < limit {
                let Some(i) = self.ready.pop_front() else {
                    break;
                };
                in_flight.push(self.launch(i)?);
                running.insert(i);
            }

            if in_flight.is_empty() {
                break;
            }

            tokio::select! {
                biased;
                () = token.cancelled() => {}
                Some((i, joined)) = in_flight.next() => {
                    running.remove(&i);
                    self.finish(i, joined)?;
                    self.settle()?;
                }
            }
        }
        // Dropping the join handles detaches anything still in flight.
        drop(in_flight);

        if let Some(stalled) = self.records.iter().find(|r| !r.is_terminal()) {
            return Err(DraftflowError::Internal(format!(
                "step '{}' never reached a terminal status",
                stalled.step
            )));
        }

        let final_value = self.store.get(self.terminal_key);
        let terminal_ancestors = graph.ancestors_of_key(self.terminal_key);
        let status = overall_status(
            &final_value,
            self.cancelled,
            &terminal_ancestors,
            &self.records,
        );

        let mut trace = self.records;
        trace.sort_by_key(|r| r.sequence);

        let duration_ms = run_timer.elapsed_ms();
        info!(
            status = %status,
            final_present = final_value.is_present(),
            duration_ms = duration_ms,
            "Pipeline run completed"
        );
        if self.options.config.emit_events {
            self.options.events.try_emit(
                event_types::PIPELINE_COMPLETED,
                Some(json!({
                    "run_id": self.run_id.to_string(),
                    "pipeline": self.pipeline,
                    "status": status.to_string(),
                    "duration_ms": duration_ms,
                })),
            );
        }

        Ok(PipelineRun {
            id: self.run_id,
            pipeline: self.pipeline.to_string(),
            terminal_key: self.terminal_key.to_string(),
            status,
            cancel_reason: if self.cancelled { token.reason() } else { None },
            context: self.store.snapshot(),
            trace,
            terminal_ancestors,
            started_at: run_timer.started_at(),
            ended_at: Utc::now(),
            duration_ms,
        })
    }

    /// Decides the fate of every step whose inputs have all resolved.
    fn settle(&mut self) -> Result<(), DraftflowError> {
        let graph = self.graph;
        while let Some(i) = self.resolved.pop_front() {
            if self.options.cancellation.is_cancelled() {
                // Left pending; the run loop skips it.
                continue;
            }

            let step = graph.descriptor(i);
            let missing = step
                .required_inputs
                .iter()
                .find(|key| self.store.get(key).is_absent());

            if let Some(key) = missing {
                let reason = format!("required input '{key}' is absent");
                self.skip_unlaunched(i, reason)?;
            } else {
                self.transition(i, StepStatus::Ready)?;
                self.ready.push_back(i);
            }
        }
        Ok(())
    }

    fn launch(&mut self, i: usize) -> Result<StepJoin, DraftflowError> {
        let graph = self.graph;
        let step = graph.descriptor(i);
        let values = step
            .inputs()
            .map(|key| (key.clone(), self.store.get(key)))
            .collect();
        let inputs = StepInputs::new(&step.name, values);

        self.transition(i, StepStatus::Running)?;
        let timer = SpanTimer::start();
        self.records[i].started_at = Some(timer.started_at());
        self.timers[i] = Some(timer);

        debug!(step = %step.name, "Step started");
        self.emit(event_types::STEP_STARTED, json!({ "step": step.name }));

        let runner = Arc::clone(&step.runner);
        let span = info_span!("step", step = %step.name);
        let handle = tokio::spawn(async move { runner.execute(&inputs).await }.instrument(span));

        Ok(Box::pin(async move { (i, handle.await) }))
    }

    fn finish(
        &mut self,
        i: usize,
        joined: Result<anyhow::Result<StepOutput>, JoinError>,
    ) -> Result<(), DraftflowError> {
        let graph = self.graph;
        let step = graph.descriptor(i);
        let duration_ms = self.timers[i].take().map(|t| t.elapsed_ms());
        self.records[i].ended_at = Some(Utc::now());
        self.records[i].duration_ms = duration_ms;

        match joined {
            Ok(Ok(StepOutput::Produced(mut values))) => {
                let undeclared = values.keys().find(|k| !step.outputs.contains(*k)).cloned();
                if let Some(key) = undeclared {
                    let err = StepExecutionError::new(
                        &step.name,
                        format!("wrote undeclared output key '{key}'"),
                    );
                    return self.fail(i, &err);
                }

                let outputs: Vec<_> = step
                    .outputs
                    .iter()
                    .map(|key| (key.clone(), values.remove(key).unwrap_or_default()))
                    .collect();

                self.transition(i, StepStatus::Succeeded)?;
                self.assign_sequence(i);
                info!(
                    step = %step.name,
                    duration_ms = duration_ms.unwrap_or_default(),
                    present = outputs.iter().filter(|(_, v)| v.is_present()).count(),
                    "Step succeeded"
                );
                self.emit(
                    event_types::STEP_SUCCEEDED,
                    json!({ "step": step.name, "duration_ms": duration_ms }),
                );
                self.publish(i, outputs)
            }
            Ok(Ok(StepOutput::Skip { reason })) => {
                self.transition(i, StepStatus::Skipped)?;
                self.assign_sequence(i);
                debug!(step = %step.name, reason = %reason, "Step declined to produce output");
                self.emit(
                    event_types::STEP_SKIPPED,
                    json!({ "step": step.name, "reason": reason }),
                );
                self.records[i].skip_reason = Some(reason);
                self.publish_absent(i)
            }
            Ok(Err(err)) => self.fail(i, &StepExecutionError::from_anyhow(&step.name, &err)),
            Err(join_err) => {
                let message = if join_err.is_panic() {
                    panic_message(join_err)
                } else {
                    "step task was aborted".to_string()
                };
                self.fail(i, &StepExecutionError::new(&step.name, message))
            }
        }
    }

    fn fail(&mut self, i: usize, err: &StepExecutionError) -> Result<(), DraftflowError> {
        self.transition(i, StepStatus::Failed)?;
        self.assign_sequence(i);
        self.records[i].error = Some(err.message.clone());
        warn!(step = %err.step, error = %err.message, "Step failed");
        self.emit(
            event_types::STEP_FAILED,
            json!({ "step": err.step, "error": err.message }),
        );
        self.publish_absent(i)
    }

    fn skip_unlaunched(&mut self, i: usize, reason: String) -> Result<(), DraftflowError> {
        let graph = self.graph;
        let step = graph.descriptor(i);
        self.transition(i, StepStatus::Skipped)?;
        self.assign_sequence(i);
        self.records[i].ended_at = Some(Utc::now());
        debug!(step = %step.name, reason = %reason, "Step skipped");
        self.emit(
            event_types::STEP_SKIPPED,
            json!({ "step": step.name, "reason": reason }),
        );
        self.records[i].skip_reason = Some(reason);
        self.publish_absent(i)
    }

    fn cancel_remaining(
        &mut self,
        running: &BTreeSet<usize>,
        reason: Option<String>,
    ) -> Result<(), DraftflowError> {
        self.cancelled = true;
        let reason = reason.unwrap_or_else(|| CANCELLED.to_string());
        info!(reason = %reason, in_flight = running.len(), "Pipeline run cancelled");
        self.emit(event_types::PIPELINE_CANCELLED, json!({ "reason": reason }));

        let graph = self.graph;
        for &i in graph.topological_indices() {
            if self.records[i].is_terminal() {
                continue;
            }
            let skip_reason = if running.contains(&i) {
                self.records[i].duration_ms = self.timers[i].take().map(|t| t.elapsed_ms());
                CANCELLED_IN_FLIGHT
            } else {
                CANCELLED
            };
            self.transition(i, StepStatus::Skipped)?;
            self.assign_sequence(i);
            self.records[i].ended_at = Some(Utc::now());
            self.records[i].skip_reason = Some(skip_reason.to_string());
            self.emit(
                event_types::STEP_SKIPPED,
                json!({ "step": graph.descriptor(i).name, "reason": skip_reason }),
            );
            self.publish_absent(i)?;
        }

        self.resolved.clear();
        self.ready.clear();
        Ok(())
    }

    fn publish_absent(&mut self, i: usize) -> Result<(), DraftflowError> {
        let outputs = self
            .graph
            .descriptor(i)
            .outputs
            .iter()
            .map(|key| (key.clone(), ContextValue::Absent))
            .collect();
        self.publish(i, outputs)
    }

    /// Writes a step's outputs at once and wakes consumers whose inputs are now all resolved.
    fn publish(
        &mut self,
        i: usize,
        outputs: Vec<(String, ContextValue)>,
    ) -> Result<(), DraftflowError> {
        let graph = self.graph;
        let keys: Vec<String> = outputs.iter().map(|(k, _)| k.clone()).collect();
        self.store.publish(&graph.descriptor(i).name, outputs)?;

        for key in &keys {
            for &consumer in graph.consumer_indices(key) {
                self.unresolved[consumer] = self.unresolved[consumer].saturating_sub(1);
                if self.unresolved[consumer] == 0 {
                    self.resolved.push_back(consumer);
                }
            }
        }
        Ok(())
    }

    fn transition(&mut self, i: usize, next: StepStatus) -> Result<(), DraftflowError> {
        self.records[i]
            .advance(next)
            .map_err(|err| DraftflowError::Internal(format!("step '{}': {err}", self.records[i].step)))
    }

    fn assign_sequence(&mut self, i: usize) {
        self.records[i].sequence = Some(self.next_sequence);
        self.next_sequence += 1;
    }

    fn emit(&self, event_type: &str, mut data: serde_json::Value) {
        if !self.options.config.emit_events {
            return;
        }
        if let Some(map) = data.as_object_mut() {
            map.insert("run_id".to_string(), json!(self.run_id.to_string()));
            map.insert("pipeline".to_string(), json!(self.pipeline));
        }
        self.options.events.try_emit(event_type, Some(data));
    }
}

fn panic_message(err: JoinError) -> String {
    let payload = err.into_panic();
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    format!("step panicked: {detail}")
}
