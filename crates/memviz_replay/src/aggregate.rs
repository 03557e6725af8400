//! The replay aggregate.
//!
//! [`ReplayAggregate`] is the consistency boundary for one replay: it owns
//! the step sequence, the cursor, and the lifecycle status. Every mutating
//! operation is checked against [`status::check`], either succeeds
//! completely or leaves the aggregate untouched, and returns the events it
//! raised. The same events are also appended to the pending log, which only
//! [`ReplayAggregate::drain_events`] empties.

use crate::cursor::StepCursor;
use crate::error::{ReplayError, ReplayResult};
use crate::sequence::StepSequence;
use crate::status::{self, Operation, ReplayStatus};
use crate::step::SimulationStep;
use memviz_core::{Duration, ReplayId, Timestamp};
use memviz_log::{CompletionStatus, EventLog, ReplayEvent, ReplayEventKind};
use serde::{Deserialize, Serialize};

/// A replay of one recorded program execution
///
/// Loading rebuilds the step sequence through [`StepSequence::append`] and
/// rejects a blank source or language, or an index past the last step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AggregateRecord", into = "AggregateRecord")]
pub struct ReplayAggregate {
    id: ReplayId,
    source: String,
    language: String,
    status: ReplayStatus,
    cursor: StepCursor,
    has_started: bool,
    created_at: Timestamp,
    started_at: Option<Timestamp>,
    completed_at: Option<Timestamp>,
    error_message: Option<String>,
    steps: StepSequence,
    events: EventLog,
}

/// Stored form of [`ReplayAggregate`]; pending events are not persisted
#[derive(Serialize, Deserialize)]
struct AggregateRecord {
    id: ReplayId,
    source: String,
    language: String,
    status: ReplayStatus,
    current_step_index: StepCursor,
    has_started: bool,
    created_at: Timestamp,
    started_at: Option<Timestamp>,
    completed_at: Option<Timestamp>,
    error_message: Option<String>,
    steps: Vec<SimulationStep>,
}

impl TryFrom<AggregateRecord> for ReplayAggregate {
    type Error = ReplayError;

    fn try_from(record: AggregateRecord) -> Result<Self, Self::Error> {
        let mut agg = Self::new(record.source, record.language)?;

        for step in record.steps {
            agg.steps.append(step)?;
        }
        if let Some(position) = record.current_step_index.position() {
            if position >= agg.steps.len() {
                return Err(ReplayError::IndexOutOfRange {
                    index: record.current_step_index.index(),
                    total: agg.steps.len(),
                });
            }
        }

        agg.id = record.id;
        agg.status = record.status;
        agg.cursor = record.current_step_index;
        agg.has_started = record.has_started;
        agg.created_at = record.created_at;
        agg.started_at = record.started_at;
        agg.completed_at = record.completed_at;
        agg.error_message = record.error_message;
        Ok(agg)
    }
}

impl From<ReplayAggregate> for AggregateRecord {
    fn from(agg: ReplayAggregate) -> Self {
        Self {
            id: agg.id,
            source: agg.source,
            language: agg.language,
            status: agg.status,
            current_step_index: agg.cursor,
            has_started: agg.has_started,
            created_at: agg.created_at,
            started_at: agg.started_at,
            completed_at: agg.completed_at,
            error_message: agg.error_message,
            steps: agg.steps.as_slice().to_vec(),
        }
    }
}

impl ReplayAggregate {
    /// Create an empty replay in the `Ready` status
    ///
    /// # Errors
    ///
    /// Returns error if the source or language is blank
    pub fn new(source: impl Into<String>, language: impl Into<String>) -> ReplayResult<Self> {
        let source = source.into();
        let language = language.into();
        if source.trim().is_empty() {
            return Err(ReplayError::validation("source code cannot be empty"));
        }
        if language.trim().is_empty() {
            return Err(ReplayError::validation("language cannot be empty"));
        }

        Ok(Self {
            id: ReplayId::new(),
            source,
            language,
            status: ReplayStatus::Ready,
            cursor: StepCursor::new(),
            has_started: false,
            created_at: Timestamp::now(),
            started_at: None,
            completed_at: None,
            error_message: None,
            steps: StepSequence::new(),
            events: EventLog::new(),
        })
    }

    /// Builder form of [`add_step`](Self::add_step)
    ///
    /// # Errors
    ///
    /// Same as [`add_step`](Self::add_step)
    pub fn with_step(mut self, step: SimulationStep) -> ReplayResult<Self> {
        self.add_step(step)?;
        Ok(self)
    }

    /// Append a step to the sequence
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::SequenceClosed`] once the replay is completed,
    /// or a validation error for a malformed or out-of-order step
    pub fn add_step(&mut self, step: SimulationStep) -> ReplayResult<()> {
        status::check(self.status, Operation::AppendStep)?;
        self.steps.append(step)
    }

    /// Begin at the first step
    ///
    /// # Errors
    ///
    /// Returns error unless the status is `Ready` or `Reset` and there is at
    /// least one step
    pub fn start(&mut self) -> ReplayResult<Vec<ReplayEvent>> {
        status::check(self.status, Operation::Start)?;
        if self.steps.is_empty() {
            return Err(ReplayError::EmptySequence);
        }

        self.cursor.seek(0);
        self.status = ReplayStatus::Running;
        self.started_at = Some(Timestamp::now());
        self.has_started = true;

        let started = self.started_event();
        Ok(self.raise(vec![started]))
    }

    /// Advance one step, completing the replay at the last step
    ///
    /// # Errors
    ///
    /// Returns error unless the status is `Running` or `Paused`
    pub fn step_forward(&mut self) -> ReplayResult<Vec<ReplayEvent>> {
        status::check(self.status, Operation::StepForward)?;

        let at_last = match (self.cursor.position(), self.steps.last_index()) {
            (Some(pos), Some(last)) => pos >= last,
            (None, Some(_)) => false,
            (_, None) => true,
        };
        if at_last {
            return self.complete();
        }

        self.cursor.move_forward();
        self.status = ReplayStatus::Running;
        let events = self.step_event().into_iter().collect();
        Ok(self.raise(events))
    }

    /// Go back one step
    ///
    /// Never raises an event.
    ///
    /// # Errors
    ///
    /// Returns error unless the status is `Running` or `Paused`, or
    /// [`ReplayError::AtFirstStep`] at index 0
    pub fn step_backward(&mut self) -> ReplayResult<Vec<ReplayEvent>> {
        status::check(self.status, Operation::StepBackward)?;
        if self.cursor.index() <= 0 {
            return Err(ReplayError::AtFirstStep);
        }

        self.cursor.move_backward();
        self.status = ReplayStatus::Running;
        Ok(Vec::new())
    }

    /// Suspend a running replay
    ///
    /// # Errors
    ///
    /// Returns error unless the status is `Running`
    pub fn pause(&mut self) -> ReplayResult<Vec<ReplayEvent>> {
        status::check(self.status, Operation::Pause)?;
        self.status = ReplayStatus::Paused;
        Ok(Vec::new())
    }

    /// Continue a paused replay
    ///
    /// # Errors
    ///
    /// Returns error unless the status is `Paused`
    pub fn resume(&mut self) -> ReplayResult<Vec<ReplayEvent>> {
        status::check(self.status, Operation::Resume)?;
        self.status = ReplayStatus::Running;
        Ok(Vec::new())
    }

    /// Finish the replay
    ///
    /// A no-op returning no events when already completed.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the signature matches the other transitions
    pub fn complete(&mut self) -> ReplayResult<Vec<ReplayEvent>> {
        if self.status == ReplayStatus::Completed {
            return Ok(Vec::new());
        }
        status::check(self.status, Operation::Complete)?;

        self.status = ReplayStatus::Completed;
        self.completed_at = Some(Timestamp::now());

        let completed = self.completed_event(CompletionStatus::Completed);
        Ok(self.raise(vec![completed]))
    }

    /// Stop the replay with an error
    ///
    /// # Errors
    ///
    /// Never fails; allowed from every status
    pub fn set_error(&mut self, message: impl Into<String>) -> ReplayResult<Vec<ReplayEvent>> {
        status::check(self.status, Operation::SetError)?;

        self.status = ReplayStatus::Error;
        self.error_message = Some(message.into());
        self.completed_at = Some(Timestamp::now());

        let completed = self.completed_event(CompletionStatus::Error);
        Ok(self.raise(vec![completed]))
    }

    /// Rewind to a startable state
    ///
    /// Clears the position, the start and completion times, and the error
    /// message. Steps are kept.
    ///
    /// # Errors
    ///
    /// Never fails; allowed from every status
    pub fn reset(&mut self) -> ReplayResult<Vec<ReplayEvent>> {
        status::check(self.status, Operation::Reset)?;

        self.status = ReplayStatus::Reset;
        self.cursor.reset();
        self.started_at = None;
        self.completed_at = None;
        self.error_message = None;
        Ok(Vec::new())
    }

    /// Jump to `index`
    ///
    /// From `Ready` or `Reset` this also starts the replay. `Started` is
    /// raised only the first time the replay ever starts.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::IndexOutOfRange`] when `index` is not a valid
    /// step index
    pub fn go_to_step(&mut self, index: i64) -> ReplayResult<Vec<ReplayEvent>> {
        status::check(self.status, Operation::GoToStep)?;
        let position = self.steps.step_at(index).map(|_| index as usize)?;

        let mut events = Vec::with_capacity(2);
        self.cursor.seek(position);

        if self.status.is_startable() {
            self.status = ReplayStatus::Running;
            if self.started_at.is_none() {
                self.started_at = Some(Timestamp::now());
            }
            if !self.has_started {
                self.has_started = true;
                events.push(self.started_event());
            }
        }

        events.extend(self.step_event());
        Ok(self.raise(events))
    }

    /// Take every pending event
    pub fn drain_events(&mut self) -> Vec<ReplayEvent> {
        self.events.drain()
    }

    /// Events raised but not yet drained
    #[must_use]
    pub fn pending_events(&self) -> &[ReplayEvent] {
        self.events.pending()
    }

    fn raise(&mut self, events: Vec<ReplayEvent>) -> Vec<ReplayEvent> {
        for event in &events {
            self.events.record(event.clone());
        }
        events
    }

    fn started_event(&self) -> ReplayEvent {
        ReplayEvent::new(
            self.id,
            ReplayEventKind::Started {
                language: self.language.clone(),
                total_steps: self.steps.len(),
            },
        )
    }

    fn step_event(&self) -> Option<ReplayEvent> {
        let step = self.current_step()?;
        Some(ReplayEvent::new(
            self.id,
            ReplayEventKind::StepCompleted {
                step_number: step.step_number(),
                line: step.line(),
                operation: step.operation(),
                description: step.description().to_string(),
                frame_count: step.frames().len(),
                heap_count: step.heap().len(),
                pointer_count: step.pointers().len(),
            },
        ))
    }

    fn completed_event(&self, status: CompletionStatus) -> ReplayEvent {
        ReplayEvent::new(
            self.id,
            ReplayEventKind::Completed {
                status,
                execution_time: self.execution_time(),
                steps_executed: self.steps_executed(),
                error_message: self.error_message.clone(),
            },
        )
    }

    /// Replay ID
    #[must_use]
    pub fn id(&self) -> ReplayId {
        self.id
    }

    /// Program source text
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Source language tag
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Lifecycle status
    #[must_use]
    pub fn status(&self) -> ReplayStatus {
        self.status
    }

    /// Current step index, `-1` when not positioned
    #[must_use]
    pub fn current_step_index(&self) -> i64 {
        self.cursor.index()
    }

    /// Number of steps
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// The step at the current index
    #[must_use]
    pub fn current_step(&self) -> Option<&SimulationStep> {
        self.cursor.position().and_then(|p| self.steps.get(p))
    }

    /// All steps
    #[must_use]
    pub fn steps(&self) -> &StepSequence {
        &self.steps
    }

    /// Whether the replay has ever left `Ready`/`Reset` through a start
    #[must_use]
    pub fn has_started(&self) -> bool {
        self.has_started
    }

    /// Creation time
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Start time, cleared by reset
    #[must_use]
    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    /// Completion time, cleared by reset
    #[must_use]
    pub fn completed_at(&self) -> Option<Timestamp> {
        self.completed_at
    }

    /// Error message in the `Error` status
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Completion time minus start time; zero unless both are set
    #[must_use]
    pub fn execution_time(&self) -> Duration {
        match (self.started_at, self.completed_at) {
            (Some(started), Some(completed)) => completed.duration_since(&started),
            _ => Duration::zero(),
        }
    }

    /// Steps visited so far, `max(0, index + 1)`
    #[must_use]
    pub fn steps_executed(&self) -> usize {
        self.cursor.position().map_or(0, |p| p + 1)
    }
}
