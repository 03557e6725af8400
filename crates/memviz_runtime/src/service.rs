//! Replay orchestration.
//!
//! Each mutating operation runs as one unit under the replay's lock:
//! load, apply the transition, drain the raised events, persist, publish.
//! A refused transition leaves storage untouched and publishes nothing.

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::locks::LockRegistry;
use crate::stream::{self, StepStream};
use memviz_core::ReplayId;
use memviz_log::{BroadcastPublisher, CompositePublisher, EventPublisher, ReplayEvent, TracingPublisher};
use memviz_replay::{Operation, Recording, ReplayAggregate, ReplayResult, ReplayView, SimulationStep};
use memviz_storage::{ReplayRepository, StoreStats};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Orchestrator for replay operations
#[derive(Clone)]
pub struct ReplayService {
    repository: Arc<dyn ReplayRepository>,
    broadcast: BroadcastPublisher,
    publisher: Arc<dyn EventPublisher>,
    locks: Arc<LockRegistry>,
    config: Arc<ServiceConfig>,
}

impl ReplayService {
    /// Create over an existing repository
    ///
    /// Events go to a broadcast channel (see [`subscribe`](Self::subscribe))
    /// and to the tracing log.
    #[must_use]
    pub fn new(repository: Arc<dyn ReplayRepository>, config: ServiceConfig) -> Self {
        let broadcast = BroadcastPublisher::new(config.event_channel_capacity);
        let publisher = CompositePublisher::new()
            .with(Arc::new(broadcast.clone()))
            .with(Arc::new(TracingPublisher));

        Self {
            repository,
            broadcast,
            publisher: Arc::new(publisher),
            locks: Arc::new(LockRegistry::new()),
            config: Arc::new(config),
        }
    }

    /// Open the configured store and create a service over it
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the store cannot be
    /// opened
    pub async fn open(config: ServiceConfig) -> ServiceResult<Self> {
        config
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))?;
        let repository = memviz_storage::open(&config.store)
            .await
            .map_err(|e| ServiceError::Unexpected {
                reason: e.to_string(),
            })?;
        Ok(Self::new(repository, config))
    }

    /// Also publish events to `publisher`
    #[must_use]
    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        let composite = CompositePublisher::new()
            .with(self.publisher)
            .with(publisher);
        self.publisher = Arc::new(composite);
        self
    }

    /// Receive every event published from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ReplayEvent> {
        self.broadcast.subscribe()
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Repository counters
    pub async fn store_stats(&self) -> StoreStats {
        self.repository.stats().await
    }

    /// Store a new `Ready` replay built from a recording
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank or oversized source or language
    /// and malformed steps, or a persistence failure
    pub async fn create(&self, recording: Recording) -> ServiceResult<ReplayView> {
        self.validate_recording(&recording)?;

        let replay = recording.into_aggregate().map_err(ServiceError::from)?;
        let id = replay.id();
        self.repository
            .save(&replay)
            .await
            .map_err(|e| self.persist_failed(id, e))?;

        tracing::info!(
            replay_id = %id,
            language = replay.language(),
            total_steps = replay.total_steps(),
            "replay created"
        );
        Ok(ReplayView::of(&replay))
    }

    /// Current view of a replay
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for an unknown ID
    pub async fn get(&self, id: ReplayId) -> ServiceResult<ReplayView> {
        let replay = self.load(id).await?;
        Ok(ReplayView::of(&replay))
    }

    /// The full step at the replay's current index
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for an unknown ID
    pub async fn current_step(&self, id: ReplayId) -> ServiceResult<Option<SimulationStep>> {
        let replay = self.load(id).await?;
        Ok(replay.current_step().cloned())
    }

    /// Views of every stored replay, oldest first
    ///
    /// # Errors
    ///
    /// Returns error if the repository cannot be read
    pub async fn list(&self) -> ServiceResult<Vec<ReplayView>> {
        let all = self
            .repository
            .list_all()
            .await
            .map_err(ServiceError::from_load)?;
        Ok(all.iter().map(ReplayView::of).collect())
    }

    /// Remove a replay
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for an unknown ID
    pub async fn delete(&self, id: ReplayId) -> ServiceResult<()> {
        {
            let _guard = self.locks.acquire(id).await;
            self.repository
                .delete(id)
                .await
                .map_err(|e| self.persist_failed(id, e))?;
        }
        self.locks.prune().await;
        tracing::info!(replay_id = %id, "replay deleted");
        Ok(())
    }

    /// Begin at the first step
    ///
    /// # Errors
    ///
    /// Returns the replay's refusal, or a load or persistence failure
    pub async fn start(&self, id: ReplayId) -> ServiceResult<ReplayView> {
        self.execute(id, Operation::Start, ReplayAggregate::start).await
    }

    /// Advance one step, completing at the last step
    ///
    /// # Errors
    ///
    /// Returns the replay's refusal, or a load or persistence failure
    pub async fn step_forward(&self, id: ReplayId) -> ServiceResult<ReplayView> {
        self.execute(id, Operation::StepForward, ReplayAggregate::step_forward)
            .await
    }

    /// Go back one step
    ///
    /// # Errors
    ///
    /// Returns the replay's refusal, or a load or persistence failure
    pub async fn step_backward(&self, id: ReplayId) -> ServiceResult<ReplayView> {
        self.execute(id, Operation::StepBackward, ReplayAggregate::step_backward)
            .await
    }

    /// Suspend
    ///
    /// # Errors
    ///
    /// Returns the replay's refusal, or a load or persistence failure
    pub async fn pause(&self, id: ReplayId) -> ServiceResult<ReplayView> {
        self.execute(id, Operation::Pause, ReplayAggregate::pause).await
    }

    /// Continue after a pause
    ///
    /// # Errors
    ///
    /// Returns the replay's refusal, or a load or persistence failure
    pub async fn resume(&self, id: ReplayId) -> ServiceResult<ReplayView> {
        self.execute(id, Operation::Resume, ReplayAggregate::resume).await
    }

    /// Rewind to a startable state
    ///
    /// # Errors
    ///
    /// Returns a load or persistence failure
    pub async fn reset(&self, id: ReplayId) -> ServiceResult<ReplayView> {
        self.execute(id, Operation::Reset, ReplayAggregate::reset).await
    }

    /// Stop with an error
    ///
    /// # Errors
    ///
    /// Returns a load or persistence failure
    pub async fn set_error(
        &self,
        id: ReplayId,
        message: impl Into<String>,
    ) -> ServiceResult<ReplayView> {
        let message = message.into();
        self.execute(id, Operation::SetError, move |replay| {
            replay.set_error(message)
        })
        .await
    }

    /// Jump to `index`, starting the replay if needed
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::IndexOutOfRange`] for a bad index, or a load
    /// or persistence failure
    pub async fn go_to_step(&self, id: ReplayId, index: i64) -> ServiceResult<ReplayView> {
        self.execute(id, Operation::GoToStep, move |replay| {
            replay.go_to_step(index)
        })
        .await
    }

    /// Advance the replay to its end, yielding each step
    ///
    /// The current step comes first if the replay is positioned. The stream
    /// checks `cancel` before every step and ends quietly if the replay
    /// cannot be loaded.
    #[must_use]
    pub fn stream_steps(&self, id: ReplayId, cancel: CancellationToken) -> StepStream {
        stream::step_stream(self.clone(), id, cancel)
    }

    /// One forward step for the streaming coordinator
    ///
    /// Returns `None` once the replay is on its last step.
    pub(crate) async fn advance(&self, id: ReplayId) -> ServiceResult<Option<SimulationStep>> {
        let _guard = self.locks.acquire(id).await;
        let mut replay = self.load(id).await?;

        let last = replay.total_steps() as i64 - 1;
        if replay.current_step_index() >= last {
            return Ok(None);
        }

        replay.step_forward()?;
        self.commit(&mut replay, Operation::StepForward).await?;
        Ok(replay.current_step().cloned())
    }

    async fn execute<F>(&self, id: ReplayId, op: Operation, transition: F) -> ServiceResult<ReplayView>
    where
        F: FnOnce(&mut ReplayAggregate) -> ReplayResult<Vec<ReplayEvent>> + Send,
    {
        let _guard = self.locks.acquire(id).await;
        let mut replay = self.load(id).await?;

        if let Err(err) = transition(&mut replay) {
            tracing::warn!(
                replay_id = %id,
                operation = %op,
                status = %replay.status(),
                error = %err,
                "replay operation refused"
            );
            return Err(err.into());
        }

        let events = self.commit(&mut replay, op).await?;
        Ok(ReplayView::of(&replay).with_events(events))
    }

    /// Drain, persist, then publish
    async fn commit(
        &self,
        replay: &mut ReplayAggregate,
        op: Operation,
    ) -> ServiceResult<Vec<ReplayEvent>> {
        let events = replay.drain_events();
        self.repository
            .update(replay)
            .await
            .map_err(|e| self.persist_failed(replay.id(), e))?;
        self.publisher.publish(&events).await;

        tracing::info!(
            replay_id = %replay.id(),
            operation = %op,
            status = %replay.status(),
            index = replay.current_step_index(),
            events = events.len(),
            "replay operation applied"
        );
        Ok(events)
    }

    async fn load(&self, id: ReplayId) -> ServiceResult<ReplayAggregate> {
        self.repository
            .get_by_id(id)
            .await
            .map_err(ServiceError::from_load)
    }

    fn persist_failed(&self, id: ReplayId, err: memviz_storage::StoreError) -> ServiceError {
        let err = ServiceError::from_persist(id, err);
        if matches!(err, ServiceError::PersistenceFailure { .. }) {
            tracing::error!(replay_id = %id, error = %err, "replay persistence failed");
        }
        err
    }

    fn validate_recording(&self, recording: &Recording) -> ServiceResult<()> {
        let language = recording.language.trim();
        if language.is_empty() {
            return Err(ServiceError::validation("language is required"));
        }
        if language.chars().count() > self.config.max_language_len {
            return Err(ServiceError::validation(format!(
                "language must not exceed {} characters",
                self.config.max_language_len
            )));
        }
        if recording.source.trim().is_empty() {
            return Err(ServiceError::validation("source code is required"));
        }
        if recording.source.chars().count() > self.config.max_source_len {
            return Err(ServiceError::validation(format!(
                "source code must not exceed {} characters",
                self.config.max_source_len
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ReplayService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayService")
            .field("config", &self.config)
            .field("subscribers", &self.broadcast.subscriber_count())
            .finish_non_exhaustive()
    }
}
