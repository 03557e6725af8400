//! Progressive step delivery.
//!
//! A [`StepStream`] is lazy and forward-only. Each poll re-reads the replay
//! from storage, so restarting a stream picks up wherever the stored replay
//! currently is. Cancellation is observed between steps, never inside one.

use crate::error::ServiceError;
use crate::service::ReplayService;
use futures::stream::{self, BoxStream, StreamExt};
use memviz_core::ReplayId;
use memviz_replay::SimulationStep;
use tokio_util::sync::CancellationToken;

/// Lazy sequence of steps produced by advancing a replay
pub type StepStream = BoxStream<'static, SimulationStep>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Initial,
    Advancing,
    Finished,
}

struct StreamState {
    service: ReplayService,
    id: ReplayId,
    cancel: CancellationToken,
    phase: Phase,
    delivered: usize,
}

impl StreamState {
    fn finish(&mut self, reason: &'static str) {
        tracing::info!(
            replay_id = %self.id,
            delivered = self.delivered,
            reason,
            "step stream finished"
        );
        self.phase = Phase::Finished;
    }

    /// Yield the already-current step, if any
    async fn initial(&mut self) -> Option<SimulationStep> {
        self.phase = Phase::Advancing;
        match self.service.current_step(self.id).await {
            Ok(step) => step,
            Err(err) => {
                tracing::debug!(replay_id = %self.id, error = %err, "step stream could not load replay");
                self.phase = Phase::Finished;
                None
            }
        }
    }

    async fn pace(&self) -> bool {
        let delay = self.service.config().stream_delay();
        if self.delivered == 0 || delay.is_zero() {
            return true;
        }
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }

    async fn next_step(&mut self) -> Option<SimulationStep> {
        loop {
            if self.cancel.is_cancelled() {
                self.finish("cancelled");
                return None;
            }

            match self.phase {
                Phase::Finished => return None,
                Phase::Initial => {
                    if let Some(step) = self.initial().await {
                        self.delivered += 1;
                        return Some(step);
                    }
                }
                Phase::Advancing => {
                    if !self.pace().await {
                        self.finish("cancelled");
                        return None;
                    }
                    return match self.service.advance(self.id).await {
                        Ok(Some(step)) => {
                            self.delivered += 1;
                            Some(step)
                        }
                        Ok(None) => {
                            self.finish("reached last step");
                            None
                        }
                        Err(err) => {
                            self.stop_on(&err);
                            None
                        }
                    };
                }
            }
        }
    }

    fn stop_on(&mut self, err: &ServiceError) {
        match err {
            ServiceError::NotFound { .. } | ServiceError::Unexpected { .. } => {
                tracing::debug!(replay_id = %self.id, error = %err, "step stream could not load replay");
            }
            ServiceError::PersistenceFailure { .. } => {
                tracing::error!(replay_id = %self.id, error = %err, "step stream stopped");
            }
            _ => {
                tracing::warn!(replay_id = %self.id, error = %err, "step stream stopped");
            }
        }
        self.phase = Phase::Finished;
    }
}

pub(crate) fn step_stream(
    service: ReplayService,
    id: ReplayId,
    cancel: CancellationToken,
) -> StepStream {
    let state = StreamState {
        service,
        id,
        cancel,
        phase: Phase::Initial,
        delivered: 0,
    };

    stream::unfold(state, |mut state| async move {
        let step = state.next_step().await?;
        Some((step, state))
    })
    .boxed()
}
