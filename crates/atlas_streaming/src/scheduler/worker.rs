//! Background generation workers.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use atlas_procedural::ScaleCoord;
use crossbeam_channel::Sender;

use super::queue::PreloadQueue;
use crate::source::WorldSource;
use crate::tiers::WorldTiers;

/// Outcome of one background job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// A worker generated and cached `coord`.
    Generated {
        /// Coordinate generated.
        coord: ScaleCoord,
        /// Wall-clock generation time.
        elapsed: Duration,
    },
    /// A worker failed to generate `coord`; it stays absent.
    Failed {
        /// Coordinate that failed.
        coord: ScaleCoord,
        /// What went wrong.
        reason: String,
    },
}

/// State a worker needs, shared with the scheduler.
pub(crate) struct WorkerContext<S> {
    pub(crate) tiers: Arc<WorldTiers<S>>,
    pub(crate) queue: Arc<PreloadQueue>,
    pub(crate) events: Sender<SchedulerEvent>,
}

impl<S: WorldSource> WorkerContext<S> {
    /// Worker main loop. Returns when the queue closes.
    pub(crate) fn run(&self) {
        while let Some(coord) = self.queue.next() {
            // Report before finishing so a settled queue has every event sent
            if let Some(event) = self.generate(coord) {
                // Events are diagnostics; drop them when nobody drains
                let _ = self.events.try_send(event);
            }
            self.queue.finish();
        }
    }

    fn generate(&self, coord: ScaleCoord) -> Option<SchedulerEvent> {
        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.tiers.fill(coord)));

        match outcome {
            Ok(Ok(true)) => {
                let elapsed = started.elapsed();
                tracing::trace!(?coord, ?elapsed, "background generation");
                Some(SchedulerEvent::Generated { coord, elapsed })
            }
            Ok(Ok(false)) => None,
            Ok(Err(error)) => {
                tracing::warn!(?coord, %error, "background generation failed");
                Some(SchedulerEvent::Failed {
                    coord,
                    reason: error.to_string(),
                })
            }
            Err(_) => {
                tracing::warn!(?coord, "background generation panicked");
                Some(SchedulerEvent::Failed {
                    coord,
                    reason: "generation panicked".to_string(),
                })
            }
        }
    }
}
