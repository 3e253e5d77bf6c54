//! # Generation Scheduler
//!
//! ```text
//!   consumer ── request() ──────────────┐
//!      │                                ▼
//!      └──── preload() ──> [Preload Queue] ──> [Workers] ──> [World Tiers]
//!                           (nearest first)    (N threads)   (LRU per scale)
//!                                                   │
//!                                                   └──> events
//! ```
//!
//! `request` generates on the calling thread and returns the data. It never
//! waits on the queue, only on a worker already generating the same key.
//! `preload` queues the cells around a view center at the active scale and
//! returns immediately. Only cells inside the World grid are visited, and the
//! radius is capped by `max_preload_radius`. Workers start at most
//! `tick_budget` jobs between two calls to `tick`.

mod queue;
mod worker;

pub use worker::SchedulerEvent;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use atlas_core::CacheStats;
use atlas_procedural::{AbsoluteCoord, Generators, Scale, ScaleCoord};
use crossbeam_channel::{bounded, Receiver};
use parking_lot::Mutex;

use crate::config::{EngineConfig, StreamingConfig};
use crate::error::{StreamError, StreamResult};
use crate::source::WorldSource;
use crate::tiers::{WorldData, WorldTiers};
use queue::PreloadQueue;
use worker::WorkerContext;

/// Owns the cache tiers and the worker pool.
///
/// All methods take `&self`; share the scheduler behind an `Arc` to call it
/// from several threads. Dropping it shuts the workers down.
pub struct Scheduler<S: WorldSource = Generators> {
    tiers: Arc<WorldTiers<S>>,
    queue: Arc<PreloadQueue>,
    events: Receiver<SchedulerEvent>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    max_preload_radius: u32,
}

impl Scheduler<Generators> {
    /// Builds the generators from `config` and starts the workers.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Config`] for invalid settings,
    /// [`StreamError::Cache`] for a zero tier capacity and
    /// [`StreamError::Spawn`] if a worker cannot be started.
    pub fn new(config: EngineConfig) -> StreamResult<Self> {
        let generators = Generators::new(config.seed, config.generation)?;
        Self::with_source(generators, config.streaming)
    }
}

impl<S: WorldSource> Scheduler<S> {
    /// Starts a scheduler over any generation source.
    ///
    /// # Errors
    ///
    /// As [`Scheduler::new`].
    pub fn with_source(source: S, config: StreamingConfig) -> StreamResult<Self> {
        config.validate()?;
        let tiers = Arc::new(WorldTiers::new(Arc::new(source), &config)?);
        let queue = Arc::new(PreloadQueue::new(Scale::Local, config.tick_budget));
        let (sender, events) = bounded(config.event_capacity);

        let mut workers = Vec::with_capacity(config.workers);
        for index in 0..config.workers {
            let context = WorkerContext {
                tiers: Arc::clone(&tiers),
                queue: Arc::clone(&queue),
                events: sender.clone(),
            };
            let spawned = thread::Builder::new()
                .name(format!("atlas-gen-{index}"))
                .spawn(move || context.run());
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(error) => {
                    queue.close();
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(StreamError::Spawn(error));
                }
            }
        }

        tracing::info!(
            workers = config.workers,
            tick_budget = config.tick_budget,
            "scheduler started"
        );

        Ok(Self {
            tiers,
            queue,
            events,
            workers: Mutex::new(workers),
            max_preload_radius: config.max_preload_radius,
        })
    }

    /// Returns the data at `coord`, generating it on this thread on a miss.
    ///
    /// A miss also queues the eight surrounding cells for the workers.
    ///
    /// # Errors
    ///
    /// - [`StreamError::ShutDown`] after [`Scheduler::shutdown`]
    /// - [`StreamError::Generation`] if `coord` lies outside the World grid
    /// - [`StreamError::WorkerPanicked`] if generation panicked
    pub fn request(&self, coord: ScaleCoord) -> StreamResult<WorldData> {
        if !self.queue.is_running() {
            return Err(StreamError::ShutDown);
        }

        let missed = !self.tiers.is_known(coord);
        let data = match panic::catch_unwind(AssertUnwindSafe(|| self.tiers.get(coord))) {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(?coord, "generation panicked on request path");
                return Err(StreamError::WorkerPanicked { job: coord });
            }
        };

        if missed {
            let neighbors = self
                .cells_around(coord, 1)
                .into_iter()
                .filter(|&(cell, distance)| distance > 0 && self.wanted(cell));
            let queued = self.queue.push_neighbors(neighbors);
            tracing::trace!(?coord, queued, "queued neighbors of miss");
        }
        Ok(data)
    }

    /// Queues every cell within `radius` of `center` at the active scale
    /// that is not yet cached, nearest first.
    ///
    /// Cells queued by an earlier preload and not yet started are dropped.
    /// Cells outside the World grid are never visited, and `radius` is
    /// capped at `max_preload_radius`. The tick budget is left alone; call
    /// [`Scheduler::tick`] once per frame to refill it.
    ///
    /// # Returns
    ///
    /// Number of cells queued.
    pub fn preload(&self, center: AbsoluteCoord, radius: u32) -> usize {
        let cell = ScaleCoord::from_absolute(center, self.queue.active());
        let radius = radius.min(self.max_preload_radius);
        let cells: Vec<(ScaleCoord, i64)> = self
            .cells_around(cell, i64::from(radius))
            .into_iter()
            .filter(|&(c, _)| self.wanted(c))
            .collect();
        let queued = self.queue.replace_preload(cells);
        tracing::debug!(?cell, radius, queued, "preload");
        queued
    }

    /// Starts a new tick: workers may start another `tick_budget` jobs.
    ///
    /// This is the only call that refills the budget, so background work
    /// stays at `tick_budget` per frame however often `preload` runs.
    pub fn tick(&self) {
        self.queue.refill();
    }

    /// Serves queued cells of `scale` first from now on.
    pub fn change_scale(&self, scale: Scale) {
        tracing::debug!(scale = scale.name(), "active scale changed");
        self.queue.set_active(scale);
    }

    /// Scale that preloads target and the queue favors.
    #[must_use]
    pub fn active_scale(&self) -> Scale {
        self.queue.active()
    }

    /// Number of cells waiting in the queue.
    #[must_use]
    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    /// Counters of the tier for `scale`.
    #[must_use]
    pub fn cache_stats(&self, scale: Scale) -> CacheStats {
        self.tiers.stats(scale)
    }

    /// The cache tiers.
    #[must_use]
    pub fn tiers(&self) -> &WorldTiers<S> {
        &self.tiers
    }

    /// Takes every event reported by the workers since the last call.
    #[must_use]
    pub fn drain_events(&self) -> Vec<SchedulerEvent> {
        self.events.try_iter().collect()
    }

    /// Blocks until no worker is busy and no job can start before the next
    /// tick. Returns false if `timeout` elapsed first.
    #[must_use]
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.queue.wait_settled(timeout)
    }

    /// Stops the workers. Jobs already running finish and populate the
    /// cache; queued jobs are dropped. Later requests fail with
    /// [`StreamError::ShutDown`].
    pub fn shutdown(&self) {
        self.queue.close();
        let handles = std::mem::take(&mut *self.workers.lock());
        if handles.is_empty() {
            return;
        }
        for handle in handles {
            if handle.join().is_err() {
                tracing::warn!("generation worker exited by panic");
            }
        }
        tracing::info!("scheduler stopped");
    }

    /// True if `cell` is not already cached or in flight.
    fn wanted(&self, cell: ScaleCoord) -> bool {
        !self.tiers.is_known(cell)
    }

    /// Cells within Chebyshev `radius` of `center` that lie inside the World
    /// grid, with their distance. The square is clipped before it is walked.
    fn cells_around(&self, center: ScaleCoord, radius: i64) -> Vec<(ScaleCoord, i64)> {
        let scale = center.scale();
        let (width, height) = self.tiers.source().shape().cells(scale);
        let (cx, cy) = center.xy();

        let (min_x, max_x) = ((cx - radius).max(0), (cx + radius).min(width - 1));
        let (min_y, max_y) = ((cy - radius).max(0), (cy + radius).min(height - 1));

        let mut cells = Vec::new();
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let distance = (x - cx).abs().max((y - cy).abs());
                cells.push((ScaleCoord::at(scale, x, y), distance));
            }
        }
        cells
    }
}

impl<S: WorldSource> Drop for Scheduler<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
