//! Nearest-first preload queue shared by the workers.
//!
//! Workers draw from the queue only while the tick budget lasts. The budget
//! starts full and is refilled only by `tick`, which caps background work per
//! frame.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::time::{Duration, Instant};

use atlas_procedural::{Scale, ScaleCoord};
use parking_lot::{Condvar, Mutex};

/// Why a coordinate was queued. Explicit preloads win ties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Origin {
    Preload,
    Neighbor,
}

/// A queued coordinate with its ordering key.
#[derive(Clone, Copy, Debug)]
struct Ticket {
    coord: ScaleCoord,
    distance: i64,
    origin: Origin,
    seq: u64,
}

impl Ticket {
    /// Lower ranks are served first.
    fn rank(&self, active: Scale) -> (bool, i64, Origin, u64) {
        (self.coord.scale() != active, self.distance, self.origin, self.seq)
    }
}

/// Heap entry ordered for the active scale at the time it was pushed.
#[derive(Debug)]
struct Ranked {
    rank: (bool, i64, Origin, u64),
    ticket: Ticket,
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.rank == other.rank
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    // Reversed: BinaryHeap pops the greatest, we want the lowest rank
    fn cmp(&self, other: &Self) -> Ordering {
        other.rank.cmp(&self.rank)
    }
}

struct QueueState {
    heap: BinaryHeap<Ranked>,
    queued: HashSet<ScaleCoord>,
    active: Scale,
    budget: usize,
    in_flight: usize,
    running: bool,
    seq: u64,
}

impl QueueState {
    fn push(&mut self, coord: ScaleCoord, distance: i64, origin: Origin) -> bool {
        if !self.queued.insert(coord) {
            return false;
        }
        let ticket = Ticket {
            coord,
            distance,
            origin,
            seq: self.seq,
        };
        self.seq += 1;
        self.heap.push(Ranked {
            rank: ticket.rank(self.active),
            ticket,
        });
        true
    }

    fn rerank(&mut self) {
        let active = self.active;
        let tickets: Vec<Ticket> = self.heap.drain().map(|r| r.ticket).collect();
        self.heap = tickets
            .into_iter()
            .map(|ticket| Ranked {
                rank: ticket.rank(active),
                ticket,
            })
            .collect();
    }

    fn is_settled(&self) -> bool {
        self.in_flight == 0 && (self.heap.is_empty() || self.budget == 0 || !self.running)
    }
}

/// Shared queue with a per-tick budget.
pub(crate) struct PreloadQueue {
    state: Mutex<QueueState>,
    /// Signalled when work or budget arrives, or on shutdown.
    available: Condvar,
    /// Signalled when the queue may have settled.
    settled: Condvar,
    tick_budget: usize,
}

impl PreloadQueue {
    pub(crate) fn new(active: Scale, tick_budget: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                heap: BinaryHeap::new(),
                queued: HashSet::new(),
                active,
                budget: tick_budget,
                in_flight: 0,
                running: true,
                seq: 0,
            }),
            available: Condvar::new(),
            settled: Condvar::new(),
            tick_budget,
        }
    }

    /// Replaces queued preload entries with `cells`. The budget is untouched.
    ///
    /// Neighbor entries from earlier misses are kept.
    ///
    /// # Returns
    ///
    /// Number of cells newly queued.
    pub(crate) fn replace_preload(&self, cells: impl IntoIterator<Item = (ScaleCoord, i64)>) -> usize {
        let mut state = self.state.lock();
        if !state.running {
            return 0;
        }

        let kept: Vec<Ticket> = state
            .heap
            .drain()
            .map(|r| r.ticket)
            .filter(|t| t.origin == Origin::Neighbor)
            .collect();
        state.queued = kept.iter().map(|t| t.coord).collect();
        let active = state.active;
        state.heap = kept
            .into_iter()
            .map(|ticket| Ranked {
                rank: ticket.rank(active),
                ticket,
            })
            .collect();

        let mut added = 0;
        for (coord, distance) in cells {
            if state.push(coord, distance, Origin::Preload) {
                added += 1;
            }
        }
        drop(state);
        self.available.notify_all();
        added
    }

    /// Queues coordinates behind explicit preloads of the same distance.
    pub(crate) fn push_neighbors(&self, cells: impl IntoIterator<Item = (ScaleCoord, i64)>) -> usize {
        let mut state = self.state.lock();
        if !state.running {
            return 0;
        }
        let added = cells
            .into_iter()
            .filter(|&(coord, distance)| state.push(coord, distance, Origin::Neighbor))
            .count();
        drop(state);
        if added > 0 {
            self.available.notify_all();
        }
        added
    }

    /// Refills the budget for a new tick.
    pub(crate) fn refill(&self) {
        self.state.lock().budget = self.tick_budget;
        self.available.notify_all();
    }

    /// Reorders queued entries so `scale` is served first.
    pub(crate) fn set_active(&self, scale: Scale) {
        let mut state = self.state.lock();
        if state.active != scale {
            state.active = scale;
            state.rerank();
        }
    }

    pub(crate) fn active(&self) -> Scale {
        self.state.lock().active
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().heap.len()
    }

    pub(crate) fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// Blocks until a job may start. `None` once the queue is closed.
    pub(crate) fn next(&self) -> Option<ScaleCoord> {
        let mut state = self.state.lock();
        loop {
            if !state.running {
                return None;
            }
            if state.budget > 0 {
                if let Some(ranked) = state.heap.pop() {
                    let coord = ranked.ticket.coord;
                    state.queued.remove(&coord);
                    state.budget -= 1;
                    state.in_flight += 1;
                    return Some(coord);
                }
            }
            if state.is_settled() {
                self.settled.notify_all();
            }
            self.available.wait(&mut state);
        }
    }

    /// Marks a job taken by [`PreloadQueue::next`] as done.
    pub(crate) fn finish(&self) {
        let mut state = self.state.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        if state.is_settled() {
            self.settled.notify_all();
        }
    }

    /// Waits until no job is running and none can start without a new tick.
    ///
    /// Returns false on timeout.
    pub(crate) fn wait_settled(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while !state.is_settled() {
            if self.settled.wait_until(&mut state, deadline).timed_out() {
                return state.is_settled();
            }
        }
        true
    }

    /// Stops handing out jobs and drops everything queued.
    pub(crate) fn close(&self) {
        let mut state = self.state.lock();
        state.running = false;
        state.heap.clear();
        state.queued.clear();
        drop(state);
        self.available.notify_all();
        self.settled.notify_all();
    }
}
