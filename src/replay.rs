//! Timed replay of a search result.
//!
//! A [Timeline] turns the visited trace and the path into a finite, restartable sequence of
//! [Frame]s, each scheduled at an offset from the start of the replay. The
//! [AnimationSequencer] walks that sequence on the tokio timer, handing each event to a
//! [ReplaySink] once its offset has elapsed. A [CancelToken] stops an in-flight replay.
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::sync::watch;
use tokio::time::{self, Instant};

use crate::config::{DEFAULT_PATH_INTERVAL_MS, DEFAULT_VISIT_INTERVAL_MS};
use crate::grid::Cell;
use crate::search::SearchResult;

/// Spacing between consecutive visited cells and between consecutive path cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Intervals {
    pub visit: Duration,
    pub path: Duration,
}

impl Default for Intervals {
    fn default() -> Intervals {
        Intervals {
            visit: Duration::from_millis(DEFAULT_VISIT_INTERVAL_MS),
            path: Duration::from_millis(DEFAULT_PATH_INTERVAL_MS),
        }
    }
}

/// Offset of the `n`-th step of a phase paced at `interval`.
fn step(interval: Duration, n: usize) -> Duration {
    interval.saturating_mul(u32::try_from(n).unwrap_or(u32::MAX))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplayEvent {
    /// The cell was finalized by the search.
    Visit(Cell),
    /// The cell lies on the shortest path.
    Path(Cell),
    /// The replay is over and the grid may be edited again.
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Offset from the start of the replay.
    pub at: Duration,
    pub event: ReplayEvent,
}

/// Schedule of a replay. Visited cells are spaced by the visit interval starting at zero. The
/// path phase starts at the time of the last visit and is spaced by the path interval, and the
/// completion event shares the time of the last path cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timeline {
    visited: Vec<Cell>,
    path: Vec<Cell>,
    intervals: Intervals,
}

impl Timeline {
    pub fn new(visited: Vec<Cell>, path: Vec<Cell>, intervals: Intervals) -> Timeline {
        Timeline {
            visited,
            path,
            intervals,
        }
    }

    pub fn from_result<C>(result: &SearchResult<C>, intervals: Intervals) -> Timeline {
        Timeline::new(result.visited.clone(), result.path.clone(), intervals)
    }

    /// Time of the first path frame.
    pub fn path_origin(&self) -> Duration {
        step(self.intervals.visit, self.visited.len().saturating_sub(1))
    }

    /// Time of the completion frame.
    pub fn duration(&self) -> Duration {
        match self.path.len().checked_sub(1) {
            Some(last) => self.path_origin() + step(self.intervals.path, last),
            None => self.path_origin(),
        }
    }

    /// Number of frames delivered by a full replay. The completion frame is counted, so this is
    /// at least 1 even without any visits.
    pub fn frame_count(&self) -> usize {
        self.visited.len() + self.path.len() + 1
    }

    fn frame(&self, k: usize) -> Option<Frame> {
        let n_visited = self.visited.len();
        if let Some(&cell) = self.visited.get(k) {
            return Some(Frame {
                at: step(self.intervals.visit, k),
                event: ReplayEvent::Visit(cell),
            });
        }
        let j = k - n_visited;
        if let Some(&cell) = self.path.get(j) {
            return Some(Frame {
                at: self.path_origin() + step(self.intervals.path, j),
                event: ReplayEvent::Path(cell),
            });
        }
        (j == self.path.len()).then(|| Frame {
            at: self.duration(),
            event: ReplayEvent::Complete,
        })
    }

    /// Lazily yields every frame in delivery order. Each call starts from the beginning.
    pub fn frames(&self) -> Frames<'_> {
        Frames {
            timeline: self,
            next: 0,
        }
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = Frame;
    type IntoIter = Frames<'a>;

    fn into_iter(self) -> Frames<'a> {
        self.frames()
    }
}

pub struct Frames<'a> {
    timeline: &'a Timeline,
    next: usize,
}

impl Iterator for Frames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let frame = self.timeline.frame(self.next)?;
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.timeline.frame_count().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Frames<'_> {}

/// Receiver of replay events, typically a view that recolours cells.
pub trait ReplaySink {
    fn on_visit(&mut self, cell: Cell);
    fn on_path(&mut self, cell: Cell);
    fn on_complete(&mut self);

    fn deliver(&mut self, event: ReplayEvent) {
        match event {
            ReplayEvent::Visit(cell) => self.on_visit(cell),
            ReplayEvent::Path(cell) => self.on_path(cell),
            ReplayEvent::Complete => self.on_complete(),
        }
    }
}

/// Adapts three closures into a [ReplaySink].
pub struct Callbacks<V, P, D> {
    pub on_visit: V,
    pub on_path: P,
    pub on_complete: D,
}

impl<V, P, D> ReplaySink for Callbacks<V, P, D>
where
    V: FnMut(Cell),
    P: FnMut(Cell),
    D: FnMut(),
{
    fn on_visit(&mut self, cell: Cell) {
        (self.on_visit)(cell)
    }
    fn on_path(&mut self, cell: Cell) {
        (self.on_path)(cell)
    }
    fn on_complete(&mut self) {
        (self.on_complete)()
    }
}

/// Records every event, handy for views that redraw from scratch.
impl ReplaySink for Vec<ReplayEvent> {
    fn on_visit(&mut self, cell: Cell) {
        self.push(ReplayEvent::Visit(cell));
    }
    fn on_path(&mut self, cell: Cell) {
        self.push(ReplayEvent::Path(cell));
    }
    fn on_complete(&mut self) {
        self.push(ReplayEvent::Complete);
    }
}

/// Shared flag used to abort a replay. Clones observe the same flag; cancelling is permanent.
#[derive(Clone, Debug)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> CancelToken {
        let (tx, _) = watch::channel(false);
        CancelToken { tx: Arc::new(tx) }
    }
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [cancel](Self::cancel) has been called on any clone.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so the channel cannot close underneath us.
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplayOutcome {
    /// Every frame was delivered, including the completion event.
    Completed,
    /// The replay was aborted after `delivered` frames; no completion event was sent.
    Cancelled { delivered: usize },
}

/// Plays back search results in real time.
///
/// Only one replay should drive a given view at a time; preventing overlapping runs is up to
/// the caller (see [Session](crate::session::Session)).
#[derive(Clone, Copy, Debug, Default)]
pub struct AnimationSequencer {
    pub intervals: Intervals,
}

impl AnimationSequencer {
    pub fn new(intervals: Intervals) -> AnimationSequencer {
        AnimationSequencer { intervals }
    }

    pub fn timeline(&self, visited: &[Cell], path: &[Cell]) -> Timeline {
        Timeline::new(visited.to_vec(), path.to_vec(), self.intervals)
    }

    /// Delivers every visited cell, then every path cell, then the completion event, each at
    /// its scheduled offset from the moment this is called. Frames are never delivered early
    /// and never out of order; lateness depends on the runtime.
    pub async fn play<S>(
        &self,
        visited: &[Cell],
        path: &[Cell],
        sink: &mut S,
        cancel: &CancelToken,
    ) -> ReplayOutcome
    where
        S: ReplaySink + ?Sized,
    {
        self.play_timeline(&self.timeline(visited, path), sink, cancel)
            .await
    }

    pub async fn play_timeline<S>(
        &self,
        timeline: &Timeline,
        sink: &mut S,
        cancel: &CancelToken,
    ) -> ReplayOutcome
    where
        S: ReplaySink + ?Sized,
    {
        debug!(
            "Replaying {} frames over {:?}",
            timeline.frame_count(),
            timeline.duration()
        );
        let origin = Instant::now();
        for (delivered, frame) in timeline.frames().enumerate() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(
                        "Replay cancelled after {delivered} of {} frames",
                        timeline.frame_count()
                    );
                    return ReplayOutcome::Cancelled { delivered };
                }
                _ = time::sleep_until(origin + frame.at) => {}
            }
            sink.deliver(frame.event);
        }
        debug!("Replay finished after {:?}", origin.elapsed());
        ReplayOutcome::Completed
    }

    /// Closure form of [play](Self::play) without cancellation.
    pub async fn play_callbacks<V, P, D>(
        &self,
        visited: &[Cell],
        path: &[Cell],
        on_visit: V,
        on_path: P,
        on_complete: D,
    ) -> ReplayOutcome
    where
        V: FnMut(Cell),
        P: FnMut(Cell),
        D: FnMut(),
    {
        let mut sink = Callbacks {
            on_visit,
            on_path,
            on_complete,
        };
        self.play(visited, path, &mut sink, &CancelToken::new())
            .await
    }
}
