//! Run bookkeeping for a single visualization session.
//!
//! A [Session] owns the grid being edited and guarantees that it is not edited, and that no
//! second run is started, while a [Run] is alive.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, log_enabled, Level};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::grid::{Cell, Grid};
use crate::replay::{AnimationSequencer, CancelToken, ReplayOutcome, ReplaySink};
use crate::search::{PathSearch, SearchResult};

#[derive(Debug)]
pub struct Session {
    config: Config,
    grid: Grid,
    search: PathSearch,
    running: Arc<AtomicBool>,
}

impl Session {
    pub fn new(config: Config) -> Result<Session> {
        let grid = Grid::from_config(&config)?;
        Ok(Session {
            config,
            grid,
            search: PathSearch::new(),
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Replaces the search used by subsequent runs.
    pub fn with_search(mut self, search: PathSearch) -> Session {
        self.search = search;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
    pub fn grid(&self) -> &Grid {
        &self.grid
    }
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.is_running() {
            Err(Error::ReentrantRun)
        } else {
            Ok(())
        }
    }

    pub fn toggle_wall(&mut self, cell: Cell) -> Result<bool> {
        self.ensure_idle()?;
        self.grid.toggle_wall(cell)
    }

    pub fn set_wall(&mut self, cell: Cell, blocked: bool) -> Result<bool> {
        self.ensure_idle()?;
        self.grid.set_wall(cell, blocked)
    }

    /// Starts over with a fresh grid of the configured shape.
    pub fn reset(&mut self) -> Result<()> {
        self.ensure_idle()?;
        self.grid = Grid::from_config(&self.config)?;
        Ok(())
    }

    /// Searches the current grid and marks the session as running until the returned [Run] is
    /// played to the end or dropped.
    pub fn begin_run(&self) -> Result<Run> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::ReentrantRun)?;
        let guard = RunGuard(Arc::clone(&self.running));
        if log_enabled!(Level::Debug) {
            debug!(
                "Starting run on grid with {} walls, end reachable: {}",
                self.grid.walls().count(),
                self.grid.reachable()
            );
        }
        Ok(Run {
            result: self.search.run(&self.grid),
            sequencer: AnimationSequencer::new(self.config.intervals()),
            _guard: guard,
        })
    }
}

/// Clears the running flag when dropped.
#[derive(Debug)]
struct RunGuard(Arc<AtomicBool>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A search that has finished but whose replay may still be pending.
#[derive(Debug)]
pub struct Run {
    result: SearchResult,
    sequencer: AnimationSequencer,
    _guard: RunGuard,
}

impl Run {
    pub fn result(&self) -> &SearchResult {
        &self.result
    }

    /// Replays the run with the session's intervals and releases the session afterwards,
    /// whether the replay completed or was cancelled.
    pub async fn play<S>(self, sink: &mut S, cancel: &CancelToken) -> ReplayOutcome
    where
        S: ReplaySink + ?Sized,
    {
        self.sequencer
            .play(&self.result.visited, &self.result.path, sink, cancel)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::ReplayEvent;

    fn small_session() -> Session {
        Session::new(Config::default().with_size(3, 3)).unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        assert!(Session::new(Config::default().with_size(0, 0)).is_err());
    }

    #[test]
    fn second_run_is_rejected() {
        let session = small_session();
        let run = session.begin_run().unwrap();
        assert!(session.is_running());
        assert_eq!(session.begin_run().err(), Some(Error::ReentrantRun));
        drop(run);
        assert!(!session.is_running());
        assert!(session.begin_run().is_ok());
    }

    #[test]
    fn editing_is_blocked_during_run() {
        let mut session = small_session();
        let running = Arc::clone(&session.running);
        let run = session.begin_run().unwrap();
        assert_eq!(
            session.toggle_wall(Cell::new(1, 1)),
            Err(Error::ReentrantRun)
        );
        assert_eq!(session.reset(), Err(Error::ReentrantRun));
        drop(run);
        assert!(!running.load(Ordering::Acquire));
        assert_eq!(session.toggle_wall(Cell::new(1, 1)), Ok(true));
    }

    #[test]
    fn reset_clears_walls() {
        let mut session = small_session();
        session.set_wall(Cell::new(1, 1), true).unwrap();
        session.toggle_wall(Cell::new(0, 1)).unwrap();
        assert_eq!(session.grid().walls().count(), 2);
        session.reset().unwrap();
        assert_eq!(session.grid().walls().count(), 0);
    }

    #[test]
    fn run_uses_current_walls() {
        let mut session = small_session();
        for col in 0..3 {
            session.set_wall(Cell::new(1, col), true).unwrap();
        }
        let run = session.begin_run().unwrap();
        assert!(!run.result().found());
        assert_eq!(run.result().visited.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn playing_releases_session() {
        let mut session = small_session();
        let run = session.begin_run().unwrap();
        let mut events: Vec<ReplayEvent> = Vec::new();
        let outcome = run.play(&mut events, &CancelToken::new()).await;
        assert_eq!(outcome, ReplayOutcome::Completed);
        assert_eq!(events.len(), 9 + 5 + 1);
        assert_eq!(events.last(), Some(&ReplayEvent::Complete));
        assert!(!session.is_running());
        assert!(session.toggle_wall(Cell::new(1, 1)).is_ok());
    }
}
