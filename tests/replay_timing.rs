use std::time::Duration;

use grid_path_replay::replay::Callbacks;
use grid_path_replay::{
    AnimationSequencer, CancelToken, Cell, Intervals, ReplayEvent, ReplayOutcome, ReplaySink,
};
use tokio::time::Instant;

/// Allowed scheduling slack when comparing delivery times.
const JITTER: Duration = Duration::from_millis(2);

struct Recorder {
    origin: Instant,
    events: Vec<(Duration, ReplayEvent)>,
    cancel_after: Option<(usize, CancelToken)>,
}

impl Recorder {
    fn new() -> Recorder {
        Recorder {
            origin: Instant::now(),
            events: Vec::new(),
            cancel_after: None,
        }
    }

    fn record(&mut self, event: ReplayEvent) {
        self.events.push((self.origin.elapsed(), event));
        if let Some((n, cancel)) = &self.cancel_after {
            if self.events.len() == *n {
                cancel.cancel();
            }
        }
    }

    fn times_of(&self, f: impl Fn(&ReplayEvent) -> bool) -> Vec<Duration> {
        self.events
            .iter()
            .filter(|(_, e)| f(e))
            .map(|(t, _)| *t)
            .collect()
    }
}

impl ReplaySink for Recorder {
    fn on_visit(&mut self, cell: Cell) {
        self.record(ReplayEvent::Visit(cell));
    }
    fn on_path(&mut self, cell: Cell) {
        self.record(ReplayEvent::Path(cell));
    }
    fn on_complete(&mut self) {
        self.record(ReplayEvent::Complete);
    }
}

fn assert_times(actual: &[Duration], expected_ms: &[u64]) {
    assert_eq!(actual.len(), expected_ms.len());
    for (a, e) in actual.iter().zip(expected_ms) {
        let e = Duration::from_millis(*e);
        let delta = if *a > e { *a - e } else { e - *a };
        assert!(delta <= JITTER, "delivered at {a:?}, expected {e:?}");
        assert!(*a >= e, "delivered early at {a:?}, expected {e:?}");
    }
}

fn row(n: usize) -> Vec<Cell> {
    (0..n).map(|i| Cell::new(0, i)).collect()
}

#[tokio::test(start_paused = true)]
async fn five_visits_three_path_cells() {
    let sequencer = AnimationSequencer::new(Intervals {
        visit: Duration::from_millis(10),
        path: Duration::from_millis(50),
    });
    let mut recorder = Recorder::new();
    let outcome = sequencer
        .play(&row(5), &row(3), &mut recorder, &CancelToken::new())
        .await;
    assert_eq!(outcome, ReplayOutcome::Completed);
    assert_times(
        &recorder.times_of(|e| matches!(e, ReplayEvent::Visit(_))),
        &[0, 10, 20, 30, 40],
    );
    assert_times(
        &recorder.times_of(|e| matches!(e, ReplayEvent::Path(_))),
        &[40, 90, 140],
    );
    assert_times(
        &recorder.times_of(|e| matches!(e, ReplayEvent::Complete)),
        &[140],
    );
    // Visits strictly precede the path, each phase in trace order
    let order: Vec<ReplayEvent> = recorder.events.iter().map(|(_, e)| *e).collect();
    let mut expected: Vec<ReplayEvent> = row(5).into_iter().map(ReplayEvent::Visit).collect();
    expected.extend(row(3).into_iter().map(ReplayEvent::Path));
    expected.push(ReplayEvent::Complete);
    assert_eq!(order, expected);
}

#[tokio::test(start_paused = true)]
async fn empty_path_completes_immediately_after_visits() {
    let mut recorder = Recorder::new();
    AnimationSequencer::default()
        .play(&row(3), &[], &mut recorder, &CancelToken::new())
        .await;
    assert_times(
        &recorder.times_of(|e| matches!(e, ReplayEvent::Complete)),
        &[20],
    );
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_delivery_without_completion() {
    let cancel = CancelToken::new();
    let mut recorder = Recorder::new();
    recorder.cancel_after = Some((3, cancel.clone()));
    let outcome = AnimationSequencer::default()
        .play(&row(6), &row(4), &mut recorder, &cancel)
        .await;
    assert_eq!(outcome, ReplayOutcome::Cancelled { delivered: 3 });
    assert_eq!(recorder.events.len(), 3);
    assert!(recorder
        .events
        .iter()
        .all(|(_, e)| *e != ReplayEvent::Complete));
}

#[tokio::test(start_paused = true)]
async fn cancel_from_another_task() {
    let cancel = CancelToken::new();
    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(25)).await;
            cancel.cancel();
        })
    };
    let mut events: Vec<ReplayEvent> = Vec::new();
    let outcome = AnimationSequencer::default()
        .play(&row(10), &row(5), &mut events, &cancel)
        .await;
    canceller.await.unwrap();
    // Visits at 0, 10 and 20 ms made it out before the cancel at 25 ms
    assert_eq!(outcome, ReplayOutcome::Cancelled { delivered: 3 });
    assert_eq!(events.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn callbacks_fire_once_each() {
    let mut visits = Vec::new();
    let mut path = Vec::new();
    let mut completions = 0;
    let outcome = AnimationSequencer::default()
        .play_callbacks(
            &row(4),
            &row(2),
            |c| visits.push(c),
            |c| path.push(c),
            || completions += 1,
        )
        .await;
    assert_eq!(outcome, ReplayOutcome::Completed);
    assert_eq!(visits, row(4));
    assert_eq!(path, row(2));
    assert_eq!(completions, 1);

    let mut seen = 0;
    let mut sink = Callbacks {
        on_visit: |_: Cell| seen += 1,
        on_path: |_: Cell| {},
        on_complete: || {},
    };
    AnimationSequencer::default()
        .play(&row(3), &[], &mut sink, &CancelToken::new())
        .await;
    drop(sink);
    assert_eq!(seen, 3);
}
