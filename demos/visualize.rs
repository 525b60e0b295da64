use grid_path_replay::replay::Callbacks;
use grid_path_replay::{CancelToken, Cell, Config, PathSearch, ReplayOutcome, Session, Timeline};

// In this example the default 20x30 grid gets a wall with a single gap
//
// S.............................
// ..............................
// ...
// ###########.##################
// ...
// .............................E
//
// and the search is replayed with every event printed as it is delivered.

#[tokio::main(flavor = "current_thread")]
async fn main() -> grid_path_replay::Result<()> {
    let config = Config::default().with_intervals(2, 20);
    let mut session = Session::new(config)?.with_search(PathSearch::linear_scan());
    for col in 0..30 {
        if col != 11 {
            session.set_wall(Cell::new(10, col), true)?;
        }
    }
    println!("{}", session.grid());

    let run = session.begin_run()?;
    let timeline = Timeline::from_result(run.result(), session.config().intervals());
    println!(
        "Visited {} cells, path of {} cells, replay takes {:?}",
        run.result().visited.len(),
        run.result().path.len(),
        timeline.duration()
    );

    let mut sink = Callbacks {
        on_visit: |c: Cell| println!("visit {c}"),
        on_path: |c: Cell| println!("path  {c}"),
        on_complete: || println!("done"),
    };
    let outcome = run.play(&mut sink, &CancelToken::new()).await;
    assert_eq!(outcome, ReplayOutcome::Completed);
    assert!(!session.is_running());
    Ok(())
}
