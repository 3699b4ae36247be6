// THEORY:
// The `solver` module is the only place in the pipeline with true parallelism.
// The external solving engine's orientation contract is ambiguous, so we never
// guess: both candidate encodings are dispatched at once, each inside its own
// isolated task, and the first attempt to reach a successful terminal outcome
// wins.
//
// Key architectural principles:
// 1.  **Isolated Execution Units**: Each attempt runs in its own spawned task
//     with no shared mutable state; the engine call itself runs on the blocking
//     thread pool. Attempts communicate with the dispatcher only by message
//     passing.
// 2.  **Typed Terminal-Outcome Channel**: An attempt's channel carries zero or
//     more `Status` notifications followed by exactly one `Error` or `Result`.
//     The dispatcher selects on the first terminal outcome across the pair.
// 3.  **First Success, Else Fall Back**: A first terminal success cancels the
//     rival and wins. A first terminal error means the dispatcher simply keeps
//     waiting for the rival instead. Only when both attempts fail does the
//     operation fail, carrying both error messages labeled by encoding.
// 4.  **Bounded Attempts**: Every attempt is fenced by the configured deadline;
//     a timeout is reported through the channel like any other attempt error,
//     so the fallback path needs no special case for it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::{self, BoxFuture, Either};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::PipelineConfig;
use crate::core_modules::editor::EditorGrid;
use crate::core_modules::encoder::{Encoding, encode};
use crate::core_modules::moves::{Move, parse_sequence};

/// An opaque external solving engine: consumes a 54-character cube state,
/// returns a whitespace-separated move string or an error message. Calls are
/// blocking and are run on the blocking thread pool.
pub trait SolveEngine: Send + Sync + 'static {
    fn solve(&self, state: &str) -> Result<String, String>;
}

/// What one attempt reports back to the dispatcher: a stream of progress
/// notifications terminated by exactly one error or result.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptMessage {
    Status(String),
    Error(String),
    Result(Vec<Move>),
}

/// The dispatcher's overall outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveReport {
    /// The grid was already solved; no engine was invoked.
    AlreadySolved,
    /// One attempt produced a solution.
    Winner {
        /// The convention whose attempt won the race.
        encoding: Encoding,
        moves: Vec<Move>,
        elapsed: Duration,
    },
}

impl SolveReport {
    pub fn moves(&self) -> &[Move] {
        match self {
            SolveReport::AlreadySolved => &[],
            SolveReport::Winner { moves, .. } => moves,
        }
    }
}

/// Both encodings failed; the messages are labeled so the operator can see
/// which convention produced which failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveError {
    pub strict: String,
    pub compat: String,
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "both solver attempts failed (strict: {}; compat: {})",
            self.strict, self.compat
        )
    }
}

impl std::error::Error for SolveError {}

/// An attempt that has been launched: its supervising task plus the receiving
/// end of its terminal-outcome channel.
struct RunningAttempt {
    encoding: Encoding,
    handle: JoinHandle<()>,
    rx: mpsc::UnboundedReceiver<AttemptMessage>,
}

/// Races the two encoding conventions against a solving engine.
#[derive(Debug, Clone)]
pub struct SolverDispatcher {
    timeout: Duration,
}

impl SolverDispatcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(Duration::from_millis(config.solver_timeout_ms))
    }

    /// Solves the grid, racing both encodings. The grid is expected to have
    /// passed validation already.
    pub async fn dispatch(
        &self,
        engine: Arc<dyn SolveEngine>,
        grid: &EditorGrid,
    ) -> Result<SolveReport, SolveError> {
        if grid.is_solved() {
            tracing::info!("grid already solved, skipping solver");
            return Ok(SolveReport::AlreadySolved);
        }

        let start = Instant::now();
        let strict = self.launch(
            Arc::clone(&engine),
            encode(grid, Encoding::Strict),
            Encoding::Strict,
        );
        let compat = self.launch(engine, encode(grid, Encoding::Compat), Encoding::Compat);
        race(strict, compat, start).await
    }

    /// Spawns one isolated attempt and hands back its channel.
    fn launch(
        &self,
        engine: Arc<dyn SolveEngine>,
        state: String,
        encoding: Encoding,
    ) -> RunningAttempt {
        let (tx, rx) = mpsc::unbounded_channel();
        let timeout = self.timeout;

        let handle = tokio::spawn(async move {
            let _ = tx.send(AttemptMessage::Status(format!("{encoding}: engine start")));
            let work = tokio::task::spawn_blocking(move || engine.solve(&state));
            let terminal = match tokio::time::timeout(timeout, work).await {
                Ok(Ok(Ok(solution))) => match parse_sequence(&solution) {
                    Ok(moves) => AttemptMessage::Result(moves),
                    Err(err) => AttemptMessage::Error(format!("unparsable solution: {err}")),
                },
                Ok(Ok(Err(msg))) => AttemptMessage::Error(msg),
                Ok(Err(join_err)) => AttemptMessage::Error(format!("engine crashed: {join_err}")),
                Err(_) => AttemptMessage::Error(format!("timeout after {}ms", timeout.as_millis())),
            };
            let _ = tx.send(terminal);
        });

        RunningAttempt {
            encoding,
            handle,
            rx,
        }
    }
}

/// Drains one attempt's channel up to its terminal message.
async fn await_terminal(
    mut rx: mpsc::UnboundedReceiver<AttemptMessage>,
    encoding: Encoding,
) -> Result<Vec<Move>, String> {
    while let Some(msg) = rx.recv().await {
        match msg {
            AttemptMessage::Status(status) => {
                tracing::debug!(attempt = %encoding, status = %status, "solver attempt progress");
            }
            AttemptMessage::Error(err) => return Err(err),
            AttemptMessage::Result(moves) => return Ok(moves),
        }
    }
    Err("attempt ended without a terminal message".to_string())
}

/// First terminal success wins and cancels the rival; a first terminal error
/// defers to the rival; two errors fail the whole operation.
async fn race(
    a: RunningAttempt,
    b: RunningAttempt,
    start: Instant,
) -> Result<SolveReport, SolveError> {
    let (a_encoding, b_encoding) = (a.encoding, b.encoding);
    let (a_handle, b_handle) = (a.handle, b.handle);
    let fa: BoxFuture<'_, _> = Box::pin(await_terminal(a.rx, a_encoding));
    let fb: BoxFuture<'_, _> = Box::pin(await_terminal(b.rx, b_encoding));

    let (first_encoding, first, rest_encoding, rest, rest_handle) =
        match future::select(fa, fb).await {
            Either::Left((first, rest)) => (a_encoding, first, b_encoding, rest, b_handle),
            Either::Right((first, rest)) => (b_encoding, first, a_encoding, rest, a_handle),
        };

    let first_err = match first {
        Ok(moves) => {
            // The rival's supervising task is cancelled outright; its blocking
            // engine call ends at its own deadline at the latest.
            rest_handle.abort();
            tracing::info!(winner = %first_encoding, moves = moves.len(), "solver race won");
            return Ok(SolveReport::Winner {
                encoding: first_encoding,
                moves,
                elapsed: start.elapsed(),
            });
        }
        Err(err) => err,
    };
    tracing::warn!(attempt = %first_encoding, error = %first_err, "solver attempt failed, awaiting rival");

    match rest.await {
        Ok(moves) => {
            tracing::info!(winner = %rest_encoding, moves = moves.len(), "solver fallback won");
            Ok(SolveReport::Winner {
                encoding: rest_encoding,
                moves,
                elapsed: start.elapsed(),
            })
        }
        Err(rest_err) => {
            let (strict, compat) = if first_encoding == Encoding::Strict {
                (first_err, rest_err)
            } else {
                (rest_err, first_err)
            };
            tracing::warn!(strict = %strict, compat = %compat, "both solver attempts failed");
            Err(SolveError { strict, compat })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::face::FaceLetter;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Adapter so tests can script an engine from a closure.
    struct FnEngine<F>(F);

    impl<F> SolveEngine for FnEngine<F>
    where
        F: Fn(&str) -> Result<String, String> + Send + Sync + 'static,
    {
        fn solve(&self, state: &str) -> Result<String, String> {
            (self.0)(state)
        }
    }

    fn engine<F>(f: F) -> Arc<dyn SolveEngine>
    where
        F: Fn(&str) -> Result<String, String> + Send + Sync + 'static,
    {
        Arc::new(FnEngine(f))
    }

    /// A grid one sticker edit away from solved; not validation-clean, but the
    /// dispatcher only cares that it is not solved.
    fn scrambled_grid() -> EditorGrid {
        let mut grid = EditorGrid::new();
        grid.cycle_slot(FaceLetter::U, 0);
        grid
    }

    #[tokio::test]
    async fn test_solved_grid_short_circuits_without_invoking_engine() {
        static INVOKED: AtomicBool = AtomicBool::new(false);
        let engine = engine(|_state| {
            INVOKED.store(true, Ordering::SeqCst);
            Ok("R".to_string())
        });

        let dispatcher = SolverDispatcher::new(Duration::from_secs(8));
        let report = dispatcher.dispatch(engine, &EditorGrid::new()).await.unwrap();
        assert_eq!(report, SolveReport::AlreadySolved);
        assert!(report.moves().is_empty());
        assert!(!INVOKED.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_fast_success_wins_the_race() {
        let grid = scrambled_grid();
        let strict_state = encode(&grid, Encoding::Strict);
        let engine = engine(move |state| {
            if state == strict_state {
                std::thread::sleep(Duration::from_millis(300));
                Ok("R".to_string())
            } else {
                Ok("F2 U".to_string())
            }
        });

        let dispatcher = SolverDispatcher::new(Duration::from_secs(8));
        let report = dispatcher.dispatch(engine, &grid).await.unwrap();
        match report {
            SolveReport::Winner {
                encoding, moves, ..
            } => {
                assert_eq!(encoding, Encoding::Compat);
                assert_eq!(moves, parse_sequence("F2 U").unwrap());
            }
            other => panic!("expected a winner, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_compat_error_falls_back_to_strict() {
        let grid = scrambled_grid();
        let strict_state = encode(&grid, Encoding::Strict);
        let engine = engine(move |state| {
            if state == strict_state {
                std::thread::sleep(Duration::from_millis(100));
                Ok("R U R'".to_string())
            } else {
                Err("bad facelet string".to_string())
            }
        });

        let dispatcher = SolverDispatcher::new(Duration::from_secs(8));
        let report = dispatcher.dispatch(engine, &grid).await.unwrap();
        match report {
            SolveReport::Winner {
                encoding, moves, ..
            } => {
                assert_eq!(encoding, Encoding::Strict);
                assert_eq!(moves, parse_sequence("R U R'").unwrap());
            }
            other => panic!("expected the strict fallback to win, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_both_failures_are_labeled_by_encoding() {
        let grid = scrambled_grid();
        let strict_state = encode(&grid, Encoding::Strict);
        let engine = engine(move |state| {
            if state == strict_state {
                Err("strict rejected".to_string())
            } else {
                Err("compat rejected".to_string())
            }
        });

        let dispatcher = SolverDispatcher::new(Duration::from_secs(8));
        let err = dispatcher.dispatch(engine, &grid).await.unwrap_err();
        assert_eq!(err.strict, "strict rejected");
        assert_eq!(err.compat, "compat rejected");
        assert!(err.to_string().contains("strict rejected"));
    }

    #[tokio::test]
    async fn test_timeout_reads_as_attempt_error() {
        let grid = scrambled_grid();
        let strict_state = encode(&grid, Encoding::Strict);
        let engine = engine(move |state| {
            if state == strict_state {
                std::thread::sleep(Duration::from_millis(500));
                Ok("R".to_string())
            } else {
                Ok("F".to_string())
            }
        });

        // Strict stalls past the deadline; compat still wins normally.
        let dispatcher = SolverDispatcher::new(Duration::from_millis(60));
        let report = dispatcher.dispatch(engine, &grid).await.unwrap();
        match report {
            SolveReport::Winner { encoding, .. } => assert_eq!(encoding, Encoding::Compat),
            other => panic!("expected compat to win, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_both_timeouts_fail_with_timeout_messages() {
        let grid = scrambled_grid();
        let engine = engine(move |_state| {
            std::thread::sleep(Duration::from_millis(500));
            Ok("R".to_string())
        });

        let dispatcher = SolverDispatcher::new(Duration::from_millis(40));
        let err = dispatcher.dispatch(engine, &grid).await.unwrap_err();
        assert!(err.strict.contains("timeout"));
        assert!(err.compat.contains("timeout"));
    }

    #[tokio::test]
    async fn test_unparsable_solution_is_an_attempt_error() {
        let grid = scrambled_grid();
        let engine = engine(|_state| Ok("R X9".to_string()));

        let dispatcher = SolverDispatcher::new(Duration::from_secs(8));
        let err = dispatcher.dispatch(engine, &grid).await.unwrap_err();
        assert!(err.strict.contains("unparsable solution"));
        assert!(err.compat.contains("unparsable solution"));
    }
}
