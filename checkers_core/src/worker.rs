use crate::engine::config::EngineConfig;
use crate::engine::control::CancellationToken;
use crate::engine::{build_searcher, Move, SearchStats, Searcher};
use crate::logic::board::{Board, Color};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Input {
    ComputeMove {
        board: Board,
        turn: Color,
        candidates: Vec<Move>,
        config: EngineConfig,
        cancel: CancellationToken,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Output {
    MoveFound(Move, SearchStats),
    NoMove,
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("failed to start the search thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("the search thread has stopped")]
    Disconnected,
}

/// Runs on the search thread and keeps the searcher between requests as long
/// as the config does not change.
struct SearchHandler {
    engine: Option<(EngineConfig, Box<dyn Searcher + Send>)>,
}

impl SearchHandler {
    const fn new() -> Self {
        Self { engine: None }
    }

    fn received(&mut self, msg: Input) -> Output {
        match msg {
            Input::ComputeMove {
                board,
                turn,
                candidates,
                config,
                cancel,
            } => {
                if candidates.is_empty() {
                    return Output::NoMove;
                }

                let reuse = self
                    .engine
                    .as_ref()
                    .is_some_and(|(current, _)| *current == config);
                if !reuse {
                    let searcher = build_searcher(Arc::new(config.clone()));
                    self.engine = Some((config, searcher));
                }

                let Some((_, searcher)) = self.engine.as_mut() else {
                    return Output::NoMove;
                };
                match searcher.select_move(&board, turn, &candidates, &cancel) {
                    Some((mv, stats)) => Output::MoveFound(mv, stats),
                    None => Output::NoMove,
                }
            }
        }
    }
}

/// Owning handle to a background search thread. Requests are answered in
/// order; dropping the handle stops the thread and waits for it.
pub struct SearchWorker {
    requests: Option<Sender<Input>>,
    responses: Receiver<Output>,
    join_handle: Option<JoinHandle<()>>,
}

impl SearchWorker {
    pub fn spawn() -> Result<Self, WorkerError> {
        let (request_tx, request_rx) = mpsc::channel::<Input>();
        let (response_tx, response_rx) = mpsc::channel::<Output>();

        let join_handle = std::thread::Builder::new()
            .name("search-worker".to_owned())
            .spawn(move || {
                info!("search worker: started");
                let mut handler = SearchHandler::new();
                for msg in request_rx {
                    let output = handler.received(msg);
                    if response_tx.send(output).is_err() {
                        break;
                    }
                }
                info!("search worker: exiting");
            })?;

        Ok(Self {
            requests: Some(request_tx),
            responses: response_rx,
            join_handle: Some(join_handle),
        })
    }

    /// Queues a search on a snapshot of `board`. The returned token cancels
    /// this request only.
    pub fn compute_move(
        &self,
        board: &Board,
        turn: Color,
        candidates: &[Move],
        config: &EngineConfig,
    ) -> Result<CancellationToken, WorkerError> {
        let cancel = CancellationToken::new();
        let msg = Input::ComputeMove {
            board: board.clone(),
            turn,
            candidates: candidates.to_vec(),
            config: config.clone(),
            cancel: cancel.clone(),
        };
        self.requests
            .as_ref()
            .ok_or(WorkerError::Disconnected)?
            .send(msg)
            .map_err(|_| WorkerError::Disconnected)?;
        debug!("search worker: request queued for {turn:?}");
        Ok(cancel)
    }

    /// Blocks until the next answer arrives.
    pub fn recv(&self) -> Result<Output, WorkerError> {
        self.responses.recv().map_err(|_| WorkerError::Disconnected)
    }

    /// Waits at most `timeout`; `Ok(None)` means the search is still running.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<Output>, WorkerError> {
        match self.responses.recv_timeout(timeout) {
            Ok(output) => Ok(Some(output)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(WorkerError::Disconnected),
        }
    }
}

impl Drop for SearchWorker {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.requests.take();
        if let Some(join_handle) = self.join_handle.take() {
            let _ = join_handle.join();
        }
    }
}
