// Generation session state machine

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::api::sse::StreamEvent;
use crate::api::VersaClient;
use crate::events::AppEvent;
use crate::models::GenerateRequest;

use futures::StreamExt;

/// Shown in place of the result when the backend is unreachable or the
/// stream breaks mid-read.
pub const GENERATION_FAILED_MESSAGE: &str = "生成失败，请检查后端服务是否开启。";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Generating,
    Failed,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SubmitError {
    /// Rejected locally; no state change, no network call.
    #[error("input is empty")]
    EmptyInput,
}

/// The running text buffer for one session. Deltas are appended exactly as
/// they arrive, in arrival order.
#[derive(Debug, Default)]
pub struct Accumulator {
    buffer: String,
}

impl Accumulator {
    pub fn apply(&mut self, delta: &str) {
        self.buffer.push_str(delta);
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    pub fn snapshot(&self) -> &str {
        &self.buffer
    }
}

/// Owns the lifecycle of the single in-flight generation request.
///
/// Each `submit` bumps the epoch; events tagged with an older epoch belong
/// to a superseded session and are discarded, so at most one session ever
/// writes to the visible result. The superseded task is also aborted, but
/// the epoch check is what guarantees correctness.
#[derive(Debug)]
pub struct SessionController {
    state: SessionState,
    epoch: u64,
    accumulator: Accumulator,
    task: Option<JoinHandle<()>>,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            epoch: 0,
            accumulator: Accumulator::default(),
            task: None,
        }
    }

    pub const fn state(&self) -> SessionState {
        self.state
    }

    pub const fn is_generating(&self) -> bool {
        matches!(self.state, SessionState::Generating)
    }

    /// The live result as the UI should show it right now.
    pub fn result(&self) -> &str {
        match self.state {
            SessionState::Failed => GENERATION_FAILED_MESSAGE,
            _ => self.accumulator.snapshot(),
        }
    }

    /// Start a new session, superseding any in-flight one.
    ///
    /// Empty or whitespace-only input is rejected before anything else
    /// happens. Otherwise the accumulator is cleared, the state becomes
    /// `Generating`, and a task is spawned to drive the stream; its events
    /// arrive on `tx` tagged with the new epoch.
    pub fn submit(
        &mut self,
        client: &VersaClient,
        request: GenerateRequest,
        tx: &UnboundedSender<AppEvent>,
    ) -> Result<(), SubmitError> {
        if request.raw_content.trim().is_empty() {
            return Err(SubmitError::EmptyInput);
        }

        if let Some(task) = self.task.take() {
            task.abort();
        }

        self.epoch += 1;
        self.accumulator.reset();
        self.state = SessionState::Generating;

        let epoch = self.epoch;
        let client = client.clone();
        let tx = tx.clone();

        self.task = Some(tokio::spawn(async move {
            match client.generate_stream(&request).await {
                Ok(mut stream) => {
                    while let Some(item) = stream.next().await {
                        match item {
                            Ok(StreamEvent::Delta(content)) => {
                                let _ = tx.send(AppEvent::GenerationDelta { epoch, content });
                            }
                            Ok(StreamEvent::Done) => {
                                let _ = tx.send(AppEvent::GenerationDone { epoch });
                                return;
                            }
                            // Skipped silently; the stream continues.
                            Ok(StreamEvent::Malformed(_)) => {}
                            Err(e) => {
                                let _ = tx.send(AppEvent::GenerationFailed {
                                    epoch,
                                    error: e.to_string(),
                                });
                                return;
                            }
                        }
                    }
                    // Stream ended without a sentinel: the accumulated text
                    // stands as the final result.
                    let _ = tx.send(AppEvent::GenerationDone { epoch });
                }
                Err(e) => {
                    let _ = tx.send(AppEvent::GenerationFailed {
                        epoch,
                        error: e.to_string(),
                    });
                }
            }
        }));

        Ok(())
    }

    /// Fold one generation event into the session. Returns true when the
    /// visible result changed. Events from superseded epochs are dropped.
    pub fn handle_event(&mut self, epoch: u64, event: SessionEvent) -> bool {
        if epoch != self.epoch {
            return false;
        }

        match event {
            SessionEvent::Delta(content) => {
                if self.state != SessionState::Generating {
                    return false;
                }
                self.accumulator.apply(&content);
                true
            }
            SessionEvent::Done => {
                if self.state != SessionState::Generating {
                    return false;
                }
                self.state = SessionState::Idle;
                self.task = None;
                false
            }
            SessionEvent::Failed => {
                self.state = SessionState::Failed;
                self.task = None;
                true
            }
        }
    }
}

/// The generation-relevant subset of [`AppEvent`], with the epoch peeled off.
#[derive(Debug)]
pub enum SessionEvent {
    Delta(String),
    Done,
    Failed,
}
