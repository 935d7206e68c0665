// Event types for async communication

use crate::models::HistoryEntry;

/// Events sent from spawned tasks back to the UI loop. Generation events
/// carry the epoch of the session that produced them; the controller drops
/// anything from a superseded epoch.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A fragment of generated text arrived.
    GenerationDelta { epoch: u64, content: String },
    /// The stream finished (sentinel seen or stream ended cleanly).
    GenerationDone { epoch: u64 },
    /// The request or a mid-stream read failed.
    GenerationFailed { epoch: u64, error: String },
    /// A history fetch completed.
    HistoryLoaded(Vec<HistoryEntry>),
    /// A history fetch failed; the previous list is kept.
    HistoryFailed(String),
}
