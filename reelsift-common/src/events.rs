//! Event types for the reelsift event system
//!
//! Session state changes are broadcast through [`EventBus`] so the view layer can
//! follow search cycles without polling. Events serialize for SSE transmission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Which stage of a search cycle failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Catalog search failed or returned non-success
    SearchUnavailable,
    /// Metadata lookups failed under the all-or-nothing policy
    EnrichmentFailed,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::SearchUnavailable => "search_unavailable",
            FailureKind::EnrichmentFailed => "enrichment_failed",
        }
    }
}

/// Reelsift event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReelsiftEvent {
    /// A filter change initiated a new search cycle
    SearchStarted {
        cycle: u64,
        /// Query body sent to the catalog
        query: serde_json::Value,
        timestamp: DateTime<Utc>,
    },

    /// The latest cycle resolved and its movies replaced the displayed list
    ResultsUpdated {
        cycle: u64,
        movie_count: usize,
        /// External ids whose metadata lookup failed (partial-success policy)
        failed_ids: Vec<String>,
        timestamp: DateTime<Utc>,
    },

    /// The latest cycle failed; the displayed list is now an error state
    SearchFailed {
        cycle: u64,
        kind: FailureKind,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// A superseded cycle resolved late and its result was dropped
    CycleDiscarded {
        cycle: u64,
        /// Latest initiated cycle at the time of discard
        latest: u64,
        timestamp: DateTime<Utc>,
    },

    /// The selection set was mutated
    SelectionChanged {
        selected_ids: Vec<String>,
        timestamp: DateTime<Utc>,
    },
}

impl ReelsiftEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            ReelsiftEvent::SearchStarted { .. } => "SearchStarted",
            ReelsiftEvent::ResultsUpdated { .. } => "ResultsUpdated",
            ReelsiftEvent::SearchFailed { .. } => "SearchFailed",
            ReelsiftEvent::CycleDiscarded { .. } => "CycleDiscarded",
            ReelsiftEvent::SelectionChanged { .. } => "SelectionChanged",
        }
    }
}

/// Broadcast bus for [`ReelsiftEvent`]s
///
/// Slow subscribers lose the oldest events once `capacity` is exceeded.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ReelsiftEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// ```
    /// use reelsift_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.capacity(), 100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ReelsiftEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ReelsiftEvent,
    ) -> Result<usize, broadcast::error::SendError<ReelsiftEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: ReelsiftEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
