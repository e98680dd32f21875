//! Quest lifecycle notifications.
//!
//! The quest manager reports every state change to its registered sinks.
//! Sinks are plain observers: they cannot reach back into the manager.

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use saga_common::QuestId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Something that happened to a quest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuestEvent {
    /// Quest moved into the available partition
    Available {
        /// Quest ID
        quest_id: QuestId,
    },
    /// Quest started
    Started {
        /// Quest ID
        quest_id: QuestId,
    },
    /// Objective progress moved without completing
    ObjectiveProgressed {
        /// Quest ID
        quest_id: QuestId,
        /// Objective ID
        objective_id: String,
        /// Progress after the change
        current: u32,
        /// Requirement
        required: u32,
    },
    /// Objective completed
    ObjectiveCompleted {
        /// Quest ID
        quest_id: QuestId,
        /// Objective ID
        objective_id: String,
    },
    /// Quest completed
    Completed {
        /// Quest ID
        quest_id: QuestId,
    },
    /// Quest failed
    Failed {
        /// Quest ID
        quest_id: QuestId,
        /// Failure reason
        reason: String,
    },
    /// Quest abandoned by the player
    Abandoned {
        /// Quest ID
        quest_id: QuestId,
    },
    /// Quest returned to not-started
    Reset {
        /// Quest ID
        quest_id: QuestId,
    },
    /// A reward was paid out
    RewardGranted {
        /// Quest ID
        quest_id: QuestId,
        /// Reward description
        description: String,
    },
}

impl QuestEvent {
    /// Quest the event concerns.
    #[must_use]
    pub const fn quest_id(&self) -> &QuestId {
        match self {
            Self::Available { quest_id }
            | Self::Started { quest_id }
            | Self::ObjectiveProgressed { quest_id, .. }
            | Self::ObjectiveCompleted { quest_id, .. }
            | Self::Completed { quest_id }
            | Self::Failed { quest_id, .. }
            | Self::Abandoned { quest_id }
            | Self::Reset { quest_id }
            | Self::RewardGranted { quest_id, .. } => quest_id,
        }
    }
}

/// Observer of quest events.
pub trait QuestEventSink: Send + Sync {
    /// Handles an event.
    fn handle(&self, event: &QuestEvent);
}

/// Sink that keeps every event in memory. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<QuestEvent>>>,
}

impl RecordingSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every event recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<QuestEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Forgets all recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl QuestEventSink for RecordingSink {
    fn handle(&self, event: &QuestEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Bounded channel that buffers events for another system to drain.
#[derive(Debug)]
pub struct QuestEventBus {
    sender: Sender<QuestEvent>,
    receiver: Receiver<QuestEvent>,
    capacity: usize,
}

impl Default for QuestEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl QuestEventBus {
    /// Creates a bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<QuestEvent> {
        self.receiver.try_iter().collect()
    }

    /// Number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sink handle that publishes into this bus.
    #[must_use]
    pub fn sink(&self) -> ChannelSink {
        ChannelSink {
            sender: self.sender.clone(),
        }
    }
}

/// Sink end of a [`QuestEventBus`].
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<QuestEvent>,
}

impl QuestEventSink for ChannelSink {
    fn handle(&self, event: &QuestEvent) {
        // Non-blocking send; a full bus drops the event
        let _ = self.sender.try_send(event.clone());
    }
}
