use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

use crate::types::{ChatError, ChatMessage, Delivery};

/// Settings for the chat channel
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Messages buffered per participant before new ones are dropped for them (default: 64)
    pub queue_capacity: usize,

    /// Longest accepted message body, in characters (default: 2000)
    pub max_body_len: usize,

    /// Longest accepted sender name, in characters (default: 100)
    pub max_sender_len: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            max_body_len: 2000,
            max_sender_len: 100,
        }
    }
}

/// Identifier of a connected participant, unique for the lifetime of the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantId(u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "participant-{}", self.0)
    }
}

type Registry = HashMap<ParticipantId, mpsc::Sender<ChatMessage>>;

struct HubInner {
    participants: Mutex<Registry>,
    next_id: AtomicU64,
    config: ChatConfig,
}

impl HubInner {
    fn participants(&self) -> MutexGuard<'_, Registry> {
        // The map stays consistent even if a holder panicked
        self.participants
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn leave(&self, id: ParticipantId) {
        if self.participants().remove(&id).is_some() {
            info!("💬 {} left the chat", id);
        }
    }
}

/// The chat channel: a registry of participant queues and a fan-out publish.
///
/// Cloning the hub is cheap; clones share the same participants.
#[derive(Clone)]
pub struct ChatHub {
    inner: Arc<HubInner>,
}

impl ChatHub {
    /// Creates an empty channel
    pub fn new(config: ChatConfig) -> Self {
        Self {
            inner: Arc::new(HubInner {
                participants: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                config,
            }),
        }
    }

    /// Registers a new participant. The participant stays registered until the
    /// returned subscription is dropped.
    pub fn join(&self) -> Subscription {
        let id = ParticipantId(self.inner.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = mpsc::channel(self.inner.config.queue_capacity.max(1));

        self.inner.participants().insert(id, sender);
        info!("💬 {} joined the chat", id);

        Subscription {
            id,
            receiver,
            hub: Arc::clone(&self.inner),
        }
    }

    /// Number of currently registered participants
    pub fn participant_count(&self) -> usize {
        self.inner.participants().len()
    }

    /// Publishes a message to every participant registered at this moment,
    /// the sender included.
    ///
    /// Enqueueing never waits: a participant whose queue is full misses this
    /// message, and a participant whose queue is closed is unregistered.
    /// Publishes are enqueued under the registry lock, so every participant
    /// sees messages in the order the hub accepted them.
    pub fn publish(&self, sender_name: &str, body: &str) -> Result<Delivery, ChatError> {
        let message = self.validate(sender_name, body)?;
        let mut delivery = Delivery::default();

        let mut participants = self.inner.participants();
        let mut closed = Vec::new();

        for (id, queue) in participants.iter() {
            match queue.try_send(message.clone()) {
                Ok(()) => delivery.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!("Queue full for {}, message dropped", id);
                    delivery.dropped += 1;
                }
                Err(TrySendError::Closed(_)) => closed.push(*id),
            }
        }

        for id in closed {
            participants.remove(&id);
            debug!("Removed disconnected {}", id);
        }

        debug!(
            "Message from {} delivered to {} participants ({} dropped)",
            message.sender_name, delivery.delivered, delivery.dropped
        );

        Ok(delivery)
    }

    fn validate(&self, sender_name: &str, body: &str) -> Result<ChatMessage, ChatError> {
        let config = &self.inner.config;
        let sender_name = sender_name.trim();

        if sender_name.is_empty() {
            return Err(ChatError::Validation("Sender name is required".to_string()));
        }
        if sender_name.chars().count() > config.max_sender_len {
            return Err(ChatError::Validation(format!(
                "Sender name must be at most {} characters",
                config.max_sender_len
            )));
        }
        if body.trim().is_empty() {
            return Err(ChatError::Validation("Message body is required".to_string()));
        }
        if body.chars().count() > config.max_body_len {
            return Err(ChatError::Validation(format!(
                "Message body must be at most {} characters",
                config.max_body_len
            )));
        }

        Ok(ChatMessage {
            sender_name: sender_name.to_string(),
            body: body.to_string(),
            sent_at: Utc::now(),
        })
    }
}

/// A participant's membership in the chat. Dropping it leaves the channel.
pub struct Subscription {
    id: ParticipantId,
    receiver: mpsc::Receiver<ChatMessage>,
    hub: Arc<HubInner>,
}

impl Subscription {
    /// Identifier of this participant
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// Waits for the next message addressed to this participant.
    pub async fn recv(&mut self) -> Option<ChatMessage> {
        self.receiver.recv().await
    }

    /// Returns the next queued message without waiting.
    pub fn try_recv(&mut self) -> Option<ChatMessage> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.leave(self.id);
    }
}
