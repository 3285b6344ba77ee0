//! # Publish/Subscribe Client
//!
//! The transport port consumed by the orchestration service, and the
//! in-memory broker that implements it for single-process deployments and tests.

use crate::message::{QoS, TopicFilter, TransportMessage};
use crate::subscriber::{MessageStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Errors from transport operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Operation attempted before `connect` or after `disconnect`.
    #[error("Transport not connected")]
    NotConnected,

    /// Publish was refused or could not be confirmed.
    #[error("Publish to {topic} failed: {reason}")]
    PublishFailed { topic: String, reason: String },

    /// Subscribe was refused.
    #[error("Subscribe to {topic} failed: {reason}")]
    SubscribeFailed { topic: String, reason: String },

    /// Unsubscribe was refused.
    #[error("Unsubscribe from {topic} failed: {reason}")]
    UnsubscribeFailed { topic: String, reason: String },
}

/// Publish/subscribe client as seen by the C2 engine.
///
/// Implementations must be thread-safe (`Send + Sync`). Retries, if any,
/// belong to the implementation; the engine never retries a failed publish.
#[async_trait]
pub trait PubSubClient: Send + Sync {
    /// Open the connection to the broker.
    async fn connect(&self) -> Result<(), TransportError>;

    /// Close the connection to the broker.
    async fn disconnect(&self) -> Result<(), TransportError>;

    /// Subscribe to several topics at once.
    async fn subscribe_to_topics(&self, topics: &[String]) -> Result<(), TransportError>;

    /// Subscribe to a single topic.
    async fn subscribe_to_topic(&self, topic: &str) -> Result<(), TransportError> {
        self.subscribe_to_topics(&[topic.to_string()]).await
    }

    /// Drop the subscription to a topic.
    async fn unsubscribe_from_topic(&self, topic: &str) -> Result<(), TransportError>;

    /// Publish `payload` on `topic` with the requested delivery guarantee.
    ///
    /// Returns only once the transport has accepted the message at that guarantee.
    async fn publish(&self, payload: &[u8], topic: &str, qos: QoS) -> Result<(), TransportError>;
}

// =============================================================================
// IN-MEMORY BROKER
// =============================================================================

/// In-memory broker.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer semantics.
/// Suitable for single-process operation; distributed deployments plug an
/// MQTT or Kafka bridge into [`PubSubClient`] instead.
#[derive(Clone)]
pub struct InMemoryBroker {
    sender: broadcast::Sender<TransportMessage>,
    messages_published: Arc<AtomicU64>,
    capacity: usize,
}

impl InMemoryBroker {
    /// Create a new broker with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new broker with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            messages_published: Arc::new(AtomicU64::new(0)),
            capacity,
        }
    }

    /// Create a client attached to this broker. The client starts disconnected.
    #[must_use]
    pub fn client(&self, client_id: impl Into<String>) -> InMemoryPubSubClient {
        InMemoryPubSubClient {
            client_id: client_id.into(),
            sender: self.sender.clone(),
            messages_published: self.messages_published.clone(),
            connected: AtomicBool::new(false),
            subscriptions: RwLock::new(BTreeSet::new()),
        }
    }

    /// Listen to messages matching a filter, as a device would.
    #[must_use]
    pub fn subscribe(&self, filter: TopicFilter) -> Subscription {
        debug!(filter = ?filter, "New broker subscription");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Convenience wrapper returning a [`MessageStream`].
    #[must_use]
    pub fn message_stream(&self, filter: TopicFilter) -> MessageStream {
        MessageStream::new(self.subscribe(filter))
    }

    /// Number of active listeners.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total messages accepted by the broker.
    #[must_use]
    pub fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

/// Client handle onto an [`InMemoryBroker`].
pub struct InMemoryPubSubClient {
    client_id: String,
    sender: broadcast::Sender<TransportMessage>,
    messages_published: Arc<AtomicU64>,
    connected: AtomicBool,
    subscriptions: RwLock<BTreeSet<String>>,
}

impl InMemoryPubSubClient {
    /// Identifier given at creation.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Whether `connect` has been called without a later `disconnect`.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Topics this client currently subscribes to, sorted.
    pub fn subscribed_topics(&self) -> Vec<String> {
        self.subscriptions.read().iter().cloned().collect()
    }

    fn ensure_connected(&self) -> Result<(), TransportError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(TransportError::NotConnected)
        }
    }
}

#[async_trait]
impl PubSubClient for InMemoryPubSubClient {
    async fn connect(&self) -> Result<(), TransportError> {
        self.connected.store(true, Ordering::Release);
        info!(client_id = %self.client_id, "Connected to in-memory broker");
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        self.connected.store(false, Ordering::Release);
        self.subscriptions.write().clear();
        info!(client_id = %self.client_id, "Disconnected from in-memory broker");
        Ok(())
    }

    async fn subscribe_to_topics(&self, topics: &[String]) -> Result<(), TransportError> {
        self.ensure_connected()?;
        let mut subs = self.subscriptions.write();
        for topic in topics {
            subs.insert(topic.clone());
        }
        debug!(client_id = %self.client_id, count = topics.len(), "Subscribed to topics");
        Ok(())
    }

    async fn unsubscribe_from_topic(&self, topic: &str) -> Result<(), TransportError> {
        self.ensure_connected()?;
        self.subscriptions.write().remove(topic);
        debug!(client_id = %self.client_id, topic = topic, "Unsubscribed from topic");
        Ok(())
    }

    async fn publish(&self, payload: &[u8], topic: &str, qos: QoS) -> Result<(), TransportError> {
        self.ensure_connected()?;
        self.messages_published.fetch_add(1, Ordering::Relaxed);

        let message = TransportMessage {
            topic: topic.to_string(),
            payload: payload.to_vec(),
            qos,
        };
        // A broker accepts publishes on topics nobody listens to.
        let receivers = self.sender.send(message).unwrap_or(0);
        debug!(
            client_id = %self.client_id,
            topic = topic,
            qos = %qos,
            receivers = receivers,
            "Message published"
        );
        Ok(())
    }
}
