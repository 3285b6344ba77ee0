//! # Recording Client
//!
//! A [`PubSubClient`] that keeps every publish in memory and can be told to
//! fail. Used by tests to assert exactly what a device would have received and
//! to check that nothing is persisted when delivery fails.

use crate::client::{PubSubClient, TransportError};
use crate::message::{QoS, TransportMessage};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeSet;

#[derive(Default)]
struct RecordingState {
    connected: bool,
    published: Vec<TransportMessage>,
    subscriptions: BTreeSet<String>,
    fail_publishes: bool,
    publishes_before_failure: Option<usize>,
    fail_subscriptions: bool,
}

/// In-memory transport double with failure injection.
#[derive(Default)]
pub struct RecordingPubSubClient {
    state: Mutex<RecordingState>,
}

impl RecordingPubSubClient {
    /// Create a disconnected client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client that is already connected.
    pub fn connected() -> Self {
        let client = Self::new();
        client.state.lock().connected = true;
        client
    }

    /// Every successful publish, in order.
    pub fn published(&self) -> Vec<TransportMessage> {
        self.state.lock().published.clone()
    }

    /// Successful publishes on one topic, in order.
    pub fn published_to(&self, topic: &str) -> Vec<TransportMessage> {
        self.state
            .lock()
            .published
            .iter()
            .filter(|m| m.topic == topic)
            .cloned()
            .collect()
    }

    /// Topics currently subscribed, sorted.
    pub fn subscribed_topics(&self) -> Vec<String> {
        self.state.lock().subscriptions.iter().cloned().collect()
    }

    /// Make every following publish fail (or succeed again).
    pub fn set_fail_publishes(&self, fail: bool) {
        let mut state = self.state.lock();
        state.fail_publishes = fail;
        state.publishes_before_failure = None;
    }

    /// Let `count` more publishes succeed, then fail the rest.
    pub fn fail_publishes_after(&self, count: usize) {
        let mut state = self.state.lock();
        state.fail_publishes = false;
        state.publishes_before_failure = Some(count);
    }

    /// Make subscribe and unsubscribe fail (or succeed again).
    pub fn set_fail_subscriptions(&self, fail: bool) {
        self.state.lock().fail_subscriptions = fail;
    }

    /// Forget recorded publishes.
    pub fn clear(&self) {
        self.state.lock().published.clear();
    }
}

#[async_trait]
impl PubSubClient for RecordingPubSubClient {
    async fn connect(&self) -> Result<(), TransportError> {
        self.state.lock().connected = true;
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.connected = false;
        state.subscriptions.clear();
        Ok(())
    }

    async fn subscribe_to_topics(&self, topics: &[String]) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if !state.connected {
            return Err(TransportError::NotConnected);
        }
        if state.fail_subscriptions {
            return Err(TransportError::SubscribeFailed {
                topic: topics.join(","),
                reason: "injected failure".to_string(),
            });
        }
        state.subscriptions.extend(topics.iter().cloned());
        Ok(())
    }

    async fn unsubscribe_from_topic(&self, topic: &str) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if !state.connected {
            return Err(TransportError::NotConnected);
        }
        if state.fail_subscriptions {
            return Err(TransportError::UnsubscribeFailed {
                topic: topic.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        state.subscriptions.remove(topic);
        Ok(())
    }

    async fn publish(&self, payload: &[u8], topic: &str, qos: QoS) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if !state.connected {
            return Err(TransportError::NotConnected);
        }

        let budget_exhausted = match state.publishes_before_failure.as_mut() {
            Some(0) => true,
            Some(remaining) => {
                *remaining -= 1;
                false
            }
            None => false,
        };
        if state.fail_publishes || budget_exhausted {
            return Err(TransportError::PublishFailed {
                topic: topic.to_string(),
                reason: "injected failure".to_string(),
            });
        }

        state.published.push(TransportMessage {
            topic: topic.to_string(),
            payload: payload.to_vec(),
            qos,
        });
        Ok(())
    }
}
