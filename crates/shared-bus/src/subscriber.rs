//! # Subscriber
//!
//! Receiving side of the in-memory broker, used by simulated devices and
//! monitoring code.

use crate::message::{TopicFilter, TransportMessage};
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The broker was dropped.
    #[error("Broker closed")]
    Closed,
}

/// A subscription handle for receiving messages.
pub struct Subscription {
    receiver: broadcast::Receiver<TransportMessage>,
    filter: TopicFilter,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<TransportMessage>,
        filter: TopicFilter,
    ) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next message that matches the filter.
    ///
    /// # Returns
    ///
    /// - `Some(message)` - The next matching message
    /// - `None` - The broker was dropped
    pub async fn recv(&mut self) -> Option<TransportMessage> {
        loop {
            let message = match self.receiver.recv().await {
                Ok(m) => m,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, some messages dropped");
                    continue;
                }
            };

            if self.filter.matches(&message.topic) {
                return Some(message);
            }
        }
    }

    /// Try to receive the next matching message without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(message))` - A message was available and matched
    /// - `Ok(None)` - Nothing available
    /// - `Err(SubscriptionError::Closed)` - The broker was dropped
    pub fn try_recv(&mut self) -> Result<Option<TransportMessage>, SubscriptionError> {
        loop {
            let message = match self.receiver.try_recv() {
                Ok(m) => m,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.filter.matches(&message.topic) {
                return Ok(Some(message));
            }
        }
    }

    /// Drain every matching message currently buffered.
    pub fn drain(&mut self) -> Vec<TransportMessage> {
        let mut out = Vec::new();
        while let Ok(Some(message)) = self.try_recv() {
            out.push(message);
        }
        out
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &TopicFilter {
        &self.filter
    }
}

/// A stream wrapper for subscriptions.
///
/// Implements `tokio_stream::Stream` for use with stream combinators.
pub struct MessageStream {
    inner: BroadcastStream<TransportMessage>,
    filter: TopicFilter,
}

impl MessageStream {
    /// Create a new message stream from a subscription.
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        Self {
            inner: BroadcastStream::new(subscription.receiver),
            filter: subscription.filter,
        }
    }

    /// Get the filter for this stream.
    #[must_use]
    pub fn filter(&self) -> &TopicFilter {
        &self.filter
    }
}

impl Stream for MessageStream {
    type Item = TransportMessage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match ready!(Pin::new(&mut self.inner).poll_next(cx)) {
                Some(Ok(message)) if self.filter.matches(&message.topic) => {
                    return Poll::Ready(Some(message))
                }
                Some(Ok(_)) => continue,
                Some(Err(BroadcastStreamRecvError::Lagged(count))) => {
                    debug!(lagged = count, "Stream lagged, some messages dropped");
                    continue;
                }
                None => return Poll::Ready(None),
            }
        }
    }
}
