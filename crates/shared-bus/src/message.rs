//! # Transport Messages
//!
//! What travels over the broker, and how subscribers select it.

use std::fmt;

/// Delivery guarantee requested for a publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QoS {
    /// Fire and forget. Used for topic broadcast payloads.
    AtMostOnce = 0,
    /// Delivered, possibly more than once.
    AtLeastOnce = 1,
    /// Delivered exactly once. Used for client control commands.
    ExactlyOnce = 2,
}

impl fmt::Display for QoS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "qos{}", *self as u8)
    }
}

/// A payload published on a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportMessage {
    /// Destination topic.
    pub topic: String,
    /// Opaque (usually protected) bytes.
    pub payload: Vec<u8>,
    /// Requested delivery guarantee.
    pub qos: QoS,
}

/// Selects which messages a subscription receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicFilter {
    /// Every message.
    All,
    /// Messages on exactly this topic.
    Exact(String),
    /// Messages on any topic starting with this prefix.
    Prefix(String),
}

impl TopicFilter {
    /// Filter for a single topic.
    pub fn exact(topic: impl Into<String>) -> Self {
        Self::Exact(topic.into())
    }

    /// Filter for a topic prefix.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    /// Whether a message on `topic` passes this filter.
    pub fn matches(&self, topic: &str) -> bool {
        match self {
            TopicFilter::All => true,
            TopicFilter::Exact(t) => t == topic,
            TopicFilter::Prefix(p) => topic.starts_with(p.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matching() {
        assert!(TopicFilter::All.matches("anything"));
        assert!(TopicFilter::exact("e4/ab").matches("e4/ab"));
        assert!(!TopicFilter::exact("e4/ab").matches("e4/abc"));
        assert!(TopicFilter::prefix("e4/").matches("e4/abc"));
        assert!(!TopicFilter::prefix("e4/").matches("sensors"));
    }

    #[test]
    fn test_qos_ordering() {
        assert!(QoS::ExactlyOnce > QoS::AtLeastOnce);
        assert!(QoS::AtLeastOnce > QoS::AtMostOnce);
        assert_eq!(QoS::ExactlyOnce.to_string(), "qos2");
    }
}
