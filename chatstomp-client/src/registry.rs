//! Subscription registry
//!
//! Maps subscription ids to delivery callbacks and routes inbound MESSAGE
//! frames by their `subscription` header. Frames for unknown subscriptions
//! are dropped: the server may still reference a subscription the client
//! has already removed.

use chatstomp_core::Frame;
use std::collections::HashMap;
use std::fmt;

/// Callback invoked with the body and the full frame of each delivery
pub type MessageCallback = Box<dyn FnMut(&str, &Frame) + Send>;

/// Outcome of routing one MESSAGE frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The frame was handed to the callback of this subscription
    Delivered(String),
    /// The frame carried no `subscription` header
    MissingSubscription,
    /// No callback is registered for this subscription
    Unrouted(String),
}

/// Subscription id to callback map, scoped to one connection
#[derive(Default)]
pub struct SubscriptionRegistry {
    callbacks: HashMap<String, MessageCallback>,
}

impl fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("subscriptions", &self.ids())
            .finish()
    }
}

impl SubscriptionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` under `id`, replacing any previous one
    pub fn register(&mut self, id: impl Into<String>, callback: MessageCallback) {
        self.callbacks.insert(id.into(), callback);
    }

    /// Remove the callback for `id`; returns whether one was registered
    pub fn remove(&mut self, id: &str) -> bool {
        self.callbacks.remove(id).is_some()
    }

    /// Check if `id` is registered
    pub fn contains(&self, id: &str) -> bool {
        self.callbacks.contains_key(id)
    }

    /// Route a MESSAGE frame to its subscription callback
    pub fn dispatch(&mut self, frame: &Frame) -> Dispatch {
        let Some(id) = frame.headers.subscription() else {
            tracing::debug!("MESSAGE without subscription header dropped");
            return Dispatch::MissingSubscription;
        };

        match self.callbacks.get_mut(id) {
            Some(callback) => {
                callback(&frame.body, frame);
                Dispatch::Delivered(id.to_string())
            }
            None => {
                tracing::debug!(subscription = id, "MESSAGE for unknown subscription dropped");
                Dispatch::Unrouted(id.to_string())
            }
        }
    }

    /// Drop every subscription
    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    /// Number of registered subscriptions
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Check if no subscription is registered
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.callbacks.keys().cloned().collect();
        ids.sort();
        ids
    }
}
