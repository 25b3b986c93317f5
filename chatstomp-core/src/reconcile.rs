//! Chat message reconciliation
//!
//! Message batches arrive from two directions: pages fetched over REST and
//! single messages delivered over a subscription. Both are folded into one
//! list that is unique by message id and sorted ascending by that id.
//!
//! Ids are compared by their string form, so `1` and `"1"` are the same
//! message. Records without an id are keyed by their position in the batch
//! they came from and are never merged with each other. Ids that are not
//! finite numbers (or numeric strings) sort after every numeric id.

use serde_json::Value;
use std::collections::HashMap;

/// Identifier carried by a chat message
#[derive(Debug, Clone, PartialEq)]
pub enum MessageId {
    /// Numeric id
    Number(f64),
    /// Textual id, possibly numeric
    Text(String),
}

impl MessageId {
    /// Ascending sort key; anything non-numeric maps to positive infinity
    ///
    /// Textual ids read like JavaScript's `Number()`: blank text is zero and
    /// `0x`, `0o` and `0b` prefixes select a radix.
    pub fn sort_key(&self) -> f64 {
        let value = match self {
            MessageId::Number(n) => Some(*n),
            MessageId::Text(s) => parse_numeric(s),
        };
        value.filter(|n| n.is_finite()).unwrap_or(f64::INFINITY)
    }

    /// Identity used for deduplication
    pub fn key(&self) -> String {
        match self {
            MessageId::Number(n) => n.to_string(),
            MessageId::Text(s) => s.clone(),
        }
    }
}

fn parse_numeric(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0.0);
    }

    let radix = match text.get(..2).map(str::to_ascii_lowercase).as_deref() {
        Some("0x") => 16,
        Some("0o") => 8,
        Some("0b") => 2,
        _ => return text.parse().ok(),
    };
    let digits = &text[2..];
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0, |acc: f64, c| {
        c.to_digit(radix)
            .map(|digit| acc * f64::from(radix) + f64::from(digit))
    })
}

impl From<i64> for MessageId {
    fn from(id: i64) -> Self {
        MessageId::Number(id as f64)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        MessageId::Text(id.to_string())
    }
}

/// A record the reconciler can key and order
pub trait HasMessageId {
    /// The record's id, if it has one
    fn message_id(&self) -> Option<MessageId>;

    /// Placeholder records are dropped from merges entirely
    fn is_placeholder(&self) -> bool {
        false
    }
}

impl HasMessageId for Value {
    fn message_id(&self) -> Option<MessageId> {
        match self.get("id")? {
            Value::Null => None,
            Value::Number(n) => n.as_f64().map(MessageId::Number),
            Value::String(s) => Some(MessageId::Text(s.clone())),
            other => Some(MessageId::Text(other.to_string())),
        }
    }

    fn is_placeholder(&self) -> bool {
        self.is_null()
    }
}

/// Sort key of a record: its numeric id, or positive infinity
pub fn sort_key<M: HasMessageId + ?Sized>(message: &M) -> f64 {
    message
        .message_id()
        .map_or(f64::INFINITY, |id| id.sort_key())
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum MergeKey {
    Id(String),
    Existing(usize),
    Incoming(usize),
}

/// Merge `incoming` into `existing`
///
/// Incoming records replace existing ones with the same id while keeping
/// the slot of the first occurrence; the result is sorted ascending by
/// [`sort_key`], ties keeping that slot order. Inputs are not modified.
pub fn merge<M: HasMessageId + Clone>(existing: &[M], incoming: &[M]) -> Vec<M> {
    let mut slots: Vec<M> = Vec::with_capacity(existing.len() + incoming.len());
    let mut positions: HashMap<MergeKey, usize> = HashMap::new();

    let batches: [(&[M], fn(usize) -> MergeKey); 2] = [
        (existing, MergeKey::Existing),
        (incoming, MergeKey::Incoming),
    ];
    for (batch, positional) in batches {
        for (index, message) in batch.iter().enumerate() {
            if message.is_placeholder() {
                continue;
            }
            let key = message
                .message_id()
                .map_or_else(|| positional(index), |id| MergeKey::Id(id.key()));
            match positions.get(&key) {
                Some(&slot) => slots[slot] = message.clone(),
                None => {
                    positions.insert(key, slots.len());
                    slots.push(message.clone());
                }
            }
        }
    }

    let mut keyed: Vec<(f64, M)> = slots.into_iter().map(|m| (sort_key(&m), m)).collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().map(|(_, m)| m).collect()
}

/// A message list kept merged and sorted
#[derive(Debug, Clone, PartialEq)]
pub struct MessageList<M> {
    messages: Vec<M>,
}

impl<M> Default for MessageList<M> {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
        }
    }
}

impl<M: HasMessageId + Clone> MessageList<M> {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list from an unordered batch
    pub fn from_batch(batch: &[M]) -> Self {
        Self {
            messages: merge(&[], batch),
        }
    }

    /// Fold a batch into the list
    pub fn merge(&mut self, incoming: &[M]) {
        self.messages = merge(&self.messages, incoming);
    }

    /// Fold a single delivered message into the list
    pub fn push(&mut self, message: M) {
        self.merge(std::slice::from_ref(&message));
    }

    /// Drop every message
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Messages in ascending id order
    pub fn as_slice(&self) -> &[M] {
        &self.messages
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Take the ordered messages
    pub fn into_vec(self) -> Vec<M> {
        self.messages
    }
}
