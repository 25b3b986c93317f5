//! Ordered STOMP header lists
//!
//! Headers keep the order in which keys were first inserted so that encoded
//! frames are reproducible, while lookups go by key. Setting an existing key
//! replaces its value in place, which gives the default/override precedence
//! used when building outgoing frames: apply the defaults first, then the
//! caller's headers.

use std::fmt;

/// A single header entry
///
/// A `None` value marks a suppressed header: the key keeps its position but
/// the entry is skipped when the frame is encoded. Callers use this to drop a
/// default such as `content-type` from an outgoing frame.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Header {
    /// Header name
    pub key: String,
    /// Header value, `None` when suppressed
    pub value: Option<String>,
}

impl Header {
    /// Create a header with a value
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// Create a suppressed header
    pub fn suppressed(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    /// Check whether this entry is skipped on the wire
    pub fn is_suppressed(&self) -> bool {
        self.value.is_none()
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}:{}", self.key, value),
            None => write!(f, "{}:<suppressed>", self.key),
        }
    }
}

/// Insertion-ordered header mapping
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeaderList {
    headers: Vec<Header>,
}

impl HeaderList {
    /// Create an empty header list
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty header list with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            headers: Vec::with_capacity(capacity),
        }
    }

    /// Set `key` to `value`, keeping the key's original position if present
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.put(Header::new(key, value));
    }

    /// Suppress `key` so it is not written, keeping its position if present
    pub fn suppress(&mut self, key: impl Into<String>) {
        self.put(Header::suppressed(key));
    }

    /// Insert a prepared entry with set/replace semantics
    pub fn put(&mut self, header: Header) {
        match self.headers.iter_mut().find(|h| h.key == header.key) {
            Some(existing) => existing.value = header.value,
            None => self.headers.push(header),
        }
    }

    /// Builder-style [`HeaderList::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Look up the value of `key`; suppressed entries read as absent
    pub fn get(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.key == key)
            .and_then(|h| h.value.as_deref())
    }

    /// Check whether `key` has a value
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove `key` entirely, returning its value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.headers.iter().position(|h| h.key == key)?;
        self.headers.remove(index).value
    }

    /// Iterate over the headers that will be written, in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.headers
            .iter()
            .filter_map(|h| h.value.as_deref().map(|value| (h.key.as_str(), value)))
    }

    /// All entries, including suppressed ones
    pub fn entries(&self) -> &[Header] {
        &self.headers
    }

    /// Number of headers that will be written
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Check whether no header will be written
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply `overrides` on top of `self`
    ///
    /// Keys already present keep their position and take the override's
    /// value (or suppression); unseen keys are appended in override order.
    pub fn with_overrides(mut self, overrides: &HeaderList) -> Self {
        for header in &overrides.headers {
            self.put(header.clone());
        }
        self
    }

    /// Value of the `destination` header
    pub fn destination(&self) -> Option<&str> {
        self.get("destination")
    }

    /// Value of the `subscription` header carried by MESSAGE frames
    pub fn subscription(&self) -> Option<&str> {
        self.get("subscription")
    }

    /// Value of the `id` header carried by SUBSCRIBE/UNSUBSCRIBE frames
    pub fn id(&self) -> Option<&str> {
        self.get("id")
    }

    /// Value of the `message-id` header
    pub fn message_id(&self) -> Option<&str> {
        self.get("message-id")
    }

    /// Value of the `message` header carried by ERROR frames
    pub fn message(&self) -> Option<&str> {
        self.get("message")
    }

    /// Value of the `version` header carried by CONNECTED frames
    pub fn version(&self) -> Option<&str> {
        self.get("version")
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderList
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut list = HeaderList::new();
        list.extend(iter);
        list
    }
}

impl<K, V> Extend<(K, V)> for HeaderList
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

/// Build a [`HeaderList`] from `key => value` pairs
#[macro_export]
macro_rules! header_list {
    () => {
        $crate::header::HeaderList::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut list = $crate::header::HeaderList::new();
        $(list.set($key, $value);)+
        list
    }};
}
