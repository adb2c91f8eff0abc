use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    pub value: String,
}

impl Property {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered key/value pairs attached to an event or a campaign.
///
/// Values are always strings. Serialized as a JSON array of
/// `{"key": .., "value": ..}` objects, which is also the storage encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag(Vec<Property>);

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push(Property::new(key, value));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Property> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|p| p.key.as_str())
    }

    /// Value of `key`; the last occurrence wins when a key is repeated.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    /// First key that appears more than once, if any.
    pub fn duplicate_key(&self) -> Option<&str> {
        let mut seen = HashSet::new();

        self.keys().find(|key| !seen.insert(*key))
    }

    /// Whether both bags declare exactly the same set of keys.
    pub fn key_set_matches(&self, other: &PropertyBag) -> bool {
        key_sets_match(self.keys(), other.keys())
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    pub fn from_json(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn into_inner(self) -> Vec<Property> {
        self.0
    }
}

impl From<Vec<Property>> for PropertyBag {
    fn from(value: Vec<Property>) -> Self {
        Self(value)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyBag {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| Property::new(k, v)).collect())
    }
}

impl IntoIterator for PropertyBag {
    type Item = Property;
    type IntoIter = std::vec::IntoIter<Property>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PropertyBag {
    type Item = &'a Property;
    type IntoIter = std::slice::Iter<'a, Property>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Exact key-set match between a campaign schema and an event.
///
/// Repeated keys count once and order is irrelevant: true iff both inputs
/// describe the same set of keys.
pub fn key_sets_match<'a, C, E>(campaign_keys: C, event_keys: E) -> bool
where
    C: IntoIterator<Item = &'a str>,
    E: IntoIterator<Item = &'a str>,
{
    let campaign_keys: HashSet<&str> = campaign_keys.into_iter().collect();
    let event_keys: HashSet<&str> = event_keys.into_iter().collect();

    campaign_keys.len() == event_keys.len()
        && event_keys.iter().all(|key| campaign_keys.contains(key))
}
