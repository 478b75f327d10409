//! Insertion-ordered text → URL mapping

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Mapping from visible link text to absolute URL
///
/// Keeps the position of the first insertion of each text while the last
/// write wins on the URL, so lookups like "first navigation link mentioning
/// jobs" follow document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl LinkMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the URL for `text`
    pub fn insert(&mut self, text: impl Into<String>, url: impl Into<String>) {
        let text = text.into();
        let url = url.into();
        match self.index.get(&text) {
            Some(&position) => self.entries[position].1 = url,
            None => {
                self.index.insert(text.clone(), self.entries.len());
                self.entries.push((text, url));
            }
        }
    }

    /// URL recorded for `text`
    pub fn get(&self, text: &str) -> Option<&str> {
        self.index
            .get(text)
            .map(|&position| self.entries[position].1.as_str())
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(text, url)| (text.as_str(), url.as_str()))
    }

    /// First URL whose text contains one of `keywords`, ignoring case
    pub fn find_by_text(&self, keywords: &[&str]) -> Option<&str> {
        self.iter()
            .find(|(text, _)| {
                let text = text.to_lowercase();
                keywords.iter().any(|keyword| text.contains(keyword))
            })
            .map(|(_, url)| url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for LinkMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (text, url) in &self.entries {
            map.serialize_entry(text, url)?;
        }
        map.end()
    }
}
