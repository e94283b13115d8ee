//! Parser for semi-structured `key=value;key=value` columns.
//!
//! Both the VCF INFO column and GFF column 9 use this layout. Keys without a
//! `=` are flags and carry no value.

use std::fmt;

use indexmap::IndexMap;

/// Ordered mapping of keys to optional values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValues(IndexMap<String, Option<String>>);

impl KeyValues {
    /// Parse a `;`-separated list of `key=value` pairs.
    ///
    /// `.` and the empty string are both the empty map. Empty entries are
    /// skipped and a repeated key keeps its first position but its last value.
    pub fn parse(raw: &str) -> Self {
        let mut map = IndexMap::new();
        let raw = raw.trim();
        if raw.is_empty() || raw == "." {
            return Self(map);
        }

        for entry in raw.split(';') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            match entry.split_once('=') {
                Some((key, value)) => {
                    map.insert(key.trim().to_string(), Some(value.trim().to_string()))
                }
                None => map.insert(entry.to_string(), None),
            };
        }

        Self(map)
    }

    /// The value of `key`, if present and not a flag.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_deref())
    }

    /// The raw entry for `key`: `Some(None)` for a flag.
    pub fn lookup(&self, key: &str) -> Option<Option<&str>> {
        self.0.get(key).map(|v| v.as_deref())
    }

    /// The first non-empty value among `keys`, in the order given.
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.get(k))
            .find(|v| !v.is_empty())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for KeyValues {
    /// Writes the VCF form, `.` when empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, ".");
        }
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ";")?;
            }
            match value {
                Some(value) => write!(f, "{}={}", key, value)?,
                None => write!(f, "{}", key)?,
            }
        }
        Ok(())
    }
}
