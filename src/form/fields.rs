//! Input primitives shared by every editor.
//!
//! [`NumberInput`] carries the one numeric-field rule of the form: an empty,
//! non-numeric or non-finite input is *absent*, never `0`, `null` or `NaN`.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

use crate::error::ValidationErrors;
use crate::monitor::config::HeaderMap;

pub trait NumericValue: FromStr + Copy {
    fn is_valid(&self) -> bool {
        true
    }
}

impl NumericValue for u16 {}
impl NumericValue for u32 {}
impl NumericValue for u64 {}
impl NumericValue for i64 {}

impl NumericValue for f64 {
    fn is_valid(&self) -> bool {
        self.is_finite()
    }
}

/// Raw text of a numeric input box.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NumberInput(String);

impl NumberInput {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn from_value<T: Display>(value: T) -> Self {
        Self(value.to_string())
    }

    pub fn from_optional<T: Display>(value: Option<T>) -> Self {
        value.map(Self::from_value).unwrap_or_default()
    }

    pub fn set(&mut self, raw: impl Into<String>) {
        self.0 = raw.into();
    }

    pub fn raw(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Parsed value, or `None` when the input is empty or unusable.
    pub fn value<T: NumericValue>(&self) -> Option<T> {
        self.0.trim().parse::<T>().ok().filter(|v| v.is_valid())
    }

    /// Like [`value`](Self::value). Unusable text still counts as absent; it
    /// is only logged so the payload never blocks on it.
    pub fn read<T: NumericValue>(&self, field: &str) -> Option<T> {
        let value = self.value::<T>();
        if value.is_none() && !self.is_blank() {
            debug!(field, raw = %self.0.trim(), "Ignoring non-numeric input");
        }
        value
    }

    /// Reads a value and checks it against an inclusive range. Only an
    /// out-of-range number is reported.
    pub fn read_in_range<T>(&self, field: &str, min: T, max: T, errors: &mut ValidationErrors) -> Option<T>
    where
        T: NumericValue + PartialOrd + Display,
    {
        let value = self.read::<T>(field)?;
        if value < min || value > max {
            errors.push(field, format!("Must be between {min} and {max}"));
            return None;
        }
        Some(value)
    }

    /// Reads a TCP/UDP port. Numbers above 65535 are reported as out of
    /// range rather than dropped as unparsable.
    pub fn read_port(&self, field: &str, errors: &mut ValidationErrors) -> Option<u16> {
        let port = self.read_in_range::<u64>(field, 1, u64::from(u16::MAX), errors)?;
        u16::try_from(port).ok()
    }

    /// Whether the box holds an unsigned integer at all.
    pub fn has_integer(&self) -> bool {
        self.value::<u64>().is_some()
    }
}

impl<'de> Deserialize<'de> for NumberInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
            Float(f64),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => NumberInput(text),
            Raw::Int(value) => NumberInput::from_value(value),
            Raw::Float(value) => NumberInput::from_value(value),
        })
    }
}

/// Trimmed text, or `None` when blank.
pub fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Untrimmed text (secrets, bodies), or `None` when blank.
pub fn optional_raw(raw: &str) -> Option<String> {
    (!raw.trim().is_empty()).then(|| raw.to_string())
}

/// Splits comma- or newline-delimited input into trimmed, non-empty items.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_list(items: &[String]) -> String {
    items.join(", ")
}

/// One row of a key/value list editor (headers, gRPC metadata).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderPair {
    pub key: String,
    pub value: String,
}

impl HeaderPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Converts rows to a mapping. Keys are trimmed and values kept as entered;
/// rows with a blank key or value are dropped and on duplicate keys the last
/// row wins.
pub fn pairs_to_map(pairs: &[HeaderPair]) -> HeaderMap {
    pairs
        .iter()
        .filter_map(|pair| {
            let key = pair.key.trim();
            (!key.is_empty() && !pair.value.trim().is_empty()).then(|| (key.to_string(), pair.value.clone()))
        })
        .collect()
}

pub fn map_to_pairs(map: &HeaderMap) -> ListField<HeaderPair> {
    map.iter()
        .map(|(key, value)| HeaderPair::new(key.clone(), value.clone()))
        .collect()
}

/// Ordered, index-addressed list input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListField<T> {
    items: Vec<T>,
}

impl<T> Default for ListField<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> ListField<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Moves the item at `from` to position `to`. Out-of-range indices are
    /// ignored and return `false`.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from >= self.items.len() || to >= self.items.len() {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        true
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T> FromIterator<T> for ListField<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a ListField<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_garbage_numbers_are_absent() {
        assert_eq!(NumberInput::new("").value::<u32>(), None);
        assert_eq!(NumberInput::new("   ").value::<u32>(), None);
        assert_eq!(NumberInput::new("abc").value::<u32>(), None);
        assert_eq!(NumberInput::new("NaN").value::<f64>(), None);
        assert_eq!(NumberInput::new("inf").value::<f64>(), None);
        assert_eq!(NumberInput::new("-3").value::<u32>(), None);
        assert_eq!(NumberInput::new(" 42 ").value::<u32>(), Some(42));
        assert_eq!(NumberInput::new("0.25").value::<f64>(), Some(0.25));
    }

    #[test]
    fn test_garbage_is_absent_and_only_range_is_reported() {
        let mut errors = ValidationErrors::new();
        assert_eq!(NumberInput::new("").read::<u16>("port"), None);
        assert_eq!(NumberInput::new("http").read::<u16>("port"), None);
        assert_eq!(
            NumberInput::new("NaN").read_in_range::<f64>("loss", 0.0, 100.0, &mut errors),
            None
        );
        assert!(errors.is_empty());

        assert_eq!(
            NumberInput::new("0").read_in_range::<u16>("port", 1, 65535, &mut errors),
            None
        );
        assert_eq!(errors.for_field("port"), Some("Must be between 1 and 65535"));
    }

    #[test]
    fn test_read_port_reports_values_above_u16() {
        let mut errors = ValidationErrors::new();
        assert_eq!(NumberInput::new("5432").read_port("port", &mut errors), Some(5432));
        assert_eq!(NumberInput::new("70000").read_port("port", &mut errors), None);
        assert_eq!(errors.for_field("port"), Some("Must be between 1 and 65535"));
        assert!(!NumberInput::new("x").has_integer());
    }

    #[test]
    fn test_number_input_deserializes_numbers_and_text() {
        #[derive(Deserialize)]
        struct Row {
            a: NumberInput,
            b: NumberInput,
            c: NumberInput,
        }
        let row: Row = toml::from_str("a = 5432\nb = \"\"\nc = 0.5\n").unwrap();
        assert_eq!(row.a.value::<u16>(), Some(5432));
        assert!(row.b.is_blank());
        assert_eq!(row.c.raw(), "0.5");
    }

    #[test]
    fn test_parse_list_handles_commas_and_newlines() {
        assert_eq!(
            parse_list("google, k1\n\n selector2 ,,"),
            vec!["google", "k1", "selector2"]
        );
        assert!(parse_list(" , \n ").is_empty());
        assert_eq!(join_list(&parse_list("a,b")), "a, b");
    }

    #[test]
    fn test_pairs_to_map_drops_empty_and_last_write_wins() {
        let pairs = vec![
            HeaderPair::new("Accept", "text/html"),
            HeaderPair::new("", "orphan"),
            HeaderPair::new("X-Empty", " "),
            HeaderPair::new("Accept", "application/json"),
        ];
        let map = pairs_to_map(&pairs);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("Accept").map(String::as_str), Some("application/json"));

        let spaced = pairs_to_map(&[HeaderPair::new(" X-Tag ", " a")]);
        assert_eq!(spaced.get("X-Tag").map(String::as_str), Some(" a"));
    }

    #[test]
    fn test_list_field_operations() {
        let mut list: ListField<&str> = ["a", "b", "c"].into_iter().collect();
        assert!(list.reorder(0, 2));
        assert_eq!(list.as_slice(), &["b", "c", "a"]);
        assert!(!list.reorder(0, 3));
        assert_eq!(list.remove(1), Some("c"));
        assert_eq!(list.remove(5), None);
        list.append("d");
        assert_eq!(list.as_slice(), &["b", "a", "d"]);
        if let Some(item) = list.get_mut(0) {
            *item = "z";
        }
        assert_eq!(list.get(0), Some(&"z"));
    }
}
