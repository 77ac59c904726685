//! Core value types shared by the renderers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_MULTIPLICITY_MARKER;

/// A form field name plus its multiplicity.
///
/// Multiplicity is decided once, when the name enters the crate. Rendering
/// code only ever looks at [`FieldName::is_multiple`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldName {
    name: String,
    multiple: bool,
}

impl FieldName {
    /// A single-valued field.
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            multiple: false,
        }
    }

    /// A multi-valued field.
    pub fn multiple(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            multiple: true,
        }
    }

    /// Derive multiplicity from a trailing `marker` in the raw name.
    pub fn parse(raw: &str, marker: &str) -> Self {
        Self {
            name: raw.to_string(),
            multiple: !marker.is_empty() && raw.ends_with(marker),
        }
    }

    /// The raw name, used verbatim as the `name` attribute and registry key.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }
}

impl From<&str> for FieldName {
    fn from(raw: &str) -> Self {
        FieldName::parse(raw, DEFAULT_MULTIPLICITY_MARKER)
    }
}

impl From<String> for FieldName {
    fn from(raw: String) -> Self {
        FieldName::parse(&raw, DEFAULT_MULTIPLICITY_MARKER)
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// The resolved display value of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Multiple(Vec<String>),
}

impl FieldValue {
    /// The empty scalar, used when neither the validator nor a default has a value.
    pub fn empty() -> Self {
        FieldValue::Single(String::new())
    }

    /// Membership test with the value coerced to a set.
    pub fn contains(&self, key: &str) -> bool {
        match self {
            FieldValue::Single(value) => value == key,
            FieldValue::Multiple(values) => values.iter().any(|v| v == key),
        }
    }

    /// The value coerced to an ordered set of strings.
    pub fn as_set(&self) -> Vec<&str> {
        match self {
            FieldValue::Single(value) => vec![value.as_str()],
            FieldValue::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// The scalar, or the first element of a set.
    pub fn first(&self) -> Option<&str> {
        match self {
            FieldValue::Single(value) => Some(value),
            FieldValue::Multiple(values) => values.first().map(String::as_str),
        }
    }

    /// An HTML-escaped copy; `self` is left untouched.
    pub fn escaped(&self) -> FieldValue {
        match self {
            FieldValue::Single(value) => FieldValue::Single(escape(value)),
            FieldValue::Multiple(values) => {
                FieldValue::Multiple(values.iter().map(|v| escape(v)).collect())
            }
        }
    }

    /// Flatten to display text: the scalar, or the set joined with `,`.
    pub fn to_display_string(&self) -> String {
        match self {
            FieldValue::Single(value) => value.clone(),
            FieldValue::Multiple(values) => values.join(","),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Single(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Single(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        FieldValue::Multiple(values)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        FieldValue::Multiple(values.into_iter().map(str::to_string).collect())
    }
}

/// A single rendered attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Text(String),
    /// Boolean attribute such as `multiple`, `checked` or `selected`.
    Flag(bool),
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(text) => Some(text),
            AttrValue::Flag(_) => None,
        }
    }

    /// `true` for `Flag(false)`: the caller switched the attribute off.
    pub fn is_disabled_flag(&self) -> bool {
        matches!(self, AttrValue::Flag(false))
    }
}

impl From<&str> for AttrValue {
    fn from(text: &str) -> Self {
        AttrValue::Text(text.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(text: String) -> Self {
        AttrValue::Text(text)
    }
}

impl From<bool> for AttrValue {
    fn from(flag: bool) -> Self {
        AttrValue::Flag(flag)
    }
}

impl From<usize> for AttrValue {
    fn from(number: usize) -> Self {
        AttrValue::Text(number.to_string())
    }
}

/// Ordered attribute set of one rendered tag.
pub type Attributes = IndexMap<String, AttrValue>;

/// Build an [`Attributes`] set from `(name, value)` pairs.
pub fn attrs<K, V, I>(pairs: I) -> Attributes
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<AttrValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// HTML-escape text for use in content or a quoted attribute value.
pub fn escape(text: &str) -> String {
    html_escape::encode_quoted_attribute(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_name_marker_sets_multiple() {
        assert!(FieldName::from("colors[]").is_multiple());
        assert!(!FieldName::from("color").is_multiple());
        assert!(!FieldName::parse("colors[]", "").is_multiple());
        assert_eq!(FieldName::from("colors[]").as_str(), "colors[]");
    }

    #[test]
    fn test_field_value_membership() {
        let single = FieldValue::from("G");
        assert!(single.contains("G"));
        assert!(!single.contains("R"));

        let set = FieldValue::from(vec!["R", "B"]);
        assert!(set.contains("B"));
        assert_eq!(set.as_set(), vec!["R", "B"]);
        assert_eq!(set.first(), Some("R"));
    }

    #[test]
    fn test_escaped_leaves_original_alone() {
        let value = FieldValue::from(vec!["<b>", "a&b"]);
        let escaped = value.escaped();
        assert_eq!(
            escaped,
            FieldValue::from(vec!["&lt;b&gt;", "a&amp;b"])
        );
        assert_eq!(value, FieldValue::from(vec!["<b>", "a&b"]));
    }

    #[test]
    fn test_escape_quotes() {
        assert_eq!(escape(r#"say "hi""#), "say &quot;hi&quot;");
    }

    #[test]
    fn test_attrs_builder_keeps_order() {
        let set = attrs([("b", "2"), ("a", "1")]);
        let keys: Vec<&str> = set.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
