//! Query interface of the validation engine.
//!
//! The rule engine itself (evaluation, error messages) lives elsewhere; the
//! form only reads from it and feeds it allowed-value lists.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::config::{FormConfig, DEFAULT_MULTIPLICITY_MARKER};
use crate::types::FieldValue;

/// What the renderers need to know about validation.
///
/// Every lookup must succeed for any field name, including unseen ones,
/// answering with an empty collection or `None`.
pub trait Validator {
    /// The submitted or validated value; `None` when not yet determined.
    fn value(&self, field: &str) -> Option<FieldValue>;

    /// Rule name -> rule parameter, in declaration order.
    fn rules(&self, field: &str) -> IndexMap<String, String>;

    /// Rule name -> message text.
    fn messages(&self, field: &str) -> IndexMap<String, String>;

    /// Stable DOM identifier for the field.
    fn id(&self, field: &str) -> String;

    /// Restrict the field to the given option keys.
    fn set_allowed_values(&mut self, field: &str, values: Vec<String>);
}

/// Turn a field name into a DOM id: a trailing multiplicity `marker` is
/// dropped and anything outside `[A-Za-z0-9_-]` becomes `-`.
///
/// With the `[]` marker: `colors[]` -> `colors`, `address[city]` -> `address-city`
pub fn field_id(field: &str, marker: &str) -> String {
    let base = if marker.is_empty() {
        field
    } else {
        field.strip_suffix(marker).unwrap_or(field)
    };
    let id: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    id.trim_end_matches('-').to_string()
}

/// In-memory [`Validator`] holding caller-supplied values, rules and messages.
#[derive(Debug, Clone)]
pub struct StaticValidator {
    marker: String,
    values: HashMap<String, FieldValue>,
    rules: HashMap<String, IndexMap<String, String>>,
    messages: HashMap<String, IndexMap<String, String>>,
    allowed: HashMap<String, Vec<String>>,
}

impl Default for StaticValidator {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MULTIPLICITY_MARKER.to_string(),
            values: HashMap::new(),
            rules: HashMap::new(),
            messages: HashMap::new(),
            allowed: HashMap::new(),
        }
    }
}

impl StaticValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A validator whose ids follow `config.multiplicity_marker`.
    pub fn with_config(config: &FormConfig) -> Self {
        Self::new().with_multiplicity_marker(&config.multiplicity_marker)
    }

    /// Strip `marker` instead of `[]` when deriving ids.
    pub fn with_multiplicity_marker(mut self, marker: &str) -> Self {
        self.marker = marker.to_string();
        self
    }

    /// Record a validated value for `field`.
    pub fn with_value(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.set_value(field, value);
        self
    }

    /// Add a rule (and optionally its message) for `field`.
    pub fn with_rule(
        mut self,
        field: &str,
        rule: &str,
        param: impl Into<String>,
        message: Option<&str>,
    ) -> Self {
        self.rules
            .entry(field.to_string())
            .or_default()
            .insert(rule.to_string(), param.into());
        if let Some(message) = message {
            self.messages
                .entry(field.to_string())
                .or_default()
                .insert(rule.to_string(), message.to_string());
        }
        self
    }

    pub fn set_value(&mut self, field: &str, value: impl Into<FieldValue>) {
        self.values.insert(field.to_string(), value.into());
    }

    /// The allowed-value list last published for `field`.
    pub fn allowed_values(&self, field: &str) -> Option<&Vec<String>> {
        self.allowed.get(field)
    }
}

impl Validator for StaticValidator {
    fn value(&self, field: &str) -> Option<FieldValue> {
        self.values.get(field).cloned()
    }

    fn rules(&self, field: &str) -> IndexMap<String, String> {
        self.rules.get(field).cloned().unwrap_or_default()
    }

    fn messages(&self, field: &str) -> IndexMap<String, String> {
        self.messages.get(field).cloned().unwrap_or_default()
    }

    fn id(&self, field: &str) -> String {
        field_id(field, &self.marker)
    }

    fn set_allowed_values(&mut self, field: &str, values: Vec<String>) {
        self.allowed.insert(field.to_string(), values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_id() {
        assert_eq!(field_id("color", "[]"), "color");
        assert_eq!(field_id("colors[]", "[]"), "colors");
        assert_eq!(field_id("address[city]", "[]"), "address-city");
        assert_eq!(field_id("first name", "[]"), "first-name");
        assert_eq!(field_id("tags*", ""), "tags");
    }

    #[test]
    fn test_custom_marker_drives_ids() {
        let config = FormConfig {
            multiplicity_marker: "_list".into(),
            ..FormConfig::default()
        };
        let validator = StaticValidator::with_config(&config);
        assert_eq!(validator.id("tags_list"), "tags");
        assert_eq!(validator.id("tags[]"), "tags");
        assert_eq!(StaticValidator::new().id("tags_list"), "tags_list");
    }

    #[test]
    fn test_unknown_field_answers_empty() {
        let validator = StaticValidator::new();
        assert!(validator.value("ghost").is_none());
        assert!(validator.rules("ghost").is_empty());
        assert!(validator.messages("ghost").is_empty());
        assert_eq!(validator.id("ghost"), "ghost");
    }

    #[test]
    fn test_rules_keep_declaration_order() {
        let validator = StaticValidator::new()
            .with_rule("name", "required", "true", Some("Name is required"))
            .with_rule("name", "maxlength", "40", None);
        let rules: Vec<String> = validator.rules("name").into_keys().collect();
        assert_eq!(rules, vec!["required", "maxlength"]);
        assert_eq!(validator.messages("name").len(), 1);
    }
}
