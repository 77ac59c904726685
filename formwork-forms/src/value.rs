//! Default value resolution.
//!
//! Precedence for the value shown in a control:
//!
//! 1. the validator's value, when it has one (an explicit empty string counts)
//! 2. the default configured on the form
//! 3. the empty string

use std::collections::HashMap;

use tracing::trace;

use crate::types::FieldValue;
use crate::validator::Validator;

/// Caller-configured defaults, keyed by raw field name.
#[derive(Debug, Default, Clone)]
pub struct DefaultValues {
    defaults: HashMap<String, FieldValue>,
}

impl DefaultValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) {
        self.defaults.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.defaults.get(field)
    }

    /// The value to display for `field`. With `escape` the result is an
    /// HTML-escaped copy; stored values are never modified.
    pub fn resolve<V: Validator + ?Sized>(
        &self,
        validator: &V,
        field: &str,
        escape: bool,
    ) -> FieldValue {
        let value = match validator.value(field) {
            Some(value) => value,
            None => {
                trace!(field, "no validated value, using default");
                self.defaults
                    .get(field)
                    .cloned()
                    .unwrap_or_else(FieldValue::empty)
            }
        };

        if escape {
            value.escaped()
        } else {
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::StaticValidator;

    #[test]
    fn test_validator_value_wins() {
        let validator = StaticValidator::new().with_value("color", "R");
        let mut defaults = DefaultValues::new();
        defaults.set("color", "G");
        assert_eq!(defaults.resolve(&validator, "color", false), FieldValue::from("R"));
    }

    #[test]
    fn test_explicit_empty_is_not_absent() {
        let validator = StaticValidator::new().with_value("color", "");
        let mut defaults = DefaultValues::new();
        defaults.set("color", "G");
        assert_eq!(defaults.resolve(&validator, "color", false), FieldValue::empty());
    }

    #[test]
    fn test_default_then_empty() {
        let validator = StaticValidator::new();
        let mut defaults = DefaultValues::new();
        defaults.set("color", "G");
        assert_eq!(defaults.resolve(&validator, "color", false), FieldValue::from("G"));
        assert_eq!(defaults.resolve(&validator, "size", false), FieldValue::empty());
    }

    #[test]
    fn test_escape_does_not_touch_default() {
        let validator = StaticValidator::new();
        let mut defaults = DefaultValues::new();
        defaults.set("bio", "<i>hi</i>");
        assert_eq!(
            defaults.resolve(&validator, "bio", true),
            FieldValue::from("&lt;i&gt;hi&lt;/i&gt;")
        );
        assert_eq!(defaults.get("bio"), Some(&FieldValue::from("<i>hi</i>")));
    }
}
