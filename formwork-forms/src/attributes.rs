//! Validation metadata merged into rendered attributes.
//!
//! Each rule becomes `rule-<name>="<param>"` and each message
//! `msg-<name>="<text>"`, both escaped. They are applied after the incoming
//! attributes, so a computed entry replaces a caller entry of the same name.

use crate::types::{escape, AttrValue, Attributes};
use crate::validator::Validator;

/// Attribute name prefix for rule parameters.
pub const RULE_PREFIX: &str = "rule-";

/// Attribute name prefix for rule messages.
pub const MESSAGE_PREFIX: &str = "msg-";

/// Return `attrs` extended with the validator's rules and messages for `field`.
pub fn merge_validation_attributes<V: Validator + ?Sized>(
    validator: &V,
    field: &str,
    mut attrs: Attributes,
) -> Attributes {
    for (rule, param) in validator.rules(field) {
        attrs.insert(
            format!("{RULE_PREFIX}{rule}"),
            AttrValue::Text(escape(&param)),
        );
    }
    for (rule, message) in validator.messages(field) {
        attrs.insert(
            format!("{MESSAGE_PREFIX}{rule}"),
            AttrValue::Text(escape(&message)),
        );
    }
    attrs
}

/// Whether `name` is a merged validation attribute.
pub fn is_validation_attribute(name: &str) -> bool {
    name.starts_with(RULE_PREFIX) || name.starts_with(MESSAGE_PREFIX)
}
