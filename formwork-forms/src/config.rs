//! Form rendering configuration.
//!
//! All keys are optional; missing keys fall back to the defaults below.
//!
//! ```yaml
//! multiplicity_marker: "[]"
//! max_select_size: 15
//! textarea_cols: 40
//! textarea_rows: 10
//! hierarchy_key: _parent
//! label_template: "<label>{input} {label}</label>"
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default cap for the `size` of a multi-value select.
pub const DEFAULT_MAX_SELECT_SIZE: usize = 15;

/// Default `cols` of a textarea.
pub const DEFAULT_TEXTAREA_COLS: usize = 40;

/// Default `rows` of a textarea.
pub const DEFAULT_TEXTAREA_ROWS: usize = 10;

/// Trailing field-name suffix that marks a multi-value field.
pub const DEFAULT_MULTIPLICITY_MARKER: &str = "[]";

/// Sentinel key naming the parent field in JSON menu input.
pub const DEFAULT_HIERARCHY_KEY: &str = "_parent";

/// Wrapper applied to each checkbox/radio input.
pub const DEFAULT_LABEL_TEMPLATE: &str = "<label>{input} {label}</label>";

/// Tunables shared by every render of one form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub multiplicity_marker: String,
    pub max_select_size: usize,
    pub textarea_cols: usize,
    pub textarea_rows: usize,
    pub hierarchy_key: String,
    pub label_template: String,
}

impl FormConfig {
    /// Parse a configuration from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            multiplicity_marker: DEFAULT_MULTIPLICITY_MARKER.to_string(),
            max_select_size: DEFAULT_MAX_SELECT_SIZE,
            textarea_cols: DEFAULT_TEXTAREA_COLS,
            textarea_rows: DEFAULT_TEXTAREA_ROWS,
            hierarchy_key: DEFAULT_HIERARCHY_KEY.to_string(),
            label_template: DEFAULT_LABEL_TEMPLATE.to_string(),
        }
    }
}
