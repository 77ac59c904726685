//! Page-level client behavior registry.
//!
//! The form never writes script text. It names reusable client scripts and
//! publishes declarative descriptors; a front-end adapter turns the export
//! into whatever the page's UI framework needs.
//!
//! ## Cascade contract
//!
//! For every [`CascadeDescriptor`] the `hierarchical-select` script must,
//! when the parent control changes:
//!
//! 1. clear the dependent control's options
//! 2. repopulate from `options[newParentValue]`: `{value, label}` items become
//!    options, `{group, options}` items become one `optgroup`
//! 3. give the placeholder item (key `""`) an empty option value
//! 4. re-select the dependent control's previous value if it is still offered

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::menu::Menu;

/// Reusable client-side script, registered at most once per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientScript {
    /// Repopulates a dependent select from a [`CascadeDescriptor`].
    HierarchicalSelect,
}

/// Everything the client needs to keep one dependent select in sync.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CascadeDescriptor {
    /// DOM id of the controlling field.
    pub parent_id: String,
    /// DOM id of the dependent select.
    pub dependent_id: String,
    /// Parent value -> options to offer.
    pub options: IndexMap<String, Menu>,
}

/// Sink for page-level client behavior.
pub trait BehaviorRegistry {
    /// Register a script. Returns `false` when it was already registered.
    fn register_script(&mut self, script: ClientScript) -> bool;

    /// Publish a cascade descriptor.
    fn register_behavior(&mut self, descriptor: CascadeDescriptor);
}

/// In-memory [`BehaviorRegistry`] for one page.
#[derive(Debug, Default, Clone, Serialize)]
pub struct PageBehaviors {
    scripts: IndexSet<ClientScript>,
    cascades: Vec<CascadeDescriptor>,
}

impl PageBehaviors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scripts(&self) -> impl Iterator<Item = &ClientScript> {
        self.scripts.iter()
    }

    pub fn cascades(&self) -> &[CascadeDescriptor] {
        &self.cascades
    }

    /// Export as `{"scripts": [...], "cascades": [...]}` for the front end.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl BehaviorRegistry for PageBehaviors {
    fn register_script(&mut self, script: ClientScript) -> bool {
        self.scripts.insert(script)
    }

    fn register_behavior(&mut self, descriptor: CascadeDescriptor) {
        self.cascades.push(descriptor);
    }
}
