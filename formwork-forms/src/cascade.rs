//! Cascading (hierarchical) selects.
//!
//! A select whose menu is a [`HierarchyRoot`] offers the branch chosen by its
//! parent field's current value. The first render of such a field on a page
//! publishes a [`CascadeDescriptor`] so the client can swap branches when the
//! parent changes, and makes sure the shared cascade script is registered.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::debug;

use crate::behavior::{BehaviorRegistry, CascadeDescriptor, ClientScript};
use crate::menu::{HierarchyRoot, Menu};
use crate::types::FieldValue;
use crate::validator::Validator;

/// Option key used for the placeholder inside published branches.
pub const PLACEHOLDER_KEY: &str = "";

/// Tracks which dependent fields already published their descriptor.
#[derive(Debug, Default)]
pub struct HierarchicalSelectCascade {
    published: HashSet<String>,
}

impl HierarchicalSelectCascade {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the descriptor for `field` unless this form already did.
    ///
    /// Returns `true` when a descriptor was published by this call.
    pub fn ensure_published<V, B>(
        &mut self,
        field: &str,
        root: &HierarchyRoot,
        prepend: Option<&str>,
        validator: &V,
        behaviors: &mut B,
    ) -> bool
    where
        V: Validator + ?Sized,
        B: BehaviorRegistry + ?Sized,
    {
        if self.published.contains(field) {
            return false;
        }

        let descriptor = build_descriptor(
            validator.id(&root.parent),
            validator.id(field),
            root,
            prepend,
        );
        debug!(
            parent = %descriptor.parent_id,
            dependent = %descriptor.dependent_id,
            branches = descriptor.options.len(),
            "publishing cascade"
        );
        behaviors.register_behavior(descriptor);
        if behaviors.register_script(ClientScript::HierarchicalSelect) {
            debug!("registered hierarchical select script");
        }

        self.published.insert(field.to_string());
        true
    }

    pub fn is_published(&self, field: &str) -> bool {
        self.published.contains(field)
    }
}

/// Build the descriptor for one dependent select.
///
/// With a `prepend` placeholder every branch gets it as its first, empty-value
/// option. The stored tree is not touched.
pub fn build_descriptor(
    parent_id: String,
    dependent_id: String,
    root: &HierarchyRoot,
    prepend: Option<&str>,
) -> CascadeDescriptor {
    let options: IndexMap<String, Menu> = root
        .branches
        .iter()
        .map(|(parent_value, menu)| {
            let menu = match prepend {
                Some(label) => menu.with_leading_leaf(PLACEHOLDER_KEY, label),
                None => menu.clone(),
            };
            (parent_value.clone(), menu)
        })
        .collect();

    CascadeDescriptor {
        parent_id,
        dependent_id,
        options,
    }
}

/// The branch to render now, given the parent's resolved value.
///
/// A set-valued parent selects by its first element. No match yields `None`,
/// which renders as an empty option list.
pub fn initial_branch<'a>(root: &'a HierarchyRoot, parent_value: &FieldValue) -> Option<&'a Menu> {
    parent_value
        .first()
        .and_then(|value| root.branch_for(value))
}
