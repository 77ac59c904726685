//! Menu definitions and the per-form menu registry.
//!
//! A menu is the option set behind a checkbox group, radio group or select.
//! It comes in three shapes:
//!
//! - **flat**: `key -> label` leaves
//! - **grouped**: leaves mixed with one level of named groups
//! - **hierarchical**: a root naming a parent field, mapping each parent
//!   value to the child menu offered when that value is selected
//!
//! The same tree feeds three consumers: the renderers (display), the
//! validator (via [`flatten`]) and the cascade builder.

use std::collections::HashMap;
use std::sync::LazyLock;

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::error::{FormsError, Result};
use crate::types::FieldName;
use crate::validator::Validator;

/// Single-level `key -> label` mapping derived from a menu.
pub type FlattenedMenu = IndexMap<String, String>;

static EMPTY_MENU: LazyLock<MenuDefinition> = LazyLock::new(MenuDefinition::default);

/// One entry of a [`Menu`].
#[derive(Debug, Clone, PartialEq)]
pub enum MenuEntry {
    /// A selectable option carrying its display label.
    Leaf(String),
    /// A named group of options, rendered as an `optgroup`.
    Group(Menu),
}

/// Ordered `key -> entry` mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Menu(IndexMap<String, MenuEntry>);

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append a leaf option.
    pub fn leaf(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.insert(key, MenuEntry::Leaf(label.into()));
        self
    }

    /// Builder: append a group.
    pub fn group(mut self, key: impl Into<String>, menu: Menu) -> Self {
        self.insert(key, MenuEntry::Group(menu));
        self
    }

    /// Insert or replace an entry. A replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, entry: MenuEntry) {
        self.0.insert(key.into(), entry);
    }

    pub fn get(&self, key: &str) -> Option<&MenuEntry> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MenuEntry)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A copy of this menu with an extra leaf placed first.
    ///
    /// An existing entry under `key` is dropped from its old position.
    pub fn with_leading_leaf(&self, key: &str, label: &str) -> Menu {
        let mut entries = IndexMap::with_capacity(self.0.len() + 1);
        entries.insert(key.to_string(), MenuEntry::Leaf(label.to_string()));
        for (k, entry) in &self.0 {
            if k != key {
                entries.insert(k.clone(), entry.clone());
            }
        }
        Menu(entries)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Menu {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Menu(
            iter.into_iter()
                .map(|(k, v)| (k.into(), MenuEntry::Leaf(v.into())))
                .collect(),
        )
    }
}

/// Serialized as an ordered array so option order survives transports whose
/// object keys are reordered (JavaScript sorts integer-like keys).
impl Serialize for Menu {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for (key, entry) in &self.0 {
            seq.serialize_element(&SerializedEntry { key, entry })?;
        }
        seq.end()
    }
}

struct SerializedEntry<'a> {
    key: &'a str,
    entry: &'a MenuEntry,
}

impl Serialize for SerializedEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self.entry {
            MenuEntry::Leaf(label) => {
                map.serialize_entry("value", self.key)?;
                map.serialize_entry("label", label)?;
            }
            MenuEntry::Group(menu) => {
                map.serialize_entry("group", self.key)?;
                map.serialize_entry("options", menu)?;
            }
        }
        map.end()
    }
}

/// Root of a cascading menu: the options depend on `parent`'s value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HierarchyRoot {
    /// Name of the field whose value picks the branch.
    pub parent: String,
    /// Parent value -> child menu.
    pub branches: IndexMap<String, Menu>,
}

impl HierarchyRoot {
    pub fn new(parent: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            branches: IndexMap::new(),
        }
    }

    /// Builder: add the child menu for one parent value.
    pub fn branch(mut self, parent_value: impl Into<String>, menu: Menu) -> Self {
        self.branches.insert(parent_value.into(), menu);
        self
    }

    /// The child menu for `parent_value`, if any.
    pub fn branch_for(&self, parent_value: &str) -> Option<&Menu> {
        self.branches.get(parent_value)
    }
}

/// Complete option tree registered for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuDefinition {
    /// Flat or grouped options.
    Options(Menu),
    /// Cascading options chosen by another field.
    Hierarchy(HierarchyRoot),
}

impl Default for MenuDefinition {
    fn default() -> Self {
        MenuDefinition::Options(Menu::default())
    }
}

impl From<Menu> for MenuDefinition {
    fn from(menu: Menu) -> Self {
        MenuDefinition::Options(menu)
    }
}

impl From<HierarchyRoot> for MenuDefinition {
    fn from(root: HierarchyRoot) -> Self {
        MenuDefinition::Hierarchy(root)
    }
}

impl MenuDefinition {
    pub fn hierarchy(&self) -> Option<&HierarchyRoot> {
        match self {
            MenuDefinition::Hierarchy(root) => Some(root),
            MenuDefinition::Options(_) => None,
        }
    }

    /// Top-level entries in order. Hierarchy branches appear as groups
    /// labelled by their parent value.
    pub fn top_level(&self) -> Vec<(&str, TopLevel<'_>)> {
        match self {
            MenuDefinition::Options(menu) => menu
                .iter()
                .map(|(key, entry)| (key.as_str(), TopLevel::Entry(entry)))
                .collect(),
            MenuDefinition::Hierarchy(root) => root
                .branches
                .iter()
                .map(|(key, menu)| (key.as_str(), TopLevel::Branch(menu)))
                .collect(),
        }
    }

    /// Parse a loosely typed tree at the integration boundary.
    ///
    /// The root must be an object. Scalars become leaves, objects become
    /// groups. An entry under `hierarchy_key` (a string naming the parent
    /// field) turns the root into a hierarchy whose remaining entries must
    /// all be objects.
    pub fn from_json(field: &str, value: &Value, hierarchy_key: &str) -> Result<Self> {
        let Value::Object(root) = value else {
            return Err(FormsError::invalid_menu(
                field,
                format!("expected an object, got {}", json_kind(value)),
            ));
        };

        let Some(marker) = root.get(hierarchy_key) else {
            return Ok(MenuDefinition::Options(parse_menu(
                field,
                value,
                hierarchy_key,
            )?));
        };

        let Value::String(parent) = marker else {
            return Err(FormsError::invalid_menu(
                field,
                format!("'{hierarchy_key}' must name the parent field"),
            ));
        };

        let mut hierarchy = HierarchyRoot::new(parent.clone());
        for (parent_value, child) in root.iter().filter(|(k, _)| *k != hierarchy_key) {
            if !child.is_object() {
                return Err(FormsError::invalid_menu(
                    field,
                    format!("branch '{parent_value}' must be an object"),
                ));
            }
            hierarchy
                .branches
                .insert(parent_value.clone(), parse_menu(field, child, hierarchy_key)?);
        }
        Ok(MenuDefinition::Hierarchy(hierarchy))
    }
}

/// A top-level item as seen by the renderers.
#[derive(Debug, Clone, Copy)]
pub enum TopLevel<'a> {
    Entry(&'a MenuEntry),
    Branch(&'a Menu),
}

fn parse_menu(field: &str, value: &Value, hierarchy_key: &str) -> Result<Menu> {
    let Value::Object(object) = value else {
        return Err(FormsError::invalid_menu(
            field,
            format!("expected an object, got {}", json_kind(value)),
        ));
    };

    let mut menu = Menu::new();
    for (key, child) in object {
        if key == hierarchy_key {
            return Err(FormsError::invalid_menu(
                field,
                format!("'{hierarchy_key}' is only allowed at the root"),
            ));
        }
        let entry = match child {
            Value::String(label) => MenuEntry::Leaf(label.clone()),
            Value::Number(n) => MenuEntry::Leaf(n.to_string()),
            Value::Bool(b) => MenuEntry::Leaf(b.to_string()),
            Value::Object(_) => MenuEntry::Group(parse_menu(field, child, hierarchy_key)?),
            Value::Null | Value::Array(_) => {
                return Err(FormsError::invalid_menu(
                    field,
                    format!("option '{key}' has unsupported {}", json_kind(child)),
                ));
            }
        };
        menu.insert(key.clone(), entry);
    }
    Ok(menu)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Collapse a menu tree into a single `key -> label` level.
///
/// Depth-first; groups and hierarchy branches are descended into and never
/// appear themselves. On a key collision the later label wins while the key
/// keeps its first-seen position.
pub fn flatten(definition: &MenuDefinition) -> FlattenedMenu {
    let mut flat = FlattenedMenu::new();
    match definition {
        MenuDefinition::Options(menu) => flatten_into(menu, &mut flat),
        MenuDefinition::Hierarchy(root) => {
            for menu in root.branches.values() {
                flatten_into(menu, &mut flat);
            }
        }
    }
    flat
}

fn flatten_into(menu: &Menu, flat: &mut FlattenedMenu) {
    for (key, entry) in menu.iter() {
        match entry {
            MenuEntry::Leaf(label) => {
                flat.insert(key.clone(), label.clone());
            }
            MenuEntry::Group(group) => flatten_into(group, flat),
        }
    }
}

/// Per-form store of menu definitions and prepend placeholders.
#[derive(Debug, Default)]
pub struct MenuRegistry {
    menus: HashMap<String, MenuDefinition>,
    prepends: HashMap<String, String>,
}

impl MenuRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `definition` for `field` and publish its flattened keys to the
    /// validator's allowed-value list. Re-registering replaces both the tree
    /// and the prepend placeholder.
    pub fn register<V: Validator + ?Sized>(
        &mut self,
        field: &FieldName,
        definition: MenuDefinition,
        prepend: Option<String>,
        validator: &mut V,
    ) {
        let flat = flatten(&definition);
        debug!(
            field = %field,
            options = flat.len(),
            hierarchical = definition.hierarchy().is_some(),
            "registered menu"
        );
        validator.set_allowed_values(field.as_str(), flat.into_keys().collect());

        self.menus.insert(field.as_str().to_string(), definition);
        match prepend {
            Some(label) => {
                self.prepends.insert(field.as_str().to_string(), label);
            }
            None => {
                self.prepends.remove(field.as_str());
            }
        }
    }

    /// The stored tree, or an empty menu when none was registered.
    pub fn get(&self, field: &str) -> &MenuDefinition {
        self.menus.get(field).unwrap_or(&EMPTY_MENU)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.menus.contains_key(field)
    }

    /// Placeholder label rendered as an empty-value first option.
    pub fn prepend(&self, field: &str) -> Option<&str> {
        self.prepends.get(field).map(String::as_str)
    }

    /// Number of registered menus.
    pub fn count(&self) -> usize {
        self.menus.len()
    }
}
