//! Form control rendering over menu registries
//!
//! `formwork-forms` renders text, password, textarea, checkbox, radio and
//! select controls for one request. Each control is bound to a field whose
//! displayed value comes from the validator or a configured default, and
//! whose option set comes from a registered menu.
//!
//! # Architecture
//!
//! - **Menus**: flat, grouped or hierarchical trees ([`MenuDefinition`]);
//!   flattened once at registration into the validator's allowed values
//! - **Values**: validator value, else default, else empty ([`DefaultValues`])
//! - **Validation attributes**: `rule-*` / `msg-*` merged into the tag
//! - **Cascades**: hierarchical selects publish a [`CascadeDescriptor`] and
//!   the shared client script through a [`BehaviorRegistry`]
//! - **Collaborators**: [`Validator`], [`MarkupRenderer`] and
//!   [`BehaviorRegistry`] are traits; in-memory implementations ship with
//!   the crate
//!
//! Rendering is synchronous and never fails; only the loosely typed
//! registration boundaries return [`Result`].

pub mod attributes;
pub mod behavior;
pub mod cascade;
pub mod config;
pub mod error;
pub mod form;
pub mod markup;
pub mod menu;
pub mod types;
pub mod validator;
pub mod value;

pub use attributes::merge_validation_attributes;
pub use behavior::{BehaviorRegistry, CascadeDescriptor, ClientScript, PageBehaviors};
pub use cascade::HierarchicalSelectCascade;
pub use config::FormConfig;
pub use error::{FormsError, Result};
pub use form::{ChoiceFragment, Choices, Form, Wrap};
pub use markup::{HtmlRenderer, MarkupRenderer};
pub use menu::{flatten, FlattenedMenu, HierarchyRoot, Menu, MenuDefinition, MenuEntry, MenuRegistry};
pub use types::{attrs, escape, AttrValue, Attributes, FieldName, FieldValue};
pub use validator::{field_id, StaticValidator, Validator};
pub use value::DefaultValues;
