//! Form — main API surface for rendering controls.
//!
//! A [`Form`] lives for one request. It owns the menu registry, the default
//! values and the cascade bookkeeping, and borrows nothing global. Renders
//! are plain sequential calls:
//!
//! ```rust
//! use formwork_forms::{Attributes, Form, Menu, StaticValidator};
//!
//! let mut form = Form::new(StaticValidator::new());
//! form.define_menu("color", Menu::new().leaf("R", "Red").leaf("G", "Green"), None);
//! form.set_default("color", "G");
//!
//! let html = form.render_select("color", Attributes::new());
//! assert!(html.contains(r#"<option value="G" selected>Green</option>"#));
//! ```

use std::collections::HashMap;

use serde_json::Value;
use tracing::trace;

use crate::attributes::merge_validation_attributes;
use crate::behavior::{BehaviorRegistry, PageBehaviors};
use crate::cascade::{initial_branch, HierarchicalSelectCascade};
use crate::config::FormConfig;
use crate::error::Result;
use crate::markup::{HtmlRenderer, MarkupRenderer};
use crate::menu::{flatten, FlattenedMenu, Menu, MenuDefinition, MenuEntry, MenuRegistry, TopLevel};
use crate::types::{escape, AttrValue, Attributes, FieldName, FieldValue};
use crate::validator::Validator;
use crate::value::DefaultValues;

/// How the inputs of a checkbox or radio group are delivered.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Wrap {
    /// Wrap each input with the configured label template.
    #[default]
    Label,
    /// Wrap each input with this template (`{input}` and `{label}` placeholders).
    Template(String),
    /// Return the individual fragments unjoined.
    Collection,
}

/// One rendered checkbox or radio input.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceFragment {
    pub key: String,
    pub label: String,
    /// The serialized `input` tag.
    pub markup: String,
}

/// Output of a checkbox or radio group render.
#[derive(Debug, Clone, PartialEq)]
pub enum Choices {
    /// Wrapped inputs joined with a single space.
    Markup(String),
    /// Unwrapped inputs, for [`Wrap::Collection`].
    Fragments(Vec<ChoiceFragment>),
}

impl Choices {
    pub fn as_markup(&self) -> Option<&str> {
        match self {
            Choices::Markup(markup) => Some(markup),
            Choices::Fragments(_) => None,
        }
    }

    pub fn fragments(&self) -> &[ChoiceFragment] {
        match self {
            Choices::Markup(_) => &[],
            Choices::Fragments(fragments) => fragments,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ChoiceKind {
    Checkbox,
    Radio,
}

impl ChoiceKind {
    fn input_type(self) -> &'static str {
        match self {
            ChoiceKind::Checkbox => "checkbox",
            ChoiceKind::Radio => "radio",
        }
    }
}

/// Request-scoped form state plus the renderers built on it.
pub struct Form<V, R = HtmlRenderer, B = PageBehaviors> {
    config: FormConfig,
    validator: V,
    renderer: R,
    behaviors: B,
    menus: MenuRegistry,
    defaults: DefaultValues,
    cascade: HierarchicalSelectCascade,
    declared: HashMap<String, bool>,
}

impl<V: Validator> Form<V, HtmlRenderer, PageBehaviors> {
    /// A form with the default configuration, HTML output and an empty page
    /// behavior registry.
    pub fn new(validator: V) -> Self {
        Self::with_parts(
            FormConfig::default(),
            validator,
            HtmlRenderer,
            PageBehaviors::new(),
        )
    }
}

impl<V, R, B> Form<V, R, B>
where
    V: Validator,
    R: MarkupRenderer,
    B: BehaviorRegistry,
{
    pub fn with_parts(config: FormConfig, validator: V, renderer: R, behaviors: B) -> Self {
        Self {
            config,
            validator,
            renderer,
            behaviors,
            menus: MenuRegistry::new(),
            defaults: DefaultValues::new(),
            cascade: HierarchicalSelectCascade::new(),
            declared: HashMap::new(),
        }
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn validator(&self) -> &V {
        &self.validator
    }

    pub fn validator_mut(&mut self) -> &mut V {
        &mut self.validator
    }

    /// Page-level client behavior collected so far.
    pub fn behaviors(&self) -> &B {
        &self.behaviors
    }

    pub fn into_behaviors(self) -> B {
        self.behaviors
    }

    // --- Fields ---

    /// Fix a field's multiplicity explicitly, overriding the name convention.
    pub fn declare_field(&mut self, field: FieldName) {
        self.declared
            .insert(field.as_str().to_string(), field.is_multiple());
    }

    /// Resolve a raw name into a [`FieldName`]: a declared multiplicity wins,
    /// otherwise the configured marker decides.
    pub fn field_name(&self, raw: &str) -> FieldName {
        match self.declared.get(raw) {
            Some(true) => FieldName::multiple(raw),
            Some(false) => FieldName::single(raw),
            None => FieldName::parse(raw, &self.config.multiplicity_marker),
        }
    }

    // --- Menus ---

    /// Register the option tree (and optional placeholder) for `field`.
    pub fn define_menu(
        &mut self,
        field: &str,
        definition: impl Into<MenuDefinition>,
        prepend: Option<&str>,
    ) {
        let name = self.field_name(field);
        self.menus.register(
            &name,
            definition.into(),
            prepend.map(str::to_string),
            &mut self.validator,
        );
    }

    /// Register a loosely typed option tree, rejecting malformed shapes.
    pub fn define_menu_json(&mut self, field: &str, tree: &Value, prepend: Option<&str>) -> Result<()> {
        let definition = MenuDefinition::from_json(field, tree, &self.config.hierarchy_key)?;
        self.define_menu(field, definition, prepend);
        Ok(())
    }

    /// The registered tree, or an empty menu.
    pub fn get_menu(&self, field: &str) -> &MenuDefinition {
        self.menus.get(field)
    }

    pub fn flattened_menu(&self, field: &str) -> FlattenedMenu {
        flatten(self.menus.get(field))
    }

    pub fn prepend_for(&self, field: &str) -> Option<&str> {
        self.menus.prepend(field)
    }

    // --- Values ---

    pub fn set_default(&mut self, field: &str, value: impl Into<FieldValue>) {
        self.defaults.set(field, value);
    }

    pub fn set_defaults<I, K, T>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, T)>,
        K: AsRef<str>,
        T: Into<FieldValue>,
    {
        for (field, value) in values {
            self.defaults.set(field.as_ref(), value);
        }
    }

    pub fn default_for(&self, field: &str) -> Option<&FieldValue> {
        self.defaults.get(field)
    }

    /// Value shown for `field`: validator value, else default, else `""`.
    pub fn resolve_default_value(&self, field: &str, escape: bool) -> FieldValue {
        self.defaults.resolve(&self.validator, field, escape)
    }

    /// `attrs` plus the field's `rule-*` / `msg-*` attributes.
    pub fn merge_validation_attributes(&self, field: &str, attrs: Attributes) -> Attributes {
        merge_validation_attributes(&self.validator, field, attrs)
    }

    // --- Renderers ---

    pub fn render_text(&self, field: &str, attrs: Attributes) -> String {
        let value = self.resolve_default_value(field, true).to_display_string();
        self.render_input(field, "text", attrs, Some(value))
    }

    /// Like [`Form::render_text`] but never emits a value.
    pub fn render_password(&self, field: &str, mut attrs: Attributes) -> String {
        attrs.shift_remove("value");
        self.render_input(field, "password", attrs, None)
    }

    pub fn render_textarea(&self, field: &str, attrs: Attributes) -> String {
        let mut tag = self.base_attributes(field, None, None);
        extend_unreserved(&mut tag, attrs, &["name", "id"]);
        if !tag.contains_key("cols") {
            tag.insert("cols".into(), self.config.textarea_cols.into());
        }
        if !tag.contains_key("rows") {
            tag.insert("rows".into(), self.config.textarea_rows.into());
        }
        let tag = self.merge_validation_attributes(field, tag);

        let content = self.resolve_default_value(field, true).to_display_string();
        self.renderer.tag("textarea", &tag, Some(&content))
    }

    pub fn render_checkbox(&self, field: &str, attrs: Attributes, wrap: Wrap) -> Choices {
        self.render_choices(ChoiceKind::Checkbox, field, attrs, wrap)
    }

    pub fn render_radio(&self, field: &str, attrs: Attributes, wrap: Wrap) -> Choices {
        self.render_choices(ChoiceKind::Radio, field, attrs, wrap)
    }

    /// Render a select from the field's menu.
    ///
    /// Multi-value fields, and fields whose caller passes any `multiple`
    /// other than `Flag(false)`, get `multiple` and
    /// `size = min(options, size-or-max)`; `multiple: Flag(false)` strips both. A hierarchical menu
    /// on a single-value select renders only the branch picked by the parent
    /// field's value and publishes its cascade on first render.
    pub fn render_select(&mut self, field: &str, attrs: Attributes) -> String {
        let name = self.field_name(field);
        let definition = self.menus.get(field);

        let mut tag = self.base_attributes(field, None, None);
        let disabled = attrs.get("multiple").is_some_and(AttrValue::is_disabled_flag);
        let declared_size = attrs
            .get("size")
            .and_then(AttrValue::as_text)
            .and_then(|s| s.trim().parse::<usize>().ok());
        extend_unreserved(&mut tag, attrs, &["name", "id"]);

        // Any caller `multiple` other than `Flag(false)` opts a single-value field in.
        let requested = tag.contains_key("multiple");
        let multiple = if disabled {
            tag.shift_remove("multiple");
            tag.shift_remove("size");
            false
        } else if name.is_multiple() || requested {
            let cap = declared_size.unwrap_or(self.config.max_select_size);
            let size = flatten(definition).len().min(cap);
            tag.shift_remove("multiple");
            tag.shift_remove("size");
            tag.insert("multiple".into(), AttrValue::Flag(true));
            tag.insert("size".into(), size.into());
            true
        } else {
            false
        };

        let value = self.defaults.resolve(&self.validator, field, false);
        let mut content = String::new();
        if let Some(placeholder) = self.menus.prepend(field) {
            content.push_str(&option_tag(&self.renderer, "", placeholder, false));
        }

        match definition {
            MenuDefinition::Hierarchy(root) if !multiple => {
                self.cascade.ensure_published(
                    field,
                    root,
                    self.menus.prepend(field),
                    &self.validator,
                    &mut self.behaviors,
                );
                let parent_value = self.defaults.resolve(&self.validator, &root.parent, false);
                match initial_branch(root, &parent_value) {
                    Some(branch) => menu_options(&self.renderer, branch, &value, &mut content),
                    None => trace!(field, parent = %root.parent, "no branch for parent value"),
                }
            }
            other => {
                for (key, item) in other.top_level() {
                    match item {
                        TopLevel::Entry(MenuEntry::Leaf(label)) => {
                            content.push_str(&option_tag(
                                &self.renderer,
                                key,
                                label,
                                value.contains(key),
                            ));
                        }
                        TopLevel::Entry(MenuEntry::Group(menu)) => {
                            content.push_str(&optgroup_tag(&self.renderer, key, menu, &value));
                        }
                        TopLevel::Branch(menu) => {
                            content.push_str(&optgroup_tag(&self.renderer, key, menu, &value));
                        }
                    }
                }
            }
        }

        let tag = merge_validation_attributes(&self.validator, field, tag);
        self.renderer.tag("select", &tag, Some(&content))
    }

    // --- Internal ---

    /// `name` and `id` first, then `type`/`value` when given.
    fn base_attributes(&self, field: &str, input_type: Option<&str>, value: Option<String>) -> Attributes {
        let mut tag = Attributes::new();
        if let Some(input_type) = input_type {
            tag.insert("type".into(), input_type.into());
        }
        tag.insert("name".into(), escape(field).into());
        tag.insert("id".into(), escape(&self.validator.id(field)).into());
        if let Some(value) = value {
            tag.insert("value".into(), value.into());
        }
        tag
    }

    fn render_input(&self, field: &str, input_type: &str, attrs: Attributes, value: Option<String>) -> String {
        let mut tag = self.base_attributes(field, Some(input_type), value);
        extend_unreserved(&mut tag, attrs, &["name", "id", "value"]);
        let tag = self.merge_validation_attributes(field, tag);
        self.renderer.tag("input", &tag, None)
    }

    fn render_choices(&self, kind: ChoiceKind, field: &str, attrs: Attributes, wrap: Wrap) -> Choices {
        let value = self.resolve_default_value(field, false);
        let mut fragments = Vec::new();

        for (key, item) in self.menus.get(field).top_level() {
            let TopLevel::Entry(MenuEntry::Leaf(label)) = item else {
                trace!(field, key, "skipping nested entry in {}", kind.input_type());
                continue;
            };

            let mut tag = Attributes::new();
            tag.insert("type".into(), kind.input_type().into());
            tag.insert("name".into(), escape(field).into());
            tag.insert("value".into(), escape(key).into());
            extend_unreserved(&mut tag, attrs.clone(), &["type", "name", "value", "checked"]);
            if value.contains(key) {
                tag.insert("checked".into(), AttrValue::Flag(true));
            }
            // Only the first input carries the validation metadata.
            if fragments.is_empty() {
                tag = self.merge_validation_attributes(field, tag);
            }

            fragments.push(ChoiceFragment {
                key: key.to_string(),
                label: label.clone(),
                markup: self.renderer.tag("input", &tag, None),
            });
        }

        let template = match wrap {
            Wrap::Collection => return Choices::Fragments(fragments),
            Wrap::Label => self.config.label_template.as_str(),
            Wrap::Template(ref template) => template.as_str(),
        };
        let wrapped: Vec<String> = fragments
            .iter()
            .map(|f| fill_template(template, &f.markup, &escape(&f.label)))
            .collect();
        Choices::Markup(wrapped.join(" "))
    }
}

/// Copy caller attributes, skipping names the form computes itself.
fn extend_unreserved(tag: &mut Attributes, attrs: Attributes, reserved: &[&str]) {
    for (key, value) in attrs {
        if !reserved.contains(&key.as_str()) {
            tag.insert(key, value);
        }
    }
}

fn option_tag<R: MarkupRenderer>(renderer: &R, key: &str, label: &str, selected: bool) -> String {
    let mut tag = Attributes::new();
    tag.insert("value".into(), escape(key).into());
    if selected {
        tag.insert("selected".into(), AttrValue::Flag(true));
    }
    renderer.tag("option", &tag, Some(&escape(label)))
}

/// Leaves and one level of groups.
fn menu_options<R: MarkupRenderer>(renderer: &R, menu: &Menu, value: &FieldValue, out: &mut String) {
    for (key, entry) in menu.iter() {
        match entry {
            MenuEntry::Leaf(label) => out.push_str(&option_tag(renderer, key, label, value.contains(key))),
            MenuEntry::Group(group) => out.push_str(&optgroup_tag(renderer, key, group, value)),
        }
    }
}

/// One `optgroup` holding the group's leaves; deeper groups are dropped.
fn optgroup_tag<R: MarkupRenderer>(renderer: &R, label: &str, menu: &Menu, value: &FieldValue) -> String {
    let mut content = String::new();
    for (key, entry) in menu.iter() {
        match entry {
            MenuEntry::Leaf(option) => {
                content.push_str(&option_tag(renderer, key, option, value.contains(key)))
            }
            MenuEntry::Group(_) => trace!(group = label, key = %key, "skipping nested optgroup"),
        }
    }
    let mut tag = Attributes::new();
    tag.insert("label".into(), escape(label).into());
    renderer.tag("optgroup", &tag, Some(&content))
}

/// Substitute `{input}` and `{label}` in a single pass.
///
/// Only those two placeholders are recognised; any other brace text,
/// including Liquid-style `{{ ... }}`, passes through unchanged.
fn fill_template(template: &str, input: &str, label: &str) -> String {
    let mut out = String::with_capacity(template.len() + input.len() + label.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{input}") {
            out.push_str(input);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{label}") {
            out.push_str(label);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}
