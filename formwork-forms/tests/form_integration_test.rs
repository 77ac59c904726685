//! End-to-end rendering tests for the public form surface.

use std::collections::BTreeSet;

use formwork_forms::{
    attrs, flatten, Attributes, ClientScript, FieldValue, Form, HierarchyRoot, Menu,
    MenuDefinition, MenuEntry, StaticValidator, Wrap,
};
use proptest::prelude::*;
use rstest::rstest;

fn form() -> Form<StaticValidator> {
    Form::new(StaticValidator::new())
}

#[test_log::test]
fn test_color_select_without_value() {
    let mut form = form();
    form.define_menu("color", Menu::new().leaf("R", "Red").leaf("G", "Green"), None);

    let html = form.render_select("color", Attributes::new());
    assert_eq!(
        html,
        r#"<select name="color" id="color"><option value="R">Red</option><option value="G">Green</option></select>"#
    );
    assert!(!html.contains("selected"));
}

#[test_log::test]
fn test_color_select_with_default() {
    let mut form = form();
    form.define_menu("color", Menu::new().leaf("R", "Red").leaf("G", "Green"), None);
    form.set_default("color", "G");

    assert_eq!(form.resolve_default_value("color", false), FieldValue::from("G"));
    let html = form.render_select("color", Attributes::new());
    assert!(html.contains(r#"<option value="G" selected>Green</option>"#));
    assert!(html.contains(r#"<option value="R">Red</option>"#));
}

#[test_log::test]
fn test_transport_vehicle_cascade() {
    let mut form = form();
    form.define_menu("transport", Menu::new().leaf("1", "Air").leaf("2", "Sea"), None);
    form.define_menu(
        "vehicle",
        HierarchyRoot::new("transport")
            .branch("1", Menu::new().leaf("plane", "Plane").leaf("balloon", "Balloon"))
            .branch("2", Menu::new().leaf("ship", "Ship")),
        None,
    );
    form.set_default("transport", "1");

    let html = form.render_select("vehicle", Attributes::new());
    assert_eq!(
        html,
        r#"<select name="vehicle" id="vehicle"><option value="plane">Plane</option><option value="balloon">Balloon</option></select>"#
    );

    let descriptor = &form.behaviors().cascades()[0];
    assert_eq!(descriptor.parent_id, "transport");
    assert_eq!(descriptor.dependent_id, "vehicle");
    let keys: Vec<&str> = descriptor.options.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["1", "2"]);

    let allowed = form.validator().allowed_values("vehicle").unwrap();
    assert_eq!(allowed, &vec!["plane".to_string(), "balloon".into(), "ship".into()]);
}

#[test_log::test]
fn test_cascade_with_unknown_parent_value_renders_no_options() {
    let mut form = form();
    form.define_menu(
        "vehicle",
        HierarchyRoot::new("transport").branch("1", Menu::new().leaf("plane", "Plane")),
        None,
    );
    form.set_default("transport", "9");
    assert_eq!(
        form.render_select("vehicle", Attributes::new()),
        r#"<select name="vehicle" id="vehicle"></select>"#
    );
}

#[test_log::test]
fn test_validated_parent_value_drives_cascade() {
    let validator = StaticValidator::new().with_value("transport", "2");
    let mut form = Form::new(validator);
    form.define_menu(
        "vehicle",
        HierarchyRoot::new("transport")
            .branch("1", Menu::new().leaf("plane", "Plane"))
            .branch("2", Menu::new().leaf("ship", "Ship")),
        None,
    );
    form.set_default("transport", "1");
    let html = form.render_select("vehicle", Attributes::new());
    assert!(html.contains("ship"));
    assert!(!html.contains("plane"));
}

#[test_log::test]
fn test_two_cascades_share_one_script() {
    let mut form = form();
    let root = HierarchyRoot::new("country").branch("nl", Menu::new().leaf("ams", "Amsterdam"));
    form.define_menu("city", root.clone(), Some("-- city --"));
    form.define_menu("office", root, None);

    form.render_select("city", Attributes::new());
    form.render_select("office", Attributes::new());
    form.render_select("city", Attributes::new());

    let page = form.into_behaviors();
    assert_eq!(page.cascades().len(), 2);
    assert_eq!(page.scripts().copied().collect::<Vec<_>>(), vec![ClientScript::HierarchicalSelect]);

    let exported: serde_json::Value = serde_json::from_str(&page.to_json().unwrap()).unwrap();
    assert_eq!(
        exported["cascades"][0]["options"]["nl"],
        serde_json::json!([
            {"value": "", "label": "-- city --"},
            {"value": "ams", "label": "Amsterdam"}
        ])
    );
}

#[test_log::test]
fn test_remember_me_checkbox() {
    let mut form = form();
    form.define_menu("remember", Menu::new().leaf("Y", "Remember Me"), None);

    let unchecked = form.render_checkbox("remember", Attributes::new(), Wrap::Label);
    assert_eq!(
        unchecked.as_markup().unwrap(),
        r#"<label><input type="checkbox" name="remember" value="Y" /> Remember Me</label>"#
    );

    form.set_default("remember", vec!["Y"]);
    let checked = form.render_checkbox("remember", Attributes::new(), Wrap::Label);
    assert_eq!(
        checked.as_markup().unwrap(),
        r#"<label><input type="checkbox" name="remember" value="Y" checked /> Remember Me</label>"#
    );
}

#[test_log::test]
fn test_checkbox_group_metadata_on_first_input_only() {
    let validator = StaticValidator::new()
        .with_rule("days[]", "required", "true", Some("Pick a day"))
        .with_rule("days[]", "maxlength", "3", None);
    let mut form = Form::new(validator);
    form.define_menu(
        "days[]",
        Menu::new().leaf("mon", "Monday").leaf("tue", "Tuesday").leaf("wed", "Wednesday"),
        None,
    );

    let choices = form.render_checkbox("days[]", attrs([("class", "day")]), Wrap::Collection);
    let carrying: Vec<bool> = choices
        .fragments()
        .iter()
        .map(|f| f.markup.contains("rule-") || f.markup.contains("msg-"))
        .collect();
    assert_eq!(carrying, vec![true, false, false]);
    assert!(choices.fragments().iter().all(|f| f.markup.contains(r#"class="day""#)));
}

#[test_log::test]
fn test_unregistered_menu_renders_nothing() {
    let mut form = form();
    assert_eq!(form.get_menu("ghost"), &MenuDefinition::default());
    assert_eq!(
        form.render_radio("ghost", Attributes::new(), Wrap::Label).as_markup(),
        Some("")
    );
    assert_eq!(
        form.render_select("ghost", Attributes::new()),
        r#"<select name="ghost" id="ghost"></select>"#
    );
}

#[rstest]
#[case::validator_value(Some("R"), Some("G"), "R")]
#[case::default_value(None, Some("G"), "G")]
#[case::nothing(None, None, "")]
#[case::explicit_empty(Some(""), Some("G"), "")]
fn test_default_value_precedence(
    #[case] validated: Option<&str>,
    #[case] default: Option<&str>,
    #[case] expected: &str,
) {
    let mut validator = StaticValidator::new();
    if let Some(value) = validated {
        validator.set_value("color", value);
    }
    let mut form = Form::new(validator);
    if let Some(value) = default {
        form.set_default("color", value);
    }
    assert_eq!(form.resolve_default_value("color", false), FieldValue::from(expected));
}

#[rstest]
#[case(3, None, 3)]
#[case(30, None, 15)]
#[case(30, Some("20"), 20)]
#[case(5, Some("2"), 2)]
fn test_multi_select_size(#[case] options: usize, #[case] declared: Option<&str>, #[case] expected: usize) {
    let mut form = form();
    let menu: Menu = (0..options).map(|i| (format!("k{i}"), format!("v{i}"))).collect();
    form.define_menu("picks[]", menu, None);

    let mut caller = Attributes::new();
    if let Some(size) = declared {
        caller.insert("size".into(), size.into());
    }
    let html = form.render_select("picks[]", caller);
    assert!(html.contains(&format!(r#"multiple size="{expected}""#)), "{html}");
}

#[test_log::test]
fn test_computed_validation_attribute_overrides_caller() {
    let validator = StaticValidator::new().with_rule("email", "required", "true", None);
    let form = Form::new(validator);
    let html = form.render_text("email", attrs([("rule-required", "false")]));
    assert!(html.contains(r#"rule-required="true""#));
    assert!(!html.contains(r#"rule-required="false""#));
}

fn leaf_keys(menu: &Menu, out: &mut BTreeSet<String>) {
    for (key, entry) in menu.iter() {
        match entry {
            MenuEntry::Leaf(_) => {
                out.insert(key.clone());
            }
            MenuEntry::Group(group) => leaf_keys(group, out),
        }
    }
}

fn grouped_menu() -> impl Strategy<Value = Menu> {
    let leaves = prop::collection::vec(("[a-e]{1,2}", "[A-Z][a-z]{0,4}"), 0..6);
    prop::collection::vec((prop::option::of("[g-k]{3}"), leaves), 0..5).prop_map(|parts| {
        let mut menu = Menu::new();
        for (group, leaves) in parts {
            let child: Menu = leaves.into_iter().collect();
            match group {
                Some(name) => menu.insert(name, MenuEntry::Group(child)),
                None => {
                    for (key, entry) in child.iter() {
                        menu.insert(key.clone(), entry.clone());
                    }
                }
            }
        }
        menu
    })
}

proptest! {
    #[test]
    fn flatten_key_set_matches_leaf_keys(menu in grouped_menu()) {
        let mut expected = BTreeSet::new();
        leaf_keys(&menu, &mut expected);
        let flat = flatten(&MenuDefinition::Options(menu));
        let actual: BTreeSet<String> = flat.keys().cloned().collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn flatten_is_idempotent(menu in grouped_menu()) {
        let once = flatten(&MenuDefinition::Options(menu));
        let again = flatten(&MenuDefinition::Options(once.clone().into_iter().collect()));
        prop_assert_eq!(once, again);
    }
}
