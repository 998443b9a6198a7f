use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use form_schema_core::{
    Builder, Cascader, Component, ControlRule, DatePicker, Element, Form, FormConfig,
    FormDefinition, FormError, FormOption, Hidden, Input, InputNumber, Map, Options, Radio, Rule,
    Select, Switch, UiAdapter,
};
use serde_json::{Value, json};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn boxed(c: impl Component + 'static) -> Box<dyn Component> {
    Box::new(c)
}

/// Leave request: a radio whose two branches each nest a number input.
fn leave_radio() -> Radio {
    Radio::new("type", "Type")
        .set_options(vec![
            FormOption::new("1", "Leave"),
            FormOption::new("2", "Overtime"),
        ])
        .append_control(ControlRule::new("1").rule(InputNumber::new("days", "Days").min(1)))
        .append_control(
            ControlRule::new("2").rule(InputNumber::new("salary", "Salary").precision(2)),
        )
}

/// Collects fields from serialized rules, independent of the component walk.
fn walk_rule_fields(rule: &Value, out: &mut Vec<String>) {
    if let Some(field) = rule.get("field").and_then(Value::as_str) {
        if !field.is_empty() {
            out.push(field.to_string());
        }
    }
    if let Some(branches) = rule.get("control").and_then(Value::as_array) {
        for branch in branches {
            for nested in branch["rule"].as_array().into_iter().flatten() {
                walk_rule_fields(nested, out);
            }
        }
    }
    for child in rule.get("children").and_then(Value::as_array).into_iter().flatten() {
        walk_rule_fields(child, out);
    }
}

fn deep_tree() -> Vec<Box<dyn Component>> {
    vec![
        boxed(Hidden::new("id", 42)),
        boxed(leave_radio()),
        boxed(
            Element::new("el-card")
                .append_child(Input::new("reason", "Reason"))
                .append_child(
                    Element::new("el-row").append_child(
                        Switch::new("urgent", "Urgent").append_control(
                            ControlRule::new(true).rule(
                                DatePicker::new("deadline", "Deadline").append_control(
                                    ControlRule::new("2024-01-01")
                                        .rule(Input::new("note", "Note")),
                                ),
                            ),
                        ),
                    ),
                ),
        ),
        boxed(Element::new("el-divider")),
    ]
}

// ---------------------------------------------------------------------------
// Uniqueness
// ---------------------------------------------------------------------------

#[test]
fn test_fields_match_independent_walk() {
    let form = Form::new(deep_tree(), FormConfig::default()).unwrap();

    let mut walked = Vec::new();
    for rule in form.form_rule() {
        walk_rule_fields(&Value::Object(rule), &mut walked);
    }

    assert_eq!(form.fields(), walked);
    assert_eq!(
        walked,
        vec!["id", "type", "days", "salary", "reason", "urgent", "deadline", "note"]
    );
    let unique: BTreeSet<_> = walked.iter().collect();
    assert_eq!(unique.len(), walked.len());
}

#[test]
fn test_every_nested_field_collides_with_root() {
    let fields = Form::new(deep_tree(), FormConfig::default())
        .unwrap()
        .fields();

    for field in fields {
        let form = Form::new(deep_tree(), FormConfig::default()).unwrap();
        let err = form.append(Input::new(field.clone(), "Dup")).unwrap_err();
        assert!(matches!(err, FormError::DuplicateField(f) if f == field));
        assert_eq!(form.fields().len(), 8);
    }
}

#[test]
fn test_set_rule_rolls_back_on_duplicate() {
    let form = Form::new(vec![boxed(leave_radio())], FormConfig::default()).unwrap();
    let before = form.form_rule();

    let result = form.set_rule(vec![
        boxed(Input::new("a", "A")),
        boxed(Element::new("div").append_child(Input::new("a", "Nested A"))),
    ]);

    assert!(matches!(result, Err(FormError::DuplicateField(f)) if f == "a"));
    assert_eq!(form.form_rule(), before);
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

#[test]
fn test_override_precedence() {
    let rule = InputNumber::new("n", "N")
        .value(1)
        .override_key("value", 2)
        .build();
    assert_eq!(rule["value"], json!(2));
}

#[test]
fn test_absence_over_emptiness() {
    let rule = Select::new("s", "S")
        .control(Vec::new())
        .children(Vec::new())
        .validate(Vec::<Rule>::new())
        .build();
    for key in ["validate", "control", "children", "options", "props", "emit", "value"] {
        assert!(!rule.contains_key(key), "unexpected key {key}");
    }
}

#[test]
fn test_select_scenario() {
    let select = Select::new("role", "Role")
        .set_options(vec![
            FormOption::new("admin", "Admin"),
            FormOption::new("user", "User"),
        ])
        .required();
    let rule = select.build();

    assert_eq!(rule["type"], json!("select"));
    assert_eq!(rule["field"], json!("role"));
    assert_eq!(rule["title"], json!("Role"));
    assert_eq!(
        rule["options"],
        json!([{"value": "admin", "label": "Admin"}, {"value": "user", "label": "User"}])
    );
    assert_eq!(rule["validate"][0]["required"], json!(true));
    assert!(!rule.contains_key("value"));
}

#[test]
fn test_round_trip_through_json() {
    let form = Form::new(deep_tree(), FormConfig::default()).unwrap();
    form.set_value("salary", 1234.5);
    form.set_value("urgent", true);

    let bytes = form.parse_form_rule().unwrap();
    let decoded: Vec<Map> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(decoded, form.form_rule());
    assert_eq!(serde_json::to_vec(&decoded).unwrap(), bytes.to_vec());
}

#[test]
fn test_definition_rebuilds_identical_rules() {
    let form = Form::new(deep_tree(), FormConfig::default()).unwrap();
    let mut definition = FormDefinition::default();
    definition.rule = form.form_rule().into_iter().map(Value::Object).collect();

    let reloaded = definition.into_form().unwrap();
    assert_eq!(reloaded.fields(), form.fields());
    assert_eq!(
        reloaded.parse_form_rule().unwrap(),
        form.parse_form_rule().unwrap()
    );
}

#[test]
fn test_definition_root_must_be_a_rule() {
    let definition = FormDefinition::from_json_str(r#"{"rule": [{"type": "input"}, "oops"]}"#)
        .unwrap();
    assert!(matches!(
        definition.into_form(),
        Err(FormError::ComponentTypeMismatch(_))
    ));
}

// ---------------------------------------------------------------------------
// Data application
// ---------------------------------------------------------------------------

#[test]
fn test_deep_data_application() {
    let form = Form::new(vec![boxed(leave_radio())], FormConfig::default()).unwrap();
    let mut data = Map::new();
    data.insert("type".into(), json!("2"));
    data.insert("salary".into(), json!(5000));
    form.form_data(data);

    let rules = form.form_rule();
    assert_eq!(rules[0]["value"], json!("2"));
    assert_eq!(rules[0]["control"][1]["rule"][0]["value"], json!(5000));
    assert!(rules[0]["control"][0]["rule"][0].get("value").is_none());
}

#[test]
fn test_data_reaches_any_depth() {
    let form = Form::new(deep_tree(), FormConfig::default()).unwrap();
    form.set_value("note", "late");
    let rules = form.form_rule();
    let note = &rules[2]["children"][1]["children"][0]["control"][0]["rule"][0]["control"][0]
        ["rule"][0];
    assert_eq!(note["field"], json!("note"));
    assert_eq!(note["value"], json!("late"));
}

// ---------------------------------------------------------------------------
// Caching
// ---------------------------------------------------------------------------

struct CountingAdapter(Arc<AtomicUsize>);

impl UiAdapter for CountingAdapter {
    fn parse_component(&self, rule: Map) -> Map {
        self.0.fetch_add(1, Ordering::SeqCst);
        rule
    }
}

#[test]
fn test_cache_idempotence_and_invalidation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let form = Form::new(vec![boxed(leave_radio())], FormConfig::default())
        .unwrap()
        .with_adapter(CountingAdapter(Arc::clone(&calls)));

    // One root plus one rule in each of the two branches.
    let first = form.parse_form_rule().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let second = form.parse_form_rule().unwrap();
    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    form.append(Cascader::new("area", "Area")).unwrap();
    form.parse_form_rule().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 7);
}

#[test]
fn test_config_cache_tracks_action() {
    let form = Form::new(Vec::new(), FormConfig::default().with_submit_btn(true)).unwrap();
    form.set_action("/a");
    let a = form.parse_form_config().unwrap();
    assert_eq!(a, form.parse_form_config().unwrap());

    form.set_action("/b");
    let b: Value = serde_json::from_slice(&form.parse_form_config().unwrap()).unwrap();
    assert_eq!(b, json!({"submitBtn": true, "form": {"action": "/b", "method": "post"}}));
}
