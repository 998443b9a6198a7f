//! Projection of a [`ComponentData`] record into a rule map.
//!
//! The assembly order is fixed:
//!
//! 1. identity: `type`, `field`, `title` (when non-empty), `value` (when set)
//! 2. `props`
//! 3. `validate`
//! 4. `control`, each branch as `{value, rule: [...]}` followed by its extra keys
//! 5. `children`
//! 6. widget-owned keys such as `options`
//! 7. `emit`
//! 8. overrides, written last over any key above
//!
//! Empty maps and lists are omitted rather than emitted empty.

use serde_json::Value;

use crate::Map;
use crate::component::ComponentData;

/// Builds the rule map for `data`.
///
/// # Examples
///
/// ```
/// use form_schema_core::{ComponentData, build_component};
/// use serde_json::json;
///
/// let mut data = ComponentData::new("input", "name", "Name");
/// data.value = Some(json!("Ada"));
/// data.overrides.insert("value".into(), json!("Grace"));
///
/// let rule = build_component(&data);
/// assert_eq!(
///     serde_json::Value::Object(rule),
///     json!({"type": "input", "field": "name", "title": "Name", "value": "Grace"})
/// );
/// ```
pub fn build_component(data: &ComponentData) -> Map {
    build_component_with(data, |_| {})
}

/// Builds the rule map for `data`, letting `extend` add widget-owned keys
/// after the shared ones and before `emit` and overrides.
pub fn build_component_with(data: &ComponentData, extend: impl FnOnce(&mut Map)) -> Map {
    let mut rule = Map::new();

    if !data.type_tag.is_empty() {
        rule.insert("type".into(), Value::String(data.type_tag.clone()));
    }
    if !data.field.is_empty() {
        rule.insert("field".into(), Value::String(data.field.clone()));
    }
    if !data.title.is_empty() {
        rule.insert("title".into(), Value::String(data.title.clone()));
    }
    if let Some(value) = &data.value {
        rule.insert("value".into(), value.clone());
    }

    if !data.props.is_empty() {
        rule.insert("props".into(), Value::Object(data.props.clone()));
    }

    if !data.validate.is_empty() {
        let validate = data
            .validate
            .iter()
            .map(|r| Value::Object(r.to_map()))
            .collect();
        rule.insert("validate".into(), Value::Array(validate));
    }

    if !data.control.is_empty() {
        let control = data
            .control
            .iter()
            .map(|branch| Value::Object(branch.build()))
            .collect();
        rule.insert("control".into(), Value::Array(control));
    }

    if !data.children.is_empty() {
        let children = data
            .children
            .iter()
            .map(|c| c.to_value())
            .collect();
        rule.insert("children".into(), Value::Array(children));
    }

    extend(&mut rule);

    if !data.emit.is_empty() {
        rule.insert("emit".into(), Value::Object(data.emit.clone()));
    }

    for (key, value) in &data.overrides {
        rule.insert(key.clone(), value.clone());
    }

    rule
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::component::{Builder, Component, ControlRule};
    use crate::validate::Rule;
    use crate::widgets::{Element, Input, InputNumber};

    #[test]
    fn test_empty_collections_are_absent() {
        let rule = build_component(&ComponentData::new("input", "name", ""));
        assert_eq!(Value::Object(rule), json!({"type": "input", "field": "name"}));
    }

    #[test]
    fn test_value_absent_unless_set() {
        let rule = Input::new("name", "Name").build();
        assert!(!rule.contains_key("value"));

        let rule = Input::new("name", "Name").value(Value::Null).build();
        assert_eq!(rule["value"], Value::Null);
    }

    #[test]
    fn test_full_assembly_order() {
        let input = Input::new("name", "Name")
            .value("x")
            .placeholder("p")
            .validate([Rule::length().max(4)])
            .append_control(ControlRule::new("x").rule(InputNumber::new("n", "N")))
            .append_child(Element::new("span").props("innerText", "hint"))
            .emit("change", "onNameChange")
            .append_rule("suffix", "kg");

        let keys: Vec<_> = input.build().keys().cloned().collect();
        assert_eq!(
            keys,
            vec![
                "type", "field", "title", "value", "props", "validate", "control", "children",
                "emit", "suffix"
            ]
        );
    }

    #[test]
    fn test_override_wins_over_standard_keys() {
        let input = Input::new("name", "Name")
            .value("x")
            .override_key("type", "textarea")
            .override_key("value", "y")
            .override_key("control", json!([]));
        let rule = input.build();
        assert_eq!(rule["type"], json!("textarea"));
        assert_eq!(rule["value"], json!("y"));
        assert_eq!(rule["control"], json!([]));
    }

    #[test]
    fn test_control_branches_build_recursively() {
        let input = Input::new("a", "A")
            .append_control(ControlRule::new(1).rule(Input::new("b", "B")))
            .append_control(
                ControlRule::new(2).rule(
                    Input::new("c", "C")
                        .append_control(ControlRule::new("deep").rule(Input::new("d", "D"))),
                ),
            );
        let rule = Value::Object(input.build());
        assert_eq!(rule["control"][0]["value"], json!(1));
        assert_eq!(rule["control"][1]["rule"][0]["control"][0]["rule"][0]["field"], json!("d"));
    }

    #[test]
    fn test_build_is_pure() {
        let input = Input::new("a", "A").value(1).col(6);
        assert_eq!(input.build(), input.build());
    }
}
