//! Component data model and the shared builder surface.
//!
//! Every widget owns one [`ComponentData`] record. Widgets expose it through
//! two traits:
//!
//! - [`Component`]: identity accessors plus [`build`](Component::build),
//!   which projects the record into a rule map without mutating it.
//! - [`Builder`]: chainable mutators implemented once over
//!   [`data_mut`](Builder::data_mut). Every mutator consumes and returns the
//!   concrete widget type, so widget-specific setters and generic ones can be
//!   mixed freely in one chain.
//!
//! # Examples
//!
//! ```
//! use form_schema_core::*;
//! use serde_json::json;
//!
//! let days = InputNumber::new("days", "Days").min(1);
//! let radio = Radio::new("type", "Type")
//!     .set_options(vec![FormOption::new("1", "Leave"), FormOption::new("2", "Overtime")])
//!     .value("1")
//!     .append_control(ControlRule::new("1").rule(days))
//!     .col(12);
//!
//! let rule = radio.build();
//! assert_eq!(rule["value"], json!("1"));
//! assert_eq!(rule["col"], json!({"span": 12}));
//! assert_eq!(rule["control"][0]["rule"][0]["field"], json!("days"));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Map;
use crate::validate::{Rule, ValidateRule};

/// Raw state of one component.
///
/// `field` is either empty (anonymous components such as static text) or
/// unique across the whole form, including every nested `control` branch and
/// `children` entry. [`Form`](crate::Form) enforces this on every mutation.
#[derive(Debug, Default)]
pub struct ComponentData {
    pub field: String,
    pub title: String,
    pub type_tag: String,
    pub value: Option<Value>,
    pub props: Map,
    pub validate: Vec<Box<dyn ValidateRule>>,
    pub control: Vec<ControlRule>,
    pub children: Vec<Box<dyn Component>>,
    pub emit: Map,
    /// Keys written last over the built rule. See [`Builder::override_key`].
    pub overrides: Map,
}

impl ComponentData {
    /// Creates a record with identity fields set and everything else empty.
    pub fn new(
        type_tag: impl Into<String>,
        field: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            type_tag: type_tag.into(),
            field: field.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Components nested under this one, control branches first.
    pub fn nested(&self) -> impl Iterator<Item = &(dyn Component + 'static)> {
        self.control
            .iter()
            .flat_map(|branch| branch.rule.iter())
            .chain(self.children.iter())
            .map(Box::as_ref)
    }
}

/// The contract every widget satisfies.
pub trait Component: fmt::Debug + Send + Sync {
    fn field(&self) -> &str;
    fn title(&self) -> &str;
    fn type_tag(&self) -> &str;

    /// Projects the component (and its nested subtrees) into a rule map.
    fn build(&self) -> Map;

    /// The component as it appears inside a parent's `children` or a
    /// branch's `rule` list. Text nodes override this to emit a bare value.
    fn to_value(&self) -> Value {
        Value::Object(self.build())
    }

    /// Exposes the underlying record for whole-tree walks.
    ///
    /// Components returning `None` are treated as leaves: their own field is
    /// still checked, but nothing beneath them is.
    fn snapshot(&self) -> Option<&ComponentData> {
        None
    }
}

impl<C: Component + ?Sized> Component for Box<C> {
    fn field(&self) -> &str {
        (**self).field()
    }

    fn title(&self) -> &str {
        (**self).title()
    }

    fn type_tag(&self) -> &str {
        (**self).type_tag()
    }

    fn build(&self) -> Map {
        (**self).build()
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn snapshot(&self) -> Option<&ComponentData> {
        (**self).snapshot()
    }
}

/// A conditional branch: `rule` is shown when the owner's value equals
/// `value`. Equality is decided by the renderer.
#[derive(Debug)]
pub struct ControlRule {
    pub value: Value,
    pub rule: Vec<Box<dyn Component>>,
    /// Renderer keys such as `condition`, emitted after `value` and `rule`.
    pub extra: Map,
}

impl ControlRule {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            rule: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Adds a component to the branch.
    pub fn rule(mut self, component: impl Component + 'static) -> Self {
        self.rule.push(Box::new(component));
        self
    }

    /// Sets a branch key other than `value` and `rule`. Those two are
    /// always written first and cannot be replaced here.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub(crate) fn build(&self) -> Map {
        let mut map = Map::new();
        map.insert("value".into(), self.value.clone());
        map.insert(
            "rule".into(),
            Value::Array(self.rule.iter().map(|c| c.to_value()).collect()),
        );
        for (key, value) in &self.extra {
            if key != "value" && key != "rule" {
                map.insert(key.clone(), value.clone());
            }
        }
        map
    }
}

/// A choice for select-like widgets. `children` nest for cascading choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormOption {
    pub value: Value,
    pub label: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FormOption>,
}

impl FormOption {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            disabled: false,
            children: Vec::new(),
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn with_child(mut self, child: FormOption) -> Self {
        self.children.push(child);
        self
    }

    /// Serializes the option, omitting `disabled: false` and empty children.
    pub fn to_map(&self) -> Map {
        let mut map = Map::new();
        map.insert("value".into(), self.value.clone());
        map.insert("label".into(), Value::String(self.label.clone()));
        if self.disabled {
            map.insert("disabled".into(), Value::Bool(true));
        }
        if !self.children.is_empty() {
            map.insert("children".into(), options_value(&self.children));
        }
        map
    }
}

pub(crate) fn options_value(options: &[FormOption]) -> Value {
    Value::Array(options.iter().map(|o| Value::Object(o.to_map())).collect())
}

/// Generic chainable mutators shared by every widget.
pub trait Builder: Sized {
    fn data_mut(&mut self) -> &mut ComponentData;

    /// Appends a `required` rule; the message names the title when set.
    fn required(mut self) -> Self {
        let data = self.data_mut();
        let mut rule = Rule::required();
        if !data.title.is_empty() {
            rule = rule.message(format!("{} is required", data.title));
        }
        data.validate.push(Box::new(rule));
        self
    }

    fn value(mut self, value: impl Into<Value>) -> Self {
        self.data_mut().value = Some(value.into());
        self
    }

    fn title(mut self, title: impl Into<String>) -> Self {
        self.data_mut().title = title.into();
        self
    }

    fn field(mut self, field: impl Into<String>) -> Self {
        self.data_mut().field = field.into();
        self
    }

    fn props(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data_mut().props.insert(key.into(), value.into());
        self
    }

    /// Replaces the whole props map.
    fn set_props(mut self, props: Map) -> Self {
        self.data_mut().props = props;
        self
    }

    /// Replaces every control branch.
    fn control(mut self, rules: Vec<ControlRule>) -> Self {
        self.data_mut().control = rules;
        self
    }

    fn append_control(mut self, rule: ControlRule) -> Self {
        self.data_mut().control.push(rule);
        self
    }

    /// Appends validation rules in order.
    fn validate<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator,
        I::Item: ValidateRule + 'static,
    {
        let data = self.data_mut();
        for rule in rules {
            data.validate.push(Box::new(rule));
        }
        self
    }

    /// Replaces every child component.
    fn children(mut self, children: Vec<Box<dyn Component>>) -> Self {
        self.data_mut().children = children;
        self
    }

    fn append_child(mut self, child: impl Component + 'static) -> Self {
        self.data_mut().children.push(Box::new(child));
        self
    }

    fn emit(mut self, event: impl Into<String>, handler: impl Into<Value>) -> Self {
        self.data_mut().emit.insert(event.into(), handler.into());
        self
    }

    /// Writes one top-level rule key through the override slot.
    fn append_rule(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.override_key(name, value)
    }

    /// Sets the grid column: an integer becomes `{span: n}`, a map is kept
    /// as is, anything else is stored raw.
    fn col(self, col: impl Into<Value>) -> Self {
        let col = match col.into() {
            Value::Number(n) if n.is_i64() || n.is_u64() => {
                let mut span = Map::new();
                span.insert("span".into(), Value::Number(n));
                Value::Object(span)
            }
            other => other,
        };
        self.override_key("col", col)
    }

    /// Sets a key written after everything else when the rule is built.
    ///
    /// Overrides win over every standard key, including `type`, `value` and
    /// `control`. A stray `override_key("value", ..)` silently replaces the
    /// component value, so reserve it for renderer keys with no dedicated
    /// setter.
    fn override_key(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data_mut().overrides.insert(key.into(), value.into());
        self
    }
}

/// Choice widgets holding a list of [`FormOption`]s.
pub trait Options: Builder {
    fn options_mut(&mut self) -> &mut Vec<FormOption>;

    fn set_options(mut self, options: Vec<FormOption>) -> Self {
        *self.options_mut() = options;
        self
    }

    fn append_option(mut self, option: FormOption) -> Self {
        self.options_mut().push(option);
        self
    }
}
