//! Declarative form definitions loaded from JSON or YAML.
//!
//! A definition is the wire format turned back into a component tree: each
//! `rule` entry becomes an [`Element`] whose known keys (`type`, `field`,
//! `title`, `value`, `props`, `validate`, `control`, `children`, `emit`)
//! populate its [`ComponentData`] and whose remaining keys (for example
//! `options` or `col`) become overrides. Non-object `children` entries such
//! as text nodes stay in place as verbatim children, and extra control
//! branch keys (for example `condition`) are kept on the branch. Building a
//! loaded rule therefore reproduces the entry it came from.
//!
//! Every nested rule object is turned into a component, so its field takes
//! part in the form's uniqueness check. A `field` that is not a string is
//! rejected.
//!
//! # Example YAML
//!
//! ```yaml
//! action: /leave
//! rule:
//!   - type: radio
//!     field: type
//!     title: Type
//!     options:
//!       - {value: "1", label: Leave}
//!     control:
//!       - value: "1"
//!         rule:
//!           - {type: inputNumber, field: days, title: Days}
//! data:
//!   type: "1"
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::Map;
use crate::component::{Component, ComponentData, ControlRule};
use crate::config::FormConfig;
use crate::error::{FormError, Result};
use crate::form::{DEFAULT_METHOD, Form};
use crate::validate::RawRule;
use crate::widgets::Element;

fn default_method() -> String {
    DEFAULT_METHOD.to_string()
}

/// A complete form: submit target, configuration, rules and initial data.
///
/// # Examples
///
/// ```
/// use form_schema_core::FormDefinition;
/// use serde_json::json;
///
/// let definition = FormDefinition::from_json_str(r#"{
///     "action": "/save",
///     "rule": [{"type": "input", "field": "name", "title": "Name", "suffix": "cm"}],
///     "data": {"name": "Ada"}
/// }"#).unwrap();
///
/// let form = definition.into_form().unwrap();
/// let rule = &form.form_rule()[0];
/// assert_eq!(rule["value"], json!("Ada"));
/// assert_eq!(rule["suffix"], json!("cm"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormDefinition {
    #[serde(default)]
    pub action: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub config: FormConfig,
    #[serde(default)]
    pub rule: Vec<Value>,
    #[serde(default)]
    pub data: Map,
}

impl Default for FormDefinition {
    fn default() -> Self {
        Self {
            action: String::new(),
            method: default_method(),
            config: FormConfig::default(),
            rule: Vec::new(),
            data: Map::new(),
        }
    }
}

impl FormDefinition {
    /// Loads a definition from a `.json`, `.yaml` or `.yml` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let definition: Self = read_document(path)?;
        info!(
            path = %path.display(),
            rules = definition.rule.len(),
            "loaded form definition"
        );
        Ok(definition)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Turns every `rule` entry into a component.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::ComponentTypeMismatch`] for an entry that is not
    /// a rule object with a string `type`.
    pub fn components(&self) -> Result<Vec<Box<dyn Component>>> {
        self.rule.iter().map(component_from_value).collect()
    }

    /// Builds a [`Form`] carrying this definition's action, method and data.
    ///
    /// # Errors
    ///
    /// Fails with [`FormError::ComponentTypeMismatch`] or
    /// [`FormError::DuplicateField`].
    pub fn into_form(self) -> Result<Form> {
        let form = Form::new(self.components()?, self.config)?;
        form.set_action(self.action);
        form.set_method(self.method);
        form.form_data(self.data);
        Ok(form)
    }
}

/// Converts one serialized rule back into a component.
///
/// # Errors
///
/// Returns [`FormError::ComponentTypeMismatch`] if `value` is not an object
/// with a string `type`, if `field` is not a string, if `control` is not a
/// list of well-formed branches, or if `children` is a single object.
pub fn component_from_value(value: &Value) -> Result<Box<dyn Component>> {
    let Value::Object(entry) = value else {
        return Err(FormError::ComponentTypeMismatch(format!(
            "expected a rule object, found {}",
            kind(value)
        )));
    };
    let Some(Value::String(type_tag)) = entry.get("type") else {
        return Err(FormError::ComponentTypeMismatch(
            "rule has no string `type`".to_string(),
        ));
    };

    let mut data = ComponentData::new(type_tag.clone(), "", "");
    for (key, item) in entry {
        match (key.as_str(), item) {
            ("type", _) => {}
            ("field", Value::String(s)) => data.field = s.clone(),
            ("field", other) => {
                return Err(FormError::ComponentTypeMismatch(format!(
                    "`field` of a `{type_tag}` rule must be a string, found {}",
                    kind(other)
                )));
            }
            ("title", Value::String(s)) => data.title = s.clone(),
            ("value", v) => data.value = Some(v.clone()),
            ("props", Value::Object(map)) => data.props = map.clone(),
            ("emit", Value::Object(map)) => data.emit = map.clone(),
            ("validate", Value::Array(rules)) if rules.iter().all(Value::is_object) => {
                for rule in rules.iter().filter_map(Value::as_object) {
                    data.validate.push(Box::new(RawRule(rule.clone())));
                }
            }
            ("control", Value::Array(branches)) => {
                for branch in branches {
                    data.control.push(control_from_value(branch)?);
                }
            }
            ("control", other) => {
                return Err(FormError::ComponentTypeMismatch(format!(
                    "`control` must be a list of branches, found {}",
                    kind(other)
                )));
            }
            ("children", Value::Array(children)) => {
                for child in children {
                    let child: Box<dyn Component> = match child {
                        Value::Object(_) => component_from_value(child)?,
                        text => Box::new(Verbatim(text.clone())),
                    };
                    data.children.push(child);
                }
            }
            ("children", Value::Object(_)) => {
                return Err(FormError::ComponentTypeMismatch(
                    "`children` must be a list, found an object".to_string(),
                ));
            }
            _ => {
                data.overrides.insert(key.clone(), item.clone());
            }
        }
    }

    Ok(Box::new(Element::from_data(data)))
}

fn control_from_value(value: &Value) -> Result<ControlRule> {
    let (Some(trigger), Some(Value::Array(rules))) = (value.get("value"), value.get("rule")) else {
        return Err(FormError::ComponentTypeMismatch(
            "control branch needs `value` and a `rule` list".to_string(),
        ));
    };
    let mut branch = ControlRule::new(trigger.clone());
    for rule in rules {
        branch.rule.push(component_from_value(rule)?);
    }
    if let Value::Object(entry) = value {
        for (key, item) in entry {
            if key != "value" && key != "rule" {
                branch.extra.insert(key.clone(), item.clone());
            }
        }
    }
    Ok(branch)
}

/// A non-object child, such as a text node, emitted exactly as loaded.
#[derive(Debug)]
struct Verbatim(Value);

impl Component for Verbatim {
    fn field(&self) -> &str {
        ""
    }

    fn title(&self) -> &str {
        ""
    }

    fn type_tag(&self) -> &str {
        ""
    }

    /// Text has no rule map of its own.
    fn build(&self) -> Map {
        Map::new()
    }

    fn to_value(&self) -> Value {
        self.0.clone()
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

enum Format {
    Json,
    Yaml,
}

fn format_of(path: &Path) -> Result<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("yaml" | "yml") => Ok(Format::Yaml),
        _ => Err(FormError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Reads a JSON or YAML document, picking the decoder by extension.
pub(crate) fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = format_of(path)?;
    let reader = BufReader::new(File::open(path)?);
    Ok(match format {
        Format::Json => serde_json::from_reader(reader)?,
        Format::Yaml => serde_yaml::from_reader(reader)?,
    })
}

/// Writes a JSON or YAML document, picking the encoder by extension.
pub(crate) fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let format = format_of(path)?;
    let writer = BufWriter::new(File::create(path)?);
    match format {
        Format::Json => serde_json::to_writer_pretty(writer, value)?,
        Format::Yaml => serde_yaml::to_writer(writer, value)?,
    }
    Ok(())
}
