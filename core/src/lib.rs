//! Component tree assembly and rule serialization for declarative form
//! renderers.
//!
//! This crate builds the JSON a client-side form renderer consumes:
//!
//! - [`ComponentData`]: one component's identity, value, props, validation
//!   rules, conditional [`ControlRule`] branches, children, events and
//!   overrides.
//! - [`Builder`]: chainable mutators shared by every widget ([`Input`],
//!   [`Select`], [`Radio`], ...), each returning the concrete widget type.
//! - [`build_component`]: the projection of a record into a rule map, with
//!   overrides applied last.
//! - [`Form`]: the aggregate owning the tree. It keeps field names unique
//!   across every nested branch, applies submitted data by field name at any
//!   depth, and caches the encoded JSON behind a reader/writer lock.
//! - [`FormDefinition`]: the same tree loaded from a JSON or YAML document.
//!
//! The renderer evaluates `control` branches; this crate only encodes them.
//!
//! # Example
//!
//! ```
//! use form_schema_core::*;
//! use serde_json::json;
//!
//! let kind = Radio::new("type", "Type")
//!     .set_options(vec![FormOption::new("1", "Leave"), FormOption::new("2", "Overtime")])
//!     .append_control(ControlRule::new("1").rule(InputNumber::new("days", "Days")))
//!     .append_control(ControlRule::new("2").rule(InputNumber::new("salary", "Salary")));
//!
//! let form = Form::new(vec![Box::new(kind)], FormConfig::default()).unwrap();
//! form.set_value("type", "2");
//! form.set_value("salary", 5000);
//!
//! let rules = form.form_rule();
//! assert_eq!(rules[0]["value"], json!("2"));
//! assert_eq!(rules[0]["control"][1]["rule"][0]["value"], json!(5000));
//! assert!(rules[0]["control"][0]["rule"][0].get("value").is_none());
//!
//! let bytes = form.parse_form_rule().unwrap();
//! assert_eq!(bytes, form.parse_form_rule().unwrap());
//! ```

mod adapter;
mod component;
mod config;
mod definition;
mod error;
mod form;
mod serialize;
mod validate;
mod widgets;

/// Ordered JSON object used for every rule and config map.
pub type Map = serde_json::Map<String, serde_json::Value>;

pub use adapter::{Bootstrap, Passthrough, UiAdapter};
pub use component::{Builder, Component, ComponentData, ControlRule, FormOption, Options};
pub use config::FormConfig;
pub use definition::{FormDefinition, component_from_value};
pub use error::{FormError, Result};
pub use form::{DEFAULT_METHOD, FieldViolation, Form, check_field_unique};
pub use serialize::{build_component, build_component_with};
pub use validate::{RawRule, Rule, RuleKind, ValidateRule};
pub use widgets::{
    Cascader, Checkbox, ColorPicker, DatePicker, Element, Hidden, Input, InputNumber, Radio, Rate,
    Select, Slider, Switch, TimePicker, Upload,
};
