//! Concrete widgets.
//!
//! Each widget wraps a [`ComponentData`] record and opts into
//! [`Component`], [`Builder`] and, for choice widgets, [`Options`]. Widget
//! setters are thin `props` assignments; all shared behavior lives in the
//! traits.

use serde_json::Value;

use crate::Map;
use crate::component::{Builder, Component, ComponentData, FormOption, Options, options_value};
use crate::serialize::{build_component, build_component_with};

macro_rules! widget {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            pub(crate) data: ComponentData,
        }

        impl Builder for $name {
            fn data_mut(&mut self) -> &mut ComponentData {
                &mut self.data
            }
        }

        impl Component for $name {
            fn field(&self) -> &str {
                &self.data.field
            }

            fn title(&self) -> &str {
                &self.data.title
            }

            fn type_tag(&self) -> &str {
                &self.data.type_tag
            }

            fn build(&self) -> Map {
                build_component(&self.data)
            }

            fn snapshot(&self) -> Option<&ComponentData> {
                Some(&self.data)
            }
        }
    };
    ($(#[$meta:meta])* $name:ident, options) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            pub(crate) data: ComponentData,
            pub(crate) options: Vec<FormOption>,
        }

        impl Builder for $name {
            fn data_mut(&mut self) -> &mut ComponentData {
                &mut self.data
            }
        }

        impl Options for $name {
            fn options_mut(&mut self) -> &mut Vec<FormOption> {
                &mut self.options
            }
        }

        impl Component for $name {
            fn field(&self) -> &str {
                &self.data.field
            }

            fn title(&self) -> &str {
                &self.data.title
            }

            fn type_tag(&self) -> &str {
                &self.data.type_tag
            }

            fn build(&self) -> Map {
                build_component_with(&self.data, |rule| {
                    if !self.options.is_empty() {
                        rule.insert("options".into(), options_value(&self.options));
                    }
                })
            }

            fn snapshot(&self) -> Option<&ComponentData> {
                Some(&self.data)
            }
        }
    };
}

widget!(
    /// Single-line text input; [`Input::password`] and [`Input::textarea`]
    /// set the input `type` prop.
    Input
);

impl Input {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            data: ComponentData::new("input", field, title),
        }
    }

    pub fn password(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(field, title).props("type", "password")
    }

    pub fn textarea(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(field, title).props("type", "textarea")
    }

    pub fn placeholder(self, text: impl Into<String>) -> Self {
        self.props("placeholder", Value::String(text.into()))
    }

    pub fn clearable(self, clearable: bool) -> Self {
        self.props("clearable", clearable)
    }

    pub fn disabled(self, disabled: bool) -> Self {
        self.props("disabled", disabled)
    }

    pub fn maxlength(self, n: u32) -> Self {
        self.props("maxlength", n)
    }

    pub fn rows(self, n: u32) -> Self {
        self.props("rows", n)
    }
}

widget!(
    /// Numeric input.
    InputNumber
);

impl InputNumber {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            data: ComponentData::new("inputNumber", field, title),
        }
    }

    pub fn min(self, n: impl Into<Value>) -> Self {
        self.props("min", n)
    }

    pub fn max(self, n: impl Into<Value>) -> Self {
        self.props("max", n)
    }

    pub fn step(self, n: impl Into<Value>) -> Self {
        self.props("step", n)
    }

    pub fn precision(self, digits: u32) -> Self {
        self.props("precision", digits)
    }

    pub fn disabled(self, disabled: bool) -> Self {
        self.props("disabled", disabled)
    }
}

widget!(
    /// Drop-down selection.
    Select,
    options
);

impl Select {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            data: ComponentData::new("select", field, title),
            options: Vec::new(),
        }
    }

    pub fn multiple(self, multiple: bool) -> Self {
        self.props("multiple", multiple)
    }

    pub fn clearable(self, clearable: bool) -> Self {
        self.props("clearable", clearable)
    }

    pub fn filterable(self, filterable: bool) -> Self {
        self.props("filterable", filterable)
    }

    pub fn placeholder(self, text: impl Into<String>) -> Self {
        self.props("placeholder", Value::String(text.into()))
    }
}

widget!(
    /// Radio group.
    Radio,
    options
);

impl Radio {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            data: ComponentData::new("radio", field, title),
            options: Vec::new(),
        }
    }

    /// Renders choices as buttons instead of dots.
    pub fn button(self, button: bool) -> Self {
        self.props("type", if button { "button" } else { "radio" })
    }
}

widget!(
    /// Checkbox group; the value is a list of checked option values.
    Checkbox,
    options
);

impl Checkbox {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            data: ComponentData::new("checkbox", field, title),
            options: Vec::new(),
        }
    }

    pub fn min(self, n: u32) -> Self {
        self.props("min", n)
    }

    pub fn max(self, n: u32) -> Self {
        self.props("max", n)
    }
}

widget!(
    /// Cascading selection over nested [`FormOption`] children.
    Cascader,
    options
);

impl Cascader {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            data: ComponentData::new("cascader", field, title),
            options: Vec::new(),
        }
    }

    pub fn placeholder(self, text: impl Into<String>) -> Self {
        self.props("placeholder", Value::String(text.into()))
    }

    pub fn change_on_select(self, enabled: bool) -> Self {
        self.props("changeOnSelect", enabled)
    }
}

widget!(
    /// On/off toggle.
    Switch
);

impl Switch {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            data: ComponentData::new("switch", field, title),
        }
    }

    pub fn active_value(self, value: impl Into<Value>) -> Self {
        self.props("activeValue", value)
    }

    pub fn inactive_value(self, value: impl Into<Value>) -> Self {
        self.props("inactiveValue", value)
    }
}

widget!(DatePicker);

impl DatePicker {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            data: ComponentData::new("datePicker", field, title),
        }
        .props("type", "date")
    }

    pub fn date_range(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(field, title).props("type", "daterange")
    }

    pub fn date_time(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(field, title).props("type", "datetime")
    }

    /// Format of the submitted value, e.g. `yyyy-MM-dd`.
    pub fn value_format(self, format: impl Into<String>) -> Self {
        self.props("valueFormat", Value::String(format.into()))
    }
}

widget!(TimePicker);

impl TimePicker {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            data: ComponentData::new("timePicker", field, title),
        }
    }

    pub fn is_range(self, range: bool) -> Self {
        self.props("isRange", range)
    }

    pub fn value_format(self, format: impl Into<String>) -> Self {
        self.props("valueFormat", Value::String(format.into()))
    }
}

widget!(Slider);

impl Slider {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            data: ComponentData::new("slider", field, title),
        }
    }

    pub fn min(self, n: impl Into<Value>) -> Self {
        self.props("min", n)
    }

    pub fn max(self, n: impl Into<Value>) -> Self {
        self.props("max", n)
    }

    pub fn step(self, n: impl Into<Value>) -> Self {
        self.props("step", n)
    }

    pub fn range(self, range: bool) -> Self {
        self.props("range", range)
    }
}

widget!(Rate);

impl Rate {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            data: ComponentData::new("rate", field, title),
        }
    }

    pub fn max(self, n: u32) -> Self {
        self.props("max", n)
    }

    pub fn allow_half(self, allow: bool) -> Self {
        self.props("allowHalf", allow)
    }
}

widget!(ColorPicker);

impl ColorPicker {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            data: ComponentData::new("colorPicker", field, title),
        }
    }

    pub fn show_alpha(self, show: bool) -> Self {
        self.props("showAlpha", show)
    }
}

widget!(
    /// File upload. `action` is the endpoint receiving the files.
    Upload
);

impl Upload {
    pub fn new(
        field: impl Into<String>,
        title: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            data: ComponentData::new("upload", field, title),
        }
        .props("action", Value::String(action.into()))
    }

    pub fn limit(self, n: u32) -> Self {
        self.props("limit", n)
    }

    pub fn multiple(self, multiple: bool) -> Self {
        self.props("multiple", multiple)
    }
}

widget!(
    /// Value submitted with the form but never displayed.
    Hidden
);

impl Hidden {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            data: ComponentData::new("hidden", field, ""),
        }
        .value(value)
    }
}

widget!(
    /// Any renderer component by tag (`span`, `el-button`, ...). Anonymous
    /// unless a field is set.
    Element
);

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            data: ComponentData::new(tag, "", ""),
        }
    }

    pub(crate) fn from_data(data: ComponentData) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::component::ControlRule;

    #[test]
    fn test_select_scenario() {
        let select = Select::new("role", "Role")
            .set_options(vec![
                FormOption::new("admin", "Admin"),
                FormOption::new("user", "User"),
            ])
            .required();

        assert_eq!(
            Value::Object(select.build()),
            json!({
                "type": "select",
                "field": "role",
                "title": "Role",
                "validate": [{"required": true, "message": "Role is required"}],
                "options": [
                    {"value": "admin", "label": "Admin"},
                    {"value": "user", "label": "User"}
                ]
            })
        );
    }

    #[test]
    fn test_empty_options_absent() {
        let rule = Radio::new("r", "R").build();
        assert!(!rule.contains_key("options"));
    }

    #[test]
    fn test_override_beats_options() {
        let rule = Select::new("s", "S")
            .append_option(FormOption::new(1, "One"))
            .override_key("options", json!([]))
            .build();
        assert_eq!(rule["options"], json!([]));
    }

    #[test]
    fn test_cascader_nested_options() {
        let rule = Cascader::new("area", "Area")
            .append_option(
                FormOption::new("zj", "Zhejiang").with_child(FormOption::new("hz", "Hangzhou")),
            )
            .build();
        assert_eq!(rule["options"][0]["children"][0]["value"], json!("hz"));
    }

    #[test]
    fn test_hidden_is_untitled() {
        let rule = Hidden::new("id", 7).build();
        assert_eq!(
            Value::Object(rule),
            json!({"type": "hidden", "field": "id", "value": 7})
        );
    }

    #[test]
    fn test_element_is_anonymous() {
        let el = Element::new("el-divider");
        assert_eq!(Component::field(&el), "");
        assert_eq!(Value::Object(el.build()), json!({"type": "el-divider"}));
    }

    #[test]
    fn test_widget_props() {
        assert_eq!(
            Input::textarea("bio", "Bio").rows(4).build()["props"],
            json!({"type": "textarea", "rows": 4})
        );
        assert_eq!(
            DatePicker::date_range("span", "Span").build()["props"]["type"],
            json!("daterange")
        );
        assert_eq!(
            Upload::new("files", "Files", "/upload").limit(3).build()["props"],
            json!({"action": "/upload", "limit": 3})
        );
        assert_eq!(
            Switch::new("on", "On").active_value(1).build()["props"],
            json!({"activeValue": 1})
        );
    }

    #[test]
    fn test_snapshot_exposes_nested() {
        let radio = Radio::new("type", "Type")
            .append_control(ControlRule::new("1").rule(InputNumber::new("days", "Days")));
        let data = radio.snapshot().unwrap();
        assert_eq!(data.control[0].rule[0].field(), "days");
    }
}
