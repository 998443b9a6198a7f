//! Form-level renderer configuration.
//!
//! [`FormConfig`] carries the options that apply to the whole form rather
//! than one component: submit/reset buttons, form style, grid row, info
//! popovers and global per-component defaults. Unknown keys are kept in
//! [`extra`](FormConfig::extra) so renderer-specific settings survive a
//! load/save round trip.
//!
//! # Example YAML
//!
//! ```yaml
//! submitBtn:
//!   innerText: Send
//! resetBtn: true
//! formStyle:
//!   labelWidth: 120px
//! global:
//!   "*":
//!     props:
//!       clearable: true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Map;
use crate::definition::{read_document, write_document};
use crate::error::Result;

/// Whole-form renderer options, serialized with camelCase keys.
///
/// # Examples
///
/// ```
/// use form_schema_core::FormConfig;
/// use serde_json::json;
///
/// let config = FormConfig::default()
///     .with_submit_btn(json!({"innerText": "Send"}))
///     .with_reset_btn(false);
/// let map = config.to_map();
/// assert_eq!(map["submitBtn"], json!({"innerText": "Send"}));
/// assert_eq!(map["resetBtn"], json!(false));
/// assert!(!map.contains_key("row"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_btn: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_btn: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_style: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<Value>,
    /// Renderer keys without a dedicated field.
    #[serde(flatten)]
    pub extra: Map,
}

impl FormConfig {
    /// Loads a configuration from a `.json`, `.yaml` or `.yml` file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::FormError::Io) if the file cannot be read,
    /// [`UnsupportedFormat`](crate::FormError::UnsupportedFormat) for other
    /// extensions, or a parse error from the matching decoder.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        read_document(path.as_ref())
    }

    /// Saves the configuration, picking the format from the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_document(path.as_ref(), self)
    }

    pub fn with_submit_btn(mut self, value: impl Into<Value>) -> Self {
        self.submit_btn = Some(value.into());
        self
    }

    pub fn with_reset_btn(mut self, value: impl Into<Value>) -> Self {
        self.reset_btn = Some(value.into());
        self
    }

    pub fn with_form_style(mut self, value: impl Into<Value>) -> Self {
        self.form_style = Some(value.into());
        self
    }

    pub fn with_row(mut self, value: impl Into<Value>) -> Self {
        self.row = Some(value.into());
        self
    }

    pub fn with_info(mut self, value: impl Into<Value>) -> Self {
        self.info = Some(value.into());
        self
    }

    pub fn with_global(mut self, value: impl Into<Value>) -> Self {
        self.global = Some(value.into());
        self
    }

    /// Sets a renderer key that has no dedicated field.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Returns the wire map; unset options are absent.
    pub fn to_map(&self) -> Map {
        let mut map = Map::new();
        let slots = [
            ("submitBtn", &self.submit_btn),
            ("resetBtn", &self.reset_btn),
            ("formStyle", &self.form_style),
            ("row", &self.row),
            ("info", &self.info),
            ("global", &self.global),
        ];
        for (key, slot) in slots {
            if let Some(value) = slot {
                map.insert(key.to_string(), value.clone());
            }
        }
        for (key, value) in &self.extra {
            map.insert(key.clone(), value.clone());
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
submitBtn:
  innerText: Send
resetBtn: true
row:
  gutter: 16
language: en
"#
    }

    #[test]
    fn test_deserialize_yaml() {
        let config: FormConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.submit_btn, Some(json!({"innerText": "Send"})));
        assert_eq!(config.reset_btn, Some(json!(true)));
        assert_eq!(config.row, Some(json!({"gutter": 16})));
        assert_eq!(config.extra["language"], json!("en"));
        assert!(config.global.is_none());
    }

    #[test]
    fn test_serialize_matches_to_map() {
        let config: FormConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            Value::Object(config.to_map())
        );
    }

    #[test]
    fn test_default_is_empty() {
        assert!(FormConfig::default().to_map().is_empty());
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["config.json", "config.yaml"] {
            let path = dir.path().join(name);
            let original: FormConfig = serde_yaml::from_str(sample_yaml()).unwrap();
            original.save(&path).unwrap();
            assert_eq!(FormConfig::load(&path).unwrap(), original);
        }
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(
            FormConfig::load(&path),
            Err(crate::FormError::UnsupportedFormat(_))
        ));
    }
}
