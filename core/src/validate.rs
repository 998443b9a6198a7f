//! Validation rule records attached to components.
//!
//! The renderer owns validation at runtime; this module only describes rules
//! as flat maps. Each rule also exposes a [`check`](ValidateRule::check)
//! convenience so server-side code can re-run the same constraints against
//! submitted data.
//!
//! # Examples
//!
//! ```
//! use form_schema_core::{Rule, ValidateRule};
//! use serde_json::json;
//!
//! let rule = Rule::length().min(2).max(16).message("2 to 16 characters");
//! assert_eq!(
//!     serde_json::Value::Object(rule.to_map()),
//!     json!({"type": "string", "min": 2, "max": 16, "message": "2 to 16 characters"})
//! );
//! assert!(rule.check(Some(&json!("ok"))).is_ok());
//! assert!(rule.check(Some(&json!("x"))).is_err());
//! ```

use std::fmt;

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde_json::{Value, json};

use crate::Map;

/// A validation rule that can be serialized into a renderer rule record.
pub trait ValidateRule: fmt::Debug + Send + Sync {
    /// Returns the flat record consumed by the renderer.
    fn to_map(&self) -> Map;

    /// Checks a submitted value against this rule.
    ///
    /// `None` means the field carried no value. The default accepts anything.
    fn check(&self, _value: Option<&Value>) -> Result<(), String> {
        Ok(())
    }
}

/// Constraint carried by a built-in [`Rule`].
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    /// Value must be present and non-empty.
    Required,
    /// String value must match a regular expression.
    Pattern(String),
    /// String (or array) length bounds.
    Length {
        len: Option<u64>,
        min: Option<u64>,
        max: Option<u64>,
    },
    /// Numeric bounds.
    Range { min: Option<f64>, max: Option<f64> },
    /// Email address.
    Email,
    /// Absolute URL.
    Url,
    /// Calendar date.
    Date,
    /// Value must equal one of the listed values.
    Enum(Vec<Value>),
    /// Value must not be whitespace only.
    Whitespace,
    /// Caller-supplied record emitted verbatim.
    Custom(Map),
}

/// A built-in validation rule with optional message and trigger.
///
/// Constructors pick the constraint; [`message`](Rule::message) and
/// [`trigger`](Rule::trigger) decorate the emitted record.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub kind: RuleKind,
    pub message: Option<String>,
    pub trigger: Option<String>,
}

impl Rule {
    fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            message: None,
            trigger: None,
        }
    }

    pub fn required() -> Self {
        Self::new(RuleKind::Required)
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self::new(RuleKind::Pattern(pattern.into()))
    }

    pub fn length() -> Self {
        Self::new(RuleKind::Length {
            len: None,
            min: None,
            max: None,
        })
    }

    pub fn range() -> Self {
        Self::new(RuleKind::Range {
            min: None,
            max: None,
        })
    }

    pub fn email() -> Self {
        Self::new(RuleKind::Email)
    }

    pub fn url() -> Self {
        Self::new(RuleKind::Url)
    }

    pub fn date() -> Self {
        Self::new(RuleKind::Date)
    }

    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(RuleKind::Enum(values.into_iter().map(Into::into).collect()))
    }

    pub fn whitespace() -> Self {
        Self::new(RuleKind::Whitespace)
    }

    pub fn custom(record: Map) -> Self {
        Self::new(RuleKind::Custom(record))
    }

    /// Sets the message shown by the renderer when the rule fails.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the renderer event that triggers the rule (e.g. `"blur"`).
    pub fn trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = Some(trigger.into());
        self
    }

    /// Sets the exact length bound. No effect on non-length rules.
    pub fn len(mut self, n: u64) -> Self {
        if let RuleKind::Length { len, .. } = &mut self.kind {
            *len = Some(n);
        }
        self
    }

    /// Sets the minimum length of a length rule. No effect on other rules.
    pub fn min_len(mut self, n: u64) -> Self {
        if let RuleKind::Length { min, .. } = &mut self.kind {
            *min = Some(n);
        }
        self
    }

    /// Sets the maximum length of a length rule. No effect on other rules.
    pub fn max_len(mut self, n: u64) -> Self {
        if let RuleKind::Length { max, .. } = &mut self.kind {
            *max = Some(n);
        }
        self
    }

    /// Sets the lower bound of a length or range rule.
    ///
    /// On a length rule negative values clamp to 0 and fractions round
    /// down. Use
    /// [`min_len`](Self::min_len) to pass a `u64` directly.
    pub fn min(mut self, n: impl Into<f64>) -> Self {
        let n = n.into();
        match &mut self.kind {
            RuleKind::Length { min, .. } => *min = Some(length_bound(n)),
            RuleKind::Range { min, .. } => *min = Some(n),
            _ => {}
        }
        self
    }

    /// Sets the upper bound of a length or range rule, converting length
    /// bounds like [`min`](Self::min).
    pub fn max(mut self, n: impl Into<f64>) -> Self {
        let n = n.into();
        match &mut self.kind {
            RuleKind::Length { max, .. } => *max = Some(length_bound(n)),
            RuleKind::Range { max, .. } => *max = Some(n),
            _ => {}
        }
        self
    }

    fn fail(&self, fallback: impl fmt::Display) -> Result<(), String> {
        Err(self
            .message
            .clone()
            .unwrap_or_else(|| fallback.to_string()))
    }
}

impl ValidateRule for Rule {
    fn to_map(&self) -> Map {
        let mut map = Map::new();
        match &self.kind {
            RuleKind::Required => {
                map.insert("required".into(), Value::Bool(true));
            }
            RuleKind::Pattern(pattern) => {
                map.insert("pattern".into(), Value::String(pattern.clone()));
            }
            RuleKind::Length { len, min, max } => {
                map.insert("type".into(), json!("string"));
                if let Some(len) = len {
                    map.insert("len".into(), json!(len));
                }
                if let Some(min) = min {
                    map.insert("min".into(), json!(min));
                }
                if let Some(max) = max {
                    map.insert("max".into(), json!(max));
                }
            }
            RuleKind::Range { min, max } => {
                map.insert("type".into(), json!("number"));
                if let Some(min) = min {
                    map.insert("min".into(), number(*min));
                }
                if let Some(max) = max {
                    map.insert("max".into(), number(*max));
                }
            }
            RuleKind::Email => {
                map.insert("type".into(), json!("email"));
            }
            RuleKind::Url => {
                map.insert("type".into(), json!("url"));
            }
            RuleKind::Date => {
                map.insert("type".into(), json!("date"));
            }
            RuleKind::Enum(values) => {
                map.insert("type".into(), json!("enum"));
                map.insert("enum".into(), Value::Array(values.clone()));
            }
            RuleKind::Whitespace => {
                map.insert("whitespace".into(), Value::Bool(true));
            }
            RuleKind::Custom(record) => {
                map.extend(record.clone());
            }
        }
        if let Some(message) = &self.message {
            map.insert("message".into(), Value::String(message.clone()));
        }
        if let Some(trigger) = &self.trigger {
            map.insert("trigger".into(), Value::String(trigger.clone()));
        }
        map
    }

    fn check(&self, value: Option<&Value>) -> Result<(), String> {
        let value = match value {
            Some(v) if !is_empty(v) => v,
            _ if self.kind == RuleKind::Required => return self.fail("value is required"),
            _ => return Ok(()),
        };

        match &self.kind {
            RuleKind::Required | RuleKind::Custom(_) => Ok(()),
            RuleKind::Pattern(pattern) => {
                let re = Regex::new(pattern).map_err(|err| format!("invalid pattern: {err}"))?;
                match value.as_str() {
                    Some(s) if re.is_match(s) => Ok(()),
                    _ => self.fail(format_args!("value does not match {pattern}")),
                }
            }
            RuleKind::Length { len, min, max } => {
                let actual = match value {
                    Value::String(s) => s.chars().count() as u64,
                    Value::Array(items) => items.len() as u64,
                    _ => return self.fail("value has no length"),
                };
                if len.is_some_and(|n| actual != n)
                    || min.is_some_and(|n| actual < n)
                    || max.is_some_and(|n| actual > n)
                {
                    return self.fail(format_args!("length {actual} is out of bounds"));
                }
                Ok(())
            }
            RuleKind::Range { min, max } => {
                let Some(actual) = value.as_f64() else {
                    return self.fail("value is not a number");
                };
                if min.is_some_and(|n| actual < n) || max.is_some_and(|n| actual > n) {
                    return self.fail(format_args!("{actual} is out of range"));
                }
                Ok(())
            }
            RuleKind::Email => match value.as_str() {
                Some(s) if looks_like_email(s) => Ok(()),
                _ => self.fail("value is not an email address"),
            },
            RuleKind::Url => match value.as_str() {
                Some(s) if looks_like_url(s) => Ok(()),
                _ => self.fail("value is not a URL"),
            },
            RuleKind::Date => match value.as_str() {
                Some(s) if parses_as_date(s) => Ok(()),
                _ => self.fail("value is not a date"),
            },
            RuleKind::Enum(values) => {
                if values.contains(value) {
                    Ok(())
                } else {
                    self.fail("value is not an allowed choice")
                }
            }
            RuleKind::Whitespace => match value.as_str() {
                Some(s) if s.trim().is_empty() => self.fail("value is blank"),
                _ => Ok(()),
            },
        }
    }
}

/// A rule record loaded from a definition file, emitted verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRule(pub Map);

impl ValidateRule for RawRule {
    fn to_map(&self) -> Map {
        self.0.clone()
    }

    fn check(&self, value: Option<&Value>) -> Result<(), String> {
        let required = self.0.get("required").and_then(Value::as_bool) == Some(true);
        if required && value.is_none_or(is_empty) {
            let message = self.0.get("message").and_then(Value::as_str);
            return Err(message.unwrap_or("value is required").to_string());
        }
        Ok(())
    }
}

/// Converts a float bound to a length: negatives and NaN become 0, fractions
/// round down, and values past `u64::MAX` saturate.
fn length_bound(n: f64) -> u64 {
    if n.is_nan() || n <= 0.0 {
        0
    } else {
        n.floor() as u64
    }
}

/// Integral bounds are emitted as integers so `min: 1` does not become `1.0`.
fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !s.contains(char::is_whitespace)
        }
        None => false,
    }
}

fn looks_like_url(s: &str) -> bool {
    match s.split_once("://") {
        Some((scheme, rest)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
                && !rest.is_empty()
                && !s.contains(char::is_whitespace)
        }
        None => false,
    }
}

fn parses_as_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() || DateTime::parse_from_rfc3339(s).is_ok()
}
