//! Collaborators that sit at the edges of a [`Form`](crate::Form).
//!
//! A [`UiAdapter`] rewrites each built rule for one target renderer (renaming
//! props, translating type tags). A [`Bootstrap`] supplies the script and
//! style URLs the renderer needs before it can mount.

use serde_json::Value;

use crate::Map;

/// Translates a generic rule into a renderer-specific one.
///
/// Any `Fn(Map) -> Map + Send + Sync` closure is an adapter.
///
/// # Examples
///
/// ```
/// use form_schema_core::{Form, FormConfig, Input, Map};
/// use serde_json::json;
///
/// let form = Form::new(vec![Box::new(Input::new("name", "Name"))], FormConfig::default())
///     .unwrap()
///     .with_adapter(|mut rule: Map| {
///         if let Some(title) = rule.remove("title") {
///             rule.insert("label".into(), title);
///         }
///         rule
///     });
/// assert_eq!(form.form_rule()[0]["label"], json!("Name"));
/// ```
pub trait UiAdapter: Send + Sync {
    fn parse_component(&self, rule: Map) -> Map;

    /// Whether rules nested in `control[].rule` are translated too.
    fn nested(&self) -> bool {
        true
    }
}

impl<F> UiAdapter for F
where
    F: Fn(Map) -> Map + Send + Sync,
{
    fn parse_component(&self, rule: Map) -> Map {
        self(rule)
    }
}

/// Adapter that returns rules unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl UiAdapter for Passthrough {
    fn parse_component(&self, rule: Map) -> Map {
        rule
    }

    fn nested(&self) -> bool {
        false
    }
}

/// Supplies renderer resources injected ahead of rendering.
pub trait Bootstrap {
    fn scripts(&self) -> Vec<String>;

    fn styles(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Runs `adapter` over a top-level rule, then over every rule found in its
/// `control[].rule` lists when the adapter asks for nested translation.
pub(crate) fn adapt(adapter: &dyn UiAdapter, rule: Map) -> Map {
    let mut rule = adapter.parse_component(rule);
    if !adapter.nested() {
        return rule;
    }

    if let Some(Value::Array(branches)) = rule.get_mut("control") {
        for branch in branches.iter_mut() {
            let Some(Value::Array(nested)) = branch.get_mut("rule") else {
                continue;
            };
            for item in nested.iter_mut() {
                if let Value::Object(map) = item {
                    let taken = std::mem::take(map);
                    *map = adapt(adapter, taken);
                }
            }
        }
    }
    rule
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    fn rule(value: Value) -> Map {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    struct Renamer {
        calls: AtomicUsize,
        nested: bool,
    }

    impl UiAdapter for Renamer {
        fn parse_component(&self, mut rule: Map) -> Map {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(title) = rule.remove("title") {
                rule.insert("label".into(), title);
            }
            rule
        }

        fn nested(&self) -> bool {
            self.nested
        }
    }

    fn tree() -> Map {
        rule(json!({
            "type": "radio",
            "title": "Type",
            "control": [
                {"value": "1", "rule": [{"type": "inputNumber", "title": "Days"}]},
                {"value": "2", "rule": [{
                    "type": "inputNumber",
                    "title": "Salary",
                    "control": [{"value": 0, "rule": [{"type": "input", "title": "Why"}]}]
                }]}
            ]
        }))
    }

    #[test]
    fn test_nested_adapter_reaches_every_control_rule() {
        let adapter = Renamer {
            calls: AtomicUsize::new(0),
            nested: true,
        };
        let out = Value::Object(adapt(&adapter, tree()));
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 4);
        assert_eq!(out["label"], json!("Type"));
        assert_eq!(out["control"][1]["rule"][0]["label"], json!("Salary"));
        assert_eq!(
            out["control"][1]["rule"][0]["control"][0]["rule"][0]["label"],
            json!("Why")
        );
    }

    #[test]
    fn test_flat_adapter_touches_top_level_only() {
        let adapter = Renamer {
            calls: AtomicUsize::new(0),
            nested: false,
        };
        let out = Value::Object(adapt(&adapter, tree()));
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 1);
        assert_eq!(out["control"][0]["rule"][0]["title"], json!("Days"));
    }

    #[test]
    fn test_passthrough_is_identity() {
        assert_eq!(adapt(&Passthrough, tree()), tree());
    }
}
