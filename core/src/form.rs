//! The form aggregate: root components, configuration, pending data and the
//! serialized-output cache.
//!
//! A [`Form`] owns the component tree and keeps one invariant: every
//! non-empty field name is unique across the whole tree, including fields
//! nested in `control` branches and `children`. Mutations that would break it
//! are rolled back and reported as [`FormError::DuplicateField`].
//!
//! All state sits behind one [`RwLock`]. Readers (`form_rule`,
//! `parse_form_rule`, `parse_form_config`) share it; every mutation goes
//! through a single hook that takes the write lock and drops the cached
//! bytes before releasing it. Cached bytes are only written while a read
//! lock is held, so a cache slot can never hold output computed from state
//! that a writer has since replaced.
//!
//! # Examples
//!
//! ```
//! use form_schema_core::*;
//! use serde_json::json;
//!
//! let form = Form::new(
//!     vec![
//!         Box::new(Input::new("name", "Name").required()),
//!         Box::new(Select::new("role", "Role").append_option(FormOption::new("admin", "Admin"))),
//!     ],
//!     FormConfig::default(),
//! )
//! .unwrap();
//!
//! form.set_value("name", "Ada");
//! assert_eq!(form.form_rule()[0]["value"], json!("Ada"));
//!
//! // Field names must stay unique.
//! let err = form.append(Input::new("name", "Again")).unwrap_err();
//! assert!(matches!(err, FormError::DuplicateField(f) if f == "name"));
//! assert_eq!(form.fields(), vec!["name", "role"]);
//! ```

use std::collections::HashSet;
use std::convert::Infallible;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use tracing::{debug, warn};

use crate::Map;
use crate::adapter::{Bootstrap, Passthrough, UiAdapter, adapt};
use crate::component::Component;
use crate::config::FormConfig;
use crate::error::{FormError, Result};

/// Default HTTP method submitted with the form config.
pub const DEFAULT_METHOD: &str = "post";

/// A rule check that failed during [`Form::verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Serialized JSON for one output, shared with callers without copying.
type CacheSlot = Mutex<Option<Arc<[u8]>>>;

#[derive(Debug, Default)]
struct RenderCache {
    rule: CacheSlot,
    config: CacheSlot,
}

impl RenderCache {
    fn invalidate(&mut self) {
        for slot in [&mut self.rule, &mut self.config] {
            *slot.get_mut().unwrap_or_else(PoisonError::into_inner) = None;
        }
    }
}

#[derive(Debug)]
struct FormState {
    rules: Vec<Box<dyn Component>>,
    config: FormConfig,
    action: String,
    method: String,
    data: Map,
    scripts: Vec<String>,
    cache: RenderCache,
}

/// A validated component tree plus everything needed to serialize it.
pub struct Form {
    state: RwLock<FormState>,
    adapter: Box<dyn UiAdapter>,
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Form {
    /// Creates a form over `rules`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::DuplicateField`] if two components anywhere in
    /// the tree share a field name.
    pub fn new(rules: Vec<Box<dyn Component>>, config: FormConfig) -> Result<Self> {
        check_field_unique(&rules)?;
        Ok(Self {
            state: RwLock::new(FormState {
                rules,
                config,
                action: String::new(),
                method: DEFAULT_METHOD.to_string(),
                data: Map::new(),
                scripts: Vec::new(),
                cache: RenderCache::default(),
            }),
            adapter: Box::new(Passthrough),
        })
    }

    /// Installs the renderer adapter applied to every built rule.
    pub fn with_adapter(mut self, adapter: impl UiAdapter + 'static) -> Self {
        self.adapter = Box::new(adapter);
        self.state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .cache
            .invalidate();
        self
    }

    /// Appends the resources of `bootstrap` to the dependency list.
    pub fn with_bootstrap(self, bootstrap: &dyn Bootstrap) -> Self {
        for url in bootstrap.scripts().into_iter().chain(bootstrap.styles()) {
            self.append_script(url);
        }
        self
    }

    /// Replaces every root component.
    ///
    /// On a duplicate field the previous list is restored.
    pub fn set_rule(&self, rules: Vec<Box<dyn Component>>) -> Result<()> {
        self.mutate(|state| {
            let previous = std::mem::replace(&mut state.rules, rules);
            if let Err(err) = check_field_unique(&state.rules) {
                state.rules = previous;
                warn!(%err, "rejected rule replacement");
                return Err(err);
            }
            debug!(roots = state.rules.len(), "replaced form rules");
            Ok(())
        })
    }

    /// Adds a root component at the end.
    pub fn append(&self, component: impl Component + 'static) -> Result<()> {
        self.mutate(|state| {
            state.rules.push(Box::new(component));
            if let Err(err) = check_field_unique(&state.rules) {
                state.rules.pop();
                warn!(%err, "rejected appended component");
                return Err(err);
            }
            Ok(())
        })
    }

    /// Adds a root component at the front.
    pub fn prepend(&self, component: impl Component + 'static) -> Result<()> {
        self.mutate(|state| {
            state.rules.insert(0, Box::new(component));
            if let Err(err) = check_field_unique(&state.rules) {
                state.rules.remove(0);
                warn!(%err, "rejected prepended component");
                return Err(err);
            }
            Ok(())
        })
    }

    /// Replaces the pending field data.
    pub fn form_data(&self, data: Map) {
        self.update(|state| state.data = data);
    }

    /// Sets one pending field value, keeping the others.
    pub fn set_value(&self, field: impl Into<String>, value: impl Into<Value>) {
        self.update(|state| {
            state.data.insert(field.into(), value.into());
        });
    }

    pub fn set_action(&self, action: impl Into<String>) {
        self.update(|state| state.action = action.into());
    }

    pub fn set_method(&self, method: impl Into<String>) {
        self.update(|state| state.method = method.into());
    }

    pub fn set_config(&self, config: FormConfig) {
        self.update(|state| state.config = config);
    }

    /// Adds a renderer resource URL ahead of rendering.
    pub fn append_script(&self, url: impl Into<String>) {
        self.update(|state| state.scripts.push(url.into()));
    }

    /// Renderer resource URLs in injection order.
    pub fn scripts(&self) -> Vec<String> {
        self.read().scripts.clone()
    }

    /// Every non-empty field in the tree, depth first.
    pub fn fields(&self) -> Vec<String> {
        let state = self.read();
        let mut fields = Vec::new();
        for component in &state.rules {
            collect_fields(component.as_ref(), &mut fields);
        }
        fields.into_iter().map(String::from).collect()
    }

    /// Builds every root component, applies pending data by field name at
    /// any depth, and runs the adapter.
    pub fn form_rule(&self) -> Vec<Map> {
        let state = self.read();
        self.render_rules(&state)
    }

    /// Returns the configuration map with the `form: {action, method}` entry.
    pub fn form_config(&self) -> Map {
        render_config(&self.read())
    }

    /// JSON for [`form_rule`](Self::form_rule), cached until the next
    /// mutation.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::SerializationFailure`] if encoding fails.
    pub fn parse_form_rule(&self) -> Result<Arc<[u8]>> {
        let state = self.read();
        cached(&state.cache.rule, || {
            debug!("encoding form rules");
            Ok(serde_json::to_vec(&self.render_rules(&state))?)
        })
    }

    /// JSON for [`form_config`](Self::form_config), cached until the next
    /// mutation.
    pub fn parse_form_config(&self) -> Result<Arc<[u8]>> {
        let state = self.read();
        cached(&state.cache.config, || {
            debug!("encoding form config");
            Ok(serde_json::to_vec(&render_config(&state))?)
        })
    }

    /// Runs every rule's check against the pending data, falling back to a
    /// component's own value when no data was supplied for its field.
    pub fn verify(&self) -> Vec<FieldViolation> {
        let state = self.read();
        let mut violations = Vec::new();
        for component in &state.rules {
            verify_component(component.as_ref(), &state.data, &mut violations);
        }
        violations
    }

    fn render_rules(&self, state: &FormState) -> Vec<Map> {
        state
            .rules
            .iter()
            .map(|component| {
                let mut rule = component.build();
                apply_data(&mut rule, &state.data);
                adapt(self.adapter.as_ref(), rule)
            })
            .collect()
    }

    /// The one place state changes: runs `f` under the write lock and drops
    /// cached output unless `f` failed (failed mutations restore the state).
    fn mutate<R, E>(
        &self,
        f: impl FnOnce(&mut FormState) -> std::result::Result<R, E>,
    ) -> std::result::Result<R, E> {
        let mut state = self.write();
        let out = f(&mut *state)?;
        state.cache.invalidate();
        Ok(out)
    }

    fn update(&self, f: impl FnOnce(&mut FormState)) {
        let Ok(()) = self.mutate(|state| {
            f(state);
            Ok::<_, Infallible>(())
        });
    }

    fn read(&self) -> RwLockReadGuard<'_, FormState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, FormState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn lock(slot: &CacheSlot) -> MutexGuard<'_, Option<Arc<[u8]>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Returns the cached bytes or computes and stores them. Two readers missing
/// at once both compute; the first stored result wins.
fn cached(slot: &CacheSlot, compute: impl FnOnce() -> Result<Vec<u8>>) -> Result<Arc<[u8]>> {
    if let Some(bytes) = lock(slot).as_ref() {
        return Ok(Arc::clone(bytes));
    }
    let bytes: Arc<[u8]> = compute()?.into();
    Ok(Arc::clone(lock(slot).get_or_insert(bytes)))
}

fn render_config(state: &FormState) -> Map {
    let mut map = state.config.to_map();
    let mut form = Map::new();
    form.insert("action".into(), Value::String(state.action.clone()));
    form.insert("method".into(), Value::String(state.method.clone()));
    map.insert("form".into(), Value::Object(form));
    map
}

/// Checks that no non-empty field repeats anywhere in `rules`.
///
/// # Errors
///
/// Returns [`FormError::DuplicateField`] naming the first repeat.
pub fn check_field_unique(rules: &[Box<dyn Component>]) -> Result<()> {
    let mut fields = Vec::new();
    for component in rules {
        collect_fields(component.as_ref(), &mut fields);
    }
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field) {
            return Err(FormError::DuplicateField(field.to_string()));
        }
    }
    Ok(())
}

fn collect_fields<'a>(component: &'a dyn Component, out: &mut Vec<&'a str>) {
    let field = component.field();
    if !field.is_empty() {
        out.push(field);
    }
    if let Some(data) = component.snapshot() {
        for nested in data.nested() {
            collect_fields(nested, out);
        }
    }
}

/// Writes `data[field]` into every rule map whose `field` is a key of `data`.
fn apply_data(rule: &mut Map, data: &Map) {
    if data.is_empty() {
        return;
    }

    let pending = match rule.get("field") {
        Some(Value::String(field)) if !field.is_empty() => data.get(field).cloned(),
        _ => None,
    };
    if let Some(value) = pending {
        rule.insert("value".into(), value);
    }

    if let Some(Value::Array(branches)) = rule.get_mut("control") {
        for branch in branches.iter_mut() {
            if let Some(Value::Array(nested)) = branch.get_mut("rule") {
                apply_data_all(nested, data);
            }
        }
    }
    if let Some(Value::Array(children)) = rule.get_mut("children") {
        apply_data_all(children, data);
    }
}

fn apply_data_all(rules: &mut [Value], data: &Map) {
    for item in rules {
        if let Value::Object(map) = item {
            apply_data(map, data);
        }
    }
}

fn verify_component(component: &dyn Component, data: &Map, out: &mut Vec<FieldViolation>) {
    let Some(snapshot) = component.snapshot() else {
        return;
    };
    if !snapshot.field.is_empty() {
        let value = data.get(&snapshot.field).or(snapshot.value.as_ref());
        for rule in &snapshot.validate {
            if let Err(message) = rule.check(value) {
                out.push(FieldViolation {
                    field: snapshot.field.clone(),
                    message,
                });
            }
        }
    }
    for nested in snapshot.nested() {
        verify_component(nested, data, out);
    }
}
