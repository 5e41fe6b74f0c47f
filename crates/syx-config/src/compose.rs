//! Configuration composition and sweep expansion.
//!
//! A `Composer` takes the resolved base configuration plus a declaration-
//! ordered list of overrides (`group.path.key=value`, or `=v1,v2,...` for a
//! sweep dimension) and expands the cartesian product into `RunConfig`s.
//!
//! Expansion order is deterministic: earlier-declared keys vary slower
//! (outer loop), later-declared vary faster (inner loop), so sweep artifacts
//! are deterministically indexable across re-runs.

use serde_json::Value;

use crate::{ConfigError, SynthexConfig};

/// One concrete configuration for one sweep point. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub config: SynthexConfig,
    /// `Some("point-NNN")` in multirun mode, `None` for a single run.
    pub sweep_point_id: Option<String>,
    /// The override assignments that produced this point, in declaration
    /// order, rendered as `key=value`.
    pub overrides: Vec<String>,
}

/// Builder resolving base configuration plus overrides into run
/// configurations.
#[derive(Debug, Clone)]
pub struct Composer {
    base: SynthexConfig,
    dims: Vec<(String, Vec<Value>)>,
    force_multirun: bool,
}

impl Composer {
    #[must_use]
    pub fn new(base: SynthexConfig) -> Self {
        Self {
            base,
            dims: Vec::new(),
            force_multirun: false,
        }
    }

    /// Force the multirun result layout even for a single sweep point.
    #[must_use]
    pub const fn force_multirun(mut self, force: bool) -> Self {
        self.force_multirun = force;
        self
    }

    /// Register an override from its CLI form `group.path.key=v1[,v2,...]`.
    ///
    /// A single value narrows that key; multiple comma-separated values
    /// declare a sweep dimension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MalformedOverride`] if the assignment has no
    /// `=` or an empty key, and [`ConfigError::DuplicateOverride`] if the
    /// key was already declared. One key is one dimension; re-declaring it
    /// would silently inflate the sweep with redundant points.
    pub fn parse_assignment(&mut self, assignment: &str) -> Result<(), ConfigError> {
        let malformed = || ConfigError::MalformedOverride {
            assignment: assignment.to_string(),
        };
        let (key, raw) = assignment.split_once('=').ok_or_else(malformed)?;
        let key = key.trim();
        if key.is_empty() {
            return Err(malformed());
        }
        if self.declares(key) {
            return Err(ConfigError::DuplicateOverride {
                key: key.to_string(),
            });
        }
        let values = raw.split(',').map(|v| coerce_value(v.trim())).collect();
        self.dims.push((key.to_string(), values));
        Ok(())
    }

    /// Register an override with pre-parsed candidate values, replacing any
    /// earlier declaration of the same key.
    #[must_use]
    pub fn with_override(mut self, key: impl Into<String>, values: Vec<Value>) -> Self {
        let key = key.into();
        if let Some(dim) = self.dims.iter_mut().find(|(k, _)| *k == key) {
            dim.1 = values;
        } else {
            self.dims.push((key, values));
        }
        self
    }

    /// Whether an override for `key` has been declared.
    #[must_use]
    pub fn declares(&self, key: &str) -> bool {
        self.dims.iter().any(|(k, _)| k == key)
    }

    /// Validate every override key against the configuration tree and return
    /// the lazy sequence of run configurations.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownOverride`] if a key does not address an
    /// existing configuration field. Serialization of the base configuration
    /// is infallible for these types; a failure surfaces as
    /// [`ConfigError::InvalidValue`].
    pub fn compose(self) -> Result<SweepPoints, ConfigError> {
        let tree =
            serde_json::to_value(&self.base).map_err(|e| ConfigError::InvalidValue {
                field: "<root>".to_string(),
                reason: e.to_string(),
            })?;

        for (key, _) in &self.dims {
            if !key_exists(&tree, key) {
                return Err(ConfigError::UnknownOverride { key: key.clone() });
            }
        }

        let total = self.dims.iter().map(|(_, v)| v.len().max(1)).product();
        let multirun = self.force_multirun || self.dims.iter().any(|(_, v)| v.len() > 1);

        Ok(SweepPoints {
            tree,
            dims: self.dims,
            index: 0,
            total,
            multirun,
        })
    }
}

/// Lazy iterator over the cartesian product of all sweep dimensions.
///
/// The degenerate case (no multi-valued overrides) yields exactly one
/// configuration, identical to the base with single-value overrides applied.
#[derive(Debug)]
pub struct SweepPoints {
    tree: Value,
    dims: Vec<(String, Vec<Value>)>,
    index: usize,
    total: usize,
    multirun: bool,
}

impl SweepPoints {
    /// Total number of sweep points.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Whether the multirun (per-point subdirectory) layout applies.
    #[must_use]
    pub const fn is_multirun(&self) -> bool {
        self.multirun
    }

    fn point(&self, index: usize) -> Result<RunConfig, ConfigError> {
        let mut tree = self.tree.clone();
        let mut overrides = Vec::with_capacity(self.dims.len());

        // Mixed-radix decomposition: the last dimension has stride 1.
        let mut stride = self.total;
        for (key, candidates) in &self.dims {
            let size = candidates.len().max(1);
            stride /= size;
            if candidates.is_empty() {
                continue;
            }
            let value = &candidates[(index / stride) % size];
            set_key(&mut tree, key, value.clone());
            overrides.push(format!("{key}={}", render_value(value)));
        }

        let config: SynthexConfig =
            serde_json::from_value(tree).map_err(|e| ConfigError::InvalidValue {
                field: overrides.join(","),
                reason: e.to_string(),
            })?;

        Ok(RunConfig {
            config,
            sweep_point_id: self.multirun.then(|| syx_core::ids::sweep_point_id(index)),
            overrides,
        })
    }
}

impl Iterator for SweepPoints {
    type Item = Result<RunConfig, ConfigError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.total {
            return None;
        }
        let item = self.point(self.index);
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SweepPoints {}

/// Coerce a CLI override token into a JSON value: bool, then number, then
/// string. `null` clears an optional field.
fn coerce_value(token: &str) -> Value {
    match token {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => {
            if let Ok(n) = token.parse::<i64>() {
                Value::Number(n.into())
            } else if let Some(n) = token.parse::<f64>().ok().and_then(serde_json::Number::from_f64)
            {
                Value::Number(n)
            } else {
                Value::String(token.to_string())
            }
        }
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Whether `key` (dotted path) addresses an existing field of the tree.
fn key_exists(tree: &Value, key: &str) -> bool {
    let mut node = tree;
    for segment in key.split('.') {
        match node.get(segment) {
            Some(child) => node = child,
            None => return false,
        }
    }
    true
}

/// Set `key` (dotted path, pre-validated) in the tree.
fn set_key(tree: &mut Value, key: &str, value: Value) {
    let mut node = tree;
    let mut segments = key.split('.').peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            if let Some(object) = node.as_object_mut() {
                object.insert(segment.to_string(), value);
            }
            return;
        }
        match node.get_mut(segment) {
            Some(child) => node = child,
            None => return,
        }
    }
}
