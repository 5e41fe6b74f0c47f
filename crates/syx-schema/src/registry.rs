//! Central registry of extraction schemas.
//!
//! Built-in schemas come from the syx-core ontology types via
//! [`schemars::schema_for!`] at construction time; callers may register
//! additional schemas at run start. Validation goes through `jsonschema`.

use std::collections::HashMap;

use schemars::schema_for;

use crate::error::{SchemaError, Violation};

/// Store of all extraction schemas known to a run.
///
/// Read-only after run initialization, so it can be shared across concurrent
/// chains behind an `Arc` without locking.
pub struct SchemaRegistry {
    schemas: HashMap<String, serde_json::Value>,
}

/// Insert a built-in schema, converting the `schemars` output to a
/// `serde_json::Value`. Panics if `serde_json::to_value` fails (infallible
/// for valid `schemars` output).
macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert(
            $name.to_string(),
            serde_json::to_value(schema_for!($ty)).unwrap(),
        );
    };
}

impl SchemaRegistry {
    /// Build a registry containing every stage-output schema from the
    /// syx-core ontology, plus the standalone ontology members so custom
    /// stage configurations can validate against them directly.
    ///
    /// # Panics
    ///
    /// Panics if `serde_json::to_value` fails on a `schemars`-generated
    /// schema, which is not expected in practice.
    #[must_use]
    pub fn new() -> Self {
        let mut schemas = HashMap::new();

        // --- Stage output envelopes ---
        register!(
            schemas,
            "synthesis_paragraphs",
            syx_core::ontology::SynthesisParagraphs
        );
        register!(schemas, "material_list", syx_core::ontology::MaterialList);

        // --- Ontology root + judge output ---
        register!(
            schemas,
            "general_synthesis",
            syx_core::ontology::GeneralSynthesisOntology
        );
        register!(
            schemas,
            "synthesis_evaluation",
            syx_core::ontology::SynthesisEvaluation
        );

        // --- Standalone ontology members ---
        register!(schemas, "material", syx_core::ontology::Material);
        register!(
            schemas,
            "target_compound",
            syx_core::ontology::TargetCompound
        );

        Self { schemas }
    }

    /// Register a caller-supplied schema under `name`.
    ///
    /// Re-registering the identical schema is a no-op; the registered
    /// contract is immutable once referenced by a run.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Duplicate`] if `name` is already bound to a
    /// different schema.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        schema: serde_json::Value,
    ) -> Result<(), SchemaError> {
        let name = name.into();
        if let Some(existing) = self.schemas.get(&name) {
            if *existing == schema {
                return Ok(());
            }
            return Err(SchemaError::Duplicate(name));
        }
        self.schemas.insert(name, schema);
        Ok(())
    }

    /// Get a schema by name. Returns `None` if not found.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.schemas.get(name)
    }

    /// Get a schema by name.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotFound`] if the name is unknown.
    pub fn resolve(&self, name: &str) -> Result<&serde_json::Value, SchemaError> {
        self.get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))
    }

    /// Validate a JSON value against a named schema.
    ///
    /// Structural only: field presence, types, nesting, closed enums. Domain
    /// semantics (e.g. whether a formula is well-formed) are out of scope.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotFound`] if the schema name is unknown, or
    /// [`SchemaError::ValidationFailed`] carrying every field-level violation.
    pub fn validate(&self, name: &str, instance: &serde_json::Value) -> Result<(), SchemaError> {
        let schema = self.resolve(name)?;

        let validator = jsonschema::validator_for(schema)
            .map_err(|e| SchemaError::Generation(format!("{e}")))?;

        let violations: Vec<Violation> = validator
            .iter_errors(instance)
            .map(|e| Violation {
                path: e.instance_path.to_string(),
                message: format!("{e}"),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed { violations })
        }
    }

    /// List all registered schema names, sorted.
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
