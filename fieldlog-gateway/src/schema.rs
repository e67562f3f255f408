//! Module schemas — the per-entity-type field contracts the gateway
//! enforces before touching the store or the network.

use fieldlog_types::FieldMap;
use serde_json::Value;
use thiserror::Error;

/// Describes one module: its wire name and which fields a valid entry must
/// carry.
#[derive(Debug, Clone)]
pub struct ModuleSchema {
    module: String,
    required: Vec<String>,
}

impl ModuleSchema {
    /// A schema for an arbitrary module.
    pub fn generic(
        module: impl Into<String>,
        required: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            module: module.into(),
            required: required.into_iter().map(Into::into).collect(),
        }
    }

    /// The equipment registry module.
    #[must_use]
    pub fn machinery() -> Self {
        Self::generic(
            "machinery",
            ["name", "kind", "model", "serial", "year", "status", "location"],
        )
    }

    /// The maintenance log module.
    #[must_use]
    pub fn maintenance() -> Self {
        Self::generic(
            "maintenance",
            ["machine", "kind", "technician", "hour_meter", "description", "cost", "status"],
        )
    }

    /// The module name, as sent in the `modulo` wire parameter.
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// The required field names.
    #[must_use]
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Checks that every required field is present and non-empty.
    pub fn validate(&self, fields: &FieldMap) -> Result<(), ValidationError> {
        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|name| !field_present(fields, name))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                module: self.module.clone(),
                missing,
            })
        }
    }
}

fn field_present(fields: &FieldMap, name: &str) -> bool {
    match fields.get(name) {
        Some(Value::String(text)) => !text.trim().is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

/// Required fields missing or empty; the write was rejected before any
/// store or network interaction.
#[derive(Debug, Clone, Error)]
#[error("module {module}: required fields missing or empty: {}", missing.join(", "))]
pub struct ValidationError {
    pub module: String,
    pub missing: Vec<String>,
}
