//! Scenario validation with structured errors and suggestions.
//!
//! [`LocalValidator`] produces a shape-mirroring evaluation tree for a
//! formula. [`validate_scenario`] adds document-level checks on top and
//! flattens everything into a [`ValidationResult`] keyed by node path.

mod formula_checks;

pub mod fuzzy;

use scenario_core::{CustomList, DataModel, NodeEvaluation};
use serde::{Deserialize, Serialize};

use crate::schema::{DocumentKind, ScenarioDocument, API_VERSION};

pub use formula_checks::LocalValidator;

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Document location (`metadata.id`) or `formula.<node path>`.
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        });
    }

    pub(crate) fn error_with_suggestion(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: Some(suggestion.into()),
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }
}

// ── Public API ──────────────────────────────────────────────────────

/// Validate a scenario document and its formula against `data_model`.
pub fn validate_scenario(
    doc: &ScenarioDocument,
    data_model: &DataModel,
    custom_lists: &[CustomList],
) -> ValidationResult {
    let mut result = ValidationResult::new();

    if doc.api_version != API_VERSION {
        result.error(
            "apiVersion",
            format!("apiVersion must be '{}', got '{}'", API_VERSION, doc.api_version),
        );
    }
    if doc.kind != DocumentKind::Scenario.to_string() {
        result.error("kind", format!("kind must be 'Scenario', got '{}'", doc.kind));
    }
    if !fuzzy::is_kebab_case(&doc.metadata.id) {
        result.error(
            "metadata.id",
            format!(
                "id must be kebab-case (lowercase alphanumeric + hyphens), got '{}'",
                doc.metadata.id
            ),
        );
    }
    if !doc.metadata.enabled {
        result.warn("metadata.enabled", "scenario is disabled");
    }

    let trigger = &doc.spec.trigger_table;
    if data_model.find_table(trigger).is_none() {
        let tables = data_model.list_tables().iter().map(|t| t.name.as_str());
        let message = format!("unknown trigger table '{trigger}'");
        match fuzzy::fuzzy_match(trigger, tables) {
            Some(s) => result.error_with_suggestion("spec.trigger_table", message, s),
            None => result.error("spec.trigger_table", message),
        }
        return result;
    }

    let validator = LocalValidator::new(data_model.clone(), trigger.clone(), custom_lists.to_vec());
    let evaluation = validator.evaluate(&doc.spec.formula);
    collect_errors(&evaluation, String::new(), &mut result);
    result
}

/// Flatten an evaluation tree into `formula.<path>` errors.
///
/// Paths use the same dotted form as `ViewTree::find_by_path`.
pub fn collect_errors(evaluation: &NodeEvaluation, path: String, result: &mut ValidationResult) {
    let location = if path.is_empty() {
        "formula".to_string()
    } else {
        format!("formula.{path}")
    };
    for error in &evaluation.errors {
        result.error(location.clone(), format!("[{}] {}", error.code, error.message));
    }

    let child_path = |segment: &str| {
        if path.is_empty() {
            segment.to_string()
        } else {
            format!("{path}.{segment}")
        }
    };
    for (index, child) in evaluation.children.iter().enumerate() {
        collect_errors(child, child_path(&index.to_string()), result);
    }
    for (key, child) in &evaluation.named_children {
        collect_errors(child, child_path(key), result);
    }
}

#[cfg(test)]
mod tests;
