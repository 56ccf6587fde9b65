//! Blueprint Validation
//!
//! Structurally re-checks a generated module against its source schema node
//! before the module is accepted as final output. Errors block downstream
//! consumption; warnings are advisory. The validator never mutates the
//! module and never fails itself — every problem becomes a structured
//! issue in the report.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::codegen::names::is_valid_identifier;
use crate::codegen::GeneratedModule;
use crate::schema::{SchemaKind, SchemaNode};

/// Severity of a blueprint issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One structured finding from blueprint validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

/// Result of validating one generated module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl BlueprintReport {
    pub fn is_clean(&self) -> bool {
        self.valid && self.warnings.is_empty()
    }
}

/// The blueprint validator
pub struct BlueprintValidator {
    /// Matches the opening of any validation clause
    clause_pattern: Regex,
}

impl Default for BlueprintValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl BlueprintValidator {
    pub fn new() -> Self {
        Self {
            clause_pattern: Regex::new(r"\.(min|max|gte|lte|gt|lt|regex)\(")
                .expect("clause pattern is valid"),
        }
    }

    /// Validate a generated module against its source node
    pub fn validate(&self, module: &GeneratedModule, source: &SchemaNode) -> BlueprintReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        self.check_identifier(module, &mut errors);
        self.check_exports(module, &mut errors);
        self.check_constraint_encoding(module, source, &mut errors, &mut warnings);
        self.check_annotations(module, source, &mut warnings);
        self.check_failure_messages(module, &mut warnings);

        BlueprintReport {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    fn check_identifier(&self, module: &GeneratedModule, errors: &mut Vec<ValidationIssue>) {
        if !is_valid_identifier(&module.sanitized_identifier) {
            errors.push(issue(
                Severity::Error,
                format!(
                    "Malformed identifier '{}'",
                    module.sanitized_identifier
                ),
                Some(module.property_path.clone()),
                Some("^[A-Z][A-Za-z0-9]*$".to_string()),
                Some(module.sanitized_identifier.clone()),
            ));
        }
    }

    fn check_exports(&self, module: &GeneratedModule, errors: &mut Vec<ValidationIssue>) {
        let schema_constant = format!("{}Schema", module.sanitized_identifier);
        let type_name = &module.sanitized_identifier;

        let const_binding = format!("export const {schema_constant} ");
        if !module.source_text.contains(&const_binding) {
            errors.push(issue(
                Severity::Error,
                format!("Schema constant '{schema_constant}' not exported in source text"),
                Some(module.file_name.clone()),
                Some(const_binding),
                None,
            ));
        }

        let type_binding = format!("export type {type_name} ");
        if !module.source_text.contains(&type_binding) {
            errors.push(issue(
                Severity::Error,
                format!("Type '{type_name}' not exported in source text"),
                Some(module.file_name.clone()),
                Some(type_binding),
                None,
            ));
        }

        for name in [schema_constant.as_str(), type_name.as_str()] {
            if !module.exports.iter().any(|e| e == name) {
                errors.push(issue(
                    Severity::Error,
                    format!("Export list is missing '{name}'"),
                    Some(module.file_name.clone()),
                    Some(name.to_string()),
                    Some(format!("{:?}", module.exports)),
                ));
            }
        }
    }

    /// String constraints missing from the output are errors; numeric and
    /// array bounds only warn
    fn check_constraint_encoding(
        &self,
        module: &GeneratedModule,
        source: &SchemaNode,
        errors: &mut Vec<ValidationIssue>,
        warnings: &mut Vec<ValidationIssue>,
    ) {
        let text = &module.source_text;
        match &source.kind {
            SchemaKind::String(c) => {
                let expectations = [
                    (c.min_length.is_some(), ".min(", "minLength"),
                    (c.max_length.is_some(), ".max(", "maxLength"),
                    (c.pattern.is_some(), ".regex(", "pattern"),
                ];
                for (declared, clause, field) in expectations {
                    if declared && !text.contains(clause) {
                        errors.push(issue(
                            Severity::Error,
                            format!("Source declares {field} but no {clause}...) clause was generated"),
                            Some(module.file_name.clone()),
                            Some(clause.to_string()),
                            None,
                        ));
                    }
                }
            }
            SchemaKind::Number(c) => {
                let expectations = [
                    (c.minimum.is_some(), ".gte(", "minimum"),
                    (c.maximum.is_some(), ".lte(", "maximum"),
                ];
                for (declared, clause, field) in expectations {
                    if declared && !text.contains(clause) {
                        warnings.push(issue(
                            Severity::Warning,
                            format!("Source declares {field} but no {clause}...) clause was generated"),
                            Some(module.file_name.clone()),
                            Some(clause.to_string()),
                            None,
                        ));
                    }
                }
            }
            SchemaKind::Array {
                min_items,
                max_items,
                ..
            } => {
                let expectations = [
                    (min_items.is_some(), ".min(", "minItems"),
                    (max_items.is_some(), ".max(", "maxItems"),
                ];
                for (declared, clause, field) in expectations {
                    if declared && !text.contains(clause) {
                        warnings.push(issue(
                            Severity::Warning,
                            format!("Source declares {field} but no {clause}...) clause was generated"),
                            Some(module.file_name.clone()),
                            Some(clause.to_string()),
                            None,
                        ));
                    }
                }
            }
            _ => {}
        }
    }

    fn check_annotations(
        &self,
        module: &GeneratedModule,
        source: &SchemaNode,
        warnings: &mut Vec<ValidationIssue>,
    ) {
        let has_annotations =
            source.title.is_some() || source.description.is_some() || !source.examples.is_empty();
        if has_annotations && !module.source_text.contains(".meta(") {
            warnings.push(issue(
                Severity::Warning,
                "Source carries title/description/examples but no .meta(...) annotation was generated"
                    .to_string(),
                Some(module.file_name.clone()),
                Some(".meta(".to_string()),
                None,
            ));
        }
    }

    /// Every validation clause should carry a custom failure message as its
    /// second argument
    fn check_failure_messages(&self, module: &GeneratedModule, warnings: &mut Vec<ValidationIssue>) {
        let text = &module.source_text;
        for found in self.clause_pattern.find_iter(text) {
            let clause = &text[found.start()..found.end() - 1];
            let args = clause_args(&text[found.end()..]);
            if !has_top_level_comma(args) {
                warnings.push(issue(
                    Severity::Warning,
                    format!("Validation clause {clause}({args}) has no custom failure message"),
                    Some(module.file_name.clone()),
                    None,
                    Some(format!("{clause}({args})")),
                ));
            }
        }
    }
}

/// Argument text of a clause, up to its balancing close paren. Depth-aware
/// so parenthesized regex patterns do not truncate the scan; a top-level
/// comma separates the value from its failure message.
fn clause_args(rest: &str) -> &str {
    let mut depth = 0usize;
    for (index, c) in rest.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    return &rest[..index];
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    rest
}

/// Whether the argument list has a comma outside nested parens, i.e. a
/// second (message) argument
fn has_top_level_comma(args: &str) -> bool {
    let mut depth = 0usize;
    for c in args.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return true,
            _ => {}
        }
    }
    false
}

fn issue(
    severity: Severity,
    message: String,
    location: Option<String>,
    expected: Option<String>,
    actual: Option<String>,
) -> ValidationIssue {
    ValidationIssue {
        severity,
        message,
        location,
        expected,
        actual,
    }
}
