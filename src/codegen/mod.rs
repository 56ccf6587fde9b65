//! Code Generation
//!
//! Turns one resolved schema node into a self-contained runtime-validation
//! module: a Zod schema constant plus a paired type declaration, annotated
//! with the node's documentation. Generation is independent of the differ;
//! both consume the same resolved tree.
//!
//! Every module exports exactly two top-level bindings:
//! `<Identifier>Schema` and `<Identifier>`, where `Identifier` is the
//! PascalCase join of the property path's segments.

pub mod names;
pub mod zod;

use serde::{Deserialize, Serialize};

use crate::schema::SchemaNode;
use names::{file_name_for_path, identifier_for_path};
use zod::{reference_file_stem, Emitter};

/// One generated validation module, prior to blueprint validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedModule {
    /// Dot-joined property path this module validates
    pub property_path: String,
    /// PascalCase identifier, one token per path segment
    pub sanitized_identifier: String,
    /// Kebab-case file name including extension
    pub file_name: String,
    /// Full module source
    pub source_text: String,
    /// Exported binding names; exactly the schema constant and the type
    pub exports: Vec<String>,
    /// Import lines the module depends on
    pub imports: Vec<String>,
}

/// Generate the validation module for a property path.
///
/// `definitions` supplies named nodes for inlining any `$ref` that survived
/// resolution; refs not found there are emitted as named schema-constant
/// references and imported from their own generated module.
pub fn generate_module(
    path: &str,
    node: &SchemaNode,
    definitions: &[(String, SchemaNode)],
) -> GeneratedModule {
    let identifier = identifier_for_path(path);
    let schema_constant = format!("{identifier}Schema");

    let mut emitter = Emitter::new(definitions);
    let expr = emitter.expr(node);

    let mut imports = vec!["import { z } from 'zod';".to_string()];
    for constant in emitter.named_refs() {
        if constant != schema_constant {
            imports.push(format!(
                "import {{ {constant} }} from './{}';",
                reference_file_stem(constant)
            ));
        }
    }

    let mut source = String::new();
    if let Some(doc) = doc_comment(node) {
        source.push_str(&doc);
    }
    for import in &imports {
        source.push_str(import);
        source.push('\n');
    }
    source.push('\n');
    source.push_str(&format!("export const {schema_constant} = {expr};\n\n"));
    source.push_str(&format!(
        "export type {identifier} = z.infer<typeof {schema_constant}>;\n"
    ));

    GeneratedModule {
        property_path: path.to_string(),
        sanitized_identifier: identifier.clone(),
        file_name: file_name_for_path(path),
        source_text: source,
        exports: vec![schema_constant, identifier],
        imports,
    }
}

/// Leading documentation comment from title, description, the first
/// example, and any authored business rules
fn doc_comment(node: &SchemaNode) -> Option<String> {
    let mut lines = Vec::new();
    if let Some(title) = &node.title {
        lines.push(title.clone());
    }
    if let Some(description) = &node.description {
        lines.push(description.clone());
    }
    if let Some(example) = node.examples.first() {
        lines.push(format!(
            "@example {}",
            serde_json::to_string(example).unwrap_or_default()
        ));
    }
    for rule in &node.business_rules {
        lines.push(format!("Rule: {rule}"));
    }
    if lines.is_empty() {
        return None;
    }

    let mut out = String::from("/**\n");
    for line in lines {
        out.push_str(&format!(" * {}\n", line.replace("*/", "*\\/")));
    }
    out.push_str(" */\n");
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_module_exports_schema_and_type() {
        let node = SchemaNode::from_value(&json!({ "type": "string", "minLength": 1 }));
        let module = generate_module("name", &node, &[]);

        assert_eq!(module.sanitized_identifier, "Name");
        assert_eq!(module.file_name, "name.ts");
        assert_eq!(module.exports, vec!["NameSchema".to_string(), "Name".to_string()]);
        assert!(module.source_text.contains("export const NameSchema = z.string().min(1, 'This field is required');"));
        assert!(module
            .source_text
            .contains("export type Name = z.infer<typeof NameSchema>;"));
    }

    #[test]
    fn test_doc_comment_from_annotations() {
        let node = SchemaNode::from_value(&json!({
            "type": "string",
            "title": "Table name",
            "description": "Shown in the sidebar",
            "examples": ["Customers"],
            "x-business-rules": ["Names are unique per base"]
        }));
        let module = generate_module("tables.name", &node, &[]);

        assert!(module.source_text.starts_with("/**\n * Table name\n"));
        assert!(module.source_text.contains(" * Shown in the sidebar\n"));
        assert!(module.source_text.contains(" * @example \"Customers\"\n"));
        assert!(module.source_text.contains(" * Rule: Names are unique per base\n"));
    }

    #[test]
    fn test_named_reference_becomes_import() {
        let node = SchemaNode::from_value(&json!({
            "type": "object",
            "properties": { "page": { "$ref": "page.schema.json" } }
        }));
        let module = generate_module("pages", &node, &[]);

        assert!(module
            .imports
            .iter()
            .any(|i| i == "import { PageSchema } from './page';"));
        assert!(module.source_text.contains("page: PageSchema.optional()"));
    }

    #[test]
    fn test_discriminant_path_identifier() {
        let node = SchemaNode::from_value(&json!({ "type": "object", "properties": {} }));
        let module = generate_module("automation_trigger.http.post", &node, &[]);
        assert_eq!(module.sanitized_identifier, "AutomationTriggerHttpPost");
        assert_eq!(module.file_name, "automation-trigger-http-post.ts");
    }
}
