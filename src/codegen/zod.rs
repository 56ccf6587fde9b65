//! Zod Expression Emitter
//!
//! Builds the composable validation expression for one schema node. Every
//! constraint clause carries a human-readable failure message, and nodes
//! with title/description/examples gain a trailing `.meta({...})` clause so
//! the runtime can surface authored documentation.
//!
//! The emitter only consumes the typed [`SchemaNode`] model — raw JSON
//! never reaches this module.

use serde_json::Value;
use std::collections::BTreeSet;

use crate::codegen::names::{to_pascal_case, to_kebab_case};
use crate::schema::{
    ArrayItems, NumberConstraints, SchemaKind, SchemaNode, StringConstraints, UnionFlavor,
};

/// Failure message for `minLength: 1`, the "this is mandatory" idiom
pub const REQUIRED_MESSAGE: &str = "This field is required";

/// Expression builder for one module's worth of schema nodes
pub struct Emitter<'a> {
    /// Named definitions for inlining unresolved references
    definitions: &'a [(String, SchemaNode)],
    /// Schema constants referenced but not inlined (become imports)
    named_refs: BTreeSet<String>,
    /// Definitions currently being inlined; re-entry falls back to a named
    /// reference so self-referential definitions terminate
    inlining: Vec<String>,
}

impl<'a> Emitter<'a> {
    pub fn new(definitions: &'a [(String, SchemaNode)]) -> Self {
        Self {
            definitions,
            named_refs: BTreeSet::new(),
            inlining: Vec::new(),
        }
    }

    /// Schema constants referenced by name during emission, in stable order
    pub fn named_refs(&self) -> impl Iterator<Item = &str> {
        self.named_refs.iter().map(|s| s.as_str())
    }

    /// Emit the full validation expression for a node
    pub fn expr(&mut self, node: &SchemaNode) -> String {
        let mut out = match &node.kind {
            SchemaKind::Any => "z.any()".to_string(),
            SchemaKind::Boolean => "z.boolean()".to_string(),
            SchemaKind::String(constraints) => string_expr(node, constraints),
            SchemaKind::Number(constraints) => number_expr(constraints),
            SchemaKind::Const { value } => format!("z.literal({})", literal(value)),
            SchemaKind::Enum { values } => enum_expr(values),
            SchemaKind::Object {
                properties,
                required,
            } => self.object_expr(properties, required),
            SchemaKind::Array {
                items,
                min_items,
                max_items,
            } => self.array_expr(items.as_ref(), *min_items, *max_items),
            SchemaKind::Union { flavor, variants } => self.union_expr(*flavor, variants),
            SchemaKind::Reference { target } => self.reference_expr(target),
        };

        if let Some(default) = &node.default {
            out.push_str(&format!(".default({})", literal(default)));
        }
        out.push_str(&meta_clause(node));
        out
    }

    fn object_expr(&mut self, properties: &[crate::schema::Property], required: &[String]) -> String {
        if properties.is_empty() {
            return "z.object({})".to_string();
        }
        let mut out = String::from("z.object({\n");
        for prop in properties {
            let mut field = self.expr(&prop.node);
            if !required.iter().any(|r| r == &prop.name) {
                field.push_str(".optional()");
            }
            out.push_str(&format!("  {}: {},\n", field_key(&prop.name), field));
        }
        out.push_str("})");
        out
    }

    fn array_expr(
        &mut self,
        items: Option<&ArrayItems>,
        min_items: Option<u64>,
        max_items: Option<u64>,
    ) -> String {
        let mut out = match items {
            Some(ArrayItems::Single(item)) => format!("z.array({})", self.expr(item)),
            Some(ArrayItems::Tuple(nodes)) => {
                let members: Vec<String> = nodes.iter().map(|n| self.expr(n)).collect();
                format!("z.tuple([{}])", members.join(", "))
            }
            None => "z.array(z.any())".to_string(),
        };
        if let Some(n) = min_items {
            out.push_str(&format!(".min({n}, {})", quote(&format!("At least {n} item(s) required"))));
        }
        if let Some(n) = max_items {
            out.push_str(&format!(".max({n}, {})", quote(&format!("At most {n} item(s) allowed"))));
        }
        out
    }

    fn union_expr(&mut self, flavor: UnionFlavor, variants: &[SchemaNode]) -> String {
        let mut members: Vec<String> = variants.iter().map(|v| self.expr(v)).collect();
        match members.len() {
            0 => "z.never()".to_string(),
            1 => members.remove(0),
            // allOf composes by intersection, anyOf/oneOf by union
            _ if flavor == UnionFlavor::AllOf => {
                let first = members.remove(0);
                members
                    .into_iter()
                    .fold(first, |acc, member| format!("{acc}.and({member})"))
            }
            _ => format!("z.union([{}])", members.join(", ")),
        }
    }

    /// An unresolved `$ref`: inline the definition when the supplied map has
    /// it, otherwise fall back to a named schema-constant reference
    fn reference_expr(&mut self, target: &str) -> String {
        let name = reference_name(target);
        if !self.inlining.contains(&name) {
            if let Some((_, def)) = self.definitions.iter().find(|(n, _)| n == &name) {
                let def = def.clone();
                self.inlining.push(name);
                let expr = self.expr(&def);
                self.inlining.pop();
                return expr;
            }
        }
        let constant = format!("{}Schema", to_pascal_case(&name));
        self.named_refs.insert(constant.clone());
        constant
    }
}

fn string_expr(node: &SchemaNode, constraints: &StringConstraints) -> String {
    let mut out = String::from("z.string()");
    if let Some(n) = constraints.min_length {
        let message = if n == 1 {
            REQUIRED_MESSAGE.to_string()
        } else {
            format!("Must be at least {n} characters")
        };
        out.push_str(&format!(".min({n}, {})", quote(&message)));
    }
    if let Some(n) = constraints.max_length {
        out.push_str(&format!(".max({n}, {})", quote(&format!("Must be at most {n} characters"))));
    }
    if let Some(pattern) = &constraints.pattern {
        let message = node
            .description
            .clone()
            .unwrap_or_else(|| "Invalid format".to_string());
        out.push_str(&format!(".regex(/{}/, {})", escape_regex(pattern), quote(&message)));
    }
    out
}

fn number_expr(constraints: &NumberConstraints) -> String {
    let mut out = String::from("z.number()");
    if constraints.integer {
        out.push_str(".int()");
    }
    if let Some(n) = constraints.minimum {
        out.push_str(&format!(".gte({}, {})", number(n), quote(&format!("Must be at least {}", number(n)))));
    }
    if let Some(n) = constraints.maximum {
        out.push_str(&format!(".lte({}, {})", number(n), quote(&format!("Must be at most {}", number(n)))));
    }
    if let Some(n) = constraints.exclusive_minimum {
        out.push_str(&format!(".gt({}, {})", number(n), quote(&format!("Must be greater than {}", number(n)))));
    }
    if let Some(n) = constraints.exclusive_maximum {
        out.push_str(&format!(".lt({}, {})", number(n), quote(&format!("Must be less than {}", number(n)))));
    }
    out
}

fn enum_expr(values: &[Value]) -> String {
    let all_strings = values.iter().all(|v| v.is_string());
    if all_strings && !values.is_empty() {
        let members: Vec<String> = values
            .iter()
            .filter_map(|v| v.as_str())
            .map(quote)
            .collect();
        format!("z.enum([{}])", members.join(", "))
    } else {
        let members: Vec<String> = values
            .iter()
            .map(|v| format!("z.literal({})", literal(v)))
            .collect();
        format!("z.union([{}])", members.join(", "))
    }
}

/// Trailing `.meta({...})` clause from title/description/examples
fn meta_clause(node: &SchemaNode) -> String {
    let mut fields = Vec::new();
    if let Some(title) = &node.title {
        fields.push(format!("title: {}", quote(title)));
    }
    if let Some(description) = &node.description {
        fields.push(format!("description: {}", quote(description)));
    }
    if !node.examples.is_empty() {
        let examples: Vec<String> = node.examples.iter().map(literal).collect();
        fields.push(format!("examples: [{}]", examples.join(", ")));
    }
    if fields.is_empty() {
        String::new()
    } else {
        format!(".meta({{ {} }})", fields.join(", "))
    }
}

/// Last path segment of a `$ref` target, without schema-file suffixes
fn reference_name(target: &str) -> String {
    target
        .rsplit(['/', '#'])
        .find(|s| !s.is_empty())
        .unwrap_or(target)
        .trim_end_matches(".schema.json")
        .trim_end_matches(".json")
        .to_string()
}

/// File stem a named reference would be generated into
pub fn reference_file_stem(constant: &str) -> String {
    to_kebab_case(constant.trim_end_matches("Schema"))
}

/// Single-quoted JS string literal
fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// JS literal for a JSON value
fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => quote(s),
        other => serde_json::to_string(other).unwrap_or_else(|_| "null".to_string()),
    }
}

fn number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Object key, quoted when it is not a bare JS identifier
fn field_key(name: &str) -> String {
    let bare = !name.is_empty()
        && !name.chars().next().unwrap().is_ascii_digit()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if bare {
        name.to_string()
    } else {
        quote(name)
    }
}

fn escape_regex(pattern: &str) -> String {
    pattern.replace('/', "\\/")
}
