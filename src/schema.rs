//! Schema node model
//!
//! A closed, typed representation of the JSON-Schema-like input format.
//! Every construct the pipeline understands is a [`SchemaKind`] variant, so
//! the traversal engine, differ, and code generator can match exhaustively
//! instead of re-walking raw JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Extension keyword carrying authored Given/When/Then strings
pub const STORIES_KEY: &str = "x-user-stories";

/// Extension keyword carrying authored business-rule prose
pub const BUSINESS_RULES_KEY: &str = "x-business-rules";

/// Keyword carrying structured spec entries on collection-defining nodes
pub const SPECS_KEY: &str = "specs";

/// A named property of an object node.
///
/// Properties are kept as an ordered list (not a map) so that generated
/// fields and diff reports follow the declaration order of the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub node: SchemaNode,
}

/// Items of an array node: a single element schema or a positional tuple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArrayItems {
    Single(Box<SchemaNode>),
    Tuple(Vec<SchemaNode>),
}

/// Which union keyword produced a [`SchemaKind::Union`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnionFlavor {
    AnyOf,
    OneOf,
    AllOf,
}

/// String validation constraints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StringConstraints {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
}

/// Numeric validation constraints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberConstraints {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    /// True for `"type": "integer"`
    pub integer: bool,
}

/// The structural kind of a schema node.
///
/// `Any` is the empty schema (nothing declared); `Reference` is a `$ref`
/// that survived resolution — consumers must treat that subtree as
/// incomplete rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SchemaKind {
    Any,
    Boolean,
    String(StringConstraints),
    Number(NumberConstraints),
    Const { value: Value },
    Enum { values: Vec<Value> },
    Object {
        properties: Vec<Property>,
        required: Vec<String>,
    },
    Array {
        items: Option<ArrayItems>,
        min_items: Option<u64>,
        max_items: Option<u64>,
    },
    Union {
        flavor: UnionFlavor,
        variants: Vec<SchemaNode>,
    },
    Reference { target: String },
}

/// One structured spec entry from a collection node's `specs` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecEntry {
    pub id: String,
    pub title: String,
    pub given: String,
    pub when: String,
    pub then: String,
}

/// A resolved schema node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Human-readable title
    pub title: Option<String>,
    /// Human-readable description
    pub description: Option<String>,
    /// Example values, verbatim from the source
    pub examples: Vec<Value>,
    /// Default literal, if declared
    pub default: Option<Value>,
    /// Authored Given/When/Then strings (`x-user-stories`)
    pub user_stories: Vec<String>,
    /// Authored business-rule prose (`x-business-rules`)
    pub business_rules: Vec<String>,
    /// Structured spec entries (`specs`), present on collection nodes
    pub specs: Vec<SpecEntry>,
    /// Named reusable nodes (`definitions`)
    pub definitions: Vec<(String, SchemaNode)>,
    /// Structural kind
    pub kind: SchemaKind,
}

impl SchemaNode {
    /// Parse a node from raw JSON.
    ///
    /// Never fails: anything the model does not understand parses as
    /// [`SchemaKind::Any`]. Unresolved `$ref` strings become
    /// [`SchemaKind::Reference`].
    pub fn from_value(value: &Value) -> Self {
        let obj = match value.as_object() {
            Some(obj) => obj,
            None => return Self::any(),
        };

        let kind = Self::parse_kind(obj);

        let examples = obj
            .get("examples")
            .and_then(|v| v.as_array())
            .map(|arr| arr.to_vec())
            .unwrap_or_default();

        let specs = obj
            .get(SPECS_KEY)
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|e| serde_json::from_value(e.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        let definitions = obj
            .get("definitions")
            .and_then(|v| v.as_object())
            .map(|defs| {
                defs.iter()
                    .map(|(name, def)| (name.clone(), SchemaNode::from_value(def)))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            title: string_field(obj, "title"),
            description: string_field(obj, "description"),
            examples,
            default: obj.get("default").cloned(),
            user_stories: string_list(obj, STORIES_KEY),
            business_rules: string_list(obj, BUSINESS_RULES_KEY),
            specs,
            definitions,
            kind,
        }
    }

    fn parse_kind(obj: &serde_json::Map<String, Value>) -> SchemaKind {
        if let Some(target) = obj.get("$ref").and_then(|v| v.as_str()) {
            return SchemaKind::Reference {
                target: target.to_string(),
            };
        }
        if let Some(value) = obj.get("const") {
            return SchemaKind::Const {
                value: value.clone(),
            };
        }
        if let Some(values) = obj.get("enum").and_then(|v| v.as_array()) {
            return SchemaKind::Enum {
                values: values.to_vec(),
            };
        }
        for (key, flavor) in [
            ("anyOf", UnionFlavor::AnyOf),
            ("oneOf", UnionFlavor::OneOf),
            ("allOf", UnionFlavor::AllOf),
        ] {
            if let Some(variants) = obj.get(key).and_then(|v| v.as_array()) {
                return SchemaKind::Union {
                    flavor,
                    variants: variants.iter().map(SchemaNode::from_value).collect(),
                };
            }
        }

        let declared = obj.get("type").and_then(|v| v.as_str());
        match declared {
            Some("object") => Self::parse_object(obj),
            Some("array") => Self::parse_array(obj),
            Some("string") => SchemaKind::String(StringConstraints {
                min_length: u64_field(obj, "minLength"),
                max_length: u64_field(obj, "maxLength"),
                pattern: string_field(obj, "pattern"),
            }),
            Some("number") | Some("integer") => SchemaKind::Number(NumberConstraints {
                minimum: f64_field(obj, "minimum"),
                maximum: f64_field(obj, "maximum"),
                exclusive_minimum: f64_field(obj, "exclusiveMinimum"),
                exclusive_maximum: f64_field(obj, "exclusiveMaximum"),
                integer: declared == Some("integer"),
            }),
            Some("boolean") => SchemaKind::Boolean,
            // No explicit type: infer from structural keywords
            None if obj.contains_key("properties") => Self::parse_object(obj),
            None if obj.contains_key("items") => Self::parse_array(obj),
            _ => SchemaKind::Any,
        }
    }

    fn parse_object(obj: &serde_json::Map<String, Value>) -> SchemaKind {
        let properties = obj
            .get("properties")
            .and_then(|v| v.as_object())
            .map(|props| {
                props
                    .iter()
                    .map(|(name, prop)| Property {
                        name: name.clone(),
                        node: SchemaNode::from_value(prop),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let required = obj
            .get("required")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        SchemaKind::Object {
            properties,
            required,
        }
    }

    fn parse_array(obj: &serde_json::Map<String, Value>) -> SchemaKind {
        let items = obj.get("items").map(|items| match items {
            Value::Array(tuple) => {
                ArrayItems::Tuple(tuple.iter().map(SchemaNode::from_value).collect())
            }
            other => ArrayItems::Single(Box::new(SchemaNode::from_value(other))),
        });

        SchemaKind::Array {
            items,
            min_items: u64_field(obj, "minItems"),
            max_items: u64_field(obj, "maxItems"),
        }
    }

    /// The empty schema: nothing declared, anything allowed
    pub fn any() -> Self {
        Self {
            title: None,
            description: None,
            examples: Vec::new(),
            default: None,
            user_stories: Vec::new(),
            business_rules: Vec::new(),
            specs: Vec::new(),
            definitions: Vec::new(),
            kind: SchemaKind::Any,
        }
    }

    /// Short name of the structural kind, matching the input `type` keyword
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            SchemaKind::Any => "any",
            SchemaKind::Boolean => "boolean",
            SchemaKind::String(_) => "string",
            SchemaKind::Number(c) if c.integer => "integer",
            SchemaKind::Number(_) => "number",
            SchemaKind::Const { .. } => "const",
            SchemaKind::Enum { .. } => "enum",
            SchemaKind::Object { .. } => "object",
            SchemaKind::Array { .. } => "array",
            SchemaKind::Union { .. } => "union",
            SchemaKind::Reference { .. } => "$ref",
        }
    }

    /// Whether the node declares any concrete structure.
    ///
    /// `Any` and unresolved references count as undeclared: the differ
    /// treats a current node without a declared type as missing.
    pub fn declares_type(&self) -> bool {
        !matches!(self.kind, SchemaKind::Any | SchemaKind::Reference { .. })
    }

    /// Object properties, if this is an object node
    pub fn properties(&self) -> Option<&[Property]> {
        match &self.kind {
            SchemaKind::Object { properties, .. } => Some(properties),
            _ => None,
        }
    }

    /// Required property names, if this is an object node
    pub fn required(&self) -> Option<&[String]> {
        match &self.kind {
            SchemaKind::Object { required, .. } => Some(required),
            _ => None,
        }
    }

    /// Look up a property by name on an object node
    pub fn find_property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties()?
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.node)
    }

    /// Look up a named definition on this node
    pub fn find_definition(&self, name: &str) -> Option<&SchemaNode> {
        self.definitions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, def)| def)
    }

    /// Union variants, if this is a union node
    pub fn variants(&self) -> Option<&[SchemaNode]> {
        match &self.kind {
            SchemaKind::Union { variants, .. } => Some(variants),
            _ => None,
        }
    }

    /// The single-element items node of an array, if present
    pub fn item_node(&self) -> Option<&SchemaNode> {
        match &self.kind {
            SchemaKind::Array {
                items: Some(ArrayItems::Single(node)),
                ..
            } => Some(node),
            _ => None,
        }
    }

    /// The `const` value as a string, if this node is a string constant
    pub fn const_str(&self) -> Option<&str> {
        match &self.kind {
            SchemaKind::Const { value } => value.as_str(),
            _ => None,
        }
    }
}

fn string_field(obj: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(|v| v.as_str()).map(String::from)
}

fn string_list(obj: &serde_json::Map<String, Value>, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

fn u64_field(obj: &serde_json::Map<String, Value>, key: &str) -> Option<u64> {
    obj.get(key).and_then(|v| v.as_u64())
}

fn f64_field(obj: &serde_json::Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(|v| v.as_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_string_constraints() {
        let node = SchemaNode::from_value(&json!({
            "type": "string",
            "minLength": 1,
            "maxLength": 80,
            "pattern": "^[a-z]+$"
        }));

        match node.kind {
            SchemaKind::String(c) => {
                assert_eq!(c.min_length, Some(1));
                assert_eq!(c.max_length, Some(80));
                assert_eq!(c.pattern.as_deref(), Some("^[a-z]+$"));
            }
            other => panic!("Expected String, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_object_preserves_required() {
        let node = SchemaNode::from_value(&json!({
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "name": { "type": "string" }
            },
            "required": ["id"]
        }));

        let props = node.properties().unwrap();
        assert_eq!(props.len(), 2);
        assert_eq!(node.required().unwrap(), &["id".to_string()]);
        assert!(node.find_property("name").is_some());
    }

    #[test]
    fn test_parse_union_and_const() {
        let node = SchemaNode::from_value(&json!({
            "anyOf": [
                { "properties": { "service": { "const": "http" } } },
                { "properties": { "service": { "const": "schedule" } } }
            ]
        }));

        let variants = node.variants().unwrap();
        assert_eq!(variants.len(), 2);
        assert_eq!(
            variants[0].find_property("service").unwrap().const_str(),
            Some("http")
        );
    }

    #[test]
    fn test_ref_and_sibling_stories_survive_parsing() {
        let node = SchemaNode::from_value(&json!({
            "$ref": "../common/definitions.schema.json#/definitions/id",
            "x-user-stories": ["GIVEN a WHEN b THEN c"]
        }));

        assert!(matches!(node.kind, SchemaKind::Reference { .. }));
        assert_eq!(node.user_stories.len(), 1);
        assert!(!node.declares_type());
    }

    #[test]
    fn test_empty_schema_is_any() {
        let node = SchemaNode::from_value(&json!({}));
        assert!(matches!(node.kind, SchemaKind::Any));
        assert!(!node.declares_type());
    }

    #[test]
    fn test_integer_kind_name() {
        let node = SchemaNode::from_value(&json!({ "type": "integer", "minimum": 0 }));
        assert_eq!(node.kind_name(), "integer");
    }
}
