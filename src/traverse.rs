//! Property Traversal Engine
//!
//! Addresses nodes in a resolved tree by dotted property path. Three path
//! shapes are understood:
//!
//! - a root collection property (`tables`) resolves to its singular element
//!   definition (`definitions.table`) when one exists;
//! - a general dotted path (`tables.fields`) walks object properties,
//!   descending through array items as needed;
//! - a three-segment `definition.discriminantA.discriminantB` path
//!   (`automation_trigger.http.post`) selects the union variant whose
//!   properties carry both discriminants as `const` values.
//!
//! Traversal returns the first structural match and never aggregates.

use crate::policy;
use crate::schema::SchemaNode;

/// Path navigation over one resolved schema tree
pub struct Traversal<'a> {
    root: &'a SchemaNode,
}

impl<'a> Traversal<'a> {
    pub fn new(root: &'a SchemaNode) -> Self {
        Self { root }
    }

    /// Locate the node addressed by a dotted property path.
    ///
    /// Returns `None` when any segment fails to match; the caller decides
    /// whether that is an error.
    pub fn locate(&self, path: &str) -> Option<&'a SchemaNode> {
        let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => None,
            [single] => self.locate_root(single),
            [definition, a, b] if self.root.find_definition(definition).is_some() => {
                let def = self.root.find_definition(definition)?;
                locate_variant(def, a, b)
            }
            [first, rest @ ..] => {
                let mut current = self.locate_root(first)?;
                for segment in rest {
                    current = descend(current, segment)?;
                }
                Some(current)
            }
        }
    }

    /// Resolve a root segment: collection properties map to their singular
    /// definition, arrays fall back to their items node
    fn locate_root(&self, segment: &str) -> Option<&'a SchemaNode> {
        if let Some(node) = self.root.find_property(segment) {
            if node.item_node().is_some() || node.kind_name() == "array" {
                if let Some(singular) = policy::singular_definition(segment) {
                    if let Some(def) = self.root.find_definition(singular) {
                        return Some(def);
                    }
                }
                if let Some(items) = node.item_node() {
                    return Some(items);
                }
            }
            return Some(node);
        }
        self.root.find_definition(segment)
    }
}

/// Step one path segment into a node, descending through array items and
/// scanning union variants for the first one carrying the property
fn descend<'a>(node: &'a SchemaNode, segment: &str) -> Option<&'a SchemaNode> {
    let node = node.item_node().unwrap_or(node);

    if let Some(child) = node.find_property(segment) {
        return Some(child);
    }

    if let Some(variants) = node.variants() {
        for variant in variants {
            let variant = variant.item_node().unwrap_or(variant);
            if let Some(child) = variant.find_property(segment) {
                return Some(child);
            }
        }
    }

    None
}

/// Select the variant of a trigger/action definition matching a discriminant
/// pair. Outer groups are matched by nothing (they may be unlabeled): each
/// group's nested union is scanned, then the group itself, and the first
/// structural match wins.
pub fn locate_variant<'a>(
    definition: &'a SchemaNode,
    discriminant_a: &str,
    discriminant_b: &str,
) -> Option<&'a SchemaNode> {
    locate_variant_and_group(definition, discriminant_a, discriminant_b).map(|(leaf, _)| leaf)
}

/// Like [`locate_variant`], but also returns the enclosing group when the
/// match came from a nested union. Story extraction falls back to the
/// group's own stories when the matched leaf has none.
pub fn locate_variant_and_group<'a>(
    definition: &'a SchemaNode,
    discriminant_a: &str,
    discriminant_b: &str,
) -> Option<(&'a SchemaNode, Option<&'a SchemaNode>)> {
    let groups = definition.variants()?;

    for group in groups {
        if let Some(nested) = group.variants() {
            for variant in nested {
                if matches_discriminants(variant, discriminant_a, discriminant_b) {
                    return Some((variant, Some(group)));
                }
            }
        } else if matches_discriminants(group, discriminant_a, discriminant_b) {
            return Some((group, None));
        }
    }

    None
}

/// Whether a variant's properties carry both discriminants as `const`
/// string values. Field names are not consulted; matching is
/// case-insensitive with `-` and `_` treated as the same separator.
fn matches_discriminants(variant: &SchemaNode, a: &str, b: &str) -> bool {
    let props = match variant.properties() {
        Some(props) => props,
        None => return false,
    };

    let wanted_a = normalize_token(a);
    let wanted_b = normalize_token(b);

    let consts: Vec<String> = props
        .iter()
        .filter_map(|p| p.node.const_str().map(normalize_token))
        .collect();

    let count_a = consts.iter().filter(|c| **c == wanted_a).count();
    if wanted_a == wanted_b {
        count_a >= 2
    } else {
        count_a >= 1 && consts.iter().any(|c| *c == wanted_b)
    }
}

/// Fold case and separator differences so `http-request` == `HTTP_REQUEST`
pub fn normalize_token(token: &str) -> String {
    token.to_ascii_lowercase().replace('-', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn app_tree() -> SchemaNode {
        SchemaNode::from_value(&json!({
            "type": "object",
            "properties": {
                "tables": { "type": "array", "items": { "$ref": "#/definitions/table" } },
                "settings": {
                    "type": "object",
                    "properties": { "locale": { "type": "string" } }
                }
            },
            "definitions": {
                "table": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "minLength": 1 },
                        "fields": { "type": "array", "items": { "type": "object" } }
                    }
                },
                "automation_trigger": {
                    "anyOf": [
                        {
                            "title": "Whatever the authors called it",
                            "anyOf": [
                                {
                                    "properties": {
                                        "service": { "const": "http" },
                                        "event": { "const": "post" }
                                    }
                                },
                                {
                                    "properties": {
                                        "service": { "const": "http" },
                                        "event": { "const": "get" }
                                    }
                                }
                            ]
                        },
                        {
                            "properties": {
                                "service": { "const": "schedule" },
                                "event": { "const": "cron" }
                            }
                        }
                    ]
                }
            }
        }))
    }

    #[test]
    fn test_collection_maps_to_singular_definition() {
        let tree = app_tree();
        let traversal = Traversal::new(&tree);
        let table = traversal.locate("tables").unwrap();
        assert!(table.find_property("fields").is_some());
    }

    #[test]
    fn test_nested_property_path() {
        let tree = app_tree();
        let traversal = Traversal::new(&tree);
        let name = traversal.locate("tables.name").unwrap();
        assert_eq!(name.kind_name(), "string");
        let locale = traversal.locate("settings.locale").unwrap();
        assert_eq!(locale.kind_name(), "string");
    }

    #[test]
    fn test_discriminant_pair_navigation_ignores_group_title() {
        let tree = app_tree();
        let traversal = Traversal::new(&tree);
        let variant = traversal.locate("automation_trigger.http.post").unwrap();
        assert_eq!(
            variant.find_property("event").unwrap().const_str(),
            Some("post")
        );
    }

    #[test]
    fn test_discriminants_fold_case_and_separators() {
        let tree = app_tree();
        let traversal = Traversal::new(&tree);
        assert!(traversal.locate("automation_trigger.HTTP.POST").is_some());
    }

    #[test]
    fn test_ungrouped_variant_matches_directly() {
        let tree = app_tree();
        let traversal = Traversal::new(&tree);
        let variant = traversal
            .locate("automation_trigger.schedule.cron")
            .unwrap();
        assert_eq!(
            variant.find_property("service").unwrap().const_str(),
            Some("schedule")
        );
    }

    #[test]
    fn test_missing_path_is_none() {
        let tree = app_tree();
        let traversal = Traversal::new(&tree);
        assert!(traversal.locate("widgets").is_none());
        assert!(traversal.locate("tables.nope").is_none());
        assert!(traversal.locate("automation_trigger.http.delete").is_none());
    }
}
