//! Authored Story Extraction
//!
//! Stories authored on a node apply to every descendant path, so extraction
//! walks each prefix of the property path from the full path down to its
//! first segment, collecting `x-user-stories` in walk order (including the
//! list nested one level under `items`, and the matched variant of a
//! discriminant-pair path). Duplicates keep their first occurrence.

use crate::codegen::names::to_kebab_case;
use crate::schema::{SchemaKind, SchemaNode};
use crate::traverse::{locate_variant_and_group, Traversal};

use super::parser::StoryParser;
use super::PropertyScenarios;

/// Collect authored story strings for a property path, deduplicated in
/// walk order (full path first, root segment last)
pub fn collect_story_strings(root: &SchemaNode, path: &str) -> Vec<String> {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let traversal = Traversal::new(root);
    let mut collected = Vec::new();

    for end in (1..=segments.len()).rev() {
        let prefix = segments[..end].join(".");

        // Discriminant-pair paths descend into the matched variant, falling
        // back to the enclosing group's stories when the leaf has none
        if end == 3 {
            if let Some(definition) = root.find_definition(segments[0]) {
                if let Some((leaf, group)) =
                    locate_variant_and_group(definition, segments[1], segments[2])
                {
                    if !leaf.user_stories.is_empty() {
                        collected.extend(leaf.user_stories.iter().cloned());
                    } else if let Some(group) = group {
                        collected.extend(group.user_stories.iter().cloned());
                    }
                    continue;
                }
            }
        }

        // Root collection prefixes read the property node itself (its
        // stories plus the list nested under items), then the singular
        // definition; deeper prefixes go through traversal
        if end == 1 {
            if let Some(property) = root.find_property(segments[0]) {
                collected.extend(property.user_stories.iter().cloned());
                if let Some(items) = property.item_node() {
                    collected.extend(items.user_stories.iter().cloned());
                }
            }
        }

        if let Some(node) = traversal.locate(&prefix) {
            collected.extend(node.user_stories.iter().cloned());
            if let Some(items) = node.item_node() {
                collected.extend(items.user_stories.iter().cloned());
            }
        }
    }

    dedupe_preserving_order(collected)
}

/// Canonical element identifiers for a property path.
///
/// Scalar nodes get `-input`/`-error`, enums additionally `-select` and
/// `-option`, arrays get `-list`/`-add-button`/`-remove-button`. Object and
/// union nodes have no canonical hooks of their own.
pub fn element_identifiers(path: &str, node: &SchemaNode) -> Vec<String> {
    let stem: Vec<String> = path.split('.').map(to_kebab_case).collect();
    let stem = stem.join("-");

    match &node.kind {
        SchemaKind::String(_)
        | SchemaKind::Number(_)
        | SchemaKind::Boolean
        | SchemaKind::Const { .. } => {
            vec![format!("{stem}-input"), format!("{stem}-error")]
        }
        SchemaKind::Enum { .. } => vec![
            format!("{stem}-input"),
            format!("{stem}-error"),
            format!("{stem}-select"),
            format!("{stem}-option"),
        ],
        SchemaKind::Array { .. } => vec![
            format!("{stem}-list"),
            format!("{stem}-add-button"),
            format!("{stem}-remove-button"),
        ],
        _ => Vec::new(),
    }
}

/// Extract the authored scenarios and element identifiers for one path
pub fn extract(root: &SchemaNode, path: &str) -> PropertyScenarios {
    let parser = StoryParser::new();
    let stories = collect_story_strings(root, path);
    let scenarios = parser.parse_all(&stories);

    let element_ids = Traversal::new(root)
        .locate(path)
        .map(|node| element_identifiers(path, node))
        .unwrap_or_default();

    PropertyScenarios {
        property_path: path.to_string(),
        scenarios,
        element_ids: dedupe_preserving_order(element_ids),
    }
}

fn dedupe_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items.into_iter().filter(|s| seen.insert(s.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree() -> SchemaNode {
        SchemaNode::from_value(&json!({
            "type": "object",
            "properties": {
                "tables": {
                    "type": "array",
                    "x-user-stories": ["GIVEN tables exist WHEN listed THEN all appear"],
                    "items": {
                        "x-user-stories": ["GIVEN a table WHEN opened THEN rows load"]
                    }
                }
            },
            "definitions": {
                "table": {
                    "type": "object",
                    "x-user-stories": ["GIVEN a table WHEN opened THEN rows load"],
                    "properties": {
                        "name": {
                            "type": "string",
                            "minLength": 1,
                            "x-user-stories": [
                                "GIVEN a new table WHEN the name is empty THEN saving should fail"
                            ]
                        }
                    }
                },
                "automation_trigger": {
                    "anyOf": [
                        {
                            "x-user-stories": ["GIVEN any http trigger WHEN fired THEN it runs"],
                            "anyOf": [
                                {
                                    "properties": {
                                        "service": { "const": "http" },
                                        "event": { "const": "post" }
                                    }
                                },
                                {
                                    "x-user-stories": ["GIVEN a get trigger WHEN polled THEN it runs"],
                                    "properties": {
                                        "service": { "const": "http" },
                                        "event": { "const": "get" }
                                    }
                                }
                            ]
                        }
                    ]
                }
            }
        }))
    }

    #[test]
    fn test_child_stories_come_before_ancestors() {
        let root = tree();
        let stories = collect_story_strings(&root, "tables.name");
        assert_eq!(stories.len(), 3);
        assert!(stories[0].contains("the name is empty"));
        assert!(stories[1].contains("all appear"));
        // Items-level story, also present on the singular definition
        assert!(stories[2].contains("rows load"));
    }

    #[test]
    fn test_duplicate_stories_keep_first_occurrence() {
        let root = SchemaNode::from_value(&json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "x-user-stories": [
                        "GIVEN a WHEN b THEN c",
                        "GIVEN a WHEN b THEN c"
                    ]
                }
            }
        }));
        let result = extract(&root, "name");
        assert_eq!(result.scenarios.len(), 1);
    }

    #[test]
    fn test_malformed_story_skipped_not_fatal() {
        let root = SchemaNode::from_value(&json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "x-user-stories": ["not a story", "GIVEN x WHEN y THEN z"]
                }
            }
        }));
        let result = extract(&root, "name");
        assert_eq!(result.scenarios.len(), 1);
        assert_eq!(result.scenarios[0].given, "x");
    }

    #[test]
    fn test_variant_leaf_stories_win_over_group() {
        let root = tree();
        let stories = collect_story_strings(&root, "automation_trigger.http.get");
        assert!(stories[0].contains("a get trigger"));
    }

    #[test]
    fn test_variant_without_stories_falls_back_to_group() {
        let root = tree();
        let stories = collect_story_strings(&root, "automation_trigger.http.post");
        assert!(stories[0].contains("any http trigger"));
    }

    #[test]
    fn test_element_identifiers_by_kind() {
        let string_node = SchemaNode::from_value(&json!({ "type": "string" }));
        assert_eq!(
            element_identifiers("tables.name", &string_node),
            vec!["tables-name-input", "tables-name-error"]
        );

        let enum_node = SchemaNode::from_value(&json!({ "enum": ["grid", "kanban"] }));
        assert_eq!(
            element_identifiers("pages.layout", &enum_node),
            vec![
                "pages-layout-input",
                "pages-layout-error",
                "pages-layout-select",
                "pages-layout-option"
            ]
        );

        let array_node = SchemaNode::from_value(&json!({ "type": "array" }));
        assert_eq!(
            element_identifiers("tables.fields", &array_node),
            vec![
                "tables-fields-list",
                "tables-fields-add-button",
                "tables-fields-remove-button"
            ]
        );
    }
}
