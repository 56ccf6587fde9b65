//! Collection naming policy
//!
//! The Canvas schema names its root collections (`pages`, `tables`,
//! `automations`, `connections`) and the differ, planner, and traversal
//! engine all key heuristics off those names. None of that is generalizable,
//! so it lives here behind explicitly named functions instead of being
//! spread through the consumers.

use crate::schema::SchemaNode;
use std::collections::BTreeSet;

/// Root collection properties and their singular definition names
pub const COLLECTIONS: &[(&str, &str)] = &[
    ("pages", "page"),
    ("tables", "table"),
    ("automations", "automation"),
    ("connections", "connection"),
];

/// Definitions that hold discriminant-pair variant lists
pub const TRIGGER_ACTION_DEFINITIONS: &[&str] = &["automation_trigger", "automation_action"];

/// Properties whose generated specs get an extra minimal happy-path scenario
pub const DEFAULT_CRITICAL_PROPERTIES: &[&str] = &["tables", "pages", "automations", "connections"];

/// Field-type variant names that mark the `tables` collection as splittable
/// into foundation/advanced sub-phases
const ADVANCED_FIELD_MARKERS: &[&str] = &["relationship", "attachment", "select"];

/// Map a root collection property to its singular element definition name
pub fn singular_definition(collection: &str) -> Option<&'static str> {
    COLLECTIONS
        .iter()
        .find(|(plural, _)| *plural == collection)
        .map(|(_, singular)| *singular)
}

/// Whether a definition name is an automation trigger/action union
pub fn is_trigger_action_definition(name: &str) -> bool {
    TRIGGER_ACTION_DEFINITIONS.contains(&name)
}

/// Map a property name to the collection it references, if it reads as a
/// foreign key (`tableId`, `table_id`, `pageId`, ...)
pub fn referenced_collection(property_name: &str) -> Option<&'static str> {
    let lowered = property_name.to_ascii_lowercase().replace('-', "_");
    for (plural, singular) in COLLECTIONS {
        if lowered == format!("{singular}id") || lowered == format!("{singular}_id") {
            return Some(plural);
        }
    }
    None
}

/// Cross-collection dependency edges for a property path.
///
/// Two rules, both name-based: an `automations`-rooted path always depends
/// on `tables`, and a `pages`-rooted path depends on any collection one of
/// its variants references by foreign-key property name.
pub fn dependencies_for(path: &str, vision: &SchemaNode) -> BTreeSet<String> {
    let root = path.split('.').next().unwrap_or(path);
    let mut deps = BTreeSet::new();

    if root == "automations" {
        deps.insert("tables".to_string());
    }

    if root == "pages" {
        collect_reference_deps(vision, &mut deps);
        deps.remove(root);
    }

    deps
}

fn collect_reference_deps(node: &SchemaNode, deps: &mut BTreeSet<String>) {
    if let Some(props) = node.properties() {
        for prop in props {
            if let Some(collection) = referenced_collection(&prop.name) {
                deps.insert(collection.to_string());
            }
            collect_reference_deps(&prop.node, deps);
        }
    }
    if let Some(variants) = node.variants() {
        for variant in variants {
            collect_reference_deps(variant, deps);
        }
    }
    if let Some(items) = node.item_node() {
        collect_reference_deps(items, deps);
    }
}

/// Release-phase feature group for a property path
pub fn feature_group(path: &str) -> &'static str {
    match path.split('.').next().unwrap_or(path) {
        "tables" => "Data model",
        "pages" => "Pages & views",
        "automations" | "automation_trigger" | "automation_action" => "Automations",
        "connections" => "Connections",
        _ => "General",
    }
}

/// Whether the `tables` collection is large enough to split into foundation
/// and advanced sub-phases: more than five field-type union variants, at
/// least one of them relationship/attachment/select-like.
pub fn should_split_tables(path: &str, vision_root: &SchemaNode) -> bool {
    if path != "tables" {
        return false;
    }
    let names = table_field_variant_names(vision_root);
    names.len() > 5
        && names.iter().any(|n| {
            let lowered = n.to_ascii_lowercase();
            ADVANCED_FIELD_MARKERS.iter().any(|m| lowered.contains(m))
        })
}

/// Collect the field-type variant names of the `table` definition:
/// variant `type` consts where present, falling back to variant titles
fn table_field_variant_names(vision_root: &SchemaNode) -> Vec<String> {
    let mut names = Vec::new();
    let Some(table) = vision_root.find_definition("table") else {
        return names;
    };
    let Some(fields) = table.find_property("fields") else {
        return names;
    };
    let field_union = fields.item_node().unwrap_or(fields);
    if let Some(variants) = field_union.variants() {
        for variant in variants {
            let name = variant
                .find_property("type")
                .and_then(|t| t.const_str().map(String::from))
                .or_else(|| variant.title.clone());
            if let Some(name) = name {
                names.push(name);
            }
        }
    }
    names
}
