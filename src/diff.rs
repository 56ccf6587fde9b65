//! Schema Differ / Status Classifier
//!
//! Compares a "current" (implemented) tree against a "vision" (target) tree
//! and produces one [`PropertyStatus`] per addressable property path, plus
//! an aggregate [`DiffReport`]. The diff is a total function: an absent
//! current node is 0% completion, never an error.
//!
//! Scoring model: every structural/validation expectation on the vision
//! node is one equally weighted check (type match, each constraint field,
//! each declared property, each union variant up to the overlap), and the
//! completion percent is the matched ratio. A node with nothing to check
//! scores 100.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;

use crate::codegen::names::to_kebab_case;
use crate::policy;
use crate::schema::{ArrayItems, SchemaKind, SchemaNode};
use crate::traverse::{locate_variant, Traversal};

/// Implementation status of one property path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Complete,
    Partial,
    Missing,
}

/// Classification of one property path in the vision tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyStatus {
    /// Dot-joined path; array-item variant segments are kebab-cased
    pub path: String,
    pub status: Status,
    /// Weighted completion in [0, 100]; forced to 0 when status is missing
    pub completion_percent: u8,
    /// Human-readable list of unmet expectations, in check order
    pub missing_features: Vec<String>,
    /// Recursive complexity score of the vision node
    pub complexity: u32,
    /// Paths of collections this property depends on
    pub dependencies: BTreeSet<String>,
}

/// Aggregate diff summary for one compared schema pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffReport {
    pub generated_at: DateTime<Utc>,
    pub total_properties: usize,
    pub implemented_properties: usize,
    pub missing_properties: usize,
    /// Mean of per-path completion percents
    pub completion_percent: u8,
    pub missing_property_paths: Vec<String>,
    pub implemented_property_paths: Vec<String>,
}

/// Classify one vision node against its current counterpart
pub fn classify(path: &str, current: Option<&SchemaNode>, vision: &SchemaNode) -> PropertyStatus {
    let checks = run_checks(current, vision);
    let status = decide_status(current, vision, &checks);

    let completion_percent = if status == Status::Missing {
        0
    } else if checks.total == 0 {
        100
    } else {
        ((checks.passed as f64 / checks.total as f64) * 100.0).round() as u8
    };

    PropertyStatus {
        path: path.to_string(),
        status,
        completion_percent,
        missing_features: checks.missing_features,
        complexity: complexity(vision).round() as u32,
        dependencies: policy::dependencies_for(path, vision),
    }
}

/// Walk the whole vision tree and classify every addressable path:
/// root properties (collections map to their singular definitions), nested
/// object properties, array items including kebab-cased variant items, and
/// top-level named definitions. Automation trigger/action definitions are
/// flattened into one path per discriminant-pair variant.
pub fn diff_trees(current_root: Option<&SchemaNode>, vision_root: &SchemaNode) -> Vec<PropertyStatus> {
    let mut statuses = Vec::new();
    let vision_nav = Traversal::new(vision_root);

    let mut visited_definitions: BTreeSet<&str> = BTreeSet::new();

    if let Some(props) = vision_root.properties() {
        for prop in props {
            let vision_node = vision_nav.locate(&prop.name).unwrap_or(&prop.node);
            if let Some(singular) = policy::singular_definition(&prop.name) {
                visited_definitions.insert(singular);
            }
            let current_node =
                current_root.and_then(|root| Traversal::new(root).locate(&prop.name));
            statuses.push(classify(&prop.name, current_node, vision_node));
            walk_children(&prop.name, current_node, vision_node, &mut statuses);
        }
    }

    for (name, vision_def) in &vision_root.definitions {
        if visited_definitions.contains(name.as_str()) {
            continue;
        }
        let current_def = current_root.and_then(|root| root.find_definition(name));
        if policy::is_trigger_action_definition(name) {
            expand_trigger_action(name, current_def, vision_def, &mut statuses);
        } else {
            statuses.push(classify(name, current_def, vision_def));
            walk_children(name, current_def, vision_def, &mut statuses);
        }
    }

    statuses
}

/// Summarize a status list into the aggregate report
pub fn summarize(statuses: &[PropertyStatus]) -> DiffReport {
    let mut missing_paths: Vec<String> = statuses
        .iter()
        .filter(|s| s.status == Status::Missing)
        .map(|s| s.path.clone())
        .collect();
    let mut implemented_paths: Vec<String> = statuses
        .iter()
        .filter(|s| s.status != Status::Missing)
        .map(|s| s.path.clone())
        .collect();
    missing_paths.sort();
    implemented_paths.sort();

    let completion_percent = if statuses.is_empty() {
        100
    } else {
        let sum: u32 = statuses.iter().map(|s| s.completion_percent as u32).sum();
        (sum as f64 / statuses.len() as f64).round() as u8
    };

    DiffReport {
        generated_at: Utc::now(),
        total_properties: statuses.len(),
        implemented_properties: implemented_paths.len(),
        missing_properties: missing_paths.len(),
        completion_percent,
        missing_property_paths: missing_paths,
        implemented_property_paths: implemented_paths,
    }
}

// ---------------------------------------------------------------------------
// Check accounting
// ---------------------------------------------------------------------------

struct CheckOutcome {
    total: usize,
    passed: usize,
    missing_features: Vec<String>,
    props_total: usize,
    props_present: usize,
    items_ok: bool,
    variants_ok: bool,
}

fn run_checks(current: Option<&SchemaNode>, vision: &SchemaNode) -> CheckOutcome {
    let mut total = 0;
    let mut passed = 0;
    let mut missing_features = Vec::new();

    // Type match, counted only when the vision node declares a `type`
    // keyword (unions/enums/consts are scored by their own checks)
    let type_checkable = matches!(
        vision.kind,
        SchemaKind::Boolean
            | SchemaKind::String(_)
            | SchemaKind::Number(_)
            | SchemaKind::Object { .. }
            | SchemaKind::Array { .. }
    );
    if type_checkable {
        total += 1;
        if current.map(|c| c.kind_name() == vision.kind_name()).unwrap_or(false) {
            passed += 1;
        }
    }

    // Constraint fields declared on vision, one check each
    let vision_constraints = constraint_fields(vision);
    let current_constraints = current.map(constraint_fields).unwrap_or_default();
    for (name, expected) in &vision_constraints {
        total += 1;
        let matched = current_constraints
            .iter()
            .any(|(n, actual)| n == name && actual == expected);
        if matched {
            passed += 1;
        } else {
            missing_features.push(format!("Validation: {name}"));
        }
    }

    // Vision property presence, one check each
    let mut props_total = 0;
    let mut props_present = 0;
    if let Some(props) = vision.properties() {
        for prop in props {
            props_total += 1;
            total += 1;
            let present = current.and_then(|c| c.find_property(&prop.name)).is_some();
            if present {
                props_present += 1;
                passed += 1;
            } else {
                let annotation = prop
                    .node
                    .title
                    .as_deref()
                    .or(prop.node.description.as_deref());
                missing_features.push(match annotation {
                    Some(text) => format!("Property: {} ({})", prop.name, text),
                    None => format!("Property: {}", prop.name),
                });
            }
        }
    }

    // Array items
    let items_ok = match (&vision.kind, current.map(|c| &c.kind)) {
        (SchemaKind::Array { items: Some(v), .. }, Some(SchemaKind::Array { items: Some(c), .. })) => {
            items_equivalent(v, c)
        }
        (SchemaKind::Array { items: Some(_), .. }, _) => false,
        _ => true,
    };
    if !items_ok {
        missing_features.push("Array items".to_string());
    }

    // Union variants: vision variant count as checks, overlap as passed
    let mut variants_ok = true;
    if let Some(vision_variants) = vision.variants() {
        let current_len = current.and_then(|c| c.variants()).map(|v| v.len()).unwrap_or(0);
        total += vision_variants.len();
        passed += current_len.min(vision_variants.len());
        if current_len < vision_variants.len() {
            variants_ok = false;
            let gap = vision_variants.len() - current_len;
            missing_features.push(format!("Union variants: {gap} missing"));
        }
    }

    CheckOutcome {
        total,
        passed,
        missing_features,
        props_total,
        props_present,
        items_ok,
        variants_ok,
    }
}

fn decide_status(current: Option<&SchemaNode>, vision: &SchemaNode, checks: &CheckOutcome) -> Status {
    let current = match current {
        Some(c) => c,
        None => return Status::Missing,
    };
    if !current.declares_type() {
        return Status::Missing;
    }

    let type_ok = current.kind_name() == vision.kind_name();
    let required_ok = match vision.required() {
        None => true,
        Some([]) => true,
        Some(vision_required) => {
            let current_required = current.required().unwrap_or(&[]);
            json!(vision_required) == json!(current_required)
        }
    };

    if checks.props_total > 0 {
        // Property presence governs object-shaped nodes
        if checks.props_present == 0 {
            return Status::Missing;
        }
        if checks.props_present == checks.props_total
            && type_ok
            && required_ok
            && checks.items_ok
            && checks.variants_ok
        {
            return Status::Complete;
        }
        return Status::Partial;
    }

    if type_ok && required_ok && checks.items_ok && checks.variants_ok {
        Status::Complete
    } else {
        Status::Partial
    }
}

/// The eight scoreable constraint fields, extracted as JSON values so both
/// sides compare through the same representation
fn constraint_fields(node: &SchemaNode) -> Vec<(&'static str, Value)> {
    let mut fields = Vec::new();
    match &node.kind {
        SchemaKind::String(c) => {
            if let Some(p) = &c.pattern {
                fields.push(("pattern", json!(p)));
            }
            if let Some(n) = c.min_length {
                fields.push(("minLength", json!(n)));
            }
            if let Some(n) = c.max_length {
                fields.push(("maxLength", json!(n)));
            }
        }
        SchemaKind::Number(c) => {
            if let Some(n) = c.minimum {
                fields.push(("minimum", json!(n)));
            }
            if let Some(n) = c.maximum {
                fields.push(("maximum", json!(n)));
            }
        }
        SchemaKind::Array {
            min_items,
            max_items,
            ..
        } => {
            if let Some(n) = min_items {
                fields.push(("minItems", json!(n)));
            }
            if let Some(n) = max_items {
                fields.push(("maxItems", json!(n)));
            }
        }
        SchemaKind::Enum { values } => {
            fields.push(("enum", Value::Array(values.clone())));
        }
        _ => {}
    }
    fields
}

fn items_equivalent(vision: &ArrayItems, current: &ArrayItems) -> bool {
    match (vision, current) {
        (ArrayItems::Single(v), ArrayItems::Single(c)) => v.kind == c.kind,
        (ArrayItems::Tuple(v), ArrayItems::Tuple(c)) => {
            v.len() == c.len() && v.iter().zip(c).all(|(a, b)| a.kind == b.kind)
        }
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Complexity
// ---------------------------------------------------------------------------

/// Recursive complexity score: +10 object, +5 array, +10 per property plus
/// half its own score, +5 per constraint field, +15 per union variant plus
/// 0.3x its score, +10 per surviving reference marker. Array items count as
/// a half-weight child, like a property.
fn complexity(node: &SchemaNode) -> f64 {
    let mut score = 0.0;

    match &node.kind {
        SchemaKind::Object { properties, .. } => {
            score += 10.0;
            for prop in properties {
                score += 10.0 + 0.5 * complexity(&prop.node);
            }
        }
        SchemaKind::Array { items, .. } => {
            score += 5.0;
            match items {
                Some(ArrayItems::Single(item)) => score += 0.5 * complexity(item),
                Some(ArrayItems::Tuple(nodes)) => {
                    for item in nodes {
                        score += 0.5 * complexity(item);
                    }
                }
                None => {}
            }
        }
        SchemaKind::Union { variants, .. } => {
            for variant in variants {
                score += 15.0 + 0.3 * complexity(variant);
            }
        }
        SchemaKind::Reference { .. } => {
            score += 10.0;
        }
        _ => {}
    }

    score += 5.0 * constraint_fields(node).len() as f64;
    score
}

// ---------------------------------------------------------------------------
// Tree walking
// ---------------------------------------------------------------------------

fn walk_children(
    path: &str,
    current: Option<&SchemaNode>,
    vision: &SchemaNode,
    statuses: &mut Vec<PropertyStatus>,
) {
    match &vision.kind {
        SchemaKind::Object { properties, .. } => {
            for prop in properties {
                let child_path = format!("{path}.{}", prop.name);
                let current_child = current.and_then(|c| c.find_property(&prop.name));
                statuses.push(classify(&child_path, current_child, &prop.node));
                walk_children(&child_path, current_child, &prop.node, statuses);
            }
        }
        SchemaKind::Array { items: Some(ArrayItems::Single(item)), .. } => {
            // Items share the array's path; variant items expand below it
            let current_item = current.and_then(|c| c.item_node());
            walk_children(path, current_item, item, statuses);
        }
        SchemaKind::Union { variants, .. } => {
            for variant in variants {
                let Some(label) = variant_label(variant) else {
                    continue;
                };
                let child_path = format!("{path}.{label}");
                let current_variant = current
                    .and_then(|c| c.variants())
                    .and_then(|vs| {
                        vs.iter()
                            .find(|v| variant_label(v).as_deref() == Some(label.as_str()))
                    });
                statuses.push(classify(&child_path, current_variant, variant));
                walk_children(&child_path, current_variant, variant, statuses);
            }
        }
        _ => {}
    }
}

/// Kebab-cased label for an array-item variant: the `type` const when the
/// variant declares one, otherwise its title
fn variant_label(variant: &SchemaNode) -> Option<String> {
    variant
        .find_property("type")
        .and_then(|t| t.const_str().map(String::from))
        .or_else(|| variant.title.clone())
        .map(|s| to_kebab_case(&s))
}

/// Flatten a trigger/action definition into one status per discriminant-pair
/// variant, instead of treating the definition as one opaque node
fn expand_trigger_action(
    name: &str,
    current_def: Option<&SchemaNode>,
    vision_def: &SchemaNode,
    statuses: &mut Vec<PropertyStatus>,
) {
    let Some(groups) = vision_def.variants() else {
        statuses.push(classify(name, current_def, vision_def));
        return;
    };

    for group in groups {
        let leaves: Vec<&SchemaNode> = match group.variants() {
            Some(nested) => nested.iter().collect(),
            None => vec![group],
        };
        for variant in leaves {
            let Some((a, b)) = discriminant_pair(variant) else {
                continue;
            };
            let path = format!("{name}.{}.{}", to_kebab_case(&a), to_kebab_case(&b));
            let current_variant = current_def.and_then(|def| locate_variant(def, &a, &b));
            statuses.push(classify(&path, current_variant, variant));
        }
    }
}

/// The first two const-valued string properties of a variant, in
/// declaration order (e.g. service + event)
fn discriminant_pair(variant: &SchemaNode) -> Option<(String, String)> {
    let props = variant.properties()?;
    let mut consts = props.iter().filter_map(|p| p.node.const_str());
    let a = consts.next()?.to_string();
    let b = consts.next()?.to_string();
    Some((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: Value) -> SchemaNode {
        SchemaNode::from_value(&value)
    }

    #[test]
    fn test_absent_current_is_missing_at_zero() {
        let vision = node(json!({ "type": "string", "minLength": 1 }));
        let status = classify("name", None, &vision);
        assert_eq!(status.status, Status::Missing);
        assert_eq!(status.completion_percent, 0);
        assert!(status
            .missing_features
            .iter()
            .any(|f| f == "Validation: minLength"));
    }

    #[test]
    fn test_empty_current_object_is_missing() {
        let current = node(json!({ "type": "object", "properties": {} }));
        let vision = node(json!({
            "type": "object",
            "properties": { "title": { "type": "string" } }
        }));
        let status = classify("pages", Some(&current), &vision);
        assert_eq!(status.status, Status::Missing);
        assert_eq!(status.completion_percent, 0);
        assert_eq!(status.missing_features, vec!["Property: title".to_string()]);
    }

    #[test]
    fn test_partial_when_some_properties_present() {
        let current = node(json!({
            "type": "object",
            "properties": { "title": { "type": "string" } }
        }));
        let vision = node(json!({
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "icon": { "type": "string", "title": "Icon name" }
            }
        }));
        let status = classify("pages", Some(&current), &vision);
        assert_eq!(status.status, Status::Partial);
        // Checks: type (pass), title (pass), icon (fail) = 2/3
        assert_eq!(status.completion_percent, 67);
        assert_eq!(
            status.missing_features,
            vec!["Property: icon (Icon name)".to_string()]
        );
    }

    #[test]
    fn test_complete_match_scores_100() {
        let shape = json!({
            "type": "object",
            "properties": { "name": { "type": "string", "minLength": 1 } },
            "required": ["name"]
        });
        let status = classify("tables", Some(&node(shape.clone())), &node(shape));
        assert_eq!(status.status, Status::Complete);
        assert_eq!(status.completion_percent, 100);
        assert!(status.missing_features.is_empty());
    }

    #[test]
    fn test_trivial_node_scores_100() {
        let vision = node(json!({ "type": "boolean" }));
        let status = classify("flag", Some(&node(json!({ "type": "boolean" }))), &vision);
        assert_eq!(status.completion_percent, 100);
        assert_eq!(status.status, Status::Complete);
    }

    #[test]
    fn test_required_mismatch_blocks_complete() {
        let current = node(json!({
            "type": "object",
            "properties": { "name": { "type": "string" } },
            "required": []
        }));
        let vision = node(json!({
            "type": "object",
            "properties": { "name": { "type": "string" } },
            "required": ["name"]
        }));
        let status = classify("tables", Some(&current), &vision);
        assert_eq!(status.status, Status::Partial);
    }

    #[test]
    fn test_array_items_difference_is_partial() {
        let current = node(json!({ "type": "array", "items": { "type": "string" } }));
        let vision = node(json!({ "type": "array", "items": { "type": "object" } }));
        let status = classify("tags", Some(&current), &vision);
        assert_eq!(status.status, Status::Partial);
        assert!(status.missing_features.iter().any(|f| f == "Array items"));
    }

    #[test]
    fn test_union_variant_overlap_partial_credit() {
        let current = node(json!({ "anyOf": [ { "type": "object" } ] }));
        let vision = node(json!({
            "anyOf": [ { "type": "object" }, { "type": "object" }, { "type": "object" } ]
        }));
        let status = classify("pages", Some(&current), &vision);
        // Checks: 3 variants, 1 matched
        assert_eq!(status.completion_percent, 33);
        assert!(status
            .missing_features
            .iter()
            .any(|f| f == "Union variants: 2 missing"));
    }

    #[test]
    fn test_complexity_weights() {
        let vision = node(json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "minLength": 1 }
            }
        }));
        // object 10 + property 10 + 0.5 * (minLength 5) = 22.5 -> 23
        let status = classify("tables", None, &vision);
        assert_eq!(status.complexity, 23);
    }

    #[test]
    fn test_unresolved_ref_bumps_complexity() {
        let vision = node(json!({ "$ref": "missing.json" }));
        let status = classify("x", None, &vision);
        assert_eq!(status.complexity, 10);
    }

    #[test]
    fn test_diff_trees_expands_trigger_variants() {
        let vision = node(json!({
            "type": "object",
            "properties": {},
            "definitions": {
                "automation_trigger": {
                    "anyOf": [
                        {
                            "anyOf": [
                                {
                                    "type": "object",
                                    "properties": {
                                        "service": { "const": "http" },
                                        "event": { "const": "post" }
                                    }
                                }
                            ]
                        }
                    ]
                }
            }
        }));
        let statuses = diff_trees(None, &vision);
        assert!(statuses.iter().any(|s| s.path == "automation_trigger.http.post"));
    }

    #[test]
    fn test_summarize_counts_and_sorted_paths() {
        let vision = node(json!({
            "type": "object",
            "properties": {
                "zeta": { "type": "string" },
                "alpha": { "type": "string" }
            }
        }));
        let current = node(json!({
            "type": "object",
            "properties": {
                "zeta": { "type": "string" },
                "alpha": { "type": "string" }
            }
        }));
        let statuses = diff_trees(Some(&current), &vision);
        let report = summarize(&statuses);
        assert_eq!(report.total_properties, statuses.len());
        assert_eq!(report.missing_properties, 0);
        let mut sorted = report.implemented_property_paths.clone();
        sorted.sort();
        assert_eq!(report.implemented_property_paths, sorted);
    }
}
