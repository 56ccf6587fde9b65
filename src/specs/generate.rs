//! Mechanical Scenario Synthesis
//!
//! When no story was authored for a behavior, an equivalent scenario is
//! synthesized directly from constraint metadata: one per required field,
//! per declared constraint, per object sub-field, and per union variant.
//! Every property additionally gets exactly one regression scenario
//! narrating the full configuration workflow, and properties on the
//! critical allow-list get one extra minimal happy-path scenario.

use crate::schema::{ArrayItems, SchemaKind, SchemaNode};

use super::{BehavioralScenario, ScenarioTag};

/// Synthesize mechanical scenarios for one property path
pub fn synthesize(path: &str, node: &SchemaNode, critical: &[String]) -> Vec<BehavioralScenario> {
    let mut scenarios = Vec::new();

    required_field_scenarios(path, node, &mut scenarios);
    constraint_scenarios(path, node, &mut scenarios);
    sub_field_scenarios(path, node, &mut scenarios);
    variant_scenarios(path, node, &mut scenarios);

    // Exactly one regression scenario per property
    scenarios.push(BehavioralScenario {
        given: format!("a complete {path} configuration exists"),
        when: "the full configuration workflow runs end to end".to_string(),
        then: "every configured behavior should keep working".to_string(),
        tag: ScenarioTag::Regression,
    });

    if critical.iter().any(|c| c == path) {
        scenarios.push(BehavioralScenario {
            given: format!("a minimal valid {path} configuration"),
            when: "the configuration is applied".to_string(),
            then: format!("the {path} feature should be usable immediately"),
            tag: ScenarioTag::Spec,
        });
    }

    scenarios
}

fn required_field_scenarios(path: &str, node: &SchemaNode, out: &mut Vec<BehavioralScenario>) {
    let Some(required) = node.required() else {
        return;
    };
    for field in required {
        out.push(spec(
            format!("a {path} configuration is being created"),
            format!("the required field '{field}' is left empty"),
            "the configuration should be rejected with a validation error".to_string(),
        ));
    }
}

fn constraint_scenarios(path: &str, node: &SchemaNode, out: &mut Vec<BehavioralScenario>) {
    match &node.kind {
        SchemaKind::String(c) => {
            if let Some(n) = c.min_length {
                out.push(spec(
                    format!("a value is entered for {path}"),
                    format!("the value is shorter than {n} character(s)"),
                    "a length validation error should be shown".to_string(),
                ));
            }
            if let Some(n) = c.max_length {
                out.push(spec(
                    format!("a value is entered for {path}"),
                    format!("the value exceeds {n} character(s)"),
                    "a length validation error should be shown".to_string(),
                ));
            }
            if c.pattern.is_some() {
                out.push(spec(
                    format!("a value is entered for {path}"),
                    "the value does not match the expected format".to_string(),
                    "a format validation error should be shown".to_string(),
                ));
            }
        }
        SchemaKind::Number(c) => {
            if let Some(n) = c.minimum.or(c.exclusive_minimum) {
                out.push(spec(
                    format!("a number is entered for {path}"),
                    format!("the number is below {n}"),
                    "a range validation error should be shown".to_string(),
                ));
            }
            if let Some(n) = c.maximum.or(c.exclusive_maximum) {
                out.push(spec(
                    format!("a number is entered for {path}"),
                    format!("the number is above {n}"),
                    "a range validation error should be shown".to_string(),
                ));
            }
        }
        SchemaKind::Array {
            min_items,
            max_items,
            ..
        } => {
            if let Some(n) = min_items {
                out.push(spec(
                    format!("items are added to {path}"),
                    format!("fewer than {n} item(s) are present"),
                    "a minimum-count validation error should be shown".to_string(),
                ));
            }
            if let Some(n) = max_items {
                out.push(spec(
                    format!("items are added to {path}"),
                    format!("more than {n} item(s) are present"),
                    "a maximum-count validation error should be shown".to_string(),
                ));
            }
        }
        SchemaKind::Enum { values } => {
            out.push(spec(
                format!("an option is chosen for {path}"),
                "a value outside the allowed options is submitted".to_string(),
                format!("only the {} declared option(s) should be accepted", values.len()),
            ));
        }
        _ => {}
    }
}

fn sub_field_scenarios(path: &str, node: &SchemaNode, out: &mut Vec<BehavioralScenario>) {
    let Some(properties) = node.properties() else {
        return;
    };
    for prop in properties {
        out.push(spec(
            format!("a {path} configuration is being edited"),
            format!("the '{}' field is set to a valid value", prop.name),
            "the value should be accepted and persisted".to_string(),
        ));
    }
}

fn variant_scenarios(path: &str, node: &SchemaNode, out: &mut Vec<BehavioralScenario>) {
    let variants = match &node.kind {
        SchemaKind::Union { variants, .. } => variants,
        SchemaKind::Array {
            items: Some(ArrayItems::Single(item)),
            ..
        } => match &item.kind {
            SchemaKind::Union { variants, .. } => variants,
            _ => return,
        },
        _ => return,
    };

    for (index, variant) in variants.iter().enumerate() {
        let label = variant
            .title
            .clone()
            .or_else(|| {
                variant
                    .find_property("type")
                    .and_then(|t| t.const_str().map(String::from))
            })
            .unwrap_or_else(|| format!("variant {}", index + 1));
        out.push(spec(
            format!("a {path} entry is being configured"),
            format!("the '{label}' variant is selected"),
            "the variant-specific fields should be validated and saved".to_string(),
        ));
    }
}

fn spec(given: String, when: String, then: String) -> BehavioralScenario {
    BehavioralScenario {
        given,
        when,
        then,
        tag: ScenarioTag::Spec,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: serde_json::Value) -> SchemaNode {
        SchemaNode::from_value(&value)
    }

    #[test]
    fn test_exactly_one_regression_scenario() {
        let n = node(json!({ "type": "string" }));
        let scenarios = synthesize("name", &n, &[]);
        let regressions = scenarios
            .iter()
            .filter(|s| s.tag == ScenarioTag::Regression)
            .count();
        assert_eq!(regressions, 1);
    }

    #[test]
    fn test_constraint_scenarios_per_field() {
        let n = node(json!({ "type": "string", "minLength": 1, "maxLength": 40 }));
        let scenarios = synthesize("tables.name", &n, &[]);
        // min + max + regression
        assert_eq!(scenarios.len(), 3);
    }

    #[test]
    fn test_required_and_sub_field_scenarios() {
        let n = node(json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "icon": { "type": "string" }
            },
            "required": ["name"]
        }));
        let scenarios = synthesize("pages", &n, &[]);
        // 1 required + 2 sub-fields + 1 regression
        assert_eq!(scenarios.len(), 4);
        assert!(scenarios
            .iter()
            .any(|s| s.when.contains("required field 'name'")));
    }

    #[test]
    fn test_union_variant_scenarios() {
        let n = node(json!({
            "anyOf": [
                { "title": "HTTP trigger" },
                { "properties": { "type": { "const": "schedule" } } }
            ]
        }));
        let scenarios = synthesize("automations", &n, &[]);
        assert!(scenarios.iter().any(|s| s.when.contains("'HTTP trigger'")));
        assert!(scenarios.iter().any(|s| s.when.contains("'schedule'")));
    }

    #[test]
    fn test_critical_property_gets_happy_path() {
        let n = node(json!({ "type": "array" }));
        let critical = vec!["tables".to_string()];
        let with = synthesize("tables", &n, &critical);
        let without = synthesize("pages", &n, &critical);
        assert_eq!(with.len(), without.len() + 1);
        assert!(with
            .iter()
            .any(|s| s.tag == ScenarioTag::Spec && s.given.contains("minimal valid")));
    }
}
