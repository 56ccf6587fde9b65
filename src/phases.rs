//! Phase Planner
//!
//! Buckets the differ's PropertyStatus list into ordered release phases.
//! Completed paths form phase 0; the rest are grouped by the name-based
//! heuristics in [`crate::policy`], with a catch-all phase at the end.
//! Versions run `v0.<n>.0` from the package's current version, and the
//! final phase is always `v1.0.0`.

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::diff::{PropertyStatus, Status};
use crate::policy;
use crate::schema::SchemaNode;

/// One ordered release increment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    pub number: u32,
    pub name: String,
    /// Version label, e.g. `v0.5.0`
    pub version: String,
    pub properties: Vec<PropertyStatus>,
    /// Mean completion of member properties
    pub completion_percent: u8,
    /// Coarse duration bucket from summed complexity
    pub duration_estimate: String,
    /// Dependency paths owned by earlier phases
    pub dependencies: Vec<String>,
    /// Numbers of the phases those paths belong to
    pub depends_on_phases: Vec<u32>,
}

/// Group property statuses into ordered release phases
pub fn plan(
    statuses: &[PropertyStatus],
    vision_root: &SchemaNode,
    package_version: &Version,
) -> Vec<Phase> {
    let mut buckets: Vec<(String, Vec<PropertyStatus>)> = Vec::new();

    // Phase 0: everything already complete
    let done: Vec<PropertyStatus> = statuses
        .iter()
        .filter(|s| s.status == Status::Complete)
        .cloned()
        .collect();
    if !done.is_empty() {
        buckets.push(("Done".to_string(), done));
    }

    let remaining: Vec<&PropertyStatus> = statuses
        .iter()
        .filter(|s| s.status != Status::Complete)
        .collect();

    // A large tables collection splits into foundation and advanced
    // sub-phases at 40%/60% of its complexity
    let split_tables = remaining
        .iter()
        .any(|s| policy::should_split_tables(&s.path, vision_root));

    let mut foundation = Vec::new();
    let mut advanced = Vec::new();
    let mut grouped: Vec<(&'static str, Vec<PropertyStatus>)> = Vec::new();

    for status in remaining {
        if split_tables && status.path == "tables" {
            let mut first = status.clone();
            first.complexity = (status.complexity as f64 * 0.4).round() as u32;
            foundation.push(first);
            let mut second = status.clone();
            second.complexity = (status.complexity as f64 * 0.6).round() as u32;
            advanced.push(second);
            continue;
        }
        if split_tables && status.path.starts_with("tables.") {
            foundation.push(status.clone());
            continue;
        }

        let group = policy::feature_group(&status.path);
        match grouped.iter_mut().find(|(name, _)| *name == group) {
            Some((_, members)) => members.push(status.clone()),
            None => grouped.push((group, vec![status.clone()])),
        }
    }

    if !foundation.is_empty() {
        buckets.push(("Data model foundation".to_string(), foundation));
    }
    if !advanced.is_empty() {
        buckets.push(("Data model advanced".to_string(), advanced));
    }

    // Named feature groups in a stable order, catch-all last
    let order = ["Data model", "Pages & views", "Automations", "Connections"];
    for name in order {
        if let Some(index) = grouped.iter().position(|(n, _)| *n == name) {
            let (_, members) = grouped.remove(index);
            buckets.push((name.to_string(), members));
        }
    }
    for (_, members) in grouped {
        buckets.push(("Everything else".to_string(), members));
    }

    assemble(buckets, package_version)
}

fn assemble(buckets: Vec<(String, Vec<PropertyStatus>)>, package_version: &Version) -> Vec<Phase> {
    let total = buckets.len();
    let mut phases: Vec<Phase> = buckets
        .into_iter()
        .enumerate()
        .map(|(index, (name, properties))| {
            let completion_percent = if properties.is_empty() {
                100
            } else {
                let sum: u32 = properties.iter().map(|p| p.completion_percent as u32).sum();
                (sum as f64 / properties.len() as f64).round() as u8
            };
            let complexity: u64 = properties.iter().map(|p| p.complexity as u64).sum();

            Phase {
                number: index as u32,
                name,
                version: version_label(package_version, index, total),
                completion_percent,
                duration_estimate: duration_estimate(complexity).to_string(),
                properties,
                dependencies: Vec::new(),
                depends_on_phases: Vec::new(),
            }
        })
        .collect();

    link_dependencies(&mut phases);
    phases
}

/// Map each property's dependency paths to the phase that owns that path,
/// recording edges only to preceding phases
fn link_dependencies(phases: &mut [Phase]) {
    let owners: Vec<(String, u32)> = phases
        .iter()
        .flat_map(|phase| {
            phase
                .properties
                .iter()
                .map(|p| (p.path.clone(), phase.number))
        })
        .collect();

    for phase in phases.iter_mut() {
        let mut dependencies = Vec::new();
        let mut depends_on = Vec::new();
        for property in &phase.properties {
            for dep in &property.dependencies {
                let owner = owners
                    .iter()
                    .find(|(path, _)| path == dep || path.starts_with(&format!("{dep}.")))
                    .map(|(_, number)| *number);
                if let Some(owner) = owner {
                    if owner < phase.number && !dependencies.contains(dep) {
                        dependencies.push(dep.clone());
                        if !depends_on.contains(&owner) {
                            depends_on.push(owner);
                        }
                    }
                }
            }
        }
        depends_on.sort_unstable();
        phase.dependencies = dependencies;
        phase.depends_on_phases = depends_on;
    }
}

/// Sequential `v0.<n>.0` labels: the first phase keeps the package's
/// current version, the last is forced to `v1.0.0`
fn version_label(package_version: &Version, index: usize, total: usize) -> String {
    if index + 1 == total && total > 1 {
        return "v1.0.0".to_string();
    }
    if index == 0 {
        return format!("v{package_version}");
    }
    let minor = package_version.minor + index as u64;
    format!("v{}.{}.0", package_version.major, minor)
}

/// Monotonic step function from summed complexity to a duration bucket
fn duration_estimate(complexity: u64) -> &'static str {
    match complexity {
        0..=49 => "1-2 weeks",
        50..=149 => "2-4 weeks",
        150..=299 => "4-6 weeks",
        300..=499 => "6-8 weeks",
        _ => "8+ weeks",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn status(path: &str, status_kind: Status, complexity: u32, deps: &[&str]) -> PropertyStatus {
        PropertyStatus {
            path: path.to_string(),
            status: status_kind,
            completion_percent: match status_kind {
                Status::Complete => 100,
                Status::Partial => 50,
                Status::Missing => 0,
            },
            missing_features: Vec::new(),
            complexity,
            dependencies: deps.iter().map(|d| d.to_string()).collect::<BTreeSet<_>>(),
        }
    }

    fn empty_root() -> SchemaNode {
        SchemaNode::from_value(&serde_json::json!({ "type": "object", "properties": {} }))
    }

    #[test]
    fn test_complete_entries_form_phase_zero() {
        let statuses = vec![
            status("settings", Status::Complete, 10, &[]),
            status("pages", Status::Missing, 80, &[]),
        ];
        let phases = plan(&statuses, &empty_root(), &Version::new(0, 4, 0));

        assert_eq!(phases[0].number, 0);
        assert_eq!(phases[0].name, "Done");
        assert_eq!(phases[0].properties[0].path, "settings");
        assert_eq!(phases[0].version, "v0.4.0");
    }

    #[test]
    fn test_last_phase_is_v1() {
        let statuses = vec![
            status("settings", Status::Complete, 10, &[]),
            status("tables", Status::Missing, 100, &[]),
            status("pages", Status::Partial, 60, &[]),
        ];
        let phases = plan(&statuses, &empty_root(), &Version::new(0, 4, 0));

        assert!(phases.len() >= 2);
        assert_eq!(phases.last().unwrap().version, "v1.0.0");
        // Intermediate phases count up from the package version
        if phases.len() > 2 {
            assert_eq!(phases[1].version, "v0.5.0");
        }
    }

    #[test]
    fn test_dependencies_map_to_owning_phase() {
        let statuses = vec![
            status("tables", Status::Missing, 100, &[]),
            status("automations", Status::Missing, 80, &["tables"]),
        ];
        let phases = plan(&statuses, &empty_root(), &Version::new(0, 4, 0));

        let automations = phases
            .iter()
            .find(|p| p.properties.iter().any(|s| s.path == "automations"))
            .unwrap();
        let tables = phases
            .iter()
            .find(|p| p.properties.iter().any(|s| s.path == "tables"))
            .unwrap();

        assert!(tables.number < automations.number);
        assert_eq!(automations.dependencies, vec!["tables".to_string()]);
        assert_eq!(automations.depends_on_phases, vec![tables.number]);
    }

    #[test]
    fn test_tables_split_into_foundation_and_advanced() {
        let vision = SchemaNode::from_value(&serde_json::json!({
            "type": "object",
            "properties": {},
            "definitions": {
                "table": {
                    "type": "object",
                    "properties": {
                        "fields": {
                            "type": "array",
                            "items": {
                                "anyOf": [
                                    { "properties": { "type": { "const": "single-line-text" } } },
                                    { "properties": { "type": { "const": "long-text" } } },
                                    { "properties": { "type": { "const": "number" } } },
                                    { "properties": { "type": { "const": "checkbox" } } },
                                    { "properties": { "type": { "const": "attachment" } } },
                                    { "properties": { "type": { "const": "relationship" } } }
                                ]
                            }
                        }
                    }
                }
            }
        }));
        let statuses = vec![status("tables", Status::Missing, 200, &[])];
        let phases = plan(&statuses, &vision, &Version::new(0, 4, 0));

        let foundation = phases.iter().find(|p| p.name == "Data model foundation").unwrap();
        let advanced = phases.iter().find(|p| p.name == "Data model advanced").unwrap();
        assert_eq!(foundation.properties[0].complexity, 80);
        assert_eq!(advanced.properties[0].complexity, 120);
        assert!(foundation.number < advanced.number);
    }

    #[test]
    fn test_duration_buckets_are_monotonic() {
        assert_eq!(duration_estimate(10), "1-2 weeks");
        assert_eq!(duration_estimate(100), "2-4 weeks");
        assert_eq!(duration_estimate(200), "4-6 weeks");
        assert_eq!(duration_estimate(400), "6-8 weeks");
        assert_eq!(duration_estimate(900), "8+ weeks");
    }
}
