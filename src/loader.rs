//! Schema Directory Loading
//!
//! Walks a schema directory, parses every JSON file, computes a bundle
//! hash over the raw bytes, and validates the `specs` arrays attached to
//! collection-defining nodes (ids follow `PREFIX-ENTITY-NNN` and must be
//! unique within their source file).

use regex::Regex;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{PipelineError, Result};
use crate::schema::SPECS_KEY;

/// One loaded schema file, unresolved
#[derive(Debug, Clone)]
pub struct SchemaSource {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Path relative to the loaded directory
    pub relative_path: PathBuf,
    /// Raw parsed content
    pub json: Value,
}

/// All schema files under one directory
#[derive(Debug)]
pub struct SchemaBundle {
    pub sources: Vec<SchemaSource>,
    /// SHA-256 over the raw bytes of every loaded file, in path order
    pub bundle_hash: String,
    /// Spec-id convention violations found while loading
    pub spec_violations: Vec<PipelineError>,
}

impl SchemaBundle {
    /// Find a source by file name (e.g. the configured root file)
    pub fn find(&self, file_name: &str) -> Option<&SchemaSource> {
        self.sources
            .iter()
            .find(|s| s.path.file_name().map(|n| n == file_name).unwrap_or(false))
    }
}

/// Load every `.json` file under a directory, in sorted path order
pub fn load_directory(dir: &Path) -> Result<SchemaBundle> {
    let id_pattern = Regex::new(r"^[A-Z0-9]+-[A-Z0-9]+-\d{3}$").expect("id pattern is valid");

    let mut sources = Vec::new();
    let mut spec_violations = Vec::new();
    let mut hasher = Sha256::new();

    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || path.extension().map(|e| e != "json").unwrap_or(true) {
            continue;
        }

        let content = fs::read_to_string(path)?;
        hasher.update(content.as_bytes());

        let json: Value = serde_json::from_str(&content).map_err(|e| {
            PipelineError::InvalidFormat {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        let relative_path = path.strip_prefix(dir).unwrap_or(path).to_path_buf();
        let display = relative_path.display().to_string();
        check_spec_ids(&json, &display, &id_pattern, &mut spec_violations);

        sources.push(SchemaSource {
            path: path.to_path_buf(),
            relative_path,
            json,
        });
    }

    Ok(SchemaBundle {
        sources,
        bundle_hash: format!("{:x}", hasher.finalize()),
        spec_violations,
    })
}

/// Validate every `specs` array in a file: well-formed ids, unique per file
fn check_spec_ids(
    json: &Value,
    file: &str,
    id_pattern: &Regex,
    violations: &mut Vec<PipelineError>,
) {
    let mut seen: HashSet<String> = HashSet::new();
    collect_spec_ids(json, file, id_pattern, &mut seen, violations);
}

fn collect_spec_ids(
    value: &Value,
    file: &str,
    id_pattern: &Regex,
    seen: &mut HashSet<String>,
    violations: &mut Vec<PipelineError>,
) {
    match value {
        Value::Object(obj) => {
            if let Some(entries) = obj.get(SPECS_KEY).and_then(|v| v.as_array()) {
                for entry in entries {
                    let Some(id) = entry.get("id").and_then(|v| v.as_str()) else {
                        continue;
                    };
                    if !id_pattern.is_match(id) {
                        violations.push(PipelineError::MalformedSpecId {
                            id: id.to_string(),
                            path: file.to_string(),
                        });
                    }
                    if !seen.insert(id.to_string()) {
                        violations.push(PipelineError::DuplicateSpecId {
                            id: id.to_string(),
                            path: file.to_string(),
                        });
                    }
                }
            }
            for child in obj.values() {
                collect_spec_ids(child, file, id_pattern, seen, violations);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_spec_ids(item, file, id_pattern, seen, violations);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(dir: &Path, name: &str, value: &Value) {
        fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    #[test]
    fn test_load_directory_hashes_and_parses() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.json", &json!({ "type": "object" }));
        write(dir.path(), "b.json", &json!({ "type": "array" }));

        let bundle = load_directory(dir.path()).unwrap();
        assert_eq!(bundle.sources.len(), 2);
        assert_eq!(bundle.bundle_hash.len(), 64);
        assert!(bundle.find("a.json").is_some());
        assert!(bundle.spec_violations.is_empty());
    }

    #[test]
    fn test_bundle_hash_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.json", &json!({ "x": 1 }));
        let first = load_directory(dir.path()).unwrap().bundle_hash;
        let second = load_directory(dir.path()).unwrap().bundle_hash;
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_spec_id_reported() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "app.json",
            &json!({
                "specs": [
                    { "id": "TBL-TABLE-001", "title": "t", "given": "g", "when": "w", "then": "t" },
                    { "id": "TBL-TABLE-001", "title": "t", "given": "g", "when": "w", "then": "t" }
                ]
            }),
        );

        let bundle = load_directory(dir.path()).unwrap();
        assert_eq!(bundle.spec_violations.len(), 1);
        assert!(matches!(
            bundle.spec_violations[0],
            PipelineError::DuplicateSpecId { .. }
        ));
    }

    #[test]
    fn test_malformed_spec_id_reported() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "app.json",
            &json!({
                "definitions": {
                    "table": {
                        "specs": [
                            { "id": "tbl-1", "title": "t", "given": "g", "when": "w", "then": "t" }
                        ]
                    }
                }
            }),
        );

        let bundle = load_directory(dir.path()).unwrap();
        assert_eq!(bundle.spec_violations.len(), 1);
        assert!(matches!(
            bundle.spec_violations[0],
            PipelineError::MalformedSpecId { .. }
        ));
    }

    #[test]
    fn test_same_id_in_different_files_is_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let entry = json!({
            "specs": [
                { "id": "PGS-PAGE-001", "title": "t", "given": "g", "when": "w", "then": "t" }
            ]
        });
        write(dir.path(), "a.json", &entry);
        write(dir.path(), "b.json", &entry);

        let bundle = load_directory(dir.path()).unwrap();
        assert!(bundle.spec_violations.is_empty());
    }
}
