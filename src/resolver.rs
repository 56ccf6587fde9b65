//! Reference Resolver
//!
//! Dereferences `$ref` pointers in raw schema JSON, including cross-file
//! references with optional `#/a/b/c` fragments, producing a fully inlined
//! tree. Resolution is best-effort: unreadable files, unparseable content,
//! dead fragment pointers, and reference cycles all leave the `$ref` in
//! place and continue with the siblings. Callers detect incomplete subtrees
//! by looking for surviving `$ref` keys, never by catching an error.
//!
//! All mutable state lives in a per-run [`ResolveContext`]; contexts must
//! not be shared between unrelated resolution runs, since cached content is
//! resolved against the base path of the run that loaded it.

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};

/// Per-run resolution state: the file cache and the in-flight guard set
#[derive(Debug, Default)]
pub struct ResolveContext {
    /// Fully resolved file content keyed by normalized absolute path
    cache: HashMap<PathBuf, Value>,
    /// Files currently being resolved; a `$ref` into this set is a cycle
    in_flight: HashSet<PathBuf>,
}

/// One resolution run over a reference graph
#[derive(Debug, Default)]
pub struct Resolver {
    ctx: ResolveContext,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files loaded and cached during this run
    pub fn cached_files(&self) -> usize {
        self.ctx.cache.len()
    }

    /// Load a schema file and resolve every reachable `$ref`.
    ///
    /// The entry file itself joins the guard set before its content is
    /// walked, so a two-file cycle terminates with the back-edge left
    /// unresolved instead of recursing forever.
    pub fn resolve_file(&mut self, path: &Path) -> Result<Value> {
        let abs = normalize_path(&std::env::current_dir()?.join(path));
        let content = fs::read_to_string(&abs)
            .map_err(|_| PipelineError::SchemaNotFound(abs.display().to_string()))?;
        let mut json: Value = serde_json::from_str(&content)?;

        let base_dir = abs.parent().unwrap_or(Path::new("/")).to_path_buf();
        self.ctx.in_flight.insert(abs.clone());
        self.resolve_value(&mut json, &base_dir);
        self.ctx.in_flight.remove(&abs);
        self.ctx.cache.insert(abs, json.clone());

        Ok(json)
    }

    /// Resolve every `$ref` reachable from `value`, relative to `base_dir`.
    ///
    /// Same-document references (`#/...`) are left as-is; they are resolved
    /// by the consumer against the enclosing document's `definitions`.
    pub fn resolve_value(&mut self, value: &mut Value, base_dir: &Path) {
        match value {
            Value::Object(_) => {
                let spliced = self.try_splice_ref(value, base_dir);
                // A successful splice inserts content that was already fully
                // resolved against its own base path; re-walking it would
                // retry refs that were intentionally left broken at a cycle.
                if !spliced {
                    if let Value::Object(map) = value {
                        for child in map.values_mut() {
                            self.resolve_value(child, base_dir);
                        }
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.resolve_value(item, base_dir);
                }
            }
            _ => {}
        }
    }

    /// Attempt to replace a node's `$ref` with the referenced content.
    ///
    /// Returns true only when content was spliced in. On any failure the
    /// node is left untouched (its `$ref` stays observable) and the method
    /// returns false so the caller keeps walking siblings.
    fn try_splice_ref(&mut self, node: &mut Value, base_dir: &Path) -> bool {
        let ref_str = match node.get("$ref").and_then(|v| v.as_str()) {
            Some(r) => r.to_string(),
            None => return false,
        };

        // Same-document pointer: not ours to resolve
        if ref_str.starts_with('#') {
            return false;
        }

        let (file_part, fragment) = match ref_str.split_once('#') {
            Some((file, frag)) => (file, Some(frag)),
            None => (ref_str.as_str(), None),
        };

        let abs = normalize_path(&base_dir.join(file_part));

        if self.ctx.in_flight.contains(&abs) {
            debug!(path = %abs.display(), "reference cycle, leaving $ref unresolved");
            return false;
        }

        let resolved = match self.ctx.cache.get(&abs) {
            Some(cached) => {
                debug!(path = %abs.display(), "cache hit");
                cached.clone()
            }
            None => {
                let content = match fs::read_to_string(&abs) {
                    Ok(c) => c,
                    Err(err) => {
                        warn!(path = %abs.display(), %err, "unreadable reference target, leaving $ref unresolved");
                        return false;
                    }
                };
                let mut json: Value = match serde_json::from_str(&content) {
                    Ok(j) => j,
                    Err(err) => {
                        warn!(path = %abs.display(), %err, "unparseable reference target, leaving $ref unresolved");
                        return false;
                    }
                };

                let file_base = abs.parent().unwrap_or(Path::new("/")).to_path_buf();
                self.ctx.in_flight.insert(abs.clone());
                self.resolve_value(&mut json, &file_base);
                self.ctx.in_flight.remove(&abs);
                self.ctx.cache.insert(abs.clone(), json.clone());
                json
            }
        };

        let narrowed = match fragment {
            Some(frag) => match walk_fragment(&resolved, frag) {
                Some(v) => v.clone(),
                None => {
                    warn!(path = %abs.display(), fragment = frag, "missing fragment segment, leaving $ref unresolved");
                    return false;
                }
            },
            None => resolved,
        };

        splice(node, narrowed);
        true
    }
}

/// Collect every cross-file `$ref` still present in a tree. A non-empty
/// result after resolution marks the tree as incomplete.
pub fn unresolved_refs(value: &Value) -> Vec<String> {
    let mut refs = Vec::new();
    collect_unresolved(value, &mut refs);
    refs
}

fn collect_unresolved(value: &Value, refs: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let Some(target) = map.get("$ref").and_then(|v| v.as_str()) {
                if !target.starts_with('#') {
                    refs.push(target.to_string());
                }
            }
            for child in map.values() {
                collect_unresolved(child, refs);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_unresolved(item, refs);
            }
        }
        _ => {}
    }
}

/// Walk slash-separated fragment segments into resolved content
fn walk_fragment<'a>(content: &'a Value, fragment: &str) -> Option<&'a Value> {
    let mut current = content;
    for segment in fragment.split('/').filter(|s| !s.is_empty()) {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Replace a node's `$ref` with resolved content.
///
/// Object content merges key-by-key without overwriting siblings already on
/// the node, so annotations authored next to the `$ref` (stories, titles)
/// survive. Non-object content replaces the node wholesale.
fn splice(node: &mut Value, content: Value) {
    match content {
        Value::Object(incoming) => {
            if let Value::Object(map) = node {
                map.remove("$ref");
                for (key, value) in incoming {
                    map.entry(key).or_insert(value);
                }
            }
        }
        other => *node = other,
    }
}

/// Lexically normalize a path: resolve `.` and `..` without touching the
/// filesystem, so missing targets still produce a stable cache key
fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}
