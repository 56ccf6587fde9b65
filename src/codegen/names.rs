//! Identifier naming utilities
//!
//! Property paths are dot-joined (`automation_trigger.http.post`); generated
//! modules need a PascalCase identifier per path and a kebab-case file name.
//! Word splitting treats `-`, `_`, spaces, and camelCase boundaries the same
//! way everywhere so the differ, codegen, and spec generator agree on names.

/// Convert a single token to PascalCase
pub fn to_pascal_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = true;

    for c in s.chars() {
        if c == '_' || c == '-' || c == ' ' || c == '.' {
            capitalize_next = true;
        } else if !c.is_ascii_alphanumeric() {
            // Drop anything that cannot appear in an identifier
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }

    result
}

/// Convert a token to kebab-case, splitting camelCase boundaries
pub fn to_kebab_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;

    for c in s.chars() {
        if c == '_' || c == ' ' || c == '.' || c == '-' {
            if !result.ends_with('-') && !result.is_empty() {
                result.push('-');
            }
            prev_lower = false;
        } else if c.is_ascii_uppercase() {
            if prev_lower && !result.ends_with('-') {
                result.push('-');
            }
            result.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_lower = c.is_ascii_lowercase();
        }
    }

    result.trim_matches('-').to_string()
}

/// PascalCase identifier for a dot-separated property path.
///
/// Each segment's internal `-`/`_` words are capitalized too:
/// `automation_trigger.http.post` -> `AutomationTriggerHttpPost`.
pub fn identifier_for_path(path: &str) -> String {
    let mut identifier: String = path.split('.').map(to_pascal_case).collect();
    // Identifiers must start with a letter
    if identifier
        .chars()
        .next()
        .map(|c| c.is_ascii_digit())
        .unwrap_or(true)
    {
        identifier.insert(0, 'X');
    }
    identifier
}

/// Kebab-case file name for a property path's generated module
pub fn file_name_for_path(path: &str) -> String {
    let stem: Vec<String> = path.split('.').map(to_kebab_case).collect();
    format!("{}.ts", stem.join("-"))
}

/// Whether an identifier matches `^[A-Z][A-Za-z0-9]*$`
pub fn is_valid_identifier(identifier: &str) -> bool {
    let mut chars = identifier.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case() {
        assert_eq!(to_pascal_case("automation_trigger"), "AutomationTrigger");
        assert_eq!(to_pascal_case("single-line-text"), "SingleLineText");
        assert_eq!(to_pascal_case("http"), "Http");
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(to_kebab_case("automation_trigger"), "automation-trigger");
        assert_eq!(to_kebab_case("singleLineText"), "single-line-text");
        assert_eq!(to_kebab_case("HTTP_REQUEST"), "http-request");
    }

    #[test]
    fn test_identifier_for_path() {
        assert_eq!(
            identifier_for_path("automation_trigger.http.post"),
            "AutomationTriggerHttpPost"
        );
        assert_eq!(identifier_for_path("tables"), "Tables");
        assert_eq!(identifier_for_path("pages.title"), "PagesTitle");
    }

    #[test]
    fn test_file_name_for_path() {
        assert_eq!(
            file_name_for_path("automation_trigger.http.post"),
            "automation-trigger-http-post.ts"
        );
        assert_eq!(file_name_for_path("tables"), "tables.ts");
    }

    #[test]
    fn test_identifier_validity() {
        assert!(is_valid_identifier("AutomationTriggerHttpPost"));
        assert!(!is_valid_identifier("automationTrigger"));
        assert!(!is_valid_identifier("Automation-Trigger"));
        assert!(!is_valid_identifier(""));
    }
}
