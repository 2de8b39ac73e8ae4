//! Variable expansion for step scripts.
//!
//! Variables use shell-style syntax: `${VARIABLE_NAME}`. Only names set on
//! the context are replaced; any other `${...}` is left for the remote
//! shell to expand.

use std::collections::HashMap;

/// Variables the orchestrator sets for every step
pub const KNOWN_VARIABLES: &[&str] = &[
    "NODE_ALIAS",
    "NODE_ADDRESS",
    "COORDINATOR_ADDRESS",
    "REPLICA_FACTOR",
    "PACKAGE_URL",
    "PACKAGE_NAME",
    "COORDINATOR_CONFIG",
    "NODE_CONFIG",
    "QUERY_NODE_CONFIG",
    "COORDINATOR_DATADIR",
    "STORAGE_DATADIR",
    "QUERY_BASEDIR",
    "DB_USER",
    "DB_PASSWORD",
];

/// Values substituted into a step template
#[derive(Debug, Clone, Default)]
pub struct ScriptContext {
    variables: HashMap<String, String>,
}

impl ScriptContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_variable(&mut self, key: &str, value: &str) {
        self.variables.insert(key.to_string(), value.to_string());
    }

    /// Builder form of `set_variable`
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.set_variable(key, value);
        self
    }

    pub fn get_variable(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Expand all known variables in `template` in a single pass.
    ///
    /// Substituted values are not rescanned, so a value containing `${...}`
    /// is inserted verbatim.
    pub fn expand(&self, template: &str) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("${") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let name = &after[..end];
                    match self.variables.get(name) {
                        Some(value) => result.push_str(value),
                        None => result.push_str(&rest[start..start + 2 + end + 1]),
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        result.push_str(rest);
        result
    }
}

/// All `${NAME}` references in `template`, in order of appearance
pub fn find_references(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                name.push(c);
            }
            if !name.is_empty() {
                names.push(name);
            }
        }
    }

    names
}

/// Escape a value for use inside a single-quoted SQL string literal.
///
/// Line breaks and NUL become backslash escapes, so the result is always a
/// single line and cannot end a heredoc early.
pub fn sql_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("''"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\0' => escaped.push_str("\\0"),
            c => escaped.push(c),
        }
    }
    escaped
}
