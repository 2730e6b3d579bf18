//! Placeholder expansion for destination file names.
//!
//! Build systems parameterize the workspace file name with environment
//! variables, e.g. `logs/$BUILD_TAG.txt` or `${JOB_NAME}.log`. Expansion
//! rules:
//!
//! - `$NAME` and `${NAME}` are replaced with the variable's value
//! - `$$` produces a literal `$`
//! - references to unknown variables are left in place, so a typo shows up
//!   verbatim in the build log instead of silently collapsing to nothing
//!
//! A name starts with a letter or `_` and continues with letters, digits,
//! or `_`.

use std::collections::HashMap;

/// Port for expanding placeholder variables in a template string.
pub trait EnvExpander {
    fn expand(&self, template: &str) -> String;
}

/// Name/value environment backing placeholder expansion.
#[derive(Debug, Clone, Default)]
pub struct BuildEnv {
    vars: HashMap<String, String>,
}

impl BuildEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current process environment.
    pub fn from_process_env() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Set a variable, replacing any existing value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Look up a braced name, requiring it to be well-formed.
    fn lookup(&self, name: &str) -> Option<&str> {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if is_name_start(c) => {}
            _ => return None,
        }
        if !chars.all(is_name_char) {
            return None;
        }
        self.get(name)
    }
}

impl EnvExpander for BuildEnv {
    fn expand(&self, template: &str) -> String {
        let chars: Vec<char> = template.chars().collect();
        let mut out = String::with_capacity(template.len());
        let mut i = 0;

        while i < chars.len() {
            if chars[i] != '$' {
                out.push(chars[i]);
                i += 1;
                continue;
            }
            match chars.get(i + 1) {
                Some('$') => {
                    out.push('$');
                    i += 2;
                }
                Some('{') => {
                    let start = i + 2;
                    let mut end = start;
                    while end < chars.len() && chars[end] != '}' {
                        end += 1;
                    }
                    if end == chars.len() {
                        // Unterminated brace: keep the rest verbatim.
                        out.extend(&chars[i..]);
                        i = chars.len();
                        continue;
                    }
                    let name: String = chars[start..end].iter().collect();
                    match self.lookup(&name) {
                        Some(value) => out.push_str(value),
                        None => out.extend(&chars[i..=end]),
                    }
                    i = end + 1;
                }
                Some(&c) if is_name_start(c) => {
                    let start = i + 1;
                    let mut end = start;
                    while end < chars.len() && is_name_char(chars[end]) {
                        end += 1;
                    }
                    let name: String = chars[start..end].iter().collect();
                    match self.vars.get(&name) {
                        Some(value) => out.push_str(value),
                        None => out.extend(&chars[i..end]),
                    }
                    i = end;
                }
                _ => {
                    // Lone `$` at end of string or before a non-name character.
                    out.push('$');
                    i += 1;
                }
            }
        }
        out
    }
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
