//! Textual transformer for user-authored code snippets. Snippets are
//! opaque Python source; the only assumption made here is that a snippet
//! declares exactly one top-level function, `def <name>(...)`. Model names
//! used as rename suffixes are assumed to be identifier-safe.

use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

use regex::Regex;

static DEF_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"def\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(").expect("function-name pattern compiles")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnippetError {
    NoFunctionName,
}

impl Display for SnippetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoFunctionName => {
                write!(f, "snippet does not declare a function (expected `def name(...)`)")
            }
        }
    }
}

impl std::error::Error for SnippetError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenamedFunction {
    pub code: String,
    pub ident: String,
}

/// The identifier declared by the snippet's first `def`.
pub fn declared_function_name(code: &str) -> Result<String, SnippetError> {
    DEF_NAME
        .captures(code)
        .map(|caps| caps[1].to_string())
        .ok_or(SnippetError::NoFunctionName)
}

/// Appends `_<suffix>` to the declared function name, rewriting every
/// whole-word occurrence so recursive references follow the declaration.
pub fn rename_function(code: &str, suffix: &str) -> Result<RenamedFunction, SnippetError> {
    let old = declared_function_name(code)?;
    let ident = format!("{old}_{suffix}");
    let word = Regex::new(&format!(r"\b{}\b", regex::escape(&old)))
        .expect("whole-word pattern compiles");
    let code = word.replace_all(code, ident.as_str()).into_owned();
    Ok(RenamedFunction { code, ident })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_declared_name() {
        let code = "def simulate(params):\n    return params";
        assert_eq!(declared_function_name(code).expect("name"), "simulate");
    }

    #[test]
    fn extraction_tolerates_leading_comments() {
        let code = "# generates synthetic data\ndef sim_data(p):\n    pass";
        assert_eq!(declared_function_name(code).expect("name"), "sim_data");
    }

    #[test]
    fn malformed_snippet_is_an_explicit_error() {
        assert_eq!(
            declared_function_name("x = 1"),
            Err(SnippetError::NoFunctionName)
        );
        assert_eq!(
            rename_function("x = 1", "A").expect_err("no function"),
            SnippetError::NoFunctionName
        );
    }

    #[test]
    fn rename_rewrites_declaration_and_references() {
        let code = "def simulate(p):\n    return simulate(p - 1)";
        let renamed = rename_function(code, "ModelA").expect("rename");
        assert_eq!(renamed.ident, "simulate_ModelA");
        assert_eq!(
            renamed.code,
            "def simulate_ModelA(p):\n    return simulate_ModelA(p - 1)"
        );
    }

    #[test]
    fn rename_leaves_longer_identifiers_alone() {
        let code = "def sim(p):\n    return simulate_all(p) + sim(p)";
        let renamed = rename_function(code, "M").expect("rename");
        assert!(renamed.code.contains("simulate_all(p)"));
        assert!(renamed.code.contains("sim_M(p)"));
    }
}
