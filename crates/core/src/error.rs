use serde::Serialize;

/// An expansion error. Every variant is fatal for the run except where the
/// caller chooses otherwise; unknown macro and constant names never produce
/// one of these.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpandError {
    /// A definition line matched none of the `const`, `macro` or
    /// `python macro` productions.
    #[error("{file}:{line}: illegal definition line: {text}")]
    DefinitionSyntax { file: String, line: u32, text: String },

    /// The body of a computed macro could not be compiled.
    #[error("{file}:{line}: invalid expression in macro \"{name}\": {message}")]
    ExprSyntax {
        file: String,
        line: u32,
        name: String,
        message: String,
    },

    /// A call site supplied fewer arguments than the macro declares.
    #[error("line {line}: too few arguments for macro \"{name}\" (expected {expected}, found {found})")]
    MacroArity {
        name: String,
        line: u32,
        expected: usize,
        found: usize,
    },

    /// End of text was reached before the invocation's closing parenthesis.
    #[error("line {line}: unterminated invocation of macro \"{name}\"")]
    UnterminatedInvocation { name: String, line: u32 },

    /// Expansion kept producing new invocations past the depth guard.
    #[error("macro \"{name}\" exceeded the expansion depth limit of {limit}")]
    RecursionLimit { name: String, limit: usize },

    /// A computed macro failed while evaluating its arguments.
    #[error("error evaluating macro \"{name}\": {message}")]
    Eval { name: String, message: String },
}

impl ExpandError {
    pub fn definition_syntax(file: &str, line: u32, text: impl Into<String>) -> Self {
        ExpandError::DefinitionSyntax {
            file: file.to_owned(),
            line,
            text: text.into(),
        }
    }

    pub fn expr_syntax(file: &str, line: u32, name: &str, message: impl Into<String>) -> Self {
        ExpandError::ExprSyntax {
            file: file.to_owned(),
            line,
            name: name.to_owned(),
            message: message.into(),
        }
    }

    pub fn eval(name: &str, message: impl Into<String>) -> Self {
        ExpandError::Eval {
            name: name.to_owned(),
            message: message.into(),
        }
    }

    /// Serialize to a JSON object with a `kind` discriminator.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({
                "kind": "unknown",
                "message": self.to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_message_names_macro_and_line() {
        let e = ExpandError::MacroArity {
            name: "ADD".to_string(),
            line: 7,
            expected: 2,
            found: 1,
        };
        let msg = e.to_string();
        assert!(msg.contains("\"ADD\""));
        assert!(msg.starts_with("line 7:"));
    }

    #[test]
    fn test_json_carries_kind_tag() {
        let e = ExpandError::definition_syntax("macros.py", 3, "bogus");
        let v = e.to_json_value();
        assert_eq!(v["kind"], "definition_syntax");
        assert_eq!(v["file"], "macros.py");
        assert_eq!(v["line"], 3);
        assert_eq!(v["text"], "bogus");
    }
}
