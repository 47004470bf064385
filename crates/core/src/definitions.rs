//! Definition files: `const`, `macro` and `python macro` lines.
//!
//! ```text
//! const kMaxLength = 0x3fffffff;          # comments run to end of line
//! macro IS_NULL(arg) = (arg === null);
//! python macro CHAR_CODE(str) = ord(str[1]);
//! ```

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::ast::{Definition, Provenance};
use crate::error::ExpandError;
use crate::eval::CompiledMacro;
use crate::parser::parse_expr;
use crate::table::{ConstantTable, MacroDefinition, MacroKind, MacroTable};

static CONST_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^const\s+([a-zA-Z0-9_]+)\s*=\s*([^;]*);$").unwrap());
static MACRO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^macro\s+([a-zA-Z0-9_]+)\s*\(([^)]*)\)\s*=\s*([^;]*);$").unwrap()
});
static COMPUTED_MACRO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^python\s+macro\s+([a-zA-Z0-9_]+)\s*\(([^)]*)\)\s*=\s*([^;]*);$").unwrap()
});

/// A comment-stripped, trimmed, non-blank definition line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionLine {
    pub line: u32,
    pub text: String,
}

/// Split definition source into meaningful lines. Everything from the first
/// `#` on a line is a comment.
pub fn read_definition_lines(src: &str) -> Vec<DefinitionLine> {
    src.lines()
        .enumerate()
        .filter_map(|(i, raw)| {
            let code = raw.split('#').next().unwrap_or("").trim();
            if code.is_empty() {
                None
            } else {
                Some(DefinitionLine {
                    line: i as u32 + 1,
                    text: code.to_string(),
                })
            }
        })
        .collect()
}

fn split_params(list: &str) -> Vec<String> {
    if list.trim().is_empty() {
        return Vec::new();
    }
    list.split(',').map(|p| p.trim().to_string()).collect()
}

/// Classify a single definition line.
pub fn parse_definition(text: &str, file: &str, line: u32) -> Result<Definition, ExpandError> {
    let prov = Provenance {
        file: file.to_owned(),
        line,
    };

    if let Some(caps) = CONST_PATTERN.captures(text) {
        return Ok(Definition::Constant {
            name: caps[1].to_string(),
            value: caps[2].trim().to_string(),
            prov,
        });
    }

    if let Some(caps) = MACRO_PATTERN.captures(text) {
        return Ok(Definition::TextMacro {
            name: caps[1].to_string(),
            params: split_params(&caps[2]),
            body: caps[3].trim().to_string(),
            prov,
        });
    }

    if let Some(caps) = COMPUTED_MACRO_PATTERN.captures(text) {
        let name = caps[1].to_string();
        let params = split_params(&caps[2]);
        let source = caps[3].trim().to_string();
        let expr = parse_expr(&source, &params)
            .map_err(|e| ExpandError::expr_syntax(file, line, &name, e.to_string()))?;
        return Ok(Definition::ComputedMacro {
            name,
            params,
            expr,
            source,
            prov,
        });
    }

    Err(ExpandError::definition_syntax(file, line, text))
}

/// Fold parsed definitions into the constant and macro tables. Later
/// definitions of a name replace earlier ones.
pub fn build_tables(definitions: Vec<Definition>) -> (ConstantTable, MacroTable) {
    let mut constants = ConstantTable::new();
    let mut macros = MacroTable::new();

    for def in definitions {
        tracing::trace!(
            name = def.name(),
            file = %def.prov().file,
            line = def.prov().line,
            "registering definition"
        );
        match def {
            Definition::Constant { name, value, .. } => {
                constants.insert(name, value);
            }
            Definition::TextMacro {
                name, params, body, ..
            } => {
                macros.insert(name, MacroDefinition::text(params, body));
            }
            Definition::ComputedMacro {
                name, params, expr, ..
            } => {
                let func = Arc::new(CompiledMacro::new(name.as_str(), params.len(), expr));
                // Arity is derived from `params`, so the two always agree.
                macros.insert(
                    name,
                    MacroDefinition {
                        params,
                        kind: MacroKind::Computed(func),
                    },
                );
            }
        }
    }

    tracing::debug!(
        constants = constants.len(),
        macros = macros.len(),
        "built definition tables"
    );
    (constants, macros)
}

/// Parse every line of a definition file.
pub fn parse_definitions(src: &str, file: &str) -> Result<Vec<Definition>, ExpandError> {
    read_definition_lines(src)
        .into_iter()
        .map(|l| parse_definition(&l.text, file, l.line))
        .collect()
}
