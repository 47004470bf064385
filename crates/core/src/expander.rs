//! Macro expansion.
//!
//! Each pass walks the macro table in definition order and expands every
//! invocation of one name before moving to the next. Passes repeat until one
//! changes nothing, so an expansion that introduces an invocation of an
//! already-processed name is still resolved. Arguments are expanded
//! recursively before they are bound.

use crate::constants::replace_literals;
use crate::error::ExpandError;
use crate::table::{MacroDefinition, MacroKind, MacroTable};

/// Default bound on argument nesting. Fixed-point passes are bounded by this
/// plus the number of defined macros.
pub const DEFAULT_MAX_DEPTH: usize = 64;

pub struct MacroExpander<'a> {
    macros: &'a MacroTable,
    max_depth: usize,
}

impl<'a> MacroExpander<'a> {
    pub fn new(macros: &'a MacroTable) -> Self {
        MacroExpander {
            macros,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Expand every known macro in `text` until none remain.
    pub fn expand(&self, text: &str) -> Result<String, ExpandError> {
        self.expand_at(text, 0)
    }

    fn expand_at(&self, text: &str, depth: usize) -> Result<String, ExpandError> {
        // Non-recursive definitions settle within one pass per table entry,
        // so only a self-feeding expansion can use up this budget.
        let pass_budget = self.max_depth + self.macros.len();
        let mut current = text.to_string();
        let mut passes = 0usize;
        loop {
            let mut last_changed: Option<&str> = None;
            for (name, def) in self.macros.iter() {
                if let Some(next) = self.expand_name(&current, name, def, depth)? {
                    current = next;
                    last_changed = Some(name);
                }
            }
            let Some(name) = last_changed else {
                return Ok(current);
            };
            passes += 1;
            if passes >= pass_budget {
                return Err(ExpandError::RecursionLimit {
                    name: name.to_string(),
                    limit: self.max_depth,
                });
            }
        }
    }

    /// Run one macro name to exhaustion over `text`. Returns `None` when no
    /// invocation was found.
    fn expand_name(
        &self,
        text: &str,
        name: &str,
        def: &MacroDefinition,
        depth: usize,
    ) -> Result<Option<String>, ExpandError> {
        let pattern = format!("{}(", name);
        let mut text = text.to_string();
        let mut search_from = 0usize;
        let mut changed = false;

        while let Some(start) = find_invocation(&text, &pattern, search_from) {
            let open = start + pattern.len();
            let line = line_of(&text, start);
            // `NAME()` binds a single empty argument.
            let (supplied, end) =
                scan_arguments(&text, open).ok_or_else(|| ExpandError::UnterminatedInvocation {
                    name: name.to_string(),
                    line,
                })?;
            if supplied.len() < def.params.len() {
                return Err(ExpandError::MacroArity {
                    name: name.to_string(),
                    line,
                    expected: def.params.len(),
                    found: supplied.len(),
                });
            }
            if depth >= self.max_depth {
                return Err(ExpandError::RecursionLimit {
                    name: name.to_string(),
                    limit: self.max_depth,
                });
            }

            let mut bound = Vec::with_capacity(def.params.len());
            for raw in supplied.iter().take(def.params.len()) {
                bound.push(self.expand_at(raw.trim(), depth + 1)?);
            }

            let result = match &def.kind {
                MacroKind::Text(body) => {
                    let pairs: Vec<(&str, &str)> = def
                        .params
                        .iter()
                        .map(String::as_str)
                        .zip(bound.iter().map(String::as_str))
                        .collect();
                    replace_literals(body, &pairs)
                }
                MacroKind::Computed(func) => func
                    .call(&bound)
                    .map_err(|message| ExpandError::eval(name, message))?,
            };
            tracing::trace!(macro_name = name, line, "expanded invocation");

            text.replace_range(start..end, &result);
            search_from = start + result.len();
            changed = true;
        }

        Ok(changed.then_some(text))
    }
}

/// Convenience wrapper using the default depth guard.
pub fn expand_macros(text: &str, macros: &MacroTable) -> Result<String, ExpandError> {
    MacroExpander::new(macros).expand(text)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Byte offset of the next `NAME(` at or after `from` that does not
/// continue a longer identifier.
fn find_invocation(text: &str, pattern: &str, from: usize) -> Option<usize> {
    let mut from = from;
    while from <= text.len() {
        let idx = from + text[from..].find(pattern)?;
        let preceded_by_ident = text[..idx].chars().next_back().is_some_and(is_ident_char);
        if !preceded_by_ident {
            return Some(idx);
        }
        from = idx + pattern.len();
    }
    None
}

/// Scan from just past an invocation's `(` to its matching close. Returns
/// the raw argument slices, split at depth-1 commas, and the byte offset just
/// past the closing bracket. `None` means the text ended first.
fn scan_arguments(text: &str, open: usize) -> Option<(Vec<&str>, usize)> {
    let bytes = text.as_bytes();
    let mut depth = 1usize;
    let mut last = open;
    let mut args = Vec::new();

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b',' if depth == 1 => {
                args.push(&text[last..i]);
                last = i + 1;
            }
            b'(' | b'{' | b'[' => depth += 1,
            b')' | b'}' | b']' => {
                depth -= 1;
                if depth == 0 {
                    args.push(&text[last..i]);
                    return Some((args, i + 1));
                }
            }
            _ => {}
        }
    }
    None
}

fn line_of(text: &str, offset: usize) -> u32 {
    text[..offset].matches('\n').count() as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{build_tables, parse_definitions};

    fn macros(src: &str) -> MacroTable {
        build_tables(parse_definitions(src, "macros.py").unwrap()).1
    }

    #[test]
    fn test_nested_invocation() {
        let m = macros("macro ADD(a, b) = a + b;");
        assert_eq!(expand_macros("ADD(ADD(1,2), 3)", &m).unwrap(), "1 + 2 + 3");
    }

    #[test]
    fn test_commas_inside_brackets_do_not_split() {
        let m = macros("macro FIRST(a, b) = a;");
        assert_eq!(
            expand_macros("FIRST(f(x, y), [1, 2])", &m).unwrap(),
            "f(x, y)"
        );
        assert_eq!(expand_macros("FIRST({a: 1, b: 2}, 0)", &m).unwrap(), "{a: 1, b: 2}");
    }

    #[test]
    fn test_too_few_arguments() {
        let m = macros("macro ADD(a, b) = a + b;");
        let err = expand_macros("x;\ny = ADD(1);", &m).unwrap_err();
        assert_eq!(
            err,
            ExpandError::MacroArity {
                name: "ADD".to_string(),
                line: 2,
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn test_extra_arguments_ignored() {
        let m = macros("macro ONE(a) = [a];");
        assert_eq!(expand_macros("ONE(1, 2, 3)", &m).unwrap(), "[1]");
    }

    #[test]
    fn test_unterminated_invocation() {
        let m = macros("macro ONE(a) = [a];");
        let err = expand_macros("ONE(1, (2)", &m).unwrap_err();
        assert!(matches!(err, ExpandError::UnterminatedInvocation { line: 1, .. }));
    }

    #[test]
    fn test_unknown_names_left_alone() {
        let m = macros("macro ONE(a) = [a];");
        assert_eq!(
            expand_macros("foo(1) + bar(", &m).unwrap(),
            "foo(1) + bar("
        );
    }

    #[test]
    fn test_identifier_suffix_is_not_an_invocation() {
        let m = macros("macro ADD(a, b) = a + b;");
        assert_eq!(expand_macros("XADD(1, 2)", &m).unwrap(), "XADD(1, 2)");
        assert_eq!(expand_macros("x.ADD(1, 2)", &m).unwrap(), "x.1 + 2");
    }

    #[test]
    fn test_later_macro_output_uses_earlier_macro() {
        let m = macros("macro DOUBLE(x) = (x * 2);\nmacro QUAD(x) = DOUBLE(DOUBLE(x));");
        assert_eq!(expand_macros("QUAD(n)", &m).unwrap(), "((n * 2) * 2)");
    }

    #[test]
    fn test_zero_parameter_macro() {
        let m = macros("macro NOW() = Date.now();");
        assert_eq!(expand_macros("t = NOW();", &m).unwrap(), "t = Date.now();");
    }

    #[test]
    fn test_empty_parens_bind_one_empty_argument() {
        let m = macros("macro ONE(a) = [a];");
        assert_eq!(expand_macros("ONE()", &m).unwrap(), "[]");
        assert_eq!(expand_macros("ONE( )", &m).unwrap(), "[]");
    }

    #[test]
    fn test_empty_parens_still_short_for_two_parameters() {
        let m = macros("macro ADD(a, b) = a + b;");
        assert!(matches!(
            expand_macros("ADD()", &m),
            Err(ExpandError::MacroArity { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn test_placeholders_do_not_cascade() {
        let m = macros("macro SWAP(a, b) = b, a;");
        assert_eq!(expand_macros("SWAP(b, a)", &m).unwrap(), "a, b");
    }

    #[test]
    fn test_computed_macro_invoked_with_expanded_args() {
        let m = macros(
            "macro QUOTE(c) = 'c';\npython macro CHAR_CODE(str) = ord(str[1]);",
        );
        assert_eq!(expand_macros("CHAR_CODE(QUOTE(A))", &m).unwrap(), "65");
    }

    #[test]
    fn test_computed_macro_failure_is_eval_error() {
        let m = macros("python macro NUM(x) = int(x);");
        assert!(matches!(
            expand_macros("NUM(abc)", &m),
            Err(ExpandError::Eval { .. })
        ));
    }

    #[test]
    fn test_self_recursive_macro_hits_limit() {
        let m = macros("macro LOOP(x) = LOOP(x);");
        let err = MacroExpander::new(&m)
            .with_max_depth(8)
            .expand("LOOP(1)")
            .unwrap_err();
        assert_eq!(
            err,
            ExpandError::RecursionLimit {
                name: "LOOP".to_string(),
                limit: 8,
            }
        );
    }

    #[test]
    fn test_long_chain_defined_leaf_first_completes() {
        // Each level is defined before its caller, so every pass resolves
        // only one level of the chain.
        let mut defs = String::from("macro M0(x) = [x];\n");
        for i in 1..=70 {
            defs.push_str(&format!("macro M{}(x) = M{}(x);\n", i, i - 1));
        }
        let m = macros(&defs);
        assert_eq!(expand_macros("M70(1)", &m).unwrap(), "[1]");
    }

    #[test]
    fn test_growing_recursion_hits_limit() {
        let m = macros("macro GROW(x) = GROW((x));");
        assert!(matches!(
            MacroExpander::new(&m).with_max_depth(16).expand("GROW(0)"),
            Err(ExpandError::RecursionLimit { .. })
        ));
    }

    #[test]
    fn test_multiline_text_is_preserved() {
        let m = macros("macro IS_NULL(arg) = (arg === null);");
        let src = "if (IS_NULL(a)) {\n  return IS_NULL(b);\n}\n";
        assert_eq!(
            expand_macros(src, &m).unwrap(),
            "if ((a === null)) {\n  return (b === null);\n}\n"
        );
    }
}
