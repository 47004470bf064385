//! natives-core: macro and constant expansion for embedded native sources.
//!
//! Definition files declare constants and macros; resource text is run
//! through constant substitution and then macro expansion before it is
//! embedded.
//!
//! # Public API
//!
//! - [`parse_definitions()`] / [`build_tables()`] -- definition files to tables
//! - [`substitute_constants()`] -- raw-substring constant replacement
//! - [`MacroExpander`] / [`expand_macros()`] -- recursive macro expansion
//! - [`expand_resource()`] -- both steps, in order
//! - [`ExpandError`] -- every fatal condition
//! - [`MacroFn`] -- the capability behind computed macros

pub mod ast;
pub mod constants;
pub mod definitions;
pub mod error;
pub mod eval;
pub mod expander;
pub mod lexer;
pub mod parser;
pub mod table;

pub use ast::{Definition, Expr, Provenance};
pub use constants::substitute_constants;
pub use definitions::{build_tables, parse_definition, parse_definitions, read_definition_lines};
pub use error::ExpandError;
pub use expander::{expand_macros, MacroExpander, DEFAULT_MAX_DEPTH};
pub use table::{ConstantTable, MacroDefinition, MacroFn, MacroKind, MacroTable};

/// Substitute constants, then expand macros.
pub fn expand_resource(
    text: &str,
    constants: &ConstantTable,
    macros: &MacroTable,
    max_depth: usize,
) -> Result<String, ExpandError> {
    let substituted = substitute_constants(text, constants);
    MacroExpander::new(macros)
        .with_max_depth(max_depth)
        .expand(&substituted)
}
