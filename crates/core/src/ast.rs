//! Parsed definition lines and compiled expression trees.
//! Every definition carries the file and line it was declared on.

/// Source location of a definition line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub file: String,
    pub line: u32,
}

/// One line of a definition file.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    /// `const NAME = VALUE;` -- VALUE is kept as literal text.
    Constant {
        name: String,
        value: String,
        prov: Provenance,
    },
    /// `macro NAME(ARGS) = BODY;`
    TextMacro {
        name: String,
        params: Vec<String>,
        body: String,
        prov: Provenance,
    },
    /// `python macro NAME(ARGS) = EXPR;`
    ComputedMacro {
        name: String,
        params: Vec<String>,
        expr: Expr,
        source: String,
        prov: Provenance,
    },
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Constant { name, .. }
            | Definition::TextMacro { name, .. }
            | Definition::ComputedMacro { name, .. } => name,
        }
    }

    pub fn prov(&self) -> &Provenance {
        match self {
            Definition::Constant { prov, .. }
            | Definition::TextMacro { prov, .. }
            | Definition::ComputedMacro { prov, .. } => prov,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Functions a computed macro may call. Nothing outside this list is
/// reachable from an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Ord,
    Chr,
    Len,
    Int,
    Str,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Builtin> {
        match name {
            "ord" => Some(Builtin::Ord),
            "chr" => Some(Builtin::Chr),
            "len" => Some(Builtin::Len),
            "int" => Some(Builtin::Int),
            "str" => Some(Builtin::Str),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Ord => "ord",
            Builtin::Chr => "chr",
            Builtin::Len => "len",
            Builtin::Int => "int",
            Builtin::Str => "str",
        }
    }
}

/// Compiled expression. Parameters are resolved to their positional index
/// at compile time.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Str(String),
    Param(usize),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Index(Box<Expr>, Box<Expr>),
    Call(Builtin, Vec<Expr>),
}
