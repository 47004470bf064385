//! Sandboxed evaluator for computed macros.
//!
//! Values are integers or strings and every argument arrives as a string.
//! There is no variable assignment, attribute access or import; the only
//! callable functions are the [`Builtin`]s.

use std::fmt;

use crate::ast::{BinOp, Builtin, Expr};
use crate::table::MacroFn;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Str(String),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Str(_) => "str",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) => f.write_str(s),
        }
    }
}

/// Evaluate `expr` with `args` bound positionally to the macro parameters.
pub fn eval_expr(expr: &Expr, args: &[String]) -> Result<Value, String> {
    match expr {
        Expr::Int(n) => Ok(Value::Int(*n)),
        Expr::Str(s) => Ok(Value::Str(s.clone())),
        Expr::Param(idx) => args
            .get(*idx)
            .map(|a| Value::Str(a.clone()))
            .ok_or_else(|| format!("missing argument {}", idx + 1)),
        Expr::Neg(inner) => match eval_expr(inner, args)? {
            Value::Int(n) => n
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| "integer overflow".to_string()),
            other => Err(format!("bad operand type for unary -: '{}'", other.type_name())),
        },
        Expr::Binary(op, l, r) => {
            let left = eval_expr(l, args)?;
            let right = eval_expr(r, args)?;
            eval_binary(*op, left, right)
        }
        Expr::Index(target, index) => {
            let target = eval_expr(target, args)?;
            let index = eval_expr(index, args)?;
            match (target, index) {
                (Value::Str(s), Value::Int(i)) => index_str(&s, i).map(Value::Str),
                (t, i) => Err(format!(
                    "cannot index '{}' with '{}'",
                    t.type_name(),
                    i.type_name()
                )),
            }
        }
        Expr::Call(builtin, call_args) => {
            let mut values = Vec::with_capacity(call_args.len());
            for a in call_args {
                values.push(eval_expr(a, args)?);
            }
            call_builtin(*builtin, values)
        }
    }
}

fn eval_binary(op: BinOp, left: Value, right: Value) -> Result<Value, String> {
    let overflow = || "integer overflow".to_string();
    match (op, left, right) {
        (BinOp::Add, Value::Int(a), Value::Int(b)) => {
            a.checked_add(b).map(Value::Int).ok_or_else(overflow)
        }
        (BinOp::Add, Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
        (BinOp::Sub, Value::Int(a), Value::Int(b)) => {
            a.checked_sub(b).map(Value::Int).ok_or_else(overflow)
        }
        (BinOp::Mul, Value::Int(a), Value::Int(b)) => {
            a.checked_mul(b).map(Value::Int).ok_or_else(overflow)
        }
        (BinOp::Mul, Value::Str(s), Value::Int(n)) | (BinOp::Mul, Value::Int(n), Value::Str(s)) => {
            // Negative counts yield the empty string.
            let count = usize::try_from(n).unwrap_or(0);
            Ok(Value::Str(s.repeat(count)))
        }
        (BinOp::Div, Value::Int(_), Value::Int(0)) | (BinOp::Mod, Value::Int(_), Value::Int(0)) => {
            Err("integer division or modulo by zero".to_string())
        }
        (BinOp::Div, Value::Int(a), Value::Int(b)) => {
            floor_div(a, b).map(Value::Int).ok_or_else(overflow)
        }
        (BinOp::Mod, Value::Int(a), Value::Int(b)) => {
            floor_mod(a, b).map(Value::Int).ok_or_else(overflow)
        }
        (op, l, r) => Err(format!(
            "unsupported operand types for {}: '{}' and '{}'",
            op_symbol(op),
            l.type_name(),
            r.type_name()
        )),
    }
}

fn op_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
    }
}

/// Division rounding toward negative infinity.
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if (a % b != 0) && ((a < 0) != (b < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

/// Remainder carrying the sign of the divisor.
fn floor_mod(a: i64, b: i64) -> Option<i64> {
    let r = a.checked_rem(b)?;
    if r != 0 && ((r < 0) != (b < 0)) {
        Some(r + b)
    } else {
        Some(r)
    }
}

fn index_str(s: &str, i: i64) -> Result<String, String> {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;
    let idx = if i < 0 { i + len } else { i };
    if idx < 0 || idx >= len {
        return Err(format!("string index {} out of range", i));
    }
    Ok(chars[idx as usize].to_string())
}

fn call_builtin(builtin: Builtin, mut values: Vec<Value>) -> Result<Value, String> {
    let arg = values
        .pop()
        .ok_or_else(|| format!("{}() takes exactly one argument", builtin.name()))?;
    match (builtin, arg) {
        (Builtin::Ord, Value::Str(s)) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Int(c as i64)),
                _ => Err(format!(
                    "ord() expected a character, but string of length {} found",
                    s.chars().count()
                )),
            }
        }
        (Builtin::Chr, Value::Int(n)) => u32::try_from(n)
            .ok()
            .and_then(char::from_u32)
            .map(|c| Value::Str(c.to_string()))
            .ok_or_else(|| format!("chr() arg not in range: {}", n)),
        (Builtin::Len, Value::Str(s)) => Ok(Value::Int(s.chars().count() as i64)),
        (Builtin::Int, Value::Int(n)) => Ok(Value::Int(n)),
        (Builtin::Int, Value::Str(s)) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| format!("invalid literal for int(): '{}'", s)),
        (Builtin::Str, v) => Ok(Value::Str(v.to_string())),
        (b, v) => Err(format!(
            "{}() argument must not be '{}'",
            b.name(),
            v.type_name()
        )),
    }
}

/// A `python macro` body compiled to an [`Expr`] over its parameters.
#[derive(Debug, Clone)]
pub struct CompiledMacro {
    name: String,
    arity: usize,
    expr: Expr,
}

impl CompiledMacro {
    pub fn new(name: impl Into<String>, arity: usize, expr: Expr) -> Self {
        CompiledMacro {
            name: name.into(),
            arity,
            expr,
        }
    }
}

impl MacroFn for CompiledMacro {
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(&self, args: &[String]) -> Result<String, String> {
        if args.len() != self.arity {
            return Err(format!(
                "{} takes {} arguments ({} given)",
                self.name,
                self.arity,
                args.len()
            ));
        }
        eval_expr(&self.expr, args).map(|v| v.to_string())
    }
}
