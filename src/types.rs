//! Type resolution and unification
//!
//! Maps a type signal (explicit annotation, literal default, or heuristic
//! scan of the surrounding body) to an Aiken type name, and unifies
//! independently inferred types into one consensus type.
//!
//! Resolution is a pure function of its inputs: the same signal always
//! yields the same [`TypeSymbol`]. Nothing is persisted across
//! declarations.

use serde::{Deserialize, Serialize};

use crate::ast::{Expr, Stmt};

/// The generic wildcard type every unresolved signal degrades to
pub const WILDCARD: &str = "Data";

/// How a resolved type was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Explicit annotation on the parameter or field
    Annotation,
    /// Inferred from a literal default value
    DefaultValue,
    /// Inferred from how the name is used in the enclosing body
    Heuristic,
    /// No signal; the wildcard was used
    Fallback,
}

/// A resolved Aiken type name plus where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSymbol {
    /// Aiken type name
    pub name: String,
    /// Provenance of the resolution
    pub provenance: Provenance,
}

impl TypeSymbol {
    /// Whether this symbol is the unresolved wildcard
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.provenance == Provenance::Fallback
    }
}

/// The three inputs type resolution consults, in precedence order
#[derive(Debug, Clone, Copy)]
pub struct TypeSignal<'a> {
    /// Parameter or field name (used by the `is_` prefix heuristic)
    pub name: &'a str,
    /// Explicit annotation, verbatim from source
    pub annotation: Option<&'a str>,
    /// Default value expression
    pub default: Option<&'a Expr>,
    /// Enclosing body to scan for usage heuristics
    pub body: &'a [Stmt],
}

/// Map a source annotation to an Aiken type name
///
/// Known names go through the fixed table. An unmapped capitalized name
/// passes through unchanged: it is presumed to be a custom record type.
/// This heuristic is lossy - the source cannot distinguish a capitalized
/// function from a capitalized constructor. Anything else maps to `Data`.
#[must_use]
pub fn map_annotation(annotation: &str) -> String {
    let mapped = match annotation {
        "int" => "Int",
        "float" => "Int", // Aiken has no float
        "bool" => "Bool",
        "str" => "String",
        "bytes" => "ByteArray",
        "None" => "Void",
        "Any" | "Data" => "Data",
        "dict" => "Dict<Data, Data>",
        "list" => "List<Data>",
        "tuple" => "Pair<Data, Data>",
        "Datum" => "Option<Data>",
        "Redeemer" => "Data",
        "Context" => "ScriptContext",
        other => {
            if is_capitalized(other) {
                other
            } else {
                WILDCARD
            }
        }
    };
    mapped.to_string()
}

/// Whether a name starts with an uppercase letter
#[must_use]
pub fn is_capitalized(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Resolve one type signal to a [`TypeSymbol`]
///
/// Precedence: explicit annotation, then literal default value, then a
/// heuristic scan of the enclosing body, then the wildcard.
#[must_use]
pub fn resolve(signal: &TypeSignal) -> TypeSymbol {
    if let Some(annotation) = signal.annotation {
        return TypeSymbol {
            name: map_annotation(annotation),
            provenance: Provenance::Annotation,
        };
    }

    if let Some(t) = signal.default.and_then(infer_literal) {
        return TypeSymbol {
            name: t.to_string(),
            provenance: Provenance::DefaultValue,
        };
    }

    // boolean-named fields: is_owner, is_signed, ...
    if signal.name.starts_with("is_") {
        return TypeSymbol {
            name: "Bool".to_string(),
            provenance: Provenance::Heuristic,
        };
    }

    if let Some(t) = scan_body(signal.name, signal.body) {
        return TypeSymbol {
            name: t.to_string(),
            provenance: Provenance::Heuristic,
        };
    }

    TypeSymbol {
        name: WILDCARD.to_string(),
        provenance: Provenance::Fallback,
    }
}

/// Unify two independently inferred types into one consensus type
///
/// Identical types unify to themselves; the wildcard unifies to the other
/// operand; otherwise there is no consensus and the result degrades to the
/// wildcard.
#[must_use]
pub fn unify(t1: &str, t2: &str) -> String {
    if t1 == t2 {
        t1.to_string()
    } else if t1 == WILDCARD {
        t2.to_string()
    } else if t2 == WILDCARD {
        t1.to_string()
    } else {
        WILDCARD.to_string()
    }
}

/// Infer an Aiken type from a literal expression, if it is one
#[must_use]
pub fn infer_literal(expr: &Expr) -> Option<&'static str> {
    match expr {
        Expr::Bool(_) => Some("Bool"),
        Expr::Int(_) | Expr::Float(_) => Some("Int"),
        Expr::Str(_) => Some("String"),
        Expr::Bytes(_) => Some("ByteArray"),
        Expr::NoneLit => Some("Void"),
        _ => None,
    }
}

/// Infer an Aiken type from an arbitrary expression, best effort
#[must_use]
pub fn infer_expr(expr: &Expr) -> Option<&'static str> {
    match expr {
        Expr::Compare { .. } | Expr::BoolOp { .. } => Some("Bool"),
        Expr::UnaryOp { op, operand } => match op {
            crate::ast::UnaryOp::Not => Some("Bool"),
            _ => infer_expr(operand),
        },
        Expr::BinOp { left, right, .. } => match (infer_expr(left), infer_expr(right)) {
            (Some(l), Some(r)) if l == r => Some(l),
            (Some(t), None) | (None, Some(t)) => Some(t),
            _ => None,
        },
        Expr::Call { func, .. } => {
            // builtin casts carry their own type
            if let Expr::Name(name) = func.as_ref() {
                match name.as_str() {
                    "int" => Some("Int"),
                    "str" => Some("String"),
                    "bool" => Some("Bool"),
                    _ => None,
                }
            } else {
                None
            }
        }
        _ => infer_literal(expr),
    }
}

/// Infer a function's return type from its return sites
///
/// Every `return` expression (including those inside if-chains) is
/// inferred individually, and the results are folded through [`unify`].
/// Returns `None` when no return site carries a usable signal.
#[must_use]
pub fn infer_return_type(body: &[Stmt]) -> Option<String> {
    let mut returns = Vec::new();
    collect_returns(body, &mut returns);

    let inferred: Vec<&'static str> = returns.iter().filter_map(|e| infer_expr(e)).collect();
    if inferred.is_empty() {
        return None;
    }
    let mut consensus = inferred[0].to_string();
    for t in &inferred[1..] {
        consensus = unify(&consensus, t);
    }
    Some(consensus)
}

fn collect_returns<'a>(body: &'a [Stmt], out: &mut Vec<&'a Expr>) {
    for stmt in body {
        match stmt {
            Stmt::Return { value: Some(expr) } => out.push(expr),
            Stmt::If { body, orelse, .. } => {
                collect_returns(body, out);
                collect_returns(orelse, out);
            }
            Stmt::Try { body, handlers } => {
                collect_returns(body, out);
                collect_returns(handlers, out);
            }
            _ => {}
        }
    }
}

/// Heuristic scan of a body for how `name` is used
///
/// Adopts, in encounter order: `Bool` when the name is used directly as a
/// boolean test; the literal's type when the name is compared against a
/// literal; the literal's type when the name is combined with a literal in
/// an arithmetic operation.
#[must_use]
pub fn scan_body(name: &str, body: &[Stmt]) -> Option<&'static str> {
    for stmt in body {
        let found = match stmt {
            Stmt::If { test, body, orelse } => {
                if is_bool_use(name, test) {
                    Some("Bool")
                } else {
                    scan_expr(name, test)
                        .or_else(|| scan_body(name, body))
                        .or_else(|| scan_body(name, orelse))
                }
            }
            Stmt::Assign { value, .. } | Stmt::ExprStmt(value) | Stmt::Assert { test: value } => {
                scan_expr(name, value)
            }
            Stmt::AnnAssign {
                value: Some(value), ..
            }
            | Stmt::Return { value: Some(value) } => scan_expr(name, value),
            Stmt::Try { body, handlers } => {
                scan_body(name, body).or_else(|| scan_body(name, handlers))
            }
            _ => None,
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Whether `test` uses `name` directly as a boolean condition
fn is_bool_use(name: &str, test: &Expr) -> bool {
    match test {
        Expr::Name(n) => n == name,
        Expr::BoolOp { values, .. } => values
            .iter()
            .any(|v| matches!(v, Expr::Name(n) if n == name)),
        Expr::UnaryOp {
            op: crate::ast::UnaryOp::Not,
            operand,
        } => matches!(operand.as_ref(), Expr::Name(n) if n == name),
        _ => false,
    }
}

fn scan_expr(name: &str, expr: &Expr) -> Option<&'static str> {
    match expr {
        Expr::Compare { left, right, .. } => {
            if matches!(left.as_ref(), Expr::Name(n) if n == name) {
                if let Some(t) = infer_literal(right) {
                    return Some(t);
                }
            }
            if matches!(right.as_ref(), Expr::Name(n) if n == name) {
                if let Some(t) = infer_literal(left) {
                    return Some(t);
                }
            }
            scan_expr(name, left).or_else(|| scan_expr(name, right))
        }
        Expr::BinOp { left, right, .. } => {
            if matches!(left.as_ref(), Expr::Name(n) if n == name) {
                if let Some(t) = infer_literal(right) {
                    return Some(t);
                }
            }
            if matches!(right.as_ref(), Expr::Name(n) if n == name) {
                if let Some(t) = infer_literal(left) {
                    return Some(t);
                }
            }
            scan_expr(name, left).or_else(|| scan_expr(name, right))
        }
        Expr::BoolOp { values, .. } => {
            if values
                .iter()
                .any(|v| matches!(v, Expr::Name(n) if n == name))
            {
                return Some("Bool");
            }
            values.iter().find_map(|v| scan_expr(name, v))
        }
        Expr::UnaryOp { operand, .. } => scan_expr(name, operand),
        Expr::Call { func, args, kwargs } => scan_expr(name, func)
            .or_else(|| args.iter().find_map(|a| scan_expr(name, a)))
            .or_else(|| kwargs.iter().find_map(|k| scan_expr(name, &k.value))),
        Expr::List(items) | Expr::Tuple(items) => items.iter().find_map(|i| scan_expr(name, i)),
        Expr::Index { value, index } => {
            scan_expr(name, value).or_else(|| scan_expr(name, index))
        }
        _ => None,
    }
}
