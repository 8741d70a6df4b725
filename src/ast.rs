//! Source AST definitions
//!
//! Closed sum types for the Python module shapes the transpiler consumes.
//! The external parser collaborator produces this tree (usually serialized
//! as JSON); the core never parses Python text itself.
//!
//! Node kinds outside this enumeration are carried as the `Unknown`
//! variants and render to the fixed placeholder, never aborting the pass.

use serde::{Deserialize, Serialize};

/// A parsed source module: an ordered list of top-level items
///
/// Emission preserves this order exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Top-level declarations and statements, in source order
    pub body: Vec<Item>,
}

/// One top-level item of a module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    /// `import a.b` / `import a.b as c`
    Import {
        /// Dotted module path
        module: String,
        /// Optional `as` alias
        alias: Option<String>,
    },
    /// `from a.b import X, Y as Z`
    ImportFrom {
        /// Dotted module path
        module: String,
        /// Imported names with optional aliases
        names: Vec<ImportName>,
    },
    /// A class declaration: either a validator or a record type
    Class(ClassDef),
    /// A top-level function or test
    Function(FunctionDef),
    /// A stray top-level statement
    Stmt(Stmt),
}

/// One imported name inside `from ... import ...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportName {
    /// Name as exported by the source module
    pub name: String,
    /// Optional `as` alias
    pub alias: Option<String>,
}

/// A class declaration
///
/// A class exposing at least one recognized entry-point method
/// (`spend`, `mint`, `withdraw`, `else_`) emits as a `validator` block;
/// any other class emits as a `pub type` record, with fields taken from
/// its `__init__` parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    /// Class name
    pub name: String,
    /// Base class names (informational; not emitted)
    #[serde(default)]
    pub bases: Vec<String>,
    /// Methods found in the class body, in source order
    pub methods: Vec<FunctionDef>,
}

/// A function definition (top-level function, test, or method)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    /// Function name; a leading `test` marks a test declaration
    pub name: String,
    /// Ordered parameters
    pub params: Vec<Param>,
    /// Return annotation, verbatim from source
    #[serde(default)]
    pub returns: Option<String>,
    /// Body statements, in source order
    pub body: Vec<Stmt>,
}

/// One function parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Type annotation, verbatim from source
    #[serde(default)]
    pub annotation: Option<String>,
    /// Default value expression
    #[serde(default)]
    pub default: Option<Expr>,
}

/// One source statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// `name = expr`
    Assign {
        /// Assignment target name
        target: String,
        /// Right-hand side
        value: Expr,
    },
    /// `name: T = expr` (annotation is retained but not re-emitted)
    AnnAssign {
        /// Assignment target name
        target: String,
        /// Annotation, verbatim from source
        annotation: String,
        /// Right-hand side, if any
        value: Option<Expr>,
    },
    /// `if` / `elif` / `else` chain (nested through `orelse`)
    If {
        /// Condition expression
        test: Expr,
        /// Then-branch statements
        body: Vec<Stmt>,
        /// Else-branch statements; a single nested `If` encodes `elif`
        orelse: Vec<Stmt>,
    },
    /// `return` / `return expr`
    Return {
        /// Returned expression, if any
        value: Option<Expr>,
    },
    /// `assert cond`
    Assert {
        /// Asserted condition
        test: Expr,
    },
    /// `raise ...`; the payload is discarded on emission
    Raise {
        /// Raised expression, if any
        exc: Option<Expr>,
    },
    /// `try: ... except: ...`; handlers are discarded on emission
    Try {
        /// Guarded statements
        body: Vec<Stmt>,
        /// Handler statements (never consulted)
        #[serde(default)]
        handlers: Vec<Stmt>,
    },
    /// A bare expression statement
    ExprStmt(Expr),
    /// `pass`
    Pass,
    /// Any statement kind outside this enumeration
    Unknown {
        /// Source node kind, for the warning message
        construct: String,
    },
}

/// One source expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Integer literal
    Int(i64),
    /// Float literal (Aiken has no float; emitted as-is, typed `Int`)
    Float(f64),
    /// String literal
    Str(String),
    /// Bytes literal
    Bytes(Vec<u8>),
    /// Boolean literal
    Bool(bool),
    /// `None` literal
    NoneLit,
    /// Variable reference
    Name(String),
    /// `value.attr`
    Attribute {
        /// Base expression
        value: Box<Expr>,
        /// Attribute name
        attr: String,
    },
    /// `func(args, kw=...)`
    Call {
        /// Callee expression
        func: Box<Expr>,
        /// Positional arguments
        args: Vec<Expr>,
        /// Keyword arguments
        #[serde(default)]
        kwargs: Vec<Keyword>,
    },
    /// `left op right`
    BinOp {
        /// Left operand
        left: Box<Expr>,
        /// Binary operator
        op: BinaryOp,
        /// Right operand
        right: Box<Expr>,
    },
    /// `a and b and c` / `a or b`
    BoolOp {
        /// Boolean operator
        op: BoolOp,
        /// Operands, two or more
        values: Vec<Expr>,
    },
    /// `op operand`
    UnaryOp {
        /// Unary operator
        op: UnaryOp,
        /// Operand expression
        operand: Box<Expr>,
    },
    /// `left op right` comparison
    Compare {
        /// Left operand
        left: Box<Expr>,
        /// Comparison operator
        op: CompareOp,
        /// Right operand
        right: Box<Expr>,
    },
    /// `[a, b, c]`
    List(Vec<Expr>),
    /// `(a, b)`
    Tuple(Vec<Expr>),
    /// `{k: v, ...}`
    Dict(Vec<(Expr, Expr)>),
    /// `value[index]`
    Index {
        /// Indexed expression
        value: Box<Expr>,
        /// Index expression
        index: Box<Expr>,
    },
    /// `[element for target in iter]`
    ListComp {
        /// Element expression
        element: Box<Expr>,
        /// Loop variable name
        target: String,
        /// Iterated expression
        iter: Box<Expr>,
    },
    /// Any expression kind outside this enumeration
    Unknown(String),
}

/// One keyword argument of a call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    /// Argument name
    pub name: String,
    /// Argument value
    pub value: Expr,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Sub,
    /// Multiplication (`*`)
    Mult,
    /// Division (`/`)
    Div,
    /// Modulo (`%`)
    Mod,
    /// Floor division (`//`); Aiken integer division
    FloorDiv,
    /// Power (`**`); no Aiken spelling, renders the placeholder operator
    Pow,
}

impl BinaryOp {
    /// Aiken spelling for this operator, or `None` if it has none
    #[must_use]
    pub fn to_aiken(self) -> Option<&'static str> {
        match self {
            Self::Add => Some("+"),
            Self::Sub => Some("-"),
            Self::Mult => Some("*"),
            Self::Div | Self::FloorDiv => Some("/"),
            Self::Mod => Some("%"),
            Self::Pow => None,
        }
    }
}

/// Boolean operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoolOp {
    /// Logical and (`and` → `&&`)
    And,
    /// Logical or (`or` → `||`)
    Or,
}

impl BoolOp {
    /// Aiken spelling for this operator
    #[must_use]
    pub fn to_aiken(self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Logical not (`not x` → `!x`)
    Not,
    /// Negation (`-x`)
    Neg,
    /// Positive (`+x`; dropped on emission)
    Pos,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    /// Equal (`==`)
    Eq,
    /// Not equal (`!=`)
    NotEq,
    /// Less than (`<`)
    Lt,
    /// Less than or equal (`<=`)
    LtE,
    /// Greater than (`>`)
    Gt,
    /// Greater than or equal (`>=`)
    GtE,
    /// Membership (`in`); dispatch chains consume this before emission
    In,
    /// Negated membership (`not in`)
    NotIn,
    /// Identity (`is`); `is None` tests consume this before emission
    Is,
    /// Negated identity (`is not`)
    IsNot,
}

impl CompareOp {
    /// Aiken spelling for this operator, or `None` if it has none
    #[must_use]
    pub fn to_aiken(self) -> Option<&'static str> {
        match self {
            Self::Eq | Self::Is => Some("=="),
            Self::NotEq | Self::IsNot => Some("!="),
            Self::Lt => Some("<"),
            Self::LtE => Some("<="),
            Self::Gt => Some(">"),
            Self::GtE => Some(">="),
            Self::In | Self::NotIn => None,
        }
    }
}

impl Expr {
    /// Whether this expression is a literal constant
    #[must_use]
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::Int(_)
                | Self::Float(_)
                | Self::Str(_)
                | Self::Bytes(_)
                | Self::Bool(_)
                | Self::NoneLit
        )
    }

    /// Whether `name` occurs anywhere inside this expression, either as a
    /// direct reference or as the base of an attribute chain
    #[must_use]
    pub fn mentions(&self, name: &str) -> bool {
        match self {
            Self::Name(n) => n == name,
            Self::Attribute { value, .. } => {
                // walk to the base of the chain: tx.foo.bar -> tx
                let mut base = value.as_ref();
                while let Self::Attribute { value, .. } = base {
                    base = value.as_ref();
                }
                matches!(base, Self::Name(n) if n == name) || value.mentions(name)
            }
            Self::Call { func, args, kwargs } => {
                func.mentions(name)
                    || args.iter().any(|a| a.mentions(name))
                    || kwargs.iter().any(|k| k.value.mentions(name))
            }
            Self::BinOp { left, right, .. } | Self::Compare { left, right, .. } => {
                left.mentions(name) || right.mentions(name)
            }
            Self::BoolOp { values, .. } => values.iter().any(|v| v.mentions(name)),
            Self::UnaryOp { operand, .. } => operand.mentions(name),
            Self::List(items) | Self::Tuple(items) => items.iter().any(|i| i.mentions(name)),
            Self::Dict(entries) => entries
                .iter()
                .any(|(k, v)| k.mentions(name) || v.mentions(name)),
            Self::Index { value, index } => value.mentions(name) || index.mentions(name),
            Self::ListComp { element, iter, .. } => {
                element.mentions(name) || iter.mentions(name)
            }
            _ => false,
        }
    }
}
