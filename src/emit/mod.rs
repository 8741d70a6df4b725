//! Aiken text emission
//!
//! One top-down pass over a module's declarations. Each declaration emits
//! one complete Aiken block; blocks are reassembled in original declaration
//! order. The only state carried across declarations is the record-field
//! registry: record types emitted earlier establish field lists that later
//! validator and test emissions consult when destructuring.
//!
//! # Submodules
//!
//! - [`expr`] - expression rendering (total; never fails)
//! - [`stmt`] - statement rendering, including the `when/is` and `|>`
//!   pipeline reconstructions
//! - [`decl`] - record, validator, test, and function emitters

mod decl;
mod expr;
mod stmt;

use std::collections::HashMap;

use serde::Serialize;

use crate::ast::{Expr, Item, Module, Stmt};
use crate::error::Warning;

/// The fixed placeholder token for unrecognized expression shapes
pub const PLACEHOLDER: &str = "<expr>";

/// Output of one transpilation pass
#[derive(Debug, Clone, Serialize)]
pub struct Emitted {
    /// Emitted Aiken source, blocks in declaration order
    pub text: String,
    /// Degraded-path warnings, in encounter order
    pub warnings: Vec<Warning>,
}

/// Identifier renames scoped to the emission of one test declaration
///
/// Created empty at the start of a test's emission and discarded at its
/// end; no scope outlives the declaration that created it. Outside tests
/// an inert [`NameScope::plain`] scope is threaded instead.
#[derive(Debug, Default)]
pub struct NameScope {
    renames: HashMap<String, String>,
    in_test: bool,
}

impl NameScope {
    /// An inert scope for non-test emission
    #[must_use]
    pub fn plain() -> Self {
        Self::default()
    }

    /// A fresh scope for one test's emission
    #[must_use]
    pub fn test() -> Self {
        Self {
            renames: HashMap::new(),
            in_test: true,
        }
    }

    /// Whether this scope belongs to a test emission
    #[must_use]
    pub fn in_test(&self) -> bool {
        self.in_test
    }

    /// Record that `from` resolves to `to` for the rest of this scope
    pub fn bind(&mut self, from: &str, to: &str) {
        self.renames.insert(from.to_string(), to.to_string());
    }

    /// Resolve a source identifier through this scope
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.renames.get(name).map(String::as_str)
    }
}

/// Quote a string as an Aiken string literal
///
/// Escapes backslashes, double quotes, and newlines, then wraps in quotes.
#[must_use]
pub fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Invert [`quote_string`]
///
/// Returns `None` if the input is not a well-formed quoted literal.
#[must_use]
pub fn unquote_string(s: &str) -> Option<String> {
    let inner = s.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '"' {
            // unescaped quote inside the body
            return None;
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            _ => return None,
        }
    }
    Some(out)
}

/// Normalize a name bound by a single-element extraction in a test
///
/// Strips the common collective-noun suffixes (`_item`, `_input`,
/// `_output`, a trailing plural `s`) so that `input_item` extracted from
/// `tx.inputs` binds as `input`. Context-free and idempotent.
#[must_use]
pub fn normalize_element_name(name: &str) -> String {
    if let Some(stripped) = name.strip_suffix("_item") {
        return stripped.to_string();
    }
    for suffix in ["_input", "_output"] {
        if let Some(stripped) = name.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    // naive singularization: inputs -> input
    if name.len() > 1 {
        if let Some(stripped) = name.strip_suffix('s') {
            return stripped.to_string();
        }
    }
    name.to_string()
}

/// Line-oriented Aiken emitter
///
/// Owns the output buffer, the indentation depth, the warning sink, and
/// the record-field registry consulted by destructuring bindings.
#[derive(Debug, Default)]
pub struct Emitter {
    lines: Vec<String>,
    indent: usize,
    record_fields: HashMap<String, Vec<String>>,
    warnings: Vec<Warning>,
}

impl Emitter {
    /// Create an empty emitter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit one module and consume the emitter
    #[must_use]
    pub fn module(mut self, module: &Module) -> Emitted {
        for item in &module.body {
            self.item(item);
        }
        self.finish()
    }

    /// Finish emission, assembling lines into the output text
    #[must_use]
    pub fn finish(self) -> Emitted {
        Emitted {
            text: self.lines.join("\n"),
            warnings: self.warnings,
        }
    }

    pub(crate) fn write(&mut self, line: impl Into<String>) {
        let line = line.into();
        if line.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{line}", "  ".repeat(self.indent)));
        }
    }

    pub(crate) fn push(&mut self) {
        self.indent += 1;
    }

    pub(crate) fn pop(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub(crate) fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub(crate) fn record_fields(&self, name: &str) -> Option<&[String]> {
        self.record_fields.get(name).map(Vec::as_slice)
    }

    pub(crate) fn register_record(&mut self, name: &str, fields: Vec<String>) {
        self.record_fields.insert(name.to_string(), fields);
    }

    /// Warnings pushed so far; used to roll back speculative rendering
    pub(crate) fn warning_mark(&self) -> usize {
        self.warnings.len()
    }

    pub(crate) fn truncate_warnings(&mut self, mark: usize) {
        self.warnings.truncate(mark);
    }
}

/// Whether a statement is a docstring (a bare string-literal expression)
#[must_use]
pub(crate) fn is_docstring(stmt: &Stmt) -> bool {
    matches!(stmt, Stmt::ExprStmt(Expr::Str(_)))
}

/// Whether a top-level statement is the `if __name__ == "__main__"` guard
fn is_main_guard(stmt: &Stmt) -> bool {
    if let Stmt::If { test, .. } = stmt {
        if let Expr::Compare { left, .. } = test {
            return matches!(left.as_ref(), Expr::Name(n) if n == "__name__");
        }
    }
    false
}

/// Transpile one module to Aiken text
///
/// A single synchronous pass in declaration order. Never fails: degraded
/// paths surface in [`Emitted::warnings`] while the text is still
/// produced.
#[must_use]
pub fn transpile(module: &Module) -> Emitted {
    Emitter::new().module(module)
}

impl Emitter {
    fn item(&mut self, item: &Item) {
        match item {
            Item::Import { module, alias } => self.import(module, alias.as_deref()),
            Item::ImportFrom { module, names } => self.import_from(module, names),
            Item::Class(class) => self.class(class),
            Item::Function(func) => self.function(func),
            Item::Stmt(stmt) => {
                if is_main_guard(stmt) {
                    return;
                }
                let mut scope = NameScope::plain();
                self.stmt(stmt, &mut scope);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_plain() {
        assert_eq!(quote_string("hello"), "\"hello\"");
    }

    #[test]
    fn test_quote_escapes_embedded_quotes() {
        assert_eq!(quote_string("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_quote_round_trip() {
        for original in ["", "plain", "with \"quotes\"", "back\\slash", "line\nbreak"] {
            let quoted = quote_string(original);
            assert_eq!(unquote_string(&quoted).as_deref(), Some(original));
        }
    }

    #[test]
    fn test_unquote_rejects_malformed() {
        assert_eq!(unquote_string("no quotes"), None);
        assert_eq!(unquote_string("\"dangling escape\\"), None);
        assert_eq!(unquote_string("\"bad\"inner\""), None);
    }

    #[test]
    fn test_normalize_element_name_suffixes() {
        assert_eq!(normalize_element_name("input_item"), "input");
        assert_eq!(normalize_element_name("first_input"), "first");
        assert_eq!(normalize_element_name("change_output"), "change");
        assert_eq!(normalize_element_name("inputs"), "input");
        assert_eq!(normalize_element_name("utxo"), "utxo");
    }

    #[test]
    fn test_normalize_element_name_idempotent() {
        for name in ["input_item", "outputs", "first_input", "s", "x"] {
            let once = normalize_element_name(name);
            assert_eq!(normalize_element_name(&once), once);
        }
    }

    #[test]
    fn test_name_scope_resolves_binding() {
        let mut scope = NameScope::test();
        scope.bind("input_item", "input");
        assert_eq!(scope.lookup("input_item"), Some("input"));
        assert_eq!(scope.lookup("other"), None);
        assert!(scope.in_test());
    }

    #[test]
    fn test_plain_scope_is_inert() {
        let scope = NameScope::plain();
        assert!(!scope.in_test());
        assert_eq!(scope.lookup("anything"), None);
    }

    #[test]
    fn test_main_guard_detection() {
        let guard = Stmt::If {
            test: Expr::Compare {
                left: Box::new(Expr::Name("__name__".to_string())),
                op: crate::ast::CompareOp::Eq,
                right: Box::new(Expr::Str("__main__".to_string())),
            },
            body: vec![Stmt::Pass],
            orelse: vec![],
        };
        assert!(is_main_guard(&guard));
        assert!(!is_main_guard(&Stmt::Pass));
    }

    #[test]
    fn test_emitter_indentation() {
        let mut emitter = Emitter::new();
        emitter.write("a {");
        emitter.push();
        emitter.write("b");
        emitter.pop();
        emitter.write("}");
        let emitted = emitter.finish();
        assert_eq!(emitted.text, "a {\n  b\n}");
    }
}
