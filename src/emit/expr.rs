//! Expression rendering
//!
//! `Emitter::expr` is total: every expression shape renders to some text.
//! Unrecognized shapes render to the fixed placeholder and push an
//! `UnsupportedConstruct` warning; nothing here can abort the pass.
//!
//! Reserved-name normalization is global and unconditional: names denoting
//! the optional datum payload collapse to `None` and names denoting the
//! raw redeemer collapse to `Void`, independent of declared type or scope.

use crate::ast::{CompareOp, Expr, Keyword, UnaryOp};
use crate::error::Warning;
use crate::types::is_capitalized;

use super::{quote_string, Emitter, NameScope, PLACEHOLDER};

/// The fixed token a reserved name collapses to, if it is one
fn reserved_token(name: &str) -> Option<&'static str> {
    match name {
        "datum" | "_datum" | "data" => Some("None"),
        "redeemer" | "_redeemer" => Some("Void"),
        _ => None,
    }
}

impl Emitter {
    /// Render one expression to Aiken text
    pub(crate) fn expr(&mut self, expr: &Expr, scope: &NameScope) -> String {
        match expr {
            Expr::Int(n) => n.to_string(),
            Expr::Float(f) => format!("{f}"),
            Expr::Str(s) => quote_string(s),
            Expr::Bytes(bytes) => quote_string(&String::from_utf8_lossy(bytes)),
            Expr::Bool(true) => "True".to_string(),
            Expr::Bool(false) => "False".to_string(),
            Expr::NoneLit => "None".to_string(),

            Expr::Name(name) => {
                if let Some(token) = reserved_token(name) {
                    return token.to_string();
                }
                if let Some(renamed) = scope.lookup(name) {
                    return renamed.to_string();
                }
                name.clone()
            }

            Expr::Attribute { value, attr } => {
                // a Python-side `else_` accessor maps back to `.else`
                if attr == "else_" {
                    let base = self.expr(value, scope);
                    return format!("{base}.else");
                }
                if let Some(token) = reserved_token(attr) {
                    return token.to_string();
                }
                // capitalized attribute: prefer the constructor name alone
                if is_capitalized(attr) {
                    return attr.clone();
                }
                let base = self.expr(value, scope);
                format!("{base}.{attr}")
            }

            Expr::Call { func, args, kwargs } => self.call(func, args, kwargs, scope),

            Expr::BinOp { left, op, right } => {
                let l = self.expr(left, scope);
                let r = self.expr(right, scope);
                let spelled = op.to_aiken().unwrap_or_else(|| {
                    self.warn(Warning::UnsupportedConstruct {
                        construct: format!("binary operator {op:?}"),
                    });
                    "?"
                });
                format!("{l} {spelled} {r}")
            }

            Expr::BoolOp { op, values } => {
                let parts: Vec<String> = values.iter().map(|v| self.expr(v, scope)).collect();
                parts.join(&format!(" {} ", op.to_aiken()))
            }

            Expr::UnaryOp { op, operand } => {
                let inner = self.expr(operand, scope);
                match op {
                    UnaryOp::Not => format!("!{inner}"),
                    UnaryOp::Neg => format!("-{inner}"),
                    UnaryOp::Pos => inner,
                }
            }

            Expr::Compare { left, op, right } => {
                let l = self.expr(left, scope);
                let r = self.expr(right, scope);
                let spelled = match op.to_aiken() {
                    Some(s) => s,
                    None => {
                        // membership outside a dispatch chain has no Aiken form
                        self.warn(Warning::UnsupportedConstruct {
                            construct: format!("comparison operator {op:?}"),
                        });
                        if *op == CompareOp::NotIn {
                            "not in"
                        } else {
                            "in"
                        }
                    }
                };
                format!("{l} {spelled} {r}")
            }

            Expr::List(items) => {
                let inner: Vec<String> = items.iter().map(|i| self.expr(i, scope)).collect();
                format!("[{}]", inner.join(", "))
            }

            Expr::Tuple(items) => {
                let inner: Vec<String> = items.iter().map(|i| self.expr(i, scope)).collect();
                format!("({})", inner.join(", "))
            }

            Expr::Dict(entries) => {
                let inner: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| {
                        let key = self.expr(k, scope);
                        let value = self.expr(v, scope);
                        format!("{key}: {value}")
                    })
                    .collect();
                format!("{{ {} }}", inner.join(", "))
            }

            Expr::Index { value, index } => {
                let base = self.expr(value, scope);
                let idx = self.expr(index, scope);
                format!("{base}[{idx}]")
            }

            Expr::ListComp {
                element,
                target,
                iter,
            } => {
                let elt = self.expr(element, scope);
                let iterable = self.expr(iter, scope);
                format!("map(|{target}| {elt}, {iterable})")
            }

            Expr::Unknown(kind) => {
                self.warn(Warning::UnsupportedConstruct {
                    construct: format!("expression {kind}"),
                });
                PLACEHOLDER.to_string()
            }
        }
    }

    fn call(
        &mut self,
        func: &Expr,
        args: &[Expr],
        kwargs: &[Keyword],
        scope: &NameScope,
    ) -> String {
        // simple callee name, when the callee is a name or attribute
        let callee_name = match func {
            Expr::Name(n) => Some(n.as_str()),
            Expr::Attribute { attr, .. } => Some(attr.as_str()),
            _ => None,
        };

        // callee-level reserved rules: constructing a datum or redeemer
        // wrapper collapses to the fixed token
        match callee_name {
            Some("Datum" | "Data") => return "None".to_string(),
            Some("Redeemer") => return "Void".to_string(),
            Some("Some") => {
                let inner: Vec<String> = args.iter().map(|a| self.expr(a, scope)).collect();
                return format!("Some({})", inner.join(", "));
            }
            _ => {}
        }

        // placeholder() from the mock library is the bare placeholder value
        if matches!(func, Expr::Name(n) if n == "placeholder") && args.is_empty() && kwargs.is_empty()
        {
            return "placeholder".to_string();
        }

        // print("...") becomes a trace
        if matches!(func, Expr::Name(n) if n == "print") {
            if let [Expr::Str(message)] = args {
                return format!("trace @{}", quote_string(message));
            }
        }

        let callee = self.expr(func, scope);

        // capitalized callee: record literal, constructor call, or bare
        // nullary constructor. Lossy: a capitalized plain function is
        // indistinguishable from a constructor here.
        let short = callee.rsplit('.').next().unwrap_or(&callee);
        if is_capitalized(short) {
            if args.is_empty() && kwargs.is_empty() {
                return short.to_string();
            }
            if !kwargs.is_empty() {
                let fields: Vec<String> = kwargs
                    .iter()
                    .map(|kw| {
                        let value = self.expr(&kw.value, scope);
                        format!("{}: {value}", kw.name)
                    })
                    .collect();
                return format!("{short} {{ {} }}", fields.join(", "));
            }
            let inner: Vec<String> = args.iter().map(|a| self.expr(a, scope)).collect();
            return format!("{short}({})", inner.join(", "));
        }

        // generic call
        let mut parts: Vec<String> = args.iter().map(|a| self.expr(a, scope)).collect();
        for kw in kwargs {
            let value = self.expr(&kw.value, scope);
            parts.push(format!("{}={value}", kw.name));
        }
        format!("{callee}({})", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, BoolOp};

    fn render(expr: &Expr) -> (String, Vec<Warning>) {
        let mut emitter = Emitter::new();
        let scope = NameScope::plain();
        let text = emitter.expr(expr, &scope);
        (text, emitter.finish().warnings)
    }

    fn name(n: &str) -> Expr {
        Expr::Name(n.to_string())
    }

    fn call(func: Expr, args: Vec<Expr>) -> Expr {
        Expr::Call {
            func: Box::new(func),
            args,
            kwargs: vec![],
        }
    }

    #[test]
    fn test_literals() {
        assert_eq!(render(&Expr::Int(42)).0, "42");
        assert_eq!(render(&Expr::Bool(true)).0, "True");
        assert_eq!(render(&Expr::Bool(false)).0, "False");
        assert_eq!(render(&Expr::NoneLit).0, "None");
        assert_eq!(render(&Expr::Str("hi".to_string())).0, "\"hi\"");
    }

    #[test]
    fn test_bytes_render_as_string_literal() {
        assert_eq!(render(&Expr::Bytes(b"abc".to_vec())).0, "\"abc\"");
    }

    #[test]
    fn test_reserved_names_collapse() {
        assert_eq!(render(&name("datum")).0, "None");
        assert_eq!(render(&name("_datum")).0, "None");
        assert_eq!(render(&name("data")).0, "None");
        assert_eq!(render(&name("redeemer")).0, "Void");
        assert_eq!(render(&name("_redeemer")).0, "Void");
    }

    #[test]
    fn test_reserved_attribute_collapses() {
        let expr = Expr::Attribute {
            value: Box::new(name("ctx")),
            attr: "redeemer".to_string(),
        };
        assert_eq!(render(&expr).0, "Void");
    }

    #[test]
    fn test_reserved_constructor_collapses() {
        assert_eq!(render(&call(name("Datum"), vec![Expr::Int(1)])).0, "None");
        assert_eq!(render(&call(name("Redeemer"), vec![])).0, "Void");
    }

    #[test]
    fn test_normalization_ignores_scope() {
        // the reserved rule wins even when a scope rename exists
        let mut emitter = Emitter::new();
        let mut scope = NameScope::test();
        scope.bind("datum", "other");
        let text = emitter.expr(&name("datum"), &scope);
        assert_eq!(text, "None");
    }

    #[test]
    fn test_scope_rename_applies() {
        let mut emitter = Emitter::new();
        let mut scope = NameScope::test();
        scope.bind("input_item", "input");
        assert_eq!(emitter.expr(&name("input_item"), &scope), "input");
    }

    #[test]
    fn test_capitalized_attribute_prefers_constructor() {
        let expr = Expr::Attribute {
            value: Box::new(name("tx")),
            attr: "Spend".to_string(),
        };
        assert_eq!(render(&expr).0, "Spend");
    }

    #[test]
    fn test_attribute_chain() {
        let expr = Expr::Attribute {
            value: Box::new(Expr::Attribute {
                value: Box::new(name("tx")),
                attr: "outputs".to_string(),
            }),
            attr: "value".to_string(),
        };
        assert_eq!(render(&expr).0, "tx.outputs.value");
    }

    #[test]
    fn test_constructor_with_kwargs_is_record_literal() {
        let expr = Expr::Call {
            func: Box::new(name("Address")),
            args: vec![],
            kwargs: vec![Keyword {
                name: "payment".to_string(),
                value: name("cred"),
            }],
        };
        assert_eq!(render(&expr).0, "Address { payment: cred }");
    }

    #[test]
    fn test_constructor_with_positional_args() {
        let expr = call(name("Output"), vec![name("addr"), Expr::Int(5)]);
        assert_eq!(render(&expr).0, "Output(addr, 5)");
    }

    #[test]
    fn test_nullary_constructor_is_bare_name() {
        assert_eq!(render(&call(name("VerificationKey"), vec![])).0, "VerificationKey");
    }

    #[test]
    fn test_some_call() {
        assert_eq!(render(&call(name("Some"), vec![Expr::Int(1)])).0, "Some(1)");
    }

    #[test]
    fn test_print_becomes_trace() {
        let expr = call(name("print"), vec![Expr::Str("checking".to_string())]);
        assert_eq!(render(&expr).0, "trace @\"checking\"");
    }

    #[test]
    fn test_placeholder_call_is_bare() {
        assert_eq!(render(&call(name("placeholder"), vec![])).0, "placeholder");
    }

    #[test]
    fn test_generic_call_with_kwargs() {
        let expr = Expr::Call {
            func: Box::new(name("tx_out")),
            args: vec![name("addr")],
            kwargs: vec![Keyword {
                name: "amount".to_string(),
                value: Expr::Int(10),
            }],
        };
        assert_eq!(render(&expr).0, "tx_out(addr, amount=10)");
    }

    #[test]
    fn test_operators() {
        let expr = Expr::BinOp {
            left: Box::new(name("a")),
            op: BinaryOp::Add,
            right: Box::new(Expr::Int(1)),
        };
        assert_eq!(render(&expr).0, "a + 1");

        let expr = Expr::BoolOp {
            op: BoolOp::And,
            values: vec![name("a"), name("b"), name("c")],
        };
        assert_eq!(render(&expr).0, "a && b && c");

        let expr = Expr::UnaryOp {
            op: UnaryOp::Not,
            operand: Box::new(name("ok")),
        };
        assert_eq!(render(&expr).0, "!ok");
    }

    #[test]
    fn test_containers() {
        assert_eq!(render(&Expr::List(vec![Expr::Int(1), Expr::Int(2)])).0, "[1, 2]");
        assert_eq!(render(&Expr::Tuple(vec![name("a"), name("b")])).0, "(a, b)");
        let dict = Expr::Dict(vec![(Expr::Str("k".to_string()), Expr::Int(1))]);
        assert_eq!(render(&dict).0, "{ \"k\": 1 }");
    }

    #[test]
    fn test_index() {
        let expr = Expr::Index {
            value: Box::new(name("xs")),
            index: Box::new(Expr::Int(0)),
        };
        assert_eq!(render(&expr).0, "xs[0]");
    }

    #[test]
    fn test_comprehension_renders_as_map() {
        let expr = Expr::ListComp {
            element: Box::new(Expr::BinOp {
                left: Box::new(name("x")),
                op: BinaryOp::Mult,
                right: Box::new(Expr::Int(2)),
            }),
            target: "x".to_string(),
            iter: Box::new(name("xs")),
        };
        assert_eq!(render(&expr).0, "map(|x| x * 2, xs)");
    }

    #[test]
    fn test_unknown_renders_placeholder_with_warning() {
        let (text, warnings) = render(&Expr::Unknown("Lambda".to_string()));
        assert_eq!(text, PLACEHOLDER);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            Warning::UnsupportedConstruct { construct } if construct.contains("Lambda")
        ));
    }

    #[test]
    fn test_unknown_is_stable() {
        let first = render(&Expr::Unknown("Await".to_string())).0;
        let second = render(&Expr::Unknown("Yield".to_string())).0;
        assert_eq!(first, second);
    }

    #[test]
    fn test_pow_renders_placeholder_operator() {
        let expr = Expr::BinOp {
            left: Box::new(name("a")),
            op: BinaryOp::Pow,
            right: Box::new(Expr::Int(2)),
        };
        let (text, warnings) = render(&expr);
        assert_eq!(text, "a ? 2");
        assert_eq!(warnings.len(), 1);
    }
}
