//! Statement rendering
//!
//! Hosts the two idiom reconstructions: discriminated dispatch
//! (`isinstance`/membership if-chains over one anchor variable become
//! `when/is` matches) and pipelines (contiguous same-variable
//! reassignments before a `return` become `|>` stages).
//!
//! Both reconstructions are guarded by strict structural preconditions;
//! when those fail the statement falls back to the generic rendering path
//! and an `AmbiguousPattern` warning is pushed when the shape looked like
//! a near miss.

use crate::ast::{CompareOp, Expr, Keyword, Stmt};
use crate::error::Warning;
use crate::types::is_capitalized;

use super::{is_docstring, normalize_element_name, Emitter, NameScope};

/// A reconstructed pipeline found at the tail of a function body
#[derive(Debug)]
pub(crate) struct Pipeline<'a> {
    /// Index in the body where the reassignment chain begins
    pub start: usize,
    /// Base expression: the RHS of the first assignment
    pub base: &'a Expr,
    /// Rendered `|>` stages, one per later reassignment
    pub stages: Vec<String>,
}

impl Emitter {
    /// Render a statement list, skipping docstrings
    pub(crate) fn stmts(&mut self, body: &[Stmt], scope: &mut NameScope) {
        for stmt in body {
            if !is_docstring(stmt) {
                self.stmt(stmt, scope);
            }
        }
    }

    /// Render one statement into zero or more output lines
    pub(crate) fn stmt(&mut self, stmt: &Stmt, scope: &mut NameScope) {
        match stmt {
            Stmt::Assign { target, value } => self.assign(target, value, scope),

            Stmt::AnnAssign {
                target,
                value: Some(value),
                ..
            } => {
                let rendered = self.expr(value, scope);
                self.write(format!("let {target} = {rendered}"));
            }
            // a bare annotation binds nothing
            Stmt::AnnAssign { value: None, .. } => {}

            Stmt::If { test, body, orelse } => self.conditional(test, body, orelse, scope),

            Stmt::Return { value: Some(value) } => {
                let rendered = self.expr(value, scope);
                self.write(rendered);
            }
            Stmt::Return { value: None } => self.write("()"),

            Stmt::Assert { test } => {
                let cond = self.expr(test, scope);
                self.write(format!("expect {cond}"));
            }

            // the raised payload carries no Aiken meaning
            Stmt::Raise { .. } => self.write("fail"),

            Stmt::Try { body, .. } => self.try_block(body, scope),

            Stmt::ExprStmt(value) => {
                let rendered = self.expr(value, scope);
                self.write(rendered);
            }

            Stmt::Pass => {}

            Stmt::Unknown { construct } => {
                self.warn(Warning::UnsupportedConstruct {
                    construct: format!("statement {construct}"),
                });
                self.write(format!("// unsupported: {construct}"));
            }
        }
    }

    fn assign(&mut self, target: &str, value: &Expr, scope: &mut NameScope) {
        // Test-only idiom: binding one element out of an inputs/outputs
        // collection becomes a single-element list expect.
        if scope.in_test() {
            if let Expr::Index { value: base, .. } = value {
                let mark = self.warning_mark();
                let base_text = self.expr(base, scope);
                let structural = matches!(
                    base.as_ref(),
                    Expr::Attribute { attr, .. } if attr == "inputs" || attr == "outputs"
                );
                if structural
                    || base_text.ends_with(".inputs")
                    || base_text.ends_with(".outputs")
                {
                    let normalized = normalize_element_name(target);
                    if normalized != target {
                        scope.bind(target, &normalized);
                    }
                    self.write(format!("expect [{normalized}] = {base_text}"));
                    return;
                }
                self.truncate_warnings(mark);
            }
        }

        // Constructor on the RHS
        if let Expr::Call { func, kwargs, .. } = value {
            let callee = match func.as_ref() {
                Expr::Name(n) => Some(n.as_str()),
                Expr::Attribute { attr, .. } => Some(attr.as_str()),
                _ => None,
            };
            if let Some(ctor) = callee.filter(|c| is_capitalized(c)) {
                // Capitalized LHS: the binding destructures the value into
                // the constructor's known fields.
                if is_capitalized(target) {
                    let fields = self.record_fields(ctor).map(<[String]>::to_vec);
                    match fields {
                        Some(fields) if !fields.is_empty() => {
                            self.write(format!("let {ctor} {{"));
                            self.push();
                            for field in fields {
                                self.write(format!("{field},"));
                            }
                            self.pop();
                            self.write(format!("}} = {target}"));
                        }
                        _ => self.write(format!("let {ctor} {{ .. }} = {target}")),
                    }
                    return;
                }

                if !kwargs.is_empty() {
                    let fields: Vec<String> = kwargs
                        .iter()
                        .map(|kw| {
                            let value = self.expr(&kw.value, scope);
                            format!("{}: {value}", kw.name)
                        })
                        .collect();
                    self.write(format!("let {target} = {ctor} {{ {} }}", fields.join(", ")));
                    return;
                }
            }
        }

        let rendered = self.expr(value, scope);
        self.write(format!("let {target} = {rendered}"));
    }

    fn conditional(&mut self, test: &Expr, body: &[Stmt], orelse: &[Stmt], scope: &mut NameScope) {
        // Optional-unwrap idiom: `if x is None:` guards become an expect
        // that the option is populated; the guard body (usually a raise)
        // is dropped.
        if let Expr::Compare {
            left,
            op: CompareOp::Is,
            right,
        } = test
        {
            if let (Expr::Name(var), Expr::NoneLit) = (left.as_ref(), right.as_ref()) {
                self.write(format!("expect Some({var}) = {var}"));
                return;
            }
        }

        let (chain, final_else) = collect_chain(test, body, orelse);

        if let Some(anchor) = dispatch_anchor(&chain) {
            // scope renames apply to the subject; the reserved-token
            // collapse does not, since the anchor is a pattern variable
            let subject = scope.lookup(anchor).unwrap_or(anchor);
            self.write(format!("when {subject} is {{"));
            self.push();
            for (test, branch) in &chain {
                // precondition guarantees a single return
                let result = match branch {
                    [Stmt::Return { value: Some(value) }] => self.expr(value, scope),
                    _ => "False".to_string(),
                };
                for variant in self.variants(test, scope) {
                    self.write(format!("{variant} -> {result}"));
                }
            }
            match final_else {
                [] => {
                    self.warn(Warning::NonExhaustiveMatch {
                        anchor: anchor.to_string(),
                    });
                }
                [Stmt::Return { value: Some(value) }] => {
                    let result = self.expr(value, scope);
                    self.write(format!("_ -> {result}"));
                }
                _ => self.write("_ -> False"),
            }
            self.pop();
            self.write("}");
            return;
        }

        // a near miss: some branch tested the value's shape, but the chain
        // as a whole failed the dispatch preconditions
        if chain.iter().any(|(test, _)| test_anchor(test).is_some()) {
            self.warn(Warning::AmbiguousPattern {
                reason: "conditional chain mixes shape tests with other branches".to_string(),
            });
        }

        let cond = self.expr(test, scope);
        self.write(format!("if {cond} {{"));
        self.push();
        self.stmts(body, scope);
        self.pop();
        if orelse.is_empty() {
            self.write("}");
        } else {
            self.write("} else {");
            self.push();
            self.stmts(orelse, scope);
            self.pop();
            self.write("}");
        }
    }

    fn try_block(&mut self, body: &[Stmt], scope: &mut NameScope) {
        // A guarded call asserts that the call fails: render it negated.
        if let [Stmt::ExprStmt(expr)] = body {
            if matches!(expr, Expr::Call { .. }) {
                let call = self.expr(expr, scope);
                self.write(format!("!{call}"));
                return;
            }
        }
        self.warn(Warning::AmbiguousPattern {
            reason: "try block is not a single guarded call".to_string(),
        });
        self.write("expect False");
    }

    /// Variant patterns named by one dispatch test
    fn variants(&mut self, test: &Expr, scope: &NameScope) -> Vec<String> {
        let mut result = Vec::new();
        match test {
            // isinstance(x, A) or isinstance(x, (A, B))
            Expr::Call { args, .. } => {
                if let Some(types) = args.get(1) {
                    match types {
                        Expr::Name(n) => result.push(n.clone()),
                        Expr::Tuple(items) | Expr::List(items) => {
                            for item in items {
                                if let Expr::Name(n) = item {
                                    result.push(n.clone());
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            // x in (A, B) / x in [A, B]
            Expr::Compare { right, .. } => match right.as_ref() {
                Expr::Tuple(items) | Expr::List(items) => {
                    for item in items {
                        result.push(self.variant_pattern(item, scope));
                    }
                }
                other => result.push(self.variant_pattern(other, scope)),
            },
            _ => {}
        }
        result
    }

    fn variant_pattern(&mut self, expr: &Expr, scope: &NameScope) -> String {
        match expr {
            Expr::Name(n) => n.clone(),
            Expr::Attribute { value, attr } => {
                if is_capitalized(attr) {
                    attr.clone()
                } else {
                    let base = self.expr(value, scope);
                    format!("{base}.{attr}")
                }
            }
            literal if literal.is_literal() => self.expr(literal, scope),
            _ => "<variant>".to_string(),
        }
    }

    /// Detect a pipeline at the tail of a function body
    ///
    /// Preconditions: the final statement is `return v`, immediately
    /// preceded by a contiguous run of reassignments to `v`. The first
    /// assignment becomes the base expression; each later assignment
    /// becomes a stage only if its call can be rewritten with `v` elided.
    pub(crate) fn try_pipeline<'a>(
        &mut self,
        body: &'a [Stmt],
        scope: &NameScope,
    ) -> Option<Pipeline<'a>> {
        let (last, rest) = body.split_last()?;
        let var = match last {
            Stmt::Return { value: Some(Expr::Name(var)) } => var,
            _ => return None,
        };

        // contiguous reassignments to the returned variable
        let mut start = rest.len();
        while start > 0 {
            match &rest[start - 1] {
                Stmt::Assign { target, .. } if target == var => start -= 1,
                _ => break,
            }
        }
        let assigns = &rest[start..];
        if assigns.is_empty() {
            return None;
        }

        let base = match &assigns[0] {
            Stmt::Assign { value, .. } => value,
            _ => return None,
        };

        let mark = self.warning_mark();
        let mut stages = Vec::with_capacity(assigns.len() - 1);
        for assign in &assigns[1..] {
            let Stmt::Assign { value, .. } = assign else {
                continue;
            };
            if let Some(stage) = self.stage_from_rhs(value, var, scope) {
                stages.push(stage);
                continue;
            }
            // pipeline shape was close but a reassignment cannot become a
            // stage; roll back any warnings from speculative rendering
            self.truncate_warnings(mark);
            self.warn(Warning::AmbiguousPattern {
                reason: format!("reassignment of `{var}` cannot be rewritten as a stage"),
            });
            return None;
        }

        Some(Pipeline { start, base, stages })
    }

    /// Rewrite one reassignment RHS as a pipeline stage, eliding the
    /// threaded variable
    fn stage_from_rhs(&mut self, rhs: &Expr, var: &str, scope: &NameScope) -> Option<String> {
        if let Expr::Call { func, args, kwargs } = rhs {
            // v.pipe(fn, a, b) -> fn(a, b)
            if let Expr::Attribute { value, attr } = func.as_ref() {
                if attr == "pipe" && matches!(value.as_ref(), Expr::Name(n) if n == var) {
                    let callee = args.first()?;
                    let callee = self.expr(callee, scope);
                    let rest = self.stage_args(&args[1..], kwargs, scope);
                    return Some(format!("{callee}({rest})"));
                }
                // v.method(a, b) -> method(a, b)
                if matches!(value.as_ref(), Expr::Name(n) if n == var) {
                    let rest = self.stage_args(args, kwargs, scope);
                    return Some(format!("{attr}({rest})"));
                }
            }

            // fn(v, a, b) -> fn(a, b)
            if matches!(args.first(), Some(Expr::Name(n)) if n == var) {
                let callee = self.expr(func, scope);
                let rest = self.stage_args(&args[1..], kwargs, scope);
                return Some(format!("{callee}({rest})"));
            }

            // v threaded somewhere else in the argument list: elide every
            // occurrence so the piped value takes its place
            let occurs = |e: &Expr| {
                matches!(e, Expr::Name(n) if n == var)
                    || matches!(e, Expr::Attribute { value, .. }
                        if matches!(value.as_ref(), Expr::Name(n) if n == var))
            };
            if args.iter().any(&occurs) || kwargs.iter().any(|kw| occurs(&kw.value)) {
                let kept_args: Vec<Expr> =
                    args.iter().filter(|&a| !occurs(a)).cloned().collect();
                let kept_kwargs: Vec<Keyword> = kwargs
                    .iter()
                    .filter(|kw| !occurs(&kw.value))
                    .cloned()
                    .collect();
                let callee = self.expr(func, scope);
                let rest = self.stage_args(&kept_args, &kept_kwargs, scope);
                return Some(format!("{callee}({rest})"));
            }

            // the call never mentions v: context-building stage, keep whole
            if !rhs.mentions(var) {
                return Some(self.expr(rhs, scope));
            }
            return None;
        }

        // simple non-call RHS forms are acceptable as stages verbatim
        if matches!(rhs, Expr::Attribute { .. } | Expr::Name(_) | Expr::Index { .. }) {
            return Some(self.expr(rhs, scope));
        }

        None
    }

    fn stage_args(&mut self, args: &[Expr], kwargs: &[Keyword], scope: &NameScope) -> String {
        let mut parts: Vec<String> = args.iter().map(|a| self.expr(a, scope)).collect();
        for kw in kwargs {
            let value = self.expr(&kw.value, scope);
            parts.push(format!("{}={value}", kw.name));
        }
        parts.join(", ")
    }
}

/// Flatten an if/elif/else chain into `(test, branch)` pairs plus the
/// final else branch
fn collect_chain<'a>(
    test: &'a Expr,
    body: &'a [Stmt],
    orelse: &'a [Stmt],
) -> (Vec<(&'a Expr, &'a [Stmt])>, &'a [Stmt]) {
    let mut chain = vec![(test, body)];
    let mut rest = orelse;
    while let [Stmt::If { test, body, orelse }] = rest {
        chain.push((test, body.as_slice()));
        rest = orelse;
    }
    (chain, rest)
}

/// The anchor variable of one dispatch-shaped test, if it is one
fn test_anchor(test: &Expr) -> Option<&str> {
    match test {
        // isinstance(x, ...)
        Expr::Call { func, args, .. } => {
            if matches!(func.as_ref(), Expr::Name(n) if n == "isinstance") {
                if let Some(Expr::Name(var)) = args.first() {
                    return Some(var);
                }
            }
            None
        }
        // x in (...)
        Expr::Compare {
            left,
            op: CompareOp::In,
            ..
        } => match left.as_ref() {
            Expr::Name(var) => Some(var),
            _ => None,
        },
        _ => None,
    }
}

/// The single anchor variable of a reconstructable dispatch chain
///
/// Fires only if every branch tests the same anchor variable and every
/// branch body is exactly one return statement.
fn dispatch_anchor<'a>(chain: &[(&'a Expr, &'a [Stmt])]) -> Option<&'a str> {
    let mut anchor: Option<&str> = None;
    for (test, branch) in chain {
        if !matches!(branch, [Stmt::Return { value: Some(_) }]) {
            return None;
        }
        let var = test_anchor(test)?;
        match anchor {
            None => anchor = Some(var),
            Some(a) if a == var => {}
            Some(_) => return None,
        }
    }
    anchor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;

    fn name(n: &str) -> Expr {
        Expr::Name(n.to_string())
    }

    fn call(func: &str, args: Vec<Expr>) -> Expr {
        Expr::Call {
            func: Box::new(name(func)),
            args,
            kwargs: vec![],
        }
    }

    fn isinstance(var: &str, ty: &str) -> Expr {
        call("isinstance", vec![name(var), name(ty)])
    }

    fn ret(expr: Expr) -> Stmt {
        Stmt::Return { value: Some(expr) }
    }

    fn assign(target: &str, value: Expr) -> Stmt {
        Stmt::Assign {
            target: target.to_string(),
            value,
        }
    }

    fn render(stmt: &Stmt) -> (String, Vec<Warning>) {
        let mut emitter = Emitter::new();
        let mut scope = NameScope::plain();
        emitter.stmt(stmt, &mut scope);
        let emitted = emitter.finish();
        (emitted.text, emitted.warnings)
    }

    fn dispatch_chain(with_else: bool) -> Stmt {
        let orelse = if with_else {
            vec![ret(Expr::Str("zero".to_string()))]
        } else {
            vec![]
        };
        Stmt::If {
            test: isinstance("x", "A"),
            body: vec![ret(Expr::Str("one".to_string()))],
            orelse: vec![Stmt::If {
                test: isinstance("x", "B"),
                body: vec![ret(Expr::Str("two".to_string()))],
                orelse,
            }],
        }
    }

    #[test]
    fn test_let_binding() {
        let (text, _) = render(&assign("total", Expr::Int(5)));
        assert_eq!(text, "let total = 5");
    }

    #[test]
    fn test_constructor_kwargs_binding() {
        let stmt = Stmt::Assign {
            target: "addr".to_string(),
            value: Expr::Call {
                func: Box::new(name("Address")),
                args: vec![],
                kwargs: vec![Keyword {
                    name: "payment".to_string(),
                    value: name("cred"),
                }],
            },
        };
        let (text, _) = render(&stmt);
        assert_eq!(text, "let addr = Address { payment: cred }");
    }

    #[test]
    fn test_capitalized_lhs_destructures_known_fields() {
        let mut emitter = Emitter::new();
        emitter.register_record("Foo", vec!["amount".to_string(), "owner".to_string()]);
        let mut scope = NameScope::plain();
        emitter.stmt(
            &Stmt::Assign {
                target: "Wrapped".to_string(),
                value: call("Foo", vec![name("x")]),
            },
            &mut scope,
        );
        let text = emitter.finish().text;
        assert_eq!(text, "let Foo {\n  amount,\n  owner,\n} = Wrapped");
    }

    #[test]
    fn test_capitalized_lhs_unknown_fields_open_destructure() {
        let (text, _) = render(&Stmt::Assign {
            target: "Wrapped".to_string(),
            value: call("Foo", vec![name("x")]),
        });
        assert_eq!(text, "let Foo { .. } = Wrapped");
    }

    #[test]
    fn test_dispatch_chain_with_else() {
        let (text, warnings) = render(&dispatch_chain(true));
        assert_eq!(
            text,
            "when x is {\n  A -> \"one\"\n  B -> \"two\"\n  _ -> \"zero\"\n}"
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_dispatch_chain_without_else_is_non_exhaustive() {
        let (text, warnings) = render(&dispatch_chain(false));
        assert!(text.contains("when x is {"));
        assert!(!text.contains("_ ->"));
        assert_eq!(
            warnings,
            vec![Warning::NonExhaustiveMatch {
                anchor: "x".to_string()
            }]
        );
    }

    #[test]
    fn test_dispatch_arm_count_matches_branch_count() {
        let (text, _) = render(&dispatch_chain(true));
        let arms = text.matches(" -> ").count();
        assert_eq!(arms, 3); // two branches plus the default
    }

    #[test]
    fn test_membership_test_yields_one_arm_per_variant() {
        let stmt = Stmt::If {
            test: Expr::Compare {
                left: Box::new(name("action")),
                op: CompareOp::In,
                right: Box::new(Expr::Tuple(vec![name("Mint"), name("Burn")])),
            },
            body: vec![ret(Expr::Bool(true))],
            orelse: vec![ret(Expr::Bool(false))],
        };
        let (text, _) = render(&stmt);
        assert_eq!(
            text,
            "when action is {\n  Mint -> True\n  Burn -> True\n  _ -> False\n}"
        );
    }

    #[test]
    fn test_dispatch_subject_keeps_reserved_anchor_name() {
        // dispatching on the redeemer is the canonical validator pattern;
        // the subject must stay `redeemer`, not collapse to `Void`
        let stmt = Stmt::If {
            test: isinstance("redeemer", "Mint"),
            body: vec![ret(Expr::Bool(true))],
            orelse: vec![ret(Expr::Bool(false))],
        };
        let (text, _) = render(&stmt);
        assert_eq!(text, "when redeemer is {\n  Mint -> True\n  _ -> False\n}");
    }

    #[test]
    fn test_dispatch_subject_applies_scope_rename() {
        let mut emitter = Emitter::new();
        let mut scope = NameScope::test();
        scope.bind("input_item", "input");
        emitter.stmt(
            &Stmt::If {
                test: isinstance("input_item", "Spend"),
                body: vec![ret(Expr::Bool(true))],
                orelse: vec![ret(Expr::Bool(false))],
            },
            &mut scope,
        );
        let text = emitter.finish().text;
        assert!(text.starts_with("when input is {"));
    }

    #[test]
    fn test_mixed_anchor_falls_back_to_generic_if() {
        let stmt = Stmt::If {
            test: isinstance("x", "A"),
            body: vec![ret(Expr::Int(1))],
            orelse: vec![Stmt::If {
                test: isinstance("y", "B"),
                body: vec![ret(Expr::Int(2))],
                orelse: vec![],
            }],
        };
        let (text, warnings) = render(&stmt);
        assert!(text.starts_with("if isinstance(x, A) {"));
        assert!(matches!(&warnings[0], Warning::AmbiguousPattern { .. }));
    }

    #[test]
    fn test_multi_statement_branch_falls_back_to_generic_if() {
        let stmt = Stmt::If {
            test: isinstance("x", "A"),
            body: vec![assign("y", Expr::Int(1)), ret(name("y"))],
            orelse: vec![],
        };
        let (text, warnings) = render(&stmt);
        assert!(text.starts_with("if "));
        assert!(matches!(&warnings[0], Warning::AmbiguousPattern { .. }));
    }

    #[test]
    fn test_plain_boolean_if_has_no_warning() {
        let stmt = Stmt::If {
            test: name("ok"),
            body: vec![ret(Expr::Bool(true))],
            orelse: vec![ret(Expr::Bool(false))],
        };
        let (text, warnings) = render(&stmt);
        assert_eq!(text, "if ok {\n  True\n} else {\n  False\n}");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_is_none_guard_becomes_expect_some() {
        let stmt = Stmt::If {
            test: Expr::Compare {
                left: Box::new(name("payload")),
                op: CompareOp::Is,
                right: Box::new(Expr::NoneLit),
            },
            body: vec![Stmt::Raise { exc: None }],
            orelse: vec![],
        };
        let (text, _) = render(&stmt);
        assert_eq!(text, "expect Some(payload) = payload");
    }

    #[test]
    fn test_assert_becomes_expect() {
        let stmt = Stmt::Assert {
            test: Expr::Compare {
                left: Box::new(name("n")),
                op: CompareOp::Gt,
                right: Box::new(Expr::Int(0)),
            },
        };
        let (text, _) = render(&stmt);
        assert_eq!(text, "expect n > 0");
    }

    #[test]
    fn test_raise_becomes_fail() {
        let stmt = Stmt::Raise {
            exc: Some(call("ValueError", vec![Expr::Str("no".to_string())])),
        };
        let (text, _) = render(&stmt);
        assert_eq!(text, "fail");
    }

    #[test]
    fn test_try_single_call_negates() {
        let stmt = Stmt::Try {
            body: vec![Stmt::ExprStmt(Expr::Call {
                func: Box::new(Expr::Attribute {
                    value: Box::new(name("validator")),
                    attr: "spend".to_string(),
                }),
                args: vec![name("a"), name("b")],
                kwargs: vec![],
            })],
            handlers: vec![],
        };
        let (text, warnings) = render(&stmt);
        assert_eq!(text, "!validator.spend(a, b)");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_try_other_shape_expects_false() {
        let stmt = Stmt::Try {
            body: vec![assign("x", Expr::Int(1)), Stmt::Pass],
            handlers: vec![],
        };
        let (text, warnings) = render(&stmt);
        assert_eq!(text, "expect False");
        assert!(matches!(&warnings[0], Warning::AmbiguousPattern { .. }));
    }

    #[test]
    fn test_empty_return_is_unit() {
        let (text, _) = render(&Stmt::Return { value: None });
        assert_eq!(text, "()");
    }

    #[test]
    fn test_unknown_statement_placeholder_and_warning() {
        let (text, warnings) = render(&Stmt::Unknown {
            construct: "With".to_string(),
        });
        assert_eq!(text, "// unsupported: With");
        assert_eq!(warnings.len(), 1);
    }

    // --- pipeline reconstruction ---

    fn pipeline_of(body: &[Stmt]) -> (Option<(usize, usize)>, Vec<Warning>) {
        let mut emitter = Emitter::new();
        let scope = NameScope::plain();
        let found = emitter
            .try_pipeline(body, &scope)
            .map(|p| (p.start, p.stages.len()));
        (found, emitter.finish().warnings)
    }

    #[test]
    fn test_pipeline_stage_per_reassignment() {
        let body = vec![
            assign("t", call("base", vec![])),
            assign("t", call("step1", vec![name("t"), Expr::Int(1)])),
            assign("t", call("step2", vec![name("t"), Expr::Int(2)])),
            ret(name("t")),
        ];
        let (found, warnings) = pipeline_of(&body);
        assert_eq!(found, Some((0, 2)));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_pipeline_stage_text_elides_threaded_var() {
        let mut emitter = Emitter::new();
        let scope = NameScope::plain();
        let body = vec![
            assign("t", call("base", vec![])),
            assign("t", call("step1", vec![name("t"), Expr::Int(1)])),
            ret(name("t")),
        ];
        let pipeline = emitter.try_pipeline(&body, &scope).expect("pipeline");
        assert_eq!(pipeline.stages, vec!["step1(1)".to_string()]);
    }

    #[test]
    fn test_pipeline_method_call_stage() {
        let body = vec![
            assign("tx", call("mock_tx", vec![])),
            assign(
                "tx",
                Expr::Call {
                    func: Box::new(Expr::Attribute {
                        value: Box::new(name("tx")),
                        attr: "complete".to_string(),
                    }),
                    args: vec![],
                    kwargs: vec![],
                },
            ),
            ret(name("tx")),
        ];
        let mut emitter = Emitter::new();
        let scope = NameScope::plain();
        let pipeline = emitter.try_pipeline(&body, &scope).expect("pipeline");
        assert_eq!(pipeline.stages, vec!["complete()".to_string()]);
    }

    #[test]
    fn test_pipeline_pipe_helper_stage() {
        let body = vec![
            assign("tx", call("mock_tx", vec![])),
            assign(
                "tx",
                Expr::Call {
                    func: Box::new(Expr::Attribute {
                        value: Box::new(name("tx")),
                        attr: "pipe".to_string(),
                    }),
                    args: vec![name("tx_in"), name("utxo")],
                    kwargs: vec![],
                },
            ),
            ret(name("tx")),
        ];
        let mut emitter = Emitter::new();
        let scope = NameScope::plain();
        let pipeline = emitter.try_pipeline(&body, &scope).expect("pipeline");
        assert_eq!(pipeline.stages, vec!["tx_in(utxo)".to_string()]);
    }

    #[test]
    fn test_pipeline_var_free_call_kept_whole() {
        let body = vec![
            assign("tx", call("mock_tx", vec![])),
            assign("tx", call("tx_in", vec![name("utxo")])),
            ret(name("tx")),
        ];
        let mut emitter = Emitter::new();
        let scope = NameScope::plain();
        let pipeline = emitter.try_pipeline(&body, &scope).expect("pipeline");
        assert_eq!(pipeline.stages, vec!["tx_in(utxo)".to_string()]);
    }

    #[test]
    fn test_pipeline_single_assign_has_no_stages() {
        let body = vec![assign("t", call("base", vec![])), ret(name("t"))];
        let (found, _) = pipeline_of(&body);
        assert_eq!(found, Some((0, 0)));
    }

    #[test]
    fn test_no_pipeline_without_trailing_return() {
        let body = vec![assign("t", call("base", vec![]))];
        let (found, warnings) = pipeline_of(&body);
        assert_eq!(found, None);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_no_pipeline_when_return_is_not_a_name() {
        let body = vec![assign("t", call("base", vec![])), ret(Expr::Int(1))];
        assert_eq!(pipeline_of(&body).0, None);
    }

    #[test]
    fn test_pipeline_aborts_on_unrewritable_stage() {
        // `t` appears nested inside an arithmetic RHS: not elidable
        let body = vec![
            assign("t", call("base", vec![])),
            assign(
                "t",
                Expr::BinOp {
                    left: Box::new(name("t")),
                    op: BinaryOp::Add,
                    right: Box::new(Expr::Int(1)),
                },
            ),
            ret(name("t")),
        ];
        let (found, warnings) = pipeline_of(&body);
        assert_eq!(found, None);
        assert!(matches!(&warnings[0], Warning::AmbiguousPattern { .. }));
    }

    #[test]
    fn test_pipeline_skips_leading_statements() {
        let body = vec![
            Stmt::Assert { test: name("ok") },
            assign("t", call("base", vec![])),
            assign("t", call("step", vec![name("t")])),
            ret(name("t")),
        ];
        let (found, _) = pipeline_of(&body);
        assert_eq!(found, Some((1, 1)));
    }

    // --- test-scope extraction ---

    #[test]
    fn test_inputs_extraction_in_test_scope() {
        let mut emitter = Emitter::new();
        let mut scope = NameScope::test();
        let stmt = Stmt::Assign {
            target: "input_item".to_string(),
            value: Expr::Index {
                value: Box::new(Expr::Attribute {
                    value: Box::new(name("tx")),
                    attr: "inputs".to_string(),
                }),
                index: Box::new(Expr::Int(0)),
            },
        };
        emitter.stmt(&stmt, &mut scope);
        assert_eq!(scope.lookup("input_item"), Some("input"));
        assert_eq!(emitter.finish().text, "expect [input] = tx.inputs");
    }

    #[test]
    fn test_inputs_extraction_ignored_outside_tests() {
        let stmt = Stmt::Assign {
            target: "input_item".to_string(),
            value: Expr::Index {
                value: Box::new(Expr::Attribute {
                    value: Box::new(name("tx")),
                    attr: "inputs".to_string(),
                }),
                index: Box::new(Expr::Int(0)),
            },
        };
        let (text, _) = render(&stmt);
        assert_eq!(text, "let input_item = tx.inputs[0]");
    }
}
