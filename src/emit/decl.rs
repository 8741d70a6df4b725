//! Declaration rendering
//!
//! Imports, records, validators, functions, and tests. Classes split on
//! their method set: a class exposing a recognized entry point becomes a
//! `validator` block, anything else becomes a `pub type` record built
//! from its `__init__` parameters.

use crate::ast::{ClassDef, FunctionDef, ImportName, Param, Stmt};
use crate::error::Warning;
use crate::types::{self, map_annotation, TypeSignal};

use super::{is_docstring, Emitter, NameScope};

/// Method names that mark a class as a validator
const ENTRY_POINTS: [&str; 4] = ["spend", "mint", "withdraw", "else_"];

impl Emitter {
    pub(crate) fn import(&mut self, module: &str, alias: Option<&str>) {
        let path = module.replace('.', "/");
        match alias {
            Some(alias) => self.write(format!("use {path} as {alias}")),
            None => self.write(format!("use {path}")),
        }
    }

    pub(crate) fn import_from(&mut self, module: &str, names: &[ImportName]) {
        let path = module.replace('.', "/");
        if names.is_empty() {
            self.write(format!("use {path}"));
            return;
        }
        let list: Vec<String> = names
            .iter()
            .map(|n| match &n.alias {
                Some(alias) => format!("{} as {alias}", n.name),
                None => n.name.clone(),
            })
            .collect();
        self.write(format!("use {path}.{{{}}}", list.join(", ")));
    }

    pub(crate) fn class(&mut self, class: &ClassDef) {
        let is_validator = class
            .methods
            .iter()
            .any(|m| ENTRY_POINTS.contains(&m.name.as_str()));
        if is_validator {
            self.validator(class);
        } else {
            self.record(class);
        }
    }

    fn record(&mut self, class: &ClassDef) {
        let init = class.methods.iter().find(|m| m.name == "__init__");
        let fields: Vec<(String, String)> = init
            .map(|init| {
                init.params
                    .iter()
                    .filter(|p| p.name != "self")
                    .map(|p| {
                        let symbol = types::resolve(&TypeSignal {
                            name: &p.name,
                            annotation: p.annotation.as_deref(),
                            default: p.default.as_ref(),
                            body: &init.body,
                        });
                        if symbol.is_fallback() {
                            self.warn(Warning::TypeUnresolved {
                                name: format!("{}.{}", class.name, p.name),
                            });
                        }
                        (p.name.clone(), symbol.name)
                    })
                    .collect()
            })
            .unwrap_or_default();

        self.register_record(
            &class.name,
            fields.iter().map(|(name, _)| name.clone()).collect(),
        );

        self.write(format!("pub type {} {{", class.name));
        self.push();
        if fields.is_empty() {
            // no constructor parameters: a bare nullary constructor
            self.write(class.name.clone());
        }
        for (name, ty) in fields {
            self.write(format!("{name}: {ty},"));
        }
        self.pop();
        self.write("}");
    }

    fn validator(&mut self, class: &ClassDef) {
        self.register_record(&class.name, Vec::new());
        self.write(format!("validator {} {{", class.name));
        self.push();
        for method in &class.methods {
            if method.name == "__init__" {
                continue;
            }
            if ENTRY_POINTS.contains(&method.name.as_str()) {
                self.entry_point(method);
            } else {
                self.function(method);
            }
        }
        self.pop();
        self.write("}");
    }

    fn entry_point(&mut self, method: &FunctionDef) {
        if method.name == "else_" {
            self.write("else(_) {");
        } else {
            let params: Vec<String> = method
                .params
                .iter()
                .filter(|p| p.name != "self")
                .map(entry_param)
                .collect();
            self.write(format!("{}({}) {{", method.name, params.join(", ")));
        }
        self.push();
        let mut scope = NameScope::plain();
        self.body(&method.body, &mut scope);
        self.pop();
        self.write("}");
    }

    pub(crate) fn function(&mut self, func: &FunctionDef) {
        if let Some(stripped) = func.name.strip_prefix("test") {
            let name = stripped.trim_start_matches('_');
            if !name.is_empty() {
                self.write(format!("test {name} {{"));
                self.push();
                let mut scope = NameScope::test();
                self.body(&func.body, &mut scope);
                self.pop();
                self.write("}");
                return;
            }
        }

        let params: Vec<String> = func
            .params
            .iter()
            .filter(|p| p.name != "self")
            .map(|p| {
                let symbol = types::resolve(&TypeSignal {
                    name: &p.name,
                    annotation: p.annotation.as_deref(),
                    default: p.default.as_ref(),
                    body: &func.body,
                });
                if symbol.is_fallback() {
                    self.warn(Warning::TypeUnresolved {
                        name: format!("{}.{}", func.name, p.name),
                    });
                }
                format!("{}: {}", p.name, symbol.name)
            })
            .collect();

        let returns = func
            .returns
            .as_deref()
            .map(map_annotation)
            .or_else(|| types::infer_return_type(&func.body));
        let signature = match returns {
            Some(ty) => format!("fn {}({}) -> {} {{", func.name, params.join(", "), ty),
            None => format!("fn {}({}) {{", func.name, params.join(", ")),
        };
        self.write(signature);
        self.push();
        let mut scope = NameScope::plain();
        self.body(&func.body, &mut scope);
        self.pop();
        self.write("}");
    }

    /// Function body, with pipeline reconstruction at the tail
    fn body(&mut self, body: &[Stmt], scope: &mut NameScope) {
        let body = match body.first() {
            Some(first) if is_docstring(first) => &body[1..],
            _ => body,
        };
        if let Some(pipeline) = self.try_pipeline(body, scope) {
            let start = pipeline.start;
            let base = pipeline.base;
            let stages = pipeline.stages;
            for stmt in &body[..start] {
                self.stmt(stmt, scope);
            }
            let base = self.expr(base, scope);
            self.write(base);
            self.push();
            for stage in stages {
                self.write(format!("|> {stage}"));
            }
            self.pop();
            return;
        }
        self.stmts(body, scope);
    }
}

/// Type a validator entry-point parameter
fn entry_param(param: &Param) -> String {
    if param.name == "_" {
        return "_".to_string();
    }
    let ty = match param.annotation.as_deref() {
        Some(annotation) => map_annotation(annotation),
        None => match param.name.trim_start_matches('_') {
            "datum" => "Option<Data>".to_string(),
            _ => "Data".to_string(),
        },
    };
    format!("{}: {ty}", param.name)
}
