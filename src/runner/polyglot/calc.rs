//! `calc`, the built-in guest expression language.
//!
//! Snippets are single expressions over their parameters. Operators dispatch
//! to the interpreter's methods; member access, indexing and calls go
//! through the interop protocol, so parameters arriving as boundary proxies
//! behave like any other value.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::parser::ast::{BinaryOp, Expr};
use crate::parser::parse_to_ast;
use crate::runner::dispatch::dispatch_positional;
use crate::runner::ds::error::RuntimeError;
use crate::runner::ds::state::{State, Stateful};
use crate::runner::ds::value::Value;
use crate::runner::interop::{library, HostValue, InteropError, InteropObject};
use crate::runner::plugin::types::EvalContext;
use crate::runner::polyglot::{CallTarget, GuestLanguage};

pub const CALC_LANGUAGE: &str = "calc";

pub struct CalcLanguage;

impl GuestLanguage for CalcLanguage {
    fn id(&self) -> &str {
        CALC_LANGUAGE
    }

    fn parse(&self, source: &str, arg_names: &[Rc<str>]) -> Result<Rc<dyn CallTarget>, RuntimeError> {
        let body = parse_to_ast(source).map_err(|e| RuntimeError::ForeignParse {
            language: Rc::from(CALC_LANGUAGE),
            message: e.to_string(),
        })?;
        if let Some(unknown) = body
            .identifiers()
            .into_iter()
            .find(|name| !arg_names.iter().any(|a| &**a == *name))
        {
            return Err(RuntimeError::ForeignParse {
                language: Rc::from(CALC_LANGUAGE),
                message: format!("Unknown identifier `{}`", unknown),
            });
        }
        debug!(params = arg_names.len(), "calc snippet parsed");
        Ok(Rc::new(CalcFunction {
            params: arg_names.to_vec(),
            body,
        }))
    }
}

struct CalcFunction {
    params: Vec<Rc<str>>,
    body: Expr,
}

impl CallTarget for CalcFunction {
    fn call(
        &self,
        ctx: &mut EvalContext,
        state: State,
        args: Vec<Value>,
    ) -> Result<Stateful, RuntimeError> {
        let (state, result) = ctx.with_interop_state(state, |ctx| {
            let mut eval = Evaluator {
                ctx,
                params: &self.params,
                args: &args,
            };
            eval.eval(&self.body)
        });
        Ok(Stateful::new(state, result?))
    }
}

struct Evaluator<'a> {
    ctx: &'a mut EvalContext,
    params: &'a [Rc<str>],
    args: &'a [Value],
}

impl<'a> Evaluator<'a> {
    fn eval(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Integer(i) => Ok(Value::Integer(*i)),
            Expr::BigInteger(b) => Ok(Value::from_bigint(b.clone())),
            Expr::Float(f) => Ok(Value::Decimal(*f)),
            Expr::Str(s) => Ok(Value::text(s)),
            Expr::Boolean(b) => Ok(Value::Boolean(*b)),
            Expr::Null => Ok(self.ctx.builtins().nothing()),
            Expr::Identifier(name) => self.lookup(name),
            Expr::Array(items) => {
                let values = self.eval_all(items)?;
                Ok(Value::array(values))
            }
            Expr::Object(props) => {
                let mut fields = BTreeMap::new();
                for (key, value) in props {
                    fields.insert(key.clone(), self.eval(value)?);
                }
                Ok(Value::host(GuestObject { fields }))
            }
            Expr::Negate(inner) => {
                let value = self.eval(inner)?;
                self.send("negate", value, vec![])
            }
            Expr::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                let result = self.send(op.method_name(), left, vec![right])?;
                match (op, result) {
                    (BinaryOp::Ne, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
                    (_, result) => Ok(result),
                }
            }
            Expr::Member { object, name } => {
                let object = self.eval(object)?;
                if library::is_member_readable(self.ctx, &object, name) {
                    library::read_member(self.ctx, &object, name)
                        .map_err(|e| e.into_runtime(&object, CALC_LANGUAGE))
                } else {
                    self.invoke(object, name, vec![])
                }
            }
            Expr::Invoke { object, name, args } => {
                let object = self.eval(object)?;
                let args = self.eval_all(args)?;
                self.invoke(object, name, args)
            }
            Expr::Index { object, index } => {
                let object = self.eval(object)?;
                let index = self.eval(index)?;
                if library::has_array_elements(self.ctx, &object) {
                    let i = index.as_integer().ok_or_else(|| {
                        RuntimeError::foreign_eval(CALC_LANGUAGE, format!("Index {} is not an integer", index))
                    })?;
                    library::read_array_element(self.ctx, &object, i)
                        .map_err(|e| e.into_runtime(&object, CALC_LANGUAGE))
                } else {
                    self.invoke(object, "at", vec![index])
                }
            }
            Expr::Call { callee, args } => {
                let callee = self.eval(callee)?;
                let args = self.eval_all(args)?;
                if !library::is_executable(self.ctx, &callee) {
                    return Err(RuntimeError::foreign_eval(
                        CALC_LANGUAGE,
                        format!("{} is not callable", callee),
                    ));
                }
                library::execute(self.ctx, &callee, args)
                    .map_err(|e| e.into_runtime(&callee, CALC_LANGUAGE))
            }
        }
    }

    fn eval_all(&mut self, exprs: &[Expr]) -> Result<Vec<Value>, RuntimeError> {
        exprs.iter().map(|e| self.eval(e)).collect()
    }

    fn lookup(&self, name: &str) -> Result<Value, RuntimeError> {
        self.params
            .iter()
            .position(|p| &**p == name)
            .and_then(|idx| self.args.get(idx))
            .cloned()
            .ok_or_else(|| {
                RuntimeError::foreign_eval(CALC_LANGUAGE, format!("Unbound identifier `{}`", name))
            })
    }

    fn invoke(&mut self, object: Value, name: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
        if let Value::PanicSentinel(sentinel) = &object {
            return Err(sentinel.reraise());
        }
        if !library::is_member_invocable(self.ctx, &object, name) {
            return Err(RuntimeError::foreign_eval(
                CALC_LANGUAGE,
                format!("{} has no member `{}`", object, name),
            ));
        }
        library::invoke_member(self.ctx, &object, name, args)
            .map_err(|e| e.into_runtime(&object, CALC_LANGUAGE))
    }

    /// Operators on guest values: proxies go through the interop protocol,
    /// everything else through the dispatcher.
    fn send(&mut self, name: &str, receiver: Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
        if let Value::Proxy(_) = receiver {
            return self.invoke(receiver, name, args);
        }
        let state = self.ctx.interop_state();
        let Stateful { state, value } = dispatch_positional(self.ctx, name, receiver, args, state)?;
        self.ctx.set_interop_state(state);
        Ok(value)
    }
}

/// An object created by a `calc` object literal.
pub struct GuestObject {
    fields: BTreeMap<String, Value>,
}

impl fmt::Debug for GuestObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, (key, value)) in self.fields.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}

impl InteropObject for GuestObject {
    fn language(&self) -> Option<&str> {
        Some(CALC_LANGUAGE)
    }

    fn members(&self, _ctx: &EvalContext) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    fn is_member_readable(&self, _ctx: &EvalContext, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    fn read_member(&self, _ctx: &mut EvalContext, name: &str) -> Result<HostValue, InteropError> {
        self.fields
            .get(name)
            .cloned()
            .map(HostValue::Native)
            .ok_or_else(|| InteropError::UnknownIdentifier(name.to_string()))
    }

    fn is_member_invocable(&self, ctx: &EvalContext, name: &str) -> bool {
        self.fields
            .get(name)
            .map(|v| library::is_executable(ctx, v))
            .unwrap_or(false)
    }

    fn invoke_member(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        args: Vec<Value>,
    ) -> Result<HostValue, InteropError> {
        let member = self
            .fields
            .get(name)
            .ok_or_else(|| InteropError::UnknownIdentifier(name.to_string()))?;
        library::execute(ctx, member, args).map(HostValue::Native)
    }
}
