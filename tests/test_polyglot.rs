//! Tests for the context bridge: embedded evaluation, value conversion and
//! boundary proxies.

extern crate vesper;

use std::rc::Rc;

use pretty_assertions::assert_eq;

use vesper::runner::dispatch::dispatch_positional;
use vesper::runner::ds::error::{BuiltinError, PanicSentinel, RuntimeError};
use vesper::runner::ds::function_object::{ArgumentDefinition, Function};
use vesper::runner::ds::state::{State, Stateful};
use vesper::runner::ds::value::{AtomConstructor, Value, ValueKind};
use vesper::runner::interop::host::HostArray;
use vesper::runner::plugin::config::RuntimeConfig;
use vesper::runner::plugin::types::EvalContext;
use vesper::runner::polyglot::{CallTarget, ForeignEval, GuestLanguage};

fn eval(ctx: &mut EvalContext, source: &str, names: &[&str], args: Vec<Value>) -> Result<Value, RuntimeError> {
    ForeignEval::new("calc", source, names)
        .execute(ctx, State::empty(), args)
        .map(|r| r.value)
}

fn assert_balanced(ctx: &EvalContext) {
    let stack = ctx.polyglot().host().stack();
    assert_eq!(stack.enter_count(), stack.leave_count());
    assert_eq!(stack.depth(), 0);
    assert!(ctx.polyglot().host().is_active());
}

// ============================================================================
// Embedded evaluation
// ============================================================================

mod eval_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_snippet_with_arguments() {
        let mut ctx = EvalContext::new();
        let result = eval(&mut ctx, "a * b - 1", &["a", "b"], vec![Value::Integer(6), Value::Integer(7)]).unwrap();
        assert_eq!(result, Value::Integer(41));
        assert_balanced(&ctx);
    }

    #[test]
    fn test_snippet_parsed_once() {
        let mut ctx = EvalContext::new();
        let snippet = ForeignEval::new("calc", "x + 1", &["x"]);
        assert!(!snippet.is_parsed());
        for i in 0..3 {
            let result = snippet
                .execute(&mut ctx, State::empty(), vec![Value::Integer(i)])
                .unwrap();
            assert_eq!(result.value, Value::Integer(i + 1));
        }
        assert!(snippet.is_parsed());
    }

    #[test]
    fn test_contexts_balanced_after_failure() {
        let mut ctx = EvalContext::new();
        let err = eval(&mut ctx, "x % 0", &["x"], vec![Value::Integer(3)]).unwrap_err();
        assert!(matches!(err, RuntimeError::Panic(_)));
        assert_balanced(&ctx);
        assert!(ctx.polyglot().host().stack().enter_count() > 0);
    }

    #[test]
    fn test_wrong_argument_count() {
        let mut ctx = EvalContext::new();
        let err = eval(&mut ctx, "x", &["x"], vec![]).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Builtin(BuiltinError::ArityError {
                expected: 1,
                actual: 0
            })
        ));
    }

    #[test]
    fn test_sentinel_argument_is_reraised() {
        let mut ctx = EvalContext::new();
        let sentinel = Rc::new(PanicSentinel::new(RuntimeError::Panic(Value::text("earlier"))));
        let err = eval(&mut ctx, "x", &["x"], vec![Value::PanicSentinel(sentinel)]).unwrap_err();
        assert!(err.is_sentinel());
        assert_eq!(ctx.polyglot().host().stack().enter_count(), 0);
    }

    #[test]
    fn test_sentinel_read_by_guest_is_reraised() {
        let mut ctx = EvalContext::new();
        let boxed = AtomConstructor::new("Box", &["x"]);
        let sentinel = Rc::new(PanicSentinel::new(RuntimeError::Panic(Value::text("boom"))));
        let b = boxed
            .new_instance(vec![Value::PanicSentinel(sentinel.clone())])
            .unwrap();
        let err = eval(&mut ctx, "b.x + 1", &["b"], vec![b]).unwrap_err();
        assert!(err.is_sentinel());
        match &err {
            RuntimeError::Sentinel(raised) => assert!(Rc::ptr_eq(raised, &sentinel)),
            other => panic!("expected the sentinel, got {:?}", other),
        }
        assert!(err.recover().is_err());
        assert_balanced(&ctx);
    }

    #[test]
    fn test_unknown_language() {
        let mut ctx = EvalContext::new();
        let err = ForeignEval::new("cobol", "1", &[])
            .execute(&mut ctx, State::empty(), vec![])
            .unwrap_err();
        assert!(matches!(err, RuntimeError::UnknownLanguage(_)));
    }

    #[test]
    fn test_parse_error_reported() {
        let mut ctx = EvalContext::new();
        let err = eval(&mut ctx, "1 + * 2", &[], vec![]).unwrap_err();
        assert!(matches!(err, RuntimeError::ForeignParse { .. }));
        assert_balanced(&ctx);
    }
}

// ============================================================================
// Conversion across the boundary
// ============================================================================

mod conversion_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_integer_crosses_unwrapped() {
        let mut ctx = EvalContext::new();
        assert_eq!(eval(&mut ctx, "42", &[], vec![]).unwrap(), Value::Integer(42));
    }

    #[test]
    fn test_decimal_result_is_proxied() {
        let mut ctx = EvalContext::new();
        let result = eval(&mut ctx, "1.5", &[], vec![]).unwrap();
        assert_eq!(result.kind(), ValueKind::Proxy);
        assert_eq!(result.to_string(), "1.5");
        assert_balanced(&ctx);
    }

    #[test]
    fn test_round_trip_returns_original() {
        let mut ctx = EvalContext::new();
        let text = Value::text("identity");
        let back = eval(&mut ctx, "x", &["x"], vec![text.clone()]).unwrap();
        match (&text, &back) {
            (Value::Text(a), Value::Text(b)) => assert!(Rc::ptr_eq(a, b)),
            _ => panic!("expected the original text, got {:?}", back),
        }
    }

    #[test]
    fn test_round_trip_through_guest_array() {
        let mut ctx = EvalContext::new();
        let text = Value::text("inside");
        let back = eval(&mut ctx, "[x, 2][0]", &["x"], vec![text.clone()]).unwrap();
        assert_eq!(back, text);
    }
}

// ============================================================================
// Proxies
// ============================================================================

mod proxy_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_guest_reads_atom_fields() {
        let mut ctx = EvalContext::new();
        let point = AtomConstructor::new("Point", &["x", "y"]);
        let p = point
            .new_instance(vec![Value::Integer(3), Value::Integer(4)])
            .unwrap();
        let result = eval(&mut ctx, "p.x * p.x + p.y * p.y", &["p"], vec![p]).unwrap();
        assert_eq!(result, Value::Integer(25));
        assert_balanced(&ctx);
    }

    #[test]
    fn test_guest_invokes_interpreter_methods() {
        let mut ctx = EvalContext::new();
        let result = eval(&mut ctx, "t.length() + 1", &["t"], vec![Value::text("four")]).unwrap();
        assert_eq!(result, Value::Integer(5));
    }

    #[test]
    fn test_guest_calls_interpreter_function() {
        let mut ctx = EvalContext::new();
        let double = Function::native(
            "double",
            vec![ArgumentDefinition::new("n")],
            |_ctx, state, args| {
                let n = args[0].as_integer().unwrap_or(0);
                Ok(Stateful::new(state, Value::Integer(n * 2)))
            },
        );
        let result = eval(&mut ctx, "f(20) + 2", &["f"], vec![Value::Function(double)]).unwrap();
        assert_eq!(result, Value::Integer(42));
        assert_balanced(&ctx);
    }

    #[test]
    fn test_host_reads_guest_object() {
        let mut ctx = EvalContext::new();
        let obj = eval(&mut ctx, "{a: 1, b: \"two\"}", &[], vec![]).unwrap();
        assert_eq!(obj.kind(), ValueKind::Proxy);
        let a = dispatch_positional(&mut ctx, "a", obj.clone(), vec![], State::empty()).unwrap();
        assert_eq!(a.value, Value::Integer(1));
        let b = dispatch_positional(&mut ctx, "b", obj, vec![], State::empty()).unwrap();
        assert_eq!(b.value.to_string(), "two");
        assert_balanced(&ctx);
    }

    #[test]
    fn test_guest_indexes_host_array() {
        let mut ctx = EvalContext::new();
        let array = Value::host(HostArray::of_longs(&[10, 20, 30]));
        let result = eval(&mut ctx, "a[1] + a[2]", &["a"], vec![array.clone()]).unwrap();
        assert_eq!(result, Value::Integer(50));
        let err = eval(&mut ctx, "a[5]", &["a"], vec![array]).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Builtin(BuiltinError::InvalidArrayIndex { index: 5, .. })
        ));
        assert_balanced(&ctx);
    }

    #[test]
    fn test_proxy_failure_leaves_context() {
        let mut ctx = EvalContext::new();
        let obj = eval(&mut ctx, "{a: 1}", &[], vec![]).unwrap();
        let err = dispatch_positional(&mut ctx, "zzz", obj, vec![], State::empty()).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Builtin(BuiltinError::NoSuchMethod { .. })
        ));
        assert_balanced(&ctx);
    }
}

// ============================================================================
// State and nesting
// ============================================================================

mod state_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn counter() -> Function {
        Function::native("tick", vec![ArgumentDefinition::new("n")], |_ctx, state, args| {
            let count = state.get("ticks").and_then(Value::as_integer).unwrap_or(0) + 1;
            Ok(Stateful::new(state.put("ticks", Value::Integer(count)), args[0].clone()))
        })
    }

    #[test]
    fn test_state_threads_through_callbacks() {
        let mut ctx = EvalContext::new();
        let snippet = ForeignEval::new("calc", "f(1) + f(2) + f(3)", &["f"]);
        let result = snippet
            .execute(&mut ctx, State::empty(), vec![Value::Function(counter())])
            .unwrap();
        assert_eq!(result.value, Value::Integer(6));
        assert_eq!(result.state.get("ticks"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_guest_uses_builtin_state() {
        let mut ctx = EvalContext::new();
        let state_type = ctx.builtins().state();
        let snippet = ForeignEval::new("calc", "s.put(k, 5) + s.get(k)", &["s", "k"]);
        let result = snippet
            .execute(&mut ctx, State::empty(), vec![state_type, Value::text("slot")])
            .unwrap();
        assert_eq!(result.value, Value::Integer(10));
        assert_eq!(result.state.get("slot"), Some(&Value::Integer(5)));
    }

    #[test]
    fn test_nested_failure_leaves_every_context() {
        let mut ctx = EvalContext::new();
        let failing = Function::foreign(Rc::new(ForeignEval::new("calc", "n % 0", &["n"])));
        let err = eval(&mut ctx, "g(4) + 2", &["g"], vec![Value::Function(failing)]).unwrap_err();
        assert!(matches!(err, RuntimeError::Panic(_)));
        assert_balanced(&ctx);
        assert!(ctx.polyglot().host().stack().enter_count() >= 2);
    }

    #[test]
    fn test_nested_evaluation() {
        let mut ctx = EvalContext::new();
        let inner_snippet = Rc::new(ForeignEval::new("calc", "n * 10", &["n"]));
        let nested = Function::foreign(inner_snippet.clone());
        let result = eval(&mut ctx, "g(4) + 2", &["g"], vec![Value::Function(nested)]).unwrap();
        assert_eq!(result, Value::Integer(42));
        assert!(inner_snippet.is_parsed());
        assert_balanced(&ctx);
    }
}

// ============================================================================
// Languages and configuration
// ============================================================================

struct Constant;

impl CallTarget for Constant {
    fn call(&self, _ctx: &mut EvalContext, state: State, args: Vec<Value>) -> Result<Stateful, RuntimeError> {
        Ok(Stateful::new(state, Value::Integer(args.len() as i64)))
    }
}

struct ArgCounter;

impl GuestLanguage for ArgCounter {
    fn id(&self) -> &str {
        "R"
    }

    fn parse(&self, _source: &str, _arg_names: &[Rc<str>]) -> Result<Rc<dyn CallTarget>, RuntimeError> {
        Ok(Rc::new(Constant))
    }
}

mod language_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_alias_resolves_registered_language() {
        let mut ctx = EvalContext::new();
        ctx.add_language(Box::new(ArgCounter));
        let result = ForeignEval::new("r", "length(list(a, b))", &["a", "b"])
            .execute(&mut ctx, State::empty(), vec![Value::Integer(1), Value::Integer(2)])
            .unwrap();
        assert_eq!(result.value, Value::Integer(2));
    }

    #[test]
    fn test_configured_alias() {
        let config = RuntimeConfig::parse("[polyglot.aliases]\nexpr = \"calc\"\n").unwrap();
        let mut ctx = EvalContext::with_config(config);
        let result = ForeignEval::new("expr", "2 + 2", &[])
            .execute(&mut ctx, State::empty(), vec![])
            .unwrap();
        assert_eq!(result.value, Value::Integer(4));
    }
}
