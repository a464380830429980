//! Tests for method dispatch: resolver chains, call-site caching, error
//! absorption and argument alignment.

extern crate vesper;

use std::rc::Rc;

use pretty_assertions::assert_eq;

use vesper::runner::dispatch::{dispatch, dispatch_positional, ArgumentRole, CallSite, DefaultsMode};
use vesper::runner::ds::error::{BuiltinError, DataflowError, PanicSentinel, RuntimeError};
use vesper::runner::ds::function_object::{ArgumentDefinition, Function};
use vesper::runner::ds::state::{State, Stateful};
use vesper::runner::ds::value::{AtomConstructor, Value};
use vesper::runner::plugin::registry::{BuiltInType, TypeKey};
use vesper::runner::plugin::types::EvalContext;

fn call(ctx: &mut EvalContext, name: &str, receiver: Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
    dispatch_positional(ctx, name, receiver, args, State::empty()).map(|r| r.value)
}

fn constant(name: &str, value: Value) -> Function {
    Function::native(name, vec![ArgumentDefinition::new("self")], move |_ctx, state, _args| {
        Ok(Stateful::new(state, value.clone()))
    })
}

// ============================================================================
// Resolver chains
// ============================================================================

mod resolution_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_integer_uses_number_table() {
        let mut ctx = EvalContext::new();
        let result = call(&mut ctx, "+", Value::Integer(40), vec![Value::Integer(2)]).unwrap();
        assert_eq!(result, Value::Integer(42));
    }

    #[test]
    fn test_any_table_is_last_in_chain() {
        let mut ctx = EvalContext::new();
        assert_eq!(
            call(&mut ctx, "to_text", Value::Integer(7), vec![]).unwrap(),
            Value::text("7")
        );
        assert_eq!(
            call(&mut ctx, "to_text", Value::Boolean(true), vec![]).unwrap(),
            Value::text("True")
        );
    }

    #[test]
    fn test_more_specific_table_wins() {
        let mut ctx = EvalContext::new();
        ctx.registry_mut().register_method(
            TypeKey::Integer,
            "to_text",
            constant("to_text", Value::text("integer")),
        );
        assert_eq!(
            call(&mut ctx, "to_text", Value::Integer(1), vec![]).unwrap(),
            Value::text("integer")
        );
        assert_eq!(
            call(&mut ctx, "to_text", Value::Decimal(1.5), vec![]).unwrap(),
            Value::text("1.5")
        );
    }

    #[test]
    fn test_atom_methods_live_on_their_constructor() {
        let mut ctx = EvalContext::new();
        let point = AtomConstructor::new("Point", &["x", "y"]);
        ctx.registry_mut().register_type(
            BuiltInType::new(TypeKey::Atom(point.id())).add_function("origin", constant("origin", Value::Integer(0))),
        );
        let p = point
            .new_instance(vec![Value::Integer(1), Value::Integer(2)])
            .unwrap();
        assert_eq!(call(&mut ctx, "origin", p, vec![]).unwrap(), Value::Integer(0));
        assert_eq!(
            call(&mut ctx, "origin", Value::Constructor(point.clone()), vec![]).unwrap(),
            Value::Integer(0)
        );
    }

    #[test]
    fn test_missing_method() {
        let mut ctx = EvalContext::new();
        let err = call(&mut ctx, "frobnicate", Value::text("abc"), vec![]).unwrap_err();
        match err {
            RuntimeError::Builtin(BuiltinError::NoSuchMethod { receiver, method }) => {
                assert_eq!(receiver, Value::text("abc"));
                assert_eq!(&*method, "frobnicate");
            }
            other => panic!("expected NoSuchMethod, got {:?}", other),
        }
    }
}

// ============================================================================
// Errors and sentinels
// ============================================================================

mod error_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn error_value(payload: &str) -> Value {
        Value::Error(Rc::new(DataflowError::new(Value::text(payload))))
    }

    #[test]
    fn test_error_absorbs_unknown_methods() {
        let mut ctx = EvalContext::new();
        let err = error_value("bad");
        let result = call(&mut ctx, "+", err.clone(), vec![Value::Integer(1)]).unwrap();
        assert_eq!(result, err);
        let result = call(&mut ctx, "no_such_thing", err.clone(), vec![]).unwrap();
        assert_eq!(result, err);
    }

    #[test]
    fn test_absorbed_call_passes_state_through() {
        let mut ctx = EvalContext::new();
        let err = error_value("bad");
        let incoming = State::empty().put("seen", Value::Integer(1));
        let result = dispatch_positional(
            &mut ctx,
            "frobnicate",
            err.clone(),
            vec![Value::Integer(2)],
            incoming.clone(),
        )
        .unwrap();
        assert_eq!(result.value, err);
        assert!(result.state.ptr_eq(&incoming));
    }

    #[test]
    fn test_error_does_not_use_any_table() {
        let mut ctx = EvalContext::new();
        let err = error_value("bad");
        let result = call(&mut ctx, "is_error", err.clone(), vec![]).unwrap();
        assert_eq!(result, Value::Boolean(true));
        let result = call(&mut ctx, "==", err.clone(), vec![err.clone()]).unwrap();
        assert_eq!(result, err);
    }

    #[test]
    fn test_catch_runs_handler_with_payload() {
        let mut ctx = EvalContext::new();
        let handler = Function::native(
            "handler",
            vec![ArgumentDefinition::new("payload")],
            |_ctx, state, args| {
                let text = format!("recovered {}", args[0]);
                Ok(Stateful::new(state.put("caught", Value::Boolean(true)), Value::text(&text)))
            },
        );
        let result = dispatch_positional(
            &mut ctx,
            "catch",
            error_value("boom"),
            vec![Value::Function(handler)],
            State::empty(),
        )
        .unwrap();
        assert_eq!(result.value, Value::text("recovered boom"));
        assert_eq!(result.state.get("caught"), Some(&Value::Boolean(true)));
    }

    #[test]
    fn test_sentinel_receiver_is_reraised() {
        let mut ctx = EvalContext::new();
        let sentinel = Rc::new(PanicSentinel::new(RuntimeError::Panic(Value::text("boom"))));
        let err = call(&mut ctx, "to_text", Value::PanicSentinel(sentinel.clone()), vec![]).unwrap_err();
        match err {
            RuntimeError::Sentinel(raised) => assert!(Rc::ptr_eq(&raised, &sentinel)),
            other => panic!("expected the sentinel, got {:?}", other),
        }
    }

    #[test]
    fn test_sentinel_is_never_recovered() {
        let sentinel = Rc::new(PanicSentinel::new(RuntimeError::Panic(Value::text("boom"))));
        assert!(RuntimeError::Sentinel(sentinel).recover().is_err());
        let recovered = RuntimeError::from(BuiltinError::type_error("Number", Value::text("x")))
            .recover()
            .unwrap();
        assert!(recovered.is_error());
    }
}

// ============================================================================
// Call sites
// ============================================================================

mod call_site_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_second_call_hits_cache() {
        let mut ctx = EvalContext::new();
        let site = CallSite::new("+", vec![ArgumentRole::Positional]);
        for i in 0..2 {
            let result = site
                .call(&mut ctx, Value::Integer(i), vec![Value::Integer(1)], State::empty())
                .unwrap();
            assert_eq!(result.value, Value::Integer(i + 1));
        }
        assert_eq!(site.cache_misses(), 1);
        assert_eq!(site.cache_hits(), 1);
        assert_eq!(site.cached_entries(), 1);
    }

    #[test]
    fn test_megamorphic_site_still_dispatches() {
        let mut ctx = EvalContext::new();
        let site = CallSite::new("to_text", vec![]).with_cache_limit(2);
        let receivers = vec![
            Value::Integer(1),
            Value::Decimal(2.5),
            Value::text("three"),
            Value::Boolean(false),
        ];
        let mut texts = vec![];
        for receiver in receivers {
            let result = site.call(&mut ctx, receiver, vec![], State::empty()).unwrap();
            texts.push(result.value.to_string());
        }
        assert_eq!(texts, vec!["1", "2.5", "three", "False"]);
        assert!(site.is_megamorphic());
    }

    #[test]
    fn test_registration_after_dispatch_is_observed() {
        let mut ctx = EvalContext::new();
        let site = CallSite::new("to_text", vec![]);
        let before = site.call(&mut ctx, Value::Integer(5), vec![], State::empty()).unwrap();
        assert_eq!(before.value, Value::text("5"));

        ctx.registry_mut().register_method(
            TypeKey::Integer,
            "to_text",
            constant("to_text", Value::text("five")),
        );
        let after = site.call(&mut ctx, Value::Integer(5), vec![], State::empty()).unwrap();
        assert_eq!(after.value, Value::text("five"));
    }

    #[test]
    fn test_cached_and_generic_dispatch_agree() {
        let mut ctx = EvalContext::new();
        let site = CallSite::new("compare_to", vec![ArgumentRole::Positional]);
        let pairs = vec![(1, 2), (2, 2), (3, 2)];
        for (a, b) in pairs {
            let cached = site
                .call(&mut ctx, Value::Integer(a), vec![Value::Integer(b)], State::empty())
                .unwrap()
                .value;
            let generic = call(&mut ctx, "compare_to", Value::Integer(a), vec![Value::Integer(b)]).unwrap();
            assert_eq!(cached, generic);
        }
    }
}

// ============================================================================
// Argument alignment through dispatch
// ============================================================================

mod argument_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scaled_point(ctx: &mut EvalContext) -> Value {
        let point = AtomConstructor::new("Point", &["x"]);
        let scale = Function::native(
            "scale",
            vec![
                ArgumentDefinition::new("self"),
                ArgumentDefinition::with_default("factor", Value::Integer(2)),
                ArgumentDefinition::with_default("offset", Value::Integer(0)),
            ],
            |_ctx, state, args| {
                let x = match &args[0] {
                    Value::Atom(atom) => atom.field("x").and_then(Value::as_integer).unwrap_or(0),
                    _ => 0,
                };
                let factor = args[1].as_integer().unwrap_or(0);
                let offset = args[2].as_integer().unwrap_or(0);
                Ok(Stateful::new(state, Value::Integer(x * factor + offset)))
            },
        );
        ctx.registry_mut()
            .register_method(TypeKey::Atom(point.id()), "scale", scale);
        point.new_instance(vec![Value::Integer(10)]).unwrap()
    }

    #[test]
    fn test_defaults_are_executed() {
        let mut ctx = EvalContext::new();
        let p = scaled_point(&mut ctx);
        assert_eq!(call(&mut ctx, "scale", p, vec![]).unwrap(), Value::Integer(20));
    }

    #[test]
    fn test_named_argument_skips_default() {
        let mut ctx = EvalContext::new();
        let p = scaled_point(&mut ctx);
        let result = dispatch(
            &mut ctx,
            "scale",
            p,
            vec![Value::Integer(1)],
            &[ArgumentRole::named("offset")],
            DefaultsMode::Execute,
            State::empty(),
        )
        .unwrap();
        assert_eq!(result.value, Value::Integer(21));
    }

    #[test]
    fn test_ignored_defaults_give_partial_application() {
        let mut ctx = EvalContext::new();
        let p = scaled_point(&mut ctx);
        let result = dispatch(
            &mut ctx,
            "scale",
            p,
            vec![Value::Integer(3)],
            &[],
            DefaultsMode::Ignore,
            State::empty(),
        )
        .unwrap();
        let partial = result.value.as_function().cloned().unwrap();
        assert_eq!(partial.remaining_arity(), 1);
        assert_eq!(
            call(&mut ctx, "arity", Value::Function(partial), vec![]).unwrap(),
            Value::Integer(1)
        );
    }

    #[test]
    fn test_too_many_arguments() {
        let mut ctx = EvalContext::new();
        let err = call(&mut ctx, "+", Value::Integer(1), vec![Value::Integer(2), Value::Integer(3)]).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Builtin(BuiltinError::ArityError {
                expected: 2,
                actual: 3
            })
        ));
    }
}
