//! Number built-ins.
//!
//! Arithmetic shared by integers, big integers and decimals lives in the
//! `Number` table. Integer arithmetic that overflows promotes to a big
//! integer, and big results that fit in 64 bits are demoted again.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_traits::{FromPrimitive, Signed, ToPrimitive, Zero};

use crate::runner::ds::error::{BuiltinError, RuntimeError};
use crate::runner::ds::value::Value;
use crate::runner::plugin::registry::{BuiltInType, MethodRegistry, TypeKey};
use crate::runner::plugin::types::EvalContext;

/// Register the number types with the registry.
pub fn register(registry: &mut MethodRegistry) {
    let number = BuiltInType::new(TypeKey::Number)
        .add_method("+", &["that"], number_add)
        .add_method("-", &["that"], number_sub)
        .add_method("*", &["that"], number_mul)
        .add_method("/", &["that"], number_div)
        .add_method("div", &["that"], number_int_div)
        .add_method("%", &["that"], number_mod)
        .add_method("abs", &[], number_abs)
        .add_method("negate", &[], number_negate)
        .add_method("compare_to", &["that"], number_compare_to)
        .add_method("==", &["that"], number_equals)
        .add_method("<", &["that"], number_lt)
        .add_method("<=", &["that"], number_le)
        .add_method(">", &["that"], number_gt)
        .add_method(">=", &["that"], number_ge);
    registry.register_type(number);

    let integer = BuiltInType::new(TypeKey::Integer)
        .add_method("to_decimal", &[], integer_to_decimal)
        .add_method("is_even", &[], integer_is_even)
        .add_method("floor", &[], integer_identity)
        .add_method("ceil", &[], integer_identity);
    registry.register_type(integer);

    let decimal = BuiltInType::new(TypeKey::Decimal)
        .add_method("to_decimal", &[], decimal_identity)
        .add_method("floor", &[], decimal_floor)
        .add_method("ceil", &[], decimal_ceil)
        .add_method("round", &[], decimal_round);
    registry.register_type(decimal);
}

enum Num {
    Small(i64),
    Big(BigInt),
    Dec(f64),
}

impl Num {
    fn of(value: &Value) -> Option<Num> {
        match value {
            Value::Integer(i) => Some(Num::Small(*i)),
            Value::BigInteger(b) => Some(Num::Big((**b).clone())),
            Value::Decimal(d) => Some(Num::Dec(*d)),
            _ => None,
        }
    }

    fn to_f64(&self) -> f64 {
        match self {
            Num::Small(i) => *i as f64,
            Num::Big(b) => b.to_f64().unwrap_or(f64::NAN),
            Num::Dec(d) => *d,
        }
    }

    fn to_big(&self) -> BigInt {
        match self {
            Num::Small(i) => BigInt::from(*i),
            Num::Big(b) => b.clone(),
            Num::Dec(d) => BigInt::from_f64(*d).unwrap_or_default(),
        }
    }

    fn is_decimal(&self) -> bool {
        matches!(self, Num::Dec(_))
    }
}

fn operands(args: &[Value]) -> Result<(Num, Num), RuntimeError> {
    let this = Num::of(&args[0]).ok_or_else(|| BuiltinError::type_error("Number", args[0].clone()))?;
    let that = Num::of(&args[1]).ok_or_else(|| BuiltinError::UnsupportedArguments {
        values: vec![args[1].clone()],
    })?;
    Ok((this, that))
}

fn arith(
    args: &[Value],
    small: fn(i64, i64) -> Option<i64>,
    big: fn(BigInt, BigInt) -> BigInt,
    dec: fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    let (a, b) = operands(args)?;
    if a.is_decimal() || b.is_decimal() {
        return Ok(Value::Decimal(dec(a.to_f64(), b.to_f64())));
    }
    if let (Num::Small(x), Num::Small(y)) = (&a, &b) {
        if let Some(r) = small(*x, *y) {
            return Ok(Value::Integer(r));
        }
    }
    Ok(Value::from_bigint(big(a.to_big(), b.to_big())))
}

fn division_by_zero() -> RuntimeError {
    RuntimeError::Panic(Value::text("Arithmetic_Error: Division by zero"))
}

fn number_add(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    arith(&args, i64::checked_add, |a, b| a + b, |a, b| a + b)
}

fn number_sub(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    arith(&args, i64::checked_sub, |a, b| a - b, |a, b| a - b)
}

fn number_mul(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    arith(&args, i64::checked_mul, |a, b| a * b, |a, b| a * b)
}

/// Always produces a decimal.
fn number_div(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let (a, b) = operands(&args)?;
    Ok(Value::Decimal(a.to_f64() / b.to_f64()))
}

fn floor_div_big(a: BigInt, b: BigInt) -> BigInt {
    let q = &a / &b;
    if (&a % &b).is_zero() || (a.is_negative() == b.is_negative()) {
        q
    } else {
        q - BigInt::from(1)
    }
}

fn floor_mod_big(a: BigInt, b: BigInt) -> BigInt {
    let r = &a % &b;
    if !r.is_zero() && (r.is_negative() != b.is_negative()) {
        r + b
    } else {
        r
    }
}

fn number_int_div(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let (a, b) = operands(&args)?;
    if a.is_decimal() || b.is_decimal() {
        return Ok(Value::Decimal((a.to_f64() / b.to_f64()).floor()));
    }
    let divisor = b.to_big();
    if divisor.is_zero() {
        return Err(division_by_zero());
    }
    Ok(Value::from_bigint(floor_div_big(a.to_big(), divisor)))
}

fn number_mod(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let (a, b) = operands(&args)?;
    if a.is_decimal() || b.is_decimal() {
        let (x, y) = (a.to_f64(), b.to_f64());
        return Ok(Value::Decimal(x - y * (x / y).floor()));
    }
    let divisor = b.to_big();
    if divisor.is_zero() {
        return Err(division_by_zero());
    }
    Ok(Value::from_bigint(floor_mod_big(a.to_big(), divisor)))
}

fn number_abs(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(match &args[0] {
        Value::Integer(i) => match i.checked_abs() {
            Some(r) => Value::Integer(r),
            None => Value::from_bigint(BigInt::from(*i).abs()),
        },
        Value::BigInteger(b) => Value::from_bigint(b.abs()),
        Value::Decimal(d) => Value::Decimal(d.abs()),
        other => return Err(BuiltinError::type_error("Number", other.clone()).into()),
    })
}

fn number_negate(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(match &args[0] {
        Value::Integer(i) => match i.checked_neg() {
            Some(r) => Value::Integer(r),
            None => Value::from_bigint(-BigInt::from(*i)),
        },
        Value::BigInteger(b) => Value::from_bigint(-(**b).clone()),
        Value::Decimal(d) => Value::Decimal(-d),
        other => return Err(BuiltinError::type_error("Number", other.clone()).into()),
    })
}

fn compare(args: &[Value]) -> Result<Option<Ordering>, RuntimeError> {
    let this = Num::of(&args[0]).ok_or_else(|| BuiltinError::type_error("Number", args[0].clone()))?;
    let that = Num::of(&args[1]).ok_or_else(|| BuiltinError::type_error("Number", args[1].clone()))?;
    if this.is_decimal() || that.is_decimal() {
        return Ok(this.to_f64().partial_cmp(&that.to_f64()));
    }
    Ok(Some(this.to_big().cmp(&that.to_big())))
}

fn number_compare_to(ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    match compare(&args)? {
        Some(ordering) => Ok(ctx.builtins().ordering(ordering)),
        None => Ok(ctx.builtins().nothing()),
    }
}

fn number_equals(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    if Num::of(&args[1]).is_none() {
        return Ok(Value::Boolean(false));
    }
    Ok(Value::Boolean(compare(&args)? == Some(Ordering::Equal)))
}

fn number_lt(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(compare(&args)? == Some(Ordering::Less)))
}

fn number_le(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(matches!(
        compare(&args)?,
        Some(Ordering::Less) | Some(Ordering::Equal)
    )))
}

fn number_gt(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(compare(&args)? == Some(Ordering::Greater)))
}

fn number_ge(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(matches!(
        compare(&args)?,
        Some(Ordering::Greater) | Some(Ordering::Equal)
    )))
}

fn integer_to_decimal(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    match Num::of(&args[0]) {
        Some(n) => Ok(Value::Decimal(n.to_f64())),
        None => Err(BuiltinError::type_error("Integer", args[0].clone()).into()),
    }
}

fn integer_is_even(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Integer(i) => Ok(Value::Boolean(i % 2 == 0)),
        Value::BigInteger(b) => Ok(Value::Boolean((&**b % &BigInt::from(2)).is_zero())),
        other => Err(BuiltinError::type_error("Integer", other.clone()).into()),
    }
}

fn integer_identity(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(args[0].clone())
}

fn decimal_identity(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(args[0].clone())
}

fn decimal_to_integer(value: f64) -> Result<Value, RuntimeError> {
    if !value.is_finite() {
        return Err(RuntimeError::Panic(Value::text(&format!(
            "Arithmetic_Error: {} has no integer value",
            value
        ))));
    }
    if value >= i64::MIN as f64 && value < i64::MAX as f64 {
        return Ok(Value::Integer(value as i64));
    }
    match BigInt::from_f64(value) {
        Some(big) => Ok(Value::from_bigint(big)),
        None => Err(RuntimeError::Panic(Value::text("Arithmetic_Error: conversion failed"))),
    }
}

fn decimal_floor(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Decimal(d) => decimal_to_integer(d.floor()),
        other => Err(BuiltinError::type_error("Decimal", other.clone()).into()),
    }
}

fn decimal_ceil(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Decimal(d) => decimal_to_integer(d.ceil()),
        other => Err(BuiltinError::type_error("Decimal", other.clone()).into()),
    }
}

fn decimal_round(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Decimal(d) => decimal_to_integer(d.round()),
        other => Err(BuiltinError::type_error("Decimal", other.clone()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_semantics_for_negative_operands() {
        assert_eq!(
            floor_div_big(BigInt::from(-7), BigInt::from(2)),
            BigInt::from(-4)
        );
        assert_eq!(
            floor_mod_big(BigInt::from(-7), BigInt::from(2)),
            BigInt::from(1)
        );
        assert_eq!(
            floor_mod_big(BigInt::from(7), BigInt::from(-2)),
            BigInt::from(-1)
        );
    }

    #[test]
    fn test_overflow_promotes() {
        let mut ctx = EvalContext::new();
        let r = number_add(&mut ctx, vec![Value::Integer(i64::MAX), Value::Integer(1)]).unwrap();
        assert!(matches!(r, Value::BigInteger(_)));
        let back = number_sub(&mut ctx, vec![r, Value::Integer(1)]).unwrap();
        assert_eq!(back, Value::Integer(i64::MAX));
    }
}
