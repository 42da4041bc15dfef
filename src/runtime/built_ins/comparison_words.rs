use crate::runtime::{
    built_ins::add_word,
    data_structures::value::Value,
    error,
    vm::VirtualMachine,
};
use std::cmp::Ordering;

fn word_true(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut().push(Value::Bool(true))
}

fn word_false(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut().push(Value::Bool(false))
}

fn word_eq(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut().binary_op(|a, b| Ok(Value::Bool(a == b)))
}

fn word_ne(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut().binary_op(|a, b| Ok(Value::Bool(a != b)))
}

fn word_gt(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut()
        .binary_op(|a, b| Ok(Value::Bool(Value::compare(a, b)? == Ordering::Greater)))
}

fn word_lt(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut()
        .binary_op(|a, b| Ok(Value::Bool(Value::compare(a, b)? == Ordering::Less)))
}

fn word_ge(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut()
        .binary_op(|a, b| Ok(Value::Bool(Value::compare(a, b)? != Ordering::Less)))
}

fn word_le(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut()
        .binary_op(|a, b| Ok(Value::Bool(Value::compare(a, b)? != Ordering::Greater)))
}

/// The zero and one prefixed comparisons push their result alongside the top of the stack
/// without consuming it.
fn push_top_comparison(
    vm: &mut VirtualMachine,
    compare: impl FnOnce(&Value) -> error::Result<bool>,
) -> error::Result<()> {
    let result = compare(vm.stack().top()?)?;
    vm.stack_mut().push(Value::Bool(result))
}

fn word_zero_eq(vm: &mut VirtualMachine) -> error::Result<()> {
    push_top_comparison(vm, |top| Ok(*top == Value::Int(0)))
}

fn word_zero_ne(vm: &mut VirtualMachine) -> error::Result<()> {
    push_top_comparison(vm, |top| Ok(*top != Value::Int(0)))
}

fn word_zero_lt(vm: &mut VirtualMachine) -> error::Result<()> {
    push_top_comparison(vm, |top| {
        Ok(Value::compare(top, &Value::Int(0))? == Ordering::Less)
    })
}

fn word_zero_gt(vm: &mut VirtualMachine) -> error::Result<()> {
    push_top_comparison(vm, |top| {
        Ok(Value::compare(top, &Value::Int(0))? == Ordering::Greater)
    })
}

fn word_one_eq(vm: &mut VirtualMachine) -> error::Result<()> {
    push_top_comparison(vm, |top| Ok(*top == Value::Int(1)))
}

fn word_not(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut()
        .unary_op(|value| Ok(Value::Bool(!value.get_bool_val())))
}

/// Logical conjunction with the original short-circuit value semantics: the result is one of the
/// operands, not a normalized boolean.
fn word_and(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut().binary_op(|a, b| {
        Ok(if a.get_bool_val() { b.clone() } else { a.clone() })
    })
}

/// Logical disjunction, returning one of the operands.
fn word_or(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut().binary_op(|a, b| {
        Ok(if a.get_bool_val() { a.clone() } else { b.clone() })
    })
}

pub fn register_comparison_words(vm: &mut VirtualMachine) {
    add_word(vm, "True", word_true, "-- True", "Push the true boolean.");
    add_word(vm, "False", word_false, "-- False", "Push the false boolean.");
    add_word(vm, "=", word_eq, "a b -- flag", "Are the top two values equal?");
    add_word(vm, "<>", word_ne, "a b -- flag", "Are the top two values unequal?");
    add_word(vm, ">", word_gt, "a b -- flag", "Is the second value greater than the top?");
    add_word(vm, "<", word_lt, "a b -- flag", "Is the second value less than the top?");
    add_word(vm, ">=", word_ge, "a b -- flag", "Is the second value at least the top?");
    add_word(vm, "<=", word_le, "a b -- flag", "Is the second value at most the top?");
    add_word(vm, "0=", word_zero_eq, "a -- a flag", "Push whether the top equals zero, keeping it.");
    add_word(vm, "0<>", word_zero_ne, "a -- a flag", "Push whether the top differs from zero, keeping it.");
    add_word(vm, "0<", word_zero_lt, "a -- a flag", "Push whether the top is negative, keeping it.");
    add_word(vm, "0>", word_zero_gt, "a -- a flag", "Push whether the top is positive, keeping it.");
    add_word(vm, "1=", word_one_eq, "a -- a flag", "Push whether the top equals one, keeping it.");
    add_word(vm, "not", word_not, "a -- flag", "Logical negation of the top of the stack.");
    add_word(vm, "and", word_and, "a b -- a|b", "Logical and, returning one of the operands.");
    add_word(vm, "or", word_or, "a b -- a|b", "Logical or, returning one of the operands.");
}
