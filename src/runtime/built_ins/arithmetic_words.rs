use crate::runtime::{
    built_ins::add_word,
    data_structures::value::Value,
    error,
    vm::VirtualMachine,
};
use std::cmp::Ordering;

fn word_add(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut().binary_op(Value::add)
}

fn word_sub(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut().binary_op(Value::sub)
}

fn word_mul(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut().binary_op(Value::mul)
}

/// True division.  The result is always a float.
fn word_div(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut().binary_op(Value::div)
}

/// Floor division, rounding toward negative infinity.
fn word_floor_div(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut().binary_op(Value::floor_div)
}

fn word_mod(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut().binary_op(Value::modulus)
}

fn word_pow(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut().binary_op(Value::pow)
}

fn word_neg(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut().unary_op(Value::neg)
}

fn word_one_plus(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut()
        .unary_op(|value| Value::add(value, &Value::Int(1)))
}

fn word_one_minus(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut()
        .unary_op(|value| Value::sub(value, &Value::Int(1)))
}

fn word_max(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut().binary_op(|a, b| {
        Ok(if Value::compare(a, b)? == Ordering::Less {
            b.clone()
        } else {
            a.clone()
        })
    })
}

fn word_min(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut().binary_op(|a, b| {
        Ok(if Value::compare(a, b)? == Ordering::Greater {
            b.clone()
        } else {
            a.clone()
        })
    })
}

fn word_abs(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut().unary_op(Value::abs)
}

pub fn register_arithmetic_words(vm: &mut VirtualMachine) {
    add_word(vm, "+", word_add, "a b -- a+b", "Add the top two numbers.");
    add_word(vm, "-", word_sub, "a b -- a-b", "Subtract the top number from the second.");
    add_word(vm, "*", word_mul, "a b -- a*b", "Multiply the top two numbers.");
    add_word(vm, "/", word_div, "a b -- a/b", "Divide, always producing a float.");
    add_word(vm, "//", word_floor_div, "a b -- a//b", "Floor division.");
    add_word(vm, "mod", word_mod, "a b -- a%b", "Modulus, taking the sign of the divisor.");
    add_word(vm, "**", word_pow, "a b -- a**b", "Raise the second number to the power of the top.");
    add_word(vm, "neg", word_neg, "n -- -n", "Negate a number.");
    add_word(vm, "1+", word_one_plus, "n -- n+1", "Add one to the top of the stack.");
    add_word(vm, "1-", word_one_minus, "n -- n-1", "Subtract one from the top of the stack.");
    add_word(vm, "max", word_max, "a b -- max", "Keep the larger of the top two values.");
    add_word(vm, "min", word_min, "a b -- min", "Keep the smaller of the top two values.");
    add_word(vm, "abs", word_abs, "n -- |n|", "Absolute value of the top of the stack.");
}
