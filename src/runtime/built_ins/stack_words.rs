use crate::runtime::{
    built_ins::add_word,
    data_structures::value::Value,
    error::{self, ErrorKind, runtime_error},
    vm::VirtualMachine,
};

/// Discard the top value on the data stack.
///
/// Signature: `value -- `
fn word_drop(vm: &mut VirtualMachine) -> error::Result<()> {
    let _ = vm.stack_mut().pop()?;

    Ok(())
}

/// Swap the top two values on the data stack.
///
/// Signature: `a b -- b a`
fn word_swap(vm: &mut VirtualMachine) -> error::Result<()> {
    let b = vm.stack_mut().pop()?;
    let a = vm.stack_mut().pop()?;

    vm.stack_mut().push(b)?;
    vm.stack_mut().push(a)?;

    Ok(())
}

/// Duplicate the top value on the data stack.
///
/// Signature: `value -- value value`
fn word_dup(vm: &mut VirtualMachine) -> error::Result<()> {
    let value = vm.stack().top()?.clone();
    vm.stack_mut().push(value)
}

/// Copy the second value over the top one.
///
/// Signature: `a b -- a b a`
fn word_over(vm: &mut VirtualMachine) -> error::Result<()> {
    let value = vm.stack().peek(1)?.clone();
    vm.stack_mut().push(value)
}

/// Copy the third and fourth values over the top pair.
///
/// Signature: `a b c d -- a b c d a b`
fn word_two_over(vm: &mut VirtualMachine) -> error::Result<()> {
    let a = vm.stack().peek(3)?.clone();
    let b = vm.stack().peek(2)?.clone();

    vm.stack_mut().push(a)?;
    vm.stack_mut().push(b)?;

    Ok(())
}

/// Rotate the third value to the top.
///
/// Signature: `a b c -- b c a`
fn word_rot(vm: &mut VirtualMachine) -> error::Result<()> {
    let c = vm.stack_mut().pop()?;
    let b = vm.stack_mut().pop()?;
    let a = vm.stack_mut().pop()?;

    vm.stack_mut().push(b)?;
    vm.stack_mut().push(c)?;
    vm.stack_mut().push(a)?;

    Ok(())
}

/// Rotate the top value down to third place.
///
/// Signature: `a b c -- c a b`
fn word_minus_rot(vm: &mut VirtualMachine) -> error::Result<()> {
    let c = vm.stack_mut().pop()?;
    let b = vm.stack_mut().pop()?;
    let a = vm.stack_mut().pop()?;

    vm.stack_mut().push(c)?;
    vm.stack_mut().push(a)?;
    vm.stack_mut().push(b)?;

    Ok(())
}

/// Swap the top two pairs.
///
/// Signature: `a b c d -- c d a b`
fn word_two_swap(vm: &mut VirtualMachine) -> error::Result<()> {
    let d = vm.stack_mut().pop()?;
    let c = vm.stack_mut().pop()?;
    let b = vm.stack_mut().pop()?;
    let a = vm.stack_mut().pop()?;

    vm.stack_mut().push(c)?;
    vm.stack_mut().push(d)?;
    vm.stack_mut().push(a)?;
    vm.stack_mut().push(b)?;

    Ok(())
}

/// Duplicate the top value only if it is truthy.
///
/// Signature: `value -- value value | false-value`
fn word_q_dup(vm: &mut VirtualMachine) -> error::Result<()> {
    if vm.stack().top()?.get_bool_val() {
        word_dup(vm)?;
    }

    Ok(())
}

/// Push the data stack depth, not counting the result.
///
/// Signature: ` -- depth`
fn word_depth(vm: &mut VirtualMachine) -> error::Result<()> {
    let depth = vm.stack().len() as i64;
    vm.stack_mut().push(Value::Int(depth))
}

/// Pop an index and push a copy of the element that many positions below the new top.
///
/// Signature: `n -- value`
fn word_pick(vm: &mut VirtualMachine) -> error::Result<()> {
    let index = vm.stack_mut().pop()?;

    if !index.is_numeric() {
        return runtime_error(
            ErrorKind::Type,
            format!("pick index must be a number, got {}", index),
        );
    }

    let index = index.get_int_val();

    if index < 0 {
        return runtime_error(ErrorKind::Type, "pick index must be non-negative");
    }

    let value = vm.stack().peek(index as usize)?.clone();
    vm.stack_mut().push(value)
}

fn word_clearstack(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut().clear();

    Ok(())
}

fn word_clearstacks(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.stack_mut().clear();
    vm.return_stack_mut().clear();

    Ok(())
}

pub fn register_stack_words(vm: &mut VirtualMachine) {
    add_word(vm, "drop", word_drop, "value -- ", "Discard the top value on the data stack.");
    add_word(vm, "swap", word_swap, "a b -- b a", "Swap the top two values on the data stack.");
    add_word(vm, "dup", word_dup, "value -- value value", "Duplicate the top value on the data stack.");
    add_word(vm, "over", word_over, "a b -- a b a", "Copy the second value over the top one.");
    add_word(vm, "2over", word_two_over, "a b c d -- a b c d a b", "Copy the second pair over the top one.");
    add_word(vm, "rot", word_rot, "a b c -- b c a", "Rotate the third value to the top.");
    add_word(vm, "-rot", word_minus_rot, "a b c -- c a b", "Rotate the top value down to third place.");
    add_word(vm, "2swap", word_two_swap, "a b c d -- c d a b", "Swap the top two pairs.");
    add_word(vm, "?dup", word_q_dup, "value -- value value?", "Duplicate the top value if it is truthy.");
    add_word(vm, "depth", word_depth, " -- depth", "Push the current data stack depth.");
    add_word(vm, "pick", word_pick, "n -- value", "Copy the nth value below the top onto the top.");
    add_word(vm, "clearstack", word_clearstack, "... -- ", "Empty the data stack.");
    add_word(vm, "clearstacks", word_clearstacks, "... -- ", "Empty the data and return stacks.");
}
