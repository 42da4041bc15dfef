use crate::runtime::{
    built_ins::add_word,
    data_structures::value::Value,
    error::{self, ErrorKind, Unwind, runtime_error},
    vm::VirtualMachine,
};

/// Move the top of the data stack to the return stack.
///
/// Signature: `value -- `
fn word_to_r(vm: &mut VirtualMachine) -> error::Result<()> {
    let value = vm.stack_mut().pop()?;
    vm.return_stack_mut().push(value)
}

/// Move the top of the return stack to the data stack.
///
/// Signature: ` -- value`
fn word_r_from(vm: &mut VirtualMachine) -> error::Result<()> {
    let value = vm.return_stack_mut().pop()?;
    vm.stack_mut().push(value)
}

/// Discard the top of the return stack.
fn word_r_drop(vm: &mut VirtualMachine) -> error::Result<()> {
    let _ = vm.return_stack_mut().pop()?;

    Ok(())
}

/// Push the return stack depth onto the data stack.
fn word_rp_fetch(vm: &mut VirtualMachine) -> error::Result<()> {
    let depth = vm.return_stack().len() as i64;
    vm.stack_mut().push(Value::Int(depth))
}

/// Increment the top of the return stack in place.
fn word_r_plus(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.return_stack_mut()
        .unary_op(|value| Value::add(value, &Value::Int(1)))
}

/// Decrement the top of the return stack in place.
fn word_r_minus(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.return_stack_mut()
        .unary_op(|value| Value::sub(value, &Value::Int(1)))
}

/// Copy the top of the return stack to the data stack.  By convention this is the innermost loop
/// index.
fn word_i(vm: &mut VirtualMachine) -> error::Result<()> {
    let value = vm.return_stack().top()?.clone();
    vm.stack_mut().push(value)
}

/// Push the current length of the newest word's code vector.  Control-flow words use this to
/// compute branch offsets for later patching.
fn word_here(vm: &mut VirtualMachine) -> error::Result<()> {
    let last = match vm.last_word() {
        Ok(last) => last,
        Err(_) => {
            return runtime_error(
                ErrorKind::Context,
                "Error in \"here\": no previously compiled word",
            );
        }
    };

    let length = last.defined_body()?.code.borrow().len() as i64;
    vm.stack_mut().push(Value::Int(length))
}

/// Leave the currently executing defined word.
fn word_exit(vm: &mut VirtualMachine) -> error::Result<()> {
    if vm.return_stack().is_empty() {
        return runtime_error(
            ErrorKind::Context,
            "Error in \"exit\": cannot exit outside of a definition",
        );
    }

    Err(Unwind::WordExit)
}

/// Print the return stack.
fn word_print_rstack(vm: &mut VirtualMachine) -> error::Result<()> {
    println!("{}", vm.return_stack());

    Ok(())
}

pub fn register_return_stack_words(vm: &mut VirtualMachine) {
    add_word(vm, ">r", word_to_r, "value -- ", "Move the top of the data stack to the return stack.");
    add_word(vm, "r>", word_r_from, " -- value", "Move the top of the return stack to the data stack.");
    add_word(vm, "rdrop", word_r_drop, " -- ", "Discard the top of the return stack.");
    add_word(vm, "rp@", word_rp_fetch, " -- depth", "Push the return stack depth.");
    add_word(vm, "r+", word_r_plus, " -- ", "Increment the top of the return stack.");
    add_word(vm, "r-", word_r_minus, " -- ", "Decrement the top of the return stack.");
    add_word(vm, "i", word_i, " -- index", "Copy the top of the return stack to the data stack.");
    add_word(vm, "here", word_here, " -- address", "Push the code length of the newest word.");
    add_word(vm, "exit", word_exit, " -- ", "Leave the currently executing word.");
    add_word(vm, ".r", word_print_rstack, " -- ", "Print the return stack.");
}
