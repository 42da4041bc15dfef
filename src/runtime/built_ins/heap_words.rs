use crate::runtime::{
    built_ins::add_word,
    data_structures::word::Op,
    error::{self, ErrorKind, runtime_error},
    vm::VirtualMachine,
};

/// Pop an address and a value and store the value at the address.
///
/// Signature: `value address -- `
fn word_store(vm: &mut VirtualMachine) -> error::Result<()> {
    let address = vm.stack_mut().pop()?;
    let value = vm.stack_mut().pop()?;

    vm.heap_mut().store(address, value);

    Ok(())
}

/// Resolve a code-vector index popped off the stack.
fn pop_code_index(vm: &mut VirtualMachine) -> error::Result<usize> {
    let address = vm.stack_mut().pop()?;

    if !address.is_numeric() {
        return runtime_error(
            ErrorKind::Type,
            format!("Code address must be a number, got {}", address),
        );
    }

    let index = address.get_int_val();

    if index < 0 {
        return runtime_error(
            ErrorKind::CodeOutOfBounds,
            format!("Address \"{}\" out of bounds", index),
        );
    }

    Ok(index as usize)
}

/// Store a value directly into the newest word's code vector.  Raw self-modifying compile
/// access, used to patch branch offsets.
///
/// Signature: `value address -- `
fn word_code_store(vm: &mut VirtualMachine) -> error::Result<()> {
    let index = pop_code_index(vm)?;
    let value = vm.stack_mut().pop()?;

    let last = vm.last_word()?;
    let body = last.defined_body()?;
    let mut code = body.code.borrow_mut();

    if index >= code.len() {
        return runtime_error(
            ErrorKind::CodeOutOfBounds,
            format!("Address \"{}\" out of bounds", index),
        );
    }

    code[index] = Op::from_value(value);

    Ok(())
}

/// Add to the value at an address, starting from the delta when the address is fresh.
///
/// Signature: `delta address -- `
fn word_add_store(vm: &mut VirtualMachine) -> error::Result<()> {
    let address = vm.stack_mut().pop()?;
    let delta = vm.stack_mut().pop()?;

    vm.heap_mut().add(address, &delta)
}

/// Subtract from the value at an address, starting from the delta when the address is fresh.
///
/// Signature: `delta address -- `
fn word_sub_store(vm: &mut VirtualMachine) -> error::Result<()> {
    let address = vm.stack_mut().pop()?;
    let delta = vm.stack_mut().pop()?;

    vm.heap_mut().sub(address, &delta)
}

/// Pop an address and push the value stored there.
///
/// Signature: `address -- value`
fn word_fetch(vm: &mut VirtualMachine) -> error::Result<()> {
    let address = vm.stack_mut().pop()?;
    let value = vm.heap().fetch(&address)?;

    vm.stack_mut().push(value)
}

/// Push the operation at an index of the newest word's code vector.
///
/// Signature: `address -- value`
fn word_code_fetch(vm: &mut VirtualMachine) -> error::Result<()> {
    let index = pop_code_index(vm)?;

    let last = vm.last_word()?;
    let body = last.defined_body()?;
    let code = body.code.borrow();

    match code.get(index) {
        Some(op) => {
            let value = op.to_value();
            drop(code);
            vm.stack_mut().push(value)
        }

        None => runtime_error(
            ErrorKind::CodeOutOfBounds,
            format!("Address \"{}\" out of bounds", index),
        ),
    }
}

/// Print every heap entry.
fn word_print_heap(vm: &mut VirtualMachine) -> error::Result<()> {
    print!("{}", vm.heap());

    Ok(())
}

pub fn register_heap_words(vm: &mut VirtualMachine) {
    add_word(vm, "!", word_store, "value address -- ", "Store a value at an address.");
    add_word(vm, "w!", word_code_store, "value address -- ", "Store into the newest word's code vector.");
    add_word(vm, "+!", word_add_store, "delta address -- ", "Add to the value at an address.");
    add_word(vm, "-!", word_sub_store, "delta address -- ", "Subtract from the value at an address.");
    add_word(vm, "@", word_fetch, "address -- value", "Fetch the value at an address.");
    add_word(vm, "w@", word_code_fetch, "address -- value", "Fetch from the newest word's code vector.");
    add_word(vm, ".m", word_print_heap, " -- ", "Print all heap entries.");
}
