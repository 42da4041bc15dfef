use crate::runtime::{
    built_ins::{add_immediate_word, add_word},
    data_structures::{
        value::Value,
        word::{Op, Word},
    },
    error::{self, ErrorKind, Unwind, runtime_error},
    vm::VirtualMachine,
};

/// Mark the newest word immediate, so it executes even in compile mode.
fn word_immediate(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.last_word()?.set_immediate(true);

    Ok(())
}

/// Pop a word reference and push its immediate flag.
fn word_immediate_q(vm: &mut VirtualMachine) -> error::Result<()> {
    let value = vm.stack_mut().pop()?;

    match &value {
        Value::Word(word) => {
            let immediate = word.is_immediate();
            vm.stack_mut().push(Value::Bool(immediate))
        }

        other => runtime_error(
            ErrorKind::Type,
            format!("Immediate flag not defined for \"{}\"", other),
        ),
    }
}

/// Jump by the signed offset stored in the next compiled slot.  The instruction pointer lands
/// one short of the target so the execution loop's step finishes the move.
fn word_branch(vm: &mut VirtualMachine) -> error::Result<()> {
    let operand = vm.next_compiled_instr()?.to_value();

    if !operand.is_numeric() {
        return runtime_error(
            ErrorKind::Type,
            format!("Branch offset must be a number, got {}", operand),
        );
    }

    let target = vm.ip() as i64 + operand.get_int_val() + 1;

    if target < 0 {
        return runtime_error(ErrorKind::CodeOutOfBounds, "Branch target out of range");
    }

    vm.set_ip(target as usize);

    Ok(())
}

/// Pop the top of the stack; branch when it is falsy, otherwise step over the offset slot.
fn word_zero_branch(vm: &mut VirtualMachine) -> error::Result<()> {
    let condition = vm.stack_mut().pop()?;

    if !condition.get_bool_val() {
        word_branch(vm)
    } else {
        vm.set_ip(vm.ip() + 1);
        Ok(())
    }
}

/// Switch to interpret mode.  Immediate, so it works inside a definition.
fn word_lbracket(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.set_immediate_mode(true);

    Ok(())
}

/// Switch to compile mode.
fn word_rbracket(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.set_immediate_mode(false);

    Ok(())
}

/// Push the mode flag.
fn word_interpret_q(vm: &mut VirtualMachine) -> error::Result<()> {
    let mode = vm.is_immediate_mode();
    vm.stack_mut().push(Value::Bool(mode))
}

/// Read the next symbol from the source stream, resolve it, and push the result.
fn word_tick(vm: &mut VirtualMachine) -> error::Result<()> {
    let symbol = vm.next_symbol()?;
    let op = vm.parse_symbol(&symbol)?;

    vm.stack_mut().push(op.to_value())
}

/// Push the next compiled slot of the executing word as a value, then step over it.
fn word_compiled_tick(vm: &mut VirtualMachine) -> error::Result<()> {
    let value = vm.next_compiled_instr()?.to_value();

    vm.stack_mut().push(value)?;
    vm.set_ip(vm.ip() + 1);

    Ok(())
}

/// Graft the remainder of the executing word's code onto the newest word, then leave.  This is
/// the tail-transplant that makes defining words work.
fn word_does(vm: &mut VirtualMachine) -> error::Result<()> {
    let current = vm.current_word()?;

    let ops: Vec<Op> = {
        let code = current.defined_body()?.code.borrow();
        let start = (vm.ip() + 1).min(code.len());
        code[start..].to_vec()
    };

    let last = vm.last_word()?;
    last.defined_body()?.code.borrow_mut().extend(ops);

    Err(Unwind::WordExit)
}

/// Pop a value and append it to the newest word's code vector.
fn word_comma(vm: &mut VirtualMachine) -> error::Result<()> {
    let value = vm.stack_mut().pop()?;

    let last = vm.last_word()?;
    last.defined_body()?.code.borrow_mut().push(Op::from_value(value));

    Ok(())
}

/// Push the most recently created word.
fn word_lastword(vm: &mut VirtualMachine) -> error::Result<()> {
    let last = vm.last_word()?;
    vm.stack_mut().push(Value::Word(last))
}

/// Read the next symbol and create an empty defined word under that name.
fn word_create(vm: &mut VirtualMachine) -> error::Result<()> {
    let symbol = vm.next_symbol()?;
    vm.insert_word(Word::defined(&symbol));

    Ok(())
}

/// Begin a definition: create the word, remember where in the source the definition started,
/// and switch to compile mode.
fn word_colon(vm: &mut VirtualMachine) -> error::Result<()> {
    let location = vm.stream().last_word_start();

    word_create(vm)?;

    let last = vm.last_word()?;
    last.defined_body()?.text_location.set(Some(location));

    vm.enter()?;
    vm.set_immediate_mode(false);

    Ok(())
}

/// End a definition and return to interpret mode.
fn word_semicolon(vm: &mut VirtualMachine) -> error::Result<()> {
    vm.exit()?;
    vm.set_immediate_mode(true);

    Ok(())
}

/// Mark the newest word hidden, excluding it from module export.
fn word_hidden(vm: &mut VirtualMachine) -> error::Result<()> {
    let last = vm.last_word()?;
    last.defined_body()?.hidden.set(true);

    Ok(())
}

/// Read the next symbol and import the module of that name.
fn word_import(vm: &mut VirtualMachine) -> error::Result<()> {
    let symbol = vm.next_symbol()?;
    vm.import_module(&symbol)
}

pub fn register_word_words(vm: &mut VirtualMachine) {
    add_immediate_word(vm, "immediate", word_immediate, " -- ", "Mark the newest word immediate.");
    add_word(vm, "immediate?", word_immediate_q, "word -- flag", "Push a word's immediate flag.");
    add_word(vm, "branch", word_branch, " -- ", "Jump by the inline signed offset.");
    add_word(vm, "0branch", word_zero_branch, "flag -- ", "Jump by the inline offset when the top is falsy.");
    add_immediate_word(vm, "[", word_lbracket, " -- ", "Switch to interpret mode.");
    add_word(vm, "]", word_rbracket, " -- ", "Switch to compile mode.");
    add_word(vm, "interpret?", word_interpret_q, " -- flag", "Push the mode flag.");
    add_word(vm, "'", word_tick, " -- value", "Resolve the next source symbol and push it.");
    add_word(vm, "[']", word_compiled_tick, " -- value", "Push the next compiled slot and skip it.");
    add_word(vm, "does>", word_does, " -- ", "Graft the caller's remaining code onto the newest word.");
    add_word(vm, ",", word_comma, "value -- ", "Append a value to the newest word's code.");
    add_word(vm, "lastword", word_lastword, " -- word", "Push the most recently created word.");
    add_word(vm, "create", word_create, " -- ", "Create an empty word named by the next symbol.");
    add_word(vm, ":", word_colon, " -- ", "Begin a definition.");
    add_immediate_word(vm, ";", word_semicolon, " -- ", "End a definition.");
    add_immediate_word(vm, "hidden", word_hidden, " -- ", "Mark the newest word hidden.");
    add_immediate_word(vm, "import", word_import, " -- ", "Import the module named by the next symbol.");
}
