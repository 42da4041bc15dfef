use crate::runtime::{
    built_ins::add_word,
    data_structures::word::pretty_print_code,
    error::{self, Unwind},
    vm::VirtualMachine,
};

/// Flip the redefinition warnings flag and report the new state.
fn word_toggle_warnings(vm: &mut VirtualMachine) -> error::Result<()> {
    let warnings = !vm.warnings();
    vm.set_warnings(warnings);

    println!("Warnings turned {}", if warnings { "on" } else { "off" });

    Ok(())
}

/// Terminate the interpreter with a success status.
fn word_bye(_vm: &mut VirtualMachine) -> error::Result<()> {
    Err(Unwind::Bye)
}

/// Pop a defined word and print its code vector.
fn word_decompile(vm: &mut VirtualMachine) -> error::Result<()> {
    let value = vm.stack_mut().pop()?;
    let word = value.as_word()?;
    let body = word.defined_body()?;

    print!("{}", pretty_print_code(&body.code.borrow()));

    Ok(())
}

pub fn register_vm_words(vm: &mut VirtualMachine) {
    add_word(vm, "toggle-warnings", word_toggle_warnings, " -- ", "Flip the redefinition warnings flag.");
    add_word(vm, "bye", word_bye, " -- ", "Terminate the interpreter.");
    add_word(vm, "decompile", word_decompile, "word -- ", "Print a defined word's code vector.");
}
