use crate::runtime::{
    data_structures::word::{BuiltinHandler, Word},
    vm::VirtualMachine,
};

/// Words implementing arithmetic on the data stack.
mod arithmetic_words;

/// Comparison words, the boolean constants, and the logical connectives.
mod comparison_words;

/// Words that shuffle the data stack.
mod stack_words;

/// Words that work with the return stack.
mod return_stack_words;

/// Words that perform I/O against the terminal and the character stream.
mod io_words;

/// The comment and documentation words.
mod comment_words;

/// The variable words backed by the heap.
mod heap_words;

/// The parsing and metaprogramming words, including the colon compiler itself.
mod word_words;

/// Words that change or inspect interpreter state.
mod vm_words;

/// Register a normal built-in word with its stack effect and description.
pub(crate) fn add_word(
    vm: &mut VirtualMachine,
    name: &str,
    handler: BuiltinHandler,
    effect: &str,
    description: &str,
) {
    vm.add_builtin(Word::builtin(
        name,
        handler,
        false,
        Some(effect),
        Some(description),
    ));
}

/// Register an immediate built-in word, one that executes even in compile mode.
pub(crate) fn add_immediate_word(
    vm: &mut VirtualMachine,
    name: &str,
    handler: BuiltinHandler,
    effect: &str,
    description: &str,
) {
    vm.add_builtin(Word::builtin(
        name,
        handler,
        true,
        Some(effect),
        Some(description),
    ));
}

/// Called to populate a fresh machine's dictionary with all of the built-in words.
pub fn register_built_in_words(vm: &mut VirtualMachine) {
    arithmetic_words::register_arithmetic_words(vm);
    comparison_words::register_comparison_words(vm);
    stack_words::register_stack_words(vm);
    return_stack_words::register_return_stack_words(vm);
    io_words::register_io_words(vm);
    comment_words::register_comment_words(vm);
    heap_words::register_heap_words(vm);
    word_words::register_word_words(vm);
    vm_words::register_vm_words(vm);
}
