use crate::runtime::{
    built_ins::add_word,
    data_structures::value::Value,
    error::{self, ErrorKind, runtime_error},
    vm::VirtualMachine,
};

/// Pop an integer and print the character it encodes.
///
/// Signature: `code -- `
fn word_emit(vm: &mut VirtualMachine) -> error::Result<()> {
    let value = vm.stack_mut().pop()?;

    if !value.is_numeric() {
        return runtime_error(
            ErrorKind::Type,
            format!("emit expects a character code, got {}", value),
        );
    }

    let code = value.get_int_val();

    match u32::try_from(code).ok().and_then(char::from_u32) {
        Some(character) => {
            println!("{}", character);
            Ok(())
        }

        None => runtime_error(
            ErrorKind::Type,
            format!("{} is not a valid character code", code),
        ),
    }
}

/// Read one character from the stream and push its code point.
///
/// Signature: ` -- code`
fn word_key(vm: &mut VirtualMachine) -> error::Result<()> {
    match vm.stream_mut().next_char() {
        Some(character) => vm.stack_mut().push(Value::Int(character as i64)),
        None => runtime_error(ErrorKind::EndOfStream, "End of stream"),
    }
}

/// Read the next whitespace separated symbol from the stream and push it.
///
/// Signature: ` -- symbol`
fn word_word(vm: &mut VirtualMachine) -> error::Result<()> {
    let symbol = vm.next_symbol()?;
    vm.stack_mut().push(Value::Symbol(symbol))
}

pub fn register_io_words(vm: &mut VirtualMachine) {
    add_word(vm, "emit", word_emit, "code -- ", "Print the character for a code point.");
    add_word(vm, "key", word_key, " -- code", "Read one character from the stream.");
    add_word(vm, "word", word_word, " -- symbol", "Read the next symbol from the stream.");
}
