use crate::runtime::{
    built_ins::{add_immediate_word, add_word},
    error::{self, ErrorKind, runtime_error},
    vm::VirtualMachine,
};
use std::collections::VecDeque;

/// Consume characters from the stream up to and including the sentinel, returning the text in
/// front of it.  A sliding window the size of the sentinel is compared after every character.
///
/// When `end_of_stream_ok` is set, running out of characters simply ends the accumulation; this
/// is how a line comment at the very end of the input stays legal.  Otherwise a dry stream
/// before the sentinel is a lexical error.
fn accum_until(
    vm: &mut VirtualMachine,
    sentinel: &str,
    end_of_stream_ok: bool,
) -> error::Result<String> {
    let sentinel: Vec<char> = sentinel.chars().collect();
    let mut window: VecDeque<char> = VecDeque::with_capacity(sentinel.len());
    let mut accum: Vec<char> = Vec::new();

    loop {
        let Some(next) = vm.stream_mut().next_char() else {
            if end_of_stream_ok {
                return Ok(accum.into_iter().collect());
            }

            return runtime_error(
                ErrorKind::Lexical,
                format!(
                    "Unterminated comment, expected \"{}\"",
                    sentinel.iter().collect::<String>()
                ),
            );
        };

        accum.push(next);

        if window.len() == sentinel.len() {
            window.pop_front();
        }

        window.push_back(next);

        if window.len() == sentinel.len() && window.iter().eq(sentinel.iter()) {
            accum.truncate(accum.len() - sentinel.len());
            return Ok(accum.into_iter().collect());
        }
    }
}

/// Strip the whitespace prefix common to all non-blank lines, then indent each non-blank line by
/// two spaces.  Used to tidy doc-comment text.
fn dedent_and_indent(text: &str) -> String {
    let prefix_len = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut result = String::with_capacity(text.len());

    for (index, line) in text.lines().enumerate() {
        if index > 0 {
            result.push('\n');
        }

        if line.trim().is_empty() {
            continue;
        }

        result.push_str("  ");
        result.push_str(&line[prefix_len.min(line.len() - line.trim_start().len())..]);
    }

    result
}

/// Line comment: consume everything up to and including the next newline.
fn word_line_comment(vm: &mut VirtualMachine) -> error::Result<()> {
    let _ = accum_until(vm, "\n", true)?;

    Ok(())
}

/// Paired comment.  When it appears at the head of a definition, before any code has been
/// compiled and before any effect has been recorded, the trimmed text becomes the word's stack
/// effect.
fn word_paired_comment(vm: &mut VirtualMachine) -> error::Result<()> {
    let text = accum_until(vm, ")", false)?;

    if let Ok(last) = vm.last_word()
        && let Ok(body) = last.defined_body()
        && body.code.borrow().is_empty()
        && last.stack_effect().is_none()
    {
        last.set_stack_effect(format!("( {} )", text.trim()));
    }

    Ok(())
}

/// Doc comment: attach the dedented text to the word currently being defined.
fn word_doc_comment(vm: &mut VirtualMachine) -> error::Result<()> {
    let text = accum_until(vm, "\")", false)?;

    if vm.dictionary().last_word().is_none() || vm.return_stack().is_empty() {
        return runtime_error(
            ErrorKind::Context,
            "Invalid doc-comment: outside of definition.",
        );
    }

    let last = vm.last_word()?;
    last.set_documentation(dedent_and_indent(&text));

    Ok(())
}

/// Look up the next symbol and print its stack effect and documentation.
fn word_help(vm: &mut VirtualMachine) -> error::Result<()> {
    let symbol = vm.next_symbol()?;

    let Some(word) = vm.dictionary().try_get(&symbol) else {
        return runtime_error(
            ErrorKind::UndefinedSymbol,
            format!("Undefined symbol: \"{}\"", symbol),
        );
    };

    match word.stack_effect() {
        Some(effect) => println!("{}", effect),
        None => println!("( ??? )"),
    }

    if let Some(documentation) = word.documentation() {
        println!("{}", documentation);
    }

    Ok(())
}

/// Print every word name in the dictionary.
fn word_words(vm: &mut VirtualMachine) -> error::Result<()> {
    println!("{}", vm.dictionary());

    Ok(())
}

pub fn register_comment_words(vm: &mut VirtualMachine) {
    add_immediate_word(vm, "\\", word_line_comment, " -- ", "Comment to the end of the line.");
    add_immediate_word(vm, "(", word_paired_comment, " -- ", "Comment up to the closing paren; records a stack effect at the head of a definition.");
    add_immediate_word(vm, "(\"", word_doc_comment, " -- ", "Attach documentation to the word being defined.");
    add_immediate_word(vm, "help", word_help, " -- ", "Print the stack effect and documentation of the next word.");
    add_word(vm, "words", word_words, " -- ", "Print all dictionary keys.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::error::Unwind;

    #[test]
    fn line_comments_tolerate_stream_end() {
        let mut vm = VirtualMachine::new("1 \\ all of this is ignored");
        vm.run().unwrap();

        assert_eq!(vm.stack().len(), 1);
    }

    #[test]
    fn paired_comments_are_skipped() {
        let mut vm = VirtualMachine::new("( ignored words even + ) 1 2 +");
        vm.run().unwrap();

        assert_eq!(vm.stack().len(), 1);
    }

    #[test]
    fn unterminated_paired_comment_is_lexical() {
        let mut vm = VirtualMachine::new("( never closed");

        match vm.run() {
            Err(Unwind::Error(error)) => assert_eq!(error.kind(), ErrorKind::Lexical),
            _ => panic!("expected a lexical error"),
        }
    }

    #[test]
    fn stack_effect_is_recorded_at_definition_head() {
        let mut vm = VirtualMachine::new(": square ( n -- n*n ) dup * ;");
        vm.run().unwrap();

        let word = vm.dictionary().try_get("square").unwrap();
        assert_eq!(word.stack_effect().as_deref(), Some("( n -- n*n )"));
    }

    #[test]
    fn later_comments_leave_the_effect_alone() {
        let mut vm = VirtualMachine::new(": f ( first ) dup ( second ) * ;");
        vm.run().unwrap();

        let word = vm.dictionary().try_get("f").unwrap();
        assert_eq!(word.stack_effect().as_deref(), Some("( first )"));
    }

    #[test]
    fn doc_comment_outside_definition_errors() {
        let mut vm = VirtualMachine::new("(\" docs without a word \")");

        match vm.run() {
            Err(Unwind::Error(error)) => assert_eq!(error.kind(), ErrorKind::Context),
            _ => panic!("expected a context error"),
        }
    }

    #[test]
    fn doc_comment_attaches_to_the_definition() {
        let mut vm = VirtualMachine::new(": f (\" Doubles a number. \") dup + ;");
        vm.run().unwrap();

        let word = vm.dictionary().try_get("f").unwrap();
        assert!(word.documentation().unwrap().contains("Doubles a number."));
    }

    #[test]
    fn dedent_strips_the_common_prefix() {
        let text = "\n    first line\n      second line\n";
        let result = dedent_and_indent(text);

        assert!(result.contains("  first line"));
        assert!(result.contains("    second line"));
    }
}
