use sloth::runtime::{
    data_structures::value::Value,
    error::{ErrorKind, Result, Unwind},
    vm::VirtualMachine,
};
use test_case::test_case;

/// Run a piece of source against a fresh machine, optionally seeded with integers, and return
/// the resulting data stack from bottom to top.
fn eval_and_stack(source: &str, init_stack: &[i64]) -> Result<Vec<Value>> {
    let mut vm = VirtualMachine::new(source);

    for &value in init_stack {
        vm.stack_mut().push(Value::Int(value))?;
    }

    vm.run()?;

    Ok(vm.stack().iter().cloned().collect())
}

/// Like eval_and_stack, with every result converted to an integer for compact assertions.
fn eval_ints(source: &str, init_stack: &[i64]) -> Result<Vec<i64>> {
    let stack = eval_and_stack(source, init_stack)?;
    Ok(stack.iter().map(Value::get_int_val).collect())
}

/// The error kind a failing evaluation produced.
fn eval_error_kind(source: &str, init_stack: &[i64]) -> ErrorKind {
    match eval_and_stack(source, init_stack) {
        Err(Unwind::Error(error)) => error.kind(),
        other => panic!("expected a runtime error, got {:?}", other),
    }
}

// --- Arithmetic ---

#[test_case("2 3 + 4 *", &[], &[20]; "add then multiply")]
#[test_case("-", &[5, 2], &[3]; "subtract")]
#[test_case("//", &[7, 2], &[3]; "floor division")]
#[test_case("//", &[-7, 2], &[-4]; "floor division rounds down")]
#[test_case("mod", &[13, 5], &[3]; "modulus")]
#[test_case("mod", &[-7, 2], &[1]; "modulus takes divisor sign")]
#[test_case("**", &[2, 10], &[1024]; "exponentiation")]
#[test_case("neg", &[5], &[-5]; "negate")]
#[test_case("1+", &[41], &[42]; "increment")]
#[test_case("1-", &[43], &[42]; "decrement")]
#[test_case("max", &[3, 7], &[7]; "max")]
#[test_case("min", &[3, 7], &[3]; "min")]
#[test_case("abs", &[-42], &[42]; "absolute value")]
fn arithmetic_words(source: &str, init: &[i64], expected: &[i64]) {
    assert_eq!(eval_ints(source, init).unwrap(), expected);
}

#[test]
fn true_division_always_floats() {
    assert_eq!(eval_and_stack("6 3 /", &[]).unwrap(), vec![Value::Float(2.0)]);
    assert_eq!(eval_and_stack("1 2 /", &[]).unwrap(), vec![Value::Float(0.5)]);
}

#[test]
fn integers_promote_to_floats() {
    assert_eq!(
        eval_and_stack("2 0.5 +", &[]).unwrap(),
        vec![Value::Float(2.5)]
    );
}

#[test_case("7 0 +", &[7]; "additive identity")]
#[test_case("7 1 *", &[7]; "multiplicative identity")]
#[test_case("7 neg neg", &[7]; "double negation")]
fn arithmetic_identities(source: &str, expected: &[i64]) {
    assert_eq!(eval_ints(source, &[]).unwrap(), expected);
}

// --- Numeric literals ---

#[test]
fn radixed_literals_are_numbers() {
    assert_eq!(eval_ints("0x10 0b101 0o17", &[]).unwrap(), vec![16, 5, 15]);
}

#[test]
fn float_literals_with_exponent() {
    assert_eq!(
        eval_and_stack("1.5e2", &[]).unwrap(),
        vec![Value::Float(150.0)]
    );
}

// --- Comparison and logic ---

#[test_case("2 3 <", true; "less")]
#[test_case("2 3 >", false; "greater")]
#[test_case("3 3 >=", true; "greater or equal")]
#[test_case("3 3 <=", true; "less or equal")]
#[test_case("5 5 =", true; "equal")]
#[test_case("5 6 <>", true; "not equal")]
#[test_case("1 1.0 =", true; "int equals float")]
#[test_case("True not", false; "logical not")]
fn comparison_words(source: &str, expected: bool) {
    assert_eq!(
        eval_and_stack(source, &[]).unwrap(),
        vec![Value::Bool(expected)]
    );
}

#[test]
fn zero_comparisons_leave_the_top() {
    assert_eq!(
        eval_and_stack("0 0=", &[]).unwrap(),
        vec![Value::Int(0), Value::Bool(true)]
    );

    assert_eq!(
        eval_and_stack("-5 0<", &[]).unwrap(),
        vec![Value::Int(-5), Value::Bool(true)]
    );

    assert_eq!(
        eval_and_stack("5 0>", &[]).unwrap(),
        vec![Value::Int(5), Value::Bool(true)]
    );

    assert_eq!(
        eval_and_stack("1 1=", &[]).unwrap(),
        vec![Value::Int(1), Value::Bool(true)]
    );
}

#[test]
fn and_or_return_an_operand() {
    assert_eq!(eval_ints("6 3 and", &[]).unwrap(), vec![3]);
    assert_eq!(eval_ints("0 3 and", &[]).unwrap(), vec![0]);
    assert_eq!(eval_ints("6 3 or", &[]).unwrap(), vec![6]);

    assert_eq!(
        eval_and_stack("False 3 or", &[]).unwrap(),
        vec![Value::Int(3)]
    );
}

// --- Stack shufflers ---

#[test_case("swap", &[1, 2], &[2, 1]; "swap")]
#[test_case("dup", &[42], &[42, 42]; "dup")]
#[test_case("drop", &[1, 2], &[1]; "drop")]
#[test_case("over", &[1, 2], &[1, 2, 1]; "over")]
#[test_case("2over", &[1, 2, 3, 4], &[1, 2, 3, 4, 1, 2]; "two over")]
#[test_case("rot", &[1, 2, 3], &[2, 3, 1]; "rot")]
#[test_case("-rot", &[1, 2, 3], &[3, 1, 2]; "minus rot")]
#[test_case("2swap", &[1, 2, 3, 4], &[3, 4, 1, 2]; "two swap")]
#[test_case("?dup", &[7], &[7, 7]; "question dup truthy")]
#[test_case("?dup", &[0], &[0]; "question dup falsy")]
#[test_case("depth", &[1, 2, 3], &[1, 2, 3, 3]; "depth")]
#[test_case("0 pick", &[1, 2, 3], &[1, 2, 3, 3]; "pick top")]
#[test_case("2 pick", &[1, 2, 3], &[1, 2, 3, 1]; "pick deep")]
#[test_case("clearstack", &[1, 2, 3], &[]; "clearstack")]
fn stack_words(source: &str, init: &[i64], expected: &[i64]) {
    assert_eq!(eval_ints(source, init).unwrap(), expected);
}

#[test_case("1 2 swap swap", &[1, 2]; "swap involution")]
#[test_case("1 2 3 rot rot rot", &[1, 2, 3]; "triple rot identity")]
#[test_case("5 dup drop", &[5]; "dup drop identity")]
fn stack_round_trips(source: &str, expected: &[i64]) {
    assert_eq!(eval_ints(source, &[]).unwrap(), expected);
}

#[test]
fn minus_rot_is_double_rot() {
    assert_eq!(
        eval_ints("1 2 3 -rot", &[]).unwrap(),
        eval_ints("1 2 3 rot rot", &[]).unwrap()
    );
}

// --- Return stack ---

#[test]
fn values_round_trip_through_the_return_stack() {
    assert_eq!(eval_ints("5 >r 6 r> +", &[]).unwrap(), vec![11]);
}

#[test]
fn i_copies_without_popping() {
    assert_eq!(eval_ints("5 >r i i r> drop +", &[]).unwrap(), vec![10]);
}

#[test]
fn rp_fetch_reports_the_depth() {
    assert_eq!(
        eval_ints("1 >r 2 >r rp@ r> drop r> drop", &[]).unwrap(),
        vec![2]
    );
}

#[test]
fn r_plus_and_r_minus_adjust_in_place() {
    assert_eq!(eval_ints("5 >r r+ r+ r> ", &[]).unwrap(), vec![7]);
    assert_eq!(eval_ints("5 >r r- r>", &[]).unwrap(), vec![4]);
}

#[test]
fn rdrop_discards() {
    assert_eq!(eval_ints("1 >r 2 >r rdrop r>", &[]).unwrap(), vec![1]);
}

// --- Definitions and control flow ---

#[test]
fn colon_definition_and_invocation() {
    let mut vm = VirtualMachine::new(": square dup * ; 5 square");
    vm.run().unwrap();

    assert_eq!(
        vm.stack().iter().cloned().collect::<Vec<_>>(),
        vec![Value::Int(25)]
    );
    assert!(vm.is_immediate_mode());

    let square = vm.dictionary().try_get("square").unwrap();
    assert!(!square.defined_body().unwrap().code.borrow().is_empty());
}

#[test]
fn zero_branch_consumes_offset_and_flag() {
    // The flag is popped, the dup'd operand stays beneath the result.
    assert_eq!(
        eval_ints(": check dup 0< 0branch 2 neg ; -7 check", &[]).unwrap(),
        vec![-7, 7]
    );

    assert_eq!(
        eval_ints(": check dup 0< 0branch 2 neg ; 9 check", &[]).unwrap(),
        vec![9, 9]
    );
}

#[test]
fn bracket_toggle_and_comma_compile_a_literal() {
    assert_eq!(eval_ints(": greet [ 41 1 + ] , ; greet", &[]).unwrap(), vec![42]);
}

#[test]
fn exit_leaves_one_word_only() {
    assert_eq!(eval_ints(": f 1 exit 2 ; f", &[]).unwrap(), vec![1]);

    // exit unwinds exactly one frame: the caller keeps running.
    assert_eq!(
        eval_ints(": f 1 exit 2 ; : g f 3 ; g", &[]).unwrap(),
        vec![1, 3]
    );
}

#[test]
fn immediate_words_run_during_compilation() {
    assert_eq!(
        eval_ints(": now 42 ; immediate : later now ; later", &[]).unwrap(),
        vec![42]
    );
}

#[test]
fn interpret_flag_reflects_the_mode() {
    assert_eq!(
        eval_and_stack("interpret?", &[]).unwrap(),
        vec![Value::Bool(true)]
    );

    // Inside a definition, [ switches back to interpret mode.
    assert_eq!(
        eval_and_stack(": m [ interpret? ] ; m", &[]).unwrap(),
        vec![Value::Bool(true)]
    );
}

#[test]
fn tick_resolves_the_next_symbol() {
    assert_eq!(
        eval_and_stack("' drop immediate?", &[]).unwrap(),
        vec![Value::Bool(false)]
    );

    assert_eq!(
        eval_and_stack("' ; immediate?", &[]).unwrap(),
        vec![Value::Bool(true)]
    );

    // A numeric literal after ' resolves to the number itself.
    assert_eq!(eval_ints("' 42", &[]).unwrap(), vec![42]);
}

#[test]
fn compiled_tick_pushes_the_inline_operand() {
    assert_eq!(
        eval_and_stack(": q ['] dup ; q immediate?", &[]).unwrap(),
        vec![Value::Bool(false)]
    );
}

#[test]
fn does_grafts_the_tail_onto_the_new_word() {
    assert_eq!(
        eval_ints(": make2 create does> 2 ; make2 two two two", &[]).unwrap(),
        vec![2, 2]
    );
}

#[test]
fn here_tracks_the_code_length() {
    // here runs at compile time only when forced with [ ] ; two ops are compiled before it.
    assert_eq!(eval_ints(": f 1 2 [ here ] ;", &[]).unwrap(), vec![2]);
}

#[test]
fn lastword_pushes_the_newest_word() {
    assert_eq!(
        eval_and_stack(": f ; lastword immediate?", &[]).unwrap(),
        vec![Value::Bool(false)]
    );
}

#[test]
fn code_vector_fetch_and_store() {
    // Patch the literal 1 in f's code to 9 before running it.
    assert_eq!(
        eval_ints(": f 1 ; 9 0 w! f", &[]).unwrap(),
        vec![9]
    );

    assert_eq!(eval_ints(": f 7 ; 0 w@", &[]).unwrap(), vec![7]);
}

// --- Heap ---

#[test]
fn heap_accumulate() {
    assert_eq!(
        eval_ints("0 word x ! 3 word x +! 4 word x +! word x @", &[]).unwrap(),
        vec![7]
    );
}

#[test]
fn heap_round_trip_leaves_one_mapping() {
    let mut vm = VirtualMachine::new("5 word a ! word a @");
    vm.run().unwrap();

    assert_eq!(
        vm.stack().iter().cloned().collect::<Vec<_>>(),
        vec![Value::Int(5)]
    );
    assert_eq!(vm.heap().len(), 1);
}

#[test]
fn minus_store_defaults_to_the_delta() {
    assert_eq!(eval_ints("3 word x -! word x @", &[]).unwrap(), vec![3]);
    assert_eq!(
        eval_ints("10 word x ! 3 word x -! word x @", &[]).unwrap(),
        vec![7]
    );
}

// --- Parsing words and the stream ---

#[test]
fn word_grabs_the_next_symbol() {
    assert_eq!(
        eval_and_stack("word hello", &[]).unwrap(),
        vec![Value::Symbol("hello".to_string())]
    );
}

#[test]
fn key_reads_one_character() {
    // key grabs the separator immediately after it; the rest of the line is commented away.
    assert_eq!(eval_ints("key \\ trailing", &[]).unwrap(), vec![' ' as i64]);
}

// --- Errors ---

#[test_case("+", &[], ErrorKind::StackUnderflow; "underflow on empty stack")]
#[test_case("+", &[1], ErrorKind::StackUnderflow; "underflow on short stack")]
#[test_case("no_such_word", &[], ErrorKind::UndefinedSymbol; "undefined symbol")]
#[test_case("word x @", &[], ErrorKind::HeapMiss; "fetch of fresh address")]
#[test_case("/", &[1, 0], ErrorKind::Arithmetic; "division by zero")]
#[test_case("exit", &[], ErrorKind::Context; "exit at top level")]
#[test_case(";", &[], ErrorKind::StackUnderflow; "semicolon without colon")]
#[test_case("word", &[], ErrorKind::EndOfStream; "word at end of stream")]
#[test_case("' dup decompile", &[], ErrorKind::Type; "decompiling a builtin")]
#[test_case("5 ,", &[], ErrorKind::Context; "comma with no definition")]
fn error_kinds(source: &str, init: &[i64], expected: ErrorKind) {
    assert_eq!(eval_error_kind(source, init), expected);
}

#[test]
fn symbols_cannot_be_ordered_against_numbers() {
    let mut vm = VirtualMachine::new("word a 1 <");

    match vm.run() {
        Err(Unwind::Error(error)) => assert_eq!(error.kind(), ErrorKind::Type),
        other => panic!("expected a type error, got {:?}", other),
    }
}

#[test]
fn bye_signals_termination() {
    let mut vm = VirtualMachine::new("1 bye 2");
    assert_eq!(vm.run(), Err(Unwind::Bye));
}

// --- Diagnostics ---

#[test]
fn printing_words_run_clean() {
    // help, words, .r, .m, and decompile only print; they must not disturb the machine.
    assert_eq!(eval_ints("help dup", &[]).unwrap(), Vec::<i64>::new());
    assert_eq!(eval_ints("words", &[]).unwrap(), Vec::<i64>::new());
    assert_eq!(eval_ints("1 word x ! .m 5 >r .r r> drop", &[]).unwrap(), Vec::<i64>::new());
    assert_eq!(
        eval_ints(": f 1 2 + ; lastword decompile", &[]).unwrap(),
        Vec::<i64>::new()
    );
}

#[test]
fn toggle_warnings_flips_the_flag() {
    let mut vm = VirtualMachine::new("toggle-warnings");
    vm.run().unwrap();

    assert!(!vm.warnings());
}

#[test]
fn diagnostic_serialization_formats() {
    let mut vm = VirtualMachine::new("1 2.0 word three");
    vm.run().unwrap();

    assert_eq!(format!("{}", vm.stack()), "[1 2.0 three]");

    vm.read_input("' dup");
    vm.run().unwrap();

    assert_eq!(format!("{}", vm.stack().top().unwrap()), "w:dup");
}

// --- Import ---

#[test]
fn import_publishes_non_hidden_words() {
    use std::io::Write;

    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("m.sloth");

    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, ": pub 1 ; : priv 2 ; hidden").unwrap();
    drop(file);

    let mut vm = VirtualMachine::new("import m pub");
    vm.add_search_path(directory.path());
    vm.run().unwrap();

    assert_eq!(
        vm.stack().iter().cloned().collect::<Vec<_>>(),
        vec![Value::Int(1)]
    );

    vm.read_input("priv");
    match vm.run() {
        Err(Unwind::Error(error)) => assert_eq!(error.kind(), ErrorKind::UndefinedSymbol),
        other => panic!("expected an undefined symbol error, got {:?}", other),
    }
}

#[test]
fn the_shipped_std_module_loads() {
    let mut vm = VirtualMachine::new("import std 1 2 nip 3 tuck");
    vm.add_search_path(env!("CARGO_MANIFEST_DIR").to_string() + "/lib");
    vm.run().unwrap();

    assert_eq!(eval_ints_from(&vm), vec![3, 2, 3]);
}

fn eval_ints_from(vm: &VirtualMachine) -> Vec<i64> {
    vm.stack().iter().map(Value::get_int_val).collect()
}

// --- Revert ---

#[test]
fn revert_restores_the_pre_line_state() {
    let mut vm = VirtualMachine::new("");

    vm.read_input("9");
    vm.run().unwrap();

    vm.read_input("5 undefined_word");
    assert!(vm.run().is_err());
    vm.revert();

    assert_eq!(
        vm.stack().iter().cloned().collect::<Vec<_>>(),
        vec![Value::Int(9)]
    );
    assert!(vm.is_immediate_mode());
}
