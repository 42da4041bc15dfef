use crate::{
    lang::{char_stream::CharStream, numbers::convert_numeric_literal},
    runtime::{
        built_ins::register_built_in_words,
        data_structures::{
            dictionary::Dictionary,
            heap::Heap,
            stack::Stack,
            value::Value,
            word::{CloneMemo, Op, WordKind, WordPtr},
        },
        error::{self, ErrorKind, Unwind, runtime_error},
    },
};
use std::{
    fs::read_to_string,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

/// A deep copy of the virtual machine's mutable state, held in the backup slot.  Restoring from
/// the snapshot gives the shell its transactional behavior: any failed line of input can be
/// rolled back wholesale.
struct VmSnapshot {
    stream: CharStream,
    ip: usize,
    stack: Stack,
    return_stack: Stack,
    frame_stack: Stack,
    dictionary: Dictionary,
    heap: Heap,
    immediate: bool,
    warnings: bool,
}

impl VmSnapshot {
    /// Produce a fresh deep copy of the snapshot, leaving the snapshot itself untouched so a
    /// revert can be repeated.
    fn duplicate(&self) -> VmSnapshot {
        let mut memo = CloneMemo::new();

        VmSnapshot {
            stream: self.stream.clone(),
            ip: self.ip,
            stack: self.stack.deep_clone(&mut memo),
            return_stack: self.return_stack.deep_clone(&mut memo),
            frame_stack: self.frame_stack.deep_clone(&mut memo),
            dictionary: self.dictionary.deep_clone(&mut memo),
            heap: self.heap.deep_clone(&mut memo),
            immediate: self.immediate,
            warnings: self.warnings,
        }
    }
}

/// The virtual machine and its dual-mode interpreter/compiler.
///
/// The machine owns the character stream, the three stacks, the dictionary, and the heap.  Its
/// top level loop reads whitespace separated symbols from the stream, resolves each one to either
/// a numeric literal or a dictionary word, and then either executes it or appends it to the word
/// currently being defined, depending on the mode flag and the word's immediate flag.
pub struct VirtualMachine {
    /// The character stream that is both the input and the program source.
    stream: CharStream,

    /// Index into the currently executing defined word's code vector.
    ip: usize,

    /// The data stack.
    stack: Stack,

    /// Saved instruction pointers interleaved with values stashed by `>r`.
    return_stack: Stack,

    /// The chain of defined words currently executing; the top word's code is what the
    /// instruction pointer indexes.
    frame_stack: Stack,

    /// The word dictionary, seeded from the built-in registry.
    dictionary: Dictionary,

    /// The store backing the variable words.
    heap: Heap,

    /// True in interpret mode, false while compiling a definition.
    immediate: bool,

    /// Emit a warning when a word is redefined.
    warnings: bool,

    /// Directories searched for modules, after the working directory.
    search_paths: Vec<PathBuf>,

    /// Set by the host to cancel execution between primitive dispatches.
    interrupt: Arc<AtomicBool>,

    /// The transactional backup slot.
    backup: Option<Box<VmSnapshot>>,
}

impl VirtualMachine {
    /// Create a machine over the given source text, with the built-in words registered and an
    /// initial backup taken.
    pub fn new(source: &str) -> VirtualMachine {
        let mut vm = VirtualMachine {
            stream: CharStream::new(source),
            ip: 0,
            stack: Stack::new(),
            return_stack: Stack::new(),
            frame_stack: Stack::new(),
            dictionary: Dictionary::new(),
            heap: Heap::new(),
            immediate: true,
            warnings: true,
            search_paths: Vec::new(),
            interrupt: Arc::new(AtomicBool::new(false)),
            backup: None,
        };

        register_built_in_words(&mut vm);
        vm.make_backup();

        vm
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut Stack {
        &mut self.stack
    }

    pub fn return_stack(&self) -> &Stack {
        &self.return_stack
    }

    pub fn return_stack_mut(&mut self) -> &mut Stack {
        &mut self.return_stack
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    pub fn stream(&self) -> &CharStream {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut CharStream {
        &mut self.stream
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn set_ip(&mut self, ip: usize) {
        self.ip = ip;
    }

    /// True in interpret mode, false in compile mode.
    pub fn is_immediate_mode(&self) -> bool {
        self.immediate
    }

    pub fn set_immediate_mode(&mut self, immediate: bool) {
        self.immediate = immediate;
    }

    pub fn warnings(&self) -> bool {
        self.warnings
    }

    pub fn set_warnings(&mut self, warnings: bool) {
        self.warnings = warnings;
    }

    /// A handle the host can set from another thread (or a signal handler) to cancel execution.
    /// The flag is checked between primitive dispatches, both at the top level and inside defined
    /// words.
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupt.clone()
    }

    fn check_interrupt(&self) -> error::Result<()> {
        if self.interrupt.swap(false, Ordering::Relaxed) {
            return runtime_error(ErrorKind::Interrupted, "Interrupted");
        }

        Ok(())
    }

    /// Register a built-in word.  Registration bypasses redefinition warnings and does not move
    /// the last-word slot.
    pub fn add_builtin(&mut self, word: WordPtr) {
        self.dictionary.register(word);
    }

    /// Insert a newly created word, replacing any prior binding and becoming the last word.
    pub fn insert_word(&mut self, word: WordPtr) {
        let warn = self.warnings;
        self.dictionary.define(word, warn);
    }

    /// The most recently created word, or a context error when nothing has been defined yet.
    pub fn last_word(&self) -> error::Result<WordPtr> {
        match self.dictionary.last_word() {
            Some(word) => Ok(word.clone()),
            None => runtime_error(ErrorKind::Context, "No word has been defined yet"),
        }
    }

    /// The defined word whose code the instruction pointer currently indexes.
    pub fn current_word(&self) -> error::Result<WordPtr> {
        Ok(self.frame_stack.top()?.as_word()?.clone())
    }

    /// Read the next symbol from the stream, failing when the stream is dry.
    pub fn next_symbol(&mut self) -> error::Result<String> {
        match self.stream.next_word() {
            Some(symbol) => Ok(symbol),
            None => runtime_error(ErrorKind::EndOfStream, "End of stream"),
        }
    }

    /// Read the operation following the one currently executing in the active word.  Primitives
    /// that take an inline operand (`branch`, `0branch`, `[']`) use this and are responsible for
    /// stepping the instruction pointer over the consumed slot.
    pub fn next_compiled_instr(&self) -> error::Result<Op> {
        let word = self.current_word()?;
        let body = word.defined_body()?;
        let code = body.code.borrow();

        match code.get(self.ip + 1) {
            Some(op) => Ok(op.clone()),
            None => runtime_error(ErrorKind::CodeOutOfBounds, "End of word code on \"next\""),
        }
    }

    /// Resolve a symbol to an operation: a numeric literal becomes a push, a dictionary hit
    /// becomes a call, and anything else is an error.
    pub fn parse_symbol(&self, symbol: &str) -> error::Result<Op> {
        if let Some(value) = convert_numeric_literal(symbol) {
            return Ok(Op::Push(value));
        }

        match self.dictionary.try_get(symbol) {
            Some(word) => Ok(Op::Call(word.clone())),
            None => runtime_error(
                ErrorKind::UndefinedSymbol,
                format!("Undefined symbol: \"{}\"", symbol),
            ),
        }
    }

    /// Execute a single operation against the machine.
    pub fn handle_op(&mut self, op: Op) -> error::Result<()> {
        match op {
            Op::Call(word) => self.execute_word(&word),
            Op::Push(value) => self.stack.push(value),
        }
    }

    /// Execute a word, built-in or defined.
    pub fn execute_word(&mut self, word: &WordPtr) -> error::Result<()> {
        match word.kind() {
            WordKind::Builtin(handler) => handler(self),
            WordKind::Defined(_) => self.execute_defined(word),
        }
    }

    /// Run a defined word: push it onto the frame stack, save the instruction pointer, and step
    /// through the code vector until it ends or a word-exit signal arrives.
    ///
    /// The code is re-read on every step because the vector can grow while it is running, for
    /// example when the word itself calls `,`.
    fn execute_defined(&mut self, word: &WordPtr) -> error::Result<()> {
        self.frame_stack.push(Value::Word(word.clone()))?;
        self.enter()?;

        loop {
            self.check_interrupt()?;

            let op = {
                let code = word.defined_body()?.code.borrow();
                code.get(self.ip).cloned()
            };

            let Some(op) = op else {
                break;
            };

            match self.handle_op(op) {
                Ok(()) => self.ip += 1,
                Err(Unwind::WordExit) => break,
                // Genuine errors and `bye` unwind without repairing the frames; the shell
                // reverts or terminates the whole machine.
                Err(other) => return Err(other),
            }
        }

        self.exit()?;
        let _ = self.frame_stack.pop()?;

        Ok(())
    }

    /// Save the instruction pointer on the return stack and point it at the start of a new code
    /// body.
    pub fn enter(&mut self) -> error::Result<()> {
        self.return_stack.push(Value::Int(self.ip as i64))?;
        self.ip = 0;

        Ok(())
    }

    /// Restore the instruction pointer saved by the matching enter().
    pub fn exit(&mut self) -> error::Result<()> {
        match self.return_stack.pop()? {
            Value::Int(saved) if saved >= 0 => {
                self.ip = saved as usize;
                Ok(())
            }

            other => runtime_error(
                ErrorKind::Type,
                format!(
                    "Saved instruction pointer expected on the return stack, found {}",
                    other
                ),
            ),
        }
    }

    /// Append an operation to the word currently being defined and advance the instruction
    /// pointer past it.
    pub fn compile(&mut self, op: Op) -> error::Result<()> {
        let last = self.last_word()?;
        let body = last.defined_body()?;

        self.ip += 1;
        body.code.borrow_mut().push(op);

        Ok(())
    }

    /// The top level interpretation loop.  Runs until the character stream is exhausted, `bye`
    /// is executed, or an error unwinds.
    pub fn run(&mut self) -> error::Result<()> {
        loop {
            self.check_interrupt()?;

            let Some(symbol) = self.stream.next_word() else {
                return Ok(());
            };

            let op = self.parse_symbol(&symbol)?;

            let execute_now = self.immediate
                || matches!(&op, Op::Call(word) if word.is_immediate());

            let result = if execute_now {
                self.handle_op(op)
            } else {
                self.compile(op)
            };

            match result {
                Ok(()) => {}

                // A word-exit that escapes every defined-word frame has nowhere to go.
                Err(Unwind::WordExit) => {
                    return runtime_error(ErrorKind::Context, "Cannot exit outside of a word");
                }

                Err(other) => return Err(other),
            }
        }
    }

    /// Append a line of input to the stream, snapshotting the machine first so the line can be
    /// rolled back if it fails.
    pub fn read_input(&mut self, text: &str) {
        self.make_backup();
        self.stream.write(text);
    }

    /// Capture a deep copy of the machine's mutable state in the backup slot.
    pub fn make_backup(&mut self) {
        let mut memo = CloneMemo::new();

        self.backup = Some(Box::new(VmSnapshot {
            stream: self.stream.clone(),
            ip: self.ip,
            stack: self.stack.deep_clone(&mut memo),
            return_stack: self.return_stack.deep_clone(&mut memo),
            frame_stack: self.frame_stack.deep_clone(&mut memo),
            dictionary: self.dictionary.deep_clone(&mut memo),
            heap: self.heap.deep_clone(&mut memo),
            immediate: self.immediate,
            warnings: self.warnings,
        }));
    }

    /// Replace the machine's mutable state with the backup.  The backup itself survives, so a
    /// revert can be repeated with the same result.
    pub fn revert(&mut self) {
        if let Some(snapshot) = &self.backup {
            let restored = snapshot.duplicate();

            self.stream = restored.stream;
            self.ip = restored.ip;
            self.stack = restored.stack;
            self.return_stack = restored.return_stack;
            self.frame_stack = restored.frame_stack;
            self.dictionary = restored.dictionary;
            self.heap = restored.heap;
            self.immediate = restored.immediate;
            self.warnings = restored.warnings;
        }
    }

    /// Add a directory to the module search path list.
    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Locate a module file, trying the working directory first and then each search path in
    /// order.  The first hit wins.
    fn find_module(&self, file_name: &str) -> error::Result<PathBuf> {
        let local = PathBuf::from(file_name);

        if local.exists() {
            return Ok(local);
        }

        for directory in &self.search_paths {
            let candidate = directory.join(file_name);

            if candidate.exists() {
                return Ok(candidate);
            }
        }

        runtime_error(
            ErrorKind::ModuleNotFound,
            format!("Could not find module: \"{}\"", file_name),
        )
    }

    /// Import a module: run `name.sloth` in a fresh machine of its own, then merge every word
    /// that is not hidden into this machine's dictionary, overwriting same-named entries.  The
    /// module machine shares nothing with the importer besides the search paths, so module
    /// evaluation is isolated and `hidden` controls publication.
    pub fn import_module(&mut self, name: &str) -> error::Result<()> {
        let file_name = format!("{}.sloth", name);
        let path = self.find_module(&file_name)?;

        let text = match read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                return runtime_error(
                    ErrorKind::ModuleNotFound,
                    format!("Could not read module \"{}\": {}", file_name, err),
                );
            }
        };

        let mut module_vm = VirtualMachine::new(&text);
        module_vm.search_paths = self.search_paths.clone();
        module_vm.run()?;

        for (_, word) in module_vm.dictionary.iter() {
            if !word.is_hidden() {
                self.dictionary.register(word.clone());
            }
        }

        Ok(())
    }
}
