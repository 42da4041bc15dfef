use crate::runtime::{
    data_structures::value::Value,
    error::{self, ErrorKind, runtime_error},
    vm::VirtualMachine,
};
use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt::{self, Display, Formatter},
    rc::Rc,
};

/// The function signature of a built-in word implemented in Rust.
pub type BuiltinHandler = fn(&mut VirtualMachine) -> error::Result<()>;

/// Reference counted handle to a dictionary word.  Compiled code vectors hold these handles, so a
/// word stays alive for as long as any live code refers to it, even after it has been replaced in
/// the dictionary.
pub type WordPtr = Rc<Word>;

/// A single operation in a defined word's code vector.  The sum type replaces the original
/// dispatch-by-callability: a call executes the referenced word, a push places a literal on the
/// data stack.
#[derive(Clone)]
pub enum Op {
    /// Execute the referenced word.
    Call(WordPtr),

    /// Push the literal value onto the data stack.
    Push(Value),
}

impl Op {
    /// Convert a stack value into an operation.  Word references compile to calls, everything
    /// else to a literal push.  Used by `,` and `w!`.
    pub fn from_value(value: Value) -> Op {
        match value {
            Value::Word(word) => Op::Call(word),
            other => Op::Push(other),
        }
    }

    /// Convert the operation back into a stack value.  Used by `[']` and `w@`.
    pub fn to_value(&self) -> Value {
        match self {
            Op::Call(word) => Value::Word(word.clone()),
            Op::Push(value) => value.clone(),
        }
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Op::Call(word) => write!(f, "call  {}", word.symbol()),
            Op::Push(value) => write!(f, "push  {}", value),
        }
    }
}

/// The body of a word created by `create` or `:`.  The code vector sits behind a RefCell because
/// the word is mutated during its own compilation, and may even grow while it is executing.
pub struct DefinedBody {
    /// The compiled operations making up the word.
    pub code: RefCell<Vec<Op>>,

    /// Hidden words are excluded from module export.
    pub hidden: Cell<bool>,

    /// Offset into the source stream where the definition began, kept for later inspection.
    pub text_location: Cell<Option<usize>>,
}

/// How a word is implemented.
pub enum WordKind {
    /// A primitive implemented as a Rust function.
    Builtin(BuiltinHandler),

    /// A word defined in the language itself as a vector of operations.
    Defined(DefinedBody),
}

/// A callable dictionary entry.
///
/// The immediate flag, stack effect, and documentation live behind cells because the parsing
/// words `immediate`, `(`, and `("` annotate the most recently created word after the fact.
pub struct Word {
    symbol: String,
    immediate: Cell<bool>,
    stack_effect: RefCell<Option<String>>,
    documentation: RefCell<Option<String>>,
    kind: WordKind,
}

impl Word {
    /// Create a new built-in word.
    pub fn builtin(
        symbol: &str,
        handler: BuiltinHandler,
        immediate: bool,
        stack_effect: Option<&str>,
        documentation: Option<&str>,
    ) -> WordPtr {
        Rc::new(Word {
            symbol: symbol.to_string(),
            immediate: Cell::new(immediate),
            stack_effect: RefCell::new(stack_effect.map(str::to_string)),
            documentation: RefCell::new(documentation.map(str::to_string)),
            kind: WordKind::Builtin(handler),
        })
    }

    /// Create a new empty defined word.
    pub fn defined(symbol: &str) -> WordPtr {
        Rc::new(Word {
            symbol: symbol.to_string(),
            immediate: Cell::new(false),
            stack_effect: RefCell::new(None),
            documentation: RefCell::new(None),
            kind: WordKind::Defined(DefinedBody {
                code: RefCell::new(Vec::new()),
                hidden: Cell::new(false),
                text_location: Cell::new(None),
            }),
        })
    }

    /// The name under which the word lives in the dictionary.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Does the word execute during compilation instead of being appended?
    pub fn is_immediate(&self) -> bool {
        self.immediate.get()
    }

    pub fn set_immediate(&self, immediate: bool) {
        self.immediate.set(immediate);
    }

    /// Is the word excluded from module export?  Built-ins are always public.
    pub fn is_hidden(&self) -> bool {
        match &self.kind {
            WordKind::Builtin(_) => false,
            WordKind::Defined(body) => body.hidden.get(),
        }
    }

    /// The human-readable `( before -- after )` description, if one was recorded.
    pub fn stack_effect(&self) -> Option<String> {
        self.stack_effect.borrow().clone()
    }

    pub fn set_stack_effect(&self, effect: String) {
        *self.stack_effect.borrow_mut() = Some(effect);
    }

    /// The word's documentation string, if one was attached.
    pub fn documentation(&self) -> Option<String> {
        self.documentation.borrow().clone()
    }

    pub fn set_documentation(&self, text: String) {
        *self.documentation.borrow_mut() = Some(text);
    }

    /// How the word is implemented.
    pub fn kind(&self) -> &WordKind {
        &self.kind
    }

    pub fn is_defined(&self) -> bool {
        matches!(self.kind, WordKind::Defined(_))
    }

    /// Access the defined body of the word, or a type error for built-ins.
    pub fn defined_body(&self) -> error::Result<&DefinedBody> {
        match &self.kind {
            WordKind::Defined(body) => Ok(body),
            WordKind::Builtin(_) => runtime_error(
                ErrorKind::Type,
                format!("\"{}\" is not a defined word", self.symbol),
            ),
        }
    }
}

impl Display for Word {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "w:{}", self.symbol)
    }
}

/// Pretty print a code vector for `decompile`.
pub fn pretty_print_code(code: &[Op]) -> String {
    use std::fmt::Write;

    let mut result = String::with_capacity(code.len() * 16);

    for (index, op) in code.iter().enumerate() {
        writeln!(&mut result, "{:4}: {}", index, op).expect("Writing to String should never fail.");
    }

    result
}

/// Memo table for the deep clone, keyed by pointer identity so that shared and recursive word
/// references clone to the same handle.
pub type CloneMemo = HashMap<*const Word, WordPtr>;

/// Deep clone a word handle.  Built-ins are immutable after registration and are shared; defined
/// words are duplicated, including their code vectors, with references resolved through the memo
/// so self-recursive definitions terminate.
pub fn deep_clone_word(word: &WordPtr, memo: &mut CloneMemo) -> WordPtr {
    let body = match &word.kind {
        WordKind::Builtin(_) => return word.clone(),
        WordKind::Defined(body) => body,
    };

    let key = Rc::as_ptr(word);

    if let Some(found) = memo.get(&key) {
        return found.clone();
    }

    let clone = Rc::new(Word {
        symbol: word.symbol.clone(),
        immediate: Cell::new(word.immediate.get()),
        stack_effect: RefCell::new(word.stack_effect.borrow().clone()),
        documentation: RefCell::new(word.documentation.borrow().clone()),
        kind: WordKind::Defined(DefinedBody {
            code: RefCell::new(Vec::new()),
            hidden: Cell::new(body.hidden.get()),
            text_location: Cell::new(body.text_location.get()),
        }),
    });

    // The memo entry has to exist before the code is cloned or a recursive word would clone
    // itself forever.
    memo.insert(key, clone.clone());

    let code: Vec<Op> = body
        .code
        .borrow()
        .iter()
        .map(|op| deep_clone_op(op, memo))
        .collect();

    if let WordKind::Defined(new_body) = &clone.kind {
        *new_body.code.borrow_mut() = code;
    }

    clone
}

/// Deep clone a single operation.
pub fn deep_clone_op(op: &Op, memo: &mut CloneMemo) -> Op {
    match op {
        Op::Call(word) => Op::Call(deep_clone_word(word, memo)),
        Op::Push(value) => Op::Push(deep_clone_value(value, memo)),
    }
}

/// Deep clone a value.  Only word references need mapping, the other variants are plain data.
pub fn deep_clone_value(value: &Value, memo: &mut CloneMemo) -> Value {
    match value {
        Value::Word(word) => Value::Word(deep_clone_word(word, memo)),
        other => other.clone(),
    }
}
