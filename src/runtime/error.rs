use std::{
    error::Error,
    fmt::{self, Debug, Display, Formatter},
};

/// Result type used throughout the interpreter.  The error side carries either a genuine runtime
/// error or one of the non-local control signals, see Unwind for details.
pub type Result<T> = std::result::Result<T, Unwind>;

/// Classification of the runtime errors the virtual machine can raise.  The kind is part of the
/// error so that hosts and tests can react to a failure without matching on message text.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    /// A comment or doc-string ran past the end of the character stream before its closing
    /// delimiter was found.
    Lexical,

    /// A symbol was neither a numeric literal nor present in the dictionary.
    UndefinedSymbol,

    /// A stack operation needed more elements than the stack holds.
    StackUnderflow,

    /// A stack grew past its maximum depth.
    StackOverflow,

    /// A fetch was attempted on an uninitialized heap address.
    HeapMiss,

    /// A code vector was indexed out of bounds, or an inline operand was read past the end of the
    /// executing word.
    CodeOutOfBounds,

    /// A word was used somewhere it does not make sense, such as `exit` outside of a definition.
    Context,

    /// A module could not be located in any of the search paths.
    ModuleNotFound,

    /// The character stream ran dry while a word or character read was in progress.
    EndOfStream,

    /// A value had the wrong type for the operation applied to it.
    Type,

    /// An arithmetic operation failed, such as division by zero.
    Arithmetic,

    /// The host requested cancellation between primitive dispatches.
    Interrupted,
}

/// A runtime error raised by a primitive or by the interpreter loop itself.  These unwind through
/// all nested word invocations and out of `run()`; the shell prints them and reverts the VM.
#[derive(Clone, PartialEq, Eq)]
pub struct RuntimeError {
    /// The classification of the error.
    kind: ErrorKind,

    /// The one-line description shown to the user.
    message: String,
}

impl RuntimeError {
    /// Create a new runtime error from its kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> RuntimeError {
        RuntimeError {
            kind,
            message: message.into(),
        }
    }

    /// The classification of the error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The description of the error.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Error for RuntimeError {}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for RuntimeError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Everything that can travel down the error side of a Result during execution.
///
/// Only the Error variant represents a failure.  WordExit and Bye are control signals: WordExit
/// unwinds exactly one defined-word execution frame and is consumed by the word execution loop,
/// while Bye unwinds the whole interpreter so the host can terminate cleanly.  Neither is ever
/// shown to the user as an error.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Unwind {
    /// A genuine runtime error.
    Error(RuntimeError),

    /// Leave the currently executing defined word.  Raised by `exit` and `does>`.
    WordExit,

    /// Terminate the interpreter with a success status.  Raised by `bye`.
    Bye,
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Unwind {
        Unwind::Error(error)
    }
}

impl Display for Unwind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Unwind::Error(error) => write!(f, "{}", error),
            Unwind::WordExit => write!(f, "word exit"),
            Unwind::Bye => write!(f, "bye"),
        }
    }
}

/// Convenience for raising a runtime error as an Err result.
pub fn runtime_error<T>(kind: ErrorKind, message: impl Into<String>) -> Result<T> {
    Err(Unwind::Error(RuntimeError::new(kind, message)))
}

/// Raise a stack underflow error.  Common enough to warrant its own helper.
pub fn stack_underflow<T>() -> Result<T> {
    runtime_error(ErrorKind::StackUnderflow, "Stack underflow")
}
