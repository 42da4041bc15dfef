/// Module for the live character stream the interpreter reads its source from.
pub mod char_stream;

/// Module for recognizing and converting numeric literals.
pub mod numbers;
