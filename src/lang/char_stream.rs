/// Check if the character counts as whitespace for word splitting.
fn is_whitespace(next: char) -> bool {
    matches!(next, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

/// The live character source feeding the interpreter.
///
/// The stream produces whitespace separated words as well as single characters, and supports
/// write-ahead injection: the REPL appends each new line of input at the logical end of the
/// stream while the read cursor stays where it is.  This is how a single long-lived virtual
/// machine keeps consuming an interactive session.
///
/// The stream is cheap to clone, which is how the backup slot snapshots it.
#[derive(Clone)]
pub struct CharStream {
    /// The source text, decoded up front so positions are per character rather than per byte.
    chars: Vec<char>,

    /// Index of the next character to read.
    cursor: usize,

    /// Offset at which the most recent word produced by next_word() began.  Stored on defined
    /// words for later inspection.
    last_word_start: usize,
}

impl CharStream {
    pub fn new(source: &str) -> CharStream {
        CharStream {
            chars: source.chars().collect(),
            cursor: 0,
            last_word_start: 0,
        }
    }

    /// Get and consume the next character, or None when the stream is exhausted.
    pub fn next_char(&mut self) -> Option<char> {
        let next = self.chars.get(self.cursor).copied();

        if next.is_some() {
            self.cursor += 1;
        }

        next
    }

    /// Produce the next maximal run of non-whitespace characters, or None when the stream runs
    /// out before any word character is found.
    pub fn next_word(&mut self) -> Option<String> {
        loop {
            match self.chars.get(self.cursor) {
                Some(next) if is_whitespace(*next) => self.cursor += 1,
                Some(_) => break,
                None => return None,
            }
        }

        self.last_word_start = self.cursor;

        let mut word = String::new();

        while let Some(next) = self.chars.get(self.cursor) {
            if is_whitespace(*next) {
                break;
            }

            word.push(*next);
            self.cursor += 1;
        }

        Some(word)
    }

    /// Inject text at the logical end of the stream without moving the read cursor.  A newline is
    /// placed first so the new text can never glue itself onto a previous word.
    pub fn write(&mut self, text: &str) {
        self.chars.push('\n');
        self.chars.extend(text.chars());
    }

    /// Offset at which the most recent word began.
    pub fn last_word_start(&self) -> usize {
        self.last_word_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_split_on_any_whitespace() {
        let mut stream = CharStream::new("  one\ttwo\nthree\r\n  four ");

        assert_eq!(stream.next_word().as_deref(), Some("one"));
        assert_eq!(stream.next_word().as_deref(), Some("two"));
        assert_eq!(stream.next_word().as_deref(), Some("three"));
        assert_eq!(stream.next_word().as_deref(), Some("four"));
        assert_eq!(stream.next_word(), None);
    }

    #[test]
    fn trailing_whitespace_ends_iteration() {
        let mut stream = CharStream::new("   \n\t ");
        assert_eq!(stream.next_word(), None);
    }

    #[test]
    fn injection_does_not_move_the_cursor() {
        let mut stream = CharStream::new("1 2");

        assert_eq!(stream.next_word().as_deref(), Some("1"));

        stream.write("3 4");

        assert_eq!(stream.next_word().as_deref(), Some("2"));
        assert_eq!(stream.next_word().as_deref(), Some("3"));
        assert_eq!(stream.next_word().as_deref(), Some("4"));
        assert_eq!(stream.next_word(), None);
    }

    #[test]
    fn last_word_start_points_at_the_word() {
        let mut stream = CharStream::new("  abc def");

        stream.next_word();
        assert_eq!(stream.last_word_start(), 2);

        stream.next_word();
        assert_eq!(stream.last_word_start(), 6);
    }

    #[test]
    fn characters_read_one_at_a_time() {
        let mut stream = CharStream::new("ab");

        assert_eq!(stream.next_char(), Some('a'));
        assert_eq!(stream.next_char(), Some('b'));
        assert_eq!(stream.next_char(), None);
    }
}
